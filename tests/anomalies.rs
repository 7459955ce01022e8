//! Anomaly Detection Integration Tests
//!
//! Tests for the adaptive risk threshold and the per-chunk detectors.

use clauselens::core::anomalies::{detect_anomalies, risk_threshold};
use clauselens::domain::clause_types::*;
use clauselens::domain::{AnomalyDetail, ClassifiedChunk, ClauseChunk, SectionType};

fn chunk(index: usize, clause_type: &str, risk_score: f64, text: &str) -> ClassifiedChunk {
    ClassifiedChunk::scored(
        ClauseChunk {
            index,
            section_title: format!("{}. Section", index + 1),
            section_type: SectionType::Standard,
            parent_section: None,
            text: text.to_string(),
        },
        clause_type,
        risk_score,
    )
}

fn scored(scores: &[f64]) -> Vec<ClassifiedChunk> {
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| chunk(i, GENERAL, *s, "Plain text."))
        .collect()
}

fn flagged_high(chunks: &[ClassifiedChunk]) -> Vec<usize> {
    detect_anomalies(chunks)
        .iter()
        .filter(|a| a.kind() == "high_risk_clause")
        .filter_map(|a| a.chunk_index)
        .collect()
}

#[test]
fn test_single_outlier_is_flagged() {
    let mut scores = vec![0.1; 9];
    scores.push(0.9);
    let chunks = scored(&scores);

    assert!((risk_threshold(&scores) - 0.66).abs() < 1e-9);
    assert_eq!(flagged_high(&chunks), vec![9]);

    // the outlier is not reported a second time as a compliance anomaly
    let anomalies = detect_anomalies(&chunks);
    assert!(!anomalies.iter().any(|a| a.kind() == "compliance_anomaly"));
}

#[test]
fn test_uniform_scores_are_not_outliers() {
    let chunks = scored(&[0.5; 10]);
    assert!((risk_threshold(&[0.5; 10]) - 0.8).abs() < 1e-9);
    assert!(flagged_high(&chunks).is_empty());
}

#[test]
fn test_uniformly_high_scores_raise_compliance_anomalies() {
    let chunks = scored(&[0.85; 4]);
    let anomalies = detect_anomalies(&chunks);

    assert!(flagged_high(&chunks).is_empty());
    let compliance: Vec<usize> = anomalies
        .iter()
        .filter(|a| a.kind() == "compliance_anomaly")
        .filter_map(|a| a.chunk_index)
        .collect();
    assert_eq!(compliance, vec![0, 1, 2, 3]);
}

#[test]
fn test_rare_type_needs_a_large_document() {
    let mut chunks = scored(&[0.1; 24]);
    chunks[3].clause_type = WAIVER.to_string();

    let rare: Vec<_> = detect_anomalies(&chunks)
        .into_iter()
        .filter_map(|a| match a.detail {
            AnomalyDetail::RareClauseType { clause_type, frequency } => {
                Some((a.chunk_index, clause_type, frequency))
            }
            _ => None,
        })
        .collect();
    assert_eq!(rare, vec![(Some(3), WAIVER.to_string(), "1/24".to_string())]);

    // one in ten is not rare
    let mut small = scored(&[0.1; 10]);
    small[3].clause_type = WAIVER.to_string();
    assert!(!detect_anomalies(&small)
        .iter()
        .any(|a| a.kind() == "rare_clause_type"));
}

#[test]
fn test_notice_and_penalty_detectors() {
    let chunks = vec![
        chunk(
            0,
            TERMINATION,
            0.6,
            "Terminate on 10 days notice, or on 10 days written notice, or 60 days notice.",
        ),
        chunk(
            1,
            PAYMENT,
            0.5,
            "Late sums accrue 6% monthly, capped at 6% per quarter, plus a 2% fee and 12.5% default interest.",
        ),
    ];
    let anomalies = detect_anomalies(&chunks);

    let notices: Vec<_> = anomalies
        .iter()
        .filter_map(|a| match &a.detail {
            AnomalyDetail::ShortNoticePeriod { notice_period, .. } => {
                Some((a.chunk_index, notice_period.clone()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(notices, vec![(Some(0), "10 days".to_string())]);

    let rates: Vec<_> = anomalies
        .iter()
        .filter_map(|a| match &a.detail {
            AnomalyDetail::HighPenaltyRate { penalty_rate, .. } => {
                Some((a.chunk_index, penalty_rate.clone()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        rates,
        vec![
            (Some(1), "6%".to_string()),
            (Some(1), "12.5%".to_string())
        ]
    );
}

#[test]
fn test_detector_order() {
    let chunks = vec![
        chunk(0, TERMINATION, 0.9, "Terminate on 5 days notice."),
        chunk(1, GENERAL, 0.1, "Plain text."),
    ];
    let kinds: Vec<&str> = detect_anomalies(&chunks).iter().map(|a| a.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "compliance_anomaly",
            "missing_required_clause",
            "short_notice_period"
        ]
    );
}
