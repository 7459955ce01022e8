//! Anomaly detection over a classified document.
//!
//! Detectors run in a fixed order and their findings are concatenated:
//! 1. statistical risk outliers
//! 2. clause types that occur once in a large document
//! 3. clauses past the compliance threshold
//! 4. required clause types missing from the document
//! 5. notice periods under 30 days
//! 6. percentage rates of 5% or more

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::clause_types::GENERAL;
use crate::domain::{Anomaly, AnomalyDetail, ClassifiedChunk, REQUIRED_CLAUSES};

use super::risk::{notice_periods, round2, SHORT_NOTICE_DAYS};

/// Scores at or above this are non-compliant
pub const COMPLIANCE_THRESHOLD: f64 = 0.8;

/// Types rarer than this share of all chunks are flagged
const RARE_SHARE: f64 = 0.05;

/// Percentages at or above this are unusually high penalty rates
const HIGH_PENALTY_RATE: f64 = 5.0;

/// Below this spread the threshold falls back to `mean + 0.3`
const MIN_SPREAD: f64 = 0.01;

static PERCENT_RATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("valid percent rate regex"));

/// Outlier threshold for a set of scores
pub fn risk_threshold(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let std = if scores.len() > 1 {
        (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt()
    } else {
        0.0
    };

    if std > MIN_SPREAD {
        mean + 2.0 * std
    } else {
        mean + 0.3
    }
}

fn high_risk(chunks: &[ClassifiedChunk]) -> Vec<Anomaly> {
    let scores: Vec<f64> = chunks.iter().map(|c| c.risk_score).collect();
    let threshold = risk_threshold(&scores);

    chunks
        .iter()
        .filter(|c| c.risk_score > threshold)
        .map(|c| Anomaly {
            chunk_index: Some(c.index()),
            reason: format!(
                "Risk score significantly above average (threshold: {})",
                round2(threshold)
            ),
            detail: AnomalyDetail::HighRiskClause {
                clause_type: c.clause_type.clone(),
                risk_score: round2(c.risk_score),
                threshold: round2(threshold),
            },
        })
        .collect()
}

fn rare_types(chunks: &[ClassifiedChunk]) -> Vec<Anomaly> {
    let total = chunks.len();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for chunk in chunks.iter().filter(|c| c.clause_type != GENERAL) {
        let count = counts.entry(chunk.clause_type.as_str()).or_insert(0);
        if *count == 0 {
            order.push(chunk.clause_type.as_str());
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter(|clause_type| {
            let count = counts[clause_type];
            count == 1 && (count as f64 / total as f64) < RARE_SHARE
        })
        .filter_map(|clause_type| chunks.iter().find(|c| c.clause_type == clause_type))
        .map(|c| Anomaly {
            chunk_index: Some(c.index()),
            reason: "Unusual clause type appearing only once in document".to_string(),
            detail: AnomalyDetail::RareClauseType {
                clause_type: c.clause_type.clone(),
                frequency: format!("1/{}", total),
            },
        })
        .collect()
}

fn compliance(chunks: &[ClassifiedChunk], already_high: &HashSet<usize>) -> Vec<Anomaly> {
    chunks
        .iter()
        .filter(|c| c.risk_score >= COMPLIANCE_THRESHOLD && !already_high.contains(&c.index()))
        .map(|c| Anomaly {
            chunk_index: Some(c.index()),
            reason: "Non-compliant clause detected".to_string(),
            detail: AnomalyDetail::ComplianceAnomaly {
                clause_type: c.clause_type.clone(),
                risk_score: round2(c.risk_score),
            },
        })
        .collect()
}

/// Required clause types absent from the chunks, in required order
pub fn missing_required(chunks: &[ClassifiedChunk]) -> Vec<String> {
    let detected: HashSet<&str> = chunks
        .iter()
        .map(|c| c.clause_type.as_str())
        .filter(|t| *t != GENERAL)
        .collect();

    REQUIRED_CLAUSES
        .iter()
        .filter(|required| !detected.contains(*required))
        .map(|required| required.to_string())
        .collect()
}

fn missing(chunks: &[ClassifiedChunk]) -> Option<Anomaly> {
    let missing_clauses = missing_required(chunks);
    if missing_clauses.is_empty() {
        return None;
    }
    Some(Anomaly {
        chunk_index: None,
        reason: "Required clauses not found in document".to_string(),
        detail: AnomalyDetail::MissingRequiredClause { missing_clauses },
    })
}

fn short_notice(chunks: &[ClassifiedChunk]) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    for chunk in chunks {
        let mut seen = HashSet::new();
        for days in notice_periods(chunk.text()) {
            if days >= SHORT_NOTICE_DAYS || !seen.insert(days) {
                continue;
            }
            anomalies.push(Anomaly {
                chunk_index: Some(chunk.index()),
                reason: format!(
                    "Notice period of {} days is unusually short (recommended: 30+ days)",
                    days
                ),
                detail: AnomalyDetail::ShortNoticePeriod {
                    clause_type: chunk.clause_type.clone(),
                    notice_period: format!("{} days", days),
                },
            });
        }
    }
    anomalies
}

fn high_penalty_rates(chunks: &[ClassifiedChunk]) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    for chunk in chunks {
        let mut seen: Vec<f64> = Vec::new();
        for caps in PERCENT_RATE.captures_iter(chunk.text()) {
            let Ok(rate) = caps[1].parse::<f64>() else {
                continue;
            };
            if rate < HIGH_PENALTY_RATE || seen.contains(&rate) {
                continue;
            }
            seen.push(rate);
            anomalies.push(Anomaly {
                chunk_index: Some(chunk.index()),
                reason: format!("Penalty rate of {}% is unusually high", rate),
                detail: AnomalyDetail::HighPenaltyRate {
                    clause_type: chunk.clause_type.clone(),
                    penalty_rate: format!("{}%", rate),
                },
            });
        }
    }
    anomalies
}

/// Run every detector over the classified chunks.
///
/// An empty document yields no anomalies. The result is a pure function
/// of the input.
pub fn detect_anomalies(chunks: &[ClassifiedChunk]) -> Vec<Anomaly> {
    if chunks.is_empty() {
        return Vec::new();
    }

    let mut anomalies = high_risk(chunks);
    let flagged: HashSet<usize> = anomalies.iter().filter_map(|a| a.chunk_index).collect();

    anomalies.extend(rare_types(chunks));
    anomalies.extend(compliance(chunks, &flagged));
    anomalies.extend(missing(chunks));
    anomalies.extend(short_notice(chunks));
    anomalies.extend(high_penalty_rates(chunks));
    anomalies
}
