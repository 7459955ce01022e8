//! Clause risk scoring.
//!
//! A score starts from the clause type's base risk, then picks up additive
//! adjustments from entities, risky vocabulary, penalty phrasing and short
//! notice periods. It is clamped to [0, 1] after every step and rounded to
//! two decimals at the end.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::clause_types::*;
use crate::domain::{Entity, EntityKind};

/// Base risk by clause type; unknown types score 0
const BASE_RISK: &[(&str, f64)] = &[
    (LIABILITY, 0.8),
    (INDEMNIFICATION, 0.75),
    (TERMINATION, 0.6),
    (DISPUTE_RESOLUTION, 0.55),
    (PAYMENT, 0.5),
    (NON_COMPETE, 0.45),
    (CONFIDENTIALITY, 0.4),
    (INTELLECTUAL_PROPERTY, 0.35),
    (GOVERNING_LAW, 0.3),
    (WAIVER, 0.25),
    (FORCE_MAJEURE, 0.2),
    (SEVERABILITY, 0.15),
    (ENTIRE_AGREEMENT, 0.1),
    (AMENDMENT, 0.1),
    (ASSIGNMENT, 0.1),
    (NOTICE, 0.1),
    (INTRODUCTION, 0.05),
    (DEFINITIONS, 0.05),
    (SCOPE, 0.05),
    (WARRANTIES, 0.05),
    (REPRESENTATIONS, 0.05),
    (COVENANTS, 0.05),
    (CONDITIONS, 0.05),
    (GENERAL, 0.0),
];

/// Vocabulary that raises risk, each counted once
const RISK_TERMS: &[(&str, f64)] = &[
    ("liability", 0.15),
    ("damages", 0.15),
    ("indemnify", 0.15),
    ("penalty", 0.12),
    ("fine", 0.12),
    ("breach", 0.1),
    ("terminate", 0.1),
    ("violation", 0.1),
    ("unauthorized", 0.1),
    ("prohibited", 0.08),
    ("restrict", 0.08),
    ("exclusive", 0.08),
];

const PENALTY_PHRASING_BONUS: f64 = 0.15;
const SHORT_NOTICE_BONUS: f64 = 0.1;
const ARBITRATION_BONUS: f64 = 0.05;

/// Notice periods below this many days count as short
pub const SHORT_NOTICE_DAYS: u32 = 30;

static PENALTY_PHRASING: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\d+(?:\.\d+)?\s*%\s*(?:monthly|daily|weekly|annual|penalty|fee|interest)",
        r"(?i)late\s+(?:fee|payment|charge)",
        r"(?i)penalty\s+(?:of|rate|fee)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid penalty phrasing regex"))
    .collect()
});

static NOTICE_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*days?\s*(?:written\s+)?notice").expect("valid notice period regex")
});

static PERIOD_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(day|week|month|year)").expect("valid period unit regex")
});

/// Base risk for a clause type
pub fn base_risk(clause_type: &str) -> f64 {
    BASE_RISK
        .iter()
        .find(|(name, _)| *name == clause_type)
        .map(|(_, risk)| *risk)
        .unwrap_or(0.0)
}

/// Every "N days notice" period in the text, in order of appearance
pub fn notice_periods(text: &str) -> Vec<u32> {
    NOTICE_PERIOD
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Length of a time-period entity in days ("2 weeks" is 14)
fn period_days(word: &str) -> Option<f64> {
    let caps = PERIOD_UNIT.captures(word)?;
    let count: f64 = caps[1].parse().ok()?;
    let per_unit = match caps[2].to_lowercase().as_str() {
        "day" => 1.0,
        "week" => 7.0,
        "month" => 30.0,
        _ => 365.0,
    };
    Some(count * per_unit)
}

fn entity_adjustment(entity: &Entity) -> f64 {
    match entity.entity {
        EntityKind::PenaltyClause => 0.2,
        EntityKind::Percentage => match entity.numeric_value() {
            Some(rate) if rate >= 5.0 => 0.15,
            Some(rate) if rate >= 1.0 => 0.1,
            _ => 0.0,
        },
        EntityKind::TimePeriod => match period_days(&entity.word) {
            Some(days) if days <= 7.0 => 0.2,
            Some(days) if days <= 30.0 => 0.1,
            _ => 0.0,
        },
        EntityKind::Currency => match entity.numeric_value() {
            Some(amount) if amount >= 100_000.0 => 0.15,
            Some(amount) if amount >= 10_000.0 => 0.1,
            _ => 0.0,
        },
        _ => 0.0,
    }
}

fn bump(score: f64, by: f64) -> f64 {
    (score + by).clamp(0.0, 1.0)
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Risk score in [0, 1], rounded to two decimals
pub fn score_risk(clause_type: &str, text: &str, entities: &[Entity]) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let lower = text.to_lowercase();
    let mut score = base_risk(clause_type);

    for entity in entities {
        score = bump(score, entity_adjustment(entity));
    }

    for (term, weight) in RISK_TERMS {
        if lower.contains(term) {
            score = bump(score, *weight);
        }
    }

    if PENALTY_PHRASING.iter().any(|re| re.is_match(text)) {
        score = bump(score, PENALTY_PHRASING_BONUS);
    }

    if let Some(shortest) = notice_periods(text).into_iter().min() {
        if shortest < SHORT_NOTICE_DAYS {
            score = bump(score, SHORT_NOTICE_BONUS);
        }
    }

    if clause_type == DISPUTE_RESOLUTION && lower.contains("arbitrat") {
        score = bump(score, ARBITRATION_BONUS);
    }

    round2(score).clamp(0.0, 1.0)
}
