//! Clause classification.
//!
//! Two tiers:
//! 1. Deterministic patterns: a header table checked against the start of
//!    the chunk, then body keywords. Anything matched here is final.
//! 2. Zero-shot model, only when the pattern tier says `General`. The top
//!    label is mapped onto the catalog through a synonym table.
//!
//! A failing model never fails the chunk: the result degrades to `General`
//! with the reason attached.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::adapters::{CapabilityError, ZeroShotClassifier};
use crate::domain::clause_types::*;
use crate::domain::candidate_labels;

use super::outcome::{FallbackReason, Outcome};

/// Header prefixes, checked in order against the upper-cased chunk start
const HEADER_TYPES: &[(&str, &str)] = &[
    ("CONFIDENTIALITY", CONFIDENTIALITY),
    ("TERMINATION", TERMINATION),
    ("PAYMENT", PAYMENT),
    ("PAYMENT TERMS", PAYMENT),
    ("LIABILITY", LIABILITY),
    ("INDEMNIFICATION", INDEMNIFICATION),
    ("LIABILITY AND INDEMNIFICATION", LIABILITY),
    ("GOVERNING LAW", GOVERNING_LAW),
    ("JURISDICTION", GOVERNING_LAW),
    ("FORCE MAJEURE", FORCE_MAJEURE),
    ("INTELLECTUAL PROPERTY", INTELLECTUAL_PROPERTY),
    ("IP", INTELLECTUAL_PROPERTY),
    ("NON-COMPETE", NON_COMPETE),
    ("NON COMPETE", NON_COMPETE),
    ("DISPUTE RESOLUTION", DISPUTE_RESOLUTION),
    ("ARBITRATION", DISPUTE_RESOLUTION),
    ("ASSIGNMENT", ASSIGNMENT),
    ("NOTICE", NOTICE),
    ("SEVERABILITY", SEVERABILITY),
    ("ENTIRE AGREEMENT", ENTIRE_AGREEMENT),
    ("AMENDMENT", AMENDMENT),
    ("WAIVER", WAIVER),
];

/// Body keywords, checked in order against the lower-cased chunk
const KEYWORD_TYPES: &[(&str, &str)] = &[
    ("confidential", CONFIDENTIALITY),
    ("terminate", TERMINATION),
    ("payment", PAYMENT),
    ("payable", PAYMENT),
    ("invoice", PAYMENT),
    ("liability", LIABILITY),
    ("indemnify", INDEMNIFICATION),
    ("hold harmless", INDEMNIFICATION),
    ("governed by", GOVERNING_LAW),
    ("jurisdiction", GOVERNING_LAW),
    ("force majeure", FORCE_MAJEURE),
    ("intellectual property", INTELLECTUAL_PROPERTY),
    ("copyright", INTELLECTUAL_PROPERTY),
    ("patent", INTELLECTUAL_PROPERTY),
    ("trademark", INTELLECTUAL_PROPERTY),
    ("non-compete", NON_COMPETE),
    ("compete", NON_COMPETE),
    ("dispute", DISPUTE_RESOLUTION),
    ("arbitration", DISPUTE_RESOLUTION),
    ("arbitrate", DISPUTE_RESOLUTION),
    ("assign", ASSIGNMENT),
    ("assignment", ASSIGNMENT),
];

/// Model label synonyms, matched by containment in order
const LABEL_SYNONYMS: &[(&str, &str)] = &[
    ("confidentiality", CONFIDENTIALITY),
    ("confidential", CONFIDENTIALITY),
    ("termination", TERMINATION),
    ("payment", PAYMENT),
    ("liability", LIABILITY),
    ("indemnification", INDEMNIFICATION),
    ("governing law", GOVERNING_LAW),
    ("jurisdiction", GOVERNING_LAW),
    ("force majeure", FORCE_MAJEURE),
    ("introduction", INTRODUCTION),
    ("preamble", INTRODUCTION),
    ("definitions", DEFINITIONS),
    ("scope", SCOPE),
    ("warranties", WARRANTIES),
    ("representation", REPRESENTATIONS),
    ("covenants", COVENANTS),
    ("conditions", CONDITIONS),
    ("dispute resolution", DISPUTE_RESOLUTION),
    ("arbitration", DISPUTE_RESOLUTION),
    ("intellectual property", INTELLECTUAL_PROPERTY),
    ("non-compete", NON_COMPETE),
    ("severability", SEVERABILITY),
    ("entire agreement", ENTIRE_AGREEMENT),
    ("amendment", AMENDMENT),
    ("assignment", ASSIGNMENT),
    ("notice", NOTICE),
    ("waiver", WAIVER),
];

/// Leading section numbering ("1.", "2.3", "12") before a header word
static SECTION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)*\.?\s+").expect("valid section number regex"));

/// Clause families a chunk may touch on besides its own type
static RELATED_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let related = |clause_type, pattern: &str| {
        (
            clause_type,
            Regex::new(pattern).expect("valid related clause regex"),
        )
    };
    vec![
        related(
            GOVERNING_LAW,
            r"(?i)\b(?:governed|jurisdiction|laws?)\s+(?:of|by)\s+[A-Z][a-z]+",
        ),
        related(
            DISPUTE_RESOLUTION,
            r"(?i)\b(?:arbitration|arbitrate|dispute|litigation)\b",
        ),
        related(TERMINATION, r"(?i)\b(?:terminate|termination|cancel)\b"),
        related(PAYMENT, r"(?i)\b(?:payment|pay|invoice|fees?|charges?)\b"),
        related(
            CONFIDENTIALITY,
            r"(?i)\b(?:confidential|confidentiality|non-disclosure)\b",
        ),
        related(LIABILITY, r"(?i)\b(?:liability|liable|damages)\b"),
        related(
            INDEMNIFICATION,
            r"(?i)\b(?:indemnify|indemnification|hold harmless)\b",
        ),
        related(FORCE_MAJEURE, r"(?i)\b(?:force majeure|act of god)\b"),
        related(NOTICE, r"(?i)\b(?:notice|notify|notification)\b"),
        related(ASSIGNMENT, r"(?i)\b(?:assign|assignment|transfer)\b"),
    ]
});

/// Clause type from a header at the start of the text
pub fn classify_by_header(text: &str) -> Option<&'static str> {
    let stripped = SECTION_NUMBER.replace(text.trim_start(), "");
    let upper = stripped.to_uppercase();
    HEADER_TYPES.iter().find_map(|(header, clause_type)| {
        let rest = upper.strip_prefix(header)?;
        (rest.starts_with('.') || rest.starts_with(' ')).then_some(*clause_type)
    })
}

/// Clause type from body keywords
pub fn classify_by_keywords(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    KEYWORD_TYPES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, clause_type)| *clause_type)
}

/// Deterministic tier: header, then keywords, else `General`
pub fn classify_by_patterns(text: &str) -> &'static str {
    classify_by_header(text)
        .or_else(|| classify_by_keywords(text))
        .unwrap_or(GENERAL)
}

/// Map a model label onto the catalog.
///
/// Labels outside the synonym table are kept, capitalised as a sentence.
pub fn normalize_label(label: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        return GENERAL.to_string();
    }

    let lower = label.to_lowercase();
    if let Some((_, clause_type)) = LABEL_SYNONYMS.iter().find(|(key, _)| lower.contains(key)) {
        return clause_type.to_string();
    }

    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => GENERAL.to_string(),
    }
}

/// Ask the model for the best catalog label
async fn classify_with_model(
    model: &dyn ZeroShotClassifier,
    text: &str,
    timeout: Duration,
) -> Result<String, CapabilityError> {
    let labels = candidate_labels();
    let ranked = tokio::time::timeout(timeout, model.classify(text, &labels))
        .await
        .map_err(|_| CapabilityError::Timeout { after: timeout })??;

    let best = ranked
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or(CapabilityError::EmptyResult)?;

    Ok(normalize_label(&best.label))
}

/// Classify one chunk.
///
/// Pattern hits are returned without touching the model. The model only
/// refines chunks the patterns left as `General`.
pub async fn classify(
    model: &dyn ZeroShotClassifier,
    text: &str,
    timeout: Duration,
) -> Outcome<String> {
    let by_pattern = classify_by_patterns(text);
    if by_pattern != GENERAL {
        return Outcome::Ok(by_pattern.to_string());
    }

    match classify_with_model(model, text, timeout).await {
        Ok(label) => {
            debug!(model = model.name(), %label, "Model classified chunk");
            Outcome::Ok(label)
        }
        Err(CapabilityError::NotConfigured(what)) => {
            debug!(%what, "Model classification skipped");
            Outcome::degraded(GENERAL.to_string(), FallbackReason::NotConfigured)
        }
        Err(e) => {
            warn!(model = model.name(), error = %e, "Model classification failed, using General");
            Outcome::degraded(GENERAL.to_string(), FallbackReason::from(&e))
        }
    }
}

/// Other clause families mentioned in `text`, excluding `own_type`
pub fn related_clause_types(text: &str, own_type: &str) -> Vec<String> {
    RELATED_PATTERNS
        .iter()
        .filter(|(clause_type, _)| *clause_type != own_type)
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(clause_type, _)| clause_type.to_string())
        .collect()
}
