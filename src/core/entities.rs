//! Pattern-based entity extraction.
//!
//! Every pattern carries a fixed confidence. Results are deduplicated on
//! `(word, kind)`, keeping the first occurrence.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Entity, EntityKind};

struct EntityPattern {
    kind: EntityKind,
    score: f64,
    regex: Regex,
}

static PATTERNS: Lazy<Vec<EntityPattern>> = Lazy::new(|| {
    let entity = |kind, score, pattern: &str| EntityPattern {
        kind,
        score,
        regex: Regex::new(pattern).expect("valid entity regex"),
    };
    vec![
        entity(EntityKind::Percentage, 0.9, r"(\d+(?:\.\d+)?)\s*%"),
        entity(EntityKind::Currency, 0.9, r"\$\s*(\d+(?:,\d{3})*(?:\.\d{2})?)"),
        entity(
            EntityKind::Currency,
            0.8,
            r"(?i)(\d+(?:,\d{3})*(?:\.\d{2})?)\s*(?:dollars?|usd|eur|gbp)\b",
        ),
        entity(
            EntityKind::TimePeriod,
            0.85,
            r"(?i)(\d+)\s*(?:days?|weeks?|months?|years?)\b",
        ),
        entity(
            EntityKind::Party,
            0.8,
            r"(?i)\b(?:service provider|client|customer|vendor|supplier|party|parties|company|corporation|llc|inc)\b",
        ),
        entity(EntityKind::Document, 0.7, r"(?i)\b(?:agreement|contract|document)\b"),
        entity(
            EntityKind::Jurisdiction,
            0.9,
            r"(?:[Ss]tate|[Jj]urisdiction|[Cc]ountry|[Ll]ocation)\s+of\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
        ),
    ]
});

/// Terms that mark a sentence as a penalty clause
const PENALTY_TERMS: &[&str] = &["penalty", "fine", "late fee", "interest", "damages", "breach"];

const PENALTY_SCORE: f64 = 0.95;

static PENALTY_SPANS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    PENALTY_TERMS
        .iter()
        .map(|term| {
            let pattern = format!(r"(?i)[^.]*{}[^.]*", regex::escape(term));
            (*term, Regex::new(&pattern).expect("valid penalty regex"))
        })
        .collect()
});

/// Extract entities from one clause
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let mut found = Vec::new();

    for pattern in PATTERNS.iter() {
        for m in pattern.regex.find_iter(text) {
            found.push(Entity::new(m.as_str().trim(), pattern.kind, pattern.score));
        }
    }

    let lower = text.to_lowercase();
    for (term, regex) in PENALTY_SPANS.iter() {
        if !lower.contains(term) {
            continue;
        }
        for m in regex.find_iter(text) {
            let span = m.as_str().trim();
            if !span.is_empty() {
                found.push(Entity::new(span, EntityKind::PenaltyClause, PENALTY_SCORE));
            }
        }
    }

    let mut seen = HashSet::new();
    found.retain(|entity| seen.insert((entity.word.clone(), entity.entity)));
    found
}
