//! Entities extracted from clause text.

use serde::{Deserialize, Serialize};

/// Kind of entity found in a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Percentage,
    Currency,
    TimePeriod,
    Party,
    Document,
    Jurisdiction,
    PenaltyClause,
}

/// A span of clause text tagged with a kind and a fixed confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// The matched text
    pub word: String,

    /// What the text was recognised as
    pub entity: EntityKind,

    /// Fixed per-pattern confidence
    pub score: f64,
}

impl Entity {
    pub fn new(word: impl Into<String>, entity: EntityKind, score: f64) -> Self {
        Self {
            word: word.into(),
            entity,
            score,
        }
    }

    /// Leading number in the entity text, ignoring thousands separators
    pub fn numeric_value(&self) -> Option<f64> {
        let digits: String = self
            .word
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .filter(|c| *c != ',')
            .collect();
        digits.trim_end_matches('.').parse().ok()
    }
}
