//! Stage outcomes that carry their own degradation reason.
//!
//! Classification and summarization never fail the request: when the
//! external capability is unavailable they fall back to a local default.
//! `Outcome` keeps that fallback visible to the caller instead of hiding it.
//! The records that end up in a report live in `domain::degradation`.

use crate::adapters::CapabilityError;

pub use crate::domain::{Degradation, FallbackReason, Stage};

impl From<&CapabilityError> for FallbackReason {
    fn from(err: &CapabilityError) -> Self {
        match err {
            CapabilityError::NotConfigured(_) => FallbackReason::NotConfigured,
            CapabilityError::Timeout { .. } => FallbackReason::Timeout,
            CapabilityError::Http { .. } | CapabilityError::Transport(_) => {
                FallbackReason::Unavailable
            }
            CapabilityError::MalformedResponse(_) => FallbackReason::UnrecognizedResponse,
            CapabilityError::EmptyResult => FallbackReason::EmptyResult,
        }
    }
}

/// Result of a stage that may have degraded to a fallback value.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Degraded { value: T, reason: FallbackReason },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, reason: FallbackReason) -> Self {
        Outcome::Degraded { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<FallbackReason> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Degraded { reason, .. } => Some(*reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Degraded { value, reason } => Outcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}
