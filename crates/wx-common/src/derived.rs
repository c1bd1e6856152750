//! Explicit tagging of values that fell back to a constant.
//!
//! Scoring never fails on partial input; it substitutes neutral values.
//! `Derived` keeps that substitution visible so callers and tests can tell
//! a value computed from real signal from one that was defaulted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a value was defaulted instead of computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FallbackReason {
    MissingTemperature,
    MissingHumidity,
    MissingPrecipitation,
    NonFiniteInput { field: String },
    InsufficientHistory { have: usize, need: usize },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MissingTemperature => write!(f, "missing temperature"),
            FallbackReason::MissingHumidity => write!(f, "missing humidity"),
            FallbackReason::MissingPrecipitation => write!(f, "missing precipitation"),
            FallbackReason::NonFiniteInput { field } => write!(f, "non-finite {field}"),
            FallbackReason::InsufficientHistory { have, need } => {
                write!(f, "insufficient history ({have} < {need})")
            }
        }
    }
}

/// A value that was either computed or substituted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Derived<T> {
    Computed { value: T },
    Defaulted { value: T, reason: FallbackReason },
}

impl<T> Derived<T> {
    pub fn computed(value: T) -> Self {
        Derived::Computed { value }
    }

    pub fn defaulted(value: T, reason: FallbackReason) -> Self {
        Derived::Defaulted { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            Derived::Computed { value } | Derived::Defaulted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Derived::Computed { value } | Derived::Defaulted { value, .. } => value,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Derived::Computed { .. })
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Derived::Computed { .. } => None,
            Derived::Defaulted { reason, .. } => Some(reason),
        }
    }
}
