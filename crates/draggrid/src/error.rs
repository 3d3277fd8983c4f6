#![forbid(unsafe_code)]

//! Error taxonomy.
//!
//! | Kind | Surfaced as | Cause |
//! |------|-------------|-------|
//! | Invariant violation | [`ReorderError`] in strict mode, `warn` log otherwise | No item at an order the engine expected to be occupied |
//! | Invalid request | [`ReorderOutcome::Ignored`](crate::reorder::ReorderOutcome) | Self-target, unregistered item, drag disabled |
//! | Concurrent request | [`ReorderOutcome::Ignored`](crate::reorder::ReorderOutcome) | A batch is already in flight |
//! | Duplicate item | [`RegistryError`] | Host registered the same id twice |
//! | Bad configuration | [`ConfigError`] | Zero columns, opacity out of range, malformed env override |

use std::fmt;

use crate::registry::ItemId;

/// Which end of a planned move was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSide {
    /// No item held the order the move starts from.
    Source,
    /// No item held the order the move lands on.
    Destination,
}

/// A planned move whose endpoints were not both occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvariantViolation {
    pub from_order: usize,
    pub to_order: usize,
    pub missing: MissingSide,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.missing {
            MissingSide::Source => "source",
            MissingSide::Destination => "destination",
        };
        write!(
            f,
            "no {side} item for move {} -> {}",
            self.from_order, self.to_order
        )
    }
}

impl std::error::Error for InvariantViolation {}

/// Failures surfaced by the reorder engine in strict mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// The order permutation was broken when a batch was planned.
    InvariantViolation(InvariantViolation),
}

impl fmt::Display for ReorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvariantViolation(v) => write!(f, "reorder invariant violated: {v}"),
        }
    }
}

impl std::error::Error for ReorderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvariantViolation(v) => Some(v),
        }
    }
}

impl From<InvariantViolation> for ReorderError {
    fn from(v: InvariantViolation) -> Self {
        Self::InvariantViolation(v)
    }
}

/// Registry mutations that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The id is already registered.
    DuplicateItem(ItemId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateItem(id) => write!(f, "item {id} is already registered"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Invalid grid configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `column_count` must be at least one.
    ZeroColumns,
    /// `lift_opacity` must lie in `0.0..=1.0`.
    InvalidOpacity(f32),
    /// An environment override could not be parsed.
    InvalidEnv { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroColumns => write!(f, "column count must be non-zero"),
            Self::InvalidOpacity(value) => {
                write!(f, "lift opacity {value} is outside 0.0..=1.0")
            }
            Self::InvalidEnv { key, value } => {
                write!(f, "cannot parse {key}={value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
