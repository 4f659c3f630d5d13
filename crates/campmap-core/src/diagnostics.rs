//! Soft diagnostics reported by commands and transforms.
//!
//! These conditions are expected during concurrent edits and never abort an
//! operation. They are logged at `warn` level when raised and kept on the
//! command that raised them so a UI can surface them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A recoverable condition noticed while building or running a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorWarning {
    /// An add skipped a module whose id already exists.
    DuplicateSkipped { id: String },
    /// A module targeted by the command is no longer in the store.
    MissingSkipped { id: String },
    /// A delete removed fewer modules than requested.
    PartialDelete { removed: usize, requested: usize },
    /// A negative z-index was raised to zero.
    ZIndexClamped { requested: f64 },
    /// A batch was built with no members.
    EmptyBatch { name: String },
    /// A batch member failed; the rest of the batch still applied.
    SubcommandFailed { name: String, error: String },
    /// A resize fell below the minimum size and was corrected.
    MinimumSizeApplied { width: f64, height: f64 },
}

impl EditorWarning {
    /// Log this warning through `tracing`.
    pub fn emit(&self) {
        tracing::warn!("{}", self);
    }
}

impl fmt::Display for EditorWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSkipped { id } => write!(f, "module {} already exists, skipped", id),
            Self::MissingSkipped { id } => write!(f, "module {} not found, skipped", id),
            Self::PartialDelete { removed, requested } => {
                write!(f, "removed {} of {} modules", removed, requested)
            }
            Self::ZIndexClamped { requested } => {
                write!(f, "z-index {} is negative, clamped to 0", requested)
            }
            Self::EmptyBatch { name } => write!(f, "batch '{}' has no commands", name),
            Self::SubcommandFailed { name, error } => {
                write!(f, "batch member '{}' failed: {}", name, error)
            }
            Self::MinimumSizeApplied { width, height } => {
                write!(f, "size corrected to minimum {} x {}", width, height)
            }
        }
    }
}
