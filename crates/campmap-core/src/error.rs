//! Error handling for campmap
//!
//! Provides error types for every layer of the editor core:
//! - Validation errors (malformed command input, rejected at construction)
//! - Consistency errors (a target module vanished before execute/undo)
//! - Geometry errors (non-finite or non-positive size, position, scale)
//!
//! Soft conditions (duplicates, missing ids, clamped values) are not errors;
//! they are reported through [`crate::diagnostics::EditorWarning`].
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Validation error type
///
/// Raised while constructing a command. A command that fails validation is
/// never handed to the history.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A command was given an empty module list
    #[error("Module list is empty")]
    EmptyModuleList,

    /// Every module handed to an add was already present
    #[error("All {count} module(s) already exist; nothing to add")]
    AllDuplicates {
        /// Number of modules that were rejected as duplicates.
        count: usize,
    },

    /// A z-index value was not a finite number
    #[error("Non-numeric z-index for {field}: {value}")]
    NonNumericZIndex {
        /// Which value was rejected (`old` or `new`).
        field: String,
        /// The rejected value, formatted.
        value: String,
    },

    /// The command targets a module that is not in the store
    #[error("Module not found: {id}")]
    ModuleNotFound {
        /// The missing module id.
        id: String,
    },
}

/// Consistency error type
///
/// Raised when the store changed between command construction and
/// execute/undo in a way the command cannot tolerate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsistencyError {
    /// The target module disappeared before the command ran
    #[error("{command}: module {id} no longer exists")]
    ModuleVanished {
        /// The missing module id.
        id: String,
        /// Name of the command that tried to use it.
        command: String,
    },
}

/// Geometry error type
///
/// Invalid geometry is never allowed to reach the store or the scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Width or height is NaN or infinite
    #[error("Size of {id} is not finite: {width} x {height}")]
    NonFiniteSize {
        /// The module id.
        id: String,
        /// Offending width.
        width: f64,
        /// Offending height.
        height: f64,
    },

    /// Width or height is zero or negative
    #[error("Size of {id} must be positive: {width} x {height}")]
    NonPositiveSize {
        /// The module id.
        id: String,
        /// Offending width.
        width: f64,
        /// Offending height.
        height: f64,
    },

    /// Position is NaN or infinite
    #[error("Position of {id} is not finite: ({x}, {y})")]
    NonFinitePosition {
        /// The module id.
        id: String,
        /// Offending x.
        x: f64,
        /// Offending y.
        y: f64,
    },

    /// Position is left of or above the map origin
    #[error("Position of {id} must be non-negative: ({x}, {y})")]
    NegativePosition {
        /// The module id.
        id: String,
        /// Offending x.
        x: f64,
        /// Offending y.
        y: f64,
    },

    /// Rotation is NaN or infinite
    #[error("Rotation of {id} is not finite: {rotation}")]
    NonFiniteRotation {
        /// The module id.
        id: String,
        /// Offending angle in degrees.
        rotation: f64,
    },

    /// A scene group carries a zero, negative or non-finite scale
    #[error("Invalid scale on {id}: ({scale_x}, {scale_y})")]
    InvalidScale {
        /// The module id.
        id: String,
        /// Horizontal scale factor.
        scale_x: f64,
        /// Vertical scale factor.
        scale_y: f64,
    },

    /// A scene group center is non-finite or not positive
    #[error("Invalid center on {id}: ({left}, {top})")]
    InvalidCenter {
        /// The module id.
        id: String,
        /// Center x.
        left: f64,
        /// Center y.
        top: f64,
    },

    /// A scene group's intrinsic size is zero, negative or non-finite
    #[error("Invalid intrinsic size on {id}: {width} x {height}")]
    InvalidIntrinsicSize {
        /// The module id.
        id: String,
        /// Intrinsic width.
        width: f64,
        /// Intrinsic height.
        height: f64,
    },
}

/// Main error type for campmap
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Consistency error
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Every member of a batch failed
    #[error("Batch '{name}' failed: {}", failures.join("; "))]
    BatchFailed {
        /// Batch name.
        name: String,
        /// Error messages of the failed members.
        failures: Vec<String>,
    },

    /// A transform gesture was started on a locked module
    #[error("Module {id} is locked")]
    ModuleLocked {
        /// The locked module id.
        id: String,
    },
}

impl Error {
    /// Shorthand for a vanished-module consistency error
    pub fn vanished(id: impl Into<String>, command: impl Into<String>) -> Self {
        Error::Consistency(ConsistencyError::ModuleVanished {
            id: id.into(),
            command: command.into(),
        })
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a consistency error
    pub fn is_consistency_error(&self) -> bool {
        matches!(self, Error::Consistency(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::vanished("site-1", "Update Metadata");
        assert_eq!(
            err.to_string(),
            "Update Metadata: module site-1 no longer exists"
        );

        let err: Error = ValidationError::NonNumericZIndex {
            field: "new".to_string(),
            value: "NaN".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Non-numeric z-index for new: NaN");
    }

    #[test]
    fn test_error_classification() {
        let err: Error = ValidationError::EmptyModuleList.into();
        assert!(err.is_validation_error());
        assert!(!err.is_geometry_error());

        let err: Error = GeometryError::NonPositiveSize {
            id: "a".to_string(),
            width: 0.0,
            height: 10.0,
        }
        .into();
        assert!(err.is_geometry_error());

        assert!(Error::vanished("a", "Move").is_consistency_error());
    }

    #[test]
    fn test_batch_failed_lists_members() {
        let err = Error::BatchFailed {
            name: "Align".to_string(),
            failures: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "Batch 'Align' failed: first; second");
    }
}
