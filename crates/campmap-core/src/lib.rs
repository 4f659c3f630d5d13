//! # Campmap Core
//!
//! Core types for the campmap editor.
//! Provides the placed-module data model, type-dependent metadata,
//! the document store contract and the error taxonomy shared by
//! every other crate.

pub mod diagnostics;
pub mod error;
pub mod metadata;
pub mod module;
pub mod store;

pub use diagnostics::EditorWarning;
pub use error::{ConsistencyError, Error, GeometryError, Result, ValidationError};
pub use metadata::{Metadata, MetadataValue};
pub use module::{
    create_module, next_z_index, normalize_degrees, validate_position, validate_size, Geometry,
    Module, ModulePatch, ModuleType, Position, Size,
};
pub use store::{DocumentStore, InMemoryStore};
