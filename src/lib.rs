//! # Campmap
//!
//! Editing core for campground maps: placed modules such as campsites,
//! restrooms and roads, edited through reversible commands and shown on an
//! interactive scene with resize and rotate handles.
//!
//! ## Architecture
//!
//! Campmap is organized as a workspace with multiple crates:
//!
//! 1. **campmap-core** - Module records, metadata, document store, errors
//! 2. **campmap-settings** - Grid, transform, appearance and history settings
//! 3. **campmap-editor** - Commands, undo/redo, scene sync, transform handles
//! 4. **campmap** - Facade re-exporting the above plus logging setup
//!
//! ## Features
//!
//! - **Undoable Edits**: Every mutation is a command with a symmetric undo
//! - **Scene Sync**: Center-anchored scene groups kept in step with the store
//! - **Transform Handles**: Grid snapping, aspect lock and minimum size
//!   enforcement during interactive resize and rotate

pub use campmap_core as core;
pub use campmap_editor as editor;
pub use campmap_settings as settings;

pub use campmap_core::{
    create_module, DocumentStore, EditorWarning, Error, Geometry, InMemoryStore, Metadata,
    MetadataValue, Module, ModulePatch, ModuleType, Position, Result, Size,
};
pub use campmap_editor::{
    BatchCommand, Handle, MapCommand, MapEditor, ModuleFactory, Modifiers, Scene, SceneGroup,
    TransformConstraints, UndoRedoManager,
};
pub use campmap_settings::EditorSettings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, `info` when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

/// Initialize logging as one JSON object per line, for hosts that ship
/// logs to a collector.
pub fn init_json_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_current_span(false))
        .try_init()?;
    Ok(())
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}
