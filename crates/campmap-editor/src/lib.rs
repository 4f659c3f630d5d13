//! # Campmap Editor
//!
//! Interactive editing core for campground maps. Sits between a host UI and
//! the document store and guarantees that every change is undoable.
//!
//! ## Core Components
//!
//! - **Commands**: Reversible add, delete, move, resize, rotate, transform,
//!   reorder, metadata, property and batch mutations
//! - **History**: Bounded undo/redo stacks of commands
//! - **Scene**: Center-anchored scene groups built from module records, and
//!   the factory converting between the two coordinate conventions
//! - **Handles**: Resize and rotate math with grid snap, aspect lock and
//!   minimum size correction
//! - **Gesture**: Frame-throttled pointer state machine that commits one
//!   command per gesture
//!
//! ## Architecture
//!
//! ```text
//! MapEditor
//!   ├── InMemoryStore (modules, collection order)
//!   ├── UndoRedoManager (MapCommand stacks)
//!   ├── Scene (SceneGroup per module)
//!   │     └── ModuleFactory (create / update / extract)
//!   └── TransformGesture
//!         └── handles (compute_resize / compute_rotation)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use campmap_editor::MapEditor;
//! use campmap_core::{ModuleType, Position};
//!
//! let mut editor = MapEditor::default();
//! let id = editor.add_module(ModuleType::Campsite, Position::new(40.0, 40.0))?;
//! editor.rotate_module(&id, 90.0)?;
//! editor.undo()?;
//! ```

pub mod commands;
pub mod editor;
pub mod gesture;
pub mod handles;
pub mod history;
pub mod scene;

pub use commands::{
    AddCommand, BatchCommand, DeleteCommand, MapCommand, MoveCommand, PropertyChange,
    PropertyCommand, ReorderCommand, ResizeCommand, RotateCommand, TransformCommand,
    UpdateMetadataCommand,
};
pub use editor::MapEditor;
pub use gesture::{GesturePreview, TransformGesture};
pub use handles::{
    compute_resize, compute_rotation, Bounds, Handle, Modifiers, ResizeOutcome,
    TransformConstraints, ROTATE_HANDLE_OFFSET,
};
pub use history::{UndoRedoManager, DEFAULT_MAX_DEPTH};
pub use scene::{
    ControlSet, IconNode, ModuleFactory, Scene, SceneGroup, SceneNode, ShapeNode, SyncReport,
};
