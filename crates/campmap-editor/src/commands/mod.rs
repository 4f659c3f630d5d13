//! Reversible mutations of the document store.
//!
//! Every change to the map goes through a [`MapCommand`]. A command captures
//! whatever it needs for a symmetric undo, so `undo` after `execute` leaves
//! the store deep-equal to what it was before, `updatedAt` included.
//!
//! The command set is closed; hosts match on [`MapCommand`] rather than
//! implementing a trait.

mod add;
mod batch;
mod delete;
mod geometry;
mod metadata;
mod property;
mod reorder;

pub use add::AddCommand;
pub use batch::BatchCommand;
pub use delete::DeleteCommand;
pub use geometry::{MoveCommand, ResizeCommand, RotateCommand, TransformCommand};
pub use metadata::UpdateMetadataCommand;
pub use property::{PropertyChange, PropertyCommand};
pub use reorder::ReorderCommand;

use campmap_core::{DocumentStore, EditorWarning, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(clippy::large_enum_variant)]
pub enum MapCommand {
    Add(AddCommand),
    Delete(DeleteCommand),
    Move(MoveCommand),
    Resize(ResizeCommand),
    Rotate(RotateCommand),
    Transform(TransformCommand),
    Reorder(ReorderCommand),
    UpdateMetadata(UpdateMetadataCommand),
    Property(PropertyCommand),
    Batch(BatchCommand),
}

impl MapCommand {
    /// Name shown in the undo history.
    pub fn name(&self) -> &str {
        match self {
            MapCommand::Add(cmd) => cmd.name(),
            MapCommand::Delete(cmd) => cmd.name(),
            MapCommand::Move(cmd) => cmd.name(),
            MapCommand::Resize(cmd) => cmd.name(),
            MapCommand::Rotate(cmd) => cmd.name(),
            MapCommand::Transform(cmd) => cmd.name(),
            MapCommand::Reorder(cmd) => cmd.name(),
            MapCommand::UpdateMetadata(cmd) => cmd.name(),
            MapCommand::Property(cmd) => cmd.name(),
            MapCommand::Batch(cmd) => cmd.name(),
        }
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        tracing::debug!("execute: {}", self.name());
        match self {
            MapCommand::Add(cmd) => cmd.execute(store),
            MapCommand::Delete(cmd) => cmd.execute(store),
            MapCommand::Move(cmd) => cmd.execute(store),
            MapCommand::Resize(cmd) => cmd.execute(store),
            MapCommand::Rotate(cmd) => cmd.execute(store),
            MapCommand::Transform(cmd) => cmd.execute(store),
            MapCommand::Reorder(cmd) => cmd.execute(store),
            MapCommand::UpdateMetadata(cmd) => cmd.execute(store),
            MapCommand::Property(cmd) => cmd.execute(store),
            MapCommand::Batch(cmd) => cmd.execute(store),
        }
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        tracing::debug!("undo: {}", self.name());
        match self {
            MapCommand::Add(cmd) => cmd.undo(store),
            MapCommand::Delete(cmd) => cmd.undo(store),
            MapCommand::Move(cmd) => cmd.undo(store),
            MapCommand::Resize(cmd) => cmd.undo(store),
            MapCommand::Rotate(cmd) => cmd.undo(store),
            MapCommand::Transform(cmd) => cmd.undo(store),
            MapCommand::Reorder(cmd) => cmd.undo(store),
            MapCommand::UpdateMetadata(cmd) => cmd.undo(store),
            MapCommand::Property(cmd) => cmd.undo(store),
            MapCommand::Batch(cmd) => cmd.undo(store),
        }
    }

    /// Warnings raised by this command itself.
    pub fn warnings(&self) -> &[EditorWarning] {
        match self {
            MapCommand::Add(cmd) => cmd.warnings(),
            MapCommand::Delete(cmd) => cmd.warnings(),
            MapCommand::Reorder(cmd) => cmd.warnings(),
            MapCommand::Property(cmd) => cmd.warnings(),
            MapCommand::Batch(cmd) => cmd.warnings(),
            MapCommand::Move(_)
            | MapCommand::Resize(_)
            | MapCommand::Rotate(_)
            | MapCommand::Transform(_)
            | MapCommand::UpdateMetadata(_) => &[],
        }
    }

    /// Warnings of this command and, for batches, of every member.
    pub fn all_warnings(&self) -> Vec<EditorWarning> {
        let mut out = self.warnings().to_vec();
        if let MapCommand::Batch(batch) = self {
            for cmd in batch.commands() {
                out.extend(cmd.all_warnings());
            }
        }
        out
    }

    /// Ids of the modules this command touches, without duplicates.
    pub fn affected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = match self {
            MapCommand::Add(cmd) => cmd.module_ids(),
            MapCommand::Delete(cmd) => cmd.module_ids(),
            MapCommand::Move(cmd) => vec![cmd.module_id().to_string()],
            MapCommand::Resize(cmd) => vec![cmd.module_id().to_string()],
            MapCommand::Rotate(cmd) => vec![cmd.module_id().to_string()],
            MapCommand::Transform(cmd) => vec![cmd.module_id().to_string()],
            MapCommand::Reorder(cmd) => vec![cmd.module_id().to_string()],
            MapCommand::UpdateMetadata(cmd) => vec![cmd.module_id().to_string()],
            MapCommand::Property(cmd) => cmd
                .changes()
                .iter()
                .map(|c| c.module_id.clone())
                .collect(),
            MapCommand::Batch(cmd) => cmd
                .commands()
                .iter()
                .flat_map(|c| c.affected_ids())
                .collect(),
        };
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));
        ids
    }
}

macro_rules! impl_from_command {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for MapCommand {
                fn from(cmd: $ty) -> Self {
                    MapCommand::$variant(cmd)
                }
            }
        )*
    };
}

impl_from_command!(
    Add => AddCommand,
    Delete => DeleteCommand,
    Move => MoveCommand,
    Resize => ResizeCommand,
    Rotate => RotateCommand,
    Transform => TransformCommand,
    Reorder => ReorderCommand,
    UpdateMetadata => UpdateMetadataCommand,
    Property => PropertyCommand,
    Batch => BatchCommand,
);

/// Records a warning on `sink` and logs it.
pub(crate) fn warn(sink: &mut Vec<EditorWarning>, warning: EditorWarning) {
    warning.emit();
    sink.push(warning);
}
