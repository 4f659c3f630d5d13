//! Move, resize, rotate and combined transform commands.
//!
//! All four capture old and new values at construction and write them as
//! partial updates. The target must still exist when they run; a vanished
//! module is a hard error, never a silent no-op.

use campmap_core::{
    validate_position, validate_size, DocumentStore, Error, Geometry, GeometryError, ModulePatch,
    Position, Result, Size,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shared old/new bookkeeping for the geometry commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeometryChange {
    module_id: String,
    old: ModulePatch,
    new: ModulePatch,
    /// `updatedAt` of the module right before the last execute.
    restore_stamp: Option<DateTime<Utc>>,
}

impl GeometryChange {
    fn new(module_id: String, old: ModulePatch, new: ModulePatch) -> Result<Self> {
        new.validate(&module_id)?;
        Ok(Self {
            module_id,
            old,
            new,
            restore_stamp: None,
        })
    }

    fn execute(&mut self, store: &mut dyn DocumentStore, command: &str) -> Result<()> {
        let module = store
            .get_module(&self.module_id)
            .ok_or_else(|| Error::vanished(&self.module_id, command))?;
        let stamp = module.updated_at;

        store.update_module(&self.module_id, &self.new);
        self.restore_stamp = Some(stamp);
        Ok(())
    }

    fn undo(&mut self, store: &mut dyn DocumentStore, command: &str) -> Result<()> {
        let Some(stamp) = self.restore_stamp else {
            return Ok(());
        };
        if !store.contains(&self.module_id) {
            return Err(Error::vanished(&self.module_id, command));
        }

        store.update_module(&self.module_id, &self.old.clone().stamped(stamp));
        self.restore_stamp = None;
        Ok(())
    }
}

/// Moves one module to a new top-left position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveCommand {
    from: Position,
    to: Position,
    change: GeometryChange,
}

impl MoveCommand {
    pub fn new(module_id: impl Into<String>, from: Position, to: Position) -> Result<Self> {
        let change = GeometryChange::new(
            module_id.into(),
            ModulePatch::position(from),
            ModulePatch::position(to),
        )?;
        Ok(Self { from, to, change })
    }

    pub fn name(&self) -> &str {
        "Move Module"
    }

    pub fn module_id(&self) -> &str {
        &self.change.module_id
    }

    pub fn from(&self) -> Position {
        self.from
    }

    pub fn to(&self) -> Position {
        self.to
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.change.execute(store, "Move Module")
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.change.undo(store, "Move Module")
    }
}

/// Resizes one module.
///
/// Dragging a top or left handle also moves the top-left corner, so the
/// position can be updated alongside the size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeCommand {
    old_size: Size,
    new_size: Size,
    change: GeometryChange,
}

impl ResizeCommand {
    pub fn new(module_id: impl Into<String>, old_size: Size, new_size: Size) -> Result<Self> {
        let change = GeometryChange::new(
            module_id.into(),
            ModulePatch::size(old_size),
            ModulePatch::size(new_size),
        )?;
        Ok(Self {
            old_size,
            new_size,
            change,
        })
    }

    pub fn with_position(
        module_id: impl Into<String>,
        old_size: Size,
        new_size: Size,
        old_position: Position,
        new_position: Position,
    ) -> Result<Self> {
        let old = ModulePatch {
            size: Some(old_size),
            position: Some(old_position),
            ..Default::default()
        };
        let new = ModulePatch {
            size: Some(new_size),
            position: Some(new_position),
            ..Default::default()
        };
        let change = GeometryChange::new(module_id.into(), old, new)?;
        Ok(Self {
            old_size,
            new_size,
            change,
        })
    }

    pub fn name(&self) -> &str {
        "Resize Module"
    }

    pub fn module_id(&self) -> &str {
        &self.change.module_id
    }

    pub fn old_size(&self) -> Size {
        self.old_size
    }

    pub fn new_size(&self) -> Size {
        self.new_size
    }

    /// New top-left, when the resize moves it.
    pub fn new_position(&self) -> Option<Position> {
        self.change.new.position
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.change.execute(store, "Resize Module")
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.change.undo(store, "Resize Module")
    }
}

/// Sets the rotation of one module, in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateCommand {
    old_rotation: f64,
    new_rotation: f64,
    change: GeometryChange,
}

impl RotateCommand {
    pub fn new(module_id: impl Into<String>, old_rotation: f64, new_rotation: f64) -> Result<Self> {
        let change = GeometryChange::new(
            module_id.into(),
            ModulePatch::rotation(old_rotation),
            ModulePatch::rotation(new_rotation),
        )?;
        Ok(Self {
            old_rotation,
            new_rotation,
            change,
        })
    }

    pub fn name(&self) -> &str {
        "Rotate Module"
    }

    pub fn module_id(&self) -> &str {
        &self.change.module_id
    }

    pub fn old_rotation(&self) -> f64 {
        self.old_rotation
    }

    pub fn new_rotation(&self) -> f64 {
        self.new_rotation
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.change.execute(store, "Rotate Module")
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.change.undo(store, "Rotate Module")
    }
}

/// Writes position, size and rotation in one step, as produced by an
/// interactive transform on the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformCommand {
    old: Geometry,
    new: Geometry,
    change: GeometryChange,
}

impl TransformCommand {
    pub fn new(module_id: impl Into<String>, old: Geometry, new: Geometry) -> Result<Self> {
        let module_id = module_id.into();
        validate_size(&module_id, new.size)?;
        validate_position(&module_id, new.position)?;
        if !new.rotation.is_finite() {
            return Err(GeometryError::NonFiniteRotation {
                id: module_id,
                rotation: new.rotation,
            }
            .into());
        }
        let change = GeometryChange::new(module_id, old.to_patch(), new.to_patch())?;
        Ok(Self { old, new, change })
    }

    pub fn name(&self) -> &str {
        "Transform Module"
    }

    pub fn module_id(&self) -> &str {
        &self.change.module_id
    }

    pub fn old(&self) -> Geometry {
        self.old
    }

    pub fn new_geometry(&self) -> Geometry {
        self.new
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.change.execute(store, "Transform Module")
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.change.undo(store, "Transform Module")
    }
}
