//! Interactive resize and rotate gestures.
//!
//! A gesture starts on a handle, follows the pointer and ends with exactly
//! one command. Pointer events only queue the latest position; the preview
//! is computed on the next animation frame, so a burst of move events costs
//! one computation per frame.

use campmap_core::{EditorWarning, Error, Geometry, Module, Result};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::commands::{MapCommand, ResizeCommand, RotateCommand};
use crate::handles::{
    compute_resize, compute_rotation, Bounds, Handle, Modifiers, TransformConstraints,
};

/// Geometry a module would have if the gesture ended now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GesturePreview {
    pub module_id: String,
    pub geometry: Geometry,
    /// The size was raised to the configured minimum.
    pub corrected: bool,
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    module_id: String,
    handle: Handle,
    start: Point2<f64>,
    snapshot: Geometry,
    pending: Option<(Point2<f64>, Modifiers)>,
    preview: Option<GesturePreview>,
}

/// State machine for one transform gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct TransformGesture {
    constraints: TransformConstraints,
    active: Option<ActiveGesture>,
    frame_requested: bool,
    previews_computed: u64,
    warnings: Vec<EditorWarning>,
}

impl TransformGesture {
    pub fn new(constraints: TransformConstraints) -> Self {
        Self {
            constraints,
            ..Default::default()
        }
    }

    pub fn constraints(&self) -> &TransformConstraints {
        &self.constraints
    }

    pub fn set_constraints(&mut self, constraints: TransformConstraints) {
        self.constraints = constraints;
    }

    /// Starts dragging `handle` of `module` from `pointer`.
    ///
    /// Locked modules are refused. A gesture already in progress is
    /// cancelled first.
    pub fn begin(&mut self, module: &Module, handle: Handle, pointer: Point2<f64>) -> Result<()> {
        if module.locked {
            return Err(Error::ModuleLocked {
                id: module.id.clone(),
            });
        }
        module.validate_geometry()?;

        if let Some(previous) = &self.active {
            tracing::warn!(
                "gesture on {} still active, cancelling before starting a new one",
                previous.module_id
            );
            self.cancel();
        }

        tracing::debug!("gesture: begin {:?} on {}", handle, module.id);
        self.warnings.clear();
        self.active = Some(ActiveGesture {
            module_id: module.id.clone(),
            handle,
            start: pointer,
            snapshot: module.geometry(),
            pending: None,
            preview: None,
        });
        Ok(())
    }

    /// Queues the latest pointer position.
    ///
    /// Returns `true` when this call requested a new animation frame; further
    /// moves before that frame only replace the queued position.
    pub fn pointer_move(&mut self, pointer: Point2<f64>, modifiers: Modifiers) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        active.pending = Some((pointer, modifiers));
        if self.frame_requested {
            false
        } else {
            self.frame_requested = true;
            true
        }
    }

    /// Computes at most one preview from the queued pointer.
    pub fn animation_frame(&mut self) -> Option<&GesturePreview> {
        self.frame_requested = false;
        let constraints = &self.constraints;
        let active = self.active.as_mut()?;
        let (pointer, modifiers) = active.pending.take()?;

        active.preview = Some(preview_for(active, constraints, pointer, modifiers));
        self.previews_computed += 1;
        active.preview.as_ref()
    }

    /// Ends the gesture and returns the command describing it.
    ///
    /// A queued pointer position is applied first. `None` when the module
    /// ended where it started.
    pub fn pointer_up(&mut self) -> Option<MapCommand> {
        self.finish()
    }

    /// The pointer left the canvas mid-drag; commits like [`Self::pointer_up`].
    pub fn pointer_leave(&mut self) -> Option<MapCommand> {
        self.finish()
    }

    /// Abandons the gesture without producing a command.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!("gesture: cancelled on {}", active.module_id);
        }
        self.frame_requested = false;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether pointer listeners should be attached.
    pub fn is_listening(&self) -> bool {
        self.is_active()
    }

    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    pub fn active_handle(&self) -> Option<Handle> {
        self.active.as_ref().map(|a| a.handle)
    }

    pub fn active_module_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.module_id.as_str())
    }

    pub fn preview(&self) -> Option<&GesturePreview> {
        self.active.as_ref().and_then(|a| a.preview.as_ref())
    }

    /// Number of previews computed since creation.
    pub fn previews_computed(&self) -> u64 {
        self.previews_computed
    }

    /// Warnings raised by the last committed gesture.
    pub fn warnings(&self) -> &[EditorWarning] {
        &self.warnings
    }

    fn finish(&mut self) -> Option<MapCommand> {
        self.frame_requested = false;
        let mut active = self.active.take()?;
        if let Some((pointer, modifiers)) = active.pending.take() {
            active.preview = Some(preview_for(&active, &self.constraints, pointer, modifiers));
            self.previews_computed += 1;
        }

        let preview = active.preview?;
        if preview.corrected {
            let warning = EditorWarning::MinimumSizeApplied {
                width: preview.geometry.size.width,
                height: preview.geometry.size.height,
            };
            tracing::debug!("gesture: {}", warning);
            self.warnings.push(warning);
        }

        let old = active.snapshot;
        let new = preview.geometry;
        if old == new {
            return None;
        }

        let built = if active.handle == Handle::Rotate {
            RotateCommand::new(&active.module_id, old.rotation, new.rotation).map(MapCommand::from)
        } else if old.position == new.position {
            ResizeCommand::new(&active.module_id, old.size, new.size).map(MapCommand::from)
        } else {
            ResizeCommand::with_position(
                &active.module_id,
                old.size,
                new.size,
                old.position,
                new.position,
            )
            .map(MapCommand::from)
        };

        match built {
            Ok(cmd) => {
                tracing::debug!("gesture: committing {}", cmd.name());
                Some(cmd)
            }
            Err(e) => {
                tracing::warn!("gesture on {} produced no command: {}", active.module_id, e);
                None
            }
        }
    }
}

fn preview_for(
    active: &ActiveGesture,
    constraints: &TransformConstraints,
    pointer: Point2<f64>,
    modifiers: Modifiers,
) -> GesturePreview {
    let snapshot = Bounds::from_geometry(&active.snapshot);

    if active.handle == Handle::Rotate {
        let angle = compute_rotation(
            &snapshot,
            active.snapshot.rotation,
            active.start,
            pointer,
            constraints,
            modifiers,
        );
        return GesturePreview {
            module_id: active.module_id.clone(),
            geometry: Geometry::new(active.snapshot.position, active.snapshot.size, angle),
            corrected: false,
        };
    }

    let outcome = compute_resize(
        &snapshot,
        active.snapshot.rotation,
        active.handle,
        active.start,
        pointer,
        constraints,
        modifiers,
    );
    let mut geometry = outcome.bounds.to_geometry(active.snapshot.rotation);
    let mut corrected = outcome.corrected;

    // Whatever crosses the map origin is cut off so the far edges stay put.
    if geometry.position.x < 0.0 {
        geometry.size.width += geometry.position.x;
        geometry.position.x = 0.0;
    }
    if geometry.position.y < 0.0 {
        geometry.size.height += geometry.position.y;
        geometry.position.y = 0.0;
    }
    if geometry.size.width < constraints.min_width {
        geometry.size.width = constraints.min_width;
        corrected = true;
    }
    if geometry.size.height < constraints.min_height {
        geometry.size.height = constraints.min_height;
        corrected = true;
    }

    GesturePreview {
        module_id: active.module_id.clone(),
        geometry,
        corrected,
    }
}
