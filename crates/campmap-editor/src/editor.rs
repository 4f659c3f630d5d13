//! Editor facade tying the store, history, scene and gestures together.
//!
//! Every mutation here is expressed as a [`MapCommand`], run through the
//! history and followed by a scene sync. Hosts that need finer control can
//! build commands themselves and pass them to [`MapEditor::apply`].

use campmap_core::{
    create_module, DocumentStore, EditorWarning, Error, InMemoryStore, Metadata, Module,
    ModulePatch, ModuleType, Position, Result, ValidationError,
};
use campmap_settings::EditorSettings;
use nalgebra::Point2;

use crate::commands::{
    AddCommand, DeleteCommand, MapCommand, MoveCommand, PropertyCommand, ReorderCommand,
    RotateCommand, TransformCommand, UpdateMetadataCommand,
};
use crate::gesture::{GesturePreview, TransformGesture};
use crate::handles::{Bounds, Handle, Modifiers, TransformConstraints};
use crate::history::UndoRedoManager;
use crate::scene::{ModuleFactory, Scene, SyncReport};

pub struct MapEditor {
    store: InMemoryStore,
    scene: Scene,
    history: UndoRedoManager,
    factory: ModuleFactory,
    settings: EditorSettings,
    gesture: TransformGesture,
    last_sync: SyncReport,
}

impl MapEditor {
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_modules(settings, Vec::new())
    }

    /// Opens an editor on an existing layout.
    pub fn with_modules(settings: EditorSettings, modules: Vec<Module>) -> Self {
        let mut editor = Self {
            store: InMemoryStore::from_modules(modules),
            scene: Scene::new(),
            history: UndoRedoManager::new(settings.history.max_depth),
            factory: ModuleFactory::new(settings.appearance.clone()),
            gesture: TransformGesture::new(TransformConstraints::from_settings(&settings)),
            settings,
            last_sync: SyncReport::default(),
        };
        editor.sync();
        editor
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &UndoRedoManager {
        &self.history
    }

    pub fn gesture(&self) -> &TransformGesture {
        &self.gesture
    }

    /// Report of the most recent scene sync.
    pub fn last_sync(&self) -> &SyncReport {
        &self.last_sync
    }

    /// Runs `cmd` through the history and returns the warnings it raised.
    pub fn apply(&mut self, cmd: impl Into<MapCommand>) -> Result<Vec<EditorWarning>> {
        let result = self.history.execute(cmd.into(), &mut self.store);
        self.sync();
        result?;

        Ok(self
            .history
            .last()
            .map(MapCommand::all_warnings)
            .unwrap_or_default())
    }

    pub fn undo(&mut self) -> Result<Option<String>> {
        self.gesture.cancel();
        let result = self.history.undo(&mut self.store);
        self.sync();
        result
    }

    pub fn redo(&mut self) -> Result<Option<String>> {
        self.gesture.cancel();
        let result = self.history.redo(&mut self.store);
        self.sync();
        result
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Places a new module with the type's defaults and returns its id.
    pub fn add_module(&mut self, module_type: ModuleType, position: Position) -> Result<String> {
        let module = create_module(module_type, position, None);
        let id = module.id.clone();
        self.apply(AddCommand::single(module)?)?;
        Ok(id)
    }

    pub fn delete_modules(&mut self, ids: &[String]) -> Result<Vec<EditorWarning>> {
        let cmd = DeleteCommand::from_ids(&self.store, ids)?;
        self.apply(cmd)
    }

    pub fn move_module(&mut self, id: &str, to: Position) -> Result<()> {
        let from = self.unlocked(id)?.position;
        self.apply(MoveCommand::new(id, from, to)?)?;
        Ok(())
    }

    pub fn rotate_module(&mut self, id: &str, degrees: f64) -> Result<()> {
        let from = self.unlocked(id)?.rotation;
        self.apply(RotateCommand::new(id, from, degrees)?)?;
        Ok(())
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) -> Result<()> {
        self.module(id)?;
        let name = if locked { "Lock Module" } else { "Unlock Module" };
        let cmd = PropertyCommand::from_store(
            name,
            &self.store,
            vec![(id.to_string(), ModulePatch::locked(locked))],
        )?;
        self.apply(cmd)?;
        Ok(())
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<()> {
        self.module(id)?;
        let name = if visible { "Show Module" } else { "Hide Module" };
        let cmd = PropertyCommand::from_store(
            name,
            &self.store,
            vec![(id.to_string(), ModulePatch::visible(visible))],
        )?;
        self.apply(cmd)?;
        Ok(())
    }

    /// Shallow-merges `changes` into the module's metadata.
    pub fn update_metadata(&mut self, id: &str, changes: &Metadata) -> Result<()> {
        let cmd = UpdateMetadataCommand::merge(&self.store, id, changes)?;
        self.apply(cmd)?;
        Ok(())
    }

    pub fn bring_to_front(&mut self, id: &str) -> Result<()> {
        let top = self.store.max_z_index().unwrap_or(0);
        if self.module(id)?.z_index == top {
            return Ok(());
        }
        let cmd = ReorderCommand::from_store(&self.store, id, top.saturating_add(1) as f64)?;
        self.apply(cmd)?;
        Ok(())
    }

    pub fn send_to_back(&mut self, id: &str) -> Result<()> {
        let bottom = self.store.min_z_index().unwrap_or(0);
        if self.module(id)?.z_index == bottom {
            return Ok(());
        }
        let target = bottom.saturating_sub(1).max(0);
        let cmd = ReorderCommand::from_store(&self.store, id, target as f64)?;
        self.apply(cmd)?;
        Ok(())
    }

    /// Topmost module under `p`.
    pub fn hit_test(&self, p: Point2<f64>) -> Option<&str> {
        self.scene.hit_test(p).map(|g| g.module_id.as_str())
    }

    /// Handle of module `id` under `p`, if any.
    pub fn handle_at(&self, id: &str, p: Point2<f64>, tolerance: f64) -> Option<Handle> {
        let module = self.store.get_module(id)?;
        let bounds = Bounds::from_geometry(&module.geometry());
        Handle::handle_at(p, &bounds, module.rotation, tolerance)
    }

    pub fn begin_gesture(&mut self, id: &str, handle: Handle, pointer: Point2<f64>) -> Result<()> {
        let module = self
            .store
            .get_module(id)
            .ok_or_else(|| ValidationError::ModuleNotFound { id: id.to_string() })?;
        self.gesture.begin(module, handle, pointer)
    }

    /// Queues a pointer position. Returns `true` when a frame should be
    /// scheduled.
    pub fn pointer_move(&mut self, pointer: Point2<f64>, modifiers: Modifiers) -> bool {
        self.gesture.pointer_move(pointer, modifiers)
    }

    /// Computes the pending preview and shows it on the scene.
    pub fn animation_frame(&mut self) -> Option<GesturePreview> {
        let preview = self.gesture.animation_frame()?.clone();
        if let Some(group) = self.scene.get_mut(&preview.module_id) {
            if let Err(e) = group.set_geometry(&preview.geometry) {
                tracing::warn!("preview for {} not shown: {}", preview.module_id, e);
            }
        }
        Some(preview)
    }

    /// Ends the gesture, committing it as one undoable command. Returns the
    /// name of the committed command.
    pub fn end_gesture(&mut self) -> Result<Option<String>> {
        match self.gesture.pointer_up() {
            Some(cmd) => {
                let name = cmd.name().to_string();
                self.apply(cmd)?;
                Ok(Some(name))
            }
            None => {
                self.sync();
                Ok(None)
            }
        }
    }

    /// Drops the gesture and restores the scene from the store.
    pub fn cancel_gesture(&mut self) {
        self.gesture.cancel();
        self.sync();
    }

    pub fn preview(&self) -> Option<&GesturePreview> {
        self.gesture.preview()
    }

    /// Commits whatever transform a host applied directly to the scene group
    /// of `id`, reading it back through the factory.
    pub fn apply_scene_transform(&mut self, id: &str) -> Result<()> {
        let old = self.unlocked(id)?.geometry();
        let group = self
            .scene
            .get(id)
            .ok_or_else(|| ValidationError::ModuleNotFound { id: id.to_string() })?;
        let new = self.factory.extract(group)?;
        if new == old {
            return Ok(());
        }
        self.apply(TransformCommand::new(id, old, new)?)?;
        Ok(())
    }

    fn module(&self, id: &str) -> Result<&Module> {
        self.store
            .get_module(id)
            .ok_or_else(|| ValidationError::ModuleNotFound { id: id.to_string() }.into())
    }

    fn unlocked(&self, id: &str) -> Result<&Module> {
        let module = self.module(id)?;
        if module.locked {
            return Err(Error::ModuleLocked { id: id.to_string() });
        }
        Ok(module)
    }

    fn sync(&mut self) {
        self.last_sync = self.scene.sync(&self.store, &self.factory);
    }
}

impl Default for MapEditor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_module_shows_in_scene_and_undoes() {
        let mut editor = MapEditor::default();
        let id = editor
            .add_module(ModuleType::Campsite, Position::new(10.0, 10.0))
            .unwrap();
        assert!(editor.scene().get(&id).is_some());

        assert_eq!(editor.undo().unwrap().as_deref(), Some("Add Module"));
        assert!(editor.scene().is_empty());
        assert!(editor.store().is_empty());
    }

    #[test]
    fn test_locked_module_cannot_move() {
        let mut editor = MapEditor::default();
        let id = editor
            .add_module(ModuleType::Toilet, Position::new(0.0, 0.0))
            .unwrap();
        editor.set_locked(&id, true).unwrap();

        let err = editor.move_module(&id, Position::new(5.0, 5.0)).unwrap_err();
        assert!(matches!(err, Error::ModuleLocked { .. }));
        assert!(editor.scene().get(&id).unwrap().has_lock_badge());
    }

    #[test]
    fn test_bring_to_front_changes_draw_order() {
        let mut a = Module::with_id("a", ModuleType::Parking, Position::new(0.0, 0.0));
        let mut b = Module::with_id("b", ModuleType::Parking, Position::new(0.0, 0.0));
        a.z_index = 1;
        b.z_index = 2;
        let mut editor = MapEditor::with_modules(EditorSettings::default(), vec![a, b]);
        assert_eq!(editor.hit_test(Point2::new(5.0, 5.0)), Some("b"));

        editor.bring_to_front("a").unwrap();
        assert_eq!(editor.hit_test(Point2::new(5.0, 5.0)), Some("a"));

        editor.undo().unwrap();
        assert_eq!(editor.hit_test(Point2::new(5.0, 5.0)), Some("b"));
    }
}
