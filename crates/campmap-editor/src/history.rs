//! Undo/redo history.

use std::collections::VecDeque;

use campmap_core::{DocumentStore, Result};

use crate::commands::MapCommand;

/// Default number of undo steps kept.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Bounded undo and redo stacks of [`MapCommand`]s.
#[derive(Debug, Clone)]
pub struct UndoRedoManager {
    undo_stack: VecDeque<MapCommand>,
    redo_stack: Vec<MapCommand>,
    max_depth: usize,
}

impl Default for UndoRedoManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl UndoRedoManager {
    /// A depth of zero is treated as one.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Executes `cmd` and pushes it onto the undo stack.
    ///
    /// A command that fails is dropped and the history is left untouched.
    pub fn execute(&mut self, mut cmd: MapCommand, store: &mut dyn DocumentStore) -> Result<()> {
        cmd.execute(store)?;
        self.record(cmd);
        Ok(())
    }

    /// Pushes a command that has already been applied.
    pub fn record(&mut self, cmd: MapCommand) {
        tracing::debug!("history: recorded {}", cmd.name());
        self.undo_stack.push_back(cmd);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Undoes the most recent command and returns its name.
    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<Option<String>> {
        let Some(mut cmd) = self.undo_stack.pop_back() else {
            return Ok(None);
        };
        if let Err(e) = cmd.undo(store) {
            tracing::warn!("history: undo of {} failed: {}", cmd.name(), e);
            self.undo_stack.push_back(cmd);
            return Err(e);
        }
        let name = cmd.name().to_string();
        self.redo_stack.push(cmd);
        Ok(Some(name))
    }

    /// Re-applies the most recently undone command and returns its name.
    pub fn redo(&mut self, store: &mut dyn DocumentStore) -> Result<Option<String>> {
        let Some(mut cmd) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(e) = cmd.execute(store) {
            tracing::warn!("history: redo of {} failed: {}", cmd.name(), e);
            self.redo_stack.push(cmd);
            return Err(e);
        }
        let name = cmd.name().to_string();
        self.undo_stack.push_back(cmd);
        Ok(Some(name))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Names on the undo stack, most recent first.
    pub fn undo_names(&self) -> Vec<String> {
        self.undo_stack
            .iter()
            .rev()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn peek_undo_name(&self) -> Option<&str> {
        self.undo_stack.back().map(MapCommand::name)
    }

    pub fn peek_redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(MapCommand::name)
    }

    /// Most recent command on the undo stack.
    pub fn last(&self) -> Option<&MapCommand> {
        self.undo_stack.back()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::RotateCommand;
    use campmap_core::{InMemoryStore, Module, ModuleType, Position};

    fn store() -> InMemoryStore {
        InMemoryStore::from_modules(vec![Module::with_id(
            "a",
            ModuleType::Road,
            Position::new(0.0, 0.0),
        )])
    }

    fn rotate(to: f64) -> MapCommand {
        RotateCommand::new("a", 0.0, to).unwrap().into()
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut store = store();
        let mut history = UndoRedoManager::new(2);
        for angle in [10.0, 20.0, 30.0] {
            history.execute(rotate(angle), &mut store).unwrap();
        }
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut store = store();
        let mut history = UndoRedoManager::default();
        history.execute(rotate(10.0), &mut store).unwrap();
        history.undo(&mut store).unwrap();
        assert!(history.can_redo());

        history.execute(rotate(20.0), &mut store).unwrap();
        assert!(!history.can_redo());
    }

    #[test]
    fn test_failed_undo_keeps_command() {
        let mut store = store();
        let mut history = UndoRedoManager::default();
        history.execute(rotate(10.0), &mut store).unwrap();
        store.remove_module("a");

        assert!(history.undo(&mut store).is_err());
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.peek_undo_name(), Some("Rotate Module"));
    }

    #[test]
    fn test_failed_execute_is_not_recorded() {
        let mut store = InMemoryStore::new();
        let mut history = UndoRedoManager::default();
        assert!(history.execute(rotate(10.0), &mut store).is_err());
        assert!(!history.can_undo());
    }
}
