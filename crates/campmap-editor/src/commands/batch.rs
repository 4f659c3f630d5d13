use campmap_core::{DocumentStore, EditorWarning, Error, Result};
use serde::{Deserialize, Serialize};

use super::{warn, MapCommand};

/// Runs several commands as a single undo step.
///
/// Members execute front to back and undo back to front. A failing member
/// does not stop the rest; it is reported as a warning and left out of the
/// undo. Only when every member fails does the batch itself fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCommand {
    name: String,
    commands: Vec<MapCommand>,
    applied: Vec<usize>,
    warnings: Vec<EditorWarning>,
}

impl BatchCommand {
    /// An empty batch is allowed and reported as a warning.
    pub fn new(name: impl Into<String>, commands: Vec<MapCommand>) -> Self {
        let name = name.into();
        let mut warnings = Vec::new();
        if commands.is_empty() {
            warn(&mut warnings, EditorWarning::EmptyBatch { name: name.clone() });
        }
        Self {
            name,
            commands,
            applied: Vec::new(),
            warnings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    pub fn warnings(&self) -> &[EditorWarning] {
        &self.warnings
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.applied.clear();
        self.warnings.retain(|w| matches!(w, EditorWarning::EmptyBatch { .. }));

        let mut failures = Vec::new();
        for (i, cmd) in self.commands.iter_mut().enumerate() {
            match cmd.execute(store) {
                Ok(()) => self.applied.push(i),
                Err(e) => {
                    tracing::error!("{}: member '{}' failed: {}", self.name, cmd.name(), e);
                    self.warnings.push(EditorWarning::SubcommandFailed {
                        name: cmd.name().to_string(),
                        error: e.to_string(),
                    });
                    failures.push(e.to_string());
                }
            }
        }

        if !self.commands.is_empty() && self.applied.is_empty() {
            return Err(Error::BatchFailed {
                name: self.name.clone(),
                failures,
            });
        }
        Ok(())
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        while let Some(i) = self.applied.pop() {
            if let Err(e) = self.commands[i].undo(store) {
                // The failed member and everything before it stay applied.
                self.applied.push(i);
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{MoveCommand, RotateCommand};
    use campmap_core::{InMemoryStore, Module, ModuleType, Position};

    fn store() -> InMemoryStore {
        InMemoryStore::from_modules(vec![Module::with_id(
            "a",
            ModuleType::Campsite,
            Position::new(0.0, 0.0),
        )])
    }

    #[test]
    fn test_empty_batch_warns() {
        let batch = BatchCommand::new("Nothing", Vec::new());
        assert!(batch.is_empty());
        assert_eq!(
            batch.warnings(),
            [EditorWarning::EmptyBatch {
                name: "Nothing".to_string()
            }]
        );
    }

    #[test]
    fn test_round_trip() {
        let mut store = store();
        let before = store.clone();
        let mut batch = BatchCommand::new(
            "Move and rotate",
            vec![
                MoveCommand::new("a", Position::new(0.0, 0.0), Position::new(5.0, 5.0))
                    .unwrap()
                    .into(),
                RotateCommand::new("a", 0.0, 90.0).unwrap().into(),
            ],
        );
        assert_eq!(batch.len(), 2);

        batch.execute(&mut store).unwrap();
        let m = store.get_module("a").unwrap();
        assert_eq!(m.position, Position::new(5.0, 5.0));
        assert_eq!(m.rotation, 90.0);

        batch.undo(&mut store).unwrap();
        assert_eq!(store, before);
    }

    #[test]
    fn test_member_failure_is_reported_and_rest_applies() {
        let mut store = store();
        let mut batch = BatchCommand::new(
            "Mixed",
            vec![
                RotateCommand::new("gone", 0.0, 10.0).unwrap().into(),
                RotateCommand::new("a", 0.0, 10.0).unwrap().into(),
            ],
        );

        batch.execute(&mut store).unwrap();
        assert_eq!(store.get_module("a").unwrap().rotation, 10.0);
        assert!(matches!(
            batch.warnings(),
            [EditorWarning::SubcommandFailed { .. }]
        ));

        batch.undo(&mut store).unwrap();
        assert_eq!(store.get_module("a").unwrap().rotation, 0.0);
    }

    #[test]
    fn test_all_members_failing_fails_batch() {
        let mut store = store();
        let mut batch = BatchCommand::new(
            "Broken",
            vec![RotateCommand::new("gone", 0.0, 10.0).unwrap().into()],
        );
        assert!(matches!(
            batch.execute(&mut store),
            Err(Error::BatchFailed { .. })
        ));
    }
}
