use campmap_core::{DocumentStore, EditorWarning, ModulePatch, Result, ValidationError};
use serde::{Deserialize, Serialize};

use super::warn;

/// One entry of a [`PropertyCommand`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChange {
    pub module_id: String,
    pub old: ModulePatch,
    pub new: ModulePatch,
}

impl PropertyChange {
    pub fn new(module_id: impl Into<String>, old: ModulePatch, new: ModulePatch) -> Self {
        Self {
            module_id: module_id.into(),
            old,
            new,
        }
    }
}

/// Applies a list of partial updates as one step.
///
/// Execute runs the list in order; undo unwinds it back to front so that
/// dependent edits to the same module restore correctly. Entries whose
/// module is gone are skipped with a warning.
///
/// The `old` side of an entry describes the change for display. Undo
/// restores what the module actually held when execute ran, so an entry
/// whose module appeared after construction is still reversed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyCommand {
    name: String,
    changes: Vec<PropertyChange>,
    /// Indexes into `changes` applied by the last execute, each with the
    /// stamped patch restoring the module as it was right before.
    applied: Vec<(usize, ModulePatch)>,
    warnings: Vec<EditorWarning>,
}

impl PropertyCommand {
    pub fn new(name: impl Into<String>, changes: Vec<PropertyChange>) -> Result<Self> {
        if changes.is_empty() {
            return Err(ValidationError::EmptyModuleList.into());
        }
        for change in &changes {
            change.new.validate(&change.module_id)?;
        }

        Ok(Self {
            name: name.into(),
            changes,
            applied: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Builds the old side of each entry from the current store state.
    /// Entries for unknown modules are kept with an empty old patch and will
    /// be skipped on execute.
    pub fn from_store(
        name: impl Into<String>,
        store: &dyn DocumentStore,
        updates: Vec<(String, ModulePatch)>,
    ) -> Result<Self> {
        let changes = updates
            .into_iter()
            .map(|(module_id, new)| {
                let mut old = store
                    .get_module(&module_id)
                    .map(|m| new.inverse_for(m))
                    .unwrap_or_default();
                // Stamps are captured per execute.
                old.updated_at = None;
                PropertyChange::new(module_id, old, new)
            })
            .collect();
        Self::new(name, changes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn changes(&self) -> &[PropertyChange] {
        &self.changes
    }

    pub fn warnings(&self) -> &[EditorWarning] {
        &self.warnings
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.applied.clear();
        self.warnings.clear();

        for (i, change) in self.changes.iter().enumerate() {
            let Some(restore) = store
                .get_module(&change.module_id)
                .map(|m| change.new.inverse_for(m))
            else {
                warn(
                    &mut self.warnings,
                    EditorWarning::MissingSkipped {
                        id: change.module_id.clone(),
                    },
                );
                continue;
            };
            store.update_module(&change.module_id, &change.new);
            self.applied.push((i, restore));
        }

        if self.applied.len() < self.changes.len() {
            tracing::warn!(
                "{}: applied {} of {} changes",
                self.name,
                self.applied.len(),
                self.changes.len()
            );
        }
        Ok(())
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        for (i, restore) in self.applied.drain(..).rev() {
            let change = &self.changes[i];
            if !store.update_module(&change.module_id, &restore) {
                warn(
                    &mut self.warnings,
                    EditorWarning::MissingSkipped {
                        id: change.module_id.clone(),
                    },
                );
            }
        }
        Ok(())
    }
}
