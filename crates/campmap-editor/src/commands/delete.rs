use std::collections::{HashMap, HashSet};

use campmap_core::{DocumentStore, EditorWarning, Module, Result, ValidationError};
use serde::{Deserialize, Serialize};

use super::warn;

/// Removes modules and restores them at their original place on undo.
///
/// Snapshots are deep copies taken at construction, so later edits to the
/// live modules cannot leak into the restored records. The collection order
/// at construction is kept too: undo puts deleted modules back where they
/// were, keeps whatever is in the store now, and appends modules that did
/// not exist when the command was built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCommand {
    name: String,
    snapshots: Vec<Module>,
    original_order: Vec<String>,
    removed: Vec<String>,
    warnings: Vec<EditorWarning>,
}

impl DeleteCommand {
    pub fn new(store: &dyn DocumentStore, modules: &[Module]) -> Result<Self> {
        if modules.is_empty() {
            return Err(ValidationError::EmptyModuleList.into());
        }

        let name = if modules.len() == 1 {
            "Delete Module".to_string()
        } else {
            format!("Delete {} Modules", modules.len())
        };

        Ok(Self {
            name,
            snapshots: modules.to_vec(),
            original_order: store.ids(),
            removed: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Builds the command from ids, snapshotting the modules found in
    /// `store`. Unknown ids are skipped; if none is known the command is
    /// rejected.
    pub fn from_ids(store: &dyn DocumentStore, ids: &[String]) -> Result<Self> {
        let mut modules = Vec::with_capacity(ids.len());
        for id in ids {
            match store.get_module(id) {
                Some(module) => modules.push(module.clone()),
                None => tracing::warn!("Delete: module {} not found, skipped", id),
            }
        }
        if modules.is_empty() {
            return Err(match ids.first() {
                Some(id) => ValidationError::ModuleNotFound { id: id.clone() }.into(),
                None => ValidationError::EmptyModuleList.into(),
            });
        }
        Self::new(store, &modules)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warnings(&self) -> &[EditorWarning] {
        &self.warnings
    }

    pub fn module_ids(&self) -> Vec<String> {
        self.snapshots.iter().map(|m| m.id.clone()).collect()
    }

    /// Ids the last execute actually removed.
    pub fn removed_ids(&self) -> &[String] {
        &self.removed
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.warnings.clear();
        let requested = self.module_ids();
        let removed = store.remove_modules(&requested);
        self.removed = removed.into_iter().map(|m| m.id).collect();

        if self.removed.len() < requested.len() {
            for id in requested.iter().filter(|id| !self.removed.contains(id)) {
                warn(
                    &mut self.warnings,
                    EditorWarning::MissingSkipped { id: id.clone() },
                );
            }
            warn(
                &mut self.warnings,
                EditorWarning::PartialDelete {
                    removed: self.removed.len(),
                    requested: requested.len(),
                },
            );
        }
        Ok(())
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        if self.removed.is_empty() {
            return Ok(());
        }

        let restored = self.reconcile(store.modules());
        store.set_modules(restored);
        self.removed.clear();
        Ok(())
    }

    /// Merges the deleted snapshots back into `current`.
    fn reconcile(&self, current: &[Module]) -> Vec<Module> {
        let removed: HashSet<&str> = self.removed.iter().map(String::as_str).collect();
        let deleted: HashMap<&str, &Module> = self
            .snapshots
            .iter()
            .filter(|m| removed.contains(m.id.as_str()))
            .map(|m| (m.id.as_str(), m))
            .collect();
        let live: HashMap<&str, &Module> = current.iter().map(|m| (m.id.as_str(), m)).collect();

        let mut out = Vec::with_capacity(current.len() + deleted.len());
        let mut placed: HashSet<&str> = HashSet::new();

        for id in &self.original_order {
            let id = id.as_str();
            // A module re-created under the same id in the meantime wins
            // over the snapshot.
            let module = live.get(id).or_else(|| deleted.get(id));
            if let Some(module) = module {
                if placed.insert(id) {
                    out.push((*module).clone());
                }
            }
        }

        for module in current {
            if placed.insert(module.id.as_str()) {
                out.push(module.clone());
            }
        }

        // Removed modules that were not in the store at construction time.
        for module in &self.snapshots {
            if removed.contains(module.id.as_str()) && placed.insert(module.id.as_str()) {
                out.push(module.clone());
            }
        }

        out
    }
}
