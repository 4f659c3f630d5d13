use campmap_core::{DocumentStore, EditorWarning, Module, Result, ValidationError};
use serde::{Deserialize, Serialize};

use super::warn;

/// Inserts one or more modules.
///
/// Modules whose id already exists are skipped. Undo removes exactly the
/// modules this command inserted, never the skipped duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommand {
    name: String,
    modules: Vec<Module>,
    inserted: Vec<String>,
    warnings: Vec<EditorWarning>,
}

impl AddCommand {
    pub fn new(modules: Vec<Module>) -> Result<Self> {
        if modules.is_empty() {
            return Err(ValidationError::EmptyModuleList.into());
        }
        for module in &modules {
            module.validate_geometry()?;
        }

        let name = if modules.len() == 1 {
            "Add Module".to_string()
        } else {
            format!("Add {} Modules", modules.len())
        };

        Ok(Self {
            name,
            modules,
            inserted: Vec::new(),
            warnings: Vec::new(),
        })
    }

    pub fn single(module: Module) -> Result<Self> {
        Self::new(vec![module])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warnings(&self) -> &[EditorWarning] {
        &self.warnings
    }

    /// Ids of every module handed to the command.
    pub fn module_ids(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.id.clone()).collect()
    }

    /// Ids the last execute actually inserted.
    pub fn inserted_ids(&self) -> &[String] {
        &self.inserted
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.inserted.clear();
        self.warnings.clear();

        for module in &self.modules {
            if store.add_module(module.clone()) {
                self.inserted.push(module.id.clone());
            } else {
                warn(
                    &mut self.warnings,
                    EditorWarning::DuplicateSkipped {
                        id: module.id.clone(),
                    },
                );
            }
        }

        if self.inserted.is_empty() {
            return Err(ValidationError::AllDuplicates {
                count: self.modules.len(),
            }
            .into());
        }

        if self.inserted.len() < self.modules.len() {
            tracing::warn!(
                "Added {} of {} modules; {} duplicate(s) skipped",
                self.inserted.len(),
                self.modules.len(),
                self.modules.len() - self.inserted.len()
            );
        }
        Ok(())
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        if self.inserted.is_empty() {
            return Ok(());
        }
        let removed = store.remove_modules(&self.inserted);
        if removed.len() < self.inserted.len() {
            tracing::warn!(
                "Undo add removed {} of {} modules",
                removed.len(),
                self.inserted.len()
            );
        }
        self.inserted.clear();
        Ok(())
    }
}
