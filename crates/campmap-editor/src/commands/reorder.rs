use campmap_core::{DocumentStore, EditorWarning, ModulePatch, Result, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::warn;

/// Changes the z-index of one module.
///
/// Values arrive as `f64` from hosts that treat z-index as a plain number;
/// non-finite input is rejected and a negative target is raised to zero.
/// A module that disappeared before execute is skipped with a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderCommand {
    module_id: String,
    old_z_index: i64,
    new_z_index: i64,
    clamped: Option<f64>,
    restore_stamp: Option<DateTime<Utc>>,
    warnings: Vec<EditorWarning>,
}

impl ReorderCommand {
    pub fn new(module_id: impl Into<String>, old_z_index: f64, new_z_index: f64) -> Result<Self> {
        check_numeric("old", old_z_index)?;
        check_numeric("new", new_z_index)?;

        let mut warnings = Vec::new();
        let mut clamped = None;
        let target = if new_z_index < 0.0 {
            warn(
                &mut warnings,
                EditorWarning::ZIndexClamped {
                    requested: new_z_index,
                },
            );
            clamped = Some(new_z_index);
            0
        } else {
            new_z_index.round() as i64
        };

        Ok(Self {
            module_id: module_id.into(),
            old_z_index: old_z_index.round() as i64,
            new_z_index: target,
            clamped,
            restore_stamp: None,
            warnings,
        })
    }

    /// Reads the current z-index from `store`.
    pub fn from_store(
        store: &dyn DocumentStore,
        module_id: &str,
        new_z_index: f64,
    ) -> Result<Self> {
        let module = store
            .get_module(module_id)
            .ok_or_else(|| ValidationError::ModuleNotFound {
                id: module_id.to_string(),
            })?;
        Self::new(module_id, module.z_index as f64, new_z_index)
    }

    pub fn name(&self) -> &str {
        "Reorder Module"
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn old_z_index(&self) -> i64 {
        self.old_z_index
    }

    /// Target z-index after clamping.
    pub fn new_z_index(&self) -> i64 {
        self.new_z_index
    }

    pub fn warnings(&self) -> &[EditorWarning] {
        &self.warnings
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        self.warnings.clear();
        if let Some(requested) = self.clamped {
            self.warnings.push(EditorWarning::ZIndexClamped { requested });
        }

        let Some(stamp) = store.get_module(&self.module_id).map(|m| m.updated_at) else {
            warn(
                &mut self.warnings,
                EditorWarning::MissingSkipped {
                    id: self.module_id.clone(),
                },
            );
            self.restore_stamp = None;
            return Ok(());
        };

        store.reorder_module(&self.module_id, self.new_z_index);
        self.restore_stamp = Some(stamp);
        Ok(())
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        let Some(stamp) = self.restore_stamp.take() else {
            return Ok(());
        };

        let patch = ModulePatch::z_index(self.old_z_index).stamped(stamp);
        if !store.update_module(&self.module_id, &patch) {
            warn(
                &mut self.warnings,
                EditorWarning::MissingSkipped {
                    id: self.module_id.clone(),
                },
            );
        }
        Ok(())
    }
}

fn check_numeric(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonNumericZIndex {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campmap_core::{Error, InMemoryStore, Module, ModuleType, Position};

    fn store() -> InMemoryStore {
        let mut m = Module::with_id("a", ModuleType::Storage, Position::new(0.0, 0.0));
        m.z_index = 7;
        InMemoryStore::from_modules(vec![m])
    }

    #[test]
    fn test_negative_target_is_clamped_with_warning() {
        let cmd = ReorderCommand::new("a", 7.0, -5.0).unwrap();
        assert_eq!(cmd.new_z_index(), 0);
        assert_eq!(
            cmd.warnings(),
            [EditorWarning::ZIndexClamped { requested: -5.0 }]
        );
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        let err = ReorderCommand::new("a", f64::NAN, 1.0).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::NonNumericZIndex { ref field, .. }) if field == "old"
        ));
        assert!(ReorderCommand::new("a", 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_round_trip_restores_record() {
        let mut store = store();
        let before = store.clone();
        let mut cmd = ReorderCommand::from_store(&store, "a", 42.0).unwrap();

        cmd.execute(&mut store).unwrap();
        assert_eq!(store.get_module("a").unwrap().z_index, 42);
        cmd.undo(&mut store).unwrap();
        assert_eq!(store, before);
    }

    #[test]
    fn test_missing_module_is_skipped() {
        let mut store = InMemoryStore::new();
        let mut cmd = ReorderCommand::new("gone", 1.0, 2.0).unwrap();
        cmd.execute(&mut store).unwrap();
        assert_eq!(
            cmd.warnings(),
            [EditorWarning::MissingSkipped {
                id: "gone".to_string()
            }]
        );
        cmd.undo(&mut store).unwrap();
    }

    #[test]
    fn test_clamp_warning_survives_execute() {
        let mut store = store();
        let mut cmd = ReorderCommand::new("a", 7.0, -1.0).unwrap();
        cmd.execute(&mut store).unwrap();
        assert_eq!(store.get_module("a").unwrap().z_index, 0);
        assert_eq!(cmd.warnings().len(), 1);
    }
}
