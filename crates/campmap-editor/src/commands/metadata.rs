use campmap_core::{DocumentStore, Error, Metadata, ModulePatch, Result, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NAME: &str = "Update Metadata";

/// Replaces the metadata of one module.
///
/// The target must exist when the command is built and again on execute and
/// undo. Both snapshots are structural clones, so dates inside the bag come
/// back exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMetadataCommand {
    module_id: String,
    old_metadata: Metadata,
    new_metadata: Metadata,
    restore_stamp: Option<DateTime<Utc>>,
}

impl UpdateMetadataCommand {
    pub fn new(store: &dyn DocumentStore, module_id: &str, metadata: Metadata) -> Result<Self> {
        let module = store
            .get_module(module_id)
            .ok_or_else(|| ValidationError::ModuleNotFound {
                id: module_id.to_string(),
            })?;

        Ok(Self {
            module_id: module_id.to_string(),
            old_metadata: module.metadata.clone(),
            new_metadata: metadata,
            restore_stamp: None,
        })
    }

    /// Shallow-merges `changes` over the current metadata.
    pub fn merge(store: &dyn DocumentStore, module_id: &str, changes: &Metadata) -> Result<Self> {
        let current = store
            .get_module(module_id)
            .map(|m| m.metadata.merged(changes))
            .ok_or_else(|| ValidationError::ModuleNotFound {
                id: module_id.to_string(),
            })?;
        Self::new(store, module_id, current)
    }

    pub fn name(&self) -> &str {
        NAME
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn old_metadata(&self) -> &Metadata {
        &self.old_metadata
    }

    pub fn new_metadata(&self) -> &Metadata {
        &self.new_metadata
    }

    pub fn execute(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        let stamp = store
            .get_module(&self.module_id)
            .map(|m| m.updated_at)
            .ok_or_else(|| Error::vanished(&self.module_id, NAME))?;

        store.update_module(
            &self.module_id,
            &ModulePatch::metadata(self.new_metadata.clone()),
        );
        self.restore_stamp = Some(stamp);
        Ok(())
    }

    pub fn undo(&mut self, store: &mut dyn DocumentStore) -> Result<()> {
        let Some(stamp) = self.restore_stamp else {
            return Ok(());
        };
        if !store.contains(&self.module_id) {
            return Err(Error::vanished(&self.module_id, NAME));
        }

        let patch = ModulePatch::metadata(self.old_metadata.clone()).stamped(stamp);
        store.update_module(&self.module_id, &patch);
        self.restore_stamp = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campmap_core::{InMemoryStore, MetadataValue, Module, ModuleType, Position};
    use chrono::TimeZone;

    fn store() -> InMemoryStore {
        InMemoryStore::from_modules(vec![Module::with_id(
            "site",
            ModuleType::Campsite,
            Position::new(0.0, 0.0),
        )])
    }

    #[test]
    fn test_unknown_module_is_rejected_at_construction() {
        let err = UpdateMetadataCommand::new(&store(), "nope", Metadata::new()).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_execute_after_delete_fails() {
        let mut store = store();
        let mut cmd =
            UpdateMetadataCommand::new(&store, "site", Metadata::new().with("capacity", 2))
                .unwrap();
        store.remove_module("site");

        let err = cmd.execute(&mut store).unwrap_err();
        assert!(err.is_consistency_error());
        assert!(store.is_empty());
    }

    #[test]
    fn test_dates_survive_round_trip() {
        let mut store = store();
        let opened = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        store.update_module(
            "site",
            &ModulePatch::metadata(Metadata::new().with("openedAt", opened)),
        );
        let before = store.clone();

        let mut cmd = UpdateMetadataCommand::merge(
            &store,
            "site",
            &Metadata::new().with("name", "Lakeside"),
        )
        .unwrap();
        cmd.execute(&mut store).unwrap();

        let meta = &store.get_module("site").unwrap().metadata;
        assert_eq!(meta.get("name").and_then(MetadataValue::as_str), Some("Lakeside"));
        assert_eq!(meta.get("openedAt").and_then(MetadataValue::as_date), Some(opened));

        cmd.undo(&mut store).unwrap();
        assert_eq!(store, before);
    }
}
