//! Document store: the ordered collection of placed modules.
//!
//! Commands only talk to the [`DocumentStore`] trait, so a host can plug in
//! its own state container. [`InMemoryStore`] is the implementation used by
//! the editor facade and the tests.

use std::collections::HashMap;

use chrono::Utc;

use crate::module::{Module, ModulePatch};

/// Storage contract consumed by the command layer.
///
/// Order is insertion order unless replaced wholesale with
/// [`DocumentStore::set_modules`]. z-index never reorders the collection.
pub trait DocumentStore {
    /// Looks a module up by id.
    fn get_module(&self, id: &str) -> Option<&Module>;

    /// All modules in collection order.
    fn modules(&self) -> &[Module];

    /// Appends a module. Returns `false` and inserts nothing on id collision.
    fn add_module(&mut self, module: Module) -> bool;

    /// Removes one module, returning it if it existed.
    fn remove_module(&mut self, id: &str) -> Option<Module>;

    /// Removes every listed module that exists, returning the removed ones.
    fn remove_modules(&mut self, ids: &[String]) -> Vec<Module> {
        ids.iter().filter_map(|id| self.remove_module(id)).collect()
    }

    /// Applies a partial update. Returns `false` when the id is unknown.
    fn update_module(&mut self, id: &str, patch: &ModulePatch) -> bool;

    /// Sets the z-index of one module. Returns `false` when the id is unknown.
    fn reorder_module(&mut self, id: &str, z_index: i64) -> bool {
        self.update_module(id, &ModulePatch::z_index(z_index))
    }

    /// Replaces the whole collection, keeping the given order.
    fn set_modules(&mut self, modules: Vec<Module>);

    fn contains(&self, id: &str) -> bool {
        self.get_module(id).is_some()
    }

    fn len(&self) -> usize {
        self.modules().len()
    }

    fn is_empty(&self) -> bool {
        self.modules().is_empty()
    }

    /// Ids in collection order.
    fn ids(&self) -> Vec<String> {
        self.modules().iter().map(|m| m.id.clone()).collect()
    }
}

/// Vector-backed store with an id index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryStore {
    modules: Vec<Module>,
    index: HashMap<String, usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from an ordered list; duplicate ids are dropped.
    pub fn from_modules(modules: Vec<Module>) -> Self {
        let mut store = Self::new();
        store.set_modules(modules);
        store
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
    }

    /// Iterates modules sorted by z-index, ties broken by collection order.
    pub fn draw_order(&self) -> Vec<&Module> {
        let mut ordered: Vec<&Module> = self.modules.iter().collect();
        ordered.sort_by_key(|m| m.z_index);
        ordered
    }

    /// Highest z-index currently in use.
    pub fn max_z_index(&self) -> Option<i64> {
        self.modules.iter().map(|m| m.z_index).max()
    }

    /// Lowest z-index currently in use.
    pub fn min_z_index(&self) -> Option<i64> {
        self.modules.iter().map(|m| m.z_index).min()
    }
}

impl DocumentStore for InMemoryStore {
    fn get_module(&self, id: &str) -> Option<&Module> {
        self.index.get(id).map(|&i| &self.modules[i])
    }

    fn modules(&self) -> &[Module] {
        &self.modules
    }

    fn add_module(&mut self, module: Module) -> bool {
        if self.index.contains_key(&module.id) {
            return false;
        }
        self.index.insert(module.id.clone(), self.modules.len());
        self.modules.push(module);
        true
    }

    fn remove_module(&mut self, id: &str) -> Option<Module> {
        let i = self.index.remove(id)?;
        let removed = self.modules.remove(i);
        self.rebuild_index();
        Some(removed)
    }

    fn remove_modules(&mut self, ids: &[String]) -> Vec<Module> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.modules.len());
        for module in self.modules.drain(..) {
            if ids.iter().any(|id| *id == module.id) {
                removed.push(module);
            } else {
                kept.push(module);
            }
        }
        self.modules = kept;
        self.rebuild_index();
        removed
    }

    fn update_module(&mut self, id: &str, patch: &ModulePatch) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                patch.apply_to(&mut self.modules[i], Utc::now());
                true
            }
            None => false,
        }
    }

    fn set_modules(&mut self, modules: Vec<Module>) {
        self.modules.clear();
        self.index.clear();
        for module in modules {
            if self.index.contains_key(&module.id) {
                tracing::warn!("Dropping duplicate module {} while replacing store", module.id);
                continue;
            }
            self.index.insert(module.id.clone(), self.modules.len());
            self.modules.push(module);
        }
    }
}
