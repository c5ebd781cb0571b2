//! Registries with deferred updates.
//!
//! Additions and deletions requested during a tick are only logged; an
//! `Updater` node applies the log in its own declared turn, so every node
//! scheduled before it sees the registry as it was at the start of the tick.

use crate::error::Result;
use crate::process::{Emitted, Inputs, Process, Slot};
use crate::symbol::ConstructKind;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{0} is already registered for a pending update")]
    PendingConflict(String),

    #[error("cannot delete {0}: no such entry")]
    UnknownEntry(String),

    #[error("registry is borrowed elsewhere")]
    Busy,
}

#[derive(Debug, Clone)]
pub struct Registry<K, V> {
    data: BTreeMap<K, V>,
    add_promises: BTreeMap<K, V>,
    del_promises: BTreeSet<K>,
}

impl<K: Ord + Display, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            data: BTreeMap::new(),
            add_promises: BTreeMap::new(),
            del_promises: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Display, V> Registry<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.data.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.data.iter()
    }

    /// Immediate insert, for seeding a registry before a run.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.data.insert(key, value)
    }

    pub fn pending_adds(&self) -> impl Iterator<Item = (&K, &V)> {
        self.add_promises.iter()
    }

    pub fn pending_dels(&self) -> impl Iterator<Item = &K> {
        self.del_promises.iter()
    }

    fn is_pending(&self, key: &K) -> bool {
        self.add_promises.contains_key(key) || self.del_promises.contains(key)
    }

    /// Log an addition (or overwrite) applied on the next `apply`.
    pub fn request_add(&mut self, key: K, value: V) -> std::result::Result<(), RegistryError> {
        if self.is_pending(&key) {
            return Err(RegistryError::PendingConflict(key.to_string()));
        }
        self.add_promises.insert(key, value);
        Ok(())
    }

    /// Log a deletion of an existing entry.
    pub fn request_del(&mut self, key: K) -> std::result::Result<(), RegistryError> {
        if self.is_pending(&key) {
            return Err(RegistryError::PendingConflict(key.to_string()));
        }
        if !self.data.contains_key(&key) {
            return Err(RegistryError::UnknownEntry(key.to_string()));
        }
        self.del_promises.insert(key);
        Ok(())
    }

    /// Apply the log: deletions first, then additions. Returns
    /// `(added, deleted)` counts.
    pub fn apply(&mut self) -> (usize, usize) {
        let deleted = self.del_promises.len();
        for key in std::mem::take(&mut self.del_promises) {
            self.data.remove(&key);
        }
        let added = self.add_promises.len();
        self.data.append(&mut self.add_promises);
        (added, deleted)
    }
}

pub type SharedRegistry<K, V> = Rc<RefCell<Registry<K, V>>>;

/// Drains a registry's pending log when its turn comes; emits nothing.
pub struct Updater<K, V> {
    slot: Slot,
    registry: SharedRegistry<K, V>,
}

impl<K: Ord + Display, V> Updater<K, V> {
    pub fn new(registry: SharedRegistry<K, V>) -> Self {
        Self {
            slot: Slot::new(ConstructKind::Updater.into(), Vec::new()),
            registry,
        }
    }
}

impl<K: Ord + Display, V> Process for Updater<K, V> {
    fn name(&self) -> &'static str {
        "Updater"
    }

    fn slot(&self) -> &Slot {
        &self.slot
    }

    fn slot_mut(&mut self) -> &mut Slot {
        &mut self.slot
    }

    fn call(&self, _inputs: &Inputs) -> Result<Option<Emitted>> {
        let mut registry = self
            .registry
            .try_borrow_mut()
            .map_err(|_| RegistryError::Busy)?;
        let (added, deleted) = registry.apply();
        if added + deleted > 0 {
            tracing::debug!(
                node = ?self.client().map(ToString::to_string),
                added,
                deleted,
                "registry updated"
            );
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::symbol::{Address, agent, buffer, updater};
    use pretty_assertions::assert_eq;

    fn registry() -> Registry<String, f64> {
        let mut r = Registry::new();
        r.insert("a".to_string(), 1.0);
        r
    }

    #[test]
    fn requests_wait_for_apply() {
        let mut r = registry();
        r.request_add("b".to_string(), 2.0).unwrap();
        r.request_del("a".to_string()).unwrap();

        assert!(r.contains(&"a".to_string()));
        assert!(!r.contains(&"b".to_string()));

        assert_eq!(r.apply(), (1, 1));
        assert_eq!(
            r.iter().map(|(k, v)| (k.clone(), *v)).collect::<Vec<_>>(),
            vec![("b".to_string(), 2.0)]
        );
        assert_eq!(r.pending_adds().count(), 0);
        assert_eq!(r.pending_dels().count(), 0);
    }

    #[test]
    fn conflicting_requests_are_rejected() {
        let mut r = registry();
        r.request_del("a".to_string()).unwrap();

        assert!(matches!(
            r.request_add("a".to_string(), 3.0),
            Err(RegistryError::PendingConflict(k)) if k == "a"
        ));
        assert!(matches!(
            r.request_del("zzz".to_string()),
            Err(RegistryError::UnknownEntry(_))
        ));
    }

    #[test]
    fn updater_serves_only_updater_kind() {
        let shared = Rc::new(RefCell::new(registry()));
        let mut u = Updater::new(shared.clone());

        let bad = Address::new(vec![agent("A"), buffer("b")]).unwrap();
        assert!(matches!(u.entrust(bad), Err(GraphError::KindMismatch { .. })));

        u.entrust(Address::new(vec![agent("A"), updater("u")]).unwrap())
            .unwrap();
        shared.borrow_mut().request_add("c".to_string(), 0.5).unwrap();

        let out = u.propagate(&Inputs::new()).unwrap();
        assert!(out.is_empty());
        assert_eq!(shared.borrow().get(&"c".to_string()), Some(&0.5));
    }
}
