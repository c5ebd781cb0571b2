//! Structures: named containers of constructs and, one level down, of
//! sub-structures.
//!
//! A structure is assembled through a `Builder` and is immutable once
//! closed. Execution replays children in declaration order every tick,
//! threading one accumulator of absolute-addressed outputs through the
//! whole tree.

use crate::error::{GraphError, Result};
use crate::graph::construct::Construct;
use crate::numdict::ActivationMap;
use crate::process::Inputs;
use crate::symbol::{Address, Symbol};
use std::collections::BTreeMap;
use std::fmt;

/// Public output of a structure, keyed relative to it: own leaves by
/// symbol, leaves of sub-structures by `sub/leaf` path.
pub type Output = BTreeMap<Address, ActivationMap>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unopened,
    Open,
    Closed,
}

#[derive(Debug)]
pub enum Entry {
    Construct(Construct),
    Structure(Structure),
}

impl Entry {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Entry::Construct(c) => c.symbol(),
            Entry::Structure(s) => s.symbol(),
        }
    }
}

/// Declared input whose target is confirmed when the owning scope closes.
#[derive(Debug, Clone)]
pub(crate) struct Link {
    pub consumer: Address,
    pub target: Address,
}

pub struct Structure {
    path: Address,
    state: State,
    entries: Vec<Entry>,
    pending: Vec<Link>,
    output: Output,
}

impl Structure {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            path: Address::from(symbol),
            state: State::Unopened,
            entries: Vec::new(),
            pending: Vec::new(),
            output: Output::new(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        self.path.last()
    }

    pub fn path(&self) -> &Address {
        &self.path
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Child symbols in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().map(Entry::symbol)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Entry> {
        self.entries.iter().find(|e| e.symbol() == symbol)
    }

    pub fn construct(&self, symbol: &Symbol) -> Option<&Construct> {
        match self.get(symbol) {
            Some(Entry::Construct(c)) => Some(c),
            _ => None,
        }
    }

    pub fn structure(&self, symbol: &Symbol) -> Option<&Structure> {
        match self.get(symbol) {
            Some(Entry::Structure(s)) => Some(s),
            _ => None,
        }
    }

    /// Last committed output (empty maps until the first step).
    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn output_of(&self, key: &Address) -> Option<&ActivationMap> {
        self.output.get(key)
    }

    /// Relative keys of every leaf this structure reports, in execution order.
    pub fn leaf_keys(&self) -> Vec<Address> {
        let mut keys = Vec::new();
        for entry in &self.entries {
            match entry {
                Entry::Construct(c) => keys.push(Address::from(c.symbol().clone())),
                Entry::Structure(s) => {
                    let head = Address::from(s.symbol().clone());
                    keys.extend(s.leaf_keys().iter().map(|k| head.join(k)));
                }
            }
        }
        keys
    }

    /// Run one tick with nothing inherited.
    pub fn step(&mut self) -> Result<&Output> {
        self.step_with(Inputs::new())
    }

    /// Run one tick. `inherited` holds ancestor-scope outputs keyed by
    /// absolute address; it overrides this structure's previous output.
    ///
    /// Outputs are committed only if every node succeeds. A node that reads
    /// a later sibling sees that sibling's previous-tick output, so repeated
    /// steps give identical outputs only when no such forward reads exist.
    pub fn step_with(&mut self, inherited: Inputs) -> Result<&Output> {
        if self.state != State::Closed {
            return Err(GraphError::NotClosed(self.symbol().clone()));
        }

        let mut acc = self.snapshot();
        acc.extend(inherited);
        self.run(&mut acc)?;
        self.commit(&acc);

        Ok(&self.output)
    }

    /// Current output keyed by absolute address.
    pub fn snapshot(&self) -> Inputs {
        self.output
            .iter()
            .map(|(k, v)| (self.path.join(k), v.clone()))
            .collect()
    }

    fn run(&self, acc: &mut Inputs) -> Result<()> {
        for entry in &self.entries {
            match entry {
                Entry::Construct(c) => {
                    let out = c.propagate(acc)?;
                    acc.insert(c.path().clone(), out);
                }
                Entry::Structure(s) => s.run(acc)?,
            }
        }
        Ok(())
    }

    fn commit(&mut self, acc: &Inputs) {
        for entry in &mut self.entries {
            if let Entry::Structure(s) = entry {
                s.commit(acc);
            }
        }
        for key in self.leaf_keys() {
            if let Some(d) = acc.get(&self.path.join(&key)) {
                self.output.insert(key, d.clone());
            }
        }
    }

    // Assembly hooks, driven by the builder.

    pub(crate) fn open_at(&mut self, path: Address) {
        self.path = path;
        self.state = State::Open;
    }

    pub(crate) fn has_child(&self, symbol: &Symbol) -> bool {
        self.get(symbol).is_some()
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub(crate) fn defer(&mut self, link: Link) {
        self.pending.push(link);
    }

    /// Drop deferred links declared by anything under `discarded`.
    pub(crate) fn forget(&mut self, discarded: &Address) {
        self.pending.retain(|link| !link.consumer.starts_with(discarded));
    }

    /// True if `target` names a leaf of this structure or of one of its
    /// sub-structures.
    pub(crate) fn resolves(&self, target: &Address) -> bool {
        let Some(rel) = target.strip_prefix(&self.path) else {
            return false;
        };
        match rel.symbols() {
            [leaf] => self.construct(leaf).is_some(),
            [sub, leaf] => self
                .structure(sub)
                .is_some_and(|s| s.construct(leaf).is_some()),
            _ => false,
        }
    }

    /// Confirm deferred links and freeze. Output starts as an empty map per leaf.
    pub(crate) fn seal(&mut self) -> Result<()> {
        self.state = State::Closed;
        for link in std::mem::take(&mut self.pending) {
            if !self.resolves(&link.target) {
                return Err(GraphError::UnresolvedLink {
                    consumer: link.consumer,
                    target: link.target,
                });
            }
        }
        self.output = self
            .leaf_keys()
            .into_iter()
            .map(|k| (k, ActivationMap::empty()))
            .collect();
        Ok(())
    }
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Structure")
            .field("path", &self.path)
            .field("state", &self.state)
            .field("entries", &self.entries)
            .finish()
    }
}
