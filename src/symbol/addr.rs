//! Symbols and symbolic addresses.
//!
//! A symbol names one node: `buffer:wm`. An address is a root-first path of
//! symbols: `agent:A/subsystem:nacs/chunks:in`. We derive ordering so both
//! can key BTreeMap/BTreeSet and iterate deterministically.

use crate::error::GraphError;
use crate::symbol::ConstructKind;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    kind: ConstructKind,
    name: String,
}

impl Symbol {
    pub fn new(kind: ConstructKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn kind(&self) -> ConstructKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Shorthand constructors, one per kind.
pub fn agent(name: impl Into<String>) -> Symbol {
    Symbol::new(ConstructKind::Agent, name)
}

pub fn subsystem(name: impl Into<String>) -> Symbol {
    Symbol::new(ConstructKind::Subsystem, name)
}

pub fn buffer(name: impl Into<String>) -> Symbol {
    Symbol::new(ConstructKind::Buffer, name)
}

pub fn chunks(name: impl Into<String>) -> Symbol {
    Symbol::new(ConstructKind::Chunks, name)
}

pub fn features(name: impl Into<String>) -> Symbol {
    Symbol::new(ConstructKind::Features, name)
}

pub fn flow(name: impl Into<String>) -> Symbol {
    Symbol::new(ConstructKind::Flow, name)
}

pub fn terminus(name: impl Into<String>) -> Symbol {
    Symbol::new(ConstructKind::Terminus, name)
}

pub fn updater(name: impl Into<String>) -> Symbol {
    Symbol::new(ConstructKind::Updater, name)
}

/// Non-empty, root-first sequence of symbols.
///
/// Whether an address is relative or absolute depends on where it is used:
/// processes declare relative addresses, and `expand` resolves them against
/// the structure a process ends up installed in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(Vec<Symbol>);

impl Address {
    pub fn new(path: Vec<Symbol>) -> Result<Self, GraphError> {
        if path.is_empty() {
            return Err(GraphError::EmptyAddress);
        }
        Ok(Self(path))
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> &Symbol {
        &self.0[0]
    }

    pub fn last(&self) -> &Symbol {
        &self.0[self.0.len() - 1]
    }

    /// Path without the last symbol; None for single-symbol addresses.
    pub fn parent(&self) -> Option<Address> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn child(&self, symbol: Symbol) -> Address {
        let mut path = self.0.clone();
        path.push(symbol);
        Self(path)
    }

    pub fn join(&self, tail: &Address) -> Address {
        let mut path = self.0.clone();
        path.extend(tail.0.iter().cloned());
        Self(path)
    }

    pub fn starts_with(&self, prefix: &Address) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Remainder after `prefix`; None if `prefix` is not a proper prefix.
    pub fn strip_prefix(&self, prefix: &Address) -> Option<Address> {
        if self.0.len() <= prefix.0.len() || !self.starts_with(prefix) {
            return None;
        }
        Some(Self(self.0[prefix.0.len()..].to_vec()))
    }

    /// Resolve `self` against `scope`.
    ///
    /// An address rooted at the same symbol as `scope` is already absolute and
    /// comes back unchanged; anything else is prefixed with `scope`.
    pub fn expand(&self, scope: &Address) -> Address {
        if self.first() == scope.first() {
            self.clone()
        } else {
            scope.join(self)
        }
    }
}

impl From<Symbol> for Address {
    fn from(symbol: Symbol) -> Self {
        Self(vec![symbol])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sym) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", sym)?;
        }
        Ok(())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(symbols: Vec<Symbol>) -> Address {
        Address::new(symbols).unwrap()
    }

    #[test]
    fn empty_address_is_rejected() {
        assert!(matches!(Address::new(vec![]), Err(GraphError::EmptyAddress)));
    }

    #[test]
    fn relative_address_gets_scope_prefix() {
        let scope = path(vec![agent("A"), subsystem("nacs")]);
        let rel = Address::from(chunks("in"));

        assert_eq!(
            rel.expand(&scope),
            path(vec![agent("A"), subsystem("nacs"), chunks("in")])
        );
    }

    #[test]
    fn absolute_address_is_left_alone() {
        let scope = path(vec![agent("A"), subsystem("nacs")]);
        let abs = path(vec![agent("A"), buffer("wm")]);

        assert_eq!(abs.expand(&scope), abs);
    }

    #[test]
    fn prefix_helpers() {
        let full = path(vec![agent("A"), subsystem("S"), terminus("out")]);
        let scope = path(vec![agent("A")]);

        assert_eq!(
            full.strip_prefix(&scope),
            Some(path(vec![subsystem("S"), terminus("out")]))
        );
        assert_eq!(full.strip_prefix(&full), None);
        assert_eq!(
            full.parent(),
            Some(path(vec![agent("A"), subsystem("S")]))
        );
        assert_eq!(scope.parent(), None);
        assert_eq!(full.to_string(), "agent:A/subsystem:S/terminus:out");
    }
}
