//! Sparse activation maps.
//!
//! `ActivationMap` is the frozen snapshot passed between nodes each tick.
//! `MutableActivationMap` is the scratch form a process fills in before
//! handing it back; `freeze` and `to_mutable` convert between the two.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Key of a node in an activation map (a chunk, feature or rule name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Key(String);

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationMap {
    default: f64,
    values: BTreeMap<Key, f64>,
}

impl ActivationMap {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            values: BTreeMap::new(),
        }
    }

    /// Empty map with default 0, the output of a process that has nothing to say.
    pub fn empty() -> Self {
        Self::new(0.0)
    }

    pub fn from_pairs<K, I>(pairs: I, default: f64) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self {
            default,
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn default_value(&self) -> f64 {
        self.default
    }

    /// Strength of `key`, falling back to the default.
    pub fn get(&self, key: &Key) -> f64 {
        self.values.get(key).copied().unwrap_or(self.default)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, f64)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.values.keys()
    }

    pub fn to_mutable(&self) -> MutableActivationMap {
        MutableActivationMap {
            default: self.default,
            values: self.values.clone(),
        }
    }
}

impl Default for ActivationMap {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutableActivationMap {
    default: f64,
    values: BTreeMap<Key, f64>,
}

impl MutableActivationMap {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            values: BTreeMap::new(),
        }
    }

    pub fn default_value(&self) -> f64 {
        self.default
    }

    pub fn get(&self, key: &Key) -> f64 {
        self.values.get(key).copied().unwrap_or(self.default)
    }

    pub fn set(&mut self, key: impl Into<Key>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Keep the larger of the current and the offered strength.
    pub fn set_max(&mut self, key: impl Into<Key>, value: f64) {
        let key = key.into();
        let current = self.get(&key);
        self.values.insert(key, current.max(value));
    }

    /// Give every key in `keys` not already present the strength `value`.
    pub fn extend<K, I>(&mut self, keys: I, value: f64)
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
    {
        for key in keys {
            self.values.entry(key.into()).or_insert(value);
        }
    }

    /// Drop explicit entries equal to the default.
    pub fn squeeze(&mut self) {
        let default = self.default;
        self.values.retain(|_, v| *v != default);
    }

    pub fn freeze(self) -> ActivationMap {
        ActivationMap {
            default: self.default,
            values: self.values,
        }
    }
}
