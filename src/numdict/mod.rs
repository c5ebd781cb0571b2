//! Activation maps: the only data exchanged between graph nodes.

pub mod map;
pub mod ops;

pub use map::{ActivationMap, Key, MutableActivationMap};
