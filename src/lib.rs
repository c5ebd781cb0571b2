//! Hierarchical construct graphs.
//!
//! Named constructs, each wrapping a process over sparse activation maps,
//! are assembled into at most two levels of structures. Assembly validates
//! every declared input and freezes declaration order; each tick then
//! replays that order, feeding every node the outputs produced so far.

pub mod components;
pub mod config;
pub mod error;
pub mod graph;
pub mod numdict;
pub mod process;
pub mod registry;
pub mod symbol;

pub use error::{GraphError, Result};
pub use graph::{Builder, Construct, Structure};
pub use numdict::ActivationMap;
pub use process::{Composite, Process, Wrapped};
pub use symbol::{Address, ConstructKind, KindSet, Symbol};
