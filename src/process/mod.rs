//! Process layer: the contract every graph node implements, output
//! validation, and composition.

pub mod base;
pub mod composite;
pub mod emit;

pub use base::{Inputs, Passive, Process, Slot};
pub use composite::{Composite, Postprocess, Preprocess, Wrapped};
pub use emit::{Emitted, emit};
