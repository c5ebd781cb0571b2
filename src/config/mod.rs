//! Config layer: JSON graph descriptions and their validated forms.
//!
//! Kept apart from the engine; it only drives the public builder API.

pub mod graph;

pub use graph::{GraphSpec, NodeSpec, ProcessSpec, ValidatedGraph};
