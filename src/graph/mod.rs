//! Graph layer: constructs, structures and the build context that
//! assembles them.

pub mod builder;
pub mod construct;
pub mod structure;

pub use builder::{Builder, Handle, MAX_DEPTH};
pub use construct::Construct;
pub use structure::{Entry, Output, State, Structure};
