//! Symbol layer: role kinds, node symbols and root-first addresses.

pub mod addr;
pub mod kind;
pub mod parse;

pub use addr::{
    Address, Symbol, agent, buffer, chunks, features, flow, subsystem, terminus, updater,
};
pub use kind::{ConstructKind, KindSet};
pub use parse::{parse_address, parse_symbol, symbol_regex};
