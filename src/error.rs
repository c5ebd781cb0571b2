use crate::registry::RegistryError;
use crate::symbol::{Address, ConstructKind, Symbol};
use thiserror::Error;

/// Every way assembly or a tick can fail. Nothing here is retried; the
/// first error aborts the assembly or tick in progress.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("{process} cannot serve constructs of kind {kind} (at {path})")]
    KindMismatch {
        process: &'static str,
        kind: ConstructKind,
        path: Address,
    },

    #[error("process {process} is already entrusted to {path}")]
    AlreadyEntrusted { process: &'static str, path: Address },

    #[error("cannot declare {0}: no structure is open")]
    NoOpenStructure(Symbol),

    #[error("structure {0} is closed and cannot be reopened")]
    ReopenedStructure(Symbol),

    #[error("cannot open {0}: structures nest at most 2 levels deep")]
    NestingTooDeep(Symbol),

    #[error("{consumer} expects input from {target}, which is not reachable")]
    UnresolvedLink { consumer: Address, target: Address },

    #[error("{consumer} is missing expected input from {target}")]
    MissingInput { consumer: Address, target: Address },

    #[error("{0} emitted an activation map with non-zero default {1}")]
    InvalidDefault(&'static str, f64),

    #[error("{0} emitted {1}, expected an activation map")]
    InvalidOutputType(&'static str, &'static str),

    #[error("address cannot be empty")]
    EmptyAddress,

    #[error("{symbol} is declared twice in {parent}")]
    DuplicateSymbol { parent: Address, symbol: Symbol },

    #[error("cannot close {0}: it is not the innermost open structure")]
    UnbalancedClose(Symbol),

    #[error("structure {0} has not been closed")]
    NotClosed(Symbol),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, GraphError>;
