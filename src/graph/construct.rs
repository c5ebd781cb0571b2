use crate::error::Result;
use crate::numdict::ActivationMap;
use crate::process::{Inputs, Process};
use crate::symbol::{Address, Symbol};
use std::fmt;

/// A leaf node: a symbol paired with the process entrusted to it.
pub struct Construct {
    path: Address,
    process: Box<dyn Process>,
}

impl Construct {
    /// Entrust `process` to `path`. Kind mismatches surface unchanged.
    pub(crate) fn entrust(path: Address, mut process: Box<dyn Process>) -> Result<Self> {
        process.entrust(path.clone())?;
        Ok(Self { path, process })
    }

    pub fn symbol(&self) -> &Symbol {
        self.path.last()
    }

    pub fn path(&self) -> &Address {
        &self.path
    }

    pub fn process(&self) -> &dyn Process {
        self.process.as_ref()
    }

    /// Absolute addresses this construct reads from.
    pub fn inputs(&self) -> Vec<Address> {
        self.process.expected()
    }

    pub(crate) fn propagate(&self, inputs: &Inputs) -> Result<ActivationMap> {
        tracing::trace!(node = %self.path, process = self.process.name(), "propagate");
        self.process.propagate(inputs)
    }
}

impl fmt::Debug for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Construct")
            .field("path", &self.path)
            .field("process", &self.process.name())
            .field("inputs", &self.inputs())
            .finish()
    }
}
