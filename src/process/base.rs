//! The unit of computation scheduled by the graph.

use crate::error::{GraphError, Result};
use crate::numdict::ActivationMap;
use crate::process::emit::{Emitted, emit};
use crate::symbol::{Address, KindSet};
use std::collections::BTreeMap;

/// Outputs visible to a process during one tick, keyed by absolute address.
pub type Inputs = BTreeMap<Address, ActivationMap>;

/// Binding record every process carries: the kinds it can serve, the
/// inputs it declared, and the path it was entrusted to.
#[derive(Debug, Clone)]
pub struct Slot {
    serves: KindSet,
    expected: Vec<Address>,
    client: Option<Address>,
}

impl Slot {
    pub fn new(serves: KindSet, expected: Vec<Address>) -> Self {
        Self {
            serves,
            expected,
            client: None,
        }
    }

    pub fn client(&self) -> Option<&Address> {
        self.client.as_ref()
    }

    /// Declared addresses, expanded against the client scope once bound.
    pub fn expected(&self) -> Vec<Address> {
        self.expand(&self.expected)
    }

    /// Expand `addrs` against the structure containing the client. Before
    /// entrustment there is nothing to expand against and `addrs` come back
    /// as declared.
    pub fn expand(&self, addrs: &[Address]) -> Vec<Address> {
        match &self.client {
            None => addrs.to_vec(),
            Some(client) => {
                let scope = client.parent().unwrap_or_else(|| client.clone());
                addrs.iter().map(|a| a.expand(&scope)).collect()
            }
        }
    }

    pub fn bind(&mut self, process: &'static str, path: Address) -> Result<()> {
        if let Some(existing) = &self.client {
            return Err(GraphError::AlreadyEntrusted {
                process,
                path: existing.clone(),
            });
        }
        let kind = path.last().kind();
        if !self.serves.contains(kind) {
            return Err(GraphError::KindMismatch {
                process,
                kind,
                path,
            });
        }
        self.client = Some(path);
        Ok(())
    }
}

pub trait Process {
    /// Short type name used in diagnostics.
    fn name(&self) -> &'static str;

    fn slot(&self) -> &Slot;

    fn slot_mut(&mut self) -> &mut Slot;

    fn client(&self) -> Option<&Address> {
        self.slot().client()
    }

    fn expected(&self) -> Vec<Address> {
        self.slot().expected()
    }

    /// Bind to an absolute installation path. Fails on a kind outside the
    /// servable set, or if already bound.
    fn entrust(&mut self, path: Address) -> Result<()> {
        let name = self.name();
        self.slot_mut().bind(name, path)
    }

    /// Core logic. Returning `None` means "nothing to report".
    fn call(&self, _inputs: &Inputs) -> Result<Option<Emitted>> {
        Ok(None)
    }

    fn propagate(&self, inputs: &Inputs) -> Result<ActivationMap> {
        self.check_inputs(inputs)?;
        emit(self.name(), self.call(inputs)?)
    }

    fn check_inputs(&self, inputs: &Inputs) -> Result<()> {
        for target in self.expected() {
            if !inputs.contains_key(&target) {
                return Err(missing_input(self.client(), target));
            }
        }
        Ok(())
    }

    /// Inputs in declared order, for positional consumption.
    fn extract_inputs<'a>(&self, inputs: &'a Inputs) -> Result<Vec<&'a ActivationMap>> {
        self.expected()
            .into_iter()
            .map(|target| inputs.get(&target).ok_or_else(|| missing_input(self.client(), target)))
            .collect()
    }
}

fn missing_input(client: Option<&Address>, target: Address) -> GraphError {
    let consumer = match client {
        Some(c) => c.clone(),
        None => target.clone(),
    };
    GraphError::MissingInput { consumer, target }
}

/// A process with no behavior of its own: declares inputs and emits an
/// empty map.
#[derive(Debug, Clone)]
pub struct Passive {
    slot: Slot,
}

impl Passive {
    pub fn new(serves: KindSet, expected: Vec<Address>) -> Self {
        Self {
            slot: Slot::new(serves, expected),
        }
    }

    /// Serves every leaf kind and expects nothing.
    pub fn basic() -> Self {
        Self::new(KindSet::BASIC, Vec::new())
    }

    pub fn expecting(expected: Vec<Address>) -> Self {
        Self::new(KindSet::BASIC, expected)
    }
}

impl Process for Passive {
    fn name(&self) -> &'static str {
        "Passive"
    }

    fn slot(&self) -> &Slot {
        &self.slot
    }

    fn slot_mut(&mut self) -> &mut Slot {
        &mut self.slot
    }
}
