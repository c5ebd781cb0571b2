//! Stock processes for wiring up simulations from configuration.

use crate::error::Result;
use crate::numdict::{ActivationMap, ops};
use crate::process::{Emitted, Inputs, Process, Slot, Wrapped};
use crate::symbol::{Address, ConstructKind, KindSet};

/// Emits the same activations every tick.
#[derive(Debug, Clone)]
pub struct Constant {
    slot: Slot,
    values: ActivationMap,
}

impl Constant {
    pub fn new(values: ActivationMap) -> Self {
        Self {
            slot: Slot::new(KindSet::NODES | ConstructKind::Terminus, Vec::new()),
            values,
        }
    }
}

impl Process for Constant {
    fn name(&self) -> &'static str {
        "Constant"
    }

    fn slot(&self) -> &Slot {
        &self.slot
    }

    fn slot_mut(&mut self) -> &mut Slot {
        &mut self.slot
    }

    fn call(&self, _inputs: &Inputs) -> Result<Option<Emitted>> {
        Ok(Some(self.values.clone().into()))
    }
}

/// Elementwise maximum over every expected input.
#[derive(Debug, Clone)]
pub struct MaxJoin {
    slot: Slot,
}

impl MaxJoin {
    pub fn new(expected: Vec<Address>) -> Self {
        Self {
            slot: Slot::new(KindSet::BASIC, expected),
        }
    }

    /// Join followed by a cut: entries at or below `th` are dropped.
    pub fn thresholded(expected: Vec<Address>, th: f64) -> Wrapped<MaxJoin> {
        Wrapped::new(MaxJoin::new(expected))
            .with_postprocess(move |_, out| ops::threshold(&out, th, false))
    }
}

impl Process for MaxJoin {
    fn name(&self) -> &'static str {
        "MaxJoin"
    }

    fn slot(&self) -> &Slot {
        &self.slot
    }

    fn slot_mut(&mut self) -> &mut Slot {
        &mut self.slot
    }

    fn call(&self, inputs: &Inputs) -> Result<Option<Emitted>> {
        let joined = self
            .extract_inputs(inputs)?
            .into_iter()
            .fold(ActivationMap::empty(), |acc, d| ops::max(&acc, d));
        Ok(Some(joined.into()))
    }
}
