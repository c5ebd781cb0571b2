//! Composition over an existing process.
//!
//! `Composite` adds inputs of its own ahead of the base's and forwards
//! entrustment; `Wrapped` further puts pre- and post-processing hooks
//! around the base. New behavior is layered by wrapping, never by
//! re-implementing the base.

use crate::error::Result;
use crate::numdict::ActivationMap;
use crate::process::base::{Inputs, Process, Slot};
use crate::process::emit::Emitted;
use crate::symbol::Address;

pub struct Composite<P> {
    base: P,
    expected_top: Vec<Address>,
}

impl<P: Process> Composite<P> {
    pub fn new(base: P, expected_top: Vec<Address>) -> Self {
        Self { base, expected_top }
    }

    pub fn base(&self) -> &P {
        &self.base
    }

    /// Inputs expected by the composite layer alone.
    pub fn expected_top(&self) -> Vec<Address> {
        self.base.slot().expand(&self.expected_top)
    }
}

impl<P: Process> Process for Composite<P> {
    fn name(&self) -> &'static str {
        self.base.name()
    }

    fn slot(&self) -> &Slot {
        self.base.slot()
    }

    fn slot_mut(&mut self) -> &mut Slot {
        self.base.slot_mut()
    }

    fn client(&self) -> Option<&Address> {
        self.base.client()
    }

    fn expected(&self) -> Vec<Address> {
        let mut all = self.expected_top();
        all.extend(self.base.expected());
        all
    }

    fn entrust(&mut self, path: Address) -> Result<()> {
        self.base.entrust(path)
    }

    fn call(&self, inputs: &Inputs) -> Result<Option<Emitted>> {
        self.base.call(inputs)
    }
}

pub type Preprocess = Box<dyn Fn(&Inputs) -> Inputs>;
pub type Postprocess = Box<dyn Fn(&Inputs, ActivationMap) -> ActivationMap>;

/// A process run between a preprocessor and a postprocessor.
///
/// `propagate` is `post(inputs, base.propagate(pre(inputs)))`; both hooks
/// default to identity.
pub struct Wrapped<P> {
    inner: Composite<P>,
    pre: Option<Preprocess>,
    post: Option<Postprocess>,
}

impl<P: Process> Wrapped<P> {
    pub fn new(base: P) -> Self {
        Self {
            inner: Composite::new(base, Vec::new()),
            pre: None,
            post: None,
        }
    }

    /// Add inputs consumed by the hooks rather than the base.
    pub fn expecting(mut self, expected_top: Vec<Address>) -> Self {
        self.inner.expected_top = expected_top;
        self
    }

    pub fn with_preprocess(mut self, f: impl Fn(&Inputs) -> Inputs + 'static) -> Self {
        self.pre = Some(Box::new(f));
        self
    }

    pub fn with_postprocess(
        mut self,
        f: impl Fn(&Inputs, ActivationMap) -> ActivationMap + 'static,
    ) -> Self {
        self.post = Some(Box::new(f));
        self
    }

    pub fn base(&self) -> &P {
        self.inner.base()
    }

    pub fn expected_top(&self) -> Vec<Address> {
        self.inner.expected_top()
    }

    pub fn preprocess(&self, inputs: &Inputs) -> Inputs {
        match &self.pre {
            Some(f) => f(inputs),
            None => inputs.clone(),
        }
    }

    pub fn postprocess(&self, inputs: &Inputs, output: ActivationMap) -> ActivationMap {
        match &self.post {
            Some(f) => f(inputs, output),
            None => output,
        }
    }
}

impl<P: Process> Process for Wrapped<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn slot(&self) -> &Slot {
        self.inner.slot()
    }

    fn slot_mut(&mut self) -> &mut Slot {
        self.inner.slot_mut()
    }

    fn client(&self) -> Option<&Address> {
        self.inner.client()
    }

    fn expected(&self) -> Vec<Address> {
        self.inner.expected()
    }

    fn entrust(&mut self, path: Address) -> Result<()> {
        self.inner.entrust(path)
    }

    fn call(&self, inputs: &Inputs) -> Result<Option<Emitted>> {
        let preprocessed = self.preprocess(inputs);
        let output = self.inner.base().propagate(&preprocessed)?;
        Ok(Some(self.postprocess(inputs, output).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::numdict::ops;
    use crate::process::base::Passive;
    use crate::symbol::{Symbol, agent, buffer, chunks, features, subsystem};
    use pretty_assertions::assert_eq;

    fn path(symbols: Vec<Symbol>) -> Address {
        Address::new(symbols).unwrap()
    }

    /// Emits whatever its single input holds.
    struct Echo {
        slot: Slot,
    }

    impl Process for Echo {
        fn name(&self) -> &'static str {
            "Echo"
        }

        fn slot(&self) -> &Slot {
            &self.slot
        }

        fn slot_mut(&mut self) -> &mut Slot {
            &mut self.slot
        }

        fn call(&self, inputs: &Inputs) -> Result<Option<Emitted>> {
            let srcs = self.extract_inputs(inputs)?;
            Ok(srcs.first().map(|d| (*d).clone().into()))
        }
    }

    fn echo(src: Symbol) -> Echo {
        Echo {
            slot: Slot::new(crate::symbol::KindSet::BASIC, vec![Address::from(src)]),
        }
    }

    #[test]
    fn composite_expected_puts_own_inputs_first() {
        let base = Passive::expecting(vec![Address::from(buffer("b1")), Address::from(buffer("b2"))]);
        let mut c = Composite::new(base, vec![Address::from(features("f"))]);

        assert_eq!(
            c.expected(),
            vec![
                Address::from(features("f")),
                Address::from(buffer("b1")),
                Address::from(buffer("b2")),
            ]
        );

        c.entrust(path(vec![agent("A"), subsystem("S"), chunks("out")]))
            .unwrap();
        let scope = path(vec![agent("A"), subsystem("S")]);
        assert_eq!(
            c.expected(),
            vec![
                scope.child(features("f")),
                scope.child(buffer("b1")),
                scope.child(buffer("b2")),
            ]
        );
        assert_eq!(c.expected_top(), vec![scope.child(features("f"))]);
    }

    #[test]
    fn composite_binding_lives_in_the_base() {
        let mut c = Composite::new(Passive::basic(), vec![]);
        let target = path(vec![agent("A"), chunks("out")]);
        c.entrust(target.clone()).unwrap();

        assert_eq!(c.client(), Some(&target));
        assert_eq!(c.base().client(), Some(&target));
        assert!(matches!(
            c.entrust(target),
            Err(GraphError::AlreadyEntrusted { .. })
        ));
    }

    #[test]
    fn wrapped_runs_hooks_around_base() {
        let mut w = Wrapped::new(echo(buffer("in")))
            .expecting(vec![Address::from(buffer("gate"))])
            .with_preprocess(|inputs| {
                inputs
                    .iter()
                    .map(|(k, v)| (k.clone(), ops::threshold(v, 0.5, false)))
                    .collect()
            })
            .with_postprocess(|_, out| ops::renormalize(&out));
        w.entrust(path(vec![agent("A"), chunks("out")])).unwrap();

        let mut inputs = Inputs::new();
        inputs.insert(
            path(vec![agent("A"), buffer("in")]),
            ActivationMap::from_pairs([("x", 0.2), ("y", 0.6), ("z", 1.8)], 0.0),
        );
        inputs.insert(path(vec![agent("A"), buffer("gate")]), ActivationMap::empty());

        let out = w.propagate(&inputs).unwrap();
        assert!(ops::isclose(
            &out,
            &ActivationMap::from_pairs([("y", 0.25), ("z", 0.75)], 0.0)
        ));
    }

    #[test]
    fn wrapped_checks_its_own_inputs_too() {
        let mut w = Wrapped::new(Passive::basic()).expecting(vec![Address::from(buffer("gate"))]);
        w.entrust(path(vec![agent("A"), chunks("out")])).unwrap();

        assert!(matches!(
            w.propagate(&Inputs::new()),
            Err(GraphError::MissingInput { .. })
        ));
    }

    #[test]
    fn wrapped_output_is_still_validated() {
        let mut w = Wrapped::new(Passive::basic())
            .with_postprocess(|_, _| ActivationMap::new(1.0));
        w.entrust(path(vec![agent("A"), chunks("out")])).unwrap();

        assert!(matches!(
            w.propagate(&Inputs::new()),
            Err(GraphError::InvalidDefault(..))
        ));
    }
}
