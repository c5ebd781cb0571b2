//! Graph file (graph.json): a root structure with nested children.
//!
//! JSON shape:
//! {
//!   "name": "agent:A",
//!   "children": [
//!     { "name": "buffer:stimulus",
//!       "process": { "type": "constant", "values": { "red": 1.0 } } },
//!     { "name": "subsystem:nacs",
//!       "children": [
//!         { "name": "chunks:in",
//!           "process": { "type": "max", "expected": ["agent:A/buffer:stimulus"] } },
//!         { "name": "terminus:out",
//!           "process": { "type": "max", "expected": ["chunks:in"], "threshold": 0.5 } }
//!       ] }
//!   ]
//! }
//!
//! A child with `children` is a structure; a child with `process` is a
//! construct. Symbols are `kind:name`; addresses join symbols with '/'.
//! Relative addresses resolve against the structure the construct sits in.

use crate::components::{Constant, MaxJoin};
use crate::graph::{Builder, Structure};
use crate::numdict::ActivationMap;
use crate::process::{Passive, Process, Wrapped};
use crate::symbol::{Address, KindSet, Symbol, parse_address, parse_symbol, symbol_regex};
use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct GraphSpec {
    pub name: String,

    #[serde(default)]
    pub children: Vec<RawNode>,
}

/// Raw child shape as it appears in graph.json.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Structure {
        name: String,
        children: Vec<RawNode>,
    },
    Construct {
        name: String,
        process: RawProcess,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawProcess {
    /// Fixed activations, emitted every tick.
    Constant {
        #[serde(default)]
        values: BTreeMap<String, f64>,
    },

    /// Elementwise max over `expected`, optionally thresholded. `extra`
    /// inputs are required to be present but not joined.
    Max {
        #[serde(default)]
        expected: Vec<String>,

        #[serde(default)]
        extra: Vec<String>,

        #[serde(default)]
        threshold: Option<f64>,
    },

    /// Emits nothing; only declares inputs.
    Empty {
        #[serde(default)]
        expected: Vec<String>,
    },
}

/// Parsed, validated node tree ready for assembly.
#[derive(Debug, Clone)]
pub enum NodeSpec {
    Structure {
        symbol: Symbol,
        children: Vec<NodeSpec>,
    },
    Construct {
        symbol: Symbol,
        process: ProcessSpec,
    },
}

#[derive(Debug, Clone)]
pub enum ProcessSpec {
    Constant(ActivationMap),
    Max {
        expected: Vec<Address>,
        extra: Vec<Address>,
        threshold: Option<f64>,
    },
    Empty(Vec<Address>),
}

#[derive(Debug, Clone)]
pub struct ValidatedGraph {
    pub root: Symbol,
    pub children: Vec<NodeSpec>,
}

impl GraphSpec {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("read graph file {}", path))?;
        Self::from_json(&text).with_context(|| format!("parse graph file {}", path))
    }

    /// Parse every symbol and address. Structural rules (kinds, nesting,
    /// links) are left to assembly.
    pub fn validate(&self) -> anyhow::Result<ValidatedGraph> {
        let re = symbol_regex()?;
        let root = parse_symbol(&re, &self.name).context("root structure name")?;
        let children = self
            .children
            .iter()
            .map(|node| validate_node(&re, node))
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("in structure {}", root))?;

        Ok(ValidatedGraph { root, children })
    }

    pub fn assemble(&self) -> anyhow::Result<Structure> {
        self.validate()?.assemble()
    }
}

impl ValidatedGraph {
    pub fn assemble(&self) -> anyhow::Result<Structure> {
        let structure = Structure::assemble(self.root.clone(), |b| declare(b, &self.children))
            .with_context(|| format!("assemble graph rooted at {}", self.root))?;
        Ok(structure)
    }
}

fn validate_node(re: &Regex, raw: &RawNode) -> anyhow::Result<NodeSpec> {
    match raw {
        RawNode::Structure { name, children } => {
            let symbol = parse_symbol(re, name)?;
            let children = children
                .iter()
                .map(|node| validate_node(re, node))
                .collect::<anyhow::Result<Vec<_>>>()
                .with_context(|| format!("in structure {}", symbol))?;
            Ok(NodeSpec::Structure { symbol, children })
        }
        RawNode::Construct { name, process } => {
            let symbol = parse_symbol(re, name)?;
            let process =
                validate_process(re, process).with_context(|| format!("in construct {}", symbol))?;
            Ok(NodeSpec::Construct { symbol, process })
        }
    }
}

fn validate_process(re: &Regex, raw: &RawProcess) -> anyhow::Result<ProcessSpec> {
    let addresses = |list: &[String]| -> anyhow::Result<Vec<Address>> {
        list.iter().map(|s| parse_address(re, s)).collect()
    };

    Ok(match raw {
        RawProcess::Constant { values } => ProcessSpec::Constant(ActivationMap::from_pairs(
            values.iter().map(|(k, v)| (k.as_str(), *v)),
            0.0,
        )),
        RawProcess::Max {
            expected,
            extra,
            threshold,
        } => ProcessSpec::Max {
            expected: addresses(expected)?,
            extra: addresses(extra)?,
            threshold: *threshold,
        },
        RawProcess::Empty { expected } => ProcessSpec::Empty(addresses(expected)?),
    })
}

fn declare(b: &mut Builder, children: &[NodeSpec]) -> crate::Result<()> {
    for child in children {
        match child {
            NodeSpec::Structure { symbol, children } => {
                b.scope(symbol.clone(), |b| declare(b, children))?;
            }
            NodeSpec::Construct { symbol, process } => {
                b.construct_boxed(symbol.clone(), process.instantiate())?;
            }
        }
    }
    Ok(())
}

impl ProcessSpec {
    pub fn instantiate(&self) -> Box<dyn Process> {
        match self {
            ProcessSpec::Constant(values) => Box::new(Constant::new(values.clone())),
            ProcessSpec::Max {
                expected,
                extra,
                threshold,
            } => {
                if extra.is_empty() && threshold.is_none() {
                    return Box::new(MaxJoin::new(expected.clone()));
                }
                let wrapped = match threshold {
                    Some(th) => MaxJoin::thresholded(expected.clone(), *th),
                    None => Wrapped::new(MaxJoin::new(expected.clone())),
                };
                Box::new(wrapped.expecting(extra.clone()))
            }
            ProcessSpec::Empty(expected) => {
                Box::new(Passive::new(KindSet::BASIC, expected.clone()))
            }
        }
    }
}
