//! Build context: the stack of structures open for declarations.
//!
//! Assembly is driven through an explicit `Builder`. `open`/`close` are the
//! low-level pair; `scope` wraps them so the structure is closed (or
//! discarded) on every exit path and the stack is balanced afterwards.

use crate::error::{GraphError, Result};
use crate::graph::construct::Construct;
use crate::graph::structure::{Entry, Link, State, Structure};
use crate::process::Process;
use crate::symbol::{Address, ConstructKind, KindSet, Symbol};

/// Structures nest at most this deep, counting the outermost one.
pub const MAX_DEPTH: usize = 2;

/// Proof of an `open`, consumed by the matching `close`.
#[derive(Debug)]
#[must_use = "an opened structure must be closed"]
pub struct Handle {
    depth: usize,
    symbol: Symbol,
}

impl Handle {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

#[derive(Default)]
pub struct Builder {
    stack: Vec<Structure>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// True when no structure is open.
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }

    /// Open a fresh structure under the current one (or as a root).
    pub fn open(&mut self, symbol: Symbol) -> Result<Handle> {
        self.enter(Structure::new(symbol))
    }

    /// Push `structure` onto the context. Closed structures cannot come back.
    pub fn enter(&mut self, mut structure: Structure) -> Result<Handle> {
        let symbol = structure.symbol().clone();
        if structure.state() == State::Closed {
            return Err(GraphError::ReopenedStructure(symbol));
        }
        if !KindSet::CONTAINERS.contains(symbol.kind()) {
            return Err(GraphError::KindMismatch {
                process: "Structure",
                kind: symbol.kind(),
                path: structure.path().clone(),
            });
        }
        if self.stack.len() >= MAX_DEPTH {
            return Err(GraphError::NestingTooDeep(symbol));
        }

        let path = match self.stack.last() {
            None => Address::from(symbol.clone()),
            Some(parent) => {
                match parent.get(&symbol) {
                    Some(Entry::Structure(_)) => {
                        return Err(GraphError::ReopenedStructure(symbol));
                    }
                    Some(Entry::Construct(_)) => {
                        return Err(GraphError::DuplicateSymbol {
                            parent: parent.path().clone(),
                            symbol,
                        });
                    }
                    None => {}
                }
                parent.path().child(symbol.clone())
            }
        };

        tracing::debug!(structure = %path, "open");
        structure.open_at(path);
        self.stack.push(structure);

        Ok(Handle {
            depth: self.stack.len(),
            symbol,
        })
    }

    /// Declare a leaf in the innermost open structure.
    ///
    /// The process is entrusted to the innermost path plus `symbol` and each of its
    /// inputs is checked against the open scopes before anything is
    /// recorded; a failure leaves the context untouched.
    pub fn construct(&mut self, symbol: Symbol, process: impl Process + 'static) -> Result<Address> {
        self.construct_boxed(symbol, Box::new(process))
    }

    pub fn construct_boxed(&mut self, symbol: Symbol, process: Box<dyn Process>) -> Result<Address> {
        let Some(current) = self.stack.last() else {
            return Err(GraphError::NoOpenStructure(symbol));
        };
        if current.has_child(&symbol) {
            return Err(GraphError::DuplicateSymbol {
                parent: current.path().clone(),
                symbol,
            });
        }

        let path = current.path().child(symbol);
        let construct = Construct::entrust(path.clone(), process)?;

        let mut deferred = Vec::new();
        for target in construct.inputs() {
            if let Some(owner) = self.check_link(&path, &target)? {
                deferred.push((
                    owner,
                    Link {
                        consumer: path.clone(),
                        target,
                    },
                ));
            }
        }

        tracing::debug!(construct = %path, inputs = ?construct.inputs(), "declare");
        for (owner, link) in deferred {
            self.stack[owner].defer(link);
        }
        if let Some(current) = self.stack.last_mut() {
            current.push(Entry::Construct(construct));
        }

        Ok(path)
    }

    /// Decide whether `target` can be reached from the open scopes.
    ///
    /// Returns the stack index of the structure whose close will confirm the
    /// target, or None if it is already confirmed. Reachable targets are
    /// leaves of an open structure, or terminus leaves of a sub-structure
    /// directly under an open structure.
    fn check_link(&self, consumer: &Address, target: &Address) -> Result<Option<usize>> {
        let unresolved = || GraphError::UnresolvedLink {
            consumer: consumer.clone(),
            target: target.clone(),
        };

        let Some(scope) = target.parent() else {
            return Err(unresolved());
        };
        if let Some(i) = self.stack.iter().position(|s| s.path() == &scope) {
            return Ok(Some(i));
        }

        if target.last().kind() != ConstructKind::Terminus {
            return Err(unresolved());
        }
        let Some(grand) = scope.parent() else {
            return Err(unresolved());
        };
        let Some(i) = self.stack.iter().position(|s| s.path() == &grand) else {
            return Err(unresolved());
        };

        match self.stack[i].get(scope.last()) {
            None => Ok(Some(i)),
            Some(Entry::Structure(sub)) if sub.is_closed() => {
                if sub.construct(target.last()).is_some() {
                    Ok(None)
                } else {
                    Err(unresolved())
                }
            }
            Some(_) => Err(unresolved()),
        }
    }

    /// Pop the innermost structure, confirm its deferred links and freeze
    /// its order. Returns the structure if it was the outermost one;
    /// otherwise it is attached to its parent.
    pub fn close(&mut self, handle: Handle) -> Result<Option<Structure>> {
        let matches = self.stack.len() == handle.depth
            && self.stack.last().map(Structure::symbol) == Some(&handle.symbol);
        if !matches {
            return Err(GraphError::UnbalancedClose(handle.symbol));
        }
        let Some(mut structure) = self.stack.pop() else {
            return Err(GraphError::UnbalancedClose(handle.symbol));
        };

        if let Err(e) = structure.seal() {
            self.forget(structure.path());
            return Err(e);
        }
        tracing::debug!(
            structure = %structure.path(),
            order = ?structure.iter().map(Symbol::to_string).collect::<Vec<_>>(),
            "close"
        );

        match self.stack.last_mut() {
            Some(parent) => {
                parent.push(Entry::Structure(structure));
                Ok(None)
            }
            None => Ok(Some(structure)),
        }
    }

    /// Open `symbol`, run `f` inside it, then close it.
    ///
    /// If `f` fails, or leaves structures of its own open, everything down to
    /// and including this structure is discarded before the error returns.
    pub fn scope<F>(&mut self, symbol: Symbol, f: F) -> Result<Option<Structure>>
    where
        F: FnOnce(&mut Builder) -> Result<()>,
    {
        let handle = self.open(symbol)?;
        let depth = handle.depth;

        if let Err(e) = f(self) {
            self.unwind(depth - 1);
            return Err(e);
        }
        if self.stack.len() > depth {
            let leaked = self.stack[self.stack.len() - 1].symbol().clone();
            self.unwind(depth - 1);
            return Err(GraphError::UnbalancedClose(leaked));
        }

        self.close(handle)
    }

    fn unwind(&mut self, depth: usize) {
        while self.stack.len() > depth {
            if let Some(s) = self.stack.pop() {
                tracing::debug!(structure = %s.path(), "discard");
                self.forget(s.path());
            }
        }
    }

    // Links queued on outer scopes by a discarded structure's leaves.
    fn forget(&mut self, discarded: &Address) {
        for open in &mut self.stack {
            open.forget(discarded);
        }
    }
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !self.stack.is_empty() {
            let open: Vec<String> = self.stack.iter().map(|s| s.path().to_string()).collect();
            tracing::warn!(?open, "builder dropped with structures still open");
        }
    }
}

impl Structure {
    /// Assemble a root structure in a fresh build context.
    pub fn assemble<F>(symbol: Symbol, f: F) -> Result<Structure>
    where
        F: FnOnce(&mut Builder) -> Result<()>,
    {
        let mut builder = Builder::new();
        let root = builder.scope(symbol.clone(), f)?;
        root.ok_or(GraphError::UnbalancedClose(symbol))
    }
}
