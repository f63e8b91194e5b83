//! Compile-time context: function registry and `super` stack.
//!
//! Blocks register while the tree is being built, in document order. Only
//! after every document has been built does the post-process pass ask for
//! the *final* function of each name, so a block defined later (or in a
//! derived document) overrides an earlier one without forward declarations.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use stencil_ir::SourceLocation;
use stencil_value::{super_outside_block, undefined_super, unresolved_block, EvalError};

use crate::function::{BlockFunction, Function, FunctionId, FunctionTable, NativeFn};
use crate::node::StencilNode;

/// Registry of block and host functions, consumed by [`Self::finish`].
///
/// Not thread-safe; build and post-process every document on one thread,
/// then share the resulting [`FunctionTable`].
#[derive(Debug, Default)]
pub struct PostProcessContext {
    functions: Vec<Function>,
    registry: FxHashMap<String, FunctionId>,
    super_stack: Vec<Option<FunctionId>>,
}

impl PostProcessContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, function: Function) -> FunctionId {
        let id = FunctionId::from_index(self.functions.len());
        self.functions.push(function);
        id
    }

    /// Allocate the function of a `#block` whose body is installed later by
    /// [`Self::define_block_body`].
    pub fn declare_block(&mut self, name: &str, location: SourceLocation) -> FunctionId {
        self.alloc(Function::Block(BlockFunction::new(name.to_string(), location)))
    }

    /// Install the body of a declared block.
    pub fn define_block_body(&mut self, id: FunctionId, body: Arc<[StencilNode]>) {
        if let Some(Function::Block(block)) = self.functions.get_mut(id.index()) {
            debug_assert!(block.body.is_none(), "block body installed twice");
            block.body = Some(body);
        }
    }

    /// Register a host function under `name`.
    ///
    /// Returns the function previously registered under that name.
    pub fn register_native(&mut self, name: &str, func: NativeFn) -> Option<FunctionId> {
        let id = self.alloc(Function::Native {
            name: name.to_string(),
            func,
        });
        self.set_function(name, id)
    }

    /// Make `id` the active function for `name`.
    ///
    /// Returns the function previously registered under that name; a block
    /// keeps it as the target of its `super()` calls.
    pub fn set_function(&mut self, name: &str, id: FunctionId) -> Option<FunctionId> {
        let previous = self.registry.insert(name.to_string(), id);
        tracing::debug!(name, %id, overrides = previous.is_some(), "registered function");
        previous
    }

    /// The final function registered under `name`.
    pub fn get_function(&self, name: &str) -> Result<FunctionId, EvalError> {
        self.lookup_function(name)
            .ok_or_else(|| unresolved_block(name))
    }

    #[inline]
    pub fn lookup_function(&self, name: &str) -> Option<FunctionId> {
        self.registry.get(name).copied()
    }

    /// Enter a block: `super()` now refers to `super_function`.
    pub fn push_super(&mut self, super_function: Option<FunctionId>) {
        self.super_stack.push(super_function);
    }

    /// Leave the block entered by the matching [`Self::push_super`].
    ///
    /// # Panics
    ///
    /// Panics if there is no matching `push_super`.
    pub fn pop_super(&mut self) {
        let popped = self.super_stack.pop();
        assert!(
            popped.is_some(),
            "pop_super() called without a matching push_super()"
        );
    }

    /// The function `super()` resolves to in the current block.
    pub fn super_function(&self) -> Result<FunctionId, EvalError> {
        match self.super_stack.last() {
            Some(Some(id)) => Ok(*id),
            Some(None) => Err(undefined_super()),
            None => Err(super_outside_block()),
        }
    }

    /// Number of blocks currently being post-processed.
    pub fn super_depth(&self) -> usize {
        self.super_stack.len()
    }

    /// Consume the context and produce the read-only function table.
    ///
    /// Fails if a declared block never had its body installed, i.e. its
    /// document was built with this context but never post-processed.
    pub fn finish(self) -> Result<FunctionTable, EvalError> {
        debug_assert!(self.super_stack.is_empty(), "unbalanced super stack");
        for function in &self.functions {
            if let Function::Block(block) = function {
                if !block.is_defined() {
                    return Err(
                        unresolved_block(&block.name).with_location(block.location.clone())
                    );
                }
            }
        }
        tracing::debug!(functions = self.functions.len(), "function table finished");
        Ok(FunctionTable::new(self.functions))
    }
}
