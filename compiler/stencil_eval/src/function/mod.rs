//! Callable functions: block bodies and host functions.
//!
//! Functions live in an arena and are referenced by [`FunctionId`]. The
//! post-process context owns the arena while documents are being built and
//! hands it over as a read-only [`FunctionTable`] once every document has
//! been post-processed, so a compiled template can be rendered from several
//! threads at once.

use std::fmt;
use std::sync::Arc;

use stencil_ir::SourceLocation;
use stencil_value::{
    illegal_control_escape, unresolved_block, Boundary, EvalNote, EvalResult, Value,
};

use crate::context::EvalContext;
use crate::node::{evaluate_children, StencilNode};

/// Host function callable from template expressions.
pub type NativeFn = fn(&[Value]) -> EvalResult;

/// Handle of a function in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionId(u32);

impl FunctionId {
    /// Handle of the arena entry at `index`.
    ///
    /// # Panics
    /// Panics if the arena exceeds capacity (over 4 billion blocks and host
    /// functions).
    pub(crate) fn from_index(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(id) => FunctionId(id),
            Err(_) => panic!("function arena exceeds capacity: index {index}"),
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

/// The body of a `#block`, shared between the block node and the arena.
#[derive(Debug)]
pub struct BlockFunction {
    pub name: String,
    /// Location of the `#block` that defined this body.
    pub location: SourceLocation,
    /// Installed when the defining block is post-processed.
    pub(crate) body: Option<Arc<[StencilNode]>>,
}

impl BlockFunction {
    pub(crate) fn new(name: String, location: SourceLocation) -> Self {
        BlockFunction {
            name,
            location,
            body: None,
        }
    }

    /// Whether the defining block has been post-processed.
    pub fn is_defined(&self) -> bool {
        self.body.is_some()
    }

    /// Run the body in a fresh scope frame.
    ///
    /// Arguments are accepted for call-compatibility with host functions;
    /// block bodies don't bind parameters. A control signal escaping the body
    /// is an error; any ordinary result collapses to `Undefined`.
    fn call(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        let Some(body) = &self.body else {
            return Err(unresolved_block(&self.name).with_location(self.location.clone()));
        };

        let result = {
            let mut scoped = ctx.scoped();
            evaluate_children(&mut scoped, body)
        };
        let result = result.map_err(|e| {
            e.merge_location(&self.location).with_note(EvalNote::at(
                format!("in #block `{}`", self.name),
                self.location.clone(),
            ))
        })?;

        match result.signal() {
            Some(signal) => Err(illegal_control_escape(signal.kind(), Boundary::Block)
                .with_location(self.location.clone())),
            None => Ok(Value::Undefined),
        }
    }
}

/// A function registered with the post-process context.
#[derive(Debug)]
pub enum Function {
    Block(BlockFunction),
    Native { name: String, func: NativeFn },
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Block(block) => &block.name,
            Function::Native { name, .. } => name,
        }
    }

    pub(crate) fn call(&self, ctx: &mut EvalContext<'_>, args: &[Value]) -> EvalResult {
        match self {
            Function::Block(block) => block.call(ctx),
            Function::Native { func, .. } => func(args),
        }
    }
}

/// Read-only function arena produced by
/// [`PostProcessContext::finish`](crate::PostProcessContext::finish).
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: Vec<Function>,
}

impl FunctionTable {
    pub(crate) fn new(functions: Vec<Function>) -> Self {
        FunctionTable { functions }
    }

    #[inline]
    pub fn get(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
