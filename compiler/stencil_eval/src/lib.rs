//! Stencil Eval - node evaluation for the Stencil template engine.
//!
//! # Architecture
//!
//! A template is a tree of [`StencilNode`]s holding [`Expr`]essions. It goes
//! through two phases:
//!
//! 1. **Post-process** (once per document): every `#block` registered itself
//!    in the [`PostProcessContext`] while the tree was being built. The pass
//!    resolves each block name to its final (last registered) function,
//!    binds `super()` calls to the definition each block overrides, resolves
//!    function calls, and trims trailing whitespace on control lines.
//! 2. **Evaluate** (every render): the tree is walked with an
//!    [`EvalContext`] holding the scope stack, the output sink and the
//!    read-only [`FunctionTable`] produced by the post-process pass.
//!
//! Break, continue and return travel as [`Value::Signal`] results; blocks and
//! the document root reject any signal that reaches them.

mod builder;
mod context;
mod environment;
mod expr;
mod function;
mod node;
mod output;
mod stack;

pub use builder::TreeBuilder;
pub use context::{EvalContext, EvalContextBuilder, PostProcessContext, ScopedContext};
pub use environment::{Environment, Scope};
pub use expr::{CallExpr, Expr, ExprKind};
pub use function::{BlockFunction, Function, FunctionId, FunctionTable, NativeFn};
pub use node::{
    BlockNode, ControlNode, ControlStatement, IfNode, PlaceholderNode, StencilNode, TextNode,
    TopNode,
};
pub use output::Output;
pub use stack::ensure_sufficient_stack;

pub use stencil_ir::SourceLocation;
pub use stencil_value::{EvalError, EvalErrorKind, EvalResult, Signal, SignalKind, Value};

#[cfg(test)]
mod tests;
