//! Stencil Value - runtime values and evaluation errors.
//!
//! # Control signals
//!
//! Break, continue and return are not errors. They travel through ordinary
//! evaluation results as [`Value::Signal`] so that conditionals and block
//! bodies can pass them upward, and the node that owns the matching construct
//! (a loop or a function call) consumes them. Any node that marks a boundary
//! checks for a signal explicitly after evaluating its children.

mod errors;
mod value;

pub use errors::{
    illegal_control_escape, recursion_limit_exceeded, structural_append_rejected,
    super_outside_block, type_mismatch, undefined_function, undefined_name, undefined_super,
    unresolved_block, Boundary, EvalError, EvalErrorKind, EvalNote, EvalResult,
};
pub use value::{Signal, SignalKind, Value};
