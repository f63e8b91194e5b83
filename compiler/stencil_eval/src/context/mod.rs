//! The two contexts that drive a template.
//!
//! - [`PostProcessContext`]: compile-time. Owns the function registry and the
//!   `super` stack; consumed once every document has been post-processed.
//! - [`EvalContext`]: run-time. Owns the scope stack and output sink of a
//!   single render.

mod eval;
mod post_process;

pub use eval::{EvalContext, EvalContextBuilder, ScopedContext};
pub use post_process::PostProcessContext;

#[cfg(test)]
mod tests;
