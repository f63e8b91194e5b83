//! Stencil - compiled templates with overridable blocks.
//!
//! A [`Stencil`] owns a post-processed document and the function table its
//! blocks resolved to. Compiling happens once; rendering takes `&self`, so a
//! compiled template can be rendered any number of times, from any number of
//! threads, each render with its own scope and output buffer.
//!
//! Documents are assembled with a [`TreeBuilder`] sharing one
//! [`PostProcessContext`]; the order in which documents open their blocks
//! decides which definition of a name is final and what each `super()`
//! refers to.

mod template;

use std::sync::Once;

pub use template::{RenderOptions, Stencil};

pub use stencil_eval::{
    ControlStatement, EvalContext, EvalContextBuilder, Expr, FunctionTable, NativeFn, Output,
    PostProcessContext, Scope, TopNode, TreeBuilder,
};
pub use stencil_ir::SourceLocation;
pub use stencil_value::{EvalError, EvalErrorKind, EvalResult, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize the tracing subscriber.
///
/// Does nothing unless `RUST_LOG` is set, e.g. `RUST_LOG=stencil_eval=debug`
/// to see block registration and function calls. Safe to call repeatedly.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
