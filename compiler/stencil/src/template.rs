//! The compiled template.

use rayon::prelude::*;

use stencil_eval::{EvalContext, FunctionTable, PostProcessContext, Scope, TopNode};
use stencil_value::EvalError;

/// Per-render configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum depth of nested block and function calls. `None` is
    /// unlimited; the native stack grows as needed.
    pub max_call_depth: Option<usize>,
}

/// A post-processed document, ready to render.
#[derive(Debug)]
pub struct Stencil {
    top: TopNode,
    functions: FunctionTable,
    options: RenderOptions,
}

impl Stencil {
    /// Post-process a single document and freeze its functions.
    pub fn compile(top: TopNode, context: PostProcessContext) -> Result<Self, EvalError> {
        Self::compile_documents(top, Vec::new(), context)
    }

    /// Post-process `main` and every document in `others`, then freeze the
    /// functions.
    ///
    /// Only `main` is rendered. The other documents contribute the blocks
    /// they define (typically overrides of blocks in `main`); they must have
    /// been built with the same `context`, otherwise their blocks are
    /// unknown to it.
    #[tracing::instrument(level = "debug", skip_all, fields(documents = others.len() + 1))]
    pub fn compile_documents(
        mut main: TopNode,
        mut others: Vec<TopNode>,
        mut context: PostProcessContext,
    ) -> Result<Self, EvalError> {
        main.post_process(&mut context)?;
        for document in &mut others {
            document.post_process(&mut context)?;
        }
        let functions = context.finish()?;
        tracing::debug!(functions = functions.len(), "template compiled");

        Ok(Stencil {
            top: main,
            functions,
            options: RenderOptions::default(),
        })
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// A fresh evaluation context over this template's functions, with
    /// `globals` as the bottom scope and an in-memory output buffer.
    pub fn context(&self, globals: Scope) -> EvalContext<'_> {
        EvalContext::builder(&self.functions)
            .variables(globals)
            .max_call_depth(self.options.max_call_depth)
            .build()
    }

    /// Render into a string. On error the partial output is discarded.
    pub fn render(&self, globals: &Scope) -> Result<String, EvalError> {
        let mut ctx = self.context(globals.clone());
        self.render_into(&mut ctx)?;
        Ok(ctx.take_output())
    }

    /// Render into a caller-supplied context, e.g. one writing to stdout.
    ///
    /// The context must have been built over [`Self::functions`].
    pub fn render_into(&self, ctx: &mut EvalContext<'_>) -> Result<(), EvalError> {
        self.top.evaluate(ctx)?;
        Ok(())
    }

    /// Render once per scope, in parallel. Results are in the order of
    /// `scopes`.
    pub fn render_many(&self, scopes: &[Scope]) -> Vec<Result<String, EvalError>> {
        scopes.par_iter().map(|scope| self.render(scope)).collect()
    }
}
