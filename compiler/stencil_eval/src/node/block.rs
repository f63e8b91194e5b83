use std::fmt;
use std::sync::Arc;

use stencil_ir::SourceLocation;
use stencil_value::{
    illegal_control_escape, unresolved_block, Boundary, EvalError, EvalResult, Value,
};

use crate::context::{EvalContext, PostProcessContext};
use crate::expr::Expr;
use crate::function::FunctionId;
use crate::stack::ensure_sufficient_stack;

use super::{append_child, fmt_children, post_process_children, StencilNode};

/// `#block name`: a named, overridable template fragment.
///
/// Construction registers the block's function under its name; whatever was
/// registered before becomes this block's `super`. Evaluation always calls
/// the *final* function registered under the name, which is how a later
/// document overrides an earlier one.
#[derive(Debug)]
pub struct BlockNode {
    location: SourceLocation,
    name: String,
    /// The function this block defines.
    own: FunctionId,
    /// Previous registration of the name, captured at construction.
    super_function: Option<FunctionId>,
    /// Final registration of the name, bound by post-processing.
    function: Option<FunctionId>,
    /// Children while the tree is being built.
    children: Vec<StencilNode>,
    /// Children after post-processing, shared with the function table.
    body: Option<Arc<[StencilNode]>>,
}

impl BlockNode {
    pub fn new(location: SourceLocation, context: &mut PostProcessContext, name: &str) -> Self {
        let own = context.declare_block(name, location.clone());
        let super_function = context.set_function(name, own);
        BlockNode {
            location,
            name: name.to_string(),
            own,
            super_function,
            function: None,
            children: Vec::new(),
            body: None,
        }
    }

    /// Create a block named by a plain name expression, as written in
    /// `#block name`.
    pub fn from_name_expression(
        location: SourceLocation,
        context: &mut PostProcessContext,
        name: &Expr,
    ) -> Result<Self, EvalError> {
        match name.name() {
            Some(name) => Ok(Self::new(location, context, name)),
            None => Err(EvalError::new(format!(
                "expected a name after #block, got `{name}`"
            ))
            .with_location(location)),
        }
    }

    #[inline]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function this block itself defines.
    pub fn own_function(&self) -> FunctionId {
        self.own
    }

    pub fn super_function(&self) -> Option<FunctionId> {
        self.super_function
    }

    /// The function evaluation calls; `None` until post-processed.
    pub fn function(&self) -> Option<FunctionId> {
        self.function
    }

    fn children(&self) -> &[StencilNode] {
        match &self.body {
            Some(body) => &body[..],
            None => &self.children[..],
        }
    }

    /// Appending after post-processing is refused: the body is already
    /// shared with the function table.
    pub fn append(&mut self, child: StencilNode) -> bool {
        if self.body.is_some() {
            return false;
        }
        append_child(&mut self.children, child);
        true
    }

    pub fn post_process(&mut self, context: &mut PostProcessContext) -> Result<(), EvalError> {
        if self.body.is_some() {
            return Ok(());
        }
        ensure_sufficient_stack(|| self.post_process_body(context))
            .map_err(|e| e.merge_location(&self.location))
    }

    fn post_process_body(&mut self, context: &mut PostProcessContext) -> Result<(), EvalError> {
        self.function = Some(context.get_function(&self.name)?);

        context.push_super(self.super_function);
        let result = post_process_children(&mut self.children, context);
        context.pop_super();
        result?;

        let body: Arc<[StencilNode]> = Arc::from(std::mem::take(&mut self.children));
        context.define_block_body(self.own, Arc::clone(&body));
        self.body = Some(body);
        Ok(())
    }

    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        let Some(function) = self.function else {
            return Err(unresolved_block(&self.name).with_location(self.location.clone()));
        };

        let result = ctx
            .call(function, &[])
            .map_err(|e| e.merge_location(&self.location))?;

        match result.signal() {
            Some(signal) => Err(illegal_control_escape(signal.kind(), Boundary::Block)
                .with_location(self.location.clone())),
            None => Ok(Value::Undefined),
        }
    }
}

impl fmt::Display for BlockNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<block {} ", self.name)?;
        fmt_children(f, self.children())?;
        write!(f, ">")
    }
}
