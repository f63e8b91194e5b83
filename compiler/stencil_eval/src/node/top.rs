use std::fmt;

use stencil_ir::SourceLocation;
use stencil_value::{illegal_control_escape, Boundary, EvalError, EvalResult, Value};

use crate::context::{EvalContext, PostProcessContext};

use super::{append_child, evaluate_children, fmt_children, post_process_children, StencilNode};

/// Root of a document.
#[derive(Debug)]
pub struct TopNode {
    location: SourceLocation,
    children: Vec<StencilNode>,
    post_processed: bool,
}

impl TopNode {
    pub fn new(location: SourceLocation) -> Self {
        TopNode {
            location,
            children: Vec::new(),
            post_processed: false,
        }
    }

    #[inline]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn children(&self) -> &[StencilNode] {
        &self.children
    }

    pub fn is_post_processed(&self) -> bool {
        self.post_processed
    }

    /// Refused once the document has been post-processed.
    pub fn append(&mut self, child: StencilNode) -> bool {
        if self.post_processed {
            return false;
        }
        append_child(&mut self.children, child);
        true
    }

    /// Run the post-process pass over the whole document.
    ///
    /// A second call is a no-op.
    #[tracing::instrument(level = "debug", skip_all, fields(location = %self.location))]
    pub fn post_process(&mut self, context: &mut PostProcessContext) -> Result<(), EvalError> {
        if self.post_processed {
            return Ok(());
        }
        post_process_children(&mut self.children, context)
            .map_err(|e| e.merge_location(&self.location))?;
        self.post_processed = true;
        Ok(())
    }

    /// Render the document.
    ///
    /// A break, continue or return that reaches the root had nothing to
    /// consume it and is reported as an error.
    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        let result = evaluate_children(ctx, &self.children)
            .map_err(|e| e.merge_location(&self.location))?;

        match result.signal() {
            Some(signal) => Err(illegal_control_escape(signal.kind(), Boundary::Top)
                .with_location(self.location.clone())),
            None => Ok(Value::Undefined),
        }
    }
}

impl fmt::Display for TopNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<top ")?;
        fmt_children(f, &self.children)?;
        write!(f, ">")
    }
}
