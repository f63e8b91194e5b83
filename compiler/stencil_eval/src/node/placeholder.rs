use std::fmt;

use stencil_ir::SourceLocation;
use stencil_value::{EvalError, EvalResult, Value};

use crate::context::{EvalContext, PostProcessContext};
use crate::expr::Expr;

/// `${expression}`: writes the text form of the expression's value.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceholderNode {
    location: SourceLocation,
    expression: Expr,
}

impl PlaceholderNode {
    pub fn new(location: SourceLocation, expression: Expr) -> Self {
        PlaceholderNode {
            location,
            expression,
        }
    }

    #[inline]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn post_process(&mut self, context: &mut PostProcessContext) -> Result<(), EvalError> {
        self.expression
            .post_process(context)
            .map_err(|e| e.merge_location(&self.location))
    }

    /// `Undefined` writes nothing; a control signal can't be written at all.
    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        let text = self
            .expression
            .evaluate(ctx)
            .and_then(|value| value.to_text())
            .map_err(|e| e.merge_location(&self.location))?;
        ctx.write(&text);
        Ok(Value::Undefined)
    }
}

impl fmt::Display for PlaceholderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<placeholder {}>", self.expression)
    }
}
