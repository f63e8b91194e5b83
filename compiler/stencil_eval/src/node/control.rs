use std::fmt;

use stencil_ir::SourceLocation;
use stencil_value::{EvalError, EvalResult, Value};

use crate::context::{EvalContext, PostProcessContext};
use crate::expr::Expr;

/// `#break`, `#continue` or `#return [expression]`.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlStatement {
    Break,
    Continue,
    Return(Option<Expr>),
}

/// A control statement. Evaluates to the matching signal, which travels up
/// to the loop or function that consumes it.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlNode {
    location: SourceLocation,
    statement: ControlStatement,
}

impl ControlNode {
    pub fn new(location: SourceLocation, statement: ControlStatement) -> Self {
        ControlNode {
            location,
            statement,
        }
    }

    #[inline]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn statement(&self) -> &ControlStatement {
        &self.statement
    }

    pub fn post_process(&mut self, context: &mut PostProcessContext) -> Result<(), EvalError> {
        match &mut self.statement {
            ControlStatement::Return(Some(expression)) => expression
                .post_process(context)
                .map_err(|e| e.merge_location(&self.location)),
            _ => Ok(()),
        }
    }

    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        match &self.statement {
            ControlStatement::Break => Ok(Value::break_signal()),
            ControlStatement::Continue => Ok(Value::continue_signal()),
            ControlStatement::Return(None) => Ok(Value::return_with(Value::Undefined)),
            ControlStatement::Return(Some(expression)) => {
                let payload = expression
                    .evaluate(ctx)
                    .map_err(|e| e.merge_location(&self.location))?;
                Ok(Value::return_with(payload))
            }
        }
    }
}

impl fmt::Display for ControlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.statement {
            ControlStatement::Break => write!(f, "<break>"),
            ControlStatement::Continue => write!(f, "<continue>"),
            ControlStatement::Return(None) => write!(f, "<return>"),
            ControlStatement::Return(Some(expression)) => write!(f, "<return {expression}>"),
        }
    }
}
