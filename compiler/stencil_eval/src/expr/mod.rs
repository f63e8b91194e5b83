//! Expression nodes.
//!
//! Expressions appear in `${...}` placeholders, `#if`/`#elif` conditions,
//! `#return` statements and `#block` names. Each expression owns its
//! operands; function calls are bound to a [`FunctionId`] during the
//! post-process pass and invoked through the [`EvalContext`] at render time.

use std::fmt;

use stencil_ir::SourceLocation;
use stencil_value::{undefined_function, EvalError, EvalResult, Value};

use crate::context::{EvalContext, PostProcessContext};
use crate::function::FunctionId;

/// An expression with the location it was parsed at.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: SourceLocation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Value),
    /// Variable reference.
    Name(String),
    /// Short-circuit `&&`: yields the left operand when it is falsy.
    And(Box<Expr>, Box<Expr>),
    /// Short-circuit `||`: yields the left operand when it is truthy.
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Equal(Box<Expr>, Box<Expr>),
    NotEqual(Box<Expr>, Box<Expr>),
    Call(CallExpr),
}

/// A call of a block or host function by name.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
    /// Bound by the post-process pass.
    resolved: Option<FunctionId>,
}

impl CallExpr {
    /// Call name that refers to the definition the enclosing block overrides.
    pub const SUPER: &'static str = "super";

    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        CallExpr {
            name: name.into(),
            args,
            resolved: None,
        }
    }

    /// The function this call was bound to, once post-processed.
    #[inline]
    pub fn resolved(&self) -> Option<FunctionId> {
        self.resolved
    }

    pub fn is_super(&self) -> bool {
        self.name == Self::SUPER
    }

    fn post_process(&mut self, context: &mut PostProcessContext) -> Result<(), EvalError> {
        for arg in &mut self.args {
            arg.post_process(context)?;
        }

        let id = if self.is_super() {
            context.super_function()?
        } else {
            context
                .lookup_function(&self.name)
                .ok_or_else(|| undefined_function(&self.name))?
        };
        self.resolved = Some(id);
        Ok(())
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        let Some(id) = self.resolved else {
            return Err(undefined_function(&self.name));
        };

        let args = self
            .args
            .iter()
            .map(|arg| arg.evaluate(ctx))
            .collect::<Result<Vec<_>, _>>()?;
        ctx.call(id, &args)
    }
}

impl Expr {
    pub fn new(kind: ExprKind, location: SourceLocation) -> Self {
        Expr { kind, location }
    }

    pub fn literal(location: SourceLocation, value: impl Into<Value>) -> Self {
        Self::new(ExprKind::Literal(value.into()), location)
    }

    pub fn variable(location: SourceLocation, name: impl Into<String>) -> Self {
        Self::new(ExprKind::Name(name.into()), location)
    }

    pub fn and(location: SourceLocation, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::And(Box::new(left), Box::new(right)), location)
    }

    pub fn or(location: SourceLocation, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Or(Box::new(left), Box::new(right)), location)
    }

    pub fn not(location: SourceLocation, operand: Expr) -> Self {
        Self::new(ExprKind::Not(Box::new(operand)), location)
    }

    pub fn equal(location: SourceLocation, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Equal(Box::new(left), Box::new(right)), location)
    }

    pub fn not_equal(location: SourceLocation, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::NotEqual(Box::new(left), Box::new(right)), location)
    }

    pub fn call(location: SourceLocation, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call(CallExpr::new(name, args)), location)
    }

    /// `super(args...)`.
    pub fn super_call(location: SourceLocation, args: Vec<Expr>) -> Self {
        Self::call(location, CallExpr::SUPER, args)
    }

    /// The identifier of a plain name expression.
    ///
    /// Used to name a `#block`; every other expression kind has no name.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Resolve function calls. Must run once before [`Self::evaluate`].
    pub fn post_process(&mut self, context: &mut PostProcessContext) -> Result<(), EvalError> {
        let result = match &mut self.kind {
            ExprKind::Literal(_) | ExprKind::Name(_) => Ok(()),
            ExprKind::Not(operand) => operand.post_process(context),
            ExprKind::And(left, right)
            | ExprKind::Or(left, right)
            | ExprKind::Equal(left, right)
            | ExprKind::NotEqual(left, right) => left
                .post_process(context)
                .and_then(|()| right.post_process(context)),
            ExprKind::Call(call) => call.post_process(context),
        };
        result.map_err(|e| e.merge_location(&self.location))
    }

    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        self.evaluate_kind(ctx)
            .map_err(|e| e.merge_location(&self.location))
    }

    fn evaluate_kind(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        match &self.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Name(name) => ctx.lookup(name),
            ExprKind::And(left, right) => {
                let left = left.evaluate(ctx)?;
                if left.to_bool()? {
                    right.evaluate(ctx)
                } else {
                    Ok(left)
                }
            }
            ExprKind::Or(left, right) => {
                let left = left.evaluate(ctx)?;
                if left.to_bool()? {
                    Ok(left)
                } else {
                    right.evaluate(ctx)
                }
            }
            ExprKind::Not(operand) => Ok(Value::Bool(!operand.evaluate(ctx)?.to_bool()?)),
            ExprKind::Equal(left, right) => {
                let left = left.evaluate(ctx)?;
                let right = right.evaluate(ctx)?;
                Ok(Value::Bool(left.equals(&right)?))
            }
            ExprKind::NotEqual(left, right) => {
                let left = left.evaluate(ctx)?;
                let right = right.evaluate(ctx)?;
                Ok(Value::Bool(!left.equals(&right)?))
            }
            ExprKind::Call(call) => call.evaluate(ctx),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(Value::Str(s)) => write!(f, "{s:?}"),
            ExprKind::Literal(value) => write!(f, "{value}"),
            ExprKind::Name(name) => write!(f, "{name}"),
            ExprKind::And(left, right) => write!(f, "({left} && {right})"),
            ExprKind::Or(left, right) => write!(f, "({left} || {right})"),
            ExprKind::Not(operand) => write!(f, "(!{operand})"),
            ExprKind::Equal(left, right) => write!(f, "({left} == {right})"),
            ExprKind::NotEqual(left, right) => write!(f, "({left} != {right})"),
            ExprKind::Call(call) => {
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
