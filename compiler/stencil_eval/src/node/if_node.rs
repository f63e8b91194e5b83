use std::fmt;

use stencil_ir::SourceLocation;
use stencil_value::{EvalError, EvalResult, Value};

use crate::context::{EvalContext, PostProcessContext};
use crate::expr::Expr;

use super::{append_child, evaluate_children, fmt_children, post_process_children, StencilNode};

/// An `#if`/`#elif` branch: condition and children.
#[derive(Debug)]
struct IfBranch {
    location: SourceLocation,
    expression: Expr,
    children: Vec<StencilNode>,
}

#[derive(Debug)]
struct ElseBranch {
    location: SourceLocation,
    children: Vec<StencilNode>,
}

/// `#if` with any number of `#elif` branches and an optional `#else`.
///
/// Exactly one branch runs per evaluation: the first whose condition is
/// truthy, otherwise the `#else` branch if there is one.
#[derive(Debug)]
pub struct IfNode {
    location: SourceLocation,
    branches: Vec<IfBranch>,
    else_branch: Option<ElseBranch>,
    post_processed: bool,
}

impl IfNode {
    pub fn new(location: SourceLocation, expression: Expr) -> Self {
        IfNode {
            branches: vec![IfBranch {
                location: location.clone(),
                expression,
                children: Vec::new(),
            }],
            location,
            else_branch: None,
            post_processed: false,
        }
    }

    #[inline]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Append to the branch opened last.
    pub fn append(&mut self, child: StencilNode) -> bool {
        if self.post_processed {
            return false;
        }
        let children = match &mut self.else_branch {
            Some(branch) => &mut branch.children,
            None => match self.branches.last_mut() {
                Some(branch) => &mut branch.children,
                None => return false,
            },
        };
        append_child(children, child);
        true
    }

    pub fn found_elif(&mut self, location: SourceLocation, expression: Expr) -> bool {
        if self.post_processed || self.else_branch.is_some() {
            return false;
        }
        self.branches.push(IfBranch {
            location,
            expression,
            children: Vec::new(),
        });
        true
    }

    pub fn found_else(&mut self, location: SourceLocation) -> bool {
        if self.post_processed || self.else_branch.is_some() {
            return false;
        }
        self.else_branch = Some(ElseBranch {
            location,
            children: Vec::new(),
        });
        true
    }

    pub fn post_process(&mut self, context: &mut PostProcessContext) -> Result<(), EvalError> {
        if self.post_processed {
            return Ok(());
        }
        for branch in &mut self.branches {
            branch
                .expression
                .post_process(context)
                .map_err(|e| e.merge_location(&branch.location))?;
        }

        for branch in &mut self.branches {
            post_process_children(&mut branch.children, context)
                .map_err(|e| e.merge_location(&branch.location))?;
        }
        if let Some(branch) = &mut self.else_branch {
            post_process_children(&mut branch.children, context)
                .map_err(|e| e.merge_location(&branch.location))?;
        }
        self.post_processed = true;
        Ok(())
    }

    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        for (index, branch) in self.branches.iter().enumerate() {
            // A call inside a condition must not write into the document.
            let taken = ctx
                .without_output(|ctx| branch.expression.evaluate(ctx))
                .and_then(|value| value.to_bool())
                .map_err(|e| e.merge_location(&branch.location))?;

            if taken {
                tracing::trace!(branch = index, location = %branch.location, "if branch taken");
                return evaluate_children(ctx, &branch.children);
            }
        }

        match &self.else_branch {
            Some(branch) => {
                tracing::trace!(location = %branch.location, "else branch taken");
                evaluate_children(ctx, &branch.children)
            }
            None => Ok(Value::Undefined),
        }
    }
}

impl fmt::Display for IfNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, branch) in self.branches.iter().enumerate() {
            let keyword = if index == 0 { "<if" } else { " elif" };
            write!(f, "{keyword} {} ", branch.expression)?;
            fmt_children(f, &branch.children)?;
        }
        if let Some(branch) = &self.else_branch {
            write!(f, " else ")?;
            fmt_children(f, &branch.children)?;
        }
        write!(f, ">")
    }
}
