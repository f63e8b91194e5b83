//! Parser-facing construction of document trees.
//!
//! The builder keeps a stack of open nodes rooted at a [`TopNode`]. Leaf
//! nodes are appended to the innermost open node; `#if` and `#block` open a
//! new node that [`TreeBuilder::close`] appends to its parent. Every refusal
//! by a node becomes a [`StructuralAppendRejected`] error at the location of
//! the offending construct.
//!
//! [`StructuralAppendRejected`]: stencil_value::EvalErrorKind::StructuralAppendRejected

use stencil_ir::SourceLocation;
use stencil_value::{structural_append_rejected, EvalError, EvalNote};

use crate::context::PostProcessContext;
use crate::expr::Expr;
use crate::node::{
    BlockNode, ControlNode, ControlStatement, IfNode, PlaceholderNode, StencilNode, TextNode,
    TopNode,
};

/// Builds one document. Blocks register with the shared context as they are
/// opened.
pub struct TreeBuilder<'ctx> {
    context: &'ctx mut PostProcessContext,
    /// Open nodes; the document root is always at the bottom.
    stack: Vec<StencilNode>,
}

impl<'ctx> TreeBuilder<'ctx> {
    pub fn new(context: &'ctx mut PostProcessContext, location: SourceLocation) -> Self {
        TreeBuilder {
            context,
            stack: vec![StencilNode::Top(TopNode::new(location))],
        }
    }

    /// Number of open `#if`/`#block` nodes.
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    fn current(
        &mut self,
        construct: &str,
        location: &SourceLocation,
    ) -> Result<&mut StencilNode, EvalError> {
        self.stack
            .last_mut()
            .ok_or_else(|| rejected(construct, location))
    }

    /// Append a leaf node to the innermost open node.
    pub fn append(&mut self, node: impl Into<StencilNode>) -> Result<(), EvalError> {
        let node = node.into();
        let location = node.location().clone();
        let construct = construct_name(&node);
        if self.current(construct, &location)?.append(node) {
            Ok(())
        } else {
            Err(rejected(construct, &location))
        }
    }

    pub fn text(
        &mut self,
        location: SourceLocation,
        text: impl Into<String>,
    ) -> Result<(), EvalError> {
        self.append(TextNode::new(location, text))
    }

    pub fn placeholder(
        &mut self,
        location: SourceLocation,
        expression: Expr,
    ) -> Result<(), EvalError> {
        self.append(PlaceholderNode::new(location, expression))
    }

    pub fn control(
        &mut self,
        location: SourceLocation,
        statement: ControlStatement,
    ) -> Result<(), EvalError> {
        self.append(ControlNode::new(location, statement))
    }

    /// `#if expression`.
    pub fn open_if(&mut self, location: SourceLocation, expression: Expr) {
        self.stack.push(IfNode::new(location, expression).into());
    }

    /// `#elif expression`. The innermost open node must be an `#if` without
    /// an `#else`.
    pub fn found_elif(
        &mut self,
        location: SourceLocation,
        expression: Expr,
    ) -> Result<(), EvalError> {
        if self
            .current("#elif", &location)?
            .found_elif(location.clone(), expression)
        {
            Ok(())
        } else {
            Err(rejected("#elif", &location))
        }
    }

    /// `#else`. The innermost open node must be an `#if` without an `#else`.
    pub fn found_else(&mut self, location: SourceLocation) -> Result<(), EvalError> {
        if self
            .current("#else", &location)?
            .found_else(location.clone())
        {
            Ok(())
        } else {
            Err(rejected("#else", &location))
        }
    }

    /// `#block name`. Registers the block's function immediately, so a later
    /// block of the same name overrides this one.
    pub fn open_block(&mut self, location: SourceLocation, name: &Expr) -> Result<(), EvalError> {
        let block = BlockNode::from_name_expression(location, self.context, name)?;
        self.stack.push(block.into());
        Ok(())
    }

    /// `#end`: close the innermost open node and append it to its parent.
    pub fn close(&mut self, location: SourceLocation) -> Result<(), EvalError> {
        if self.stack.len() <= 1 {
            return Err(rejected("#end", &location));
        }
        let Some(node) = self.stack.pop() else {
            return Err(rejected("#end", &location));
        };
        let construct = construct_name(&node);
        let opened_at = node.location().clone();
        if self.current("#end", &location)?.append(node) {
            Ok(())
        } else {
            Err(rejected(construct, &location)
                .with_note(EvalNote::at(format!("{construct} opened here"), opened_at)))
        }
    }

    /// Finish the document. Every `#if` and `#block` must be closed.
    pub fn finish(mut self, location: SourceLocation) -> Result<TopNode, EvalError> {
        if self.stack.len() > 1 {
            let mut error = rejected("end of document", &location);
            for open in self.stack.iter().skip(1) {
                error = error.with_note(EvalNote::at(
                    format!("unclosed {}", construct_name(open)),
                    open.location().clone(),
                ));
            }
            return Err(error);
        }
        match self.stack.pop() {
            Some(StencilNode::Top(top)) => Ok(top),
            _ => Err(rejected("end of document", &location)),
        }
    }
}

#[cold]
fn rejected(construct: &str, location: &SourceLocation) -> EvalError {
    structural_append_rejected(construct).with_location(location.clone())
}

/// How a node is named in structural errors.
fn construct_name(node: &StencilNode) -> &'static str {
    match node {
        StencilNode::Top(_) => "document",
        StencilNode::Text(_) => "text",
        StencilNode::Placeholder(_) => "placeholder",
        StencilNode::If(_) => "#if",
        StencilNode::Block(_) => "#block",
        StencilNode::Control(node) => match node.statement() {
            ControlStatement::Break => "#break",
            ControlStatement::Continue => "#continue",
            ControlStatement::Return(_) => "#return",
        },
    }
}
