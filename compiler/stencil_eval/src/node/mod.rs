//! Document nodes.
//!
//! A document is a tree rooted at a [`TopNode`]. Container nodes (`Top`,
//! `If`, `Block`) own their children; the parser grows the tree through
//! [`StencilNode::append`], [`StencilNode::found_elif`] and
//! [`StencilNode::found_else`], which return `false` when the node can't take
//! the piece. The tree builder turns those refusals into errors.
//!
//! # Left alignment
//!
//! Control statements (`#if`, `#block`, `#break`, ...) sit on their own line
//! in the source. When one is appended, the text before it on that line is
//! trimmed ([`TextNode::left_align`]) so the statement leaves no indentation
//! behind in the output. The post-process pass does the same for the last
//! child of every child sequence, which precedes the closing `#end`.

mod block;
mod control;
mod if_node;
mod placeholder;
mod text;
mod top;

use std::fmt;

use stencil_ir::SourceLocation;
use stencil_value::{EvalError, EvalResult, Value};

use crate::context::{EvalContext, PostProcessContext};
use crate::expr::Expr;

pub use block::BlockNode;
pub use control::{ControlNode, ControlStatement};
pub use if_node::IfNode;
pub use placeholder::PlaceholderNode;
pub use text::TextNode;
pub use top::TopNode;

/// A node of a document tree.
#[derive(Debug)]
pub enum StencilNode {
    Top(TopNode),
    Text(TextNode),
    Placeholder(PlaceholderNode),
    If(IfNode),
    Block(BlockNode),
    Control(ControlNode),
}

impl StencilNode {
    pub fn location(&self) -> &SourceLocation {
        match self {
            StencilNode::Top(node) => node.location(),
            StencilNode::Text(node) => node.location(),
            StencilNode::Placeholder(node) => node.location(),
            StencilNode::If(node) => node.location(),
            StencilNode::Block(node) => node.location(),
            StencilNode::Control(node) => node.location(),
        }
    }

    /// Append a child to the node's current child sequence.
    ///
    /// Returns `false` if this node takes no children (or no longer does).
    pub fn append(&mut self, child: StencilNode) -> bool {
        match self {
            StencilNode::Top(node) => node.append(child),
            StencilNode::If(node) => node.append(child),
            StencilNode::Block(node) => node.append(child),
            StencilNode::Text(_) | StencilNode::Placeholder(_) | StencilNode::Control(_) => false,
        }
    }

    /// Start an `#elif` branch. Only an `#if` before its `#else` accepts one.
    pub fn found_elif(&mut self, location: SourceLocation, expression: Expr) -> bool {
        match self {
            StencilNode::If(node) => node.found_elif(location, expression),
            _ => false,
        }
    }

    /// Start the `#else` branch. Only an `#if` without one accepts it.
    pub fn found_else(&mut self, location: SourceLocation) -> bool {
        match self {
            StencilNode::If(node) => node.found_else(location),
            _ => false,
        }
    }

    /// Trim trailing indentation. Only text nodes have any.
    pub fn left_align(&mut self) {
        if let StencilNode::Text(node) = self {
            node.left_align();
        }
    }

    /// Whether appending this node left-aligns its previous sibling.
    pub fn should_left_align(&self) -> bool {
        match self {
            StencilNode::Text(_) | StencilNode::Placeholder(_) | StencilNode::Top(_) => false,
            StencilNode::If(_) | StencilNode::Block(_) | StencilNode::Control(_) => true,
        }
    }

    pub fn post_process(&mut self, context: &mut PostProcessContext) -> Result<(), EvalError> {
        match self {
            StencilNode::Top(node) => node.post_process(context),
            StencilNode::Text(_) => Ok(()),
            StencilNode::Placeholder(node) => node.post_process(context),
            StencilNode::If(node) => node.post_process(context),
            StencilNode::Block(node) => node.post_process(context),
            StencilNode::Control(node) => node.post_process(context),
        }
    }

    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> EvalResult {
        match self {
            StencilNode::Top(node) => node.evaluate(ctx),
            StencilNode::Text(node) => Ok(node.evaluate(ctx)),
            StencilNode::Placeholder(node) => node.evaluate(ctx),
            StencilNode::If(node) => node.evaluate(ctx),
            StencilNode::Block(node) => node.evaluate(ctx),
            StencilNode::Control(node) => node.evaluate(ctx),
        }
    }
}

impl fmt::Display for StencilNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StencilNode::Top(node) => fmt::Display::fmt(node, f),
            StencilNode::Text(node) => fmt::Display::fmt(node, f),
            StencilNode::Placeholder(node) => fmt::Display::fmt(node, f),
            StencilNode::If(node) => fmt::Display::fmt(node, f),
            StencilNode::Block(node) => fmt::Display::fmt(node, f),
            StencilNode::Control(node) => fmt::Display::fmt(node, f),
        }
    }
}

macro_rules! impl_from_node {
    ($($variant:ident($node:ty)),* $(,)?) => {
        $(
            impl From<$node> for StencilNode {
                fn from(node: $node) -> Self {
                    StencilNode::$variant(node)
                }
            }
        )*
    };
}

impl_from_node!(
    Top(TopNode),
    Text(TextNode),
    Placeholder(PlaceholderNode),
    If(IfNode),
    Block(BlockNode),
    Control(ControlNode),
);

/// Append `child`, left-aligning the previous sibling first if `child` is a
/// control statement.
pub(crate) fn append_child(children: &mut Vec<StencilNode>, child: StencilNode) {
    if child.should_left_align() {
        if let Some(last) = children.last_mut() {
            last.left_align();
        }
    }
    children.push(child);
}

/// Left-align the last child, then post-process every child in order.
pub(crate) fn post_process_children(
    children: &mut [StencilNode],
    context: &mut PostProcessContext,
) -> Result<(), EvalError> {
    if let Some(last) = children.last_mut() {
        last.left_align();
    }
    for child in children {
        child.post_process(context)?;
    }
    Ok(())
}

/// Evaluate children in order.
///
/// Stops at the first child that yields a value (in practice a control
/// signal) and returns it; otherwise yields `Undefined`.
pub(crate) fn evaluate_children(ctx: &mut EvalContext<'_>, children: &[StencilNode]) -> EvalResult {
    for child in children {
        let result = child.evaluate(ctx)?;
        if !result.is_undefined() {
            return Ok(result);
        }
    }
    Ok(Value::Undefined)
}

fn fmt_children(f: &mut fmt::Formatter<'_>, children: &[StencilNode]) -> fmt::Result {
    for child in children {
        write!(f, "{child}")?;
    }
    Ok(())
}
