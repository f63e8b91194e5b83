//! Tests for block overriding and `super()` across documents.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use crate::{
    EvalContext, EvalError, EvalErrorKind, Expr, PostProcessContext, Scope, SourceLocation,
    TopNode, TreeBuilder,
};

fn loc(file: &str, line: u32) -> SourceLocation {
    SourceLocation::new(file, line, 1)
}

/// `#block greet` with `Hi` as its body.
fn base_document(pp: &mut PostProcessContext) -> TopNode {
    let mut builder = TreeBuilder::new(pp, loc("base", 1));
    builder
        .open_block(loc("base", 1), &Expr::variable(loc("base", 1), "greet"))
        .unwrap();
    builder.text(loc("base", 2), "Hi").unwrap();
    builder.close(loc("base", 3)).unwrap();
    builder.finish(loc("base", 4)).unwrap()
}

/// Overrides `greet`, optionally calling `super()` between its texts.
fn override_document(pp: &mut PostProcessContext, call_super: bool) -> TopNode {
    let file = "derived";
    let mut builder = TreeBuilder::new(pp, loc(file, 1));
    builder
        .open_block(loc(file, 1), &Expr::variable(loc(file, 1), "greet"))
        .unwrap();
    builder.text(loc(file, 2), "Hi ").unwrap();
    if call_super {
        builder
            .placeholder(loc(file, 2), Expr::super_call(loc(file, 2), vec![]))
            .unwrap();
    }
    builder.text(loc(file, 2), "!").unwrap();
    builder.close(loc(file, 3)).unwrap();
    builder.finish(loc(file, 4)).unwrap()
}

fn render_base(
    mut base: TopNode,
    mut others: Vec<TopNode>,
    mut pp: PostProcessContext,
) -> Result<String, EvalError> {
    base.post_process(&mut pp)?;
    for other in &mut others {
        other.post_process(&mut pp)?;
    }
    let table = pp.finish()?;
    let mut ctx = EvalContext::new(&table);
    base.evaluate(&mut ctx)?;
    Ok(ctx.take_output())
}

#[test]
fn block_renders_its_own_body_without_override() {
    let mut pp = PostProcessContext::new();
    let base = base_document(&mut pp);
    assert_eq!(render_base(base, vec![], pp).unwrap(), "Hi");
}

#[test]
fn override_calling_super_round_trips() {
    let mut pp = PostProcessContext::new();
    let base = base_document(&mut pp);
    let derived = override_document(&mut pp, true);
    assert_eq!(render_base(base, vec![derived], pp).unwrap(), "Hi Hi!");
}

#[test]
fn override_without_super_replaces_body() {
    let mut pp = PostProcessContext::new();
    let base = base_document(&mut pp);
    let derived = override_document(&mut pp, false);
    assert_eq!(render_base(base, vec![derived], pp).unwrap(), "Hi !");
}

#[test]
fn post_process_order_does_not_matter() {
    let mut pp = PostProcessContext::new();
    let base = base_document(&mut pp);
    let mut derived = override_document(&mut pp, true);
    derived.post_process(&mut pp).unwrap();
    assert_eq!(render_base(base, vec![], pp).unwrap(), "Hi Hi!");
}

#[test]
fn super_chain_walks_every_level() {
    let mut pp = PostProcessContext::new();
    let base = base_document(&mut pp);
    let middle = override_document(&mut pp, true);

    let mut builder = TreeBuilder::new(&mut pp, loc("top", 1));
    builder
        .open_block(loc("top", 1), &Expr::variable(loc("top", 1), "greet"))
        .unwrap();
    builder.text(loc("top", 2), "<").unwrap();
    builder
        .placeholder(loc("top", 2), Expr::super_call(loc("top", 2), vec![]))
        .unwrap();
    builder.text(loc("top", 2), ">").unwrap();
    builder.close(loc("top", 3)).unwrap();
    let outer = builder.finish(loc("top", 4)).unwrap();

    let out = render_base(base, vec![middle, outer], pp).unwrap();
    assert_eq!(out, "<Hi Hi!>");
}

#[test]
fn super_in_first_definition_is_undefined_super() {
    let mut pp = PostProcessContext::new();
    let mut builder = TreeBuilder::new(&mut pp, loc("base", 1));
    builder
        .open_block(loc("base", 1), &Expr::variable(loc("base", 1), "greet"))
        .unwrap();
    builder
        .placeholder(loc("base", 2), Expr::super_call(loc("base", 2), vec![]))
        .unwrap();
    builder.close(loc("base", 3)).unwrap();
    let base = builder.finish(loc("base", 4)).unwrap();

    let err = render_base(base, vec![], pp).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UndefinedSuper);
    assert_eq!(err.location, Some(loc("base", 2)));
}

#[test]
fn override_never_post_processed_is_unresolved() {
    let mut pp = PostProcessContext::new();
    let base = base_document(&mut pp);
    let _derived = override_document(&mut pp, true);

    let err = render_base(base, vec![], pp).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UnresolvedBlock {
            name: "greet".to_string()
        }
    );
    assert_eq!(err.location, Some(loc("derived", 1)));
}

#[test]
fn recursive_block_hits_call_depth_limit() {
    let mut pp = PostProcessContext::new();
    let mut builder = TreeBuilder::new(&mut pp, loc("loop", 1));
    builder
        .open_block(loc("loop", 1), &Expr::variable(loc("loop", 1), "again"))
        .unwrap();
    builder
        .placeholder(loc("loop", 2), Expr::call(loc("loop", 2), "again", vec![]))
        .unwrap();
    builder.close(loc("loop", 3)).unwrap();
    let mut top = builder.finish(loc("loop", 4)).unwrap();

    top.post_process(&mut pp).unwrap();
    let table = pp.finish().unwrap();
    let mut ctx = EvalContext::builder(&table).max_call_depth(Some(8)).build();

    let err = top.evaluate(&mut ctx).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::RecursionLimitExceeded { depth: 8 });
    assert_eq!(
        err.notes[0].message,
        "call stack: ... -> again -> again -> again -> again -> again"
    );
    assert_eq!(ctx.call_depth(), 0);
    assert_eq!(ctx.scope_depth(), 1);
}

#[test]
fn block_frames_are_popped_after_an_error() {
    let mut pp = PostProcessContext::new();
    let mut builder = TreeBuilder::new(&mut pp, loc("page", 1));
    builder
        .open_block(loc("page", 1), &Expr::variable(loc("page", 1), "body"))
        .unwrap();
    builder
        .placeholder(loc("page", 2), Expr::variable(loc("page", 2), "missing"))
        .unwrap();
    builder.close(loc("page", 3)).unwrap();
    let mut top = builder.finish(loc("page", 4)).unwrap();

    top.post_process(&mut pp).unwrap();
    let table = pp.finish().unwrap();
    let mut ctx = EvalContext::builder(&table)
        .variables(Scope::new().with("present", 1_i64))
        .build();

    assert!(top.evaluate(&mut ctx).is_err());
    assert_eq!(ctx.scope_depth(), 1);
    assert!(ctx.lookup("present").is_ok());
}
