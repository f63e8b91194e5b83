#![allow(clippy::unwrap_used)]

use super::*;

use std::sync::Arc;

use stencil_ir::SourceLocation;
use stencil_value::{EvalError, EvalErrorKind, EvalResult, Value};

use crate::function::{Function, FunctionId, FunctionTable};
use crate::node::{StencilNode, TextNode};
use crate::output::Output;

fn loc(line: u32) -> SourceLocation {
    SourceLocation::anonymous(line, 1)
}

fn answer(_args: &[Value]) -> EvalResult {
    Ok(Value::Int(42))
}

fn count_args(args: &[Value]) -> EvalResult {
    Ok(Value::Int(i64::try_from(args.len()).unwrap()))
}

fn text_body(text: &str) -> Arc<[StencilNode]> {
    Arc::from(vec![StencilNode::Text(TextNode::new(loc(1), text))])
}

mod post_process_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_function_returns_previous_registration() {
        let mut pp = PostProcessContext::new();
        let first = pp.declare_block("greet", loc(1));
        let second = pp.declare_block("greet", loc(5));

        assert_eq!(pp.set_function("greet", first), None);
        assert_eq!(pp.set_function("greet", second), Some(first));
        assert_eq!(pp.get_function("greet").unwrap(), second);
    }

    #[test]
    fn get_function_of_unknown_name_is_unresolved_block() {
        let pp = PostProcessContext::new();
        let err = pp.get_function("missing").unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::UnresolvedBlock {
                name: "missing".to_string()
            }
        );
        assert_eq!(pp.lookup_function("missing"), None);
    }

    #[test]
    fn block_overrides_native_of_same_name() {
        let mut pp = PostProcessContext::new();
        let native = pp.register_native("title", answer);
        assert_eq!(native, None);

        let native = pp.lookup_function("title").unwrap();
        let block = pp.declare_block("title", loc(3));
        assert_eq!(pp.set_function("title", block), Some(native));
    }

    #[test]
    fn super_stack_is_lifo() {
        let mut pp = PostProcessContext::new();
        let a = pp.declare_block("a", loc(1));
        let b = pp.declare_block("b", loc(2));

        pp.push_super(Some(a));
        pp.push_super(Some(b));
        assert_eq!(pp.super_depth(), 2);
        assert_eq!(pp.super_function().unwrap(), b);

        pp.pop_super();
        assert_eq!(pp.super_function().unwrap(), a);
        pp.pop_super();
        assert_eq!(pp.super_depth(), 0);
    }

    #[test]
    fn super_outside_any_block() {
        let pp = PostProcessContext::new();
        let err = pp.super_function().unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::SuperOutsideBlock);
    }

    #[test]
    fn super_in_block_without_previous_definition() {
        let mut pp = PostProcessContext::new();
        pp.push_super(None);
        let err = pp.super_function().unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::UndefinedSuper);
        pp.pop_super();
    }

    #[test]
    #[should_panic(expected = "without a matching push_super")]
    fn pop_super_on_empty_stack_panics() {
        let mut pp = PostProcessContext::new();
        pp.pop_super();
    }

    #[test]
    fn finish_rejects_block_without_body() {
        let mut pp = PostProcessContext::new();
        let id = pp.declare_block("footer", loc(9));
        pp.set_function("footer", id);

        let err = pp.finish().unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::UnresolvedBlock {
                name: "footer".to_string()
            }
        );
        assert_eq!(err.location, Some(loc(9)));
    }

    #[test]
    fn finish_produces_table_with_every_function() {
        let mut pp = PostProcessContext::new();
        pp.register_native("answer", answer);
        let id = pp.declare_block("footer", loc(9));
        pp.set_function("footer", id);
        pp.define_block_body(id, text_body("bye"));

        let table = pp.finish().unwrap();
        assert_eq!(table.len(), 2);
        match table.get(id) {
            Some(Function::Block(block)) => {
                assert!(block.is_defined());
                assert_eq!(block.name, "footer");
            }
            other => panic!("expected block function, got {other:?}"),
        }
    }
}

mod eval_context_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table_with_block(text: &str) -> (FunctionTable, FunctionId) {
        let mut pp = PostProcessContext::new();
        let id = pp.declare_block("body", loc(1));
        pp.set_function("body", id);
        pp.define_block_body(id, text_body(text));
        (pp.finish().unwrap(), id)
    }

    #[test]
    fn lookup_finds_globals_and_reports_undefined_names() {
        let table = FunctionTable::default();
        let ctx = EvalContext::builder(&table).variable("who", "World").build();

        assert_eq!(ctx.lookup("who").unwrap(), Value::string("World"));
        let err = ctx.lookup("nobody").unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::UndefinedName {
                name: "nobody".to_string()
            }
        );
    }

    #[test]
    fn scoped_frame_is_popped_on_drop() {
        let table = FunctionTable::default();
        let mut ctx = EvalContext::new(&table);
        assert_eq!(ctx.scope_depth(), 1);
        {
            let mut scoped = ctx.scoped();
            scoped.define("local", Value::Int(1));
            assert_eq!(scoped.scope_depth(), 2);
            assert_eq!(scoped.lookup("local").unwrap(), Value::Int(1));
        }
        assert_eq!(ctx.scope_depth(), 1);
        assert!(ctx.lookup("local").is_err());
    }

    #[test]
    fn scoped_frame_is_popped_when_an_error_unwinds() {
        fn fails(ctx: &mut EvalContext<'_>) -> Result<(), EvalError> {
            let scoped = ctx.scoped();
            scoped.lookup("missing")?;
            Ok(())
        }

        let table = FunctionTable::default();
        let mut ctx = EvalContext::new(&table);
        assert!(fails(&mut ctx).is_err());
        assert_eq!(ctx.scope_depth(), 1);
    }

    #[test]
    fn without_output_discards_and_restores() {
        let table = FunctionTable::default();
        let mut ctx = EvalContext::new(&table);
        ctx.write("kept ");
        ctx.without_output(|ctx| ctx.write("dropped"));
        ctx.write("again");
        assert_eq!(ctx.take_output(), "kept again");
        assert_eq!(ctx.output(), "");
    }

    #[test]
    fn call_block_writes_body_in_fresh_frame() {
        let (table, id) = table_with_block("Hi");
        let mut ctx = EvalContext::new(&table);

        assert_eq!(ctx.call(id, &[]).unwrap(), Value::Undefined);
        assert_eq!(ctx.output(), "Hi");
        assert_eq!(ctx.scope_depth(), 1);
        assert_eq!(ctx.call_depth(), 0);
    }

    #[test]
    fn call_native_receives_arguments() {
        let mut pp = PostProcessContext::new();
        pp.register_native("count", count_args);
        let id = pp.lookup_function("count").unwrap();
        let table = pp.finish().unwrap();

        let mut ctx = EvalContext::new(&table);
        let result = ctx.call(id, &[Value::Int(1), Value::Bool(true)]).unwrap();
        assert_eq!(result, Value::Int(2));
    }

    #[test]
    fn call_of_unknown_id_is_undefined_function() {
        let table = FunctionTable::default();
        let mut ctx = EvalContext::new(&table);
        let err = ctx.call(FunctionId::from_index(7), &[]).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::UndefinedFunction {
                name: "fn#7".to_string()
            }
        );
    }

    #[test]
    fn call_depth_limit_rejects_deeper_calls() {
        let (table, id) = table_with_block("x");
        let mut ctx = EvalContext::builder(&table).max_call_depth(Some(0)).build();

        let err = ctx.call(id, &[]).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::RecursionLimitExceeded { depth: 0 });
        assert_eq!(err.notes[0].message, "call stack: body");
        assert_eq!(ctx.call_depth(), 0);
        assert_eq!(ctx.output(), "");
    }

    #[test]
    fn silent_output_captures_nothing() {
        let (table, id) = table_with_block("Hi");
        let mut ctx = EvalContext::builder(&table).output(Output::Silent).build();
        ctx.call(id, &[]).unwrap();
        assert_eq!(ctx.take_output(), "");
    }
}
