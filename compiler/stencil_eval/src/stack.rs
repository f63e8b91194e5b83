//! Native stack growth for deeply nested templates.
//!
//! A `#block` inside a `#block` is a function call inside a function call,
//! so the nesting depth of a template becomes native recursion depth in
//! both the post-process pass and rendering.

/// Grow once less than this much stack remains.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, switching to a fresh stack segment if the current one is nearly
/// exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use crate::{EvalContext, Expr, PostProcessContext, SourceLocation, TreeBuilder};

    #[test]
    fn deeply_nested_blocks_render() {
        const DEPTH: u32 = 600;

        let mut pp = PostProcessContext::new();
        let mut builder = TreeBuilder::new(&mut pp, SourceLocation::anonymous(1, 1));
        for line in 1..=DEPTH {
            let location = SourceLocation::anonymous(line, 1);
            let name = Expr::variable(location.clone(), format!("level{line}"));
            builder.open_block(location, &name).unwrap();
        }
        builder
            .text(SourceLocation::anonymous(DEPTH + 1, 1), "deep")
            .unwrap();
        for line in 0..DEPTH {
            builder
                .close(SourceLocation::anonymous(DEPTH + 2 + line, 1))
                .unwrap();
        }
        let mut top = builder
            .finish(SourceLocation::anonymous(2 * DEPTH + 2, 1))
            .unwrap();

        top.post_process(&mut pp).unwrap();
        let table = pp.finish().unwrap();
        let mut ctx = EvalContext::new(&table);
        top.evaluate(&mut ctx).unwrap();

        assert_eq!(ctx.take_output(), "deep");
        assert_eq!(ctx.call_depth(), 0);
        assert_eq!(ctx.scope_depth(), 1);
    }

    #[test]
    fn result_passes_through() {
        let result: Result<u8, &str> = super::ensure_sufficient_stack(|| Err("unwound"));
        assert_eq!(result, Err("unwound"));
    }
}
