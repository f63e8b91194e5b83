//! Runtime evaluation context.

use std::ops::{Deref, DerefMut};

use stencil_value::{
    recursion_limit_exceeded, undefined_function, undefined_name, EvalError, EvalNote, EvalResult,
    Value,
};

use crate::environment::{Environment, Scope};
use crate::function::{FunctionId, FunctionTable};
use crate::output::Output;
use crate::stack::ensure_sufficient_stack;

/// Live call stack of a render.
///
/// Each function call pushes the callee's name; the depth check is
/// integrated into `push`, and the innermost names end up in the error.
#[derive(Clone, Debug)]
struct CallStack<'a> {
    frames: Vec<&'a str>,
    max_depth: Option<usize>,
}

impl<'a> CallStack<'a> {
    fn new(max_depth: Option<usize>) -> Self {
        CallStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame. The frame is not pushed when the limit is exceeded.
    fn push(&mut self, name: &'a str) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                let note = EvalNote::new(self.trace(name));
                return Err(recursion_limit_exceeded(max).with_note(note));
            }
        }
        self.frames.push(name);
        Ok(())
    }

    /// `call stack: a -> b -> callee`, keeping only the innermost frames.
    fn trace(&self, callee: &str) -> String {
        const SHOWN: usize = 4;
        let skipped = self.frames.len().saturating_sub(SHOWN);
        let mut trace = String::from("call stack: ");
        if skipped > 0 {
            trace.push_str("... -> ");
        }
        for frame in &self.frames[skipped..] {
            trace.push_str(frame);
            trace.push_str(" -> ");
        }
        trace.push_str(callee);
        trace
    }

    fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// State of a single render: scopes, output and the compiled functions.
///
/// Every concurrent render needs its own context; the function table is
/// shared read-only.
pub struct EvalContext<'a> {
    env: Environment,
    output: Output,
    functions: &'a FunctionTable,
    call_stack: CallStack<'a>,
}

impl<'a> EvalContext<'a> {
    /// Create a context with an empty global scope that renders into a
    /// buffer.
    pub fn new(functions: &'a FunctionTable) -> Self {
        Self::builder(functions).build()
    }

    pub fn builder(functions: &'a FunctionTable) -> EvalContextBuilder<'a> {
        EvalContextBuilder::new(functions)
    }

    /// Write a text fragment to the output sink.
    #[inline]
    pub fn write(&mut self, text: &str) {
        self.output.write(text);
    }

    /// Output captured so far.
    pub fn output(&self) -> &str {
        self.output.as_str()
    }

    /// Take the captured output, leaving the buffer empty.
    pub fn take_output(&mut self) -> String {
        self.output.take()
    }

    /// Look up a variable, innermost frame first.
    pub fn lookup(&self, name: &str) -> EvalResult {
        self.env
            .lookup(name)
            .cloned()
            .ok_or_else(|| undefined_name(name))
    }

    /// Define a variable in the innermost frame.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.env.define(name, value);
    }

    /// Number of scope frames, including the global scope.
    pub fn scope_depth(&self) -> usize {
        self.env.depth()
    }

    /// Number of function calls in progress.
    pub fn call_depth(&self) -> usize {
        self.call_stack.depth()
    }

    /// Push a scope frame that is popped when the guard is dropped.
    pub fn scoped(&mut self) -> ScopedContext<'_, 'a> {
        self.env.push_scope();
        ScopedContext { context: self }
    }

    /// Run `f` with the output sink silenced.
    ///
    /// Conditions are evaluated this way so that a function called from a
    /// condition cannot write into the document.
    pub fn without_output<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.output, Output::Silent);
        let result = f(self);
        self.output = saved;
        result
    }

    /// Call a function from the table.
    #[tracing::instrument(level = "debug", skip(self, args), fields(argc = args.len()))]
    pub fn call(&mut self, id: FunctionId, args: &[Value]) -> EvalResult {
        let functions = self.functions;
        let Some(function) = functions.get(id) else {
            return Err(undefined_function(&id.to_string()));
        };

        self.call_stack.push(function.name())?;
        let result = ensure_sufficient_stack(|| function.call(self, args));
        self.call_stack.pop();
        result
    }
}

/// Builder for [`EvalContext`].
pub struct EvalContextBuilder<'a> {
    functions: &'a FunctionTable,
    globals: Scope,
    output: Output,
    max_call_depth: Option<usize>,
}

impl<'a> EvalContextBuilder<'a> {
    pub fn new(functions: &'a FunctionTable) -> Self {
        EvalContextBuilder {
            functions,
            globals: Scope::new(),
            output: Output::buffer(),
            max_call_depth: None,
        }
    }

    /// Set the global scope (the host's variables).
    #[must_use]
    pub fn variables(mut self, globals: Scope) -> Self {
        self.globals = globals;
        self
    }

    /// Add a single global variable.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.define(name, value.into());
        self
    }

    /// Set the output sink. Default is an in-memory buffer.
    #[must_use]
    pub fn output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Limit the depth of nested function calls. Default is unlimited.
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn build(self) -> EvalContext<'a> {
        EvalContext {
            env: Environment::with_globals(self.globals),
            output: self.output,
            functions: self.functions,
            call_stack: CallStack::new(self.max_call_depth),
        }
    }
}

/// RAII guard that pops the scope frame pushed by [`EvalContext::scoped`].
///
/// The frame is popped on drop, so an error returned with `?` (or a panic)
/// still leaves the scope stack balanced.
pub struct ScopedContext<'guard, 'a> {
    context: &'guard mut EvalContext<'a>,
}

impl Drop for ScopedContext<'_, '_> {
    fn drop(&mut self) {
        self.context.env.pop_scope();
    }
}

impl<'a> Deref for ScopedContext<'_, 'a> {
    type Target = EvalContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopedContext<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}
