//! Variable scopes for template evaluation.
//!
//! The environment is a stack of frames. The bottom frame holds the variables
//! supplied by the host; every block invocation pushes a frame and pops it on
//! exit. Lookup walks the frames from innermost to outermost.

use rustc_hash::FxHashMap;

use stencil_value::Value;

/// A single frame of variable bindings.
///
/// Defining a name twice in the same frame keeps the last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
    bindings: FxHashMap<String, Value>,
}

impl Scope {
    /// Create a new empty scope.
    pub fn new() -> Self {
        Scope {
            bindings: FxHashMap::default(),
        }
    }

    /// Define a variable in this scope.
    #[inline]
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Builder-style [`Scope::define`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.define(name, value.into());
        self
    }

    /// Look up a variable defined in this scope only.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Scope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (name, value) in iter {
            scope.define(name, value.into());
        }
        scope
    }
}

/// Stack of scopes with the global scope at the bottom.
#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    /// Create an environment with an empty global scope.
    pub fn new() -> Self {
        Self::with_globals(Scope::new())
    }

    /// Create an environment whose global scope is `globals`.
    pub fn with_globals(globals: Scope) -> Self {
        Environment {
            scopes: vec![globals],
        }
    }

    /// Number of frames, including the global scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a new empty frame.
    #[inline]
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pop the innermost frame. The global scope is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Define a variable in the innermost frame.
    #[inline]
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.define(name, value);
        }
    }

    /// Look up a variable, innermost frame first.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
