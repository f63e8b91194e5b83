//! Runtime values for template evaluation.
//!
//! # Truthiness
//!
//! `Undefined`, `false`, `0`, `0.0`, the empty string and the empty vector are
//! falsy; every other ordinary value is truthy. A [`Signal`] has no
//! truthiness and no text form: asking for either is a type error, so a
//! stray break/continue/return can never be swallowed by a condition or
//! written into the output.

use std::fmt;

use crate::errors::{type_mismatch, EvalError};

/// Control-flow signal carried through evaluation results.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// Leave the innermost loop.
    Break,
    /// Skip to the next iteration of the innermost loop.
    Continue,
    /// Leave the innermost function call with a payload.
    Return(Box<Value>),
}

/// Payload-free discriminant of a [`Signal`], used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Break,
    Continue,
    Return,
}

impl Signal {
    #[inline]
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Break => SignalKind::Break,
            Signal::Continue => SignalKind::Continue,
            Signal::Return(_) => SignalKind::Return,
        }
    }
}

impl SignalKind {
    /// The template keyword that produces this signal.
    pub fn keyword(self) -> &'static str {
        match self {
            SignalKind::Break => "#break",
            SignalKind::Continue => "#continue",
            SignalKind::Return => "#return",
        }
    }
}

/// Runtime value of the template engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// No value. Produced by text output, blocks and absent results.
    #[default]
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vector(Vec<Value>),
    /// Break, continue or return travelling towards its consumer.
    Signal(Signal),
}

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Create a vector value.
    #[inline]
    pub fn vector(items: Vec<Value>) -> Self {
        Value::Vector(items)
    }

    #[inline]
    pub fn break_signal() -> Self {
        Value::Signal(Signal::Break)
    }

    #[inline]
    pub fn continue_signal() -> Self {
        Value::Signal(Signal::Continue)
    }

    /// Create a return signal carrying `payload`.
    #[inline]
    pub fn return_with(payload: Value) -> Self {
        Value::Signal(Signal::Return(Box::new(payload)))
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// The control signal carried by this value, if any.
    #[inline]
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Value::Signal(signal) => Some(signal),
            _ => None,
        }
    }

    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Vector(_) => "vector",
            Value::Signal(Signal::Break) => "break",
            Value::Signal(Signal::Continue) => "continue",
            Value::Signal(Signal::Return(_)) => "return",
        }
    }

    /// Truthiness of an ordinary value.
    ///
    /// Falsy-but-defined values (`0`, `""`) are false exactly like `Undefined`.
    pub fn to_bool(&self) -> Result<bool, EvalError> {
        match self {
            Value::Undefined => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            Value::Float(x) => Ok(*x != 0.0),
            Value::Str(s) => Ok(!s.is_empty()),
            Value::Vector(items) => Ok(!items.is_empty()),
            Value::Signal(_) => Err(type_mismatch("boolean", self.type_name())),
        }
    }

    /// Text written to the output for this value.
    ///
    /// `Undefined` produces no text.
    pub fn to_text(&self) -> Result<String, EvalError> {
        match self {
            Value::Undefined => Ok(String::new()),
            Value::Str(s) => Ok(s.clone()),
            Value::Signal(_) => Err(type_mismatch("text", self.type_name())),
            _ => Ok(self.to_string()),
        }
    }

    /// Structural equality between ordinary values.
    ///
    /// Integers and floats compare numerically; values of unrelated types are
    /// unequal. Comparing a signal is a type error.
    #[allow(
        clippy::float_cmp,
        clippy::cast_precision_loss,
        reason = "template equality is exact numeric equality"
    )]
    pub fn equals(&self, other: &Value) -> Result<bool, EvalError> {
        match (self, other) {
            (Value::Signal(_), _) => Err(type_mismatch("comparable value", self.type_name())),
            (_, Value::Signal(_)) => Err(type_mismatch("comparable value", other.type_name())),
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                Ok(*a as f64 == *b)
            }
            (Value::Vector(a), Value::Vector(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b) {
                    if !x.equals(y)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(self == other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Vector(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Signal(Signal::Break) => write!(f, "<break>"),
            Value::Signal(Signal::Continue) => write!(f, "<continue>"),
            Value::Signal(Signal::Return(payload)) => write!(f, "<return {payload}>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Vector(items)
    }
}

#[cfg(test)]
mod tests;
