//! Error types for template post-processing and evaluation.
//!
//! Errors are raised where they are detected, usually without a location.
//! Every enclosing node that sees a location-less error attaches its own
//! location through [`EvalError::merge_location`] before passing it on, so the
//! reported location is the innermost node that knows where it is.
//!
//! Factory functions (e.g. `undefined_name()`) are the public way to build an
//! error; they are `#[cold]` because every one of them ends a render.

use std::fmt;

use stencil_ir::SourceLocation;

use crate::value::{SignalKind, Value};

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Node kind at which a control signal was found with nothing to consume it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// A `#block` body.
    Block,
    /// The root of a document.
    Top,
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// Variable lookup failed in every scope frame.
    UndefinedName { name: String },
    /// A call names a function that is not registered.
    UndefinedFunction { name: String },
    /// A block name has no registered function, or its body was never
    /// post-processed.
    UnresolvedBlock { name: String },
    /// `super` was called outside of any `#block`.
    SuperOutsideBlock,
    /// `super` was called inside a block that overrides nothing.
    UndefinedSuper,
    /// Break, continue or return reached a block or document boundary.
    IllegalControlEscape {
        signal: SignalKind,
        boundary: Boundary,
    },
    /// The tree builder refused a structural operation.
    StructuralAppendRejected { construct: String },
    TypeMismatch { expected: String, got: String },
    /// The configured call depth was exceeded.
    RecursionLimitExceeded { depth: usize },
    /// Errors raised by host functions.
    Custom { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedName { name } => write!(f, "undefined name: {name}"),
            Self::UndefinedFunction { name } => write!(f, "undefined function: {name}()"),
            Self::UnresolvedBlock { name } => write!(f, "unresolved #block: {name}"),
            Self::SuperOutsideBlock => write!(f, "super() called outside of a #block"),
            Self::UndefinedSuper => {
                write!(f, "super() called in a #block that does not override another")
            }
            Self::IllegalControlEscape { signal, boundary } => match (signal, boundary) {
                (SignalKind::Break | SignalKind::Continue, _) => {
                    write!(f, "found {} not inside a loop statement", signal.keyword())
                }
                (SignalKind::Return, Boundary::Block) => {
                    write!(f, "can not use a #return statement inside a #block")
                }
                (SignalKind::Return, Boundary::Top) => {
                    write!(f, "found #return not inside a function")
                }
            },
            Self::StructuralAppendRejected { construct } => write!(f, "unexpected {construct}"),
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::RecursionLimitExceeded { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Secondary information attached to an error, such as the blocks it passed
/// through while unwinding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalNote {
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location: Some(location),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Innermost known location; `None` until a node merges its own.
    pub location: Option<SourceLocation>,
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    /// Create an error with just a message.
    ///
    /// Used by host functions. Prefer the factory functions when a structured
    /// kind exists.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Custom {
            message: message.into(),
        })
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        Self {
            kind,
            location: None,
            notes: Vec::new(),
        }
    }

    /// Set the location, replacing any previous one.
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach `location` only if the error does not have one yet.
    #[must_use]
    pub fn merge_location(mut self, location: &SourceLocation) -> Self {
        if self.location.is_none() {
            self.location = Some(location.clone());
        }
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    /// Human-readable message without location or notes.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{}", self.kind)?;
        for note in &self.notes {
            write!(f, "\n  note: {}", note.message)?;
            if let Some(location) = &note.location {
                write!(f, " at {location}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Name and Function Resolution Errors

#[cold]
pub fn undefined_name(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedName {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn unresolved_block(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnresolvedBlock {
        name: name.to_string(),
    })
}

#[cold]
pub fn super_outside_block() -> EvalError {
    EvalError::from_kind(EvalErrorKind::SuperOutsideBlock)
}

#[cold]
pub fn undefined_super() -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedSuper)
}

// Control Flow Errors

/// A signal reached `boundary` with no loop or function to consume it.
#[cold]
pub fn illegal_control_escape(signal: SignalKind, boundary: Boundary) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IllegalControlEscape { signal, boundary })
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimitExceeded { depth })
}

// Structural Errors

/// The tree builder could not place `construct` (e.g. `#else`, `#end`).
#[cold]
pub fn structural_append_rejected(construct: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StructuralAppendRejected {
        construct: construct.to_string(),
    })
}

// Type Errors

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}
