use std::fmt;

use stencil_ir::SourceLocation;
use stencil_value::Value;

use crate::context::EvalContext;

/// Literal template text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextNode {
    location: SourceLocation,
    text: String,
}

impl TextNode {
    pub fn new(location: SourceLocation, text: impl Into<String>) -> Self {
        TextNode {
            location,
            text: text.into(),
        }
    }

    #[inline]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Strip the spaces and tabs that follow the last line feed.
    ///
    /// Nothing is stripped if any other character follows the last line
    /// feed. Text without a line feed that consists only of spaces and tabs
    /// becomes empty.
    pub fn left_align(&mut self) {
        let bytes = self.text.as_bytes();
        let mut len = bytes.len();
        while len > 0 {
            match bytes[len - 1] {
                b' ' | b'\t' => len -= 1,
                b'\n' => break,
                _ => return,
            }
        }
        self.text.truncate(len);
    }

    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Value {
        ctx.write(&self.text);
        Value::Undefined
    }
}

impl fmt::Display for TextNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<text {}>", self.text)
    }
}
