//! Source locations for template nodes.
//!
//! A location is a file name plus a 1-based line and column. Parsers advance a
//! location character by character as they consume template text and clone it
//! into each node they create.

use std::fmt;
use std::sync::Arc;

/// Position of a node in its template source.
///
/// The file name is shared (`Arc<str>`) because every node of a document
/// points into the same file.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    file: Option<Arc<str>>,
    line: u32,
    column: u32,
}

impl SourceLocation {
    /// Location used for nodes synthesized by the host rather than parsed.
    pub const DUMMY: SourceLocation = SourceLocation {
        file: None,
        line: 0,
        column: 0,
    };

    /// Create a location inside a named file.
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        SourceLocation {
            file: Some(file.into()),
            line,
            column,
        }
    }

    /// Create a location for a template that did not come from a file.
    #[inline]
    pub const fn anonymous(line: u32, column: u32) -> Self {
        SourceLocation {
            file: None,
            line,
            column,
        }
    }

    /// The start of a file: line 1, column 1.
    pub fn start_of(file: impl Into<Arc<str>>) -> Self {
        Self::new(file, 1, 1)
    }

    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    #[inline]
    pub const fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Check if this is the dummy location.
    #[inline]
    pub fn is_dummy(&self) -> bool {
        *self == Self::DUMMY
    }

    /// Advance past one consumed character.
    ///
    /// A line feed moves to column 1 of the next line; a tab moves to the
    /// next multiple-of-8 tab stop.
    pub fn advance(&mut self, c: char) {
        match c {
            '\n' => {
                self.line = self.line.saturating_add(1);
                self.column = 1;
            }
            '\t' => {
                let zero_based = self.column.saturating_sub(1);
                self.column = (zero_based / 8 + 1).saturating_mul(8).saturating_add(1);
            }
            _ => self.column = self.column.saturating_add(1),
        }
    }

    /// Advance past every character of `text`.
    pub fn advance_str(&mut self, text: &str) {
        for c in text.chars() {
            self.advance(c);
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::DUMMY
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{file}:{}:{}", self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}
