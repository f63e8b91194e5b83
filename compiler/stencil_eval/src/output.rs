//! Output sinks for rendered text.
//!
//! Uses enum dispatch instead of trait objects; `write` is called for every
//! text fragment of a render.

/// Destination of rendered text.
#[derive(Debug)]
pub enum Output {
    /// Collects output in memory.
    Buffer(String),
    /// Writes straight to stdout.
    Stdout,
    /// Discards all output. Used while evaluating conditions.
    Silent,
}

impl Output {
    /// Create an empty in-memory buffer.
    pub fn buffer() -> Self {
        Output::Buffer(String::new())
    }

    /// Write a text fragment.
    #[inline]
    pub fn write(&mut self, text: &str) {
        match self {
            Self::Buffer(buf) => buf.push_str(text),
            Self::Stdout => print!("{text}"),
            Self::Silent => {}
        }
    }

    /// Captured output so far; empty for sinks that don't capture.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Buffer(buf) => buf,
            Self::Stdout | Self::Silent => "",
        }
    }

    /// Take the captured output, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        match self {
            Self::Buffer(buf) => std::mem::take(buf),
            Self::Stdout | Self::Silent => String::new(),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::buffer()
    }
}
