//! Owned storage for dynamic response header lines.
//!
//! `may_minihttp` only accepts `&'static str` header lines. Lines carrying
//! request-derived values (a reflected `Origin`, the requested
//! `Access-Control-Request-Headers`) are formatted into a [`HeaderLines`]
//! buffer owned by the connection's service clone and freed when the next
//! request on that connection starts. Nothing is shared between
//! connections, so clients cannot exhaust it for each other.

use tracing::warn;

/// Header slots `may_minihttp::Response` holds; one is kept for
/// `Content-Type`.
pub const MAX_RESPONSE_HEADERS: usize = 15;

/// Header lines of the response currently being written.
#[derive(Debug, Default)]
pub struct HeaderLines {
    lines: Vec<Box<str>>,
}

impl Clone for HeaderLines {
    /// Every connection starts with an empty buffer.
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl HeaderLines {
    /// Drop the lines of the previous response.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Format and store a `Name: value` line.
    ///
    /// Returns `None` for names or values containing CR or LF, and once
    /// [`MAX_RESPONSE_HEADERS`] lines are held.
    pub fn push(&mut self, name: &str, value: &str) -> Option<&str> {
        if name.contains(['\r', '\n', ':']) || value.contains(['\r', '\n']) {
            warn!(header = %name, "Refusing header containing line breaks");
            return None;
        }
        if self.lines.len() >= MAX_RESPONSE_HEADERS {
            warn!(header = %name, "Too many response headers, dropping header");
            return None;
        }
        self.lines.push(format!("{name}: {value}").into_boxed_str());
        self.lines.last().map(|line| &**line)
    }
}
