//! # Parser Events
//!
//! Events are the intermediate representation between rule derivation and
//! tree building. Instead of building the tree directly, the engine emits a
//! **flat sequence** of events that describe the tree structure:
//!
//! ```text
//! Start(HEADING)              ← Begin a HEADING node
//!   Token(HEADING_MARKER, 1)
//!   Token(WHITESPACE, 1)
//!   Token(TEXT, 5)
//!   Token(NEWLINE, 1)
//! Finish                      ← End the HEADING node
//! ```
//!
//! Backtracking is cheap with this representation: a failed alternative just
//! truncates the event vector back to a checkpoint. Nothing has to be
//! unbuilt.
//!
//! Tokens carry their byte length rather than their text; the
//! [`Sink`](super::sink::Sink) slices the source as it goes.

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    Start { kind: SyntaxKind },

    /// Add a token covering the next `len` bytes.
    Token { kind: SyntaxKind, len: u32 },

    /// Finish the current node.
    Finish,

    /// A placeholder that will be replaced.
    ///
    /// When `parser.start()` is called, a `Placeholder` is pushed. Later,
    /// `marker.complete()` replaces it with a real `Start`, or
    /// `marker.abandon()` truncates it away together with everything after it.
    Placeholder,
}

impl Event {
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start { kind }
    }

    pub fn token(kind: SyntaxKind, len: usize) -> Self {
        Event::Token {
            kind,
            len: len as u32,
        }
    }

    /// Bytes of input this event consumes.
    pub fn len(&self) -> usize {
        match self {
            Event::Token { len, .. } => *len as usize,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_events_report_length() {
        assert_eq!(Event::token(SyntaxKind::TEXT, 5).len(), 5);
        assert!(Event::start(SyntaxKind::PARAGRAPH).is_empty());
        assert!(Event::Finish.is_empty());
    }
}
