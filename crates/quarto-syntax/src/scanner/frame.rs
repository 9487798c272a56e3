//! Context frames: the stack of currently open rule contexts.
//!
//! The rule engine pushes a frame when it enters a scoped rule and truncates
//! the stack back to its saved depth when the rule finishes or fails. The
//! scanner reads the stack to resolve tokens that depend on what is open,
//! for example whether a run of backticks closes the current fence.

/// The kind of context a scoped rule opens. The concrete [`Frame`] is
/// computed from the input at the moment the scope is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Frontmatter,
    Fence,
    MathBlock,
    Div,
    List,
    Item,
    Quote,
    Attributes,
}

impl ScopeKind {
    /// Scopes that hold blocks, and so count toward the nesting limit.
    pub fn is_nesting(self) -> bool {
        matches!(
            self,
            ScopeKind::List | ScopeKind::Item | ScopeKind::Quote | ScopeKind::Div
        )
    }
}

/// Marker style of a list, used to decide whether a marker continues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    /// `-`, `*` or `+`
    Bullet(u8),
    /// Digits followed by `.` or `)`
    Ordered(u8),
}

impl ListMarker {
    /// Parse a list marker at the start of `bytes`, returning it and its length.
    pub fn scan(bytes: &[u8]) -> Option<(ListMarker, usize)> {
        match bytes.first()? {
            b @ (b'-' | b'*' | b'+') => Some((ListMarker::Bullet(*b), 1)),
            b'0'..=b'9' => {
                let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
                if digits > 9 {
                    return None;
                }
                match bytes.get(digits)? {
                    d @ (b'.' | b')') => Some((ListMarker::Ordered(*d), digits + 1)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// An open context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Frontmatter,
    /// Fence opened with `len` repetitions of `fill`.
    Fence { fill: u8, len: usize },
    MathBlock,
    Div,
    /// A list whose items start at `column` with a compatible `marker`.
    List { column: usize, marker: ListMarker },
    /// A list item whose continuation lines are indented to `content_column`.
    Item { content_column: usize },
    Quote,
    Attributes,
}

impl Frame {
    /// Frames that own a line prefix (indentation or `>`).
    pub fn is_container(&self) -> bool {
        matches!(self, Frame::Item { .. } | Frame::Quote)
    }

    pub fn is_nesting(&self) -> bool {
        matches!(
            self,
            Frame::List { .. } | Frame::Item { .. } | Frame::Quote | Frame::Div
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_markers() {
        assert_eq!(ListMarker::scan(b"- x"), Some((ListMarker::Bullet(b'-'), 1)));
        assert_eq!(ListMarker::scan(b"+"), Some((ListMarker::Bullet(b'+'), 1)));
    }

    #[test]
    fn ordered_markers() {
        assert_eq!(ListMarker::scan(b"12. x"), Some((ListMarker::Ordered(b'.'), 3)));
        assert_eq!(ListMarker::scan(b"3) x"), Some((ListMarker::Ordered(b')'), 2)));
        assert_eq!(ListMarker::scan(b"3 x"), None);
        assert_eq!(ListMarker::scan(b"1234567890. x"), None);
    }
}
