//! Sink for converting parser events into a Rowan green tree.

use rowan::{GreenNode, GreenNodeBuilder};

use crate::parser::event::Event;
use crate::syntax_kind::SyntaxKind;

/// Converts parser events over a slice of source text into a green node.
pub struct Sink<'t> {
    builder: GreenNodeBuilder<'static>,
    text: &'t str,
    cursor: usize,
    events: Vec<Event>,
}

impl<'t> Sink<'t> {
    /// Create a sink whose first token starts at byte `offset` of `text`.
    pub fn new(text: &'t str, offset: usize, events: Vec<Event>) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            text,
            cursor: offset,
            events,
        }
    }

    /// Build a single green node.
    ///
    /// If the events do not describe exactly one node, they are wrapped in a
    /// node of kind `wrapper`.
    pub fn finish(mut self, wrapper: SyntaxKind) -> GreenNode {
        let wrap = !single_node(&self.events);
        if wrap {
            self.builder.start_node(wrapper.into());
        }
        for event in std::mem::take(&mut self.events) {
            match event {
                Event::Start { kind } => self.builder.start_node(kind.into()),
                Event::Token { kind, len } => self.token(kind, len as usize),
                Event::Finish => self.builder.finish_node(),
                Event::Placeholder => {}
            }
        }
        if wrap {
            self.builder.finish_node();
        }
        self.builder.finish()
    }

    fn token(&mut self, kind: SyntaxKind, len: usize) {
        let start = self.cursor;
        self.cursor += len;
        self.builder.token(kind.into(), &self.text[start..self.cursor]);
    }
}

fn single_node(events: &[Event]) -> bool {
    let mut depth = 0usize;
    let mut roots = 0;
    for event in events {
        match event {
            Event::Start { .. } => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Finish => depth = depth.saturating_sub(1),
            Event::Token { .. } if depth == 0 => return false,
            _ => {}
        }
    }
    roots == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax_kind::SyntaxNode;
    use pretty_assertions::assert_eq;

    #[test]
    fn sink_builds_simple_tree() {
        let events = vec![
            Event::start(SyntaxKind::PARAGRAPH),
            Event::token(SyntaxKind::TEXT, 5),
            Event::Finish,
        ];

        let green = Sink::new("hello", 0, events).finish(SyntaxKind::ERROR);
        let tree = SyntaxNode::new_root(green);

        assert_eq!(tree.kind(), SyntaxKind::PARAGRAPH);
        assert_eq!(tree.text().to_string(), "hello");
    }

    #[test]
    fn sink_starts_at_offset() {
        let events = vec![
            Event::start(SyntaxKind::PARAGRAPH),
            Event::token(SyntaxKind::TEXT, 3),
            Event::Finish,
        ];

        let green = Sink::new("ab\ncd\n", 3, events).finish(SyntaxKind::ERROR);

        assert_eq!(SyntaxNode::new_root(green).text().to_string(), "cd\n");
    }

    #[test]
    fn loose_tokens_are_wrapped() {
        let events = vec![
            Event::token(SyntaxKind::TEXT, 2),
            Event::token(SyntaxKind::NEWLINE, 1),
        ];

        let green = Sink::new("ab\n", 0, events).finish(SyntaxKind::ROOT);
        let tree = SyntaxNode::new_root(green);

        assert_eq!(tree.kind(), SyntaxKind::ROOT);
        assert_eq!(tree.text().to_string(), "ab\n");
    }
}
