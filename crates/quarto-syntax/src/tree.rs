//! The immutable syntax tree handed to callers.
//!
//! A [`SyntaxTree`] is a Rowan green root plus one lookahead entry per
//! top-level block. Green nodes are positionless and reference counted, so
//! a reparse can place an old block at a new offset without touching it;
//! the red [`SyntaxNode`] view computes absolute ranges on the fly.

use std::fmt::Write;
use std::ops::Range;
use std::sync::Arc;

use rowan::{GreenNode, NodeOrToken, TextRange, WalkEvent};

use crate::options::ParseOptions;
use crate::parser::DerivedBlock;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// A parsed document.
///
/// Cloning is cheap and a tree is never mutated after construction, so it
/// can be read from any number of threads while a newer version is being
/// derived from it.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    green: GreenNode,
    /// For each top-level block, the absolute offset just past the last
    /// byte its derivation examined.
    lookahead: Arc<[usize]>,
    options: ParseOptions,
}

impl SyntaxTree {
    pub(crate) fn from_blocks(blocks: Vec<DerivedBlock>, options: ParseOptions) -> Self {
        let (children, lookahead): (Vec<_>, Vec<_>) = blocks
            .into_iter()
            .map(|block| (NodeOrToken::Node(block.green), block.lookahead))
            .unzip();
        Self {
            green: GreenNode::new(SyntaxKind::ROOT.into(), children),
            lookahead: lookahead.into(),
            options,
        }
    }

    /// A red view of the document root.
    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// The source text, rebuilt from the tokens.
    pub fn text(&self) -> String {
        self.green.to_string()
    }

    pub fn len(&self) -> usize {
        usize::from(self.green.text_len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Per-block lookahead, in block order.
    pub fn lookahead(&self) -> &[usize] {
        &self.lookahead
    }

    /// Number of top-level blocks.
    pub fn block_count(&self) -> usize {
        self.lookahead.len()
    }

    /// All `ERROR` and `MISSING` nodes, in document order.
    pub fn errors(&self) -> Vec<SyntaxNode> {
        self.root()
            .descendants()
            .filter(|node| matches!(node.kind(), SyntaxKind::ERROR | SyntaxKind::MISSING))
            .collect()
    }

    /// Whether top-level block `index` of this tree is the very same green
    /// node as some top-level block of `other`.
    pub fn shares_block(&self, other: &SyntaxTree, index: usize) -> bool {
        let Some(NodeOrToken::Node(block)) = self.green.children().nth(index) else {
            return false;
        };
        other.green.children().any(|candidate| match candidate {
            NodeOrToken::Node(node) => std::ptr::eq(node, block),
            NodeOrToken::Token(_) => false,
        })
    }

    /// Indented outline of the whole tree, one element per line.
    pub fn dump(&self) -> String {
        dump(&self.root())
    }
}

/// Indented outline of `node`: `kind@start..end`, tokens with their text.
pub fn dump(node: &SyntaxNode) -> String {
    let mut out = String::new();
    let mut depth = 0;
    for event in node.preorder_with_tokens() {
        match event {
            WalkEvent::Enter(element) => {
                let indent = "  ".repeat(depth);
                let _ = match element {
                    NodeOrToken::Node(node) => {
                        writeln!(out, "{indent}{:?}@{:?}", node.kind(), node.text_range())
                    }
                    NodeOrToken::Token(token) => writeln!(
                        out,
                        "{indent}{:?}@{:?} {:?}",
                        token.kind(),
                        token.text_range(),
                        token.text()
                    ),
                };
                depth += 1;
            }
            WalkEvent::Leave(_) => depth -= 1,
        }
    }
    out
}

/// Grammar-level accessors on [`SyntaxNode`].
pub trait NodeExt {
    /// Name of the rule or kind that produced the node (`"paragraph"`).
    fn rule_name(&self) -> &'static str;
    /// Absolute byte range in the document.
    fn byte_range(&self) -> Range<usize>;
    fn is_error(&self) -> bool;
    /// A zero-width stand-in for a required construct.
    fn is_missing(&self) -> bool;
}

impl NodeExt for SyntaxNode {
    fn rule_name(&self) -> &'static str {
        self.kind().rule_name()
    }

    fn byte_range(&self) -> Range<usize> {
        to_range(self.text_range())
    }

    fn is_error(&self) -> bool {
        self.kind() == SyntaxKind::ERROR
    }

    fn is_missing(&self) -> bool {
        self.kind() == SyntaxKind::MISSING
    }
}

pub(crate) fn to_range(range: TextRange) -> Range<usize> {
    usize::from(range.start())..usize::from(range.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_spans_the_document() {
        let tree = parse("# Title\n\nBody text\n").unwrap();
        assert_eq!(tree.root().byte_range(), 0..19);
        assert_eq!(tree.len(), 19);
        assert_eq!(tree.text(), "# Title\n\nBody text\n");
    }

    #[test]
    fn one_lookahead_per_block() {
        let tree = parse("a\n\nb\n").unwrap();
        assert_eq!(tree.block_count(), 3);
        assert_eq!(tree.root().children().count(), 3);
        assert!(tree.lookahead().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn node_accessors() {
        let tree = parse("::: note\ntext\n").unwrap();
        let div = tree.root().first_child().unwrap();
        assert_eq!(div.rule_name(), "div");
        let missing = div.children().find(|n| n.is_missing()).unwrap();
        assert_eq!(missing.byte_range(), 14..14);
        assert!(!missing.is_error());
        assert_eq!(tree.errors().len(), 1);
    }

    #[test]
    fn clones_share_blocks() {
        let tree = parse("a\n\nb\n").unwrap();
        let copy = tree.clone();
        assert!((0..3).all(|i| copy.shares_block(&tree, i)));
        let other = parse("a\n\nb\n").unwrap();
        assert!(!other.shares_block(&tree, 0));
    }

    #[test]
    fn dump_outline() {
        let tree = parse("# Hi\n").unwrap();
        insta::assert_snapshot!(tree.dump(), @r##"
        ROOT@0..5
          HEADING@0..5
            HEADING_MARKER@0..1 "#"
            WHITESPACE@1..2 " "
            TEXT@2..4 "Hi"
            NEWLINE@4..5 "\n"
        "##);
    }
}
