//! # quarto-syntax
//!
//! A lossless, incrementally reparsable syntax tree for Quarto documents
//! (Markdown with YAML front matter, executable code cells, raw blocks,
//! fenced divs, attribute lists, math, citations and shortcodes), built on
//! [Rowan] + [Logos].
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//!
//! ## What is a Lossless CST?
//!
//! Every byte of the source lands in exactly one token of the tree, so the
//! tree text always equals the input. Malformed constructs do not abort the
//! parse: they show up as `ERROR` nodes spanning the bad input, and required
//! pieces that never appeared (a div that is never closed) as zero-width
//! `MISSING` nodes. Editor tooling can underline exactly those spans.
//!
//! ## Architecture Overview
//!
//! ```text
//!                 Grammar table (static, versioned)
//!                         │
//! Source Text → Rule Engine ⇄ Scanner → Events → Sink → Rowan green block
//!                  │  (PEG)     (context-sensitive,          │
//!                  │             lazy, per token)            ▼
//!                  └── inline resolution (Logos + delimiter stack)
//!                                                      SyntaxTree
//! ```
//!
//! ### 1. Grammar ([`grammar`] module)
//!
//! Block and inline structure is declared as a table of named [`Rule`]s:
//! ordered choice, sequence, bounded repetition, tokens and predicates.
//! Recursion goes through [`RuleName`] references, so the table is finite
//! and can be inspected.
//!
//! ### 2. Scanner ([`scanner`] module)
//!
//! Tokens are produced on demand, for the kinds the current rule expects, in
//! the context of the open frames (is a fence open, how long was it, are we
//! inside an attribute list).
//!
//! ### 3. Parser ([`parser`] module)
//!
//! The rule engine derives one top-level block at a time, emitting
//! [`Event`](parser::event::Event)s that the sink turns into a green node.
//! Failed alternatives are rewound through checkpoints.
//!
//! ### 4. Incremental reparse ([`incremental`] module)
//!
//! After an [`Edit`], only the blocks that looked at the edited bytes are
//! derived again; every other block of the previous tree is reused as is.
//!
//! ## Quick Start
//!
//! ```
//! use quarto_syntax::{parse, reparse, Edit, NodeExt, SyntaxKind};
//!
//! let text = "# Results {#sec-results}\n\nSee @fig-plot.\n";
//! let tree = parse(text).unwrap();
//!
//! // The tree preserves all text
//! assert_eq!(tree.text(), text);
//!
//! // Navigate the tree structure
//! let heading = tree.root().first_child().unwrap();
//! assert_eq!(heading.kind(), SyntaxKind::HEADING);
//! assert_eq!(heading.byte_range(), 0..25);
//!
//! // Edit and reparse: the heading is reused
//! let (new_text, edit) = Edit::splice(text, 30..30, "the ");
//! let new_tree = reparse(&tree, &[edit], &new_text).unwrap();
//! assert!(new_tree.shares_block(&tree, 0));
//! ```

pub mod edit;
pub mod error;
pub mod grammar;
pub mod incremental;
pub mod line_index;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod syntax_kind;
pub mod token_set;
pub mod tree;

pub use edit::{Change, Edit};
pub use error::ParseError;
pub use grammar::{Grammar, Rule, RuleName, grammar};
pub use incremental::{ReparseRoot, plan, reparse, reparse_with};
pub use line_index::{LineIndex, Point};
pub use options::{ParseOptions, TripleDelimiter};
pub use parser::{Derivation, derive_rule, parse, parse_with};
pub use syntax_kind::{QuartoLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
pub use tree::{NodeExt, SyntaxTree, dump};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn tree(input: &str) -> String {
        parse(input).unwrap().dump()
    }

    #[test]
    fn snapshot_simple_paragraph() {
        assert_snapshot!(tree("Hello, world!\n"), @r#"
        ROOT@0..14
          PARAGRAPH@0..14
            TEXT@0..6 "Hello,"
            WHITESPACE@6..7 " "
            TEXT@7..13 "world!"
            NEWLINE@13..14 "\n"
        "#);
    }

    #[test]
    fn snapshot_heading_with_attributes() {
        assert_snapshot!(tree("## Intro {#sec-intro .unnumbered}\n"), @r###"
        ROOT@0..34
          HEADING@0..34
            HEADING_MARKER@0..2 "##"
            WHITESPACE@2..3 " "
            TEXT@3..8 "Intro"
            WHITESPACE@8..9 " "
            ATTR_LIST@9..33
              LBRACE@9..10 "{"
              ATTR_ID@10..20 "#sec-intro"
              WHITESPACE@20..21 " "
              ATTR_CLASS@21..32 ".unnumbered"
              RBRACE@32..33 "}"
            NEWLINE@33..34 "\n"
        "###);
    }

    #[test]
    fn snapshot_front_matter() {
        assert_snapshot!(tree("---\ntitle: Demo\n---\n"), @r#"
        ROOT@0..20
          FRONTMATTER@0..20
            FRONTMATTER_DELIM@0..3 "---"
            NEWLINE@3..4 "\n"
            YAML_TEXT@4..15 "title: Demo"
            NEWLINE@15..16 "\n"
            FRONTMATTER_DELIM@16..19 "---"
            NEWLINE@19..20 "\n"
        "#);
    }

    #[test]
    fn snapshot_code_cell() {
        assert_snapshot!(tree("```{r echo=FALSE}\nx <- 1\n```\n"), @r#"
        ROOT@0..29
          CODE_CELL@0..29
            FENCE_OPEN@0..3 "```"
            ATTR_LIST@3..17
              LBRACE@3..4 "{"
              ATTR_WORD@4..5 "r"
              WHITESPACE@5..6 " "
              ATTRIBUTE@6..16
                ATTR_KEY@6..10 "echo"
                EQ@10..11 "="
                ATTR_VALUE@11..16 "FALSE"
              RBRACE@16..17 "}"
            NEWLINE@17..18 "\n"
            CODE_TEXT@18..24 "x <- 1"
            NEWLINE@24..25 "\n"
            FENCE_CLOSE@25..28 "```"
            NEWLINE@28..29 "\n"
        "#);
    }

    #[test]
    fn snapshot_inline_elements() {
        assert_snapshot!(tree("Some `code`, $x^2$ and [@doe99].\n"), @r#"
        ROOT@0..33
          PARAGRAPH@0..33
            TEXT@0..4 "Some"
            WHITESPACE@4..5 " "
            CODE_SPAN@5..11
              CODE_DELIM@5..6 "`"
              TEXT@6..10 "code"
              CODE_DELIM@10..11 "`"
            TEXT@11..12 ","
            WHITESPACE@12..13 " "
            MATH@13..18
              MATH_DELIM@13..14 "$"
              TEXT@14..17 "x^2"
              MATH_DELIM@17..18 "$"
            WHITESPACE@18..19 " "
            TEXT@19..22 "and"
            WHITESPACE@22..23 " "
            TEXT@23..24 "["
            CITATION@24..30
              CITE_KEY@24..30 "@doe99"
            TEXT@30..32 "]."
            NEWLINE@32..33 "\n"
        "#);
    }

    #[test]
    fn snapshot_unclosed_div() {
        assert_snapshot!(tree("::: {.callout-note}\nBody\n"), @r#"
        ROOT@0..25
          DIV@0..25
            DIV_OPEN@0..3 ":::"
            WHITESPACE@3..4 " "
            ATTR_LIST@4..19
              LBRACE@4..5 "{"
              ATTR_CLASS@5..18 ".callout-note"
              RBRACE@18..19 "}"
            NEWLINE@19..20 "\n"
            PARAGRAPH@20..25
              TEXT@20..24 "Body"
              NEWLINE@24..25 "\n"
            MISSING@25..25
        "#);
    }
}
