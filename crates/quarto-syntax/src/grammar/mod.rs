//! # Grammar - The Rule Table
//!
//! The grammar is a fixed table of named PEG productions. Each [`RuleName`]
//! maps to exactly one [`Rule`]; rules refer to one another by name through
//! [`Rule::Ref`], which is how recursive structure (a list item containing
//! blocks containing lists) is expressed without self-referential data.
//!
//! ```text
//! Block     := BlankLine / Frontmatter / CodeCell / ... / Paragraph
//! DivChild  := Prefix !DIV_CLOSE !End Block
//! ListItem  := LIST_ITEM:Item( LIST_MARKER (WS (LineEnd / Block) / LineEnd) ItemChild* )
//! ```
//!
//! The table is built once on first use and shared by every parse through
//! [`grammar()`]. It is never mutated afterwards.
//!
//! ## Combinators
//!
//! Besides the PEG core (`Sequence`, ordered `Choice`, `Repeat`, `Token`,
//! `Predicate`), the table uses a few combinators that give the rule engine
//! its Markdown shape:
//!
//! - `Node` wraps whatever its rule consumed in a tree node.
//! - `Scope` pushes a context frame (fence, list, item, ...) that the scanner
//!   and the `Prefix`/`Sibling` rules consult.
//! - `Require` marks an element the enclosing rule cannot do without; when
//!   it fails the engine emits an error or missing node instead of failing.
//! - `Inline` hands the rest of a paragraph or heading to inline resolution.

mod attributes;
mod block;

use std::sync::LazyLock;

use crate::scanner::Boundary;
use crate::scanner::frame::ScopeKind;
use crate::syntax_kind::SyntaxKind;

/// A grammar production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// All elements in order. A repetition element gives back matches one
    /// at a time if a later element cannot otherwise succeed.
    Sequence(Vec<Rule>),
    /// Alternatives in declared order; the first match wins.
    Choice(Vec<Rule>),
    /// Greedy repetition, at least `min` and at most `max` times.
    Repeat {
        rule: Box<Rule>,
        min: u32,
        max: Option<u32>,
    },
    Token(SyntaxKind),
    /// Lookahead that never consumes input.
    Predicate { rule: Box<Rule>, negate: bool },
    Ref(RuleName),
    Node { kind: SyntaxKind, rule: Box<Rule> },
    Scope { scope: ScopeKind, rule: Box<Rule> },
    Require { rule: Box<Rule>, recovery: Recovery },
    /// Consume everything up to a boundary as text. Always succeeds.
    Skip(Boundary),
    /// The line prefix owed to every open container (item indentation, `>`).
    Prefix,
    /// The prefix of the next item of the innermost list.
    Sibling,
    /// End of input.
    End,
    Inline(InlineMode),
}

/// What the engine emits when a required element fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// A zero-width missing node.
    Missing,
    /// An error node spanning to the boundary. At end of input a missing
    /// node is emitted instead.
    Skip(Boundary),
}

/// Where inline content stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineMode {
    /// Runs over continuation lines until the paragraph ends.
    Paragraph,
    /// One line, stopping before a trailing attribute list.
    Heading,
}

macro_rules! rule_names {
    ($($name:ident => $text:literal,)*) => {
        /// Name of every production in the table.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum RuleName {
            $($name,)*
        }

        impl RuleName {
            /// Every rule name, in table order.
            pub const ALL: &'static [RuleName] = &[$(RuleName::$name,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(RuleName::$name => $text,)*
                }
            }
        }

        impl std::str::FromStr for RuleName {
            type Err = UnknownRule;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(RuleName::$name),)*
                    _ => Err(UnknownRule(s.to_string())),
                }
            }
        }
    };
}

rule_names! {
    Block => "block",
    BlankLine => "blank_line",
    LineEnd => "line_end",
    LinePrefix => "line_prefix",
    ErrorLine => "error_line",
    Frontmatter => "frontmatter",
    YamlLine => "yaml_line",
    CodeCell => "code_cell",
    RawBlock => "raw_block",
    CodeBlock => "code_block",
    CellAttributesStart => "cell_attributes_start",
    RawAttributesStart => "raw_attributes_start",
    FenceRest => "fence_rest",
    CodeLine => "code_line",
    FenceClose => "fence_close",
    DisplayMath => "display_math",
    MathLine => "math_line",
    Div => "div",
    DivAttributes => "div_attributes",
    DivChild => "div_child",
    DivClose => "div_close",
    Heading => "heading",
    HeadingAttributes => "heading_attributes",
    HeadingAttributesTail => "heading_attributes_tail",
    ThematicBreak => "thematic_break",
    BlockQuote => "block_quote",
    QuoteLine => "quote_line",
    List => "list",
    ListContinuation => "list_continuation",
    ListItem => "list_item",
    ItemChild => "item_child",
    Paragraph => "paragraph",
    ParagraphContinues => "paragraph_continues",
    Interrupt => "interrupt",
    AttrBlock => "attr_block",
    AttrBlockRecovery => "attr_block_recovery",
    AttrLineStart => "attr_line_start",
    AttrListStart => "attr_list_start",
    AttrList => "attr_list",
    AttrItem => "attr_item",
    Attribute => "attribute",
}

impl std::fmt::Display for RuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no grammar rule named `{0}`")]
pub struct UnknownRule(pub String);

/// The rule table, indexed by [`RuleName`].
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<Rule>,
}

impl Grammar {
    /// Bumped whenever a rule changes shape, so cached trees from another
    /// grammar version are never mixed with fresh ones.
    pub const VERSION: u32 = 1;

    fn new() -> Self {
        Self {
            rules: RuleName::ALL.iter().map(|name| define(*name)).collect(),
        }
    }

    pub fn rule(&self, name: RuleName) -> &Rule {
        &self.rules[name as usize]
    }

    /// Look a rule up by its string name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        name.parse().ok().map(|name| self.rule(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleName, &Rule)> {
        RuleName::ALL.iter().copied().zip(&self.rules)
    }
}

static GRAMMAR: LazyLock<Grammar> = LazyLock::new(Grammar::new);

/// The process-wide grammar table.
pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}

fn define(name: RuleName) -> Rule {
    match name {
        RuleName::Block => block::block(),
        RuleName::BlankLine => block::blank_line(),
        RuleName::LineEnd => block::line_end(),
        RuleName::LinePrefix => Rule::Prefix,
        RuleName::ErrorLine => block::error_line(),
        RuleName::Frontmatter => block::frontmatter(),
        RuleName::YamlLine => block::yaml_line(),
        RuleName::CodeCell => block::code_cell(),
        RuleName::RawBlock => block::raw_block(),
        RuleName::CodeBlock => block::code_block(),
        RuleName::CellAttributesStart => attributes::cell_attributes_start(),
        RuleName::RawAttributesStart => attributes::raw_attributes_start(),
        RuleName::FenceRest => block::fence_rest(),
        RuleName::CodeLine => block::code_line(),
        RuleName::FenceClose => block::fence_close(),
        RuleName::DisplayMath => block::display_math(),
        RuleName::MathLine => block::math_line(),
        RuleName::Div => block::div(),
        RuleName::DivAttributes => attributes::div_attributes(),
        RuleName::DivChild => block::div_child(),
        RuleName::DivClose => block::div_close(),
        RuleName::Heading => block::heading(),
        RuleName::HeadingAttributes => attributes::heading_attributes(),
        RuleName::HeadingAttributesTail => attributes::heading_attributes_tail(),
        RuleName::ThematicBreak => block::thematic_break(),
        RuleName::BlockQuote => block::block_quote(),
        RuleName::QuoteLine => block::quote_line(),
        RuleName::List => block::list(),
        RuleName::ListContinuation => block::list_continuation(),
        RuleName::ListItem => block::list_item(),
        RuleName::ItemChild => block::item_child(),
        RuleName::Paragraph => block::paragraph(),
        RuleName::ParagraphContinues => block::paragraph_continues(),
        RuleName::Interrupt => block::interrupt(),
        RuleName::AttrBlock => attributes::attr_block(),
        RuleName::AttrBlockRecovery => attributes::attr_block_recovery(),
        RuleName::AttrLineStart => attributes::attr_line_start(),
        RuleName::AttrListStart => attributes::attr_list_start(),
        RuleName::AttrList => attributes::attr_list(),
        RuleName::AttrItem => attributes::attr_item(),
        RuleName::Attribute => attributes::attribute(),
    }
}

// Constructors used by the rule definitions.

fn seq(rules: Vec<Rule>) -> Rule {
    Rule::Sequence(rules)
}

fn choice(rules: Vec<Rule>) -> Rule {
    Rule::Choice(rules)
}

fn opt(rule: Rule) -> Rule {
    Rule::Repeat {
        rule: Box::new(rule),
        min: 0,
        max: Some(1),
    }
}

fn many(rule: Rule) -> Rule {
    Rule::Repeat {
        rule: Box::new(rule),
        min: 0,
        max: None,
    }
}

fn many1(rule: Rule) -> Rule {
    Rule::Repeat {
        rule: Box::new(rule),
        min: 1,
        max: None,
    }
}

fn token(kind: SyntaxKind) -> Rule {
    Rule::Token(kind)
}

fn r(name: RuleName) -> Rule {
    Rule::Ref(name)
}

fn not(rule: Rule) -> Rule {
    Rule::Predicate {
        rule: Box::new(rule),
        negate: true,
    }
}

fn lookahead(rule: Rule) -> Rule {
    Rule::Predicate {
        rule: Box::new(rule),
        negate: false,
    }
}

fn node(kind: SyntaxKind, rule: Rule) -> Rule {
    Rule::Node {
        kind,
        rule: Box::new(rule),
    }
}

fn scope(scope: ScopeKind, rule: Rule) -> Rule {
    Rule::Scope {
        scope,
        rule: Box::new(rule),
    }
}

fn require(rule: Rule, recovery: Recovery) -> Rule {
    Rule::Require {
        rule: Box::new(rule),
        recovery,
    }
}

fn ws() -> Rule {
    token(SyntaxKind::WHITESPACE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn refs(rule: &Rule, out: &mut Vec<RuleName>) {
        match rule {
            Rule::Sequence(rules) | Rule::Choice(rules) => {
                rules.iter().for_each(|rule| refs(rule, out))
            }
            Rule::Repeat { rule, .. }
            | Rule::Predicate { rule, .. }
            | Rule::Node { rule, .. }
            | Rule::Scope { rule, .. }
            | Rule::Require { rule, .. } => refs(rule, out),
            Rule::Ref(name) => out.push(*name),
            _ => {}
        }
    }

    #[test]
    fn table_is_indexed_by_rule_name() {
        for (index, name) in RuleName::ALL.iter().enumerate() {
            assert_eq!(*name as usize, index);
        }
    }

    #[test]
    fn names_roundtrip_through_strings() {
        for name in RuleName::ALL {
            assert_eq!(name.as_str().parse::<RuleName>(), Ok(*name));
        }
        assert_eq!(
            "nope".parse::<RuleName>(),
            Err(UnknownRule("nope".to_string()))
        );
    }

    #[test]
    fn every_rule_is_reachable_from_an_entry_point() {
        let grammar = grammar();
        // Block drives the document; the rest are used directly by the
        // parser driver and inline resolution.
        let mut stack = vec![
            RuleName::Block,
            RuleName::ErrorLine,
            RuleName::LinePrefix,
            RuleName::ParagraphContinues,
            RuleName::HeadingAttributesTail,
        ];
        let mut seen = stack.clone();
        while let Some(name) = stack.pop() {
            let mut out = Vec::new();
            refs(grammar.rule(name), &mut out);
            for next in out {
                if !seen.contains(&next) {
                    seen.push(next);
                    stack.push(next);
                }
            }
        }
        let unreachable: Vec<_> = RuleName::ALL
            .iter()
            .filter(|name| !seen.contains(name))
            .collect();
        assert_eq!(unreachable, Vec::<&RuleName>::new());
    }

    #[test]
    fn lookup_by_string() {
        assert_eq!(grammar().get("line_prefix"), Some(&Rule::Prefix));
        assert!(grammar().get("missing_rule").is_none());
    }
}
