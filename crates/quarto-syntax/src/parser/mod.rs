//! # Parser - Rule Derivation and Event-Based Tree Construction
//!
//! This module runs the grammar table against an input text. The rule
//! engine walks [`Rule`]s, pulls tokens from the [`Scanner`] on demand, and
//! emits a flat list of [`Event`]s that the [`Sink`] turns into a Rowan
//! green tree, one top-level block at a time.
//!
//! ## Ordered Choice and Backtracking
//!
//! Every derivation step is a plain `bool`: matched or not. Before trying a
//! rule the engine takes a [`Checkpoint`] of the session (byte offset,
//! context stack depth, event count); when the rule fails, the session is
//! rewound to it. Because tree structure only exists as events until a block
//! is finished, a rewind is a couple of `truncate` calls.
//!
//! ```text
//! Choice[Heading, Paragraph] at "#tag line"
//!   Heading:   HEADING_MARKER? no (no space after '#')  -> rewind
//!   Paragraph: Start(PARAGRAPH) Token(TEXT, 8) Finish   -> matched
//! ```
//!
//! Repetitions inside a sequence are greedy but give matches back one at a
//! time when a later element of the sequence cannot otherwise succeed.
//!
//! ## The Marker System
//!
//! Node rules use the [`Marker`] type. When you call `parser.start()`, you
//! get a `Marker` that **must** be either:
//!
//! - Completed with `marker.complete(parser, KIND)` → emits Start+Finish
//! - Abandoned with `marker.abandon(parser)` → drops everything since `start()`
//!
//! If you drop a marker without doing either, **the program panics**.
//!
//! ## Context Frames
//!
//! Scoped rules push a [`Frame`] (open fence, list, item, quote, ...) that the
//! scanner consults for context-sensitive tokens and that the `Prefix` and
//! `Sibling` rules use to consume container indentation. The stack is part of
//! the checkpoint, so a failed alternative can never leak a frame.
//!
//! ## Module Structure
//!
//! - [`event`] - The Event enum
//! - [`sink`] - Converts events to Rowan green nodes
//! - `inline` - Delimiter-stack resolution of paragraph and heading text
//!
//! ## Public API
//!
//! The main entry point is [`parse`]:
//!
//! ```
//! use quarto_syntax::{parse, NodeExt};
//!
//! let tree = parse("# Hello\n").unwrap();
//! let heading = tree.root().first_child().unwrap();
//! assert_eq!(heading.rule_name(), "heading");
//! ```

pub mod event;
pub mod sink;

mod inline;

use std::ops::ControlFlow;

use rowan::GreenNode;

use crate::error::{ParseError, decode};
use crate::grammar::{Grammar, Recovery, Rule, RuleName, grammar};
use crate::options::ParseOptions;
use crate::scanner::Scanner;
use crate::scanner::frame::{Frame, ScopeKind};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use crate::token_set::TokenSet;
use crate::tree::SyntaxTree;
use event::Event;
use sink::Sink;

/// Most container frames (lists, items, quotes, divs) that may be open at
/// once. Past it a container scope does not open and its line is derived
/// as text by the enclosing block.
pub const MAX_NESTING: usize = 32;

/// The parse session.
///
/// Holds the scanner, the current byte offset, the open context frames and
/// the accumulated events of the block being derived.
pub struct Parser<'t> {
    scanner: Scanner<'t>,
    grammar: &'t Grammar,
    options: &'t ParseOptions,
    pos: usize,
    frames: Vec<Frame>,
    events: Vec<Event>,
}

/// Saved session state to rewind to when a rule fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    pos: usize,
    frames: usize,
    events: usize,
}

/// One derived top-level block.
#[derive(Debug, Clone)]
pub(crate) struct DerivedBlock {
    pub green: GreenNode,
    /// Absolute offset just past the last byte the derivation examined.
    pub lookahead: usize,
}

impl<'t> Parser<'t> {
    pub fn new(text: &'t str, grammar: &'t Grammar, options: &'t ParseOptions) -> Self {
        Self {
            scanner: Scanner::new(text),
            grammar,
            options,
            pos: 0,
            frames: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Current byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn text(&self) -> &'t str {
        self.scanner.text()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.scanner.len()
    }

    pub fn options(&self) -> &'t ParseOptions {
        self.options
    }

    pub(crate) fn scanner(&self) -> &Scanner<'t> {
        &self.scanner
    }

    /// Move to a line start to derive from. Only valid between blocks.
    pub(crate) fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            completed: false,
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            frames: self.frames.len(),
            events: self.events.len(),
        }
    }

    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        debug_assert!(checkpoint.frames <= self.frames.len());
        self.pos = checkpoint.pos;
        self.frames.truncate(checkpoint.frames);
        self.events.truncate(checkpoint.events);
    }

    /// Derive `rule` at the current offset. On failure the session is left
    /// exactly as it was.
    pub fn derive(&mut self, rule: &'t Rule) -> bool {
        let checkpoint = self.checkpoint();
        let matched = self.derive_inner(rule);
        if !matched {
            self.rewind(checkpoint);
        }
        matched
    }

    pub fn derive_named(&mut self, name: RuleName) -> bool {
        let grammar = self.grammar;
        self.derive(grammar.rule(name))
    }

    /// Whether rule `name` matches at `at`, without consuming anything.
    pub(crate) fn check(&mut self, name: RuleName, at: usize) -> bool {
        let checkpoint = self.checkpoint();
        self.pos = at;
        let matched = self.derive_named(name);
        self.rewind(checkpoint);
        matched
    }

    fn derive_inner(&mut self, rule: &'t Rule) -> bool {
        match rule {
            Rule::Sequence(rules) => self.derive_sequence(rules),
            Rule::Choice(alternatives) => alternatives.iter().any(|rule| self.derive(rule)),
            Rule::Repeat { rule, min, max } => {
                let mut count = 0;
                while max.is_none_or(|max| count < max) {
                    let checkpoint = self.checkpoint();
                    if !self.derive(rule) {
                        break;
                    }
                    if self.pos == checkpoint.pos {
                        self.rewind(checkpoint);
                        break;
                    }
                    count += 1;
                }
                count >= *min
            }
            Rule::Token(kind) => self.eat(*kind),
            Rule::Predicate { rule, negate } => {
                let checkpoint = self.checkpoint();
                let matched = self.derive(rule);
                self.rewind(checkpoint);
                matched != *negate
            }
            Rule::Ref(name) => self.derive_named(*name),
            Rule::Node { kind, rule } => {
                let m = self.start();
                if self.derive(rule) {
                    m.complete(self, *kind);
                    true
                } else {
                    m.abandon(self);
                    false
                }
            }
            Rule::Scope { scope, rule } => {
                let Some(frame) = self.frame_for(*scope) else {
                    return false;
                };
                let depth = self.frames.len();
                self.frames.push(frame);
                let matched = self.derive(rule);
                self.frames.truncate(depth);
                matched
            }
            Rule::Require { rule, recovery } => {
                if !self.derive(rule) {
                    self.recover(*recovery);
                }
                true
            }
            Rule::Skip(boundary) => {
                let end = self.scanner.skip(self.pos, *boundary);
                self.bump(SyntaxKind::TEXT, end);
                true
            }
            Rule::Prefix => self.derive_prefix(self.frames.len()),
            Rule::Sibling => self.derive_sibling(),
            Rule::End => {
                self.scanner.touch(self.pos);
                self.at_end()
            }
            Rule::Inline(mode) => inline::derive(self, *mode),
        }
    }

    fn derive_sequence(&mut self, rules: &'t [Rule]) -> bool {
        let Some((first, rest)) = rules.split_first() else {
            return true;
        };
        let Rule::Repeat { rule, min, max } = first else {
            return self.derive(first) && self.derive_sequence(rest);
        };

        // Greedy first, then give repetitions back until the rest matches.
        let mut stops = vec![self.checkpoint()];
        while max.is_none_or(|max| stops.len() <= max as usize) {
            let before = self.pos;
            if !self.derive(rule) {
                break;
            }
            if self.pos == before {
                if let Some(&last) = stops.last() {
                    self.rewind(last);
                }
                break;
            }
            stops.push(self.checkpoint());
        }
        while stops.len() > *min as usize {
            let Some(stop) = stops.pop() else { break };
            self.rewind(stop);
            if self.derive_sequence(rest) {
                return true;
            }
        }
        false
    }

    /// Consume one token of `kind` if the scanner produces it here.
    fn eat(&mut self, kind: SyntaxKind) -> bool {
        match self
            .scanner
            .next_token(self.pos, TokenSet::single(kind), &self.frames)
        {
            Some(token) => {
                self.push_token(kind, token.len());
                self.pos += token.len();
                true
            }
            None => false,
        }
    }

    /// Consume up to `end` as a single token of `kind`; nothing if empty.
    fn bump(&mut self, kind: SyntaxKind, end: usize) {
        if end > self.pos {
            self.push_token(kind, end - self.pos);
            self.pos = end;
        }
    }

    pub(crate) fn push_token(&mut self, kind: SyntaxKind, len: usize) {
        self.events.push(Event::token(kind, len));
    }

    pub(crate) fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub(crate) fn push_events(&mut self, events: Vec<Event>) {
        self.events.extend(events);
    }

    pub(crate) fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Remove and return the events pushed since `mark`.
    pub(crate) fn split_events(&mut self, mark: usize) -> Vec<Event> {
        self.events.split_off(mark)
    }

    /// The frame a scope opens at the current offset, if it can open here.
    fn frame_for(&self, scope: ScopeKind) -> Option<Frame> {
        let pos = self.pos;
        let bytes = self.text().as_bytes();
        self.scanner.touch(pos);
        if scope.is_nesting() && self.nesting() >= MAX_NESTING {
            log::trace!("nesting limit reached at byte {pos}, not opening {scope:?}");
            return None;
        }
        match scope {
            ScopeKind::Frontmatter => (pos == 0).then_some(Frame::Frontmatter),
            ScopeKind::Fence => {
                let fill = *bytes.get(pos)?;
                let len = bytes[pos..].iter().take_while(|&&b| b == fill).count();
                Some(Frame::Fence { fill, len })
            }
            ScopeKind::MathBlock => Some(Frame::MathBlock),
            ScopeKind::Div => Some(Frame::Div),
            ScopeKind::Quote => Some(Frame::Quote),
            ScopeKind::Attributes => Some(Frame::Attributes),
            ScopeKind::List => {
                let (marker, _) = self.scanner.list_marker(pos, &self.frames)?;
                Some(Frame::List {
                    column: self.scanner.indent_column(pos),
                    marker,
                })
            }
            ScopeKind::Item => {
                let (_, end) = self.scanner.list_marker(pos, &self.frames)?;
                let marker_end = self.scanner.indent_column(end);
                let spaces = bytes[end..]
                    .iter()
                    .take_while(|&&b| b == b' ' || b == b'\t')
                    .count();
                let content = self.scanner.indent_column(end + spaces);
                let content_column = if self.scanner.rest_is_blank(end)
                    || spaces == 0
                    || content - marker_end > 4
                {
                    marker_end + 1
                } else {
                    content
                };
                Some(Frame::Item { content_column })
            }
        }
    }

    fn nesting(&self) -> usize {
        self.frames.iter().filter(|frame| frame.is_nesting()).count()
    }

    /// Consume the line prefix owed to the container frames in
    /// `frames[..depth]`, outermost first.
    fn derive_prefix(&mut self, depth: usize) -> bool {
        if !self.frames[..depth].iter().any(Frame::is_container) {
            return true;
        }
        if self.scanner.line_start(self.pos) != self.pos {
            return false;
        }
        for i in 0..depth {
            let frame = self.frames[i];
            match frame {
                Frame::Item { content_column } => {
                    let Some(end) = self.scanner.indent_to(self.pos, content_column) else {
                        return false;
                    };
                    self.bump(SyntaxKind::WHITESPACE, end);
                }
                Frame::Quote => {
                    let bytes = self.text().as_bytes();
                    let indent = bytes[self.pos..]
                        .iter()
                        .take_while(|&&b| b == b' ' || b == b'\t')
                        .count();
                    self.bump(SyntaxKind::WHITESPACE, self.pos + indent);
                    if !self.eat(SyntaxKind::QUOTE_MARKER) {
                        return false;
                    }
                    if matches!(bytes.get(self.pos), Some(b' ' | b'\t')) {
                        self.bump(SyntaxKind::WHITESPACE, self.pos + 1);
                    }
                }
                _ => {}
            }
        }
        true
    }

    /// Consume the prefix of the next item of the innermost list: the prefix
    /// of the containers around the list, then indentation ending exactly at
    /// the list's column.
    fn derive_sibling(&mut self) -> bool {
        let Some(index) = self
            .frames
            .iter()
            .rposition(|frame| matches!(frame, Frame::List { .. }))
        else {
            return false;
        };
        let Frame::List { column, .. } = self.frames[index] else {
            return false;
        };
        if self.scanner.line_start(self.pos) != self.pos || !self.derive_prefix(index) {
            return false;
        }
        let Some(end) = self.scanner.indent_exactly(self.pos, column) else {
            return false;
        };
        self.bump(SyntaxKind::WHITESPACE, end);
        true
    }

    /// Stand in for a required element that failed to derive.
    fn recover(&mut self, recovery: Recovery) {
        let end = match recovery {
            Recovery::Missing => self.pos,
            Recovery::Skip(boundary) => self.scanner.skip(self.pos, boundary),
        };
        let kind = if end > self.pos {
            SyntaxKind::ERROR
        } else {
            SyntaxKind::MISSING
        };
        let m = self.start();
        self.bump(SyntaxKind::TEXT, end);
        m.complete(self, kind);
    }

    /// Derive the top-level block starting at the current offset.
    ///
    /// Always makes progress: input no block rule accepts becomes an error
    /// node for the rest of the line.
    pub(crate) fn derive_block(&mut self) -> DerivedBlock {
        let start = self.pos;
        let base = Checkpoint {
            pos: start,
            frames: 0,
            events: 0,
        };
        self.rewind(base);
        self.scanner.reset_lookahead();

        let matched = self.derive_named(RuleName::Block);
        if !matched || self.pos == start {
            log::trace!("no block rule matched at byte {start}, recovering to end of line");
            self.rewind(base);
            self.derive_named(RuleName::ErrorLine);
        }

        let events = std::mem::take(&mut self.events);
        let green = Sink::new(self.text(), start, events).finish(SyntaxKind::ERROR);
        DerivedBlock {
            green,
            lookahead: self.scanner.lookahead().max(self.pos),
        }
    }
}

/// A marker for a node being constructed.
///
/// When you call `parser.start()`, a `Placeholder` event is pushed and you
/// get a `Marker` pointing to it. The `#[must_use]` attribute and the `Drop`
/// impl together enforce that every marker is either completed or
/// abandoned.
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    /// Position in the events vector where our Placeholder lives
    pos: usize,
    /// Tracks whether complete() or abandon() was called
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating a node of the given kind.
    ///
    /// Replaces the `Placeholder` at our position with `Start { kind }` and
    /// pushes a `Finish` event.
    pub fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) {
        self.completed = true;
        let event_at_pos = &mut p.events[self.pos];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::start(kind);
        p.events.push(Event::Finish);
    }

    /// Abandon this marker, dropping its placeholder and every event pushed
    /// after it.
    pub fn abandon(mut self, p: &mut Parser<'_>) {
        self.completed = true;
        p.events.truncate(self.pos);
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// Result of deriving a single rule over a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// The rule matched a prefix of the text. The node is a `ROOT` spanning
    /// the consumed prefix, holding whatever the rule produced.
    Matched(SyntaxNode),
    NoMatch,
}

/// Derive one grammar rule at the start of `text` with default options.
pub fn derive_rule(name: RuleName, text: &str) -> Derivation {
    let options = ParseOptions::default();
    let mut parser = Parser::new(text, grammar(), &options);
    if !parser.derive_named(name) {
        return Derivation::NoMatch;
    }
    let events = std::mem::take(&mut parser.events);
    let mut wrapped = Vec::with_capacity(events.len() + 2);
    wrapped.push(Event::start(SyntaxKind::ROOT));
    wrapped.extend(events);
    wrapped.push(Event::Finish);
    let green = Sink::new(text, 0, wrapped).finish(SyntaxKind::ROOT);
    Derivation::Matched(SyntaxNode::new_root(green))
}

/// Parse a document with default options.
pub fn parse(text: impl AsRef<[u8]>) -> Result<SyntaxTree, ParseError> {
    parse_with(text, &ParseOptions::default(), &mut |_| ControlFlow::Continue(()))
}

/// Parse a document.
///
/// `abort` is called with the byte offset of every top-level block before
/// it is derived; returning `Break` stops the parse with
/// [`ParseError::Aborted`].
pub fn parse_with(
    text: impl AsRef<[u8]>,
    options: &ParseOptions,
    abort: &mut dyn FnMut(usize) -> ControlFlow<()>,
) -> Result<SyntaxTree, ParseError> {
    let text = decode(text.as_ref())?;
    let mut parser = Parser::new(text, grammar(), options);
    let mut blocks = Vec::new();
    while !parser.at_end() {
        if abort(parser.pos()).is_break() {
            return Err(ParseError::Aborted {
                offset: parser.pos(),
            });
        }
        blocks.push(parser.derive_block());
    }
    Ok(SyntaxTree::from_blocks(blocks, options.clone()))
}
