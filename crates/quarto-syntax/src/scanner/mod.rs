//! # Scanner - Context-Sensitive Tokens on Demand
//!
//! The scanner turns bytes at a given offset into a single classified
//! [`Token`]. It is invoked lazily by the rule engine, which passes the set
//! of token kinds it is prepared to accept together with the stack of open
//! context [`Frame`]s:
//!
//! ```text
//! next_token(pos, {FENCE_CLOSE}, [Fence { fill: '`', len: 4 }])
//!     "```\n"   -> None            (too short to close a four backtick fence)
//!     "`````\n" -> Some(FENCE_CLOSE)
//! ```
//!
//! A `None` result is an ordinary outcome: the engine simply tries the next
//! alternative. The scanner never moves the parse position itself.
//!
//! ## Context-Sensitive Tokens
//!
//! A handful of tokens cannot be recognized by a regular lexer:
//!
//! - **Fence close** needs the fill character and length of the open fence.
//! - **Front matter delimiters** are only tokens at byte 0, or as the
//!   closing delimiter while the front matter frame is open.
//! - **Div close** is only a token while a div is open.
//! - **List markers** must match the marker style of the list being continued.
//! - **Attribute values** track quotes and brace nesting so the `}` in
//!   `{key="a}b"}` stays inside the value.
//!
//! Block markers are additionally only recognized at a block start: the bytes
//! before them on the line may only be indentation or container markers.
//!
//! ## Lookahead Tracking
//!
//! Every scan records how far into the input it looked, at line granularity.
//! The parser stores this per top-level block so incremental reparse can tell
//! whether an edit could have changed a block it wants to reuse.
//!
//! Inline text runs are classified by a separate [Logos] lexer in
//! [`inline`].
//!
//! [Logos]: https://docs.rs/logos

pub mod frame;
pub mod inline;

use std::cell::Cell;

use rowan::{TextRange, TextSize};

use crate::line_index::LineIndex;
use crate::syntax_kind::SyntaxKind;
use crate::token_set::TokenSet;
use frame::{Frame, ListMarker};

/// A classified span of input produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn len(&self) -> usize {
        usize::from(self.range.len())
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Where error recovery resumes after a malformed construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The end of the current line, newline excluded.
    EndOfLine,
    /// Just past the next unescaped `}`, or the end of the line if none comes first.
    AttributeClose,
}

/// On-demand tokenizer over one input text.
pub struct Scanner<'t> {
    text: &'t str,
    lines: LineIndex,
    furthest: Cell<usize>,
}

impl<'t> Scanner<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            lines: LineIndex::new(text),
            furthest: Cell::new(0),
        }
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    /// Try each expected kind in declaration order and return the first
    /// token that matches at `pos`.
    pub fn next_token(&self, pos: usize, expected: TokenSet, frames: &[Frame]) -> Option<Token> {
        expected.iter().find_map(|kind| {
            let end = self.scan(pos, kind, frames)?;
            let point = self.lines.point(pos);
            Some(Token {
                kind,
                range: TextRange::new(TextSize::from(pos as u32), TextSize::from(end as u32)),
                line: point.row,
                column: point.column,
            })
        })
    }

    /// End offset of a `kind` token starting at `pos`, if one starts there.
    pub fn scan(&self, pos: usize, kind: SyntaxKind, frames: &[Frame]) -> Option<usize> {
        self.touch(pos);
        let bytes = self.bytes();
        let rest = &bytes[pos..];
        let end = match kind {
            SyntaxKind::WHITESPACE => pos + run(rest, |b| b == b' ' || b == b'\t'),
            SyntaxKind::NEWLINE => pos + self.newline_len(pos),
            SyntaxKind::YAML_TEXT | SyntaxKind::CODE_TEXT => self.line_end(pos),
            SyntaxKind::INFO_STRING => trim_end(bytes, pos, self.line_end(pos)),
            SyntaxKind::FENCE_OPEN => self.fence_open(pos)?,
            SyntaxKind::FENCE_CLOSE => self.fence_close(pos, frames)?,
            SyntaxKind::MATH_BLOCK_DELIM => self.math_block_delim(pos)?,
            SyntaxKind::DIV_OPEN => self.div_fence(pos, true, frames)?,
            SyntaxKind::DIV_CLOSE => self.div_fence(pos, false, frames)?,
            SyntaxKind::HEADING_MARKER => self.heading_marker(pos)?,
            SyntaxKind::BREAK_MARKER => self.break_marker(pos)?,
            SyntaxKind::QUOTE_MARKER => {
                if !(rest.first() == Some(&b'>') && self.at_block_start(pos)) {
                    return None;
                }
                pos + 1
            }
            SyntaxKind::LIST_MARKER => self.list_marker(pos, frames)?.1,
            SyntaxKind::FRONTMATTER_DELIM => self.frontmatter_delim(pos, frames)?,
            SyntaxKind::LBRACE | SyntaxKind::RBRACE => {
                let brace = if kind == SyntaxKind::LBRACE { b'{' } else { b'}' };
                if !(rest.first() == Some(&brace) && in_attributes(frames)) {
                    return None;
                }
                pos + 1
            }
            SyntaxKind::ATTR_ID => pos + prefixed(rest, b'#', ident_len)?,
            SyntaxKind::ATTR_CLASS => pos + prefixed(rest, b'.', ident_len)?,
            SyntaxKind::RAW_FORMAT => pos + prefixed(rest, b'=', ident_len)?,
            SyntaxKind::ATTR_KEY => {
                let n = word_len(rest);
                if n == 0 || rest.get(n) != Some(&b'=') {
                    return None;
                }
                pos + n
            }
            SyntaxKind::ATTR_WORD => {
                // A leading `.` is a class.
                let n = word_len(rest);
                if rest.first() == Some(&b'.') || rest.get(n) == Some(&b'=') {
                    return None;
                }
                pos + n
            }
            SyntaxKind::EQ => pos + usize::from(rest.first() == Some(&b'=')),
            SyntaxKind::COMMA => pos + usize::from(rest.first() == Some(&b',')),
            SyntaxKind::ATTR_VALUE => pos + attr_value_len(rest)?,
            _ => return None,
        };
        (end > pos).then_some(end)
    }

    /// Offset where recovery for `boundary` resumes, starting at `pos`.
    pub fn skip(&self, pos: usize, boundary: Boundary) -> usize {
        match boundary {
            Boundary::EndOfLine => self.line_end(pos),
            Boundary::AttributeClose => {
                let eol = self.line_end(pos);
                let bytes = self.bytes();
                let mut i = pos;
                while i < eol {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'}' => return i + 1,
                        _ => i += 1,
                    }
                }
                eol
            }
        }
    }

    /// Offset of the line terminator at or after `pos` (or the end of input).
    pub fn line_end(&self, pos: usize) -> usize {
        self.touch(pos);
        let bytes = self.bytes();
        match bytes[pos..].iter().position(|&b| b == b'\n') {
            Some(i) if i > 0 && bytes[pos + i - 1] == b'\r' => pos + i - 1,
            Some(i) => pos + i,
            None => bytes.len(),
        }
    }

    /// Length of the line terminator at `pos`, 0 if there is none.
    pub fn newline_len(&self, pos: usize) -> usize {
        let rest = &self.bytes()[pos..];
        if rest.starts_with(b"\r\n") {
            2
        } else if rest.starts_with(b"\n") {
            1
        } else {
            0
        }
    }

    pub fn line_start(&self, pos: usize) -> usize {
        self.bytes()[..pos]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1)
    }

    /// Visual column of `pos`, expanding tabs to multiples of four.
    pub fn indent_column(&self, pos: usize) -> usize {
        self.text[self.line_start(pos)..pos]
            .chars()
            .fold(0, |col, c| advance_column(col, c))
    }

    /// True if only whitespace remains on the line from `pos`.
    pub fn rest_is_blank(&self, pos: usize) -> bool {
        let end = self.line_end(pos);
        self.bytes()[pos..end]
            .iter()
            .all(|&b| b == b' ' || b == b'\t')
    }

    /// True if the bytes before `pos` on its line are a container prefix:
    /// indentation, quote markers, and list markers each followed by
    /// whitespace.
    pub fn at_block_start(&self, pos: usize) -> bool {
        let bytes = self.bytes();
        let mut i = self.line_start(pos);
        while i < pos {
            match bytes[i] {
                b' ' | b'\t' | b'>' => i += 1,
                _ => {
                    let Some((_, n)) = ListMarker::scan(&bytes[i..pos]) else {
                        return false;
                    };
                    if !matches!(bytes.get(i + n), Some(b' ' | b'\t')) {
                        return false;
                    }
                    i += n;
                }
            }
        }
        true
    }

    /// Consume indentation from `pos` until the visual column reaches
    /// `target`. Fails on a non-blank byte before the target.
    pub fn indent_to(&self, pos: usize, target: usize) -> Option<usize> {
        self.touch(pos);
        let bytes = self.bytes();
        let mut col = self.indent_column(pos);
        let mut i = pos;
        while col < target {
            match bytes.get(i) {
                Some(b' ') => col += 1,
                Some(b'\t') => col = advance_column(col, '\t'),
                _ => return None,
            }
            i += 1;
        }
        Some(i)
    }

    /// Consume all indentation from `pos`; succeeds only if it ends exactly
    /// at visual column `column`.
    pub fn indent_exactly(&self, pos: usize, column: usize) -> Option<usize> {
        self.touch(pos);
        let end = pos + run(&self.bytes()[pos..], |b| b == b' ' || b == b'\t');
        (self.indent_column(end) == column).then_some(end)
    }

    /// Parse a list marker at `pos` and return it with its end offset.
    pub fn list_marker(&self, pos: usize, frames: &[Frame]) -> Option<(ListMarker, usize)> {
        let rest = &self.bytes()[pos..];
        let (marker, n) = ListMarker::scan(rest)?;
        if !matches!(rest.get(n), None | Some(b' ' | b'\t' | b'\n' | b'\r')) {
            return None;
        }
        if !self.at_block_start(pos) {
            return None;
        }
        if let Some(Frame::List { marker: open, .. }) = frames.last()
            && *open != marker
        {
            return None;
        }
        Some((marker, pos + n))
    }

    /// Mark everything before `end` as examined.
    pub(crate) fn mark(&self, end: usize) {
        if end > self.furthest.get() {
            self.furthest.set(end);
        }
    }

    /// Mark the whole line containing `pos`, terminator included, as examined.
    /// A scan on the last line without a terminator also observes the end of input.
    pub(crate) fn touch(&self, pos: usize) {
        let bytes = self.bytes();
        let end = bytes[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len() + 1, |i| pos + i + 1);
        self.mark(end);
    }

    /// Furthest offset examined since the last reset.
    pub(crate) fn lookahead(&self) -> usize {
        self.furthest.get()
    }

    pub(crate) fn reset_lookahead(&self) {
        self.furthest.set(0);
    }

    fn bytes(&self) -> &'t [u8] {
        self.text.as_bytes()
    }

    fn fence_open(&self, pos: usize) -> Option<usize> {
        let rest = &self.bytes()[pos..];
        let fill = *rest.first()?;
        if fill != b'`' && fill != b'~' {
            return None;
        }
        let n = run(rest, |b| b == fill);
        if n < 3 || !self.at_block_start(pos) {
            return None;
        }
        if fill == b'`' && self.bytes()[pos + n..self.line_end(pos)].contains(&b'`') {
            return None;
        }
        Some(pos + n)
    }

    fn fence_close(&self, pos: usize, frames: &[Frame]) -> Option<usize> {
        let (fill, len) = frames.iter().rev().find_map(|frame| match frame {
            Frame::Fence { fill, len } => Some((*fill, *len)),
            _ => None,
        })?;
        let n = run(&self.bytes()[pos..], |b| b == fill);
        if n < len || !self.at_block_start(pos) || !self.rest_is_blank(pos + n) {
            return None;
        }
        Some(pos + n)
    }

    fn math_block_delim(&self, pos: usize) -> Option<usize> {
        if !self.bytes()[pos..].starts_with(b"$$") || !self.at_block_start(pos) {
            return None;
        }
        let after = pos + 2;
        let next = after + run(&self.bytes()[after..], |b| b == b' ' || b == b'\t');
        match self.bytes().get(next) {
            None | Some(b'\n' | b'\r' | b'{') => Some(after),
            _ => None,
        }
    }

    fn div_fence(&self, pos: usize, open: bool, frames: &[Frame]) -> Option<usize> {
        let n = run(&self.bytes()[pos..], |b| b == b':');
        if n < 3 || !self.at_block_start(pos) {
            return None;
        }
        let blank = self.rest_is_blank(pos + n);
        let accepted = if open {
            !blank
        } else {
            blank && frames.iter().any(|frame| matches!(frame, Frame::Div))
        };
        accepted.then_some(pos + n)
    }

    fn heading_marker(&self, pos: usize) -> Option<usize> {
        let rest = &self.bytes()[pos..];
        let n = run(rest, |b| b == b'#');
        if !(1..=6).contains(&n) || !self.at_block_start(pos) {
            return None;
        }
        match rest.get(n) {
            None | Some(b' ' | b'\t' | b'\n' | b'\r') => Some(pos + n),
            _ => None,
        }
    }

    fn break_marker(&self, pos: usize) -> Option<usize> {
        let bytes = self.bytes();
        let fill = *bytes.get(pos)?;
        if !matches!(fill, b'-' | b'*' | b'_') || !self.at_block_start(pos) {
            return None;
        }
        let mut count = 0;
        let mut last = pos;
        for (i, &b) in bytes[..self.line_end(pos)].iter().enumerate().skip(pos) {
            if b == fill {
                count += 1;
                last = i;
            } else if b != b' ' && b != b'\t' {
                return None;
            }
        }
        (count >= 3).then_some(last + 1)
    }

    fn frontmatter_delim(&self, pos: usize, frames: &[Frame]) -> Option<usize> {
        let rest = &self.bytes()[pos..];
        let accepted = if pos == 0 {
            rest.starts_with(b"---")
        } else {
            matches!(frames.last(), Some(Frame::Frontmatter))
                && self.line_start(pos) == pos
                && (rest.starts_with(b"---") || rest.starts_with(b"..."))
        };
        (accepted && self.rest_is_blank(pos + 3)).then_some(pos + 3)
    }
}

fn in_attributes(frames: &[Frame]) -> bool {
    matches!(frames.last(), Some(Frame::Attributes))
}

fn advance_column(col: usize, c: char) -> usize {
    if c == '\t' { (col / 4 + 1) * 4 } else { col + 1 }
}

fn run(bytes: &[u8], pred: impl Fn(u8) -> bool) -> usize {
    bytes.iter().take_while(|&&b| pred(b)).count()
}

fn trim_end(bytes: &[u8], start: usize, end: usize) -> usize {
    let trailing = bytes[start..end]
        .iter()
        .rev()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count();
    end - trailing
}

/// Identifier bytes: ASCII alphanumerics, `-`, `_`, `:` and any non-ASCII byte,
/// so multi-byte characters are never split.
fn ident_len(bytes: &[u8]) -> usize {
    run(bytes, |b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':') || b >= 0x80)
}

/// Like [`ident_len`] but also allows `.` (`fig.cap`, chunk labels).
fn word_len(bytes: &[u8]) -> usize {
    run(bytes, |b| {
        b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.') || b >= 0x80
    })
}

fn prefixed(bytes: &[u8], sigil: u8, body: fn(&[u8]) -> usize) -> Option<usize> {
    if bytes.first() != Some(&sigil) {
        return None;
    }
    let n = body(&bytes[1..]);
    (n > 0).then_some(n + 1)
}

fn attr_value_len(bytes: &[u8]) -> Option<usize> {
    match *bytes.first()? {
        quote @ (b'"' | b'\'') => {
            let mut i = 1;
            while i < bytes.len() {
                match bytes[i] {
                    b'\\' => {
                        if matches!(bytes.get(i + 1), None | Some(b'\n' | b'\r')) {
                            return None;
                        }
                        i += 2;
                    }
                    b'\n' | b'\r' => return None,
                    b if b == quote => return Some(i + 1),
                    _ => i += 1,
                }
            }
            None
        }
        _ => {
            let mut depth = 0usize;
            let mut i = 0;
            while let Some(&b) = bytes.get(i) {
                match b {
                    b' ' | b'\t' | b'\n' | b'\r' | b',' => break,
                    b'{' => depth += 1,
                    b'}' if depth == 0 => break,
                    b'}' => depth -= 1,
                    _ => {}
                }
                i += 1;
            }
            (i > 0).then_some(i)
        }
    }
}
