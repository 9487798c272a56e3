//! # Inline Resolution
//!
//! Paragraph and heading text is resolved in two passes over a flat list of
//! items, the way CommonMark implementations do it:
//!
//! 1. **Scan.** The [logos lexer](crate::scanner::inline) classifies each
//!    line. Constructs that are decided locally are resolved on the spot:
//!    code spans, inline math, comments, shortcodes and citations look for
//!    their closer on the same line and become finished nodes. `*`/`_` runs
//!    are pushed on a delimiter stack and `[`/`![` on a bracket stack.
//!    A `]` looks back for an opener and forms a link, image or span.
//! 2. **Pair.** Emphasis delimiters are paired with the closer-driven
//!    algorithm: every closer closes the nearest compatible opener, so
//!    `**a *b* c**` nests the emphasis inside the strong node. Runs left
//!    unpaired are literal text; unmatched markers are never errors.
//!
//! Precedence falls out of the scan order: code spans, math, comments and
//! shortcodes are consumed before any delimiter inside them is seen, and
//! brackets resolve the emphasis inside them before the enclosing text.
//!
//! Events are emitted only at the end, once every delimiter is decided.

use crate::grammar::{InlineMode, RuleName};
use crate::options::TripleDelimiter;
use crate::scanner::Boundary;
use crate::scanner::inline::{self as lexer, InlineToken, delimiter_roles};
use crate::syntax_kind::SyntaxKind;

use super::Parser;
use super::event::Event;

/// Resolve inline content from the current offset. Paragraphs run over
/// continuation lines; headings stop at the end of the line or before a
/// trailing attribute list.
pub(super) fn derive(p: &mut Parser<'_>, mode: InlineMode) -> bool {
    let start = p.pos();
    let mut inlines = Inlines::new(p.options().triple_delimiter);
    loop {
        let line_end = p.scanner().line_end(p.pos());
        let limit = match mode {
            InlineMode::Paragraph => line_end,
            InlineMode::Heading => heading_limit(p, line_end),
        };
        inlines.scan_line(p, limit);
        if mode == InlineMode::Heading {
            break;
        }

        let newline = p.scanner().newline_len(p.pos());
        if newline == 0 {
            break;
        }
        let next = p.pos() + newline;
        let continues = p.check(RuleName::ParagraphContinues, next);
        if continues {
            inlines.promote_hard_break();
        }
        inlines.push_token(SyntaxKind::NEWLINE, newline);
        p.set_pos(next);
        if !continues {
            break;
        }

        let mark = p.event_count();
        p.derive_named(RuleName::LinePrefix);
        let prefix = p.split_events(mark);
        if !prefix.is_empty() {
            inlines.items.push(Item::Events(prefix));
        }
    }
    inlines.finish(p);
    mode == InlineMode::Heading || p.pos() > start
}

/// Where heading text ends: before the whitespace leading up to the first
/// `{` that starts an attribute list running to the end of the line.
fn heading_limit(p: &mut Parser<'_>, line_end: usize) -> usize {
    let from = p.pos();
    let bytes = p.text().as_bytes();
    for brace in (from..line_end).filter(|&i| bytes[i] == b'{') {
        let mut start = brace;
        while start > from && matches!(bytes[start - 1], b' ' | b'\t') {
            start -= 1;
        }
        if p.check(RuleName::HeadingAttributesTail, start) {
            return start;
        }
    }
    line_end
}

enum Item {
    Token { kind: SyntaxKind, len: usize },
    Delim(Delim),
    Bracket { image: bool, len: usize, active: bool },
    /// Finished structure: resolved nodes and container prefixes.
    Events(Vec<Event>),
}

struct Delim {
    fill: u8,
    len: usize,
    remaining: usize,
    can_open: bool,
    can_close: bool,
    /// Nodes this run closes, innermost first.
    closes: Vec<(SyntaxKind, usize)>,
    /// Nodes this run opens, innermost first.
    opens: Vec<(SyntaxKind, usize)>,
}

struct Inlines {
    items: Vec<Item>,
    /// Item indices of delimiter runs still in play.
    delims: Vec<usize>,
    /// Item indices of open brackets.
    brackets: Vec<usize>,
    triple: TripleDelimiter,
    /// Trailing backslash or spaces on the current line.
    hard_break: Option<usize>,
}

impl Inlines {
    fn new(triple: TripleDelimiter) -> Self {
        Self {
            items: Vec::new(),
            delims: Vec::new(),
            brackets: Vec::new(),
            triple,
            hard_break: None,
        }
    }

    fn push_token(&mut self, kind: SyntaxKind, len: usize) {
        self.items.push(Item::Token { kind, len });
    }

    fn push_text(&mut self, len: usize) {
        self.push_token(SyntaxKind::TEXT, len);
    }

    fn push_node(&mut self, events: Vec<Event>) {
        self.items.push(Item::Events(events));
    }

    fn scan_line(&mut self, p: &mut Parser<'_>, limit: usize) {
        let text = p.text();
        self.hard_break = None;
        while p.pos() < limit {
            let pos = p.pos();
            let Some((token, len)) = lexer::next(&text[pos..limit]) else {
                break;
            };
            let end = match token {
                Some(InlineToken::Whitespace) => {
                    self.push_token(SyntaxKind::WHITESPACE, len);
                    if pos + len == limit && len >= 2 && text[pos..limit].bytes().all(|b| b == b' ')
                    {
                        self.hard_break = Some(self.items.len() - 1);
                    }
                    pos + len
                }
                Some(InlineToken::Backslash) => {
                    self.push_text(len);
                    if pos + len == limit {
                        self.hard_break = Some(self.items.len() - 1);
                    }
                    pos + len
                }
                Some(InlineToken::Escape) => {
                    self.push_token(SyntaxKind::ESCAPE, len);
                    pos + len
                }
                Some(InlineToken::StarRun | InlineToken::UnderscoreRun) => {
                    self.push_delim(text, pos, len);
                    pos + len
                }
                Some(InlineToken::BacktickRun) => self.code_span(text, pos, len, limit),
                Some(InlineToken::Dollar) => self.math(text, pos, 1, limit),
                Some(InlineToken::DoubleDollar) => self.math(text, pos, 2, limit),
                Some(InlineToken::LBracket) => self.open_bracket(false, pos, len),
                Some(InlineToken::ImageOpen) => self.open_bracket(true, pos, len),
                Some(InlineToken::RBracket) => self.close_bracket(p, pos, limit),
                Some(InlineToken::ShortcodeOpen) => self.shortcode(text, pos, limit),
                Some(InlineToken::CommentOpen) => self.comment(text, pos, limit),
                Some(InlineToken::At) => self.citation(text, pos, limit),
                Some(InlineToken::Text) | None => {
                    self.push_text(len);
                    pos + len
                }
            };
            p.set_pos(end);
        }
    }

    /// The line is followed by a continuation line: its trailing backslash
    /// or spaces become a hard break.
    fn promote_hard_break(&mut self) {
        if let Some(Item::Token { kind, .. }) = self.hard_break.and_then(|i| self.items.get_mut(i))
        {
            *kind = SyntaxKind::HARD_BREAK;
        }
    }

    fn push_delim(&mut self, text: &str, pos: usize, len: usize) {
        let fill = text.as_bytes()[pos];
        let prev = text[..pos].chars().next_back();
        let next = text[pos + len..].chars().next();
        let (can_open, can_close) = delimiter_roles(fill, prev, next);
        self.delims.push(self.items.len());
        self.items.push(Item::Delim(Delim {
            fill,
            len,
            remaining: len,
            can_open,
            can_close,
            closes: Vec::new(),
            opens: Vec::new(),
        }));
    }

    /// A code span closes at the next backtick run of exactly the same
    /// length on the line; otherwise the run is literal.
    fn code_span(&mut self, text: &str, pos: usize, n: usize, limit: usize) -> usize {
        let bytes = text.as_bytes();
        let mut i = pos + n;
        while i < limit {
            if bytes[i] != b'`' {
                i += 1;
                continue;
            }
            let run = bytes[i..limit].iter().take_while(|&&b| b == b'`').count();
            if run == n {
                let mut events = vec![
                    Event::start(SyntaxKind::CODE_SPAN),
                    Event::token(SyntaxKind::CODE_DELIM, n),
                ];
                if i > pos + n {
                    events.push(Event::token(SyntaxKind::TEXT, i - pos - n));
                }
                events.push(Event::token(SyntaxKind::CODE_DELIM, n));
                events.push(Event::Finish);
                self.push_node(events);
                return i + n;
            }
            i += run;
        }
        self.push_text(n);
        pos + n
    }

    /// `$x$` needs a non-space right after the opener, a non-space right
    /// before the closer and no digit after it. `$$x$$` only needs content.
    fn math(&mut self, text: &str, pos: usize, delim: usize, limit: usize) -> usize {
        let bytes = text.as_bytes();
        let content = pos + delim;
        if delim == 1 && !text[content..limit].starts_with(|c: char| !c.is_whitespace()) {
            self.push_text(delim);
            return content;
        }
        let mut i = content;
        while i < limit {
            match bytes[i] {
                b'\\' => i += 2,
                b'$' if delim == 2 => {
                    if i > content && i + 1 < limit && bytes[i + 1] == b'$' {
                        return self.math_node(pos, delim, i);
                    }
                    i += 1;
                }
                b'$' => {
                    let space_before = matches!(bytes[i - 1], b' ' | b'\t');
                    let digit_after = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
                    if i > content && !space_before && !digit_after {
                        return self.math_node(pos, delim, i);
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        self.push_text(delim);
        content
    }

    fn math_node(&mut self, pos: usize, delim: usize, close: usize) -> usize {
        self.push_node(vec![
            Event::start(SyntaxKind::MATH),
            Event::token(SyntaxKind::MATH_DELIM, delim),
            Event::token(SyntaxKind::TEXT, close - pos - delim),
            Event::token(SyntaxKind::MATH_DELIM, delim),
            Event::Finish,
        ]);
        close + delim
    }

    fn comment(&mut self, text: &str, pos: usize, limit: usize) -> usize {
        const OPEN: usize = "<!--".len();
        match text[pos + OPEN..limit].find("-->") {
            Some(k) => {
                let end = pos + OPEN + k + "-->".len();
                self.push_token(SyntaxKind::COMMENT, end - pos);
                end
            }
            None => {
                self.push_text(OPEN);
                pos + OPEN
            }
        }
    }

    /// `{{< name args >}}`. Without a closer on the line the rest of the
    /// line is an error.
    fn shortcode(&mut self, text: &str, pos: usize, limit: usize) -> usize {
        const DELIM: usize = 3;
        let open_end = pos + DELIM;
        let Some(k) = text[open_end..limit].find(">}}") else {
            self.push_node(vec![
                Event::start(SyntaxKind::ERROR),
                Event::token(SyntaxKind::TEXT, limit - pos),
                Event::Finish,
            ]);
            return limit;
        };
        let close = open_end + k;
        let bytes = text.as_bytes();
        let mut events = vec![
            Event::start(SyntaxKind::SHORTCODE),
            Event::token(SyntaxKind::SHORTCODE_OPEN, DELIM),
        ];
        let mut named = false;
        let mut i = open_end;
        while i < close {
            let space = bytes[i..close]
                .iter()
                .take_while(|&&b| b == b' ' || b == b'\t')
                .count();
            if space > 0 {
                events.push(Event::token(SyntaxKind::WHITESPACE, space));
                i += space;
                continue;
            }
            let word = argument_len(&bytes[i..close]);
            let kind = if named {
                SyntaxKind::TEXT
            } else {
                SyntaxKind::SHORTCODE_NAME
            };
            named = true;
            events.push(Event::token(kind, word));
            i += word;
        }
        events.push(Event::token(SyntaxKind::SHORTCODE_CLOSE, DELIM));
        events.push(Event::Finish);
        self.push_node(events);
        close + DELIM
    }

    /// `@key`, `[@key]`, `-@key`. An `@` inside a word (an email address)
    /// is text.
    fn citation(&mut self, text: &str, pos: usize, limit: usize) -> usize {
        let prev = text[..pos].chars().next_back();
        let starts = prev.is_none_or(|c| c.is_whitespace() || matches!(c, '[' | '(' | ';' | '-'));
        let key = if starts {
            citation_key_len(&text[pos + 1..limit])
        } else {
            0
        };
        if key == 0 {
            self.push_text(1);
            return pos + 1;
        }
        self.push_node(vec![
            Event::start(SyntaxKind::CITATION),
            Event::token(SyntaxKind::CITE_KEY, 1 + key),
            Event::Finish,
        ]);
        pos + 1 + key
    }

    fn open_bracket(&mut self, image: bool, pos: usize, len: usize) -> usize {
        self.brackets.push(self.items.len());
        self.items.push(Item::Bracket {
            image,
            len,
            active: true,
        });
        pos + len
    }

    /// `]` closes the innermost open bracket as a link `(dest)`, an image,
    /// or a span `{attrs}`; anything else leaves both brackets literal.
    fn close_bracket(&mut self, p: &mut Parser<'_>, pos: usize, limit: usize) -> usize {
        let Some(&opener) = self.brackets.last() else {
            self.push_text(1);
            return pos + 1;
        };
        let Item::Bracket { image, active, .. } = self.items[opener] else {
            self.brackets.pop();
            self.push_text(1);
            return pos + 1;
        };
        let bytes = p.text().as_bytes();
        let after = pos + 1;

        if active
            && after < limit
            && bytes[after] == b'('
            && let Some(close) = link_destination(bytes, after, limit)
        {
            let mut tail = vec![
                Event::token(SyntaxKind::RBRACKET, 1),
                Event::token(SyntaxKind::LPAREN, 1),
            ];
            if close > after + 1 {
                tail.push(Event::token(SyntaxKind::LINK_DEST, close - after - 1));
            }
            tail.push(Event::token(SyntaxKind::RPAREN, 1));
            let mut end = close + 1;
            if end < limit
                && bytes[end] == b'{'
                && let Some((events, attr_end)) = attributes(p, end, limit)
            {
                tail.extend(events);
                end = attr_end;
            }
            tail.push(Event::Finish);
            let kind = if image {
                SyntaxKind::IMAGE
            } else {
                SyntaxKind::LINK
            };
            self.close_node(opener, kind, tail);
            return end;
        }

        if !image && after < limit && bytes[after] == b'{' {
            let mut tail = vec![Event::token(SyntaxKind::RBRACKET, 1)];
            let end = match attributes(p, after, limit) {
                Some((events, end)) => {
                    tail.extend(events);
                    end
                }
                None => {
                    let end = p
                        .scanner()
                        .skip(after, Boundary::AttributeClose)
                        .min(limit);
                    tail.extend([
                        Event::start(SyntaxKind::ERROR),
                        Event::token(SyntaxKind::TEXT, end - after),
                        Event::Finish,
                    ]);
                    end
                }
            };
            tail.push(Event::Finish);
            self.close_node(opener, SyntaxKind::SPAN, tail);
            return end;
        }

        self.brackets.pop();
        self.push_text(1);
        pos + 1
    }

    /// Turn the bracket at `opener` and everything after it into a node.
    fn close_node(&mut self, opener: usize, kind: SyntaxKind, tail: Vec<Event>) {
        let bottom = self
            .delims
            .iter()
            .position(|&d| d > opener)
            .unwrap_or(self.delims.len());
        self.process_emphasis(bottom);

        let len = match self.items[opener] {
            Item::Bracket { len, .. } => len,
            _ => 1,
        };
        let open_kind = if kind == SyntaxKind::IMAGE {
            SyntaxKind::IMAGE_OPEN
        } else {
            SyntaxKind::LBRACKET
        };
        self.items[opener] = Item::Events(vec![Event::start(kind), Event::token(open_kind, len)]);
        self.push_node(tail);
        self.brackets.pop();

        // Links do not nest: no enclosing `[` may become a link any more.
        if kind == SyntaxKind::LINK {
            for &bracket in &self.brackets {
                if let Item::Bracket {
                    image: false,
                    active,
                    ..
                } = &mut self.items[bracket]
                {
                    *active = false;
                }
            }
        }
    }

    /// Pair emphasis delimiters above `bottom` on the stack, then drop them.
    fn process_emphasis(&mut self, bottom: usize) {
        let mut c = bottom;
        while c < self.delims.len() {
            let closer = self.delims[c];
            let Some((fill, closer_len, closer_open, closer_left)) =
                self.delim(closer).and_then(|d| {
                    (d.can_close && d.remaining > 0).then_some((
                        d.fill,
                        d.len,
                        d.can_open,
                        d.remaining,
                    ))
                })
            else {
                c += 1;
                continue;
            };

            let found = (bottom..c).rev().find(|&o| {
                self.delim(self.delims[o]).is_some_and(|d| {
                    let odd_match = (d.can_close || closer_open)
                        && (d.len + closer_len) % 3 == 0
                        && !(d.len % 3 == 0 && closer_len % 3 == 0);
                    d.fill == fill && d.can_open && d.remaining > 0 && !odd_match
                })
            });

            let Some(o) = found else {
                if closer_open {
                    c += 1;
                } else {
                    self.delims.remove(c);
                }
                continue;
            };

            let opener = self.delims[o];
            let opener_left = self.delim(opener).map_or(0, |d| d.remaining);
            let mut used = if opener_left >= 2 && closer_left >= 2 {
                2
            } else {
                1
            };
            if self.triple == TripleDelimiter::EmphasisInside && opener_left >= 3 && closer_left >= 3
            {
                used = 1;
            }
            let kind = if used == 2 {
                SyntaxKind::STRONG
            } else {
                SyntaxKind::EMPHASIS
            };
            let opener_done = self.delim_mut(opener).is_some_and(|d| {
                d.remaining -= used;
                d.opens.push((kind, used));
                d.remaining == 0
            });
            let closer_done = self.delim_mut(closer).is_some_and(|d| {
                d.remaining -= used;
                d.closes.push((kind, used));
                d.remaining == 0
            });

            // Delimiters between the pair can no longer match anything.
            self.delims.drain(o + 1..c);
            c = o + 1;
            if opener_done {
                self.delims.remove(o);
                c = o;
            }
            if closer_done {
                self.delims.remove(c);
            }
        }
        self.delims.truncate(bottom);
    }

    fn delim(&self, index: usize) -> Option<&Delim> {
        match &self.items[index] {
            Item::Delim(delim) => Some(delim),
            _ => None,
        }
    }

    fn delim_mut(&mut self, index: usize) -> Option<&mut Delim> {
        match &mut self.items[index] {
            Item::Delim(delim) => Some(delim),
            _ => None,
        }
    }

    /// Pair the remaining delimiters and emit every item as events.
    fn finish(mut self, p: &mut Parser<'_>) {
        self.process_emphasis(0);
        let mut text = 0;
        for item in self.items {
            match item {
                Item::Token {
                    kind: SyntaxKind::TEXT,
                    len,
                } => text += len,
                Item::Bracket { len, .. } => text += len,
                Item::Token { kind, len } => {
                    flush_text(p, &mut text);
                    p.push_token(kind, len);
                }
                Item::Delim(delim) => {
                    for &(kind, n) in &delim.closes {
                        flush_text(p, &mut text);
                        p.push_token(delimiter_token(kind), n);
                        p.push_event(Event::Finish);
                    }
                    text += delim.remaining;
                    for &(kind, n) in delim.opens.iter().rev() {
                        flush_text(p, &mut text);
                        p.push_event(Event::start(kind));
                        p.push_token(delimiter_token(kind), n);
                    }
                }
                Item::Events(events) => {
                    flush_text(p, &mut text);
                    p.push_events(events);
                }
            }
        }
        flush_text(p, &mut text);
    }
}

fn delimiter_token(kind: SyntaxKind) -> SyntaxKind {
    if kind == SyntaxKind::STRONG {
        SyntaxKind::STRONG_DELIM
    } else {
        SyntaxKind::EMPH_DELIM
    }
}

fn flush_text(p: &mut Parser<'_>, pending: &mut usize) {
    if *pending > 0 {
        p.push_token(SyntaxKind::TEXT, *pending);
        *pending = 0;
    }
}

/// Derive an attribute list at `at`, returning its events and end offset
/// if it matches and ends before `limit`.
fn attributes(p: &mut Parser<'_>, at: usize, limit: usize) -> Option<(Vec<Event>, usize)> {
    let resume = p.pos();
    p.set_pos(at);
    let mark = p.event_count();
    let matched = p.derive_named(RuleName::AttrList);
    let end = p.pos();
    let events = p.split_events(mark);
    p.set_pos(resume);
    (matched && end <= limit).then_some((events, end))
}

/// Offset of the `)` closing the destination that starts at `open`.
fn link_destination(bytes: &[u8], open: usize, limit: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open + 1;
    while i < limit {
        match bytes[i] {
            b'\\' => i += 2,
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' if depth == 0 => return Some(i),
            b')' => {
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// A shortcode argument: a quoted string or a run of non-blank bytes.
fn argument_len(bytes: &[u8]) -> usize {
    if let Some(&quote @ (b'"' | b'\'')) = bytes.first()
        && let Some(end) = bytes[1..].iter().position(|&b| b == quote)
    {
        return end + 2;
    }
    bytes
        .iter()
        .take_while(|&&b| b != b' ' && b != b'\t')
        .count()
}

/// Length of a citation key: starts with a letter, digit or `_`; internal
/// punctuation is allowed when followed by another key character.
fn citation_key_len(text: &str) -> usize {
    let is_key = |c: char| c.is_alphanumeric() || c == '_';
    let mut chars = text.char_indices().peekable();
    let mut end = 0;
    while let Some((i, c)) = chars.next() {
        let internal = ":.#$%&-+?<>~/".contains(c)
            && end > 0
            && chars.peek().is_some_and(|&(_, next)| is_key(next));
        if is_key(c) || internal {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn citation_keys() {
        assert_eq!(citation_key_len("doe99 says"), 5);
        assert_eq!(citation_key_len("fig-plot."), 8);
        assert_eq!(citation_key_len("sec:intro]"), 9);
        assert_eq!(citation_key_len(" no"), 0);
        assert_eq!(citation_key_len("-x"), 0);
    }

    #[test]
    fn link_destinations_balance_parens() {
        let bytes = b"(a(b)c) tail";
        assert_eq!(link_destination(bytes, 0, bytes.len()), Some(6));
        assert_eq!(link_destination(b"(open", 0, 5), None);
    }

    #[test]
    fn shortcode_arguments() {
        assert_eq!(argument_len(b"\"a b\" c"), 5);
        assert_eq!(argument_len(b"name rest"), 4);
    }
}
