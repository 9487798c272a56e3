//! # Inline Lexer
//!
//! Paragraph and heading text is classified by a [Logos] lexer before
//! inline resolution pairs delimiters and brackets. The lexer runs over one
//! line at a time (never past the line terminator), one token per call, so
//! inline resolution can jump over a matched code span or shortcode and
//! resume lexing after it.
//!
//! Every byte lands in some token. Bytes no rule matches (a lone `!`, `{`
//! or `<`) come back as lexer errors, which the caller treats as text.
//!
//! [Logos]: https://docs.rs/logos

use logos::Logos;

/// Token kinds for inline text.
///
/// The `#[logos(skip r"")]` attribute means "skip nothing" - every byte is
/// classified.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
pub enum InlineToken {
    /// Spaces and tabs
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Backslash followed by ASCII punctuation
    #[regex(r"\\[!-/:-@\[-`{-~]")]
    Escape,

    /// A backslash that escapes nothing (a hard break at the end of a line)
    #[token("\\")]
    Backslash,

    #[regex(r"\*+")]
    StarRun,

    #[regex(r"_+")]
    UnderscoreRun,

    #[regex(r"`+")]
    BacktickRun,

    #[token("$$")]
    DoubleDollar,

    #[token("$")]
    Dollar,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("![")]
    ImageOpen,

    /// `{{<` opening a shortcode
    #[token("{{<")]
    ShortcodeOpen,

    #[token("<!--")]
    CommentOpen,

    #[token("@")]
    At,

    /// Runs of bytes with no inline meaning
    #[regex(r"[^ \t\r\n\\*_`$\[\]!{<@]+")]
    Text,
}

/// Lex the first token of `text`, returning its kind (`None` for an
/// unclassified byte) and length. Returns `None` on empty input.
pub fn next(text: &str) -> Option<(Option<InlineToken>, usize)> {
    let mut lexer = InlineToken::lexer(text);
    let token = lexer.next()?;
    Some((token.ok(), lexer.span().end))
}

/// Left/right flanking classification of a delimiter run, from the
/// characters immediately around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flanking {
    pub left: bool,
    pub right: bool,
}

impl Flanking {
    pub fn new(prev: Option<char>, next: Option<char>) -> Self {
        let prev_ws = prev.is_none_or(char::is_whitespace);
        let next_ws = next.is_none_or(char::is_whitespace);
        let prev_punct = prev.is_some_and(is_punctuation);
        let next_punct = next.is_some_and(is_punctuation);
        Self {
            left: !next_ws && (!next_punct || prev_ws || prev_punct),
            right: !prev_ws && (!prev_punct || next_ws || next_punct),
        }
    }
}

/// Whether a run of `fill` with the given neighbours may open and close
/// emphasis. Underscores are stricter inside words.
pub fn delimiter_roles(fill: u8, prev: Option<char>, next: Option<char>) -> (bool, bool) {
    let flanking = Flanking::new(prev, next);
    if fill == b'_' {
        let can_open = flanking.left && (!flanking.right || prev.is_some_and(is_punctuation));
        let can_close = flanking.right && (!flanking.left || next.is_some_and(is_punctuation));
        (can_open, can_close)
    } else {
        (flanking.left, flanking.right)
    }
}

pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace() && !c.is_control())
}
