//! SyntaxKind enum for all tokens and nodes in the Quarto CST.
//!
//! Tokens and nodes share a single enum. Every byte of the source appears in
//! exactly one token, so the tree text always round-trips.

/// All syntax kinds for the Quarto CST.
///
/// Token kinds come first and end at [`SyntaxKind::EOF`]; node kinds follow.
/// `ERROR` and `MISSING` close the enum and are the only kinds produced by
/// error recovery.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Trivia and text ===
    /// Horizontal whitespace (spaces, tabs)
    WHITESPACE,
    /// Line ending (LF or CRLF)
    NEWLINE,
    /// Literal text
    TEXT,
    /// Backslash escape such as `\*`
    ESCAPE,
    /// Backslash or trailing spaces that force a line break
    HARD_BREAK,
    /// `<!-- ... -->`
    COMMENT,

    // === Block markers ===
    /// `---` opening or closing the front matter
    FRONTMATTER_DELIM,
    /// One line of front matter content
    YAML_TEXT,
    /// Opening run of backticks or tildes
    FENCE_OPEN,
    /// Closing run matching the opening fence
    FENCE_CLOSE,
    /// Plain info string after a fence (`python`)
    INFO_STRING,
    /// One line of verbatim content inside a fence or math block
    CODE_TEXT,
    /// `$$` on its own line
    MATH_BLOCK_DELIM,
    /// `:::` opening a div
    DIV_OPEN,
    /// `:::` closing a div
    DIV_CLOSE,
    /// `#` to `######`
    HEADING_MARKER,
    /// `---`, `***` or `___` line
    BREAK_MARKER,
    /// `>`
    QUOTE_MARKER,
    /// `-`, `*`, `+`, `1.` or `1)`
    LIST_MARKER,

    // === Attribute lists ===
    /// `{`
    LBRACE,
    /// `}`
    RBRACE,
    /// `#id`
    ATTR_ID,
    /// `.class`
    ATTR_CLASS,
    /// `key` in `key=value`
    ATTR_KEY,
    /// `=`
    EQ,
    /// Quoted or bare attribute value
    ATTR_VALUE,
    /// Bare word such as a chunk language or label
    ATTR_WORD,
    /// `=html` raw output format
    RAW_FORMAT,
    /// `,`
    COMMA,

    // === Inline markers ===
    /// `*` or `_` closing or opening emphasis
    EMPH_DELIM,
    /// `**` or `__` closing or opening strong emphasis
    STRONG_DELIM,
    /// Backtick run around a code span
    CODE_DELIM,
    /// `$` or `$$` around inline math
    MATH_DELIM,
    /// `[`
    LBRACKET,
    /// `]`
    RBRACKET,
    /// `![`
    IMAGE_OPEN,
    /// `(`
    LPAREN,
    /// `)`
    RPAREN,
    /// Link destination and optional title
    LINK_DEST,
    /// `@key`
    CITE_KEY,
    /// `{{<`
    SHORTCODE_OPEN,
    /// `>}}`
    SHORTCODE_CLOSE,
    /// Directive name inside a shortcode
    SHORTCODE_NAME,
    /// End of file marker
    EOF,

    // === Composite nodes ===
    /// Root document node
    ROOT,
    /// Line holding only whitespace
    BLANK_LINE,
    /// YAML front matter block at the start of the document
    FRONTMATTER,
    /// Paragraph block
    PARAGRAPH,
    /// ATX heading
    HEADING,
    /// Thematic break
    THEMATIC_BREAK,
    /// Block quote
    BLOCK_QUOTE,
    /// Bullet or ordered list
    LIST,
    /// One list item
    LIST_ITEM,
    /// Fenced code with a plain info string
    CODE_BLOCK,
    /// Executable code cell (`{r}`, `{python}`)
    CODE_CELL,
    /// Raw passthrough block (`{=html}`)
    RAW_BLOCK,
    /// `$$` display math block
    DISPLAY_MATH,
    /// Fenced div (`:::`)
    DIV,
    /// Attribute list standing on its own line
    ATTR_BLOCK,
    /// `{...}` attribute list
    ATTR_LIST,
    /// `key=value` pair inside an attribute list
    ATTRIBUTE,
    /// `*text*`
    EMPHASIS,
    /// `**text**`
    STRONG,
    /// `` `code` ``
    CODE_SPAN,
    /// `$x$` or `$$x$$`
    MATH,
    /// `[text](dest)`
    LINK,
    /// `![alt](src)`
    IMAGE,
    /// `[text]{attrs}`
    SPAN,
    /// `@key` citation or cross reference
    CITATION,
    /// `{{< name args >}}`
    SHORTCODE,

    /// Error recovery node
    ERROR,
    /// Zero-width node standing in for a required construct that never appeared
    MISSING,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token.
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia (whitespace/newlines).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE)
    }

    /// Top-level kinds whose first line can change how the *enclosing* rule
    /// chooses between alternatives. An edit inside one of these is never
    /// re-derived in isolation.
    pub fn is_ambiguous_boundary(self) -> bool {
        matches!(
            self,
            Self::HEADING
                | Self::THEMATIC_BREAK
                | Self::FRONTMATTER
                | Self::CODE_BLOCK
                | Self::CODE_CELL
                | Self::RAW_BLOCK
                | Self::DISPLAY_MATH
                | Self::DIV
                | Self::LIST
                | Self::LIST_ITEM
                | Self::BLOCK_QUOTE
                | Self::ATTR_BLOCK
                | Self::BLANK_LINE
                | Self::ERROR
        )
    }

    /// The grammar-level name of this kind, as reported by
    /// [`NodeExt::rule_name`](crate::NodeExt::rule_name).
    pub fn rule_name(self) -> &'static str {
        match self {
            Self::WHITESPACE => "whitespace",
            Self::NEWLINE => "newline",
            Self::TEXT => "text",
            Self::ESCAPE => "escape",
            Self::HARD_BREAK => "hard_break",
            Self::COMMENT => "comment",
            Self::FRONTMATTER_DELIM => "frontmatter_delim",
            Self::YAML_TEXT => "yaml_text",
            Self::FENCE_OPEN => "fence_open",
            Self::FENCE_CLOSE => "fence_close",
            Self::INFO_STRING => "info_string",
            Self::CODE_TEXT => "code_text",
            Self::MATH_BLOCK_DELIM => "math_block_delim",
            Self::DIV_OPEN => "div_open",
            Self::DIV_CLOSE => "div_close",
            Self::HEADING_MARKER => "heading_marker",
            Self::BREAK_MARKER => "break_marker",
            Self::QUOTE_MARKER => "quote_marker",
            Self::LIST_MARKER => "list_marker",
            Self::LBRACE => "lbrace",
            Self::RBRACE => "rbrace",
            Self::ATTR_ID => "attr_id",
            Self::ATTR_CLASS => "attr_class",
            Self::ATTR_KEY => "attr_key",
            Self::EQ => "eq",
            Self::ATTR_VALUE => "attr_value",
            Self::ATTR_WORD => "attr_word",
            Self::RAW_FORMAT => "raw_format",
            Self::COMMA => "comma",
            Self::EMPH_DELIM => "emph_delim",
            Self::STRONG_DELIM => "strong_delim",
            Self::CODE_DELIM => "code_delim",
            Self::MATH_DELIM => "math_delim",
            Self::LBRACKET => "lbracket",
            Self::RBRACKET => "rbracket",
            Self::IMAGE_OPEN => "image_open",
            Self::LPAREN => "lparen",
            Self::RPAREN => "rparen",
            Self::LINK_DEST => "link_dest",
            Self::CITE_KEY => "cite_key",
            Self::SHORTCODE_OPEN => "shortcode_open",
            Self::SHORTCODE_CLOSE => "shortcode_close",
            Self::SHORTCODE_NAME => "shortcode_name",
            Self::EOF => "eof",
            Self::ROOT => "document",
            Self::BLANK_LINE => "blank_line",
            Self::FRONTMATTER => "frontmatter",
            Self::PARAGRAPH => "paragraph",
            Self::HEADING => "heading",
            Self::THEMATIC_BREAK => "thematic_break",
            Self::BLOCK_QUOTE => "block_quote",
            Self::LIST => "list",
            Self::LIST_ITEM => "list_item",
            Self::CODE_BLOCK => "code_block",
            Self::CODE_CELL => "code_cell",
            Self::RAW_BLOCK => "raw_block",
            Self::DISPLAY_MATH => "display_math",
            Self::DIV => "div",
            Self::ATTR_BLOCK => "attr_block",
            Self::ATTR_LIST => "attr_list",
            Self::ATTRIBUTE => "attribute",
            Self::EMPHASIS => "emphasis",
            Self::STRONG => "strong",
            Self::CODE_SPAN => "code_span",
            Self::MATH => "math",
            Self::LINK => "link",
            Self::IMAGE => "image",
            Self::SPAN => "span",
            Self::CITATION => "citation",
            Self::SHORTCODE => "shortcode",
            Self::ERROR => "error",
            Self::MISSING => "missing",
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuartoLang {}

impl rowan::Language for QuartoLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::MISSING as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<QuartoLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<QuartoLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<QuartoLang>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_kinds_are_tokens() {
        assert!(SyntaxKind::WHITESPACE.is_token());
        assert!(SyntaxKind::FENCE_CLOSE.is_token());
        assert!(SyntaxKind::EOF.is_token());
    }

    #[test]
    fn node_kinds_are_nodes() {
        assert!(SyntaxKind::ROOT.is_node());
        assert!(SyntaxKind::CODE_CELL.is_node());
        assert!(SyntaxKind::MISSING.is_node());
    }

    #[test]
    fn trivia_detection() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());
        assert!(SyntaxKind::NEWLINE.is_trivia());
        assert!(!SyntaxKind::TEXT.is_trivia());
    }

    #[test]
    fn paragraphs_are_not_boundaries() {
        assert!(!SyntaxKind::PARAGRAPH.is_ambiguous_boundary());
        assert!(SyntaxKind::HEADING.is_ambiguous_boundary());
        assert!(SyntaxKind::CODE_BLOCK.is_ambiguous_boundary());
    }

    #[test]
    fn rowan_conversion_roundtrip() {
        for kind in [SyntaxKind::PARAGRAPH, SyntaxKind::MISSING, SyntaxKind::WHITESPACE] {
            let raw: rowan::SyntaxKind = kind.into();
            assert_eq!(QuartoLang::kind_from_raw(raw), kind);
        }
    }
}
