//! A compact set of token kinds, used to tell the scanner which tokens the
//! rule engine is prepared to accept at the current position.

use crate::syntax_kind::SyntaxKind;

/// Bitset over token kinds.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub const fn new(kinds: &[SyntaxKind]) -> TokenSet {
        let mut bits = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            bits |= mask(kinds[i]);
            i += 1;
        }
        TokenSet(bits)
    }

    pub const fn single(kind: SyntaxKind) -> TokenSet {
        TokenSet(mask(kind))
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        self.0 & mask(kind) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Kinds in the set, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = SyntaxKind> {
        TOKEN_KINDS.iter().copied().filter(move |kind| self.contains(*kind))
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

const fn mask(kind: SyntaxKind) -> u128 {
    assert!((kind as u16) < 128, "only token kinds fit in a TokenSet");
    1u128 << (kind as u16)
}

/// Every token kind the scanner can produce, in declaration order.
const TOKEN_KINDS: &[SyntaxKind] = &[
    SyntaxKind::WHITESPACE,
    SyntaxKind::NEWLINE,
    SyntaxKind::TEXT,
    SyntaxKind::ESCAPE,
    SyntaxKind::HARD_BREAK,
    SyntaxKind::COMMENT,
    SyntaxKind::FRONTMATTER_DELIM,
    SyntaxKind::YAML_TEXT,
    SyntaxKind::FENCE_OPEN,
    SyntaxKind::FENCE_CLOSE,
    SyntaxKind::INFO_STRING,
    SyntaxKind::CODE_TEXT,
    SyntaxKind::MATH_BLOCK_DELIM,
    SyntaxKind::DIV_OPEN,
    SyntaxKind::DIV_CLOSE,
    SyntaxKind::HEADING_MARKER,
    SyntaxKind::BREAK_MARKER,
    SyntaxKind::QUOTE_MARKER,
    SyntaxKind::LIST_MARKER,
    SyntaxKind::LBRACE,
    SyntaxKind::RBRACE,
    SyntaxKind::ATTR_ID,
    SyntaxKind::ATTR_CLASS,
    SyntaxKind::ATTR_KEY,
    SyntaxKind::EQ,
    SyntaxKind::ATTR_VALUE,
    SyntaxKind::ATTR_WORD,
    SyntaxKind::RAW_FORMAT,
    SyntaxKind::COMMA,
    SyntaxKind::EMPH_DELIM,
    SyntaxKind::STRONG_DELIM,
    SyntaxKind::CODE_DELIM,
    SyntaxKind::MATH_DELIM,
    SyntaxKind::LBRACKET,
    SyntaxKind::RBRACKET,
    SyntaxKind::IMAGE_OPEN,
    SyntaxKind::LPAREN,
    SyntaxKind::RPAREN,
    SyntaxKind::LINK_DEST,
    SyntaxKind::CITE_KEY,
    SyntaxKind::SHORTCODE_OPEN,
    SyntaxKind::SHORTCODE_CLOSE,
    SyntaxKind::SHORTCODE_NAME,
    SyntaxKind::EOF,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership() {
        let set = TokenSet::new(&[SyntaxKind::FENCE_OPEN, SyntaxKind::HEADING_MARKER]);
        assert!(set.contains(SyntaxKind::FENCE_OPEN));
        assert!(set.contains(SyntaxKind::HEADING_MARKER));
        assert!(!set.contains(SyntaxKind::FENCE_CLOSE));
    }

    #[test]
    fn iteration_follows_declaration_order() {
        let set = TokenSet::single(SyntaxKind::LIST_MARKER)
            .union(TokenSet::single(SyntaxKind::WHITESPACE));
        let kinds: Vec<_> = set.iter().collect();
        assert_eq!(kinds, vec![SyntaxKind::WHITESPACE, SyntaxKind::LIST_MARKER]);
    }

    #[test]
    fn token_table_covers_every_token_kind() {
        assert_eq!(TOKEN_KINDS.len(), SyntaxKind::EOF as usize + 1);
        assert!(TOKEN_KINDS.iter().all(|k| k.is_token()));
    }
}
