//! Attribute lists: `{#id .class key="value"}`, `{r label, echo=FALSE}`,
//! `{=html}`.

use super::*;

pub(super) fn attr_list() -> Rule {
    node(
        SyntaxKind::ATTR_LIST,
        scope(
            ScopeKind::Attributes,
            seq(vec![
                token(SyntaxKind::LBRACE),
                many(r(RuleName::AttrItem)),
                token(SyntaxKind::RBRACE),
            ]),
        ),
    )
}

pub(super) fn attr_item() -> Rule {
    choice(vec![
        ws(),
        token(SyntaxKind::COMMA),
        token(SyntaxKind::ATTR_ID),
        token(SyntaxKind::ATTR_CLASS),
        token(SyntaxKind::RAW_FORMAT),
        r(RuleName::Attribute),
        token(SyntaxKind::ATTR_WORD),
    ])
}

pub(super) fn attribute() -> Rule {
    node(
        SyntaxKind::ATTRIBUTE,
        seq(vec![
            token(SyntaxKind::ATTR_KEY),
            token(SyntaxKind::EQ),
            token(SyntaxKind::ATTR_VALUE),
        ]),
    )
}

/// `{` followed by something only an attribute list starts with. Used to
/// tell a standalone attribute line from a paragraph starting with a brace.
pub(super) fn attr_line_start() -> Rule {
    scope(
        ScopeKind::Attributes,
        seq(vec![
            token(SyntaxKind::LBRACE),
            opt(ws()),
            choice(vec![
                token(SyntaxKind::ATTR_ID),
                token(SyntaxKind::ATTR_CLASS),
                token(SyntaxKind::ATTR_KEY),
            ]),
        ]),
    )
}

pub(super) fn attr_list_start() -> Rule {
    scope(ScopeKind::Attributes, token(SyntaxKind::LBRACE))
}

/// `{r ...}` on a fence: an executable cell.
pub(super) fn cell_attributes_start() -> Rule {
    scope(
        ScopeKind::Attributes,
        seq(vec![
            token(SyntaxKind::LBRACE),
            opt(ws()),
            token(SyntaxKind::ATTR_WORD),
        ]),
    )
}

/// `{=format}` on a fence: a raw block.
pub(super) fn raw_attributes_start() -> Rule {
    scope(
        ScopeKind::Attributes,
        seq(vec![
            token(SyntaxKind::LBRACE),
            opt(ws()),
            token(SyntaxKind::RAW_FORMAT),
        ]),
    )
}

pub(super) fn attr_block() -> Rule {
    node(
        SyntaxKind::ATTR_BLOCK,
        seq(vec![
            lookahead(r(RuleName::AttrLineStart)),
            r(RuleName::AttrList),
            opt(ws()),
            r(RuleName::LineEnd),
        ]),
    )
}

/// A line that starts like an attribute list but never becomes one. The
/// error runs to the next unescaped `}` or the end of the line, and any
/// rest of the line is folded in.
pub(super) fn attr_block_recovery() -> Rule {
    node(
        SyntaxKind::ERROR,
        seq(vec![
            lookahead(r(RuleName::AttrLineStart)),
            not(r(RuleName::AttrList)),
            Rule::Skip(Boundary::AttributeClose),
            Rule::Skip(Boundary::EndOfLine),
            opt(token(SyntaxKind::NEWLINE)),
        ]),
    )
}

pub(super) fn div_attributes() -> Rule {
    choice(vec![
        seq(vec![
            lookahead(r(RuleName::AttrListStart)),
            require(
                r(RuleName::AttrList),
                Recovery::Skip(Boundary::AttributeClose),
            ),
        ]),
        token(SyntaxKind::ATTR_WORD),
    ])
}

pub(super) fn heading_attributes() -> Rule {
    seq(vec![opt(ws()), r(RuleName::AttrList)])
}

/// A trailing attribute list that ends its line.
pub(super) fn heading_attributes_tail() -> Rule {
    seq(vec![
        opt(ws()),
        r(RuleName::AttrList),
        opt(ws()),
        r(RuleName::LineEnd),
    ])
}
