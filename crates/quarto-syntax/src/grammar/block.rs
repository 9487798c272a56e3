//! Block-level productions.
//!
//! Every top-level alternative of [`block`] is wrapped in a node, so each
//! derived block is exactly one child of the document root.

use super::*;

pub(super) fn block() -> Rule {
    choice(vec![
        r(RuleName::BlankLine),
        r(RuleName::Frontmatter),
        r(RuleName::CodeCell),
        r(RuleName::RawBlock),
        r(RuleName::CodeBlock),
        r(RuleName::DisplayMath),
        r(RuleName::Div),
        r(RuleName::Heading),
        r(RuleName::ThematicBreak),
        r(RuleName::BlockQuote),
        r(RuleName::List),
        r(RuleName::AttrBlock),
        r(RuleName::AttrBlockRecovery),
        r(RuleName::Paragraph),
    ])
}

pub(super) fn blank_line() -> Rule {
    node(SyntaxKind::BLANK_LINE, seq(vec![opt(ws()), r(RuleName::LineEnd)]))
}

pub(super) fn line_end() -> Rule {
    choice(vec![token(SyntaxKind::NEWLINE), Rule::End])
}

/// Fallback when no block matches: the rest of the line becomes an error.
pub(super) fn error_line() -> Rule {
    node(
        SyntaxKind::ERROR,
        seq(vec![
            Rule::Skip(Boundary::EndOfLine),
            opt(token(SyntaxKind::NEWLINE)),
        ]),
    )
}

// === Front matter ===

pub(super) fn frontmatter() -> Rule {
    node(
        SyntaxKind::FRONTMATTER,
        scope(
            ScopeKind::Frontmatter,
            seq(vec![
                token(SyntaxKind::FRONTMATTER_DELIM),
                opt(ws()),
                token(SyntaxKind::NEWLINE),
                many(r(RuleName::YamlLine)),
                token(SyntaxKind::FRONTMATTER_DELIM),
                opt(ws()),
                r(RuleName::LineEnd),
            ]),
        ),
    )
}

pub(super) fn yaml_line() -> Rule {
    seq(vec![
        not(token(SyntaxKind::FRONTMATTER_DELIM)),
        not(Rule::End),
        opt(token(SyntaxKind::YAML_TEXT)),
        r(RuleName::LineEnd),
    ])
}

// === Fenced blocks ===

pub(super) fn code_cell() -> Rule {
    node(
        SyntaxKind::CODE_CELL,
        scope(
            ScopeKind::Fence,
            seq(vec![
                token(SyntaxKind::FENCE_OPEN),
                opt(ws()),
                lookahead(r(RuleName::CellAttributesStart)),
                require(
                    r(RuleName::AttrList),
                    Recovery::Skip(Boundary::AttributeClose),
                ),
                r(RuleName::FenceRest),
            ]),
        ),
    )
}

pub(super) fn raw_block() -> Rule {
    node(
        SyntaxKind::RAW_BLOCK,
        scope(
            ScopeKind::Fence,
            seq(vec![
                token(SyntaxKind::FENCE_OPEN),
                opt(ws()),
                lookahead(r(RuleName::RawAttributesStart)),
                require(
                    r(RuleName::AttrList),
                    Recovery::Skip(Boundary::AttributeClose),
                ),
                r(RuleName::FenceRest),
            ]),
        ),
    )
}

pub(super) fn code_block() -> Rule {
    node(
        SyntaxKind::CODE_BLOCK,
        scope(
            ScopeKind::Fence,
            seq(vec![
                token(SyntaxKind::FENCE_OPEN),
                opt(ws()),
                opt(choice(vec![
                    r(RuleName::AttrList),
                    token(SyntaxKind::INFO_STRING),
                ])),
                r(RuleName::FenceRest),
            ]),
        ),
    )
}

/// Everything after the opening fence's info: the rest of the opening line,
/// the body, and the closing fence. A fence left open runs to the end of
/// its container and gets a missing close.
pub(super) fn fence_rest() -> Rule {
    seq(vec![
        opt(ws()),
        choice(vec![
            r(RuleName::LineEnd),
            node(
                SyntaxKind::ERROR,
                seq(vec![Rule::Skip(Boundary::EndOfLine), r(RuleName::LineEnd)]),
            ),
        ]),
        many(r(RuleName::CodeLine)),
        require(r(RuleName::FenceClose), Recovery::Missing),
    ])
}

pub(super) fn code_line() -> Rule {
    seq(vec![
        Rule::Prefix,
        not(token(SyntaxKind::FENCE_CLOSE)),
        not(Rule::End),
        opt(token(SyntaxKind::CODE_TEXT)),
        r(RuleName::LineEnd),
    ])
}

pub(super) fn fence_close() -> Rule {
    seq(vec![
        Rule::Prefix,
        token(SyntaxKind::FENCE_CLOSE),
        opt(ws()),
        r(RuleName::LineEnd),
    ])
}

// === Display math ===

pub(super) fn display_math() -> Rule {
    node(
        SyntaxKind::DISPLAY_MATH,
        scope(
            ScopeKind::MathBlock,
            seq(vec![
                token(SyntaxKind::MATH_BLOCK_DELIM),
                opt(ws()),
                token(SyntaxKind::NEWLINE),
                many(r(RuleName::MathLine)),
                Rule::Prefix,
                token(SyntaxKind::MATH_BLOCK_DELIM),
                opt(r(RuleName::HeadingAttributes)),
                opt(ws()),
                r(RuleName::LineEnd),
            ]),
        ),
    )
}

pub(super) fn math_line() -> Rule {
    seq(vec![
        Rule::Prefix,
        not(token(SyntaxKind::MATH_BLOCK_DELIM)),
        not(Rule::End),
        opt(token(SyntaxKind::CODE_TEXT)),
        r(RuleName::LineEnd),
    ])
}

// === Divs ===

pub(super) fn div() -> Rule {
    node(
        SyntaxKind::DIV,
        scope(
            ScopeKind::Div,
            seq(vec![
                token(SyntaxKind::DIV_OPEN),
                opt(ws()),
                r(RuleName::DivAttributes),
                opt(ws()),
                r(RuleName::LineEnd),
                many(r(RuleName::DivChild)),
                require(r(RuleName::DivClose), Recovery::Missing),
            ]),
        ),
    )
}

pub(super) fn div_child() -> Rule {
    seq(vec![
        Rule::Prefix,
        not(token(SyntaxKind::DIV_CLOSE)),
        not(Rule::End),
        r(RuleName::Block),
    ])
}

pub(super) fn div_close() -> Rule {
    seq(vec![
        Rule::Prefix,
        token(SyntaxKind::DIV_CLOSE),
        opt(ws()),
        r(RuleName::LineEnd),
    ])
}

// === Headings and breaks ===

pub(super) fn heading() -> Rule {
    node(
        SyntaxKind::HEADING,
        seq(vec![
            token(SyntaxKind::HEADING_MARKER),
            choice(vec![
                seq(vec![ws(), Rule::Inline(InlineMode::Heading)]),
                lookahead(r(RuleName::LineEnd)),
            ]),
            opt(r(RuleName::HeadingAttributes)),
            opt(ws()),
            r(RuleName::LineEnd),
        ]),
    )
}

pub(super) fn thematic_break() -> Rule {
    node(
        SyntaxKind::THEMATIC_BREAK,
        seq(vec![
            token(SyntaxKind::BREAK_MARKER),
            opt(ws()),
            r(RuleName::LineEnd),
        ]),
    )
}

// === Containers ===

/// The first line carries its own marker; continuation lines get theirs
/// from the quote's line prefix.
pub(super) fn block_quote() -> Rule {
    node(
        SyntaxKind::BLOCK_QUOTE,
        scope(
            ScopeKind::Quote,
            seq(vec![
                opt(ws()),
                token(SyntaxKind::QUOTE_MARKER),
                opt(ws()),
                choice(vec![r(RuleName::LineEnd), r(RuleName::Block)]),
                many(r(RuleName::QuoteLine)),
            ]),
        ),
    )
}

pub(super) fn quote_line() -> Rule {
    seq(vec![
        Rule::Prefix,
        choice(vec![r(RuleName::LineEnd), r(RuleName::Block)]),
    ])
}

pub(super) fn list() -> Rule {
    node(
        SyntaxKind::LIST,
        seq(vec![
            opt(ws()),
            scope(
                ScopeKind::List,
                seq(vec![
                    r(RuleName::ListItem),
                    many(r(RuleName::ListContinuation)),
                ]),
            ),
        ]),
    )
}

/// Blank lines followed by the next item at the list's column.
pub(super) fn list_continuation() -> Rule {
    seq(vec![
        many(r(RuleName::BlankLine)),
        Rule::Sibling,
        r(RuleName::ListItem),
    ])
}

pub(super) fn list_item() -> Rule {
    node(
        SyntaxKind::LIST_ITEM,
        scope(
            ScopeKind::Item,
            seq(vec![
                token(SyntaxKind::LIST_MARKER),
                choice(vec![
                    seq(vec![
                        ws(),
                        choice(vec![r(RuleName::LineEnd), r(RuleName::Block)]),
                    ]),
                    r(RuleName::LineEnd),
                ]),
                many(r(RuleName::ItemChild)),
            ]),
        ),
    )
}

/// An indented block inside an item, or blank lines that are followed by
/// more indented content.
pub(super) fn item_child() -> Rule {
    choice(vec![
        seq(vec![
            Rule::Prefix,
            not(r(RuleName::BlankLine)),
            r(RuleName::Block),
        ]),
        seq(vec![
            many1(r(RuleName::BlankLine)),
            lookahead(seq(vec![Rule::Prefix, not(r(RuleName::BlankLine))])),
        ]),
    ])
}

// === Paragraphs ===

pub(super) fn paragraph() -> Rule {
    node(SyntaxKind::PARAGRAPH, Rule::Inline(InlineMode::Paragraph))
}

/// Whether the line starting here continues the current paragraph.
pub(super) fn paragraph_continues() -> Rule {
    seq(vec![
        Rule::Prefix,
        not(r(RuleName::BlankLine)),
        not(r(RuleName::Interrupt)),
    ])
}

/// Block starts that end a paragraph without a blank line.
pub(super) fn interrupt() -> Rule {
    seq(vec![
        opt(ws()),
        choice(vec![
            token(SyntaxKind::HEADING_MARKER),
            token(SyntaxKind::FENCE_OPEN),
            token(SyntaxKind::DIV_OPEN),
            token(SyntaxKind::DIV_CLOSE),
            token(SyntaxKind::BREAK_MARKER),
            token(SyntaxKind::QUOTE_MARKER),
            token(SyntaxKind::LIST_MARKER),
            token(SyntaxKind::MATH_BLOCK_DELIM),
        ]),
    ])
}
