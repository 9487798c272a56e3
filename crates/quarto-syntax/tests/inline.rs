mod common;

use common::{first_block, tokens, tree};
use pretty_assertions::assert_eq;
use quarto_syntax::{ParseOptions, SyntaxKind, TripleDelimiter, parse_with};
use rstest::rstest;
use std::ops::ControlFlow;

fn paragraph_with(text: &str, options: &ParseOptions) -> String {
    let tree = parse_with(text, options, &mut |_| ControlFlow::Continue(())).unwrap();
    common::outline(&tree.root().first_child().unwrap())
}

#[rstest]
#[case::emphasis("*a*", "emphasis(*a*)")]
#[case::strong("__a__", "strong(__a__)")]
#[case::nested("**a *b* c**", "strong(**a emphasis(*b*) c**)")]
#[case::mixed_fills("*_a_*", "emphasis(*emphasis(_a_)*)")]
#[case::strong_inside_emphasis("*foo**bar**baz*", "emphasis(*foostrong(**bar**)baz*)")]
#[case::rule_of_three("*foo**bar*", "emphasis(*foo**bar*)")]
#[case::unmatched("**a", "**a")]
#[case::intraword_underscore("snake_case_name", "snake_case_name")]
#[case::intraword_star("un*frigging*believable", "unemphasis(*frigging*)believable")]
#[case::spaced_star("a * b * c", "a * b * c")]
fn emphasis(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(first_block(text), expected);
}

#[rstest]
#[case(TripleDelimiter::StrongInside, "emphasis(*strong(**a**)*)")]
#[case(TripleDelimiter::EmphasisInside, "strong(**emphasis(*a*)**)")]
fn triple_delimiters(#[case] triple: TripleDelimiter, #[case] expected: &str) {
    let options = ParseOptions::new().with_triple_delimiter(triple);
    assert_eq!(paragraph_with("***a***", &options), expected);
}

#[rstest]
#[case::code_span("`a*b*` *c*", "code_span(`a*b*`) emphasis(*c*)")]
#[case::double_backticks("``a ` b``", "code_span(``a ` b``)")]
#[case::unclosed_code("`a", "`a")]
#[case::math("$x*y*z$", "math($x*y*z$)")]
#[case::display_math_inline("$$a$$", "math($$a$$)")]
#[case::dollars("costs $5 and $6", "costs $5 and $6")]
#[case::escape("\\*not\\*", "\\*not\\*")]
fn precedence(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(first_block(text), expected);
}

#[rstest]
#[case::link("[text](https://x.org)", "link([text](https://x.org))")]
#[case::empty_destination("[a]()", "link([a]())")]
#[case::balanced_parens("[a](f(x))", "link([a](f(x)))")]
#[case::image("![alt](a.png)", "image(![alt](a.png))")]
#[case::image_attributes(
    "![alt](a.png){width=\"50%\"}",
    "image(![alt](a.png)attr_list({attribute(width=\"50%\")}))"
)]
#[case::span("[text]{.smallcaps}", "span([text]attr_list({.smallcaps}))")]
#[case::emphasis_in_link("[*a*](u)", "link([emphasis(*a*)](u))")]
#[case::brackets_bind_tighter("*[a*](b)", "*link([a*](b))")]
#[case::links_do_not_nest("[a [b](c) d](e)", "[a link([b](c)) d](e)")]
#[case::bare_brackets("[not a link]", "[not a link]")]
fn links_and_spans(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(first_block(text), expected);
}

#[test]
fn span_with_bad_attributes_keeps_the_span() {
    assert_eq!(
        first_block("[a]{.x \"oops}"),
        "span([a]error({.x \"oops}))"
    );
}

#[rstest]
#[case::inline_cite("As @knuth84 says", "As citation(@knuth84) says")]
#[case::bracketed("[@doe99; @roe]", "[citation(@doe99); citation(@roe)]")]
#[case::suppressed("[-@doe99]", "[-citation(@doe99)]")]
#[case::email("me@example.org", "me@example.org")]
#[case::trailing_punctuation("see @fig-plot.", "see citation(@fig-plot).")]
fn citations(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(first_block(text), expected);
}

#[test]
fn shortcodes() {
    let tree = tree("Title: {{< meta title >}}");
    let name = &tokens(&tree, SyntaxKind::SHORTCODE_NAME)[0];

    assert_eq!(name.text(), "meta");
    assert_eq!(
        first_block("Title: {{< meta title >}}"),
        "Title: shortcode({{< meta title >}})"
    );
    assert_eq!(
        first_block("{{< video \"a b.mp4\" >}} x"),
        "shortcode({{< video \"a b.mp4\" >}}) x"
    );
}

#[test]
fn unclosed_shortcode_is_an_error_to_end_of_line() {
    assert_eq!(
        first_block("a {{< meta title\nb"),
        "a error({{< meta title)\nb"
    );
}

#[test]
fn comments() {
    let tree = tree("a <!-- *note* --> b");
    let comment = &tokens(&tree, SyntaxKind::COMMENT)[0];

    assert_eq!(comment.text(), "<!-- *note* -->");
    assert_eq!(first_block("a <!-- open"), "a <!-- open");
}

#[rstest]
#[case::spaces("one  \ntwo", "  ")]
#[case::backslash("one\\\ntwo", "\\")]
fn hard_breaks(#[case] text: &str, #[case] expected: &str) {
    let tree = tree(text);
    let breaks = tokens(&tree, SyntaxKind::HARD_BREAK);

    assert_eq!(breaks.len(), 1);
    assert_eq!(breaks[0].text(), expected);
}

#[test]
fn no_hard_break_at_end_of_paragraph() {
    let tree = tree("one  \n\ntwo\\\n");
    assert!(tokens(&tree, SyntaxKind::HARD_BREAK).is_empty());
}

#[test]
fn emphasis_spans_lines() {
    assert_eq!(first_block("*a\nb*"), "emphasis(*a\nb*)");
}

#[test]
fn emphasis_across_quote_lines() {
    assert_eq!(
        first_block("> *a\n> b*"),
        "> paragraph(emphasis(*a\n> b*))"
    );
}
