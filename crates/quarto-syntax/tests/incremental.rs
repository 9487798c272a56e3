mod common;

use common::{assert_tiled, block_kinds, count};
use pretty_assertions::assert_eq;
use quarto_syntax::{
    Edit, LineIndex, ParseError, ParseOptions, SyntaxKind, SyntaxTree, parse, reparse,
    reparse_with,
};
use std::ops::{ControlFlow, Range};

/// Splice, reparse, and check the result against a parse from scratch.
fn apply(tree: &SyntaxTree, range: Range<usize>, insert: &str) -> (String, SyntaxTree) {
    let text = tree.text();
    let (new_text, edit) = Edit::splice(&text, range, insert);
    let new_tree = reparse(tree, &[edit], &new_text).unwrap();
    assert_eq!(new_tree.dump(), parse(&new_text).unwrap().dump());
    assert_tiled(&new_tree, &new_text);
    (new_text, new_tree)
}

#[test]
fn typing_a_sentence() {
    let mut tree = parse("# Title\n\nBody\n").unwrap();
    let mut at = 13;
    for c in " with *emphasis*".chars() {
        let previous = tree.clone();
        let insert = c.to_string();
        (_, tree) = apply(&previous, at..at, &insert);
        at += insert.len();

        assert_eq!(tree.block_count(), 3);
        assert!(tree.shares_block(&previous, 0));
        assert!(tree.shares_block(&previous, 1));
    }
    assert_eq!(tree.text(), "# Title\n\nBody with *emphasis*\n");
    assert_eq!(count(&tree, SyntaxKind::EMPHASIS), 1);
}

#[test]
fn opening_a_fence_swallows_the_rest() {
    let tree = parse("# A\n\nText\n").unwrap();
    let (text, tree) = apply(&tree, 0..0, "```\n");

    assert_eq!(block_kinds(&text), vec!["code_block"]);
    assert_eq!(count(&tree, SyntaxKind::MISSING), 1);
}

#[test]
fn closing_a_fence_restores_the_blocks_after_it() {
    let tree = parse("```\ncode\n\n# Heading\n").unwrap();
    assert_eq!(tree.block_count(), 1);

    let (text, tree) = apply(&tree, 9..9, "```\n");

    assert_eq!(
        block_kinds(&text),
        vec!["code_block", "blank_line", "heading"]
    );
    assert_eq!(count(&tree, SyntaxKind::MISSING), 0);
}

#[test]
fn front_matter_comes_and_goes() {
    let tree = parse("title: x\n---\n\nBody\n").unwrap();
    assert_eq!(
        block_kinds(&tree.text()),
        vec!["paragraph", "thematic_break", "blank_line", "paragraph"]
    );

    let (text, tree) = apply(&tree, 0..0, "---\n");
    assert_eq!(
        block_kinds(&text),
        vec!["frontmatter", "blank_line", "paragraph"]
    );

    let (text, _) = apply(&tree, 0..4, "");
    assert_eq!(
        block_kinds(&text),
        vec!["paragraph", "thematic_break", "blank_line", "paragraph"]
    );
}

#[test]
fn deleting_a_blank_line_merges_paragraphs() {
    let tree = parse("First para.\n\nSecond para.\n\nThird para.\n").unwrap();
    let (text, new_tree) = apply(&tree, 12..13, "");

    assert_eq!(
        block_kinds(&text),
        vec!["paragraph", "blank_line", "paragraph"]
    );
    // The last paragraph moved but was not rebuilt.
    let old_last = tree.root().last_child().unwrap();
    let new_last = new_tree.root().last_child().unwrap();
    assert!(std::ptr::eq(&*old_last.green(), &*new_last.green()));
}

#[test]
fn editing_inside_a_list_item() {
    let tree = parse("- one\n- two\n\nAfter.\n").unwrap();
    let (_, tree) = apply(&tree, 11..11, "o");
    let (text, tree) = apply(&tree, 12..12, "\n  - nested");

    assert_eq!(text, "- one\n- twoo\n  - nested\n\nAfter.\n");

    assert_eq!(count(&tree, SyntaxKind::LIST), 2);
    assert_eq!(count(&tree, SyntaxKind::LIST_ITEM), 3);
}

#[test]
fn unclosing_a_div_from_the_middle() {
    let tree = parse("::: note\nText\n:::\n\nAfter\n").unwrap();
    let (text, tree) = apply(&tree, 14..18, "");

    assert_eq!(block_kinds(&text), vec!["div"]);
    assert_eq!(count(&tree, SyntaxKind::MISSING), 1);
}

#[test]
fn edits_built_from_points() {
    let text = "# A\n\nalpha\nbeta\n";
    let tree = parse(text).unwrap();
    let lines = LineIndex::new(text);
    let start = lines.offset(quarto_syntax::Point::new(3, 0)).unwrap();
    let new_text = format!("{}BETA{}", &text[..start], &text[start + 4..]);
    let edit = Edit::new(
        start,
        start + 4,
        start + 4,
        lines.point(start),
        lines.point(start + 4),
        lines.point(start + 4),
    );

    let new_tree = reparse(&tree, &[edit], &new_text).unwrap();

    assert_eq!(new_tree.text(), "# A\n\nalpha\nBETA\n");
    assert!(new_tree.shares_block(&tree, 0));
    assert_eq!(new_tree.dump(), parse(&new_text).unwrap().dump());
}

#[test]
fn abort_stops_before_the_first_derived_block() {
    let tree = parse("a\n\nb\n").unwrap();
    let (new_text, edit) = Edit::splice("a\n\nb\n", 3..3, "x");

    let result = reparse_with(
        &tree,
        &[edit],
        &new_text,
        &ParseOptions::default(),
        &mut |_| ControlFlow::Break(()),
    );

    assert_eq!(result.unwrap_err(), ParseError::Aborted { offset: 3 });
}

#[test]
fn invalid_utf8_is_rejected() {
    let tree = parse("ab\n").unwrap();
    let edit = Edit::new(
        1,
        2,
        2,
        quarto_syntax::Point::new(0, 1),
        quarto_syntax::Point::new(0, 2),
        quarto_syntax::Point::new(0, 2),
    );

    let result = reparse(&tree, &[edit], b"a\xff\n");

    assert_eq!(
        result.unwrap_err(),
        ParseError::InvalidEncoding { offset: 1 }
    );
}
