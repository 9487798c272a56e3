//! # Incremental Reparse
//!
//! A reparse re-derives only the top-level blocks an edit can affect and
//! splices the untouched green blocks of the previous tree around them.
//!
//! ```text
//! old:  [ B0 ][ B1 ][ B2 ----edit---- ][ B3 ][ B4 ]
//!                    ^ first block that examined the edit
//! new:  [ B0 ][ B1 ][ N2 ][ N3' ][ B3 ][ B4 ]
//!         reused      re-derived   reused, shifted
//! ```
//!
//! Two facts make this sound:
//!
//! - Every block remembers its **lookahead**: the end of the furthest line
//!   its derivation examined. A block whose lookahead ends before the edit
//!   start would derive identically from the new text, so it is reused.
//! - Top-level blocks are derived from an empty context. Once re-derivation
//!   reaches an offset past the edit that was also the start of an old
//!   block, every following old block would be derived identically, so
//!   they are all reused. Only their offsets change, and green nodes are
//!   positionless.
//!
//! The re-derivation root picked by [`plan`] decides how the edit is
//! reported in the logs. Headings, fences, list items and the other
//! [ambiguous boundaries](crate::SyntaxKind::is_ambiguous_boundary) always report
//! the root, because an edit in their first line can change which rule
//! matches. Lookahead bounds the re-derived range either way.

use std::ops::ControlFlow;

use crate::edit::{Change, Edit};
use crate::error::{ParseError, decode};
use crate::grammar::grammar;
use crate::options::ParseOptions;
use crate::parser::{DerivedBlock, Parser, parse_with};
use crate::tree::SyntaxTree;

/// Where re-derivation has to start for a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparseRoot {
    /// The document root: the edit crosses or touches block boundaries, or
    /// lands in a block whose kind depends on its first line.
    Root,
    /// Only top-level block `index` contains the edit.
    Block(usize),
}

/// Pick the re-derivation root for `change` against the previous tree.
///
/// A top-level block is chosen only if it strictly contains the edited
/// range (the edit neither starts at its first byte nor reaches its last)
/// and its kind is not an ambiguous boundary.
pub fn plan(tree: &SyntaxTree, change: &Change) -> ReparseRoot {
    let mut offset = 0;
    for (index, child) in tree.root().children().enumerate() {
        let start = offset;
        let end = start + usize::from(child.text_range().len());
        offset = end;
        if change.start < start || change.start >= end {
            continue;
        }
        let contained = start < change.start && change.old_end < end;
        if contained && !child.kind().is_ambiguous_boundary() {
            return ReparseRoot::Block(index);
        }
        break;
    }
    ReparseRoot::Root
}

/// Reparse `new_text` after `edits` were applied to the text of `previous`,
/// with the options `previous` was parsed with.
pub fn reparse(
    previous: &SyntaxTree,
    edits: &[Edit],
    new_text: impl AsRef<[u8]>,
) -> Result<SyntaxTree, ParseError> {
    let options = previous.options().clone();
    reparse_with(previous, edits, new_text, &options, &mut |_| {
        ControlFlow::Continue(())
    })
}

/// Reparse with explicit options and an abort check, called with the byte
/// offset of every block about to be derived.
///
/// Falls back to a full parse when the edits do not describe how the old
/// text became `new_text`, when `options` differ from the ones `previous`
/// was built with, or when `options.incremental` is off.
pub fn reparse_with(
    previous: &SyntaxTree,
    edits: &[Edit],
    new_text: impl AsRef<[u8]>,
    options: &ParseOptions,
    abort: &mut dyn FnMut(usize) -> ControlFlow<()>,
) -> Result<SyntaxTree, ParseError> {
    let text = decode(new_text.as_ref())?;

    if !options.incremental || options != previous.options() {
        log::debug!("incremental reparse disabled for these options, parsing in full");
        return parse_with(text, options, abort);
    }
    if !Change::is_consistent(edits, previous.len(), text.len()) {
        log::warn!(
            "{} edit(s) do not take a {} byte text to {} bytes, parsing in full",
            edits.len(),
            previous.len(),
            text.len()
        );
        return parse_with(text, options, abort);
    }
    let Some(change) = Change::fold(edits) else {
        if previous.text() == text {
            return Ok(previous.clone());
        }
        log::warn!("text changed without any edit, parsing in full");
        return parse_with(text, options, abort);
    };

    let root = plan(previous, &change);
    log::debug!(
        "reparse {}..{} -> {}..{} from {root:?}",
        change.start,
        change.old_end,
        change.start,
        change.new_end
    );

    let old: Vec<(usize, DerivedBlock)> = old_blocks(previous);
    let first_dirty = old
        .iter()
        .position(|(_, block)| block.lookahead > change.start)
        .unwrap_or(old.len());
    let first_dirty = match root {
        ReparseRoot::Block(index) => first_dirty.min(index),
        ReparseRoot::Root => first_dirty,
    };

    let mut blocks: Vec<DerivedBlock> = old[..first_dirty]
        .iter()
        .map(|(_, block)| block.clone())
        .collect();
    let resume = old.get(first_dirty).map_or(previous.len(), |(start, _)| *start);

    let mut parser = Parser::new(text, grammar(), options);
    parser.set_pos(resume);
    let mut derived = 0;
    let mut reused_after = 0;
    while !parser.at_end() {
        let pos = parser.pos();
        // Front matter is only tried at offset 0, so the first old block
        // cannot move.
        let old_pos = (pos + change.old_end).checked_sub(change.new_end);
        if pos >= change.new_end
            && let Some(old_pos) = old_pos.filter(|&old_pos| old_pos > 0 || pos == 0)
            && let Ok(index) = old.binary_search_by_key(&old_pos, |(start, _)| *start)
        {
            let shift = |offset: usize| offset + change.new_end - change.old_end;
            for (_, block) in &old[index..] {
                blocks.push(DerivedBlock {
                    green: block.green.clone(),
                    lookahead: shift(block.lookahead),
                });
            }
            reused_after = old.len() - index;
            break;
        }
        if abort(pos).is_break() {
            return Err(ParseError::Aborted { offset: pos });
        }
        blocks.push(parser.derive_block());
        derived += 1;
    }

    log::debug!(
        "reparse reused {first_dirty} block(s) before and {reused_after} after the edit, derived {derived}"
    );
    Ok(SyntaxTree::from_blocks(blocks, options.clone()))
}

/// Start offset and green block of every top-level block of `tree`.
fn old_blocks(tree: &SyntaxTree) -> Vec<(usize, DerivedBlock)> {
    let mut offset = 0;
    tree.green()
        .children()
        .zip(tree.lookahead())
        .filter_map(|(child, &lookahead)| {
            let node = child.into_node()?;
            let start = offset;
            offset += usize::from(node.text_len());
            Some((
                start,
                DerivedBlock {
                    green: node.to_owned(),
                    lookahead,
                },
            ))
        })
        .collect()
}
