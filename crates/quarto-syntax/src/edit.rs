//! Text edits as reported by an editing buffer.

use std::ops::Range;

use crate::line_index::{LineIndex, Point};

/// A single contiguous replacement: bytes `start_byte..old_end_byte` of the
/// text before the edit became `start_byte..new_end_byte` after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

impl Edit {
    pub fn new(
        start_byte: usize,
        old_end_byte: usize,
        new_end_byte: usize,
        start_point: Point,
        old_end_point: Point,
        new_end_point: Point,
    ) -> Self {
        Self {
            start_byte,
            old_end_byte,
            new_end_byte,
            start_point,
            old_end_point,
            new_end_point,
        }
    }

    /// Replace `range` of `text` with `replacement`, returning the new text
    /// and the edit describing the change.
    ///
    /// ```
    /// use quarto_syntax::Edit;
    ///
    /// let (text, edit) = Edit::splice("a\nbc\n", 3..4, "x\ny");
    /// assert_eq!(text, "a\nbx\ny\n");
    /// assert_eq!(edit.new_end_byte, 6);
    /// assert_eq!(edit.new_end_point.row, 2);
    /// ```
    pub fn splice(text: &str, range: Range<usize>, replacement: &str) -> (String, Edit) {
        let old = LineIndex::new(text);
        let start_point = old.point(range.start);
        let old_end_point = old.point(range.end);
        let new_end_point = match replacement.rfind('\n') {
            Some(i) => Point::new(
                start_point.row + replacement.matches('\n').count(),
                replacement.len() - i - 1,
            ),
            None => Point::new(start_point.row, start_point.column + replacement.len()),
        };

        let mut new_text = String::with_capacity(text.len() + replacement.len());
        new_text.push_str(&text[..range.start]);
        new_text.push_str(replacement);
        new_text.push_str(&text[range.end..]);

        let edit = Edit::new(
            range.start,
            range.end,
            range.start + replacement.len(),
            start_point,
            old_end_point,
            new_end_point,
        );
        (new_text, edit)
    }

    /// Change in document length.
    pub fn delta(&self) -> isize {
        self.new_end_byte as isize - self.old_end_byte as isize
    }
}

/// Several edits folded into one affected region: `start..old_end` of the
/// original text became `start..new_end` of the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub start: usize,
    pub old_end: usize,
    pub new_end: usize,
}

impl Change {
    /// Fold `edits`, each expressed against the text left by the ones
    /// before it. `None` if there are none.
    pub fn fold(edits: &[Edit]) -> Option<Change> {
        let (first, rest) = edits.split_first()?;
        let mut change = Change::from(first);
        for edit in rest {
            change = change.then(edit);
        }
        Some(change)
    }

    fn then(self, edit: &Edit) -> Change {
        // Map the edit's old end back into original coordinates.
        let old_end = if edit.old_end_byte >= self.new_end {
            edit.old_end_byte - self.new_end + self.old_end
        } else if edit.old_end_byte <= self.start {
            edit.old_end_byte
        } else {
            self.old_end
        };
        // Map our end forward through the edit.
        let new_end = if self.new_end <= edit.start_byte {
            self.new_end
        } else if self.new_end >= edit.old_end_byte {
            self.new_end + edit.new_end_byte - edit.old_end_byte
        } else {
            edit.new_end_byte
        };
        Change {
            start: self.start.min(edit.start_byte),
            old_end: self.old_end.max(old_end),
            new_end: new_end.max(edit.new_end_byte),
        }
    }

    pub fn delta(&self) -> isize {
        self.new_end as isize - self.old_end as isize
    }

    /// Whether the edits are self-consistent and take a text of `old_len`
    /// bytes to one of `new_len` bytes.
    pub fn is_consistent(edits: &[Edit], old_len: usize, new_len: usize) -> bool {
        let mut len = old_len;
        for edit in edits {
            if edit.start_byte > edit.old_end_byte
                || edit.start_byte > edit.new_end_byte
                || edit.old_end_byte > len
            {
                return false;
            }
            len = len - edit.old_end_byte + edit.new_end_byte;
        }
        len == new_len
    }
}

impl From<&Edit> for Change {
    fn from(edit: &Edit) -> Self {
        Change {
            start: edit.start_byte,
            old_end: edit.old_end_byte,
            new_end: edit.new_end_byte,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn edit(start: usize, old_end: usize, new_end: usize) -> Edit {
        Edit::new(
            start,
            old_end,
            new_end,
            Point::default(),
            Point::default(),
            Point::default(),
        )
    }

    #[test]
    fn splice_computes_points() {
        let (text, e) = Edit::splice("ab\ncd\n", 1..4, "X");
        assert_eq!(text, "aXd\n");
        assert_eq!(e.start_point, Point::new(0, 1));
        assert_eq!(e.old_end_point, Point::new(1, 1));
        assert_eq!(e.new_end_point, Point::new(0, 2));
        assert_eq!(e.delta(), -2);
    }

    #[rstest]
    #[case::single(vec![edit(3, 5, 9)], Change { start: 3, old_end: 5, new_end: 9 })]
    #[case::typing(
        vec![edit(10, 10, 11), edit(11, 11, 12), edit(12, 12, 13)],
        Change { start: 10, old_end: 10, new_end: 13 }
    )]
    #[case::backspace_then_type(
        vec![edit(9, 10, 9), edit(9, 9, 10)],
        Change { start: 9, old_end: 10, new_end: 10 }
    )]
    #[case::later_edit_after(
        vec![edit(2, 3, 2), edit(10, 12, 15)],
        Change { start: 2, old_end: 13, new_end: 15 }
    )]
    #[case::later_edit_before(
        vec![edit(10, 12, 15), edit(2, 3, 2)],
        Change { start: 2, old_end: 12, new_end: 14 }
    )]
    #[case::overlapping(
        vec![edit(5, 8, 10), edit(9, 12, 9)],
        Change { start: 5, old_end: 10, new_end: 9 }
    )]
    fn fold_edits(#[case] edits: Vec<Edit>, #[case] expected: Change) {
        assert_eq!(Change::fold(&edits), Some(expected));
    }

    #[test]
    fn fold_nothing() {
        assert_eq!(Change::fold(&[]), None);
    }

    #[test]
    fn consistency() {
        assert!(Change::is_consistent(&[edit(2, 4, 7)], 10, 13));
        assert!(!Change::is_consistent(&[edit(2, 4, 7)], 10, 12));
        assert!(!Change::is_consistent(&[edit(4, 2, 7)], 10, 15));
        assert!(!Change::is_consistent(&[edit(2, 11, 3)], 10, 2));
    }
}
