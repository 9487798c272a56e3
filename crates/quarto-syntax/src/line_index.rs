//! Byte offset to row/column conversion.

/// A zero-based row and byte column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Start offsets of every line in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Row and byte column of `offset`. Offsets past the end clamp to the end.
    pub fn point(&self, offset: usize) -> Point {
        let offset = offset.min(self.len);
        let row = match self.line_starts.binary_search(&offset) {
            Ok(row) => row,
            Err(next) => next - 1,
        };
        Point::new(row, offset - self.line_starts[row])
    }

    /// Byte offset of `point`, or `None` if the row does not exist.
    pub fn offset(&self, point: Point) -> Option<usize> {
        let start = *self.line_starts.get(point.row)?;
        let end = self
            .line_starts
            .get(point.row + 1)
            .copied()
            .unwrap_or(self.len);
        let offset = start + point.column;
        (offset <= end).then_some(offset)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn points_for_multiline_text() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.point(0), Point::new(0, 0));
        assert_eq!(index.point(2), Point::new(0, 2));
        assert_eq!(index.point(3), Point::new(1, 0));
        assert_eq!(index.point(6), Point::new(2, 0));
        assert_eq!(index.point(8), Point::new(3, 1));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn offsets_roundtrip() {
        let text = "# Title\n\nbody text\n";
        let index = LineIndex::new(text);
        for offset in 0..=text.len() {
            assert_eq!(index.offset(index.point(offset)), Some(offset));
        }
    }

    #[test]
    fn offset_rejects_columns_past_the_line() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset(Point::new(0, 5)), None);
        assert_eq!(index.offset(Point::new(7, 0)), None);
    }
}
