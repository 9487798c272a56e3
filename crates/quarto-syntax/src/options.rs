//! Knobs that change how ambiguous input is resolved.

/// How a delimiter run that can close both strong and emphasis at once
/// (`***a***`) is split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TripleDelimiter {
    /// `***a***` is emphasis wrapping strong.
    #[default]
    StrongInside,
    /// `***a***` is strong wrapping emphasis.
    EmphasisInside,
}

/// Options for a parse. Trees remember the options they were built with and
/// a reparse with different options falls back to a full parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    pub triple_delimiter: TripleDelimiter,
    /// When false, [`reparse`](crate::reparse) always derives the whole
    /// document again.
    pub incremental: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self {
            triple_delimiter: TripleDelimiter::default(),
            incremental: true,
        }
    }

    pub fn with_triple_delimiter(mut self, triple_delimiter: TripleDelimiter) -> Self {
        self.triple_delimiter = triple_delimiter;
        self
    }

    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
