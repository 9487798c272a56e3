use thiserror::Error;

/// Reasons a parse or reparse returns no tree.
///
/// Grammar mismatches never show up here: they are recovered in the tree as
/// `ERROR` and `MISSING` nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input is not valid UTF-8 at byte {offset}")]
    InvalidEncoding { offset: usize },

    #[error("parse aborted before the block at byte {offset}")]
    Aborted { offset: usize },
}

impl ParseError {
    /// Byte offset the error refers to.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::InvalidEncoding { offset } | ParseError::Aborted { offset } => *offset,
        }
    }
}

/// Decode `bytes` as UTF-8, reporting the first invalid byte.
pub(crate) fn decode(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidEncoding {
        offset: e.valid_up_to(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_first_invalid_byte() {
        let err = decode(b"ok \xff\xfe").unwrap_err();
        assert_eq!(err, ParseError::InvalidEncoding { offset: 3 });
        assert_eq!(err.to_string(), "input is not valid UTF-8 at byte 3");
    }

    #[test]
    fn truncated_sequence_is_invalid() {
        // first two bytes of a three byte sequence
        let err = decode(b"ab\xe2\x82").unwrap_err();
        assert_eq!(err.offset(), 2);
    }
}
