//! PHP `serialize()` decoder error type.

use thiserror::Error;

/// Error raised while decoding a PHP-serialized value.
///
/// Every variant carries the byte offset at which decoding stopped. Decoding
/// never returns a partially built tree alongside an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhpError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),
    #[error("unknown type discriminator {found:?} at offset {offset}")]
    UnknownType { offset: usize, found: char },
    #[error("expected {expected:?} at offset {offset}, found {found:?}")]
    Expected {
        offset: usize,
        expected: char,
        found: char,
    },
    #[error("invalid integer literal at offset {0}")]
    InvalidInt(usize),
    #[error("invalid float literal at offset {0}")]
    InvalidFloat(usize),
    #[error("invalid boolean literal at offset {0}")]
    InvalidBool(usize),
    #[error("invalid length or count at offset {0}")]
    InvalidLength(usize),
    #[error("invalid UTF-8 in string at offset {0}")]
    InvalidUtf8(usize),
    #[error("array key must be an integer or string at offset {0}")]
    InvalidKey(usize),
    #[error("declared {declared} entries but found {found} at offset {offset}")]
    CountMismatch {
        offset: usize,
        declared: usize,
        found: usize,
    },
    #[error("nesting deeper than {max_depth} levels at offset {offset}")]
    DepthExceeded { offset: usize, max_depth: usize },
}

impl PhpError {
    /// Byte offset in the input where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            PhpError::UnexpectedEof(offset)
            | PhpError::InvalidInt(offset)
            | PhpError::InvalidFloat(offset)
            | PhpError::InvalidBool(offset)
            | PhpError::InvalidLength(offset)
            | PhpError::InvalidUtf8(offset)
            | PhpError::InvalidKey(offset) => *offset,
            PhpError::UnknownType { offset, .. }
            | PhpError::Expected { offset, .. }
            | PhpError::CountMismatch { offset, .. }
            | PhpError::DepthExceeded { offset, .. } => *offset,
        }
    }
}
