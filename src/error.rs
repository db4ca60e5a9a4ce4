//! Error types for every layer of rule evaluation.
//!
//! `ReadError`, `OffsetError` and `MatchError` are local to one rule: the
//! evaluator turns most of them into "this rule did not match". Only `Error`
//! ever reaches the caller of `identify`.

use thiserror::Error;

/// Failure to decode an integer out of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("{width} bytes at {position} fall outside a buffer of {len} bytes")]
    OutOfBounds { position: i64, width: usize, len: usize },

    #[error("unsupported byte width {0}")]
    UnsupportedWidth(u8),
}

/// Failure to turn an `Offset` into a position in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OffsetError {
    #[error("{width} bytes at {position} fall outside a buffer of {len} bytes")]
    OutOfBounds { position: i64, width: usize, len: usize },

    #[error("offset adjustment divides by zero")]
    DivideByZero,

    #[error("offset arithmetic overflowed")]
    Overflow,

    #[error("unsupported indirect byte width {0}")]
    UnsupportedWidth(u8),
}

impl OffsetError {
    /// Whether this failure means the rule itself is malformed, rather than
    /// just not applicable to this buffer.
    pub fn is_structural(&self) -> bool {
        match *self {
            OffsetError::UnsupportedWidth(_) => true,
            _ => false,
        }
    }
}

impl From<ReadError> for OffsetError {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::OutOfBounds { position, width, len } => {
                OffsetError::OutOfBounds { position, width, len }
            }
            ReadError::UnsupportedWidth(w) => OffsetError::UnsupportedWidth(w),
        }
    }
}

/// Failure of a kind test that is not simply "no match".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("unsupported integer byte width {0}")]
    UnsupportedWidth(u8),
}

/// Structural errors, reported to the caller and aborting the evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no page named {0:?} in spellbook")]
    UnknownPage(String),

    #[error("rule {index}: unsupported byte width {width}")]
    UnsupportedWidth { index: usize, width: u8 },

    #[error("rule {index} on page {page:?} at level {level} has no parent rule")]
    OrphanRule { page: String, index: usize, level: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
