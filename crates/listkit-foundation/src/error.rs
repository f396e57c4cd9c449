//! Error types for the data manager.

use thiserror::Error;

/// A size specification that cannot be turned into pixel values.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SizeError {
    /// The string does not look like `12`, `12px`, `12.5rpx`, ...
    #[error("invalid item size `{0}`: expected a number optionally followed by `px` or `rpx`")]
    InvalidFormat(String),

    #[error("item size resolves to {0}, sizes must be non-negative")]
    Negative(f32),

    /// A per-index size list was asked for an index it does not cover.
    #[error("no item size for index {index} (sizes cover {len} items)")]
    MissingIndex { index: usize, len: usize },
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum DataManagerError {
    /// The manager behind a load-status token has been destroyed.
    #[error("data manager has already been destroyed")]
    Destroyed,

    #[error(transparent)]
    Size(#[from] SizeError),
}

pub type Result<T> = std::result::Result<T, DataManagerError>;
