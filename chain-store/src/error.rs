use chain_codec::{decoder::DecodeError, HexError};
use thiserror::Error;

/// An error from an operation on a `BlockStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rusqlite error {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("r2d2 error {0}")]
    R2D2(#[from] r2d2::Error),

    #[error("invalid block document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unable to decode hex field: {0}")]
    Hex(#[from] HexError),

    #[error("unable to decode field: {0}")]
    Decode(#[from] DecodeError),

    /// The block document is missing data required to store it.
    #[error("block invalid: {message}")]
    InvalidBlock { message: String },

    #[error("block number {0} does not fit in a SQLite integer")]
    BlockNumberOverflow(u64),

    #[error("invalid row count {0}")]
    InvalidCount(i64),
}
