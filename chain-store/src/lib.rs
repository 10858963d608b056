pub use chain_codec;

pub mod error;
/// SQLite statements
pub mod sql;
/// Block documents and the receipt / transaction gas queries over them
pub mod store;

pub use error::StoreError;
pub use store::{BlockNumber, BlockStore};
