/// Stored block documents and the receipt fields inside them
pub mod block;
/// Fixed-width conversion into Ethereum types
pub mod decoder;
/// Hex string encodings and the policy used to decode them
pub mod hex;
/// Receipt and transaction gas rows
pub mod types;

pub use crate::hex::{HexError, HexPolicy};
