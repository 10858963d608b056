//! Rows decoded from stored block documents, raw and typed.

use ethers_core::types::{H256, U256, U64};
use serde::{Deserialize, Serialize};

/// The gas used and status of a single receipt, as raw big-endian bytes decoded from hex.
/// `None` is a field the receipt does not carry, which is distinct from an empty `"0x"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptFields {
    pub gas_used: Option<Vec<u8>>,
    pub status: Option<Vec<u8>>,
}

/// Receipt columns straight out of a query, before fixed-width conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawReceipt {
    pub transaction_hash: Option<Vec<u8>>,
    pub transaction_index: Option<Vec<u8>>,
    pub block_hash: Option<Vec<u8>>,
    pub block_number: Option<Vec<u8>>,
    pub gas_used: Option<Vec<u8>>,
    pub status: Option<Vec<u8>>,
}

/// Like `ethers_core::types::TransactionReceipt`, but with fewer fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightTransactionReceipt {
    pub transaction_hash: H256,
    pub transaction_index: U64,
    pub block_hash: Option<H256>,
    pub block_number: Option<U64>,
    pub gas_used: Option<U256>,
    pub status: Option<U64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTransactionGas {
    pub transaction_hash: Option<Vec<u8>>,
    pub gas: Option<Vec<u8>>,
}

/// Gas a transaction was issued with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionGas {
    pub transaction_hash: H256,
    pub gas: U256,
}
