//! Fixed-width conversion of decoded hex bytes into Ethereum types.
//!
//! Hashes must be exactly 32 bytes. Quantities are big-endian and may be shorter than their
//! target width (hex quantities drop leading zeros), in which case they are left-padded.

use ethers_core::types::{H256, U256, U64};
use thiserror::Error;

use crate::types::{LightTransactionReceipt, RawReceipt, RawTransactionGas, TransactionGas};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{field} must be exactly {expected} bytes, got {actual}")]
    WrongLength { field: &'static str, expected: usize, actual: usize },
    #[error("{field} does not fit in {max} bytes, got {actual}")]
    Overflow { field: &'static str, max: usize, actual: usize },
    #[error("{field} is missing")]
    Missing { field: &'static str },
}

/// Converts a byte vector into `[u8; N]`, failing unless it holds exactly `N` bytes.
pub fn exact_bytes<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N], DecodeError> {
    bytes.try_into().map_err(|_| DecodeError::WrongLength { field, expected: N, actual: bytes.len() })
}

/// Left-pads big-endian bytes to `N` bytes, failing if they do not fit.
pub fn padded_bytes<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N], DecodeError> {
    if bytes.len() > N {
        return Err(DecodeError::Overflow { field, max: N, actual: bytes.len() });
    }
    let mut output = [0u8; N];
    output[N - bytes.len()..].copy_from_slice(bytes);
    Ok(output)
}

pub fn decode_h256(field: &'static str, bytes: &[u8]) -> Result<H256, DecodeError> {
    exact_bytes::<32>(field, bytes).map(H256)
}

pub fn decode_u64(field: &'static str, bytes: &[u8]) -> Result<U64, DecodeError> {
    padded_bytes::<8>(field, bytes).map(|word| U64::from_big_endian(&word))
}

pub fn decode_u256(field: &'static str, bytes: &[u8]) -> Result<U256, DecodeError> {
    padded_bytes::<32>(field, bytes).map(|word| U256::from_big_endian(&word))
}

impl TryFrom<RawReceipt> for LightTransactionReceipt {
    type Error = DecodeError;

    fn try_from(value: RawReceipt) -> Result<Self, Self::Error> {
        let RawReceipt {
            transaction_hash,
            transaction_index,
            block_hash,
            block_number,
            gas_used,
            status,
        } = value;

        let transaction_hash =
            transaction_hash.ok_or(DecodeError::Missing { field: "transaction_hash" })?;
        let transaction_index =
            transaction_index.ok_or(DecodeError::Missing { field: "transaction_index" })?;
        Ok(LightTransactionReceipt {
            transaction_hash: decode_h256("transaction_hash", &transaction_hash)?,
            transaction_index: decode_u64("transaction_index", &transaction_index)?,
            block_hash: block_hash.map(|x| decode_h256("block_hash", &x)).transpose()?,
            block_number: block_number.map(|x| decode_u64("block_number", &x)).transpose()?,
            gas_used: gas_used.map(|x| decode_u256("gas_used", &x)).transpose()?,
            status: status.map(|x| decode_u64("status", &x)).transpose()?,
        })
    }
}

impl TryFrom<RawTransactionGas> for TransactionGas {
    type Error = DecodeError;

    fn try_from(value: RawTransactionGas) -> Result<Self, Self::Error> {
        let RawTransactionGas { transaction_hash, gas } = value;
        let transaction_hash =
            transaction_hash.ok_or(DecodeError::Missing { field: "transaction_hash" })?;
        let gas = gas.ok_or(DecodeError::Missing { field: "gas" })?;
        Ok(TransactionGas {
            transaction_hash: decode_h256("transaction_hash", &transaction_hash)?,
            gas: decode_u256("gas", &gas)?,
        })
    }
}
