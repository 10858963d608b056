use std::borrow::Cow;

use serde_json::Value;

use crate::{
    hex::{decode_hex, HexError, HexPolicy},
    types::{RawReceipt, RawTransactionGas, ReceiptFields},
};

/// A block document as it is stored in the `data` column of the blocks table.
///
/// Current documents wrap the block in a `block` field next to `transaction_receipts`.
/// Legacy documents hold the block JSON directly.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonBlock(Value);

impl JsonBlock {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn is_legacy_format(&self) -> bool {
        self.0.get("block").is_none()
    }

    /// The block object itself, for either format.
    pub fn block(&self) -> &Value {
        self.0.get("block").unwrap_or(&self.0)
    }

    pub fn hash(&self) -> Option<&str> {
        self.block().get("hash").and_then(Value::as_str)
    }

    pub fn number(&self) -> Option<&str> {
        self.block().get("number").and_then(Value::as_str)
    }

    pub fn parent_hash(&self) -> Option<&str> {
        self.block().get("parentHash").and_then(Value::as_str)
    }

    /// Elements of `transaction_receipts`. A missing or non-array field yields nothing.
    pub fn receipts(&self) -> impl Iterator<Item = &Value> {
        array_elements(self.0.get("transaction_receipts"))
    }

    /// Elements of `block.transactions`. Hash-only transaction lists are yielded as strings.
    pub fn transactions(&self) -> impl Iterator<Item = &Value> {
        array_elements(self.block().get("transactions"))
    }
}

impl From<Value> for JsonBlock {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

fn array_elements(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value.and_then(Value::as_array).into_iter().flatten()
}

/// Text of the field at `key`: strings as they are, other values as their JSON text.
///
/// A missing or `null` field has no text, and neither does any field of a non-object value.
pub fn field_text<'a>(object: &'a Value, key: &str) -> Option<Cow<'a, str>> {
    match object.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Decodes the hex text at `key`. A field without text is `None`.
pub fn decode_field(
    object: &Value,
    key: &str,
    policy: HexPolicy,
) -> Result<Option<Vec<u8>>, HexError> {
    field_text(object, key).map(|s| decode_hex(&s, policy)).transpose()
}

/// Decodes `gasUsed` and `status` of one receipt element. Elements that are not objects carry
/// neither field.
pub fn receipt_fields(receipt: &Value, policy: HexPolicy) -> Result<ReceiptFields, HexError> {
    Ok(ReceiptFields {
        gas_used: decode_field(receipt, "gasUsed", policy)?,
        status: decode_field(receipt, "status", policy)?,
    })
}

pub fn raw_receipt(receipt: &Value, policy: HexPolicy) -> Result<RawReceipt, HexError> {
    Ok(RawReceipt {
        transaction_hash: decode_field(receipt, "transactionHash", policy)?,
        transaction_index: decode_field(receipt, "transactionIndex", policy)?,
        block_hash: decode_field(receipt, "blockHash", policy)?,
        block_number: decode_field(receipt, "blockNumber", policy)?,
        gas_used: decode_field(receipt, "gasUsed", policy)?,
        status: decode_field(receipt, "status", policy)?,
    })
}

pub fn raw_transaction_gas(
    transaction: &Value,
    policy: HexPolicy,
) -> Result<RawTransactionGas, HexError> {
    Ok(RawTransactionGas {
        transaction_hash: decode_field(transaction, "hash", policy)?,
        gas: decode_field(transaction, "gas", policy)?,
    })
}
