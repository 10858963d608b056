use std::{
    collections::{HashMap, HashSet},
    ops::RangeInclusive,
    path::Path,
};

use chain_codec::{
    block::{raw_receipt, raw_transaction_gas, receipt_fields, JsonBlock},
    decoder::{decode_h256, decode_u64},
    hex::decode_hex,
    types::{LightTransactionReceipt, ReceiptFields, TransactionGas},
    HexPolicy,
};
use ethers_core::types::{H256, U256};
use itertools::Itertools;
use log::{debug, info, trace};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde_json::Value;

use crate::{
    error::StoreError,
    sql::{
        BLOCK_DATA_LOOKUP, CREATE_BLOCKS_TABLE, INSERT_BLOCK, RECEIPTS_BY_HASH, RECEIPTS_BY_NUMBER,
        TOTAL_BLOCK_COUNT, TRANSACTIONS_IN_RANGE,
    },
};

pub type BlockNumber = u64;

/// Block documents keyed by hash, queryable by number, backed by SQLite.
#[derive(Clone, Debug)]
pub struct BlockStore {
    pool: Pool<SqliteConnectionManager>,
}

impl BlockStore {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!("Opening block store at {}", path.display());
        let manager = SqliteConnectionManager::file(path);
        Self::with_pool(Pool::new(manager)?)
    }

    /// Every connection to `:memory:` is its own database, so the pool holds exactly one.
    pub fn in_memory() -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::memory();
        Self::with_pool(Pool::builder().max_size(1).build(manager)?)
    }

    fn with_pool(pool: Pool<SqliteConnectionManager>) -> Result<Self, StoreError> {
        pool.get()?.execute_batch(CREATE_BLOCKS_TABLE)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }

    pub fn insert_block(
        &self,
        hash: &H256,
        number: BlockNumber,
        parent_hash: Option<&H256>,
        data: &Value,
    ) -> Result<(), StoreError> {
        let data = serde_json::to_string(data)?;
        self.conn()?.execute(
            INSERT_BLOCK,
            params![
                hash.as_bytes(),
                to_sql_number(number)?,
                parent_hash.map(|h| h.as_bytes()),
                data
            ],
        )?;
        debug!("Stored block {hash:?} at number {number}");
        Ok(())
    }

    /// Stores a block document, taking its hash, number and parent hash from the document itself.
    pub fn import_json_block(&self, data: &Value, policy: HexPolicy) -> Result<H256, StoreError> {
        let block = JsonBlock::new(data.clone());
        let hash = decode_hash(block.hash().ok_or_else(|| invalid("missing block hash"))?, policy)?;
        let number = block.number().ok_or_else(|| invalid("missing block number"))?;
        let number = decode_u64("number", &decode_hex(number, policy)?)?.as_u64();
        let parent_hash = block.parent_hash().map(|parent| decode_hash(parent, policy)).transpose()?;
        self.insert_block(&hash, number, parent_hash.as_ref(), data)?;
        Ok(hash)
    }

    pub fn get_block(&self, hash: &H256) -> Result<Option<JsonBlock>, StoreError> {
        let conn = self.conn()?;
        let mut query = conn.prepare(BLOCK_DATA_LOOKUP)?;
        let mut rows = query.query_map([hash.as_bytes()], |row| row.get::<_, String>(0))?;
        let data = rows.next().transpose()?;
        Ok(match data {
            Some(data) => Some(JsonBlock::new(serde_json::from_str(&data)?)),
            None => None,
        })
    }

    pub fn block_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self.conn()?.query_row(TOTAL_BLOCK_COUNT, [], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| StoreError::InvalidCount(count))
    }

    /// Returns the decoded `gasUsed` and `status` of every receipt stored for `number`.
    ///
    /// Each element of the receipts array gives one row, with `None` for a field it does not
    /// carry. A block number that is not stored, or whose documents carry no receipts, yields an
    /// empty result. Any receipt with malformed hex fails the whole query.
    pub fn find_receipt_fields_for_block(
        &self,
        number: BlockNumber,
        policy: HexPolicy,
    ) -> Result<Vec<ReceiptFields>, StoreError> {
        let receipts = self.json_rows(RECEIPTS_BY_NUMBER, params![to_sql_number(number)?])?;
        debug!("Found {} receipts for block number {number}", receipts.len());
        receipts
            .iter()
            .map(|receipt| receipt_fields(receipt, policy).map_err(StoreError::from))
            .collect()
    }

    pub fn find_transaction_receipts_for_block(
        &self,
        block_hash: &H256,
        policy: HexPolicy,
    ) -> Result<Vec<LightTransactionReceipt>, StoreError> {
        self.json_rows(RECEIPTS_BY_HASH, params![block_hash.as_bytes()])?
            .iter()
            .map(|receipt| -> Result<_, StoreError> {
                let raw = raw_receipt(receipt, policy)?;
                Ok(LightTransactionReceipt::try_from(raw)?)
            })
            .collect()
    }

    /// Queries for the gas the given transactions were issued with, looking only at blocks in
    /// `block_range`, both ends included. Transactions not found in the range are absent from
    /// the result; a listed transaction without a `gas` field is an error.
    pub fn find_transaction_gas_in_block_range(
        &self,
        transaction_hashes: &[H256],
        block_range: &RangeInclusive<BlockNumber>,
        policy: HexPolicy,
    ) -> Result<HashMap<H256, U256>, StoreError> {
        if transaction_hashes.is_empty() {
            return Ok(HashMap::new());
        }
        let wanted: HashSet<&[u8]> = transaction_hashes.iter().map(H256::as_bytes).collect();
        let transactions = self.json_rows(
            TRANSACTIONS_IN_RANGE,
            params![to_sql_number(*block_range.start())?, to_sql_number(*block_range.end())?],
        )?;

        let mut gas = HashMap::new();
        for transaction in &transactions {
            let raw = raw_transaction_gas(transaction, policy)?;
            match &raw.transaction_hash {
                Some(hash) if wanted.contains(hash.as_slice()) => {}
                _ => {
                    trace!("Skipping unlisted transaction {transaction}");
                    continue;
                }
            }
            let txn = TransactionGas::try_from(raw)?;
            gas.insert(txn.transaction_hash, txn.gas);
        }
        Ok(gas)
    }

    /// JSON documents of the first column, with SQL NULL read as `null`.
    fn json_rows(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Value>, StoreError> {
        let conn = self.conn()?;
        let mut query = conn.prepare(sql)?;
        let rows = query.query_map(params, |row| row.get::<_, Option<String>>(0))?.collect_vec();
        rows.into_iter()
            .map(|row| -> Result<Value, StoreError> {
                match row? {
                    Some(json) => Ok(serde_json::from_str(&json)?),
                    None => Ok(Value::Null),
                }
            })
            .collect()
    }
}

fn to_sql_number(number: BlockNumber) -> Result<i64, StoreError> {
    i64::try_from(number).map_err(|_| StoreError::BlockNumberOverflow(number))
}

fn decode_hash(hash: &str, policy: HexPolicy) -> Result<H256, StoreError> {
    Ok(decode_h256("hash", &decode_hex(hash, policy)?)?)
}

fn invalid(message: &str) -> StoreError {
    StoreError::InvalidBlock { message: message.to_owned() }
}
