// SQLite statements for the blocks table

pub const CREATE_BLOCKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS blocks (
    hash blob PRIMARY KEY,
    number INTEGER NOT NULL,
    parent_hash blob,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS blocks_number_idx ON blocks(number);
";

pub const INSERT_BLOCK: &str = "INSERT OR REPLACE INTO blocks (hash, number, parent_hash, data)
                                VALUES (?1, ?2, ?3, ?4)";

pub const BLOCK_DATA_LOOKUP: &str = "SELECT data FROM blocks WHERE hash = (?1) LIMIT 1";

/// One row per element of `transaction_receipts` of every block stored at the given number.
/// Elements that are not objects come back as NULL.
pub const RECEIPTS_BY_NUMBER: &str = "SELECT CASE WHEN receipt.type = 'object' THEN receipt.value END
    FROM blocks, json_each(blocks.data, '$.transaction_receipts') AS receipt
    WHERE blocks.number = (?1)
        AND json_type(blocks.data, '$.transaction_receipts') = 'array'
    ORDER BY blocks.hash, receipt.key";

pub const RECEIPTS_BY_HASH: &str = "SELECT CASE WHEN receipt.type = 'object' THEN receipt.value END
    FROM blocks, json_each(blocks.data, '$.transaction_receipts') AS receipt
    WHERE blocks.hash = (?1)
        AND json_type(blocks.data, '$.transaction_receipts') = 'array'
    ORDER BY receipt.key";

/// Full transaction objects of blocks with `?1 <= number <= ?2`.
pub const TRANSACTIONS_IN_RANGE: &str = "SELECT txn.value
    FROM blocks, json_each(blocks.data, '$.block.transactions') AS txn
    WHERE blocks.number BETWEEN (?1) AND (?2)
        AND json_type(blocks.data, '$.block.transactions') = 'array'
        AND txn.type = 'object'
    ORDER BY blocks.number, blocks.hash, txn.key";

pub const TOTAL_BLOCK_COUNT: &str = "SELECT COUNT(*) FROM blocks";
