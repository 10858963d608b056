use std::{fs::File, ops::RangeInclusive, path::PathBuf};

use anyhow::Context;
use chain_store::{
    chain_codec::{
        decoder::decode_h256,
        hex::{decode_prefixed_hex, encode_prefixed_hex},
        HexPolicy,
    },
    BlockStore,
};
use clap::{Parser, Subcommand};
use ethers_core::types::H256;
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
struct Cli {
    /// SQLite database holding the blocks table
    #[arg(long = "db", default_value = "blocks.sqlite")]
    db_path: PathBuf,
    /// `legacy` accepts the bare-`x` encodings of older stored blocks
    #[arg(long = "hex-policy", default_value_t = HexPolicy::Strict)]
    hex_policy: HexPolicy,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store block documents read from JSON files
    Import { files: Vec<PathBuf> },
    /// Decoded gas used and status of every receipt stored for a block number
    Receipts { number: u64 },
    /// Receipts of the block with the given hash
    Block {
        #[arg(value_parser = parse_hash)]
        hash: H256,
    },
    /// Gas of the given transactions within blocks `from` to `to`, both included
    Gas {
        #[arg(long)]
        from: u64,
        #[arg(long)]
        to: u64,
        #[arg(value_parser = parse_hash)]
        hashes: Vec<H256>,
    },
}

fn parse_hash(s: &str) -> Result<H256, String> {
    let bytes = decode_prefixed_hex(s).map_err(|e| e.to_string())?;
    decode_h256("hash", &bytes).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::try_init()?;
    let cli = Cli::parse();
    let store = BlockStore::open(&cli.db_path)
        .with_context(|| format!("Failed to open block store {}", cli.db_path.display()))?;
    let policy = cli.hex_policy;

    let output: Value = match cli.command {
        Command::Import { files } => {
            let mut imported = vec![];
            for path in files {
                let data: Value = serde_json::from_reader(
                    File::open(&path)
                        .with_context(|| format!("Failed to open file {}", path.display()))?,
                )?;
                let hash = store
                    .import_json_block(&data, policy)
                    .with_context(|| format!("Failed to import block from {}", path.display()))?;
                log::info!("Imported block {hash:?} from {}", path.display());
                imported.push(hash);
            }
            log::debug!("Block store now holds {} blocks", store.block_count()?);
            json!(imported)
        }
        Command::Receipts { number } => {
            let rows = store.find_receipt_fields_for_block(number, policy)?;
            rows.into_iter()
                .map(|row| {
                    json!({
                        "gasUsed": row.gas_used.map(encode_prefixed_hex),
                        "status": row.status.map(encode_prefixed_hex),
                    })
                })
                .collect()
        }
        Command::Block { hash } => json!(store.find_transaction_receipts_for_block(&hash, policy)?),
        Command::Gas { from, to, hashes } => {
            let range: RangeInclusive<u64> = from..=to;
            let gas = store.find_transaction_gas_in_block_range(&hashes, &range, policy)?;
            gas.into_iter().map(|(hash, gas)| (encode_prefixed_hex(hash), json!(gas))).collect()
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
