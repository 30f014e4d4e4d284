//! Chain adapter port.
//!
//! One implementation per chain family. The scanner drives the port with
//! untyped block payloads: `get_block` fetches the raw document, and the
//! `decode_*` methods lift it into the typed model. The core never inspects
//! the raw payload itself.

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Block, Transaction};
use crate::services::blockchain::ChainClientError;

/// Interface required from every chain connection.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Reorg window: how many recent block hashes are kept to verify parent
	/// linkage.
	fn max_blocks(&self) -> usize;

	/// Average seconds between mined blocks; used to pace idle waits.
	fn avg_block_secs(&self) -> u64;

	/// Fetches the block at `height`. With `full`, transaction objects are
	/// included; otherwise only their hashes. Returns the `NoBlock`
	/// sentinel when the block is not mined yet.
	async fn get_block(&self, height: u64, full: bool) -> Result<Value, ChainClientError>;

	/// Decodes the envelope (hash, parent hash, number, timestamp) of a
	/// fetched block.
	fn decode_block(&self, raw: &Value) -> Result<Block, ChainClientError>;

	/// Decodes the transaction list of a fetched block.
	fn decode_txs(&self, raw: &Value) -> Result<Vec<Transaction>, ChainClientError>;

	/// Ends the connection.
	async fn close(&self);
}
