//! Persistent storage port for watched addresses and explorer checkpoints.
//!
//! The explorer and the wallet service share one store. The explorer reads
//! the watched-address seed list at start, mirrors watch/unwatch commands,
//! and checkpoints its scan progress after every block.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

mod error;
mod file;

pub use error::StoreError;
pub use file::FileStore;

/// A single stored address under observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchedAddress {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub name: String,
	pub addr: String,
}

/// The watched addresses of one chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainAddresses {
	#[serde(rename = "net")]
	pub chain: String,
	pub addresses: Vec<WatchedAddress>,
}

/// Persisted explorer checkpoint for one chain.
///
/// `block` is the last scanned height, `bh` the rolling window of block
/// hashes, `bhi` the index of the most recent hash, and `map` the watched
/// addresses with their tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorerState {
	pub block: u64,
	pub bh: Vec<String>,
	pub bhi: usize,
	pub map: HashMap<String, String>,
}

/// Storage interface required by the explorer and wallet services.
#[async_trait]
pub trait Store: Send + Sync {
	/// Returns the watched addresses for the given chains. An empty slice
	/// selects every chain known to the store.
	async fn get_addresses(&self, chains: &[String]) -> Result<Vec<ChainAddresses>, StoreError>;

	/// Inserts an address for a chain and returns its id. Adding an address
	/// that already exists returns the existing id.
	async fn add_address(
		&self,
		address: &WatchedAddress,
		chain: &str,
	) -> Result<String, StoreError>;

	/// Removes an address from a chain. Returns `NotFound` when absent.
	async fn remove_address(
		&self,
		address: &WatchedAddress,
		chain: &str,
	) -> Result<(), StoreError>;

	/// Loads the explorer checkpoint for a chain. Returns `NotFound` when
	/// the chain has never been scanned.
	async fn load_explorer(&self, chain: &str) -> Result<ExplorerState, StoreError>;

	/// Saves (upserts) the explorer checkpoint for a chain.
	async fn save_explorer(&self, chain: &str, state: &ExplorerState) -> Result<(), StoreError>;

	/// Deletes the explorer checkpoint for a chain.
	async fn delete_explorer(&self, chain: &str) -> Result<(), StoreError>;
}
