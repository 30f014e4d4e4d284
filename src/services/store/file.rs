//! File-backed store.
//!
//! Keeps one JSON document per chain for the watched-address list and one
//! for the explorer checkpoint, under a single data directory. An internal
//! async mutex serializes read-modify-write cycles, so concurrent callers
//! keyed by chain are safe.

use glob::glob;
use std::path::PathBuf;
use tokio::sync::Mutex;

use async_trait::async_trait;

use crate::services::store::{ChainAddresses, ExplorerState, Store, StoreError, WatchedAddress};

/// File-backed store keeping one JSON document per chain for addresses and
/// one for the explorer checkpoint.
pub struct FileStore {
	data_dir: PathBuf,
	// serializes read-modify-write cycles across concurrent callers
	write_lock: Mutex<()>,
}

impl FileStore {
	pub fn new(data_dir: PathBuf) -> Self {
		FileStore {
			data_dir,
			write_lock: Mutex::new(()),
		}
	}

	fn addresses_path(&self, chain: &str) -> PathBuf {
		self.data_dir.join(format!("{}_addresses.json", chain))
	}

	fn explorer_path(&self, chain: &str) -> PathBuf {
		self.data_dir.join(format!("{}_explorer.json", chain))
	}

	async fn read_addresses(&self, chain: &str) -> Result<Vec<WatchedAddress>, StoreError> {
		let path = self.addresses_path(chain);
		if !path.exists() {
			return Ok(Vec::new());
		}
		let contents = tokio::fs::read_to_string(path)
			.await
			.map_err(|e| StoreError::persistence_error(e.to_string()))?;
		serde_json::from_str(&contents)
			.map_err(|e| StoreError::serialization_error(e.to_string()))
	}

	async fn write_addresses(
		&self,
		chain: &str,
		addresses: &[WatchedAddress],
	) -> Result<(), StoreError> {
		tokio::fs::create_dir_all(&self.data_dir)
			.await
			.map_err(|e| StoreError::persistence_error(e.to_string()))?;
		let json = serde_json::to_string(addresses)
			.map_err(|e| StoreError::serialization_error(e.to_string()))?;
		tokio::fs::write(self.addresses_path(chain), json)
			.await
			.map_err(|e| StoreError::persistence_error(e.to_string()))
	}

	/// Chains that have an address document in the data directory.
	fn known_chains(&self) -> Result<Vec<String>, StoreError> {
		let pattern = self
			.data_dir
			.join("*_addresses.json")
			.to_string_lossy()
			.to_string();
		let mut chains = Vec::new();
		for entry in
			glob(&pattern).map_err(|e| StoreError::persistence_error(e.to_string()))?
		{
			let path = entry.map_err(|e| StoreError::persistence_error(e.to_string()))?;
			if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
				if let Some(chain) = name.strip_suffix("_addresses.json") {
					chains.push(chain.to_string());
				}
			}
		}
		chains.sort();
		Ok(chains)
	}
}

#[async_trait]
impl Store for FileStore {
	async fn get_addresses(&self, chains: &[String]) -> Result<Vec<ChainAddresses>, StoreError> {
		let chains = if chains.is_empty() {
			self.known_chains()?
		} else {
			chains.to_vec()
		};

		let mut result = Vec::with_capacity(chains.len());
		for chain in chains {
			let addresses = self.read_addresses(&chain).await?;
			result.push(ChainAddresses { chain, addresses });
		}
		Ok(result)
	}

	async fn add_address(
		&self,
		address: &WatchedAddress,
		chain: &str,
	) -> Result<String, StoreError> {
		let _guard = self.write_lock.lock().await;

		let mut addresses = self.read_addresses(chain).await?;
		let addr = address.addr.to_lowercase();
		if let Some(existing) = addresses.iter().find(|a| a.addr == addr) {
			return Ok(existing.id.clone());
		}

		let id = format!("{}:{}", chain, addr);
		addresses.push(WatchedAddress {
			id: id.clone(),
			name: address.name.clone(),
			addr,
		});
		self.write_addresses(chain, &addresses).await?;
		Ok(id)
	}

	async fn remove_address(
		&self,
		address: &WatchedAddress,
		chain: &str,
	) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock().await;

		let mut addresses = self.read_addresses(chain).await?;
		let addr = address.addr.to_lowercase();
		let before = addresses.len();
		addresses.retain(|a| a.addr != addr);
		if addresses.len() == before {
			return Err(StoreError::NotFound);
		}
		self.write_addresses(chain, &addresses).await
	}

	async fn load_explorer(&self, chain: &str) -> Result<ExplorerState, StoreError> {
		let path = self.explorer_path(chain);
		if !path.exists() {
			return Err(StoreError::NotFound);
		}
		let contents = tokio::fs::read_to_string(path)
			.await
			.map_err(|e| StoreError::persistence_error(e.to_string()))?;
		serde_json::from_str(&contents)
			.map_err(|e| StoreError::serialization_error(e.to_string()))
	}

	async fn save_explorer(&self, chain: &str, state: &ExplorerState) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock().await;

		tokio::fs::create_dir_all(&self.data_dir)
			.await
			.map_err(|e| StoreError::persistence_error(e.to_string()))?;
		let json = serde_json::to_string(state)
			.map_err(|e| StoreError::serialization_error(e.to_string()))?;
		tokio::fs::write(self.explorer_path(chain), json)
			.await
			.map_err(|e| StoreError::persistence_error(e.to_string()))
	}

	async fn delete_explorer(&self, chain: &str) -> Result<(), StoreError> {
		let path = self.explorer_path(chain);
		if !path.exists() {
			return Err(StoreError::NotFound);
		}
		tokio::fs::remove_file(path)
			.await
			.map_err(|e| StoreError::persistence_error(e.to_string()))
	}
}
