//! Mock implementations for integration tests.
//!
//! - [`MockChainClient`] - mockall mock of the chain adapter port
//! - [`TestStore`] - in-memory store that records every checkpoint height,
//!   so tests can assert checkpoint ordering and inject save failures
//!
//! Scenario tests pair a mocked transport with the real EVM decoding and the
//! real in-process broker, so the full decode/match/publish path runs.

use std::{
	collections::HashMap,
	sync::atomic::{AtomicBool, Ordering},
	sync::Mutex,
};

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use chainwatch::models::{Block, Transaction};
use chainwatch::services::blockchain::{ChainClient, ChainClientError};
use chainwatch::services::store::{
	ChainAddresses, ExplorerState, Store, StoreError, WatchedAddress,
};

mock! {
	/// Mock implementation of the chain adapter port.
	///
	/// Tests typically script `get_block` per height and delegate the
	/// decode methods to a real `EvmClient`.
	pub ChainClient {}

	#[async_trait]
	impl ChainClient for ChainClient {
		fn max_blocks(&self) -> usize;
		fn avg_block_secs(&self) -> u64;
		async fn get_block(&self, height: u64, full: bool) -> Result<Value, ChainClientError>;
		fn decode_block(&self, raw: &Value) -> Result<Block, ChainClientError>;
		fn decode_txs(&self, raw: &Value) -> Result<Vec<Transaction>, ChainClientError>;
		async fn close(&self);
	}
}

/// In-memory store recording checkpoint saves.
#[derive(Default)]
pub struct TestStore {
	pub addresses: Mutex<HashMap<String, Vec<WatchedAddress>>>,
	pub explorers: Mutex<HashMap<String, ExplorerState>>,
	/// Heights passed to `save_explorer`, in call order.
	pub saved_heights: Mutex<Vec<u64>>,
	/// When set, every `save_explorer` fails.
	pub fail_saves: AtomicBool,
	/// When set, every `add_address` fails.
	pub fail_addresses: AtomicBool,
	/// Chain whose `load_explorer` fails with a persistence error.
	pub fail_load_chain: Mutex<Option<String>>,
}

impl TestStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn saved_heights(&self) -> Vec<u64> {
		self.saved_heights.lock().unwrap().clone()
	}

	pub fn stored_addresses(&self, chain: &str) -> Vec<String> {
		self.addresses
			.lock()
			.unwrap()
			.get(chain)
			.map(|list| list.iter().map(|a| a.addr.clone()).collect())
			.unwrap_or_default()
	}
}

#[async_trait]
impl Store for TestStore {
	async fn get_addresses(&self, chains: &[String]) -> Result<Vec<ChainAddresses>, StoreError> {
		let addresses = self.addresses.lock().unwrap();
		Ok(chains
			.iter()
			.map(|chain| ChainAddresses {
				chain: chain.clone(),
				addresses: addresses.get(chain).cloned().unwrap_or_default(),
			})
			.collect())
	}

	async fn add_address(
		&self,
		address: &WatchedAddress,
		chain: &str,
	) -> Result<String, StoreError> {
		if self.fail_addresses.load(Ordering::SeqCst) {
			return Err(StoreError::PersistenceError(
				"address writes disabled".to_string(),
			));
		}
		let mut addresses = self.addresses.lock().unwrap();
		let list = addresses.entry(chain.to_string()).or_default();
		let addr = address.addr.to_lowercase();
		if let Some(existing) = list.iter().find(|a| a.addr == addr) {
			return Ok(existing.id.clone());
		}
		let id = format!("{}:{}", chain, addr);
		list.push(WatchedAddress {
			id: id.clone(),
			name: address.name.clone(),
			addr,
		});
		Ok(id)
	}

	async fn remove_address(
		&self,
		address: &WatchedAddress,
		chain: &str,
	) -> Result<(), StoreError> {
		let mut addresses = self.addresses.lock().unwrap();
		let list = addresses.entry(chain.to_string()).or_default();
		let addr = address.addr.to_lowercase();
		let before = list.len();
		list.retain(|a| a.addr != addr);
		if list.len() == before {
			return Err(StoreError::NotFound);
		}
		Ok(())
	}

	async fn load_explorer(&self, chain: &str) -> Result<ExplorerState, StoreError> {
		if self.fail_load_chain.lock().unwrap().as_deref() == Some(chain) {
			return Err(StoreError::PersistenceError(format!(
				"load disabled for {}",
				chain
			)));
		}
		self.explorers
			.lock()
			.unwrap()
			.get(chain)
			.cloned()
			.ok_or(StoreError::NotFound)
	}

	async fn save_explorer(&self, chain: &str, state: &ExplorerState) -> Result<(), StoreError> {
		if self.fail_saves.load(Ordering::SeqCst) {
			return Err(StoreError::PersistenceError("save disabled".to_string()));
		}
		self.saved_heights.lock().unwrap().push(state.block);
		self.explorers
			.lock()
			.unwrap()
			.insert(chain.to_string(), state.clone());
		Ok(())
	}

	async fn delete_explorer(&self, chain: &str) -> Result<(), StoreError> {
		self.explorers
			.lock()
			.unwrap()
			.remove(chain)
			.map(|_| ())
			.ok_or(StoreError::NotFound)
	}
}
