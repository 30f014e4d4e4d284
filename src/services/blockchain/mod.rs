//! Chain adapter port and its implementations.
//!
//! The port (`ChainClient`) is what the explorer core consumes; `clients`
//! holds the per-family implementations. `create_chain_clients` turns the
//! configuration into the map of live connections, skipping chains it cannot
//! build.

use log::{error, warn};
use std::{collections::HashMap, sync::Arc};

mod client;
mod clients;
mod error;

pub use client::ChainClient;
pub use clients::EvmClient;
pub use error::ChainClientError;

use crate::models::ChainConfig;

/// Builds a chain client per configuration entry. Entries with an unknown
/// kind or a failing connection are logged and skipped; the remaining chains
/// proceed.
pub fn create_chain_clients(configs: &[ChainConfig]) -> HashMap<String, Arc<dyn ChainClient>> {
	let mut clients: HashMap<String, Arc<dyn ChainClient>> = HashMap::new();
	for config in configs {
		match config.kind.as_str() {
			"evm" => match EvmClient::new(&config.node, &config.secret, config.max_blocks) {
				Ok(client) => {
					clients.insert(config.name.clone(), Arc::new(client));
				}
				Err(e) => {
					error!("[{}] cannot create chain client: {}", config.name, e);
				}
			},
			other => {
				warn!(
					"[{}] no chain client for kind {}, ignoring",
					config.name, other
				);
			}
		}
	}
	clients
}
