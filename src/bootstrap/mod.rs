//! Bootstrap module wiring configuration into a running explorer.
//!
//! Builds the chain clients, the store and the broker from a
//! [`ServiceConfig`] and assembles the [`ExplorerService`]. The file store
//! and the in-process broker are the in-tree engines; deployments with an
//! external bus or database supply their own implementations of the same
//! ports.

use std::{error::Error, path::PathBuf, sync::Arc};

use crate::models::ServiceConfig;
use crate::services::blockchain::create_chain_clients;
use crate::services::broker::{MemoryBroker, MessageBroker};
use crate::services::explorer::ExplorerService;
use crate::services::store::FileStore;

/// Type alias for the bootstrap result
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Builds the explorer service with the in-tree store and broker engines.
///
/// Chains whose client cannot be created are already dropped here; chains
/// that fail later during `start` are skipped there.
pub async fn initialize_explorer(
	config: &ServiceConfig,
) -> Result<(ExplorerService<FileStore, MemoryBroker>, Arc<MemoryBroker>)> {
	let store = Arc::new(FileStore::new(PathBuf::from(&config.data_dir)));

	let broker = Arc::new(MemoryBroker::new());
	broker.setup().await?;

	let clients = create_chain_clients(&config.chains);

	let service = ExplorerService::new(store, broker.clone(), clients);
	Ok((service, broker))
}
