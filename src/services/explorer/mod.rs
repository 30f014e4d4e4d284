//! Explorer service.
//!
//! The supervisor of the per-chain machinery: for every configured chain it
//! restores or creates a [`WatchSet`], starts the request consumer and the
//! block scanner, and later coordinates the cooperative shutdown. Chains run
//! independently; one chain failing to initialize or halting on a fork never
//! affects the others.

use log::{error, info};
use std::{collections::HashMap, sync::Arc};
use tokio::task::JoinHandle;

use futures::future::join_all;

use crate::services::blockchain::ChainClient;
use crate::services::broker::MessageBroker;
use crate::services::store::{Store, StoreError};

mod consumer;
mod error;
mod scanner;
mod watch_set;

pub use consumer::consume_requests;
pub use error::ExplorerError;
pub use scanner::{scan_chain, ChainReport};
pub use watch_set::{WatchSet, WatchStatus};

/// Supervisor owning the per-chain explorers.
pub struct ExplorerService<S: ?Sized, B: ?Sized> {
	store: Arc<S>,
	broker: Arc<B>,
	clients: HashMap<String, Arc<dyn ChainClient>>,
	watch_sets: HashMap<String, Arc<WatchSet>>,
	scanners: Vec<(String, JoinHandle<ChainReport>)>,
	consumers: Vec<JoinHandle<()>>,
}

impl<S, B> ExplorerService<S, B>
where
	S: Store + ?Sized + 'static,
	B: MessageBroker + ?Sized + 'static,
{
	/// Creates the service over the shared store, broker and the map of
	/// chain clients.
	pub fn new(
		store: Arc<S>,
		broker: Arc<B>,
		clients: HashMap<String, Arc<dyn ChainClient>>,
	) -> Self {
		ExplorerService {
			store,
			broker,
			clients,
			watch_sets: HashMap::new(),
			scanners: Vec::new(),
			consumers: Vec::new(),
		}
	}

	/// Starts a consumer and a scanner for every chain. A chain that fails
	/// to initialize is logged and skipped; the others proceed.
	pub async fn start(&mut self) {
		let chains: Vec<(String, Arc<dyn ChainClient>)> = self
			.clients
			.iter()
			.map(|(name, client)| (name.clone(), client.clone()))
			.collect();
		for (chain, client) in chains {
			if let Err(e) = self.start_chain(&chain, client).await {
				error!("[{}] cannot start chain explorer, skipping: {}", chain, e);
			}
		}
	}

	async fn start_chain(
		&mut self,
		chain: &str,
		client: Arc<dyn ChainClient>,
	) -> Result<(), ExplorerError> {
		// stored addresses seed the watch set
		let listed = self.store.get_addresses(&[chain.to_string()]).await?;
		let seeds: Vec<String> = listed
			.into_iter()
			.flat_map(|entry| entry.addresses)
			.map(|address| address.addr)
			.collect();
		if seeds.is_empty() {
			info!("[{}] no stored addresses to explore", chain);
		}

		let watch_set = match self.store.load_explorer(chain).await {
			Ok(state) => WatchSet::from_snapshot(state),
			Err(StoreError::NotFound) => WatchSet::new(client.max_blocks()),
			Err(e) => return Err(e.into()),
		};
		watch_set.seed(seeds, consumer::LISTEN_TAG);
		let watch_set = Arc::new(watch_set);

		// the consumer starts first so a backlog of pending watch commands
		// is applied before the first block is scanned
		let (requests, errors) = self.broker.get_requests(chain).await?;
		self.consumers.push(tokio::spawn(consume_requests(
			chain.to_string(),
			watch_set.clone(),
			self.store.clone(),
			requests,
			errors,
		)));

		self.scanners.push((
			chain.to_string(),
			tokio::spawn(scan_chain(
				chain.to_string(),
				client,
				watch_set.clone(),
				self.store.clone(),
				self.broker.clone(),
			)),
		));

		self.watch_sets.insert(chain.to_string(), watch_set);
		Ok(())
	}

	/// The watch set for a chain, when it was started.
	pub fn watch_set(&self, chain: &str) -> Option<Arc<WatchSet>> {
		self.watch_sets.get(chain).cloned()
	}

	/// Signals every chain to stop. Does not block; scanners drain their
	/// current block and exit.
	pub fn stop(&self) {
		for (chain, watch_set) in &self.watch_sets {
			info!("[{}] stop requested", chain);
			watch_set.stop();
		}
	}

	/// Waits for every scanner to finish and returns the per-chain reports.
	/// Chain clients are closed afterwards.
	pub async fn join(&mut self) -> Vec<ChainReport> {
		let (chains, handles): (Vec<_>, Vec<_>) =
			std::mem::take(&mut self.scanners).into_iter().unzip();

		let mut reports = Vec::with_capacity(handles.len());
		for (chain, result) in chains.into_iter().zip(join_all(handles).await) {
			match result {
				Ok(report) => reports.push(report),
				Err(e) => reports.push(ChainReport {
					chain,
					error: Some(format!("scanner task failed: {}", e)),
				}),
			}
		}

		// request consumers serve no purpose once scanning has ended
		for handle in std::mem::take(&mut self.consumers) {
			handle.abort();
		}
		for client in self.clients.values() {
			client.close().await;
		}

		info!("explorer done, {} chains reported", reports.len());
		reports
	}
}
