//! Integration tests for the explorer supervisor.
//!
//! Covers multi-chain start/stop/join, the consumer-before-scanner start
//! order, per-chain initialization failures and checkpoint resumption
//! through the file store.

use std::{
	collections::HashMap,
	sync::Arc,
	time::Duration,
};

use serde_json::Value;

use chainwatch::models::{RequestAction, RequestKind, WatchRequest};
use chainwatch::services::blockchain::{ChainClient, ChainClientError, EvmClient};
use chainwatch::services::broker::{MemoryBroker, MessageBroker};
use chainwatch::services::explorer::ExplorerService;
use chainwatch::services::store::{FileStore, Store, WatchedAddress};
use chainwatch::utils::tests::block::BlockPayloadBuilder;

use crate::integration::mocks::{MockChainClient, TestStore};

const WATCHED: &str = "0x357dd3856d856197c1a000bbab4abcb97dfc92c4";

fn scripted_client<F>(window: usize, get_block: F) -> Arc<dyn ChainClient>
where
	F: Fn(u64) -> Result<Value, ChainClientError> + Send + Sync + 'static,
{
	let decoder = Arc::new(EvmClient::new("http://localhost:8545", "", window).unwrap());
	let mut client = MockChainClient::new();
	client.expect_max_blocks().return_const(window);
	client.expect_avg_block_secs().return_const(15u64);
	client
		.expect_get_block()
		.returning(move |height, _full| get_block(height));
	let block_decoder = decoder.clone();
	client
		.expect_decode_block()
		.returning(move |raw| block_decoder.decode_block(raw));
	let tx_decoder = decoder;
	client
		.expect_decode_txs()
		.returning(move |raw| tx_decoder.decode_txs(raw));
	client.expect_close().returning(|| ());
	Arc::new(client)
}

fn one_block_client(chain_tag: u64) -> Arc<dyn ChainClient> {
	let block = BlockPayloadBuilder::new()
		.number(1)
		.hash(&format!("0xb{}", chain_tag))
		.parent_hash("0x00")
		.ether_tx(
			&format!("0xfeed{}", chain_tag),
			"0x1cd434711fbae1f2d9c70001409fd82d71fdccaa",
			WATCHED,
			"0x1",
		)
		.build();
	scripted_client(4, move |height| match height {
		1 => Ok(block.clone()),
		_ => Err(ChainClientError::NoBlock),
	})
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
	tokio::time::timeout(Duration::from_secs(600), async {
		while !condition() {
			tokio::time::sleep(Duration::from_millis(50)).await;
		}
	})
	.await
	.expect("condition not reached in time");
}

#[tokio::test(start_paused = true)]
async fn test_two_chains_scan_independently() {
	let store = Arc::new(TestStore::new());
	for chain in ["chain-a", "chain-b"] {
		store
			.add_address(
				&WatchedAddress {
					addr: WATCHED.to_string(),
					..Default::default()
				},
				chain,
			)
			.await
			.unwrap();
	}

	let broker = Arc::new(MemoryBroker::new());
	broker.setup().await.unwrap();

	let mut clients: HashMap<String, Arc<dyn ChainClient>> = HashMap::new();
	clients.insert("chain-a".to_string(), one_block_client(1));
	clients.insert("chain-b".to_string(), one_block_client(2));

	let mut service = ExplorerService::new(store.clone(), broker.clone(), clients);
	service.start().await;

	let ws_a = service.watch_set("chain-a").unwrap();
	let ws_b = service.watch_set("chain-b").unwrap();
	wait_until(|| ws_a.height() == 1 && ws_b.height() == 1).await;

	service.stop();
	let mut reports = service.join().await;
	reports.sort_by(|a, b| a.chain.cmp(&b.chain));
	assert_eq!(reports.len(), 2);
	assert_eq!(reports[0].chain, "chain-a");
	assert!(reports[0].error.is_none());
	assert!(reports[1].error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_pending_requests_apply_before_first_scan() {
	let store = Arc::new(TestStore::new());
	let broker = Arc::new(MemoryBroker::new());
	broker.setup().await.unwrap();

	// the watch command is already queued when the service starts
	let (mut events, _errors) = broker.get_events("chain-a").await.unwrap();

	let mut clients: HashMap<String, Arc<dyn ChainClient>> = HashMap::new();
	clients.insert("chain-a".to_string(), one_block_client(1));

	let mut service = ExplorerService::new(store.clone(), broker.clone(), clients);

	broker
		.send_request(
			"chain-a",
			&WatchRequest {
				chain: "chain-a".to_string(),
				kind: RequestKind::Address,
				obj: WATCHED.to_string(),
				act: RequestAction::Listen,
			},
		)
		.await
		.unwrap();

	service.start().await;

	let delivery = tokio::time::timeout(Duration::from_secs(600), events.recv())
		.await
		.expect("expected an event")
		.unwrap();
	assert_eq!(delivery.body.hash, "0xfeed1");
	delivery.ack();

	service.stop();
	let reports = service.join().await;
	assert!(reports[0].error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failing_chain_is_skipped_others_proceed() {
	let store = Arc::new(TestStore::new());
	*store.fail_load_chain.lock().unwrap() = Some("chain-a".to_string());
	store
		.add_address(
			&WatchedAddress {
				addr: WATCHED.to_string(),
				..Default::default()
			},
			"chain-b",
		)
		.await
		.unwrap();

	let broker = Arc::new(MemoryBroker::new());
	broker.setup().await.unwrap();

	let mut clients: HashMap<String, Arc<dyn ChainClient>> = HashMap::new();
	clients.insert("chain-a".to_string(), one_block_client(1));
	clients.insert("chain-b".to_string(), one_block_client(2));

	let mut service = ExplorerService::new(store.clone(), broker.clone(), clients);
	service.start().await;

	assert!(service.watch_set("chain-a").is_none());
	let ws_b = service.watch_set("chain-b").unwrap();
	wait_until(|| ws_b.height() == 1).await;

	service.stop();
	let reports = service.join().await;
	assert_eq!(reports.len(), 1);
	assert_eq!(reports[0].chain, "chain-b");
}

#[tokio::test(start_paused = true)]
async fn test_resume_from_file_store_checkpoint() {
	let dir = tempfile::tempdir().unwrap();
	let broker = Arc::new(MemoryBroker::new());
	broker.setup().await.unwrap();

	// first run: scan block 1 and checkpoint
	{
		let store = Arc::new(FileStore::new(dir.path().to_path_buf()));
		store
			.add_address(
				&WatchedAddress {
					addr: WATCHED.to_string(),
					..Default::default()
				},
				"chain-a",
			)
			.await
			.unwrap();

		let mut clients: HashMap<String, Arc<dyn ChainClient>> = HashMap::new();
		clients.insert("chain-a".to_string(), one_block_client(1));
		let mut service = ExplorerService::new(store, broker.clone(), clients);
		service.start().await;

		let ws = service.watch_set("chain-a").unwrap();
		wait_until(|| ws.height() == 1).await;
		service.stop();
		service.join().await;
	}

	// second run: resumes at height 1 and only accepts a block chained to
	// the persisted hash
	{
		let store = Arc::new(FileStore::new(dir.path().to_path_buf()));
		let block2 = BlockPayloadBuilder::new()
			.number(2)
			.hash("0xb2")
			.parent_hash("0xb1")
			.ether_tx(
				"0xfeed2",
				"0x1cd434711fbae1f2d9c70001409fd82d71fdccaa",
				WATCHED,
				"0x1",
			)
			.build();
		let client = scripted_client(4, move |height| match height {
			2 => Ok(block2.clone()),
			_ => Err(ChainClientError::NoBlock),
		});

		let mut clients: HashMap<String, Arc<dyn ChainClient>> = HashMap::new();
		clients.insert("chain-a".to_string(), client);
		let mut service = ExplorerService::new(store.clone(), broker.clone(), clients);
		service.start().await;

		let ws = service.watch_set("chain-a").unwrap();
		assert_eq!(ws.height(), 1);
		// the restored map still carries the watched address
		assert!(ws.contains(WATCHED));

		wait_until(|| ws.height() == 2).await;
		let snapshot = ws.snapshot();
		assert_eq!(snapshot.bh[snapshot.bhi], "0xb2");

		service.stop();
		let reports = service.join().await;
		assert!(reports[0].error.is_none());

		let persisted = store.load_explorer("chain-a").await.unwrap();
		assert_eq!(persisted.block, 2);
	}
}
