//! Per-chain block-advance loop.
//!
//! The scanner follows one chain's tip a block at a time: fetch the next
//! block, verify it links to the last scanned hash, decode its transactions,
//! match them against the watch set, publish the hits and checkpoint. Any
//! divergence inside the hash window, and any decode or checkpoint failure,
//! fail-stops this chain; other chains are unaffected.

use log::{debug, error, info, warn};
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;

use crate::services::blockchain::ChainClient;
use crate::services::broker::MessageBroker;
use crate::services::explorer::watch_set::{WatchSet, WatchStatus};
use crate::services::store::Store;

/// Terminal report of one chain's scanner.
#[derive(Debug)]
pub struct ChainReport {
	pub chain: String,
	pub error: Option<String>,
}

/// Runs the block-advance loop for `chain` until its watch set is stopped.
///
/// The loop idles while the watch set is empty or the tip is not mined yet,
/// and fetches at most one block per second otherwise. A final checkpoint is
/// attempted on the way out regardless of how the loop ended.
pub async fn scan_chain<S, B>(
	chain: String,
	client: Arc<dyn ChainClient>,
	watch_set: Arc<WatchSet>,
	store: Arc<S>,
	broker: Arc<B>,
) -> ChainReport
where
	S: Store + ?Sized,
	B: MessageBroker + ?Sized,
{
	let mut last_error: Option<String> = None;
	let avg_block = Duration::from_secs(client.avg_block_secs());

	info!("[{}] exploring at block {}", chain, watch_set.height());

	while watch_set.status() == WatchStatus::Run {
		if watch_set.is_empty() {
			debug!("[{}] waiting for something to explore", chain);
			sleep(avg_block).await;
			continue;
		}

		// hard cap: at most one block fetch per second
		sleep(Duration::from_secs(1)).await;

		let height = watch_set.height() + 1;
		let raw = match client.get_block(height, true).await {
			Ok(raw) => raw,
			Err(e) if e.is_no_block() => {
				// wait for the next block to be mined
				sleep(avg_block).await;
				continue;
			}
			Err(e) => {
				error!("[{}] fetching block {} failed: {}", chain, height, e);
				last_error = Some(e.to_string());
				watch_set.stop();
				break;
			}
		};

		let block = match client.decode_block(&raw) {
			Ok(block) => block,
			Err(e) => {
				error!("[{}] decoding block {} failed: {}", chain, height, e);
				last_error = Some(e.to_string());
				watch_set.stop();
				break;
			}
		};

		debug!(
			"[{}] parsing block {} hash:{} parent:{}",
			chain, height, block.hash, block.parent_hash
		);

		if !watch_set.chained(&block.parent_hash) {
			let (ring, head) = watch_set.ring_contents();
			error!(
				"[{}] block {} is not chained, halting; ring {:?} head {}",
				chain, height, ring, head
			);
			last_error = Some(format!("block {} is not chained", height));
			watch_set.stop();
			break;
		}

		let txs = match client.decode_txs(&raw) {
			Ok(txs) => txs,
			Err(e) => {
				error!(
					"[{}] decoding transactions of block {} failed: {}",
					chain, height, e
				);
				last_error = Some(e.to_string());
				watch_set.stop();
				break;
			}
		};

		let matched = watch_set.match_transactions(&txs);
		if !matched.is_empty() {
			// a publish failure loses this block's events but does not
			// stop the chain
			match broker.send_transactions(&chain, &matched).await {
				Ok(()) => info!("[{}] sent {} events for block {}", chain, matched.len(), height),
				Err(e) => warn!(
					"[{}] publishing {} events for block {} failed: {}",
					chain,
					matched.len(),
					height,
					e
				),
			}
		}

		watch_set.advance(&block.hash);
		if let Err(e) = store.save_explorer(&chain, &watch_set.snapshot()).await {
			error!("[{}] saving checkpoint at block {} failed: {}", chain, height, e);
			last_error = Some(e.to_string());
			watch_set.stop();
			break;
		}
	}

	// final checkpoint before reporting
	if let Err(e) = store.save_explorer(&chain, &watch_set.snapshot()).await {
		error!("[{}] final checkpoint failed: {}", chain, e);
		if last_error.is_none() {
			last_error = Some(e.to_string());
		}
	}

	info!("[{}] scanner done", chain);
	ChainReport {
		chain,
		error: last_error,
	}
}
