//! Per-chain watch state.
//!
//! A `WatchSet` holds everything one chain's explorer mutates while running:
//! the watched-address map, the rolling window of recent block hashes used
//! for fork detection, the last scanned height and the run/stop flag. One
//! mutex serializes every reader and writer. It is never held across I/O;
//! callers take a [`snapshot`](WatchSet::snapshot) and persist that.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::Transaction;
use crate::services::store::ExplorerState;

/// Run state of a chain's explorer. `Stop` is terminal for the lifetime of
/// the watch set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
	Run,
	Stop,
}

#[derive(Debug)]
struct WatchState {
	status: WatchStatus,
	height: u64,
	ring: Vec<String>,
	head: usize,
	watched: HashMap<String, String>,
}

/// Thread-safe watch state for one chain.
#[derive(Debug)]
pub struct WatchSet {
	state: Mutex<WatchState>,
}

impl WatchSet {
	/// Creates a fresh watch set starting at height 0 with a hash window of
	/// `window` slots.
	pub fn new(window: usize) -> Self {
		WatchSet {
			state: Mutex::new(WatchState {
				status: WatchStatus::Run,
				height: 0,
				ring: vec![String::new(); window],
				head: 0,
				watched: HashMap::new(),
			}),
		}
	}

	/// Restores a watch set from a persisted checkpoint.
	pub fn from_snapshot(snapshot: ExplorerState) -> Self {
		WatchSet {
			state: Mutex::new(WatchState {
				status: WatchStatus::Run,
				height: snapshot.block,
				ring: snapshot.bh,
				head: snapshot.bhi,
				watched: snapshot.map,
			}),
		}
	}

	/// Adds seed addresses with the given tag without overwriting entries
	/// already present (a restored map wins over seeds).
	pub fn seed<I: IntoIterator<Item = String>>(&self, addresses: I, tag: &str) {
		let mut state = self.state.lock().unwrap();
		for addr in addresses {
			state
				.watched
				.entry(addr.to_lowercase())
				.or_insert_with(|| tag.to_string());
		}
	}

	/// Inserts or overwrites a watched address.
	pub fn add(&self, addr: &str, tag: &str) {
		let mut state = self.state.lock().unwrap();
		state.watched.insert(addr.to_lowercase(), tag.to_string());
	}

	/// Removes a watched address, returning its tag when present.
	pub fn remove(&self, addr: &str) -> Option<String> {
		let mut state = self.state.lock().unwrap();
		state.watched.remove(&addr.to_lowercase())
	}

	/// Returns true when the address is being watched.
	pub fn contains(&self, addr: &str) -> bool {
		let state = self.state.lock().unwrap();
		state.watched.contains_key(&addr.to_lowercase())
	}

	/// Returns true when no addresses are being watched.
	pub fn is_empty(&self) -> bool {
		self.state.lock().unwrap().watched.is_empty()
	}

	/// Number of watched addresses.
	pub fn len(&self) -> usize {
		self.state.lock().unwrap().watched.len()
	}

	/// Last scanned block height.
	pub fn height(&self) -> u64 {
		self.state.lock().unwrap().height
	}

	/// Checks that `parent_hash` links the incoming block to the last
	/// scanned one. An empty slot (cold start) accepts any parent.
	pub fn chained(&self, parent_hash: &str) -> bool {
		let state = self.state.lock().unwrap();
		let last = &state.ring[state.head];
		last == parent_hash || last.is_empty()
	}

	/// Records a scanned block: bumps the height and writes `hash` into the
	/// next ring slot.
	pub fn advance(&self, hash: &str) {
		let mut state = self.state.lock().unwrap();
		state.height += 1;
		state.head = (state.head + 1) % state.ring.len();
		let head = state.head;
		state.ring[head] = hash.to_string();
	}

	/// Returns the matching transactions: those whose sender or recipient is
	/// watched. Transactions without a recipient are skipped. The lock is
	/// held for the scan only.
	pub fn match_transactions(&self, txs: &[Transaction]) -> Vec<Transaction> {
		let state = self.state.lock().unwrap();
		let mut matched = Vec::new();
		for tx in txs {
			if tx.to.is_empty() {
				continue;
			}
			if state.watched.contains_key(&tx.from) || state.watched.contains_key(&tx.to) {
				matched.push(tx.clone());
			}
		}
		matched
	}

	/// Deep copy of the ring and its head index, for fork diagnostics.
	pub fn ring_contents(&self) -> (Vec<String>, usize) {
		let state = self.state.lock().unwrap();
		(state.ring.clone(), state.head)
	}

	/// Deep-copied persistable view of the watch set.
	pub fn snapshot(&self) -> ExplorerState {
		let state = self.state.lock().unwrap();
		ExplorerState {
			block: state.height,
			bh: state.ring.clone(),
			bhi: state.head,
			map: state.watched.clone(),
		}
	}

	/// Sets the status to `Stop`. Terminal.
	pub fn stop(&self) {
		self.state.lock().unwrap().status = WatchStatus::Stop;
	}

	/// Current run state.
	pub fn status(&self) -> WatchStatus {
		self.state.lock().unwrap().status
	}
}
