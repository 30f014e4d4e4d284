//! Chain-agnostic block and transaction shapes.
//!
//! Addresses are opaque lowercase strings; the chain adapters normalize case
//! when decoding so that watch-set lookups are plain string equality. Numeric
//! block fields keep the hex encoding the node returned.

use serde::{Deserialize, Serialize};

/// Outcome of a transaction as reported by the chain.
///
/// Serialized as the wire integers 0 (pending), 1 (failed), 2 (success).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TransactionStatus {
	Pending,
	Failed,
	Success,
}

impl Default for TransactionStatus {
	fn default() -> Self {
		Self::Pending
	}
}

impl From<TransactionStatus> for u8 {
	fn from(status: TransactionStatus) -> u8 {
		match status {
			TransactionStatus::Pending => 0,
			TransactionStatus::Failed => 1,
			TransactionStatus::Success => 2,
		}
	}
}

impl TryFrom<u8> for TransactionStatus {
	type Error = String;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::Pending),
			1 => Ok(Self::Failed),
			2 => Ok(Self::Success),
			other => Err(format!("unknown transaction status {}", other)),
		}
	}
}

/// A decoded transfer carried through to emitted events.
///
/// One transfer per transaction; token transfers carry the contract address
/// in `token` and the decoded recipient/amount in `to`/`value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
	#[serde(default)]
	pub block: String,
	#[serde(default)]
	pub status: TransactionStatus,
	pub hash: String,
	#[serde(default)]
	pub from: String,
	#[serde(default)]
	pub to: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token: Option<String>,
	#[serde(default)]
	pub value: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
	#[serde(default)]
	pub gas: String,
	#[serde(default)]
	pub price: u64,
	#[serde(default)]
	pub fee: u64,
	#[serde(default)]
	pub ts: u32,
}

/// Envelope fields of a decoded block plus its transaction list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
	pub hash: String,
	#[serde(rename = "parentHash")]
	pub parent_hash: String,
	pub number: String,
	pub timestamp: String,
	#[serde(default)]
	pub transactions: Vec<Transaction>,
}
