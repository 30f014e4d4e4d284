//! Watch/unwatch request types carried on the bus.
//!
//! Requests are published by the wallet service and consumed by the explorer.
//! Kind and action are integers on the wire; unknown values fail decoding and
//! surface on the consumer's error stream.

use serde::{Deserialize, Serialize};

/// Kind of object a request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum RequestKind {
	Address,
	/// Reserved: transaction watching is accepted on the wire but not
	/// implemented.
	Tx,
}

impl From<RequestKind> for i32 {
	fn from(kind: RequestKind) -> i32 {
		match kind {
			RequestKind::Address => 0,
			RequestKind::Tx => 1,
		}
	}
}

impl TryFrom<i32> for RequestKind {
	type Error = String;

	fn try_from(value: i32) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::Address),
			1 => Ok(Self::Tx),
			other => Err(format!("unknown request kind {}", other)),
		}
	}
}

/// Action to apply to the requested object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum RequestAction {
	Listen,
	Unlisten,
}

impl From<RequestAction> for i32 {
	fn from(action: RequestAction) -> i32 {
		match action {
			RequestAction::Listen => 0,
			RequestAction::Unlisten => 1,
		}
	}
}

impl TryFrom<i32> for RequestAction {
	type Error = String;

	fn try_from(value: i32) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::Listen),
			1 => Ok(Self::Unlisten),
			other => Err(format!("unknown request action {}", other)),
		}
	}
}

/// A single watch/unwatch command for one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchRequest {
	#[serde(rename = "net")]
	pub chain: String,
	#[serde(rename = "type")]
	pub kind: RequestKind,
	pub obj: String,
	pub act: RequestAction,
}
