//! Chain adapter error types and handling.

use log::error;
use std::{error::Error, fmt};

/// Represents possible errors that can occur while talking to a chain node
#[derive(Debug)]
pub enum ChainClientError {
	/// The requested block is not mined yet
	///
	/// This is the transient tip-of-chain sentinel; constructing it does
	/// not log.
	NoBlock,

	/// Errors related to the node connection or the RPC exchange
	RequestError(String),

	/// Block or transaction data could not be decoded
	DecodeError(String),
}

impl ChainClientError {
	fn format_message(&self) -> String {
		match self {
			Self::NoBlock => "Block not available yet".to_string(),
			Self::RequestError(msg) => format!("Request error: {}", msg),
			Self::DecodeError(msg) => format!("Decode error: {}", msg),
		}
	}

	/// Creates a new request error with logging
	pub fn request_error(msg: impl Into<String>) -> Self {
		let error = Self::RequestError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new decode error with logging
	pub fn decode_error(msg: impl Into<String>) -> Self {
		let error = Self::DecodeError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Returns true when the error is the not-mined-yet sentinel
	pub fn is_no_block(&self) -> bool {
		matches!(self, Self::NoBlock)
	}
}

impl fmt::Display for ChainClientError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for ChainClientError {}

impl From<reqwest::Error> for ChainClientError {
	fn from(err: reqwest::Error) -> Self {
		Self::request_error(err.to_string())
	}
}
