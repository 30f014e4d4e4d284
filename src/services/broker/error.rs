//! Message broker error types and handling.

use log::error;
use std::{error::Error, fmt};

/// Represents possible errors that can occur during broker operations
#[derive(Debug)]
pub enum BrokerError {
	/// Errors related to exchange or queue declaration
	SetupError(String),

	/// Errors related to publishing messages
	PublishError(String),

	/// Errors related to consuming messages
	ConsumeError(String),

	/// A message body could not be decoded
	DecodeError(String),
}

impl BrokerError {
	fn format_message(&self) -> String {
		match self {
			Self::SetupError(msg) => format!("Setup error: {}", msg),
			Self::PublishError(msg) => format!("Publish error: {}", msg),
			Self::ConsumeError(msg) => format!("Consume error: {}", msg),
			Self::DecodeError(msg) => format!("Decode error: {}", msg),
		}
	}

	/// Creates a new setup error with logging
	pub fn setup_error(msg: impl Into<String>) -> Self {
		let error = Self::SetupError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new publish error with logging
	pub fn publish_error(msg: impl Into<String>) -> Self {
		let error = Self::PublishError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new consume error with logging
	pub fn consume_error(msg: impl Into<String>) -> Self {
		let error = Self::ConsumeError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new decode error with logging
	pub fn decode_error(msg: impl Into<String>) -> Self {
		let error = Self::DecodeError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for BrokerError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for BrokerError {}
