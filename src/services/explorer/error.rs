//! Explorer error types and handling.

use log::error;
use std::{error::Error, fmt};

use crate::services::{broker::BrokerError, store::StoreError};

/// Represents possible errors that can occur while running the explorer
#[derive(Debug)]
pub enum ExplorerError {
	/// A chain could not be initialized
	InitializationError(String),

	/// Errors surfaced by the store while loading or saving state
	StoreError(String),

	/// Errors surfaced by the message broker
	BrokerError(String),
}

impl ExplorerError {
	fn format_message(&self) -> String {
		match self {
			Self::InitializationError(msg) => format!("Initialization error: {}", msg),
			Self::StoreError(msg) => format!("Store error: {}", msg),
			Self::BrokerError(msg) => format!("Broker error: {}", msg),
		}
	}

	/// Creates a new initialization error with logging
	pub fn initialization_error(msg: impl Into<String>) -> Self {
		let error = Self::InitializationError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for ExplorerError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for ExplorerError {}

impl From<StoreError> for ExplorerError {
	fn from(err: StoreError) -> Self {
		Self::StoreError(err.to_string())
	}
}

impl From<BrokerError> for ExplorerError {
	fn from(err: BrokerError) -> Self {
		Self::BrokerError(err.to_string())
	}
}
