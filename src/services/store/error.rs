//! Store error types and handling.

use log::error;
use std::{error::Error, fmt};

/// Represents possible errors that can occur during store operations
#[derive(Debug)]
pub enum StoreError {
	/// The requested record does not exist
	///
	/// This is an expected outcome on cold starts and idempotent deletes,
	/// so constructing it does not log.
	NotFound,

	/// Errors related to reading or writing the backing storage
	PersistenceError(String),

	/// Errors related to encoding or decoding stored documents
	SerializationError(String),
}

impl StoreError {
	fn format_message(&self) -> String {
		match self {
			Self::NotFound => "Data was not found in store".to_string(),
			Self::PersistenceError(msg) => format!("Persistence error: {}", msg),
			Self::SerializationError(msg) => format!("Serialization error: {}", msg),
		}
	}

	/// Creates a new persistence error with logging
	pub fn persistence_error(msg: impl Into<String>) -> Self {
		let error = Self::PersistenceError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new serialization error with logging
	pub fn serialization_error(msg: impl Into<String>) -> Self {
		let error = Self::SerializationError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Returns true when the error is the not-found sentinel
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound)
	}
}

impl fmt::Display for StoreError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for StoreError {}
