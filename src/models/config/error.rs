//! Configuration error types.

use log::error;
use std::{error::Error, fmt};

/// Represents possible errors raised while loading the service configuration
#[derive(Debug)]
pub enum ConfigError {
	/// The configuration file could not be opened or read
	ReadError(String),

	/// The configuration file or an environment override is not valid JSON
	ParseError(String),
}

impl ConfigError {
	fn format_message(&self) -> String {
		match self {
			Self::ReadError(msg) => format!("Config read error: {}", msg),
			Self::ParseError(msg) => format!("Config parse error: {}", msg),
		}
	}

	/// Creates a new read error with logging
	pub fn read_error(msg: impl Into<String>) -> Self {
		let error = Self::ReadError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new parse error with logging
	pub fn parse_error(msg: impl Into<String>) -> Self {
		let error = Self::ParseError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for ConfigError {}
