//! Service configuration loading.
//!
//! Defaults are overridden first by an optional JSON config file and then by
//! `CHAINWATCH_*` environment variables. `CHAINWATCH_CHAINS` holds a JSON
//! array of chain configurations, for example:
//!
//! ```text
//! CHAINWATCH_CHAINS='[{"name":"ropsten","node":"http://localhost:8545","maxBlocks":8}]'
//! ```

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

mod error;

pub use error::ConfigError;

fn default_chain_kind() -> String {
	"evm".to_string()
}

/// Connection configuration for one chain.
///
/// `node` is the adapter endpoint URL; `secret` is an optional basic-auth
/// credential; `max_blocks` is the reorg window depth kept in the hash ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
	pub name: String,
	#[serde(default = "default_chain_kind")]
	pub kind: String,
	pub node: String,
	#[serde(default)]
	pub secret: String,
	#[serde(rename = "maxBlocks")]
	pub max_blocks: usize,
}

/// Top-level configuration for the explorer service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
	#[serde(default = "ServiceConfig::default_data_dir", rename = "datadir")]
	pub data_dir: String,
	#[serde(default, rename = "blockchains")]
	pub chains: Vec<ChainConfig>,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		ServiceConfig {
			data_dir: Self::default_data_dir(),
			chains: vec![ChainConfig {
				name: "ropsten".to_string(),
				kind: default_chain_kind(),
				node: "http://localhost:8545".to_string(),
				secret: String::new(),
				max_blocks: 8,
			}],
		}
	}
}

impl ServiceConfig {
	fn default_data_dir() -> String {
		"data".to_string()
	}

	/// Loads the configuration: defaults, then the JSON file at `path` if
	/// given, then `CHAINWATCH_DATA_DIR` / `CHAINWATCH_CHAINS` overrides.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let mut config = match path {
			Some(path) => {
				let contents = fs::read_to_string(path).map_err(|e| {
					ConfigError::read_error(format!(
						"failed to read {}: {}",
						path.display(),
						e
					))
				})?;
				serde_json::from_str(&contents).map_err(|e| {
					ConfigError::parse_error(format!(
						"failed to parse {}: {}",
						path.display(),
						e
					))
				})?
			}
			None => ServiceConfig::default(),
		};

		if let Ok(data_dir) = std::env::var("CHAINWATCH_DATA_DIR") {
			if !data_dir.is_empty() {
				config.data_dir = data_dir;
			}
		}
		if let Ok(chains) = std::env::var("CHAINWATCH_CHAINS") {
			if !chains.is_empty() {
				config.chains = serde_json::from_str(&chains).map_err(|e| {
					ConfigError::parse_error(format!(
						"failed to parse CHAINWATCH_CHAINS: {}",
						e
					))
				})?;
			}
		}

		Ok(config)
	}
}
