//! Multi-chain address-watch pipeline.
//!
//! The explorer follows the tip of each configured blockchain, matches every
//! mined transaction against a per-chain set of watched addresses and
//! publishes an event for each hit. Watch/unwatch commands arrive over the
//! message bus and are applied to the live watch set while scanning runs.

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;

pub use models::{Block, ServiceConfig, Transaction, WatchRequest};
pub use services::blockchain::{ChainClient, EvmClient};
pub use services::broker::{MemoryBroker, MessageBroker};
pub use services::explorer::{ExplorerService, WatchSet};
pub use services::store::{FileStore, Store};
