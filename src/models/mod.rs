//! Domain models and data structures for the address-watch pipeline.
//!
//! This module contains the core data structures used throughout the
//! application:
//!
//! - `blockchain`: decoded block and transaction shapes shared by the chain
//!   adapters, the explorer core and the event wire format
//! - `config`: service configuration loading (JSON file + environment)
//! - `message`: watch/unwatch request types carried on the bus

mod blockchain;
mod config;
mod message;

pub use blockchain::{Block, Transaction, TransactionStatus};
pub use config::{ChainConfig, ConfigError, ServiceConfig};
pub use message::{RequestAction, RequestKind, WatchRequest};
