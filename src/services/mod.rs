//! Services for the address-watch pipeline.
//!
//! - `blockchain`: chain adapter port and clients
//! - `broker`: message bus port and in-process engine
//! - `explorer`: the per-chain scanning core and its supervisor
//! - `store`: persistence port and file engine

pub mod blockchain;
pub mod broker;
pub mod explorer;
pub mod store;
