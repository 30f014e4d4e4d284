//! Chain client implementations.

mod evm;

pub use evm::EvmClient;
