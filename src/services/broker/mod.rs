//! Message broker port.
//!
//! Two durable topic exchanges connect the services: `wr` carries wallet
//! requests (watch/unwatch commands) to the explorer, `ee` carries explorer
//! events (matched transactions) back out. Transaction events are routed as
//! `<chain>.trans.<txHash>`, requests as `<chain>.<kind>.<object>`; consumers
//! bind with the pattern `<chain>.*.*`.
//!
//! Consumed messages are wrapped in a [`Delivery`]: the broker acknowledges a
//! message, and hands out the next one, only after the consumer releases the
//! attached ack token. This keeps request application strictly serial per
//! chain and guarantees the ack is posted only after the consumer's state
//! reflects the message.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::models::{Transaction, WatchRequest};

mod error;
mod memory;

pub use error::BrokerError;
pub use memory::MemoryBroker;

/// Exchange carrying wallet requests.
pub const EXCHANGE_REQUESTS: &str = "wr";
/// Exchange carrying explorer events.
pub const EXCHANGE_EVENTS: &str = "ee";

/// A consumed message plus its acknowledgement token.
#[derive(Debug)]
pub struct Delivery<T> {
	pub body: T,
	ack: Option<oneshot::Sender<()>>,
}

impl<T> Delivery<T> {
	/// Wraps a message body, returning the delivery and the channel the
	/// broker waits on before acknowledging.
	pub fn new(body: T) -> (Self, oneshot::Receiver<()>) {
		let (tx, rx) = oneshot::channel();
		(
			Delivery {
				body,
				ack: Some(tx),
			},
			rx,
		)
	}

	/// Releases the ack token. Dropping an unacked delivery also releases
	/// the queue, but is reported by the broker as an abandoned message.
	pub fn ack(mut self) {
		if let Some(tx) = self.ack.take() {
			let _ = tx.send(());
		}
	}
}

/// One consumer's streams: decoded deliveries plus broker-side errors.
pub type ConsumerStream<T> = (
	mpsc::Receiver<Delivery<T>>,
	mpsc::Receiver<BrokerError>,
);

/// Message broker interface shared by the wallet and explorer services.
#[async_trait]
pub trait MessageBroker: Send + Sync {
	/// Declares the `wr` and `ee` exchanges.
	async fn setup(&self) -> Result<(), BrokerError>;

	/// Closes the broker connection. Open consumer streams end.
	async fn close(&self) -> Result<(), BrokerError>;

	/// Publishes a wallet request to the `wr` exchange.
	async fn send_request(&self, chain: &str, request: &WatchRequest)
		-> Result<(), BrokerError>;

	/// Consumes explorer events for a chain from the `ee` exchange.
	async fn get_events(&self, chain: &str) -> Result<ConsumerStream<Transaction>, BrokerError>;

	/// Consumes wallet requests for a chain from the `wr` exchange.
	async fn get_requests(&self, chain: &str)
		-> Result<ConsumerStream<WatchRequest>, BrokerError>;

	/// Publishes one event per transaction to the `ee` exchange.
	async fn send_transactions(
		&self,
		chain: &str,
		txs: &[Transaction],
	) -> Result<(), BrokerError>;
}
