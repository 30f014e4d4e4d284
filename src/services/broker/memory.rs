//! In-process message broker.
//!
//! Implements the broker port with real topic-exchange semantics (pattern
//! matching on dot-separated routing keys) over tokio channels. Deployments
//! that co-locate the wallet and explorer services in one process use it
//! directly; it is also the engine the test bench runs against.

use log::debug;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tokio::sync::{mpsc, Mutex};

use async_trait::async_trait;

use crate::models::{Transaction, WatchRequest};
use crate::services::broker::{
	BrokerError, ConsumerStream, Delivery, MessageBroker, EXCHANGE_EVENTS, EXCHANGE_REQUESTS,
};

#[derive(Debug, Clone)]
struct Message {
	routing_key: String,
	body: Vec<u8>,
}

struct Binding {
	pattern: String,
	queue: mpsc::Sender<Message>,
}

#[derive(Default)]
struct BrokerState {
	exchanges: HashMap<String, Vec<Binding>>,
	closed: bool,
}

/// In-memory topic broker.
pub struct MemoryBroker {
	state: Mutex<BrokerState>,
}

impl MemoryBroker {
	pub fn new() -> Self {
		MemoryBroker {
			state: Mutex::new(BrokerState::default()),
		}
	}

	async fn publish(
		&self,
		exchange: &str,
		routing_key: &str,
		body: Vec<u8>,
	) -> Result<(), BrokerError> {
		let queues = {
			let mut state = self.state.lock().await;
			if state.closed {
				return Err(BrokerError::publish_error("broker is closed"));
			}
			let bindings = state.exchanges.get_mut(exchange).ok_or_else(|| {
				BrokerError::publish_error(format!("exchange {} not declared", exchange))
			})?;
			bindings.retain(|b| !b.queue.is_closed());
			bindings
				.iter()
				.filter(|b| topic_matches(&b.pattern, routing_key))
				.map(|b| b.queue.clone())
				.collect::<Vec<_>>()
		};

		let message = Message {
			routing_key: routing_key.to_string(),
			body,
		};
		for queue in queues {
			// a consumer that went away mid-publish is not an error
			let _ = queue.send(message.clone()).await;
		}
		Ok(())
	}

	/// Binds a queue to `exchange` with `pattern` and starts the delivery
	/// pump: one message at a time, next only after the previous ack.
	async fn consume<T>(
		&self,
		exchange: &str,
		pattern: String,
	) -> Result<ConsumerStream<T>, BrokerError>
	where
		T: DeserializeOwned + Send + 'static,
	{
		let (queue_tx, mut queue_rx) = mpsc::channel::<Message>(64);
		{
			let mut state = self.state.lock().await;
			if state.closed {
				return Err(BrokerError::consume_error("broker is closed"));
			}
			let bindings = state.exchanges.get_mut(exchange).ok_or_else(|| {
				BrokerError::consume_error(format!("exchange {} not declared", exchange))
			})?;
			bindings.push(Binding {
				pattern,
				queue: queue_tx,
			});
		}

		let (delivery_tx, delivery_rx) = mpsc::channel::<Delivery<T>>(1);
		let (error_tx, error_rx) = mpsc::channel::<BrokerError>(16);

		tokio::spawn(async move {
			while let Some(message) = queue_rx.recv().await {
				let body = match serde_json::from_slice::<T>(&message.body) {
					Ok(body) => body,
					Err(e) => {
						// poison message: report and drop so the queue
						// keeps draining
						let _ = error_tx
							.send(BrokerError::decode_error(format!(
								"message {}: {}",
								message.routing_key, e
							)))
							.await;
						continue;
					}
				};
				let (delivery, ack) = Delivery::new(body);
				if delivery_tx.send(delivery).await.is_err() {
					break;
				}
				if ack.await.is_err() {
					debug!(
						"message {} dropped without ack",
						message.routing_key
					);
				}
			}
		});

		Ok((delivery_rx, error_rx))
	}
}

impl Default for MemoryBroker {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl MessageBroker for MemoryBroker {
	async fn setup(&self) -> Result<(), BrokerError> {
		let mut state = self.state.lock().await;
		if state.closed {
			return Err(BrokerError::setup_error("broker is closed"));
		}
		state.exchanges.entry(EXCHANGE_REQUESTS.to_string()).or_default();
		state.exchanges.entry(EXCHANGE_EVENTS.to_string()).or_default();
		Ok(())
	}

	async fn close(&self) -> Result<(), BrokerError> {
		let mut state = self.state.lock().await;
		state.closed = true;
		// dropping the bindings ends every consumer pump
		state.exchanges.clear();
		Ok(())
	}

	async fn send_request(
		&self,
		chain: &str,
		request: &WatchRequest,
	) -> Result<(), BrokerError> {
		let body = serde_json::to_vec(request)
			.map_err(|e| BrokerError::publish_error(e.to_string()))?;
		let routing_key = format!(
			"{}.{}.{}",
			chain,
			i32::from(request.kind),
			request.obj
		);
		self.publish(EXCHANGE_REQUESTS, &routing_key, body).await
	}

	async fn get_events(&self, chain: &str) -> Result<ConsumerStream<Transaction>, BrokerError> {
		self.consume(EXCHANGE_EVENTS, format!("{}.*.*", chain)).await
	}

	async fn get_requests(
		&self,
		chain: &str,
	) -> Result<ConsumerStream<WatchRequest>, BrokerError> {
		self.consume(EXCHANGE_REQUESTS, format!("{}.*.*", chain)).await
	}

	async fn send_transactions(
		&self,
		chain: &str,
		txs: &[Transaction],
	) -> Result<(), BrokerError> {
		let mut result = Ok(());
		for tx in txs {
			let body = serde_json::to_vec(tx)
				.map_err(|e| BrokerError::publish_error(e.to_string()))?;
			let routing_key = format!("{}.trans.{}", chain, tx.hash);
			if let Err(e) = self.publish(EXCHANGE_EVENTS, &routing_key, body).await {
				result = Err(e);
			}
		}
		result
	}
}

/// Topic-exchange pattern match: `*` matches exactly one dot-separated
/// segment, `#` matches the rest of the key.
fn topic_matches(pattern: &str, routing_key: &str) -> bool {
	let mut segments = pattern.split('.');
	let mut key = routing_key.split('.');
	loop {
		match (segments.next(), key.next()) {
			(None, None) => return true,
			(Some("#"), _) => return true,
			(Some("*"), Some(_)) => {}
			(Some(expected), Some(actual)) if expected == actual => {}
			_ => return false,
		}
	}
}
