//! Request consumer.
//!
//! Applies the watch/unwatch commands arriving on the bus to one chain's
//! watch set, mirroring each change to the store. Every message is
//! acknowledged only after both reflect it, so request application is serial
//! per chain and a crash never loses an acked command.

use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::{RequestAction, RequestKind, WatchRequest};
use crate::services::broker::{BrokerError, Delivery};
use crate::services::explorer::watch_set::WatchSet;
use crate::services::store::{Store, StoreError, WatchedAddress};

/// Tag stored for addresses watched through a LISTEN request.
pub(crate) const LISTEN_TAG: &str = "listen";

/// Consumes wallet requests for `chain` until the stream ends.
pub async fn consume_requests<S>(
	chain: String,
	watch_set: Arc<WatchSet>,
	store: Arc<S>,
	mut requests: mpsc::Receiver<Delivery<WatchRequest>>,
	mut errors: mpsc::Receiver<BrokerError>,
) where
	S: Store + ?Sized,
{
	info!("[{}] listening to wallet requests", chain);

	let mut errors_open = true;
	loop {
		tokio::select! {
			delivery = requests.recv() => {
				let Some(delivery) = delivery else {
					info!("[{}] wallet request stream closed", chain);
					break;
				};
				apply_request(&chain, &watch_set, store.as_ref(), &delivery.body).await;
				delivery.ack();
			}
			err = errors.recv(), if errors_open => {
				match err {
					Some(e) => warn!("[{}] wallet request consumer error: {}", chain, e),
					None => errors_open = false,
				}
			}
		}
	}
}

/// Applies one request. Invalid requests are logged and dropped; the caller
/// acknowledges in every case.
async fn apply_request<S>(chain: &str, watch_set: &WatchSet, store: &S, request: &WatchRequest)
where
	S: Store + ?Sized,
{
	debug!("[{}] received request {:?}", chain, request);

	if request.chain != chain || request.obj.is_empty() {
		warn!(
			"[{}] request has wrong chain {} or missing object, ignoring",
			chain, request.chain
		);
		return;
	}

	match request.kind {
		RequestKind::Address => match request.act {
			RequestAction::Listen => {
				let address = WatchedAddress {
					addr: request.obj.clone(),
					..Default::default()
				};
				// persist first so a restart rebuilds the same watch set
				match store.add_address(&address, chain).await {
					Ok(id) => debug!("[{}] stored address {} as {}", chain, request.obj, id),
					Err(e) => error!(
						"[{}] error adding address {} to store: {}",
						chain, request.obj, e
					),
				}
				watch_set.add(&request.obj, LISTEN_TAG);
				info!(
					"[{}] watching {} ({} addresses)",
					chain,
					request.obj,
					watch_set.len()
				);
			}
			RequestAction::Unlisten => {
				if watch_set.remove(&request.obj).is_none() {
					info!(
						"[{}] address {} was not watched, ignoring",
						chain, request.obj
					);
				}
				let address = WatchedAddress {
					addr: request.obj.clone(),
					..Default::default()
				};
				match store.remove_address(&address, chain).await {
					Ok(()) => {}
					Err(StoreError::NotFound) => {
						debug!("[{}] address {} was not stored", chain, request.obj)
					}
					Err(e) => error!(
						"[{}] error removing address {} from store: {}",
						chain, request.obj, e
					),
				}
				info!(
					"[{}] unwatched {} ({} addresses)",
					chain,
					request.obj,
					watch_set.len()
				);
			}
		},
		RequestKind::Tx => {
			// reserved: transaction watching is not implemented
			info!("[{}] transaction watch requests are not supported yet", chain);
		}
	}
}
