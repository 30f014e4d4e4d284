//! EVM chain client.
//!
//! Talks JSON-RPC over HTTP to an Ethereum-family node and decodes block
//! payloads into the core model. Transfers hidden inside ERC-20 `transfer`/
//! `transferFrom` calls are unpacked from the transaction input so the
//! emitted event carries the effective sender, recipient and amount.

use log::{debug, warn};
use serde_json::{json, Value};

use async_trait::async_trait;

use crate::models::{Block, Transaction};
use crate::services::blockchain::{ChainClient, ChainClientError};

// ERC-20 token method ids (keccak-256 of the function signature)
const ERC20_TRANSFER_256: &str = "a9059cbb"; // transfer(address,uint256)
const ERC20_TRANSFER_FROM_256: &str = "23b872dd"; // transferFrom(address,address,uint256)
const ERC20_TRANSFER: &str = "6cb927d8"; // transfer(address,uint)
const ERC20_TRANSFER_FROM: &str = "a978501e"; // transferFrom(address,address,uint)

// input layout: 0x + 8 selector chars, then 64-char argument slots with
// addresses right-aligned (24 pad chars before the 40-char address)
const TRANSFER_INPUT_LEN: usize = 138;
const TRANSFER_FROM_INPUT_LEN: usize = 202;

/// Connection to an Ethereum-family node.
pub struct EvmClient {
	http: reqwest::Client,
	url: String,
	secret: Option<(String, String)>,
	max_blocks: usize,
}

impl EvmClient {
	/// Creates a client for `node`, using `secret` (`user:password`) for
	/// basic authentication when non-empty. `max_blocks` is the reorg
	/// window kept for uncle management.
	pub fn new(node: &str, secret: &str, max_blocks: usize) -> Result<Self, ChainClientError> {
		let http = reqwest::Client::builder()
			.build()
			.map_err(|e| ChainClientError::request_error(e.to_string()))?;
		let secret = if secret.is_empty() {
			None
		} else {
			let (user, password) = secret.split_once(':').unwrap_or((secret, ""));
			Some((user.to_string(), password.to_string()))
		};
		Ok(EvmClient {
			http,
			url: node.to_string(),
			secret,
			max_blocks,
		})
	}
}

#[async_trait]
impl ChainClient for EvmClient {
	fn max_blocks(&self) -> usize {
		self.max_blocks
	}

	fn avg_block_secs(&self) -> u64 {
		15 // could come from the chain config
	}

	async fn get_block(&self, height: u64, full: bool) -> Result<Value, ChainClientError> {
		let payload = json!({
			"jsonrpc": "2.0",
			"method": "eth_getBlockByNumber",
			"params": [format!("{:#x}", height), full],
			"id": 1,
		});
		let mut request = self.http.post(&self.url).json(&payload);
		if let Some((user, password)) = &self.secret {
			request = request.basic_auth(user, Some(password));
		}
		let response: Value = request.send().await?.json().await?;

		if let Some(err) = response.get("error").filter(|e| !e.is_null()) {
			return Err(ChainClientError::request_error(format!(
				"node error: {}",
				err
			)));
		}
		match response.get("result") {
			None | Some(Value::Null) => Err(ChainClientError::NoBlock),
			Some(result) => Ok(result.clone()),
		}
	}

	fn decode_block(&self, raw: &Value) -> Result<Block, ChainClientError> {
		Ok(Block {
			hash: required_str(raw, "hash")?,
			parent_hash: required_str(raw, "parentHash")?,
			number: required_str(raw, "number")?,
			timestamp: required_str(raw, "timestamp")?,
			transactions: Vec::new(),
		})
	}

	fn decode_txs(&self, raw: &Value) -> Result<Vec<Transaction>, ChainClientError> {
		let list = raw
			.get("transactions")
			.and_then(Value::as_array)
			.ok_or_else(|| {
				ChainClientError::decode_error("block data missing \"transactions\"")
			})?;

		let mut txs = Vec::with_capacity(list.len());
		for entry in list {
			match entry {
				// hash-only payload (non-full block)
				Value::String(hash) => txs.push(Transaction {
					hash: hash.clone(),
					..Default::default()
				}),
				Value::Object(_) => txs.push(decode_full_tx(entry)?),
				other => {
					return Err(ChainClientError::decode_error(format!(
						"unexpected transaction element: {}",
						other
					)))
				}
			}
		}
		Ok(txs)
	}

	async fn close(&self) {
		debug!("closing chain client for {}", self.url);
	}
}

/// Decodes one full transaction object.
fn decode_full_tx(obj: &Value) -> Result<Transaction, ChainClientError> {
	let mut tx = Transaction {
		block: required_str(obj, "blockNumber")?,
		hash: required_str(obj, "hash")?,
		..Default::default()
	};

	// contract creation has no recipient; nothing to match against
	let Some(contract) = obj.get("to").and_then(Value::as_str) else {
		return Ok(tx);
	};
	let contract = contract.to_lowercase();
	tx.to = contract.clone();

	let input = required_str(obj, "input")?;
	if !input.is_ascii() {
		return Err(ChainClientError::decode_error(
			"transaction \"input\" is not hex",
		));
	}
	let len = input.len();
	let selector = if len > 10 { &input[2..10] } else { "" };

	if input == "0x" || (len > 2 && len <= 10) || (len > 10 && !is_transfer_selector(selector))
	{
		// plain ether transfer
		tx.value = required_str(obj, "value")?;
		tx.from = required_str(obj, "from")?.to_lowercase();
		tx.data = Some(input);
	} else if len > 10 {
		match selector {
			ERC20_TRANSFER_256 | ERC20_TRANSFER => {
				if len < TRANSFER_INPUT_LEN {
					return Err(ChainClientError::decode_error(
						"\"input\" has wrong length for ERC-20 transfer",
					));
				}
				tx.from = required_str(obj, "from")?.to_lowercase();
				tx.to = format!("0x{}", input[34..74].to_lowercase());
				tx.value = strip_value_slot(&input, 74, TRANSFER_INPUT_LEN);
			}
			ERC20_TRANSFER_FROM_256 | ERC20_TRANSFER_FROM => {
				if len < TRANSFER_FROM_INPUT_LEN {
					return Err(ChainClientError::decode_error(
						"\"input\" has wrong length for ERC-20 transferFrom",
					));
				}
				tx.from = format!("0x{}", input[34..74].to_lowercase());
				tx.to = format!("0x{}", input[98..138].to_lowercase());
				tx.value = strip_value_slot(&input, 138, TRANSFER_FROM_INPUT_LEN);
			}
			_ => unreachable!("checked by is_transfer_selector"),
		}
		// the outer recipient is the token contract
		tx.token = Some(contract);
	} else {
		warn!("very short \"input\" field in block transaction: {}", input);
	}

	tx.gas = required_str(obj, "gas")?;
	tx.price = parse_quantity(&required_str(obj, "gasPrice")?)?;
	// timestamp comes from the block, fee and status from the receipt

	Ok(tx)
}

fn required_str(raw: &Value, field: &str) -> Result<String, ChainClientError> {
	raw.get(field)
		.and_then(Value::as_str)
		.map(str::to_string)
		.ok_or_else(|| {
			ChainClientError::decode_error(format!("block data missing \"{}\"", field))
		})
}

fn is_transfer_selector(selector: &str) -> bool {
	matches!(
		selector,
		ERC20_TRANSFER_256 | ERC20_TRANSFER_FROM_256 | ERC20_TRANSFER | ERC20_TRANSFER_FROM
	)
}

/// Extracts a value slot from the input, trimming leading zeroes but keeping
/// an even number of hex digits.
fn strip_value_slot(input: &str, start: usize, end: usize) -> String {
	let bytes = input.as_bytes();
	let mut i = start;
	while i < end && bytes[i] == b'0' {
		i += 1;
	}
	if i % 2 == 1 {
		i -= 1;
	}
	format!("0x{}", &input[i..end])
}

fn parse_quantity(value: &str) -> Result<u64, ChainClientError> {
	let parsed = if let Some(hex) = value.strip_prefix("0x") {
		u64::from_str_radix(hex, 16)
	} else {
		value.parse()
	};
	parsed.map_err(|e| {
		ChainClientError::decode_error(format!("bad quantity {:?}: {}", value, e))
	})
}
