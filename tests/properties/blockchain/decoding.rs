//! Property-based tests for ERC-20 input decoding.

use proptest::prelude::*;
use serde_json::json;

use chainwatch::services::blockchain::{ChainClient, EvmClient};

const CONTRACT: &str = "0x7762440182222620a7435195208038708d27ee41";
const SENDER: &str = "0x1cd434711fbae1f2d9c70001409fd82d71fdccaa";

fn decoder() -> EvmClient {
	EvmClient::new("http://localhost:8545", "", 4).unwrap()
}

fn block_with_input(input: &str) -> serde_json::Value {
	json!({ "transactions": [{
		"blockNumber": "0x1",
		"hash": "0xfeed",
		"from": SENDER,
		"to": CONTRACT,
		"gas": "0xff59",
		"gasPrice": "0x98bca5a00",
		"input": input,
		"value": "0x0"
	}] })
}

/// The expected value decoding: strip leading zeroes from the 64-char slot
/// but keep an even number of hex digits.
fn expected_value(slot: &str) -> String {
	let mut i = slot.find(|c| c != '0').unwrap_or(slot.len());
	if i % 2 == 1 {
		i -= 1;
	}
	format!("0x{}", &slot[i..])
}

prop_compose! {
	fn generate_value_slot()(
		zeros in 0usize..=64,
		digits in "[1-9a-f][0-9a-f]{0,62}",
	) -> String {
		let mut slot = "0".repeat(zeros);
		slot.push_str(&digits);
		slot.truncate(64);
		while slot.len() < 64 {
			slot.insert(0, '0');
		}
		slot
	}
}

proptest! {
	/// `transfer(address,uint256)` inputs decode the recipient from the
	/// first slot and the trimmed amount from the second, for any slot
	/// contents.
	#[test]
	fn prop_transfer_input_decodes_recipient_and_value(
		recipient in "[0-9a-f]{40}",
		slot in generate_value_slot(),
	) {
		let input = format!("0xa9059cbb{}{}{}", "0".repeat(24), recipient, slot);
		let raw = block_with_input(&input);

		let txs = decoder().decode_txs(&raw).unwrap();
		prop_assert_eq!(txs.len(), 1);
		let tx = &txs[0];
		prop_assert_eq!(&tx.to, &format!("0x{}", recipient));
		prop_assert_eq!(&tx.value, &expected_value(&slot));
		prop_assert_eq!(tx.token.as_deref(), Some(CONTRACT));
		prop_assert_eq!(&tx.from, SENDER);
	}

	/// `transferFrom(address,address,uint256)` inputs decode both parties
	/// from the argument slots; the outer sender is ignored.
	#[test]
	fn prop_transfer_from_input_decodes_both_parties(
		from in "[0-9a-f]{40}",
		to in "[0-9a-f]{40}",
		slot in generate_value_slot(),
	) {
		let input = format!(
			"0x23b872dd{pad}{from}{pad}{to}{slot}",
			pad = "0".repeat(24),
			from = from,
			to = to,
			slot = slot,
		);
		let raw = block_with_input(&input);

		let txs = decoder().decode_txs(&raw).unwrap();
		let tx = &txs[0];
		prop_assert_eq!(&tx.from, &format!("0x{}", from));
		prop_assert_eq!(&tx.to, &format!("0x{}", to));
		prop_assert_eq!(&tx.value, &expected_value(&slot));
		prop_assert_eq!(tx.token.as_deref(), Some(CONTRACT));
	}

	/// Inputs that do not begin with a recognized selector are plain ether
	/// transfers: the outer recipient and value are kept and no token is
	/// set.
	#[test]
	fn prop_unrecognized_selector_keeps_outer_fields(
		selector in "[0-9a-f]{8}",
		tail in "[0-9a-f]{0,128}",
	) {
		prop_assume!(!matches!(
			selector.as_str(),
			"a9059cbb" | "23b872dd" | "6cb927d8" | "a978501e"
		));
		let input = format!("0x{}{}", selector, tail);
		let raw = block_with_input(&input);

		let txs = decoder().decode_txs(&raw).unwrap();
		let tx = &txs[0];
		prop_assert_eq!(&tx.to, CONTRACT);
		prop_assert_eq!(&tx.value, "0x0");
		prop_assert_eq!(tx.token.as_deref(), None);
		prop_assert_eq!(tx.data.as_deref(), Some(input.as_str()));
	}
}
