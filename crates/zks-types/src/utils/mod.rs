//! Utility functions shared across the client.
//!
//! Address derivation, bytecode hashing, protocol constants and the small
//! arithmetic helpers used by fee estimation.

pub mod address;
pub mod bytecode;
pub mod constants;
pub mod quantity;

pub use address::{apply_l1_to_l2_alias, create2_address, create_address, is_eth, undo_l1_to_l2_alias};
pub use bytecode::hash_bytecode;
pub use constants::*;

use alloy_primitives::{keccak256, Address, B256, U256};

/// Applies the L1 fee estimation safety coefficient (x1.2) to a gas limit.
pub fn scale_gas_limit(gas_limit: U256) -> U256 {
	gas_limit * U256::from(L1_FEE_ESTIMATION_COEF_NUMERATOR)
		/ U256::from(L1_FEE_ESTIMATION_COEF_DENOMINATOR)
}

/// Hash of the L2->L1 log that carries a message sent through the L1 messenger.
///
/// Layout: `shard_id(1) || is_service(1) || tx_number_in_block(2) ||
/// messenger(20) || sender_word(32) || keccak(message)(32)`.
pub fn hashed_l2_to_l1_msg(sender: Address, message: &[u8], tx_number_in_block: u16) -> B256 {
	let mut encoded = Vec::with_capacity(88);
	encoded.push(0);
	encoded.push(1);
	encoded.extend_from_slice(&tx_number_in_block.to_be_bytes());
	encoded.extend_from_slice(L1_MESSENGER_ADDRESS.as_slice());
	encoded.extend_from_slice(sender.into_word().as_slice());
	encoded.extend_from_slice(keccak256(message).as_slice());
	keccak256(encoded)
}

/// Adds a `0x` prefix to a hex string if it does not have one.
pub fn with_0x_prefix(s: &str) -> String {
	if s.starts_with("0x") {
		s.to_string()
	} else {
		format!("0x{}", s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scale_gas_limit() {
		assert_eq!(scale_gas_limit(U256::from(100_000)), U256::from(120_000));
		assert_eq!(scale_gas_limit(U256::from(7)), U256::from(8));
	}

	#[test]
	fn test_hashed_l2_to_l1_msg_depends_on_tx_number() {
		let sender = Address::repeat_byte(0x11);
		let a = hashed_l2_to_l1_msg(sender, b"hello", 1);
		let b = hashed_l2_to_l1_msg(sender, b"hello", 2);
		assert_ne!(a, b);
	}

	#[test]
	fn test_with_0x_prefix() {
		assert_eq!(with_0x_prefix("abcd"), "0xabcd");
		assert_eq!(with_0x_prefix("0xabcd"), "0xabcd");
	}
}
