//! Deterministic address derivation and L1<->L2 address aliasing.
//!
//! Contract addresses on L2 are derived from the deployer system contract's
//! own schemes, which differ from the L1 CREATE/CREATE2 rules. Each scheme
//! is prefixed with its own domain separator.

use super::constants::{ETH_ADDRESS, L1_TO_L2_ALIAS_OFFSET, L2_ETH_TOKEN_ADDRESS};
use alloy_primitives::{keccak256, Address, B256, U256};

const CREATE_PREFIX: &[u8] = b"zksyncCreate";
const CREATE2_PREFIX: &[u8] = b"zksyncCreate2";

/// Derives the address of a contract deployed with `create` by `sender`
/// at deployment nonce `nonce`.
pub fn create_address(sender: Address, nonce: U256) -> Address {
	let mut preimage = Vec::with_capacity(96);
	preimage.extend_from_slice(keccak256(CREATE_PREFIX).as_slice());
	preimage.extend_from_slice(sender.into_word().as_slice());
	preimage.extend_from_slice(&nonce.to_be_bytes::<32>());
	Address::from_slice(&keccak256(preimage)[12..])
}

/// Derives the address of a contract deployed with `create2`.
///
/// # Arguments
///
/// * `sender` - Deploying account
/// * `bytecode_hash` - Versioned bytecode hash, see [`super::hash_bytecode`]
/// * `salt` - 32-byte salt chosen by the deployer
/// * `input` - ABI-encoded constructor arguments
pub fn create2_address(sender: Address, bytecode_hash: B256, salt: B256, input: &[u8]) -> Address {
	let mut preimage = Vec::with_capacity(160);
	preimage.extend_from_slice(keccak256(CREATE2_PREFIX).as_slice());
	preimage.extend_from_slice(sender.into_word().as_slice());
	preimage.extend_from_slice(salt.as_slice());
	preimage.extend_from_slice(bytecode_hash.as_slice());
	preimage.extend_from_slice(keccak256(input).as_slice());
	Address::from_slice(&keccak256(preimage)[12..])
}

fn address_modulus() -> U256 {
	U256::from(1u8) << 160
}

fn to_uint(address: Address) -> U256 {
	U256::from_be_slice(address.as_slice())
}

fn from_uint(value: U256) -> Address {
	Address::from_slice(&value.to_be_bytes::<32>()[12..])
}

/// Returns the address under which an L1 contract appears as `msg.sender`
/// on L2: `(address + offset) mod 2^160`.
pub fn apply_l1_to_l2_alias(address: Address) -> Address {
	let aliased = (to_uint(address) + to_uint(L1_TO_L2_ALIAS_OFFSET)) % address_modulus();
	from_uint(aliased)
}

/// Inverse of [`apply_l1_to_l2_alias`]: `(address - offset) mod 2^160`.
pub fn undo_l1_to_l2_alias(address: Address) -> Address {
	let value = to_uint(address);
	let offset = to_uint(L1_TO_L2_ALIAS_OFFSET);
	let original = if value >= offset {
		value - offset
	} else {
		value + address_modulus() - offset
	};
	from_uint(original)
}

/// Returns true if `token` designates the native asset on either layer.
pub fn is_eth(token: Address) -> bool {
	token == ETH_ADDRESS || token == L2_ETH_TOKEN_ADDRESS
}
