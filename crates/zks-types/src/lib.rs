//! Common types for the zkSync client.
//!
//! This crate holds everything that does not need a network connection:
//! transaction and chain value types, contract interfaces, protocol
//! constants and the pure helpers (address derivation, bytecode hashing,
//! paymaster encoding) the other crates build on.

/// Contract interfaces and their lookup registry.
pub mod abi;
/// Known L2 deployments.
pub mod network;
/// Paymaster parameters and input encoding.
pub mod paymaster;
/// Chain values returned over JSON-RPC.
pub mod rpc;
/// Private key wrapper.
pub mod secret;
/// Transaction requests and overrides.
pub mod transaction;
/// Address derivation, bytecode hashing and protocol constants.
pub mod utils;
/// Validation errors and the error kind taxonomy.
pub mod validation;

pub use alloy_eips::eip2930::{AccessList, AccessListItem};
pub use network::Network;
pub use paymaster::{get_paymaster_params, PaymasterInput, PaymasterParams};
pub use rpc::*;
pub use secret::PrivateKey;
pub use transaction::{
	CustomData, EcdsaSignature, FeeFields, Overrides, Transaction, TransactionKind,
};
pub use utils::{
	apply_l1_to_l2_alias, create2_address, create_address, hash_bytecode, is_eth,
	undo_l1_to_l2_alias, with_0x_prefix,
};
pub use validation::{ErrorKind, ValidationError};
