//! Transaction codec for the zkSync client.
//!
//! Serializes and parses the rollup-native `0x71` envelope, computes its
//! EIP-712 signing digest and transaction hash, and handles the legacy and
//! fee-market envelopes used when talking to L1.

use alloy_primitives::{Bytes, B256};
use thiserror::Error;
use zks_types::utils::EIP712_TX_TYPE;
use zks_types::{EcdsaSignature, ErrorKind, Transaction, ValidationError};

pub mod eip712;
pub mod envelope;
pub mod standard;

pub use eip712::{signed_digest, transaction_hash};
pub use envelope::{deserialize, serialize, signature_bytes};

/// Errors that can occur while encoding or decoding transactions.
#[derive(Debug, Error)]
pub enum CodecError {
	/// A field the envelope requires is absent.
	#[error("Missing required field: {0}")]
	MissingField(&'static str),
	/// The signature cannot be encoded or was decoded with an invalid shape.
	#[error("Invalid signature: {0}")]
	InvalidSignature(String),
	/// The payload does not follow the envelope layout.
	#[error("Malformed payload: {0}")]
	MalformedPayload(String),
	/// The transaction kind has no encoding on this path.
	#[error("Unsupported transaction type: {0:#x}")]
	UnsupportedType(u8),
	/// A field failed validation, such as a malformed factory dependency.
	#[error(transparent)]
	Validation(#[from] ValidationError),
}

impl CodecError {
	/// Coarse classification of the error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			CodecError::MissingField(_)
			| CodecError::InvalidSignature(_)
			| CodecError::UnsupportedType(_)
			| CodecError::Validation(_) => ErrorKind::Validation,
			CodecError::MalformedPayload(_) => ErrorKind::Protocol,
		}
	}
}

impl From<alloy_rlp::Error> for CodecError {
	fn from(err: alloy_rlp::Error) -> Self {
		CodecError::MalformedPayload(err.to_string())
	}
}

/// Parses a raw signed transaction of any supported kind.
pub fn parse_transaction(raw: &[u8]) -> Result<Transaction, CodecError> {
	match raw.first() {
		Some(&EIP712_TX_TYPE) => envelope::deserialize(raw),
		_ => standard::decode(raw),
	}
}

/// Digest to sign for `tx`, whatever its kind.
pub fn signing_hash(tx: &Transaction) -> Result<B256, CodecError> {
	if tx.is_eip712() {
		eip712::signed_digest(tx)
	} else {
		standard::signing_hash(tx)
	}
}

/// Encodes `tx` signed with `signature`, whatever its kind.
pub fn encode_signed(tx: &Transaction, signature: &EcdsaSignature) -> Result<Bytes, CodecError> {
	if tx.is_eip712() {
		envelope::serialize(tx, Some(signature))
	} else {
		standard::encode_signed(tx, signature)
	}
}
