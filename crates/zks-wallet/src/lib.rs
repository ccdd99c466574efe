//! Signers and wallets for the zkSync client.
//!
//! A facade binds an account to one or both layers and turns it into a
//! transaction sender. The bridge adapters and the contract factory work on
//! top of any of them:
//!
//! - [`Wallet`] sends on L1 and L2.
//! - [`L1Signer`] sends on L1 only.
//! - [`L2Signer`] sends on L2 only.

use alloy_primitives::Address;
use thiserror::Error;
use zks_account::AccountError;
use zks_bridge::BridgeError;
use zks_codec::CodecError;
use zks_contract::ContractError;
use zks_provider::ProviderError;
use zks_types::{ErrorKind, ValidationError};

mod fill;
pub mod signer;
pub mod signers;
pub mod wallet;

pub use signer::Eip712Signer;
pub use signers::{L1Signer, L2Signer};
pub use wallet::Wallet;

/// Errors that can occur while populating, signing or sending transactions.
#[derive(Debug, Error)]
pub enum WalletError {
	#[error(transparent)]
	Account(#[from] AccountError),
	#[error(transparent)]
	Codec(#[from] CodecError),
	#[error(transparent)]
	Provider(#[from] ProviderError),
	#[error(transparent)]
	Bridge(#[from] BridgeError),
	#[error(transparent)]
	Contract(#[from] ContractError),
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The transaction names a sender other than the signer.
	#[error("Transaction from mismatch: expected {expected}, got {actual}")]
	FromMismatch { expected: Address, actual: Address },
}

impl WalletError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			WalletError::Account(e) => e.kind(),
			WalletError::Codec(e) => e.kind(),
			WalletError::Provider(e) => e.kind(),
			WalletError::Bridge(e) => e.kind(),
			WalletError::Contract(e) => e.kind(),
			WalletError::Validation(_) | WalletError::FromMismatch { .. } => ErrorKind::Validation,
		}
	}

	pub fn is_retryable(&self) -> bool {
		self.kind().is_retryable()
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use alloy_primitives::{keccak256, Bytes, B256};
	use serde_json::{json, Value};
	use std::sync::Arc;
	use std::time::Duration;
	use zks_account::{AccountService, LocalAccount};
	use zks_provider::{EthClient, MockTransport, PollingConfig, Provider, ProviderError};
	use zks_types::PrivateKey;

	pub const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	pub fn account() -> AccountService {
		let account = LocalAccount::new(&PrivateKey::from(KEY)).unwrap();
		AccountService::new(Arc::new(account))
	}

	pub fn client(mock: &MockTransport) -> EthClient {
		let polling = PollingConfig::new(Duration::from_millis(1), Some(5));
		EthClient::new(Arc::new(mock.clone())).with_polling(polling)
	}

	pub fn provider(mock: &MockTransport) -> Provider {
		Provider::new(client(mock))
	}

	/// Node answering the queries a signer makes before sending.
	pub fn node(chain_id: u64) -> MockTransport {
		let mock = MockTransport::new();
		mock.respond("eth_chainId", json!(format!("{:#x}", chain_id)))
			.respond("eth_getTransactionCount", json!("0x7"))
			.respond("eth_gasPrice", json!("0x3b9aca00"))
			.respond("eth_estimateGas", json!("0x5208"))
			.respond("eth_getBlockByNumber", json!({"number": "0x1"}))
			.on("eth_sendRawTransaction", raw_transaction_hash);
		mock
	}

	/// Answers `eth_sendRawTransaction` the way a node does for L1 kinds and
	/// with the locally computed hash for `0x71`.
	fn raw_transaction_hash(params: &Value) -> Result<Value, ProviderError> {
		let raw: Bytes = serde_json::from_value(params[0].clone()).unwrap();
		let tx = zks_codec::parse_transaction(&raw).unwrap();
		let hash: B256 = tx.hash.unwrap_or_else(|| keccak256(&raw));
		Ok(json!(hash))
	}

	/// Last raw transaction sent to `mock`.
	pub fn last_raw(mock: &MockTransport) -> Bytes {
		let params = mock.requests_to("eth_sendRawTransaction");
		serde_json::from_value(params.last().unwrap()[0].clone()).unwrap()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_kinds() {
		let mismatch = WalletError::FromMismatch {
			expected: Address::repeat_byte(1),
			actual: Address::repeat_byte(2),
		};
		assert_eq!(mismatch.kind(), ErrorKind::Validation);
		assert!(!mismatch.is_retryable());
		let proof = WalletError::from(BridgeError::ProofNotAvailable(Default::default()));
		assert!(proof.is_retryable());
	}
}
