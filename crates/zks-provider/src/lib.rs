//! Chain client for the zkSync client library.
//!
//! This crate talks JSON-RPC to both layers. [`EthClient`] covers the
//! standard methods shared by L1 and L2; [`Provider`] adds the rollup
//! methods (`zks_*`), the cached protocol addresses and the transaction
//! builders for withdrawals and transfers. Receipt, status and finalization
//! waits go through [`PollingConfig`].

use serde_json::Value;
use thiserror::Error;
use zks_codec::CodecError;
use zks_types::{ErrorKind, ValidationError};

pub mod eth;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod pending;
pub mod polling;
pub mod probe;
pub mod provider;
pub mod request;
pub mod transport;

pub use eth::{EthClient, FeeData};
#[cfg(any(test, feature = "testing"))]
pub use mock::MockTransport;
pub use pending::{PendingTransaction, PriorityOpResponse};
pub use polling::PollingConfig;
pub use probe::BridgeProbe;
pub use provider::{L1ToL2ExecuteRequest, Provider, TransferRequest, WithdrawRequest};
pub use transport::{HttpTransport, Transport};

/// Errors that can occur while talking to a node.
#[derive(Debug, Error)]
pub enum ProviderError {
	/// The request could not be delivered or the response could not be read.
	#[error("Transport error: {0}")]
	Transport(String),
	/// The node answered with a JSON-RPC error object.
	#[error("RPC error {code}: {message}")]
	Rpc {
		code: i64,
		message: String,
		data: Option<Value>,
	},
	/// The node answered with a value of an unexpected shape.
	#[error("Invalid response from {method}: {reason}")]
	InvalidResponse { method: String, reason: String },
	/// A transaction could not be encoded or decoded.
	#[error("Codec error: {0}")]
	Codec(#[from] CodecError),
	/// Caller input was rejected before any request was sent.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Requested data does not exist yet.
	#[error("Not found: {0}")]
	NotFound(String),
	/// The chain or the node violated an expectation of the protocol.
	#[error("Protocol error: {0}")]
	Protocol(String),
	/// A mined transaction reverted.
	#[error("Transaction {0} reverted")]
	TransactionReverted(String),
	/// A bounded polling loop ran out of attempts.
	#[error("Gave up waiting for {what} after {attempts} attempts")]
	PollingExhausted { what: String, attempts: u32 },
}

impl ProviderError {
	/// Coarse classification of the error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			ProviderError::Transport(_) => ErrorKind::Transport,
			ProviderError::Codec(e) => e.kind(),
			ProviderError::Validation(_) => ErrorKind::Validation,
			ProviderError::NotFound(_) | ProviderError::PollingExhausted { .. } => {
				ErrorKind::NotFound
			},
			ProviderError::Rpc { .. }
			| ProviderError::InvalidResponse { .. }
			| ProviderError::Protocol(_)
			| ProviderError::TransactionReverted(_) => ErrorKind::Protocol,
		}
	}

	/// Returns true when repeating the operation later may succeed.
	pub fn is_retryable(&self) -> bool {
		self.kind().is_retryable()
	}

	pub(crate) fn invalid_response(method: &str, reason: impl ToString) -> Self {
		ProviderError::InvalidResponse {
			method: method.to_string(),
			reason: reason.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_kinds() {
		assert!(ProviderError::Transport("reset".into()).is_retryable());
		assert!(ProviderError::PollingExhausted {
			what: "receipt".into(),
			attempts: 3
		}
		.is_retryable());
		assert!(!ProviderError::Protocol("hash mismatch".into()).is_retryable());
		assert_eq!(
			ProviderError::Codec(CodecError::MissingField("from")).kind(),
			ErrorKind::Validation
		);
	}
}
