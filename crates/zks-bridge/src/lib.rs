//! Bridge adapters between L1 and the zkSync rollup.
//!
//! Deposits, withdrawals, failed-deposit claims and L1-initiated L2
//! executions are exposed as extension traits. Any type able to sign and
//! send on the relevant layer gets them for free by implementing
//! [`L1TransactionCapable`] or [`L2TransactionCapable`].

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use thiserror::Error;
use zks_provider::{EthClient, PendingTransaction, Provider, ProviderError};
use zks_types::{ErrorKind, Transaction, ValidationError};

pub mod fees;
pub mod l1;
pub mod l2;

pub use fees::{check_base_cost, insert_gas_price};
pub use l1::{
	DepositRequest, DepositTx, FinalizeWithdrawalParams, FullDepositFeeRequest, L1Adapter,
	RequestExecuteRequest,
};
pub use l2::L2Adapter;
pub use zks_provider::BridgeProbe;

/// Errors that can occur while moving value between layers.
#[derive(Debug, Error)]
pub enum BridgeError {
	#[error(transparent)]
	Provider(#[from] ProviderError),
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The value sent with a priority operation does not cover its base cost.
	#[error("The base cost of performing the priority operation is higher than the provided value parameter for the transaction: base cost is {base_cost}, provided value is {value} wei")]
	InsufficientValue { base_cost: U256, value: U256 },
	#[error("Not enough balance for deposit. Under the provided gas price, the recommended balance to perform a deposit is {recommended} wei")]
	InsufficientBalance { recommended: U256 },
	#[error("Not enough allowance to cover the deposit: allowance is {allowance}, required {required}")]
	InsufficientAllowance { allowance: U256, required: U256 },
	/// The batch holding the message is not proven yet.
	#[error("Log proof not available for transaction {0}")]
	ProofNotAvailable(B256),
	#[error("Cannot claim successful deposit {0}")]
	CannotClaimSuccessfulDeposit(B256),
	#[error("{what} not found in transaction {tx_hash}")]
	LogNotFound { what: &'static str, tx_hash: B256 },
	#[error("L1 fee data carries neither a gas price nor fee-market values")]
	MissingFeeData,
	#[error("Protocol error: {0}")]
	Protocol(String),
}

impl BridgeError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			BridgeError::Provider(e) => e.kind(),
			BridgeError::Validation(_) => ErrorKind::Validation,
			BridgeError::InsufficientValue { .. }
			| BridgeError::InsufficientBalance { .. }
			| BridgeError::InsufficientAllowance { .. } => ErrorKind::InsufficientFunds,
			BridgeError::ProofNotAvailable(_) | BridgeError::LogNotFound { .. } => ErrorKind::NotFound,
			BridgeError::CannotClaimSuccessfulDeposit(_)
			| BridgeError::MissingFeeData
			| BridgeError::Protocol(_) => ErrorKind::Protocol,
		}
	}

	/// True when retrying later may succeed, e.g. once a batch is proven.
	pub fn is_retryable(&self) -> bool {
		self.kind().is_retryable()
	}
}

/// Default bridge pair on one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeContracts {
	pub erc20: Address,
	/// Zero when the network has no WETH bridge.
	pub weth: Address,
}

/// Identity of an account known to the L2 network.
pub trait BridgeAccount: Send + Sync {
	/// Error returned by the adapters; must absorb bridge and provider errors.
	type Error: From<BridgeError> + From<ProviderError> + From<ValidationError> + Send + Sync + 'static;

	fn address(&self) -> Address;

	fn provider_l2(&self) -> &Provider;
}

/// An account that can sign and send transactions on L1.
#[async_trait]
pub trait L1TransactionCapable: BridgeAccount {
	fn provider_l1(&self) -> &EthClient;

	/// Fills, signs and broadcasts `tx` on L1.
	async fn send_l1_transaction(&self, tx: Transaction) -> Result<PendingTransaction, Self::Error>;
}

/// An account that can sign and send transactions on L2.
#[async_trait]
pub trait L2TransactionCapable: BridgeAccount {
	/// Fills, signs and broadcasts `tx` on L2.
	async fn send_l2_transaction(&self, tx: Transaction) -> Result<PendingTransaction, Self::Error>;
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_kinds() {
		assert_eq!(
			BridgeError::InsufficientValue {
				base_cost: U256::from(2),
				value: U256::from(1)
			}
			.kind(),
			ErrorKind::InsufficientFunds
		);
		assert_eq!(BridgeError::ProofNotAvailable(B256::ZERO).kind(), ErrorKind::NotFound);
		assert!(BridgeError::ProofNotAvailable(B256::ZERO).is_retryable());
		assert!(!BridgeError::CannotClaimSuccessfulDeposit(B256::ZERO).is_retryable());
		assert_eq!(
			BridgeError::from(ValidationError::MissingField("to")).kind(),
			ErrorKind::Validation
		);
	}
}
