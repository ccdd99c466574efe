//! Contract deployment through the zkSync contract deployer.
//!
//! L2 contracts are not deployed by sending init code to the zero address.
//! A deployment is a `0x71` transaction calling the contract deployer system
//! contract with the bytecode hash, while the bytecode itself travels as a
//! factory dependency. This crate builds those transactions and reads the
//! deployer's events back from receipts.

use alloy_primitives::{Address, B256};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zks_provider::{PendingTransaction, ProviderError};
use zks_types::abi::IContractDeployer;
use zks_types::utils::CONTRACT_DEPLOYER_ADDRESS;
use zks_types::{DeploymentInfo, ErrorKind, Transaction, TransactionReceipt, ValidationError};

pub mod factory;

pub use factory::{parse_salt, ContractFactory};

/// Errors that can occur while deploying contracts.
#[derive(Debug, Error)]
pub enum ContractError {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The deployment was mined but the deployer emitted no event.
	#[error("No contract deployed by transaction {0}")]
	NoDeployment(B256),
	#[error("Unsupported deployment type: {0}")]
	UnsupportedDeploymentType(String),
}

impl ContractError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			ContractError::NoDeployment(_) => ErrorKind::Protocol,
			ContractError::Validation(_) | ContractError::UnsupportedDeploymentType(_) => {
				ErrorKind::Validation
			},
		}
	}
}

/// Which contract deployer entry point a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeploymentType {
	/// Address derived from the deployer's nonce.
	#[default]
	Create,
	/// Like `Create`, registering the contract as an account.
	CreateAccount,
	/// Address derived from a caller-chosen salt.
	Create2,
	/// Like `Create2`, registering the contract as an account.
	Create2Account,
}

impl DeploymentType {
	/// True for the variants that take a salt.
	pub fn uses_salt(&self) -> bool {
		matches!(self, DeploymentType::Create2 | DeploymentType::Create2Account)
	}

	/// True for the variants that deploy an account.
	pub fn is_account(&self) -> bool {
		matches!(self, DeploymentType::CreateAccount | DeploymentType::Create2Account)
	}
}

impl fmt::Display for DeploymentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			DeploymentType::Create => "create",
			DeploymentType::CreateAccount => "createAccount",
			DeploymentType::Create2 => "create2",
			DeploymentType::Create2Account => "create2Account",
		};
		f.write_str(name)
	}
}

impl FromStr for DeploymentType {
	type Err = ContractError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"create" => Ok(DeploymentType::Create),
			"createAccount" => Ok(DeploymentType::CreateAccount),
			"create2" => Ok(DeploymentType::Create2),
			"create2Account" => Ok(DeploymentType::Create2Account),
			other => Err(ContractError::UnsupportedDeploymentType(other.to_string())),
		}
	}
}

/// Anything that can sign and submit an L2 transaction on behalf of a
/// deployment.
#[async_trait]
pub trait TransactionSender: Send + Sync {
	type Error: From<ContractError> + From<ProviderError> + Send;

	/// Fills, signs and broadcasts `tx`.
	async fn send_transaction(&self, tx: Transaction) -> Result<PendingTransaction, Self::Error>;
}

/// Every contract the deployer reports as created in `receipt`, in log order.
pub fn deployed_contracts(receipt: &TransactionReceipt) -> Vec<DeploymentInfo> {
	receipt
		.logs
		.iter()
		.filter(|log| log.address == CONTRACT_DEPLOYER_ADDRESS)
		.filter(|log| log.topics.first() == Some(&IContractDeployer::ContractDeployed::SIGNATURE_HASH))
		.filter(|log| log.topics.len() == 4)
		.map(|log| DeploymentInfo {
			sender: Address::from_word(log.topics[1]),
			bytecode_hash: log.topics[2],
			deployed_address: Address::from_word(log.topics[3]),
		})
		.collect()
}
