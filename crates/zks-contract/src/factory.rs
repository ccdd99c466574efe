//! Deployment transaction builder.

use crate::{deployed_contracts, ContractError, DeploymentType, TransactionSender};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use zks_types::abi::IContractDeployer;
use zks_types::utils::{CONTRACT_DEPLOYER_ADDRESS, DEFAULT_GAS_PER_PUBDATA_LIMIT};
use zks_types::{
	hash_bytecode, AccountAbstractionVersion, CustomData, Overrides, Transaction, ValidationError,
};

/// Parses a CREATE2 salt: `0x` followed by exactly 64 hex digits.
pub fn parse_salt(salt: &str) -> Result<B256, ValidationError> {
	if !salt.starts_with("0x") || salt.len() != 66 {
		return Err(ValidationError::InvalidSalt(salt.to_string()));
	}
	salt.parse()
		.map_err(|_| ValidationError::InvalidSalt(salt.to_string()))
}

/// Builds and sends deployments of one bytecode.
#[derive(Debug, Clone)]
pub struct ContractFactory {
	bytecode: Bytes,
	bytecode_hash: B256,
	deployment_type: DeploymentType,
}

impl ContractFactory {
	/// Creates a factory for `bytecode`.
	///
	/// # Errors
	///
	/// Fails when the bytecode cannot be hashed: its length must be a whole,
	/// odd number of 32-byte words within the protocol maximum.
	pub fn new(bytecode: impl Into<Bytes>, deployment_type: DeploymentType) -> Result<Self, ContractError> {
		let bytecode = bytecode.into();
		let bytecode_hash = hash_bytecode(&bytecode)?;
		Ok(Self {
			bytecode,
			bytecode_hash,
			deployment_type,
		})
	}

	pub fn bytecode(&self) -> &Bytes {
		&self.bytecode
	}

	pub fn bytecode_hash(&self) -> B256 {
		self.bytecode_hash
	}

	pub fn deployment_type(&self) -> DeploymentType {
		self.deployment_type
	}

	/// Calldata for the contract deployer.
	pub fn encode_calldata(&self, salt: B256, constructor_args: &[u8]) -> Bytes {
		let input = Bytes::copy_from_slice(constructor_args);
		let aa_version = AccountAbstractionVersion::Version1 as u8;
		let encoded = match self.deployment_type {
			DeploymentType::Create => IContractDeployer::createCall {
				_salt: salt,
				_bytecodeHash: self.bytecode_hash,
				_input: input,
			}
			.abi_encode(),
			DeploymentType::CreateAccount => IContractDeployer::createAccountCall {
				_salt: salt,
				_bytecodeHash: self.bytecode_hash,
				_input: input,
				_aaVersion: aa_version,
			}
			.abi_encode(),
			DeploymentType::Create2 => IContractDeployer::create2Call {
				_salt: salt,
				_bytecodeHash: self.bytecode_hash,
				_input: input,
			}
			.abi_encode(),
			DeploymentType::Create2Account => IContractDeployer::create2AccountCall {
				_salt: salt,
				_bytecodeHash: self.bytecode_hash,
				_input: input,
				_aaVersion: aa_version,
			}
			.abi_encode(),
		};
		encoded.into()
	}

	/// Builds the deployment transaction.
	///
	/// `salt` is required for the CREATE2 variants and ignored otherwise.
	/// The bytecode is appended to the factory dependencies unless already
	/// present, and `gasPerPubdata` defaults to 50 000.
	pub fn get_deploy_transaction(
		&self,
		constructor_args: &[u8],
		salt: Option<&str>,
		custom_data: Option<CustomData>,
		overrides: &Overrides,
	) -> Result<Transaction, ContractError> {
		let salt = if self.deployment_type.uses_salt() {
			parse_salt(salt.ok_or(ValidationError::MissingField("salt"))?)?
		} else {
			B256::ZERO
		};

		let mut custom_data = custom_data.unwrap_or_default();
		custom_data.gas_per_pubdata = custom_data
			.gas_per_pubdata
			.or(Some(U256::from(DEFAULT_GAS_PER_PUBDATA_LIMIT)));
		if !custom_data.factory_deps.contains(&self.bytecode) {
			custom_data.factory_deps.push(self.bytecode.clone());
		}

		let mut tx = overrides.apply(Transaction::eip712(custom_data));
		tx.to = Some(CONTRACT_DEPLOYER_ADDRESS);
		tx.data = self.encode_calldata(salt, constructor_args);
		Ok(tx)
	}

	/// Deploys through `sender` and returns the address of the last contract
	/// the deployer reports.
	pub async fn deploy<S: TransactionSender>(
		&self,
		sender: &S,
		constructor_args: &[u8],
		salt: Option<&str>,
		overrides: &Overrides,
	) -> Result<Address, S::Error> {
		let tx = self.get_deploy_transaction(constructor_args, salt, None, overrides)?;
		let pending = sender.send_transaction(tx).await?;
		let receipt = pending.wait().await?;
		let address = deployed_contracts(&receipt)
			.last()
			.map(|info| info.deployed_address)
			.ok_or(ContractError::NoDeployment(receipt.transaction_hash))?;
		tracing::info!(
			tx_hash = %receipt.transaction_hash,
			address = %address,
			deployment_type = %self.deployment_type,
			"Deployed contract"
		);
		Ok(address)
	}
}
