//! A signer bound to both layers.

use crate::fill;
use crate::signer::Eip712Signer;
use crate::WalletError;
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use std::sync::Arc;
use zks_account::{AccountService, LocalAccount};
use zks_bridge::{BridgeAccount, L1TransactionCapable, L2TransactionCapable};
use zks_contract::TransactionSender;
use zks_provider::{EthClient, PendingTransaction, Provider};
use zks_types::{PrivateKey, Transaction};

/// Account that sends on L2 through `provider` and on L1 through
/// `provider_l1`.
///
/// Bridge operations come from [`zks_bridge::L1Adapter`] and
/// [`zks_bridge::L2Adapter`]; contract deployment from
/// [`zks_contract::ContractFactory::deploy`].
#[derive(Debug, Clone)]
pub struct Wallet {
	account: AccountService,
	provider: Provider,
	provider_l1: EthClient,
}

impl Wallet {
	pub fn new(account: AccountService, provider: Provider, provider_l1: EthClient) -> Self {
		Self {
			account,
			provider,
			provider_l1,
		}
	}

	/// Builds a wallet around a local private key.
	///
	/// # Errors
	///
	/// Returns [`WalletError::Account`] if the key is not a valid secp256k1
	/// scalar.
	pub fn from_private_key(
		key: &PrivateKey,
		provider: Provider,
		provider_l1: EthClient,
	) -> Result<Self, WalletError> {
		let account = LocalAccount::new(key)?;
		Ok(Self::new(AccountService::new(Arc::new(account)), provider, provider_l1))
	}

	pub fn address(&self) -> Address {
		self.account.address()
	}

	pub fn account(&self) -> &AccountService {
		&self.account
	}

	pub fn provider(&self) -> &Provider {
		&self.provider
	}

	pub fn provider_l1(&self) -> &EthClient {
		&self.provider_l1
	}

	/// EIP-712 signer for the L2 chain.
	pub async fn eip712_signer(&self) -> Result<Eip712Signer, WalletError> {
		let chain_id = self.provider.chain_id().await?;
		Ok(Eip712Signer::new(self.account.clone(), chain_id))
	}

	/// Completes `tx` for L2: sender, chain id, nonce, fees and gas limit.
	pub async fn populate_transaction(&self, tx: Transaction) -> Result<Transaction, WalletError> {
		fill::populate_l2(&self.account, &self.provider, tx).await
	}

	/// Raw signed encoding of a populated transaction.
	pub async fn sign_transaction(&self, tx: &Transaction) -> Result<Bytes, WalletError> {
		fill::sign(&self.account, tx).await
	}

	/// Populates, signs and broadcasts `tx` on L2.
	pub async fn send_transaction(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		fill::send_l2(&self.account, &self.provider, tx).await
	}

	/// Completes `tx` for L1.
	pub async fn populate_transaction_l1(&self, tx: Transaction) -> Result<Transaction, WalletError> {
		fill::populate_l1(&self.account, &self.provider_l1, tx).await
	}

	/// Populates, signs and broadcasts `tx` on L1.
	pub async fn send_transaction_l1(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		fill::send_l1(&self.account, &self.provider_l1, tx).await
	}
}

impl BridgeAccount for Wallet {
	type Error = WalletError;

	fn address(&self) -> Address {
		self.account.address()
	}

	fn provider_l2(&self) -> &Provider {
		&self.provider
	}
}

#[async_trait]
impl L1TransactionCapable for Wallet {
	fn provider_l1(&self) -> &EthClient {
		&self.provider_l1
	}

	async fn send_l1_transaction(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		self.send_transaction_l1(tx).await
	}
}

#[async_trait]
impl L2TransactionCapable for Wallet {
	async fn send_l2_transaction(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		self.send_transaction(tx).await
	}
}

#[async_trait]
impl TransactionSender for Wallet {
	type Error = WalletError;

	async fn send_transaction(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		Wallet::send_transaction(self, tx).await
	}
}
