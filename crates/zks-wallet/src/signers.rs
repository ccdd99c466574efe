//! Signers bound to a single layer.
//!
//! [`L1Signer`] still reads the L2 node for bridge addresses and base costs
//! but only ever submits to L1. [`L2Signer`] has no L1 connection at all.

use crate::fill;
use crate::WalletError;
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use zks_account::AccountService;
use zks_bridge::{BridgeAccount, L1TransactionCapable, L2TransactionCapable};
use zks_contract::TransactionSender;
use zks_provider::{EthClient, PendingTransaction, Provider};
use zks_types::Transaction;

/// Sends deposits, finalizations and failed-deposit claims on L1.
#[derive(Debug, Clone)]
pub struct L1Signer {
	account: AccountService,
	provider_l1: EthClient,
	provider: Provider,
}

impl L1Signer {
	pub fn new(account: AccountService, provider_l1: EthClient, provider: Provider) -> Self {
		Self {
			account,
			provider_l1,
			provider,
		}
	}

	pub fn address(&self) -> Address {
		self.account.address()
	}

	pub async fn populate_transaction(&self, tx: Transaction) -> Result<Transaction, WalletError> {
		fill::populate_l1(&self.account, &self.provider_l1, tx).await
	}

	pub async fn sign_transaction(&self, tx: &Transaction) -> Result<Bytes, WalletError> {
		fill::sign(&self.account, tx).await
	}

	pub async fn send_transaction(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		fill::send_l1(&self.account, &self.provider_l1, tx).await
	}
}

impl BridgeAccount for L1Signer {
	type Error = WalletError;

	fn address(&self) -> Address {
		self.account.address()
	}

	fn provider_l2(&self) -> &Provider {
		&self.provider
	}
}

#[async_trait]
impl L1TransactionCapable for L1Signer {
	fn provider_l1(&self) -> &EthClient {
		&self.provider_l1
	}

	async fn send_l1_transaction(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		self.send_transaction(tx).await
	}
}

/// Sends withdrawals, transfers and deployments on L2.
#[derive(Debug, Clone)]
pub struct L2Signer {
	account: AccountService,
	provider: Provider,
}

impl L2Signer {
	pub fn new(account: AccountService, provider: Provider) -> Self {
		Self { account, provider }
	}

	pub fn address(&self) -> Address {
		self.account.address()
	}

	pub async fn populate_transaction(&self, tx: Transaction) -> Result<Transaction, WalletError> {
		fill::populate_l2(&self.account, &self.provider, tx).await
	}

	pub async fn sign_transaction(&self, tx: &Transaction) -> Result<Bytes, WalletError> {
		fill::sign(&self.account, tx).await
	}

	pub async fn send_transaction(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		fill::send_l2(&self.account, &self.provider, tx).await
	}
}

impl BridgeAccount for L2Signer {
	type Error = WalletError;

	fn address(&self) -> Address {
		self.account.address()
	}

	fn provider_l2(&self) -> &Provider {
		&self.provider
	}
}

#[async_trait]
impl L2TransactionCapable for L2Signer {
	async fn send_l2_transaction(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		self.send_transaction(tx).await
	}
}

#[async_trait]
impl TransactionSender for L2Signer {
	type Error = WalletError;

	async fn send_transaction(&self, tx: Transaction) -> Result<PendingTransaction, WalletError> {
		L2Signer::send_transaction(self, tx).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{account, client, last_raw, node, provider};
	use alloy_primitives::U256;
	use zks_bridge::{L1Adapter, L2Adapter};
	use zks_provider::TransferRequest;
	use zks_types::utils::ETH_ADDRESS;
	use zks_types::BlockTag;

	#[tokio::test]
	async fn test_l1_signer_sends_on_l1() {
		let (l1, l2) = (node(5), node(270));
		let signer = L1Signer::new(account(), client(&l1), provider(&l2));
		signer
			.send_l1_transaction(Transaction::transfer(Address::repeat_byte(0x11), U256::from(1)))
			.await
			.unwrap();
		let sent = zks_codec::parse_transaction(&last_raw(&l1)).unwrap();
		assert_eq!(sent.chain_id, Some(5));
		assert_eq!(sent.nonce, Some(7));
		assert!(l2.requests_to("eth_sendRawTransaction").is_empty());
	}

	#[tokio::test]
	async fn test_l1_signer_reads_l1_balance() {
		let (l1, l2) = (node(5), node(270));
		l1.respond("eth_getBalance", serde_json::json!("0x64"));
		let signer = L1Signer::new(account(), client(&l1), provider(&l2));
		assert_eq!(signer.get_balance_l1(None, BlockTag::Latest).await.unwrap(), U256::from(100));
	}

	#[tokio::test]
	async fn test_l2_signer_transfer() {
		let l2 = node(270);
		let signer = L2Signer::new(account(), provider(&l2));
		let pending = signer
			.transfer(&TransferRequest {
				to: Address::repeat_byte(0x11),
				amount: U256::from(4),
				token: Some(ETH_ADDRESS),
				..Default::default()
			})
			.await
			.unwrap();

		let sent = zks_codec::parse_transaction(&last_raw(&l2)).unwrap();
		assert_eq!(sent.hash, Some(pending.hash()));
		assert_eq!(sent.to, Some(Address::repeat_byte(0x11)));
		assert_eq!(sent.value, U256::from(4));
		assert_eq!(sent.chain_id, Some(270));
	}
}
