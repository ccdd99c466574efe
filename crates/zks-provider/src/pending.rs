//! Handles for submitted transactions.

use crate::eth::EthClient;
use crate::provider::Provider;
use crate::ProviderError;
use alloy_primitives::B256;
use zks_types::{BlockTag, TransactionReceipt};

/// A submitted transaction whose inclusion can be awaited.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
	hash: B256,
	client: EthClient,
}

impl PendingTransaction {
	pub fn new(hash: B256, client: EthClient) -> Self {
		Self { hash, client }
	}

	pub fn hash(&self) -> B256 {
		self.hash
	}

	/// Waits until the transaction is included in a block.
	///
	/// # Errors
	///
	/// Returns [`ProviderError::TransactionReverted`] if it was included but
	/// failed.
	pub async fn wait(&self) -> Result<TransactionReceipt, ProviderError> {
		let receipt = self.client.wait_for_receipt(self.hash).await?;

		if receipt.status == Some(0) {
			tracing::warn!(tx_hash = %self.hash, "Transaction reverted");
			return Err(ProviderError::TransactionReverted(self.hash.to_string()));
		}
		tracing::debug!(
			tx_hash = %self.hash,
			block_number = ?receipt.block_number,
			"Transaction included"
		);
		Ok(receipt)
	}

	/// Waits until the transaction's block is at or below the finalized block.
	pub async fn wait_finalize(&self) -> Result<TransactionReceipt, ProviderError> {
		let receipt = self.wait().await?;
		let block_number = receipt.block_number.unwrap_or_default();
		self.client
			.polling()
			.poll("finalization", || async move {
				let finalized = self.client.resolve_block_number(BlockTag::Finalized).await?;
				Ok((block_number <= finalized).then_some(()))
			})
			.await?;
		tracing::info!(tx_hash = %self.hash, "Transaction finalized");
		Ok(receipt)
	}
}

/// An L1 transaction that enqueued an L2 priority operation.
///
/// Its three waits track the L1 inclusion, the L2 execution and the L2
/// finalization.
#[derive(Debug, Clone)]
pub struct PriorityOpResponse {
	l1: PendingTransaction,
	provider: Provider,
}

impl PriorityOpResponse {
	pub fn new(l1: PendingTransaction, provider: Provider) -> Self {
		Self { l1, provider }
	}

	/// Hash of the L1 transaction.
	pub fn hash(&self) -> B256 {
		self.l1.hash()
	}

	/// Waits for the L1 receipt.
	pub async fn wait_l1_commit(&self) -> Result<TransactionReceipt, ProviderError> {
		self.l1.wait().await
	}

	/// Waits for the L2 receipt of the priority operation.
	pub async fn wait(&self) -> Result<TransactionReceipt, ProviderError> {
		self.l2_pending().await?.wait().await
	}

	/// Waits for the priority operation's L2 block to be finalized.
	pub async fn wait_finalize(&self) -> Result<TransactionReceipt, ProviderError> {
		self.l2_pending().await?.wait_finalize().await
	}

	async fn l2_pending(&self) -> Result<PendingTransaction, ProviderError> {
		let l1_receipt = self.wait_l1_commit().await?;
		let l2_tx = self
			.provider
			.get_l2_transaction_from_priority_op(&l1_receipt)
			.await?;
		Ok(self.provider.pending(l2_tx.hash))
	}
}
