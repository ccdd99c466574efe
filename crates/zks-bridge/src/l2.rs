//! L2 side of the bridge: balances, withdrawals and transfers.

use crate::{BridgeContracts, L2TransactionCapable};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use zks_provider::{PendingTransaction, TransferRequest, WithdrawRequest};
use zks_types::abi::INonceHolder;
use zks_types::utils::NONCE_HOLDER_ADDRESS;
use zks_types::{BalancesMap, BlockTag, CustomData};

/// Operations available to every account that can transact on L2.
#[async_trait]
pub trait L2Adapter: L2TransactionCapable {
	/// Balance in `token` (ETH when `None`), at the committed block unless
	/// `block` says otherwise.
	async fn get_balance(&self, token: Option<Address>, block: Option<BlockTag>) -> Result<U256, Self::Error> {
		let block = block.unwrap_or(BlockTag::Committed);
		Ok(self
			.provider_l2()
			.get_token_balance(self.address(), token, block)
			.await?)
	}

	/// Every balance the node tracks for the account.
	async fn get_all_balances(&self) -> Result<BalancesMap, Self::Error> {
		Ok(self.provider_l2().get_all_account_balances(self.address()).await?)
	}

	/// Number of contracts the account has deployed.
	async fn get_deployment_nonce(&self) -> Result<U256, Self::Error> {
		let call = INonceHolder::getDeploymentNonceCall {
			_address: self.address(),
		};
		Ok(self
			.provider_l2()
			.call_contract(NONCE_HOLDER_ADDRESS, &call)
			.await?
			._0)
	}

	async fn l2_bridge_contracts(&self) -> Result<BridgeContracts, Self::Error> {
		let bridges = self.provider_l2().default_bridge_addresses().await?;
		Ok(BridgeContracts {
			erc20: bridges.erc20_l2,
			weth: bridges.weth_l2,
		})
	}

	/// Completes `data` with the defaults the sequencer requires.
	fn fill_custom_data(&self, data: &CustomData) -> CustomData {
		data.filled()
	}

	/// Withdraws to L1 from this account.
	async fn withdraw(&self, request: &WithdrawRequest) -> Result<PendingTransaction, Self::Error> {
		let request = WithdrawRequest {
			from: Some(self.address()),
			..request.clone()
		};
		let tx = self.provider_l2().get_withdraw_tx(&request).await?;
		let pending = self.send_l2_transaction(tx).await?;
		tracing::info!(
			tx_hash = %pending.hash(),
			token = %request.token,
			amount = %request.amount,
			"Withdrawal sent"
		);
		Ok(pending)
	}

	/// Transfers ETH or a token from this account.
	async fn transfer(&self, request: &TransferRequest) -> Result<PendingTransaction, Self::Error> {
		let request = TransferRequest {
			from: Some(self.address()),
			..request.clone()
		};
		let tx = self.provider_l2().get_transfer_tx(&request);
		self.send_l2_transaction(tx).await
	}
}

impl<T: L2TransactionCapable> L2Adapter for T {}
