//! L2 provider: the rollup `zks_*` namespace on top of [`EthClient`].

use crate::eth::EthClient;
use crate::pending::{PendingTransaction, PriorityOpResponse};
use crate::probe::BridgeProbe;
use crate::request::transaction_request;
use crate::ProviderError;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolEvent};
use serde_json::{json, Value};
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::OnceCell;
use zks_codec::parse_transaction;
use zks_types::abi::{IContractDeployer, IERC20, IEthToken, IL2Bridge, IZkSync};
use zks_types::utils::quantity::parse_quantity;
use zks_types::utils::{
	CONTRACT_DEPLOYER_ADDRESS, ETH_ADDRESS, L2_ETH_TOKEN_ADDRESS, L2_RPC_URL_ENV,
	REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT,
};
use zks_types::{
	is_eth, BalancesMap, BatchDetails, BlockDetails, BlockTag, BridgeAddresses, ContractAccountInfo,
	CustomData, Fee, MessageProof, Network, Overrides, RawBlockTransaction, Token, Transaction,
	TransactionDetails, TransactionReceipt, TransactionResponse, TransactionStatus, ValidationError,
};

/// Parameters of a withdrawal from L2.
#[derive(Debug, Clone, Default)]
pub struct WithdrawRequest {
	/// L2 token to withdraw; the zero address or the L2 ETH token for ETH.
	pub token: Address,
	pub amount: U256,
	pub from: Option<Address>,
	/// L1 receiver; defaults to `from`.
	pub to: Option<Address>,
	/// L2 bridge to use instead of the default ones.
	pub bridge_address: Option<Address>,
	pub overrides: Overrides,
}

/// Parameters of an L2 transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferRequest {
	pub to: Address,
	pub amount: U256,
	/// Token to transfer; ETH when `None`.
	pub token: Option<Address>,
	pub from: Option<Address>,
	pub overrides: Overrides,
}

/// Parameters of an L2 execution requested from L1, for gas estimation.
#[derive(Debug, Clone, Default)]
pub struct L1ToL2ExecuteRequest {
	pub contract_address: Address,
	pub calldata: Bytes,
	/// Sender on L2; a random address when `None`.
	pub caller: Option<Address>,
	pub l2_value: U256,
	pub factory_deps: Vec<Bytes>,
	pub gas_per_pubdata: Option<U256>,
}

struct ProviderInner {
	client: EthClient,
	main_contract: OnceCell<Address>,
	bridge_addresses: OnceCell<BridgeAddresses>,
}

/// Client for a zkSync L2 node.
///
/// Standard methods are reachable through `Deref` to [`EthClient`]. The
/// main contract and default bridge addresses are fetched once and cached
/// for the lifetime of the provider and its clones.
#[derive(Clone)]
pub struct Provider {
	inner: Arc<ProviderInner>,
}

impl std::fmt::Debug for Provider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Provider")
			.field("client", &self.inner.client)
			.finish_non_exhaustive()
	}
}

impl Deref for Provider {
	type Target = EthClient;

	fn deref(&self) -> &EthClient {
		&self.inner.client
	}
}

impl Provider {
	pub fn new(client: EthClient) -> Self {
		Self {
			inner: Arc::new(ProviderInner {
				client,
				main_contract: OnceCell::new(),
				bridge_addresses: OnceCell::new(),
			}),
		}
	}

	/// Connects over HTTP to `url`.
	pub fn http(url: &str) -> Result<Self, ProviderError> {
		Ok(Self::new(EthClient::http(url)?))
	}

	/// Provider for a known network.
	///
	/// A non-empty `ZKSYNC_WEB3_API_URL` environment variable takes
	/// precedence over the network's endpoint.
	pub fn default_provider(network: Network) -> Result<Self, ProviderError> {
		let url = std::env::var(L2_RPC_URL_ENV)
			.ok()
			.filter(|url| !url.is_empty())
			.unwrap_or_else(|| network.default_rpc_url().to_string());
		tracing::debug!(network = %network, url = %url, "Using default L2 provider");
		Self::http(&url)
	}

	pub fn client(&self) -> &EthClient {
		&self.inner.client
	}

	/// Address of the main rollup contract on L1.
	pub async fn main_contract_address(&self) -> Result<Address, ProviderError> {
		self.inner
			.main_contract
			.get_or_try_init(|| self.request("zks_getMainContract", json!([])))
			.await
			.copied()
	}

	/// Testnet paymaster, if the node runs one. Never cached.
	pub async fn get_testnet_paymaster_address(&self) -> Result<Option<Address>, ProviderError> {
		self.request("zks_getTestnetPaymaster", json!([])).await
	}

	/// Default ERC-20 and WETH bridges on both layers.
	pub async fn default_bridge_addresses(&self) -> Result<BridgeAddresses, ProviderError> {
		self.inner
			.bridge_addresses
			.get_or_try_init(|| self.request("zks_getBridgeContracts", json!([])))
			.await
			.copied()
	}

	pub async fn get_confirmed_tokens(&self, start: u32, limit: u8) -> Result<Vec<Token>, ProviderError> {
		self.request("zks_getConfirmedTokens", json!([start, limit]))
			.await
	}

	pub async fn get_all_account_balances(&self, address: Address) -> Result<BalancesMap, ProviderError> {
		self.request("zks_getAllAccountBalances", json!([address]))
			.await
	}

	pub async fn l1_chain_id(&self) -> Result<u64, ProviderError> {
		self.request_quantity("zks_L1ChainId", json!([])).await
	}

	pub async fn get_l1_batch_number(&self) -> Result<u64, ProviderError> {
		self.request_quantity("zks_L1BatchNumber", json!([])).await
	}

	pub async fn get_l1_batch_details(&self, number: u64) -> Result<Option<BatchDetails>, ProviderError> {
		self.request("zks_getL1BatchDetails", json!([number])).await
	}

	/// First and last L2 block of an L1 batch.
	pub async fn get_l1_batch_block_range(
		&self,
		number: u64,
	) -> Result<Option<(u64, u64)>, ProviderError> {
		const METHOD: &str = "zks_getL1BatchBlockRange";
		let range: Option<(Value, Value)> = self.request(METHOD, json!([number])).await?;
		range
			.map(|(first, last)| {
				let first = parse_quantity(&first).map_err(|e| ProviderError::invalid_response(METHOD, e))?;
				let last = parse_quantity(&last).map_err(|e| ProviderError::invalid_response(METHOD, e))?;
				Ok((first, last))
			})
			.transpose()
	}

	pub async fn get_block_details(&self, number: u64) -> Result<Option<BlockDetails>, ProviderError> {
		self.request("zks_getBlockDetails", json!([number])).await
	}

	pub async fn get_transaction_details(
		&self,
		hash: B256,
	) -> Result<Option<TransactionDetails>, ProviderError> {
		self.request("zks_getTransactionDetails", json!([hash])).await
	}

	pub async fn get_bytecode_by_hash(&self, hash: B256) -> Result<Option<Bytes>, ProviderError> {
		let bytecode: Option<Vec<u8>> = self.request("zks_getBytecodeByHash", json!([hash])).await?;
		Ok(bytecode.map(Bytes::from))
	}

	pub async fn get_raw_block_transactions(
		&self,
		number: u64,
	) -> Result<Vec<RawBlockTransaction>, ProviderError> {
		self.request("zks_getRawBlockTransactions", json!([number]))
			.await
	}

	pub async fn estimate_fee(&self, tx: &Transaction) -> Result<Fee, ProviderError> {
		self.request("zks_estimateFee", json!([transaction_request(tx)]))
			.await
	}

	/// Estimates the L2 gas of a transaction that is requested from L1.
	pub async fn estimate_gas_l1(&self, tx: &Transaction) -> Result<U256, ProviderError> {
		self.request("zks_estimateGasL1ToL2", json!([transaction_request(tx)]))
			.await
	}

	/// Proof that the L2->L1 log at `index` of `hash` was included in its batch.
	pub async fn get_log_proof(
		&self,
		hash: B256,
		index: Option<u64>,
	) -> Result<Option<MessageProof>, ProviderError> {
		self.request("zks_getL2ToL1LogProof", json!([hash, index]))
			.await
	}

	/// Balance of `address` in `token` (ETH when `None`).
	///
	/// A token contract that reverts on `balanceOf` reports a zero balance.
	pub async fn get_token_balance(
		&self,
		address: Address,
		token: Option<Address>,
		block: BlockTag,
	) -> Result<U256, ProviderError> {
		let token = match token {
			Some(token) if !is_eth(token) => token,
			_ => return self.get_balance(address, block).await,
		};
		let call = IERC20::balanceOfCall { _owner: address };
		match self.call_contract_at(token, &call, block).await {
			Ok(balance) => Ok(balance._0),
			Err(ProviderError::Rpc { message, .. }) => {
				tracing::debug!(token = %token, reason = %message, "balanceOf reverted");
				Ok(U256::ZERO)
			},
			Err(e) => Err(e),
		}
	}

	/// Asks the L2 WETH bridge for the L1 counterpart of `l2_token`.
	pub async fn probe_weth_l1_token(&self, bridges: &BridgeAddresses, l2_token: Address) -> BridgeProbe {
		if bridges.weth_l2.is_zero() {
			return BridgeProbe::NotFound;
		}
		let call = IL2Bridge::l1TokenAddressCall { _l2Token: l2_token };
		let answer = self.call_contract(bridges.weth_l2, &call).await.map(|r| r._0);
		log_probe(BridgeProbe::from_answer(answer), l2_token)
	}

	/// Asks the L2 WETH bridge for the L2 counterpart of `l1_token`.
	pub async fn probe_weth_l2_token(&self, bridges: &BridgeAddresses, l1_token: Address) -> BridgeProbe {
		if bridges.weth_l2.is_zero() {
			return BridgeProbe::NotFound;
		}
		let call = IL2Bridge::l2TokenAddressCall { _l1Token: l1_token };
		let answer = self.call_contract(bridges.weth_l2, &call).await.map(|r| r._0);
		log_probe(BridgeProbe::from_answer(answer), l1_token)
	}

	/// L1 address of an L2 token.
	pub async fn l1_token_address(&self, token: Address) -> Result<Address, ProviderError> {
		if token == ETH_ADDRESS {
			return Ok(ETH_ADDRESS);
		}
		let bridges = self.default_bridge_addresses().await?;
		if let Some(address) = self.probe_weth_l1_token(&bridges, token).await.address() {
			return Ok(address);
		}
		let call = IL2Bridge::l1TokenAddressCall { _l2Token: token };
		Ok(self.call_contract(bridges.erc20_l2, &call).await?._0)
	}

	/// L2 address of an L1 token.
	pub async fn l2_token_address(&self, token: Address) -> Result<Address, ProviderError> {
		if token == ETH_ADDRESS {
			return Ok(ETH_ADDRESS);
		}
		let bridges = self.default_bridge_addresses().await?;
		if let Some(address) = self.probe_weth_l2_token(&bridges, token).await.address() {
			return Ok(address);
		}
		let call = IL2Bridge::l2TokenAddressCall { _l1Token: token };
		Ok(self.call_contract(bridges.erc20_l2, &call).await?._0)
	}

	/// Account abstraction settings the contract deployer keeps for `address`.
	pub async fn get_contract_account_info(
		&self,
		address: Address,
	) -> Result<ContractAccountInfo, ProviderError> {
		let call = IContractDeployer::getAccountInfoCall { _address: address };
		let info = self.call_contract(CONTRACT_DEPLOYER_ADDRESS, &call).await?._0;
		Ok(ContractAccountInfo {
			supported_aa_version: info.supportedAAVersion.into(),
			nonce_ordering: info.nonceOrdering.into(),
		})
	}

	/// Builds the L2 transaction that withdraws `request.amount` to L1.
	///
	/// # Errors
	///
	/// Fails validation when neither `to` nor `from` is given, or when an ETH
	/// withdrawal carries a value different from the amount.
	pub async fn get_withdraw_tx(&self, request: &WithdrawRequest) -> Result<Transaction, ProviderError> {
		let to = request
			.to
			.or(request.from)
			.ok_or(ValidationError::MissingField("to"))?;
		let mut overrides = request.overrides.clone();
		overrides.from = overrides.from.or(request.from);

		if is_eth(request.token) {
			let value = match overrides.value {
				Some(value) if !value.is_zero() => value,
				_ => request.amount,
			};
			if value != request.amount {
				return Err(ValidationError::invalid("value", "must equal the withdrawn amount").into());
			}
			overrides.value = Some(value);
			let call = IEthToken::withdrawCall { _l1Receiver: to };
			return Ok(overrides.apply(Transaction::call(L2_ETH_TOKEN_ADDRESS, call.abi_encode())));
		}

		let bridge = match request.bridge_address {
			Some(bridge) => bridge,
			None => {
				let bridges = self.default_bridge_addresses().await?;
				if self.probe_weth_l1_token(&bridges, request.token).await.is_found() {
					bridges.weth_l2
				} else {
					bridges.erc20_l2
				}
			},
		};
		let call = IL2Bridge::withdrawCall {
			_l1Receiver: to,
			_l2Token: request.token,
			_amount: request.amount,
		};
		Ok(overrides.apply(Transaction::call(bridge, call.abi_encode())))
	}

	pub async fn estimate_gas_withdraw(&self, request: &WithdrawRequest) -> Result<U256, ProviderError> {
		let tx = self.get_withdraw_tx(request).await?;
		self.estimate_gas(&tx).await
	}

	/// Builds an L2 transfer of ETH or of an ERC-20 token.
	pub fn get_transfer_tx(&self, request: &TransferRequest) -> Transaction {
		let mut overrides = request.overrides.clone();
		overrides.from = overrides.from.or(request.from);

		match request.token {
			Some(token) if token != ETH_ADDRESS => {
				let call = IERC20::transferCall {
					_to: request.to,
					_amount: request.amount,
				};
				overrides.apply(Transaction::call(token, call.abi_encode()))
			},
			_ => {
				let mut tx = overrides.apply(Transaction::default());
				tx.to = Some(request.to);
				tx.value = request.amount;
				tx
			},
		}
	}

	pub async fn estimate_gas_transfer(&self, request: &TransferRequest) -> Result<U256, ProviderError> {
		self.estimate_gas(&self.get_transfer_tx(request)).await
	}

	/// Estimates the L2 gas limit of an execution requested from L1.
	pub async fn estimate_l1_to_l2_execute(
		&self,
		request: &L1ToL2ExecuteRequest,
	) -> Result<U256, ProviderError> {
		let custom_data = CustomData {
			gas_per_pubdata: Some(
				request
					.gas_per_pubdata
					.unwrap_or(U256::from(REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT)),
			),
			factory_deps: request.factory_deps.clone(),
			..Default::default()
		};
		// gas usage depends on the caller's storage slots
		let caller = request.caller.unwrap_or_else(Address::random);
		let mut tx = Transaction::eip712(custom_data)
			.with_from(caller)
			.with_value(request.l2_value);
		tx.to = Some(request.contract_address);
		tx.data = request.calldata.clone();
		self.estimate_gas_l1(&tx).await
	}

	/// Where an L2 transaction stands relative to L1 finalization.
	pub async fn get_transaction_status(&self, hash: B256) -> Result<TransactionStatus, ProviderError> {
		let Some(tx) = self.get_transaction(hash).await? else {
			return Ok(TransactionStatus::NotFound);
		};
		let Some(block_number) = tx.block_number else {
			return Ok(TransactionStatus::Processing);
		};
		let finalized = self.resolve_block_number(BlockTag::Finalized).await?;
		if block_number <= finalized {
			Ok(TransactionStatus::Finalized)
		} else {
			Ok(TransactionStatus::Committed)
		}
	}

	/// Submits a signed transaction after decoding it locally.
	///
	/// # Errors
	///
	/// Returns [`ProviderError::Protocol`] if the node reports a hash other
	/// than the one computed from `raw`.
	pub async fn broadcast_transaction(&self, raw: &Bytes) -> Result<PendingTransaction, ProviderError> {
		let local = parse_transaction(raw)?;
		let hash = self.send_raw_transaction(raw).await?;
		if let Some(expected) = local.hash {
			if expected != hash {
				return Err(ProviderError::Protocol(format!(
					"Node returned transaction hash {}, expected {}",
					hash, expected
				)));
			}
		}
		Ok(self.pending(hash))
	}

	/// L2 transaction created by the priority operation in `l1_receipt`.
	///
	/// Polls until the node knows about the transaction.
	pub async fn get_l2_transaction_from_priority_op(
		&self,
		l1_receipt: &TransactionReceipt,
	) -> Result<TransactionResponse, ProviderError> {
		let main_contract = self.main_contract_address().await?;
		let l2_hash = l2_hash_from_priority_op(l1_receipt, main_contract)?;
		tracing::debug!(
			l1_tx_hash = %l1_receipt.transaction_hash,
			l2_tx_hash = %l2_hash,
			"Waiting for priority operation"
		);

		self.polling()
			.poll("priority operation", || async move {
				let status = self.get_transaction_status(l2_hash).await?;
				Ok((status != TransactionStatus::NotFound).then_some(()))
			})
			.await?;
		self.get_transaction(l2_hash)
			.await?
			.ok_or_else(|| ProviderError::NotFound(format!("transaction {}", l2_hash)))
	}

	/// Wraps a submitted L1 transaction that enqueues a priority operation.
	pub fn get_priority_op_response(&self, l1: PendingTransaction) -> PriorityOpResponse {
		PriorityOpResponse::new(l1, self.clone())
	}
}

fn log_probe(probe: BridgeProbe, token: Address) -> BridgeProbe {
	if let BridgeProbe::Unknown(reason) = &probe {
		tracing::debug!(token = %token, reason = %reason, "WETH bridge probe failed");
	}
	probe
}

/// Hash of the L2 transaction announced by a `NewPriorityRequest` event of
/// `main_contract` in `receipt`.
pub fn l2_hash_from_priority_op(
	receipt: &TransactionReceipt,
	main_contract: Address,
) -> Result<B256, ProviderError> {
	receipt
		.logs
		.iter()
		.filter(|log| log.address == main_contract)
		.filter(|log| log.topics.first() == Some(&IZkSync::NewPriorityRequest::SIGNATURE_HASH))
		.filter_map(|log| {
			IZkSync::NewPriorityRequest::decode_raw_log(log.topics.iter().copied(), &log.data, true)
				.ok()
		})
		.last()
		.map(|event| event.txHash)
		.ok_or_else(|| {
			ProviderError::NotFound(format!(
				"priority operation in transaction {}",
				receipt.transaction_hash
			))
		})
}
