//! Standard Ethereum JSON-RPC methods, shared by both layers.

use crate::pending::PendingTransaction;
use crate::polling::PollingConfig;
use crate::request::transaction_request;
use crate::transport::{HttpTransport, Transport};
use crate::ProviderError;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use zks_types::utils::quantity::parse_quantity;
use zks_types::{
	Block, BlockTag, Filter, FilterChanges, FilterId, FilterKind, Log, Transaction, TransactionReceipt,
	TransactionResponse,
};

/// Priority fee suggested when the chain supports fee-market transactions.
const DEFAULT_PRIORITY_FEE: u64 = 1_500_000_000;

/// Fee values suggested for a new transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
	pub gas_price: Option<U256>,
	pub last_base_fee_per_gas: Option<U256>,
	pub max_fee_per_gas: Option<U256>,
	pub max_priority_fee_per_gas: Option<U256>,
}

impl FeeData {
	/// True when the latest block reports a base fee.
	pub fn supports_eip1559(&self) -> bool {
		self.max_fee_per_gas.is_some() && self.max_priority_fee_per_gas.is_some()
	}
}

/// Client for the standard `eth_*` namespace.
#[derive(Clone)]
pub struct EthClient {
	transport: Arc<dyn Transport>,
	polling: PollingConfig,
}

impl std::fmt::Debug for EthClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EthClient")
			.field("polling", &self.polling)
			.finish_non_exhaustive()
	}
}

impl EthClient {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self {
			transport,
			polling: PollingConfig::default(),
		}
	}

	/// Connects over HTTP to `url`.
	pub fn http(url: &str) -> Result<Self, ProviderError> {
		Ok(Self::new(Arc::new(HttpTransport::new(url)?)))
	}

	pub fn with_polling(mut self, polling: PollingConfig) -> Self {
		self.polling = polling;
		self
	}

	pub fn polling(&self) -> &PollingConfig {
		&self.polling
	}

	/// Sends an arbitrary request and returns the raw result.
	pub async fn send(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
		self.transport.request(method, params).await
	}

	/// Sends a request and decodes its result into `T`.
	pub async fn request<T: DeserializeOwned>(
		&self,
		method: &str,
		params: Value,
	) -> Result<T, ProviderError> {
		let value = self.send(method, params).await?;
		serde_json::from_value(value).map_err(|e| ProviderError::invalid_response(method, e))
	}

	pub(crate) async fn request_quantity(
		&self,
		method: &str,
		params: Value,
	) -> Result<u64, ProviderError> {
		let value = self.send(method, params).await?;
		parse_quantity(&value).map_err(|e| ProviderError::invalid_response(method, e))
	}

	pub async fn chain_id(&self) -> Result<u64, ProviderError> {
		self.request_quantity("eth_chainId", json!([])).await
	}

	pub async fn block_number(&self) -> Result<u64, ProviderError> {
		self.request_quantity("eth_blockNumber", json!([])).await
	}

	pub async fn gas_price(&self) -> Result<U256, ProviderError> {
		self.request("eth_gasPrice", json!([])).await
	}

	/// Suggested fees: the current gas price plus fee-market values when
	/// the latest block has a base fee (`2 * base + priority`).
	pub async fn get_fee_data(&self) -> Result<FeeData, ProviderError> {
		let block = self.get_block(BlockTag::Latest, false).await?;
		let gas_price = self.gas_price().await?;

		let mut fee_data = FeeData {
			gas_price: Some(gas_price),
			..Default::default()
		};
		if let Some(base_fee) = block.and_then(|b| b.base_fee_per_gas) {
			let priority = U256::from(DEFAULT_PRIORITY_FEE);
			fee_data.last_base_fee_per_gas = Some(base_fee);
			fee_data.max_priority_fee_per_gas = Some(priority);
			fee_data.max_fee_per_gas = Some(base_fee * U256::from(2) + priority);
		}
		Ok(fee_data)
	}

	pub async fn get_balance(&self, address: Address, block: BlockTag) -> Result<U256, ProviderError> {
		self.request("eth_getBalance", json!([address, block])).await
	}

	pub async fn get_transaction_count(
		&self,
		address: Address,
		block: BlockTag,
	) -> Result<u64, ProviderError> {
		self.request_quantity("eth_getTransactionCount", json!([address, block]))
			.await
	}

	pub async fn get_code(&self, address: Address, block: BlockTag) -> Result<Bytes, ProviderError> {
		self.request("eth_getCode", json!([address, block])).await
	}

	/// Executes `tx` without creating a transaction.
	pub async fn call(&self, tx: &Transaction, block: BlockTag) -> Result<Bytes, ProviderError> {
		self.request("eth_call", json!([transaction_request(tx), block]))
			.await
	}

	/// Calls a contract function at the latest block and decodes its return.
	pub async fn call_contract<C: SolCall>(
		&self,
		to: Address,
		call: &C,
	) -> Result<C::Return, ProviderError> {
		self.call_contract_at(to, call, BlockTag::Latest).await
	}

	pub async fn call_contract_at<C: SolCall>(
		&self,
		to: Address,
		call: &C,
		block: BlockTag,
	) -> Result<C::Return, ProviderError> {
		let tx = Transaction::call(to, call.abi_encode());
		let output = self.call(&tx, block).await?;
		C::abi_decode_returns(&output, true)
			.map_err(|e| ProviderError::invalid_response(C::SIGNATURE, e))
	}

	pub async fn estimate_gas(&self, tx: &Transaction) -> Result<U256, ProviderError> {
		self.request("eth_estimateGas", json!([transaction_request(tx)]))
			.await
	}

	/// Submits a signed transaction and returns its hash.
	pub async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, ProviderError> {
		let hash: B256 = self.request("eth_sendRawTransaction", json!([raw])).await?;
		tracing::info!(tx_hash = %hash, "Submitted transaction");
		Ok(hash)
	}

	pub async fn get_transaction(&self, hash: B256) -> Result<Option<TransactionResponse>, ProviderError> {
		self.request("eth_getTransactionByHash", json!([hash])).await
	}

	pub async fn get_transaction_receipt(
		&self,
		hash: B256,
	) -> Result<Option<TransactionReceipt>, ProviderError> {
		self.request("eth_getTransactionReceipt", json!([hash])).await
	}

	/// Polls until `hash` has a receipt with a block number, whatever its
	/// execution status.
	pub async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, ProviderError> {
		self.polling
			.poll("transaction receipt", || async move {
				let receipt = self.get_transaction_receipt(hash).await?;
				Ok(receipt.filter(|r| r.block_number.is_some()))
			})
			.await
	}

	pub async fn get_block(&self, block: BlockTag, full: bool) -> Result<Option<Block>, ProviderError> {
		match block {
			BlockTag::Hash(hash) => self.request("eth_getBlockByHash", json!([hash, full])).await,
			tag => self.request("eth_getBlockByNumber", json!([tag, full])).await,
		}
	}

	/// Number of the block `tag` currently resolves to.
	pub async fn resolve_block_number(&self, tag: BlockTag) -> Result<u64, ProviderError> {
		self.get_block(tag, false)
			.await?
			.and_then(|block| block.number)
			.ok_or_else(|| ProviderError::NotFound(format!("block {}", tag)))
	}

	pub async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, ProviderError> {
		self.request("eth_getLogs", json!([filter])).await
	}

	/// Installs a log filter and returns its id.
	pub async fn new_filter(&self, filter: &Filter) -> Result<FilterId, ProviderError> {
		let id = self.request("eth_newFilter", json!([filter])).await?;
		Ok(FilterId::new(id, FilterKind::Logs))
	}

	pub async fn new_block_filter(&self) -> Result<FilterId, ProviderError> {
		let id = self.request("eth_newBlockFilter", json!([])).await?;
		Ok(FilterId::new(id, FilterKind::Blocks))
	}

	pub async fn new_pending_transactions_filter(&self) -> Result<FilterId, ProviderError> {
		let id = self.request("eth_newPendingTransactionFilter", json!([])).await?;
		Ok(FilterId::new(id, FilterKind::PendingTransactions))
	}

	/// Changes since the last poll, decoded as logs or hashes according to
	/// the kind `filter` was installed as.
	pub async fn get_filter_changes(&self, filter: &FilterId) -> Result<FilterChanges, ProviderError> {
		let value = self.send("eth_getFilterChanges", json!([filter.id])).await?;
		FilterChanges::from_value(filter.kind, value)
			.map_err(|e| ProviderError::invalid_response("eth_getFilterChanges", e))
	}

	pub async fn uninstall_filter(&self, filter: &FilterId) -> Result<bool, ProviderError> {
		self.request("eth_uninstallFilter", json!([filter.id])).await
	}

	/// Handle for a submitted transaction on this client's chain.
	pub fn pending(&self, hash: B256) -> PendingTransaction {
		PendingTransaction::new(hash, self.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::MockTransport;
	use alloy_primitives::address;
	use zks_types::abi::IERC20;

	fn client(mock: &MockTransport) -> EthClient {
		EthClient::new(Arc::new(mock.clone()))
	}

	fn block_json(number: u64, base_fee: Option<&str>) -> Value {
		let mut block = json!({
			"number": format!("{:#x}", number),
			"hash": B256::repeat_byte(0x01),
			"parentHash": B256::ZERO,
			"timestamp": "0x1",
			"gasLimit": "0x1c9c380",
			"gasUsed": "0x0",
			"transactions": [],
		});
		if let Some(base_fee) = base_fee {
			block["baseFeePerGas"] = json!(base_fee);
		}
		block
	}

	#[tokio::test]
	async fn test_fee_data_with_base_fee() {
		let mock = MockTransport::new();
		mock.respond("eth_getBlockByNumber", block_json(10, Some("0x64")))
			.respond("eth_gasPrice", json!("0x3b9aca00"));
		let fees = client(&mock).get_fee_data().await.unwrap();
		assert!(fees.supports_eip1559());
		assert_eq!(fees.last_base_fee_per_gas, Some(U256::from(100)));
		assert_eq!(fees.max_fee_per_gas, Some(U256::from(200 + DEFAULT_PRIORITY_FEE)));
		assert_eq!(fees.gas_price, Some(U256::from(1_000_000_000u64)));
	}

	#[tokio::test]
	async fn test_fee_data_without_base_fee() {
		let mock = MockTransport::new();
		mock.respond("eth_getBlockByNumber", block_json(10, None))
			.respond("eth_gasPrice", json!("0x64"));
		let fees = client(&mock).get_fee_data().await.unwrap();
		assert!(!fees.supports_eip1559());
		assert_eq!(fees.gas_price, Some(U256::from(100)));
	}

	#[tokio::test]
	async fn test_call_contract_decodes_return() {
		let mock = MockTransport::new();
		let token = address!("5C221E77624690fff6dd741493D735a17716c26B");
		let selector = IERC20::balanceOfCall::SELECTOR;
		mock.on_call(token, selector, |_| {
			Ok(Bytes::from(U256::from(42).to_be_bytes::<32>().to_vec()))
		});
		let balance = client(&mock)
			.call_contract(token, &IERC20::balanceOfCall {
				_owner: Address::repeat_byte(0x01),
			})
			.await
			.unwrap();
		assert_eq!(balance._0, U256::from(42));
	}

	#[tokio::test]
	async fn test_quantities_and_missing_values() {
		let mock = MockTransport::new();
		mock.respond("eth_chainId", json!("0x5"))
			.respond("eth_getTransactionReceipt", Value::Null)
			.respond("eth_getBlockByNumber", block_json(77, None));
		let client = client(&mock);
		assert_eq!(client.chain_id().await.unwrap(), 5);
		assert!(client
			.get_transaction_receipt(B256::ZERO)
			.await
			.unwrap()
			.is_none());
		assert_eq!(
			client.resolve_block_number(BlockTag::Finalized).await.unwrap(),
			77
		);
		assert_eq!(
			mock.requests_to("eth_getBlockByNumber")[0],
			json!(["finalized", false])
		);
	}

	#[tokio::test]
	async fn test_empty_log_filter_poll() {
		let mock = MockTransport::new();
		mock.respond("eth_newFilter", json!("0x1f"))
			.respond("eth_getFilterChanges", json!([]))
			.respond("eth_uninstallFilter", json!(true));
		let client = client(&mock);
		let filter = client
			.new_filter(&Filter {
				address: vec![Address::repeat_byte(0x11)],
				..Default::default()
			})
			.await
			.unwrap();
		assert_eq!(filter.kind, FilterKind::Logs);

		let changes = client.get_filter_changes(&filter).await.unwrap();
		assert_eq!(changes, FilterChanges::Logs(vec![]));
		assert_eq!(mock.requests_to("eth_getFilterChanges")[0], json!(["0x1f"]));
		assert!(client.uninstall_filter(&filter).await.unwrap());
	}

	#[tokio::test]
	async fn test_block_filter_poll_yields_hashes() {
		let mock = MockTransport::new();
		mock.respond("eth_newBlockFilter", json!("0x2"))
			.respond("eth_getFilterChanges", json!([B256::repeat_byte(0x01)]));
		let client = client(&mock);
		let filter = client.new_block_filter().await.unwrap();
		assert_eq!(
			client.get_filter_changes(&filter).await.unwrap(),
			FilterChanges::Hashes(vec![B256::repeat_byte(0x01)])
		);
	}

	#[tokio::test]
	async fn test_state_queries_by_block_hash() {
		let mock = MockTransport::new();
		mock.respond("eth_getBalance", json!("0x10"))
			.respond("eth_getCode", json!("0x"));
		let client = client(&mock);
		let owner = Address::repeat_byte(0x01);
		let hash = B256::repeat_byte(0xcd);

		assert_eq!(client.get_balance(owner, BlockTag::Hash(hash)).await.unwrap(), U256::from(16));
		client.get_code(owner, BlockTag::Hash(hash)).await.unwrap();
		assert_eq!(
			mock.requests_to("eth_getBalance")[0],
			json!([owner, { "blockHash": hash }])
		);
		assert_eq!(mock.requests_to("eth_getCode")[0][1], json!({ "blockHash": hash }));
	}
}
