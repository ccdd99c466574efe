//! Values exchanged with the chain over JSON-RPC.
//!
//! Blocks, transactions, receipts and logs carry the rollup-specific fields
//! (`l1BatchNumber`, `l1BatchTxIndex`, `l2ToL1Logs`) next to the standard
//! ones, so every value parsed from a node response is already decorated.

use crate::transaction::FeeFields;
use crate::utils::quantity;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Block selector accepted by state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
	Number(u64),
	Hash(B256),
	/// Latest block sealed by the sequencer, not yet committed to L1.
	#[default]
	Latest,
	/// Latest block whose batch has been committed to L1.
	Committed,
	/// Latest block whose batch has been executed on L1.
	Finalized,
	Earliest,
	Pending,
}

impl fmt::Display for BlockTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BlockTag::Number(n) => write!(f, "{:#x}", n),
			BlockTag::Hash(h) => write!(f, "{}", h),
			BlockTag::Latest => write!(f, "latest"),
			BlockTag::Committed => write!(f, "committed"),
			BlockTag::Finalized => write!(f, "finalized"),
			BlockTag::Earliest => write!(f, "earliest"),
			BlockTag::Pending => write!(f, "pending"),
		}
	}
}

/// Hashes serialize as the EIP-1898 `{"blockHash": ...}` object, everything
/// else as a quantity or tag string.
impl Serialize for BlockTag {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			BlockTag::Hash(hash) => {
				let mut map = serializer.serialize_map(Some(1))?;
				map.serialize_entry("blockHash", hash)?;
				map.end()
			},
			tag => serializer.serialize_str(&tag.to_string()),
		}
	}
}

/// Low-level L2->L1 log as recorded by the bootloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2ToL1Log {
	#[serde(default, with = "quantity::opt")]
	pub block_number: Option<u64>,
	#[serde(default)]
	pub block_hash: Option<B256>,
	#[serde(default, with = "quantity::opt")]
	pub l1_batch_number: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub transaction_index: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub shard_id: Option<u64>,
	#[serde(default)]
	pub is_service: bool,
	pub sender: Address,
	pub key: B256,
	pub value: B256,
	#[serde(default)]
	pub transaction_hash: Option<B256>,
	#[serde(default, with = "quantity::opt")]
	pub log_index: Option<u64>,
}

/// Event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
	#[serde(default)]
	pub block_hash: Option<B256>,
	#[serde(default, with = "quantity::opt")]
	pub block_number: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub l1_batch_number: Option<u64>,
	#[serde(default)]
	pub transaction_hash: Option<B256>,
	#[serde(default, with = "quantity::opt")]
	pub transaction_index: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub log_index: Option<u64>,
	#[serde(default)]
	pub removed: bool,
}

/// Receipt of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
	pub transaction_hash: B256,
	#[serde(default, with = "quantity::opt")]
	pub transaction_index: Option<u64>,
	#[serde(default)]
	pub block_hash: Option<B256>,
	#[serde(default, with = "quantity::opt")]
	pub block_number: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub l1_batch_number: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub l1_batch_tx_index: Option<u64>,
	pub from: Address,
	#[serde(default)]
	pub to: Option<Address>,
	#[serde(default)]
	pub contract_address: Option<Address>,
	#[serde(default)]
	pub gas_used: Option<U256>,
	#[serde(default)]
	pub effective_gas_price: Option<U256>,
	#[serde(default, with = "quantity::opt")]
	pub status: Option<u64>,
	#[serde(default)]
	pub logs: Vec<Log>,
	#[serde(default)]
	pub l2_to_l1_logs: Vec<L2ToL1Log>,
}

impl TransactionReceipt {
	/// Returns true if the transaction executed without reverting.
	pub fn is_success(&self) -> bool {
		self.status == Some(1)
	}
}

/// Transaction as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
	pub hash: B256,
	#[serde(default, with = "quantity::opt")]
	pub nonce: Option<u64>,
	#[serde(default)]
	pub block_hash: Option<B256>,
	#[serde(default, with = "quantity::opt")]
	pub block_number: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub transaction_index: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub l1_batch_number: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub l1_batch_tx_index: Option<u64>,
	pub from: Address,
	#[serde(default)]
	pub to: Option<Address>,
	#[serde(default)]
	pub value: U256,
	#[serde(default)]
	pub gas_price: Option<U256>,
	#[serde(default)]
	pub max_fee_per_gas: Option<U256>,
	#[serde(default)]
	pub max_priority_fee_per_gas: Option<U256>,
	#[serde(default)]
	pub gas: U256,
	#[serde(default)]
	pub input: Bytes,
	#[serde(default, with = "quantity::opt")]
	pub chain_id: Option<u64>,
	#[serde(default, rename = "type", with = "quantity::opt")]
	pub transaction_type: Option<u64>,
}

/// Transactions of a block, as hashes or full objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
	Hashes(Vec<B256>),
	Full(Vec<TransactionResponse>),
}

impl Default for BlockTransactions {
	fn default() -> Self {
		BlockTransactions::Hashes(Vec::new())
	}
}

/// Block header plus its transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
	#[serde(default, with = "quantity::opt")]
	pub number: Option<u64>,
	#[serde(default)]
	pub hash: Option<B256>,
	#[serde(default)]
	pub parent_hash: B256,
	#[serde(default, with = "quantity::opt")]
	pub timestamp: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub l1_batch_number: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub l1_batch_timestamp: Option<u64>,
	#[serde(default)]
	pub base_fee_per_gas: Option<U256>,
	#[serde(default)]
	pub gas_limit: U256,
	#[serde(default)]
	pub gas_used: U256,
	#[serde(default)]
	pub transactions: BlockTransactions,
}

/// Log filter for `eth_getLogs` and `eth_newFilter`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub from_block: Option<BlockTag>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to_block: Option<BlockTag>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub block_hash: Option<B256>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub address: Vec<Address>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub topics: Vec<Option<Vec<B256>>>,
}

/// What an installed filter reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
	/// Installed by `eth_newFilter`.
	Logs,
	/// Installed by `eth_newBlockFilter`.
	Blocks,
	/// Installed by `eth_newPendingTransactionFilter`.
	PendingTransactions,
}

/// Id of an installed filter, remembering the kind it was created as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterId {
	pub id: U256,
	pub kind: FilterKind,
}

impl FilterId {
	pub fn new(id: U256, kind: FilterKind) -> Self {
		Self { id, kind }
	}
}

/// Result of `eth_getFilterChanges`: hashes for block and pending filters,
/// logs for log filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChanges {
	Hashes(Vec<B256>),
	Logs(Vec<Log>),
}

impl FilterChanges {
	/// Decodes a raw `eth_getFilterChanges` result for a filter of `kind`.
	pub fn from_value(kind: FilterKind, value: Value) -> serde_json::Result<Self> {
		match kind {
			FilterKind::Logs => serde_json::from_value(value).map(FilterChanges::Logs),
			FilterKind::Blocks | FilterKind::PendingTransactions => {
				serde_json::from_value(value).map(FilterChanges::Hashes)
			},
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			FilterChanges::Hashes(hashes) => hashes.is_empty(),
			FilterChanges::Logs(logs) => logs.is_empty(),
		}
	}
}

/// Inclusion proof of an L2->L1 log in its batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageProof {
	/// Index of the log within the batch's L2->L1 log tree.
	#[serde(with = "quantity")]
	pub id: u64,
	/// Sibling hashes from the leaf to the root.
	pub proof: Vec<B256>,
	pub root: B256,
}

/// Default bridge contracts on both layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeAddresses {
	#[serde(rename = "l1Erc20DefaultBridge")]
	pub erc20_l1: Address,
	#[serde(rename = "l2Erc20DefaultBridge")]
	pub erc20_l2: Address,
	#[serde(rename = "l1WethBridge", default)]
	pub weth_l1: Address,
	#[serde(rename = "l2WethBridge", default)]
	pub weth_l2: Address,
}

/// Quote for everything a deposit costs on L1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullDepositFee {
	/// Value paid to the main contract for L2 execution.
	pub base_cost: U256,
	pub l1_gas_limit: U256,
	pub l2_gas_limit: U256,
	/// L1 fees the quote was computed with.
	pub fees: FeeFields,
}

/// Token bridged through the default bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
	pub l1_address: Address,
	pub l2_address: Address,
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
}

/// Fee estimate returned by `zks_estimateFee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
	#[serde(alias = "gasLimit")]
	pub gas_limit: U256,
	#[serde(alias = "gasPerPubdataLimit")]
	pub gas_per_pubdata_limit: U256,
	#[serde(alias = "maxPriorityFeePerGas")]
	pub max_priority_fee_per_gas: U256,
	#[serde(alias = "maxFeePerGas")]
	pub max_fee_per_gas: U256,
}

/// Batch information from `zks_getL1BatchDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDetails {
	#[serde(with = "quantity")]
	pub number: u64,
	#[serde(with = "quantity")]
	pub timestamp: u64,
	#[serde(with = "quantity")]
	pub l1_tx_count: u64,
	#[serde(with = "quantity")]
	pub l2_tx_count: u64,
	#[serde(default)]
	pub root_hash: Option<B256>,
	pub status: String,
	#[serde(default)]
	pub commit_tx_hash: Option<B256>,
	#[serde(default)]
	pub committed_at: Option<String>,
	#[serde(default)]
	pub prove_tx_hash: Option<B256>,
	#[serde(default)]
	pub proven_at: Option<String>,
	#[serde(default)]
	pub execute_tx_hash: Option<B256>,
	#[serde(default)]
	pub executed_at: Option<String>,
	#[serde(default, with = "quantity::opt")]
	pub l1_gas_price: Option<u64>,
	#[serde(default, with = "quantity::opt")]
	pub l2_fair_gas_price: Option<u64>,
}

/// Block information from `zks_getBlockDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetails {
	#[serde(with = "quantity")]
	pub number: u64,
	#[serde(with = "quantity")]
	pub timestamp: u64,
	#[serde(with = "quantity")]
	pub l1_batch_number: u64,
	#[serde(with = "quantity")]
	pub l1_tx_count: u64,
	#[serde(with = "quantity")]
	pub l2_tx_count: u64,
	#[serde(default)]
	pub root_hash: Option<B256>,
	pub status: String,
	#[serde(default)]
	pub commit_tx_hash: Option<B256>,
	#[serde(default)]
	pub committed_at: Option<String>,
	#[serde(default)]
	pub prove_tx_hash: Option<B256>,
	#[serde(default)]
	pub proven_at: Option<String>,
	#[serde(default)]
	pub execute_tx_hash: Option<B256>,
	#[serde(default)]
	pub executed_at: Option<String>,
}

/// Transaction information from `zks_getTransactionDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
	pub is_l1_originated: bool,
	pub status: String,
	pub fee: U256,
	pub initiator_address: Address,
	pub received_at: String,
	#[serde(default)]
	pub eth_commit_tx_hash: Option<B256>,
	#[serde(default)]
	pub eth_prove_tx_hash: Option<B256>,
	#[serde(default)]
	pub eth_execute_tx_hash: Option<B256>,
}

/// Execution part of a raw block transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExecute {
	pub calldata: Bytes,
	pub contract_address: Address,
	#[serde(default)]
	pub factory_deps: Option<Vec<Bytes>>,
	pub value: U256,
}

/// Transaction as stored by the sequencer, from `zks_getRawBlockTransactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlockTransaction {
	/// Origin-specific data (`L1`, `L2` or protocol upgrade), kept verbatim.
	pub common_data: Value,
	pub execute: RawExecute,
	#[serde(with = "quantity")]
	pub received_timestamp_ms: u64,
	#[serde(default)]
	pub raw_bytes: Option<Bytes>,
}

/// Inclusion status of an L2 transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
	NotFound,
	Processing,
	Committed,
	Finalized,
}

/// Account abstraction version of a deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountAbstractionVersion {
	None = 0,
	Version1 = 1,
}

impl From<u8> for AccountAbstractionVersion {
	fn from(value: u8) -> Self {
		match value {
			1 => AccountAbstractionVersion::Version1,
			_ => AccountAbstractionVersion::None,
		}
	}
}

/// Nonce ordering an account has opted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountNonceOrdering {
	Sequential = 0,
	Arbitrary = 1,
}

impl From<u8> for AccountNonceOrdering {
	fn from(value: u8) -> Self {
		match value {
			1 => AccountNonceOrdering::Arbitrary,
			_ => AccountNonceOrdering::Sequential,
		}
	}
}

/// Account information kept by the contract deployer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAccountInfo {
	pub supported_aa_version: AccountAbstractionVersion,
	pub nonce_ordering: AccountNonceOrdering,
}

/// One `ContractDeployed` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentInfo {
	pub sender: Address,
	pub bytecode_hash: B256,
	pub deployed_address: Address,
}

/// Token address to balance.
pub type BalancesMap = HashMap<Address, U256>;
