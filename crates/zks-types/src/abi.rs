//! Contract interfaces used by the client and a lookup registry over them.
//!
//! Interfaces are declared once with `sol!`. The registry exposes their
//! function selectors and event topics by name; it is built lazily on first
//! use and never mutated afterwards.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent, SolValue};
use std::collections::HashMap;
use std::sync::LazyLock;

sol! {
	/// Canonical form of an L1->L2 transaction as emitted by the main contract.
	#[derive(Debug, PartialEq, Eq)]
	struct L2CanonicalTransaction {
		uint256 txType;
		uint256 from;
		uint256 to;
		uint256 gasLimit;
		uint256 gasPerPubdataByteLimit;
		uint256 maxFeePerGas;
		uint256 maxPriorityFeePerGas;
		uint256 paymaster;
		uint256 nonce;
		uint256 value;
		uint256[4] reserved;
		bytes data;
		bytes signature;
		uint256[] factoryDeps;
		bytes paymasterInput;
		bytes reservedDynamic;
	}

	/// Main rollup contract on L1 (mailbox facet).
	interface IZkSync {
		function l2TransactionBaseCost(uint256 _gasPrice, uint256 _l2GasLimit, uint256 _l2GasPerPubdataByteLimit) external view returns (uint256);
		function requestL2Transaction(address _contractL2, uint256 _l2Value, bytes _calldata, uint256 _l2GasLimit, uint256 _l2GasPerPubdataByteLimit, bytes[] _factoryDeps, address _refundRecipient) external payable returns (bytes32);
		function finalizeEthWithdrawal(uint256 _l2BatchNumber, uint256 _l2MessageIndex, uint16 _l2TxNumberInBatch, bytes _message, bytes32[] _merkleProof) external;
		function isEthWithdrawalFinalized(uint256 _l2BatchNumber, uint256 _l2MessageIndex) external view returns (bool);

		event NewPriorityRequest(uint256 txId, bytes32 txHash, uint64 expirationTimestamp, L2CanonicalTransaction transaction, bytes[] factoryDeps);
	}

	/// L1 side of a token bridge.
	interface IL1Bridge {
		function deposit(address _l2Receiver, address _l1Token, uint256 _amount, uint256 _l2TxGasLimit, uint256 _l2TxGasPerPubdataByte, address _refundRecipient) external payable returns (bytes32);
		function claimFailedDeposit(address _depositSender, address _l1Token, bytes32 _l2TxHash, uint256 _l2BatchNumber, uint256 _l2MessageIndex, uint16 _l2TxNumberInBatch, bytes32[] _merkleProof) external;
		function finalizeWithdrawal(uint256 _l2BatchNumber, uint256 _l2MessageIndex, uint16 _l2TxNumberInBatch, bytes _message, bytes32[] _merkleProof) external;
		function isWithdrawalFinalized(uint256 _l2BatchNumber, uint256 _l2MessageIndex) external view returns (bool);
		function l2TokenAddress(address _l1Token) external view returns (address);
		function l2Bridge() external view returns (address);
	}

	/// L2 side of a token bridge.
	interface IL2Bridge {
		function finalizeDeposit(address _l1Sender, address _l2Receiver, address _l1Token, uint256 _amount, bytes _data) external payable;
		function withdraw(address _l1Receiver, address _l2Token, uint256 _amount) external;
		function l1TokenAddress(address _l2Token) external view returns (address);
		function l2TokenAddress(address _l1Token) external view returns (address);
		function l1Bridge() external view returns (address);
	}

	/// Subset of ERC-20 used by deposits, transfers and balance queries.
	interface IERC20 {
		function balanceOf(address _owner) external view returns (uint256);
		function allowance(address _owner, address _spender) external view returns (uint256);
		function approve(address _spender, uint256 _amount) external returns (bool);
		function transfer(address _to, uint256 _amount) external returns (bool);
		function name() external view returns (string);
		function symbol() external view returns (string);
		function decimals() external view returns (uint8);
	}

	/// EIP-1271 contract signature check.
	interface IERC1271 {
		function isValidSignature(bytes32 _hash, bytes _signature) external view returns (bytes4);
	}

	/// L2 native asset system contract.
	interface IEthToken {
		function withdraw(address _l1Receiver) external payable;
	}

	/// L1 messenger system contract.
	interface IL1Messenger {
		event L1MessageSent(address indexed _sender, bytes32 indexed _hash, bytes _message);
	}

	/// Contract deployer system contract.
	interface IContractDeployer {
		struct AccountInfo {
			uint8 supportedAAVersion;
			uint8 nonceOrdering;
		}

		function create(bytes32 _salt, bytes32 _bytecodeHash, bytes _input) external payable returns (address);
		function create2(bytes32 _salt, bytes32 _bytecodeHash, bytes _input) external payable returns (address);
		function createAccount(bytes32 _salt, bytes32 _bytecodeHash, bytes _input, uint8 _aaVersion) external payable returns (address);
		function create2Account(bytes32 _salt, bytes32 _bytecodeHash, bytes _input, uint8 _aaVersion) external payable returns (address);
		function getAccountInfo(address _address) external view returns (AccountInfo);

		event ContractDeployed(address indexed deployerAddress, bytes32 indexed bytecodeHash, address indexed contractAddress);
	}

	/// Nonce holder system contract.
	interface INonceHolder {
		function getDeploymentNonce(address _address) external view returns (uint256);
		function getMinNonce(address _address) external view returns (uint256);
	}

	/// Calldata layouts understood by paymasters.
	interface IPaymasterFlow {
		function general(bytes input) external;
		function approvalBased(address _token, uint256 _minAllowance, bytes _innerInput) external;
	}
}

/// Decoded schema of one contract interface.
#[derive(Debug, Clone, Default)]
pub struct InterfaceSchema {
	/// Interface name, e.g. `IL1Bridge`.
	pub name: &'static str,
	/// Function name to 4-byte selector.
	pub functions: HashMap<&'static str, [u8; 4]>,
	/// Function name to canonical signature.
	pub function_signatures: HashMap<&'static str, &'static str>,
	/// Event name to topic0.
	pub events: HashMap<&'static str, B256>,
}

fn signature_name(signature: &'static str) -> &'static str {
	signature.split('(').next().unwrap_or(signature)
}

macro_rules! interface_schema {
	($name:literal, calls: [$($call:ty),* $(,)?], events: [$($event:ty),* $(,)?]) => {{
		let mut schema = InterfaceSchema {
			name: $name,
			..Default::default()
		};
		$(
			schema.functions.insert(signature_name(<$call>::SIGNATURE), <$call>::SELECTOR);
			schema
				.function_signatures
				.insert(signature_name(<$call>::SIGNATURE), <$call>::SIGNATURE);
		)*
		$(
			schema.events.insert(signature_name(<$event>::SIGNATURE), <$event>::SIGNATURE_HASH);
		)*
		schema
	}};
}

static REGISTRY: LazyLock<HashMap<&'static str, InterfaceSchema>> = LazyLock::new(|| {
	let schemas = vec![
		interface_schema!("IZkSync",
			calls: [
				IZkSync::l2TransactionBaseCostCall,
				IZkSync::requestL2TransactionCall,
				IZkSync::finalizeEthWithdrawalCall,
				IZkSync::isEthWithdrawalFinalizedCall,
			],
			events: [IZkSync::NewPriorityRequest]
		),
		interface_schema!("IL1Bridge",
			calls: [
				IL1Bridge::depositCall,
				IL1Bridge::claimFailedDepositCall,
				IL1Bridge::finalizeWithdrawalCall,
				IL1Bridge::isWithdrawalFinalizedCall,
				IL1Bridge::l2TokenAddressCall,
				IL1Bridge::l2BridgeCall,
			],
			events: []
		),
		interface_schema!("IL2Bridge",
			calls: [
				IL2Bridge::finalizeDepositCall,
				IL2Bridge::withdrawCall,
				IL2Bridge::l1TokenAddressCall,
				IL2Bridge::l2TokenAddressCall,
				IL2Bridge::l1BridgeCall,
			],
			events: []
		),
		interface_schema!("IERC20",
			calls: [
				IERC20::balanceOfCall,
				IERC20::allowanceCall,
				IERC20::approveCall,
				IERC20::transferCall,
				IERC20::nameCall,
				IERC20::symbolCall,
				IERC20::decimalsCall,
			],
			events: []
		),
		interface_schema!("IERC1271", calls: [IERC1271::isValidSignatureCall], events: []),
		interface_schema!("IEthToken", calls: [IEthToken::withdrawCall], events: []),
		interface_schema!("IL1Messenger", calls: [], events: [IL1Messenger::L1MessageSent]),
		interface_schema!("IContractDeployer",
			calls: [
				IContractDeployer::createCall,
				IContractDeployer::create2Call,
				IContractDeployer::createAccountCall,
				IContractDeployer::create2AccountCall,
				IContractDeployer::getAccountInfoCall,
			],
			events: [IContractDeployer::ContractDeployed]
		),
		interface_schema!("INonceHolder",
			calls: [INonceHolder::getDeploymentNonceCall, INonceHolder::getMinNonceCall],
			events: []
		),
		interface_schema!("IPaymasterFlow",
			calls: [IPaymasterFlow::generalCall, IPaymasterFlow::approvalBasedCall],
			events: []
		),
	];

	schemas.into_iter().map(|s| (s.name, s)).collect()
});

/// Looks up an interface schema by name.
pub fn interface(name: &str) -> Option<&'static InterfaceSchema> {
	REGISTRY.get(name)
}

/// Looks up the selector of `function` in interface `iface`.
pub fn function_selector(iface: &str, function: &str) -> Option<[u8; 4]> {
	interface(iface)?.functions.get(function).copied()
}

/// Looks up the topic0 of `event` in interface `iface`.
pub fn event_topic(iface: &str, event: &str) -> Option<B256> {
	interface(iface)?.events.get(event).copied()
}

/// Topic of `L1MessageSent(address,bytes32,bytes)`.
pub fn l1_message_sent_topic() -> B256 {
	event_topic("IL1Messenger", "L1MessageSent").unwrap_or(IL1Messenger::L1MessageSent::SIGNATURE_HASH)
}

/// Topic of `ContractDeployed(address,bytes32,address)`.
pub fn contract_deployed_topic() -> B256 {
	event_topic("IContractDeployer", "ContractDeployed")
		.unwrap_or(IContractDeployer::ContractDeployed::SIGNATURE_HASH)
}

/// Topic of the priority queue event emitted by the main contract.
pub fn new_priority_request_topic() -> B256 {
	event_topic("IZkSync", "NewPriorityRequest").unwrap_or(IZkSync::NewPriorityRequest::SIGNATURE_HASH)
}

/// Calldata the L1 bridge sends to its L2 counterpart when bridging a token.
pub fn erc20_bridge_calldata(
	l1_token: Address,
	l1_sender: Address,
	l2_receiver: Address,
	amount: U256,
	bridge_data: Bytes,
) -> Bytes {
	IL2Bridge::finalizeDepositCall {
		_l1Sender: l1_sender,
		_l2Receiver: l2_receiver,
		_l1Token: l1_token,
		_amount: amount,
		_data: bridge_data,
	}
	.abi_encode()
	.into()
}

/// Token metadata the default ERC-20 bridge forwards to L2 so the L2 token
/// can be initialised: `abi.encode(abi.encode(name), abi.encode(symbol), abi.encode(decimals))`.
pub fn erc20_default_bridge_data(name: &str, symbol: &str, decimals: u8) -> Bytes {
	let name_bytes = Bytes::from(name.to_string().abi_encode());
	let symbol_bytes = Bytes::from(symbol.to_string().abi_encode());
	let decimals_bytes = Bytes::from(U256::from(decimals).abi_encode());
	(name_bytes, symbol_bytes, decimals_bytes)
		.abi_encode_params()
		.into()
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::keccak256;

	#[test]
	fn test_registry_lookup_by_name() {
		let selector = function_selector("IERC20", "approve").unwrap();
		assert_eq!(selector, [0x09, 0x5e, 0xa7, 0xb3]);

		let topic = event_topic("IL1Messenger", "L1MessageSent").unwrap();
		assert_eq!(topic, keccak256("L1MessageSent(address,bytes32,bytes)"));

		assert!(interface("IUnknown").is_none());
		assert!(function_selector("IERC20", "mint").is_none());
	}

	#[test]
	fn test_contract_deployed_topic() {
		assert_eq!(
			contract_deployed_topic(),
			keccak256("ContractDeployed(address,bytes32,address)")
		);
	}

	#[test]
	fn test_bridge_calldata_selector() {
		let calldata = erc20_bridge_calldata(
			Address::repeat_byte(1),
			Address::repeat_byte(2),
			Address::repeat_byte(3),
			U256::from(5),
			Bytes::new(),
		);
		let selector = function_selector("IL2Bridge", "finalizeDeposit").unwrap();
		assert_eq!(&calldata[..4], &selector);

		let decoded = IL2Bridge::finalizeDepositCall::abi_decode(&calldata, true).unwrap();
		assert_eq!(decoded._l1Sender, Address::repeat_byte(2));
		assert_eq!(decoded._amount, U256::from(5));
	}

	#[test]
	fn test_default_bridge_data_decodes() {
		let data = erc20_default_bridge_data("Dai", "DAI", 18);
		let (name, symbol, decimals) =
			<(Bytes, Bytes, Bytes)>::abi_decode_params(&data, true).unwrap();
		assert_eq!(String::abi_decode(&name, true).unwrap(), "Dai");
		assert_eq!(String::abi_decode(&symbol, true).unwrap(), "DAI");
		assert_eq!(U256::abi_decode(&decimals, true).unwrap(), U256::from(18));
	}
}
