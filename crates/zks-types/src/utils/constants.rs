//! Protocol constants shared by every layer of the client.
//!
//! System contract addresses live in the reserved range below `0x10000`
//! on L2. Gas and fee constants mirror the values the sequencer expects.

use alloy_primitives::{address, Address};

/// Placeholder address used for the native asset on both layers.
pub const ETH_ADDRESS: Address = Address::ZERO;

/// Formal sender of the L2->L1 logs emitted by the bootloader.
pub const BOOTLOADER_FORMAL_ADDRESS: Address = address!("0000000000000000000000000000000000008001");

/// Nonce holder system contract.
pub const NONCE_HOLDER_ADDRESS: Address = address!("0000000000000000000000000000000000008003");

/// Contract deployer system contract.
pub const CONTRACT_DEPLOYER_ADDRESS: Address = address!("0000000000000000000000000000000000008006");

/// L1 messenger system contract, emitter of `L1MessageSent`.
pub const L1_MESSENGER_ADDRESS: Address = address!("0000000000000000000000000000000000008008");

/// L2 representation of the native asset.
pub const L2_ETH_TOKEN_ADDRESS: Address = address!("000000000000000000000000000000000000800a");

/// Offset added to an L1 contract address when its message crosses to L2.
pub const L1_TO_L2_ALIAS_OFFSET: Address = address!("1111000000000000000000000000000000001111");

/// Return value of a successful EIP-1271 `isValidSignature` call.
pub const EIP1271_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

/// Type byte of the rollup-native transaction envelope.
pub const EIP712_TX_TYPE: u8 = 0x71;

/// Type byte the L2 assigns to transactions originating from the priority queue.
pub const PRIORITY_OPERATION_L2_TX_TYPE: u8 = 0xff;

/// Largest bytecode accepted by the bytecode hasher: `(2^16 - 1)` words of 32 bytes.
pub const MAX_BYTECODE_LEN_BYTES: usize = ((1 << 16) - 1) * 32;

/// Numerator of the safety coefficient applied to L1 gas estimations.
pub const L1_FEE_ESTIMATION_COEF_NUMERATOR: u64 = 12;

/// Denominator of the safety coefficient applied to L1 gas estimations.
pub const L1_FEE_ESTIMATION_COEF_DENOMINATOR: u64 = 10;

/// Recommended L1 gas budget for an ERC-20 deposit.
pub const L1_RECOMMENDED_MIN_ERC20_DEPOSIT_GAS_LIMIT: u64 = 400_000;

/// Recommended L1 gas budget for a native-asset deposit.
pub const L1_RECOMMENDED_MIN_ETH_DEPOSIT_GAS_LIMIT: u64 = 200_000;

/// Gas-per-pubdata limit signed into L2 transactions when none is supplied.
pub const DEFAULT_GAS_PER_PUBDATA_LIMIT: u64 = 50_000;

/// Gas-per-pubdata used for L1->L2 priority operations.
pub const REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT: u64 = 800;

/// Protocol name placed in the EIP-712 domain.
pub const EIP712_DOMAIN_NAME: &str = "zkSync";

/// Protocol version placed in the EIP-712 domain.
pub const EIP712_DOMAIN_VERSION: &str = "2";

/// L2 endpoint used when neither configuration nor environment names one.
pub const DEFAULT_L2_RPC_URL: &str = "http://localhost:3050";

/// Environment variable overriding the default L2 endpoint.
pub const L2_RPC_URL_ENV: &str = "ZKSYNC_WEB3_API_URL";

/// Delay between polls of receipt and status loops, in milliseconds.
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 500;
