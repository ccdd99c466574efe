//! EIP-712 hashing of rollup-native transactions.
//!
//! These helpers provide:
//! - Domain hash computation for the fixed `{name, version, chainId}` domain
//! - Struct hash of the 13-field `Transaction` type
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - The transaction hash the sequencer assigns to a signed transaction

use crate::CodecError;
use alloy_primitives::{keccak256, Address, B256, U256};
use zks_types::utils::{hash_bytecode, EIP712_DOMAIN_NAME, EIP712_DOMAIN_VERSION, EIP712_TX_TYPE};
use zks_types::Transaction;

pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version,uint256 chainId)";
pub const TRANSACTION_TYPE: &str = "Transaction(uint256 txType,uint256 from,uint256 to,uint256 gasLimit,uint256 gasPerPubdataByteLimit,uint256 maxFeePerGas,uint256 maxPriorityFeePerGas,uint256 paymaster,uint256 nonce,uint256 value,bytes data,bytes32[] factoryDeps,bytes paymasterInput)";

/// Compute the domain hash (keccak256(abi.encode(typeHash, nameHash, versionHash, chainId))).
pub fn compute_domain_hash(chain_id: u64) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_b256(&keccak256(EIP712_DOMAIN_NAME.as_bytes()));
	enc.push_b256(&keccak256(EIP712_DOMAIN_VERSION.as_bytes()));
	enc.push_u256(U256::from(chain_id));
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: keccak256(0x1901 || domainHash || structHash).
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Struct hash of `tx` under [`TRANSACTION_TYPE`].
///
/// Fee fields fall back the same way the envelope does: max fee to gas
/// price, priority fee to max fee. Factory dependencies enter as the
/// concatenation of their bytecode hashes.
///
/// # Errors
///
/// Returns `CodecError::MissingField` if `from` is absent and
/// `CodecError::Validation` if a factory dependency is not valid bytecode.
pub fn transaction_struct_hash(tx: &Transaction) -> Result<B256, CodecError> {
	let from = tx.from.ok_or(CodecError::MissingField("from"))?;
	let custom_data = tx.custom_data().cloned().unwrap_or_default();

	let mut deps = Vec::with_capacity(custom_data.factory_deps.len() * 32);
	for dep in &custom_data.factory_deps {
		deps.extend_from_slice(hash_bytecode(dep)?.as_slice());
	}
	let (paymaster, paymaster_input) = match &custom_data.paymaster_params {
		Some(params) => (params.paymaster, params.paymaster_input.as_ref()),
		None => (Address::ZERO, &[][..]),
	};

	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(TRANSACTION_TYPE.as_bytes()));
	enc.push_u256(U256::from(EIP712_TX_TYPE));
	enc.push_address(&from);
	enc.push_address(&tx.to.unwrap_or_default());
	enc.push_u256(tx.gas_limit.unwrap_or_default());
	enc.push_u256(custom_data.gas_per_pubdata_or_default());
	enc.push_u256(tx.max_fee_per_gas());
	enc.push_u256(tx.max_priority_fee_per_gas());
	enc.push_address(&paymaster);
	enc.push_u256(U256::from(tx.nonce.unwrap_or_default()));
	enc.push_u256(tx.value);
	enc.push_b256(&keccak256(&tx.data));
	enc.push_b256(&keccak256(deps));
	enc.push_b256(&keccak256(paymaster_input));
	Ok(keccak256(enc.finish()))
}

/// Digest a signer has to sign for `tx`.
///
/// # Errors
///
/// Returns `CodecError::MissingField` if `chain_id` or `from` is absent.
pub fn signed_digest(tx: &Transaction) -> Result<B256, CodecError> {
	let chain_id = tx.chain_id.ok_or(CodecError::MissingField("chainId"))?;
	let struct_hash = transaction_struct_hash(tx)?;
	Ok(compute_final_digest(&compute_domain_hash(chain_id), &struct_hash))
}

/// Hash the sequencer assigns to a signed transaction:
/// `keccak256(signedDigest || keccak256(signature))`.
pub fn transaction_hash(tx: &Transaction, signature: &[u8]) -> Result<B256, CodecError> {
	let digest = signed_digest(tx)?;
	let mut out = Vec::with_capacity(64);
	out.extend_from_slice(digest.as_slice());
	out.extend_from_slice(keccak256(signature).as_slice());
	Ok(keccak256(out))
}

/// Minimal ABI encoder for the static words of EIP-712 struct hashing.
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Default for Eip712AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	/// Addresses are encoded as `uint256` words in this schema.
	pub fn push_address(&mut self, addr: &Address) {
		self.buf.extend_from_slice(addr.into_word().as_slice());
	}

	pub fn push_u256(&mut self, v: U256) {
		self.buf.extend_from_slice(&v.to_be_bytes::<32>());
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, bytes, Bytes};
	use alloy_sol_types::{eip712_domain, sol, SolStruct};
	use zks_types::{CustomData, FeeFields, PaymasterParams};

	sol! {
		struct Transaction {
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
			bytes data;
			bytes32[] factoryDeps;
			bytes paymasterInput;
		}
	}

	fn word(addr: Address) -> U256 {
		U256::from_be_bytes(addr.into_word().0)
	}

	fn sample_tx() -> zks_types::Transaction {
		let mut bytecode = vec![0u8; 32];
		bytecode[31] = 0x2a;
		let custom_data = CustomData {
			gas_per_pubdata: Some(U256::from(50_000)),
			factory_deps: vec![Bytes::from(bytecode)],
			custom_signature: None,
			paymaster_params: Some(PaymasterParams {
				paymaster: address!("13D0D8550769f59aa241a41897D4859c87f7Dd46"),
				paymaster_input: bytes!("8c5a3445"),
			}),
		};
		zks_types::Transaction {
			from: Some(address!("36615Cf349d7F6344891B1e7CA7C72883F5dc049")),
			to: Some(address!("a61464658AfeAf65CccaaFD3a512b69A83B77618")),
			nonce: Some(7),
			value: U256::from(1_000_000u64),
			data: bytes!("deadbeef"),
			gas_limit: Some(U256::from(300_000)),
			fees: Some(FeeFields::Eip1559 {
				max_fee_per_gas: U256::from(250_000_000u64),
				max_priority_fee_per_gas: U256::from(100_000_000u64),
			}),
			chain_id: Some(270),
			..zks_types::Transaction::eip712(custom_data)
		}
	}

	#[test]
	fn test_signed_digest_matches_typed_data_hash() {
		let tx = sample_tx();
		let custom = tx.custom_data().unwrap();
		let params = custom.paymaster_params.clone().unwrap();

		let typed = Transaction {
			txType: U256::from(0x71),
			from: word(tx.from.unwrap()),
			to: word(tx.to.unwrap()),
			gasLimit: tx.gas_limit.unwrap(),
			gasPerPubdataByteLimit: U256::from(50_000),
			maxFeePerGas: U256::from(250_000_000u64),
			maxPriorityFeePerGas: U256::from(100_000_000u64),
			paymaster: word(params.paymaster),
			nonce: U256::from(7),
			value: tx.value,
			data: tx.data.clone(),
			factoryDeps: vec![hash_bytecode(&custom.factory_deps[0]).unwrap()],
			paymasterInput: params.paymaster_input,
		};
		let domain = eip712_domain! {
			name: "zkSync",
			version: "2",
			chain_id: 270,
		};

		assert_eq!(signed_digest(&tx).unwrap(), typed.eip712_signing_hash(&domain));
	}

	#[test]
	fn test_fee_fallback_to_gas_price() {
		let mut with_gas_price = sample_tx();
		with_gas_price.fees = Some(FeeFields::Legacy {
			gas_price: U256::from(5),
		});
		let mut with_max_fee = sample_tx();
		with_max_fee.fees = Some(FeeFields::Eip1559 {
			max_fee_per_gas: U256::from(5),
			max_priority_fee_per_gas: U256::from(5),
		});
		assert_eq!(
			signed_digest(&with_gas_price).unwrap(),
			signed_digest(&with_max_fee).unwrap()
		);
	}

	#[test]
	fn test_digest_requires_chain_id_and_from() {
		let mut tx = sample_tx();
		tx.chain_id = None;
		assert!(matches!(signed_digest(&tx), Err(CodecError::MissingField("chainId"))));

		let mut tx = sample_tx();
		tx.from = None;
		assert!(matches!(signed_digest(&tx), Err(CodecError::MissingField("from"))));
	}

	#[test]
	fn test_transaction_hash_mixes_signature() {
		let tx = sample_tx();
		let a = transaction_hash(&tx, &[1u8; 65]).unwrap();
		let b = transaction_hash(&tx, &[2u8; 65]).unwrap();
		assert_ne!(a, b);
	}
}
