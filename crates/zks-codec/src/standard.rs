//! Legacy (type 0) and fee-market (type 2) envelopes, used on L1.
//!
//! Thin mapping between [`Transaction`] and the `alloy-consensus` envelope
//! types, which own the RLP layout and the EIP-155 replay protection.

use crate::CodecError;
use alloy_consensus::{SignableTransaction, Signed, TxEip1559, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::{Decodable2718, Encodable2718};
use alloy_primitives::{Bytes, PrimitiveSignature, TxKind, B256, U256};
use zks_types::{EcdsaSignature, FeeFields, Transaction, TransactionKind};

const EIP1559_TX_TYPE: u8 = 0x02;

/// Hash a signer signs for an L1 transaction.
///
/// Legacy transactions use EIP-155 replay protection when a chain id is set.
pub fn signing_hash(tx: &Transaction) -> Result<B256, CodecError> {
	match tx.kind {
		TransactionKind::Legacy => Ok(to_legacy(tx)?.signature_hash()),
		TransactionKind::Eip1559 => Ok(to_eip1559(tx)?.signature_hash()),
		TransactionKind::Eip712(_) => Err(CodecError::UnsupportedType(tx.type_byte())),
	}
}

/// Encodes a signed L1 transaction for `eth_sendRawTransaction`.
pub fn encode_signed(tx: &Transaction, signature: &EcdsaSignature) -> Result<Bytes, CodecError> {
	let signature = PrimitiveSignature::new(signature.r, signature.s, signature.y_parity);
	let envelope = match tx.kind {
		TransactionKind::Legacy => TxEnvelope::Legacy(to_legacy(tx)?.into_signed(signature)),
		TransactionKind::Eip1559 => TxEnvelope::Eip1559(to_eip1559(tx)?.into_signed(signature)),
		TransactionKind::Eip712(_) => return Err(CodecError::UnsupportedType(tx.type_byte())),
	};
	Ok(envelope.encoded_2718().into())
}

/// Decodes a signed legacy or fee-market transaction. The sender is not
/// recovered.
pub fn decode(raw: &[u8]) -> Result<Transaction, CodecError> {
	match raw.first() {
		Some(&EIP1559_TX_TYPE) => {},
		Some(byte) if *byte >= 0xc0 => {},
		Some(byte) => return Err(CodecError::UnsupportedType(*byte)),
		None => return Err(CodecError::MalformedPayload("empty input".to_string())),
	}

	let mut buf = raw;
	let envelope = TxEnvelope::decode_2718(&mut buf)
		.map_err(|e| CodecError::MalformedPayload(e.to_string()))?;
	if !buf.is_empty() {
		return Err(CodecError::MalformedPayload(format!(
			"{} trailing bytes",
			buf.len()
		)));
	}

	match envelope {
		TxEnvelope::Legacy(signed) => Ok(from_legacy(&signed)),
		TxEnvelope::Eip1559(signed) => Ok(from_eip1559(&signed)),
		_ => Err(CodecError::UnsupportedType(raw[0])),
	}
}

fn to_legacy(tx: &Transaction) -> Result<TxLegacy, CodecError> {
	let fees = tx.fees.ok_or(CodecError::MissingField("gasPrice"))?;
	Ok(TxLegacy {
		chain_id: tx.chain_id,
		nonce: tx.nonce.unwrap_or_default(),
		gas_price: narrow(fees.max_fee_per_gas(), "gasPrice")?,
		gas_limit: gas_limit(tx)?,
		to: tx_kind(tx),
		value: tx.value,
		input: tx.data.clone(),
	})
}

fn to_eip1559(tx: &Transaction) -> Result<TxEip1559, CodecError> {
	let chain_id = tx.chain_id.ok_or(CodecError::MissingField("chainId"))?;
	let fees = tx.fees.ok_or(CodecError::MissingField("maxFeePerGas"))?;
	Ok(TxEip1559 {
		chain_id,
		nonce: tx.nonce.unwrap_or_default(),
		gas_limit: gas_limit(tx)?,
		max_fee_per_gas: narrow(fees.max_fee_per_gas(), "maxFeePerGas")?,
		max_priority_fee_per_gas: narrow(fees.max_priority_fee_per_gas(), "maxPriorityFeePerGas")?,
		to: tx_kind(tx),
		value: tx.value,
		access_list: tx.access_list.clone(),
		input: tx.data.clone(),
	})
}

fn from_legacy(signed: &Signed<TxLegacy>) -> Transaction {
	let tx = signed.tx();
	Transaction {
		kind: TransactionKind::Legacy,
		nonce: Some(tx.nonce),
		to: tx.to.to().copied(),
		value: tx.value,
		data: tx.input.clone(),
		gas_limit: Some(U256::from(tx.gas_limit)),
		fees: Some(FeeFields::Legacy {
			gas_price: U256::from(tx.gas_price),
		}),
		chain_id: tx.chain_id,
		signature: Some(signature_parts(signed.signature())),
		hash: Some(*signed.hash()),
		..Default::default()
	}
}

fn from_eip1559(signed: &Signed<TxEip1559>) -> Transaction {
	let tx = signed.tx();
	Transaction {
		kind: TransactionKind::Eip1559,
		nonce: Some(tx.nonce),
		to: tx.to.to().copied(),
		value: tx.value,
		data: tx.input.clone(),
		gas_limit: Some(U256::from(tx.gas_limit)),
		fees: Some(FeeFields::Eip1559 {
			max_fee_per_gas: U256::from(tx.max_fee_per_gas),
			max_priority_fee_per_gas: U256::from(tx.max_priority_fee_per_gas),
		}),
		chain_id: Some(tx.chain_id),
		access_list: tx.access_list.clone(),
		signature: Some(signature_parts(signed.signature())),
		hash: Some(*signed.hash()),
		..Default::default()
	}
}

fn signature_parts(signature: &PrimitiveSignature) -> EcdsaSignature {
	EcdsaSignature {
		r: signature.r(),
		s: signature.s(),
		y_parity: signature.v(),
	}
}

fn tx_kind(tx: &Transaction) -> TxKind {
	match tx.to {
		Some(to) => TxKind::Call(to),
		None => TxKind::Create,
	}
}

fn gas_limit(tx: &Transaction) -> Result<u64, CodecError> {
	let gas_limit = tx.gas_limit.ok_or(CodecError::MissingField("gasLimit"))?;
	narrow(gas_limit, "gasLimit")
}

/// Fits a quantity into the integer width the envelope uses.
fn narrow<T: TryFrom<U256>>(value: U256, field: &'static str) -> Result<T, CodecError> {
	T::try_from(value).map_err(|_| {
		zks_types::ValidationError::InvalidField {
			field,
			reason: format!("{} does not fit the envelope", value),
		}
		.into()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, b256, bytes, keccak256, Address};
	use zks_types::{AccessList, AccessListItem};

	fn signature() -> EcdsaSignature {
		EcdsaSignature {
			r: U256::from(11),
			s: U256::from(12),
			y_parity: false,
		}
	}

	fn fee_market_tx() -> Transaction {
		Transaction {
			kind: TransactionKind::Eip1559,
			nonce: Some(4),
			to: Some(address!("a61464658AfeAf65CccaaFD3a512b69A83B77618")),
			value: U256::from(10),
			data: bytes!("d0e30db0"),
			gas_limit: Some(U256::from(100_000)),
			fees: Some(FeeFields::Eip1559 {
				max_fee_per_gas: U256::from(30),
				max_priority_fee_per_gas: U256::from(2),
			}),
			chain_id: Some(5),
			..Default::default()
		}
	}

	#[test]
	fn test_eip155_signing_hash_vector() {
		// EIP-155 example transaction
		let tx = Transaction {
			nonce: Some(9),
			to: Some(address!("3535353535353535353535353535353535353535")),
			value: U256::from(1_000_000_000_000_000_000u128),
			gas_limit: Some(U256::from(21_000)),
			fees: Some(FeeFields::Legacy {
				gas_price: U256::from(20_000_000_000u64),
			}),
			chain_id: Some(1),
			..Default::default()
		};
		assert_eq!(
			signing_hash(&tx).unwrap(),
			b256!("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53")
		);
	}

	#[test]
	fn test_signed_eip1559_decodes() {
		let tx = fee_market_tx();
		let raw = encode_signed(&tx, &signature()).unwrap();
		assert_eq!(raw[0], 0x02);

		let decoded = decode(&raw).unwrap();
		assert_eq!(decoded.kind, TransactionKind::Eip1559);
		assert_eq!(decoded.chain_id, Some(5));
		assert_eq!(decoded.nonce, Some(4));
		assert_eq!(decoded.fees, tx.fees);
		assert_eq!(decoded.data, tx.data);
		assert!(decoded.access_list.0.is_empty());
		assert_eq!(decoded.signature, Some(signature()));
		assert_eq!(decoded.hash, Some(keccak256(&raw)));
	}

	#[test]
	fn test_access_list_survives_reencoding() {
		let tx = fee_market_tx().with_access_list(AccessList(vec![AccessListItem {
			address: Address::repeat_byte(0x11),
			storage_keys: vec![B256::repeat_byte(0x22)],
		}]));
		let raw = encode_signed(&tx, &signature()).unwrap();

		let decoded = decode(&raw).unwrap();
		assert_eq!(decoded.access_list, tx.access_list);
		assert_eq!(signing_hash(&decoded).unwrap(), signing_hash(&tx).unwrap());

		let reencoded = encode_signed(&decoded, &decoded.signature.unwrap()).unwrap();
		assert_eq!(reencoded, raw);
		assert_eq!(keccak256(&reencoded), decoded.hash.unwrap());
	}

	#[test]
	fn test_signed_legacy_recovers_chain_id() {
		let tx = Transaction {
			nonce: Some(0),
			to: None,
			data: bytes!("6080"),
			gas_limit: Some(U256::from(53_000)),
			fees: Some(FeeFields::Legacy {
				gas_price: U256::from(1),
			}),
			chain_id: Some(1337),
			..Default::default()
		};
		let sig = EcdsaSignature {
			r: U256::from(1),
			s: U256::from(2),
			y_parity: true,
		};
		let decoded = decode(&encode_signed(&tx, &sig).unwrap()).unwrap();
		assert_eq!(decoded.chain_id, Some(1337));
		assert_eq!(decoded.to, None);
		assert_eq!(decoded.signature, Some(sig));
	}

	#[test]
	fn test_rejects_rollup_kind() {
		let tx = Transaction::eip712(Default::default());
		assert!(matches!(signing_hash(&tx), Err(CodecError::UnsupportedType(0x71))));
	}

	#[test]
	fn test_rejects_unknown_type_and_trailing_bytes() {
		assert!(matches!(decode(&[0x01, 0xc0]), Err(CodecError::UnsupportedType(0x01))));

		let mut raw = encode_signed(&fee_market_tx(), &signature()).unwrap().to_vec();
		raw.push(0x00);
		assert!(matches!(decode(&raw), Err(CodecError::MalformedPayload(_))));
	}

	#[test]
	fn test_oversized_gas_price_is_rejected() {
		let tx = Transaction {
			fees: Some(FeeFields::Legacy { gas_price: U256::MAX }),
			..fee_market_tx()
		};
		assert!(matches!(
			encode_signed(&Transaction { kind: TransactionKind::Legacy, ..tx }, &signature()),
			Err(CodecError::Validation(_))
		));
	}
}
