//! The `0x71` transaction envelope.
//!
//! Wire format: `0x71 || rlp([nonce, maxPriorityFeePerGas, maxFeePerGas,
//! gasLimit, to, value, data, v|chainId, r, s, chainId, from, gasPerPubdata,
//! factoryDeps, customSignature, paymaster])`. The list always has 16 items;
//! when the transaction is not ECDSA-signed, items 7..9 hold the chain id and
//! two empty strings.

use crate::eip712::transaction_hash;
use crate::CodecError;
use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::{Decodable, Encodable, Header};
use zks_types::utils::EIP712_TX_TYPE;
use zks_types::{CustomData, EcdsaSignature, FeeFields, PaymasterParams, Transaction};

const ENVELOPE_ITEMS: usize = 16;

/// Serializes a rollup-native transaction.
///
/// `signature` takes precedence over `tx.signature`. Factory dependencies
/// are carried as raw bytecode.
///
/// # Errors
///
/// Returns `CodecError::MissingField` when `chain_id` or `from` is absent,
/// `CodecError::InvalidSignature` when a custom signature is present but
/// empty, and `CodecError::UnsupportedType` for non-`0x71` transactions.
pub fn serialize(tx: &Transaction, signature: Option<&EcdsaSignature>) -> Result<Bytes, CodecError> {
	let custom_data = tx
		.custom_data()
		.ok_or(CodecError::UnsupportedType(tx.type_byte()))?;
	let chain_id = tx.chain_id.ok_or(CodecError::MissingField("chainId"))?;
	let from = tx.from.ok_or(CodecError::MissingField("from"))?;

	let mut payload = Vec::new();
	U256::from(tx.nonce.unwrap_or_default()).encode(&mut payload);
	tx.max_priority_fee_per_gas().encode(&mut payload);
	tx.max_fee_per_gas().encode(&mut payload);
	tx.gas_limit.unwrap_or_default().encode(&mut payload);
	encode_optional_address(tx.to, &mut payload);
	tx.value.encode(&mut payload);
	tx.data.encode(&mut payload);

	match signature.or(tx.signature.as_ref()) {
		Some(sig) => {
			sig.y_parity.encode(&mut payload);
			sig.r.encode(&mut payload);
			sig.s.encode(&mut payload);
		},
		None => {
			chain_id.encode(&mut payload);
			Bytes::new().encode(&mut payload);
			Bytes::new().encode(&mut payload);
		},
	}

	chain_id.encode(&mut payload);
	from.encode(&mut payload);
	custom_data.gas_per_pubdata_or_default().encode(&mut payload);
	custom_data.factory_deps.encode(&mut payload);
	match &custom_data.custom_signature {
		Some(sig) if sig.is_empty() => {
			return Err(CodecError::InvalidSignature(
				"Empty signatures are not supported".to_string(),
			));
		},
		Some(sig) => sig.encode(&mut payload),
		None => Bytes::new().encode(&mut payload),
	}
	encode_paymaster(custom_data.paymaster_params.as_ref(), &mut payload);

	let mut out = Vec::with_capacity(payload.len() + 4);
	out.push(EIP712_TX_TYPE);
	Header {
		list: true,
		payload_length: payload.len(),
	}
	.encode(&mut out);
	out.extend_from_slice(&payload);
	Ok(out.into())
}

/// Parses a rollup-native transaction.
///
/// The ECDSA signature is only reconstructed when no custom signature is
/// present. The hash is computed whenever the transaction carries either
/// kind of signature.
///
/// # Errors
///
/// Returns `CodecError::MalformedPayload` for a wrong type byte, a wrong
/// item count, a missing chain id or a malformed paymaster, and
/// `CodecError::InvalidSignature` when the recovery id is not 0 or 1.
pub fn deserialize(raw: &[u8]) -> Result<Transaction, CodecError> {
	let (type_byte, mut buf) = raw
		.split_first()
		.ok_or_else(|| CodecError::MalformedPayload("empty input".to_string()))?;
	if *type_byte != EIP712_TX_TYPE {
		return Err(CodecError::MalformedPayload(format!(
			"expected type {:#x}, got {:#x}",
			EIP712_TX_TYPE, type_byte
		)));
	}

	let header = Header::decode(&mut buf)?;
	if !header.list {
		return Err(alloy_rlp::Error::UnexpectedString.into());
	}
	if buf.len() != header.payload_length {
		return Err(CodecError::MalformedPayload(format!(
			"list payload is {} bytes, header declares {}",
			buf.len(),
			header.payload_length
		)));
	}
	let count = count_items(buf)?;
	if count != ENVELOPE_ITEMS {
		return Err(CodecError::MalformedPayload(format!(
			"expected {} fields, got {}",
			ENVELOPE_ITEMS, count
		)));
	}

	let nonce = u64::decode(&mut buf)?;
	let max_priority_fee_per_gas = U256::decode(&mut buf)?;
	let max_fee_per_gas = U256::decode(&mut buf)?;
	let gas_limit = U256::decode(&mut buf)?;
	let to = decode_optional_address(&mut buf)?;
	let value = U256::decode(&mut buf)?;
	let data = Bytes::decode(&mut buf)?;
	let v = U256::decode(&mut buf)?;
	let r = Bytes::decode(&mut buf)?;
	let s = Bytes::decode(&mut buf)?;
	let chain_id = u64::decode(&mut buf)?;
	let from = decode_optional_address(&mut buf)?;
	let gas_per_pubdata = U256::decode(&mut buf)?;
	let factory_deps = Vec::<Bytes>::decode(&mut buf)?;
	let custom_signature = Bytes::decode(&mut buf)?;
	let paymaster_params = decode_paymaster(&mut buf)?;

	if chain_id == 0 {
		return Err(CodecError::MalformedPayload("missing chainId".to_string()));
	}

	let custom_signature = (!custom_signature.is_empty()).then_some(custom_signature);
	let mut tx = Transaction {
		nonce: Some(nonce),
		from,
		to,
		value,
		data,
		gas_limit: Some(gas_limit),
		fees: Some(FeeFields::Eip1559 {
			max_fee_per_gas,
			max_priority_fee_per_gas,
		}),
		chain_id: Some(chain_id),
		..Transaction::eip712(CustomData {
			gas_per_pubdata: Some(gas_per_pubdata),
			factory_deps,
			custom_signature: custom_signature.clone(),
			paymaster_params,
		})
	};

	let signature_bytes = match custom_signature {
		Some(custom) => custom.to_vec(),
		None => {
			if r.is_empty() || s.is_empty() {
				return Ok(tx);
			}
			if v > U256::from(1) {
				return Err(CodecError::InvalidSignature(format!(
					"recovery id must be 0 or 1, got {}",
					v
				)));
			}
			let signature = EcdsaSignature {
				r: U256::try_from_be_slice(&r)
					.ok_or_else(|| CodecError::InvalidSignature("r is longer than 32 bytes".to_string()))?,
				s: U256::try_from_be_slice(&s)
					.ok_or_else(|| CodecError::InvalidSignature("s is longer than 32 bytes".to_string()))?,
				y_parity: v == U256::from(1),
			};
			tx.signature = Some(signature);
			signature.as_bytes().to_vec()
		},
	};

	tx.hash = Some(transaction_hash(&tx, &signature_bytes)?);
	Ok(tx)
}

/// Bytes the transaction hash commits to: the custom signature when present,
/// otherwise `r || s || yParity`.
pub fn signature_bytes(tx: &Transaction) -> Option<Vec<u8>> {
	if let Some(custom) = tx.custom_data().and_then(|d| d.custom_signature.as_ref()) {
		return Some(custom.to_vec());
	}
	tx.signature.map(|sig| sig.as_bytes().to_vec())
}

fn encode_optional_address(address: Option<Address>, out: &mut Vec<u8>) {
	match address {
		Some(address) => address.encode(out),
		None => Bytes::new().encode(out),
	}
}

fn encode_paymaster(params: Option<&PaymasterParams>, out: &mut Vec<u8>) {
	match params {
		Some(params) => {
			let payload_length = params.paymaster.length() + params.paymaster_input.length();
			Header {
				list: true,
				payload_length,
			}
			.encode(out);
			params.paymaster.encode(out);
			params.paymaster_input.encode(out);
		},
		None => Vec::<Bytes>::new().encode(out),
	}
}

fn decode_optional_address(buf: &mut &[u8]) -> Result<Option<Address>, CodecError> {
	let bytes = Bytes::decode(buf)?;
	match bytes.len() {
		0 => Ok(None),
		20 => Ok(Some(Address::from_slice(&bytes))),
		len => Err(CodecError::MalformedPayload(format!(
			"address must be 20 bytes, got {}",
			len
		))),
	}
}

fn decode_paymaster(buf: &mut &[u8]) -> Result<Option<PaymasterParams>, CodecError> {
	let items = Vec::<Bytes>::decode(buf)?;
	match items.as_slice() {
		[] => Ok(None),
		[paymaster, input] => {
			if paymaster.len() != 20 {
				return Err(CodecError::MalformedPayload(format!(
					"paymaster address must be 20 bytes, got {}",
					paymaster.len()
				)));
			}
			Ok(Some(PaymasterParams {
				paymaster: Address::from_slice(paymaster),
				paymaster_input: input.clone(),
			}))
		},
		other => Err(CodecError::MalformedPayload(format!(
			"paymaster params must have 0 or 2 items, got {}",
			other.len()
		))),
	}
}

/// Number of top-level items in a list payload.
pub(crate) fn count_items(mut buf: &[u8]) -> Result<usize, CodecError> {
	let mut count = 0;
	while !buf.is_empty() {
		let mut item = buf;
		let header = Header::decode(&mut item)?;
		// a single byte below 0x80 leaves `item` untouched with a payload length of 1
		let total = (buf.len() - item.len()) + header.payload_length;
		if total > buf.len() {
			return Err(alloy_rlp::Error::InputTooShort.into());
		}
		buf = &buf[total..];
		count += 1;
	}
	Ok(count)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::eip712::signed_digest;
	use alloy_primitives::{address, bytes, keccak256};

	fn sample_tx() -> Transaction {
		let mut bytecode = vec![0u8; 32];
		bytecode[0] = 0x01;
		Transaction {
			from: Some(address!("36615Cf349d7F6344891B1e7CA7C72883F5dc049")),
			to: Some(address!("a61464658AfeAf65CccaaFD3a512b69A83B77618")),
			nonce: Some(3),
			value: U256::from(1_000_000u64),
			data: bytes!("a9059cbb"),
			gas_limit: Some(U256::from(300_000)),
			fees: Some(FeeFields::Eip1559 {
				max_fee_per_gas: U256::from(250_000_000u64),
				max_priority_fee_per_gas: U256::from(100_000_000u64),
			}),
			chain_id: Some(270),
			..Transaction::eip712(CustomData {
				gas_per_pubdata: Some(U256::from(50_000)),
				factory_deps: vec![Bytes::from(bytecode)],
				custom_signature: None,
				paymaster_params: Some(PaymasterParams {
					paymaster: address!("13D0D8550769f59aa241a41897D4859c87f7Dd46"),
					paymaster_input: bytes!("8c5a344500000000"),
				}),
			})
		}
	}

	fn sample_signature() -> EcdsaSignature {
		EcdsaSignature {
			r: U256::from_be_bytes([0x11; 32]),
			s: U256::from_be_bytes([0x22; 32]),
			y_parity: true,
		}
	}

	#[test]
	fn test_round_trip_with_ecdsa_signature() {
		let tx = sample_tx();
		let sig = sample_signature();
		let raw = serialize(&tx, Some(&sig)).unwrap();
		assert_eq!(raw[0], 0x71);

		let decoded = deserialize(&raw).unwrap();
		assert_eq!(decoded.from, tx.from);
		assert_eq!(decoded.to, tx.to);
		assert_eq!(decoded.nonce, tx.nonce);
		assert_eq!(decoded.value, tx.value);
		assert_eq!(decoded.data, tx.data);
		assert_eq!(decoded.gas_limit, tx.gas_limit);
		assert_eq!(decoded.fees, tx.fees);
		assert_eq!(decoded.custom_data(), tx.custom_data());
		assert_eq!(decoded.signature, Some(sig));

		let digest = signed_digest(&tx).unwrap();
		let mut preimage = digest.to_vec();
		preimage.extend_from_slice(keccak256(sig.as_bytes()).as_slice());
		assert_eq!(decoded.hash, Some(keccak256(preimage)));
	}

	#[test]
	fn test_round_trip_with_custom_signature() {
		let mut tx = sample_tx();
		let custom = Bytes::from(vec![0xab; 65]);
		tx.custom_data_mut().unwrap().custom_signature = Some(custom.clone());

		let raw = serialize(&tx, None).unwrap();
		let decoded = deserialize(&raw).unwrap();
		assert!(decoded.signature.is_none());
		assert_eq!(
			decoded.custom_data().unwrap().custom_signature.as_ref(),
			Some(&custom)
		);
		assert_eq!(
			decoded.hash,
			Some(transaction_hash(&tx, &custom).unwrap())
		);
	}

	#[test]
	fn test_unsigned_transaction_has_no_hash() {
		let raw = serialize(&sample_tx(), None).unwrap();
		let decoded = deserialize(&raw).unwrap();
		assert!(decoded.hash.is_none());
		assert!(decoded.signature.is_none());
		assert_eq!(decoded.chain_id, Some(270));
	}

	#[test]
	fn test_defaults_for_missing_fields() {
		let tx = Transaction {
			from: Some(Address::repeat_byte(0x01)),
			chain_id: Some(280),
			fees: Some(FeeFields::Legacy {
				gas_price: U256::from(9),
			}),
			..Transaction::eip712(CustomData::default())
		};
		let decoded = deserialize(&serialize(&tx, None).unwrap()).unwrap();
		let custom = decoded.custom_data().unwrap();
		assert_eq!(custom.gas_per_pubdata, Some(U256::from(50_000)));
		assert!(custom.paymaster_params.is_none());
		assert_eq!(decoded.to, None);
		assert_eq!(decoded.max_fee_per_gas(), U256::from(9));
		assert_eq!(decoded.max_priority_fee_per_gas(), U256::from(9));
	}

	#[test]
	fn test_serialize_requires_from_and_chain_id() {
		let mut tx = sample_tx();
		tx.from = None;
		assert!(matches!(serialize(&tx, None), Err(CodecError::MissingField("from"))));

		let mut tx = sample_tx();
		tx.chain_id = None;
		assert!(matches!(serialize(&tx, None), Err(CodecError::MissingField("chainId"))));
	}

	#[test]
	fn test_serialize_rejects_empty_custom_signature() {
		let mut tx = sample_tx();
		tx.custom_data_mut().unwrap().custom_signature = Some(Bytes::new());
		assert!(matches!(serialize(&tx, None), Err(CodecError::InvalidSignature(_))));
	}

	#[test]
	fn test_serialize_rejects_other_kinds() {
		let tx = Transaction::transfer(Address::ZERO, U256::from(1))
			.with_from(Address::repeat_byte(1))
			.with_chain_id(1);
		assert!(matches!(serialize(&tx, None), Err(CodecError::UnsupportedType(0))));
	}

	#[test]
	fn test_deserialize_rejects_wrong_item_count() {
		let mut payload = Vec::new();
		for _ in 0..15 {
			Bytes::new().encode(&mut payload);
		}
		let mut raw = vec![0x71];
		Header {
			list: true,
			payload_length: payload.len(),
		}
		.encode(&mut raw);
		raw.extend_from_slice(&payload);
		assert!(matches!(deserialize(&raw), Err(CodecError::MalformedPayload(_))));
	}

	#[test]
	fn test_deserialize_rejects_bad_recovery_id() {
		let tx = sample_tx();
		let raw = serialize(&tx, Some(&sample_signature())).unwrap();
		// y_parity = true is encoded as the single byte 0x01 right after `data`
		let position = raw
			.windows(5)
			.position(|w| w == [0x84, 0xa9, 0x05, 0x9c, 0xbb])
			.unwrap()
			+ 5;
		assert_eq!(raw[position], 0x01);
		let mut tampered = raw.to_vec();
		tampered[position] = 0x05;
		assert!(matches!(deserialize(&tampered), Err(CodecError::InvalidSignature(_))));
	}

	#[test]
	fn test_count_items() {
		let mut payload = Vec::new();
		0u64.encode(&mut payload);
		5u64.encode(&mut payload);
		U256::from(1_000u64).encode(&mut payload);
		Vec::<Bytes>::new().encode(&mut payload);
		assert_eq!(count_items(&payload).unwrap(), 4);
	}
}
