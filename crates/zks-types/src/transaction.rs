//! Transaction model shared by the codec, the chain client and the signers.
//!
//! A transaction is either a legacy, a fee-market (EIP-1559) or a
//! rollup-native (type `0x71`) transaction. Only the rollup-native kind
//! carries [`CustomData`]; the kind tag is the single source of truth when
//! choosing an encoding path.

use crate::paymaster::PaymasterParams;
use crate::utils::constants::{DEFAULT_GAS_PER_PUBDATA_LIMIT, EIP712_TX_TYPE};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// An ECDSA signature split into its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcdsaSignature {
	pub r: U256,
	pub s: U256,
	/// Parity of the `y` coordinate of the signature point.
	pub y_parity: bool,
}

impl EcdsaSignature {
	/// Builds a signature from a recovery value in any of the common
	/// encodings (`0/1`, `27/28`, or EIP-155 `chain_id * 2 + 35/36`).
	pub fn from_rsv(r: U256, s: U256, v: u64) -> Self {
		let y_parity = match v {
			0 | 1 => v == 1,
			27 | 28 => v == 28,
			v if v >= 35 => (v - 35) % 2 == 1,
			_ => false,
		};
		Self { r, s, y_parity }
	}

	/// Parses a 65-byte `r || s || v` signature.
	pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
		if bytes.len() != 65 {
			return None;
		}
		Some(Self::from_rsv(
			U256::from_be_slice(&bytes[..32]),
			U256::from_be_slice(&bytes[32..64]),
			bytes[64] as u64,
		))
	}

	/// `r || s || y_parity`, with the parity as a single 0/1 byte.
	pub fn as_bytes(&self) -> [u8; 65] {
		let mut out = [0u8; 65];
		out[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
		out[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
		out[64] = self.y_parity as u8;
		out
	}

	/// `r || s || v` with `v` in the 27/28 form expected by contract verifiers.
	pub fn to_rsv_bytes(&self) -> Bytes {
		let mut out = self.as_bytes();
		out[64] += 27;
		Bytes::copy_from_slice(&out)
	}

	/// EIP-155 recovery value for legacy transactions.
	pub fn v_eip155(&self, chain_id: u64) -> u64 {
		chain_id * 2 + 35 + self.y_parity as u64
	}
}

/// Extra fields of the rollup-native transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomData {
	/// Maximum gas the sender pays per byte of published data.
	pub gas_per_pubdata: Option<U256>,
	/// Bytecode blobs the transaction needs published on L2.
	pub factory_deps: Vec<Bytes>,
	/// Signature produced by a smart-contract account, replacing the ECDSA one.
	pub custom_signature: Option<Bytes>,
	/// Paymaster sponsoring the fees.
	pub paymaster_params: Option<PaymasterParams>,
}

impl CustomData {
	/// Gas-per-pubdata limit, falling back to the protocol default.
	pub fn gas_per_pubdata_or_default(&self) -> U256 {
		self.gas_per_pubdata
			.unwrap_or(U256::from(DEFAULT_GAS_PER_PUBDATA_LIMIT))
	}

	/// Returns a copy with every optional field the sequencer requires filled in.
	pub fn filled(&self) -> Self {
		let mut data = self.clone();
		data.gas_per_pubdata = Some(self.gas_per_pubdata_or_default());
		data
	}

	/// Sets the paymaster.
	pub fn with_paymaster(mut self, params: PaymasterParams) -> Self {
		self.paymaster_params = Some(params);
		self
	}
}

/// Transaction kind, carrying the kind-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransactionKind {
	/// Pre-EIP-2718 transaction.
	#[default]
	Legacy,
	/// Fee-market transaction (type 2).
	Eip1559,
	/// Rollup-native transaction (type `0x71`).
	Eip712(CustomData),
}

impl TransactionKind {
	/// EIP-2718 type byte.
	pub fn type_byte(&self) -> u8 {
		match self {
			TransactionKind::Legacy => 0,
			TransactionKind::Eip1559 => 2,
			TransactionKind::Eip712(_) => EIP712_TX_TYPE,
		}
	}
}

/// Fee fields: a single gas price, or the fee-market pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeFields {
	Legacy {
		gas_price: U256,
	},
	Eip1559 {
		max_fee_per_gas: U256,
		max_priority_fee_per_gas: U256,
	},
}

impl FeeFields {
	/// Upper bound on the price per gas.
	pub fn max_fee_per_gas(&self) -> U256 {
		match self {
			FeeFields::Legacy { gas_price } => *gas_price,
			FeeFields::Eip1559 {
				max_fee_per_gas, ..
			} => *max_fee_per_gas,
		}
	}

	/// Priority fee; a legacy gas price is entirely priority fee.
	pub fn max_priority_fee_per_gas(&self) -> U256 {
		match self {
			FeeFields::Legacy { gas_price } => *gas_price,
			FeeFields::Eip1559 {
				max_priority_fee_per_gas,
				..
			} => *max_priority_fee_per_gas,
		}
	}
}

/// A transaction on either layer, possibly partially populated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
	pub kind: TransactionKind,
	pub nonce: Option<u64>,
	pub from: Option<Address>,
	/// Recipient; `None` for contract creation on L1.
	pub to: Option<Address>,
	pub value: U256,
	pub data: Bytes,
	pub gas_limit: Option<U256>,
	pub fees: Option<FeeFields>,
	pub chain_id: Option<u64>,
	/// Addresses and slots warmed up front; only encoded by fee-market transactions.
	pub access_list: AccessList,
	pub signature: Option<EcdsaSignature>,
	/// Hash, known once the transaction is signed or decoded.
	pub hash: Option<B256>,
}

impl Transaction {
	/// A rollup-native transaction with the given custom data.
	pub fn eip712(custom_data: CustomData) -> Self {
		Self {
			kind: TransactionKind::Eip712(custom_data),
			..Default::default()
		}
	}

	/// A call to `to` with `data`.
	pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
		Self {
			to: Some(to),
			data: data.into(),
			..Default::default()
		}
	}

	/// A plain value transfer.
	pub fn transfer(to: Address, value: U256) -> Self {
		Self {
			to: Some(to),
			value,
			..Default::default()
		}
	}

	pub fn with_from(mut self, from: Address) -> Self {
		self.from = Some(from);
		self
	}

	pub fn with_value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}

	pub fn with_chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = Some(chain_id);
		self
	}

	pub fn with_nonce(mut self, nonce: u64) -> Self {
		self.nonce = Some(nonce);
		self
	}

	pub fn with_gas_limit(mut self, gas_limit: U256) -> Self {
		self.gas_limit = Some(gas_limit);
		self
	}

	pub fn with_fees(mut self, fees: FeeFields) -> Self {
		self.fees = Some(fees);
		self
	}

	pub fn with_access_list(mut self, access_list: AccessList) -> Self {
		self.access_list = access_list;
		self
	}

	/// EIP-2718 type byte.
	pub fn type_byte(&self) -> u8 {
		self.kind.type_byte()
	}

	/// Returns true for rollup-native transactions.
	pub fn is_eip712(&self) -> bool {
		matches!(self.kind, TransactionKind::Eip712(_))
	}

	pub fn custom_data(&self) -> Option<&CustomData> {
		match &self.kind {
			TransactionKind::Eip712(data) => Some(data),
			_ => None,
		}
	}

	pub fn custom_data_mut(&mut self) -> Option<&mut CustomData> {
		match &mut self.kind {
			TransactionKind::Eip712(data) => Some(data),
			_ => None,
		}
	}

	/// Max fee per gas, falling back to the gas price, or zero.
	pub fn max_fee_per_gas(&self) -> U256 {
		self.fees.map(|f| f.max_fee_per_gas()).unwrap_or_default()
	}

	/// Priority fee, falling back to the max fee, or zero.
	pub fn max_priority_fee_per_gas(&self) -> U256 {
		self.fees
			.map(|f| f.max_priority_fee_per_gas())
			.unwrap_or_default()
	}
}

/// Caller-provided values that take precedence over computed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
	pub from: Option<Address>,
	pub value: Option<U256>,
	pub nonce: Option<u64>,
	pub gas_limit: Option<U256>,
	pub gas_price: Option<U256>,
	pub max_fee_per_gas: Option<U256>,
	pub max_priority_fee_per_gas: Option<U256>,
}

impl Overrides {
	/// True if a gas price or a max fee has been set.
	pub fn has_fee(&self) -> bool {
		self.gas_price.is_some() || self.max_fee_per_gas.is_some()
	}

	/// Price used when quoting the L2 base cost: max fee, else gas price.
	pub fn gas_price_for_estimation(&self) -> Option<U256> {
		self.max_fee_per_gas.or(self.gas_price)
	}

	/// Fee fields derived from the overrides; fee-market values win.
	pub fn fees(&self) -> Option<FeeFields> {
		if let Some(max_fee_per_gas) = self.max_fee_per_gas {
			return Some(FeeFields::Eip1559 {
				max_fee_per_gas,
				max_priority_fee_per_gas: self.max_priority_fee_per_gas.unwrap_or(max_fee_per_gas),
			});
		}
		self.gas_price.map(|gas_price| FeeFields::Legacy { gas_price })
	}

	/// Copy without any fee field, used for gas estimation.
	pub fn without_fees(&self) -> Self {
		Self {
			gas_price: None,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
			..self.clone()
		}
	}

	/// Writes every set override onto `tx`.
	///
	/// A legacy transaction becomes a fee-market one when fee-market fees
	/// are supplied.
	pub fn apply(&self, mut tx: Transaction) -> Transaction {
		if let Some(from) = self.from {
			tx.from = Some(from);
		}
		if let Some(value) = self.value {
			tx.value = value;
		}
		if let Some(nonce) = self.nonce {
			tx.nonce = Some(nonce);
		}
		if let Some(gas_limit) = self.gas_limit {
			tx.gas_limit = Some(gas_limit);
		}
		if let Some(fees) = self.fees() {
			if matches!(fees, FeeFields::Eip1559 { .. }) && tx.kind == TransactionKind::Legacy {
				tx.kind = TransactionKind::Eip1559;
			}
			tx.fees = Some(fees);
		}
		tx
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_custom_data_only_on_eip712() {
		let tx = Transaction::eip712(CustomData::default());
		assert!(tx.is_eip712());
		assert!(tx.custom_data().is_some());
		assert_eq!(tx.type_byte(), 0x71);

		let tx = Transaction::transfer(Address::ZERO, U256::from(1));
		assert!(tx.custom_data().is_none());
		assert_eq!(tx.type_byte(), 0);
	}

	#[test]
	fn test_fee_fallbacks() {
		let tx = Transaction::default().with_fees(FeeFields::Legacy {
			gas_price: U256::from(7),
		});
		assert_eq!(tx.max_fee_per_gas(), U256::from(7));
		assert_eq!(tx.max_priority_fee_per_gas(), U256::from(7));

		assert_eq!(Transaction::default().max_fee_per_gas(), U256::ZERO);
	}

	#[test]
	fn test_overrides_switch_legacy_to_fee_market() {
		let overrides = Overrides {
			max_fee_per_gas: Some(U256::from(10)),
			value: Some(U256::from(3)),
			..Default::default()
		};
		let tx = overrides.apply(Transaction::default());
		assert_eq!(tx.kind, TransactionKind::Eip1559);
		assert_eq!(tx.value, U256::from(3));
		assert_eq!(tx.max_priority_fee_per_gas(), U256::from(10));
		assert!(overrides.without_fees().fees().is_none());
	}

	#[test]
	fn test_signature_bytes() {
		let sig = EcdsaSignature {
			r: U256::from(1),
			s: U256::from(2),
			y_parity: true,
		};
		let bytes = sig.as_bytes();
		assert_eq!(bytes[31], 1);
		assert_eq!(bytes[63], 2);
		assert_eq!(bytes[64], 1);
		assert_eq!(sig.to_rsv_bytes()[64], 28);
		assert_eq!(EcdsaSignature::from_bytes(&sig.to_rsv_bytes()), Some(sig));
		assert_eq!(sig.v_eip155(1), 38);
	}
}
