//! JSON form of transaction requests sent to `eth_call`, `eth_estimateGas`
//! and the `zks_*` estimators.

use alloy_primitives::U256;
use serde_json::{json, Map, Value};
use zks_types::{FeeFields, Transaction, TransactionKind};

fn quantity(value: U256) -> Value {
	Value::String(format!("{:#x}", value))
}

/// Serializes `tx` as a JSON-RPC transaction request.
///
/// Rollup-native transactions carry their extra fields under `eip712Meta`,
/// with byte strings given as arrays of numbers.
pub fn transaction_request(tx: &Transaction) -> Value {
	let mut out = Map::new();
	if let Some(from) = tx.from {
		out.insert("from".into(), json!(from));
	}
	if let Some(to) = tx.to {
		out.insert("to".into(), json!(to));
	}
	if !tx.value.is_zero() {
		out.insert("value".into(), quantity(tx.value));
	}
	if !tx.data.is_empty() {
		out.insert("data".into(), json!(tx.data));
	}
	if let Some(nonce) = tx.nonce {
		out.insert("nonce".into(), quantity(U256::from(nonce)));
	}
	if let Some(gas_limit) = tx.gas_limit {
		out.insert("gas".into(), quantity(gas_limit));
	}
	match tx.fees {
		Some(FeeFields::Legacy { gas_price }) => {
			out.insert("gasPrice".into(), quantity(gas_price));
		},
		Some(FeeFields::Eip1559 {
			max_fee_per_gas,
			max_priority_fee_per_gas,
		}) => {
			out.insert("maxFeePerGas".into(), quantity(max_fee_per_gas));
			out.insert(
				"maxPriorityFeePerGas".into(),
				quantity(max_priority_fee_per_gas),
			);
		},
		None => {},
	}
	if let Some(chain_id) = tx.chain_id {
		out.insert("chainId".into(), quantity(U256::from(chain_id)));
	}

	match &tx.kind {
		TransactionKind::Legacy => {},
		TransactionKind::Eip1559 => {
			out.insert("type".into(), json!("0x2"));
			if !tx.access_list.0.is_empty() {
				out.insert("accessList".into(), json!(tx.access_list));
			}
		},
		TransactionKind::Eip712(custom) => {
			out.insert("type".into(), json!(format!("{:#x}", tx.type_byte())));
			let mut meta = Map::new();
			meta.insert(
				"gasPerPubdata".into(),
				quantity(custom.gas_per_pubdata_or_default()),
			);
			if !custom.factory_deps.is_empty() {
				let deps: Vec<Vec<u8>> = custom.factory_deps.iter().map(|d| d.to_vec()).collect();
				meta.insert("factoryDeps".into(), json!(deps));
			}
			if let Some(params) = &custom.paymaster_params {
				meta.insert(
					"paymasterParams".into(),
					json!({
						"paymaster": params.paymaster,
						"paymasterInput": params.paymaster_input.to_vec(),
					}),
				);
			}
			out.insert("eip712Meta".into(), Value::Object(meta));
		},
	}
	Value::Object(out)
}
