//! L1 fee helpers for priority operations.

use crate::BridgeError;
use alloy_primitives::U256;
use zks_provider::EthClient;
use zks_types::Overrides;

/// Fills fee-market fields on `overrides` from current L1 fee data, unless a
/// gas price or max fee is already set.
///
/// The base fee is recovered from the suggested max fee as
/// `(max_fee - priority) / 2`, or taken from the gas price on chains without
/// a fee market. The max fee becomes `base_fee * 3 / 2 + priority`.
///
/// A max fee is set even on L1 chains without a fee market, so the priority
/// operation is always sent as a type 2 transaction. This switch is intended.
pub async fn insert_gas_price(l1: &EthClient, overrides: &mut Overrides) -> Result<(), BridgeError> {
	if overrides.has_fee() {
		return Ok(());
	}
	let fee_data = l1.get_fee_data().await?;
	let base_fee = match (fee_data.max_fee_per_gas, fee_data.max_priority_fee_per_gas) {
		(Some(max_fee), Some(priority)) => max_fee.saturating_sub(priority) / U256::from(2),
		_ => fee_data.gas_price.ok_or(BridgeError::MissingFeeData)?,
	};
	let priority = fee_data.max_priority_fee_per_gas.unwrap_or_default();
	overrides.max_fee_per_gas = Some(base_fee * U256::from(3) / U256::from(2) + priority);
	overrides.max_priority_fee_per_gas = fee_data.max_priority_fee_per_gas;
	tracing::debug!(
		base_fee = %base_fee,
		max_fee_per_gas = ?overrides.max_fee_per_gas,
		"Inserted L1 gas price"
	);
	Ok(())
}

/// Rejects a priority operation whose value does not cover its base cost.
pub fn check_base_cost(base_cost: U256, value: U256) -> Result<(), BridgeError> {
	if base_cost > value {
		return Err(BridgeError::InsufficientValue { base_cost, value });
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::sync::Arc;
	use zks_provider::MockTransport;

	fn client(mock: &MockTransport) -> EthClient {
		EthClient::new(Arc::new(mock.clone()))
	}

	#[tokio::test]
	async fn test_fee_market_formula() {
		// base fee 10 gwei, default priority 1.5 gwei
		let mock = MockTransport::new();
		mock.respond("eth_gasPrice", json!("0x2540be400"))
			.respond(
				"eth_getBlockByNumber",
				json!({"number": "0x1", "baseFeePerGas": "0x2540be400"}),
			);
		let mut overrides = Overrides::default();
		insert_gas_price(&client(&mock), &mut overrides).await.unwrap();

		let priority = U256::from(1_500_000_000u64);
		assert_eq!(overrides.max_priority_fee_per_gas, Some(priority));
		assert_eq!(
			overrides.max_fee_per_gas,
			Some(U256::from(15_000_000_000u64) + priority)
		);
		assert_eq!(overrides.gas_price, None);
	}

	#[tokio::test]
	async fn test_legacy_chain_uses_gas_price() {
		let mock = MockTransport::new();
		mock.respond("eth_gasPrice", json!("0x64"))
			.respond("eth_getBlockByNumber", json!({"number": "0x1"}));
		let mut overrides = Overrides::default();
		insert_gas_price(&client(&mock), &mut overrides).await.unwrap();
		assert_eq!(overrides.max_fee_per_gas, Some(U256::from(150)));
		assert_eq!(overrides.max_priority_fee_per_gas, None);

		let tx = overrides.apply(zks_types::Transaction::default());
		assert_eq!(tx.kind, zks_types::TransactionKind::Eip1559);
	}

	#[tokio::test]
	async fn test_existing_fee_is_kept() {
		let mock = MockTransport::new();
		let mut overrides = Overrides {
			gas_price: Some(U256::from(7)),
			..Default::default()
		};
		insert_gas_price(&client(&mock), &mut overrides).await.unwrap();
		assert_eq!(overrides.max_fee_per_gas, None);
		assert!(mock.requests().is_empty());
	}

	#[test]
	fn test_check_base_cost() {
		assert!(check_base_cost(U256::from(10), U256::from(10)).is_ok());
		assert!(matches!(
			check_base_cost(U256::from(11), U256::from(10)),
			Err(BridgeError::InsufficientValue { .. })
		));
	}
}
