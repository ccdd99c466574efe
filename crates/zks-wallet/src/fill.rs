//! Populate, sign and send steps shared by the facades.

use crate::signer::Eip712Signer;
use crate::WalletError;
use alloy_primitives::Bytes;
use zks_account::AccountService;
use zks_codec::CodecError;
use zks_provider::{EthClient, PendingTransaction, Provider};
use zks_types::{BlockTag, FeeFields, Transaction, TransactionKind};

/// Sets `from` to the signer, rejecting a different sender.
fn claim_sender(account: &AccountService, tx: &mut Transaction) -> Result<(), WalletError> {
	let expected = account.address();
	match tx.from {
		Some(actual) if actual != expected => Err(WalletError::FromMismatch { expected, actual }),
		_ => {
			tx.from = Some(expected);
			Ok(())
		},
	}
}

/// Fills sender, chain id and nonce from `client`.
async fn fill_common(
	account: &AccountService,
	client: &EthClient,
	tx: &mut Transaction,
) -> Result<(), WalletError> {
	claim_sender(account, tx)?;
	if tx.chain_id.is_none() {
		tx.chain_id = Some(client.chain_id().await?);
	}
	if tx.nonce.is_none() {
		tx.nonce = Some(
			client
				.get_transaction_count(account.address(), BlockTag::Pending)
				.await?,
		);
	}
	Ok(())
}

/// Fills fees and gas of a legacy or fee-market transaction.
async fn fill_standard(client: &EthClient, tx: &mut Transaction) -> Result<(), WalletError> {
	if tx.fees.is_none() {
		let fees = match tx.kind {
			TransactionKind::Eip1559 => {
				let fee_data = client.get_fee_data().await?;
				match (fee_data.max_fee_per_gas, fee_data.max_priority_fee_per_gas) {
					(Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) => FeeFields::Eip1559 {
						max_fee_per_gas,
						max_priority_fee_per_gas,
					},
					_ => {
						tracing::debug!("No fee market on this chain, sending a legacy transaction");
						tx.kind = TransactionKind::Legacy;
						FeeFields::Legacy {
							gas_price: client.gas_price().await?,
						}
					},
				}
			},
			_ => FeeFields::Legacy {
				gas_price: client.gas_price().await?,
			},
		};
		tx.fees = Some(fees);
	}
	if tx.gas_limit.is_none() {
		tx.gas_limit = Some(client.estimate_gas(tx).await?);
	}
	Ok(())
}

/// Completes an L2 transaction. `0x71` transactions get their custom data
/// defaults and the node's gas price.
pub(crate) async fn populate_l2(
	account: &AccountService,
	provider: &Provider,
	mut tx: Transaction,
) -> Result<Transaction, WalletError> {
	fill_common(account, provider, &mut tx).await?;
	if !tx.is_eip712() {
		fill_standard(provider, &mut tx).await?;
		return Ok(tx);
	}
	if let Some(data) = tx.custom_data_mut() {
		*data = data.filled();
	}
	if tx.fees.is_none() {
		tx.fees = Some(FeeFields::Legacy {
			gas_price: provider.gas_price().await?,
		});
	}
	if tx.gas_limit.is_none() {
		tx.gas_limit = Some(provider.estimate_gas(&tx).await?);
	}
	Ok(tx)
}

/// Completes an L1 transaction.
pub(crate) async fn populate_l1(
	account: &AccountService,
	client: &EthClient,
	mut tx: Transaction,
) -> Result<Transaction, WalletError> {
	if tx.is_eip712() {
		return Err(CodecError::UnsupportedType(tx.type_byte()).into());
	}
	fill_common(account, client, &mut tx).await?;
	fill_standard(client, &mut tx).await?;
	Ok(tx)
}

/// Signs a populated transaction and returns its raw encoding.
///
/// `0x71` transactions carry the EIP-712 signature as their custom
/// signature; other kinds are signed over their standard signing hash.
pub(crate) async fn sign(account: &AccountService, tx: &Transaction) -> Result<Bytes, WalletError> {
	let mut tx = tx.clone();
	claim_sender(account, &mut tx)?;

	if tx.is_eip712() {
		let chain_id = tx.chain_id.ok_or(CodecError::MissingField("chainId"))?;
		let signature = Eip712Signer::new(account.clone(), chain_id).sign(&tx).await?;
		if let Some(data) = tx.custom_data_mut() {
			data.custom_signature = Some(signature.to_rsv_bytes());
		}
		return Ok(zks_codec::serialize(&tx, None)?);
	}

	let hash = zks_codec::signing_hash(&tx)?;
	let signature = account.sign_hash(&hash).await?;
	Ok(zks_codec::encode_signed(&tx, &signature)?)
}

pub(crate) async fn send_l2(
	account: &AccountService,
	provider: &Provider,
	tx: Transaction,
) -> Result<PendingTransaction, WalletError> {
	let tx = populate_l2(account, provider, tx).await?;
	let raw = sign(account, &tx).await?;
	let pending = provider.broadcast_transaction(&raw).await?;
	tracing::info!(tx_hash = %pending.hash(), nonce = ?tx.nonce, "L2 transaction sent");
	Ok(pending)
}

pub(crate) async fn send_l1(
	account: &AccountService,
	client: &EthClient,
	tx: Transaction,
) -> Result<PendingTransaction, WalletError> {
	let tx = populate_l1(account, client, tx).await?;
	let raw = sign(account, &tx).await?;
	let hash = client.send_raw_transaction(&raw).await?;
	Ok(client.pending(hash))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{account, client, last_raw, node, provider};
	use alloy_primitives::{Address, U256};
	use zks_types::CustomData;

	#[tokio::test]
	async fn test_populate_eip712_defaults() {
		let mock = node(270);
		let tx = Transaction {
			to: Some(Address::repeat_byte(0x11)),
			..Transaction::eip712(CustomData::default())
		};
		let tx = populate_l2(&account(), &provider(&mock), tx).await.unwrap();
		assert_eq!(tx.from, Some(account().address()));
		assert_eq!(tx.chain_id, Some(270));
		assert_eq!(tx.nonce, Some(7));
		assert_eq!(
			tx.fees,
			Some(FeeFields::Legacy {
				gas_price: U256::from(1_000_000_000u64)
			})
		);
		assert_eq!(tx.gas_limit, Some(U256::from(21_000)));
		assert_eq!(
			tx.custom_data().unwrap().gas_per_pubdata,
			Some(U256::from(50_000))
		);
		let count = &mock.requests_to("eth_getTransactionCount")[0];
		assert_eq!(count[1], serde_json::json!("pending"));
	}

	#[tokio::test]
	async fn test_caller_nonce_is_kept() {
		let mock = node(270);
		let tx = Transaction::transfer(Address::repeat_byte(0x11), U256::from(1)).with_nonce(42);
		let tx = populate_l2(&account(), &provider(&mock), tx).await.unwrap();
		assert_eq!(tx.nonce, Some(42));
		assert_eq!(tx.kind, TransactionKind::Legacy);
		assert!(mock.requests_to("eth_getTransactionCount").is_empty());
	}

	#[tokio::test]
	async fn test_from_mismatch() {
		let mock = node(270);
		let tx = Transaction::transfer(Address::repeat_byte(0x11), U256::from(1))
			.with_from(Address::repeat_byte(0x22));
		assert!(matches!(
			populate_l2(&account(), &provider(&mock), tx.clone()).await,
			Err(WalletError::FromMismatch { .. })
		));
		assert!(matches!(
			sign(&account(), &tx).await,
			Err(WalletError::FromMismatch { .. })
		));
	}

	#[tokio::test]
	async fn test_send_eip712_carries_custom_signature() {
		let mock = node(270);
		let tx = Transaction {
			to: Some(Address::repeat_byte(0x11)),
			value: U256::from(5),
			..Transaction::eip712(CustomData::default())
		};
		let pending = send_l2(&account(), &provider(&mock), tx).await.unwrap();

		let sent = zks_codec::parse_transaction(&last_raw(&mock)).unwrap();
		assert_eq!(sent.hash, Some(pending.hash()));
		assert_eq!(sent.from, Some(account().address()));
		let signature = sent.custom_data().unwrap().custom_signature.clone().unwrap();
		assert_eq!(signature.len(), 65);
		assert!(signature[64] == 27 || signature[64] == 28);
	}

	#[tokio::test]
	async fn test_send_l1_fee_market() {
		let mock = node(5);
		mock.respond(
			"eth_getBlockByNumber",
			serde_json::json!({"number": "0x1", "baseFeePerGas": "0x64"}),
		);
		let tx = Transaction {
			kind: TransactionKind::Eip1559,
			..Transaction::transfer(Address::repeat_byte(0x11), U256::from(5))
		};
		send_l1(&account(), &client(&mock), tx).await.unwrap();

		let sent = zks_codec::parse_transaction(&last_raw(&mock)).unwrap();
		assert_eq!(sent.kind, TransactionKind::Eip1559);
		assert_eq!(sent.chain_id, Some(5));
		assert_eq!(sent.nonce, Some(7));
		assert!(sent.signature.is_some());
	}

	#[tokio::test]
	async fn test_l1_rejects_rollup_kind() {
		let mock = node(5);
		let tx = Transaction::eip712(CustomData::default());
		assert!(matches!(
			populate_l1(&account(), &client(&mock), tx).await,
			Err(WalletError::Codec(CodecError::UnsupportedType(0x71)))
		));
	}
}
