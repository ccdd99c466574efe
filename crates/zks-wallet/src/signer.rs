//! EIP-712 signing of `0x71` transactions.

use crate::WalletError;
use alloy_primitives::{Address, B256};
use zks_account::AccountService;
use zks_codec::{signed_digest, CodecError};
use zks_types::{EcdsaSignature, Transaction};

/// Signs rollup-native transactions under the zkSync EIP-712 domain of one
/// chain.
#[derive(Debug, Clone)]
pub struct Eip712Signer {
	account: AccountService,
	chain_id: u64,
}

impl Eip712Signer {
	pub fn new(account: AccountService, chain_id: u64) -> Self {
		Self { account, chain_id }
	}

	pub fn address(&self) -> Address {
		self.account.address()
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Digest of `tx` under this signer's domain, whatever chain id the
	/// transaction carries.
	pub fn signed_digest(&self, tx: &Transaction) -> Result<B256, CodecError> {
		if tx.chain_id == Some(self.chain_id) {
			return signed_digest(tx);
		}
		signed_digest(&Transaction {
			chain_id: Some(self.chain_id),
			..tx.clone()
		})
	}

	pub async fn sign(&self, tx: &Transaction) -> Result<EcdsaSignature, WalletError> {
		let digest = self.signed_digest(tx)?;
		Ok(self.account.sign_hash(&digest).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::account;
	use alloy_primitives::U256;
	use zks_types::{CustomData, FeeFields};

	fn transaction(chain_id: Option<u64>) -> Transaction {
		Transaction {
			from: Some(account().address()),
			to: Some(Address::repeat_byte(0x11)),
			nonce: Some(1),
			gas_limit: Some(U256::from(100_000)),
			fees: Some(FeeFields::Legacy {
				gas_price: U256::from(1),
			}),
			chain_id,
			..Transaction::eip712(CustomData::default().filled())
		}
	}

	#[test]
	fn test_digest_uses_signer_domain() {
		let signer = Eip712Signer::new(account(), 270);
		let digest = signer.signed_digest(&transaction(None)).unwrap();
		assert_eq!(digest, signed_digest(&transaction(Some(270))).unwrap());
		assert_ne!(digest, signed_digest(&transaction(Some(324))).unwrap());
	}

	#[tokio::test]
	async fn test_sign_is_deterministic() {
		let signer = Eip712Signer::new(account(), 270);
		let first = signer.sign(&transaction(None)).await.unwrap();
		let second = signer.sign(&transaction(Some(270))).await.unwrap();
		assert_eq!(first, second);
		assert_eq!(signer.address(), account().address());
	}
}
