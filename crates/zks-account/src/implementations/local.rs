//! Local private key account.

use crate::{AccountError, AccountInterface};
use alloy_primitives::{Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use zks_types::{EcdsaSignature, PrivateKey};

/// Account backed by a secp256k1 key held in memory.
#[derive(Clone)]
pub struct LocalAccount {
	signer: PrivateKeySigner,
}

impl LocalAccount {
	/// Builds an account from a hex-encoded private key.
	///
	/// # Errors
	///
	/// Returns `AccountError::InvalidKey` if the key is not 32 hex bytes or
	/// is not a valid secp256k1 scalar.
	pub fn new(private_key: &PrivateKey) -> Result<Self, AccountError> {
		let bytes = private_key
			.to_bytes()
			.map_err(|e| AccountError::InvalidKey(e.to_string()))?;
		let signer = PrivateKeySigner::from_bytes(&B256::from(*bytes))
			.map_err(|e| AccountError::InvalidKey(e.to_string()))?;
		Ok(Self { signer })
	}

	/// Account with a freshly generated key.
	pub fn random() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}
}

impl std::fmt::Debug for LocalAccount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LocalAccount")
			.field("address", &self.signer.address())
			.finish()
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_hash(&self, hash: &B256) -> Result<EcdsaSignature, AccountError> {
		let signature = self
			.signer
			.sign_hash_sync(hash)
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		EcdsaSignature::from_bytes(&signature.as_bytes())
			.ok_or_else(|| AccountError::SigningFailed("Unexpected signature length".to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::AccountService;
	use alloy_primitives::{address, keccak256};

	// Well-known development key
	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	#[test]
	fn test_address_from_key() {
		let account = LocalAccount::new(&PrivateKey::from(KEY)).unwrap();
		assert_eq!(
			account.address(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
		assert!(!format!("{:?}", account).contains("ac0974"));
	}

	#[test]
	fn test_invalid_key_rejected() {
		let zero = format!("0x{}", "00".repeat(32));
		assert!(matches!(
			LocalAccount::new(&PrivateKey::from(zero)),
			Err(AccountError::InvalidKey(_))
		));
		assert!(matches!(
			LocalAccount::new(&PrivateKey::from("0x12")),
			Err(AccountError::InvalidKey(_))
		));
	}

	#[tokio::test]
	async fn test_sign_hash_is_deterministic() {
		let service = AccountService::from(LocalAccount::new(&PrivateKey::from(KEY)).unwrap());
		let digest = keccak256(b"zksync");
		let a = service.sign_hash(&digest).await.unwrap();
		let b = service.sign_hash(&digest).await.unwrap();
		assert_eq!(a, b);
		assert_ne!(a.r, alloy_primitives::U256::ZERO);
	}
}
