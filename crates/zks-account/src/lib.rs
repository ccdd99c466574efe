//! Account management for the zkSync client.
//!
//! An account is the credential behind a signer: it knows its address and
//! signs 32-byte digests. Transaction encoding and digest computation live in
//! the codec; accounts never see whole transactions.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use zks_types::{EcdsaSignature, ErrorKind};

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::LocalAccount;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

impl AccountError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			AccountError::SigningFailed(_) => ErrorKind::Protocol,
			AccountError::InvalidKey(_) => ErrorKind::Validation,
		}
	}
}

/// Trait defining the interface for account implementations.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address controlled by this account.
	fn address(&self) -> Address;

	/// Signs a 32-byte digest without any prefix.
	async fn sign_hash(&self, hash: &B256) -> Result<EcdsaSignature, AccountError>;
}

/// Service that manages account operations.
///
/// Cheap to clone; every clone shares the same implementation.
#[derive(Clone)]
pub struct AccountService {
	implementation: Arc<dyn AccountInterface>,
}

impl AccountService {
	/// Creates a new AccountService with the specified implementation.
	pub fn new(implementation: Arc<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Address of the managed account.
	pub fn address(&self) -> Address {
		self.implementation.address()
	}

	/// Signs a digest with the managed account.
	pub async fn sign_hash(&self, hash: &B256) -> Result<EcdsaSignature, AccountError> {
		self.implementation.sign_hash(hash).await
	}
}

impl std::fmt::Debug for AccountService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AccountService")
			.field("address", &self.address())
			.finish()
	}
}

impl<T: AccountInterface + 'static> From<T> for AccountService {
	fn from(account: T) -> Self {
		Self::new(Arc::new(account))
	}
}
