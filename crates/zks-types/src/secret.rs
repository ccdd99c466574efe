//! Private key material.
//!
//! `PrivateKey` keeps the hex-encoded key in zeroizing memory and never prints
//! or serializes it. The raw bytes are only produced on demand, also in
//! zeroizing memory, when an account is built from the key.

use crate::validation::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

const REDACTED: &str = "***REDACTED***";

/// Hex-encoded secp256k1 private key, with or without `0x` prefix.
#[derive(Clone)]
pub struct PrivateKey(Zeroizing<String>);

impl PrivateKey {
	pub fn new(key: impl Into<String>) -> Self {
		Self(Zeroizing::new(key.into()))
	}

	/// Decodes the key into its 32 raw bytes.
	///
	/// # Errors
	///
	/// Returns `ValidationError::InvalidField` if the value is not 64 hex
	/// characters.
	pub fn to_bytes(&self) -> Result<Zeroizing<[u8; 32]>, ValidationError> {
		let trimmed = self.0.trim();
		let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
		if hex_part.len() != 64 {
			return Err(ValidationError::invalid(
				"private_key",
				format!("expected 64 hex characters, got {}", hex_part.len()),
			));
		}
		let mut out = Zeroizing::new([0u8; 32]);
		hex::decode_to_slice(hex_part, out.as_mut_slice())
			.map_err(|e| ValidationError::invalid("private_key", e.to_string()))?;
		Ok(out)
	}

	/// Runs `f` with the hex form of the key.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}

	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Debug for PrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "PrivateKey({})", REDACTED)
	}
}

impl fmt::Display for PrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<&str> for PrivateKey {
	fn from(s: &str) -> Self {
		Self::new(s)
	}
}

impl From<String> for PrivateKey {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl PartialEq for PrivateKey {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for PrivateKey {}

impl Serialize for PrivateKey {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for PrivateKey {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(PrivateKey::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const KEY: &str = "0x7726827caac94a7f9e1b160f7ea819f172f7b6f9d2a97f992c38edeab82d4110";

	#[test]
	fn test_private_key_is_redacted() {
		let key = PrivateKey::from(KEY);
		assert_eq!(format!("{:?}", key), "PrivateKey(***REDACTED***)");
		assert_eq!(format!("{}", key), "***REDACTED***");
		assert_eq!(serde_json::to_string(&key).unwrap(), "\"***REDACTED***\"");
	}

	#[test]
	fn test_private_key_decodes_with_and_without_prefix() {
		let with_prefix = PrivateKey::from(KEY).to_bytes().unwrap();
		let without_prefix = PrivateKey::from(&KEY[2..]).to_bytes().unwrap();
		assert_eq!(*with_prefix, *without_prefix);
		assert_eq!(with_prefix[0], 0x77);
	}

	#[test]
	fn test_private_key_rejects_bad_input() {
		assert!(PrivateKey::from("0x1234").to_bytes().is_err());
		let not_hex = format!("0x{}", "zz".repeat(32));
		assert!(PrivateKey::from(not_hex).to_bytes().is_err());
		assert!(PrivateKey::from("  ").is_empty());
	}
}
