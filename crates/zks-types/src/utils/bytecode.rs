//! Versioned bytecode hashing.

use super::constants::MAX_BYTECODE_LEN_BYTES;
use crate::ValidationError;
use alloy_primitives::B256;
use sha2::{Digest, Sha256};

const BYTECODE_HASH_VERSION: [u8; 2] = [1, 0];

/// Computes the versioned hash under which the L2 knows a contract bytecode.
///
/// The result is the SHA-256 digest of the bytecode whose first four bytes
/// are replaced by a version marker and the length in 32-byte words.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the length is not a multiple of 32,
/// exceeds [`MAX_BYTECODE_LEN_BYTES`], or spans an even number of words.
pub fn hash_bytecode(bytecode: &[u8]) -> Result<B256, ValidationError> {
	if bytecode.len() % 32 != 0 {
		return Err(ValidationError::BytecodeLength(bytecode.len()));
	}
	if bytecode.len() > MAX_BYTECODE_LEN_BYTES {
		return Err(ValidationError::BytecodeTooLong {
			len: bytecode.len(),
			max: MAX_BYTECODE_LEN_BYTES,
		});
	}

	let words = bytecode.len() / 32;
	if words % 2 == 0 {
		return Err(ValidationError::BytecodeWordCount(words));
	}

	let mut hash: [u8; 32] = Sha256::digest(bytecode).into();
	hash[0..2].copy_from_slice(&BYTECODE_HASH_VERSION);
	// The word count fits in two bytes because of the length bound above.
	hash[2..4].copy_from_slice(&(words as u16).to_be_bytes());

	Ok(B256::from(hash))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_bytecode_layout() {
		let bytecode = vec![0xabu8; 32 * 3];
		let hash = hash_bytecode(&bytecode).unwrap();
		let digest: [u8; 32] = Sha256::digest(&bytecode).into();

		assert_eq!(&hash[0..2], &[1, 0]);
		assert_eq!(&hash[2..4], &[0, 3]);
		assert_eq!(&hash[4..], &digest[4..]);
	}

	#[test]
	fn test_hash_bytecode_is_content_sensitive() {
		let a = vec![0u8; 32];
		let mut b = vec![0u8; 32];
		b[31] = 1;
		assert_eq!(hash_bytecode(&a).unwrap(), hash_bytecode(&a).unwrap());
		assert_ne!(hash_bytecode(&a).unwrap(), hash_bytecode(&b).unwrap());
	}

	#[test]
	fn test_hash_bytecode_rejects_unaligned_length() {
		assert_eq!(
			hash_bytecode(&[0u8; 33]),
			Err(ValidationError::BytecodeLength(33))
		);
	}

	#[test]
	fn test_hash_bytecode_rejects_even_word_count() {
		assert_eq!(
			hash_bytecode(&[0u8; 64]),
			Err(ValidationError::BytecodeWordCount(2))
		);
		assert_eq!(hash_bytecode(&[]), Err(ValidationError::BytecodeWordCount(0)));
	}

	#[test]
	fn test_hash_bytecode_rejects_oversized_input() {
		let bytecode = vec![0u8; MAX_BYTECODE_LEN_BYTES + 32];
		assert!(matches!(
			hash_bytecode(&bytecode),
			Err(ValidationError::BytecodeTooLong { .. })
		));
	}
}
