//! Validation errors and the error taxonomy shared by every crate.
//!
//! Validation failures are raised synchronously, before any network call,
//! and always carry the offending value in their message.

use thiserror::Error;

/// Errors raised while checking caller-supplied inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// Bytecode whose length is not a whole number of 32-byte words.
	#[error("Bytecode length in bytes must be divisible by 32, got {0}")]
	BytecodeLength(usize),
	/// Bytecode longer than the protocol maximum.
	#[error("Bytecode can not be longer than {max} bytes, got {len}")]
	BytecodeTooLong { len: usize, max: usize },
	/// Bytecode with an even number of 32-byte words.
	#[error("Bytecode length in 32-byte words must be odd, got {0} words")]
	BytecodeWordCount(usize),
	/// CREATE2 salt that is not a `0x`-prefixed 32-byte hex string.
	#[error("Invalid salt provided: {0}")]
	InvalidSalt(String),
	/// A field that must be present for this operation is absent.
	#[error("Missing required field: {0}")]
	MissingField(&'static str),
	/// A field holds a value outside its accepted domain.
	#[error("Invalid value for {field}: {reason}")]
	InvalidField {
		/// Name of the offending field.
		field: &'static str,
		/// Human readable reason, including the offending value.
		reason: String,
	},
}

/// Coarse classification of failures surfaced to applications.
///
/// Callers branch on the kind rather than on concrete error types to decide
/// whether an operation is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Malformed input, rejected before any network call.
	Validation,
	/// Provided value or allowance below what the operation requires.
	InsufficientFunds,
	/// Data that does not exist yet, such as a proof for an unproven batch.
	NotFound,
	/// A logic or state violation reported by the chain or detected locally.
	Protocol,
	/// The transport failed to deliver a request or response.
	Transport,
}

impl ErrorKind {
	/// Returns true when polling the same operation again may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(self, ErrorKind::NotFound | ErrorKind::Transport)
	}
}

impl ValidationError {
	/// Shorthand for [`ValidationError::InvalidField`].
	pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
		ValidationError::InvalidField {
			field,
			reason: reason.into(),
		}
	}
}
