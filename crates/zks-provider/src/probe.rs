//! Outcome of asking a bridge whether it handles a token.

use alloy_primitives::Address;

/// Result of probing the WETH bridge for a token.
///
/// A reverted or failed probe is reported as [`BridgeProbe::Unknown`] rather
/// than an error; callers fall back to the default ERC-20 bridge for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeProbe {
	/// The bridge maps the token to this counterpart address.
	Found(Address),
	/// The bridge answered with the zero address, or is not deployed.
	NotFound,
	/// The probe itself failed.
	Unknown(String),
}

impl BridgeProbe {
	/// Builds a probe result from a bridge's answer.
	pub fn from_answer<E: ToString>(answer: Result<Address, E>) -> Self {
		match answer {
			Ok(address) if address.is_zero() => BridgeProbe::NotFound,
			Ok(address) => BridgeProbe::Found(address),
			Err(e) => BridgeProbe::Unknown(e.to_string()),
		}
	}

	pub fn is_found(&self) -> bool {
		matches!(self, BridgeProbe::Found(_))
	}

	pub fn address(&self) -> Option<Address> {
		match self {
			BridgeProbe::Found(address) => Some(*address),
			_ => None,
		}
	}
}
