//! Paymaster input encoding.
//!
//! A paymaster receives the `paymasterInput` bytes of a transaction verbatim.
//! The protocol fixes two layouts for that input, each starting with the
//! selector of a function on `IPaymasterFlow`.

use crate::abi::IPaymasterFlow;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

/// Paymaster address and the input bytes handed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterParams {
	/// Paymaster contract sponsoring the transaction.
	pub paymaster: Address,
	/// Opaque input forwarded to the paymaster.
	pub paymaster_input: Bytes,
}

/// Fee-abstraction flows understood by paymasters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymasterInput {
	/// The paymaster is allowed to pull up to `minimal_allowance` of `token`.
	ApprovalBased {
		token: Address,
		minimal_allowance: U256,
		inner_input: Bytes,
	},
	/// The paymaster interprets `inner_input` on its own.
	General { inner_input: Bytes },
}

impl PaymasterInput {
	/// Encodes the input as calldata for the matching `IPaymasterFlow` function.
	pub fn encode(&self) -> Bytes {
		match self {
			PaymasterInput::ApprovalBased {
				token,
				minimal_allowance,
				inner_input,
			} => IPaymasterFlow::approvalBasedCall {
				_token: *token,
				_minAllowance: *minimal_allowance,
				_innerInput: inner_input.clone(),
			}
			.abi_encode()
			.into(),
			PaymasterInput::General { inner_input } => IPaymasterFlow::generalCall {
				input: inner_input.clone(),
			}
			.abi_encode()
			.into(),
		}
	}
}

/// Builds the paymaster parameters for a transaction.
pub fn get_paymaster_params(paymaster: Address, input: &PaymasterInput) -> PaymasterParams {
	PaymasterParams {
		paymaster,
		paymaster_input: input.encode(),
	}
}
