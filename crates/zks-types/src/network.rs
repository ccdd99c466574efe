//! Known L2 deployments.

use crate::utils::constants::DEFAULT_L2_RPC_URL;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Predefined L2 networks with a public endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	/// Local development node.
	#[default]
	Localhost,
	Goerli,
	Mainnet,
}

impl Network {
	/// Public JSON-RPC endpoint of the network.
	pub fn default_rpc_url(&self) -> &'static str {
		match self {
			Network::Localhost => DEFAULT_L2_RPC_URL,
			Network::Goerli => "https://zksync2-testnet.zksync.dev",
			Network::Mainnet => "https://zksync2-mainnet.zksync.io/",
		}
	}
}

impl fmt::Display for Network {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Network::Localhost => "localhost",
			Network::Goerli => "goerli",
			Network::Mainnet => "mainnet",
		};
		f.write_str(name)
	}
}

impl FromStr for Network {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"localhost" => Ok(Network::Localhost),
			"goerli" => Ok(Network::Goerli),
			"mainnet" => Ok(Network::Mainnet),
			other => Err(format!("Unknown network: {}", other)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_network_names_round_trip() {
		for network in [Network::Localhost, Network::Goerli, Network::Mainnet] {
			assert_eq!(network.to_string().parse::<Network>().unwrap(), network);
		}
		assert!("ropsten".parse::<Network>().is_err());
		assert_eq!(Network::default().default_rpc_url(), "http://localhost:3050");
	}
}
