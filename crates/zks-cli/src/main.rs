//! Command-line client for the zkSync rollup.
//!
//! Reads endpoints and the signing key from a TOML configuration file and
//! exposes the common bridge flows: checking balances, depositing,
//! withdrawing, finalizing withdrawals, claiming failed deposits, plus L2
//! transfers and transaction status lookups.

use alloy_primitives::{Address, B256, U256};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use zks_bridge::{DepositRequest, L1Adapter, L2Adapter};
use zks_config::Config;
use zks_provider::{EthClient, PollingConfig, Provider, ProviderError, TransferRequest, WithdrawRequest};
use zks_types::utils::ETH_ADDRESS;
use zks_types::{BlockTag, CustomData, Overrides, TransactionKind};
use zks_wallet::Wallet;

/// Command-line arguments for the zkSync client.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	#[command(flatten)]
	Account(AccountCommand),
	/// Show the status of an L2 transaction
	Status { hash: B256 },
}

/// Commands acting on behalf of the configured account.
#[derive(Subcommand, Debug)]
enum AccountCommand {
	/// Show the account's balances on both layers
	Balances {
		/// L1 token address; ETH when omitted
		#[arg(long)]
		token: Option<Address>,
	},
	/// Deposit ETH or a token from L1 to L2
	Deposit {
		/// Amount in wei
		amount: U256,
		#[arg(long)]
		token: Option<Address>,
		/// L2 receiver; defaults to the account
		#[arg(long)]
		to: Option<Address>,
		/// Wait for the deposit to execute on L2
		#[arg(long)]
		wait: bool,
	},
	/// Withdraw ETH or a token from L2 to L1
	Withdraw {
		/// Amount in wei
		amount: U256,
		/// L2 token address; ETH when omitted
		#[arg(long)]
		token: Option<Address>,
		/// L1 receiver; defaults to the account
		#[arg(long)]
		to: Option<Address>,
	},
	/// Transfer ETH or a token on L2
	Transfer {
		to: Address,
		/// Amount in wei
		amount: U256,
		#[arg(long)]
		token: Option<Address>,
	},
	/// Finalize a withdrawal on L1
	Finalize {
		/// Hash of the L2 withdrawal transaction
		hash: B256,
		/// Position of the withdrawal among the transaction's messages
		#[arg(long, default_value_t = 0)]
		index: usize,
	},
	/// Claim back the funds of a failed deposit on L1
	Claim {
		/// Hash of the failed L2 deposit transaction
		hash: B256,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::debug!(config = %args.config.display(), "Loaded configuration");

	let (provider, provider_l1) = connect(&config)?;

	let command = match args.command {
		Command::Status { hash } => {
			let status = provider.get_transaction_status(hash).await?;
			println!("{:?}", status);
			return Ok(());
		},
		Command::Account(command) => command,
	};

	let account = config
		.account
		.as_ref()
		.ok_or("this command needs an [account] section in the configuration")?;
	let wallet = Wallet::from_private_key(&account.private_key, provider, provider_l1)?;
	tracing::info!(address = %wallet.address(), "Using account");

	run(&config, &wallet, command).await
}

/// Builds the L2 provider and L1 client with the configured polling cadence.
fn connect(config: &Config) -> Result<(Provider, EthClient), ProviderError> {
	let polling = PollingConfig::new(
		Duration::from_millis(config.polling.interval_ms),
		config.polling.max_attempts,
	);
	let l1 = EthClient::http(&config.l1.rpc_url)?.with_polling(polling);
	let l2 = match &config.l2.rpc_url {
		Some(url) => EthClient::http(url)?,
		None => Provider::default_provider(config.l2.network)?.client().clone(),
	};
	Ok((Provider::new(l2.with_polling(polling)), l1))
}

async fn run(config: &Config, wallet: &Wallet, command: AccountCommand) -> Result<(), Box<dyn std::error::Error>> {
	match command {
		AccountCommand::Balances { token } => {
			let l1 = wallet.get_balance_l1(token, BlockTag::Latest).await?;
			let l2_token = match token {
				Some(token) => Some(wallet.l2_token_address(token).await?),
				None => None,
			};
			let l2 = wallet.get_balance(l2_token, None).await?;
			println!("L1: {}", l1);
			println!("L2: {}", l2);
		},
		AccountCommand::Deposit {
			amount,
			token,
			to,
			wait,
		} => {
			let response = wallet
				.deposit(&DepositRequest {
					token: token.unwrap_or(ETH_ADDRESS),
					amount,
					to,
					approve_erc20: true,
					gas_per_pubdata: Some(U256::from(config.deposit.gas_per_pubdata)),
					..Default::default()
				})
				.await?;
			println!("{}", response.hash());
			if wait {
				let receipt = response.wait().await?;
				tracing::info!(l2_tx_hash = %receipt.transaction_hash, "Deposit executed on L2");
			}
		},
		AccountCommand::Withdraw { amount, token, to } => {
			let pending = wallet
				.withdraw(&WithdrawRequest {
					token: token.unwrap_or(ETH_ADDRESS),
					amount,
					to,
					..Default::default()
				})
				.await?;
			println!("{}", pending.hash());
		},
		AccountCommand::Transfer { to, amount, token } => {
			let mut tx = wallet.provider().get_transfer_tx(&TransferRequest {
				to,
				amount,
				token,
				from: Some(wallet.address()),
				overrides: Overrides::default(),
			});
			tx.kind = TransactionKind::Eip712(CustomData {
				gas_per_pubdata: Some(U256::from(config.tx.gas_per_pubdata)),
				..Default::default()
			});
			let pending = wallet.send_transaction(tx).await?;
			println!("{}", pending.hash());
		},
		AccountCommand::Finalize { hash, index } => {
			if wallet.is_withdrawal_finalized(hash, index).await? {
				tracing::warn!(tx_hash = %hash, "Withdrawal already finalized");
				return Ok(());
			}
			let pending = wallet
				.finalize_withdrawal(hash, index, &Overrides::default())
				.await?;
			println!("{}", pending.hash());
		},
		AccountCommand::Claim { hash } => {
			let pending = wallet
				.claim_failed_deposit(hash, &Overrides::default())
				.await?;
			println!("{}", pending.hash());
		},
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_deposit() {
		let args = Args::try_parse_from(["zks", "deposit", "1000", "--wait"]).unwrap();
		assert_eq!(args.config, PathBuf::from("config.toml"));
		match args.command {
			Command::Account(AccountCommand::Deposit {
				amount, token, wait, ..
			}) => {
				assert_eq!(amount, U256::from(1000));
				assert_eq!(token, None);
				assert!(wait);
			},
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_parse_finalize_index() {
		let hash = format!("0x{}", "ab".repeat(32));
		let args = Args::try_parse_from(["zks", "-c", "zk.toml", "finalize", &hash, "--index", "2"]).unwrap();
		assert_eq!(args.config, PathBuf::from("zk.toml"));
		match args.command {
			Command::Account(AccountCommand::Finalize { hash, index }) => {
				assert_eq!(hash, B256::repeat_byte(0xab));
				assert_eq!(index, 2);
			},
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_status_needs_no_account() {
		let hash = format!("0x{}", "cd".repeat(32));
		let args = Args::try_parse_from(["zks", "status", &hash]).unwrap();
		assert!(matches!(args.command, Command::Status { hash } if hash == B256::repeat_byte(0xcd)));

		let args = Args::try_parse_from(["zks", "claim", &hash]).unwrap();
		assert!(matches!(args.command, Command::Account(AccountCommand::Claim { .. })));
	}

	#[tokio::test]
	async fn test_connect_uses_configured_urls() {
		let config: Config = r#"
			[l1]
			rpc_url = "http://localhost:8545"

			[l2]
			rpc_url = "http://localhost:3050"

			[polling]
			interval_ms = 10
			max_attempts = 3
		"#
		.parse()
		.unwrap();
		let (provider, l1) = connect(&config).unwrap();
		assert_eq!(l1.polling().max_attempts, Some(3));
		assert_eq!(provider.polling().interval, Duration::from_millis(10));
	}
}
