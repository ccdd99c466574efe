//! L1 side of the bridge: deposits, withdrawal finalization, failed-deposit
//! claims and L2 executions requested through the priority queue.

use crate::fees::{check_base_cost, insert_gas_price};
use crate::{BridgeContracts, BridgeError, L1TransactionCapable};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use zks_provider::{
	BridgeProbe, EthClient, L1ToL2ExecuteRequest, PendingTransaction, PriorityOpResponse, Provider,
	ProviderError,
};
use zks_types::abi::{
	erc20_bridge_calldata, erc20_default_bridge_data, IL1Bridge, IL1Messenger, IL2Bridge, IZkSync,
	IERC20,
};
use zks_types::utils::{
	scale_gas_limit, BOOTLOADER_FORMAL_ADDRESS, ETH_ADDRESS, L1_MESSENGER_ADDRESS,
	L1_RECOMMENDED_MIN_ERC20_DEPOSIT_GAS_LIMIT, L1_RECOMMENDED_MIN_ETH_DEPOSIT_GAS_LIMIT,
	REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT,
};
use zks_types::{
	apply_l1_to_l2_alias, is_eth, undo_l1_to_l2_alias, BlockTag,
	BridgeAddresses, FeeFields, FullDepositFee, Log, Overrides, Transaction, TransactionKind,
	TransactionReceipt, ValidationError,
};

/// Parameters of a deposit from L1 to L2.
#[derive(Debug, Clone, Default)]
pub struct DepositRequest {
	/// L1 token; [`ETH_ADDRESS`] for ETH.
	pub token: Address,
	pub amount: U256,
	/// L2 receiver; defaults to the depositor.
	pub to: Option<Address>,
	pub operator_tip: U256,
	/// L1 bridge to use instead of the default ones.
	pub bridge_address: Option<Address>,
	/// Approve the bridge first when its allowance is below `amount`.
	pub approve_erc20: bool,
	pub l2_gas_limit: Option<U256>,
	pub gas_per_pubdata: Option<U256>,
	/// Data forwarded to a custom bridge's L2 counterpart.
	pub custom_bridge_data: Option<Bytes>,
	/// L2 address receiving refunds; zero lets the bridge decide.
	pub refund_recipient: Option<Address>,
	pub overrides: Overrides,
	/// Overrides for the approval transaction.
	pub approve_overrides: Overrides,
}

/// Parameters of a deposit fee quote.
#[derive(Debug, Clone, Default)]
pub struct FullDepositFeeRequest {
	pub token: Address,
	pub to: Option<Address>,
	pub bridge_address: Option<Address>,
	pub custom_bridge_data: Option<Bytes>,
	pub gas_per_pubdata: Option<U256>,
	pub overrides: Overrides,
}

/// Parameters of an L2 execution requested from L1.
#[derive(Debug, Clone, Default)]
pub struct RequestExecuteRequest {
	pub contract_address: Address,
	pub calldata: Bytes,
	/// Estimated through the L2 node when `None`.
	pub l2_gas_limit: Option<U256>,
	pub l2_value: U256,
	pub factory_deps: Vec<Bytes>,
	pub operator_tip: U256,
	pub gas_per_pubdata: Option<U256>,
	/// Defaults to the sender.
	pub refund_recipient: Option<Address>,
	pub overrides: Overrides,
}

/// A deposit ready to be sent.
///
/// ETH goes through the main contract's request-execute path; tokens go
/// through a bridge contract.
#[derive(Debug, Clone)]
pub enum DepositTx {
	Eth(RequestExecuteRequest),
	Token(Transaction),
}

/// Everything an L1 bridge needs to release a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeWithdrawalParams {
	pub l1_batch_number: u64,
	pub l2_message_index: u64,
	pub l2_tx_number_in_block: u16,
	pub message: Bytes,
	/// L2 contract that sent the message: a bridge or the ETH token.
	pub sender: Address,
	pub proof: Vec<B256>,
}

/// Bridge operations available to every account that can transact on L1.
#[async_trait]
pub trait L1Adapter: L1TransactionCapable {
	async fn main_contract_address(&self) -> Result<Address, Self::Error> {
		Ok(self.provider_l2().main_contract_address().await?)
	}

	async fn l1_bridge_contracts(&self) -> Result<BridgeContracts, Self::Error> {
		let bridges = self.provider_l2().default_bridge_addresses().await?;
		Ok(BridgeContracts {
			erc20: bridges.erc20_l1,
			weth: bridges.weth_l1,
		})
	}

	/// L1 balance of the account in `token` (ETH when `None`).
	async fn get_balance_l1(&self, token: Option<Address>, block: BlockTag) -> Result<U256, Self::Error> {
		match token {
			Some(token) if !is_eth(token) => {
				let call = IERC20::balanceOfCall {
					_owner: self.address(),
				};
				Ok(self.provider_l1().call_contract_at(token, &call, block).await?._0)
			},
			_ => Ok(self.provider_l1().get_balance(self.address(), block).await?),
		}
	}

	/// L1 bridge that handles `token`: `bridge` when given, the WETH bridge
	/// when it knows the token, the default ERC-20 bridge otherwise.
	async fn resolve_l1_bridge(&self, token: Address, bridge: Option<Address>) -> Result<Address, Self::Error> {
		if let Some(bridge) = bridge {
			return Ok(bridge);
		}
		let bridges = self.provider_l2().default_bridge_addresses().await?;
		if probe_l1_weth_bridge(self.provider_l1(), &bridges, token).await.is_found() {
			Ok(bridges.weth_l1)
		} else {
			Ok(bridges.erc20_l1)
		}
	}

	/// Allowance the account granted to the bridge handling `token`.
	async fn get_allowance_l1(
		&self,
		token: Address,
		bridge: Option<Address>,
		block: BlockTag,
	) -> Result<U256, Self::Error> {
		let bridge = self.resolve_l1_bridge(token, bridge).await?;
		let call = IERC20::allowanceCall {
			_owner: self.address(),
			_spender: bridge,
		};
		Ok(self.provider_l1().call_contract_at(token, &call, block).await?._0)
	}

	/// L2 address of an L1 token, as reported by the L1 bridges.
	async fn l2_token_address(&self, token: Address) -> Result<Address, Self::Error> {
		if token == ETH_ADDRESS {
			return Ok(ETH_ADDRESS);
		}
		let bridges = self.provider_l2().default_bridge_addresses().await?;
		if let Some(address) = probe_l1_weth_bridge(self.provider_l1(), &bridges, token).await.address() {
			return Ok(address);
		}
		let call = IL1Bridge::l2TokenAddressCall { _l1Token: token };
		Ok(self.provider_l1().call_contract(bridges.erc20_l1, &call).await?._0)
	}

	/// Approves the bridge handling `token` to spend `amount`.
	///
	/// # Errors
	///
	/// Fails validation for ETH, which needs no approval.
	async fn approve_erc20(
		&self,
		token: Address,
		amount: U256,
		bridge: Option<Address>,
		overrides: &Overrides,
	) -> Result<PendingTransaction, Self::Error> {
		if is_eth(token) {
			return Err(ValidationError::invalid("token", "ETH token can't be approved").into());
		}
		let bridge = self.resolve_l1_bridge(token, bridge).await?;
		let call = IERC20::approveCall {
			_spender: bridge,
			_amount: amount,
		};
		let tx = overrides.apply(Transaction::call(token, call.abi_encode()));
		tracing::info!(token = %token, bridge = %bridge, amount = %amount, "Approving bridge");
		self.send_l1_transaction(tx).await
	}

	/// Value the main contract charges for executing `l2_gas_limit` on L2.
	///
	/// The gas price defaults to the current L1 gas price and the pubdata
	/// limit to the priority queue requirement.
	async fn get_base_cost(
		&self,
		l2_gas_limit: U256,
		gas_per_pubdata: Option<U256>,
		gas_price: Option<U256>,
	) -> Result<U256, Self::Error> {
		let gas_price = match gas_price {
			Some(gas_price) => gas_price,
			None => self
				.provider_l1()
				.get_fee_data()
				.await?
				.gas_price
				.ok_or(BridgeError::MissingFeeData)?,
		};
		let main_contract = self.provider_l2().main_contract_address().await?;
		let call = IZkSync::l2TransactionBaseCostCall {
			_gasPrice: gas_price,
			_l2GasLimit: l2_gas_limit,
			_l2GasPerPubdataByteLimit: gas_per_pubdata.unwrap_or(default_gas_per_pubdata()),
		};
		Ok(self.provider_l1().call_contract(main_contract, &call).await?._0)
	}

	/// L2 gas a deposit will use, going through the bridge the deposit would
	/// use.
	async fn estimate_deposit_l2_gas(&self, request: &DepositRequest) -> Result<U256, Self::Error> {
		let l1 = self.provider_l1();
		let l2 = self.provider_l2();
		let from = self.address();
		let to = request.to.unwrap_or(from);
		let gas_per_pubdata = request.gas_per_pubdata.unwrap_or(default_gas_per_pubdata());
		let bridges = l2.default_bridge_addresses().await?;

		if let Some(l1_bridge) = request.bridge_address {
			let bridge_data = match &request.custom_bridge_data {
				Some(data) => data.clone(),
				None if l1_bridge == bridges.weth_l1 => Bytes::new(),
				None => l1_token_bridge_data(l1, request.token).await?,
			};
			let l2_bridge = l1.call_contract(l1_bridge, &IL1Bridge::l2BridgeCall {}).await?._0;
			let calldata = erc20_bridge_calldata(request.token, from, to, request.amount, bridge_data);
			let gas = estimate_bridge_deposit(l2, l1_bridge, l2_bridge, U256::ZERO, calldata, gas_per_pubdata)
				.await?;
			return Ok(gas);
		}

		if request.token == ETH_ADDRESS {
			let execute = L1ToL2ExecuteRequest {
				contract_address: to,
				calldata: Bytes::new(),
				caller: Some(from),
				l2_value: request.amount,
				factory_deps: Vec::new(),
				gas_per_pubdata: Some(gas_per_pubdata),
			};
			return Ok(l2.estimate_l1_to_l2_execute(&execute).await?);
		}

		let (l1_bridge, l2_bridge, l2_value, bridge_data) =
			if probe_l1_weth_bridge(l1, &bridges, request.token).await.is_found() {
				(bridges.weth_l1, bridges.weth_l2, request.amount, Bytes::new())
			} else {
				let data = l1_token_bridge_data(l1, request.token).await?;
				(bridges.erc20_l1, bridges.erc20_l2, U256::ZERO, data)
			};
		let calldata = erc20_bridge_calldata(request.token, from, to, request.amount, bridge_data);
		Ok(estimate_bridge_deposit(l2, l1_bridge, l2_bridge, l2_value, calldata, gas_per_pubdata).await?)
	}

	/// Builds a deposit without sending it.
	///
	/// ETH deposits carry `base_cost + operator_tip + amount` as value;
	/// token deposits carry `base_cost + operator_tip` and move the amount
	/// through the bridge.
	async fn get_deposit_tx(&self, request: &DepositRequest) -> Result<DepositTx, Self::Error> {
		let from = self.address();
		let to = request.to.unwrap_or(from);
		let gas_per_pubdata = request.gas_per_pubdata.unwrap_or(default_gas_per_pubdata());
		let mut overrides = request.overrides.clone();
		overrides.from = overrides.from.or(Some(from));

		let l2_gas_limit = match request.l2_gas_limit {
			Some(limit) => limit,
			None => self.estimate_deposit_l2_gas(request).await?,
		};
		insert_gas_price(self.provider_l1(), &mut overrides).await?;
		let gas_price = estimation_gas_price(&overrides)?;
		let base_cost = self
			.get_base_cost(l2_gas_limit, Some(gas_per_pubdata), Some(gas_price))
			.await?;

		if request.token == ETH_ADDRESS {
			let value = base_cost + request.operator_tip + request.amount;
			overrides.value = Some(overrides.value.unwrap_or(value));
			return Ok(DepositTx::Eth(RequestExecuteRequest {
				contract_address: to,
				calldata: Bytes::new(),
				l2_gas_limit: Some(l2_gas_limit),
				l2_value: request.amount,
				factory_deps: Vec::new(),
				operator_tip: request.operator_tip,
				gas_per_pubdata: Some(gas_per_pubdata),
				refund_recipient: request.refund_recipient,
				overrides,
			}));
		}

		let value = overrides.value.unwrap_or(base_cost + request.operator_tip);
		overrides.value = Some(value);
		check_base_cost(base_cost, value)?;

		let bridge = self.resolve_l1_bridge(request.token, request.bridge_address).await?;
		let call = IL1Bridge::depositCall {
			_l2Receiver: to,
			_l1Token: request.token,
			_amount: request.amount,
			_l2TxGasLimit: l2_gas_limit,
			_l2TxGasPerPubdataByte: gas_per_pubdata,
			_refundRecipient: request.refund_recipient.unwrap_or(Address::ZERO),
		};
		Ok(DepositTx::Token(overrides.apply(Transaction::call(bridge, call.abi_encode()))))
	}

	/// Sends a deposit, approving the bridge first when requested.
	async fn deposit(&self, request: &DepositRequest) -> Result<PriorityOpResponse, Self::Error> {
		match self.get_deposit_tx(request).await? {
			DepositTx::Eth(mut execute) => {
				if execute.overrides.gas_limit.is_none() {
					let gas = self.estimate_gas_request_execute(&execute).await?;
					execute.overrides.gas_limit = Some(scale_gas_limit(gas));
				}
				self.request_execute(&execute).await
			},
			DepositTx::Token(mut tx) => {
				if request.approve_erc20 {
					let bridge = self.resolve_l1_bridge(request.token, request.bridge_address).await?;
					let allowance = self
						.get_allowance_l1(request.token, Some(bridge), BlockTag::Latest)
						.await?;
					if allowance < request.amount {
						let approval = self
							.approve_erc20(
								request.token,
								request.amount,
								Some(bridge),
								&request.approve_overrides,
							)
							.await?;
						approval.wait().await?;
					}
				}
				if tx.gas_limit.is_none() {
					let gas = self.provider_l1().estimate_gas(&tx).await?;
					tx.gas_limit = Some(scale_gas_limit(gas));
				}
				let pending = self.send_l1_transaction(tx).await?;
				tracing::info!(
					tx_hash = %pending.hash(),
					token = %request.token,
					amount = %request.amount,
					"Deposit sent"
				);
				Ok(self.provider_l2().get_priority_op_response(pending))
			},
		}
	}

	/// L1 gas limit of a deposit, with the estimation safety margin applied.
	async fn estimate_gas_deposit(&self, request: &DepositRequest) -> Result<U256, Self::Error> {
		let gas = match self.get_deposit_tx(request).await? {
			DepositTx::Eth(execute) => self.estimate_gas_request_execute(&execute).await?,
			DepositTx::Token(tx) => self.provider_l1().estimate_gas(&tx).await?,
		};
		Ok(scale_gas_limit(gas))
	}

	/// Quotes everything a deposit costs, checking that the account can
	/// afford it.
	///
	/// # Errors
	///
	/// Returns [`BridgeError::InsufficientBalance`] with a recommended
	/// balance when the L1 balance does not cover the base cost, and
	/// [`BridgeError::InsufficientAllowance`] when a token deposit has no
	/// allowance.
	async fn get_full_required_deposit_fee(
		&self,
		request: &FullDepositFeeRequest,
	) -> Result<FullDepositFee, Self::Error> {
		let dummy_amount = U256::from(1);
		let mut overrides = request.overrides.clone();
		insert_gas_price(self.provider_l1(), &mut overrides).await?;
		let gas_price = estimation_gas_price(&overrides)?;
		let gas_per_pubdata = request.gas_per_pubdata.unwrap_or(default_gas_per_pubdata());

		let deposit = DepositRequest {
			token: request.token,
			amount: dummy_amount,
			to: request.to,
			bridge_address: request.bridge_address,
			custom_bridge_data: request.custom_bridge_data.clone(),
			gas_per_pubdata: Some(gas_per_pubdata),
			..Default::default()
		};
		let l2_gas_limit = self.estimate_deposit_l2_gas(&deposit).await?;
		let base_cost = self
			.get_base_cost(l2_gas_limit, Some(gas_per_pubdata), Some(gas_price))
			.await?;

		let balance = self.get_balance_l1(None, BlockTag::Latest).await?;
		if base_cost >= balance + dummy_amount {
			let min_gas = if request.token == ETH_ADDRESS {
				L1_RECOMMENDED_MIN_ETH_DEPOSIT_GAS_LIMIT
			} else {
				L1_RECOMMENDED_MIN_ERC20_DEPOSIT_GAS_LIMIT
			};
			let recommended = U256::from(min_gas) * gas_price + base_cost;
			return Err(BridgeError::InsufficientBalance { recommended }.into());
		}

		if request.token != ETH_ADDRESS {
			let allowance = self
				.get_allowance_l1(request.token, request.bridge_address, BlockTag::Latest)
				.await?;
			if allowance < dummy_amount {
				return Err(BridgeError::InsufficientAllowance {
					allowance,
					required: dummy_amount,
				}
				.into());
			}
		}

		let l1_gas_limit = self
			.estimate_gas_deposit(&DepositRequest {
				l2_gas_limit: Some(l2_gas_limit),
				overrides: overrides.without_fees(),
				..deposit
			})
			.await?;

		let fees = match overrides.gas_price {
			Some(gas_price) => FeeFields::Legacy { gas_price },
			None => FeeFields::Eip1559 {
				max_fee_per_gas: overrides.max_fee_per_gas.unwrap_or(gas_price),
				max_priority_fee_per_gas: overrides.max_priority_fee_per_gas.unwrap_or_default(),
			},
		};
		Ok(FullDepositFee {
			base_cost,
			l1_gas_limit,
			l2_gas_limit,
			fees,
		})
	}

	/// Collects the message, proof and batch coordinates of the `index`-th
	/// withdrawal in `withdrawal_hash`.
	///
	/// # Errors
	///
	/// Returns [`BridgeError::ProofNotAvailable`] until the batch holding the
	/// withdrawal has been proven.
	async fn finalize_withdrawal_params(
		&self,
		withdrawal_hash: B256,
		index: usize,
	) -> Result<FinalizeWithdrawalParams, Self::Error> {
		let l2 = self.provider_l2();
		let receipt = l2.wait_for_receipt(withdrawal_hash).await?;
		let (log, l2_to_l1_log_index) = withdrawal_log(&receipt, index)?;

		let event = IL1Messenger::L1MessageSent::decode_raw_log(log.topics.iter().copied(), &log.data, true)
			.map_err(|e| BridgeError::Protocol(format!("malformed L1MessageSent log: {}", e)))?;
		let proof = l2
			.get_log_proof(withdrawal_hash, Some(l2_to_l1_log_index))
			.await?
			.ok_or(BridgeError::ProofNotAvailable(withdrawal_hash))?;
		let l1_batch_number = log
			.l1_batch_number
			.or(receipt.l1_batch_number)
			.ok_or(BridgeError::ProofNotAvailable(withdrawal_hash))?;
		let tx_index = receipt
			.l1_batch_tx_index
			.ok_or(BridgeError::ProofNotAvailable(withdrawal_hash))?;

		Ok(FinalizeWithdrawalParams {
			l1_batch_number,
			l2_message_index: proof.id,
			l2_tx_number_in_block: tx_number_in_batch(tx_index)?,
			message: event._message,
			sender: event._sender,
			proof: proof.proof,
		})
	}

	/// Releases the `index`-th withdrawal of `withdrawal_hash` on L1.
	async fn finalize_withdrawal(
		&self,
		withdrawal_hash: B256,
		index: usize,
		overrides: &Overrides,
	) -> Result<PendingTransaction, Self::Error> {
		let params = self.finalize_withdrawal_params(withdrawal_hash, index).await?;
		let batch = U256::from(params.l1_batch_number);
		let message_index = U256::from(params.l2_message_index);

		let tx = if is_eth(params.sender) {
			let receiver = params
				.message
				.get(4..24)
				.map(Address::from_slice)
				.ok_or_else(|| BridgeError::Protocol("withdrawal message too short".to_string()))?;
			let bridges = self.provider_l2().default_bridge_addresses().await?;
			if !bridges.weth_l1.is_zero() && receiver == bridges.weth_l1 {
				let call = IL1Bridge::finalizeWithdrawalCall {
					_l2BatchNumber: batch,
					_l2MessageIndex: message_index,
					_l2TxNumberInBatch: params.l2_tx_number_in_block,
					_message: params.message,
					_merkleProof: params.proof,
				};
				Transaction::call(bridges.weth_l1, call.abi_encode())
			} else {
				let call = IZkSync::finalizeEthWithdrawalCall {
					_l2BatchNumber: batch,
					_l2MessageIndex: message_index,
					_l2TxNumberInBatch: params.l2_tx_number_in_block,
					_message: params.message,
					_merkleProof: params.proof,
				};
				let main_contract = self.provider_l2().main_contract_address().await?;
				Transaction::call(main_contract, call.abi_encode())
			}
		} else {
			let l1_bridge = self
				.provider_l2()
				.call_contract(params.sender, &IL2Bridge::l1BridgeCall {})
				.await?
				._0;
			let call = IL1Bridge::finalizeWithdrawalCall {
				_l2BatchNumber: batch,
				_l2MessageIndex: message_index,
				_l2TxNumberInBatch: params.l2_tx_number_in_block,
				_message: params.message,
				_merkleProof: params.proof,
			};
			Transaction::call(l1_bridge, call.abi_encode())
		};

		let pending = self.send_l1_transaction(overrides.apply(tx)).await?;
		tracing::info!(
			tx_hash = %pending.hash(),
			withdrawal_hash = %withdrawal_hash,
			"Withdrawal finalization sent"
		);
		Ok(pending)
	}

	async fn is_withdrawal_finalized(&self, withdrawal_hash: B256, index: usize) -> Result<bool, Self::Error> {
		let params = self.finalize_withdrawal_params(withdrawal_hash, index).await?;
		let batch = U256::from(params.l1_batch_number);
		let message_index = U256::from(params.l2_message_index);

		if is_eth(params.sender) {
			let main_contract = self.provider_l2().main_contract_address().await?;
			let call = IZkSync::isEthWithdrawalFinalizedCall {
				_l2BatchNumber: batch,
				_l2MessageIndex: message_index,
			};
			return Ok(self.provider_l1().call_contract(main_contract, &call).await?._0);
		}

		let l1_bridge = self
			.provider_l2()
			.call_contract(params.sender, &IL2Bridge::l1BridgeCall {})
			.await?
			._0;
		let call = IL1Bridge::isWithdrawalFinalizedCall {
			_l2BatchNumber: batch,
			_l2MessageIndex: message_index,
		};
		Ok(self.provider_l1().call_contract(l1_bridge, &call).await?._0)
	}

	/// Recovers the tokens of a deposit whose L2 execution failed.
	///
	/// # Errors
	///
	/// Returns [`BridgeError::CannotClaimSuccessfulDeposit`] when the
	/// bootloader reports the deposit as executed.
	async fn claim_failed_deposit(
		&self,
		deposit_hash: B256,
		overrides: &Overrides,
	) -> Result<PendingTransaction, Self::Error> {
		let l2 = self.provider_l2();
		let receipt = l2.wait_for_receipt(deposit_hash).await?;
		let (log_index, outcome) = receipt
			.l2_to_l1_logs
			.iter()
			.enumerate()
			.find(|(_, log)| log.sender == BOOTLOADER_FORMAL_ADDRESS && log.key == deposit_hash)
			.ok_or(BridgeError::LogNotFound {
				what: "deposit outcome log",
				tx_hash: deposit_hash,
			})?;
		if !outcome.value.is_zero() {
			return Err(BridgeError::CannotClaimSuccessfulDeposit(deposit_hash).into());
		}

		let tx = l2
			.get_transaction(deposit_hash)
			.await?
			.ok_or_else(|| ProviderError::NotFound(format!("transaction {}", deposit_hash)))?;
		let l1_bridge = undo_l1_to_l2_alias(receipt.from);
		if receipt.to.is_none() {
			return Err(BridgeError::Protocol("L2 bridge address not found".to_string()).into());
		}
		let deposit = IL2Bridge::finalizeDepositCall::abi_decode(&tx.input, true)
			.map_err(|e| BridgeError::Protocol(format!("not a bridge deposit: {}", e)))?;

		let proof = l2
			.get_log_proof(deposit_hash, Some(log_index as u64))
			.await?
			.ok_or(BridgeError::ProofNotAvailable(deposit_hash))?;
		let l1_batch_number = receipt
			.l1_batch_number
			.ok_or(BridgeError::ProofNotAvailable(deposit_hash))?;
		let tx_index = receipt
			.l1_batch_tx_index
			.ok_or(BridgeError::ProofNotAvailable(deposit_hash))?;

		let call = IL1Bridge::claimFailedDepositCall {
			_depositSender: deposit._l1Sender,
			_l1Token: deposit._l1Token,
			_l2TxHash: deposit_hash,
			_l2BatchNumber: U256::from(l1_batch_number),
			_l2MessageIndex: U256::from(proof.id),
			_l2TxNumberInBatch: tx_number_in_batch(tx_index)?,
			_merkleProof: proof.proof,
		};
		let tx = overrides.apply(Transaction::call(l1_bridge, call.abi_encode()));
		let pending = self.send_l1_transaction(tx).await?;
		tracing::info!(
			tx_hash = %pending.hash(),
			deposit_hash = %deposit_hash,
			"Failed deposit claim sent"
		);
		Ok(pending)
	}

	/// Requests an L2 execution through the main contract's priority queue.
	async fn request_execute(&self, request: &RequestExecuteRequest) -> Result<PriorityOpResponse, Self::Error> {
		let tx = self.get_request_execute_tx(request).await?;
		let pending = self.send_l1_transaction(tx).await?;
		tracing::info!(
			tx_hash = %pending.hash(),
			contract = %request.contract_address,
			"Priority operation sent"
		);
		Ok(self.provider_l2().get_priority_op_response(pending))
	}

	/// L1 gas of a request-execute call, estimated without fee fields.
	async fn estimate_gas_request_execute(&self, request: &RequestExecuteRequest) -> Result<U256, Self::Error> {
		let mut tx = self.get_request_execute_tx(request).await?;
		tx.fees = None;
		tx.kind = TransactionKind::Legacy;
		Ok(self.provider_l1().estimate_gas(&tx).await?)
	}

	/// Builds the `requestL2Transaction` call without sending it.
	///
	/// Its value defaults to `base_cost + operator_tip + l2_value`.
	async fn get_request_execute_tx(&self, request: &RequestExecuteRequest) -> Result<Transaction, Self::Error> {
		let from = self.address();
		let main_contract = self.provider_l2().main_contract_address().await?;
		let gas_per_pubdata = request.gas_per_pubdata.unwrap_or(default_gas_per_pubdata());
		let mut overrides = request.overrides.clone();
		overrides.from = overrides.from.or(Some(from));

		let l2_gas_limit = match request.l2_gas_limit {
			Some(limit) => limit,
			None => {
				let execute = L1ToL2ExecuteRequest {
					contract_address: request.contract_address,
					calldata: request.calldata.clone(),
					caller: None,
					l2_value: request.l2_value,
					factory_deps: request.factory_deps.clone(),
					gas_per_pubdata: Some(gas_per_pubdata),
				};
				self.provider_l2().estimate_l1_to_l2_execute(&execute).await?
			},
		};

		insert_gas_price(self.provider_l1(), &mut overrides).await?;
		let gas_price = estimation_gas_price(&overrides)?;
		let base_cost = self
			.get_base_cost(l2_gas_limit, Some(gas_per_pubdata), Some(gas_price))
			.await?;
		let value = overrides
			.value
			.unwrap_or(base_cost + request.operator_tip + request.l2_value);
		overrides.value = Some(value);
		check_base_cost(base_cost, value)?;

		let call = IZkSync::requestL2TransactionCall {
			_contractL2: request.contract_address,
			_l2Value: request.l2_value,
			_calldata: request.calldata.clone(),
			_l2GasLimit: l2_gas_limit,
			_l2GasPerPubdataByteLimit: gas_per_pubdata,
			_factoryDeps: request.factory_deps.clone(),
			_refundRecipient: request.refund_recipient.unwrap_or(from),
		};
		Ok(overrides.apply(Transaction::call(main_contract, call.abi_encode())))
	}
}

impl<T: L1TransactionCapable> L1Adapter for T {}

/// Asks the L1 WETH bridge for the L2 counterpart of `token`.
pub async fn probe_l1_weth_bridge(l1: &EthClient, bridges: &BridgeAddresses, token: Address) -> BridgeProbe {
	if bridges.weth_l1.is_zero() {
		return BridgeProbe::NotFound;
	}
	let call = IL1Bridge::l2TokenAddressCall { _l1Token: token };
	let answer = l1.call_contract(bridges.weth_l1, &call).await.map(|r| r._0);
	let probe = BridgeProbe::from_answer(answer);
	if let BridgeProbe::Unknown(reason) = &probe {
		tracing::debug!(token = %token, reason = %reason, "L1 WETH bridge probe failed");
	}
	probe
}

/// Token metadata the default ERC-20 bridge forwards to L2, read from the
/// L1 token contract.
pub async fn l1_token_bridge_data(l1: &EthClient, token: Address) -> Result<Bytes, ProviderError> {
	let name = l1.call_contract(token, &IERC20::nameCall {}).await?._0;
	let symbol = l1.call_contract(token, &IERC20::symbolCall {}).await?._0;
	let decimals = l1.call_contract(token, &IERC20::decimalsCall {}).await?._0;
	Ok(erc20_default_bridge_data(&name, &symbol, decimals))
}

async fn estimate_bridge_deposit(
	l2: &Provider,
	l1_bridge: Address,
	l2_bridge: Address,
	l2_value: U256,
	calldata: Bytes,
	gas_per_pubdata: U256,
) -> Result<U256, ProviderError> {
	let execute = L1ToL2ExecuteRequest {
		contract_address: l2_bridge,
		calldata,
		caller: Some(apply_l1_to_l2_alias(l1_bridge)),
		l2_value,
		factory_deps: Vec::new(),
		gas_per_pubdata: Some(gas_per_pubdata),
	};
	l2.estimate_l1_to_l2_execute(&execute).await
}

/// The `index`-th `L1MessageSent` log of `receipt`, with the position of its
/// L2->L1 log among all of the receipt's L2->L1 logs.
fn withdrawal_log(receipt: &TransactionReceipt, index: usize) -> Result<(&Log, u64), BridgeError> {
	let tx_hash = receipt.transaction_hash;
	let log = receipt
		.logs
		.iter()
		.filter(|log| log.address == L1_MESSENGER_ADDRESS)
		.filter(|log| log.topics.first() == Some(&IL1Messenger::L1MessageSent::SIGNATURE_HASH))
		.nth(index)
		.ok_or(BridgeError::LogNotFound {
			what: "L1MessageSent log",
			tx_hash,
		})?;
	let position = receipt
		.l2_to_l1_logs
		.iter()
		.enumerate()
		.filter(|(_, log)| log.sender == L1_MESSENGER_ADDRESS)
		.nth(index)
		.map(|(position, _)| position as u64)
		.ok_or(BridgeError::LogNotFound {
			what: "L2->L1 log",
			tx_hash,
		})?;
	Ok((log, position))
}

fn tx_number_in_batch(index: u64) -> Result<u16, BridgeError> {
	u16::try_from(index)
		.map_err(|_| BridgeError::Protocol(format!("transaction index {} exceeds u16", index)))
}

fn estimation_gas_price(overrides: &Overrides) -> Result<U256, BridgeError> {
	overrides
		.gas_price_for_estimation()
		.ok_or(BridgeError::MissingFeeData)
}

fn default_gas_per_pubdata() -> U256 {
	U256::from(REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT)
}
