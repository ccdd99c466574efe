//! In-memory transport for tests.
//!
//! Responses are registered per method. `eth_call` can additionally be routed
//! by target address and function selector, which lets tests stand in for
//! individual contracts.

use crate::transport::Transport;
use crate::ProviderError;
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

type MethodHandler = Box<dyn FnMut(&Value) -> Result<Value, ProviderError> + Send>;
type CallHandler = Box<dyn FnMut(&Bytes) -> Result<Bytes, ProviderError> + Send>;

#[derive(Default)]
struct MockState {
	methods: HashMap<String, MethodHandler>,
	sequences: HashMap<String, VecDeque<Value>>,
	calls: HashMap<(Address, [u8; 4]), CallHandler>,
	requests: Vec<(String, Value)>,
}

/// Transport answering from registered handlers and recording every request.
#[derive(Clone, Default)]
pub struct MockTransport {
	state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockTransport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MockTransport").finish_non_exhaustive()
	}
}

impl MockTransport {
	pub fn new() -> Self {
		Self::default()
	}

	fn state(&self) -> MutexGuard<'_, MockState> {
		self.state.lock().unwrap_or_else(|e| e.into_inner())
	}

	/// Answers `method` with the result of `handler`.
	pub fn on<F>(&self, method: &str, handler: F) -> &Self
	where
		F: FnMut(&Value) -> Result<Value, ProviderError> + Send + 'static,
	{
		self.state().methods.insert(method.to_string(), Box::new(handler));
		self
	}

	/// Answers `method` with a fixed value.
	pub fn respond(&self, method: &str, value: Value) -> &Self {
		self.on(method, move |_| Ok(value.clone()))
	}

	/// Answers successive `method` requests with `values` in order. The last
	/// value keeps being returned once the queue is drained.
	pub fn respond_seq(&self, method: &str, values: Vec<Value>) -> &Self {
		self.state()
			.sequences
			.insert(method.to_string(), values.into_iter().collect());
		self
	}

	/// Answers `eth_call` to `to` whose calldata starts with `selector`.
	pub fn on_call<F>(&self, to: Address, selector: [u8; 4], handler: F) -> &Self
	where
		F: FnMut(&Bytes) -> Result<Bytes, ProviderError> + Send + 'static,
	{
		self.state().calls.insert((to, selector), Box::new(handler));
		self
	}

	/// Makes `eth_call` to `to` with `selector` revert.
	pub fn revert_call(&self, to: Address, selector: [u8; 4]) -> &Self {
		self.on_call(to, selector, |_| Err(reverted()))
	}

	/// Every request received so far.
	pub fn requests(&self) -> Vec<(String, Value)> {
		self.state().requests.clone()
	}

	/// Parameters of every request made with `method`.
	pub fn requests_to(&self, method: &str) -> Vec<Value> {
		self.state()
			.requests
			.iter()
			.filter(|(m, _)| m == method)
			.map(|(_, params)| params.clone())
			.collect()
	}
}

/// Error a node returns for a reverted call.
pub fn reverted() -> ProviderError {
	ProviderError::Rpc {
		code: 3,
		message: "execution reverted".to_string(),
		data: None,
	}
}

fn call_route(params: &Value) -> Option<(Address, [u8; 4], Bytes)> {
	let request = params.get(0)?;
	let to: Address = serde_json::from_value(request.get("to")?.clone()).ok()?;
	let data: Bytes = serde_json::from_value(request.get("data")?.clone()).ok()?;
	let selector: [u8; 4] = data.get(..4)?.try_into().ok()?;
	Some((to, selector, data))
}

#[async_trait]
impl Transport for MockTransport {
	async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
		let mut state = self.state();
		state.requests.push((method.to_string(), params.clone()));

		if method == "eth_call" {
			if let Some((to, selector, data)) = call_route(&params) {
				if let Some(handler) = state.calls.get_mut(&(to, selector)) {
					return handler(&data).map(|out| Value::String(out.to_string()));
				}
			}
		}

		if let Some(queue) = state.sequences.get_mut(method) {
			let value = if queue.len() > 1 {
				queue.pop_front()
			} else {
				queue.front().cloned()
			};
			if let Some(value) = value {
				return Ok(value);
			}
		}

		match state.methods.get_mut(method) {
			Some(handler) => handler(&params),
			None => Err(ProviderError::Rpc {
				code: -32601,
				message: format!("Method not found: {}", method),
				data: None,
			}),
		}
	}
}
