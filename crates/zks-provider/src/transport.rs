//! JSON-RPC transports.

use crate::ProviderError;
use alloy_rpc_client::RpcClient;
use alloy_transport::{RpcError, TransportErrorKind};
use alloy_transport_http::Http;
use async_trait::async_trait;
use serde_json::Value;

/// Trait defining the interface for delivering JSON-RPC requests.
///
/// Implementations return the `result` member of the response, or
/// [`ProviderError::Rpc`] when the node answered with an error object.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Sends `method` with positional `params` and returns the raw result.
	async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}

/// JSON-RPC 2.0 over HTTP, backed by an alloy [`RpcClient`].
pub struct HttpTransport {
	client: RpcClient<Http<reqwest::Client>>,
	url: reqwest::Url,
}

impl std::fmt::Debug for HttpTransport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HttpTransport")
			.field("url", &self.url.as_str())
			.finish_non_exhaustive()
	}
}

impl HttpTransport {
	/// Creates a transport for `url` with a default HTTP client.
	pub fn new(url: &str) -> Result<Self, ProviderError> {
		Self::with_client(reqwest::Client::new(), url)
	}

	/// Creates a transport for `url` reusing an existing HTTP client.
	pub fn with_client(client: reqwest::Client, url: &str) -> Result<Self, ProviderError> {
		let url = reqwest::Url::parse(url)
			.map_err(|e| ProviderError::Transport(format!("Invalid RPC URL '{}': {}", url, e)))?;
		let is_local = alloy_transport::utils::guess_local_url(url.as_str());
		let client = RpcClient::new(Http::with_client(client, url.clone()), is_local);
		Ok(Self { client, url })
	}

	pub fn url(&self) -> &reqwest::Url {
		&self.url
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
		tracing::trace!(method = method, "Sending JSON-RPC request");
		self.client
			.request::<Value, Value>(method.to_string(), params)
			.await
			.or_else(|e| map_rpc_error(method, e))
	}
}

/// Maps an alloy transport failure onto [`ProviderError`]. A `null` result
/// is a value, not an error.
fn map_rpc_error(method: &str, err: RpcError<TransportErrorKind>) -> Result<Value, ProviderError> {
	match err {
		RpcError::ErrorResp(payload) => {
			tracing::debug!(
				method = method,
				code = payload.code,
				message = %payload.message,
				"JSON-RPC request failed"
			);
			Err(ProviderError::Rpc {
				code: payload.code,
				message: payload.message.to_string(),
				data: payload
					.data
					.and_then(|raw| serde_json::from_str(raw.get()).ok()),
			})
		},
		RpcError::NullResp => Ok(Value::Null),
		RpcError::DeserError { err, .. } => Err(ProviderError::invalid_response(method, err)),
		other => Err(ProviderError::Transport(other.to_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_json_rpc::ErrorPayload;
	use serde_json::value::RawValue;

	#[test]
	fn test_rejects_invalid_url() {
		assert!(matches!(
			HttpTransport::new("not a url"),
			Err(ProviderError::Transport(_))
		));
		let transport = HttpTransport::new("http://localhost:3050").unwrap();
		assert_eq!(transport.url().as_str(), "http://localhost:3050/");
	}

	#[test]
	fn test_error_response_maps_to_rpc() {
		let payload = ErrorPayload {
			code: 3,
			message: "execution reverted".into(),
			data: Some(RawValue::from_string("\"0x08c379a0\"".to_string()).unwrap()),
		};
		match map_rpc_error("eth_call", RpcError::ErrorResp(payload)) {
			Err(ProviderError::Rpc { code, message, data }) => {
				assert_eq!(code, 3);
				assert_eq!(message, "execution reverted");
				assert_eq!(data, Some(serde_json::json!("0x08c379a0")));
			},
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn test_null_result_and_transport_failures() {
		assert_eq!(map_rpc_error("eth_getTransactionReceipt", RpcError::NullResp).unwrap(), Value::Null);

		let err = map_rpc_error(
			"eth_chainId",
			RpcError::Transport(TransportErrorKind::BackendGone),
		)
		.unwrap_err();
		assert!(err.is_retryable());
	}

	#[tokio::test]
	async fn test_unreachable_node_is_transport_error() {
		let transport = HttpTransport::new("http://127.0.0.1:1").unwrap();
		let err = transport
			.request("eth_chainId", serde_json::json!([]))
			.await
			.unwrap_err();
		assert!(matches!(err, ProviderError::Transport(_)));
	}
}
