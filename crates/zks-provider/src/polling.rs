//! Polling cadence shared by every wait operation.

use crate::ProviderError;
use std::future::Future;
use std::time::Duration;
use zks_types::utils::DEFAULT_POLLING_INTERVAL_MS;

/// How often a wait re-queries the node, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
	pub interval: Duration,
	/// Upper bound on the number of queries; unbounded when `None`.
	pub max_attempts: Option<u32>,
}

impl Default for PollingConfig {
	fn default() -> Self {
		Self {
			interval: Duration::from_millis(DEFAULT_POLLING_INTERVAL_MS),
			max_attempts: None,
		}
	}
}

impl PollingConfig {
	pub fn new(interval: Duration, max_attempts: Option<u32>) -> Self {
		Self {
			interval,
			max_attempts,
		}
	}

	/// Runs `attempt` until it yields a value.
	///
	/// Errors from `attempt` end the loop immediately.
	///
	/// # Errors
	///
	/// Returns [`ProviderError::PollingExhausted`] once `max_attempts` queries
	/// came back empty.
	pub async fn poll<T, F, Fut>(&self, what: &str, mut attempt: F) -> Result<T, ProviderError>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<Option<T>, ProviderError>>,
	{
		let mut attempts = 0u32;
		loop {
			attempts += 1;
			if let Some(value) = attempt().await? {
				return Ok(value);
			}
			if self.max_attempts.is_some_and(|max| attempts >= max) {
				return Err(ProviderError::PollingExhausted {
					what: what.to_string(),
					attempts,
				});
			}
			tracing::trace!(what = what, attempts = attempts, "Still waiting");
			tokio::time::sleep(self.interval).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn test_poll_until_ready() {
		let config = PollingConfig::default();
		let mut remaining = 3;
		let value = config
			.poll("value", || {
				remaining -= 1;
				let ready = remaining == 0;
				async move { Ok(ready.then_some(7)) }
			})
			.await
			.unwrap();
		assert_eq!(value, 7);
	}

	#[tokio::test(start_paused = true)]
	async fn test_poll_gives_up() {
		let config = PollingConfig::new(Duration::from_millis(10), Some(2));
		let result: Result<(), _> = config.poll("receipt", || async { Ok(None) }).await;
		assert!(matches!(
			result,
			Err(ProviderError::PollingExhausted { attempts: 2, .. })
		));
	}
}
