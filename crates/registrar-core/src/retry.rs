//! Exponential backoff executor.
//!
//! Retries a fallible async operation up to `max_retries` times after the
//! first attempt. The delay starts at `delay_ms` and is multiplied by
//! `backoff_multiplier` after every failed attempt that is followed by
//! another one. Each call owns its backoff state, so concurrent calls never
//! interfere.

use backoff::{backoff::Backoff, ExponentialBackoff};
use registrar_types::RetryOptions;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Upper bound for a single delay.
const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Deterministic backoff for `options`: no jitter and no elapsed-time cap.
pub(crate) fn exponential_backoff(options: &RetryOptions) -> ExponentialBackoff {
	let initial = options.initial_delay();
	ExponentialBackoff {
		current_interval: initial,
		initial_interval: initial,
		randomization_factor: 0.0,
		multiplier: options.backoff_multiplier,
		max_interval: MAX_INTERVAL,
		max_elapsed_time: None,
		..Default::default()
	}
}

/// Runs `operation` until it succeeds or `max_retries + 1` attempts have
/// failed, returning the last error in that case.
pub async fn retry_with_backoff<T, E, F, Fut>(
	mut operation: F,
	options: &RetryOptions,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: Display,
{
	let mut backoff = exponential_backoff(options);
	let mut attempts: u32 = 0;

	loop {
		match operation().await {
			Ok(result) => return Ok(result),
			Err(e) => {
				attempts += 1;

				if attempts > options.max_retries {
					if options.max_retries > 0 {
						warn!("Operation failed after {} attempts, giving up: {}", attempts, e);
					}
					return Err(e);
				}

				match backoff.next_backoff() {
					Some(delay) => {
						warn!(
							"Attempt {}/{} failed, retrying in {:?}: {}",
							attempts,
							options.max_retries + 1,
							delay,
							e
						);
						tokio::time::sleep(delay).await;
					}
					None => return Err(e),
				}
			}
		}
	}
}
