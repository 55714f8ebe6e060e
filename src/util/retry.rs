// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::error::Error;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// HTTP statuses the shared policy retries on: throttling, internal error, unavailable.
pub const RETRYABLE_STATUSES: [u16; 3] = [429, 500, 503];

/// Errors that may carry an HTTP status from the upstream service.
pub trait RetryableError: Error + Send + Sync {
    /// HTTP status code of the failed call, if the failure reached the service.
    fn status_code(&self) -> Option<u16>;
}

/// Shared exponential backoff policy applied to every upstream call.
///
/// The default policy makes at most 5 attempts and waits `base_delay * 2^n`
/// between attempt `n` and `n + 1` (1s, 2s, 4s, 8s). Only statuses listed in
/// `retryable_statuses` are retried; every other failure surfaces immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            retryable_statuses: RETRYABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt count and base delay, retrying the default statuses.
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// Whether a failure with this status should be attempted again.
    pub fn is_retryable(&self, status: Option<u16>) -> bool {
        status.is_some_and(|s| self.retryable_statuses.contains(&s))
    }

    /// Delay to wait after the failed attempt with zero-based index `attempt`.
    pub fn backoff(&self, attempt: usize) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

/// Run `operation` under `policy`, retrying retryable failures with exponential backoff.
///
/// At least one attempt is always made, even when `max_attempts` is zero.
/// The error of the last attempt is returned when all attempts fail.
pub async fn retry_with_policy<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let status = e.status_code();
                if !policy.is_retryable(status) || attempt + 1 >= max_attempts {
                    return Err(e);
                }

                let backoff = policy.backoff(attempt);
                warn!(
                    "Retryable error in {} (attempt {}/{}, status={:?}, backoff_ms={}): {}",
                    operation_name,
                    attempt + 1,
                    max_attempts,
                    status,
                    backoff.as_millis(),
                    e
                );

                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
