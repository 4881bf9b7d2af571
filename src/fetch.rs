//! # Retrying HTTP Fetcher
//!
//! Wraps a GET request with bounded exponential-backoff retry. Attempt `n`
//! (zero-based) sleeps `backoff * 2^n` before the next try; there is no
//! jitter, so backoff timing is deterministic. Once the attempt budget is
//! exhausted the last error propagates unchanged; retry policy beyond that
//! point (the cycle-level error panel loop) belongs to the caller.

use crate::config::FetchConfig;
use crate::error::TransportError;
use reqwest::Url;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential-backoff retry policy.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempts before the last error propagates (default 3)
    pub max_attempts: u32,
    /// Base backoff; attempt n sleeps `backoff * 2^n` (default 300 ms)
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(300),
        }
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(cfg: &FetchConfig) -> Self {
        RetryPolicy {
            max_attempts: cfg.retries.max(1),
            backoff: Duration::from_millis(cfg.backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// Sleep duration after the given zero-based failed attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff * 2u32.pow(attempt)
    }
}

/// Run `op` up to `policy.max_attempts` times with deterministic backoff.
///
/// Returns the first success, or the error of the final attempt.
pub async fn with_retries<T, E, Op, Fut>(policy: &RetryPolicy, mut op: Op) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt + 1 >= policy.max_attempts {
                    return Err(err);
                }
                tokio::time::sleep(policy.delay(attempt)).await;
                attempt += 1;
            }
        }
    }
}

/// GET the URL, treating non-2xx statuses as failures, with retries.
pub async fn get_with_retries(
    client: &reqwest::Client,
    url: &Url,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, TransportError> {
    with_retries(policy, move || {
        let request = client.get(url.clone());
        async move {
            let response = request.send().await?;
            Ok::<_, TransportError>(response.error_for_status()?)
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            // Keep the test quick; the doubling shape is what matters
            backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(300),
        };
        // Two failures before success mean exactly two sleeps:
        // backoff * 1 then backoff * 2.
        assert_eq!(policy.delay(0), Duration::from_millis(300));
        assert_eq!(policy.delay(1), Duration::from_millis(600));
        assert_eq!(policy.delay(2), Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn two_failures_sleep_backoff_then_double_backoff() {
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(300),
        };
        let calls = Cell::new(0u32);
        let started = tokio::time::Instant::now();
        let result: Result<&str, &str> = with_retries(&policy, || {
            let n = calls.get() + 1;
            calls.set(n);
            async move {
                if n < 3 {
                    Err("boom")
                } else {
                    Ok("response")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("response"));
        // Fail, fail, succeed: exactly two sleeps on the paused clock,
        // 300ms then 600ms, and none after the successful attempt.
        assert_eq!(started.elapsed(), policy.delay(0) + policy.delay(1));
    }

    #[tokio::test]
    async fn returns_success_on_third_attempt() {
        let calls = Cell::new(0u32);
        let result: Result<&str, &str> = with_retries(&fast_policy(), || {
            let n = calls.get() + 1;
            calls.set(n);
            async move {
                if n < 3 {
                    Err("boom")
                } else {
                    Ok("response")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("response"));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhaustion() {
        let calls = Cell::new(0u32);
        let result: Result<(), u32> = with_retries(&fast_policy(), || {
            let n = calls.get() + 1;
            calls.set(n);
            async move { Err(n) }
        })
        .await;

        // Exactly max_attempts calls, and the *last* error comes back
        assert_eq!(result, Err(3));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn first_success_skips_all_sleeps() {
        let calls = Cell::new(0u32);
        let result: Result<u32, ()> = with_retries(&fast_policy(), || {
            calls.set(calls.get() + 1);
            async { Ok(7) }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn policy_from_config_clamps_zero_retries() {
        let cfg = FetchConfig {
            retries: 0,
            backoff_ms: 100,
        };
        let policy = RetryPolicy::from(&cfg);
        assert_eq!(policy.max_attempts, 1);
    }
}
