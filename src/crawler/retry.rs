//! Bounded-retry combinator
//!
//! Wraps a fallible async operation in an explicit retry loop, parameterized
//! by maximum attempt count, backoff, and an optional cap on total retry
//! time. The operation receives a mutable context each attempt so it can
//! drive stateful collaborators like a browsing session.

use futures::future::BoxFuture;
use std::time::{Duration, Instant};

/// Retry parameters
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (at least 1)
    pub max_attempts: u32,

    /// Delay between attempts
    pub backoff: Duration,

    /// Cap on total time spent in the retry loop; `None` means unbounded
    pub time_cap: Option<Duration>,
}

/// Why a retried operation ultimately failed
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Attempts actually made
    pub attempts: u32,

    /// The error from the final attempt
    pub last_error: E,

    /// Whether the time cap cut the loop short of `max_attempts`
    pub timed_out: bool,
}

/// Runs `op` until it succeeds or the policy is exhausted
///
/// Between attempts the loop sleeps for the policy backoff. The time cap is
/// checked after each failed attempt; when exceeded, the loop stops even if
/// attempts remain.
pub async fn with_retry<Ctx, T, E, F>(
    policy: &RetryPolicy,
    ctx: &mut Ctx,
    mut op: F,
) -> Result<T, RetryFailure<E>>
where
    Ctx: ?Sized,
    E: std::fmt::Display,
    F: for<'a> FnMut(&'a mut Ctx) -> BoxFuture<'a, Result<T, E>>,
{
    let started = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match op(ctx).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempts >= policy.max_attempts {
                    return Err(RetryFailure {
                        attempts,
                        last_error: error,
                        timed_out: false,
                    });
                }

                if let Some(cap) = policy.time_cap {
                    if started.elapsed() >= cap {
                        tracing::warn!(
                            "Retry time budget {:?} exhausted after {} attempts",
                            cap,
                            attempts
                        );
                        return Err(RetryFailure {
                            attempts,
                            last_error: error,
                            timed_out: true,
                        });
                    }
                }

                tracing::debug!(
                    "Attempt {}/{} failed: {}, retrying in {:?}",
                    attempts,
                    policy.max_attempts,
                    error,
                    policy.backoff
                );
                tokio::time::sleep(policy.backoff).await;
            }
        }
    }
}
