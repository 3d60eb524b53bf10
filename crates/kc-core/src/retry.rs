//! Fixed-interval retry bounded by an overall deadline.
//!
//! The identity provider may briefly serve stale or partially populated
//! records right after a write. Callers that read their own writes wrap the
//! read in [`retry_until_deadline`] instead of failing on the first miss.
//!
//! There is no exponential backoff and no jitter: every attempt is followed
//! by the same pause until the next attempt would start past the deadline.
//! An attempt still running when the deadline passes is cancelled.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::error::{Error, Result};

/// Default pause between attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);
/// Default overall deadline.
pub const DEFAULT_RETRY_DEADLINE: Duration = Duration::from_secs(30);

/// Polling interval and overall deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Pause between two attempts.
    pub interval: Duration,
    /// Overall wall-clock budget, measured from the first attempt.
    pub deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            deadline: DEFAULT_RETRY_DEADLINE,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }

    /// Checks that the interval is positive and fits in the deadline.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::config("retry interval must be positive"));
        }
        if self.interval > self.deadline {
            return Err(Error::config(format!(
                "retry interval {:?} exceeds deadline {:?}",
                self.interval, self.deadline
            )));
        }
        Ok(())
    }
}

/// Failure of a retried operation.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The operation failed with an error the predicate refused to retry.
    #[error("gave up after {attempts} attempt(s): {error}")]
    Aborted {
        /// Attempts made, including the failing one.
        attempts: u32,
        /// The non-retryable error.
        error: E,
    },

    /// The deadline elapsed while the operation kept failing.
    #[error("deadline of {deadline:?} exceeded after {attempts} attempt(s): {last}")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// The configured deadline.
        deadline: Duration,
        /// Error of the last attempt.
        last: E,
    },

    /// The deadline passed before any attempt completed with an error.
    #[error("deadline of {deadline:?} exceeded during attempt {attempts}")]
    TimedOut {
        /// Attempts started, including the cancelled one.
        attempts: u32,
        /// The configured deadline.
        deadline: Duration,
    },
}

impl<E> RetryError<E> {
    /// Returns the number of attempts made.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Aborted { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// Returns `true` if the deadline elapsed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. } | Self::TimedOut { .. })
    }

    /// Returns the last observed error, if any attempt completed.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Aborted { error, .. } => Some(error),
            Self::Exhausted { last, .. } => Some(last),
            Self::TimedOut { .. } => None,
        }
    }
}

/// Runs `op` until it succeeds, `should_retry` rejects its error, or
/// `policy.deadline` passes.
///
/// The deadline bounds total wall-clock time: an attempt still in flight
/// when it passes is dropped, and the error of the previous attempt (if any)
/// is reported.
pub async fn retry_until_deadline<T, E, Op, Fut, P>(
    policy: &RetryPolicy,
    mut op: Op,
    should_retry: P,
) -> std::result::Result<T, RetryError<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let started = Instant::now();
    let deadline_at = started + policy.deadline;
    let mut attempts = 0u32;
    let mut last: Option<E> = None;

    loop {
        attempts += 1;
        let error = match tokio::time::timeout_at(deadline_at, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(error)) => error,
            Err(_) => {
                tracing::debug!(attempts, deadline = ?policy.deadline, "retry deadline reached mid-attempt");
                return Err(match last {
                    Some(last) => RetryError::Exhausted {
                        attempts,
                        deadline: policy.deadline,
                        last,
                    },
                    None => RetryError::TimedOut {
                        attempts,
                        deadline: policy.deadline,
                    },
                });
            }
        };

        if !should_retry(&error) {
            return Err(RetryError::Aborted { attempts, error });
        }

        let now = Instant::now();
        let elapsed = now - started;
        if now + policy.interval > deadline_at {
            tracing::debug!(attempts, ?elapsed, "retry deadline reached");
            return Err(RetryError::Exhausted {
                attempts,
                deadline: policy.deadline,
                last: error,
            });
        }

        tracing::warn!(attempt = attempts, ?elapsed, %error, "attempt failed, retrying");
        last = Some(error);
        tokio::time::sleep_until((now + policy.interval).min(deadline_at)).await;
    }
}
