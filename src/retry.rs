use std::{
    collections::{BTreeSet, HashSet},
    fmt,
    future::Future,
    time::Duration,
};

use log::{debug, trace};
use rand::Rng;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{LastOutcome, ResolveError};

/// Anything an attempt can hand back that has a notion of emptiness.
pub trait Candidates {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, S> Candidates for HashSet<T, S> {
    fn len(&self) -> usize {
        HashSet::len(self)
    }
}

impl<T> Candidates for BTreeSet<T> {
    fn len(&self) -> usize {
        BTreeSet::len(self)
    }
}

impl<T> Candidates for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Shape of the wait between two unsuccessful attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    Fixed(Duration),
    /// `initial * multiplier^(retry - 1)`, capped at `max`.
    Exponential {
        initial: Duration,
        max: Duration,
        multiplier: f64,
    },
}

impl Backoff {
    /// Delay before retry number `retry` (1 is the wait after the first attempt), before jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs =
                    (initial.as_secs_f64() * multiplier.powi(exponent)).min(max.as_secs_f64());
                Duration::try_from_secs_f64(secs).unwrap_or(max)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Treated as 1 if zero.
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Randomizes each delay within `[delay * (1 - jitter), delay * (1 + jitter)]`.
    pub jitter: f64,
    /// Whether an empty but successful attempt ends the retry loop.
    pub accept_empty: bool,
    /// Wall-clock budget for the whole resolution, counted from the first attempt.
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            backoff: Backoff::Fixed(Duration::from_secs(5)),
            jitter: 0.0,
            accept_empty: false,
            deadline: None,
        }
    }
}

impl RetryPolicy {
    /// Jittered delay before retry number `retry`.
    pub fn delay(&self, retry: u32) -> Duration {
        apply_jitter(self.backoff.base_delay(retry), self.jitter)
    }
}

fn apply_jitter(delay: Duration, factor: f64) -> Duration {
    if factor <= 0.0 || delay.is_zero() {
        return delay;
    }

    let factor = factor.min(1.0);
    let base = delay.as_secs_f64();
    let secs = rand::thread_rng().gen_range(base * (1.0 - factor)..=base * (1.0 + factor));
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Retry,
}

/// Drives any attempt function under a [`RetryPolicy`]. Holds nothing but the policy, so one
/// strategy can be shared by any number of concurrent resolutions.
#[derive(Debug, Clone, Default)]
pub struct RetryStrategy {
    policy: RetryPolicy,
}

impl RetryStrategy {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Decide whether an attempt's outcome ends the retry loop.
    pub fn evaluate<C: Candidates, E>(&self, outcome: &Result<C, E>) -> Verdict {
        match outcome {
            Ok(candidates) if !candidates.is_empty() || self.policy.accept_empty => Verdict::Accept,
            _ => Verdict::Retry,
        }
    }

    /// Invoke `attempt_fn` (given the 1-based attempt number) until it produces an accepted
    /// outcome, the attempt budget or deadline runs out, or `cancel` fires.
    pub async fn apply<C, E, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut attempt_fn: F,
    ) -> Result<C, ResolveError<E>>
    where
        C: Candidates,
        E: fmt::Debug + fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<C, E>>,
    {
        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled { attempts: 0 });
        }

        let max_attempts = self.policy.max_attempts.max(1);
        // A budget too large to represent as an instant is no deadline at all
        let deadline = self
            .policy
            .deadline
            .and_then(|budget| Instant::now().checked_add(budget));
        let mut previous: Option<LastOutcome<E>> = None;
        let mut attempt = 0;

        loop {
            attempt += 1;
            trace!("starting attempt {}/{}", attempt, max_attempts);

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(ResolveError::Cancelled { attempts: attempt });
                }
                _ = deadline_elapsed(deadline) => {
                    return Err(ResolveError::DeadlineElapsed { attempts: attempt, last: previous });
                }
                outcome = attempt_fn(attempt) => outcome,
            };

            let verdict = self.evaluate(&outcome);
            let last = match outcome {
                Ok(candidates) if verdict == Verdict::Accept => {
                    debug!(
                        "accepted {} candidates on attempt {}/{}",
                        candidates.len(),
                        attempt,
                        max_attempts
                    );
                    return Ok(candidates);
                }
                Ok(_) => LastOutcome::Empty,
                Err(err) => LastOutcome::Failed(err),
            };
            if attempt >= max_attempts {
                debug!("attempt budget of {} exhausted, {}", max_attempts, last);
                return Err(ResolveError::Exhausted {
                    attempts: attempt,
                    last,
                });
            }

            let delay = self.policy.delay(attempt);
            debug!(
                "attempt {}/{} unsuccessful ({}), retrying in {:?}",
                attempt, max_attempts, last, delay
            );
            previous = Some(last);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(ResolveError::Cancelled { attempts: attempt });
                }
                _ = deadline_elapsed(deadline) => {
                    return Err(ResolveError::DeadlineElapsed { attempts: attempt, last: previous });
                }
                _ = sleep(delay) => {}
            }
        }
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
