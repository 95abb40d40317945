use std::{fmt, io};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// The name-resolution primitive failed for a single attempt.
#[derive(Debug, Error)]
#[error("failed to look up host '{hostname}': {source}")]
pub struct LookupError {
    pub hostname: String,
    #[source]
    pub source: io::Error,
}

impl LookupError {
    pub fn new(hostname: impl Into<String>, source: io::Error) -> Self {
        Self {
            hostname: hostname.into(),
            source,
        }
    }
}

/// What the final attempt produced before the orchestrator gave up.
#[derive(Debug)]
pub enum LastOutcome<E> {
    Failed(E),
    Empty,
}

impl<E: fmt::Display> fmt::Display for LastOutcome<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastOutcome::Failed(err) => write!(f, "last attempt failed: {}", err),
            LastOutcome::Empty => f.write_str("last attempt still empty"),
        }
    }
}

/// Terminal outcome of a retrying resolution. Per-attempt errors never escape on their own; they
/// are carried here as the last outcome.
#[derive(Debug, Error)]
pub enum ResolveError<E: fmt::Debug + fmt::Display> {
    #[error("gave up after {attempts} attempts, {last}")]
    Exhausted { attempts: u32, last: LastOutcome<E> },
    #[error("resolution deadline elapsed after {attempts} attempts{}", DisplayLast(.last))]
    DeadlineElapsed {
        attempts: u32,
        last: Option<LastOutcome<E>>,
    },
    #[error("resolution cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl<E: fmt::Debug + fmt::Display> ResolveError<E> {
    /// Number of attempts that were started before the resolution terminated.
    pub fn attempts(&self) -> u32 {
        match self {
            ResolveError::Exhausted { attempts, .. }
            | ResolveError::DeadlineElapsed { attempts, .. }
            | ResolveError::Cancelled { attempts } => *attempts,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveError::Cancelled { .. })
    }
}

struct DisplayLast<'a, E>(&'a Option<LastOutcome<E>>);

impl<E: fmt::Display> fmt::Display for DisplayLast<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(last) => write!(f, ", {}", last),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("retry interval must be greater than zero")]
    ZeroInterval,
    #[error("resolution timeout ({timeout:?}) is shorter than the retry interval ({interval:?})")]
    TimeoutBelowInterval {
        timeout: std::time::Duration,
        interval: std::time::Duration,
    },
    #[error("jitter factor must be within [0, 1], got {0}")]
    InvalidJitter(f64),
    #[error("backoff multiplier must be at least 1, got {0}")]
    InvalidMultiplier(f64),
}
