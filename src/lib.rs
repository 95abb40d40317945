#![warn(rust_2018_idioms)]

mod attempt;
pub mod config;
mod endpoint;
pub mod error;
pub mod lookup;
mod observer;
pub mod retry;
mod resolver;

#[cfg(test)]
mod test_helper;

pub use crate::{
    attempt::{AttemptOutcome, DnsAttempt},
    config::ResolutionConfig,
    endpoint::{aggregate, ResolvedEndpoint, ResolvedSet, SymbolicEndpoint},
    observer::{LogObserver, NoopObserver, ResolutionObserver},
    resolver::RetryingResolver,
};
pub use tokio_util::sync::CancellationToken;

// General overview of architecture:
//
// A RetryingResolver turns a SymbolicEndpoint (hostname + port) into a ResolvedSet of
// ResolvedEndpoints for the cluster discovery layer. It is a thin pairing of two pieces:
//
// - DnsAttempt performs exactly one lookup through a DomainNameResolver, pairs every returned
//   address with the endpoint's port and collapses duplicates. An empty answer is a successful
//   attempt with an empty set, not an error. Events go to an injected ResolutionObserver.
// - RetryStrategy knows nothing about DNS. It drives any closure returning a collection, waits
//   between unsuccessful attempts according to its RetryPolicy and stops on the first accepted
//   outcome, on an exhausted budget, at the deadline, or when the CancellationToken fires.
//
// Only the terminal outcome crosses the RetryingResolver boundary. Per-attempt lookup errors are
// reported to the observer and folded into ResolveError as the last outcome.
