use futures_util::future::join_all;
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    attempt::DnsAttempt,
    config::ResolutionConfig,
    endpoint::{ResolvedSet, SymbolicEndpoint},
    error::{self, LookupError, ResolveError},
    lookup::DomainNameResolver,
    observer::{LogObserver, ResolutionObserver},
    retry::{RetryPolicy, RetryStrategy},
};

/// Resolves symbolic endpoints to concrete ones, retrying DNS until it produces something usable.
///
/// Holds no per-request state, so a single instance can serve concurrent callers.
#[derive(Debug)]
pub struct RetryingResolver<R, O = LogObserver> {
    attempt: DnsAttempt<R, O>,
    strategy: RetryStrategy,
}

impl<R: DomainNameResolver> RetryingResolver<R> {
    /// Build a resolver that logs through the `log` facade, with a policy derived from `config`.
    pub fn from_config(resolver: R, config: &ResolutionConfig) -> error::Result<Self> {
        Ok(Self::new(resolver, LogObserver, config.retry_policy()?))
    }
}

impl<R: DomainNameResolver, O: ResolutionObserver> RetryingResolver<R, O> {
    pub fn new(resolver: R, observer: O, policy: RetryPolicy) -> Self {
        Self {
            attempt: DnsAttempt::new(resolver, observer),
            strategy: RetryStrategy::new(policy),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.strategy.policy()
    }

    pub async fn resolve(
        &self,
        endpoint: &SymbolicEndpoint,
    ) -> Result<ResolvedSet, ResolveError<LookupError>> {
        self.resolve_cancellable(endpoint, &CancellationToken::new())
            .await
    }

    /// Like [`resolve`](Self::resolve), but gives up as soon as `cancel` fires.
    pub async fn resolve_cancellable(
        &self,
        endpoint: &SymbolicEndpoint,
        cancel: &CancellationToken,
    ) -> Result<ResolvedSet, ResolveError<LookupError>> {
        debug!("resolving {}", endpoint);
        self.strategy
            .apply(cancel, |_| self.attempt.attempt(endpoint))
            .await
    }

    /// Resolve several seed endpoints concurrently and merge the results.
    ///
    /// Each endpoint gets its own retry loop. The call succeeds if at least one endpoint
    /// resolved; otherwise the first endpoint's error is returned. Cancellation always wins.
    pub async fn resolve_all(
        &self,
        endpoints: &[SymbolicEndpoint],
        cancel: &CancellationToken,
    ) -> Result<ResolvedSet, ResolveError<LookupError>> {
        let results = join_all(
            endpoints
                .iter()
                .map(|endpoint| self.resolve_cancellable(endpoint, cancel)),
        )
        .await;

        let mut merged = ResolvedSet::new();
        let mut resolved_any = false;
        let mut first_error = None;
        for (endpoint, result) in endpoints.iter().zip(results) {
            match result {
                Ok(resolved) => {
                    resolved_any = true;
                    merged.extend(resolved);
                }
                Err(err) if err.is_cancelled() => return Err(err),
                Err(err) => {
                    warn!("Giving up on seed '{}': {}", endpoint, err);
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) if !resolved_any => Err(err),
            _ => Ok(merged),
        }
    }
}
