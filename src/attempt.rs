use crate::{
    endpoint::{aggregate, ResolvedSet, SymbolicEndpoint},
    error::LookupError,
    lookup::DomainNameResolver,
    observer::ResolutionObserver,
};

/// Result of one resolution attempt. An empty set is a valid outcome; whether it is usable is up
/// to the retry policy.
pub type AttemptOutcome = Result<ResolvedSet, LookupError>;

/// Performs a single DNS resolution of a symbolic endpoint. Never retries.
#[derive(Debug, Clone)]
pub struct DnsAttempt<R, O> {
    resolver: R,
    observer: O,
}

impl<R: DomainNameResolver, O: ResolutionObserver> DnsAttempt<R, O> {
    pub fn new(resolver: R, observer: O) -> Self {
        Self { resolver, observer }
    }

    pub async fn attempt(&self, endpoint: &SymbolicEndpoint) -> AttemptOutcome {
        let addresses = match self.resolver.lookup(endpoint.hostname()).await {
            Ok(addresses) => addresses,
            Err(source) => {
                let err = LookupError::new(endpoint.hostname(), source);
                self.observer.resolution_failed(&err);
                return Err(err);
            }
        };

        // The port is never looked up, it is carried through from the symbolic endpoint
        let resolved = aggregate(addresses, endpoint.port());
        if resolved.is_empty() {
            self.observer.resolution_empty(endpoint.hostname());
        } else {
            self.observer.resolution_succeeded(endpoint, &resolved);
        }

        Ok(resolved)
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}
