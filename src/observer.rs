use std::sync::Arc;

use log::{error, info, warn};

use crate::{
    endpoint::{display_set, ResolvedSet, SymbolicEndpoint},
    error::LookupError,
};

/// Side-effect hooks fired by a resolution attempt. Implementations must not block; nothing they
/// do can change the outcome of the attempt.
pub trait ResolutionObserver: Send + Sync {
    /// The hostname resolved, but to nothing.
    fn resolution_empty(&self, hostname: &str);

    /// The endpoint resolved to a non-empty set.
    fn resolution_succeeded(&self, endpoint: &SymbolicEndpoint, resolved: &ResolvedSet);

    /// The name-resolution primitive itself failed.
    fn resolution_failed(&self, _error: &LookupError) {}
}

impl<O: ResolutionObserver + ?Sized> ResolutionObserver for Arc<O> {
    fn resolution_empty(&self, hostname: &str) {
        (**self).resolution_empty(hostname)
    }

    fn resolution_succeeded(&self, endpoint: &SymbolicEndpoint, resolved: &ResolvedSet) {
        (**self).resolution_succeeded(endpoint, resolved)
    }

    fn resolution_failed(&self, error: &LookupError) {
        (**self).resolution_failed(error)
    }
}

/// Writes resolution events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ResolutionObserver for LogObserver {
    fn resolution_empty(&self, hostname: &str) {
        error!("Failed to resolve host '{}'", hostname);
    }

    fn resolution_succeeded(&self, endpoint: &SymbolicEndpoint, resolved: &ResolvedSet) {
        info!(
            "Resolved initial host '{}' to {}",
            endpoint,
            display_set(resolved)
        );
    }

    fn resolution_failed(&self, error: &LookupError) {
        warn!("{}", error);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ResolutionObserver for NoopObserver {
    fn resolution_empty(&self, _hostname: &str) {}

    fn resolution_succeeded(&self, _endpoint: &SymbolicEndpoint, _resolved: &ResolvedSet) {}
}

#[cfg(test)]
mod tests {
    use std::io;

    use log::Level;

    use super::*;
    use crate::{endpoint::aggregate, test_helper::*};

    #[test]
    fn log_observer_levels_test() {
        init_logger();

        LogObserver.resolution_empty("empty.levels.test");
        LogObserver.resolution_succeeded(
            &SymbolicEndpoint::new("resolved.levels.test", 5000),
            &aggregate(vec![ip("192.0.2.11"), ip("192.0.2.10")], 5000),
        );
        LogObserver.resolution_failed(&LookupError::new(
            "failed.levels.test",
            io::Error::new(io::ErrorKind::Other, "resolver unreachable"),
        ));

        assert_eq!(
            captured_logs("empty.levels.test"),
            vec![(
                Level::Error,
                "Failed to resolve host 'empty.levels.test'".to_owned()
            )]
        );
        assert_eq!(
            captured_logs("resolved.levels.test"),
            vec![(
                Level::Info,
                "Resolved initial host 'resolved.levels.test:5000' to \
                 [192.0.2.10:5000, 192.0.2.11:5000]"
                    .to_owned()
            )]
        );
        assert_eq!(
            captured_logs("failed.levels.test"),
            vec![(
                Level::Warn,
                "failed to look up host 'failed.levels.test': resolver unreachable".to_owned()
            )]
        );
    }
}
