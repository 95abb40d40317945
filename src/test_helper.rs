use std::{
    collections::{HashMap, VecDeque},
    env, io,
    net::{IpAddr, SocketAddr},
    sync::{Mutex, Once},
};

use futures_util::future::{self, BoxFuture, FutureExt};
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::{
    endpoint::{ResolvedEndpoint, ResolvedSet, SymbolicEndpoint},
    error::LookupError,
    lookup::DomainNameResolver,
    observer::ResolutionObserver,
};

pub(crate) type Step = Result<Vec<IpAddr>, io::ErrorKind>;

static INIT_LOGGER: Once = Once::new();
static CAPTURED: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

/// Keeps every record for later inspection and hands the enabled ones to pretty_env_logger.
struct CapturingLogger {
    inner: Box<dyn Log>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        CAPTURED
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

pub(crate) fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let mut builder = pretty_env_logger::formatted_builder();
        if let Ok(filters) = env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }
        let logger = CapturingLogger {
            inner: Box::new(builder.build()),
        };
        if log::set_logger(Box::leak(Box::new(logger))).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
}

/// Records logged so far whose message mentions `needle`. Tests run in parallel, so callers pick
/// a needle no other test logs.
pub(crate) fn captured_logs(needle: &str) -> Vec<(Level, String)> {
    CAPTURED
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, message)| message.contains(needle))
        .cloned()
        .collect()
}

pub(crate) fn ip(literal: &str) -> IpAddr {
    literal.parse().unwrap()
}

pub(crate) fn endpoints(literals: &[&str]) -> ResolvedSet {
    literals
        .iter()
        .map(|literal| ResolvedEndpoint::from(literal.parse::<SocketAddr>().unwrap()))
        .collect()
}

pub(crate) fn seed_endpoint() -> SymbolicEndpoint {
    SymbolicEndpoint::new("seed1.cluster.local", 5000)
}

/// Replays a fixed sequence of answers. Once a script runs out, every further lookup is empty.
#[derive(Default)]
pub(crate) struct ScriptedResolver {
    shared: Mutex<VecDeque<Step>>,
    per_host: Mutex<HashMap<String, VecDeque<Step>>>,
    hostnames: Mutex<Vec<String>>,
}

impl ScriptedResolver {
    /// Same script for every hostname.
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            shared: Mutex::new(steps.into()),
            ..Default::default()
        }
    }

    pub(crate) fn per_host(scripts: Vec<(&str, Vec<Step>)>) -> Self {
        let scripts: HashMap<String, VecDeque<Step>> = scripts
            .into_iter()
            .map(|(host, steps)| (host.to_owned(), steps.into()))
            .collect();
        Self {
            per_host: Mutex::new(scripts),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.hostnames.lock().unwrap().len()
    }

    pub(crate) fn calls_for(&self, hostname: &str) -> usize {
        self.hostnames
            .lock()
            .unwrap()
            .iter()
            .filter(|called| *called == hostname)
            .count()
    }

    pub(crate) fn hostnames(&self) -> Vec<String> {
        self.hostnames.lock().unwrap().clone()
    }

    fn next_step(&self, hostname: &str) -> Step {
        self.hostnames.lock().unwrap().push(hostname.to_owned());
        let step = match self.per_host.lock().unwrap().get_mut(hostname) {
            Some(script) => script.pop_front(),
            None => self.shared.lock().unwrap().pop_front(),
        };
        step.unwrap_or_else(|| Ok(vec![]))
    }
}

impl DomainNameResolver for ScriptedResolver {
    fn lookup<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
        let result = self
            .next_step(hostname)
            .map_err(|kind| io::Error::new(kind, "scripted lookup failure"));
        future::ready(result).boxed()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Empty(String),
    Succeeded(SymbolicEndpoint, ResolvedSet),
    Failed(String),
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn empty_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, Event::Empty(_)))
            .count()
    }
}

impl ResolutionObserver for RecordingObserver {
    fn resolution_empty(&self, hostname: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Empty(hostname.to_owned()));
    }

    fn resolution_succeeded(&self, endpoint: &SymbolicEndpoint, resolved: &ResolvedSet) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Succeeded(endpoint.clone(), resolved.clone()));
    }

    fn resolution_failed(&self, error: &LookupError) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Failed(error.hostname.clone()));
    }
}
