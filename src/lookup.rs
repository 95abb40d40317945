use std::{io, net::IpAddr, sync::Arc};

use futures_util::future::{self, BoxFuture, FutureExt};
use log::trace;
use tokio::net::lookup_host;

/// A name-resolution primitive: maps a hostname to zero or more addresses, once, without retrying.
///
/// An empty answer is a valid result and must be reported as `Ok(vec![])`, not as an error.
pub trait DomainNameResolver: Send + Sync {
    fn lookup<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>>;
}

impl<R: DomainNameResolver + ?Sized> DomainNameResolver for Arc<R> {
    fn lookup<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
        (**self).lookup(hostname)
    }
}

/// Resolves through the operating system resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl DomainNameResolver for SystemResolver {
    fn lookup<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
        async move {
            // The port is irrelevant here; lookup_host just needs something to pair the host with.
            let addresses = lookup_host((hostname, 0))
                .await?
                .map(|addr| addr.ip())
                .collect::<Vec<_>>();
            trace!("system lookup of {} returned {} addresses", hostname, addresses.len());
            Ok(addresses)
        }
        .boxed()
    }
}

/// Accepts IP literals only and never touches the network. Useful for statically configured
/// member lists that share the same retry machinery as DNS-based discovery.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralResolver;

impl DomainNameResolver for LiteralResolver {
    fn lookup<'a>(&'a self, hostname: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
        let result = hostname
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| vec![ip])
            .map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("'{}' is not an IP literal: {}", hostname, err),
                )
            });
        future::ready(result).boxed()
    }
}
