//! System address lookup using getaddrinfo.
//!
//! Lookups go through the operating system's resolver via `getaddrinfo`,
//! executed on tokio's blocking pool so the async runtime never blocks.
//! This respects the system configuration (`/etc/hosts`, `/etc/resolv.conf`,
//! nsswitch and friends).

use super::engine::{shape_addresses, LookupHandler};
use super::family::Family;
use super::resolve::Name;
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

/// Runs a lookup on the blocking pool and hands the shaped result to
/// `on_complete`. Must be called from within a tokio runtime.
pub(crate) async fn lookup(name: Name, family: Family, all: bool, on_complete: LookupHandler) {
    if let Some(ip) = try_parse_literal(name.as_str()) {
        tracing::trace!(host = %name, "IP literal, skipping getaddrinfo");
        on_complete(shape_addresses([ip], family, all));
        return;
    }

    let host = name.as_str().to_string();
    let domain = host.clone();

    let result = tokio::task::spawn_blocking(move || {
        tracing::debug!(host = %host, "resolving via getaddrinfo");
        (host.as_str(), 0u16)
            .to_socket_addrs()
            .map(|iter| iter.collect::<Vec<SocketAddr>>())
            .dns_context(&host)
    })
    .await;

    // Handle task join error (cancellation, panic)
    let result = match result {
        Ok(resolved) => resolved.and_then(|addrs| shape_addresses(addrs, family, all)),
        Err(e) => {
            tracing::error!(error = %e, "DNS resolution task failed");
            Err(NetError::NameNotResolved)
        }
    };

    match &result {
        Ok(records) => {
            tracing::debug!(domain = %domain, count = records.len(), "DNS resolution complete")
        }
        Err(e) => tracing::debug!(domain = %domain, error = %e, "DNS resolution failed"),
    }

    on_complete(result);
}

/// Parses `host` as an IP literal, bypassing resolution.
///
/// Returns `None` for names that need a lookup.
pub(crate) fn try_parse_literal(host: &str) -> Option<IpAddr> {
    host.parse::<IpAddr>().ok()
}
