//! DNS Resolution Module
//!
//! Callback-style hostname lookup and TXT resolution over a pluggable
//! resolution engine:
//! - [`lookup`] / [`lookup_with`]: address lookup with option normalization
//!   and a reply shape chosen by the `all` flag
//! - [`resolve_txt`]: TXT records through the process-wide [`Resolver`]
//! - [`Resolver`]: an explicitly destroyed TXT resolver context
//!
//! # Architecture
//!
//! The [`Engine`] trait is the seam to the component doing the actual
//! resolution. [`SystemEngine`] is the default (getaddrinfo for addresses,
//! hickory-dns for TXT), [`OverrideEngine`] pins names to fixed addresses.
//! [`DnsClient`] holds an engine and adapts its completions into
//! [`LookupReply`] values.
//!
//! # Example
//!
//! ```rust,ignore
//! use dnslookup::dns::{self, RawLookupOptions};
//!
//! dns::lookup_with("example.com", RawLookupOptions::new().family("IPv4"), |reply| {
//!     if let Some(address) = reply.address() {
//!         println!("Resolved: {} (family {})", address, reply.family());
//!     }
//! });
//!
//! dns::resolve_txt("example.com", |records| println!("{:?}", records));
//! ```

mod config;
mod engine;
mod family;
mod gai;
mod hickory;
mod lookup;
mod options;
mod overrides;
mod resolve;
mod resolver;
mod system;

pub use config::DnsConfig;
pub use engine::{shape_addresses, ContextId, Engine, LookupHandler, TxtHandler};
pub use family::{Family, FamilyHint};
pub use lookup::{DnsClient, LookupReply};
pub use options::{hints, LookupArgs, LookupOptions, RawLookupOptions};
pub use overrides::OverrideEngine;
pub use resolve::{AddressRecord, Name, TxtRecordSet};
pub use resolver::Resolver;
pub use system::SystemEngine;

use crate::base::neterror::NetError;

/// Looks up `hostname` on the process-wide [`DnsClient`] with default
/// options. The callback receives a [`LookupReply::One`].
pub fn lookup<F>(hostname: impl Into<Name>, callback: F)
where
    F: FnOnce(LookupReply) + Send + 'static,
{
    DnsClient::global().lookup(hostname, callback)
}

/// Looks up `hostname` on the process-wide [`DnsClient`] with `options`.
pub fn lookup_with<F>(hostname: impl Into<Name>, options: RawLookupOptions, callback: F)
where
    F: FnOnce(LookupReply) + Send + 'static,
{
    DnsClient::global().lookup_with(hostname, options, callback)
}

/// Queries TXT records on the process-wide default [`Resolver`].
///
/// If the default resolver cannot be created, the callback receives that
/// error.
pub fn resolve_txt<F>(hostname: impl Into<Name>, callback: F)
where
    F: FnOnce(Result<TxtRecordSet, NetError>) + Send + 'static,
{
    match Resolver::global() {
        Ok(resolver) => resolver.resolve_txt(hostname, callback),
        Err(e) => callback(Err(e)),
    }
}
