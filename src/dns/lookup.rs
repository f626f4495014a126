//! Address lookup: the request adapter between callers and an [`Engine`].
//!
//! A lookup is normalized, recorded as a [`PendingRequest`] together with
//! the reply shape the caller asked for, and submitted to the engine. When
//! the engine completes, the pending request is consumed and the caller's
//! callback runs exactly once, inline on the engine's completion path.

use super::config::DnsConfig;
use super::engine::Engine;
use super::family::Family;
use super::options::{hints, LookupArgs, LookupOptions, RawLookupOptions};
use super::resolve::{AddressRecord, Name};
use super::resolver::Resolver;
use super::system::SystemEngine;
use crate::base::neterror::NetError;
use std::{
    fmt,
    net::IpAddr,
    sync::{Arc, LazyLock},
};
use tokio::sync::oneshot;

/// Result of a lookup, shaped by the `all` flag given at call time.
#[derive(Debug, Clone)]
pub enum LookupReply {
    /// `all = false`: the first address only.
    One(Result<AddressRecord, NetError>),
    /// `all = true`: every address, in engine order.
    All(Result<Vec<AddressRecord>, NetError>),
}

impl LookupReply {
    pub fn is_all(&self) -> bool {
        matches!(self, LookupReply::All(_))
    }

    pub fn error(&self) -> Option<&NetError> {
        match self {
            LookupReply::One(Err(e)) | LookupReply::All(Err(e)) => Some(e),
            _ => None,
        }
    }

    /// The single address. `None` on error and in `All` mode.
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            LookupReply::One(Ok(record)) => Some(record.address()),
            _ => None,
        }
    }

    /// The family of the single address; [`Family::Unspecified`] on error
    /// and in `All` mode.
    pub fn family(&self) -> Family {
        match self {
            LookupReply::One(Ok(record)) => record.family(),
            _ => Family::Unspecified,
        }
    }

    /// Every address. `None` on error and in `One` mode.
    pub fn addresses(&self) -> Option<&[AddressRecord]> {
        match self {
            LookupReply::All(Ok(records)) => Some(records),
            _ => None,
        }
    }

    /// Flattens either shape into a list of records.
    pub fn into_result(self) -> Result<Vec<AddressRecord>, NetError> {
        match self {
            LookupReply::One(result) => result.map(|record| vec![record]),
            LookupReply::All(result) => result,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyShape {
    One,
    All,
}

impl ReplyShape {
    fn of(options: &LookupOptions) -> Self {
        if options.all {
            ReplyShape::All
        } else {
            ReplyShape::One
        }
    }

    fn reply(self, result: Result<Vec<AddressRecord>, NetError>) -> LookupReply {
        match self {
            ReplyShape::All => LookupReply::All(result),
            ReplyShape::One => LookupReply::One(
                result.and_then(|records| records.into_iter().next().ok_or(NetError::NoData)),
            ),
        }
    }
}

/// One in-flight lookup. Consumed by [`complete`](Self::complete).
struct PendingRequest<F> {
    shape: ReplyShape,
    map_v4: Option<MapV4>,
    callback: F,
}

/// IPv4-mapped IPv6 fallback requested through [`hints::V4MAPPED`].
#[derive(Debug, Clone, Copy)]
struct MapV4 {
    all: bool,
}

impl MapV4 {
    fn apply(self, records: Vec<AddressRecord>) -> Vec<AddressRecord> {
        let (v6, v4): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|record| record.family() == Family::V6);
        let mapped = v4.into_iter().filter_map(|record| match record.address() {
            IpAddr::V4(ip) => Some(AddressRecord::new(IpAddr::V6(ip.to_ipv6_mapped()))),
            IpAddr::V6(_) => None,
        });

        if self.all {
            v6.into_iter().chain(mapped).collect()
        } else if v6.is_empty() {
            mapped.collect()
        } else {
            v6
        }
    }
}

impl<F> PendingRequest<F>
where
    F: FnOnce(LookupReply),
{
    fn complete(self, result: Result<Vec<AddressRecord>, NetError>) {
        let result = match self.map_v4 {
            Some(map) => result.map(|records| map.apply(records)),
            None => result,
        };
        (self.callback)(self.shape.reply(result))
    }
}

/// Submits lookups and TXT resolvers against one engine.
///
/// `DnsClient` is cheap to clone; clones share the engine.
#[derive(Clone)]
pub struct DnsClient {
    engine: Arc<dyn Engine>,
    config: DnsConfig,
}

impl DnsClient {
    /// Creates a client backed by a fresh [`SystemEngine`].
    pub fn new() -> Self {
        Self::with_engine(Arc::new(SystemEngine::new()))
    }

    /// Creates a client backed by a [`SystemEngine`] built from `config`.
    ///
    /// Fails with [`NetError::InvalidConfig`] if `config` does not validate.
    pub fn with_config(config: DnsConfig) -> Result<Self, NetError> {
        let engine = Arc::new(SystemEngine::with_config(config.clone())?);
        Ok(Self { engine, config })
    }

    pub fn with_engine(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            config: DnsConfig::default(),
        }
    }

    pub fn with_engine_and_config(
        engine: Arc<dyn Engine>,
        config: DnsConfig,
    ) -> Result<Self, NetError> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    /// The process-wide client used by the free functions in [`crate::dns`].
    ///
    /// Built on first use with the default configuration.
    pub fn global() -> &'static DnsClient {
        static CLIENT: LazyLock<DnsClient> = LazyLock::new(DnsClient::new);
        &CLIENT
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn config(&self) -> &DnsConfig {
        &self.config
    }

    /// Looks up `hostname` with default options; the callback receives a
    /// [`LookupReply::One`].
    pub fn lookup<F>(&self, hostname: impl Into<Name>, callback: F)
    where
        F: FnOnce(LookupReply) + Send + 'static,
    {
        self.lookup_args(hostname, LookupArgs::Callback(callback))
    }

    /// Looks up `hostname` with `options`. The reply is
    /// [`LookupReply::All`] when `options.all` is set, otherwise
    /// [`LookupReply::One`].
    pub fn lookup_with<F>(&self, hostname: impl Into<Name>, options: RawLookupOptions, callback: F)
    where
        F: FnOnce(LookupReply) + Send + 'static,
    {
        self.lookup_args(hostname, LookupArgs::WithOptions(options, callback))
    }

    /// Looks up `hostname` in either call shape.
    pub fn lookup_args<F>(&self, hostname: impl Into<Name>, args: LookupArgs<F>)
    where
        F: FnOnce(LookupReply) + Send + 'static,
    {
        let (name, options, callback) = if self.config.strict_family {
            match args.normalize_strict(hostname) {
                Ok(normalized) => normalized,
                Err((e, options, callback)) => {
                    callback(ReplyShape::of(&options).reply(Err(e)));
                    return;
                }
            }
        } else {
            args.normalize(hostname)
        };

        self.submit(name, options, callback)
    }

    /// Future-returning form of [`lookup_with`](Self::lookup_with).
    pub async fn lookup_async(
        &self,
        hostname: impl Into<Name>,
        options: RawLookupOptions,
    ) -> LookupReply {
        let shape = ReplyShape::of(&LookupOptions::normalize(&options));
        let (tx, rx) = oneshot::channel();
        self.lookup_with(hostname, options, move |reply| {
            let _ = tx.send(reply);
        });
        // A dropped sender means the engine discarded the handler.
        rx.await.unwrap_or_else(|_| shape.reply(Err(NetError::NameResolutionFailed)))
    }

    /// Creates a new [`Resolver`] on this client's engine.
    pub fn resolver(&self) -> Result<Resolver, NetError> {
        Resolver::with_engine(Arc::clone(&self.engine))
    }

    fn submit<F>(&self, name: Name, options: LookupOptions, callback: F)
    where
        F: FnOnce(LookupReply) + Send + 'static,
    {
        let map_v4 = options.maps_v4().then(|| MapV4 {
            all: options.has_hint(hints::ALL),
        });
        let (family, all) = match map_v4 {
            // Both families are needed to fall back to mapped IPv4.
            Some(_) => (Family::Unspecified, true),
            None => (options.family, options.all),
        };

        let pending = PendingRequest {
            shape: ReplyShape::of(&options),
            map_v4,
            callback,
        };

        tracing::trace!(host = %name, family = %family, all, "submitting lookup");
        self.engine.submit_lookup(
            name,
            family,
            all,
            Box::new(move |result| pending.complete(result)),
        );
    }
}

impl Default for DnsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DnsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
