//! TXT resolver contexts backed by hickory-dns.
//!
//! Each context owns its own `TokioResolver`, so its name-server
//! connections and cache live exactly as long as the context. Contexts are
//! kept in a concurrent registry keyed by [`ContextId`]; releasing a context
//! drops the resolver once the queries still holding it have finished.

use super::config::DnsConfig;
use super::engine::{ContextId, TxtHandler};
use super::resolve::{Name, TxtRecordSet};
use crate::base::neterror::NetError;
use dashmap::DashMap;
use hickory_resolver::{
    config::ResolverConfig, lookup::TxtLookup, name_server::TokioConnectionProvider,
    proto::ProtoErrorKind, ResolveError, TokioResolver,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Registry of live TXT resolver contexts.
#[derive(Debug)]
pub(crate) struct TxtContexts {
    config: DnsConfig,
    contexts: DashMap<ContextId, Arc<TokioResolver>>,
    next_id: AtomicU64,
}

impl TxtContexts {
    pub(crate) fn new(config: DnsConfig) -> Self {
        Self {
            config,
            contexts: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Builds a resolver from the configuration and registers it.
    pub(crate) fn create(&self) -> Result<ContextId, NetError> {
        let resolver = self.build_resolver()?;
        let id = ContextId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.contexts.insert(id, Arc::new(resolver));
        tracing::debug!(context = %id, "TXT resolver context created");
        Ok(id)
    }

    pub(crate) fn get(&self, id: ContextId) -> Option<Arc<TokioResolver>> {
        self.contexts.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn contains(&self, id: ContextId) -> bool {
        self.contexts.contains_key(&id)
    }

    /// Removes a context. Returns false if it was not registered.
    pub(crate) fn release(&self, id: ContextId) -> bool {
        let released = self.contexts.remove(&id).is_some();
        tracing::debug!(context = %id, released, "TXT resolver context released");
        released
    }

    pub(crate) fn len(&self) -> usize {
        self.contexts.len()
    }

    fn build_resolver(&self) -> Result<TokioResolver, NetError> {
        let defaults = || {
            TokioResolver::builder_with_config(
                ResolverConfig::default(),
                TokioConnectionProvider::default(),
            )
        };

        let mut builder = if self.config.use_system_config {
            match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    tracing::debug!("Using system DNS configuration");
                    builder
                }
                Err(e) if self.config.fallback_to_defaults => {
                    tracing::warn!(
                        error = %e,
                        "Failed to read system DNS config, using defaults"
                    );
                    defaults()
                }
                Err(e) => return Err(NetError::ResolverInitFailed(e.to_string())),
            }
        } else {
            defaults()
        };

        let options = builder.options_mut();
        options.timeout = self.config.timeout;
        options.attempts = self.config.attempts;

        Ok(builder.build())
    }
}

/// Runs one TXT query on `resolver` and delivers the result.
///
/// If the context was released while the query was in flight the caller
/// receives [`NetError::ResolverDestroyed`] instead of the answer.
pub(crate) async fn query(
    contexts: Arc<TxtContexts>,
    id: ContextId,
    resolver: Arc<TokioResolver>,
    name: Name,
    on_complete: TxtHandler,
) {
    let domain = name.as_str();
    tracing::debug!(domain = %domain, context = %id, "resolving TXT via hickory-dns");

    let result = resolver
        .txt_lookup(domain)
        .await
        .map(|lookup| txt_records(&lookup))
        .map_err(|e| {
            tracing::debug!(domain = %domain, error = %e, "hickory-dns TXT lookup failed");
            txt_error(domain, &e)
        });
    drop(resolver);

    if !contexts.contains(id) {
        tracing::debug!(domain = %domain, context = %id, "context released during TXT query");
        on_complete(Err(NetError::ResolverDestroyed));
        return;
    }

    if let Ok(records) = &result {
        tracing::debug!(domain = %domain, count = records.len(), "hickory-dns TXT resolution complete");
    }
    on_complete(result);
}

/// Maps a hickory failure onto the error reported to the caller.
///
/// A name that exists without TXT records is `NoData`; NXDOMAIN and any
/// other failure keep the domain for context.
fn txt_error(domain: &str, e: &ResolveError) -> NetError {
    if e.is_nx_domain() {
        return NetError::dns_failed(
            domain,
            std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        );
    }
    if e.is_no_records_found() {
        return NetError::NoData;
    }
    match e.proto().map(|proto| proto.kind()) {
        Some(ProtoErrorKind::Timeout) => NetError::ConnectionTimedOut,
        _ => NetError::dns_failed(domain, std::io::Error::other(e.to_string())),
    }
}

/// One inner list per TXT record, segments kept apart and in order.
fn txt_records(lookup: &TxtLookup) -> TxtRecordSet {
    lookup
        .iter()
        .map(|txt| {
            txt.txt_data()
                .iter()
                .map(|segment| String::from_utf8_lossy(segment).into_owned())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::lookup::Lookup;
    use hickory_resolver::proto::op::{Query, ResponseCode};
    use hickory_resolver::proto::rr::rdata::TXT;
    use hickory_resolver::proto::rr::{RData, Record, RecordType};
    use hickory_resolver::proto::ProtoError;
    use std::time::Duration;

    fn offline_config() -> DnsConfig {
        DnsConfig::new()
            .use_system_config(false)
            .timeout(Duration::from_millis(200))
            .attempts(1)
    }

    #[test]
    fn test_context_ids_are_unique() {
        let contexts = TxtContexts::new(offline_config());
        let a = contexts.create().unwrap();
        let b = contexts.create().unwrap();

        assert_ne!(a, b);
        assert_eq!(contexts.len(), 2);
    }

    #[test]
    fn test_release_is_reported_once() {
        let contexts = TxtContexts::new(offline_config());
        let id = contexts.create().unwrap();

        assert!(contexts.get(id).is_some());
        assert!(contexts.release(id));
        assert!(!contexts.release(id));
        assert!(contexts.get(id).is_none());
        assert_eq!(contexts.len(), 0);
    }

    #[tokio::test]
    async fn test_query_after_release_reports_destroyed() {
        let contexts = Arc::new(TxtContexts::new(offline_config()));
        let id = contexts.create().unwrap();
        let resolver = contexts.get(id).unwrap();
        contexts.release(id);

        let (tx, rx) = tokio::sync::oneshot::channel();
        query(
            Arc::clone(&contexts),
            id,
            resolver,
            Name::new("nonexistent.invalid"),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )
        .await;

        let err = rx.await.unwrap().unwrap_err();
        assert!(matches!(err, NetError::ResolverDestroyed));
    }

    fn txt_query() -> Query {
        Query::query(
            hickory_resolver::Name::from_ascii("example.com.").unwrap(),
            RecordType::TXT,
        )
    }

    fn no_records(code: ResponseCode) -> ResolveError {
        ProtoError::nx_error(Box::new(txt_query()), None, None, None, code, false, None).into()
    }

    #[test]
    fn test_txt_records_keep_segments_apart() {
        let name = hickory_resolver::Name::from_ascii("example.com.").unwrap();
        let records: Vec<Record> = vec![
            Record::from_rdata(
                name.clone(),
                300,
                RData::TXT(TXT::new(vec!["v=spf1".into(), " -all".into()])),
            ),
            Record::from_rdata(
                name,
                300,
                RData::TXT(TXT::from_bytes(vec![b"ok".as_slice(), &[0x66, 0xff, 0x6f][..]])),
            ),
        ];
        let lookup = TxtLookup::from(Lookup::new_with_max_ttl(txt_query(), records.into()));

        assert_eq!(
            txt_records(&lookup),
            vec![
                vec!["v=spf1".to_string(), " -all".to_string()],
                vec!["ok".to_string(), "f\u{FFFD}o".to_string()],
            ]
        );
    }

    #[test]
    fn test_txt_error_mapping() {
        let err = txt_error("example.com", &no_records(ResponseCode::NoError));
        assert!(matches!(err, NetError::NoData));
        assert_eq!(err.code(), "ENODATA");

        let err = txt_error("nonexistent.invalid", &no_records(ResponseCode::NXDomain));
        assert_eq!(err.code(), "ENOTFOUND");
        assert_eq!(err.domain(), Some("nonexistent.invalid"));

        let timeout = ResolveError::from(ProtoError::from(ProtoErrorKind::Timeout));
        let err = txt_error("slow.example", &timeout);
        assert!(matches!(err, NetError::ConnectionTimedOut));
        assert_eq!(err.code(), "ETIMEOUT");

        let other = ResolveError::from(ProtoError::from(ProtoErrorKind::Message("bad response")));
        let err = txt_error("broken.example", &other);
        assert_eq!(err.code(), "ENOTFOUND");
        assert_eq!(err.domain(), Some("broken.example"));
    }
}
