//! The default resolution engine.
//!
//! Address lookups use the operating system resolver (see `gai`), TXT
//! queries use per-context hickory-dns resolvers (see `hickory`). Work runs
//! on the tokio runtime of the submitting thread; completion handlers are
//! invoked from the task that finished the work.

use super::config::DnsConfig;
use super::engine::{ContextId, Engine, LookupHandler, TxtHandler};
use super::family::Family;
use super::gai;
use super::hickory::{self, TxtContexts};
use super::resolve::Name;
use crate::base::neterror::NetError;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Resolution engine backed by `getaddrinfo` and hickory-dns.
///
/// Submitting outside a tokio runtime does not panic: the handler is
/// invoked immediately with [`NetError::NoRuntime`].
#[derive(Debug, Clone)]
pub struct SystemEngine {
    contexts: Arc<TxtContexts>,
}

impl SystemEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self {
            contexts: Arc::new(TxtContexts::new(DnsConfig::default())),
        }
    }

    /// Creates an engine with `config`, rejecting configurations that fail
    /// [`DnsConfig::validate`].
    pub fn with_config(config: DnsConfig) -> Result<Self, NetError> {
        config.validate()?;
        Ok(Self {
            contexts: Arc::new(TxtContexts::new(config)),
        })
    }

    /// Number of live resolver contexts.
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }
}

impl Default for SystemEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for SystemEngine {
    fn submit_lookup(&self, name: Name, family: Family, all: bool, on_complete: LookupHandler) {
        let Ok(handle) = Handle::try_current() else {
            on_complete(Err(NetError::NoRuntime));
            return;
        };
        handle.spawn(gai::lookup(name, family, all, on_complete));
    }

    fn create_context(&self) -> Result<ContextId, NetError> {
        self.contexts.create()
    }

    fn submit_resolve_txt(&self, context: ContextId, name: Name, on_complete: TxtHandler) {
        let Some(resolver) = self.contexts.get(context) else {
            on_complete(Err(NetError::ResolverDestroyed));
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            on_complete(Err(NetError::NoRuntime));
            return;
        };
        handle.spawn(hickory::query(
            Arc::clone(&self.contexts),
            context,
            resolver,
            name,
            on_complete,
        ));
    }

    fn release_context(&self, context: ContextId) {
        self.contexts.release(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn offline_engine() -> SystemEngine {
        SystemEngine::with_config(DnsConfig::new().use_system_config(false)).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = SystemEngine::with_config(DnsConfig::new().attempts(0)).unwrap_err();
        assert!(matches!(err, NetError::InvalidConfig(_)));
    }

    #[test]
    fn test_lookup_without_runtime_reports_error() {
        let engine = offline_engine();
        let (tx, rx) = mpsc::channel();

        engine.submit_lookup(
            Name::new("localhost"),
            Family::Unspecified,
            false,
            Box::new(move |result| tx.send(result).unwrap()),
        );

        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(err, NetError::NoRuntime));
    }

    #[test]
    fn test_txt_on_released_context() {
        let engine = offline_engine();
        let ctx = engine.create_context().unwrap();
        assert_eq!(engine.context_count(), 1);

        engine.release_context(ctx);
        assert_eq!(engine.context_count(), 0);

        let (tx, rx) = mpsc::channel();
        engine.submit_resolve_txt(
            ctx,
            Name::new("example.com"),
            Box::new(move |result| tx.send(result).unwrap()),
        );

        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(err, NetError::ResolverDestroyed));
    }

    #[tokio::test]
    async fn test_lookup_ip_literal() {
        let engine = offline_engine();
        let (tx, rx) = tokio::sync::oneshot::channel();

        engine.submit_lookup(
            Name::new("::1"),
            Family::Unspecified,
            true,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );

        let records = rx.await.unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].family(), Family::V6);
    }
}
