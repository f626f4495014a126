//! Hostname overrides in front of another engine.

use super::engine::{shape_addresses, ContextId, Engine, LookupHandler, TxtHandler};
use super::family::Family;
use super::resolve::Name;
use crate::base::neterror::NetError;
use std::{borrow::Cow, collections::HashMap, fmt, net::IpAddr, sync::Arc};

/// Engine wrapper that supports hostname overrides.
///
/// Address lookups first check a map of hostname-to-address overrides
/// before falling back to the underlying engine. Overridden names still go
/// through family filtering and `all` shaping, and an override with no
/// address of the requested family fails with [`NetError::NoData`]. TXT
/// queries and resolver contexts are always delegated. Useful for:
/// - Testing without real DNS
/// - Forcing specific IPs for certain domains
/// - Local development with custom hostnames
///
/// # Example
///
/// ```rust,ignore
/// use dnslookup::dns::{OverrideEngine, SystemEngine, DnsClient};
/// use std::collections::HashMap;
///
/// let mut overrides = HashMap::new();
/// overrides.insert("api.local".into(), vec!["127.0.0.1".parse().unwrap()]);
///
/// let engine = OverrideEngine::new(Arc::new(SystemEngine::new()), overrides);
/// let client = DnsClient::with_engine(Arc::new(engine));
/// ```
pub struct OverrideEngine {
    inner: Arc<dyn Engine>,
    overrides: Arc<HashMap<Cow<'static, str>, Vec<IpAddr>>>,
}

impl OverrideEngine {
    /// Creates a new engine with the given overrides.
    ///
    /// # Arguments
    ///
    /// * `inner` - The fallback engine for non-overridden hostnames.
    /// * `overrides` - Map of hostnames to their addresses.
    pub fn new(inner: Arc<dyn Engine>, overrides: HashMap<Cow<'static, str>, Vec<IpAddr>>) -> Self {
        Self {
            inner,
            overrides: Arc::new(overrides),
        }
    }

    /// Returns the number of configured overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl Engine for OverrideEngine {
    fn submit_lookup(&self, name: Name, family: Family, all: bool, on_complete: LookupHandler) {
        // Check overrides first
        if let Some(addrs) = self.overrides.get(name.as_str()) {
            tracing::trace!(host = %name, "answering lookup from overrides");
            on_complete(shape_addresses(addrs.iter().copied(), family, all));
            return;
        }
        // Fall back to inner engine
        self.inner.submit_lookup(name, family, all, on_complete)
    }

    fn create_context(&self) -> Result<ContextId, NetError> {
        self.inner.create_context()
    }

    fn submit_resolve_txt(&self, context: ContextId, name: Name, on_complete: TxtHandler) {
        self.inner.submit_resolve_txt(context, name, on_complete)
    }

    fn release_context(&self, context: ContextId) {
        self.inner.release_context(context)
    }
}

impl fmt::Debug for OverrideEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideEngine")
            .field("override_count", &self.overrides.len())
            .finish_non_exhaustive()
    }
}
