//! The resolution engine seam.
//!
//! An [`Engine`] performs the actual resolution work. Requests are
//! submitted together with a completion handler; the engine invokes that
//! handler exactly once, later, from whatever context it completes on.
//! Everything above this trait (option normalization, result shaping and
//! resolver lifecycles) is engine-agnostic.

use super::family::Family;
use super::resolve::{AddressRecord, Name, TxtRecordSet};
use crate::base::neterror::NetError;
use std::{fmt, sync::Arc};

/// Completion handler for an address lookup.
pub type LookupHandler = Box<dyn FnOnce(Result<Vec<AddressRecord>, NetError>) + Send>;

/// Completion handler for a TXT query.
pub type TxtHandler = Box<dyn FnOnce(Result<TxtRecordSet, NetError>) + Send>;

/// Identifies one engine-side resolver context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Asynchronous resolution primitive.
///
/// # Contract
///
/// - Every submitted handler is invoked exactly once, with either an error
///   or the result list.
/// - Submission never blocks the caller.
/// - No ordering holds between completions of distinct submissions.
/// - `submit_lookup` never reports an empty success: an empty result is
///   reported as an error. When `all` is false at most one record is
///   returned.
pub trait Engine: Send + Sync {
    /// Resolves `name` to addresses of `family`.
    fn submit_lookup(&self, name: Name, family: Family, all: bool, on_complete: LookupHandler);

    /// Allocates a resolver context for TXT queries.
    fn create_context(&self) -> Result<ContextId, NetError>;

    /// Queries the TXT records of `name` on `context`.
    fn submit_resolve_txt(&self, context: ContextId, name: Name, on_complete: TxtHandler);

    /// Releases `context`. Queries still in flight on it complete with
    /// [`NetError::ResolverDestroyed`].
    fn release_context(&self, context: ContextId);
}

/// Blanket implementation for Arc-wrapped engines.
impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn submit_lookup(&self, name: Name, family: Family, all: bool, on_complete: LookupHandler) {
        (**self).submit_lookup(name, family, all, on_complete)
    }

    fn create_context(&self) -> Result<ContextId, NetError> {
        (**self).create_context()
    }

    fn submit_resolve_txt(&self, context: ContextId, name: Name, on_complete: TxtHandler) {
        (**self).submit_resolve_txt(context, name, on_complete)
    }

    fn release_context(&self, context: ContextId) {
        (**self).release_context(context)
    }
}

/// Applies the engine-side shaping rules to a raw address list: family
/// filter, first-only when `all` is false, and `NoData` for an empty set.
pub fn shape_addresses<I>(
    addrs: I,
    family: Family,
    all: bool,
) -> Result<Vec<AddressRecord>, NetError>
where
    I: IntoIterator,
    I::Item: Into<AddressRecord>,
{
    let filtered = addrs
        .into_iter()
        .map(Into::<AddressRecord>::into)
        .filter(|record| family.matches(&record.address()));

    let records: Vec<AddressRecord> = if all {
        filtered.collect()
    } else {
        filtered.take(1).collect()
    };

    if records.is_empty() {
        return Err(NetError::NoData);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    fn mixed() -> Vec<IpAddr> {
        vec![
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)),
            IpAddr::V4(Ipv4Addr::new(5, 6, 7, 8)),
        ]
    }

    #[test]
    fn test_shape_all_keeps_order() {
        let records = shape_addresses(mixed(), Family::Unspecified, true).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].family(), Family::V6);
    }

    #[test]
    fn test_shape_single_takes_first_match() {
        let records = shape_addresses(mixed(), Family::V4, false).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address(), IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)));
    }

    #[test]
    fn test_shape_empty_is_no_data() {
        let only_v4 = vec![IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))];
        let err = shape_addresses(only_v4, Family::V6, true).unwrap_err();
        assert!(matches!(err, NetError::NoData));

        let none: Vec<IpAddr> = Vec::new();
        assert!(shape_addresses(none, Family::Unspecified, false).is_err());
    }

    #[test]
    fn test_context_id_display() {
        assert_eq!(ContextId::new(3).to_string(), "ctx#3");
        assert_eq!(ContextId::new(3).as_u64(), 3);
    }
}
