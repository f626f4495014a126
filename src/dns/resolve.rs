//! Core DNS resolution types.
//!
//! This module defines the values that flow between callers, the request
//! adapter and the resolution engine.

use super::family::Family;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    net::{IpAddr, SocketAddr},
};

/// A host name to resolve.
///
/// This is a lightweight wrapper around a hostname string. It is not
/// validated here; malformed names are reported by the engine.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// One resolved network address.
///
/// The family is derived from the address itself, so it is always
/// [`Family::V4`] or [`Family::V6`]. Serializes as
/// `{"address": "<ip>", "family": 4|6}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "RecordRepr", try_from = "RecordRepr")]
pub struct AddressRecord {
    address: IpAddr,
}

impl AddressRecord {
    pub fn new(address: IpAddr) -> Self {
        Self { address }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn family(&self) -> Family {
        Family::of(&self.address)
    }
}

impl From<IpAddr> for AddressRecord {
    fn from(address: IpAddr) -> Self {
        Self::new(address)
    }
}

impl From<SocketAddr> for AddressRecord {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip())
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.address, f)
    }
}

#[derive(Serialize, Deserialize)]
struct RecordRepr {
    address: IpAddr,
    family: Family,
}

impl From<AddressRecord> for RecordRepr {
    fn from(record: AddressRecord) -> Self {
        Self {
            address: record.address,
            family: record.family(),
        }
    }
}

impl TryFrom<RecordRepr> for AddressRecord {
    type Error = String;

    fn try_from(repr: RecordRepr) -> Result<Self, Self::Error> {
        let record = AddressRecord::new(repr.address);
        if record.family() != repr.family {
            return Err(format!(
                "family {} does not match address {}",
                repr.family, repr.address
            ));
        }
        Ok(record)
    }
}

/// TXT records of one name: one inner list per record, holding that
/// record's character-strings in wire order.
pub type TxtRecordSet = Vec<Vec<String>>;
