//! Lookup options and their normalization.
//!
//! Callers describe a lookup loosely: the family may be a numeric code or an
//! alias, every field may be missing, and options may be omitted entirely.
//! Normalization turns that into one canonical [`LookupOptions`] without
//! side effects and, by default, without ever failing.

use super::family::{Family, FamilyHint};
use super::resolve::Name;
use crate::base::neterror::NetError;

/// Lookup hint flags carried in [`LookupOptions::hints`].
pub mod hints {
    /// Only return families the host has configured addresses for.
    pub const ADDRCONFIG: u32 = 1 << 10;
    /// With family 6, fall back to IPv4-mapped IPv6 addresses.
    pub const V4MAPPED: u32 = 1 << 11;
    /// With `V4MAPPED`, return IPv6 and mapped IPv4 addresses together.
    pub const ALL: u32 = 1 << 8;
}

/// Caller-supplied lookup options. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLookupOptions {
    pub family: Option<FamilyHint>,
    pub all: Option<bool>,
    pub hints: Option<u32>,
}

impl RawLookupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family(mut self, family: impl Into<FamilyHint>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn all(mut self, all: bool) -> Self {
        self.all = Some(all);
        self
    }

    pub fn hints(mut self, hints: u32) -> Self {
        self.hints = Some(hints);
        self
    }
}

impl From<LookupOptions> for RawLookupOptions {
    fn from(options: LookupOptions) -> Self {
        Self {
            family: Some(options.family.into()),
            all: Some(options.all),
            hints: Some(options.hints),
        }
    }
}

/// Canonical lookup options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupOptions {
    pub family: Family,
    pub all: bool,
    pub hints: u32,
}

impl LookupOptions {
    /// Lenient normalization: unknown family hints become unspecified.
    pub fn normalize(raw: &RawLookupOptions) -> Self {
        Self {
            family: Family::from_hint(raw.family.as_ref()),
            all: raw.all.unwrap_or(false),
            hints: raw.hints.unwrap_or(0),
        }
    }

    /// Strict normalization: unknown family hints are an error.
    pub fn normalize_strict(raw: &RawLookupOptions) -> Result<Self, NetError> {
        Ok(Self {
            family: Family::try_from_hint(raw.family.as_ref())?,
            ..Self::normalize(raw)
        })
    }

    pub fn has_hint(&self, flag: u32) -> bool {
        self.hints & flag != 0
    }

    /// Whether IPv4 answers must be mapped into IPv6 for this request.
    pub(crate) fn maps_v4(&self) -> bool {
        self.family == Family::V6 && self.has_hint(hints::V4MAPPED)
    }
}

/// The two accepted call shapes of a lookup: a bare callback, or options
/// followed by a callback.
pub enum LookupArgs<F> {
    Callback(F),
    WithOptions(RawLookupOptions, F),
}

impl<F> LookupArgs<F> {
    /// Splits the call into canonical `(hostname, options, callback)`.
    pub fn normalize(self, hostname: impl Into<Name>) -> (Name, LookupOptions, F) {
        let (options, callback) = self.into_parts();
        (hostname.into(), LookupOptions::normalize(&options), callback)
    }

    /// Like [`normalize`](Self::normalize) but rejects unknown family hints.
    /// The callback is handed back alongside the error so it can still be
    /// completed.
    pub fn normalize_strict(
        self,
        hostname: impl Into<Name>,
    ) -> Result<(Name, LookupOptions, F), (NetError, LookupOptions, F)> {
        let (raw, callback) = self.into_parts();
        match LookupOptions::normalize_strict(&raw) {
            Ok(options) => Ok((hostname.into(), options, callback)),
            Err(e) => Err((e, LookupOptions::normalize(&raw), callback)),
        }
    }

    fn into_parts(self) -> (RawLookupOptions, F) {
        match self {
            LookupArgs::Callback(callback) => (RawLookupOptions::default(), callback),
            LookupArgs::WithOptions(options, callback) => (options, callback),
        }
    }
}
