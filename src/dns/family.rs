//! Address family classification and caller-facing family hints.

use crate::base::neterror::NetError;
use serde::{Deserialize, Serialize};
use std::{fmt, net::IpAddr};

/// IP address version, encoded the way callers pass it: `0`, `4` or `6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Family {
    /// Either family is acceptable.
    #[default]
    Unspecified = 0,
    V4 = 4,
    V6 = 6,
}

impl Family {
    /// Numeric code of this family (`0`, `4` or `6`).
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Maps a numeric code, treating anything other than 4 and 6 as
    /// unspecified.
    pub fn from_code(code: u32) -> Self {
        match code {
            4 => Family::V4,
            6 => Family::V6,
            _ => Family::Unspecified,
        }
    }

    /// Maps a case-sensitive alias (`"IPv4"`, `"IPv6"`). Unrecognized
    /// aliases become unspecified.
    pub fn from_alias(alias: &str) -> Self {
        match alias {
            "IPv4" => Family::V4,
            "IPv6" => Family::V6,
            _ => Family::Unspecified,
        }
    }

    /// Lenient coercion of a caller hint. An absent hint is unspecified.
    pub fn from_hint(hint: Option<&FamilyHint>) -> Self {
        match hint {
            None => Family::Unspecified,
            Some(FamilyHint::Code(code)) => Family::from_code(*code),
            Some(FamilyHint::Alias(alias)) => Family::from_alias(alias),
        }
    }

    /// Strict coercion: only `0`, `4`, `6`, `"IPv4"` and `"IPv6"` are accepted.
    pub fn try_from_hint(hint: Option<&FamilyHint>) -> Result<Self, NetError> {
        match hint {
            None | Some(FamilyHint::Code(0)) => Ok(Family::Unspecified),
            Some(FamilyHint::Code(4)) => Ok(Family::V4),
            Some(FamilyHint::Code(6)) => Ok(Family::V6),
            Some(FamilyHint::Alias(alias)) if alias == "IPv4" => Ok(Family::V4),
            Some(FamilyHint::Alias(alias)) if alias == "IPv6" => Ok(Family::V6),
            Some(other) => Err(NetError::InvalidFamily(other.to_string())),
        }
    }

    /// Family of a concrete address. Never unspecified.
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// Whether `ip` satisfies this family filter.
    pub fn matches(self, ip: &IpAddr) -> bool {
        match self {
            Family::Unspecified => true,
            Family::V4 => ip.is_ipv4(),
            Family::V6 => ip.is_ipv6(),
        }
    }
}

impl From<Family> for u8 {
    fn from(family: Family) -> u8 {
        family.code()
    }
}

impl TryFrom<u8> for Family {
    type Error = NetError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Family::try_from_hint(Some(&FamilyHint::Code(code.into())))
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.code(), f)
    }
}

/// A family as supplied by a caller, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyHint {
    Code(u32),
    Alias(String),
}

impl fmt::Display for FamilyHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FamilyHint::Code(code) => write!(f, "{code}"),
            FamilyHint::Alias(alias) => write!(f, "{alias:?}"),
        }
    }
}

impl From<u8> for FamilyHint {
    fn from(code: u8) -> Self {
        FamilyHint::Code(code.into())
    }
}

impl From<u32> for FamilyHint {
    fn from(code: u32) -> Self {
        FamilyHint::Code(code)
    }
}

impl From<&str> for FamilyHint {
    fn from(alias: &str) -> Self {
        FamilyHint::Alias(alias.to_string())
    }
}

impl From<String> for FamilyHint {
    fn from(alias: String) -> Self {
        FamilyHint::Alias(alias)
    }
}

impl From<Family> for FamilyHint {
    fn from(family: Family) -> Self {
        FamilyHint::Code(family.code().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_numeric_codes_pass_through() {
        assert_eq!(Family::from_hint(Some(&0u8.into())), Family::Unspecified);
        assert_eq!(Family::from_hint(Some(&4u8.into())), Family::V4);
        assert_eq!(Family::from_hint(Some(&6u8.into())), Family::V6);
    }

    #[test]
    fn test_aliases_are_case_sensitive() {
        assert_eq!(Family::from_hint(Some(&"IPv4".into())), Family::V4);
        assert_eq!(Family::from_hint(Some(&"IPv6".into())), Family::V6);
        assert_eq!(Family::from_hint(Some(&"ipv4".into())), Family::Unspecified);
        assert_eq!(Family::from_hint(Some(&"IPV6".into())), Family::Unspecified);
    }

    #[test]
    fn test_lenient_unknown_hints() {
        assert_eq!(Family::from_hint(None), Family::Unspecified);
        assert_eq!(Family::from_hint(Some(&"bogus".into())), Family::Unspecified);
        assert_eq!(Family::from_hint(Some(&5u8.into())), Family::Unspecified);
    }

    #[test]
    fn test_strict_rejects_unknown_hints() {
        assert_eq!(Family::try_from_hint(Some(&"IPv6".into())).unwrap(), Family::V6);
        assert_eq!(Family::try_from_hint(None).unwrap(), Family::Unspecified);

        let err = Family::try_from_hint(Some(&"ipv6".into())).unwrap_err();
        assert!(matches!(err, NetError::InvalidFamily(ref s) if s == "\"ipv6\""));
        assert!(Family::try_from_hint(Some(&5u8.into())).is_err());
    }

    #[test]
    fn test_family_of_address() {
        let v4 = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);

        assert_eq!(Family::of(&v4), Family::V4);
        assert_eq!(Family::of(&v6), Family::V6);
        assert!(Family::Unspecified.matches(&v4));
        assert!(Family::Unspecified.matches(&v6));
        assert!(!Family::V4.matches(&v6));
        assert!(!Family::V6.matches(&v4));
    }

    #[test]
    fn test_family_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Family::V6).unwrap(), "6");
        assert_eq!(serde_json::from_str::<Family>("4").unwrap(), Family::V4);
        assert!(serde_json::from_str::<Family>("5").is_err());
    }
}
