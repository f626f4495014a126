use std::{io, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Resolution Errors
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name not resolved: {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Name resolution failed")]
    NameResolutionFailed,
    #[error("No address associated with hostname")]
    NoData,
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // Resolver Lifecycle Errors
    #[error("Resolver has been destroyed")]
    ResolverDestroyed,
    #[error("Resolver initialization failed: {0}")]
    ResolverInitFailed(String),
    #[error("No async runtime available to run the request")]
    NoRuntime,

    // Caller Input Errors
    #[error("Invalid address family: {0}")]
    InvalidFamily(String),
    #[error("Invalid resolver configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::NameNotResolved => -105,
            NetError::NameNotResolvedFor { .. } => -105,
            NetError::ConnectionTimedOut => -118,
            NetError::NameResolutionFailed => -137,
            // Crate-specific codes (starting at -900)
            NetError::NoData => -900,
            NetError::ResolverDestroyed => -901,
            NetError::ResolverInitFailed(_) => -902,
            NetError::NoRuntime => -903,
            NetError::InvalidFamily(_) => -904,
            NetError::InvalidConfig(_) => -905,
            NetError::Unknown(code) => *code,
        }
    }

    /// Short symbolic code, in the style of `getaddrinfo` error names.
    pub fn code(&self) -> &'static str {
        match self {
            NetError::NameNotResolved | NetError::NameNotResolvedFor { .. } => "ENOTFOUND",
            NetError::NameResolutionFailed => "ESERVFAIL",
            NetError::NoData => "ENODATA",
            NetError::ConnectionTimedOut => "ETIMEOUT",
            NetError::ResolverDestroyed => "EDESTROYED",
            NetError::ResolverInitFailed(_) => "EINIT",
            NetError::NoRuntime => "ENORUNTIME",
            NetError::InvalidFamily(_) => "EBADFAMILY",
            NetError::InvalidConfig(_) => "EBADCONFIG",
            NetError::Unknown(_) => "EUNKNOWN",
        }
    }

    /// Builds a resolution failure carrying the domain that failed.
    pub fn dns_failed(domain: &str, source: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.to_string(),
            source: Arc::new(source),
        }
    }

    /// The domain this error refers to, when one was recorded.
    pub fn domain(&self) -> Option<&str> {
        match self {
            NetError::NameNotResolvedFor { domain, .. } => Some(domain),
            _ => None,
        }
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -105 => NetError::NameNotResolved,
            -118 => NetError::ConnectionTimedOut,
            -137 => NetError::NameResolutionFailed,
            -900 => NetError::NoData,
            -901 => NetError::ResolverDestroyed,
            -903 => NetError::NoRuntime,
            _ => NetError::Unknown(code),
        }
    }
}
