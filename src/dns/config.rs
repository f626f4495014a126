//! Resolver configuration.

use crate::base::neterror::NetError;
use serde::Deserialize;
use std::time::Duration;

/// Configuration shared by a [`DnsClient`](super::DnsClient) and the
/// resolver contexts its engine creates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    /// Per-query timeout for TXT resolver contexts
    pub timeout: Duration,
    /// Attempts per name server before a TXT query fails
    pub attempts: usize,
    /// Read the system resolver configuration (`/etc/resolv.conf` etc.)
    pub use_system_config: bool,
    /// Use built-in defaults if the system configuration can't be read
    pub fallback_to_defaults: bool,
    /// Reject unrecognized family hints instead of treating them as unspecified
    pub strict_family: bool,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            attempts: 2,
            use_system_config: true,
            fallback_to_defaults: true,
            strict_family: false,
        }
    }
}

impl DnsConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    ///
    /// ```ignore
    /// let config = DnsConfig::from_json(r#"{"timeout": {"secs": 2, "nanos": 0}}"#)?;
    /// ```
    pub fn from_json(json: &str) -> Result<Self, NetError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| NetError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that the type system can't express.
    pub fn validate(&self) -> Result<(), NetError> {
        if self.timeout.is_zero() {
            return Err(NetError::InvalidConfig("timeout must be non-zero".into()));
        }
        if self.attempts == 0 {
            return Err(NetError::InvalidConfig("attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Set query timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set attempts per name server.
    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Enable or disable reading the system resolver configuration.
    pub fn use_system_config(mut self, enabled: bool) -> Self {
        self.use_system_config = enabled;
        self
    }

    /// Enable or disable falling back to defaults.
    pub fn fallback_to_defaults(mut self, enabled: bool) -> Self {
        self.fallback_to_defaults = enabled;
        self
    }

    /// Enable or disable strict family validation.
    pub fn strict_family(mut self, enabled: bool) -> Self {
        self.strict_family = enabled;
        self
    }
}
