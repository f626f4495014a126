//! Ergonomic error context helpers.
//!
//! Provides an extension trait for adding context to `Result` types,
//! converting IO errors into context-rich `NetError` variants.

use crate::base::neterror::NetError;
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add DNS resolution context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use dnslookup::base::context::IoResultExt;
    ///
    /// let addrs = ("example.com", 0).to_socket_addrs()
    ///     .dns_context("example.com")?;
    /// // Error: "Name not resolved: example.com: failed to lookup address"
    /// ```
    fn dns_context(self, domain: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }
}
