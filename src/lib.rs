//! # dnslookup
//!
//! Asynchronous hostname lookup and TXT resolution for Rust.
//!
//! `dnslookup` is a thin, deterministic layer over an asynchronous
//! resolution engine. It normalizes loosely-typed lookup options, delivers
//! results through callbacks that run exactly once, and manages TXT
//! resolver contexts with an explicit lifecycle.
//!
//! ## Features
//!
//! - **Address lookup**: first address or all addresses, filtered by family
//! - **Lenient options**: families as `0`/`4`/`6` or `"IPv4"`/`"IPv6"`, with
//!   an opt-in strict mode
//! - **TXT resolution**: records kept as lists of character-strings
//! - **Resolver lifecycle**: owned contexts with explicit `destroy`, plus a
//!   process-wide default
//! - **Pluggable engines**: system resolver, hostname overrides, or your own
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dnslookup::dns::{self, RawLookupOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     dns::lookup("example.com", |reply| {
//!         println!("{:?} (family {})", reply.address(), reply.family());
//!     });
//!
//!     let reply = dns::DnsClient::global()
//!         .lookup_async("example.com", RawLookupOptions::new().all(true))
//!         .await;
//!     println!("{:?}", reply.addresses());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions and context helpers
//! - [`dns`] - Lookup, TXT resolution, resolver handles and engines

pub mod base;
pub mod dns;
