//! Base types and error handling.
//!
//! Provides foundational types shared by the resolver layers:
//! - [`NetError`](neterror::NetError): resolution error codes
//! - [`IoResultExt`](context::IoResultExt): attaching domain context to IO errors

pub mod context;
pub mod neterror;

#[cfg(test)]
mod tests;
