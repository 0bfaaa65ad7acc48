//! OAuth2-authenticated HTTP client for a OneRoster-style REST API.
//!
//! [`RosterClient`] exchanges client credentials for a bearer token once, at
//! construction, and implements [`roster_core::source::RosterSource`] on top of
//! it. There is no token refresh: a client lives as long as its token does.

pub mod client;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use client::RosterClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
