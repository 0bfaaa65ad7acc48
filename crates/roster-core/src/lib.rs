//! Core types and trait definitions for the roster sync.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies. The
//! roster API client implements [`source::RosterSource`]; the binary supplies a
//! [`report::ReportWriter`]. The classification engine in [`classify`] only
//! ever talks to those two seams.

pub mod classify;
pub mod entity;
pub mod error;
pub mod query;
pub mod report;
pub mod source;


pub use error::{Error, Result};
