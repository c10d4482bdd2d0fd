//! Domain types and pure logic shared by the Kyotsu service and tooling.
//!
//! This crate has no database or HTTP dependencies so it can be used by
//! the API server, the repository layer, and the migration tool alike.

pub mod codes;
pub mod config;
pub mod error;
pub mod pagination;
pub mod roles;
pub mod severity;
pub mod types;
