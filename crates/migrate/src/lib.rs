//! Migration tooling for the Kyotsu schema.
//!
//! - [`settings`] -- `migrate.toml` parsing.
//! - [`revision`] -- generating new migration script pairs.
//! - [`hooks`] -- post-write hooks run against generated scripts.
//! - [`commands`] -- upgrade, downgrade, and status against a live database.

pub mod commands;
pub mod error;
pub mod hooks;
pub mod revision;
pub mod settings;

pub use error::MigrateToolError;
