//! HTTP handlers, one module per resource.

pub mod auth;
pub mod event_codes;
pub mod lookup;
pub mod prefixes;
