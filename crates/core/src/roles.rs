//! Well-known role name constants embedded in access tokens.

pub const ROLE_ADMIN: &str = "admin";
