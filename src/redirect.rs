//! Redirect-target validation against an immutable startup allowlist.

pub mod pattern;
pub mod validator;

/// Schemes permitted for redirect targets and allowlist entries.
pub const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];
