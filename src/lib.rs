//! Identity and redirect-security core for OAuth2 backends — allowlist-based
//! redirect validation, claims resolution, and fail-fast credential checks.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod claims;
pub mod credentials;
pub mod logout;
pub mod redirect;
pub mod settings;

mod bootstrap;
mod error;
mod _prelude {
	pub use std::sync::Arc;

	pub use chrono::{DateTime, Utc};

	pub use crate::{Error, Result};
}
#[cfg(test)]
mod _test {
	use tracing_subscriber as _;
}

pub use crate::{
	bootstrap::{IdentityCore, IdentitySettings},
	error::{Error, Result},
};
