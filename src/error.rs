//! Crate-wide error types and `Result` alias.

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the identity-guard crate.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Url(#[from] url::ParseError),

	#[error("Required setting '{setting}' failed validation: {reason}")]
	Configuration { setting: &'static str, reason: String },
	#[error("Invalid redirect URI: {0}")]
	InvalidRedirectUri(String),
	#[error("Unauthorized: {0}")]
	Unauthorized(String),
}
impl Error {
	/// Whether this error represents a fatal startup misconfiguration.
	///
	/// Hosting runtimes must treat a fatal error raised during bootstrap as
	/// "do not become ready" rather than attempting recovery.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::Configuration { .. })
	}
}
