//! Wildcard pattern compilation and matching.
//!
//! A pattern is an absolute URL whose single `*` is a path suffix, e.g.
//! `https://app.example.com/cb/*`. Wildcards anywhere in the scheme, host, or
//! port would turn the allowlist into an open redirect, so compilation rejects
//! them outright.

// crates.io
use url::Url;
// self
use crate::{_prelude::*, redirect::ALLOWED_SCHEMES};

/// Compiled path-suffix wildcard pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardPattern {
	scheme: String,
	host: String,
	port: Option<u16>,
	path_prefix: String,
}
impl WildcardPattern {
	/// Compile a pattern string into its structural form.
	///
	/// The `*` must be the final character and must sit strictly inside the
	/// path segment; a `/` has to separate it from the authority.
	pub fn compile(pattern: &str) -> Result<Self> {
		let trimmed = pattern.trim();

		if trimmed.bytes().filter(|b| *b == b'*').count() != 1 {
			return Err(Error::Configuration {
				setting: "allowed_redirect_uris",
				reason: format!("Pattern '{trimmed}' must contain exactly one '*'."),
			});
		}
		if !trimmed.ends_with('*') {
			return Err(Error::Configuration {
				setting: "allowed_redirect_uris",
				reason: format!("Pattern '{trimmed}' must end with its '*'."),
			});
		}

		let base = &trimmed[..trimmed.len() - 1];
		let authority = base.split_once("://").map(|(_, rest)| rest).unwrap_or("");

		if !authority.contains('/') {
			return Err(Error::Configuration {
				setting: "allowed_redirect_uris",
				reason: format!("Pattern '{trimmed}' must place its '*' inside the path."),
			});
		}

		let base_url = Url::parse(base)?;

		if !ALLOWED_SCHEMES.contains(&base_url.scheme()) {
			return Err(Error::Configuration {
				setting: "allowed_redirect_uris",
				reason: format!("Pattern '{trimmed}' must use the http or https scheme."),
			});
		}

		let Some(host) = base_url.host_str() else {
			return Err(Error::Configuration {
				setting: "allowed_redirect_uris",
				reason: format!("Pattern '{trimmed}' must include a host component."),
			});
		};

		// `Url::parse` normalizes a scheme-default port away, which would turn
		// an operator-pinned `:443` into "any port"; recover it from the raw
		// authority instead.
		let port = if has_explicit_port(authority) {
			base_url.port_or_known_default()
		} else {
			base_url.port()
		};

		Ok(Self {
			scheme: base_url.scheme().to_owned(),
			host: host.to_ascii_lowercase(),
			port,
			path_prefix: base_url.path().to_ascii_lowercase(),
		})
	}

	/// Whether a parsed candidate URL falls under this pattern.
	///
	/// Scheme and host must be identical, the port must match when the pattern
	/// specifies one, and the candidate path must start with the fixed prefix.
	/// Comparison is case-insensitive post-normalization.
	pub fn matches(&self, candidate: &Url) -> bool {
		if candidate.scheme() != self.scheme {
			return false;
		}
		if candidate.host_str().map(|host| host.to_ascii_lowercase()).as_deref()
			!= Some(self.host.as_str())
		{
			return false;
		}
		if let Some(port) = self.port
			&& candidate.port_or_known_default() != Some(port)
		{
			return false;
		}

		candidate.path().to_ascii_lowercase().starts_with(&self.path_prefix)
	}

	/// Fixed path prefix matched by this pattern.
	pub fn path_prefix(&self) -> &str {
		&self.path_prefix
	}
}

/// Whether the raw authority carries an explicit `:<digits>` port.
fn has_explicit_port(authority: &str) -> bool {
	authority
		.split('/')
		.next()
		.and_then(|host_port| host_port.rsplit_once(':'))
		.is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}
