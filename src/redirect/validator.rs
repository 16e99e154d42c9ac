//! Allowlist-based redirect target validation.
//!
//! # Threat Model
//! Redirect targets arrive from untrusted callers and feed directly into HTTP
//! redirects, so this module defends against open redirects, double-encoding
//! smuggling, userinfo/host confusion, and SSRF via loopback or RFC-1918
//! hosts. The allowlist itself is operator-supplied at startup and never
//! grows from runtime input.

// std
use std::{
	collections::HashSet,
	net::{IpAddr, Ipv4Addr},
};
// crates.io
use percent_encoding::percent_decode_str;
use url::Url;
// self
use crate::{
	_prelude::*,
	redirect::{ALLOWED_SCHEMES, pattern::WildcardPattern},
	settings::{Environment, RedirectSettings},
};

/// Immutable allowlist snapshot.
///
/// Built exactly once at startup and read concurrently without locking.
/// Reconfiguration means building a new [`RedirectValidator`] and swapping a
/// single `Arc`, never mutating the live collections.
#[derive(Clone, Debug, Default)]
pub struct RedirectConfig {
	exact: HashSet<String>,
	patterns: Vec<WildcardPattern>,
}
impl RedirectConfig {
	/// Number of exact-match entries.
	pub fn exact_len(&self) -> usize {
		self.exact.len()
	}

	/// Number of compiled wildcard patterns.
	pub fn pattern_len(&self) -> usize {
		self.patterns.len()
	}
}

/// Validator deciding whether a caller-supplied URL may be used as an
/// OAuth2-style redirect target.
///
/// Immutable after construction; share between request handlers via
/// [`Arc`].
#[derive(Clone, Debug)]
pub struct RedirectValidator {
	config: RedirectConfig,
	environment: Environment,
}
impl RedirectValidator {
	/// Build the immutable allowlist from operator-supplied entries.
	///
	/// Entries may carry comma-separated values. Entries containing a `*` are
	/// compiled as path-suffix wildcard patterns; patterns with a wildcard
	/// anywhere else are skipped with a warning. All other entries join the
	/// exact-match set, lower-cased and normalized.
	pub fn new<I, S>(entries: I, environment: Environment) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut exact = HashSet::new();
		let mut patterns = Vec::new();

		for entry in entries {
			for piece in entry.as_ref().split(',') {
				let piece = piece.trim();

				if piece.is_empty() {
					continue;
				}

				load_entry(piece, &mut exact, &mut patterns);
			}
		}

		tracing::info!(
			exact = exact.len(),
			patterns = patterns.len(),
			"Initialized redirect allowlist.",
		);

		Self { config: RedirectConfig { exact, patterns }, environment }
	}

	/// Build a validator from [`RedirectSettings`].
	pub fn from_settings(settings: &RedirectSettings, environment: Environment) -> Self {
		Self::new(&settings.allowed_redirect_uris, environment)
	}

	/// Active allowlist snapshot.
	pub fn config(&self) -> &RedirectConfig {
		&self.config
	}

	/// Validate a caller-supplied redirect target and return its normalized
	/// form.
	///
	/// Rejected candidates are logged at `warn` together with the caller IP;
	/// accepted values are never logged above `debug`. Re-validating an
	/// accepted output returns it unchanged.
	pub fn validate_and_normalize(&self, candidate: &str, client_ip: IpAddr) -> Result<String> {
		self.check(candidate).inspect_err(|err| {
			tracing::warn!(
				candidate = %candidate,
				client_ip = %client_ip,
				%err,
				"Rejected redirect URI.",
			);
		})
	}

	/// Non-throwing advisory variant of [`Self::validate_and_normalize`].
	pub fn is_allowed(&self, candidate: &str) -> bool {
		self.check(candidate).is_ok()
	}

	// Single authoritative validation pipeline; both public entry points and
	// the logout builder delegate here.
	fn check(&self, candidate: &str) -> Result<String> {
		if candidate.trim().is_empty() {
			return Err(Error::InvalidRedirectUri("Redirect URI cannot be empty.".into()));
		}

		let decoded = decode_rejecting_double_encoding(candidate)?;
		let normalized = normalize(&decoded);
		let parsed = self.validate_structure(&normalized)?;

		if self.config.exact.contains(&normalized.to_ascii_lowercase())
			|| self.config.patterns.iter().any(|pattern| pattern.matches(&parsed))
		{
			tracing::debug!(candidate = %normalized, "Validated redirect URI.");

			return Ok(normalized);
		}

		Err(Error::InvalidRedirectUri("Redirect URI is not in the allowlist.".into()))
	}

	fn validate_structure(&self, normalized: &str) -> Result<Url> {
		if normalized.contains('@')
			|| normalized.contains("..")
			|| normalized.matches("//").count() > 1
		{
			return Err(Error::InvalidRedirectUri(
				"Suspicious pattern detected in redirect URI.".into(),
			));
		}

		let parsed = Url::parse(normalized)
			.map_err(|err| Error::InvalidRedirectUri(format!("Malformed URI: {err}.")))?;

		if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
			return Err(Error::InvalidRedirectUri(
				"Only the http and https schemes are allowed.".into(),
			));
		}

		let Some(host) = parsed.host_str() else {
			return Err(Error::InvalidRedirectUri("Redirect URI must include a host.".into()));
		};

		if !is_valid_hostname(host) {
			return Err(Error::InvalidRedirectUri("Malformed host.".into()));
		}
		if self.environment.is_production() && is_loopback_or_private(host) {
			return Err(Error::InvalidRedirectUri(
				"Loopback and private-network hosts are not allowed in production.".into(),
			));
		}

		Ok(parsed)
	}
}

fn load_entry(entry: &str, exact: &mut HashSet<String>, patterns: &mut Vec<WildcardPattern>) {
	let normalized = normalize(entry);

	if normalized.contains('*') {
		match WildcardPattern::compile(&normalized) {
			Ok(pattern) => patterns.push(pattern),
			Err(err) => {
				tracing::warn!(pattern = %entry, %err, "Skipping invalid wildcard pattern.");
			},
		}
	} else {
		exact.insert(normalized.to_ascii_lowercase());
	}
}

/// Percent-decode once, then decode the result again; a second pass that
/// still changes the value means the caller smuggled an extra encoding layer.
fn decode_rejecting_double_encoding(candidate: &str) -> Result<String> {
	let decoded = decode(candidate)?;

	if decoded != candidate && decode(&decoded)? != decoded {
		return Err(Error::InvalidRedirectUri("Double percent-encoding detected.".into()));
	}

	Ok(decoded)
}

fn decode(value: &str) -> Result<String> {
	Ok(percent_decode_str(value)
		.decode_utf8()
		.map_err(|_| Error::InvalidRedirectUri("Invalid percent-encoding.".into()))?
		.into_owned())
}

/// Trim whitespace and strip at most one trailing slash, never a `*/` marker.
fn normalize(value: &str) -> String {
	let trimmed = value.trim();

	if trimmed.len() > 1 && trimmed.ends_with('/') && !trimmed.ends_with("*/") {
		trimmed[..trimmed.len() - 1].to_owned()
	} else {
		trimmed.to_owned()
	}
}

/// Conservative hostname grammar: dot-separated alphanumeric labels with
/// inner hyphens. Bracketed IPv6 literals and underscores do not pass.
fn is_valid_hostname(host: &str) -> bool {
	!host.is_empty()
		&& host.split('.').all(|label| {
			!label.is_empty()
				&& label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
				&& !label.starts_with('-')
				&& !label.ends_with('-')
		})
}

fn is_loopback_or_private(host: &str) -> bool {
	if host.eq_ignore_ascii_case("localhost") {
		return true;
	}

	host.parse::<Ipv4Addr>()
		.map(|ip| ip.is_loopback() || ip.is_private() || ip.is_unspecified())
		.unwrap_or(false)
}
