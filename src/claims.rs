//! Identity claims resolution.
//!
//! Converts an already-verified token and its authenticated principal into
//! outward-facing shapes. Claim extraction is total: identity providers do
//! not populate the same claims across grant types, so every optional claim
//! resolves to an explicit default instead of failing.

// crates.io
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, settings::ProviderSettings};

/// Standard claim names read from verified tokens.
pub mod claim {
	/// Token subject.
	pub const SUBJECT: &str = "sub";
	/// Preferred username.
	pub const PREFERRED_USERNAME: &str = "preferred_username";
	/// Email address.
	pub const EMAIL: &str = "email";
	/// Given name.
	pub const GIVEN_NAME: &str = "given_name";
	/// Family name.
	pub const FAMILY_NAME: &str = "family_name";
	/// Full display name.
	pub const NAME: &str = "name";
	/// Whether the provider has verified the email address.
	pub const EMAIL_VERIFIED: &str = "email_verified";
}

/// Sentinel username reported when the token carries no usable username claim.
pub const UNKNOWN_USERNAME: &str = "unknown";

/// A token whose signature has already been verified by an external
/// collaborator.
///
/// This crate never verifies signatures itself; it only reads named claims
/// from the verified payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VerifiedToken {
	/// Claim map carried by the token payload.
	#[serde(default)]
	pub claims: Map<String, Value>,
	/// Expiry instant, when the verifier surfaced one.
	#[serde(default)]
	pub expires_at: Option<DateTime<Utc>>,
	/// Issuance instant, when the verifier surfaced one.
	#[serde(default)]
	pub issued_at: Option<DateTime<Utc>>,
}
impl VerifiedToken {
	/// Create a token view over a verified claim map.
	pub fn new(claims: Map<String, Value>) -> Self {
		Self { claims, expires_at: None, issued_at: None }
	}

	/// Attach the expiry instant reported by the verifier.
	pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
		self.expires_at = Some(expires_at);

		self
	}

	/// Attach the issuance instant reported by the verifier.
	pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
		self.issued_at = Some(issued_at);

		self
	}

	/// Read a string claim, if present.
	pub fn claim_str(&self, name: &str) -> Option<&str> {
		self.claims.get(name).and_then(Value::as_str)
	}

	/// Read a boolean claim, if present.
	pub fn claim_bool(&self, name: &str) -> Option<bool> {
		self.claims.get(name).and_then(Value::as_bool)
	}

	/// Token subject, if present.
	pub fn subject(&self) -> Option<&str> {
		self.claim_str(claim::SUBJECT)
	}
}

/// Authenticated principal carrying the granted-authority list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Principal {
	/// Authorities granted to the caller.
	#[serde(default)]
	pub authorities: Vec<String>,
}
impl Principal {
	/// Create a principal from its granted authorities.
	pub fn new<I, S>(authorities: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { authorities: authorities.into_iter().map(Into::into).collect() }
	}
}

/// Outward-facing profile built from a verified token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
	/// Token subject.
	pub subject: String,
	/// Username, or [`UNKNOWN_USERNAME`] when absent.
	pub username: String,
	/// Email address, empty when absent.
	pub email: String,
	/// Given name, empty when absent.
	pub first_name: String,
	/// Family name, empty when absent.
	pub last_name: String,
	/// Full display name, empty when absent.
	pub full_name: String,
	/// Roles granted to the caller.
	pub roles: Vec<String>,
	/// Whether the provider has verified the email address.
	pub email_verified: bool,
}

/// Outward-facing token summary for introspection-style responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSummary {
	/// Always `true` for a present token; verification happened upstream.
	pub valid: bool,
	/// Username, or [`UNKNOWN_USERNAME`] when absent.
	pub username: String,
	/// Expiry instant, when known.
	pub expires_at: Option<DateTime<Utc>>,
	/// Issuance instant, when known.
	pub issued_at: Option<DateTime<Utc>>,
	/// Authorities granted to the caller.
	pub authorities: Vec<String>,
}

/// Public provider metadata served by discovery endpoints.
///
/// Built once at startup from static deployment configuration; never
/// refreshed over the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProviderConfig {
	/// Realm name.
	pub realm: String,
	/// Authorization endpoint URL.
	pub authorization_url: String,
	/// Public client identifier.
	pub client_id: String,
}

/// Resolver mapping verified tokens and principals into outward-facing
/// identity shapes.
///
/// Immutable after construction; share via [`Arc`].
#[derive(Clone, Debug)]
pub struct ClaimsResolver {
	public_config: PublicProviderConfig,
}
impl ClaimsResolver {
	/// Build a resolver and cache the public provider configuration once.
	pub fn new(settings: &ProviderSettings) -> Self {
		let public_config = PublicProviderConfig {
			realm: settings.realm.clone(),
			authorization_url: settings.authorization_url(),
			client_id: settings.client_id.clone(),
		};

		tracing::debug!(
			realm = %public_config.realm,
			authorization_url = %public_config.authorization_url,
			"Cached public provider configuration.",
		);

		Self { public_config }
	}

	/// Cached public provider configuration.
	pub fn public_config(&self) -> &PublicProviderConfig {
		&self.public_config
	}

	/// Build the outward-facing profile for an authenticated caller.
	pub fn build_profile(
		&self,
		token: Option<&VerifiedToken>,
		principal: Option<&Principal>,
	) -> Result<IdentityClaims> {
		let token = token.ok_or_else(|| Error::Unauthorized("User not authenticated.".into()))?;

		Ok(IdentityClaims {
			subject: claim_or_default(token, claim::SUBJECT),
			username: username_or_sentinel(token),
			email: claim_or_default(token, claim::EMAIL),
			first_name: claim_or_default(token, claim::GIVEN_NAME),
			last_name: claim_or_default(token, claim::FAMILY_NAME),
			full_name: claim_or_default(token, claim::NAME),
			roles: Self::extract_authorities(principal),
			email_verified: token.claim_bool(claim::EMAIL_VERIFIED).unwrap_or(false),
		})
	}

	/// Build the token summary for an authenticated caller.
	pub fn build_token_summary(
		&self,
		token: Option<&VerifiedToken>,
		principal: Option<&Principal>,
	) -> Result<TokenSummary> {
		let token =
			token.ok_or_else(|| Error::Unauthorized("Invalid or expired token.".into()))?;

		Ok(TokenSummary {
			valid: true,
			username: username_or_sentinel(token),
			expires_at: token.expires_at,
			issued_at: token.issued_at,
			authorities: Self::extract_authorities(principal),
		})
	}

	/// Authorities granted to the principal.
	///
	/// An absent principal yields an empty list, never an error; callers must
	/// treat "no authorities" as a valid low-privilege state.
	pub fn extract_authorities(principal: Option<&Principal>) -> Vec<String> {
		principal.map(|principal| principal.authorities.clone()).unwrap_or_default()
	}
}

fn claim_or_default(token: &VerifiedToken, name: &str) -> String {
	token.claim_str(name).unwrap_or_default().to_owned()
}

fn username_or_sentinel(token: &VerifiedToken) -> String {
	token.claim_str(claim::PREFERRED_USERNAME).unwrap_or(UNKNOWN_USERNAME).to_owned()
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use url::Url;
	// self
	use super::*;

	fn resolver() -> ClaimsResolver {
		ClaimsResolver::new(&ProviderSettings {
			auth_server_url: Url::parse("https://id.example.com").unwrap(),
			realm: "shop".into(),
			client_id: "storefront".into(),
		})
	}

	fn full_token() -> VerifiedToken {
		let Value::Object(claims) = json!({
			"sub": "f3b1c2d4",
			"preferred_username": "alice",
			"email": "alice@example.com",
			"given_name": "Alice",
			"family_name": "Archer",
			"name": "Alice Archer",
			"email_verified": true,
		}) else {
			unreachable!()
		};

		VerifiedToken::new(claims)
	}

	#[test]
	fn profile_maps_every_claim() {
		let principal = Principal::new(["ROLE_USER", "ROLE_SELLER"]);
		let profile = resolver().build_profile(Some(&full_token()), Some(&principal)).unwrap();

		assert_eq!(profile.subject, "f3b1c2d4");
		assert_eq!(profile.username, "alice");
		assert_eq!(profile.email, "alice@example.com");
		assert_eq!(profile.first_name, "Alice");
		assert_eq!(profile.last_name, "Archer");
		assert_eq!(profile.full_name, "Alice Archer");
		assert_eq!(profile.roles, vec!["ROLE_USER", "ROLE_SELLER"]);
		assert!(profile.email_verified);
	}

	#[test]
	fn missing_optional_claims_degrade_to_defaults() {
		let profile = resolver().build_profile(Some(&VerifiedToken::default()), None).unwrap();

		assert_eq!(profile.username, UNKNOWN_USERNAME);
		assert_eq!(profile.subject, "");
		assert_eq!(profile.email, "");
		assert_eq!(profile.full_name, "");
		assert!(profile.roles.is_empty());
		assert!(!profile.email_verified);
	}

	#[test]
	fn absent_token_is_unauthorized() {
		let resolver = resolver();

		assert!(matches!(resolver.build_profile(None, None), Err(Error::Unauthorized(_))));
		assert!(matches!(resolver.build_token_summary(None, None), Err(Error::Unauthorized(_))));
	}

	#[test]
	fn token_summary_reports_instants_and_authorities() {
		let issued = Utc::now();
		let expires = issued + chrono::TimeDelta::minutes(5);
		let token = full_token().with_issued_at(issued).with_expires_at(expires);
		let principal = Principal::new(["ROLE_USER"]);
		let summary = resolver().build_token_summary(Some(&token), Some(&principal)).unwrap();

		assert!(summary.valid);
		assert_eq!(summary.username, "alice");
		assert_eq!(summary.issued_at, Some(issued));
		assert_eq!(summary.expires_at, Some(expires));
		assert_eq!(summary.authorities, vec!["ROLE_USER"]);
	}

	#[test]
	fn absent_principal_yields_empty_authorities() {
		assert!(ClaimsResolver::extract_authorities(None).is_empty());
	}

	#[test]
	fn public_config_is_built_from_static_settings() {
		let config = resolver().public_config().clone();

		assert_eq!(config.realm, "shop");
		assert_eq!(config.client_id, "storefront");
		assert_eq!(
			config.authorization_url,
			"https://id.example.com/realms/shop/protocol/openid-connect/auth",
		);
	}
}
