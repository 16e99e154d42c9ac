//! Deployment settings consumed at bootstrap.
//!
//! Every settings struct here is built once during process startup, validated
//! explicitly, and read concurrently afterwards without locking.

// crates.io
use serde::{Deserialize, Serialize};
use url::Url;
// self
use crate::_prelude::*;

/// Active deployment environment.
///
/// Promoted to a structural flag instead of scattering profile-string
/// comparisons through the security checks; [`Environment::from_profile`] is
/// the single place where profile strings are interpreted.
#[derive(Clone, Debug, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	/// Local or shared development deployment.
	#[default]
	Development,
	/// Automated-test environment; startup credential checks are skipped.
	Test,
	/// Production deployment; placeholder secrets and loopback redirect
	/// targets become fatal.
	Production,
}
impl Environment {
	/// Interpret a deployment profile string.
	///
	/// `prod` and `production` map to [`Environment::Production`], any profile
	/// containing `test` maps to [`Environment::Test`], everything else is
	/// treated as development.
	pub fn from_profile(profile: &str) -> Self {
		let lowered = profile.trim().to_ascii_lowercase();

		if lowered == "prod" || lowered == "production" {
			Self::Production
		} else if lowered.contains("test") {
			Self::Test
		} else {
			Self::Development
		}
	}

	/// Whether this is the production environment.
	pub fn is_production(&self) -> bool {
		matches!(self, Self::Production)
	}
}

/// Static identity-provider deployment metadata.
///
/// The derived endpoint URLs follow the provider's realm-scoped OIDC layout
/// and are computed from configuration alone; nothing here is ever refreshed
/// over the network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderSettings {
	/// Base URL of the identity provider, without the realm path.
	pub auth_server_url: Url,
	/// Realm that scopes all derived endpoints.
	pub realm: String,
	/// Public client identifier registered with the provider.
	pub client_id: String,
}
impl ProviderSettings {
	/// Validate the settings against the documented constraints.
	pub fn validate(&self) -> Result<()> {
		if self.realm.trim().is_empty() {
			return Err(Error::Configuration {
				setting: "provider.realm",
				reason: "Must not be blank.".into(),
			});
		}
		if !self.realm.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_')) {
			return Err(Error::Configuration {
				setting: "provider.realm",
				reason: "May only contain ASCII letters, numbers, '-', or '_'.".into(),
			});
		}
		if self.client_id.trim().is_empty() {
			return Err(Error::Configuration {
				setting: "provider.client_id",
				reason: "Must not be blank.".into(),
			});
		}

		Ok(())
	}

	/// Realm-scoped issuer URL, with any trailing slash on the base removed.
	pub fn issuer_url(&self) -> String {
		format!("{}/realms/{}", self.auth_server_url.as_str().trim_end_matches('/'), self.realm)
	}

	/// Authorization endpoint exposed to browser-based login flows.
	pub fn authorization_url(&self) -> String {
		format!("{}/protocol/openid-connect/auth", self.issuer_url())
	}

	/// RP-initiated logout endpoint.
	pub fn logout_url(&self) -> String {
		format!("{}/protocol/openid-connect/logout", self.issuer_url())
	}
}

/// Operator-supplied redirect allowlist configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RedirectSettings {
	/// Absolute URLs and path-suffix wildcard patterns permitted as redirect
	/// targets. Entries may themselves carry comma-separated values.
	#[serde(default)]
	pub allowed_redirect_uris: Vec<String>,
	/// Redirect used when a caller supplies no target of its own.
	#[serde(default)]
	pub default_redirect_uri: String,
}

/// Key pair for an optional payment-gateway integration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentGatewayCredentials {
	/// Gateway name used in diagnostics (never the key material).
	pub name: String,
	/// Publishable key identifier.
	pub key_id: String,
	/// Secret key.
	pub key_secret: String,
}

/// Secrets swept by the startup credential guard.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialSettings {
	/// Whether the startup sweep is enforced at all.
	#[serde(default = "default_true")]
	pub enforce: bool,
	/// Database connection string.
	#[serde(default)]
	pub database_url: String,
	/// Database username.
	#[serde(default)]
	pub database_username: String,
	/// Database password.
	#[serde(default)]
	pub database_password: String,
	/// Secret used by the token-issuing collaborator to sign tokens.
	#[serde(default)]
	pub signing_secret: String,
	/// Enabled payment-gateway integrations; empty when none are enabled.
	#[serde(default)]
	pub payment_gateways: Vec<PaymentGatewayCredentials>,
	/// Issuer URL of the identity provider, when that integration is enabled.
	#[serde(default)]
	pub identity_provider_issuer: Option<String>,
}
impl Default for CredentialSettings {
	fn default() -> Self {
		Self {
			enforce: true,
			database_url: String::new(),
			database_username: String::new(),
			database_password: String::new(),
			signing_secret: String::new(),
			payment_gateways: Vec::new(),
			identity_provider_issuer: None,
		}
	}
}

fn default_true() -> bool {
	true
}
