//! Fail-fast startup credential validation.
//!
//! Runs exactly once at bootstrap, before the service accepts traffic. Any
//! violation raises a fatal [`Error::Configuration`] naming the offending
//! setting; the hosting runtime must treat that as "do not become ready".
//! Secret values are never logged, only which named check passed or failed.

// self
use crate::{
	_prelude::*,
	settings::{CredentialSettings, Environment, PaymentGatewayCredentials},
};

/// Minimum accepted length for the signing secret.
pub const MIN_SIGNING_SECRET_LENGTH: usize = 32;

/// Placeholder values that must never reach production.
const UNSAFE_DEFAULTS: [&str; 9] = [
	"changeme",
	"password",
	"secret",
	"default",
	"admin",
	"test",
	"demo",
	"example",
	"your-secret-here",
];

/// One-shot startup sweep over required secrets.
#[derive(Clone, Debug)]
pub struct CredentialGuard {
	settings: CredentialSettings,
	environment: Environment,
}
impl CredentialGuard {
	/// Create a guard over the given settings.
	pub fn new(settings: CredentialSettings, environment: Environment) -> Self {
		Self { settings, environment }
	}

	/// Execute the sweep.
	///
	/// Skipped entirely when enforcement is disabled or the environment is
	/// [`Environment::Test`]. Otherwise validates database credentials and the
	/// signing secret unconditionally, plus payment-gateway key pairs and the
	/// identity-provider issuer when those integrations are configured.
	pub fn run_validation(&self) -> Result<()> {
		if !self.settings.enforce || self.environment == Environment::Test {
			tracing::info!(
				enforce = self.settings.enforce,
				environment = ?self.environment,
				"Skipping credential validation.",
			);

			return Ok(());
		}

		let is_production = self.environment.is_production();

		self.validate_database(is_production).inspect_err(log_failure)?;
		self.validate_signing_secret(is_production).inspect_err(log_failure)?;

		for gateway in &self.settings.payment_gateways {
			validate_payment_gateway(gateway, is_production).inspect_err(log_failure)?;
		}

		self.validate_identity_provider(is_production).inspect_err(log_failure)?;

		tracing::info!(
			gateways = self.settings.payment_gateways.len(),
			"All credential checks passed.",
		);

		Ok(())
	}

	fn validate_database(&self, is_production: bool) -> Result<()> {
		if is_blank(&self.settings.database_url) {
			return Err(Error::Configuration {
				setting: "database.url",
				reason: "Database connection string is not configured.".into(),
			});
		}
		if is_blank(&self.settings.database_username) {
			return Err(Error::Configuration {
				setting: "database.username",
				reason: "Database username is not configured.".into(),
			});
		}
		if is_blank(&self.settings.database_password) {
			return Err(Error::Configuration {
				setting: "database.password",
				reason: "Database password is not configured.".into(),
			});
		}
		if is_production && let Some(placeholder) = unsafe_default_in(&self.settings.database_password)
		{
			return Err(Error::Configuration {
				setting: "database.password",
				reason: format!("Contains the unsafe placeholder '{placeholder}'."),
			});
		}

		tracing::info!(check = "database", "Credential check passed.");

		Ok(())
	}

	fn validate_signing_secret(&self, is_production: bool) -> Result<()> {
		let secret = &self.settings.signing_secret;

		if is_blank(secret) {
			return Err(Error::Configuration {
				setting: "signing_secret",
				reason: "Signing secret is not configured.".into(),
			});
		}
		if secret.len() < MIN_SIGNING_SECRET_LENGTH {
			return Err(Error::Configuration {
				setting: "signing_secret",
				reason: format!(
					"Secret is too short ({} characters); minimum is {MIN_SIGNING_SECRET_LENGTH}.",
					secret.len(),
				),
			});
		}
		if let Some(placeholder) = unsafe_default_in(secret) {
			if is_production {
				return Err(Error::Configuration {
					setting: "signing_secret",
					reason: format!("Contains the unsafe placeholder '{placeholder}'."),
				});
			}

			tracing::warn!(
				check = "signing_secret",
				placeholder,
				"Signing secret contains a placeholder value; fatal in production.",
			);
		}

		tracing::info!(check = "signing_secret", "Credential check passed.");

		Ok(())
	}

	fn validate_identity_provider(&self, is_production: bool) -> Result<()> {
		let Some(issuer) = &self.settings.identity_provider_issuer else {
			return Ok(());
		};

		if is_blank(issuer) {
			return Err(Error::Configuration {
				setting: "identity_provider.issuer",
				reason: "Provider integration is enabled but the issuer URL is not configured."
					.into(),
			});
		}
		if is_production && issuer.contains("localhost") {
			tracing::warn!(
				check = "identity_provider",
				"Issuer URL points at localhost in production.",
			);
		}

		tracing::info!(check = "identity_provider", "Credential check passed.");

		Ok(())
	}
}

fn validate_payment_gateway(
	gateway: &PaymentGatewayCredentials,
	is_production: bool,
) -> Result<()> {
	if is_blank(&gateway.key_id) {
		return Err(Error::Configuration {
			setting: "payment_gateway.key_id",
			reason: format!("Gateway '{}' is enabled but its key id is not configured.", gateway.name),
		});
	}
	if is_blank(&gateway.key_secret) {
		return Err(Error::Configuration {
			setting: "payment_gateway.key_secret",
			reason: format!(
				"Gateway '{}' is enabled but its key secret is not configured.",
				gateway.name,
			),
		});
	}
	if is_production && let Some(placeholder) = unsafe_default_in(&gateway.key_secret) {
		return Err(Error::Configuration {
			setting: "payment_gateway.key_secret",
			reason: format!(
				"Gateway '{}' key secret contains the unsafe placeholder '{placeholder}'.",
				gateway.name,
			),
		});
	}

	tracing::info!(check = "payment_gateway", gateway = %gateway.name, "Credential check passed.");

	Ok(())
}

fn is_blank(value: &str) -> bool {
	value.trim().is_empty()
}

fn unsafe_default_in(value: &str) -> Option<&'static str> {
	let lowered = value.to_ascii_lowercase();

	UNSAFE_DEFAULTS.into_iter().find(|placeholder| lowered.contains(placeholder))
}

fn log_failure(err: &Error) {
	tracing::error!(%err, "Credential validation failed.");
}
