//! Composition root tying the security core together at process bootstrap.

// self
use crate::{
	_prelude::*,
	claims::ClaimsResolver,
	credentials::CredentialGuard,
	logout::LogoutUrlBuilder,
	redirect::validator::RedirectValidator,
	settings::{CredentialSettings, Environment, ProviderSettings, RedirectSettings},
};

/// Everything the bootstrap sequence needs, gathered in one place.
#[derive(Clone, Debug)]
pub struct IdentitySettings {
	/// Active deployment environment.
	pub environment: Environment,
	/// Identity-provider deployment metadata.
	pub provider: ProviderSettings,
	/// Redirect allowlist and default redirect.
	pub redirect: RedirectSettings,
	/// Secrets swept by the credential guard.
	pub credentials: CredentialSettings,
}

/// Bootstrapped identity & redirect-security core.
///
/// Construction is single-threaded and strictly ordered: the credential guard
/// runs first and a failure there prevents every other component from being
/// built. Afterwards all handles are immutable and freely shareable across
/// request-serving threads.
#[derive(Clone, Debug)]
pub struct IdentityCore {
	environment: Environment,
	redirect_validator: Arc<RedirectValidator>,
	claims_resolver: Arc<ClaimsResolver>,
	logout_builder: Arc<LogoutUrlBuilder>,
}
impl IdentityCore {
	/// Run the bootstrap sequence.
	///
	/// The returned error, when fatal, must keep the process from reaching a
	/// ready state; see [`Error::is_fatal`].
	pub fn bootstrap(settings: IdentitySettings) -> Result<Self> {
		let IdentitySettings { environment, provider, redirect, credentials } = settings;

		CredentialGuard::new(credentials, environment).run_validation()?;
		provider.validate()?;

		let redirect_validator = Arc::new(RedirectValidator::from_settings(&redirect, environment));
		let claims_resolver = Arc::new(ClaimsResolver::new(&provider));
		let logout_builder = Arc::new(LogoutUrlBuilder::new(
			&provider,
			redirect_validator.clone(),
			redirect.default_redirect_uri,
		)?);

		tracing::info!(environment = ?environment, "Identity core bootstrapped.");

		Ok(Self { environment, redirect_validator, claims_resolver, logout_builder })
	}

	/// Active deployment environment.
	pub fn environment(&self) -> Environment {
		self.environment
	}

	/// Shared redirect validator handle.
	pub fn redirect_validator(&self) -> &Arc<RedirectValidator> {
		&self.redirect_validator
	}

	/// Shared claims resolver handle.
	pub fn claims_resolver(&self) -> &Arc<ClaimsResolver> {
		&self.claims_resolver
	}

	/// Shared logout URL builder handle.
	pub fn logout_builder(&self) -> &Arc<LogoutUrlBuilder> {
		&self.logout_builder
	}
}
