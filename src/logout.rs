//! Provider logout URL composition.

// std
use std::net::IpAddr;
// crates.io
use url::Url;
// self
use crate::{_prelude::*, redirect::validator::RedirectValidator, settings::ProviderSettings};

/// Composes the identity-provider logout URL with the client identifier and a
/// validated post-logout redirect.
///
/// This component adds no security logic of its own: every non-blank
/// requested redirect is delegated to [`RedirectValidator`], the single
/// authoritative implementation, and rejections propagate unchanged.
#[derive(Clone, Debug)]
pub struct LogoutUrlBuilder {
	logout_endpoint: Url,
	client_id: String,
	validator: Arc<RedirectValidator>,
	default_redirect: String,
}
impl LogoutUrlBuilder {
	/// Create a builder over validated provider settings.
	///
	/// The default redirect must be non-blank: the provider always receives a
	/// concrete `post_logout_redirect_uri` parameter.
	pub fn new(
		provider: &ProviderSettings,
		validator: Arc<RedirectValidator>,
		default_redirect: impl Into<String>,
	) -> Result<Self> {
		let default_redirect = default_redirect.into();

		if default_redirect.trim().is_empty() {
			return Err(Error::Configuration {
				setting: "redirect.default_redirect_uri",
				reason: "Must not be blank.".into(),
			});
		}

		let logout_endpoint = Url::parse(&provider.logout_url())?;

		Ok(Self {
			logout_endpoint,
			client_id: provider.client_id.clone(),
			validator,
			default_redirect,
		})
	}

	/// Build the complete logout URL for a caller-requested redirect.
	///
	/// A blank request substitutes the configured default; anything else must
	/// pass allowlist validation.
	pub fn build_logout_url(&self, requested_redirect: &str, client_ip: IpAddr) -> Result<Url> {
		let redirect = if requested_redirect.trim().is_empty() {
			tracing::debug!(
				default = %self.default_redirect,
				"No redirect requested; using the configured default.",
			);

			self.default_redirect.clone()
		} else {
			self.validator.validate_and_normalize(requested_redirect, client_ip)?
		};
		let mut url = self.logout_endpoint.clone();

		url.query_pairs_mut()
			.append_pair("client_id", &self.client_id)
			.append_pair("post_logout_redirect_uri", &redirect);

		tracing::debug!(redirect = %redirect, "Composed logout URL.");

		Ok(url)
	}
}
