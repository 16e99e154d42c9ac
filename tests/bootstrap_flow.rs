//! Credential-guard gating of the bootstrap sequence.

// std
use std::net::IpAddr;
// crates.io
use identity_guard::{
	Error, IdentityCore, IdentitySettings,
	claims::{Principal, VerifiedToken},
	settings::{CredentialSettings, Environment, ProviderSettings, RedirectSettings},
};
use url::Url;

fn settings() -> IdentitySettings {
	IdentitySettings {
		environment: Environment::Development,
		provider: ProviderSettings {
			auth_server_url: Url::parse("https://id.example.com").unwrap(),
			realm: "shop".into(),
			client_id: "storefront".into(),
		},
		redirect: RedirectSettings {
			allowed_redirect_uris: vec!["https://shop.example.com/*".into()],
			default_redirect_uri: "https://shop.example.com/home".into(),
		},
		credentials: CredentialSettings {
			database_url: "postgres://db.internal:5432/shop".into(),
			database_username: "shop_app".into(),
			database_password: "kJ8#pL2$wQ9z".into(),
			signing_secret: "kX9mQ2vL7pR4nW8jT3hB6yF1cD5gZ0aV".into(),
			..CredentialSettings::default()
		},
	}
}

#[test]
fn guard_failure_aborts_bootstrap() {
	let _ = tracing_subscriber::fmt::try_init();

	let mut settings = settings();

	settings.credentials.signing_secret = "too-short".into();

	let err = IdentityCore::bootstrap(settings).unwrap_err();

	assert!(err.is_fatal());
	assert!(matches!(err, Error::Configuration { setting: "signing_secret", .. }));
}

#[test]
fn test_environment_skips_the_guard_entirely() {
	let _ = tracing_subscriber::fmt::try_init();

	let mut settings = settings();

	settings.environment = Environment::Test;
	settings.credentials = CredentialSettings::default();

	assert!(IdentityCore::bootstrap(settings).is_ok());
}

#[test]
fn bootstrapped_core_serves_claims_and_discovery_data() {
	let _ = tracing_subscriber::fmt::try_init();

	let core = IdentityCore::bootstrap(settings()).unwrap();
	let resolver = core.claims_resolver();

	let config = resolver.public_config();

	assert_eq!(config.realm, "shop");
	assert_eq!(config.client_id, "storefront");
	assert_eq!(
		config.authorization_url,
		"https://id.example.com/realms/shop/protocol/openid-connect/auth",
	);

	let token = VerifiedToken::default();
	let profile = resolver.build_profile(Some(&token), None).unwrap();

	assert_eq!(profile.username, "unknown");
	assert!(profile.roles.is_empty());

	let summary = resolver
		.build_token_summary(Some(&token), Some(&Principal::new(["ROLE_USER"])))
		.unwrap();

	assert!(summary.valid);
	assert_eq!(summary.authorities, vec!["ROLE_USER"]);

	// The shared validator handle is usable from any thread.
	let validator = core.redirect_validator().clone();
	let handle = std::thread::spawn(move || {
		validator.validate_and_normalize(
			"https://shop.example.com/orders",
			IpAddr::from([203, 0, 113, 7]),
		)
	});

	assert_eq!(handle.join().unwrap().unwrap(), "https://shop.example.com/orders");
}
