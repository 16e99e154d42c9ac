//! End-to-end redirect validation and logout composition.

// std
use std::net::IpAddr;
// crates.io
use identity_guard::{
	Error, IdentityCore, IdentitySettings,
	settings::{CredentialSettings, Environment, ProviderSettings, RedirectSettings},
};
use url::Url;

const CLIENT_IP: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(203, 0, 113, 7));

fn settings(environment: Environment) -> IdentitySettings {
	IdentitySettings {
		environment,
		provider: ProviderSettings {
			auth_server_url: Url::parse("https://id.example.com").unwrap(),
			realm: "shop".into(),
			client_id: "storefront".into(),
		},
		redirect: RedirectSettings {
			allowed_redirect_uris: vec![
				"https://shop.example.com/*".into(),
				"http://localhost:3000".into(),
			],
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

fn redirect_param(url: &Url) -> String {
	url.query_pairs()
		.find(|(key, _)| key == "post_logout_redirect_uri")
		.map(|(_, value)| value.into_owned())
		.expect("redirect parameter present")
}

#[test]
fn blank_request_falls_back_to_the_default_redirect() {
	let _ = tracing_subscriber::fmt::try_init();

	let core = IdentityCore::bootstrap(settings(Environment::Development)).unwrap();
	let url = core.logout_builder().build_logout_url("", CLIENT_IP).unwrap();

	assert_eq!(redirect_param(&url), "https://shop.example.com/home");
}

#[test]
fn allowlisted_redirect_passes_through_normalized() {
	let _ = tracing_subscriber::fmt::try_init();

	let core = IdentityCore::bootstrap(settings(Environment::Development)).unwrap();

	assert_eq!(
		core.redirect_validator()
			.validate_and_normalize("https://shop.example.com/cart", CLIENT_IP)
			.unwrap(),
		"https://shop.example.com/cart",
	);

	let url = core
		.logout_builder()
		.build_logout_url("https://shop.example.com/cart/", CLIENT_IP)
		.unwrap();

	assert_eq!(redirect_param(&url), "https://shop.example.com/cart");
}

#[test]
fn unlisted_redirect_is_rejected_end_to_end() {
	let _ = tracing_subscriber::fmt::try_init();

	let core = IdentityCore::bootstrap(settings(Environment::Development)).unwrap();
	let err = core
		.logout_builder()
		.build_logout_url("https://attacker.example.com/", CLIENT_IP)
		.unwrap_err();

	assert!(matches!(err, Error::InvalidRedirectUri(_)));
	assert!(!err.is_fatal());
}

#[test]
fn environment_gates_loopback_targets_with_the_allowlist_held_constant() {
	let _ = tracing_subscriber::fmt::try_init();

	let development = IdentityCore::bootstrap(settings(Environment::Development)).unwrap();
	let production = IdentityCore::bootstrap(settings(Environment::Production)).unwrap();

	assert!(development.redirect_validator().is_allowed("http://localhost:3000"));
	assert!(!production.redirect_validator().is_allowed("http://localhost:3000"));
}
