//! Requests a service token with the client-credentials grant over the default reqwest
//! transport, then renews it with the refresh-token grant.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_tokenkit::{
	client::ReqwestTokenClient,
	grant::ExtraFields,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
	reqwest::{Client, redirect::Policy},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let issue_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body_includes("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900,\"refresh_token\":\"demo-refresh\"}",
			);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body_includes("grant_type=refresh_token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access-2\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	// The mock server's certificate is self-signed.
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(Policy::none())
			.build()?,
	);
	let client = ReqwestTokenClient::with_http_client(
		server.url("/token"),
		http_client,
		ReqwestTransportErrorMapper,
	)?;
	let audience = [("audience", "https://api.example.com")].into_iter().collect::<ExtraFields>();
	let issued = client
		.request_client_credentials(
			"demo-client",
			"super-secret",
			Some("email.read profile.read"),
			Some(audience),
		)
		.await?;

	println!("Issued access token: {}.", issued.access_token.expose());

	if let Some(refresh_token) = &issued.refresh_token {
		let renewed = client
			.request_refresh_token("demo-client", "super-secret", refresh_token.expose(), None)
			.await?;

		println!("Renewed access token: {}.", renewed.access_token.expose());
	}

	issue_mock.assert_async().await;
	refresh_mock.assert_async().await;

	Ok(())
}
