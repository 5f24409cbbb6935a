//! Token endpoint client exposing one method per grant type.
//!
//! Every request follows the same path: build [`GrantCredentials`], encode them with the
//! client's [`FormatOptions`], POST the body through a freshly acquired transport handle,
//! then parse the body text as JSON. Non-2xx responses are parsed like any other body so
//! callers can inspect the OAuth error payload; only transport faults and unparseable bodies
//! become errors. There are no retries.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, SerializationError},
	form::{self, FormatOptions},
	grant::{ExtraFields, GrantCredentials},
	http::{FormPost, FormReply, TokenHttpClient, TokenHttpHandle, TransportErrorMapper},
	obs::{self, FlowOutcome, FlowSpan},
	token::TokenResponse,
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Token client specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenClient = TokenClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Client for a single OAuth 2.0 token endpoint.
///
/// Configuration (endpoint, timeout, format options) is fixed while requests run; each request
/// owns its credentials, body, and transport handle, so concurrent calls on one client are
/// independent.
pub struct TokenClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	endpoint: Url,
	timeout: Duration,
	format: FormatOptions,
}
impl<C, M> TokenClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Timeout applied when none is configured.
	pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(30);

	/// Creates a client that reuses the caller-provided transport + mapper pair.
	///
	/// Fails with [`ConfigError::MissingEndpoint`] for an empty endpoint and
	/// [`ConfigError::InvalidEndpoint`] for a relative or unparseable one.
	pub fn with_http_client(
		endpoint: impl AsRef<str>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		Ok(Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			endpoint: parse_endpoint(endpoint.as_ref())?,
			timeout: Self::DEFAULT_TIMEOUT,
			format: FormatOptions::default(),
		})
	}

	/// Absolute token endpoint.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Current per-request timeout.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Replaces the per-request timeout; negative values are rejected.
	pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
		if timeout.is_negative() {
			return Err(ConfigError::NegativeTimeout { timeout }.into());
		}

		self.timeout = timeout;

		Ok(())
	}

	/// Builder-style variant of [`set_timeout`](Self::set_timeout).
	pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
		self.set_timeout(timeout)?;

		Ok(self)
	}

	/// Formatting options used when encoding request bodies.
	pub fn format(&self) -> &FormatOptions {
		&self.format
	}

	/// Overrides the formatting options.
	pub fn with_format(mut self, format: FormatOptions) -> Self {
		self.format = format;

		self
	}

	/// Performs the `client_credentials` grant.
	pub async fn request_client_credentials(
		&self,
		client_id: &str,
		client_secret: &str,
		scope: Option<&str>,
		extra: Option<ExtraFields>,
	) -> Result<TokenResponse> {
		let credentials = GrantCredentials::client_credentials(client_id, client_secret)?;

		self.send(with_optional(credentials, scope, extra)?).await
	}

	/// Performs the `password` grant for a resource owner.
	pub async fn request_password_credentials(
		&self,
		client_id: &str,
		client_secret: &str,
		username: &str,
		password: &str,
		scope: Option<&str>,
		extra: Option<ExtraFields>,
	) -> Result<TokenResponse> {
		let credentials = GrantCredentials::password(client_id, client_secret, username, password)?;

		self.send(with_optional(credentials, scope, extra)?).await
	}

	/// Performs the `refresh_token` grant.
	pub async fn request_refresh_token(
		&self,
		client_id: &str,
		client_secret: &str,
		refresh_token: &str,
		extra: Option<ExtraFields>,
	) -> Result<TokenResponse> {
		let credentials =
			GrantCredentials::refresh_token(client_id, client_secret, refresh_token)?;

		self.send(with_optional(credentials, None, extra)?).await
	}

	/// Returns the exact body [`send`](Self::send) would post for `credentials`.
	pub fn encode(&self, credentials: &GrantCredentials) -> String {
		form::encode_body(credentials, &self.format)
	}

	/// Shared request path: encode, POST once, parse the body into `T`.
	pub async fn send<T>(&self, credentials: GrantCredentials) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let grant = credentials.grant_type();
		let span = FlowSpan::grant(grant, "send");

		obs::record_flow_outcome(grant, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = FormPost {
					endpoint: self.endpoint.clone(),
					body: self.encode(&credentials),
					timeout: self.timeout.unsigned_abs(),
				};

				drop(credentials);

				let reply = {
					let handle = self.http_client.acquire();

					handle.post_form(request).await
				}
				.map_err(|err| {
					self.transport_mapper.map_transport_error(grant, self.timeout, err)
				})?;

				parse_reply(reply)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(grant, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(grant, FlowOutcome::Failure),
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl TokenClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client for `endpoint` backed by an unpooled reqwest transport.
	pub fn new(endpoint: impl AsRef<str>) -> Result<Self> {
		Self::with_http_client(
			endpoint,
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for TokenClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			endpoint: self.endpoint.clone(),
			timeout: self.timeout,
			format: self.format,
		}
	}
}
impl<C, M> Debug for TokenClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenClient")
			.field("endpoint", &self.endpoint.as_str())
			.field("timeout", &self.timeout)
			.field("format", &self.format)
			.finish()
	}
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
	if raw.trim().is_empty() {
		return Err(ConfigError::MissingEndpoint);
	}

	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint: raw.to_owned(), source })
}

fn with_optional(
	credentials: GrantCredentials,
	scope: Option<&str>,
	extra: Option<ExtraFields>,
) -> Result<GrantCredentials> {
	let credentials = match scope {
		Some(scope) => credentials.with_scope(scope),
		None => credentials,
	};

	match extra {
		Some(extra) => Ok(credentials.with_extra(extra)?),
		None => Ok(credentials),
	}
}

fn parse_reply<T>(reply: FormReply) -> Result<T>
where
	T: DeserializeOwned,
{
	let status = reply.status;
	let mut deserializer = serde_json::Deserializer::from_str(&reply.body);
	let parsed = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| SerializationError::TokenResponse { source, status })?;

	deserializer.end().map_err(|source| SerializationError::TrailingData { source, status })?;

	Ok(parsed)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn reply(status: u16, body: &str) -> FormReply {
		FormReply { status, body: body.into() }
	}

	#[test]
	fn endpoint_validation_rejects_missing_and_relative() {
		assert!(matches!(parse_endpoint(""), Err(ConfigError::MissingEndpoint)));
		assert!(matches!(parse_endpoint("   "), Err(ConfigError::MissingEndpoint)));
		assert!(matches!(parse_endpoint("/token"), Err(ConfigError::InvalidEndpoint { .. })));
		assert!(matches!(
			parse_endpoint("auth.example.com/token"),
			Err(ConfigError::InvalidEndpoint { .. })
		));

		let url = parse_endpoint("https://auth.example.com/token")
			.expect("Absolute endpoint should parse.");

		assert_eq!(url.as_str(), "https://auth.example.com/token");
	}

	#[test]
	fn parse_reply_accepts_error_bodies() {
		let response: TokenResponse = parse_reply(reply(400, r#"{"error":"invalid_client"}"#))
			.expect("Non-2xx bodies should still parse.");

		assert_eq!(response.error.as_deref(), Some("invalid_client"));
	}

	#[test]
	fn parse_reply_reports_path_and_status() {
		let err = parse_reply::<TokenResponse>(reply(200, r#"{"expires_in":"soon"}"#))
			.expect_err("Type mismatches should fail.");

		match err {
			Error::Serialization(SerializationError::TokenResponse { source, status }) => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "expires_in");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn parse_reply_rejects_non_json_and_trailing_data() {
		assert!(matches!(
			parse_reply::<TokenResponse>(reply(502, "<html>Bad Gateway</html>")),
			Err(Error::Serialization(SerializationError::TokenResponse { status: 502, .. }))
		));
		assert!(matches!(
			parse_reply::<TokenResponse>(reply(200, r#"{"access_token":"a"} x"#)),
			Err(Error::Serialization(SerializationError::TrailingData { .. }))
		));
	}
}
