//! Transport primitives for token requests.
//!
//! The module exposes [`TokenHttpClient`] and [`TokenHttpHandle`] so downstream crates can
//! plug in any HTTP stack. The client acquires one handle per token request and drops it as
//! soon as the round trip finishes, on success and failure alike, so transports that tie
//! resources to a handle get deterministic release. [`TransportErrorMapper`] turns the
//! transport's own error type into the crate [`Error`] taxonomy.

// std
use std::time::Duration as StdDuration;
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	header::{ACCEPT, CONTENT_TYPE},
	redirect::Policy as RedirectPolicy,
};
// self
use crate::{_prelude::*, grant::GrantType};
#[cfg(feature = "reqwest")]
use crate::{
	error::{ConfigError, TransportError},
	form::FORM_CONTENT_TYPE,
};

/// Boxed future returned by [`TokenHttpHandle::post_form`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<FormReply, E>> + 'a + Send>>;

/// One form POST issued against the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormPost {
	/// Absolute token endpoint.
	pub endpoint: Url,
	/// Encoded `application/x-www-form-urlencoded` body.
	pub body: String,
	/// Upper bound for the whole round trip.
	pub timeout: StdDuration,
}

/// Status and body text returned by the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormReply {
	/// HTTP status code.
	pub status: u16,
	/// Response body decoded as text.
	pub body: String,
}

/// Abstraction over HTTP transports capable of executing token requests.
///
/// Implementations must be `Send + Sync + 'static` so a single client can serve concurrent
/// token calls. Per-request state belongs in the [`Handle`](TokenHttpClient::Handle) returned
/// by [`acquire`](TokenHttpClient::acquire), never in the client itself.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Request-scoped handle; dropped once its request completes.
	type Handle: TokenHttpHandle<TransportError = Self::TransportError>;

	/// Acquires a fresh handle for exactly one request.
	fn acquire(&self) -> Self::Handle;
}

/// Request-scoped transport handle.
pub trait TokenHttpHandle
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends the form body and resolves with the status and body text.
	///
	/// Implementations must abort and fail once [`FormPost::timeout`] elapses.
	fn post_form(&self, request: FormPost) -> TransportFuture<'_, Self::TransportError>;
}

/// Maps transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an error emitted by the transport into a crate error.
	///
	/// `timeout` is the bound that was in effect so timeouts can be reported faithfully.
	fn map_transport_error(&self, grant: GrantType, timeout: Duration, error: E) -> Error;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestHttpClient::new`] disables redirects (token endpoints answer directly) and idle
/// connection pooling, so no connection outlives the request that opened it. Callers who want
/// pooling can pass their own client to [`ReqwestHttpClient::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client without redirects or idle connection reuse.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(RedirectPolicy::none())
			.pool_max_idle_per_host(0)
			.build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn acquire(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Request-scoped handle returned by [`ReqwestHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl TokenHttpHandle for ReqwestHandle {
	type TransportError = ReqwestError;

	fn post_form(&self, request: FormPost) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let response = self
				.0
				.post(request.endpoint)
				.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
				.header(ACCEPT, "application/json")
				.timeout(request.timeout)
				.body(request.body)
				.send()
				.await?;
			let status = response.status().as_u16();
			let body = response.text().await?;

			Ok(FormReply { status, body })
		})
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, _grant: GrantType, timeout: Duration, err: ReqwestError) -> Error {
		if err.is_builder() {
			return ConfigError::from(err).into();
		}
		if err.is_timeout() {
			return TransportError::Timeout { timeout }.into();
		}

		TransportError::network(err).into()
	}
}
