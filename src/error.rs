//! Crate-level error types shared by the token client and the cache pipeline.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Grant credentials could not be assembled.
	#[error(transparent)]
	Grant(#[from] crate::grant::GrantError),
	/// Transport failure (timeout, DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Payload could not be parsed or produced.
	#[error(transparent)]
	Serialization(#[from] SerializationError),
	/// Cache policy failed to derive a key.
	#[error("{0}")]
	Policy(
		#[from]
		#[source]
		crate::cache::PolicyError,
	),
	/// Cache backend failure.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::cache::StoreError,
	),
}
impl Error {
	/// Returns `true` when the failure is a transport timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Transport(TransportError::Timeout { .. }))
	}
}

/// Configuration and validation failures raised at construction or assignment time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Token endpoint was not supplied.
	#[error("Token endpoint is missing.")]
	MissingEndpoint,
	/// Token endpoint is relative or otherwise unparseable.
	#[error("Token endpoint `{endpoint}` is not an absolute URI.")]
	InvalidEndpoint {
		/// Endpoint string as supplied by the caller.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Timeout assignment was negative.
	#[error("Timeout must not be negative, got {timeout}.")]
	NegativeTimeout {
		/// Rejected timeout value.
		timeout: Duration,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (timeout, network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The round trip exceeded the configured timeout.
	#[error("Token endpoint did not respond within {timeout}.")]
	Timeout {
		/// Timeout that was in effect for the request.
		timeout: Duration,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// Payload encoding/decoding failures.
#[derive(Debug, ThisError)]
pub enum SerializationError {
	/// Token endpoint body could not be parsed into the requested shape.
	#[error("Token endpoint returned a body that does not match the expected JSON shape (HTTP {status}).")]
	TokenResponse {
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Token endpoint body carried trailing data after the JSON document.
	#[error("Token endpoint returned trailing data after the JSON body (HTTP {status}).")]
	TrailingData {
		/// Underlying parser failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Cached payload could not be encoded or decoded.
	#[error("Cached payload for key `{key}` could not be processed.")]
	CachedPayload {
		/// Cache key the payload belongs to.
		key: String,
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
}
