//! Token endpoint response model.

pub mod secret;

pub use secret::*;

// crates.io
use serde::Deserializer;
// self
use crate::_prelude::*;

/// Parsed token endpoint body.
///
/// Parsing is forgiving about shape: unknown fields are ignored and missing fields take their
/// zero value, so a failure body (`{"error":"invalid_grant"}`) parses into the same type with
/// an empty access token. An explicit `null` counts as missing. A field that is present with
/// the wrong JSON type still fails.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
	/// Issued access token.
	#[serde(deserialize_with = "null_as_default")]
	pub access_token: TokenSecret,
	/// Token type, usually `bearer`.
	#[serde(deserialize_with = "null_as_default")]
	pub token_type: String,
	/// Lifetime in seconds; `0` when the endpoint omitted it.
	#[serde(deserialize_with = "null_as_default")]
	pub expires_in: u64,
	/// Refresh token, if one was issued.
	pub refresh_token: Option<TokenSecret>,
	/// Space-delimited granted scope, if reported.
	pub scope: Option<String>,
	/// RFC 6749 `error` code for failure bodies.
	pub error: Option<String>,
	/// Human-readable error description.
	pub error_description: Option<String>,
	/// Link to an error documentation page.
	pub error_uri: Option<String>,
}
impl TokenResponse {
	/// Returns `true` when the body carries an OAuth error code.
	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}

	/// Lifetime as a [`Duration`], or `None` when absent or out of range.
	pub fn expires_in(&self) -> Option<Duration> {
		if self.expires_in == 0 {
			return None;
		}

		i64::try_from(self.expires_in).ok().map(Duration::seconds)
	}

	/// Absolute expiry relative to the instant the response was received.
	pub fn expires_at(&self, issued_at: OffsetDateTime) -> Option<OffsetDateTime> {
		self.expires_in().and_then(|lifetime| issued_at.checked_add(lifetime))
	}

	/// Iterator over the granted scopes.
	pub fn scopes(&self) -> impl Iterator<Item = &str> {
		self.scope.as_deref().unwrap_or_default().split_whitespace()
	}

	/// One-line summary of an error body, e.g. `invalid_grant: code expired`.
	pub fn error_summary(&self) -> Option<String> {
		let error = self.error.as_deref()?;

		Some(match self.error_description.as_deref() {
			Some(description) => format!("{error}: {description}"),
			None => error.to_owned(),
		})
	}
}
impl Debug for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponse")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.field("error", &self.error)
			.field("error_description", &self.error_description)
			.finish()
	}
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
