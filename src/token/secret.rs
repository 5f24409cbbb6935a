//! Access and refresh token values that never print themselves.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Token string issued by the endpoint.
///
/// Serializes as the plain string so responses round-trip through caches, but `Debug` and
/// `Display` only ever print `<redacted>`. Use [`expose`](Self::expose) at the point where the
/// value is attached to an outgoing request.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a token string.
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}

	/// Raw token string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Consumes the wrapper, returning the raw token string.
	pub fn into_inner(self) -> String {
		self.0
	}

	/// Returns `true` when the endpoint sent no value.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<String> for TokenSecret {
	fn from(token: String) -> Self {
		Self(token)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret({REDACTED})")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}
