//! Grant credential payloads submitted to the token endpoint.
//!
//! [`GrantCredentials`] models one token request. Constructors exist per grant type so only the
//! fields that grant defines can be populated; every optional field is an [`Option`] and the
//! form encoder iterates only the present ones.

pub mod extra;

pub use extra::*;

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Canonical field names, in the order they are written to the wire.
pub const CANONICAL_FIELDS: [&str; 7] =
	["grant_type", "client_id", "client_secret", "username", "password", "refresh_token", "scope"];

/// OAuth 2.0 token-endpoint grant types supported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Client Credentials grant for app-only tokens.
	ClientCredentials,
	/// Resource Owner Password Credentials grant.
	Password,
	/// Refresh Token grant for renewing an existing session.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::ClientCredentials => "client_credentials",
			GrantType::Password => "password",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Errors raised while assembling [`GrantCredentials`].
#[derive(Debug, ThisError)]
pub enum GrantError {
	/// A required credential field was empty.
	#[error("Grant field `{field}` cannot be empty.")]
	EmptyField {
		/// Wire name of the offending field.
		field: &'static str,
	},
	/// An extra field reused a name reserved for the canonical grant fields.
	#[error("Extra field `{field}` collides with a canonical grant field.")]
	ReservedExtraField {
		/// Name of the colliding extra field.
		field: String,
	},
	/// An extra field had an empty name.
	#[error("Extra field names cannot be empty.")]
	EmptyExtraKey,
	/// A structured extra value did not serialize into a JSON object.
	#[error("Structured extra fields must serialize into an object, got {kind}.")]
	ExtraNotObject {
		/// JSON kind the value serialized into.
		kind: &'static str,
	},
	/// A structured extra value failed to serialize.
	#[error("Structured extra fields could not be serialized.")]
	ExtraSerialize {
		/// Underlying serializer failure.
		#[source]
		source: serde_json::Error,
	},
}

/// One token request: grant type, client credentials, grant-specific fields, and extras.
#[derive(Clone, PartialEq)]
pub struct GrantCredentials {
	grant_type: GrantType,
	client_id: String,
	client_secret: String,
	username: Option<String>,
	password: Option<String>,
	refresh_token: Option<String>,
	scope: Option<String>,
	extra: Option<ExtraFields>,
}
impl GrantCredentials {
	/// Builds a `client_credentials` grant.
	pub fn client_credentials(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, GrantError> {
		Self::base(GrantType::ClientCredentials, client_id.into(), client_secret.into())
	}

	/// Builds a `password` grant for the provided resource owner.
	pub fn password(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Result<Self, GrantError> {
		let mut credentials =
			Self::base(GrantType::Password, client_id.into(), client_secret.into())?;

		credentials.username = Some(non_empty("username", username.into())?);
		credentials.password = Some(non_empty("password", password.into())?);

		Ok(credentials)
	}

	/// Builds a `refresh_token` grant.
	pub fn refresh_token(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		refresh_token: impl Into<String>,
	) -> Result<Self, GrantError> {
		let mut credentials =
			Self::base(GrantType::RefreshToken, client_id.into(), client_secret.into())?;

		credentials.refresh_token = Some(non_empty("refresh_token", refresh_token.into())?);

		Ok(credentials)
	}

	fn base(
		grant_type: GrantType,
		client_id: String,
		client_secret: String,
	) -> Result<Self, GrantError> {
		Ok(Self {
			grant_type,
			client_id: non_empty("client_id", client_id)?,
			client_secret: non_empty("client_secret", client_secret)?,
			username: None,
			password: None,
			refresh_token: None,
			scope: None,
			extra: None,
		})
	}

	/// Sets the requested scope string (sent verbatim).
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Attaches extra fields, rejecting names reserved for the canonical grant fields.
	pub fn with_extra(mut self, extra: ExtraFields) -> Result<Self, GrantError> {
		// Null record properties are never sent, so only encoded names are checked.
		for (key, _) in extra.encoded_pairs() {
			if key.is_empty() {
				return Err(GrantError::EmptyExtraKey);
			}
			if CANONICAL_FIELDS.iter().any(|field| *field == key) {
				return Err(GrantError::ReservedExtraField { field: key.to_owned() });
			}
		}

		self.extra = Some(extra);

		Ok(self)
	}

	/// Grant type of this request.
	pub fn grant_type(&self) -> GrantType {
		self.grant_type
	}

	/// Client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Resource owner username (password grant only).
	pub fn username(&self) -> Option<&str> {
		self.username.as_deref()
	}

	/// Requested scope, if any.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Extra fields, if any.
	pub fn extra(&self) -> Option<&ExtraFields> {
		self.extra.as_ref()
	}

	/// Returns the populated fields as ordered `(name, value)` pairs.
	///
	/// Canonical fields come first in [`CANONICAL_FIELDS`] order, skipping absent ones; extra
	/// fields follow in their own order.
	pub fn pairs(&self) -> Vec<(&str, Cow<'_, str>)> {
		let canonical = [
			Some(self.grant_type.as_str()),
			Some(self.client_id.as_str()),
			Some(self.client_secret.as_str()),
			self.username.as_deref(),
			self.password.as_deref(),
			self.refresh_token.as_deref(),
			self.scope.as_deref(),
		];
		let mut pairs = CANONICAL_FIELDS
			.iter()
			.zip(canonical)
			.filter_map(|(name, value)| value.map(|value| (*name, Cow::Borrowed(value))))
			.collect::<Vec<_>>();

		if let Some(extra) = &self.extra {
			pairs.extend(extra.encoded_pairs());
		}

		pairs
	}
}
impl Debug for GrantCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GrantCredentials")
			.field("grant_type", &self.grant_type)
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("username", &self.username)
			.field("password", &self.password.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.field("extra", &self.extra)
			.finish()
	}
}

fn non_empty(field: &'static str, value: String) -> Result<String, GrantError> {
	if value.is_empty() { Err(GrantError::EmptyField { field }) } else { Ok(value) }
}
