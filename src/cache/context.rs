//! Call-site identifiers and the per-call context handed to cache policies.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use serde_json::Value;
// self
use crate::_prelude::*;

const CALL_SITE_MAX_LEN: usize = 128;

/// Error returned when call-site validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum CallSiteError {
	/// The identifier was empty.
	#[error("Call site identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Call site identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Call site identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Stable name of a declared API call (for example `users.get_profile`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallSiteId(String);
impl CallSiteId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, CallSiteError> {
		let view = value.as_ref();

		validate(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for CallSiteId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CallSiteId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CallSiteId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CallSiteId> for String {
	fn from(value: CallSiteId) -> Self {
		value.0
	}
}
impl TryFrom<String> for CallSiteId {
	type Error = CallSiteError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for CallSiteId {
	type Err = CallSiteError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CallSiteId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CallSite({})", self.0)
	}
}
impl Display for CallSiteId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Metadata describing one intercepted call.
///
/// Arguments keep declaration order. Metadata names are stored lowercased so header-style
/// lookups are case-insensitive.
#[derive(Clone, Debug, PartialEq)]
pub struct CallContext {
	/// Call site the policy is attached to.
	pub call_site: CallSiteId,
	/// Endpoint identity, e.g. `GET /users/{id}` or a resolved URL.
	pub endpoint: String,
	/// Argument values in declaration order.
	pub arguments: Vec<(String, Value)>,
	/// Headers or other per-call metadata.
	pub metadata: BTreeMap<String, String>,
	/// Request body, when the call sends one.
	pub body: Option<Vec<u8>>,
}
impl CallContext {
	/// Creates a context without arguments, metadata, or body.
	pub fn new(call_site: CallSiteId, endpoint: impl Into<String>) -> Self {
		Self {
			call_site,
			endpoint: endpoint.into(),
			arguments: Vec::new(),
			metadata: BTreeMap::new(),
			body: None,
		}
	}

	/// Adds an argument, replacing any earlier value with the same name in place.
	pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		let name = name.into();
		let value = value.into();

		match self.arguments.iter_mut().find(|(existing, _)| *existing == name) {
			Some((_, slot)) => *slot = value,
			None => self.arguments.push((name, value)),
		}

		self
	}

	/// Adds a metadata entry; the name is lowercased.
	pub fn with_metadata(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.metadata.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Attaches the request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Looks up an argument by name.
	pub fn argument(&self, name: &str) -> Option<&Value> {
		self.arguments.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
	}

	/// Looks up a metadata entry, ignoring ASCII case.
	pub fn meta(&self, name: &str) -> Option<&str> {
		self.metadata.get(&name.to_ascii_lowercase()).map(String::as_str)
	}
}

fn validate(view: &str) -> Result<(), CallSiteError> {
	if view.is_empty() {
		return Err(CallSiteError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(CallSiteError::ContainsWhitespace);
	}
	if view.chars().count() > CALL_SITE_MAX_LEN {
		return Err(CallSiteError::TooLong { max: CALL_SITE_MAX_LEN });
	}

	Ok(())
}
