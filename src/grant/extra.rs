//! Open-ended extra fields merged into a grant request.

// std
use std::borrow::Cow;
// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, grant::GrantError};

/// Additional token-endpoint fields (audience, resource, etc.).
///
/// `Pairs` keeps caller order, so build it from an ordered collection (a `Vec` or a
/// `BTreeMap`) when the encoded body must be reproducible. `Record` holds any serializable
/// struct flattened into its top-level properties, iterated in `serde_json::Map` key order.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtraFields {
	/// Ordered key/value pairs.
	Pairs(Vec<(String, String)>),
	/// Top-level properties of a structured record.
	Record(Map<String, Value>),
}
impl ExtraFields {
	/// Flattens a serializable record into its top-level properties.
	pub fn record<T>(value: &T) -> Result<Self, GrantError>
	where
		T: ?Sized + Serialize,
	{
		match serde_json::to_value(value).map_err(|source| GrantError::ExtraSerialize { source })? {
			Value::Object(map) => Ok(Self::Record(map)),
			other => Err(GrantError::ExtraNotObject { kind: json_kind(&other) }),
		}
	}

	/// Field names in encoding order, including record properties that are `null`.
	pub fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
		match self {
			Self::Pairs(pairs) => Box::new(pairs.iter().map(|(key, _)| key.as_str())),
			Self::Record(map) => Box::new(map.keys().map(String::as_str)),
		}
	}

	/// Returns `true` when no field would be encoded.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Pairs(pairs) => pairs.is_empty(),
			Self::Record(map) => map.values().all(Value::is_null),
		}
	}

	/// Pairs that reach the wire; `null` record properties are omitted.
	pub(crate) fn encoded_pairs(&self) -> Vec<(&str, Cow<'_, str>)> {
		match self {
			Self::Pairs(pairs) =>
				pairs.iter().map(|(key, value)| (key.as_str(), Cow::Borrowed(value.as_str()))).collect(),
			Self::Record(map) => map
				.iter()
				.filter_map(|(key, value)| property_text(value).map(|text| (key.as_str(), text)))
				.collect(),
		}
	}
}
impl<K, V> FromIterator<(K, V)> for ExtraFields
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self::Pairs(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

fn property_text(value: &Value) -> Option<Cow<'_, str>> {
	match value {
		Value::Null => None,
		Value::String(text) => Some(Cow::Borrowed(text)),
		Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
		Value::Number(number) => Some(Cow::Owned(number.to_string())),
		Value::Array(_) | Value::Object(_) => Some(Cow::Owned(value.to_string())),
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
