//! Request-fingerprint key derivation.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	cache::{CacheKey, CacheKeyFuture, CallContext, KeyDerivation, PolicyError},
};

/// Derives keys from a digest over the call site, endpoint, and selected request parts.
///
/// By default every argument participates and no metadata or body does. Keys have the form
/// `{call_site}:{digest}` where the digest is the URL-safe SHA-256 of a canonical JSON
/// document, so equal contexts always map to equal keys regardless of map ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestFingerprint {
	arguments: Option<Vec<String>>,
	metadata: Vec<String>,
	include_body: bool,
}
impl RequestFingerprint {
	/// Fingerprint over the call site, endpoint, and all arguments.
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts the fingerprint to the named arguments; each one becomes required.
	pub fn arguments<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.arguments = Some(names.into_iter().map(Into::into).collect());

		self
	}

	/// Adds metadata entries (matched case-insensitively) to the fingerprint.
	pub fn metadata<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.metadata.extend(names.into_iter().map(|name| name.as_ref().to_ascii_lowercase()));
		self.metadata.sort();
		self.metadata.dedup();

		self
	}

	/// Includes a digest of the request body.
	pub fn with_body(mut self) -> Self {
		self.include_body = true;

		self
	}

	/// Computes the key for `context`.
	pub fn fingerprint(&self, context: &CallContext) -> Result<CacheKey, PolicyError> {
		let mut document = Map::new();

		document.insert("call_site".into(), Value::from(context.call_site.to_string()));
		document.insert("endpoint".into(), Value::from(context.endpoint.as_str()));
		document.insert("arguments".into(), Value::Object(self.selected_arguments(context)?));

		if !self.metadata.is_empty() {
			let metadata = self
				.metadata
				.iter()
				.map(|name| {
					(name.clone(), context.meta(name).map(Value::from).unwrap_or(Value::Null))
				})
				.collect();

			document.insert("metadata".into(), Value::Object(metadata));
		}
		if self.include_body {
			let body = context.body.as_deref().map(|body| Value::from(digest(body)));

			document.insert("body".into(), body.unwrap_or(Value::Null));
		}

		let mut canonical = String::new();

		write_canonical(&Value::Object(document), &mut canonical);

		Ok(CacheKey::new(format!("{}:{}", context.call_site, digest(canonical.as_bytes()))))
	}

	fn selected_arguments(&self, context: &CallContext) -> Result<Map<String, Value>, PolicyError> {
		let Some(names) = &self.arguments else {
			return Ok(context.arguments.iter().cloned().collect());
		};

		names
			.iter()
			.map(|name| match context.argument(name) {
				Some(value) => Ok((name.clone(), value.clone())),
				None => Err(PolicyError::MissingArgument {
					call_site: context.call_site.to_string(),
					argument: name.clone(),
				}),
			})
			.collect()
	}
}
impl KeyDerivation for RequestFingerprint {
	fn derive_key<'a>(&'a self, context: &'a CallContext) -> CacheKeyFuture<'a> {
		Box::pin(async move { self.fingerprint(context) })
	}
}

fn digest(bytes: &[u8]) -> String {
	URL_SAFE_NO_PAD.encode(Sha256::digest(bytes))
}

// Object keys are emitted sorted at every depth; `serde_json::Map` ordering depends on
// whether `preserve_order` is enabled somewhere in the dependency graph.
fn write_canonical(value: &Value, out: &mut String) {
	match value {
		Value::Object(map) => {
			let mut entries = map.iter().collect::<Vec<_>>();

			entries.sort_by(|(a, _), (b, _)| a.cmp(b));
			out.push('{');

			for (i, (key, value)) in entries.into_iter().enumerate() {
				if i > 0 {
					out.push(',');
				}

				out.push_str(&Value::from(key.as_str()).to_string());
				out.push(':');
				write_canonical(value, out);
			}

			out.push('}');
		},
		Value::Array(items) => {
			out.push('[');

			for (i, item) in items.iter().enumerate() {
				if i > 0 {
					out.push(',');
				}

				write_canonical(item, out);
			}

			out.push(']');
		},
		scalar => out.push_str(&scalar.to_string()),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::cache::CallSiteId;

	fn context() -> CallContext {
		CallContext::new(
			CallSiteId::new("users.get").expect("Call site fixture should be valid."),
			"GET /users/{id}",
		)
		.with_argument("id", 7)
		.with_argument("filter", json!({ "b": 1, "a": [true, null] }))
		.with_metadata("Accept-Language", "de")
	}

	#[test]
	fn equal_contexts_give_equal_keys() {
		let fingerprint = RequestFingerprint::new().metadata(["accept-language"]).with_body();
		let first = fingerprint.fingerprint(&context()).expect("Fingerprint should derive.");
		let second = fingerprint.fingerprint(&context()).expect("Fingerprint should derive.");

		assert_eq!(first, second);
		assert!(first.as_str().starts_with("users.get:"));
	}

	#[test]
	fn nested_key_order_does_not_matter() {
		let reordered = CallContext::new(
			CallSiteId::new("users.get").expect("Call site fixture should be valid."),
			"GET /users/{id}",
		)
		.with_argument("id", 7)
		.with_argument("filter", json!({ "a": [true, null], "b": 1 }))
		.with_metadata("accept-language", "de");
		let fingerprint = RequestFingerprint::new();

		assert_eq!(fingerprint.fingerprint(&context()).ok(), fingerprint.fingerprint(&reordered).ok());
	}

	#[test]
	fn differing_inputs_give_different_keys() {
		let all = RequestFingerprint::new();
		let base = all.fingerprint(&context()).expect("Fingerprint should derive.");
		let other_id =
			all.fingerprint(&context().with_argument("id", 8)).expect("Fingerprint should derive.");

		assert_ne!(base, other_id);

		let mut other_endpoint = context();

		other_endpoint.endpoint = "GET /admins/{id}".into();

		assert_ne!(base, all.fingerprint(&other_endpoint).expect("Fingerprint should derive."));

		let by_language = RequestFingerprint::new().metadata(["Accept-Language"]);

		assert_ne!(
			by_language.fingerprint(&context()).expect("Fingerprint should derive."),
			by_language
				.fingerprint(&context().with_metadata("accept-language", "fr"))
				.expect("Fingerprint should derive.")
		);

		let with_body = RequestFingerprint::new().with_body();

		assert_ne!(
			with_body.fingerprint(&context().with_body("a")).expect("Fingerprint should derive."),
			with_body.fingerprint(&context().with_body("b")).expect("Fingerprint should derive.")
		);
	}

	#[test]
	fn unselected_parts_are_ignored() {
		let by_id = RequestFingerprint::new().arguments(["id"]);

		assert_eq!(
			by_id.fingerprint(&context()).expect("Fingerprint should derive."),
			by_id
				.fingerprint(&context().with_argument("filter", 0).with_metadata("accept-language", "fr"))
				.expect("Fingerprint should derive.")
		);
	}

	#[test]
	fn selected_argument_must_exist() {
		let err = RequestFingerprint::new()
			.arguments(["tenant"])
			.fingerprint(&context())
			.expect_err("Missing argument should fail.");

		assert!(matches!(err, PolicyError::MissingArgument { argument, .. } if argument == "tenant"));
	}

	#[test]
	fn canonical_json_sorts_keys() {
		let mut out = String::new();

		write_canonical(&json!({ "z": 1, "a": { "d": "x", "c": [2, 1] } }), &mut out);

		assert_eq!(out, r#"{"a":{"c":[2,1],"d":"x"},"z":1}"#);
	}
}
