//! `application/x-www-form-urlencoded` encoding for grant credentials.

// crates.io
use url::form_urlencoded::Serializer as FormSerializer;
// self
use crate::{_prelude::*, grant::GrantCredentials};

/// MIME type written to the `Content-Type` header of every token request.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// How spaces inside values are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceEncoding {
	#[default]
	/// `+`, as defined by the WHATWG form encoding.
	Plus,
	/// `%20`, for endpoints that do not decode `+`.
	Percent,
}

/// Formatting options applied when serializing grant credentials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
	/// Space representation used in the encoded body.
	pub space_encoding: SpaceEncoding,
}

/// Encodes the populated credential fields into a single form body.
pub fn encode_body(credentials: &GrantCredentials, options: &FormatOptions) -> String {
	encode_pairs(credentials.pairs(), options)
}

/// Encodes ordered pairs as `key=value` joined by `&`.
pub fn encode_pairs<I, K, V>(pairs: I, options: &FormatOptions) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let mut serializer = FormSerializer::new(String::new());

	for (key, value) in pairs {
		serializer.append_pair(key.as_ref(), value.as_ref());
	}

	let body = serializer.finish();

	match options.space_encoding {
		SpaceEncoding::Plus => body,
		// A literal `+` is always written as `%2B`, so every remaining `+` is a space.
		SpaceEncoding::Percent => body.replace('+', "%20"),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use url::form_urlencoded;
	// self
	use super::*;
	use crate::grant::ExtraFields;

	fn decode(body: &str) -> Vec<(String, String)> {
		form_urlencoded::parse(body.as_bytes()).into_owned().collect()
	}

	#[test]
	fn client_credentials_body_matches_wire_format() {
		let credentials = GrantCredentials::client_credentials("abc", "xyz")
			.expect("Client credentials fixture should be valid.")
			.with_scope("read");

		assert_eq!(
			encode_body(&credentials, &FormatOptions::default()),
			"grant_type=client_credentials&client_id=abc&client_secret=xyz&scope=read"
		);
	}

	#[test]
	fn encoding_is_deterministic_and_decodes_back() {
		let credentials = GrantCredentials::password("app id", "s&cr=t", "al+ice", "pä ss")
			.expect("Password fixture should be valid.")
			.with_scope("read write")
			.with_extra(ExtraFields::from_iter([("audience", "https://api.example.com/v1?x=1")]))
			.expect("Extras fixture should be accepted.");
		let options = FormatOptions::default();
		let first = encode_body(&credentials, &options);
		let second = encode_body(&credentials, &options);
		let expected = credentials
			.pairs()
			.into_iter()
			.map(|(key, value)| (key.to_owned(), value.into_owned()))
			.collect::<Vec<_>>();

		assert_eq!(first, second);
		assert_eq!(decode(&first), expected);
	}

	#[test]
	fn percent_space_encoding_keeps_literal_plus() {
		let options = FormatOptions { space_encoding: SpaceEncoding::Percent };
		let body = encode_pairs([("scope", "read write"), ("tag", "a+b")], &options);

		assert_eq!(body, "scope=read%20write&tag=a%2Bb");
		assert_eq!(
			decode(&body),
			vec![
				("scope".to_owned(), "read write".to_owned()),
				("tag".to_owned(), "a+b".to_owned())
			]
		);
	}

	#[test]
	fn refresh_body_never_carries_owner_credentials() {
		let credentials = GrantCredentials::refresh_token("abc", "xyz", "r-1")
			.expect("Refresh fixture should be valid.");
		let keys = decode(&encode_body(&credentials, &FormatOptions::default()))
			.into_iter()
			.map(|(key, _)| key)
			.collect::<Vec<_>>();

		assert_eq!(keys, ["grant_type", "client_id", "client_secret", "refresh_token"]);
	}
}
