//! Cache policy contract and the expiring composition helper.

// std
use std::future;
// self
use crate::{
	_prelude::*,
	cache::{CallContext, PolicyError},
};

/// Boxed future returned by key derivation.
pub type CacheKeyFuture<'a> = Pin<Box<dyn Future<Output = Result<CacheKey, PolicyError>> + 'a + Send>>;

/// Whether a call may use the cache in one direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheDecision {
	#[default]
	/// The cache participates.
	Include,
	/// The cache is bypassed.
	Exclude,
}
impl CacheDecision {
	/// Returns `true` for [`CacheDecision::Include`].
	pub const fn is_include(self) -> bool {
		matches!(self, CacheDecision::Include)
	}
}
impl From<bool> for CacheDecision {
	fn from(include: bool) -> Self {
		if include { Self::Include } else { Self::Exclude }
	}
}

/// Opaque cache key; the crate only relies on its stability.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);
impl CacheKey {
	/// Wraps a key string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the key string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for CacheKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<String> for CacheKey {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for CacheKey {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CacheKey").field(&self.0).finish()
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Capability consulted by a call pipeline around every intercepted call.
///
/// The pipeline evaluates [`read_policy`](Self::read_policy) before the call and
/// [`write_policy`](Self::write_policy) after it; both decisions are independent. Key
/// derivation may be asynchronous but must be deterministic for equal contexts. Failures are
/// returned to the pipeline, which decides whether to bypass the cache.
pub trait CachePolicy
where
	Self: Send + Sync,
{
	/// Decides whether a cached value may be served for this call.
	fn read_policy(&self, context: &CallContext) -> CacheDecision;

	/// Decides whether the call's result may be stored.
	fn write_policy(&self, context: &CallContext) -> CacheDecision;

	/// Derives the cache key for this call.
	fn cache_key<'a>(&'a self, context: &'a CallContext) -> CacheKeyFuture<'a>;

	/// Time-to-live handed to the store alongside written values.
	fn expiration(&self) -> Option<Duration> {
		None
	}
}

/// The one rule a concrete policy has to supply: how a context maps to a key.
pub trait KeyDerivation
where
	Self: Send + Sync,
{
	/// Derives the cache key for this call.
	fn derive_key<'a>(&'a self, context: &'a CallContext) -> CacheKeyFuture<'a>;
}

/// Synchronous closure adapter created by [`key_fn`].
#[derive(Clone)]
pub struct KeyFn<F>(F);
impl<F> KeyDerivation for KeyFn<F>
where
	F: Send + Sync + Fn(&CallContext) -> Result<CacheKey, PolicyError>,
{
	fn derive_key<'a>(&'a self, context: &'a CallContext) -> CacheKeyFuture<'a> {
		Box::pin(future::ready((self.0)(context)))
	}
}
impl<F> Debug for KeyFn<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("KeyFn(..)")
	}
}

/// Turns a synchronous closure into a [`KeyDerivation`].
pub fn key_fn<F>(derive: F) -> KeyFn<F>
where
	F: Send + Sync + Fn(&CallContext) -> Result<CacheKey, PolicyError>,
{
	KeyFn(derive)
}

/// Policy with a fixed expiration and Include/Include defaults; keys come from `K`.
///
/// The expiration is fixed for the lifetime of the value; negative durations are clamped to
/// zero. [`with_read`](Self::with_read) and [`with_write`](Self::with_write) override the
/// defaults statically; policies whose decisions depend on the context implement
/// [`CachePolicy`] directly.
#[derive(Clone, Debug)]
pub struct ExpiringPolicy<K> {
	expiration: Duration,
	read: CacheDecision,
	write: CacheDecision,
	keys: K,
}
impl<K> ExpiringPolicy<K>
where
	K: KeyDerivation,
{
	/// Creates a policy that reads and writes under keys derived by `keys`.
	pub fn new(expiration: Duration, keys: K) -> Self {
		Self {
			expiration: if expiration.is_negative() { Duration::ZERO } else { expiration },
			read: CacheDecision::Include,
			write: CacheDecision::Include,
			keys,
		}
	}

	/// Overrides the read decision.
	pub fn with_read(mut self, decision: CacheDecision) -> Self {
		self.read = decision;

		self
	}

	/// Overrides the write decision.
	pub fn with_write(mut self, decision: CacheDecision) -> Self {
		self.write = decision;

		self
	}

	/// Key derivation rule.
	pub fn keys(&self) -> &K {
		&self.keys
	}
}
impl<K> CachePolicy for ExpiringPolicy<K>
where
	K: KeyDerivation,
{
	fn read_policy(&self, _context: &CallContext) -> CacheDecision {
		self.read
	}

	fn write_policy(&self, _context: &CallContext) -> CacheDecision {
		self.write
	}

	fn cache_key<'a>(&'a self, context: &'a CallContext) -> CacheKeyFuture<'a> {
		self.keys.derive_key(context)
	}

	fn expiration(&self) -> Option<Duration> {
		Some(self.expiration)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::cache::CallSiteId;

	fn context(id: i64) -> CallContext {
		CallContext::new(
			CallSiteId::new("users.get").expect("Call site fixture should be valid."),
			"GET /users/{id}",
		)
		.with_argument("id", id)
	}

	fn by_id() -> KeyFn<impl Send + Sync + Fn(&CallContext) -> Result<CacheKey, PolicyError>> {
		key_fn(|context: &CallContext| {
			let id = context.argument("id").ok_or_else(|| PolicyError::MissingArgument {
				call_site: context.call_site.to_string(),
				argument: "id".into(),
			})?;

			Ok(CacheKey::new(format!("user:{id}")))
		})
	}

	#[test]
	fn defaults_include_both_directions() {
		let policy = ExpiringPolicy::new(Duration::minutes(5), by_id());

		for id in [1, 2, 3] {
			assert_eq!(policy.read_policy(&context(id)), CacheDecision::Include);
			assert_eq!(policy.write_policy(&context(id)), CacheDecision::Include);
		}

		assert_eq!(policy.expiration(), Some(Duration::minutes(5)));
	}

	#[test]
	fn overrides_are_independent() {
		let warm_only = ExpiringPolicy::new(Duration::minutes(1), by_id())
			.with_read(CacheDecision::Exclude);

		assert_eq!(warm_only.read_policy(&context(1)), CacheDecision::Exclude);
		assert_eq!(warm_only.write_policy(&context(1)), CacheDecision::Include);

		let read_only = ExpiringPolicy::new(Duration::minutes(1), by_id())
			.with_write(CacheDecision::Exclude);

		assert_eq!(read_only.read_policy(&context(1)), CacheDecision::Include);
		assert_eq!(read_only.write_policy(&context(1)), CacheDecision::Exclude);
	}

	#[test]
	fn negative_expiration_clamps_to_zero() {
		let policy = ExpiringPolicy::new(Duration::seconds(-5), by_id());

		assert_eq!(policy.expiration(), Some(Duration::ZERO));
	}

	#[tokio::test]
	async fn closure_keys_are_deterministic() {
		let policy = ExpiringPolicy::new(Duration::minutes(5), by_id());
		let first = policy.cache_key(&context(7)).await.expect("Key should derive.");
		let second = policy.cache_key(&context(7)).await.expect("Key should derive.");
		let other = policy.cache_key(&context(8)).await.expect("Key should derive.");

		assert_eq!(first, second);
		assert_ne!(first, other);
		assert_eq!(first.as_str(), "user:7");
	}

	#[tokio::test]
	async fn derivation_failures_propagate() {
		let policy = ExpiringPolicy::new(Duration::minutes(5), by_id());
		let bare = CallContext::new(
			CallSiteId::new("users.get").expect("Call site fixture should be valid."),
			"GET /users/{id}",
		);
		let err = policy.cache_key(&bare).await.expect_err("Missing argument should fail.");

		assert!(matches!(err, PolicyError::MissingArgument { argument, .. } if argument == "id"));
	}

	#[test]
	fn decision_from_bool() {
		assert_eq!(CacheDecision::from(true), CacheDecision::Include);
		assert!(!CacheDecision::from(false).is_include());
	}
}
