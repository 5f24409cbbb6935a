//! Storage contract consumed by the cache pipeline.
//!
//! The crate ships no backend; in-memory, distributed, or HTTP caches implement
//! [`CacheStore`] and receive the expiration chosen by the policy as metadata.

// self
use crate::{_prelude::*, cache::CacheKey};

/// Boxed future returned by [`CacheStore`] operations.
pub type CacheStoreFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for cached call results.
pub trait CacheStore
where
	Self: Send + Sync,
{
	/// Fetches the payload stored under `key`, if present and still valid.
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheStoreFuture<'a, Option<Vec<u8>>>;

	/// Stores `value` under `key`; `expiration` is the policy's time-to-live, if any.
	fn put<'a>(
		&'a self,
		key: &'a CacheKey,
		value: Vec<u8>,
		expiration: Option<Duration>,
	) -> CacheStoreFuture<'a, ()>;
}

/// Error type produced by [`CacheStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
