//! Read-through/write-through execution around an API call.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	cache::{CacheKey, CachePolicyRegistry, CacheStore, CallContext},
	error::SerializationError,
	obs::{self, CacheOutcome, FlowSpan},
};

/// Consults the registry around each call and reads from or writes to a [`CacheStore`].
///
/// Values are stored as JSON. Key derivation and store failures are returned to the caller;
/// they are never silently turned into cache misses.
#[derive(Clone)]
pub struct CachePipeline {
	registry: CachePolicyRegistry,
	store: Arc<dyn CacheStore>,
}
impl CachePipeline {
	/// Creates a pipeline over `registry` and `store`.
	pub fn new(registry: CachePolicyRegistry, store: Arc<dyn CacheStore>) -> Self {
		Self { registry, store }
	}

	/// Registry consulted by this pipeline.
	pub fn registry(&self) -> &CachePolicyRegistry {
		&self.registry
	}

	/// Runs `call` for `context`, serving from and populating the cache per the attached policy.
	///
	/// Call sites without a policy run `call` directly. A cached value is returned without
	/// running `call`; otherwise the result of `call` is written back when the write policy
	/// allows it. Errors returned by `call` are never cached.
	pub async fn execute<T, E, F, Fut>(&self, context: &CallContext, call: F) -> Result<T, E>
	where
		T: Serialize + DeserializeOwned,
		E: From<Error>,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		let span = FlowSpan::cache(&context.call_site);

		span.instrument(self.execute_inner(context, call)).await
	}

	async fn execute_inner<T, E, F, Fut>(&self, context: &CallContext, call: F) -> Result<T, E>
	where
		T: Serialize + DeserializeOwned,
		E: From<Error>,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		let Some(policy) = self.registry.lookup(&context.call_site) else {
			obs::record_cache_outcome(CacheOutcome::Unregistered);

			return call().await;
		};
		let mut key = None::<CacheKey>;

		if policy.read_policy(context).is_include() {
			let derived = policy.cache_key(context).await.map_err(Error::from)?;

			match self.store.get(&derived).await.map_err(Error::from)? {
				Some(payload) => {
					let value = serde_json::from_slice(&payload).map_err(|source| {
						Error::from(SerializationError::CachedPayload {
							key: derived.to_string(),
							source,
						})
					})?;

					obs::record_cache_outcome(CacheOutcome::Hit);

					return Ok(value);
				},
				None => obs::record_cache_outcome(CacheOutcome::Miss),
			}

			key = Some(derived);
		} else {
			obs::record_cache_outcome(CacheOutcome::ReadSkipped);
		}

		let value = call().await?;

		if policy.write_policy(context).is_include() {
			let key = match key {
				Some(key) => key,
				None => policy.cache_key(context).await.map_err(Error::from)?,
			};
			let payload = serde_json::to_vec(&value).map_err(|source| {
				Error::from(SerializationError::CachedPayload { key: key.to_string(), source })
			})?;

			self.store.put(&key, payload, policy.expiration()).await.map_err(Error::from)?;
			obs::record_cache_outcome(CacheOutcome::Stored);
		} else {
			obs::record_cache_outcome(CacheOutcome::WriteSkipped);
		}

		Ok(value)
	}
}
impl Debug for CachePipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachePipeline")
			.field("registry", &self.registry)
			.field("store", &"<dyn CacheStore>")
			.finish()
	}
}
