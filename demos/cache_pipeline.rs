//! Attaches an expiring cache policy to a call site and serves the second call from an
//! in-memory store.

// std
use std::{collections::HashMap, sync::Arc};
// crates.io
use color_eyre::Result;
use parking_lot::RwLock;
use time::Duration;
// self
use oauth2_tokenkit::cache::{
	CacheKey, CachePipeline, CachePolicyRegistry, CacheStore, CacheStoreFuture, CallContext,
	CallSiteId, ExpiringPolicy, RequestFingerprint,
};

#[derive(Default)]
struct MemoryStore(RwLock<HashMap<CacheKey, Vec<u8>>>);
impl CacheStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheStoreFuture<'a, Option<Vec<u8>>> {
		Box::pin(async move { Ok(self.0.read().get(key).cloned()) })
	}

	fn put<'a>(
		&'a self,
		key: &'a CacheKey,
		value: Vec<u8>,
		expiration: Option<Duration>,
	) -> CacheStoreFuture<'a, ()> {
		Box::pin(async move {
			println!("Storing {key} for {expiration:?}.");

			self.0.write().insert(key.clone(), value);

			Ok(())
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let call_site = CallSiteId::new("users.get")?;
	let registry = CachePolicyRegistry::new().with_policy(
		call_site.clone(),
		ExpiringPolicy::new(
			Duration::minutes(5),
			RequestFingerprint::new().arguments(["id"]).metadata(["accept-language"]),
		),
	);
	let pipeline = CachePipeline::new(registry, Arc::new(MemoryStore::default()));
	let context = CallContext::new(call_site, "GET /users/{id}")
		.with_argument("id", 42)
		.with_metadata("Accept-Language", "en");

	for attempt in 1..=2 {
		let name: String = pipeline
			.execute(&context, || async move {
				println!("Attempt {attempt} reached the origin.");

				Ok::<_, oauth2_tokenkit::error::Error>("Ada Lovelace".to_owned())
			})
			.await?;

		println!("Attempt {attempt} returned {name}.");
	}

	Ok(())
}
