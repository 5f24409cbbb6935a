//! Declarative cache policies for API calls.
//!
//! A [`CachePolicy`] answers three questions for one intercepted call: may the result be read
//! from cache, may it be written to cache, and under which [`CacheKey`]. Read and write
//! decisions are independent so a policy can warm a cache without serving from it, or serve
//! without refreshing. Policies are attached to call sites through a [`CachePolicyRegistry`]
//! and consulted by a pipeline such as [`CachePipeline`] around the real call; the storage
//! backend stays behind the [`CacheStore`] contract.
//!
//! Most policies only differ in how they derive keys. [`ExpiringPolicy`] supplies a fixed
//! expiration and Include/Include defaults and delegates key derivation to any
//! [`KeyDerivation`], e.g. [`RequestFingerprint`] or a closure wrapped with [`key_fn`].

pub mod context;
pub mod keys;
pub mod pipeline;
pub mod policy;
pub mod registry;
pub mod store;

pub use context::*;
pub use keys::*;
pub use pipeline::*;
pub use policy::*;
pub use registry::*;
pub use store::*;

// self
use crate::_prelude::*;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Failures raised while a policy derives a cache key.
#[derive(Debug, ThisError)]
pub enum PolicyError {
	/// Key derivation failed for a policy-specific reason.
	#[error("Cache key derivation failed for call site `{call_site}`.")]
	Derivation {
		/// Call site whose key could not be derived.
		call_site: String,
		/// Underlying failure.
		#[source]
		source: BoxError,
	},
	/// The key rule names an argument the call did not carry.
	#[error("Call site `{call_site}` has no argument `{argument}` required by its cache key.")]
	MissingArgument {
		/// Call site whose key could not be derived.
		call_site: String,
		/// Name of the missing argument.
		argument: String,
	},
}
impl PolicyError {
	/// Wraps a policy-specific failure.
	pub fn derivation(
		call_site: impl Into<String>,
		src: impl 'static + Send + Sync + StdError,
	) -> Self {
		Self::Derivation { call_site: call_site.into(), source: Box::new(src) }
	}
}
