//! Call-site to policy attachment.

// self
use crate::{
	_prelude::*,
	cache::{CachePolicy, CallSiteId},
};

type PolicyMap = HashMap<CallSiteId, Arc<dyn CachePolicy>>;

/// Thread-safe map from call sites to their cache policies.
///
/// Clones share the same underlying map. Lookups clone the policy handle and release the lock
/// before returning, so policies are never evaluated while the registry is locked.
#[derive(Clone, Default)]
pub struct CachePolicyRegistry(Arc<RwLock<PolicyMap>>);
impl CachePolicyRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches `policy` to `call_site`, returning the policy it replaced.
	pub fn register<P>(&self, call_site: CallSiteId, policy: P) -> Option<Arc<dyn CachePolicy>>
	where
		P: 'static + CachePolicy,
	{
		self.register_shared(call_site, Arc::new(policy))
	}

	/// Attaches an already shared policy to `call_site`.
	pub fn register_shared(
		&self,
		call_site: CallSiteId,
		policy: Arc<dyn CachePolicy>,
	) -> Option<Arc<dyn CachePolicy>> {
		self.0.write().insert(call_site, policy)
	}

	/// Builder-style variant of [`register`](Self::register).
	pub fn with_policy<P>(self, call_site: CallSiteId, policy: P) -> Self
	where
		P: 'static + CachePolicy,
	{
		self.register(call_site, policy);

		self
	}

	/// Returns the policy attached to `call_site`.
	pub fn lookup(&self, call_site: &str) -> Option<Arc<dyn CachePolicy>> {
		self.0.read().get(call_site).cloned()
	}

	/// Detaches the policy from `call_site`.
	pub fn remove(&self, call_site: &str) -> Option<Arc<dyn CachePolicy>> {
		self.0.write().remove(call_site)
	}

	/// Number of call sites with a policy.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no call site has a policy.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Registered call sites in sorted order.
	pub fn call_sites(&self) -> Vec<CallSiteId> {
		let mut call_sites = self.0.read().keys().cloned().collect::<Vec<_>>();

		call_sites.sort();

		call_sites
	}
}
impl Debug for CachePolicyRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachePolicyRegistry").field("call_sites", &self.call_sites()).finish()
	}
}
