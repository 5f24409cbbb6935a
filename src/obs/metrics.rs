// self
use crate::{
	grant::GrantType,
	obs::{CacheOutcome, FlowOutcome},
};

/// Records a token request outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(grant: GrantType, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_tokenkit_grant_total",
			"grant" => grant.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}

/// Records a cache pipeline decision via the global metrics recorder (when enabled).
pub fn record_cache_outcome(outcome: CacheOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_tokenkit_cache_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
