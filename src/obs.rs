//! Optional observability helpers for token requests and cache decisions.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `oauth2_tokenkit.grant` (fields `grant` and `stage`)
//!   around token requests and `oauth2_tokenkit.cache` (field `call_site`) around cache
//!   pipeline executions.
//! - Enable `metrics` to increment `oauth2_tokenkit_grant_total` (labels `grant` + `outcome`)
//!   and `oauth2_tokenkit_cache_total` (label `outcome`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each token request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a token request.
	Attempt,
	/// A body was received and parsed.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded by the cache pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheOutcome {
	/// Value served from the store.
	Hit,
	/// Read allowed but the store had no value.
	Miss,
	/// Policy excluded the read.
	ReadSkipped,
	/// Value written to the store.
	Stored,
	/// Policy excluded the write.
	WriteSkipped,
	/// No policy registered for the call site.
	Unregistered,
}
impl CacheOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheOutcome::Hit => "hit",
			CacheOutcome::Miss => "miss",
			CacheOutcome::ReadSkipped => "read_skipped",
			CacheOutcome::Stored => "stored",
			CacheOutcome::WriteSkipped => "write_skipped",
			CacheOutcome::Unregistered => "unregistered",
		}
	}
}
impl Display for CacheOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
