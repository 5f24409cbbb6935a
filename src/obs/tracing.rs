// self
use crate::{_prelude::*, grant::GrantType};

/// Future returned by [`FlowSpan::instrument`]; the bare future when `tracing` is disabled.
#[cfg(feature = "tracing")]
pub type Instrumented<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`FlowSpan::instrument`]; the bare future when `tracing` is disabled.
#[cfg(not(feature = "tracing"))]
pub type Instrumented<F> = F;

/// Span attached to one token request or one cache pipeline execution.
///
/// Zero-sized without the `tracing` feature.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	inner: tracing::Span,
}
impl FlowSpan {
	/// `oauth2_tokenkit.grant` span for a token request.
	pub fn grant(grant: GrantType, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				inner: tracing::info_span!(
					"oauth2_tokenkit.grant",
					grant = grant.as_str(),
					stage
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (grant, stage);

			Self {}
		}
	}

	/// `oauth2_tokenkit.cache` span for a pipeline execution.
	pub fn cache(call_site: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { inner: tracing::info_span!("oauth2_tokenkit.cache", call_site) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = call_site;

			Self {}
		}
	}

	/// Runs `fut` inside the span; the span is entered on each poll only.
	pub fn instrument<F>(&self, fut: F) -> Instrumented<F>
	where
		F: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.inner.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
