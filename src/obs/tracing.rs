// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by session flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("checkin_session.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Records a recoverable failure that sent the caller down its fallback path.
pub fn fallback(stage: &'static str, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(stage, error = %error, "falling back after recoverable failure");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, error);
	}
}

/// Records a cached or received value that failed to decode and was dropped.
pub fn discard(what: &'static str, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(what, error = %error, "discarding undecodable value");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (what, error);
	}
}

/// Records a state-machine step worth seeing in debug logs.
pub fn note(stage: &'static str, detail: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(stage, detail);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, detail);
	}
}
