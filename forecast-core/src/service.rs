use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::ForecastEntry;

/// Warning side channel for degraded fetches.
///
/// The service operations never fail; whatever goes wrong is reported here
/// instead. Production uses [`TracingSink`]; tests inject a recording sink.
pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Default sink: forward to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

#[async_trait]
pub trait ForecastService: Send + Sync {
    /// Forecast entries for each day in `from..=to` at the fixed 09:00 slot,
    /// in requested order. Days without a matching slot are omitted, so the
    /// result may be shorter than the range; an inverted range yields an
    /// empty list. Never fails: transport problems degrade to an empty list.
    async fn get_forecast(&self, from: NaiveDate, to: NaiveDate) -> Vec<ForecastEntry>;

    /// Current conditions mapped through the same view model, or `None` when
    /// the upstream request fails.
    async fn get_current(&self) -> Option<ForecastEntry>;
}
