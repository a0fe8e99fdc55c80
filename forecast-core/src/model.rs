use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One day of forecast, simplified for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Local wall-clock time of the matched 3-hour slot.
    pub date: NaiveDateTime,
    pub description: String,
    /// Air temperature in °C.
    pub temp: f64,
    /// `data:image/png;base64,...` for the condition glyph, or empty when
    /// the icon could not be fetched.
    pub image_base64: String,
}

impl ForecastEntry {
    /// Explicit "no data" marker for callers that need one, recognizable by
    /// its 1900-01-01 date. Never inserted into result lists.
    pub fn not_found() -> Self {
        let date = NaiveDate::from_ymd_opt(1900, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();

        Self {
            date,
            description: String::new(),
            temp: 0.0,
            image_base64: String::new(),
        }
    }
}
