//! OpenWeatherMap client for the fixed Poltava deployment.
//!
//! One request fetches the whole 5-day/3-hour feed; requested days are then
//! matched against the feed's `dt_txt` field at the fixed 09:00 marker and
//! condition icons are embedded as `data:` URIs.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    error::FetchError,
    model::ForecastEntry,
    service::{DiagnosticSink, ForecastService, TracingSink},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/";
pub const DEFAULT_PRO_BASE_URL: &str = "https://pro.openweathermap.org/";
pub const DEFAULT_API_KEY: &str = "1420cf64dca72ede8e1443e734ae5682";
pub const CITY_POLTAVA_ID: u32 = 696643;

const API_PREFIX: &str = "data/2.5/";
const UNITS: &str = "metric";
const LANG: &str = "ua";

/// In-process knobs for the client.
///
/// `Default` is the production Poltava setup; tests point the base URLs at a
/// mock server. Base URLs must end with `/`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub pro_base_url: String,
    pub api_key: String,
    pub city_id: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pro_base_url: DEFAULT_PRO_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            city_id: CITY_POLTAVA_ID,
        }
    }
}

pub struct OpenWeatherClient {
    config: ClientConfig,
    http: Client,
    sink: Arc<dyn DiagnosticSink>,
}

impl OpenWeatherClient {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: ClientConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, http: Client::new(), sink }
    }

    fn current_weather_url(&self) -> String {
        format!(
            "{}{}weather?appid={}&id={}&units={}&lang={}",
            self.config.base_url, API_PREFIX, self.config.api_key, self.config.city_id, UNITS, LANG,
        )
    }

    fn forecast_url(&self) -> String {
        format!(
            "{}{}forecast?appid={}&id={}&units={}&lang={}",
            self.config.base_url, API_PREFIX, self.config.api_key, self.config.city_id, UNITS, LANG,
        )
    }

    /// 30-day climate forecast on the paid plan. Constructed for parity with
    /// the deployed configuration but not fetched by any operation here.
    pub fn climate_forecast_url(&self) -> String {
        format!(
            "{}{}forecast/climate?appid={}&id={}&units={}&lang={}",
            self.config.pro_base_url, API_PREFIX, self.config.api_key, self.config.city_id, UNITS, LANG,
        )
    }

    // Icons are served from the bare host over plain http, not api.*.
    fn icon_url(&self, icon: &str) -> String {
        let base = self.config.base_url.replace("https://api.", "http://");
        format!("{base}img/wn/{icon}.png")
    }

    async fn send_request<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let res = self.http.get(url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::status(status, &body));
        }

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }

        serde_json::from_str::<Option<T>>(&body)?.ok_or(FetchError::EmptyBody)
    }

    /// Raw PNG bytes for a condition glyph. Non-success status is an error
    /// here; the caller degrades it to an empty icon string.
    async fn get_icon(&self, icon: &str) -> Result<Vec<u8>, FetchError> {
        let res = self.http.get(self.icon_url(icon)).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await?;
            return Err(FetchError::status(status, &body));
        }

        Ok(res.bytes().await?.to_vec())
    }

    async fn icon_data_uri(&self, icon: &str) -> String {
        match self.get_icon(icon).await {
            Ok(bytes) => format!("data:image/png;base64,{}", STANDARD.encode(bytes)),
            Err(err) => {
                self.sink.warn(&format!("weather icon fetch: {err}"));
                String::new()
            }
        }
    }

    async fn fetch_forecast(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ForecastEntry>, FetchError> {
        let keys = date_keys(from, to);

        let answer: ForecastAnswer = self.send_request(&self.forecast_url()).await?;

        let mut result = Vec::new();

        for key in &keys {
            let Some(slot) = answer.list.iter().find(|s| s.dt_txt == *key) else {
                continue;
            };

            result.push(self.slot_to_entry(slot).await);
        }

        Ok(result)
    }

    async fn slot_to_entry(&self, slot: &ForecastSlot) -> ForecastEntry {
        let condition = slot.weather.first();

        let description = condition.map(|c| c.description.clone()).unwrap_or_default();
        let icon = condition.map(|c| c.icon.as_str()).unwrap_or_default();

        let image_base64 = if icon.trim().is_empty() {
            String::new()
        } else {
            self.icon_data_uri(icon).await
        };

        ForecastEntry {
            date: unix_to_local(slot.dt).unwrap_or_else(|| Local::now().naive_local()),
            description,
            temp: slot.main.temp,
            image_base64,
        }
    }

    async fn fetch_current(&self) -> Result<ForecastEntry, FetchError> {
        let answer: CurrentAnswer = self.send_request(&self.current_weather_url()).await?;

        let slot = ForecastSlot {
            dt: answer.dt,
            main: answer.main,
            weather: answer.weather,
            dt_txt: String::new(),
        };

        Ok(self.slot_to_entry(&slot).await)
    }
}

impl Default for OpenWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ForecastService for OpenWeatherClient {
    async fn get_forecast(&self, from: NaiveDate, to: NaiveDate) -> Vec<ForecastEntry> {
        match self.fetch_forecast(from, to).await {
            Ok(entries) => entries,
            Err(err) => {
                self.sink.warn(&format!("forecast weather of Poltava: {err}"));
                Vec::new()
            }
        }
    }

    async fn get_current(&self) -> Option<ForecastEntry> {
        match self.fetch_current().await {
            Ok(entry) => Some(entry),
            Err(err) => {
                self.sink.warn(&format!("current weather of Poltava: {err}"));
                None
            }
        }
    }
}

/// Date keys for the fixed daily slot, one per day in `from..=to`.
///
/// The feed's `dt_txt` values are UTC text; 09:00 approximates midday for the
/// deployment's +3 offset. An inverted range yields no keys.
fn date_keys(from: NaiveDate, to: NaiveDate) -> Vec<String> {
    let days = (to - from).num_days();

    let mut keys = Vec::new();
    for offset in 0..=days {
        let day = from + chrono::Duration::days(offset);
        keys.push(day.format("%Y-%m-%d 09:00:00").to_string());
    }

    keys
}

fn unix_to_local(ts: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&Local).naive_local())
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastSlot {
    dt: i64,
    main: OwMain,
    weather: Vec<OwCondition>,
    dt_txt: String,
}

#[derive(Debug, Deserialize)]
struct ForecastAnswer {
    list: Vec<ForecastSlot>,
}

#[derive(Debug, Deserialize)]
struct CurrentAnswer {
    dt: i64,
    main: OwMain,
    weather: Vec<OwCondition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
    }

    #[test]
    fn single_day_range_yields_one_0900_key() {
        let day = date("2024-01-01");
        let keys = date_keys(day, day);

        assert_eq!(keys, vec!["2024-01-01 09:00:00".to_string()]);
    }

    #[test]
    fn range_yields_one_key_per_day_in_order() {
        let keys = date_keys(date("2024-02-28"), date("2024-03-01"));

        assert_eq!(
            keys,
            vec![
                "2024-02-28 09:00:00".to_string(),
                "2024-02-29 09:00:00".to_string(),
                "2024-03-01 09:00:00".to_string(),
            ]
        );
    }

    #[test]
    fn inverted_range_yields_no_keys() {
        let keys = date_keys(date("2024-01-02"), date("2024-01-01"));
        assert!(keys.is_empty());
    }

    #[test]
    fn forecast_url_matches_template() {
        let client = OpenWeatherClient::new();

        assert_eq!(
            client.forecast_url(),
            "https://api.openweathermap.org/data/2.5/forecast\
             ?appid=1420cf64dca72ede8e1443e734ae5682&id=696643&units=metric&lang=ua"
        );
    }

    #[test]
    fn current_weather_url_matches_template() {
        let client = OpenWeatherClient::new();

        assert_eq!(
            client.current_weather_url(),
            "https://api.openweathermap.org/data/2.5/weather\
             ?appid=1420cf64dca72ede8e1443e734ae5682&id=696643&units=metric&lang=ua"
        );
    }

    #[test]
    fn climate_forecast_url_uses_pro_host() {
        let client = OpenWeatherClient::new();

        assert_eq!(
            client.climate_forecast_url(),
            "https://pro.openweathermap.org/data/2.5/forecast/climate\
             ?appid=1420cf64dca72ede8e1443e734ae5682&id=696643&units=metric&lang=ua"
        );
    }

    #[test]
    fn icon_url_downgrades_scheme_and_drops_api_host() {
        let client = OpenWeatherClient::new();

        assert_eq!(client.icon_url("01d"), "http://openweathermap.org/img/wn/01d.png");
    }

    #[test]
    fn icon_url_leaves_plain_http_base_untouched() {
        let client = OpenWeatherClient::with_config(ClientConfig {
            base_url: "http://127.0.0.1:9999/".to_string(),
            ..ClientConfig::default()
        });

        assert_eq!(client.icon_url("10n"), "http://127.0.0.1:9999/img/wn/10n.png");
    }

    #[test]
    fn unix_to_local_converts_epoch_seconds() {
        let expected = DateTime::from_timestamp(1_704_099_600, 0)
            .expect("valid timestamp")
            .with_timezone(&Local)
            .naive_local();

        assert_eq!(unix_to_local(1_704_099_600), Some(expected));
    }
}
