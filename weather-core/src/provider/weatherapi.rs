use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde_json::Value;

use crate::{error::ProviderError, model::WeatherReading};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherReading, ProviderError> {
        let url = format!("{}/current.json", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let raw: Value = serde_json::from_str(&body)?;
        Ok(reading_from_payload(raw))
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, city: &str) -> Result<WeatherReading, ProviderError> {
        self.fetch_current(city).await
    }
}

/// Map a `current.json` payload onto a reading. Absent or mistyped fields
/// fall back to zero / empty string; the payload itself is kept as `raw_data`.
pub fn reading_from_payload(raw: Value) -> WeatherReading {
    let text = |ptr: &str| {
        raw.pointer(ptr)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let number = |ptr: &str| raw.pointer(ptr).and_then(Value::as_f64).unwrap_or_default();

    let humidity = raw
        .pointer("/current/humidity")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64)))
        .unwrap_or_default();

    let local_time = raw
        .pointer("/location/localtime")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d %H:%M:%S").to_string());

    let city = text("/location/name");
    let country = text("/location/country");
    let condition = text("/current/condition/text");
    let temperature = number("/current/temp_c");
    let wind_speed = number("/current/wind_kph");

    WeatherReading {
        city,
        country,
        temperature,
        condition,
        wind_speed,
        humidity,
        local_time,
        raw_data: raw,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
