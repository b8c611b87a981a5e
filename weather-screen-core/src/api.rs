use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use tracing::debug;

use crate::{FetchError, WeatherSnapshot};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_FORECAST_DAYS: u8 = 7;

const FORECAST_PATH: &str = "/data/2.5/forecast/daily";

/// The single capability the screen needs from the network.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn fetch_weather(&self, location: &str) -> Result<WeatherSnapshot, FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

/// OpenWeather daily forecast client.
#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    units: Units,
    days: u8,
    http: Client,
}

impl Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("units", &self.units)
            .field("days", &self.days)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: Units::default(),
            days: DEFAULT_FORECAST_DAYS,
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_days(mut self, days: u8) -> Self {
        self.days = days.max(1);
        self
    }

    pub fn units(&self) -> Units {
        self.units
    }

    fn forecast_request(&self, location: &str) -> RequestBuilder {
        let url = format!("{}{FORECAST_PATH}", self.base_url);

        self.http.get(url).query(&[
            ("q", location),
            ("appid", self.api_key.as_str()),
            ("units", self.units.as_str()),
            ("cnt", &self.days.to_string()),
        ])
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn fetch_weather(&self, location: &str) -> Result<WeatherSnapshot, FetchError> {
        debug!(location, units = %self.units, "requesting daily forecast");

        let res = self.forecast_request(location).send().await?;
        let status = res.status();
        let body = res.text().await?;

        parse_forecast(status, &body)
    }
}

fn parse_forecast(status: StatusCode, body: &str) -> Result<WeatherSnapshot, FetchError> {
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: truncate_body(body),
        });
    }

    Ok(serde_json::from_str(body)?)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
