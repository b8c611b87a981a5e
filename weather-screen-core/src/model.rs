use serde::{Deserialize, Serialize};

/// Decoded `forecast/daily` response: a city plus its entries in API order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: City,
    #[serde(default)]
    pub list: Vec<WeatherItem>,
}

impl WeatherSnapshot {
    /// The first entry is treated as the current conditions.
    pub fn current(&self) -> Option<&WeatherItem> {
        self.list.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: String,
    /// Shift in seconds from UTC.
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub population: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherItem {
    pub dt: i64,
    pub temp: Temperature,
    #[serde(default)]
    pub feels_like: Option<FeelsLike>,
    #[serde(default)]
    pub pressure: Option<u32>,
    #[serde(default)]
    pub humidity: Option<u8>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub clouds: Option<u8>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

impl WeatherItem {
    pub fn condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub day: f64,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub night: Option<f64>,
    #[serde(default)]
    pub eve: Option<f64>,
    #[serde(default)]
    pub morn: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeelsLike {
    pub day: f64,
    #[serde(default)]
    pub night: Option<f64>,
    #[serde(default)]
    pub eve: Option<f64>,
    #[serde(default)]
    pub morn: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub id: Option<u32>,
    pub main: String,
    #[serde(default)]
    pub description: Option<String>,
    pub icon: String,
}
