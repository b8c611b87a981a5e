//! Core library for the `weather-screen` client.
//!
//! This crate defines:
//! - The tri-state fetch outcome (`DataOrError`)
//! - The weather snapshot model and the OpenWeather client behind `WeatherApi`
//! - The screen loader that runs one fetch per activation
//! - The render selector that turns the current outcome into a screen branch
//! - Configuration handling
//!
//! It is used by `weather-screen-cli`, but the loader and selector only
//! depend on the `WeatherApi` trait and can be driven by any front end.

pub mod api;
pub mod config;
pub mod error;
pub mod image;
pub mod loader;
pub mod model;
pub mod render;
pub mod result;

pub use api::{OpenWeatherClient, Units, WeatherApi};
pub use config::Config;
pub use error::FetchError;
pub use image::{HttpImageLoader, Image, ImageLoader};
pub use loader::{ActivationHandle, ActivationId, ReactivationPolicy, ScreenLoader, ScreenState};
pub use model::WeatherSnapshot;
pub use render::{Screen, WeatherView};
pub use result::DataOrError;
