use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use tracing::debug;
use weather_screen_core::{
    Config, HttpImageLoader, ImageLoader, Screen, ScreenLoader, ScreenState, Units, render,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-screen", version, about = "Weather screen CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key, default location and units.
    Configure,

    /// Print the path of the configuration file.
    ConfigPath,

    /// Show the weather screen for a location.
    Show {
        /// Location name; defaults to the configured one.
        location: Option<String>,

        /// One of "metric", "imperial" or "standard".
        #[arg(long)]
        units: Option<String>,

        /// Number of forecast days to request.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
        days: Option<u8>,

        /// Re-activate the screen every SECS seconds until interrupted.
        #[arg(
            long,
            value_name = "SECS",
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        refresh: Option<u64>,

        /// Write the condition icon to this file once loaded.
        #[arg(long, value_name = "PATH")]
        save_icon: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
            Command::Show {
                location,
                units,
                days,
                refresh,
                save_icon,
            } => {
                let mut config = Config::load()?;
                if let Some(units) = units {
                    config.units = Units::try_from(units.as_str())?;
                }
                if let Some(days) = days {
                    config.forecast_days = days;
                }

                let location = location.unwrap_or_else(|| config.location.clone());
                let session = Session {
                    loader: config.screen_loader()?,
                    images: HttpImageLoader::new(),
                    units: config.units,
                    save_icon,
                };

                match refresh {
                    Some(secs) => {
                        let every = Duration::from_secs(secs);
                        session.run_refreshing(&location, every).await
                    }
                    None => session.run_once(&location).await,
                }
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("leave empty to keep the current key")
        .prompt()?;
    if !key.trim().is_empty() {
        config.set_api_key(key);
    }
    config.api_key()?;

    config.location = Text::new("Default location:")
        .with_default(&config.location)
        .prompt()?;

    let cursor = Units::all()
        .iter()
        .position(|u| *u == config.units)
        .unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

/// How a published state ended up on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presented {
    Pending,
    Shown,
    Failed,
    Blank,
}

/// One screen, its collaborators and how to present it.
struct Session {
    loader: ScreenLoader,
    images: HttpImageLoader,
    units: Units,
    save_icon: Option<PathBuf>,
}

impl Session {
    async fn run_once(mut self, location: &str) -> anyhow::Result<()> {
        let mut rx = self.loader.subscribe();
        let handle = self.loader.activate(location);
        let activation = handle.id();
        debug!(%activation, location, "single activation");

        let outcome = loop {
            let state = rx.borrow_and_update().clone();
            match self.present(&state).await? {
                Presented::Pending => {}
                settled => break settled,
            }

            rx.changed()
                .await
                .context("Screen loader stopped before the fetch settled")?;
        };

        let completed = handle.finished().await;
        debug!(%activation, completed, "fetch task joined");

        match outcome {
            Presented::Failed => Err(anyhow!("Could not load weather for '{location}'")),
            Presented::Blank => Err(anyhow!(
                "No forecast entries were returned for '{location}'"
            )),
            Presented::Pending | Presented::Shown => Ok(()),
        }
    }

    async fn run_refreshing(mut self, location: &str, every: Duration) -> anyhow::Result<()> {
        let mut rx = self.loader.subscribe();
        let mut ticker = tokio::time::interval(every);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let handle = self.loader.activate(location);
                    debug!(activation = %handle.id(), location, "refresh");
                }
                changed = rx.changed() => {
                    changed.context("Screen loader stopped")?;
                    let state = rx.borrow_and_update().clone();
                    if state.result.is_settled() {
                        println!("-- {} --", Local::now().format("%H:%M:%S"));
                    }
                    if self.present(&state).await? == Presented::Blank {
                        eprintln!("No forecast entries were returned.");
                    }
                }
            }
        }
    }

    /// Prints one state and reports which branch it took.
    async fn present(&self, state: &ScreenState) -> anyhow::Result<Presented> {
        let screen = render::select(&state.result);

        if let Some(text) = output::render_screen(&screen, self.units) {
            println!("{text}");
        }

        let presented = match &screen {
            Screen::Progress => Presented::Pending,
            Screen::Weather(view) => {
                if let (Some(url), Some(path)) = (&view.icon_url, &self.save_icon) {
                    self.store_icon(url, path).await?;
                }
                Presented::Shown
            }
            Screen::Empty { error: Some(err) } => {
                eprintln!("{}", output::render_error(err));
                Presented::Failed
            }
            Screen::Empty { error: None } if state.result.is_settled() => Presented::Blank,
            Screen::Empty { error: None } => Presented::Pending,
        };

        Ok(presented)
    }

    async fn store_icon(&self, url: &str, path: &Path) -> anyhow::Result<()> {
        let Some(image) = self.images.load(url).await else {
            return Ok(());
        };

        let target = path.display();
        fs::write(path, &image.bytes)
            .with_context(|| format!("Failed to write icon from {} to {target}", image.url))?;

        let kind = image.content_type.as_deref().unwrap_or("unknown type");
        let size = image.bytes.len();
        println!("Icon saved to {target} ({kind}, {size} bytes)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use weather_screen_core::{FetchError, ReactivationPolicy, WeatherApi, WeatherSnapshot};

    #[derive(Debug)]
    struct Offline;

    #[async_trait]
    impl WeatherApi for Offline {
        async fn fetch_weather(&self, _location: &str) -> Result<WeatherSnapshot, FetchError> {
            Err(FetchError::Network("connection refused".into()))
        }
    }

    #[derive(Debug)]
    struct Canned(WeatherSnapshot);

    #[async_trait]
    impl WeatherApi for Canned {
        async fn fetch_weather(&self, _location: &str) -> Result<WeatherSnapshot, FetchError> {
            Ok(self.0.clone())
        }
    }

    fn snapshot(list: &str) -> WeatherSnapshot {
        let body = format!(
            r#"{{"city":{{"name":"Kochi","country":"IN"}},"list":{list}}}"#
        );
        serde_json::from_str(&body).expect("valid payload")
    }

    fn session(api: impl WeatherApi + 'static) -> Session {
        Session {
            loader: ScreenLoader::new(Arc::new(api), ReactivationPolicy::default()),
            images: HttpImageLoader::new(),
            units: Units::Metric,
            save_icon: None,
        }
    }

    #[tokio::test]
    async fn failed_fetch_makes_single_show_fail() {
        let err = session(Offline).run_once("Kochi").await.unwrap_err();

        assert_eq!(err.to_string(), "Could not load weather for 'Kochi'");
    }

    #[tokio::test]
    async fn empty_forecast_makes_single_show_fail() {
        let err = session(Canned(snapshot("[]")))
            .run_once("Kochi")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("No forecast entries"));
    }

    #[tokio::test]
    async fn loaded_forecast_shows_successfully() {
        let list = r#"[{"dt":1700000000,"temp":{"day":30.4},
                        "weather":[{"main":"Clear","icon":"01d"}]}]"#;

        let shown = session(Canned(snapshot(list))).run_once("Kochi").await;
        assert!(shown.is_ok());
    }

    #[test]
    fn show_defaults_to_configured_location() {
        let cli = Cli::try_parse_from(["weather-screen", "show"])
            .expect("valid args");

        match cli.command {
            Command::Show { location, .. } => assert!(location.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_accepts_location_and_flags() {
        let cli = Cli::try_parse_from([
            "weather-screen",
            "show",
            "Chennai",
            "--units",
            "imperial",
            "--days",
            "3",
            "--refresh",
            "60",
        ])
        .expect("valid args");

        match cli.command {
            Command::Show {
                location,
                units,
                days,
                refresh,
                save_icon,
            } => {
                assert_eq!(location.as_deref(), Some("Chennai"));
                assert_eq!(units.as_deref(), Some("imperial"));
                assert_eq!(days, Some(3));
                assert_eq!(refresh, Some(60));
                assert!(save_icon.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn zero_refresh_is_rejected() {
        let parsed = Cli::try_parse_from(["weather-screen", "show", "--refresh", "0"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn out_of_range_days_are_rejected() {
        let parsed = Cli::try_parse_from(["weather-screen", "show", "--days", "17"]);
        assert!(parsed.is_err());
    }
}
