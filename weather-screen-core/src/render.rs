//! Maps the current fetch outcome to what the screen should show.

use chrono::{DateTime, FixedOffset};

use crate::{DataOrError, WeatherSnapshot, image::icon_url};

const DATE_FORMAT: &str = "%a, %b %-d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppBarAction {
    Search,
    More,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppBar {
    pub title: String,
    pub show_back: bool,
    pub actions: &'static [AppBarAction],
}

/// Everything the weather branch displays, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub app_bar: AppBar,
    pub title: String,
    pub date: String,
    pub temperature: String,
    pub condition: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub humidity: Option<u8>,
    pub wind_speed: Option<f64>,
}

impl WeatherView {
    /// `None` when the snapshot has no entries to show.
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Option<Self> {
        let item = snapshot.current()?;
        let condition = item.condition();
        let title = format!("{}, {}", snapshot.city.name, snapshot.city.country);
        let offset = snapshot.city.timezone;

        Some(Self {
            app_bar: AppBar {
                title: title.clone(),
                show_back: true,
                actions: &[AppBarAction::Search, AppBarAction::More],
            },
            title,
            date: format_date(item.dt, offset).unwrap_or_default(),
            temperature: format_temperature(item.temp.day),
            condition: condition
                .map(|c| c.main.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            description: condition.and_then(|c| c.description.clone()),
            icon_url: condition.map(|c| icon_url(&c.icon)),
            humidity: item.humidity,
            wind_speed: item.speed,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a, E> {
    Progress,
    Weather(WeatherView),
    /// Nothing to show. Carries the error when the fetch failed.
    Empty { error: Option<&'a E> },
}

impl<E> Screen<'_, E> {
    pub fn is_failure(&self) -> bool {
        matches!(self, Screen::Empty { error: Some(_) })
    }
}

pub fn select<E>(result: &DataOrError<WeatherSnapshot, E>) -> Screen<'_, E> {
    if result.is_loading() {
        return Screen::Progress;
    }

    match result.data().and_then(WeatherView::from_snapshot) {
        Some(view) => Screen::Weather(view),
        None => Screen::Empty {
            error: result.error(),
        },
    }
}

pub fn format_temperature(value: f64) -> String {
    format!("{value:.1}°")
}

/// Formats a unix timestamp in the city's offset, e.g. `Tue, Nov 14`.
pub fn format_date(timestamp: i64, utc_offset_secs: i32) -> Option<String> {
    let offset = FixedOffset::east_opt(utc_offset_secs)?;
    let instant = DateTime::from_timestamp(timestamp, 0)?;

    let local = instant.with_timezone(&offset);
    Some(local.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchError;
    use rstest::rstest;

    type Wrapper = DataOrError<WeatherSnapshot, FetchError>;

    fn kochi() -> WeatherSnapshot {
        serde_json::from_str(
            r#"{"city":{"name":"Kochi","country":"IN"},
                "list":[{"dt":1700000000,"temp":{"day":30.4},
                         "weather":[{"main":"Clear","icon":"01d"}]}]}"#,
        )
        .expect("valid payload")
    }

    #[test]
    fn kochi_scenario_renders_full_view() {
        let wrapper = Wrapper::success(kochi());

        let Screen::Weather(view) = select(&wrapper) else {
            panic!("expected weather branch");
        };

        assert_eq!(view.title, "Kochi, IN");
        assert_eq!(view.app_bar.title, "Kochi, IN");
        assert_eq!(view.temperature, "30.4°");
        assert_eq!(view.condition, "Clear");
        assert_eq!(
            view.icon_url.as_deref(),
            Some("https://openweathermap.org/img/wn/01d.png")
        );
        assert_eq!(view.date, "Tue, Nov 14");
    }

    #[test]
    fn loading_yields_progress_only() {
        assert_eq!(select(&Wrapper::loading()), Screen::Progress);
    }

    #[test]
    fn failure_yields_empty_branch_with_error() {
        let wrapper = Wrapper::failure(FetchError::Network("offline".into()));
        let screen = select(&wrapper);

        assert!(screen.is_failure());
        assert_eq!(
            screen,
            Screen::Empty {
                error: Some(&FetchError::Network("offline".into())),
            }
        );
    }

    #[test]
    fn untouched_state_yields_empty_branch() {
        let wrapper = Wrapper::default();
        let screen = select(&wrapper);

        assert_eq!(screen, Screen::Empty { error: None });
        assert!(!screen.is_failure());
    }

    #[test]
    fn snapshot_without_entries_yields_empty_branch() {
        let mut snapshot = kochi();
        snapshot.list.clear();

        assert_eq!(
            select(&Wrapper::success(snapshot)),
            Screen::Empty { error: None }
        );
    }

    #[test]
    fn missing_condition_falls_back_to_unknown() {
        let mut snapshot = kochi();
        snapshot.list[0].weather.clear();

        let view = WeatherView::from_snapshot(&snapshot).expect("has an entry");
        assert_eq!(view.condition, "Unknown");
        assert!(view.icon_url.is_none());
    }

    #[rstest]
    #[case(30.4, "30.4°")]
    #[case(30.0, "30.0°")]
    #[case(-2.26, "-2.3°")]
    #[case(86.72, "86.7°")]
    fn temperature_keeps_one_decimal(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_temperature(value), expected);
    }

    #[rstest]
    #[case(1700000000, 0, "Tue, Nov 14")]
    #[case(1700000000, 19800, "Wed, Nov 15")]
    #[case(1700000000, -36000, "Tue, Nov 14")]
    fn date_follows_city_offset(#[case] ts: i64, #[case] offset: i32, #[case] expected: &str) {
        assert_eq!(format_date(ts, offset).as_deref(), Some(expected));
    }

    #[test]
    fn out_of_range_offset_has_no_date() {
        assert!(format_date(1700000000, 100_000).is_none());
    }
}
