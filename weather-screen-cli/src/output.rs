use std::fmt::Display;

use weather_screen_core::{
    Screen, Units, WeatherView,
    render::{AppBar, AppBarAction},
};

/// Text for one screen branch. `None` means nothing is printed to stdout.
pub fn render_screen<E>(screen: &Screen<'_, E>, units: Units) -> Option<String> {
    match screen {
        Screen::Progress => Some("Loading...".to_string()),
        Screen::Weather(view) => Some(render_weather(view, units)),
        Screen::Empty { .. } => None,
    }
}

pub fn render_error(error: &impl Display) -> String {
    format!("error: {error}")
}

fn render_app_bar(bar: &AppBar) -> String {
    let back = if bar.show_back { "← " } else { "" };
    let actions: Vec<&str> = bar
        .actions
        .iter()
        .map(|action| match action {
            AppBarAction::Search => "[search]",
            AppBarAction::More => "[⋮]",
        })
        .collect();

    format!("{back}{}  {}", bar.title, actions.join(" "))
}

pub fn render_weather(view: &WeatherView, units: Units) -> String {
    let mut lines = vec![render_app_bar(&view.app_bar)];
    lines.push(String::new());

    if !view.date.is_empty() {
        lines.push(view.date.clone());
    }
    let suffix = temperature_suffix(units);
    lines.push(format!("{}{suffix}", view.temperature));

    match &view.description {
        Some(description) => lines.push(format!("{} ({description})", view.condition)),
        None => lines.push(view.condition.clone()),
    }

    if let Some(humidity) = view.humidity {
        lines.push(format!("Humidity: {humidity}%"));
    }
    if let Some(speed) = view.wind_speed {
        lines.push(format!("Wind: {speed:.1} {}", wind_unit(units)));
    }
    if let Some(url) = &view.icon_url {
        lines.push(format!("Icon: {url}"));
    }

    lines.join("\n")
}

fn temperature_suffix(units: Units) -> &'static str {
    match units {
        Units::Metric => "C",
        Units::Imperial => "F",
        Units::Standard => "K",
    }
}

fn wind_unit(units: Units) -> &'static str {
    match units {
        Units::Imperial => "mph",
        Units::Metric | Units::Standard => "m/s",
    }
}
