use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::{Display, Write};
use weather_store::{CurrentConditions, ForecastEntry, StoreState, WeatherSnapshot};

/// Clock time like `07:30 AM` in the given zone, or `N/A` when unknown.
fn clock<Tz>(time: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.map(|t| t.with_timezone(tz).format("%I:%M %p").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn current_block<Tz>(current: &CurrentConditions, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "{}: {} ({})", current.location_name, current.condition, current.description);
    let _ = writeln!(
        out,
        "  Temperature: {}°C (feels like {}°C)",
        current.rounded_temperature(),
        current.feels_like_c.round() as i64
    );
    let _ = writeln!(out, "  Humidity:    {}%", current.humidity_pct);
    let _ = writeln!(out, "  Wind:        {:.1} km/h", current.wind_speed_kmh());
    let _ = writeln!(
        out,
        "  Sunrise:     {}   Sunset: {}",
        clock(current.sunrise, tz),
        clock(current.sunset, tz)
    );
    out
}

fn forecast_line(entry: &ForecastEntry) -> String {
    let day = entry.time_text.split(' ').next().unwrap_or(&entry.time_text);
    format!(
        "  {day}  {:>4}°C  {:<12} wind {:.1} km/h",
        entry.temperature_c.round() as i64,
        entry.condition.as_str(),
        entry.wind_speed_kmh()
    )
}

fn snapshot_in<Tz>(snapshot: &WeatherSnapshot, updated: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = current_block(&snapshot.current, tz);

    if !snapshot.forecast.is_empty() {
        out.push_str("Forecast (midday):\n");
        for entry in &snapshot.forecast {
            out.push_str(&forecast_line(entry));
            out.push('\n');
        }
    }

    if let Some(updated) = updated {
        let _ = writeln!(out, "Updated at {}", updated.with_timezone(tz).format("%H:%M:%S"));
    }

    out
}

pub fn snapshot(snapshot: &WeatherSnapshot, updated: Option<DateTime<Utc>>) -> String {
    snapshot_in(snapshot, updated, &Local)
}

/// One rendering of the store state, as shown by `watch` after every change.
pub fn state(state: &StoreState) -> String {
    if state.loading {
        return "Loading weather data...\n".to_string();
    }

    let mut out = String::new();
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {error}");
    }

    match &state.snapshot {
        Some(snap) => {
            if state.error.is_some() {
                out.push_str("Showing last known weather:\n");
            }
            out.push_str(&snapshot(snap, state.last_updated));
        }
        None if state.error.is_none() => out.push_str("No weather data available\n"),
        None => {}
    }

    out
}

pub fn city_line(name: &str, current: &CurrentConditions) -> String {
    format!("{name:<12} {:>4}°C  {}", current.rounded_temperature(), current.condition)
}
