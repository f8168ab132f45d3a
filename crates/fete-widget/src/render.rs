//! HTML for the forecast cards.

use crate::client::CardDay;

const DEFAULT_ICON: &str = "🌤️";

/// Symbol for a condition category name as sent by the API.
pub fn icon_for(category: &str) -> &'static str {
    match category {
        "Clear" => "☀️",
        "Clouds" => "☁️",
        "Rain" => "🌧️",
        "Drizzle" => "🌦️",
        "Thunderstorm" => "⛈️",
        "Snow" => "❄️",
        "Mist" | "Smoke" | "Haze" | "Dust" | "Fog" | "Sand" | "Ash" => "🌫️",
        "Squall" => "💨",
        "Tornado" => "🌪️",
        _ => DEFAULT_ICON,
    }
}

pub fn render_card(day: &CardDay) -> String {
    format!(
        concat!(
            r#"<div class="weather-day">"#,
            r#"<div class="weather-date">{}</div>"#,
            r#"<div class="weather-icon">{}</div>"#,
            r#"<div class="weather-desc">{}</div>"#,
            r#"<div class="weather-temp">{}° / {}°</div>"#,
            "</div>"
        ),
        escape(&day.date),
        icon_for(&day.category),
        escape(&day.description),
        day.temp_high,
        day.temp_low,
    )
}

/// Shown in place of the cards whenever loading fails.
pub fn render_error(message: &str) -> String {
    format!(r#"<div class="weather-error"><p>{}</p></div>"#, escape(message))
}

/// Cards in API order, one per day.
pub fn render_cards(days: &[CardDay]) -> String {
    days.iter().map(render_card).collect()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
