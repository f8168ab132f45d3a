//! Display symbols for forecast conditions.

pub const THUNDERSTORM: &str = "⛈️";
pub const DRIZZLE: &str = "🌦️";
pub const RAIN: &str = "🌧️";
pub const SNOW: &str = "❄️";
pub const FOG: &str = "🌫️";
pub const CLEAR: &str = "☀️";
pub const FEW_CLOUDS: &str = "🌤️";
pub const PARTLY_CLOUDY: &str = "⛅";
pub const CLOUDY: &str = "☁️";

/// Symbol for a provider condition code. Unknown codes show as clear.
pub fn icon_for_code(code: u16) -> &'static str {
    match code {
        200..=299 => THUNDERSTORM,
        300..=399 => DRIZZLE,
        500..=599 => RAIN,
        600..=699 => SNOW,
        700..=799 => FOG,
        800 => CLEAR,
        801 => FEW_CLOUDS,
        802 => PARTLY_CLOUDY,
        803..=u16::MAX => CLOUDY,
        _ => CLEAR,
    }
}

/// Checked in order against the lowercased text, first match wins.
const TEXT_ICONS: &[(&[&str], &str)] = &[
    (&["thunder", "storm"], THUNDERSTORM),
    (&["rain", "drizzle"], RAIN),
    (&["snow"], SNOW),
    (&["fog", "mist"], FOG),
    (&["sunny", "clear"], CLEAR),
    (&["partly cloudy"], PARTLY_CLOUDY),
    (&["cloudy", "overcast"], CLOUDY),
];

/// Symbol for a free-text condition. Unmatched text shows as clear.
pub fn icon_for_text(text: &str) -> &'static str {
    let text = text.to_lowercase();
    TEXT_ICONS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, icon)| *icon)
        .unwrap_or(CLEAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_icons() {
        assert_eq!(icon_for_code(202), THUNDERSTORM);
        assert_eq!(icon_for_code(310), DRIZZLE);
        assert_eq!(icon_for_code(502), RAIN);
        assert_eq!(icon_for_code(620), SNOW);
        assert_eq!(icon_for_code(781), FOG);
        assert_eq!(icon_for_code(800), CLEAR);
        assert_eq!(icon_for_code(801), FEW_CLOUDS);
        assert_eq!(icon_for_code(802), PARTLY_CLOUDY);
        assert_eq!(icon_for_code(804), CLOUDY);
    }

    #[test]
    fn test_unknown_code_is_clear() {
        assert_eq!(icon_for_code(100), CLEAR);
        assert_eq!(icon_for_code(450), CLEAR);
    }

    #[test]
    fn test_text_icons() {
        assert_eq!(icon_for_text("Thundery outbreaks possible"), THUNDERSTORM);
        assert_eq!(icon_for_text("Light drizzle"), RAIN);
        assert_eq!(icon_for_text("Heavy snow"), SNOW);
        assert_eq!(icon_for_text("Mist"), FOG);
        assert_eq!(icon_for_text("Sunny"), CLEAR);
        assert_eq!(icon_for_text("Partly cloudy"), PARTLY_CLOUDY);
        assert_eq!(icon_for_text("Overcast"), CLOUDY);
    }

    #[test]
    fn test_text_priority() {
        // Rain is checked before any cloud keyword
        assert_eq!(icon_for_text("Cloudy with light rain"), RAIN);
    }

    #[test]
    fn test_unmatched_text_is_clear() {
        assert_eq!(icon_for_text("Dusty"), CLEAR);
    }
}
