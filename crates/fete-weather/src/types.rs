use serde::{Deserialize, Serialize};

use crate::icon;

/// Weather condition categories, named after the provider's condition groups.
///
/// The provider reports several atmospheric conditions (mist, haze, fog,
/// dust, ash, sand, smoke) that display identically; they share one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConditionCategory {
    #[default]
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    #[serde(
        rename = "Mist",
        alias = "Haze",
        alias = "Fog",
        alias = "Dust",
        alias = "Ash",
        alias = "Sand",
        alias = "Smoke"
    )]
    Atmosphere,
    Squall,
    Tornado,
}

impl ConditionCategory {
    /// Category for a provider condition code.
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_code(code: u16) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            771 => Self::Squall,
            781 => Self::Tornado,
            700..=799 => Self::Atmosphere,
            800 => Self::Clear,
            801..=899 => Self::Clouds,
            _ => Self::Clear,
        }
    }

    /// Category for a free-text condition, as used for placeholder data.
    pub fn from_text(text: &str) -> Self {
        let text = text.to_lowercase();
        TEXT_CATEGORIES
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(Self::Clear)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Atmosphere => "Mist",
            Self::Squall => "Squall",
            Self::Tornado => "Tornado",
        }
    }
}

/// Checked in order, first match wins.
const TEXT_CATEGORIES: &[(&str, ConditionCategory)] = &[
    ("cloud", ConditionCategory::Clouds),
    ("rain", ConditionCategory::Rain),
    ("sun", ConditionCategory::Clear),
    ("clear", ConditionCategory::Clear),
];

/// How a forecast was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Live,
    Placeholder,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Placeholder => "placeholder",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "placeholder" => Ok(Self::Placeholder),
            other => Err(format!("unknown forecast source: {}", other)),
        }
    }
}

/// One day's weather summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Display date, e.g. "Oct 31"
    pub date: String,
    #[serde(rename = "main")]
    pub condition: ConditionCategory,
    /// Lowercase condition phrase
    pub description: String,
    /// Display symbol for the condition. Rows cached before icons existed
    /// lack it.
    #[serde(default)]
    pub icon: String,
    /// Degrees Fahrenheit
    pub temp_high: i32,
    pub temp_low: i32,
    pub source: Source,
}

/// Forecast returned to callers, with cache provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub days: Vec<ForecastDay>,
    pub source: Source,
    pub cached: bool,
}

impl ForecastDay {
    /// Day built from a free-text condition, as in placeholder records.
    pub fn from_text(date: String, text: &str, high: f64, low: f64, source: Source) -> Self {
        Self {
            date,
            condition: ConditionCategory::from_text(text),
            description: text.trim().to_lowercase(),
            icon: icon::icon_for_text(text).to_string(),
            temp_high: round_temp(high),
            temp_low: round_temp(low),
            source,
        }
    }
}

/// Round to the nearest whole degree, halves toward positive infinity.
pub(crate) fn round_temp(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_text_rain() {
        assert_eq!(ConditionCategory::from_text("light rain showers"), ConditionCategory::Rain);
        assert_eq!(ConditionCategory::from_text("Patchy rain nearby"), ConditionCategory::Rain);
    }

    #[test]
    fn test_text_clouds() {
        assert_eq!(ConditionCategory::from_text("partly cloudy"), ConditionCategory::Clouds);
        assert_eq!(ConditionCategory::from_text("Partly Cloudy "), ConditionCategory::Clouds);
    }

    #[test]
    fn test_text_clear() {
        assert_eq!(ConditionCategory::from_text("sunny"), ConditionCategory::Clear);
        assert_eq!(ConditionCategory::from_text("Clear"), ConditionCategory::Clear);
    }

    #[test]
    fn test_text_unmatched_defaults_to_clear() {
        assert_eq!(ConditionCategory::from_text("fog"), ConditionCategory::Clear);
        assert_eq!(ConditionCategory::from_text("blizzard"), ConditionCategory::Clear);
        assert_eq!(ConditionCategory::from_text(""), ConditionCategory::Clear);
    }

    #[test]
    fn test_text_first_match_wins() {
        // "cloud" is checked before "rain"
        assert_eq!(
            ConditionCategory::from_text("cloudy with rain"),
            ConditionCategory::Clouds
        );
    }

    #[test]
    fn test_round_temp_halves_go_up() {
        assert_eq!(round_temp(2.5), 3);
        assert_eq!(round_temp(-2.5), -2);
        assert_eq!(round_temp(-2.6), -3);
        assert_eq!(round_temp(78.4), 78);
    }

    #[test]
    fn test_code_ranges() {
        assert_eq!(ConditionCategory::from_code(211), ConditionCategory::Thunderstorm);
        assert_eq!(ConditionCategory::from_code(301), ConditionCategory::Drizzle);
        assert_eq!(ConditionCategory::from_code(500), ConditionCategory::Rain);
        assert_eq!(ConditionCategory::from_code(601), ConditionCategory::Snow);
        assert_eq!(ConditionCategory::from_code(741), ConditionCategory::Atmosphere);
        assert_eq!(ConditionCategory::from_code(771), ConditionCategory::Squall);
        assert_eq!(ConditionCategory::from_code(781), ConditionCategory::Tornado);
        assert_eq!(ConditionCategory::from_code(800), ConditionCategory::Clear);
        assert_eq!(ConditionCategory::from_code(804), ConditionCategory::Clouds);
    }

    #[test]
    fn test_unknown_code_defaults_to_clear() {
        assert_eq!(ConditionCategory::from_code(0), ConditionCategory::Clear);
        assert_eq!(ConditionCategory::from_code(999), ConditionCategory::Clear);
    }

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&ConditionCategory::Atmosphere).unwrap();
        assert_eq!(json, "\"Mist\"");

        let haze: ConditionCategory = serde_json::from_str("\"Haze\"").unwrap();
        assert_eq!(haze, ConditionCategory::Atmosphere);
        assert_eq!(ConditionCategory::Clouds.as_str(), "Clouds");
    }

    #[test]
    fn test_forecast_day_uses_main_field() {
        let day = ForecastDay::from_text("Oct 31".to_string(), "Sunny", 78.6, 55.4, Source::Placeholder);
        let value = serde_json::to_value(&day).unwrap();

        assert_eq!(value["main"], "Clear");
        assert_eq!(value["description"], "sunny");
        assert_eq!(value["temp_high"], 79);
        assert_eq!(value["temp_low"], 55);
        assert_eq!(value["source"], "placeholder");
    }

    #[test]
    fn test_source_parse() {
        assert_eq!("live".parse::<Source>().unwrap(), Source::Live);
        assert_eq!("placeholder".parse::<Source>().unwrap(), Source::Placeholder);
        assert!("unknown".parse::<Source>().is_err());
    }
}
