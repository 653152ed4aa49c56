//! Endpoints and the user-adjustable extension settings stored under `settings`

use serde::{Deserialize, Serialize};

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const CAT_API_URL: &str = "https://api.thecatapi.com/v1/images/search";
pub const GITHUB_NOTIFICATIONS_URL: &str = "https://api.github.com/notifications";
pub const YOUTUBE_OEMBED_URL: &str = "https://www.youtube.com/oembed";
/// Item page fetched by the background worker; EUC-KR encoded
pub const STOCK_PAGE_URL: &str = "https://finance.naver.com/item/main.naver";
pub const STOCK_CHART_URL: &str = "https://ssl.pstatic.net/imgfinance/chart/mobile/mini";

pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300x200?text=No+Image";
pub const PLACEHOLDER_VIDEO_URL: &str =
    "https://via.placeholder.com/300x160/000000/FFFFFF?text=YouTube+Video";

/// Shown when no video id has been saved yet
pub const DEFAULT_VIDEO_ID: &str = "jNQXAC9IVRw";

/// Notifications shown at most
pub const MAX_NOTIFICATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
    Auto,
}

impl Theme {
    pub fn class(self) -> &'static str {
        match self {
            Theme::Light => "theme-light",
            Theme::Dark => "theme-dark",
            Theme::Auto => "theme-auto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Default for Coordinates {
    // Seoul City Hall
    fn default() -> Self {
        Coordinates {
            lat: 37.5665,
            lon: 126.9780,
        }
    }
}

/// Stock tracked by the stocks widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSymbol {
    pub code: String,
    pub name: String,
}

impl Default for StockSymbol {
    fn default() -> Self {
        StockSymbol {
            code: "035720".to_string(),
            name: "Kakao".to_string(),
        }
    }
}

/// General extension settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtensionSettings {
    pub theme: Theme,
    pub stock: StockSymbol,
    /// Used when geolocation is unavailable or denied
    pub fallback_location: Coordinates,
    /// Quiet period before a memo or todo edit is written
    pub autosave_delay_ms: u32,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        ExtensionSettings {
            theme: Theme::default(),
            stock: StockSymbol::default(),
            fallback_location: Coordinates::default(),
            autosave_delay_ms: 800,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: ExtensionSettings = serde_json::from_value(json!({
            "theme": "light",
            "autosaveDelayMs": 1500
        }))
        .unwrap();

        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.autosave_delay_ms, 1500);
        assert_eq!(settings.stock.code, "035720");
        assert_eq!(settings.fallback_location, Coordinates::default());
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let value = serde_json::to_value(ExtensionSettings::default()).unwrap();

        assert_eq!(value["theme"], json!("dark"));
        assert_eq!(value["fallbackLocation"]["lat"], json!(37.5665));
        assert!(value.get("autosaveDelayMs").is_some());
    }
}
