//! One data fetcher per widget.
//!
//! Fetchers are fail-soft: anything that goes wrong inside one is logged and
//! replaced by that widget's fallback card, so a broken API can never abort
//! the feed.

use crate::config::{
    CAT_API_URL, Coordinates, DEFAULT_VIDEO_ID, ExtensionSettings, GITHUB_NOTIFICATIONS_URL,
    MAX_NOTIFICATIONS, OPEN_METEO_URL, PLACEHOLDER_IMAGE_URL, PLACEHOLDER_VIDEO_URL,
    STOCK_CHART_URL,
};
use crate::feed::{FeedItem, WidgetSource};
use crate::messages::{RelayResponse, RuntimeMessage};
use crate::scrape;
use crate::storage::{KeyValueStore, SettingsStore, StoreError};
use crate::video;
use crate::view::Trend;
use crate::widget::WidgetKey;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("background relay failed: {0}")]
    Relay(String),
    #[error("geolocation unavailable: {0}")]
    Location(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Capabilities the fetchers need from the host
#[allow(async_fn_in_trait)]
pub trait Environment {
    type Store: KeyValueStore;

    fn settings(&self) -> &SettingsStore<Self::Store>;

    /// GET a JSON document, optionally with a bearer token
    async fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<Value, FetchError>;

    async fn current_position(&self) -> Result<Coordinates, FetchError>;

    /// Send a message to the background worker and wait for its reply
    async fn relay(&self, message: &RuntimeMessage) -> Result<RelayResponse, FetchError>;

    fn now(&self) -> DateTime<Utc>;
}

/// The real widget set, backed by an [`Environment`]
pub struct Widgets<E> {
    env: E,
}

impl<E: Environment> WidgetSource for Widgets<E> {
    async fn fetch(&self, key: WidgetKey) -> Vec<FeedItem> {
        match key {
            WidgetKey::Notifications => {
                fail_soft(key, self.notifications(), notifications_fallback).await
            }
            WidgetKey::Weather => fail_soft(key, self.weather(), weather_fallback).await,
            WidgetKey::Stocks => {
                let settings = self.extension_settings().await;
                let name = settings.stock.name.clone();
                fail_soft(key, self.stocks(&settings), || stock_fallback(&name)).await
            }
            WidgetKey::Videos => {
                let video_id = self.video_id().await;
                fail_soft(key, self.videos(&video_id), || video_fallback(&video_id)).await
            }
            WidgetKey::Images => fail_soft(key, self.images(), image_fallback).await,
            WidgetKey::Messages => messages(),
            WidgetKey::Memo => fail_soft(key, self.memo(), || vec![memo_item(String::new())]).await,
            WidgetKey::Todo => fail_soft(key, self.todos(), || vec![todo_item(Vec::new())]).await,
        }
    }
}

async fn fail_soft<F, G>(key: WidgetKey, fetch: F, fallback: G) -> Vec<FeedItem>
where
    F: Future<Output = Result<Vec<FeedItem>, FetchError>>,
    G: FnOnce() -> Vec<FeedItem>,
{
    match fetch.await {
        Ok(items) => items,
        Err(e) => {
            log::warn!("[Widget] {} widget failed: {}", key, e);
            fallback()
        }
    }
}

#[derive(Deserialize)]
struct GithubNotification {
    id: String,
    repository: GithubRepository,
    subject: GithubSubject,
    updated_at: String,
}

#[derive(Deserialize)]
struct GithubRepository {
    full_name: String,
}

#[derive(Deserialize)]
struct GithubSubject {
    title: String,
}

#[derive(Deserialize)]
struct OpenMeteo {
    current: OpenMeteoCurrent,
    #[serde(default)]
    daily: Option<OpenMeteoDaily>,
}

#[derive(Deserialize)]
struct OpenMeteoCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: i64,
}

#[derive(Deserialize)]
struct OpenMeteoDaily {
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

#[derive(Deserialize)]
struct OEmbed {
    title: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

#[derive(Deserialize)]
struct CatImage {
    url: String,
}

impl<E: Environment> Widgets<E> {
    pub fn new(env: E) -> Self {
        Widgets { env }
    }

    async fn extension_settings(&self) -> ExtensionSettings {
        self.env
            .settings()
            .extension_settings()
            .await
            .unwrap_or_else(|e| {
                log::warn!("[Widget] Using default settings: {}", e);
                ExtensionSettings::default()
            })
    }

    async fn video_id(&self) -> String {
        match self.env.settings().video_id().await {
            Ok(Some(id)) => id,
            Ok(None) => DEFAULT_VIDEO_ID.to_string(),
            Err(e) => {
                log::warn!("[Widget] Using default video: {}", e);
                DEFAULT_VIDEO_ID.to_string()
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, bearer: Option<&str>) -> Result<T, FetchError> {
        let value = self.env.get_json(url, bearer).await?;
        serde_json::from_value(value).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn notifications(&self) -> Result<Vec<FeedItem>, FetchError> {
        let Some(token) = self.env.settings().github_token().await? else {
            return Ok(vec![FeedItem::Notification {
                id: "github-connect".to_string(),
                icon: "🐙".to_string(),
                title: "GitHub".to_string(),
                subtitle: "Add a GitHub token in settings to see notifications".to_string(),
                time: String::new(),
                link: None,
            }]);
        };

        let notifications: Vec<GithubNotification> =
            self.get(GITHUB_NOTIFICATIONS_URL, Some(&token)).await?;
        if notifications.is_empty() {
            return Ok(vec![FeedItem::Notification {
                id: "github-empty".to_string(),
                icon: "🐙".to_string(),
                title: "GitHub".to_string(),
                subtitle: "No new notifications".to_string(),
                time: String::new(),
                link: None,
            }]);
        }

        let now = self.env.now();
        Ok(notifications
            .into_iter()
            .take(MAX_NOTIFICATIONS)
            .map(|n| FeedItem::Notification {
                id: format!("github-{}", n.id),
                icon: "🐙".to_string(),
                title: n.repository.full_name,
                subtitle: n.subject.title,
                time: relative_time(&n.updated_at, now),
                link: Some("https://github.com/notifications".to_string()),
            })
            .collect())
    }

    async fn weather(&self) -> Result<Vec<FeedItem>, FetchError> {
        let position = match self.env.current_position().await {
            Ok(position) => position,
            Err(e) => {
                log::warn!("[Widget] {}; using fallback location", e);
                self.extension_settings().await.fallback_location
            }
        };

        let url = format!(
            "{}?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,weather_code\
             &daily=temperature_2m_max,temperature_2m_min&forecast_days=1&timezone=auto",
            OPEN_METEO_URL, position.lat, position.lon
        );
        let data: OpenMeteo = self.get(&url, None).await?;

        let humidity = format!("Humidity {}%", whole(data.current.relative_humidity_2m));
        let range = data
            .daily
            .and_then(|d| Some((*d.temperature_2m_max.first()?, *d.temperature_2m_min.first()?)))
            .map(|(max, min)| format!("High {}° / Low {}° · {}", whole(max), whole(min), humidity))
            .unwrap_or(humidity);

        Ok(vec![FeedItem::Weather {
            id: "weather".to_string(),
            icon: weather_icon(data.current.weather_code).to_string(),
            title: "Weather here".to_string(),
            temp: format!("{}°C", whole(data.current.temperature_2m)),
            temp_range: range,
        }])
    }

    async fn stocks(&self, settings: &ExtensionSettings) -> Result<Vec<FeedItem>, FetchError> {
        let code = &settings.stock.code;
        let response = self
            .env
            .relay(&RuntimeMessage::FetchStocks { code: code.clone() })
            .await?;
        if !response.success {
            return Err(FetchError::Relay(
                response.error.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }
        let html = response
            .html
            .ok_or_else(|| FetchError::Relay("empty response".to_string()))?;
        let quote = scrape::parse_quote(&html).ok_or_else(|| FetchError::Decode {
            url: format!("stock page {}", code),
            message: "price not found".to_string(),
        })?;

        Ok(vec![FeedItem::Stock {
            id: format!("stock-{}", code),
            icon: if quote.trend == Trend::Fall { "📉" } else { "📈" }.to_string(),
            title: settings.stock.name.clone(),
            price: format!("₩{}", quote.price),
            change: quote.change_label(),
            trend: Some(quote.trend),
            is_pre_market: is_pre_market(self.env.now()),
            chart_url: Some(format!("{}/{}.png", STOCK_CHART_URL, code)),
        }])
    }

    async fn videos(&self, video_id: &str) -> Result<Vec<FeedItem>, FetchError> {
        let embed: OEmbed = self.get(&video::oembed_url(video_id), None).await?;
        Ok(vec![FeedItem::Video {
            id: format!("video-{}", video_id),
            icon: "▶️".to_string(),
            title: embed.title,
            thumbnail: embed
                .thumbnail_url
                .unwrap_or_else(|| video::thumbnail_url(video_id)),
            video_id: Some(video_id.to_string()),
        }])
    }

    async fn images(&self) -> Result<Vec<FeedItem>, FetchError> {
        let images: Vec<CatImage> = self.get(CAT_API_URL, None).await?;
        let image = images.into_iter().next().ok_or_else(|| FetchError::Decode {
            url: CAT_API_URL.to_string(),
            message: "no images returned".to_string(),
        })?;
        Ok(vec![FeedItem::Image {
            id: "random-cat".to_string(),
            icon: "🐱".to_string(),
            image_url: image.url,
        }])
    }

    async fn memo(&self) -> Result<Vec<FeedItem>, FetchError> {
        Ok(vec![memo_item(self.env.settings().memo().await?)])
    }

    async fn todos(&self) -> Result<Vec<FeedItem>, FetchError> {
        Ok(vec![todo_item(self.env.settings().todos().await?)])
    }
}

fn notifications_fallback() -> Vec<FeedItem> {
    vec![FeedItem::Notification {
        id: "github-error".to_string(),
        icon: "⚠️".to_string(),
        title: "GitHub".to_string(),
        subtitle: "Could not load notifications".to_string(),
        time: String::new(),
        link: None,
    }]
}

fn weather_fallback() -> Vec<FeedItem> {
    vec![FeedItem::Weather {
        id: "weather-fallback".to_string(),
        icon: "🌦️".to_string(),
        title: "Weather unavailable".to_string(),
        temp: "-".to_string(),
        temp_range: "Failed to load".to_string(),
    }]
}

fn stock_fallback(name: &str) -> Vec<FeedItem> {
    vec![FeedItem::Stock {
        id: "stock-fail".to_string(),
        icon: "⚠️".to_string(),
        title: name.to_string(),
        price: "-".to_string(),
        change: "Failed to load".to_string(),
        trend: Some(Trend::Unavailable),
        is_pre_market: false,
        chart_url: None,
    }]
}

fn video_fallback(video_id: &str) -> Vec<FeedItem> {
    vec![FeedItem::Video {
        id: "video-fallback".to_string(),
        icon: "▶️".to_string(),
        title: "YouTube video".to_string(),
        thumbnail: PLACEHOLDER_VIDEO_URL.to_string(),
        video_id: Some(video_id.to_string()),
    }]
}

fn image_fallback() -> Vec<FeedItem> {
    vec![FeedItem::Image {
        id: "cat-fail".to_string(),
        icon: "😿".to_string(),
        image_url: PLACEHOLDER_IMAGE_URL.to_string(),
    }]
}

fn messages() -> Vec<FeedItem> {
    vec![FeedItem::Message {
        id: "message".to_string(),
        icon: "💬".to_string(),
        text: "Good morning! Have a great day.".to_string(),
        sender: "Profile".to_string(),
    }]
}

fn memo_item(text: String) -> FeedItem {
    FeedItem::Memo {
        id: "memo".to_string(),
        text,
    }
}

fn todo_item(entries: Vec<crate::todo::TodoEntry>) -> FeedItem {
    FeedItem::Todo {
        id: "todo".to_string(),
        entries,
    }
}

/// Rounded for display; `-0.3` shows as `0`, not `-0`
fn whole(value: f64) -> f64 {
    value.round() + 0.0
}

/// Icon for a WMO weather interpretation code
pub fn weather_icon(code: i64) -> &'static str {
    match code {
        0 => "☀️",
        1..=3 => "⛅",
        4..=48 => "🌫️",
        49..=67 => "🌧️",
        68..=77 => "🌨️",
        78..=82 => "🌧️",
        83..=99 => "⛈️",
        _ => "❓",
    }
}

/// "5m ago" style label for an RFC 3339 timestamp
pub fn relative_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return String::new();
    };
    let elapsed = now.signed_duration_since(then.with_timezone(&Utc));
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

/// Korean market opens at 09:00 KST
pub fn is_pre_market(now: DateTime<Utc>) -> bool {
    FixedOffset::east_opt(9 * 3600).is_some_and(|kst| now.with_timezone(&kst).hour() < 9)
}
