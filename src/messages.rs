//! Messages exchanged between the side panel, content scripts and the
//! background worker over `chrome.runtime`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    Youtube,
    Spotify,
    Soundcloud,
    Other,
}

impl MediaSource {
    /// Classify a page by its hostname
    pub fn detect(hostname: &str) -> MediaSource {
        let hostname = hostname.to_lowercase();
        if hostname.contains("youtube") {
            MediaSource::Youtube
        } else if hostname.contains("spotify") {
            MediaSource::Spotify
        } else if hostname.contains("soundcloud") {
            MediaSource::Soundcloud
        } else {
            MediaSource::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
}

/// Media-session action forwarded from a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaAction {
    Play,
    Pause,
    NextTrack,
    PreviousTrack,
}

/// Media currently playing in some tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMedia {
    pub tab_id: i32,
    pub url: String,
    pub title: String,
    pub source: MediaSource,
    pub media_type: MediaType,
    pub is_playing: bool,
    /// Milliseconds since the epoch
    pub timestamp: f64,
}

/// The tab a message came from (`sender.tab`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderTab {
    pub id: i32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum RuntimeMessage {
    /// Ask the background worker for the stock page, bypassing CORS
    FetchStocks { code: String },
    /// Sent to a tab: enter or leave picture-in-picture
    TogglePip,
    MediaPlaying {
        /// Omitted by the content script; detected from the tab URL
        #[serde(default)]
        source: Option<MediaSource>,
        media_type: MediaType,
        #[serde(default)]
        url: Option<String>,
    },
    MediaPaused {
        #[serde(default)]
        media_type: Option<MediaType>,
    },
    MediaSessionAction { action: MediaAction },
    MediaControl { action: MediaAction, tab_id: i32 },
    GetActiveMedia,
    ActiveMedia { media: Option<ActiveMedia> },
    ActiveMediaUpdated { media: Option<ActiveMedia> },
    ActiveMediaCleared,
}

/// Reply passed to `sendResponse`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub fn html(html: String) -> Self {
        RelayResponse {
            success: true,
            html: Some(html),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        RelayResponse {
            success: false,
            html: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_stocks_shape() {
        let value = serde_json::to_value(RuntimeMessage::FetchStocks {
            code: "035720".to_string(),
        })
        .unwrap();

        assert_eq!(value, json!({"type": "FETCH_STOCKS", "code": "035720"}));
    }

    #[test]
    fn test_unit_messages() {
        assert_eq!(
            serde_json::to_value(RuntimeMessage::TogglePip).unwrap(),
            json!({"type": "TOGGLE_PIP"})
        );
        let msg: RuntimeMessage = serde_json::from_value(json!({"type": "GET_ACTIVE_MEDIA"})).unwrap();
        assert_eq!(msg, RuntimeMessage::GetActiveMedia);
    }

    #[test]
    fn test_media_playing_from_content_script() {
        let msg: RuntimeMessage = serde_json::from_value(json!({
            "type": "MEDIA_PLAYING",
            "mediaType": "video",
            "source": "youtube",
            "url": "blob:https://www.youtube.com/abc"
        }))
        .unwrap();

        assert_eq!(
            msg,
            RuntimeMessage::MediaPlaying {
                source: Some(MediaSource::Youtube),
                media_type: MediaType::Video,
                url: Some("blob:https://www.youtube.com/abc".to_string()),
            }
        );
    }

    #[test]
    fn test_session_action_names() {
        let msg: RuntimeMessage = serde_json::from_value(json!({
            "type": "MEDIA_SESSION_ACTION",
            "action": "nexttrack"
        }))
        .unwrap();

        assert_eq!(
            msg,
            RuntimeMessage::MediaSessionAction {
                action: MediaAction::NextTrack
            }
        );
    }

    #[test]
    fn test_relay_response_omits_empty_fields() {
        assert_eq!(
            serde_json::to_value(RelayResponse::html("<p>".to_string())).unwrap(),
            json!({"success": true, "html": "<p>"})
        );
        assert_eq!(
            serde_json::to_value(RelayResponse::failed("timeout")).unwrap(),
            json!({"success": false, "error": "timeout"})
        );
    }

    #[test]
    fn test_detect_source() {
        assert_eq!(MediaSource::detect("www.YouTube.com"), MediaSource::Youtube);
        assert_eq!(MediaSource::detect("open.spotify.com"), MediaSource::Spotify);
        assert_eq!(MediaSource::detect("example.org"), MediaSource::Other);
    }
}
