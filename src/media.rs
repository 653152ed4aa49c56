//! Active-media tracking done by the background worker

use crate::messages::{ActiveMedia, MediaSource, RuntimeMessage, SenderTab};
use url::Url;

/// Remembers the last tab that started playing and turns page events into
/// broadcasts for the side panel
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MediaTracker {
    active: Option<ActiveMedia>,
}

impl MediaTracker {
    pub fn active(&self) -> Option<&ActiveMedia> {
        self.active.as_ref()
    }

    /// Handle a message from a page or the side panel.
    ///
    /// Returns the message to broadcast (or to reply with, for
    /// `GET_ACTIVE_MEDIA`), if any.
    pub fn handle(
        &mut self,
        message: &RuntimeMessage,
        sender: Option<&SenderTab>,
        now_ms: f64,
    ) -> Option<RuntimeMessage> {
        match message {
            RuntimeMessage::MediaPlaying {
                source, media_type, ..
            } => {
                let Some(tab) = sender else {
                    log::warn!("[Widget] MEDIA_PLAYING without a sender tab");
                    return None;
                };
                let url = tab.url.clone().unwrap_or_default();
                let source = (*source).unwrap_or_else(|| source_of(&url));
                self.active = Some(ActiveMedia {
                    tab_id: tab.id,
                    url,
                    title: tab.title.clone().unwrap_or_default(),
                    source,
                    media_type: *media_type,
                    is_playing: true,
                    timestamp: now_ms,
                });
                log::info!("[Widget] Media playing in tab {}", tab.id);
                Some(self.updated())
            }
            RuntimeMessage::MediaPaused { .. } => {
                if let Some(media) = self.active.as_mut() {
                    media.is_playing = false;
                }
                Some(self.updated())
            }
            RuntimeMessage::MediaSessionAction { action } => {
                self.active.as_ref().map(|media| RuntimeMessage::MediaControl {
                    action: *action,
                    tab_id: media.tab_id,
                })
            }
            RuntimeMessage::GetActiveMedia => Some(RuntimeMessage::ActiveMedia {
                media: self.active.clone(),
            }),
            _ => None,
        }
    }

    /// A tab closed; clears the active media if it lived there
    pub fn tab_removed(&mut self, tab_id: i32) -> Option<RuntimeMessage> {
        if self.active.as_ref().is_some_and(|m| m.tab_id == tab_id) {
            self.active = None;
            Some(RuntimeMessage::ActiveMediaCleared)
        } else {
            None
        }
    }

    fn updated(&self) -> RuntimeMessage {
        RuntimeMessage::ActiveMediaUpdated {
            media: self.active.clone(),
        }
    }
}

fn source_of(page_url: &str) -> MediaSource {
    Url::parse(page_url)
        .ok()
        .and_then(|url| url.host_str().map(MediaSource::detect))
        .unwrap_or(MediaSource::Other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{MediaAction, MediaSource, MediaType};

    fn create_test_tab(id: i32) -> SenderTab {
        SenderTab {
            id,
            url: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()),
            title: Some("Video".to_string()),
        }
    }

    fn playing() -> RuntimeMessage {
        RuntimeMessage::MediaPlaying {
            source: Some(MediaSource::Youtube),
            media_type: MediaType::Video,
            url: None,
        }
    }

    #[test]
    fn test_playing_records_sender() {
        let mut tracker = MediaTracker::default();

        let broadcast = tracker.handle(&playing(), Some(&create_test_tab(7)), 1000.0);

        let media = tracker.active().unwrap();
        assert_eq!(media.tab_id, 7);
        assert!(media.is_playing);
        assert_eq!(media.title, "Video");
        assert_eq!(
            broadcast,
            Some(RuntimeMessage::ActiveMediaUpdated {
                media: Some(media.clone())
            })
        );
    }

    #[test]
    fn test_source_detected_from_sender_url() {
        let mut tracker = MediaTracker::default();
        let message = RuntimeMessage::MediaPlaying {
            source: None,
            media_type: MediaType::Audio,
            url: None,
        };
        let tab = SenderTab {
            id: 2,
            url: Some("https://open.spotify.com/track/abc".to_string()),
            title: None,
        };

        tracker.handle(&message, Some(&tab), 0.0);
        assert_eq!(tracker.active().unwrap().source, MediaSource::Spotify);

        tracker.handle(&message, Some(&SenderTab { url: None, ..tab }), 0.0);
        assert_eq!(tracker.active().unwrap().source, MediaSource::Other);
    }

    #[test]
    fn test_playing_without_tab_is_ignored() {
        let mut tracker = MediaTracker::default();

        assert_eq!(tracker.handle(&playing(), None, 0.0), None);
        assert!(tracker.active().is_none());
    }

    #[test]
    fn test_pause_keeps_media_but_stops_it() {
        let mut tracker = MediaTracker::default();
        tracker.handle(&playing(), Some(&create_test_tab(3)), 0.0);

        tracker.handle(&RuntimeMessage::MediaPaused { media_type: None }, None, 0.0);

        assert!(!tracker.active().unwrap().is_playing);
    }

    #[test]
    fn test_session_action_targets_active_tab() {
        let mut tracker = MediaTracker::default();
        let action = RuntimeMessage::MediaSessionAction {
            action: MediaAction::Pause,
        };
        assert_eq!(tracker.handle(&action, None, 0.0), None);

        tracker.handle(&playing(), Some(&create_test_tab(4)), 0.0);

        assert_eq!(
            tracker.handle(&action, None, 0.0),
            Some(RuntimeMessage::MediaControl {
                action: MediaAction::Pause,
                tab_id: 4
            })
        );
    }

    #[test]
    fn test_closing_active_tab_clears() {
        let mut tracker = MediaTracker::default();
        tracker.handle(&playing(), Some(&create_test_tab(5)), 0.0);

        assert_eq!(tracker.tab_removed(6), None);
        assert_eq!(tracker.tab_removed(5), Some(RuntimeMessage::ActiveMediaCleared));
        assert_eq!(
            tracker.handle(&RuntimeMessage::GetActiveMedia, None, 0.0),
            Some(RuntimeMessage::ActiveMedia { media: None })
        );
    }
}
