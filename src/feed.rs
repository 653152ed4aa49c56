//! Feed items and the aggregator that collects them.
//!
//! Enabled widgets are fetched concurrently and the results are flattened in
//! the persisted widget order, never in completion order. A newer reload
//! does not cancel an older one; whichever finishes last wins the container.

use crate::storage::StoreError;
use crate::todo::TodoEntry;
use crate::view::Trend;
use crate::widget::{WidgetKey, WidgetOrder, WidgetSettings};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One card in the feed. `id` only keys the UI list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum FeedItem {
    Notification {
        id: String,
        icon: String,
        title: String,
        subtitle: String,
        time: String,
        #[serde(default)]
        link: Option<String>,
    },
    Weather {
        id: String,
        icon: String,
        title: String,
        temp: String,
        temp_range: String,
    },
    Stock {
        id: String,
        icon: String,
        title: String,
        price: String,
        change: String,
        #[serde(default)]
        trend: Option<Trend>,
        #[serde(default)]
        is_pre_market: bool,
        #[serde(default)]
        chart_url: Option<String>,
    },
    Image {
        id: String,
        icon: String,
        image_url: String,
    },
    Message {
        id: String,
        icon: String,
        text: String,
        sender: String,
    },
    Video {
        id: String,
        icon: String,
        title: String,
        thumbnail: String,
        #[serde(default)]
        video_id: Option<String>,
    },
    Memo {
        id: String,
        text: String,
    },
    Todo {
        id: String,
        entries: Vec<TodoEntry>,
    },
    /// Any tag this build does not know; renders as nothing
    #[serde(other)]
    Unknown,
}

impl FeedItem {
    pub fn id(&self) -> &str {
        match self {
            FeedItem::Notification { id, .. }
            | FeedItem::Weather { id, .. }
            | FeedItem::Stock { id, .. }
            | FeedItem::Image { id, .. }
            | FeedItem::Message { id, .. }
            | FeedItem::Video { id, .. }
            | FeedItem::Memo { id, .. }
            | FeedItem::Todo { id, .. } => id,
            FeedItem::Unknown => "",
        }
    }

    /// The widget that produces this kind of item
    pub fn widget(&self) -> Option<WidgetKey> {
        match self {
            FeedItem::Notification { .. } => Some(WidgetKey::Notifications),
            FeedItem::Weather { .. } => Some(WidgetKey::Weather),
            FeedItem::Stock { .. } => Some(WidgetKey::Stocks),
            FeedItem::Image { .. } => Some(WidgetKey::Images),
            FeedItem::Message { .. } => Some(WidgetKey::Messages),
            FeedItem::Video { .. } => Some(WidgetKey::Videos),
            FeedItem::Memo { .. } => Some(WidgetKey::Memo),
            FeedItem::Todo { .. } => Some(WidgetKey::Todo),
            FeedItem::Unknown => None,
        }
    }
}

/// Produces the items for one widget.
///
/// Implementations must not fail: errors become fallback items.
#[allow(async_fn_in_trait)]
pub trait WidgetSource {
    async fn fetch(&self, key: WidgetKey) -> Vec<FeedItem>;
}

/// Fan out to every enabled widget, then flatten in `order`.
///
/// Disabled widgets contribute an empty list without being fetched.
pub async fn load_feed<W: WidgetSource>(
    source: &W,
    order: &WidgetOrder,
    widgets: &WidgetSettings,
) -> Vec<FeedItem> {
    let slots = order.keys().iter().map(|&key| {
        let enabled = widgets.is_enabled(key);
        async move {
            if enabled {
                source.fetch(key).await
            } else {
                Vec::new()
            }
        }
    });

    join_all(slots).await.into_iter().flatten().collect()
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read widget state: {0}")]
    State(#[from] StoreError),
}

/// What the feed container shows
#[derive(Debug, Clone, PartialEq)]
pub enum FeedView {
    Loading,
    Ready(Vec<FeedItem>),
    /// Generic placeholder replacing the whole feed
    Failed,
}

impl FeedView {
    pub fn from_result(result: Result<Vec<FeedItem>, FeedError>) -> FeedView {
        match result {
            Ok(items) => FeedView::Ready(items),
            Err(e) => {
                log::error!("[Widget] Error loading feed: {}", e);
                FeedView::Failed
            }
        }
    }

    /// Swap one widget's items for freshly fetched ones, in place.
    ///
    /// Leaves the view alone when the widget has nothing in it, so a refetch
    /// racing a disable cannot bring the widget back.
    pub fn replace_widget(&self, key: WidgetKey, fresh: Vec<FeedItem>) -> FeedView {
        let FeedView::Ready(items) = self else {
            return self.clone();
        };
        let Some(start) = items.iter().position(|item| item.widget() == Some(key)) else {
            return self.clone();
        };

        let mut replaced: Vec<FeedItem> = items[..start].to_vec();
        replaced.extend(fresh);
        replaced.extend(
            items[start..]
                .iter()
                .filter(|item| item.widget() != Some(key))
                .cloned(),
        );
        FeedView::Ready(replaced)
    }
}
