//! Typed view models for feed cards.
//!
//! [`Card`] is what the Yew components in `ui::cards` draw. Converting from a
//! [`FeedItem`] is total: unknown items become [`Card::Hidden`].

use crate::feed::FeedItem;
use crate::todo::TodoEntry;
use crate::video;
use serde::{Deserialize, Serialize};

pub const EMPTY_FEED_TEXT: &str = "No widgets enabled.";
pub const LOAD_FAILED_TEXT: &str = "Something went wrong while loading the feed.";

/// Direction of the latest price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rise,
    Fall,
    Flat,
    /// The quote could not be loaded
    Unavailable,
}

impl Trend {
    /// Read the trend from a change label such as "▲ 700" or "▽500"
    pub fn from_change(change: &str) -> Trend {
        if change.contains('▲') || change.contains('△') {
            Trend::Rise
        } else if change.contains('▼') || change.contains('▽') {
            Trend::Fall
        } else {
            Trend::Flat
        }
    }

    // Korean market convention: red up, blue down
    pub fn color(self) -> &'static str {
        match self {
            Trend::Rise => "#d32f2f",
            Trend::Fall => "#1976d2",
            Trend::Flat => "#333",
            Trend::Unavailable => "#999",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Trend::Rise => "▲",
            Trend::Fall => "▼",
            Trend::Flat => "-",
            Trend::Unavailable => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StockChart {
    /// Market not open yet, no intraday chart
    PreMarket,
    Image(String),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockCard {
    pub icon: String,
    pub title: String,
    pub price: String,
    pub change: String,
    pub trend: Trend,
    /// Computed once and applied to both price and change
    pub style: String,
    pub chart: StockChart,
}

impl StockCard {
    pub fn price_style(&self) -> &str {
        &self.style
    }

    pub fn change_style(&self) -> &str {
        &self.style
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Notification {
        icon: String,
        title: String,
        subtitle: String,
        time: String,
        link: Option<String>,
    },
    Weather {
        icon: String,
        title: String,
        temp: String,
        temp_range: String,
    },
    Stock(StockCard),
    Image {
        icon: String,
        image_url: String,
    },
    Message {
        icon: String,
        text: String,
        sender: String,
    },
    Video {
        icon: String,
        title: String,
        thumbnail: String,
        embed_url: Option<String>,
    },
    Memo {
        text: String,
    },
    Todo {
        entries: Vec<TodoEntry>,
    },
    Hidden,
}

impl From<&FeedItem> for Card {
    fn from(item: &FeedItem) -> Card {
        match item {
            FeedItem::Notification {
                icon,
                title,
                subtitle,
                time,
                link,
                ..
            } => Card::Notification {
                icon: icon.clone(),
                title: title.clone(),
                subtitle: subtitle.clone(),
                time: time.clone(),
                link: link.clone(),
            },
            FeedItem::Weather {
                icon,
                title,
                temp,
                temp_range,
                ..
            } => Card::Weather {
                icon: icon.clone(),
                title: title.clone(),
                temp: temp.clone(),
                temp_range: temp_range.clone(),
            },
            FeedItem::Stock {
                icon,
                title,
                price,
                change,
                trend,
                is_pre_market,
                chart_url,
                ..
            } => {
                let trend = trend.unwrap_or_else(|| Trend::from_change(change));
                let chart = match (is_pre_market, chart_url) {
                    (true, _) => StockChart::PreMarket,
                    (false, Some(url)) if !url.is_empty() => StockChart::Image(url.clone()),
                    _ => StockChart::None,
                };
                Card::Stock(StockCard {
                    icon: icon.clone(),
                    title: title.clone(),
                    price: price.clone(),
                    change: change.clone(),
                    trend,
                    style: format!("color: {}", trend.color()),
                    chart,
                })
            }
            FeedItem::Image {
                icon, image_url, ..
            } => Card::Image {
                icon: icon.clone(),
                image_url: image_url.clone(),
            },
            FeedItem::Message {
                icon, text, sender, ..
            } => Card::Message {
                icon: icon.clone(),
                text: text.clone(),
                sender: sender.clone(),
            },
            FeedItem::Video {
                icon,
                title,
                thumbnail,
                video_id,
                ..
            } => Card::Video {
                icon: icon.clone(),
                title: title.clone(),
                thumbnail: thumbnail.clone(),
                embed_url: video_id.as_deref().map(video::embed_url),
            },
            FeedItem::Memo { text, .. } => Card::Memo { text: text.clone() },
            FeedItem::Todo { entries, .. } => Card::Todo {
                entries: entries.clone(),
            },
            FeedItem::Unknown => Card::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_stock(change: &str, trend: Option<Trend>) -> FeedItem {
        FeedItem::Stock {
            id: "kakao".to_string(),
            icon: "📈".to_string(),
            title: "Kakao".to_string(),
            price: "60,900".to_string(),
            change: change.to_string(),
            trend,
            is_pre_market: false,
            chart_url: Some("https://example.com/chart.png".to_string()),
        }
    }

    #[test]
    fn test_falling_stock_uses_one_color() {
        let card = Card::from(&create_test_stock("▼ 500", None));

        let Card::Stock(stock) = card else {
            panic!("expected a stock card");
        };
        assert_eq!(stock.trend, Trend::Fall);
        assert_eq!(stock.price_style(), stock.change_style());
        assert_eq!(stock.price_style(), "color: #1976d2");
    }

    #[test]
    fn test_rising_stock_with_hollow_arrow() {
        let Card::Stock(stock) = Card::from(&create_test_stock("△700", None)) else {
            panic!("expected a stock card");
        };

        assert_eq!(stock.trend, Trend::Rise);
        assert_eq!(stock.change_style(), "color: #d32f2f");
        assert_eq!(stock.chart, StockChart::Image("https://example.com/chart.png".to_string()));
    }

    #[test]
    fn test_explicit_trend_wins_over_label() {
        let Card::Stock(stock) =
            Card::from(&create_test_stock("Failed to load", Some(Trend::Unavailable)))
        else {
            panic!("expected a stock card");
        };

        assert_eq!(stock.price_style(), "color: #999");
        assert_eq!(stock.price_style(), stock.change_style());
    }

    #[test]
    fn test_pre_market_hides_chart() {
        let mut item = create_test_stock("- 0", None);
        if let FeedItem::Stock { is_pre_market, .. } = &mut item {
            *is_pre_market = true;
        }

        let Card::Stock(stock) = Card::from(&item) else {
            panic!("expected a stock card");
        };
        assert_eq!(stock.chart, StockChart::PreMarket);
        assert_eq!(stock.trend, Trend::Flat);
    }

    #[test]
    fn test_unknown_item_is_hidden() {
        assert_eq!(Card::from(&FeedItem::Unknown), Card::Hidden);
    }

    #[test]
    fn test_video_card_embeds_saved_id() {
        let item = FeedItem::Video {
            id: "video".to_string(),
            icon: "▶️".to_string(),
            title: "Me at the zoo".to_string(),
            thumbnail: "https://i.ytimg.com/vi/jNQXAC9IVRw/hqdefault.jpg".to_string(),
            video_id: Some("jNQXAC9IVRw".to_string()),
        };

        match Card::from(&item) {
            Card::Video { embed_url, .. } => assert_eq!(
                embed_url.as_deref(),
                Some("https://www.youtube.com/embed/jNQXAC9IVRw")
            ),
            other => panic!("unexpected card {:?}", other),
        }
    }

    #[test]
    fn test_image_card_keeps_item_icon() {
        let item = FeedItem::Image {
            id: "cat-fail".to_string(),
            icon: "😿".to_string(),
            image_url: "https://example.com/placeholder.png".to_string(),
        };

        assert_eq!(
            Card::from(&item),
            Card::Image {
                icon: "😿".to_string(),
                image_url: "https://example.com/placeholder.png".to_string(),
            }
        );
    }
}
