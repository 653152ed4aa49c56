//! Quote extraction from the relayed stock page HTML.
//!
//! Tied to one page layout: the price sits in `.no_today .blind` and the
//! change block `.no_exday` carries `no_up`/`no_down` markers.

use crate::view::Trend;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockQuote {
    pub price: String,
    pub change: String,
    pub trend: Trend,
}

impl StockQuote {
    /// Label like "▲ 700"
    pub fn change_label(&self) -> String {
        format!("{} {}", self.trend.glyph(), self.change)
    }
}

struct Patterns {
    today: Regex,
    exday: Regex,
    blind: Regex,
    amount: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        today: Regex::new(r#"(?s)class="no_today".*?<span class="blind">\s*([^<]*?)\s*</span>"#)
            .expect("today pattern is valid"),
        exday: Regex::new(r#"(?s)class="no_exday"(.*?)</p>"#).expect("exday pattern is valid"),
        blind: Regex::new(r#"<span class="blind">\s*([^<]*?)\s*</span>"#)
            .expect("blind pattern is valid"),
        amount: Regex::new(r"^[0-9,]+$").expect("amount pattern is valid"),
    })
}

/// Pull the current price and change out of the page, if present
pub fn parse_quote(html: &str) -> Option<StockQuote> {
    let p = patterns();
    let price = p.today.captures(html)?.get(1)?.as_str().to_string();
    if price.is_empty() {
        return None;
    }

    let (trend, change) = match p.exday.captures(html).and_then(|c| c.get(1)) {
        Some(block) => {
            let block = block.as_str();
            let trend = if block.contains("no_up") || block.contains("ico_up") {
                Trend::Rise
            } else if block.contains("no_down") || block.contains("ico_down") {
                Trend::Fall
            } else {
                Trend::Flat
            };
            // First purely numeric hidden label is the amount; percentages are skipped
            let change = p
                .blind
                .captures_iter(block)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str())
                .find(|text| p.amount.is_match(text))
                .unwrap_or("0")
                .to_string();
            (trend, change)
        }
        None => (Trend::Flat, "0".to_string()),
    };

    Some(StockQuote {
        price,
        change,
        trend,
    })
}
