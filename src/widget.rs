//! Widget keys, enablement and ordering

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One feed-contributing widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKey {
    Notifications,
    Weather,
    Stocks,
    Videos,
    Images,
    Messages,
    Memo,
    Todo,
}

impl WidgetKey {
    /// Every key, in default feed order
    pub const ALL: [WidgetKey; 8] = [
        WidgetKey::Notifications,
        WidgetKey::Weather,
        WidgetKey::Stocks,
        WidgetKey::Videos,
        WidgetKey::Images,
        WidgetKey::Messages,
        WidgetKey::Memo,
        WidgetKey::Todo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKey::Notifications => "notifications",
            WidgetKey::Weather => "weather",
            WidgetKey::Stocks => "stocks",
            WidgetKey::Videos => "videos",
            WidgetKey::Images => "images",
            WidgetKey::Messages => "messages",
            WidgetKey::Memo => "memo",
            WidgetKey::Todo => "todo",
        }
    }

    pub fn parse(s: &str) -> Option<WidgetKey> {
        WidgetKey::ALL.iter().copied().find(|key| key.as_str() == s)
    }

    /// Label shown in the settings panel
    pub fn label(self) -> &'static str {
        match self {
            WidgetKey::Notifications => "📬 Notifications",
            WidgetKey::Weather => "🌤️ Weather",
            WidgetKey::Stocks => "📈 Stocks",
            WidgetKey::Videos => "▶️ Videos",
            WidgetKey::Images => "🖼️ Images",
            WidgetKey::Messages => "💬 Messages",
            WidgetKey::Memo => "📝 Memo",
            WidgetKey::Todo => "✅ Todo",
        }
    }
}

impl fmt::Display for WidgetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enabled state per widget.
///
/// A key with no stored value is enabled. Every read goes through
/// [`WidgetSettings::is_enabled`] so the rule holds everywhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, bool>")]
pub struct WidgetSettings {
    enabled: BTreeMap<WidgetKey, bool>,
}

impl WidgetSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, key: WidgetKey) -> bool {
        self.enabled.get(&key).copied().unwrap_or(true)
    }

    pub fn set_enabled(&mut self, key: WidgetKey, enabled: bool) {
        self.enabled.insert(key, enabled);
    }

    /// Flip a key and return its new state
    pub fn toggle(&mut self, key: WidgetKey) -> bool {
        let next = !self.is_enabled(key);
        self.set_enabled(key, next);
        next
    }
}

impl PartialEq for WidgetSettings {
    fn eq(&self, other: &Self) -> bool {
        WidgetKey::ALL
            .iter()
            .all(|&key| self.is_enabled(key) == other.is_enabled(key))
    }
}

impl Eq for WidgetSettings {}

impl From<BTreeMap<String, Value>> for WidgetSettings {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let enabled = raw
            .into_iter()
            .filter_map(|(name, value)| Some((WidgetKey::parse(&name)?, value.as_bool()?)))
            .collect();
        WidgetSettings { enabled }
    }
}

impl From<WidgetSettings> for BTreeMap<String, bool> {
    fn from(settings: WidgetSettings) -> Self {
        WidgetKey::ALL
            .iter()
            .map(|&key| (key.as_str().to_string(), settings.is_enabled(key)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Feed order: always a permutation of [`WidgetKey::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Vec<WidgetKey>")]
pub struct WidgetOrder(Vec<WidgetKey>);

impl WidgetOrder {
    /// Build an order from stored JSON.
    ///
    /// Keeps the first occurrence of each recognised key, drops unknown and
    /// duplicate entries, then appends missing keys in default order.
    /// Anything that is not an array yields the default order.
    pub fn normalize(raw: &Value) -> WidgetOrder {
        let keys = raw
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().and_then(WidgetKey::parse))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        WidgetOrder::from_keys(&keys)
    }

    pub fn from_keys(keys: &[WidgetKey]) -> WidgetOrder {
        let mut order = Vec::with_capacity(WidgetKey::ALL.len());
        for &key in keys.iter().chain(WidgetKey::ALL.iter()) {
            if !order.contains(&key) {
                order.push(key);
            }
        }
        WidgetOrder(order)
    }

    pub fn keys(&self) -> &[WidgetKey] {
        &self.0
    }

    pub fn position(&self, key: WidgetKey) -> Option<usize> {
        self.0.iter().position(|&k| k == key)
    }

    pub fn is_first(&self, key: WidgetKey) -> bool {
        self.position(key) == Some(0)
    }

    pub fn is_last(&self, key: WidgetKey) -> bool {
        self.position(key) == Some(self.0.len() - 1)
    }

    /// Swap `key` with its neighbour. Returns false, leaving the order
    /// untouched, when the move would leave the list.
    pub fn move_key(&mut self, key: WidgetKey, direction: Direction) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&i| i < self.0.len()),
        };
        match target {
            Some(target) => {
                self.0.swap(index, target);
                true
            }
            None => false,
        }
    }
}

impl Default for WidgetOrder {
    fn default() -> Self {
        WidgetOrder(WidgetKey::ALL.to_vec())
    }
}

impl From<Value> for WidgetOrder {
    fn from(raw: Value) -> Self {
        WidgetOrder::normalize(&raw)
    }
}

impl From<WidgetOrder> for Vec<WidgetKey> {
    fn from(order: WidgetOrder) -> Self {
        order.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_drops_unknown_and_duplicates() {
        let order = WidgetOrder::normalize(&json!(["stocks", "clock", "weather", "stocks", 7]));

        assert_eq!(order.keys()[0], WidgetKey::Stocks);
        assert_eq!(order.keys()[1], WidgetKey::Weather);
        assert_eq!(order.keys()[2], WidgetKey::Notifications);
        assert_eq!(order.keys().len(), WidgetKey::ALL.len());
    }

    #[test]
    fn test_normalize_appends_missing_in_default_order() {
        let order = WidgetOrder::normalize(&json!(["todo", "memo"]));

        assert_eq!(
            order.keys(),
            &[
                WidgetKey::Todo,
                WidgetKey::Memo,
                WidgetKey::Notifications,
                WidgetKey::Weather,
                WidgetKey::Stocks,
                WidgetKey::Videos,
                WidgetKey::Images,
                WidgetKey::Messages,
            ]
        );
    }

    #[test]
    fn test_normalize_non_array_is_default() {
        assert_eq!(WidgetOrder::normalize(&json!(null)), WidgetOrder::default());
        assert_eq!(WidgetOrder::normalize(&json!({"weather": 1})), WidgetOrder::default());
    }

    #[test]
    fn test_normalize_is_a_permutation_and_idempotent() {
        let inputs = vec![
            json!([]),
            json!(["images", "images", "images"]),
            json!(["bogus", "todo", "weather", "todo", "notifications"]),
            json!(["todo", "memo", "messages", "images", "videos", "stocks", "weather", "notifications"]),
            json!("weather"),
        ];

        for input in inputs {
            let once = WidgetOrder::normalize(&input);
            let mut sorted = once.keys().to_vec();
            sorted.sort();
            let mut all = WidgetKey::ALL.to_vec();
            all.sort();
            assert_eq!(sorted, all, "not a permutation for {}", input);

            let twice = WidgetOrder::normalize(&serde_json::to_value(&once).unwrap());
            assert_eq!(once, twice, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_move_up_at_top_is_noop() {
        let mut order = WidgetOrder::default();

        assert!(!order.move_key(WidgetKey::Notifications, Direction::Up));
        assert_eq!(order, WidgetOrder::default());
    }

    #[test]
    fn test_move_down_at_bottom_is_noop() {
        let mut order = WidgetOrder::default();

        assert!(!order.move_key(WidgetKey::Todo, Direction::Down));
        assert_eq!(order, WidgetOrder::default());
    }

    #[test]
    fn test_move_swaps_neighbours() {
        let mut order = WidgetOrder::default();

        assert!(order.move_key(WidgetKey::Weather, Direction::Up));
        assert_eq!(order.keys()[0], WidgetKey::Weather);
        assert_eq!(order.keys()[1], WidgetKey::Notifications);

        assert!(order.move_key(WidgetKey::Weather, Direction::Down));
        assert_eq!(order, WidgetOrder::default());
    }

    #[test]
    fn test_absent_settings_are_enabled() {
        let settings: WidgetSettings = serde_json::from_value(json!({
            "stocks": false,
            "weather": "yes",
            "clock": false
        }))
        .unwrap();

        assert!(!settings.is_enabled(WidgetKey::Stocks));
        assert!(settings.is_enabled(WidgetKey::Weather));
        assert!(settings.is_enabled(WidgetKey::Todo));
    }

    #[test]
    fn test_settings_serialize_every_key() {
        let mut settings = WidgetSettings::new();
        settings.set_enabled(WidgetKey::Images, false);

        let value = serde_json::to_value(&settings).unwrap();

        assert_eq!(value["images"], json!(false));
        assert_eq!(value["memo"], json!(true));
        assert_eq!(value.as_object().unwrap().len(), WidgetKey::ALL.len());
    }

    #[test]
    fn test_toggle_flips_default() {
        let mut settings = WidgetSettings::new();

        assert!(!settings.toggle(WidgetKey::Memo));
        assert!(settings.toggle(WidgetKey::Memo));
    }
}
