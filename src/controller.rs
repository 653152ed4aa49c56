//! State behind the settings panel: which widgets are on, and in what order.
//!
//! Every mutation updates the in-memory state first and then persists it.
//! Persistence failures are logged and otherwise ignored. The feed is built
//! from the in-memory state, so it always matches the panel.

use crate::config::ExtensionSettings;
use crate::feed::{FeedError, FeedItem, WidgetSource, load_feed};
use crate::storage::{KeyValueStore, SettingsStore, SidebarSnapshot, StoreError};
use crate::widget::{Direction, WidgetKey, WidgetOrder, WidgetSettings};
use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SidebarState {
    pub settings: ExtensionSettings,
    pub widgets: WidgetSettings,
    pub order: WidgetOrder,
}

impl From<SidebarSnapshot> for SidebarState {
    fn from(snapshot: SidebarSnapshot) -> Self {
        SidebarState {
            settings: snapshot.settings,
            widgets: snapshot.widgets,
            order: snapshot.order,
        }
    }
}

/// One row of the settings panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRow {
    pub key: WidgetKey,
    pub label: &'static str,
    pub enabled: bool,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

pub struct SettingsController<S> {
    store: SettingsStore<S>,
    state: RefCell<SidebarState>,
}

impl<S: KeyValueStore> SettingsController<S> {
    pub fn new(store: SettingsStore<S>) -> Self {
        SettingsController {
            store,
            state: RefCell::new(SidebarState::default()),
        }
    }

    pub fn store(&self) -> &SettingsStore<S> {
        &self.store
    }

    pub fn state(&self) -> SidebarState {
        self.state.borrow().clone()
    }

    /// Read everything from the store. On first run the default order is
    /// written back so later reads see a stored order.
    pub async fn load(&self) -> Result<SidebarState, StoreError> {
        let snapshot = self.store.load_sidebar().await?;
        if !snapshot.order_stored {
            if let Err(e) = self.store.save_widget_order(&snapshot.order).await {
                log::warn!("[Widget] Failed to store initial widget order: {}", e);
            }
        }

        let state = SidebarState::from(snapshot);
        *self.state.borrow_mut() = state.clone();
        log::info!("[Widget] Loaded {} widgets", state.order.keys().len());
        Ok(state)
    }

    /// Run the aggregator over the current order and enablement
    pub async fn feed<W: WidgetSource>(&self, source: &W) -> Vec<FeedItem> {
        let SidebarState { widgets, order, .. } = self.state();
        load_feed(source, &order, &widgets).await
    }

    /// Re-read persisted state, then build the feed from it
    pub async fn refresh<W: WidgetSource>(&self, source: &W) -> Result<Vec<FeedItem>, FeedError> {
        self.load().await?;
        Ok(self.feed(source).await)
    }

    pub fn controls(&self) -> Vec<ControlRow> {
        let state = self.state.borrow();
        state
            .order
            .keys()
            .iter()
            .map(|&key| ControlRow {
                key,
                label: key.label(),
                enabled: state.widgets.is_enabled(key),
                can_move_up: !state.order.is_first(key),
                can_move_down: !state.order.is_last(key),
            })
            .collect()
    }

    /// Flip a widget on or off and persist. Returns the new enabled state.
    pub async fn toggle(&self, key: WidgetKey) -> bool {
        let (enabled, widgets) = {
            let mut state = self.state.borrow_mut();
            let enabled = state.widgets.toggle(key);
            (enabled, state.widgets.clone())
        };

        log::info!("[Widget] {} {}", key, if enabled { "enabled" } else { "disabled" });
        if let Err(e) = self.store.save_widget_settings(&widgets).await {
            log::warn!("[Widget] Failed to save widget settings: {}", e);
        }
        enabled
    }

    /// Move a widget one slot. Moves past either end are refused without
    /// touching the store. Returns whether anything moved.
    pub async fn move_widget(&self, key: WidgetKey, direction: Direction) -> bool {
        let order = {
            let mut state = self.state.borrow_mut();
            if !state.order.move_key(key, direction) {
                return false;
            }
            state.order.clone()
        };

        if let Err(e) = self.store.save_widget_order(&order).await {
            log::warn!("[Widget] Failed to save widget order: {}", e);
        }
        true
    }

    pub async fn save_settings(&self, settings: ExtensionSettings) {
        self.state.borrow_mut().settings = settings.clone();
        if let Err(e) = self.store.save_extension_settings(&settings).await {
            log::warn!("[Widget] Failed to save settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::storage::MemoryStore;
    use crate::storage::keys;
    use futures::executor::block_on;
    use serde_json::{Value, json};

    /// One message item per fetched widget
    struct EchoSource;

    impl WidgetSource for EchoSource {
        async fn fetch(&self, key: WidgetKey) -> Vec<FeedItem> {
            vec![FeedItem::Message {
                id: key.to_string(),
                icon: String::new(),
                text: String::new(),
                sender: String::new(),
            }]
        }
    }

    fn feed_ids(items: &[FeedItem]) -> Vec<&str> {
        items.iter().map(FeedItem::id).collect()
    }

    fn create_test_controller(entries: Value) -> SettingsController<MemoryStore> {
        let map = entries.as_object().cloned().unwrap_or_default();
        SettingsController::new(SettingsStore::new(MemoryStore::with_entries(map)))
    }

    fn writes(controller: &SettingsController<MemoryStore>) -> usize {
        controller.store().inner().writes()
    }

    #[test]
    fn test_first_load_persists_default_order() {
        let controller = create_test_controller(json!({}));

        let state = block_on(controller.load()).unwrap();

        assert_eq!(state.order, WidgetOrder::default());
        assert_eq!(writes(&controller), 1);
        assert_eq!(
            controller.store().inner().raw(keys::WIDGET_ORDER),
            Some(json!([
                "notifications",
                "weather",
                "stocks",
                "videos",
                "images",
                "messages",
                "memo",
                "todo"
            ]))
        );
    }

    #[test]
    fn test_stored_order_is_not_rewritten() {
        let controller = create_test_controller(json!({"widgetOrder": ["todo", "memo"]}));

        let state = block_on(controller.load()).unwrap();

        assert_eq!(state.order.keys()[..2], [WidgetKey::Todo, WidgetKey::Memo]);
        assert_eq!(writes(&controller), 0);
    }

    #[test]
    fn test_controls_follow_order_and_bounds() {
        let controller = create_test_controller(json!({
            "widgetOrder": ["memo"],
            "widgetSettings": {"memo": false}
        }));
        block_on(controller.load()).unwrap();

        let rows = controller.controls();

        assert_eq!(rows.len(), WidgetKey::ALL.len());
        assert_eq!(
            rows[0],
            ControlRow {
                key: WidgetKey::Memo,
                label: WidgetKey::Memo.label(),
                enabled: false,
                can_move_up: false,
                can_move_down: true,
            }
        );
        assert!(rows[1].enabled);
        let last = rows.last().unwrap();
        assert!(last.can_move_up);
        assert!(!last.can_move_down);
    }

    #[test]
    fn test_toggle_persists() {
        let controller = create_test_controller(json!({"widgetOrder": []}));
        block_on(controller.load()).unwrap();

        assert!(!block_on(controller.toggle(WidgetKey::Weather)));

        let stored = controller.store().inner().raw(keys::WIDGET_SETTINGS).unwrap();
        assert_eq!(stored["weather"], json!(false));
        assert_eq!(stored["stocks"], json!(true));
        assert!(!controller.state().widgets.is_enabled(WidgetKey::Weather));
    }

    #[test]
    fn test_move_persists_new_order() {
        let controller = create_test_controller(json!({"widgetOrder": []}));
        block_on(controller.load()).unwrap();

        assert!(block_on(controller.move_widget(WidgetKey::Weather, Direction::Up)));

        assert_eq!(writes(&controller), 1);
        let stored = controller.store().inner().raw(keys::WIDGET_ORDER).unwrap();
        assert_eq!(stored[0], json!("weather"));
        assert_eq!(stored[1], json!("notifications"));
        assert!(!controller.controls()[0].can_move_up);
    }

    #[test]
    fn test_boundary_moves_do_not_write() {
        let controller = create_test_controller(json!({"widgetOrder": []}));
        block_on(controller.load()).unwrap();
        let before = controller.state();

        assert!(!block_on(controller.move_widget(WidgetKey::Notifications, Direction::Up)));
        assert!(!block_on(controller.move_widget(WidgetKey::Todo, Direction::Down)));

        assert_eq!(writes(&controller), 0);
        assert_eq!(controller.state(), before);
    }

    #[test]
    fn test_failed_write_keeps_local_state() {
        let controller = create_test_controller(json!({"widgetOrder": []}));
        block_on(controller.load()).unwrap();
        controller.store().inner().fail_writes(true);

        assert!(block_on(controller.move_widget(WidgetKey::Todo, Direction::Up)));

        assert_eq!(controller.state().order.position(WidgetKey::Todo), Some(6));
    }

    #[test]
    fn test_feed_follows_state_when_writes_fail() {
        let controller = create_test_controller(json!({"widgetOrder": []}));
        block_on(controller.load()).unwrap();
        controller.store().inner().fail_writes(true);

        block_on(controller.toggle(WidgetKey::Weather));
        block_on(controller.move_widget(WidgetKey::Todo, Direction::Up));

        let rows = controller.controls();
        let weather = rows.iter().find(|row| row.key == WidgetKey::Weather).unwrap();
        assert!(!weather.enabled);
        let items = block_on(controller.feed(&EchoSource));
        assert_eq!(
            feed_ids(&items),
            vec!["notifications", "stocks", "videos", "images", "messages", "todo", "memo"]
        );
    }

    #[test]
    fn test_refresh_reads_persisted_state() {
        let controller = create_test_controller(json!({
            "widgetOrder": ["memo", "todo"],
            "widgetSettings": {
                "notifications": false, "weather": false, "stocks": false,
                "videos": false, "images": false, "messages": false
            }
        }));

        let items = block_on(controller.refresh(&EchoSource)).unwrap();

        assert_eq!(feed_ids(&items), vec!["memo", "todo"]);
    }

    #[test]
    fn test_refresh_reports_unreadable_store() {
        let controller = create_test_controller(json!({}));
        controller.store().inner().fail_reads(true);

        assert!(matches!(
            block_on(controller.refresh(&EchoSource)),
            Err(FeedError::State(_))
        ));
    }

    #[test]
    fn test_save_settings() {
        let controller = create_test_controller(json!({}));
        let settings = ExtensionSettings {
            theme: Theme::Light,
            ..ExtensionSettings::default()
        };

        block_on(controller.save_settings(settings.clone()));

        assert_eq!(controller.state().settings, settings);
        assert_eq!(
            block_on(controller.store().extension_settings()).unwrap(),
            settings
        );
    }
}
