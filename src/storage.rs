//! Key/value persistence for the side panel.
//!
//! The browser backs this with `chrome.storage.sync`; tests use [`MemoryStore`].
//! Nothing here is transactional: each mutation is its own read-modify-write
//! and the last writer wins.

use crate::config::ExtensionSettings;
use crate::todo::{TodoEdit, TodoEntry};
use crate::widget::{WidgetOrder, WidgetSettings};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
#[cfg(test)]
use std::cell::{Cell, RefCell};
use thiserror::Error;

pub mod keys {
    pub const SETTINGS: &str = "settings";
    pub const WIDGET_SETTINGS: &str = "widgetSettings";
    pub const WIDGET_ORDER: &str = "widgetOrder";
    pub const USER_MEMO: &str = "userMemo";
    pub const USER_TODOS: &str = "userTodos";
    pub const USER_VIDEO_ID: &str = "userVideoId";
    pub const GITHUB_TOKEN: &str = "githubToken";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Asynchronous key/value capability
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Fetch the given keys; missing keys are simply absent from the result
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError>;

    async fn set(&self, items: Map<String, Value>) -> Result<(), StoreError>;
}

/// In-memory store that counts writes
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<Map<String, Value>>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
    fail_reads: Cell<bool>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Map<String, Value>) -> Self {
        MemoryStore {
            data: RefCell::new(entries),
            ..Self::default()
        }
    }

    /// Number of successful `set` calls so far
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.data.borrow().get(key).cloned()
    }

    /// Make every later `set` fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Make every later `get` fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        if self.fail_reads.get() {
            return Err(StoreError::Unavailable("read rejected".to_string()));
        }
        let data = self.data.borrow();
        Ok(keys
            .iter()
            .filter_map(|&key| data.get(key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: Map<String, Value>) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        self.data.borrow_mut().extend(items);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Everything the side panel needs at startup
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarSnapshot {
    pub settings: ExtensionSettings,
    pub widgets: WidgetSettings,
    pub order: WidgetOrder,
    /// False on first run, before any order was written
    pub order_stored: bool,
}

/// Typed access to the persisted keys
#[derive(Debug, Clone)]
pub struct SettingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        SettingsStore { store }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &S {
        &self.store
    }

    pub async fn load_sidebar(&self) -> Result<SidebarSnapshot, StoreError> {
        let mut found = self
            .store
            .get(&[keys::SETTINGS, keys::WIDGET_SETTINGS, keys::WIDGET_ORDER])
            .await?;

        let settings = decode(keys::SETTINGS, found.remove(keys::SETTINGS)).unwrap_or_default();
        let widgets =
            decode(keys::WIDGET_SETTINGS, found.remove(keys::WIDGET_SETTINGS)).unwrap_or_default();
        let (order, order_stored) = match found.remove(keys::WIDGET_ORDER) {
            Some(raw) => (WidgetOrder::normalize(&raw), true),
            None => (WidgetOrder::default(), false),
        };

        Ok(SidebarSnapshot {
            settings,
            widgets,
            order,
            order_stored,
        })
    }

    pub async fn extension_settings(&self) -> Result<ExtensionSettings, StoreError> {
        Ok(self.read(keys::SETTINGS).await?.unwrap_or_default())
    }

    pub async fn save_extension_settings(
        &self,
        settings: &ExtensionSettings,
    ) -> Result<(), StoreError> {
        self.write(keys::SETTINGS, settings).await
    }

    pub async fn save_widget_settings(&self, widgets: &WidgetSettings) -> Result<(), StoreError> {
        self.write(keys::WIDGET_SETTINGS, widgets).await
    }

    pub async fn save_widget_order(&self, order: &WidgetOrder) -> Result<(), StoreError> {
        self.write(keys::WIDGET_ORDER, order).await
    }

    pub async fn memo(&self) -> Result<String, StoreError> {
        Ok(self.read(keys::USER_MEMO).await?.unwrap_or_default())
    }

    pub async fn save_memo(&self, text: &str) -> Result<(), StoreError> {
        self.write(keys::USER_MEMO, &text).await
    }

    pub async fn todos(&self) -> Result<Vec<TodoEntry>, StoreError> {
        Ok(self.read(keys::USER_TODOS).await?.unwrap_or_default())
    }

    pub async fn save_todos(&self, todos: &[TodoEntry]) -> Result<(), StoreError> {
        self.write(keys::USER_TODOS, &todos).await
    }

    /// Read the whole list, apply one edit, write the whole list back.
    /// Nothing is written when the edit changes nothing.
    pub async fn apply_todo_edit(&self, edit: &TodoEdit) -> Result<Vec<TodoEntry>, StoreError> {
        let mut todos = self.todos().await?;
        if edit.apply(&mut todos) {
            self.save_todos(&todos).await?;
        }
        Ok(todos)
    }

    pub async fn video_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .read::<String>(keys::USER_VIDEO_ID)
            .await?
            .filter(|id| !id.is_empty()))
    }

    pub async fn save_video_id(&self, video_id: &str) -> Result<(), StoreError> {
        self.write(keys::USER_VIDEO_ID, &video_id).await
    }

    pub async fn github_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .read::<String>(keys::GITHUB_TOKEN)
            .await?
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty()))
    }

    pub async fn save_github_token(&self, token: &str) -> Result<(), StoreError> {
        self.write(keys::GITHUB_TOKEN, &token.trim()).await
    }

    async fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StoreError> {
        let mut found = self.store.get(&[key]).await?;
        Ok(decode(key, found.remove(key)))
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        key: &'static str,
        value: &T,
    ) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(value).map_err(|source| StoreError::Serialize { key, source })?;
        let mut items = Map::new();
        items.insert(key.to_string(), value);
        self.store.set(items).await
    }
}

/// Malformed values are treated as absent
fn decode<T: DeserializeOwned>(key: &str, raw: Option<Value>) -> Option<T> {
    let raw = raw.filter(|v| !v.is_null())?;
    match serde_json::from_value(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("[Widget] Ignoring malformed {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::widget::{WidgetKey, WidgetOrder};
    use futures::executor::block_on;
    use serde_json::json;

    fn create_test_store(entries: Value) -> SettingsStore<MemoryStore> {
        let map = entries.as_object().cloned().unwrap_or_default();
        SettingsStore::new(MemoryStore::with_entries(map))
    }

    #[test]
    fn test_first_run_snapshot() {
        let store = create_test_store(json!({}));

        let snapshot = block_on(store.load_sidebar()).unwrap();

        assert!(!snapshot.order_stored);
        assert_eq!(snapshot.order, WidgetOrder::default());
        assert_eq!(snapshot.widgets, WidgetSettings::new());
        assert_eq!(snapshot.settings, ExtensionSettings::default());
    }

    #[test]
    fn test_snapshot_normalizes_stored_order() {
        let store = create_test_store(json!({
            "widgetOrder": ["todo", "todo", "clock"],
            "widgetSettings": {"weather": false},
            "settings": {"theme": "light"}
        }));

        let snapshot = block_on(store.load_sidebar()).unwrap();

        assert!(snapshot.order_stored);
        assert_eq!(snapshot.order.keys()[0], WidgetKey::Todo);
        assert_eq!(snapshot.order.keys().len(), WidgetKey::ALL.len());
        assert!(!snapshot.widgets.is_enabled(WidgetKey::Weather));
        assert_eq!(snapshot.settings.theme, Theme::Light);
    }

    #[test]
    fn test_malformed_values_fall_back_to_defaults() {
        let store = create_test_store(json!({
            "settings": "garbage",
            "widgetSettings": [1, 2],
            "userTodos": {"not": "a list"}
        }));

        let snapshot = block_on(store.load_sidebar()).unwrap();
        let todos = block_on(store.todos()).unwrap();

        assert_eq!(snapshot.settings, ExtensionSettings::default());
        assert_eq!(snapshot.widgets, WidgetSettings::new());
        assert!(todos.is_empty());
    }

    #[test]
    fn test_settings_round_trip() {
        let store = create_test_store(json!({}));
        let mut widgets = WidgetSettings::new();
        widgets.set_enabled(WidgetKey::Stocks, false);
        widgets.set_enabled(WidgetKey::Memo, false);
        let order = WidgetOrder::from_keys(&[WidgetKey::Memo, WidgetKey::Stocks]);

        block_on(store.save_widget_settings(&widgets)).unwrap();
        block_on(store.save_widget_order(&order)).unwrap();
        let snapshot = block_on(store.load_sidebar()).unwrap();

        assert_eq!(snapshot.widgets, widgets);
        assert_eq!(snapshot.order, order);
        assert_eq!(store.inner().writes(), 2);
    }

    #[test]
    fn test_todo_edit_rewrites_whole_array() {
        let store = create_test_store(json!({
            "userTodos": [{"id": 1, "text": "a", "done": false}]
        }));

        let todos = block_on(store.apply_todo_edit(&TodoEdit::Add {
            text: "b".to_string(),
            now_ms: 50,
        }))
        .unwrap();

        assert_eq!(todos.len(), 2);
        assert_eq!(store.inner().raw(keys::USER_TODOS).unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_noop_todo_edit_skips_write() {
        let store = create_test_store(json!({"userTodos": []}));

        block_on(store.apply_todo_edit(&TodoEdit::Delete { id: 3 })).unwrap();

        assert_eq!(store.inner().writes(), 0);
    }

    #[test]
    fn test_blank_token_and_video_id_are_absent() {
        let store = create_test_store(json!({
            "githubToken": "   ",
            "userVideoId": ""
        }));

        assert_eq!(block_on(store.github_token()).unwrap(), None);
        assert_eq!(block_on(store.video_id()).unwrap(), None);

        block_on(store.save_github_token(" ghp_abc ")).unwrap();
        assert_eq!(block_on(store.github_token()).unwrap(), Some("ghp_abc".to_string()));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let store = create_test_store(json!({}));
        store.inner().fail_writes(true);

        let result = block_on(store.save_memo("hello"));

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(block_on(store.memo()).unwrap(), "");
    }
}
