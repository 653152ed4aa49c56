//! Browser-side implementations of the store and fetch environment.
//!
//! Chrome APIs are reached through the JS glue in `sidepanel.js`; HTTP goes
//! through reqwest's fetch backend.

use crate::config::Coordinates;
use crate::fetchers::{Environment, FetchError};
use crate::messages::{RelayResponse, RuntimeMessage};
use crate::storage::{KeyValueStore, SettingsStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/sidepanel.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendToActiveTab(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getCurrentPosition() -> Result<JsValue, JsValue>;

    fn addRuntimeListener(callback: &js_sys::Function);

    fn removeRuntimeListener(callback: &js_sys::Function);
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, String> {
    // Plain objects, not JS Maps, so chrome APIs can read them
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("Failed to serialize: {:?}", e))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, String> {
    serde_wasm_bindgen::from_value(value).map_err(|e| format!("Failed to parse: {:?}", e))
}

/// `chrome.storage.sync`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStore;

impl KeyValueStore for ChromeStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let keys_js = to_js(keys).map_err(StoreError::Unavailable)?;
        let found = getStorage(keys_js)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?;
        if found.is_null() || found.is_undefined() {
            return Ok(Map::new());
        }
        from_js(found).map_err(StoreError::Unavailable)
    }

    async fn set(&self, items: Map<String, Value>) -> Result<(), StoreError> {
        let items_js = to_js(&items).map_err(StoreError::Unavailable)?;
        setStorage(items_js)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))
    }
}

pub fn settings_store() -> SettingsStore<ChromeStore> {
    SettingsStore::new(ChromeStore)
}

/// Send a message to the extension and decode the reply
pub async fn send_message<T: DeserializeOwned>(message: &RuntimeMessage) -> Result<T, String> {
    let reply = sendMessage(to_js(message)?)
        .await
        .map_err(|e| format!("Message failed: {:?}", e))?;
    from_js(reply)
}

/// Send a message to the content script of the active tab
pub async fn send_to_active_tab(message: &RuntimeMessage) -> Result<(), String> {
    let reply = sendToActiveTab(to_js(message)?)
        .await
        .map_err(|e| format!("Tab message failed: {:?}", e))?;
    let reply: RelayResponse = from_js(reply)?;
    if reply.success {
        Ok(())
    } else {
        Err(reply.error.unwrap_or_else(|| "rejected by the page".to_string()))
    }
}

/// A `chrome.runtime.onMessage` subscription, removed on drop
pub struct RuntimeListener {
    callback: Closure<dyn Fn(JsValue)>,
}

impl RuntimeListener {
    pub fn new(on_message: impl Fn(RuntimeMessage) + 'static) -> Self {
        let callback = Closure::wrap(Box::new(move |raw: JsValue| {
            // Other extension traffic uses shapes we do not model
            if let Ok(message) = serde_wasm_bindgen::from_value::<RuntimeMessage>(raw) {
                on_message(message);
            }
        }) as Box<dyn Fn(JsValue)>);
        addRuntimeListener(callback.as_ref().unchecked_ref());
        RuntimeListener { callback }
    }
}

impl Drop for RuntimeListener {
    fn drop(&mut self) {
        removeRuntimeListener(self.callback.as_ref().unchecked_ref());
    }
}

/// Everything the widget fetchers need, backed by the real browser
pub struct BrowserEnv {
    settings: SettingsStore<ChromeStore>,
    client: reqwest::Client,
}

impl BrowserEnv {
    pub fn new() -> Self {
        BrowserEnv {
            settings: settings_store(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for BrowserEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for BrowserEnv {
    type Store = ChromeStore;

    fn settings(&self) -> &SettingsStore<ChromeStore> {
        &self.settings
    }

    async fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<Value, FetchError> {
        let http = |e: reqwest::Error| FetchError::Http {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(http)?;
        let response = response.error_for_status().map_err(http)?;
        response.json::<Value>().await.map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn current_position(&self) -> Result<Coordinates, FetchError> {
        let position = getCurrentPosition()
            .await
            .map_err(|e| FetchError::Location(format!("{:?}", e)))?;
        from_js(position).map_err(FetchError::Location)
    }

    async fn relay(&self, message: &RuntimeMessage) -> Result<RelayResponse, FetchError> {
        send_message(message).await.map_err(FetchError::Relay)
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
}
