//! The background worker's Rust half, driven by `background.js`

use crate::config::STOCK_PAGE_URL;
use crate::media::MediaTracker;
use crate::messages::{RuntimeMessage, SenderTab};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize: {:?}", e)))
}

#[wasm_bindgen]
#[derive(Default)]
pub struct BackgroundRelay {
    tracker: MediaTracker,
}

#[wasm_bindgen]
impl BackgroundRelay {
    #[wasm_bindgen(constructor)]
    pub fn new() -> BackgroundRelay {
        log::info!("[Widget] Background relay initialized");
        BackgroundRelay::default()
    }

    /// Feed one `chrome.runtime.onMessage` event through the media tracker.
    ///
    /// Returns the message to send onwards (reply or broadcast), or
    /// `undefined` when there is nothing to say.
    #[wasm_bindgen(js_name = onMessage)]
    pub fn on_message(
        &mut self,
        message: JsValue,
        sender_tab: JsValue,
        now_ms: f64,
    ) -> Result<JsValue, JsValue> {
        let Ok(message) = serde_wasm_bindgen::from_value::<RuntimeMessage>(message) else {
            return Ok(JsValue::UNDEFINED);
        };
        let sender: Option<SenderTab> = serde_wasm_bindgen::from_value(sender_tab).ok();

        match self.tracker.handle(&message, sender.as_ref(), now_ms) {
            Some(outgoing) => to_js(&outgoing),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = onTabRemoved)]
    pub fn on_tab_removed(&mut self, tab_id: i32) -> Result<JsValue, JsValue> {
        match self.tracker.tab_removed(tab_id) {
            Some(outgoing) => to_js(&outgoing),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Page fetched for `FETCH_STOCKS`
    #[wasm_bindgen(js_name = stockPageUrl)]
    pub fn stock_page_url(code: &str) -> String {
        stock_page_url(code)
    }
}

pub fn stock_page_url(code: &str) -> String {
    let code: String = code.chars().filter(char::is_ascii_digit).collect();
    format!("{}?code={}", STOCK_PAGE_URL, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_page_url_keeps_digits_only() {
        assert_eq!(
            stock_page_url("035720"),
            "https://finance.naver.com/item/main.naver?code=035720"
        );
        assert_eq!(
            stock_page_url("0357&x=1"),
            "https://finance.naver.com/item/main.naver?code=03571"
        );
    }
}
