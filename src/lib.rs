//! Widget Sidebar - browser side panel with a feed of small widgets
//! Built with Rust + WASM + Yew

mod background;
mod browser;
mod config;
mod controller;
mod debounce;
mod feed;
mod fetchers;
mod media;
mod messages;
mod scrape;
mod storage;
mod todo;
pub mod ui;
mod video;
mod view;
mod widget;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the side panel
#[wasm_bindgen]
pub fn start_sidepanel() {
    yew::Renderer::<ui::sidepanel::App>::new().render();
}
