//! UI module exports

pub mod cards;
pub mod components;
pub mod settings_panel;
pub mod sidepanel;
