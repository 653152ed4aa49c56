//! Settings modal: widget toggles and ordering, theme, stock and GitHub token

use crate::config::{StockSymbol, Theme};
use crate::controller::ControlRow;
use crate::widget::{Direction, WidgetKey};
use patternfly_yew::prelude::{Button, ButtonVariant};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SettingsPanelProps {
    pub rows: Vec<ControlRow>,
    pub theme: Theme,
    pub stock: StockSymbol,
    pub on_toggle: Callback<WidgetKey>,
    pub on_move: Callback<(WidgetKey, Direction)>,
    pub on_theme: Callback<Theme>,
    pub on_stock: Callback<StockSymbol>,
    pub on_token: Callback<String>,
    pub on_close: Callback<()>,
}

#[function_component(SettingsPanel)]
pub fn settings_panel(props: &SettingsPanelProps) -> Html {
    let stock_code_ref = use_node_ref();
    let stock_name_ref = use_node_ref();
    let token_ref = use_node_ref();

    let on_close = props.on_close.reform(|_: MouseEvent| ());

    let on_save_stock = {
        let stock_code_ref = stock_code_ref.clone();
        let stock_name_ref = stock_name_ref.clone();
        let on_stock = props.on_stock.clone();
        Callback::from(move |_: MouseEvent| {
            let (Some(code), Some(name)) = (
                stock_code_ref.cast::<HtmlInputElement>(),
                stock_name_ref.cast::<HtmlInputElement>(),
            ) else {
                return;
            };
            let code = code.value().trim().to_string();
            if code.is_empty() {
                return;
            }
            let name = match name.value().trim() {
                "" => code.clone(),
                name => name.to_string(),
            };
            on_stock.emit(StockSymbol { code, name });
        })
    };

    let on_save_token = {
        let token_ref = token_ref.clone();
        let on_token = props.on_token.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(input) = token_ref.cast::<HtmlInputElement>() {
                on_token.emit(input.value());
                input.set_value("");
            }
        })
    };

    html! {
        <div class="settings-modal">
            <div class="settings-content">
                <header class="settings-header">
                    <h2>{"Settings"}</h2>
                    <Button onclick={on_close} variant={ButtonVariant::Plain}>{"✕"}</Button>
                </header>

                <h3 class="settings-section">{"Widgets"}</h3>
                <ul class="widget-controls">
                    {for props.rows.iter().map(|row| control_row(row, props))}
                </ul>

                <h3 class="settings-section">{"Theme"}</h3>
                <div class="theme-options">
                    {for [Theme::Light, Theme::Dark, Theme::Auto].into_iter().map(|theme| {
                        let variant = if theme == props.theme {
                            ButtonVariant::Primary
                        } else {
                            ButtonVariant::Secondary
                        };
                        html! {
                            <Button onclick={props.on_theme.reform(move |_: MouseEvent| theme)} {variant}>
                                {theme_label(theme)}
                            </Button>
                        }
                    })}
                </div>

                <h3 class="settings-section">{"Stock"}</h3>
                <div class="settings-form">
                    <input
                        ref={stock_code_ref}
                        class="pf-v5-c-form-control"
                        type="text"
                        placeholder="Code"
                        value={props.stock.code.clone()}
                    />
                    <input
                        ref={stock_name_ref}
                        class="pf-v5-c-form-control"
                        type="text"
                        placeholder="Name"
                        value={props.stock.name.clone()}
                    />
                    <Button onclick={on_save_stock} variant={ButtonVariant::Secondary}>{"Save"}</Button>
                </div>

                <h3 class="settings-section">{"GitHub"}</h3>
                <div class="settings-form">
                    <input
                        ref={token_ref}
                        class="pf-v5-c-form-control"
                        type="password"
                        placeholder="Personal access token (blank to disconnect)"
                    />
                    <Button onclick={on_save_token} variant={ButtonVariant::Secondary}>{"Save"}</Button>
                </div>
            </div>
        </div>
    }
}

fn control_row(row: &ControlRow, props: &SettingsPanelProps) -> Html {
    let key = row.key;
    let on_toggle = props.on_toggle.reform(move |_: Event| key);
    let on_up = props.on_move.reform(move |_: MouseEvent| (key, Direction::Up));
    let on_down = props.on_move.reform(move |_: MouseEvent| (key, Direction::Down));

    html! {
        <li key={key.as_str()} class="widget-control">
            <label class="widget-control__label">
                <input type="checkbox" checked={row.enabled} onchange={on_toggle} />
                {row.label}
            </label>
            <div class="widget-control__buttons">
                <Button onclick={on_up} disabled={!row.can_move_up} variant={ButtonVariant::Plain}>
                    {"▲"}
                </Button>
                <Button onclick={on_down} disabled={!row.can_move_down} variant={ButtonVariant::Plain}>
                    {"▼"}
                </Button>
            </div>
        </li>
    }
}

fn theme_label(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "Light",
        Theme::Dark => "Dark",
        Theme::Auto => "System",
    }
}
