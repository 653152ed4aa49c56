//! Side panel root: header, now-playing bar, feed and settings modal

use crate::browser::{BrowserEnv, RuntimeListener, send_message, send_to_active_tab, settings_store};
use crate::config::{ExtensionSettings, StockSymbol, Theme};
use crate::controller::{ControlRow, SettingsController};
use crate::feed::{FeedItem, FeedView, WidgetSource};
use crate::fetchers::Widgets;
use crate::messages::{ActiveMedia, MediaSource, RuntimeMessage};
use crate::ui::cards::FeedCard;
use crate::ui::settings_panel::SettingsPanel;
use crate::view::{Card, EMPTY_FEED_TEXT, LOAD_FAILED_TEXT};
use crate::widget::{Direction, WidgetKey};
use chrono::NaiveDate;
use patternfly_yew::prelude::{Alert, AlertType, Button, ButtonVariant, Spinner};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

enum FeedAction {
    Show(FeedView),
    Replace(WidgetKey, Vec<FeedItem>),
}

#[derive(PartialEq)]
struct FeedState(FeedView);

impl Default for FeedState {
    fn default() -> Self {
        FeedState(FeedView::Loading)
    }
}

impl Reducible for FeedState {
    type Action = FeedAction;

    fn reduce(self: Rc<Self>, action: FeedAction) -> Rc<Self> {
        match action {
            FeedAction::Show(view) => Rc::new(FeedState(view)),
            FeedAction::Replace(key, items) => Rc::new(FeedState(self.0.replace_widget(key, items))),
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let controller = use_memo((), |_| SettingsController::new(settings_store()));
    let widgets = use_memo((), |_| Widgets::new(BrowserEnv::new()));
    let feed = use_reducer(FeedState::default);
    let rows = use_state(Vec::<ControlRow>::new);
    let settings = use_state(ExtensionSettings::default);
    let show_settings = use_state(|| false);
    let active_media = use_state(|| None::<ActiveMedia>);

    // Re-read persisted state, then run the aggregator
    let reload = {
        let controller = controller.clone();
        let widgets = widgets.clone();
        let feed = feed.dispatcher();
        let rows = rows.clone();
        let settings = settings.clone();

        Callback::from(move |_: ()| {
            let controller = controller.clone();
            let widgets = widgets.clone();
            let feed = feed.clone();
            let rows = rows.clone();
            let settings = settings.clone();
            feed.dispatch(FeedAction::Show(FeedView::Loading));
            spawn_local(async move {
                let result = controller.refresh(&*widgets).await;
                if result.is_ok() {
                    settings.set(controller.state().settings);
                    rows.set(controller.controls());
                }
                feed.dispatch(FeedAction::Show(FeedView::from_result(result)));
            });
        })
    };

    // Rebuild from the in-memory state after a panel change
    let rebuild = {
        let controller = controller.clone();
        let widgets = widgets.clone();
        let feed = feed.dispatcher();

        Callback::from(move |_: ()| {
            let controller = controller.clone();
            let widgets = widgets.clone();
            let feed = feed.clone();
            feed.dispatch(FeedAction::Show(FeedView::Loading));
            spawn_local(async move {
                let items = controller.feed(&*widgets).await;
                feed.dispatch(FeedAction::Show(FeedView::Ready(items)));
            });
        })
    };

    // Load state on mount
    {
        let reload = reload.clone();
        use_effect_with((), move |_| {
            reload.emit(());
            || ()
        });
    }

    // Follow media broadcasts from the background worker
    {
        let active_media = active_media.clone();

        use_effect_with((), move |_| {
            let listener = {
                let active_media = active_media.clone();
                RuntimeListener::new(move |message| match message {
                    RuntimeMessage::ActiveMedia { media }
                    | RuntimeMessage::ActiveMediaUpdated { media } => active_media.set(media),
                    RuntimeMessage::ActiveMediaCleared => active_media.set(None),
                    _ => {}
                })
            };

            spawn_local(async move {
                match send_message::<RuntimeMessage>(&RuntimeMessage::GetActiveMedia).await {
                    Ok(RuntimeMessage::ActiveMedia { media }) => active_media.set(media),
                    Ok(_) => {}
                    Err(e) => log::debug!("[Widget] No active media: {}", e),
                }
            });

            move || drop(listener)
        });
    }

    let on_refresh = {
        let feed = feed.dispatcher();
        let widgets = widgets.clone();

        Callback::from(move |key: WidgetKey| {
            let feed = feed.clone();
            let widgets = widgets.clone();
            spawn_local(async move {
                let items = widgets.fetch(key).await;
                feed.dispatch(FeedAction::Replace(key, items));
            });
        })
    };

    let on_toggle = {
        let controller = controller.clone();
        let rows = rows.clone();
        let rebuild = rebuild.clone();

        Callback::from(move |key: WidgetKey| {
            let controller = controller.clone();
            let rows = rows.clone();
            let rebuild = rebuild.clone();
            spawn_local(async move {
                controller.toggle(key).await;
                rows.set(controller.controls());
                rebuild.emit(());
            });
        })
    };

    let on_move = {
        let controller = controller.clone();
        let rows = rows.clone();
        let rebuild = rebuild.clone();

        Callback::from(move |(key, direction): (WidgetKey, Direction)| {
            let controller = controller.clone();
            let rows = rows.clone();
            let rebuild = rebuild.clone();
            spawn_local(async move {
                if controller.move_widget(key, direction).await {
                    rows.set(controller.controls());
                    rebuild.emit(());
                }
            });
        })
    };

    let on_theme = {
        let controller = controller.clone();
        let settings = settings.clone();

        Callback::from(move |theme: Theme| {
            let controller = controller.clone();
            let settings = settings.clone();
            spawn_local(async move {
                let next = ExtensionSettings {
                    theme,
                    ..controller.state().settings
                };
                controller.save_settings(next.clone()).await;
                settings.set(next);
            });
        })
    };

    let on_stock = {
        let controller = controller.clone();
        let settings = settings.clone();
        let on_refresh = on_refresh.clone();

        Callback::from(move |stock: StockSymbol| {
            let controller = controller.clone();
            let settings = settings.clone();
            let on_refresh = on_refresh.clone();
            spawn_local(async move {
                let next = ExtensionSettings {
                    stock,
                    ..controller.state().settings
                };
                controller.save_settings(next.clone()).await;
                settings.set(next);
                on_refresh.emit(WidgetKey::Stocks);
            });
        })
    };

    let on_token = {
        let controller = controller.clone();
        let on_refresh = on_refresh.clone();

        Callback::from(move |token: String| {
            let controller = controller.clone();
            let on_refresh = on_refresh.clone();
            spawn_local(async move {
                if let Err(e) = controller.store().save_github_token(&token).await {
                    log::warn!("[Widget] Failed to save GitHub token: {}", e);
                }
                on_refresh.emit(WidgetKey::Notifications);
            });
        })
    };

    let on_open_settings = {
        let show_settings = show_settings.clone();
        Callback::from(move |_: MouseEvent| show_settings.set(true))
    };

    let on_close_settings = {
        let show_settings = show_settings.clone();
        Callback::from(move |_: ()| show_settings.set(false))
    };

    let on_reload_click = reload.reform(|_: MouseEvent| ());

    let on_pip = Callback::from(|_: MouseEvent| {
        spawn_local(async {
            if let Err(e) = send_to_active_tab(&RuntimeMessage::TogglePip).await {
                log::warn!("[Widget] PiP toggle failed: {}", e);
            }
        });
    });

    let feed_html = match &feed.0 {
        FeedView::Loading => html! {
            <div class="loading-text-center">
                <Spinner />
            </div>
        },
        FeedView::Failed => html! {
            <Alert r#type={AlertType::Danger} title={LOAD_FAILED_TEXT} inline={true}>
            </Alert>
        },
        FeedView::Ready(items) if items.is_empty() => html! {
            <p class="feed-empty">{EMPTY_FEED_TEXT}</p>
        },
        FeedView::Ready(items) => html! {
            {for items.iter().enumerate().map(|(index, item)| {
                let key = match item.id() {
                    "" => format!("item-{}", index),
                    id => id.to_string(),
                };
                html! {
                    <FeedCard
                        key={key}
                        card={Card::from(item)}
                        autosave_delay_ms={settings.autosave_delay_ms}
                        on_refresh={on_refresh.clone()}
                    />
                }
            })}
        },
    };

    html! {
        <div class={classes!("sidebar", settings.theme.class())}>
            <header class="sidebar-header">
                <div>
                    <h1 class="sidebar-title">{"Today"}</h1>
                    <p class="sidebar-date">{today_label()}</p>
                </div>
                <div class="sidebar-actions">
                    <Button onclick={on_reload_click} variant={ButtonVariant::Plain}>{"⟳"}</Button>
                    <Button onclick={on_open_settings} variant={ButtonVariant::Plain}>{"⚙️"}</Button>
                </div>
            </header>

            if let Some(media) = (*active_media).clone() {
                <div class="media-bar">
                    <span class="media-state">
                        {if media.is_playing { "▶" } else { "⏸" }}
                    </span>
                    <span class="media-title" title={media.url.clone()}>
                        {format!("{} · {}", source_label(media.source), media.title)}
                    </span>
                    <Button onclick={on_pip} variant={ButtonVariant::Secondary}>{"PiP"}</Button>
                </div>
            }

            <main class="feed-container">
                {feed_html}
            </main>

            if *show_settings {
                <SettingsPanel
                    rows={(*rows).clone()}
                    theme={settings.theme}
                    stock={settings.stock.clone()}
                    {on_toggle}
                    {on_move}
                    {on_theme}
                    {on_stock}
                    {on_token}
                    on_close={on_close_settings}
                />
            }
        </div>
    }
}

fn source_label(source: MediaSource) -> &'static str {
    match source {
        MediaSource::Youtube => "YouTube",
        MediaSource::Spotify => "Spotify",
        MediaSource::Soundcloud => "SoundCloud",
        MediaSource::Other => "Media",
    }
}

fn today_label() -> String {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .map(header_date)
        .unwrap_or_default()
}

/// "Friday, October 16"
fn header_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}
