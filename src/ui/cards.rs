//! Feed card components, one per card kind

use crate::browser::settings_store;
use crate::todo::{self, TodoEdit, TodoEntry};
use crate::ui::components::{CardShell, use_autosave};
use crate::video::parse_video_id;
use crate::view::{Card, StockCard, StockChart};
use crate::widget::WidgetKey;
use patternfly_yew::prelude::{Alert, AlertType, Button, ButtonVariant};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

const MEMO_FIELD: &str = "memo";

#[derive(Properties, PartialEq)]
pub struct FeedCardProps {
    pub card: Card,
    pub autosave_delay_ms: u32,
    /// Ask the feed to refetch one widget
    pub on_refresh: Callback<WidgetKey>,
}

#[function_component(FeedCard)]
pub fn feed_card(props: &FeedCardProps) -> Html {
    match &props.card {
        Card::Notification {
            icon,
            title,
            subtitle,
            time,
            link,
        } => html! {
            <CardShell
                icon={icon.clone()}
                title={title.clone()}
                aside={(!time.is_empty()).then(|| time.clone())}
                class={classes!("card-notification")}
            >
                if let Some(link) = link {
                    <a href={link.clone()} target="_blank" rel="noopener noreferrer">{subtitle}</a>
                } else {
                    <p class="card-text">{subtitle}</p>
                }
            </CardShell>
        },
        Card::Weather {
            icon,
            title,
            temp,
            temp_range,
        } => html! {
            <CardShell icon={icon.clone()} title={title.clone()} class={classes!("card-weather")}>
                <div class="weather-temp">{temp}</div>
                <div class="weather-range">{temp_range}</div>
            </CardShell>
        },
        Card::Stock(stock) => html! { <StockView stock={stock.clone()} /> },
        Card::Image { icon, image_url } => html! {
            <ImageCard
                icon={icon.clone()}
                image_url={image_url.clone()}
                on_refresh={props.on_refresh.clone()}
            />
        },
        Card::Message { icon, text, sender } => html! {
            <CardShell icon={icon.clone()} title="Message" class={classes!("card-message")}>
                <p class="card-text">{text}</p>
                <span class="message-sender">{sender}</span>
            </CardShell>
        },
        Card::Video {
            icon,
            title,
            thumbnail,
            embed_url,
        } => html! {
            <VideoCard
                icon={icon.clone()}
                title={title.clone()}
                thumbnail={thumbnail.clone()}
                embed_url={embed_url.clone()}
                on_refresh={props.on_refresh.clone()}
            />
        },
        Card::Memo { text } => html! {
            <MemoCard text={text.clone()} autosave_delay_ms={props.autosave_delay_ms} />
        },
        Card::Todo { entries } => html! {
            <TodoCard entries={entries.clone()} autosave_delay_ms={props.autosave_delay_ms} />
        },
        Card::Hidden => html! {},
    }
}

#[derive(Properties, PartialEq)]
struct StockViewProps {
    stock: StockCard,
}

#[function_component(StockView)]
fn stock_view(props: &StockViewProps) -> Html {
    let stock = &props.stock;

    html! {
        <CardShell icon={stock.icon.clone()} title={stock.title.clone()} class={classes!("card-stock")}>
            <div class="stock-quote">
                <span class="stock-price" style={stock.price_style().to_string()}>{&stock.price}</span>
                <span class="stock-change" style={stock.change_style().to_string()}>{&stock.change}</span>
            </div>
            {match &stock.chart {
                StockChart::PreMarket => html! {
                    <p class="stock-premarket">{"Pre-market: trading opens at 09:00 KST"}</p>
                },
                StockChart::Image(url) => html! {
                    <img class="stock-chart" src={url.clone()} alt="Intraday chart" />
                },
                StockChart::None => html! {},
            }}
        </CardShell>
    }
}

#[derive(Properties, PartialEq)]
struct ImageCardProps {
    icon: AttrValue,
    image_url: AttrValue,
    on_refresh: Callback<WidgetKey>,
}

#[function_component(ImageCard)]
fn image_card(props: &ImageCardProps) -> Html {
    let onclick = props.on_refresh.reform(|_: MouseEvent| WidgetKey::Images);

    html! {
        <CardShell icon={props.icon.clone()} title="Random cat" class={classes!("card-image")}>
            <img
                class="cat-image"
                src={props.image_url.clone()}
                alt="Random cat"
                title="Click for another cat"
                {onclick}
            />
        </CardShell>
    }
}

#[derive(Properties, PartialEq)]
struct VideoCardProps {
    icon: AttrValue,
    title: AttrValue,
    thumbnail: AttrValue,
    embed_url: Option<String>,
    on_refresh: Callback<WidgetKey>,
}

#[function_component(VideoCard)]
fn video_card(props: &VideoCardProps) -> Html {
    let playing = use_state(|| false);
    let input_ref = use_node_ref();
    let error = use_state(|| None::<String>);

    let on_play = {
        let playing = playing.clone();
        Callback::from(move |_: MouseEvent| playing.set(true))
    };

    let on_change_video = {
        let input_ref = input_ref.clone();
        let error = error.clone();
        let on_refresh = props.on_refresh.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(input) = input_ref.cast::<HtmlInputElement>() else {
                return;
            };
            let Some(video_id) = parse_video_id(&input.value()) else {
                error.set(Some("Not a YouTube link or video id".to_string()));
                return;
            };

            error.set(None);
            input.set_value("");
            let on_refresh = on_refresh.clone();
            spawn_local(async move {
                match settings_store().save_video_id(&video_id).await {
                    Ok(()) => on_refresh.emit(WidgetKey::Videos),
                    Err(e) => log::warn!("[Widget] Failed to save video id: {}", e),
                }
            });
        })
    };

    html! {
        <CardShell icon={props.icon.clone()} title={props.title.clone()} class={classes!("card-video")}>
            {match (&props.embed_url, *playing) {
                (Some(embed_url), true) => html! {
                    <iframe
                        class="video-frame"
                        src={format!("{}?autoplay=1", embed_url)}
                        title={props.title.clone()}
                        allow="autoplay; encrypted-media; picture-in-picture; fullscreen"
                    />
                },
                _ => html! {
                    <img
                        class="video-thumbnail"
                        src={props.thumbnail.clone()}
                        alt={props.title.clone()}
                        onclick={on_play}
                    />
                },
            }}
            <div class="video-form">
                <input
                    ref={input_ref}
                    class="pf-v5-c-form-control"
                    type="text"
                    placeholder="YouTube link or video id"
                />
                <Button onclick={on_change_video} variant={ButtonVariant::Secondary}>
                    {"Change"}
                </Button>
            </div>
            if let Some(err) = (*error).clone() {
                <Alert r#type={AlertType::Warning} title={err} inline={true}>
                </Alert>
            }
        </CardShell>
    }
}

#[derive(Properties, PartialEq)]
struct MemoCardProps {
    text: AttrValue,
    autosave_delay_ms: u32,
}

#[function_component(MemoCard)]
fn memo_card(props: &MemoCardProps) -> Html {
    let text = use_state(|| props.text.to_string());

    let save = Callback::from(|(_, text): (String, String)| {
        spawn_local(async move {
            if let Err(e) = settings_store().save_memo(&text).await {
                log::warn!("[Widget] Failed to save memo: {}", e);
            }
        });
    });
    let autosave = use_autosave(props.autosave_delay_ms, save);

    let oninput = {
        let text = text.clone();
        let autosave = autosave.clone();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            let value = area.value();
            text.set(value.clone());
            autosave.edit(MEMO_FIELD, value);
        })
    };

    let onblur = Callback::from(move |_: FocusEvent| autosave.flush(MEMO_FIELD));

    html! {
        <CardShell icon="📝" title="Memo" class={classes!("card-memo")}>
            <textarea
                class="memo-input"
                placeholder="Write something..."
                value={(*text).clone()}
                {oninput}
                {onblur}
            />
        </CardShell>
    }
}

#[derive(Properties, PartialEq)]
struct TodoCardProps {
    entries: Vec<TodoEntry>,
    autosave_delay_ms: u32,
}

fn todo_field(id: i64) -> String {
    format!("todo-{}", id)
}

fn apply_todo_edit(entries: UseStateHandle<Vec<TodoEntry>>, edit: TodoEdit) {
    spawn_local(async move {
        match settings_store().apply_todo_edit(&edit).await {
            Ok(updated) => entries.set(updated),
            Err(e) => log::warn!("[Widget] Failed to update todos: {}", e),
        }
    });
}

#[function_component(TodoCard)]
fn todo_card(props: &TodoCardProps) -> Html {
    let entries = use_state(|| props.entries.clone());
    let new_ref = use_node_ref();

    let save = {
        let entries = entries.clone();
        Callback::from(move |(field, text): (String, String)| {
            let Some(id) = field
                .strip_prefix("todo-")
                .and_then(|id| id.parse::<i64>().ok())
            else {
                return;
            };
            apply_todo_edit(entries.clone(), TodoEdit::Edit { id, text });
        })
    };
    let autosave = use_autosave(props.autosave_delay_ms, save);

    let add = {
        let entries = entries.clone();
        let new_ref = new_ref.clone();
        Callback::from(move |_: ()| {
            let Some(input) = new_ref.cast::<HtmlInputElement>() else {
                return;
            };
            let text = input.value();
            input.set_value("");
            let now_ms = js_sys::Date::now() as i64;
            apply_todo_edit(entries.clone(), TodoEdit::Add { text, now_ms });
        })
    };
    let on_add_click = add.reform(|_: MouseEvent| ());
    let on_add_key = {
        let add = add.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                add.emit(());
            }
        })
    };

    let remaining = todo::remaining(&entries);

    html! {
        <CardShell
            icon="✅"
            title="Todo"
            aside={format!("{} left", remaining)}
            class={classes!("card-todo")}
        >
            <ul class="todo-list">
                {for entries.iter().map(|entry| {
                    let id = entry.id;
                    let on_toggle = {
                        let entries = entries.clone();
                        Callback::from(move |_: Event| {
                            apply_todo_edit(entries.clone(), TodoEdit::Toggle { id })
                        })
                    };
                    let on_delete = {
                        let entries = entries.clone();
                        Callback::from(move |_: MouseEvent| {
                            apply_todo_edit(entries.clone(), TodoEdit::Delete { id })
                        })
                    };
                    let on_edit = {
                        let autosave = autosave.clone();
                        Callback::from(move |e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            autosave.edit(&todo_field(id), input.value());
                        })
                    };
                    let on_blur = {
                        let autosave = autosave.clone();
                        Callback::from(move |_: FocusEvent| autosave.flush(&todo_field(id)))
                    };

                    html! {
                        <li key={id.to_string()} class={classes!("todo-item", entry.done.then_some("todo-done"))}>
                            <input type="checkbox" checked={entry.done} onchange={on_toggle} />
                            <input
                                class="todo-text"
                                type="text"
                                value={entry.text.clone()}
                                oninput={on_edit}
                                onblur={on_blur}
                            />
                            <button class="todo-delete" onclick={on_delete} title="Delete">{"✕"}</button>
                        </li>
                    }
                })}
            </ul>
            <div class="todo-add">
                <input
                    ref={new_ref}
                    class="pf-v5-c-form-control"
                    type="text"
                    placeholder="Add a task"
                    onkeydown={on_add_key}
                />
                <Button onclick={on_add_click} variant={ButtonVariant::Secondary}>
                    {"Add"}
                </Button>
            </div>
        </CardShell>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_field_names() {
        assert_eq!(todo_field(1714564800000), "todo-1714564800000");
    }
}
