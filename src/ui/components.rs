//! Reusable UI pieces shared by the cards and the settings panel

use crate::debounce::PendingEdits;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct CardShellProps {
    pub icon: AttrValue,
    pub title: AttrValue,
    #[prop_or_default]
    pub aside: Option<AttrValue>,
    #[prop_or_default]
    pub class: Classes,
    pub children: Children,
}

/// Frame every feed card is drawn in
#[function_component(CardShell)]
pub fn card_shell(props: &CardShellProps) -> Html {
    html! {
        <section class={classes!("widget-card", props.class.clone())}>
            <header class="widget-card__header">
                <span class="widget-card__icon">{&props.icon}</span>
                <span class="widget-card__title">{&props.title}</span>
                if let Some(aside) = &props.aside {
                    <span class="widget-card__aside">{aside}</span>
                }
            </header>
            <div class="widget-card__body">
                {props.children.clone()}
            </div>
        </section>
    }
}

/// Handle returned by [`use_autosave`]
#[derive(Clone)]
pub struct AutoSave {
    edits: Rc<RefCell<PendingEdits<String, String>>>,
    timers: Rc<RefCell<HashMap<String, Timeout>>>,
    delay_ms: u32,
    save: Callback<(String, String)>,
}

impl AutoSave {
    /// Record an edit and restart the field's quiet period
    pub fn edit(&self, field: &str, value: String) {
        let ticket = self.edits.borrow_mut().edit(field.to_string(), value);

        let edits = self.edits.clone();
        let save = self.save.clone();
        let key = field.to_string();
        let timer = Timeout::new(self.delay_ms, move || {
            let due = edits.borrow_mut().expire(&key, ticket);
            if let Some(value) = due {
                save.emit((key, value));
            }
        });
        // Dropping the previous timer cancels it
        self.timers.borrow_mut().insert(field.to_string(), timer);
    }

    /// Write the pending value now, if any
    pub fn flush(&self, field: &str) {
        self.timers.borrow_mut().remove(field);
        let due = self.edits.borrow_mut().flush(&field.to_string());
        if let Some(value) = due {
            self.save.emit((field.to_string(), value));
        }
    }
}

/// Debounced writes keyed by field name. Pending values are flushed when the
/// component unmounts.
#[hook]
pub fn use_autosave(delay_ms: u32, save: Callback<(String, String)>) -> AutoSave {
    let edits = use_mut_ref(PendingEdits::<String, String>::new);
    let timers = use_mut_ref(HashMap::<String, Timeout>::new);

    {
        let edits = edits.clone();
        let timers = timers.clone();
        let save = save.clone();
        use_effect_with((), move |_| {
            move || {
                timers.borrow_mut().clear();
                let pending = edits.borrow_mut().flush_all();
                for (field, value) in pending {
                    save.emit((field, value));
                }
            }
        });
    }

    AutoSave {
        edits,
        timers,
        delay_ms,
        save,
    }
}
