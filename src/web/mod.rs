/// Browser wiring: host bindings, page listeners and the exported entry points
mod bridge;
mod dom;
mod listeners;

pub use bridge::{ChromeRuntime, ChromeStorage};
pub use dom::WebDom;
pub use listeners::{Handler, ListenerRegistry};

use log::{debug, info};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, EventTarget};

use crate::background::{Coordinator, CoordinatorConfig, TabChange, TabStatus};
use crate::content::matcher::MatcherKind;
use crate::content::{ContentFilter, EventSample, FilterConfig, Transition, Trigger};
use crate::messages::Message;
use crate::preferences::PreferenceStore;

type WebFilter = ContentFilter<ChromeStorage, ChromeRuntime, WebDom>;

fn parse_message(value: &JsValue) -> Option<Message> {
    let text = value.as_string()?;
    match text.parse() {
        Ok(message) => Some(message),
        Err(e) => {
            debug!("{}", e);
            None
        }
    }
}

fn preferences() -> PreferenceStore<ChromeStorage> {
    PreferenceStore::new(ChromeStorage)
}

/// Start the background coordinator and subscribe it to tab and runtime events
#[wasm_bindgen]
pub fn start_background() {
    let coordinator = Rc::new(Coordinator::new(
        preferences(),
        ChromeRuntime,
        CoordinatorConfig::default(),
    ));

    let on_activated = {
        let coordinator = coordinator.clone();
        Closure::<dyn FnMut(i32, JsValue)>::new(move |tab_id: i32, previous: JsValue| {
            let coordinator = coordinator.clone();
            let previous = previous.as_f64().map(|id| id as i32);
            spawn_local(async move {
                coordinator.on_tab_activated(tab_id, previous).await;
            });
        })
    };
    bridge::onTabActivated(on_activated.as_ref().unchecked_ref());
    on_activated.forget();

    let on_updated = {
        let coordinator = coordinator.clone();
        Closure::<dyn FnMut(i32, JsValue, JsValue)>::new(
            move |tab_id: i32, status: JsValue, url: JsValue| {
                let coordinator = coordinator.clone();
                let change = TabChange {
                    status: status.as_string().as_deref().and_then(TabStatus::parse),
                    url: url.as_string(),
                };
                spawn_local(async move {
                    coordinator.on_tab_updated(tab_id, change).await;
                });
            },
        )
    };
    bridge::onTabUpdated(on_updated.as_ref().unchecked_ref());
    on_updated.forget();

    let on_removed = {
        let coordinator = coordinator.clone();
        Closure::<dyn FnMut(i32)>::new(move |tab_id: i32| {
            let coordinator = coordinator.clone();
            spawn_local(async move {
                coordinator.on_tab_removed(tab_id).await;
            });
        })
    };
    bridge::onTabRemoved(on_removed.as_ref().unchecked_ref());
    on_removed.forget();

    let on_message = {
        let coordinator = coordinator.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |message: JsValue| {
            let Some(message) = parse_message(&message) else {
                return;
            };
            let coordinator = coordinator.clone();
            spawn_local(async move {
                coordinator.on_message(message).await;
            });
        })
    };
    bridge::onRuntimeMessage(on_message.as_ref().unchecked_ref());
    on_message.forget();

    spawn_local(async move {
        coordinator.liveness_check().await;
    });

    info!("Background coordinator started");
}

/// Content script state: the filter plus the listeners armed on its behalf
struct ContentRuntime {
    filter: Rc<WebFilter>,
    listeners: RefCell<ListenerRegistry>,
}

impl ContentRuntime {
    fn apply(&self, transitions: Vec<Transition>) {
        let mut listeners = self.listeners.borrow_mut();
        for transition in transitions {
            if transition.armed {
                listeners.attach(transition.matcher, |trigger| {
                    self.handler(transition.matcher, trigger)
                });
            } else {
                listeners.detach(transition.matcher);
            }
        }
    }

    fn handler(&self, kind: MatcherKind, trigger: Trigger) -> Handler {
        let filter = self.filter.clone();
        Closure::new(move |_event: Event| {
            let filter = filter.clone();
            let sample = current_sample();
            spawn_local(async move {
                filter.handle_event(kind, trigger, sample).await;
            });
        })
    }

    fn spawn_message(self: &Rc<Self>, message: Message) {
        let runtime = self.clone();
        spawn_local(async move {
            let transitions = runtime.filter.on_message(message).await;
            runtime.apply(transitions);
        });
    }

    fn spawn_page_load(self: &Rc<Self>) {
        let runtime = self.clone();
        spawn_local(async move {
            let transitions = runtime.filter.on_page_load().await;
            runtime.apply(transitions);
        });
    }
}

fn current_sample() -> EventSample {
    EventSample {
        now_ms: js_sys::Date::now(),
        scroll_y: web_sys::window()
            .and_then(|window| window.scroll_y().ok())
            .unwrap_or(0.0),
    }
}

/// Start the content filter in the current page
#[wasm_bindgen]
pub fn start_content() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let filter = Rc::new(ContentFilter::new(
        preferences(),
        ChromeRuntime,
        WebDom::new(document.clone()),
        FilterConfig::default(),
    ));
    let target: EventTarget = document.clone().into();
    let runtime = Rc::new(ContentRuntime {
        filter,
        listeners: RefCell::new(ListenerRegistry::new(target)),
    });

    let on_message = {
        let runtime = runtime.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |message: JsValue| {
            if let Some(message) = parse_message(&message) {
                runtime.spawn_message(message);
            }
        })
    };
    bridge::onRuntimeMessage(on_message.as_ref().unchecked_ref());
    on_message.forget();

    let on_hash_change = {
        let filter = runtime.filter.clone();
        Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let filter = filter.clone();
            spawn_local(async move {
                filter.on_hash_change().await;
            });
        })
    };
    window.add_event_listener_with_callback("hashchange", on_hash_change.as_ref().unchecked_ref())?;
    on_hash_change.forget();

    // Re-injected scripts arrive after the load event has fired
    if document.ready_state() == "complete" {
        runtime.spawn_page_load();
    } else {
        let on_load = {
            let runtime = runtime.clone();
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                runtime.spawn_page_load();
            })
        };
        window.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())?;
        on_load.forget();
    }

    info!("Content filter started");
    Ok(())
}

// Popup-facing preference accessors

#[wasm_bindgen]
pub async fn get_dark_mode() -> bool {
    preferences().dark_mode().await
}

#[wasm_bindgen]
pub async fn set_dark_mode(value: bool) {
    preferences().set_dark_mode(value).await;
}

#[wasm_bindgen]
pub async fn clear_dark_mode() {
    preferences().clear_dark_mode().await;
}

#[wasm_bindgen]
pub async fn get_settings() -> Result<JsValue, JsValue> {
    let settings = preferences().settings().await;
    settings
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize settings: {:?}", e)))
}
