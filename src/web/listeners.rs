/// Stable page listeners per matcher, so detaching removes exactly what was attached
use log::{debug, warn};
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, EventTarget};

use crate::content::Trigger;
use crate::content::matcher::MatcherKind;

pub type Handler = Closure<dyn FnMut(Event)>;

pub struct ListenerRegistry {
    target: EventTarget,
    handlers: HashMap<(MatcherKind, Trigger), Handler>,
}

impl ListenerRegistry {
    pub fn new(target: EventTarget) -> Self {
        ListenerRegistry {
            target,
            handlers: HashMap::new(),
        }
    }

    /// Register one handler per trigger for `kind`. Triggers that already
    /// have a handler are left alone.
    pub fn attach(&mut self, kind: MatcherKind, mut make_handler: impl FnMut(Trigger) -> Handler) {
        for trigger in Trigger::ALL {
            if self.handlers.contains_key(&(kind, trigger)) {
                continue;
            }

            let handler = make_handler(trigger);
            match self
                .target
                .add_event_listener_with_callback(trigger.event_name(), handler.as_ref().unchecked_ref())
            {
                Ok(()) => {
                    self.handlers.insert((kind, trigger), handler);
                }
                Err(e) => warn!(
                    "Failed to add {} listener for {}: {:?}",
                    trigger.event_name(),
                    kind.label(),
                    e
                ),
            }
        }
        debug!("{} armed", kind.label());
    }

    pub fn detach(&mut self, kind: MatcherKind) {
        for trigger in Trigger::ALL {
            let Some(handler) = self.handlers.remove(&(kind, trigger)) else {
                continue;
            };
            if let Err(e) = self
                .target
                .remove_event_listener_with_callback(trigger.event_name(), handler.as_ref().unchecked_ref())
            {
                warn!(
                    "Failed to remove {} listener for {}: {:?}",
                    trigger.event_name(),
                    kind.label(),
                    e
                );
            }
        }
        debug!("{} unarmed", kind.label());
    }

    pub fn attached(&self, kind: MatcherKind) -> usize {
        self.handlers.keys().filter(|(k, _)| *k == kind).count()
    }
}
