/// Content filter: removes matched sections from the page and keeps the
/// shared counters current
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::host::{Messenger, StorageArea};
use crate::messages::{CounterScope, Message};
use crate::preferences::PreferenceStore;
use matcher::{MatcherKind, PageDom};
use throttle::Throttle;

pub mod matcher;
pub mod throttle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Minimum gap between mouse-move passes of one matcher
    pub mousemove_throttle_ms: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            mousemove_throttle_ms: 100,
        }
    }
}

/// Page events that re-run an armed matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Trigger {
    Scroll,
    ScrollEnd,
    MouseMove,
}

impl Trigger {
    pub const ALL: [Trigger; 3] = [Trigger::Scroll, Trigger::ScrollEnd, Trigger::MouseMove];

    /// DOM event name
    pub fn event_name(&self) -> &'static str {
        match self {
            Trigger::Scroll => "scroll",
            Trigger::ScrollEnd => "scrollend",
            Trigger::MouseMove => "mousemove",
        }
    }
}

/// Page state captured when an event fired
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSample {
    pub now_ms: f64,
    pub scroll_y: f64,
}

/// A matcher changed between armed and unarmed. The host layer attaches or
/// detaches that matcher's listeners in response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub matcher: MatcherKind,
    pub armed: bool,
}

#[derive(Debug)]
struct MatcherState {
    armed: bool,
    mousemove: Throttle,
    last_scroll_y: Option<f64>,
}

impl MatcherState {
    fn new(config: &FilterConfig) -> Self {
        MatcherState {
            armed: false,
            mousemove: Throttle::new(config.mousemove_throttle_ms),
            last_scroll_y: None,
        }
    }
}

pub struct ContentFilter<S, M, D> {
    prefs: PreferenceStore<S>,
    messenger: M,
    dom: D,
    // Never borrowed across an await
    matchers: RefCell<BTreeMap<MatcherKind, MatcherState>>,
}

impl<S, M, D> ContentFilter<S, M, D>
where
    S: StorageArea,
    M: Messenger,
    D: PageDom,
{
    pub fn new(prefs: PreferenceStore<S>, messenger: M, dom: D, config: FilterConfig) -> Self {
        let matchers = MatcherKind::ALL
            .into_iter()
            .map(|kind| (kind, MatcherState::new(&config)))
            .collect();

        ContentFilter {
            prefs,
            messenger,
            dom,
            matchers: RefCell::new(matchers),
        }
    }

    pub fn prefs(&self) -> &PreferenceStore<S> {
        &self.prefs
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn is_armed(&self, kind: MatcherKind) -> bool {
        self.matchers
            .borrow()
            .get(&kind)
            .is_some_and(|state| state.armed)
    }

    pub fn armed(&self) -> Vec<MatcherKind> {
        self.matchers
            .borrow()
            .iter()
            .filter(|(_, state)| state.armed)
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Re-read the running flag and settings, arm or disarm each matcher,
    /// and run one pass of every armed matcher.
    pub async fn refresh(&self) -> Vec<Transition> {
        let running = self.prefs.extension_running().await;
        let settings = self.prefs.settings().await;

        if running {
            info!("Content filter running");
        } else {
            info!("Content filter paused");
        }

        let mut transitions = Vec::new();
        {
            let mut matchers = self.matchers.borrow_mut();
            for (kind, state) in matchers.iter_mut() {
                let wanted = running && kind.enabled_by(&settings);
                if state.armed != wanted {
                    state.armed = wanted;
                    state.last_scroll_y = None;
                    transitions.push(Transition {
                        matcher: *kind,
                        armed: wanted,
                    });
                }
            }
        }

        for kind in self.armed() {
            self.run_pass(kind).await;
        }

        transitions
    }

    /// Remove every current match of `kind`. Returns how many were removed.
    pub async fn run_pass(&self, kind: MatcherKind) -> usize {
        let mut removed = 0;

        for node in kind.find(&self.dom) {
            if !self.dom.has_children(&node) {
                continue;
            }
            match self.dom.detach(&node) {
                Ok(()) => {
                    removed += 1;
                    debug!("{} removed", kind.label());
                    self.count_removal().await;
                }
                Err(e) => warn!("Error removing {}: {}", kind.label(), e),
            }
        }

        removed
    }

    async fn count_removal(&self) {
        self.prefs.record_removal().await;
        self.publish_counts(CounterScope::Both).await;
    }

    /// Notify listeners of a counter change and ask the background to mirror
    /// the page counter into this tab's record
    async fn publish_counts(&self, scope: CounterScope) {
        for message in [scope.message(), Message::UpdateTabStore] {
            if let Err(e) = self.messenger.broadcast(message).await {
                warn!("Could not establish connection for '{}' (ignore): {}", message, e);
            }
        }
    }

    /// Pass over every armed matcher
    pub async fn tidy_now(&self) -> usize {
        let mut removed = 0;
        for kind in self.armed() {
            removed += self.run_pass(kind).await;
        }
        removed
    }

    /// A listener of `kind` fired. Scrolling up and throttled mouse moves
    /// are skipped.
    pub async fn handle_event(&self, kind: MatcherKind, trigger: Trigger, sample: EventSample) -> usize {
        let should_run = {
            let mut matchers = self.matchers.borrow_mut();
            let Some(state) = matchers.get_mut(&kind).filter(|state| state.armed) else {
                return 0;
            };

            match trigger {
                Trigger::Scroll => {
                    let scrolling_up = state
                        .last_scroll_y
                        .is_some_and(|last| sample.scroll_y < last);
                    state.last_scroll_y = Some(sample.scroll_y);
                    !scrolling_up
                }
                Trigger::ScrollEnd => true,
                Trigger::MouseMove => state.mousemove.ready(sample.now_ms),
            }
        };

        if should_run {
            self.run_pass(kind).await
        } else {
            0
        }
    }

    /// In-page navigation starts a new page count
    pub async fn on_hash_change(&self) {
        self.prefs.set_sections_removed_page(0).await;
        self.publish_counts(CounterScope::Page).await;
    }

    pub async fn on_page_load(&self) -> Vec<Transition> {
        self.prefs.set_sections_removed_page(0).await;
        self.publish_counts(CounterScope::Page).await;
        self.refresh().await
    }

    pub async fn on_message(&self, message: Message) -> Vec<Transition> {
        match message {
            Message::ExtensionStateChanged => self.refresh().await,
            Message::TidyWhileLoading => {
                let removed = self.tidy_now().await;
                debug!("Tidy while loading removed {} sections", removed);
                Vec::new()
            }
            other => {
                debug!("Content filter ignoring message '{}'", other);
                Vec::new()
            }
        }
    }
}
