/// Background coordinator: per-tab counter bookkeeping and tab lifecycle events
use log::{debug, info, warn};

use crate::host::{Messenger, StorageArea, TabsApi, Timer};
use crate::messages::Message;
use crate::preferences::PreferenceStore;
use crate::redirect::watch_url_for_shorts;
use crate::tab_store::{TabId, TabRecord};

/// Timing knobs for the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// How many times `tidyWhileLoading` is sent when a navigation starts
    pub tidy_attempts: u32,
    /// Delay before each attempt after the first
    pub tidy_retry_delay_ms: u32,
    /// Delay before checking that the extension context is still valid
    pub liveness_check_delay_ms: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            tidy_attempts: 2,
            tidy_retry_delay_ms: 1000,
            liveness_check_delay_ms: 20000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabStatus {
    Loading,
    Complete,
}

impl TabStatus {
    pub fn parse(status: &str) -> Option<TabStatus> {
        match status {
            "loading" => Some(TabStatus::Loading),
            "complete" => Some(TabStatus::Complete),
            _ => None,
        }
    }
}

/// The parts of a tab update the coordinator cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabChange {
    pub status: Option<TabStatus>,
    pub url: Option<String>,
}

pub struct Coordinator<S, H> {
    prefs: PreferenceStore<S>,
    host: H,
    config: CoordinatorConfig,
}

impl<S, H> Coordinator<S, H>
where
    S: StorageArea,
    H: Messenger + TabsApi + Timer,
{
    pub fn new(prefs: PreferenceStore<S>, host: H, config: CoordinatorConfig) -> Self {
        Coordinator { prefs, host, config }
    }

    pub fn prefs(&self) -> &PreferenceStore<S> {
        &self.prefs
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    async fn broadcast(&self, message: Message) {
        if let Err(e) = self.host.broadcast(message).await {
            warn!("Could not deliver '{}' (no receiver?): {}", message, e);
        }
    }

    /// Restore the page counter of the tab that just became active
    pub async fn on_tab_activated(&self, tab: TabId, previous_tab: Option<TabId>) {
        info!("Tab switch detected to tab {} from {:?}", tab, previous_tab);
        self.prefs.set_previous_tab(previous_tab).await;

        match self.prefs.tab_store().await.get(tab) {
            Some(count) => {
                self.prefs.set_sections_removed_page(count).await;
                debug!("Set sections removed page value to {}", count);

                self.broadcast(Message::SectionsRemovedPageChanged).await;
                self.broadcast(Message::ResetSectionsRemovedPage).await;
            }
            None => self.prefs.set_sections_removed_page(0).await,
        }
    }

    /// Navigation start resets the page counter and asks the page to tidy
    pub async fn on_tab_updated(&self, tab: TabId, change: TabChange) {
        if let Some(url) = change.url.as_deref() {
            self.redirect_shorts(tab, url).await;
        }

        if change.status != Some(TabStatus::Loading) {
            return;
        }

        self.prefs.set_sections_removed_page(0).await;

        for attempt in 0..self.config.tidy_attempts {
            if attempt > 0 {
                self.host.sleep(self.config.tidy_retry_delay_ms).await;
            }
            // The content script may not be listening yet
            if let Err(e) = self.host.send_to_tab(tab, Message::TidyWhileLoading).await {
                debug!("Tidy attempt {} for tab {} not delivered: {}", attempt + 1, tab, e);
            }
        }
    }

    async fn redirect_shorts(&self, tab: TabId, url: &str) {
        let Some(watch_url) = watch_url_for_shorts(url) else {
            return;
        };
        if !self.prefs.settings().await.prevent_shorts {
            return;
        }

        info!("Redirecting tab {} from Shorts player to {}", tab, watch_url);
        if let Err(e) = self.host.navigate(tab, &watch_url).await {
            warn!("Failed to redirect tab {}: {}", tab, e);
        }
    }

    pub async fn on_tab_removed(&self, tab: TabId) {
        if self.prefs.remove_tab_from_store(tab).await {
            debug!("Removed tab {} from tab store", tab);
        }
    }

    pub async fn on_message(&self, message: Message) {
        match message {
            Message::UpdateTabStore => self.update_active_tab_record().await,
            other => debug!("Background ignoring message '{}'", other),
        }
    }

    /// Mirror the current page counter into the active tab's record
    async fn update_active_tab_record(&self) {
        let count = self.prefs.sections_removed_page().await;

        match self.host.active_tab().await {
            Ok(Some(tab)) => self.prefs.update_tab_store(TabRecord::new(tab, count)).await,
            Ok(None) => debug!("No active tab to record counter {} for", count),
            Err(e) => warn!("Failed to query active tab: {}", e),
        }
    }

    /// Wait, then re-inject the content script once if the host dropped this context
    pub async fn liveness_check(&self) {
        self.host.sleep(self.config.liveness_check_delay_ms).await;

        if self.host.runtime_alive() {
            return;
        }

        warn!("Extension context invalidated, re-injecting content script");
        match self.host.active_tab().await {
            Ok(Some(tab)) => {
                if let Err(e) = self.host.inject_content_script(tab).await {
                    warn!("Content script re-injection into tab {} failed: {}", tab, e);
                }
            }
            Ok(None) => debug!("No active tab to re-inject into"),
            Err(e) => warn!("Failed to query active tab: {}", e),
        }
    }
}
