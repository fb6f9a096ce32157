/// Typed accessors over the host storage area.
///
/// Every accessor is independently atomic and best-effort: read failures are
/// logged and answered with the key's default, write failures are logged and
/// dropped. There are no cross-key transactions; last write wins, except that
/// the read-modify-write updates of one store are serialized.
use futures::lock::Mutex;
use log::{debug, error, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ExtensionError, Result};
use crate::host::StorageArea;
use crate::settings::Settings;
use crate::tab_store::{TabId, TabRecord, TabStore};

pub const SECTIONS_REMOVED_PAGE_KEY: &str = "sectionsRemovedPage";
pub const SECTIONS_REMOVED_TOTAL_KEY: &str = "sectionsRemovedTotal";
pub const TAB_STORE_KEY: &str = "tabStore";
pub const SETTINGS_KEY: &str = "settings";
pub const DARK_MODE_KEY: &str = "darkMode";
pub const EXTENSION_RUNNING_KEY: &str = "extensionRunning";
pub const PREVIOUS_TAB_KEY: &str = "previousTab";

pub const DARK_MODE_DEFAULT: bool = true;
pub const EXTENSION_RUNNING_DEFAULT: bool = true;

pub struct PreferenceStore<S> {
    storage: S,
    // Held across the read and the write of counter and tab store updates
    update_lock: Mutex<()>,
}

impl<S: StorageArea> PreferenceStore<S> {
    pub fn new(storage: S) -> Self {
        PreferenceStore {
            storage,
            update_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.storage.get(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| ExtensionError::Decode {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    async fn read_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.read(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                error!("Failed to read '{}', using default: {}", key, e);
                default
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) {
        let result = match serde_json::to_value(value) {
            Ok(json) => self.storage.set(key, json).await,
            Err(source) => Err(ExtensionError::Decode {
                key: key.to_string(),
                source,
            }),
        };

        match result {
            Ok(()) => debug!("Stored '{}'", key),
            Err(e) => error!("Failed to store '{}': {}", key, e),
        }
    }

    // Counters

    pub async fn sections_removed_page(&self) -> u32 {
        self.read_or(SECTIONS_REMOVED_PAGE_KEY, 0).await
    }

    pub async fn set_sections_removed_page(&self, value: u32) {
        self.write(SECTIONS_REMOVED_PAGE_KEY, &value).await;
    }

    pub async fn sections_removed_total(&self) -> u32 {
        self.read_or(SECTIONS_REMOVED_TOTAL_KEY, 0).await
    }

    pub async fn set_sections_removed_total(&self, value: u32) {
        self.write(SECTIONS_REMOVED_TOTAL_KEY, &value).await;
    }

    /// Count one removed section on both counters. Returns `(page, total)`.
    pub async fn record_removal(&self) -> (u32, u32) {
        let _guard = self.update_lock.lock().await;
        let page = self.sections_removed_page().await.saturating_add(1);
        let total = self.sections_removed_total().await.saturating_add(1);

        self.set_sections_removed_page(page).await;
        self.set_sections_removed_total(total).await;

        (page, total)
    }

    // Tab store

    pub async fn tab_store(&self) -> TabStore {
        self.read_or(TAB_STORE_KEY, TabStore::new()).await
    }

    pub async fn update_tab_store(&self, record: TabRecord) {
        let _guard = self.update_lock.lock().await;
        let mut store = self.tab_store().await;
        store.upsert(record);
        self.write(TAB_STORE_KEY, &store).await;
    }

    /// Delete the record for `tab`. Absent tabs are a no-op and cause no write.
    pub async fn remove_tab_from_store(&self, tab: TabId) -> bool {
        let _guard = self.update_lock.lock().await;
        let mut store = self.tab_store().await;
        if !store.remove(tab) {
            return false;
        }
        self.write(TAB_STORE_KEY, &store).await;
        true
    }

    // Settings

    pub async fn settings(&self) -> Settings {
        self.read_or(SETTINGS_KEY, Settings::default()).await
    }

    pub async fn set_settings(&self, settings: &Settings) {
        self.write(SETTINGS_KEY, settings).await;
    }

    // Dark mode

    /// Stored preference, or the default. The default is written back the
    /// first time it is handed out.
    pub async fn dark_mode(&self) -> bool {
        match self.read::<bool>(DARK_MODE_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                self.set_dark_mode(DARK_MODE_DEFAULT).await;
                DARK_MODE_DEFAULT
            }
            Err(e) => {
                error!("An error occurred when trying to get dark mode preference: {}", e);
                DARK_MODE_DEFAULT
            }
        }
    }

    pub async fn set_dark_mode(&self, value: bool) {
        self.write(DARK_MODE_KEY, &value).await;
    }

    pub async fn clear_dark_mode(&self) {
        match self.storage.remove(DARK_MODE_KEY).await {
            Ok(()) => debug!("Cleared dark mode preference"),
            Err(e) => error!("Failed to clear dark mode preference: {}", e),
        }
    }

    // Extension state

    pub async fn extension_running(&self) -> bool {
        self.read_or(EXTENSION_RUNNING_KEY, EXTENSION_RUNNING_DEFAULT).await
    }

    pub async fn set_extension_running(&self, running: bool) {
        self.write(EXTENSION_RUNNING_KEY, &running).await;
    }

    pub async fn set_previous_tab(&self, tab: Option<TabId>) {
        match tab {
            Some(tab) => self.write(PREVIOUS_TAB_KEY, &tab).await,
            None => {
                if let Err(e) = self.storage.remove(PREVIOUS_TAB_KEY).await {
                    warn!("Failed to clear previous tab: {}", e);
                }
            }
        }
    }
}
