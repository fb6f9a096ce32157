/// Host trait implementations over the extension APIs
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::error::{self, ExtensionError};
use crate::host::{Messenger, StorageArea, TabsApi, Timer};
use crate::messages::Message;
use crate::tab_store::TabId;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn storageGet(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn storageSet(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn storageRemove(key: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn runtimeSendMessage(message: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn tabsSendMessage(tab_id: i32, message: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn activeTabId() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn injectContentScript(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateTabUrl(tab_id: i32, url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn delay(millis: u32) -> Result<(), JsValue>;

    fn runtimeAlive() -> bool;

    pub(crate) fn onTabActivated(callback: &js_sys::Function);

    pub(crate) fn onTabUpdated(callback: &js_sys::Function);

    pub(crate) fn onTabRemoved(callback: &js_sys::Function);

    pub(crate) fn onRuntimeMessage(callback: &js_sys::Function);
}

/// `chrome.storage.local`
pub struct ChromeStorage;

impl StorageArea for ChromeStorage {
    async fn get(&self, key: &str) -> error::Result<Option<Value>> {
        let value_js = storageGet(key)
            .await
            .map_err(|e| ExtensionError::Storage(format!("Failed to get '{}': {:?}", key, e)))?;

        if value_js.is_null() || value_js.is_undefined() {
            return Ok(None);
        }

        serde_wasm_bindgen::from_value(value_js)
            .map(Some)
            .map_err(|e| ExtensionError::Storage(format!("Failed to parse '{}': {:?}", key, e)))
    }

    async fn set(&self, key: &str, value: Value) -> error::Result<()> {
        // Plain objects, not Maps, so the storage API can persist them
        let value_js = value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ExtensionError::Storage(format!("Failed to serialize '{}': {:?}", key, e)))?;

        storageSet(key, value_js)
            .await
            .map_err(|e| ExtensionError::Storage(format!("Failed to set '{}': {:?}", key, e)))
    }

    async fn remove(&self, key: &str) -> error::Result<()> {
        storageRemove(key)
            .await
            .map_err(|e| ExtensionError::Storage(format!("Failed to remove '{}': {:?}", key, e)))
    }
}

/// `chrome.runtime`, `chrome.tabs` and timers
pub struct ChromeRuntime;

impl Messenger for ChromeRuntime {
    async fn broadcast(&self, message: Message) -> error::Result<()> {
        runtimeSendMessage(message.as_str())
            .await
            .map_err(|e| ExtensionError::Messaging(format!("{:?}", e)))
    }

    async fn send_to_tab(&self, tab: TabId, message: Message) -> error::Result<()> {
        tabsSendMessage(tab, message.as_str())
            .await
            .map_err(|e| ExtensionError::Messaging(format!("tab {}: {:?}", tab, e)))
    }
}

impl TabsApi for ChromeRuntime {
    async fn active_tab(&self) -> error::Result<Option<TabId>> {
        let tab_js = activeTabId()
            .await
            .map_err(|e| ExtensionError::Tabs(format!("Failed to query tabs: {:?}", e)))?;

        Ok(tab_js.as_f64().map(|id| id as TabId))
    }

    async fn inject_content_script(&self, tab: TabId) -> error::Result<()> {
        injectContentScript(tab)
            .await
            .map_err(|e| ExtensionError::Tabs(format!("Failed to inject into tab {}: {:?}", tab, e)))
    }

    async fn navigate(&self, tab: TabId, url: &str) -> error::Result<()> {
        updateTabUrl(tab, url)
            .await
            .map_err(|e| ExtensionError::Tabs(format!("Failed to update tab {}: {:?}", tab, e)))
    }

    fn runtime_alive(&self) -> bool {
        runtimeAlive()
    }
}

impl Timer for ChromeRuntime {
    async fn sleep(&self, millis: u32) {
        let _ = delay(millis).await;
    }
}
