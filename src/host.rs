/// Host browser collaborators.
///
/// The coordination logic only talks to the browser through these traits.
/// `crate::web` implements them on top of the extension APIs; tests use the
/// in-memory fakes in `crate::testing`.

use serde_json::Value;

use crate::error::Result;
use crate::messages::Message;
use crate::tab_store::TabId;

/// Durable key-value storage shared by every extension context
pub trait StorageArea {
    /// Read a key. Absent keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Fire-and-forget runtime messaging
pub trait Messenger {
    /// Send to every other extension context (popup, background)
    async fn broadcast(&self, message: Message) -> Result<()>;

    /// Send to the content script running in `tab`
    async fn send_to_tab(&self, tab: TabId, message: Message) -> Result<()>;
}

/// Tab queries and actions used by the background context
pub trait TabsApi {
    /// Active tab of the current window, if any
    async fn active_tab(&self) -> Result<Option<TabId>>;

    async fn inject_content_script(&self, tab: TabId) -> Result<()>;

    async fn navigate(&self, tab: TabId, url: &str) -> Result<()>;

    /// False once the host has invalidated this extension context
    fn runtime_alive(&self) -> bool;
}

/// Delays
pub trait Timer {
    async fn sleep(&self, millis: u32);
}
