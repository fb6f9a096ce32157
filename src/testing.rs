/// In-memory host fakes for unit tests
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::content::matcher::PageDom;
use crate::error::{ExtensionError, Result};
use crate::host::{Messenger, StorageArea, TabsApi, Timer};
use crate::messages::Message;
use crate::tab_store::TabId;

pub struct MemoryStorage {
    values: RefCell<HashMap<String, Value>>,
    writes: Cell<usize>,
    failing: Cell<bool>,
    yielding: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            values: RefCell::new(HashMap::new()),
            writes: Cell::new(0),
            failing: Cell::new(false),
            yielding: Cell::new(false),
        }
    }

    /// Seed a value without counting it as a write
    pub fn insert(&self, key: &str, value: Value) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn fail_all(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Suspend once inside every get and set so concurrent callers interleave
    pub fn yield_on_access(&self, yielding: bool) {
        self.yielding.set(yielding);
    }

    async fn pause(&self) {
        if self.yielding.get() {
            tokio::task::yield_now().await;
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing.get() {
            Err(ExtensionError::Storage("storage unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl StorageArea for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.check()?;
        self.pause().await;
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.check()?;
        self.pause().await;
        self.writes.set(self.writes.get() + 1);
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check()?;
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Everything the fake host was asked to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Broadcast(Message),
    SendToTab(TabId, Message),
    Sleep(u32),
    Inject(TabId),
    Navigate(TabId, String),
}

pub struct FakeHost {
    events: RefCell<Vec<HostEvent>>,
    active_tab: Cell<Option<TabId>>,
    alive: Cell<bool>,
    fail_messages: Cell<bool>,
}

impl FakeHost {
    pub fn new() -> Self {
        FakeHost {
            events: RefCell::new(Vec::new()),
            active_tab: Cell::new(None),
            alive: Cell::new(true),
            fail_messages: Cell::new(false),
        }
    }

    pub fn set_active_tab(&self, tab: Option<TabId>) {
        self.active_tab.set(tab);
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.set(alive);
    }

    /// Make every send fail, as when no receiving context exists
    pub fn fail_messages(&self, failing: bool) {
        self.fail_messages.set(failing);
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    pub fn broadcasts(&self) -> Vec<Message> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                HostEvent::Broadcast(message) => Some(*message),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: HostEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl Messenger for FakeHost {
    async fn broadcast(&self, message: Message) -> Result<()> {
        self.record(HostEvent::Broadcast(message));
        if self.fail_messages.get() {
            return Err(ExtensionError::Messaging(
                "Receiving end does not exist".to_string(),
            ));
        }
        Ok(())
    }

    async fn send_to_tab(&self, tab: TabId, message: Message) -> Result<()> {
        self.record(HostEvent::SendToTab(tab, message));
        if self.fail_messages.get() {
            return Err(ExtensionError::Messaging(
                "Receiving end does not exist".to_string(),
            ));
        }
        Ok(())
    }
}

impl TabsApi for FakeHost {
    async fn active_tab(&self) -> Result<Option<TabId>> {
        Ok(self.active_tab.get())
    }

    async fn inject_content_script(&self, tab: TabId) -> Result<()> {
        self.record(HostEvent::Inject(tab));
        Ok(())
    }

    async fn navigate(&self, tab: TabId, url: &str) -> Result<()> {
        self.record(HostEvent::Navigate(tab, url.to_string()));
        Ok(())
    }

    fn runtime_alive(&self) -> bool {
        self.alive.get()
    }
}

impl Timer for FakeHost {
    async fn sleep(&self, millis: u32) {
        self.record(HostEvent::Sleep(millis));
    }
}

#[derive(Debug, Clone)]
struct FakeNode {
    tag: String,
    span_texts: Vec<String>,
    has_children: bool,
    attached: bool,
    fail_detach: bool,
}

/// Flat fake document. Selectors match tag names exactly.
pub struct FakeDom {
    nodes: RefCell<Vec<FakeNode>>,
}

impl FakeDom {
    pub fn new() -> Self {
        FakeDom {
            nodes: RefCell::new(Vec::new()),
        }
    }

    pub fn add(&self, tag: &str) -> usize {
        self.add_node(tag, &[], true)
    }

    pub fn add_shelf(&self, tag: &str, span_texts: &[&str]) -> usize {
        self.add_node(tag, span_texts, true)
    }

    pub fn add_empty(&self, tag: &str) -> usize {
        self.add_node(tag, &[], false)
    }

    pub fn fail_detach(&self, node: usize) {
        self.nodes.borrow_mut()[node].fail_detach = true;
    }

    pub fn is_attached(&self, node: usize) -> bool {
        self.nodes.borrow()[node].attached
    }

    fn add_node(&self, tag: &str, span_texts: &[&str], has_children: bool) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(FakeNode {
            tag: tag.to_string(),
            span_texts: span_texts.iter().map(|s| s.to_string()).collect(),
            has_children,
            attached: true,
            fail_detach: false,
        });
        nodes.len() - 1
    }
}

impl PageDom for FakeDom {
    type Node = usize;

    fn query_all(&self, selector: &str) -> Vec<usize> {
        self.nodes
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.attached && node.tag == selector)
            .map(|(index, _)| index)
            .collect()
    }

    fn texts_within(&self, node: &usize, selector: &str) -> Vec<String> {
        if selector != "span" {
            return Vec::new();
        }
        self.nodes.borrow()[*node].span_texts.clone()
    }

    fn has_children(&self, node: &usize) -> bool {
        self.nodes.borrow()[*node].has_children
    }

    fn detach(&self, node: &usize) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        let entry = &mut nodes[*node];
        if entry.fail_detach || !entry.attached {
            return Err(ExtensionError::Dom("node has no parent".to_string()));
        }
        entry.attached = false;
        Ok(())
    }
}
