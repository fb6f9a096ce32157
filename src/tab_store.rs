/// Per-tab page counter table, persisted under a single storage key
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Host tab identifier
pub type TabId = i32;

/// Last known page counter for a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub tab: TabId,
    pub sections_removed_page: u32,
}

impl TabRecord {
    pub fn new(tab: TabId, sections_removed_page: u32) -> TabRecord {
        TabRecord {
            tab,
            sections_removed_page,
        }
    }
}

/// Root tab store structure. Serializes as `{ "<tab id>": <counter>, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabStore {
    entries: BTreeMap<TabId, u32>,
}

impl TabStore {
    pub fn new() -> Self {
        TabStore {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, tab: TabId) -> Option<u32> {
        self.entries.get(&tab).copied()
    }

    /// Insert or overwrite the record for `record.tab`
    pub fn upsert(&mut self, record: TabRecord) {
        self.entries.insert(record.tab, record.sections_removed_page);
    }

    /// Remove the record for `tab`. Returns false if there was none.
    pub fn remove(&mut self, tab: TabId) -> bool {
        self.entries.remove(&tab).is_some()
    }

    pub fn contains(&self, tab: TabId) -> bool {
        self.entries.contains_key(&tab)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
