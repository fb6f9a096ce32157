/// Message vocabulary exchanged between the extension contexts
use std::fmt;
use std::str::FromStr;

use crate::error::ExtensionError;

/// A runtime message. On the wire every message is its literal name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    /// background → content: run all armed matchers now
    TidyWhileLoading,
    /// popup/background → content: re-read the running flag and settings
    ExtensionStateChanged,
    /// content/background → popup: page counter updated
    SectionsRemovedPageChanged,
    /// content → popup: page and total counters updated
    SectionsRemovedBothChanged,
    /// background → popup: reset the displayed page counter
    ResetSectionsRemovedPage,
    /// content/popup → background: upsert the active tab's record
    UpdateTabStore,
}

impl Message {
    pub const ALL: [Message; 6] = [
        Message::TidyWhileLoading,
        Message::ExtensionStateChanged,
        Message::SectionsRemovedPageChanged,
        Message::SectionsRemovedBothChanged,
        Message::ResetSectionsRemovedPage,
        Message::UpdateTabStore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Message::TidyWhileLoading => "tidyWhileLoading",
            Message::ExtensionStateChanged => "extensionStateChanged",
            Message::SectionsRemovedPageChanged => "sectionsRemovedPageChanged",
            Message::SectionsRemovedBothChanged => "sectionsRemovedBothChanged",
            Message::ResetSectionsRemovedPage => "resetSectionsRemovedPage",
            Message::UpdateTabStore => "BGupdateTabStore",
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Message {
    type Err = ExtensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::ALL
            .into_iter()
            .find(|message| message.as_str() == s)
            .ok_or_else(|| ExtensionError::UnknownMessage(s.to_string()))
    }
}

/// Which counters a "counter changed" notification covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterScope {
    Page,
    Both,
}

impl CounterScope {
    pub fn message(&self) -> Message {
        match self {
            CounterScope::Page => Message::SectionsRemovedPageChanged,
            CounterScope::Both => Message::SectionsRemovedBothChanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_messages() {
        assert_eq!("tidyWhileLoading".parse::<Message>().unwrap(), Message::TidyWhileLoading);
        assert_eq!("BGupdateTabStore".parse::<Message>().unwrap(), Message::UpdateTabStore);
        assert_eq!(
            "resetSectionsRemovedPage".parse::<Message>().unwrap(),
            Message::ResetSectionsRemovedPage
        );
    }

    #[test]
    fn test_parse_unknown_message() {
        let err = "bgUpdateTabStore".parse::<Message>().unwrap_err();
        assert!(matches!(err, ExtensionError::UnknownMessage(ref s) if s == "bgUpdateTabStore"));
    }

    #[test]
    fn test_wire_names_are_unique() {
        let mut names: Vec<&str> = Message::ALL.iter().map(|m| m.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Message::ALL.len());
    }

    #[test]
    fn test_counter_scope_messages() {
        assert_eq!(CounterScope::Page.message(), Message::SectionsRemovedPageChanged);
        assert_eq!(CounterScope::Both.message(), Message::SectionsRemovedBothChanged);
        assert_eq!(CounterScope::Both.message().to_string(), "sectionsRemovedBothChanged");
    }
}
