/// Error type shared by the background and content contexts
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Storage access failed: {0}")]
    Storage(String),

    #[error("Message delivery failed: {0}")]
    Messaging(String),

    #[error("Tabs API call failed: {0}")]
    Tabs(String),

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("Unknown message: {0}")]
    UnknownMessage(String),

    #[error("Failed to decode stored value for '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExtensionError>;
