/// TidyTube - Chrome Extension that tidies video site pages
/// Built with Rust + WASM

pub mod background;
pub mod content;
pub mod error;
#[allow(async_fn_in_trait)]
pub mod host;
pub mod messages;
pub mod preferences;
pub mod redirect;
pub mod settings;
pub mod tab_store;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

pub use error::{ExtensionError, Result};
pub use messages::Message;
pub use settings::Settings;
pub use tab_store::{TabId, TabRecord, TabStore};

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}
