/// `PageDom` over the live document
use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, NodeList};

use crate::content::matcher::PageDom;
use crate::error::{ExtensionError, Result};

pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        WebDom { document }
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl PageDom for WebDom {
    type Node = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        match self.document.query_selector_all(selector) {
            Ok(list) => elements(&list),
            Err(e) => {
                warn!("Query '{}' failed: {:?}", selector, e);
                Vec::new()
            }
        }
    }

    fn texts_within(&self, node: &Element, selector: &str) -> Vec<String> {
        match node.query_selector_all(selector) {
            Ok(list) => elements(&list)
                .into_iter()
                .filter_map(|element| element.dyn_into::<HtmlElement>().ok())
                .map(|element| element.inner_text())
                .collect(),
            Err(e) => {
                warn!("Query '{}' failed: {:?}", selector, e);
                Vec::new()
            }
        }
    }

    fn has_children(&self, node: &Element) -> bool {
        node.first_child().is_some()
    }

    fn detach(&self, node: &Element) -> Result<()> {
        let parent = node
            .parent_node()
            .ok_or_else(|| ExtensionError::Dom("element is already detached".to_string()))?;

        parent
            .remove_child(node)
            .map(|_| ())
            .map_err(|e| ExtensionError::Dom(format!("{:?}", e)))
    }
}
