//! dom_utils.rs – the browser side of [`ModalDom`].
//!
//! The dialog renders its own markup into a shadow root and receives page
//! content through a `<slot>`.  Those two trees answer selector queries
//! separately (`shadowRoot.querySelectorAll` vs `host.querySelectorAll`),
//! so [`WebModalDom`] stitches them back together in the order a keyboard
//! user would tab through them.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node, NodeList, ShadowRoot};

use crate::dom::{ModalDom, Rect};
use crate::error::ModalError;

#[derive(Debug, Clone)]
pub struct WebModalDom {
    host: Element,
    shadow: Option<ShadowRoot>,
    document: Document,
}

impl WebModalDom {
    /// Wrap a mounted host element.  Without a shadow root the host's own
    /// subtree is treated as the dialog markup and nothing counts as slotted.
    pub fn new(host: Element) -> Result<Self, ModalError> {
        let document = host
            .owner_document()
            .ok_or_else(|| ModalError::MissingMarkup("owner document".to_string()))?;
        Ok(Self {
            shadow: host.shadow_root(),
            host,
            document,
        })
    }

    pub fn host(&self) -> &Element {
        &self.host
    }

    pub fn shadow_root(&self) -> Option<&ShadowRoot> {
        self.shadow.as_ref()
    }

    fn own_markup(&self, selector: &str) -> Vec<Element> {
        let list = match &self.shadow {
            Some(shadow) => shadow.query_selector_all(selector),
            None => self.host.query_selector_all(selector),
        };
        list.map(|l| elements(&l)).unwrap_or_default()
    }

    /// Light-DOM children of the host, i.e. what the `<slot>` projects.
    fn slotted(&self, selector: &str) -> Vec<Element> {
        if self.shadow.is_none() {
            return Vec::new();
        }
        self.host
            .query_selector_all(selector)
            .map(|l| elements(&l))
            .unwrap_or_default()
    }
}

/// Collect the element nodes of a `NodeList`.
pub fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|idx| list.get(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Focus an element if it is focusable at all.  Returns false for
/// non-HTML elements (e.g. SVG) and when the browser refuses.
pub fn focus_element(element: &Element) -> bool {
    element
        .dyn_ref::<HtmlElement>()
        .map(|el| el.focus().is_ok())
        .unwrap_or(false)
}

/// True when `element` comes before `reference` in tree order.
fn precedes(element: &Element, reference: &Element) -> bool {
    let reference: &Node = reference.as_ref();
    let position = reference.compare_document_position(element.as_ref());
    position & Node::DOCUMENT_POSITION_PRECEDING != 0
}

impl ModalDom for WebModalDom {
    type Element = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let own = self.own_markup(selector);
        let Some(shadow) = &self.shadow else {
            return own;
        };
        // Unslotted content is not rendered, so it cannot take focus either.
        let Some(slot) = shadow.query_selector("slot").ok().flatten() else {
            return own;
        };

        let (before, after): (Vec<Element>, Vec<Element>) =
            own.into_iter().partition(|el| precedes(el, &slot));
        before
            .into_iter()
            .chain(self.slotted(selector))
            .chain(after)
            .collect()
    }

    fn query(&self, selector: &str) -> Option<Element> {
        let found = match &self.shadow {
            Some(shadow) => shadow.query_selector(selector),
            None => self.host.query_selector(selector),
        };
        found.ok().flatten()
    }

    fn within(&self, element: &Element, selector: &str) -> bool {
        matches!(element.closest(selector), Ok(Some(_)))
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn is_disabled(&self, element: &Element) -> bool {
        element.has_attribute("disabled")
            || element.get_attribute("aria-disabled").as_deref() == Some("true")
    }

    fn is_connected(&self, element: &Element) -> bool {
        let node: &Node = element.as_ref();
        node.is_connected()
    }

    fn active_element(&self) -> Option<Element> {
        // Inside the shadow tree the document only reports the host, so ask
        // the shadow root first.  Slotted elements live in the light DOM and
        // show up on the document.
        self.shadow
            .as_ref()
            .and_then(|shadow| shadow.active_element())
            .or_else(|| self.document.active_element())
    }

    fn focus(&self, element: &Element) {
        if !focus_element(element) {
            warn_log!("could not focus <{}>", element.tag_name().to_lowercase());
        }
    }

    fn bounding_rect(&self, element: &Element) -> Option<Rect> {
        let rect = element.get_bounding_client_rect();
        Some(Rect::new(rect.top(), rect.left(), rect.bottom(), rect.right()))
    }
}

// ---------------------------------------------------------------------------
// wasm-bindgen tests (run with `wasm-pack test --headless --firefox`)
// ---------------------------------------------------------------------------
