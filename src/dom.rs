//! The slice of the DOM the controller is allowed to see.
//!
//! The controller never builds markup.  It reads elements out of the scope
//! the host rendered, asks for the active element, and moves focus.  The
//! browser implementation lives in [`crate::dom_utils`]; tests use the fake
//! in [`crate::testing`].

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Client-space rectangle, as returned by `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self { top, left, bottom, right }
    }

    /// Edges count as inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

pub trait ModalDom {
    type Element: Clone + PartialEq + Debug;

    /// Every element in the dialog scope matching `selector`, in composed
    /// document order.  Content projected into the dialog through its slot
    /// is included at the slot's position.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// First element in the dialog's own markup matching `selector`.
    fn query(&self, selector: &str) -> Option<Self::Element>;

    /// True when `element` or one of its ancestors matches `selector`.
    fn within(&self, element: &Self::Element, selector: &str) -> bool;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn is_disabled(&self, element: &Self::Element) -> bool;

    /// Still attached to the document.
    fn is_connected(&self, element: &Self::Element) -> bool;

    /// Currently focused element, seen from the dialog.  Elements outside
    /// the dialog are reported as well so the trap can notice escapes.
    fn active_element(&self) -> Option<Self::Element>;

    /// Request focus.  Whether the element actually took it is observed
    /// through [`ModalDom::active_element`].
    fn focus(&self, element: &Self::Element);

    fn bounding_rect(&self, element: &Self::Element) -> Option<Rect>;
}
