//! Render-facing outputs.
//!
//! Class strings are pure functions of the open flag; nothing is cached or
//! mutated in place.  [`ModalView`] bundles everything a renderer reads in
//! one pass.

use serde::Serialize;

use crate::constants::{
    BACKDROP_BASE_CLASS, BACKDROP_OPEN_CLASS, MODAL_BASE_CLASS, MODAL_CLOSED_CLASSES,
    MODAL_OPEN_CLASSES,
};

pub fn modal_class(is_open: bool) -> String {
    let state = if is_open {
        MODAL_OPEN_CLASSES
    } else {
        MODAL_CLOSED_CLASSES
    };
    format!("{MODAL_BASE_CLASS} {state}")
}

pub fn backdrop_class(is_open: bool) -> String {
    if is_open {
        format!("{BACKDROP_BASE_CLASS} {BACKDROP_OPEN_CLASS}")
    } else {
        BACKDROP_BASE_CLASS.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalView {
    pub css_class: String,
    pub backdrop_class: String,
    pub aria_hidden: bool,
    pub header: Option<String>,
    pub tagline: Option<String>,
    /// The header block is rendered only once a header text is set.
    pub show_header: bool,
    /// A save control is rendered only when the host supplied a handler.
    pub show_save: bool,
}
