//! Accessible modal-dialog controller.
//!
//! The state machine, focus trap and dismissal rules live in plain Rust
//! behind the [`dom::ModalDom`] and [`listeners::ListenerTarget`] seams, so
//! they run (and are tested) natively.  On `wasm32` the [`components`]
//! module binds them to the real DOM and exports `ModalHandle` to JS.

#[macro_use]
mod macros;

pub mod config;
pub mod constants;
pub mod controller;
pub mod dismiss;
pub mod dom;
pub mod error;
pub mod focus;
pub mod keys;
pub mod listeners;
pub mod trap;
pub mod view;
pub mod widget;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

#[cfg(target_arch = "wasm32")]
pub mod components;
#[cfg(target_arch = "wasm32")]
pub mod dom_utils;

pub use config::ModalConfig;
pub use controller::{ModalController, ModalState, SaveHandler, ViewObserver};
pub use dismiss::{ClickInput, DismissStrategy, DismissTrigger};
pub use dom::{ModalDom, Rect};
pub use error::ModalError;
pub use keys::{KeyInput, KeyKind};
pub use listeners::{ListenerKind, ListenerTarget};
pub use trap::{TrapAction, TrapStrategy};
pub use view::ModalView;
pub use widget::Modal;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// Entry point for the WASM module
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    // Initialize better panic messages
    console_error_panic_hook::set_once();
    debug_log!("modal-focus-trap loaded");
}
