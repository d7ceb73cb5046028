pub mod listeners;
pub mod modal;

// Re-export commonly used items
pub use listeners::{GlooTicker, WebListenerTarget, WebSubscription};
pub use modal::{ensure_modal, ModalHandle};
