//! Small crate-wide logging macros.
//!
//! In the browser they forward to `console.log` / `console.warn`.  On native
//! targets (unit tests, docs) there is no console to talk to, so the
//! arguments are only type-checked and then dropped.

/// Debug-level trace of controller activity (transitions, listener attach /
/// detach).
///
/// ```rust,ignore
/// debug_log!("modal opened via {:?}", trigger);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::log_1(&format!($($arg)*).into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = format!($($arg)*);
        }
    }};
}

/// Host contract violations that the controller tolerates but should not go
/// unnoticed, e.g. markup without a close button.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::warn_1(&format!($($arg)*).into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = format!($($arg)*);
        }
    }};
}
