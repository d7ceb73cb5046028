// Default values for modal configuration - these are the single source of truth for defaults

// Markup contract with the rendering layer
pub const DEFAULT_FOCUSABLE_SELECTOR: &str = ".focusable";
pub const DEFAULT_CLOSE_SELECTOR: &str = "button[title=\"Close\"]";
pub const DEFAULT_SAVE_SELECTOR: &str = "button.save";
/// Class given to a generated save control; must satisfy the save selector.
pub const DEFAULT_SAVE_CLASS: &str = "save";
pub const DEFAULT_INNER_SELECTOR: &str = ".inner-modal";
pub const DEFAULT_OUTER_MARKER: &str = "outer-modal";
pub const DEFAULT_FIRST_SENTINEL_CLASS: &str = "first-focusable";
pub const DEFAULT_LAST_SENTINEL_CLASS: &str = "last-focusable";

// Class tokens
pub const MODAL_BASE_CLASS: &str = "modal";
pub const MODAL_OPEN_CLASSES: &str = "visible fade-in-open";
pub const MODAL_CLOSED_CLASSES: &str = "hidden";
pub const BACKDROP_BASE_CLASS: &str = "backdrop";
pub const BACKDROP_OPEN_CLASS: &str = "backdrop-open";

// Key identification, both legacy key codes and named keys
pub const ESC_KEY_CODE: u32 = 27;
pub const ESC_KEY_STRING: &str = "Escape";
pub const TAB_KEY_CODE: u32 = 9;
pub const TAB_KEY_STRING: &str = "Tab";

// Focus wait timing
pub const DEFAULT_SETTLE_TIMEOUT_MS: u32 = 50;
pub const DEFAULT_SETTLE_TICK_MS: u32 = 10;
