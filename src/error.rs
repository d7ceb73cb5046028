//! Error type for the fallible edges of the controller.
//!
//! State transitions themselves never fail; only setup does (parsing
//! configuration, registering global listeners).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModalError {
    #[error("invalid modal configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse modal configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("could not register `{event}` listener: {reason}")]
    Listener { event: &'static str, reason: String },

    #[error("modal markup is missing `{0}`")]
    MissingMarkup(String),
}

#[cfg(target_arch = "wasm32")]
impl From<ModalError> for wasm_bindgen::JsValue {
    fn from(err: ModalError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
