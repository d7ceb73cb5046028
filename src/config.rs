//! Modal configuration.
//!
//! Every field has a default taken from [`crate::constants`], so hosts only
//! spell out what differs from the stock markup contract.  The browser host
//! usually passes a plain JS object; tests and native callers use JSON.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::dismiss::DismissStrategy;
use crate::error::ModalError;
use crate::trap::TrapStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModalConfig {
    /// Marker matched by every element that may receive focus inside the dialog.
    pub focusable_selector: String,
    /// Region whose focusable descendants are deliberately skipped.
    pub excluded_region_selector: Option<String>,
    pub close_selector: String,
    pub save_selector: String,
    /// Class put on a save control the binding creates itself.
    pub save_class: String,
    /// Inner content panel, measured by the geometric dismiss strategy.
    pub inner_selector: String,
    /// Class carried by the area outside the inner panel.
    pub outer_marker: String,
    pub first_sentinel_class: String,
    pub last_sentinel_class: String,
    pub trap_strategy: TrapStrategy,
    pub dismiss_strategy: DismissStrategy,
    pub settle_timeout_ms: u32,
    pub settle_tick_ms: u32,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            focusable_selector: DEFAULT_FOCUSABLE_SELECTOR.to_string(),
            excluded_region_selector: None,
            close_selector: DEFAULT_CLOSE_SELECTOR.to_string(),
            save_selector: DEFAULT_SAVE_SELECTOR.to_string(),
            save_class: DEFAULT_SAVE_CLASS.to_string(),
            inner_selector: DEFAULT_INNER_SELECTOR.to_string(),
            outer_marker: DEFAULT_OUTER_MARKER.to_string(),
            first_sentinel_class: DEFAULT_FIRST_SENTINEL_CLASS.to_string(),
            last_sentinel_class: DEFAULT_LAST_SENTINEL_CLASS.to_string(),
            trap_strategy: TrapStrategy::default(),
            dismiss_strategy: DismissStrategy::default(),
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            settle_tick_ms: DEFAULT_SETTLE_TICK_MS,
        }
    }
}

impl ModalConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self, ModalError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert a JS object handed over by the host page.  `undefined` and
    /// `null` yield the defaults.
    #[cfg(target_arch = "wasm32")]
    pub fn from_js(value: wasm_bindgen::JsValue) -> Result<Self, ModalError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: Self = serde_wasm_bindgen::from_value(value)
            .map_err(|e| ModalError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ModalError> {
        let required = [
            ("focusableSelector", &self.focusable_selector),
            ("closeSelector", &self.close_selector),
            ("saveSelector", &self.save_selector),
            ("saveClass", &self.save_class),
            ("innerSelector", &self.inner_selector),
            ("outerMarker", &self.outer_marker),
            ("firstSentinelClass", &self.first_sentinel_class),
            ("lastSentinelClass", &self.last_sentinel_class),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ModalError::InvalidConfig(format!("`{name}` must not be empty")));
            }
        }
        if matches!(&self.excluded_region_selector, Some(s) if s.trim().is_empty()) {
            return Err(ModalError::InvalidConfig(
                "`excludedRegionSelector` must be omitted rather than empty".to_string(),
            ));
        }
        if self.settle_tick_ms == 0 {
            return Err(ModalError::InvalidConfig("`settleTickMs` must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = ModalConfig::from_json("{}").unwrap();
        assert_eq!(config, ModalConfig::default());
        assert_eq!(config.focusable_selector, ".focusable");
        assert_eq!(config.trap_strategy, TrapStrategy::Refocus);
        assert_eq!(config.dismiss_strategy, DismissStrategy::Structural);
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = ModalConfig::from_json(
            r#"{"trapStrategy":"sentinel","excludedRegionSelector":".modal-body","settleTimeoutMs":120}"#,
        )
        .unwrap();
        assert_eq!(config.trap_strategy, TrapStrategy::Sentinel);
        assert_eq!(config.excluded_region_selector.as_deref(), Some(".modal-body"));
        assert_eq!(config.settle_timeout_ms, 120);
        assert_eq!(config.close_selector, DEFAULT_CLOSE_SELECTOR);
    }

    #[test]
    fn rejects_blank_selector() {
        let err = ModalConfig::from_json(r#"{"closeSelector":"  "}"#).unwrap_err();
        assert!(matches!(err, ModalError::InvalidConfig(msg) if msg.contains("closeSelector")));
    }

    #[test]
    fn save_class_is_configurable() {
        let config =
            ModalConfig::from_json(r#"{"saveSelector":"[data-save]","saveClass":"btn-save"}"#).unwrap();
        assert_eq!(config.save_class, "btn-save");
        assert_eq!(ModalConfig::default().save_class, "save");

        let err = ModalConfig::from_json(r#"{"saveClass":""}"#).unwrap_err();
        assert!(matches!(err, ModalError::InvalidConfig(msg) if msg.contains("saveClass")));
    }

    #[test]
    fn rejects_zero_tick() {
        let err = ModalConfig::from_json(r#"{"settleTickMs":0}"#).unwrap_err();
        assert!(matches!(err, ModalError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ModalConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ModalError::ConfigParse(_)));
    }
}
