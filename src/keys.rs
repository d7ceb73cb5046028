//! Keyboard input normalization.
//!
//! Browsers and test harnesses disagree on how a key is identified: legacy
//! `keyCode`, the physical `code`, or the logical `key`.  Everything is
//! folded into [`KeyKind`] before the trap policy looks at it.

use serde::{Deserialize, Serialize};

use crate::constants::{ESC_KEY_CODE, ESC_KEY_STRING, TAB_KEY_CODE, TAB_KEY_STRING};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Escape,
    Tab,
    Other,
}

/// A keyup event as delivered by the host.  Any subset of the identifying
/// fields may be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyInput {
    pub key_code: Option<u32>,
    pub code: Option<String>,
    pub key: Option<String>,
    pub shift_key: bool,
}

impl KeyInput {
    pub fn from_code(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Self::default()
        }
    }

    pub fn from_key_code(key_code: u32) -> Self {
        Self {
            key_code: Some(key_code),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn kind(&self) -> KeyKind {
        if self.is(ESC_KEY_CODE, ESC_KEY_STRING) {
            KeyKind::Escape
        } else if self.is(TAB_KEY_CODE, TAB_KEY_STRING) {
            KeyKind::Tab
        } else {
            KeyKind::Other
        }
    }

    fn is(&self, key_code: u32, name: &str) -> bool {
        self.key_code == Some(key_code)
            || self.code.as_deref() == Some(name)
            || self.key.as_deref() == Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escape_by_code_or_name() {
        assert_eq!(KeyInput::from_key_code(27).kind(), KeyKind::Escape);
        assert_eq!(KeyInput::from_code("Escape").kind(), KeyKind::Escape);
        let by_key = KeyInput {
            key: Some("Escape".into()),
            ..KeyInput::default()
        };
        assert_eq!(by_key.kind(), KeyKind::Escape);
    }

    #[test]
    fn tab_by_code_or_name() {
        assert_eq!(KeyInput::from_key_code(9).kind(), KeyKind::Tab);
        assert_eq!(KeyInput::from_code("Tab").with_shift().kind(), KeyKind::Tab);
    }

    #[test]
    fn empty_event_is_other() {
        assert_eq!(KeyInput::default().kind(), KeyKind::Other);
        assert_eq!(KeyInput::from_code("KeyA").kind(), KeyKind::Other);
    }

    #[test]
    fn deserializes_dom_shaped_payload() {
        let input: KeyInput =
            serde_json::from_str(r#"{"keyCode":9,"code":"Tab","shiftKey":true}"#).unwrap();
        assert_eq!(input.kind(), KeyKind::Tab);
        assert!(input.shift_key);
    }

    proptest! {
        #[test]
        fn unrelated_key_codes_are_other(code in 0u32..256) {
            prop_assume!(code != ESC_KEY_CODE && code != TAB_KEY_CODE);
            prop_assert_eq!(KeyInput::from_key_code(code).kind(), KeyKind::Other);
        }

        #[test]
        fn named_escape_wins_regardless_of_key_code(code in 0u32..256) {
            let input = KeyInput { key_code: Some(code), code: Some("Escape".into()), ..KeyInput::default() };
            prop_assert_eq!(input.kind(), KeyKind::Escape);
        }
    }
}
