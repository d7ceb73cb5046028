//! Keyboard rules applied while the dialog is open.
//!
//! The policy is consulted on every keyup the global listener sees.  It
//! only *decides*; the controller carries the decision out.  While the
//! dialog is closed every key is ignored.

use serde::{Deserialize, Serialize};

use crate::config::ModalConfig;
use crate::dom::ModalDom;
use crate::focus::FocusableElementScanner;
use crate::keys::{KeyInput, KeyKind};

/// How Tab is kept inside the dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrapStrategy {
    /// After each Tab, pull focus back to the first focusable element if it
    /// wandered out of the focusable set.
    #[default]
    Refocus,
    /// Wrap explicitly at elements carrying the first / last sentinel
    /// classes.  Shift+Tab on the first goes to the save control (or the
    /// close control without a save handler); Tab on the last goes to the
    /// close control.
    Sentinel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapAction<E> {
    Close,
    Focus(E),
    Stay,
}

#[derive(Debug, Clone)]
pub struct FocusTrapPolicy {
    strategy: TrapStrategy,
    first_sentinel_class: String,
    last_sentinel_class: String,
    save_selector: String,
}

impl FocusTrapPolicy {
    pub fn from_config(config: &ModalConfig) -> Self {
        Self {
            strategy: config.trap_strategy,
            first_sentinel_class: config.first_sentinel_class.clone(),
            last_sentinel_class: config.last_sentinel_class.clone(),
            save_selector: config.save_selector.clone(),
        }
    }

    pub fn strategy(&self) -> TrapStrategy {
        self.strategy
    }

    pub fn evaluate<D: ModalDom>(
        &self,
        dom: &D,
        scanner: &FocusableElementScanner,
        key: &KeyInput,
        is_open: bool,
        has_save_handler: bool,
    ) -> TrapAction<D::Element> {
        if !is_open {
            return TrapAction::Stay;
        }
        match key.kind() {
            KeyKind::Escape => TrapAction::Close,
            KeyKind::Tab => match self.strategy {
                TrapStrategy::Refocus => self.keep_inside(dom, scanner, &[]),
                TrapStrategy::Sentinel => self.wrap_at_sentinels(dom, scanner, key, has_save_handler),
            },
            KeyKind::Other => TrapAction::Stay,
        }
    }

    /// Refocus the first member when the active element is not one of the
    /// trap members.  With no focusable content the close control is the
    /// only member.
    fn keep_inside<D: ModalDom>(
        &self,
        dom: &D,
        scanner: &FocusableElementScanner,
        extra_members: &[D::Element],
    ) -> TrapAction<D::Element> {
        let mut members = scanner.scan(dom);
        if members.is_empty() {
            members.extend(scanner.close_affordance(dom));
        }
        members.extend(extra_members.iter().cloned());

        let inside = dom
            .active_element()
            .is_some_and(|active| members.contains(&active));
        if inside {
            return TrapAction::Stay;
        }
        match members.into_iter().next() {
            Some(first) => TrapAction::Focus(first),
            None => {
                warn_log!("focus trap has nothing to focus: no focusable content and no close control");
                TrapAction::Stay
            }
        }
    }

    fn wrap_at_sentinels<D: ModalDom>(
        &self,
        dom: &D,
        scanner: &FocusableElementScanner,
        key: &KeyInput,
        has_save_handler: bool,
    ) -> TrapAction<D::Element> {
        let close = scanner.close_affordance(dom);
        let save = if has_save_handler {
            dom.query(&self.save_selector)
        } else {
            None
        };

        if let Some(active) = dom.active_element() {
            let wrap_to = if key.shift_key && dom.has_class(&active, &self.first_sentinel_class) {
                save.clone().or_else(|| close.clone())
            } else if !key.shift_key && dom.has_class(&active, &self.last_sentinel_class) {
                close.clone()
            } else {
                None
            };
            if let Some(target) = wrap_to {
                return TrapAction::Focus(target);
            }
        }

        // Not on a sentinel: still make sure focus has not left the dialog.
        let extra: Vec<D::Element> = close.into_iter().chain(save).collect();
        self.keep_inside(dom, scanner, &extra)
    }
}
