//! Dismissal triggers and outside-click detection.
//!
//! Two ways of telling an outside click from an inside one are supported:
//!
//! * **Structural** (default): the inner panel's click handler stops
//!   propagation, so any click that still reaches the document-level
//!   listener and originated on the element carrying the outer marker is
//!   outside.  Needs no layout information.
//! * **Geometric** (deprecated): a click on the dialog's own markup is
//!   outside when its coordinates fall outside the inner panel's last
//!   measured rectangle.  Clicks elsewhere on the page never count.
//!   Requires re-measuring on every resize and misjudges scrolled dialogs.

use serde::{Deserialize, Serialize};

use crate::dom::{ModalDom, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    Escape,
    OutsideClick,
    CloseButton,
    ExplicitToggleCall,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DismissStrategy {
    #[default]
    Structural,
    /// Deprecated: re-measures layout on resize.  Prefer `Structural`.
    Geometric,
}

impl DismissStrategy {
    pub fn needs_layout(self) -> bool {
        matches!(self, DismissStrategy::Geometric)
    }
}

/// A click as seen by the modal's handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickInput<E> {
    /// Element the click originated on, before any retargeting.
    pub target: Option<E>,
    pub client_x: f64,
    pub client_y: f64,
    pub propagation_stopped: bool,
}

impl<E> ClickInput<E> {
    pub fn on(target: E) -> Self {
        Self {
            target: Some(target),
            client_x: 0.0,
            client_y: 0.0,
            propagation_stopped: false,
        }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self {
            target: None,
            client_x: x,
            client_y: y,
            propagation_stopped: false,
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Decides whether a click reaching the document listener lies outside the
/// inner content.
#[derive(Debug, Clone)]
pub struct OutsideClickDetector {
    strategy: DismissStrategy,
    outer_marker: String,
}

impl OutsideClickDetector {
    pub fn new(strategy: DismissStrategy, outer_marker: impl Into<String>) -> Self {
        Self {
            strategy,
            outer_marker: outer_marker.into(),
        }
    }

    pub fn strategy(&self) -> DismissStrategy {
        self.strategy
    }

    pub fn is_outside<D: ModalDom>(
        &self,
        dom: &D,
        click: &ClickInput<D::Element>,
        inner_bounds: Option<Rect>,
    ) -> bool {
        if click.propagation_stopped {
            return false;
        }
        match self.strategy {
            DismissStrategy::Structural => click
                .target
                .as_ref()
                .is_some_and(|target| dom.has_class(target, &self.outer_marker)),
            // Clicks on the page itself (e.g. the trigger that just opened
            // the dialog) are not dismissals, wherever they land.
            DismissStrategy::Geometric => {
                let in_dialog = click
                    .target
                    .as_ref()
                    .is_some_and(|target| dom.within(target, &self.outer_selector()));
                in_dialog && self.outside_bounds(click, inner_bounds)
            }
        }
    }

    fn outer_selector(&self) -> String {
        format!(".{}", self.outer_marker)
    }

    /// Coordinate test used by the geometric strategy.  Without a
    /// measurement there is nothing to compare against, so the click is
    /// treated as inside.
    pub fn outside_bounds<E>(&self, click: &ClickInput<E>, inner_bounds: Option<Rect>) -> bool {
        inner_bounds.is_some_and(|rect| !rect.contains(click.client_x, click.client_y))
    }
}
