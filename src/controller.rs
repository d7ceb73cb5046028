//! The modal state machine.
//!
//! `ModalController` owns the open flag and is the only code that changes
//! it.  Every transition goes through [`ModalController::toggle_modal`] or
//! its guarded wrappers; opening moves focus into the dialog, closing hands
//! it back to whatever had it before.

use std::fmt;
use std::rc::Rc;

use crate::config::ModalConfig;
use crate::dismiss::{ClickInput, DismissTrigger, OutsideClickDetector};
use crate::dom::{ModalDom, Rect};
use crate::error::ModalError;
use crate::focus::{FocusWait, FocusableElementScanner};
use crate::keys::KeyInput;
use crate::listeners::{GlobalEvent, ListenerKind};
use crate::trap::{FocusTrapPolicy, TrapAction};
use crate::view::{self, ModalView};

/// Host-supplied save callback.  The controller stores it and reports its
/// presence; calling it is the renderer's job.
pub type SaveHandler = Rc<dyn Fn()>;

/// Called with the fresh view after every state change, before focus moves.
/// It must not call back into the controller.
pub type ViewObserver = Rc<dyn Fn(&ModalView)>;

#[derive(Debug, Clone, PartialEq)]
pub struct ModalState<E> {
    is_open: bool,
    is_first_render: bool,
    last_focused_before_open: Option<E>,
    transitions: u64,
}

impl<E> Default for ModalState<E> {
    fn default() -> Self {
        Self {
            is_open: false,
            is_first_render: true,
            last_focused_before_open: None,
            transitions: 0,
        }
    }
}

impl<E> ModalState<E> {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_first_render(&self) -> bool {
        self.is_first_render
    }

    pub fn last_focused_before_open(&self) -> Option<&E> {
        self.last_focused_before_open.as_ref()
    }

    /// Number of open/close transitions since construction.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

pub struct ModalController<D: ModalDom> {
    dom: D,
    scanner: FocusableElementScanner,
    focus_wait: FocusWait,
    trap: FocusTrapPolicy,
    dismiss: OutsideClickDetector,
    inner_selector: String,
    state: ModalState<D::Element>,
    inner_bounds: Option<Rect>,
    header: Option<String>,
    tagline: Option<String>,
    save_handler: Option<SaveHandler>,
    observer: Option<ViewObserver>,
}

impl<D: ModalDom> fmt::Debug for ModalController<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalController")
            .field("state", &self.state)
            .field("header", &self.header)
            .field("tagline", &self.tagline)
            .field("has_save_handler", &self.save_handler.is_some())
            .finish_non_exhaustive()
    }
}

impl<D: ModalDom> ModalController<D> {
    pub fn new(dom: D, config: &ModalConfig) -> Result<Self, ModalError> {
        config.validate()?;
        Ok(Self {
            dom,
            scanner: FocusableElementScanner::from_config(config),
            focus_wait: FocusWait::from_config(config),
            trap: FocusTrapPolicy::from_config(config),
            dismiss: OutsideClickDetector::new(config.dismiss_strategy, config.outer_marker.clone()),
            inner_selector: config.inner_selector.clone(),
            state: ModalState::default(),
            inner_bounds: None,
            header: None,
            tagline: None,
            save_handler: None,
            observer: None,
        })
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn scanner(&self) -> &FocusableElementScanner {
        &self.scanner
    }

    pub fn focus_wait(&self) -> FocusWait {
        self.focus_wait
    }

    pub fn state(&self) -> &ModalState<D::Element> {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Flip between open and closed.  Never fails.
    pub fn toggle_modal(&mut self) {
        self.flip(DismissTrigger::ExplicitToggleCall);
    }

    pub fn open(&mut self) {
        if !self.state.is_open {
            self.flip(DismissTrigger::ExplicitToggleCall);
        }
    }

    pub fn close(&mut self) {
        self.close_with(DismissTrigger::ExplicitToggleCall);
    }

    pub fn close_with(&mut self, trigger: DismissTrigger) {
        if self.state.is_open {
            self.flip(trigger);
        }
    }

    fn flip(&mut self, trigger: DismissTrigger) {
        self.state.is_open = !self.state.is_open;
        self.state.transitions += 1;
        if self.state.is_open {
            debug_log!("modal opened");
            self.state.last_focused_before_open = self.dom.active_element();
            // Hidden content cannot take focus; let the renderer show it first.
            self.notify();
            self.focus_initial_target();
        } else {
            debug_log!("modal closed ({:?})", trigger);
            self.notify();
            self.restore_focus();
        }
    }

    fn focus_initial_target(&self) {
        match self.scanner.initial_target(&self.dom) {
            Some(target) => self.dom.focus(&target),
            None => warn_log!("modal has no focusable content and no close control; focus not moved"),
        }
    }

    fn restore_focus(&mut self) {
        if let Some(previous) = self.state.last_focused_before_open.take() {
            if self.dom.is_connected(&previous) {
                self.dom.focus(&previous);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Derived outputs
    // -----------------------------------------------------------------------

    pub fn css_class(&self) -> String {
        view::modal_class(self.state.is_open)
    }

    pub fn backdrop_class(&self) -> String {
        view::backdrop_class(self.state.is_open)
    }

    pub fn modal_aria_hidden(&self) -> bool {
        !self.state.is_open
    }

    pub fn view(&self) -> ModalView {
        ModalView {
            css_class: self.css_class(),
            backdrop_class: self.backdrop_class(),
            aria_hidden: self.modal_aria_hidden(),
            header: self.header.clone(),
            tagline: self.tagline.clone(),
            show_header: self.header.is_some(),
            show_save: self.has_save_handler(),
        }
    }

    pub fn set_view_observer(&mut self, observer: Option<ViewObserver>) {
        self.observer = observer;
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer(&self.view());
        }
    }

    // -----------------------------------------------------------------------
    // Host pass-through properties
    // -----------------------------------------------------------------------

    pub fn modal_header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn set_modal_header(&mut self, header: Option<String>) {
        self.header = header;
        self.notify();
    }

    pub fn modal_tagline(&self) -> Option<&str> {
        self.tagline.as_deref()
    }

    pub fn set_modal_tagline(&mut self, tagline: Option<String>) {
        self.tagline = tagline;
        self.notify();
    }

    pub fn modal_save_handler(&self) -> Option<SaveHandler> {
        self.save_handler.clone()
    }

    pub fn set_modal_save_handler(&mut self, handler: Option<SaveHandler>) {
        self.save_handler = handler;
        self.notify();
    }

    pub fn has_save_handler(&self) -> bool {
        self.save_handler.is_some()
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    pub fn handle_key_up(&mut self, key: &KeyInput) {
        let action = self.trap.evaluate(
            &self.dom,
            &self.scanner,
            key,
            self.state.is_open,
            self.has_save_handler(),
        );
        match action {
            TrapAction::Close => self.close_with(DismissTrigger::Escape),
            TrapAction::Focus(target) => self.dom.focus(&target),
            TrapAction::Stay => {}
        }
    }

    /// Click handler of the inner content panel.  Stops the click so the
    /// document-level handler does not treat it as an outside click.  Under
    /// the geometric strategy the coordinates are checked right here.
    pub fn handle_inner_click(&mut self, click: &mut ClickInput<D::Element>) {
        click.stop_propagation();
        if self.state.is_open
            && self.dismiss.strategy().needs_layout()
            && self.dismiss.outside_bounds(click, self.inner_bounds)
        {
            self.close_with(DismissTrigger::OutsideClick);
        }
    }

    /// Click that reached the document-level listener.
    pub fn handle_document_click(&mut self, click: &ClickInput<D::Element>) {
        if self.state.is_open && self.dismiss.is_outside(&self.dom, click, self.inner_bounds) {
            self.close_with(DismissTrigger::OutsideClick);
        }
    }

    pub fn handle_close_click(&mut self) {
        self.close_with(DismissTrigger::CloseButton);
    }

    /// Focus left an element inside the dialog.  If it went somewhere
    /// outside the trap, bring it back.
    pub fn handle_focus_lost(&mut self) {
        if !self.state.is_open {
            return;
        }
        let close = self.scanner.close_affordance(&self.dom);
        let still_inside = self.dom.active_element().is_some_and(|active| {
            close.as_ref() == Some(&active) || self.scanner.scan(&self.dom).contains(&active)
        });
        if !still_inside {
            self.focus_initial_target();
        }
    }

    /// Record the inner panel's rectangle for the geometric strategy.
    pub fn measure_inner(&mut self) {
        self.inner_bounds = self
            .dom
            .query(&self.inner_selector)
            .and_then(|inner| self.dom.bounding_rect(&inner));
        if self.inner_bounds.is_none() && self.dismiss.strategy().needs_layout() {
            warn_log!("inner panel `{}` could not be measured", self.inner_selector);
        }
    }

    pub fn inner_bounds(&self) -> Option<Rect> {
        self.inner_bounds
    }

    pub fn handle_global_event(&mut self, event: GlobalEvent<D::Element>) {
        match event {
            GlobalEvent::KeyUp(key) => self.handle_key_up(&key),
            GlobalEvent::Click(click) => self.handle_document_click(&click),
            GlobalEvent::Resize => self.measure_inner(),
        }
    }

    // -----------------------------------------------------------------------
    // Listener lifecycle bookkeeping
    // -----------------------------------------------------------------------

    /// Global listeners this configuration needs.
    pub fn listener_kinds(&self) -> Vec<ListenerKind> {
        let mut kinds = vec![ListenerKind::KeyUp, ListenerKind::Click];
        if self.dismiss.strategy().needs_layout() {
            kinds.push(ListenerKind::Resize);
        }
        kinds
    }

    /// Consume the first-render flag.  True exactly once per mount.
    pub fn begin_first_render(&mut self) -> bool {
        std::mem::replace(&mut self.state.is_first_render, false)
    }

    /// Re-arm the first-render flag after teardown, or after a failed
    /// attach, so the next render attaches again.
    pub fn reset_first_render(&mut self) {
        self.state.is_first_render = true;
    }
}
