//! A mounted modal: the controller plus its global listeners.
//!
//! The host drives this through the same lifecycle a web component goes
//! through: construct, render (possibly many times), tear down.  Global
//! listeners are attached on the first completed render after each mount
//! and released on teardown or drop.
//!
//! Reads never touch the controller cell.  They are served from the last
//! view the controller published, which stays readable while a transition
//! is running (focus moves fire page events synchronously, and page code
//! may query the modal from those).

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::config::ModalConfig;
use crate::controller::{ModalController, SaveHandler, ViewObserver};
use crate::dismiss::ClickInput;
use crate::dom::ModalDom;
use crate::error::ModalError;
use crate::focus::{settle_focus, Ticker};
use crate::keys::KeyInput;
use crate::listeners::{
    EventListenerLifecycle, GlobalEvent, GlobalHandler, ListenerKind, ListenerTarget,
};
use crate::view::ModalView;

pub struct Modal<D, T>
where
    D: ModalDom + 'static,
    T: ListenerTarget<D::Element>,
{
    controller: Rc<RefCell<ModalController<D>>>,
    target: T,
    listeners: RefCell<EventListenerLifecycle<T::Subscription>>,
    rendered: Rc<RefCell<ModalView>>,
    observer: Rc<RefCell<Option<ViewObserver>>>,
    save_handler: RefCell<Option<SaveHandler>>,
}

impl<D, T> Modal<D, T>
where
    D: ModalDom + 'static,
    T: ListenerTarget<D::Element>,
{
    pub fn new(dom: D, target: T, config: &ModalConfig) -> Result<Self, ModalError> {
        let mut controller = ModalController::new(dom, config)?;
        let rendered = Rc::new(RefCell::new(controller.view()));
        let observer: Rc<RefCell<Option<ViewObserver>>> = Rc::default();

        let (snapshot, host_observer) = (Rc::clone(&rendered), Rc::clone(&observer));
        controller.set_view_observer(Some(Rc::new(move |view: &ModalView| {
            *snapshot.borrow_mut() = view.clone();
            let host = host_observer.borrow().clone();
            if let Some(host) = host {
                host(view);
            }
        })));

        Ok(Self {
            controller: Rc::new(RefCell::new(controller)),
            target,
            listeners: RefCell::new(EventListenerLifecycle::new()),
            rendered,
            observer,
            save_handler: RefCell::new(None),
        })
    }

    /// Read access for tests and diagnostics.  `None` while a transition is
    /// in progress.
    pub fn controller(&self) -> Option<Ref<'_, ModalController<D>>> {
        self.controller.try_borrow().ok()
    }

    /// Run `f` against the controller unless a transition is already in
    /// progress.  Focus changes can fire DOM events synchronously, and those
    /// must not re-enter the state machine halfway through a transition.
    fn with_controller<R>(&self, f: impl FnOnce(&mut ModalController<D>) -> R) -> Option<R> {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => Some(f(&mut controller)),
            Err(_) => {
                warn_log!("modal busy; re-entrant call ignored");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Called after every render pass.  Only the first one after a mount
    /// attaches listeners.
    pub fn rendered_callback(&self) -> Result<(), ModalError> {
        let Some(Some(kinds)) = self.with_controller(|c| {
            if !c.begin_first_render() {
                return None;
            }
            let kinds = c.listener_kinds();
            if kinds.contains(&ListenerKind::Resize) {
                c.measure_inner();
            }
            Some(kinds)
        }) else {
            return Ok(());
        };

        let weak = Rc::downgrade(&self.controller);
        let handler: GlobalHandler<D::Element> = Rc::new(move |event: GlobalEvent<D::Element>| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            match controller.try_borrow_mut() {
                Ok(mut controller) => controller.handle_global_event(event),
                Err(_) => warn_log!("modal busy; dropped global event {:?}", event),
            };
        });

        let attached = self
            .listeners
            .borrow_mut()
            .attach(&self.target, &kinds, handler);
        if attached.is_err() {
            // Keep `attached == !is_first_render`: the next render retries.
            self.with_controller(|c| c.reset_first_render());
        }
        attached
    }

    /// Teardown.  Safe to call any number of times.
    pub fn disconnected_callback(&self) {
        let released = self.listeners.borrow_mut().detach_all();
        self.with_controller(|c| c.reset_first_render());
        debug_log!("modal disconnected, {} listeners released", released);
    }

    pub fn is_attached(&self) -> bool {
        self.listeners.borrow().is_attached()
    }

    pub fn attached_kinds(&self) -> Vec<ListenerKind> {
        self.listeners.borrow().attached_kinds()
    }

    // -----------------------------------------------------------------------
    // Public modal API
    // -----------------------------------------------------------------------

    pub fn toggle_modal(&self) {
        self.with_controller(|c| c.toggle_modal());
    }

    pub fn open(&self) {
        self.with_controller(|c| c.open());
    }

    pub fn close(&self) {
        self.with_controller(|c| c.close());
    }

    /// Open, then confirm with the bounded focus wait that focus really
    /// landed inside the dialog.  Resolves to the element holding focus, or
    /// `None` if the dialog was closed again while waiting.
    pub async fn open_and_settle<K: Ticker>(&self, ticker: &K) -> Option<D::Element>
    where
        D: Clone,
    {
        let (dom, scanner, wait) = self.with_controller(|c| {
            c.open();
            (c.dom().clone(), c.scanner().clone(), c.focus_wait())
        })?;
        let focused = settle_focus(&dom, &scanner, &wait, ticker).await;
        if self.is_open() {
            focused
        } else {
            None
        }
    }

    pub fn is_open(&self) -> bool {
        !self.rendered.borrow().aria_hidden
    }

    pub fn css_class(&self) -> String {
        self.rendered.borrow().css_class.clone()
    }

    pub fn backdrop_class(&self) -> String {
        self.rendered.borrow().backdrop_class.clone()
    }

    pub fn modal_aria_hidden(&self) -> bool {
        self.rendered.borrow().aria_hidden
    }

    pub fn view(&self) -> ModalView {
        self.rendered.borrow().clone()
    }

    pub fn modal_header(&self) -> Option<String> {
        self.rendered.borrow().header.clone()
    }

    pub fn set_modal_header(&self, header: Option<String>) {
        self.with_controller(|c| c.set_modal_header(header));
    }

    pub fn modal_tagline(&self) -> Option<String> {
        self.rendered.borrow().tagline.clone()
    }

    pub fn set_modal_tagline(&self, tagline: Option<String>) {
        self.with_controller(|c| c.set_modal_tagline(tagline));
    }

    pub fn modal_save_handler(&self) -> Option<SaveHandler> {
        self.save_handler.borrow().clone()
    }

    pub fn set_modal_save_handler(&self, handler: Option<SaveHandler>) {
        let stored = handler.clone();
        if self.with_controller(|c| c.set_modal_save_handler(stored)).is_some() {
            *self.save_handler.borrow_mut() = handler;
        }
    }

    /// Re-render hook, called after every state or property change.
    pub fn set_view_observer(&self, observer: Option<ViewObserver>) {
        *self.observer.borrow_mut() = observer;
    }

    // -----------------------------------------------------------------------
    // Handlers bound in the dialog's own markup
    // -----------------------------------------------------------------------

    pub fn handle_key_up(&self, key: &KeyInput) {
        self.with_controller(|c| c.handle_key_up(key));
    }

    pub fn handle_inner_click(&self, click: &mut ClickInput<D::Element>) {
        self.with_controller(|c| c.handle_inner_click(click));
    }

    pub fn handle_close_click(&self) {
        self.with_controller(|c| c.handle_close_click());
    }

    pub fn handle_focus_lost(&self) {
        self.with_controller(|c| c.handle_focus_lost());
    }
}
