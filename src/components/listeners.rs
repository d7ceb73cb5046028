//! Browser implementation of [`ListenerTarget`].
//!
//! Every registration is held by a [`WebSubscription`], which removes the
//! listener again when dropped.  Nothing is parked in a global registry, so
//! a modal that is torn down (or simply dropped) leaves no handlers behind.

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Element, Event, EventTarget, KeyboardEvent, MouseEvent, Window};

use crate::dismiss::ClickInput;
use crate::error::ModalError;
use crate::focus::Ticker;
use crate::keys::KeyInput;
use crate::listeners::{GlobalEvent, GlobalHandler, ListenerKind, ListenerScope, ListenerTarget};

pub struct WebSubscription {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl WebSubscription {
    /// Register `callback` for `event` on `target`.
    pub fn bind(
        target: &EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Self, ModalError> {
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|err| ModalError::Listener {
                event,
                reason: format!("{:?}", err),
            })?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }

    pub fn event(&self) -> &'static str {
        self.event
    }
}

impl Drop for WebSubscription {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

impl std::fmt::Debug for WebSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSubscription").field("event", &self.event).finish()
    }
}

#[derive(Debug, Clone)]
pub struct WebListenerTarget {
    window: Window,
    document: Document,
}

impl WebListenerTarget {
    pub fn new() -> Result<Self, ModalError> {
        let window = web_sys::window().ok_or_else(|| ModalError::MissingMarkup("window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| ModalError::MissingMarkup("document".to_string()))?;
        Ok(Self { window, document })
    }

    fn target_for(&self, scope: ListenerScope) -> &EventTarget {
        match scope {
            ListenerScope::Window => self.window.as_ref(),
            ListenerScope::Document => self.document.as_ref(),
        }
    }
}

impl ListenerTarget<Element> for WebListenerTarget {
    type Subscription = WebSubscription;

    fn listen(
        &self,
        kind: ListenerKind,
        handler: GlobalHandler<Element>,
    ) -> Result<WebSubscription, ModalError> {
        let callback = Closure::wrap(Box::new(move |event: Event| {
            if let Some(event) = translate(kind, &event) {
                handler(event);
            }
        }) as Box<dyn FnMut(Event)>);
        WebSubscription::bind(self.target_for(kind.scope()), kind.event_name(), callback)
    }
}

fn translate(kind: ListenerKind, event: &Event) -> Option<GlobalEvent<Element>> {
    match kind {
        ListenerKind::KeyUp => event.dyn_ref::<KeyboardEvent>().map(|e| GlobalEvent::KeyUp(key_input(e))),
        ListenerKind::Click => Some(GlobalEvent::Click(click_input(event))),
        ListenerKind::Resize => Some(GlobalEvent::Resize),
    }
}

pub fn key_input(event: &KeyboardEvent) -> KeyInput {
    KeyInput {
        key_code: Some(event.key_code()),
        code: Some(event.code()),
        key: Some(event.key()),
        shift_key: event.shift_key(),
    }
}

/// The click target is the first entry of the composed path, so clicks
/// inside the shadow tree are not retargeted to the host.
pub fn click_input(event: &Event) -> ClickInput<Element> {
    let target = event.composed_path().get(0).dyn_into::<Element>().ok();
    let (client_x, client_y) = event
        .dyn_ref::<MouseEvent>()
        .map(|e| (e.client_x() as f64, e.client_y() as f64))
        .unwrap_or((f64::NAN, f64::NAN));
    ClickInput {
        target,
        client_x,
        client_y,
        propagation_stopped: event.cancel_bubble(),
    }
}

/// Focus-wait ticks backed by `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTicker;

impl Ticker for GlooTicker {
    type Tick = gloo_timers::future::TimeoutFuture;

    fn tick(&self, ms: u32) -> Self::Tick {
        gloo_timers::future::TimeoutFuture::new(ms)
    }
}
