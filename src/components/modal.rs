//! `<modal-dialog>` binding for plain web pages.
//!
//! [`ModalHandle`] is what page scripts hold: it owns a [`Modal`] wired to
//! the real DOM, keeps the markup in sync with the controller's view, and
//! forwards the host lifecycle (`renderedCallback` / `disconnectedCallback`)
//! from the custom-element class that wraps it.
//!
//! ```js
//! class ModalDialog extends HTMLElement {
//!   connectedCallback() {
//!     this.modal ??= new ModalHandle(this, { trapStrategy: "sentinel" });
//!     this.modal.renderedCallback();
//!   }
//!   disconnectedCallback() { this.modal.disconnectedCallback(); }
//! }
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::{closure::Closure, prelude::*};
use web_sys::{Document, Element, Event, EventTarget, KeyboardEvent, ShadowRoot, ShadowRootInit, ShadowRootMode};

use super::listeners::{click_input, key_input, GlooTicker, WebListenerTarget, WebSubscription};
use crate::config::ModalConfig;
use crate::controller::SaveHandler;
use crate::dom::ModalDom;
use crate::dom_utils::WebModalDom;
use crate::error::ModalError;
use crate::view::ModalView;
use crate::widget::Modal;

type WebModal = Modal<WebModalDom, WebListenerTarget>;

/// Markup used when the host element brings no shadow root of its own.
/// Slotted page content lands in `.modal-body`.  The backdrop carries the
/// outer marker too, so clicking it dismisses the dialog.
const DEFAULT_TEMPLATE: &str = r#"<div data-part="backdrop" class="backdrop outer-modal"></div>
<section data-part="dialog" role="dialog" aria-modal="true" aria-hidden="true" class="modal hidden outer-modal">
  <div class="inner-modal">
    <header data-part="header" hidden>
      <h2 data-part="title"></h2>
      <p data-part="tagline"></p>
    </header>
    <div class="modal-body"><slot></slot></div>
    <footer data-part="footer">
      <button type="button" class="focusable close" title="Close" aria-label="Close">&times;</button>
    </footer>
  </div>
</section>"#;

/// Give `host` the default dialog markup unless it already has a shadow
/// root, in which case that markup is used as-is.
pub fn ensure_modal(host: &Element) -> Result<ShadowRoot, JsValue> {
    if let Some(shadow) = host.shadow_root() {
        return Ok(shadow);
    }
    let shadow = host.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))?;
    shadow.set_inner_html(DEFAULT_TEMPLATE);
    Ok(shadow)
}

fn part(dom: &WebModalDom, name: &str) -> Result<Element, ModalError> {
    dom.query(&format!("[data-part=\"{name}\"]"))
        .ok_or_else(|| ModalError::MissingMarkup(format!("[data-part=\"{name}\"]")))
}

/// The pieces of markup a view update touches.
struct Markup {
    document: Document,
    dialog: Element,
    backdrop: Element,
    header: Element,
    title: Element,
    tagline: Element,
    footer: Element,
    outer_marker: String,
    save_selector: String,
    save_class: String,
    modal: Weak<WebModal>,
    save: RefCell<Option<(Element, WebSubscription)>>,
}

impl Markup {
    fn find(dom: &WebModalDom, config: &ModalConfig, modal: Weak<WebModal>) -> Result<Self, ModalError> {
        let document = dom
            .host()
            .owner_document()
            .ok_or_else(|| ModalError::MissingMarkup("owner document".to_string()))?;
        Ok(Self {
            document,
            dialog: part(dom, "dialog")?,
            backdrop: part(dom, "backdrop")?,
            header: part(dom, "header")?,
            title: part(dom, "title")?,
            tagline: part(dom, "tagline")?,
            footer: part(dom, "footer")?,
            outer_marker: config.outer_marker.clone(),
            save_selector: config.save_selector.clone(),
            save_class: config.save_class.clone(),
            modal,
            save: RefCell::new(None),
        })
    }

    fn apply(&self, view: &ModalView) {
        self.dialog
            .set_class_name(&format!("{} {}", view.css_class, self.outer_marker));
        let _ = self
            .dialog
            .set_attribute("aria-hidden", if view.aria_hidden { "true" } else { "false" });
        self.backdrop
            .set_class_name(&format!("{} {}", view.backdrop_class, self.outer_marker));

        if view.show_header {
            let _ = self.header.remove_attribute("hidden");
        } else {
            let _ = self.header.set_attribute("hidden", "");
        }
        self.title.set_text_content(view.header.as_deref());
        self.tagline.set_text_content(view.tagline.as_deref());

        if let Err(err) = self.sync_save_button(view.show_save) {
            warn_log!("save control not updated: {}", err);
        }
    }

    /// The save control exists exactly while a save handler is set.
    fn sync_save_button(&self, show: bool) -> Result<(), ModalError> {
        let mut save = self.save.borrow_mut();
        match (show, save.is_some()) {
            (true, false) => {
                let button = self
                    .document
                    .create_element("button")
                    .map_err(|e| ModalError::MissingMarkup(format!("save button: {:?}", e)))?;
                let _ = button.set_attribute("type", "button");
                button.set_class_name(&format!("focusable {}", self.save_class));
                button.set_text_content(Some("Save"));
                if !button.matches(&self.save_selector).unwrap_or(false) {
                    warn_log!(
                        "save control with class `{}` does not match `{}`; keyboard wrap will skip it",
                        self.save_class,
                        self.save_selector
                    );
                }
                let _ = self
                    .footer
                    .insert_before(&button, self.footer.first_child().as_ref());

                let modal = self.modal.clone();
                let callback = Closure::wrap(Box::new(move |_event: Event| {
                    let handler = modal.upgrade().and_then(|m| m.modal_save_handler());
                    if let Some(handler) = handler {
                        handler();
                    }
                }) as Box<dyn FnMut(Event)>);
                let target: &EventTarget = button.as_ref();
                let binding = WebSubscription::bind(target, "click", callback)?;
                *save = Some((button, binding));
            }
            (false, true) => {
                if let Some((button, binding)) = save.take() {
                    drop(binding);
                    button.remove();
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[wasm_bindgen]
pub struct ModalHandle {
    modal: Rc<WebModal>,
    save_callback: Option<js_sys::Function>,
    // Handlers bound in the dialog's own markup; released with the handle.
    _bindings: Vec<WebSubscription>,
}

#[wasm_bindgen]
impl ModalHandle {
    /// `config` is an optional plain object using the camelCase field names
    /// of [`ModalConfig`].
    #[wasm_bindgen(constructor)]
    pub fn new(host: Element, config: JsValue) -> Result<ModalHandle, JsValue> {
        let config = ModalConfig::from_js(config)?;
        ensure_modal(&host)?;
        let dom = WebModalDom::new(host)?;
        let modal = Rc::new(Modal::new(dom.clone(), WebListenerTarget::new()?, &config)?);

        let markup = Markup::find(&dom, &config, Rc::downgrade(&modal))?;
        markup.apply(&modal.view());
        modal.set_view_observer(Some(Rc::new(move |view: &ModalView| markup.apply(view))));

        let bindings = bind_markup(&modal, &dom, &config)?;
        debug_log!("modal mounted with {} markup handlers", bindings.len());
        Ok(Self {
            modal,
            save_callback: None,
            _bindings: bindings,
        })
    }

    #[wasm_bindgen(js_name = toggleModal)]
    pub fn toggle_modal(&self) {
        self.modal.toggle_modal();
    }

    /// Open and resolve with the element that ended up focused (or
    /// `undefined`) once the focus wait has finished.
    #[wasm_bindgen(js_name = openAndSettle)]
    pub fn open_and_settle(&self) -> js_sys::Promise {
        let modal = self.modal.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let focused = modal.open_and_settle(&GlooTicker).await;
            Ok(focused.map(JsValue::from).unwrap_or(JsValue::UNDEFINED))
        })
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    #[wasm_bindgen(getter, js_name = cssClass)]
    pub fn css_class(&self) -> String {
        self.modal.css_class()
    }

    #[wasm_bindgen(getter, js_name = backdropClass)]
    pub fn backdrop_class(&self) -> String {
        self.modal.backdrop_class()
    }

    #[wasm_bindgen(getter, js_name = modalAriaHidden)]
    pub fn modal_aria_hidden(&self) -> bool {
        self.modal.modal_aria_hidden()
    }

    /// Snapshot of everything the markup is rendered from.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.modal.view()).map_err(JsValue::from)
    }

    #[wasm_bindgen(getter, js_name = modalHeader)]
    pub fn modal_header(&self) -> Option<String> {
        self.modal.modal_header()
    }

    #[wasm_bindgen(setter, js_name = modalHeader)]
    pub fn set_modal_header(&self, header: Option<String>) {
        self.modal.set_modal_header(header);
    }

    #[wasm_bindgen(getter, js_name = modalTagline)]
    pub fn modal_tagline(&self) -> Option<String> {
        self.modal.modal_tagline()
    }

    #[wasm_bindgen(setter, js_name = modalTagline)]
    pub fn set_modal_tagline(&self, tagline: Option<String>) {
        self.modal.set_modal_tagline(tagline);
    }

    #[wasm_bindgen(getter, js_name = modalSaveHandler)]
    pub fn modal_save_handler(&self) -> Option<js_sys::Function> {
        self.save_callback.clone()
    }

    #[wasm_bindgen(setter, js_name = modalSaveHandler)]
    pub fn set_modal_save_handler(&mut self, handler: Option<js_sys::Function>) {
        let wrapped = handler.clone().map(|callback| -> SaveHandler {
            Rc::new(move || {
                if let Err(err) = callback.call0(&JsValue::NULL) {
                    web_sys::console::error_1(&err);
                }
            })
        });
        self.save_callback = handler;
        self.modal.set_modal_save_handler(wrapped);
    }

    #[wasm_bindgen(js_name = renderedCallback)]
    pub fn rendered_callback(&self) -> Result<(), JsValue> {
        self.modal.rendered_callback().map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = disconnectedCallback)]
    pub fn disconnected_callback(&self) {
        self.modal.disconnected_callback();
    }

    /// Feed a keyup that did not go through the window listener, e.g. one
    /// the host intercepted itself.
    #[wasm_bindgen(js_name = handleKeyUp)]
    pub fn handle_key_up(&self, event: &KeyboardEvent) {
        self.modal.handle_key_up(&key_input(event));
    }
}

/// Wire the inner panel, close control and focus-loss handlers.
fn bind_markup(
    modal: &Rc<WebModal>,
    dom: &WebModalDom,
    config: &ModalConfig,
) -> Result<Vec<WebSubscription>, ModalError> {
    let mut bindings = Vec::new();

    let inner = dom
        .query(&config.inner_selector)
        .ok_or_else(|| ModalError::MissingMarkup(config.inner_selector.clone()))?;
    let weak = Rc::downgrade(modal);
    let on_inner_click = Closure::wrap(Box::new(move |event: Event| {
        event.stop_propagation();
        if let Some(modal) = weak.upgrade() {
            let mut click = click_input(&event);
            modal.handle_inner_click(&mut click);
        }
    }) as Box<dyn FnMut(Event)>);
    bindings.push(WebSubscription::bind(inner.as_ref(), "click", on_inner_click)?);

    match dom.query(&config.close_selector) {
        Some(close) => {
            let weak = Rc::downgrade(modal);
            let on_close = Closure::wrap(Box::new(move |event: Event| {
                event.stop_propagation();
                if let Some(modal) = weak.upgrade() {
                    modal.handle_close_click();
                }
            }) as Box<dyn FnMut(Event)>);
            bindings.push(WebSubscription::bind(close.as_ref(), "click", on_close)?);
        }
        None => warn_log!("no close control matches `{}`", config.close_selector),
    }

    // During `focusout` the new target is not active yet; check once the
    // browser has finished moving focus.
    let outer = part(dom, "dialog")?;
    let weak = Rc::downgrade(modal);
    let on_focus_out = Closure::wrap(Box::new(move |_event: Event| {
        let weak = weak.clone();
        Timeout::new(0, move || {
            if let Some(modal) = weak.upgrade() {
                modal.handle_focus_lost();
            }
        })
        .forget();
    }) as Box<dyn FnMut(Event)>);
    bindings.push(WebSubscription::bind(outer.as_ref(), "focusout", on_focus_out)?);

    Ok(bindings)
}
