//! In-memory stand-ins for the browser, used by unit and integration tests.
//!
//! `FakeDom` models a dialog's own markup plus slotted content, a focus
//! cursor, and elements that take focus late or not at all.  Selector
//! matching is literal: a node matches exactly the selector strings it was
//! built with.  `FakeEventBus` records global listener registrations so
//! tests can count them and dispatch events through them.

use std::cell::{Cell, RefCell};
use std::future::{ready, Ready};
use std::rc::{Rc, Weak};

use crate::constants::{
    DEFAULT_CLOSE_SELECTOR, DEFAULT_FOCUSABLE_SELECTOR, DEFAULT_INNER_SELECTOR,
    DEFAULT_OUTER_MARKER, DEFAULT_SAVE_SELECTOR,
};
use crate::dismiss::ClickInput;
use crate::dom::{ModalDom, Rect};
use crate::error::ModalError;
use crate::focus::Ticker;
use crate::keys::KeyInput;
use crate::listeners::{GlobalEvent, GlobalHandler, ListenerKind, ListenerTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusBehavior {
    #[default]
    Immediate,
    /// Focus lands after this many clock advances.
    Delayed(u32),
    Rejects,
}

#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    label: String,
    selectors: Vec<String>,
    classes: Vec<String>,
    ancestors: Vec<String>,
    disabled: bool,
    slotted: bool,
    outside_dialog: bool,
    focus: FocusBehavior,
    rect: Option<Rect>,
}

impl NodeSpec {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Self::default()
        }
    }

    pub fn matching(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self.selectors.push(format!(".{class}"));
        self
    }

    /// Place the node inside an ancestor matching `selector`.
    pub fn inside(mut self, selector: &str) -> Self {
        self.ancestors.push(selector.to_string());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Projected into the dialog through its slot.
    pub fn slotted(mut self) -> Self {
        self.slotted = true;
        self
    }

    /// Part of the underlying page, not the dialog.
    pub fn outside_dialog(mut self) -> Self {
        self.outside_dialog = true;
        self
    }

    pub fn focus(mut self, behavior: FocusBehavior) -> Self {
        self.focus = behavior;
        self
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }
}

#[derive(Debug)]
struct FakeNode {
    spec: NodeSpec,
    connected: bool,
}

#[derive(Debug, Default)]
struct FakeDocument {
    nodes: Vec<FakeNode>,
    template: Vec<NodeId>,
    slotted: Vec<NodeId>,
    page: Vec<NodeId>,
    /// Index into `template` where the `<slot>` sits.  `None` puts slotted
    /// content after the dialog's own markup.
    slot_at: Option<usize>,
    active: Option<NodeId>,
    pending: Option<(NodeId, u32)>,
    focus_calls: Vec<NodeId>,
}

impl FakeDocument {
    fn node(&self, id: NodeId) -> &FakeNode {
        &self.nodes[id.0]
    }

    fn composed(&self) -> Vec<NodeId> {
        let split = self.slot_at.unwrap_or(self.template.len()).min(self.template.len());
        let (before, after) = self.template.split_at(split);
        before
            .iter()
            .chain(self.slotted.iter())
            .chain(after.iter())
            .copied()
            .collect()
    }

    fn matches(&self, id: NodeId, selector: &str) -> bool {
        let node = self.node(id);
        node.connected && node.spec.selectors.iter().any(|s| s == selector)
    }
}

/// Cheap-to-clone handle; clones share the same document.
#[derive(Debug, Clone, Default)]
pub struct FakeDom {
    doc: Rc<RefCell<FakeDocument>>,
}

impl FakeDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, spec: NodeSpec) -> NodeId {
        let mut doc = self.doc.borrow_mut();
        let id = NodeId(doc.nodes.len());
        if spec.outside_dialog {
            doc.page.push(id);
        } else if spec.slotted {
            doc.slotted.push(id);
        } else {
            doc.template.push(id);
        }
        doc.nodes.push(FakeNode { spec, connected: true });
        id
    }

    /// Put the `<slot>` after the dialog markup added so far.
    pub fn place_slot(&self) {
        let mut doc = self.doc.borrow_mut();
        doc.slot_at = Some(doc.template.len());
    }

    pub fn focusable(&self, label: &str) -> NodeId {
        self.add(NodeSpec::new(label).matching(DEFAULT_FOCUSABLE_SELECTOR))
    }

    pub fn close_button(&self) -> NodeId {
        self.add(NodeSpec::new("close").matching(DEFAULT_CLOSE_SELECTOR))
    }

    pub fn save_button(&self) -> NodeId {
        self.add(NodeSpec::new("save").matching(DEFAULT_SAVE_SELECTOR))
    }

    pub fn outer_region(&self) -> NodeId {
        self.add(NodeSpec::new("outer").class(DEFAULT_OUTER_MARKER))
    }

    pub fn inner_panel(&self, rect: Rect) -> NodeId {
        self.add(
            NodeSpec::new("inner")
                .matching(DEFAULT_INNER_SELECTOR)
                .rect(rect),
        )
    }

    /// A control on the page underneath the dialog.
    pub fn page_button(&self, label: &str) -> NodeId {
        self.add(NodeSpec::new(label).outside_dialog())
    }

    pub fn label(&self, id: NodeId) -> String {
        self.doc.borrow().node(id).spec.label.clone()
    }

    pub fn active(&self) -> Option<NodeId> {
        self.doc.borrow().active
    }

    pub fn active_label(&self) -> Option<String> {
        self.active().map(|id| self.label(id))
    }

    /// Move focus without going through the controller, as the browser's
    /// default tabbing would.
    pub fn set_active(&self, id: Option<NodeId>) {
        self.doc.borrow_mut().active = id;
    }

    pub fn set_rect(&self, id: NodeId, rect: Rect) {
        self.doc.borrow_mut().nodes[id.0].spec.rect = Some(rect);
    }

    pub fn disconnect(&self, id: NodeId) {
        self.doc.borrow_mut().nodes[id.0].connected = false;
    }

    pub fn focus_calls(&self) -> usize {
        self.doc.borrow().focus_calls.len()
    }

    /// One tick of the event loop: delayed focus requests progress.
    pub fn advance(&self) {
        let mut doc = self.doc.borrow_mut();
        if let Some((id, remaining)) = doc.pending {
            if remaining <= 1 {
                doc.pending = None;
                doc.active = Some(id);
            } else {
                doc.pending = Some((id, remaining - 1));
            }
        }
    }
}

impl ModalDom for FakeDom {
    type Element = NodeId;

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let doc = self.doc.borrow();
        doc.composed()
            .into_iter()
            .filter(|&id| doc.matches(id, selector))
            .collect()
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        let doc = self.doc.borrow();
        doc.template.iter().copied().find(|&id| doc.matches(id, selector))
    }

    fn within(&self, element: &NodeId, selector: &str) -> bool {
        let doc = self.doc.borrow();
        doc.matches(*element, selector)
            || doc.node(*element).spec.ancestors.iter().any(|s| s == selector)
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.doc.borrow().node(*element).spec.classes.iter().any(|c| c == class)
    }

    fn is_disabled(&self, element: &NodeId) -> bool {
        self.doc.borrow().node(*element).spec.disabled
    }

    fn is_connected(&self, element: &NodeId) -> bool {
        self.doc.borrow().node(*element).connected
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active()
    }

    fn focus(&self, element: &NodeId) {
        let mut doc = self.doc.borrow_mut();
        doc.focus_calls.push(*element);
        if !doc.node(*element).connected {
            return;
        }
        match doc.node(*element).spec.focus {
            FocusBehavior::Immediate => {
                doc.pending = None;
                doc.active = Some(*element);
            }
            FocusBehavior::Delayed(ticks) => doc.pending = Some((*element, ticks)),
            FocusBehavior::Rejects => {}
        }
    }

    fn bounding_rect(&self, element: &NodeId) -> Option<Rect> {
        self.doc.borrow().node(*element).spec.rect
    }
}

/// Tick source that advances the fake document's clock instead of waiting.
#[derive(Debug, Clone)]
pub struct FakeTicker {
    dom: FakeDom,
    ticks: Rc<Cell<u32>>,
}

impl FakeTicker {
    pub fn new(dom: &FakeDom) -> Self {
        Self {
            dom: dom.clone(),
            ticks: Rc::new(Cell::new(0)),
        }
    }

    pub fn ticks(&self) -> u32 {
        self.ticks.get()
    }
}

impl Ticker for FakeTicker {
    type Tick = Ready<()>;

    fn tick(&self, _ms: u32) -> Ready<()> {
        self.ticks.set(self.ticks.get() + 1);
        self.dom.advance();
        ready(())
    }
}

struct Registration {
    id: u64,
    kind: ListenerKind,
    handler: GlobalHandler<NodeId>,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    registrations: Vec<Registration>,
    failing: Option<ListenerKind>,
    removals: usize,
}

/// Records global listeners the way `window` / `document` would.
#[derive(Clone, Default)]
pub struct FakeEventBus {
    state: Rc<RefCell<BusState>>,
}

pub struct FakeSubscription {
    bus: Weak<RefCell<BusState>>,
    id: u64,
}

impl Drop for FakeSubscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            if let Ok(mut state) = bus.try_borrow_mut() {
                let before = state.registrations.len();
                state.registrations.retain(|r| r.id != self.id);
                state.removals += before - state.registrations.len();
            }
        }
    }
}

impl FakeEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later registration of `kind` fail.
    pub fn fail_registration_of(&self, kind: ListenerKind) {
        self.state.borrow_mut().failing = Some(kind);
    }

    pub fn accept_all_registrations(&self) {
        self.state.borrow_mut().failing = None;
    }

    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.state
            .borrow()
            .registrations
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.state.borrow().registrations.len()
    }

    pub fn removals(&self) -> usize {
        self.state.borrow().removals
    }

    pub fn key_up(&self, input: KeyInput) {
        self.dispatch(ListenerKind::KeyUp, GlobalEvent::KeyUp(input));
    }

    pub fn click(&self, input: ClickInput<NodeId>) {
        self.dispatch(ListenerKind::Click, GlobalEvent::Click(input));
    }

    pub fn resize(&self) {
        self.dispatch(ListenerKind::Resize, GlobalEvent::Resize);
    }

    fn dispatch(&self, kind: ListenerKind, event: GlobalEvent<NodeId>) {
        // Snapshot first: handlers may detach listeners while running.
        let handlers: Vec<GlobalHandler<NodeId>> = self
            .state
            .borrow()
            .registrations
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| Rc::clone(&r.handler))
            .collect();
        for handler in handlers {
            handler(event.clone());
        }
    }
}

impl ListenerTarget<NodeId> for FakeEventBus {
    type Subscription = FakeSubscription;

    fn listen(
        &self,
        kind: ListenerKind,
        handler: GlobalHandler<NodeId>,
    ) -> Result<FakeSubscription, ModalError> {
        let mut state = self.state.borrow_mut();
        if state.failing == Some(kind) {
            return Err(ModalError::Listener {
                event: kind.event_name(),
                reason: "registration refused".to_string(),
            });
        }
        let id = state.next_id;
        state.next_id += 1;
        state.registrations.push(Registration { id, kind, handler });
        Ok(FakeSubscription {
            bus: Rc::downgrade(&self.state),
            id,
        })
    }
}
