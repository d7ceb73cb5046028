//! Mount / render / teardown behaviour of a whole modal, driven through the
//! in-memory DOM and event bus.
//!
//! Run with: cargo test --features test-helpers --test modal_lifecycle

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use modal_focus_trap::dismiss::{ClickInput, DismissStrategy};
use modal_focus_trap::dom::{ModalDom, Rect};
use modal_focus_trap::keys::KeyInput;
use modal_focus_trap::listeners::ListenerKind;
use modal_focus_trap::testing::{FakeDom, FakeEventBus, NodeId};
use modal_focus_trap::{Modal, ModalConfig, ModalError};

fn mount(dom: &FakeDom, bus: &FakeEventBus) -> Modal<FakeDom, FakeEventBus> {
    Modal::new(dom.clone(), bus.clone(), &ModalConfig::default()).unwrap()
}

fn escape() -> KeyInput {
    KeyInput::from_code("Escape")
}

#[test]
fn first_render_attaches_keyup_and_click_once() {
    let dom = FakeDom::new();
    let bus = FakeEventBus::new();
    let modal = mount(&dom, &bus);
    assert!(!modal.is_attached());

    modal.rendered_callback().unwrap();
    modal.rendered_callback().unwrap();
    modal.rendered_callback().unwrap();

    assert_eq!(bus.listener_count(ListenerKind::KeyUp), 1);
    assert_eq!(bus.listener_count(ListenerKind::Click), 1);
    assert_eq!(bus.listener_count(ListenerKind::Resize), 0);
    assert_eq!(modal.attached_kinds(), vec![ListenerKind::KeyUp, ListenerKind::Click]);
}

#[test]
fn repeated_mount_cycles_never_stack_listeners() {
    let dom = FakeDom::new();
    dom.close_button();
    let bus = FakeEventBus::new();
    let modal = mount(&dom, &bus);

    for _ in 0..5 {
        modal.rendered_callback().unwrap();
        modal.rendered_callback().unwrap();
        modal.disconnected_callback();
    }
    assert_eq!(bus.total_listeners(), 0);

    modal.rendered_callback().unwrap();
    assert_eq!(bus.listener_count(ListenerKind::KeyUp), 1);

    // One Escape, one transition.  A stacked listener would flip it twice.
    modal.toggle_modal();
    let before = modal.controller().unwrap().state().transitions();
    bus.key_up(escape());
    assert!(!modal.is_open());
    assert_eq!(modal.controller().unwrap().state().transitions(), before + 1);
}

#[test]
fn disconnect_is_idempotent() {
    let dom = FakeDom::new();
    let bus = FakeEventBus::new();
    let modal = mount(&dom, &bus);
    modal.rendered_callback().unwrap();

    modal.disconnected_callback();
    modal.disconnected_callback();
    assert_eq!(bus.removals(), 2);
    assert!(!modal.is_attached());
    assert!(modal.controller().unwrap().state().is_first_render());
}

#[test]
fn detached_modal_ignores_global_keys() {
    let dom = FakeDom::new();
    dom.close_button();
    let bus = FakeEventBus::new();
    let modal = mount(&dom, &bus);
    modal.rendered_callback().unwrap();
    modal.toggle_modal();

    modal.disconnected_callback();
    bus.key_up(escape());
    assert!(modal.is_open());
}

#[test]
fn dropping_the_modal_releases_listeners() {
    let dom = FakeDom::new();
    let bus = FakeEventBus::new();
    {
        let modal = mount(&dom, &bus);
        modal.rendered_callback().unwrap();
        assert_eq!(bus.total_listeners(), 2);
    }
    assert_eq!(bus.total_listeners(), 0);
}

#[test]
fn failed_registration_rolls_back_and_retries() {
    let dom = FakeDom::new();
    let bus = FakeEventBus::new();
    bus.fail_registration_of(ListenerKind::Click);
    let modal = mount(&dom, &bus);

    let err = modal.rendered_callback().unwrap_err();
    assert!(matches!(err, ModalError::Listener { event: "click", .. }));
    assert_eq!(bus.total_listeners(), 0);
    assert!(!modal.is_attached());

    bus.accept_all_registrations();
    modal.rendered_callback().unwrap();
    assert_eq!(bus.total_listeners(), 2);
}

#[test]
fn outside_click_closes_through_document_listener() {
    let dom = FakeDom::new();
    dom.close_button();
    let outer = dom.outer_region();
    let bus = FakeEventBus::new();
    let modal = mount(&dom, &bus);
    modal.rendered_callback().unwrap();

    // Closed: nothing happens.
    bus.click(ClickInput::on(outer));
    assert!(!modal.is_open());

    modal.toggle_modal();
    bus.click(ClickInput::on(outer));
    assert!(!modal.is_open());
    assert_eq!(modal.css_class(), "modal hidden");
}

#[test]
fn inner_click_never_reaches_document_handler() {
    let dom = FakeDom::new();
    dom.close_button();
    let field = dom.focusable("field");
    let bus = FakeEventBus::new();
    let modal = mount(&dom, &bus);
    modal.rendered_callback().unwrap();
    modal.toggle_modal();

    let mut click = ClickInput::on(field);
    modal.handle_inner_click(&mut click);
    assert!(click.propagation_stopped);
    bus.click(click);
    assert!(modal.is_open());
}

#[test]
fn geometric_strategy_tracks_resize() {
    let dom = FakeDom::new();
    dom.close_button();
    let inner = dom.inner_panel(Rect::new(100.0, 100.0, 300.0, 400.0));
    let bus = FakeEventBus::new();
    let config = ModalConfig {
        dismiss_strategy: DismissStrategy::Geometric,
        ..ModalConfig::default()
    };
    let modal = Modal::new(dom.clone(), bus.clone(), &config).unwrap();
    modal.rendered_callback().unwrap();
    assert_eq!(bus.listener_count(ListenerKind::Resize), 1);

    // The panel moves; until resize fires, the old rectangle is used.
    dom.set_rect(inner, Rect::new(0.0, 0.0, 50.0, 50.0));
    modal.toggle_modal();
    let mut click = ClickInput::at(200.0, 200.0);
    modal.handle_inner_click(&mut click);
    assert!(modal.is_open());

    bus.resize();
    let mut click = ClickInput::at(200.0, 200.0);
    modal.handle_inner_click(&mut click);
    assert!(!modal.is_open());
}

#[test]
fn save_control_is_shown_only_with_a_handler() {
    let dom = FakeDom::new();
    let bus = FakeEventBus::new();
    let modal = mount(&dom, &bus);
    assert!(!modal.view().show_save);

    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    modal.set_modal_save_handler(Some(Rc::new(move || counter.set(counter.get() + 1))));
    assert!(modal.view().show_save);

    // The renderer calls the handler once per click on the save control.
    if let Some(handler) = modal.modal_save_handler() {
        handler();
    }
    assert_eq!(calls.get(), 1);

    modal.set_modal_save_handler(None);
    assert!(!modal.view().show_save);
}

#[test]
fn observer_runs_for_transitions_triggered_by_global_events() {
    let dom = FakeDom::new();
    dom.close_button();
    let bus = FakeEventBus::new();
    let modal = mount(&dom, &bus);
    modal.rendered_callback().unwrap();

    let renders = Rc::new(Cell::new(0));
    let counter = renders.clone();
    modal.set_view_observer(Some(Rc::new(move |_view: &modal_focus_trap::ModalView| {
        counter.set(counter.get() + 1)
    })));

    modal.toggle_modal();
    bus.key_up(escape());
    assert_eq!(renders.get(), 2);
}

#[test]
fn header_and_tagline_round_trip() {
    let dom = FakeDom::new();
    let bus = FakeEventBus::new();
    let modal = mount(&dom, &bus);

    modal.set_modal_header(Some("Rename".into()));
    modal.set_modal_tagline(Some("Pick something short".into()));
    assert_eq!(modal.modal_header().as_deref(), Some("Rename"));
    assert_eq!(modal.modal_tagline().as_deref(), Some("Pick something short"));
    assert!(modal.view().show_header);

    modal.set_modal_header(None);
    assert!(!modal.view().show_header);
}

#[test]
fn geometric_trigger_click_does_not_close_what_it_opened() {
    let dom = FakeDom::new();
    dom.close_button();
    let outer = dom.outer_region();
    dom.inner_panel(Rect::new(100.0, 100.0, 300.0, 400.0));
    let trigger = dom.page_button("trigger");
    let bus = FakeEventBus::new();
    let config = ModalConfig {
        dismiss_strategy: DismissStrategy::Geometric,
        ..ModalConfig::default()
    };
    let modal = Modal::new(dom.clone(), bus.clone(), &config).unwrap();
    modal.rendered_callback().unwrap();

    // The trigger's click handler opens the dialog, then the same click
    // bubbles up to the document listener.
    modal.toggle_modal();
    bus.click(ClickInput {
        client_x: 10.0,
        client_y: 10.0,
        ..ClickInput::on(trigger)
    });
    assert!(modal.is_open());

    // A click on the dialog's own backdrop area outside the panel closes it.
    bus.click(ClickInput {
        client_x: 10.0,
        client_y: 10.0,
        ..ClickInput::on(outer)
    });
    assert!(!modal.is_open());
}

/// Runs page code from inside `focus()`, the way a `focusin` listener would.
#[derive(Clone)]
struct FocusListeningDom {
    inner: FakeDom,
    on_focus: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
}

impl ModalDom for FocusListeningDom {
    type Element = NodeId;

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.inner.query_all(selector)
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.inner.query(selector)
    }

    fn within(&self, element: &NodeId, selector: &str) -> bool {
        self.inner.within(element, selector)
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.inner.has_class(element, class)
    }

    fn is_disabled(&self, element: &NodeId) -> bool {
        self.inner.is_disabled(element)
    }

    fn is_connected(&self, element: &NodeId) -> bool {
        self.inner.is_connected(element)
    }

    fn active_element(&self) -> Option<NodeId> {
        self.inner.active_element()
    }

    fn focus(&self, element: &NodeId) {
        self.inner.focus(element);
        let listener = self.on_focus.borrow().clone();
        if let Some(listener) = listener {
            listener();
        }
    }

    fn bounding_rect(&self, element: &NodeId) -> Option<Rect> {
        self.inner.bounding_rect(element)
    }
}

#[test]
fn getters_are_readable_from_focus_events_during_a_transition() {
    let inner = FakeDom::new();
    inner.close_button();
    inner.focusable("field");
    let trigger = inner.page_button("trigger");
    inner.set_active(Some(trigger));
    let dom = FocusListeningDom {
        inner: inner.clone(),
        on_focus: Rc::default(),
    };
    let bus = FakeEventBus::new();
    let modal = Rc::new(Modal::new(dom.clone(), bus.clone(), &ModalConfig::default()).unwrap());

    let seen: Rc<RefCell<Vec<(String, bool, bool)>>> = Rc::default();
    let (log, weak): (_, Weak<Modal<FocusListeningDom, FakeEventBus>>) =
        (seen.clone(), Rc::downgrade(&modal));
    *dom.on_focus.borrow_mut() = Some(Rc::new(move || {
        if let Some(modal) = weak.upgrade() {
            let view = modal.view();
            log.borrow_mut()
                .push((modal.css_class(), modal.is_open(), view.aria_hidden));
            assert!(modal.controller().is_none());
        }
    }));

    modal.toggle_modal();
    modal.toggle_modal();

    let seen = seen.borrow();
    assert_eq!(
        *seen,
        vec![
            ("modal visible fade-in-open".to_string(), true, false),
            ("modal hidden".to_string(), false, true),
        ]
    );
    assert_eq!(inner.active(), Some(trigger));
}
