//! Focusable element discovery and the bounded focus wait.

use std::future::Future;

use crate::config::ModalConfig;
use crate::dom::ModalDom;

/// Enumerates the elements focus may land on inside the dialog.
///
/// Results are never cached: the host may re-render the dialog body between
/// two opens.
#[derive(Debug, Clone)]
pub struct FocusableElementScanner {
    focusable_selector: String,
    excluded_region: Option<String>,
    close_selector: String,
}

impl FocusableElementScanner {
    pub fn new(focusable_selector: impl Into<String>, close_selector: impl Into<String>) -> Self {
        Self {
            focusable_selector: focusable_selector.into(),
            excluded_region: None,
            close_selector: close_selector.into(),
        }
    }

    pub fn from_config(config: &ModalConfig) -> Self {
        Self {
            focusable_selector: config.focusable_selector.clone(),
            excluded_region: config.excluded_region_selector.clone(),
            close_selector: config.close_selector.clone(),
        }
    }

    pub fn excluding(mut self, region_selector: impl Into<String>) -> Self {
        self.excluded_region = Some(region_selector.into());
        self
    }

    /// Focusable elements in document order, slotted content included,
    /// disabled elements and the excluded region left out.
    pub fn scan<D: ModalDom>(&self, dom: &D) -> Vec<D::Element> {
        dom.query_all(&self.focusable_selector)
            .into_iter()
            .filter(|el| !dom.is_disabled(el))
            .filter(|el| match &self.excluded_region {
                Some(region) => !dom.within(el, region),
                None => true,
            })
            .collect()
    }

    /// The dialog's close control, the last-resort focus target.
    pub fn close_affordance<D: ModalDom>(&self, dom: &D) -> Option<D::Element> {
        dom.query(&self.close_selector)
    }

    /// First focusable element, or the close control when there is none.
    pub fn initial_target<D: ModalDom>(&self, dom: &D) -> Option<D::Element> {
        self.scan(dom)
            .into_iter()
            .next()
            .or_else(|| self.close_affordance(dom))
    }
}

/// Source of event-loop ticks for the focus wait.  The browser uses a
/// `setTimeout` future; tests advance a fake clock.
pub trait Ticker {
    type Tick: Future<Output = ()>;

    fn tick(&self, ms: u32) -> Self::Tick;
}

/// Asks "did this element really take focus?" without waiting forever.
///
/// Some elements silently refuse focus and others only report it a tick
/// later.  The wait polls the active element once per tick and gives up
/// after `timeout_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusWait {
    timeout_ms: u32,
    tick_ms: u32,
}

impl FocusWait {
    pub fn new(timeout_ms: u32, tick_ms: u32) -> Self {
        Self {
            timeout_ms,
            tick_ms: tick_ms.max(1),
        }
    }

    pub fn from_config(config: &ModalConfig) -> Self {
        Self::new(config.settle_timeout_ms, config.settle_tick_ms)
    }

    /// Upper bound on ticks spent per candidate.
    pub fn max_ticks(&self) -> u32 {
        self.timeout_ms.div_ceil(self.tick_ms)
    }

    pub async fn accepts<D, T>(&self, dom: &D, ticker: &T, element: &D::Element) -> bool
    where
        D: ModalDom,
        T: Ticker,
    {
        dom.focus(element);
        let mut waited = 0;
        loop {
            if dom.active_element().as_ref() == Some(element) {
                return true;
            }
            if waited >= self.max_ticks() {
                return false;
            }
            ticker.tick(self.tick_ms).await;
            waited += 1;
        }
    }
}

/// Walk the focusable candidates until one accepts focus, then fall back to
/// the close control.  Returns the element that ended up focused; `None`
/// only when the markup has no close control either.
pub async fn settle_focus<D, T>(
    dom: &D,
    scanner: &FocusableElementScanner,
    wait: &FocusWait,
    ticker: &T,
) -> Option<D::Element>
where
    D: ModalDom,
    T: Ticker,
{
    for candidate in scanner.scan(dom) {
        if wait.accepts(dom, ticker, &candidate).await {
            return Some(candidate);
        }
        debug_log!("focus wait: {:?} did not take focus", candidate);
    }

    match scanner.close_affordance(dom) {
        Some(close) => {
            dom.focus(&close);
            Some(close)
        }
        None => {
            warn_log!("modal has no close control; focus left where it was");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_CLOSE_SELECTOR, DEFAULT_FOCUSABLE_SELECTOR};
    use crate::testing::{FakeDom, FakeTicker, FocusBehavior, NodeSpec};
    use futures_executor::block_on;

    fn scanner() -> FocusableElementScanner {
        FocusableElementScanner::new(DEFAULT_FOCUSABLE_SELECTOR, DEFAULT_CLOSE_SELECTOR)
    }

    #[test]
    fn scan_merges_slotted_content_at_slot_position() {
        let dom = FakeDom::new();
        let header_link = dom.focusable("header-link");
        dom.place_slot();
        let footer_btn = dom.focusable("footer-button");
        let slotted_input = dom.add(
            NodeSpec::new("slotted-input")
                .matching(DEFAULT_FOCUSABLE_SELECTOR)
                .slotted(),
        );

        assert_eq!(scanner().scan(&dom), vec![header_link, slotted_input, footer_btn]);
    }

    #[test]
    fn scan_skips_disabled_and_excluded_region() {
        let dom = FakeDom::new();
        dom.add(
            NodeSpec::new("disabled")
                .matching(DEFAULT_FOCUSABLE_SELECTOR)
                .disabled(),
        );
        dom.add(
            NodeSpec::new("in-body")
                .matching(DEFAULT_FOCUSABLE_SELECTOR)
                .inside(".modal-body"),
        );
        let kept = dom.focusable("kept");

        let scanner = scanner().excluding(".modal-body");
        assert_eq!(scanner.scan(&dom), vec![kept]);
    }

    #[test]
    fn scan_is_fresh_each_call() {
        let dom = FakeDom::new();
        let scanner = scanner();
        assert!(scanner.scan(&dom).is_empty());

        let late = dom.focusable("late");
        assert_eq!(scanner.scan(&dom), vec![late]);

        dom.disconnect(late);
        assert!(scanner.scan(&dom).is_empty());
    }

    #[test]
    fn initial_target_falls_back_to_close() {
        let dom = FakeDom::new();
        let close = dom.close_button();
        assert_eq!(scanner().initial_target(&dom), Some(close));

        let first = dom.focusable("first");
        assert_eq!(scanner().initial_target(&dom), Some(first));
    }

    #[test]
    fn max_ticks_rounds_up() {
        assert_eq!(FocusWait::new(50, 10).max_ticks(), 5);
        assert_eq!(FocusWait::new(55, 10).max_ticks(), 6);
        assert_eq!(FocusWait::new(0, 10).max_ticks(), 0);
        // A zero interval is clamped so the bound stays finite.
        assert_eq!(FocusWait::new(3, 0).max_ticks(), 3);
    }

    #[test]
    fn wait_sees_late_focus() {
        let dom = FakeDom::new();
        let slow = dom.add(
            NodeSpec::new("slow")
                .matching(DEFAULT_FOCUSABLE_SELECTOR)
                .focus(FocusBehavior::Delayed(2)),
        );
        let ticker = FakeTicker::new(&dom);

        assert!(block_on(FocusWait::new(50, 10).accepts(&dom, &ticker, &slow)));
        assert_eq!(ticker.ticks(), 2);
    }

    #[test]
    fn wait_gives_up_after_deadline() {
        let dom = FakeDom::new();
        let inert = dom.add(
            NodeSpec::new("inert")
                .matching(DEFAULT_FOCUSABLE_SELECTOR)
                .focus(FocusBehavior::Rejects),
        );
        let ticker = FakeTicker::new(&dom);

        assert!(!block_on(FocusWait::new(30, 10).accepts(&dom, &ticker, &inert)));
        assert_eq!(ticker.ticks(), 3);
    }

    #[test]
    fn settle_skips_rejecting_candidates() {
        let dom = FakeDom::new();
        dom.add(
            NodeSpec::new("inert")
                .matching(DEFAULT_FOCUSABLE_SELECTOR)
                .focus(FocusBehavior::Rejects),
        );
        let second = dom.focusable("second");
        dom.close_button();
        let ticker = FakeTicker::new(&dom);

        let focused = block_on(settle_focus(&dom, &scanner(), &FocusWait::new(20, 10), &ticker));
        assert_eq!(focused, Some(second));
        assert_eq!(dom.active(), Some(second));
    }

    #[test]
    fn settle_falls_back_to_close_when_nothing_accepts() {
        let dom = FakeDom::new();
        dom.add(
            NodeSpec::new("inert")
                .matching(DEFAULT_FOCUSABLE_SELECTOR)
                .focus(FocusBehavior::Rejects),
        );
        let close = dom.close_button();
        let ticker = FakeTicker::new(&dom);

        let focused = block_on(settle_focus(&dom, &scanner(), &FocusWait::new(20, 10), &ticker));
        assert_eq!(focused, Some(close));
        assert_eq!(dom.active_label().as_deref(), Some("close"));
        assert_eq!(ticker.ticks(), 2);
    }

    #[test]
    fn settle_without_close_control_leaves_focus() {
        let dom = FakeDom::new();
        let page = dom.page_button("trigger");
        dom.set_active(Some(page));
        let ticker = FakeTicker::new(&dom);

        let focused = block_on(settle_focus(&dom, &scanner(), &FocusWait::new(20, 10), &ticker));
        assert_eq!(focused, None);
        assert_eq!(dom.active(), Some(page));
    }
}
