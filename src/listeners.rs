//! Global listener lifecycle.
//!
//! A modal needs a handful of listeners outside its own subtree: keyup on the
//! window for the focus trap, click on the document for outside-click
//! dismissal, and (geometric strategy only) resize on the window to
//! re-measure the inner panel.  They are attached once, on the first
//! completed render, and released on teardown.
//!
//! Registration goes through [`ListenerTarget`].  Each registration yields a
//! subscription value that detaches itself when dropped, so the lifecycle
//! only has to decide *when* to drop them.

use std::rc::Rc;

use crate::dismiss::ClickInput;
use crate::error::ModalError;
use crate::keys::KeyInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    KeyUp,
    Click,
    Resize,
}

/// Where a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerScope {
    Window,
    Document,
}

impl ListenerKind {
    pub fn event_name(self) -> &'static str {
        match self {
            ListenerKind::KeyUp => "keyup",
            ListenerKind::Click => "click",
            ListenerKind::Resize => "resize",
        }
    }

    pub fn scope(self) -> ListenerScope {
        match self {
            ListenerKind::Click => ListenerScope::Document,
            ListenerKind::KeyUp | ListenerKind::Resize => ListenerScope::Window,
        }
    }
}

/// A global event translated into controller terms.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalEvent<E> {
    KeyUp(KeyInput),
    Click(ClickInput<E>),
    Resize,
}

pub type GlobalHandler<E> = Rc<dyn Fn(GlobalEvent<E>)>;

pub trait ListenerTarget<E> {
    /// Detaches the listener when dropped.  Dropping after the target itself
    /// went away must be harmless.
    type Subscription;

    fn listen(
        &self,
        kind: ListenerKind,
        handler: GlobalHandler<E>,
    ) -> Result<Self::Subscription, ModalError>;
}

/// Owns the live subscriptions of one widget instance.
pub struct EventListenerLifecycle<S> {
    subscriptions: Vec<(ListenerKind, S)>,
}

impl<S> Default for EventListenerLifecycle<S> {
    fn default() -> Self {
        Self { subscriptions: Vec::new() }
    }
}

impl<S> EventListenerLifecycle<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn attached_kinds(&self) -> Vec<ListenerKind> {
        self.subscriptions.iter().map(|(kind, _)| *kind).collect()
    }

    /// Register one listener per kind.  All or nothing: if any registration
    /// fails, the ones already made are released before the error is
    /// returned.  Calling this while attached is a no-op.
    pub fn attach<E, T>(
        &mut self,
        target: &T,
        kinds: &[ListenerKind],
        handler: GlobalHandler<E>,
    ) -> Result<(), ModalError>
    where
        T: ListenerTarget<E, Subscription = S>,
    {
        if self.is_attached() {
            debug_log!("listeners already attached, skipping");
            return Ok(());
        }

        let mut acquired = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            // On error `acquired` is dropped here, detaching the partial set.
            let subscription = target.listen(kind, Rc::clone(&handler))?;
            acquired.push((kind, subscription));
        }
        debug_log!("attached {} global listeners", acquired.len());
        self.subscriptions = acquired;
        Ok(())
    }

    /// Release every subscription.  Returns how many were released; calling
    /// it again returns 0.
    pub fn detach_all(&mut self) -> usize {
        let released = self.subscriptions.len();
        if released > 0 {
            debug_log!("detaching {} global listeners", released);
        }
        self.subscriptions.clear();
        released
    }
}

impl<S> Drop for EventListenerLifecycle<S> {
    fn drop(&mut self) {
        self.detach_all();
    }
}
