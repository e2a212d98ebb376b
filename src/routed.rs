//! Routed events.
//!
//! A routed event travels along the ancestor chain of the control it originates from, in three
//! phases:
//!
//! 1. **tunnel**, from the outermost ancestor down to the originating control;
//! 2. **bubble**, from the originating control back up, only if no tunnel handler marked the
//!    event as handled;
//! 3. **direct**, on every control in the chain, regardless of `handled`.
//!
//! Both tunnel and bubble stop at the first handler that sets `handled`.
//!
//! Controls in the chain are stored as ids and looked up again right before each is visited,
//! so handlers may freely add, remove or delete controls during dispatch: a control that no
//! longer exists is skipped.

use crate::control::{ControlEvents, ControlId};
use crate::host::Host;
use core::fmt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Arguments passed to routed event handlers.
#[derive(Debug, Clone)]
pub struct EventArgs<T> {
    /// The control whose handlers are currently running.
    pub sender: ControlId,

    /// The control the event originated from.
    pub original_sender: ControlId,

    /// Set to true to stop the tunnel or bubble phase.
    pub handled: bool,

    /// Event payload.
    pub data: T,
}

/// Identifies a handler within an [`Event`] so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    fn new() -> HandlerId {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        HandlerId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type HandlerFn<T> = dyn FnMut(&mut Host, &mut EventArgs<T>) + Send;

/// A shared event handler.
pub struct EventHandler<T>(Arc<Mutex<HandlerFn<T>>>);

impl<T> Clone for EventHandler<T> {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl<T> EventHandler<T> {
    pub fn new<F: 'static + FnMut(&mut Host, &mut EventArgs<T>) + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    /// Calls the handler. Returns false if the handler is already running further up the stack,
    /// in which case it is not called again.
    pub fn call(&self, host: &mut Host, args: &mut EventArgs<T>) -> bool {
        match self.0.try_lock() {
            Some(mut handler) => {
                (&mut *handler)(host, args);
                true
            }
            None => false,
        }
    }
}

impl<T> fmt::Debug for EventHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler({:p})", Arc::as_ptr(&self.0))
    }
}

/// An ordered list of handlers.
///
/// Raising iterates over a snapshot, so handlers added or removed while the event is being
/// raised take effect on the next raise.
pub struct Event<T> {
    handlers: Vec<(HandlerId, EventHandler<T>)>,
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Event {
            handlers: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Event({} handlers)", self.handlers.len())
    }
}

impl<T> Event<T> {
    pub fn new() -> Event<T> {
        Event::default()
    }

    /// Appends a handler.
    pub fn add_handler<F>(&mut self, handler: F) -> HandlerId
    where
        F: 'static + FnMut(&mut Host, &mut EventArgs<T>) + Send,
    {
        let id = HandlerId::new();
        self.handlers.push((id, EventHandler::new(handler)));
        id
    }

    /// Inserts a handler before all existing ones.
    pub fn prepend_handler<F>(&mut self, handler: F) -> HandlerId
    where
        F: 'static + FnMut(&mut Host, &mut EventArgs<T>) + Send,
    {
        let id = HandlerId::new();
        self.handlers.insert(0, (id, EventHandler::new(handler)));
        id
    }

    /// Removes a handler; returns false if it was not registered.
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        let len = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != len
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn snapshot(&self) -> Vec<EventHandler<T>> {
        self.handlers.iter().map(|(_, h)| h.clone()).collect()
    }
}

/// The three handler lists of a routed event.
pub struct RoutedEvent<T> {
    pub tunnel: Event<T>,
    pub bubble: Event<T>,
    pub direct: Event<T>,
}

impl<T> Default for RoutedEvent<T> {
    fn default() -> Self {
        RoutedEvent {
            tunnel: Event::new(),
            bubble: Event::new(),
            direct: Event::new(),
        }
    }
}

impl<T> fmt::Debug for RoutedEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RoutedEvent")
            .field("tunnel", &self.tunnel)
            .field("bubble", &self.bubble)
            .field("direct", &self.direct)
            .finish()
    }
}

/// Picks one routed event out of a control’s events.
pub type EventSelector<T> = fn(&ControlEvents) -> &RoutedEvent<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tunnel,
    Bubble,
    Direct,
}

fn phase_event<T>(event: &RoutedEvent<T>, phase: Phase) -> &Event<T> {
    match phase {
        Phase::Tunnel => &event.tunnel,
        Phase::Bubble => &event.bubble,
        Phase::Direct => &event.direct,
    }
}

/// Raises one phase on one control. Returns true if a handler marked the event as handled.
fn raise<T: Clone>(
    host: &mut Host,
    control: ControlId,
    original: ControlId,
    selector: EventSelector<T>,
    phase: Phase,
    data: &T,
    stop_on_handled: bool,
) -> bool {
    // resolve right before use; the control may be gone by now
    let handlers = match host.tree().events(control) {
        Some(events) => phase_event(selector(events), phase).snapshot(),
        None => {
            log::trace!(target: "perch::routed", "skipping deleted control {:?}", control);
            return false;
        }
    };

    let mut args = EventArgs {
        sender: control,
        original_sender: original,
        handled: false,
        data: data.clone(),
    };
    for handler in handlers {
        if !handler.call(host, &mut args) {
            log::warn!(
                target: "perch::routed",
                "{:?} re-entered while running on {:?}; skipped",
                handler,
                control
            );
        }
        if stop_on_handled && args.handled {
            return true;
        }
    }
    args.handled
}

/// Dispatches a routed event from `original` up to, but excluding, `last_receiver`.
///
/// If `last_receiver` is `None` or not an ancestor, the event travels up to the root. Returns
/// true if the tunnel or bubble phase was handled.
pub fn dispatch<T: Clone>(
    host: &mut Host,
    original: ControlId,
    selector: EventSelector<T>,
    last_receiver: Option<ControlId>,
    data: T,
) -> bool {
    if Some(original) == last_receiver {
        return false;
    }

    // leaf to root
    let mut chain = Vec::new();
    let mut current = Some(original);
    while let Some(id) = current {
        if Some(id) == last_receiver {
            break;
        }
        chain.push(id);
        current = host.tree().parent(id);
    }

    if host.context().config().trace_routed_events {
        log::trace!(
            target: "perch::routed",
            "dispatching from {:?} through {} controls",
            original,
            chain.len()
        );
    }

    let mut handled = false;
    for id in chain.iter().rev() {
        if raise(host, *id, original, selector, Phase::Tunnel, &data, true) {
            handled = true;
            break;
        }
    }

    if !handled {
        for id in &chain {
            if raise(host, *id, original, selector, Phase::Bubble, &data, true) {
                handled = true;
                break;
            }
        }
    }

    for id in &chain {
        raise(host, *id, original, selector, Phase::Direct, &data, false);
    }

    handled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_and_prepend() {
        let mut event = Event::<()>::new();
        let a = event.add_handler(|_, _| ());
        let b = event.prepend_handler(|_, _| ());
        assert_eq!(event.len(), 2);
        assert_eq!(event.handlers[0].0, b);

        assert!(event.remove_handler(a));
        assert!(!event.remove_handler(a));
        assert_eq!(event.len(), 1);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut event = Event::<()>::new();
        event.add_handler(|_, _| ());
        let snapshot = event.snapshot();
        event.add_handler(|_, _| ());
        assert_eq!(snapshot.len(), 1);
        assert_eq!(event.len(), 2);
    }
}
