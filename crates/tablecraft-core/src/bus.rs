//! The synchronous event bus that decouples the document core from whatever
//! is listening to it (a UI layer, a persistence layer, a test harness).
//!
//! Handlers are plain closures registered under an [`EventName`]. Delivery is
//! synchronous and FIFO: `emit` either dispatches immediately or, while the
//! bus is paused, appends to a single ordered buffer so that batched work
//! (a paste, a structural edit that touches many cells) replays in the order
//! it happened once the batch ends.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::events::{EventName, EventPayload};

type Handler = Box<dyn FnMut(&EventPayload)>;

/// Pub/sub dispatcher for every event the document core emits.
///
/// `pause`/`resume` nest: the bus only buffers while at least one pause is
/// outstanding, and only flushes once the last one is released. Call
/// [`EventBus::batch`] rather than pairing `pause`/`resume` by hand so a
/// panic partway through a batched operation still resumes the bus.
pub struct EventBus {
    handlers: HashMap<EventName, Vec<Handler>>,
    pause_depth: u32,
    buffer: Vec<EventPayload>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            pause_depth: 0,
            buffer: Vec::new(),
        }
    }

    /// Register a handler for `name`. Returns a token that [`EventBus::off`]
    /// accepts to remove exactly this handler.
    pub fn on<F>(&mut self, name: EventName, handler: F) -> SubscriptionId
    where
        F: FnMut(&EventPayload) + 'static,
    {
        let slot = self.handlers.entry(name).or_default();
        let id = SubscriptionId { name, index: slot.len() };
        slot.push(Box::new(handler));
        id
    }

    /// Remove a handler previously returned by [`EventBus::on`]. Removing the
    /// same id twice, or an id from a bus that has since been rebuilt, is a
    /// silent no-op rather than a panic.
    pub fn off(&mut self, id: SubscriptionId) {
        if let Some(slot) = self.handlers.get_mut(&id.name) {
            if id.index < slot.len() {
                slot.remove(id.index);
            }
        }
    }

    /// Emit an event. While paused, the payload is appended to the pending
    /// buffer instead of being dispatched.
    pub fn emit(&mut self, payload: EventPayload) {
        if self.pause_depth > 0 {
            self.buffer.push(payload);
        } else {
            self.dispatch(&payload);
        }
    }

    /// Increment the pause depth, buffering subsequent `emit` calls.
    pub fn pause(&mut self) {
        self.pause_depth += 1;
    }

    /// Decrement the pause depth. Once it reaches zero, every buffered event
    /// is dispatched in the order it was emitted, followed by a single
    /// synthetic `batch:flush` event reporting how many were buffered.
    pub fn resume(&mut self) {
        if self.pause_depth == 0 {
            return;
        }
        self.pause_depth -= 1;
        if self.pause_depth == 0 {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let buffered = std::mem::take(&mut self.buffer);
        let count = buffered.len();
        for payload in &buffered {
            self.dispatch(payload);
        }
        if count > 0 {
            self.dispatch(&EventPayload::BatchFlush {
                buffered_event_count: count,
            });
        }
    }

    /// True while at least one [`EventBus::pause`] is outstanding.
    pub fn is_paused(&self) -> bool {
        self.pause_depth > 0
    }

    /// Run `f` with the bus paused, resuming (and flushing) afterward even if
    /// `f` panics, so a failed multi-step operation never leaves the bus
    /// wedged open.
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut EventBus) -> T) -> T {
        self.pause();
        let result = catch_unwind(AssertUnwindSafe(|| f(self)));
        self.resume();
        match result {
            Ok(value) => value,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }

    fn dispatch(&mut self, payload: &EventPayload) {
        let name = EventName::of(payload);
        let Some(slot) = self.handlers.get_mut(&name) else {
            return;
        };
        for handler in slot.iter_mut() {
            let outcome = catch_unwind(AssertUnwindSafe(|| handler(payload)));
            if let Err(_err) = outcome {
                #[cfg(feature = "tracing")]
                tracing::error!(event = name.as_str(), "event handler panicked");
            }
        }
    }
}

/// A handle returned by [`EventBus::on`], used to unsubscribe later.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubscriptionId {
    name: EventName,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample_payload() -> EventPayload {
        EventPayload::BatchFlush {
            buffered_event_count: 0,
        }
    }

    #[test]
    fn emits_dispatch_immediately_when_not_paused() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let log2 = log.clone();
        bus.on(EventName::BatchFlush, move |_| log2.borrow_mut().push(1));
        bus.emit(sample_payload());
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn paused_events_buffer_and_flush_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let log2 = log.clone();
        bus.on(EventName::CellChange, move |_| log2.borrow_mut().push("cell"));
        let log3 = log.clone();
        bus.on(EventName::BatchFlush, move |_| log3.borrow_mut().push("flush"));

        bus.pause();
        bus.emit(EventPayload::CellChange {
            coord: tablecraft_common::Coord::new(0, 0),
            field: crate::events::CellField::Value {
                old: String::new(),
                new: "x".into(),
            },
        });
        assert!(log.borrow().is_empty());
        bus.resume();

        assert_eq!(*log.borrow(), vec!["cell", "flush"]);
    }

    #[test]
    fn nested_pause_only_flushes_on_outermost_resume() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let count2 = count.clone();
        bus.on(EventName::BatchFlush, move |_| *count2.borrow_mut() += 1);

        bus.pause();
        bus.pause();
        bus.emit(sample_payload());
        bus.resume();
        assert_eq!(*count.borrow(), 0);
        bus.resume();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn off_removes_only_the_targeted_handler() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let log2 = log.clone();
        let id = bus.on(EventName::BatchFlush, move |_| log2.borrow_mut().push("a"));
        let log3 = log.clone();
        bus.on(EventName::BatchFlush, move |_| log3.borrow_mut().push("b"));

        bus.off(id);
        bus.emit(sample_payload());
        assert_eq!(*log.borrow(), vec!["b"]);
    }

    #[test]
    fn handler_panic_does_not_stop_other_handlers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on(EventName::BatchFlush, |_| panic!("boom"));
        let log2 = log.clone();
        bus.on(EventName::BatchFlush, move |_| log2.borrow_mut().push("ok"));

        bus.emit(sample_payload());
        assert_eq!(*log.borrow(), vec!["ok"]);
    }

    #[test]
    fn batch_resumes_even_if_closure_panics() {
        let mut bus = EventBus::new();
        bus.pause();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            bus.batch(|b| {
                b.emit(sample_payload());
                panic!("mid-batch failure");
            })
        }));
        assert!(result.is_err());
        assert!(bus.is_paused());
        bus.resume();
    }
}
