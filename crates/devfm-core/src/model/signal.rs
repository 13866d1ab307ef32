//! Single-threaded observer registry.
//!
//! Models publish [`super::DataChanged`] through a [`Signal`]; views and
//! decorating models subscribe to it. Cloning a `Signal` yields another
//! handle to the same subscriber list, so a subscriber can capture a clone
//! of a downstream signal and re-publish into it.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Signal::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Box<dyn FnMut(&T)>;

struct Slots<T> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<T>)>,
    /// Ids whose handlers are taken out of `handlers` by an emit in progress.
    detached: HashSet<SubscriptionId>,
    /// Detached ids unsubscribed before the emit finished.
    removed: HashSet<SubscriptionId>,
}

pub struct Signal<T> {
    slots: Rc<RefCell<Slots<T>>>,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                handlers: Vec::new(),
                detached: HashSet::new(),
                removed: HashSet::new(),
            })),
        }
    }

    /// Registers `handler` to run on every [`emit`](Self::emit).
    pub fn subscribe(&self, handler: impl FnMut(&T) + 'static) -> SubscriptionId {
        let mut slots = self.slots.borrow_mut();
        let id = SubscriptionId(slots.next_id);
        slots.next_id += 1;
        slots.handlers.push((id, Box::new(handler)));
        id
    }

    /// Removes a handler. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.handlers.len();
        slots.handlers.retain(|(hid, _)| *hid != id);
        if slots.handlers.len() != before {
            return true;
        }
        slots.detached.contains(&id) && slots.removed.insert(id)
    }

    /// Calls every handler with `value`, in subscription order.
    ///
    /// Handlers may subscribe or unsubscribe while running. A handler that
    /// emits on the same signal re-entrantly will not see the handlers of
    /// the outer emit.
    pub fn emit(&self, value: &T) {
        let mut running = {
            let mut slots = self.slots.borrow_mut();
            let running = std::mem::take(&mut slots.handlers);
            slots.detached.extend(running.iter().map(|(id, _)| *id));
            running
        };
        for (_, handler) in running.iter_mut() {
            handler(value);
        }

        let mut slots = self.slots.borrow_mut();
        for (id, _) in &running {
            slots.detached.remove(id);
        }
        let removed = &mut slots.removed;
        running.retain(|(id, _)| !removed.remove(id));
        // Handlers added during the emit go after the ones that ran.
        running.append(&mut slots.handlers);
        slots.handlers = running;
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().handlers.len()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn emit_reaches_all_subscribers_in_order() {
        let signal = Signal::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s1 = Rc::clone(&seen);
        signal.subscribe(move |v| s1.borrow_mut().push(("first", *v)));
        let s2 = Rc::clone(&seen);
        signal.subscribe(move |v| s2.borrow_mut().push(("second", *v)));

        signal.emit(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let signal = Signal::<()>::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let id = signal.subscribe(move |_| c.set(c.get() + 1));

        signal.emit(&());
        assert!(signal.unsubscribe(id));
        signal.emit(&());

        assert_eq!(count.get(), 1);
        assert!(!signal.unsubscribe(id));
    }

    #[test]
    fn clones_share_subscribers() {
        let signal = Signal::<()>::new();
        let handle = signal.clone();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        handle.subscribe(move |_| c.set(c.get() + 1));

        signal.emit(&());
        assert_eq!(count.get(), 1);
        assert_eq!(signal.subscriber_count(), 1);
    }

    #[test]
    fn subscribe_during_emit_takes_effect_next_time() {
        let signal = Signal::<()>::new();
        let count = Rc::new(Cell::new(0));

        let inner_signal = signal.clone();
        let c = Rc::clone(&count);
        let once = Cell::new(false);
        signal.subscribe(move |_| {
            if !once.replace(true) {
                let c = Rc::clone(&c);
                inner_signal.subscribe(move |_| c.set(c.get() + 1));
            }
        });

        signal.emit(&());
        assert_eq!(count.get(), 0);
        signal.emit(&());
        assert_eq!(count.get(), 1);
        assert_eq!(signal.subscriber_count(), 2);
    }

    #[test]
    fn unsubscribe_self_during_emit() {
        let signal = Signal::<()>::new();
        let count = Rc::new(Cell::new(0));
        let own_id = Rc::new(Cell::new(None));

        let inner_signal = signal.clone();
        let c = Rc::clone(&count);
        let id_slot = Rc::clone(&own_id);
        let id = signal.subscribe(move |_| {
            c.set(c.get() + 1);
            if let Some(id) = id_slot.get() {
                inner_signal.unsubscribe(id);
            }
        });
        own_id.set(Some(id));

        signal.emit(&());
        signal.emit(&());
        assert_eq!(count.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }
}
