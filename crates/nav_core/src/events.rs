//! Single-threaded observer primitives.
//!
//! World-state owners expose [`Signal`]s; the terrain cache subscribes
//! to them and collects the returned [`Subscription`] guards into a
//! disposal list. Dropping a guard unsubscribes its handler.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Handler<E> = Rc<dyn Fn(&E)>;

struct Handlers<E> {
    next_id: u64,
    entries: Vec<(u64, Handler<E>)>,
}

/// A broadcast signal carrying events of type `E`.
///
/// Cloning a signal produces another handle to the same handler list.
pub struct Signal<E> {
    inner: Rc<RefCell<Handlers<E>>>,
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

// Handler registration hands a `Weak` to the handler list into a boxed
// cancel closure, so the event type must own no borrows.
impl<E: 'static> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Signal<E> {
    /// Create a signal with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Handlers {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a handler. The handler runs inline on every [`emit`]
    /// until the returned guard is dropped.
    ///
    /// [`emit`]: Signal::emit
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.push((id, Rc::new(handler)));
            id
        };
        let weak: Weak<RefCell<Handlers<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().entries.retain(|(i, _)| *i != id);
                }
            })),
        }
    }

    /// Invoke every current handler with the event.
    ///
    /// The handler list is snapshotted first, so handlers may subscribe
    /// or unsubscribe reentrantly without invalidating the iteration.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Handler<E>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in snapshot {
            handler(event);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

/// Registration handle returned by [`Signal::subscribe`].
///
/// Unsubscribes its handler when dropped or when
/// [`unsubscribe`](Subscription::unsubscribe) is called.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Explicitly remove the handler.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_subscribers() {
        let signal: Signal<u32> = Signal::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let _sub = signal.subscribe(move |v| sink.borrow_mut().push(*v));

        signal.emit(&1);
        signal.emit(&2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let signal: Signal<u32> = Signal::new();
        let seen = Rc::new(RefCell::new(0u32));

        let sink = Rc::clone(&seen);
        let sub = signal.subscribe(move |v| *sink.borrow_mut() += *v);

        signal.emit(&5);
        drop(sub);
        signal.emit(&7);
        assert_eq!(*seen.borrow(), 5);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let signal: Signal<()> = Signal::new();
        let sub = signal.subscribe(|()| {});
        assert_eq!(signal.subscriber_count(), 1);
        sub.unsubscribe();
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_reentrant_unsubscribe_during_emit() {
        let signal: Signal<()> = Signal::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let inner_slot = Rc::clone(&slot);
        let sub = signal.subscribe(move |()| {
            // Drop our own subscription while the emit is in flight.
            inner_slot.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        signal.emit(&());
        assert_eq!(signal.subscriber_count(), 0);
        signal.emit(&());
    }
}
