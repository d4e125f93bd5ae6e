//! Ordered, synchronous, multi-subscriber notification channels.
//!
//! An [`EventSignal`] keeps its subscribers in an owned list and invokes
//! them in registration order on the caller's thread when fired. There is
//! no queuing: [`EventSignal::fire`] returns only after every handler has
//! run. A panicking handler is not caught.
//!
//! Each subscription gets a [`SubscriptionId`]. Handles are stable for the
//! lifetime of the signal so a removal API can be layered on later; today
//! subscriptions live as long as the signal.

/// Stable handle identifying one subscription on a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Boxed subscriber callback.
type Handler<A> = Box<dyn FnMut(&A) + Send>;

/// A synchronous fan-out channel carrying values of type `A`.
pub struct EventSignal<A> {
    /// Subscribers in registration order.
    subscribers: Vec<(SubscriptionId, Handler<A>)>,
    /// Next handle to hand out.
    next_id: u64,
}

impl<A> EventSignal<A> {
    /// Create a signal with no subscribers.
    pub const fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Append a subscriber. Duplicate handlers are not detected.
    pub fn connect<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&A) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Invoke every subscriber with `args`, in registration order.
    pub fn fire(&mut self, args: &A) {
        for (_, handler) in &mut self.subscribers {
            handler(args);
        }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<A> Default for EventSignal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> core::fmt::Debug for EventSignal<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventSignal")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn fires_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut signal = EventSignal::<u32>::new();
        for tag in ["a", "b", "c"] {
            let log = Arc::clone(&log);
            signal.connect(move |v: &u32| log.lock().unwrap().push(format!("{tag}{v}")));
        }
        signal.fire(&7);
        assert_eq!(*log.lock().unwrap(), vec!["a7", "b7", "c7"]);
    }

    #[test]
    fn handles_are_distinct_and_duplicates_allowed() {
        let count = Arc::new(Mutex::new(0_u32));
        let mut signal = EventSignal::<()>::new();
        let handler = {
            let count = Arc::clone(&count);
            move |_: &()| *count.lock().unwrap() += 1
        };
        let first = signal.connect(handler.clone());
        let second = signal.connect(handler);
        assert_ne!(first, second);
        signal.fire(&());
        assert_eq!(*count.lock().unwrap(), 2);
        assert_eq!(signal.len(), 2);
    }

    #[test]
    fn firing_empty_signal_is_noop() {
        let mut signal = EventSignal::<i64>::default();
        assert!(signal.is_empty());
        signal.fire(&1);
    }

    #[test]
    fn panicking_handler_propagates_and_stops_fanout() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut signal = EventSignal::<u32>::new();
        let first = Arc::clone(&log);
        signal.connect(move |v: &u32| first.lock().unwrap().push(("first", *v)));
        signal.connect(|v: &u32| panic!("handler failed on {v}"));
        let last = Arc::clone(&log);
        signal.connect(move |v: &u32| last.lock().unwrap().push(("last", *v)));

        let outcome = catch_unwind(AssertUnwindSafe(|| signal.fire(&3)));

        let payload = outcome.unwrap_err();
        assert_eq!(
            payload.downcast_ref::<String>().map(String::as_str),
            Some("handler failed on 3")
        );
        assert_eq!(*log.lock().unwrap(), vec![("first", 3)]);
    }
}
