//! Explicit observer registration.
//!
//! A [`Signal`] keeps a list of listeners in subscription order. Subscribing hands out a
//! [`Subscription`] token; the listener stays registered until the token is given back through
//! [`Signal::unsubscribe`].

use std::fmt;

use super::id::IdCounter;

static SUBSCRIPTION_ID_COUNTER: IdCounter = IdCounter::new();

/// Opaque handle to a registered listener.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping the token leaks the subscription"]
pub struct Subscription(u32);

pub struct Signal<L> {
    listeners: Vec<(u32, L)>,
}

impl<L> Default for Signal<L> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<L> fmt::Debug for Signal<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<L> Signal<L> {
    pub fn subscribe(&mut self, listener: L) -> Subscription {
        let id = SUBSCRIPTION_ID_COUNTER.next();
        self.listeners.push((id, listener));
        Subscription(id)
    }

    /// Removes the listener, returning it if it was still registered.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> Option<L> {
        let idx = self
            .listeners
            .iter()
            .position(|(id, _)| *id == subscription.0)?;
        Some(self.listeners.remove(idx).1)
    }

    pub fn listeners(&self) -> impl Iterator<Item = &L> + '_ {
        self.listeners.iter().map(|(_, l)| l)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Signal<Box<dyn FnMut(&E)>> {
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}
