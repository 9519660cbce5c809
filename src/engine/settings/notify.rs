//! Synchronous, payload-free change notification.
//!
//! Subscribers get a shared reference to the object that changed, so they
//! can read it but cannot mutate it (or the subscriber list) while a
//! notification is being delivered.

use std::fmt;

/// Named notification channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Stream parameters (dimensions, rates, depths) changed
    SettingsChanged,
    /// Encoder or muxer selection changed
    EncodersChanged,
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::SettingsChanged => "settings-changed",
            Signal::EncodersChanged => "encoders-changed",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<T> {
    id: SubscriptionId,
    signal: Signal,
    callback: Box<dyn FnMut(&T)>,
}

/// Ordered observer list
pub struct Notifier<T> {
    next_id: u64,
    subscribers: Vec<Subscriber<T>>,
}

impl<T> Notifier<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(
        &mut self,
        signal: Signal,
        callback: impl FnMut(&T) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            signal,
            callback: Box::new(callback),
        });
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Call every subscriber of `signal`, in subscription order
    pub fn emit(&mut self, signal: Signal, target: &T) {
        for sub in self.subscribers.iter_mut().filter(|s| s.signal == signal) {
            (sub.callback)(target);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
