use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use drishya_core::StatusUpdateEvent;
use drishya_logging::drishya_error;

type Listener = Arc<dyn Fn(&StatusUpdateEvent) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

pub(crate) type SharedRegistry = Arc<Mutex<Registry>>;

impl Registry {
    fn add(&mut self, listener: Listener) -> u64 {
        self.next_id += 1;
        self.listeners.push((self.next_id, listener));
        self.next_id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

pub(crate) fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn register(registry: &SharedRegistry, listener: Listener) -> Subscription {
    let id = lock(registry).add(listener);
    Subscription {
        id,
        registry: Arc::downgrade(registry),
    }
}

/// Calls every listener registered at the time of the call, in registration
/// order. A panicking listener is logged and skipped.
pub(crate) fn deliver(registry: &Mutex<Registry>, event: &StatusUpdateEvent) {
    let listeners: Vec<Listener> = lock(registry)
        .listeners
        .iter()
        .map(|(_, listener)| listener.clone())
        .collect();
    for listener in listeners {
        if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
            drishya_error!(
                "Live update subscriber panicked on {} ({})",
                event.record_id,
                event.new_status.as_str()
            );
        }
    }
}

/// Handle for one registered listener. Dropping it keeps the listener;
/// call [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Removes the listener. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => lock(&registry).remove(self.id),
            None => false,
        }
    }
}
