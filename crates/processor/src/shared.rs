use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use oe_core::{Event, Order, OrderId};
use oe_observers::OrderObserver;

use crate::{Applied, EventProcessor, ProcessError};

/// An `EventProcessor` behind one mutex, for callers on several threads.
///
/// The lock covers the order map and the observer list together, so every
/// operation sees a state between two events. Observers run while the lock
/// is held and must not call back into the same processor.
#[derive(Clone, Default)]
pub struct SharedEventProcessor {
    inner: Arc<Mutex<EventProcessor>>,
}

impl SharedEventProcessor {
    pub fn new(processor: EventProcessor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(processor)),
        }
    }

    pub fn process_event(&self, event: Event) -> Result<Applied, ProcessError> {
        self.lock().process_event(event)
    }

    pub fn add_observer(&self, observer: Arc<dyn OrderObserver>) {
        self.lock().add_observer(observer);
    }

    pub fn remove_observer<O>(&self, observer: &Arc<O>) -> bool
    where
        O: OrderObserver + ?Sized,
    {
        self.lock().remove_observer(observer)
    }

    pub fn get_orders(&self) -> HashMap<OrderId, Order> {
        self.lock().get_orders()
    }

    /// Runs `f` against the processor with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&EventProcessor) -> R) -> R {
        f(&*self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, EventProcessor> {
        // state only changes inside process_event, which never leaves a
        // half-applied event behind, so a poisoned guard is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
