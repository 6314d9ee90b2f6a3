use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use crate::GridId;

/// Change notification sent to subscribers of a controller.
#[derive(Clone, Debug, PartialEq)]
pub enum LifeEvent {
    /// A new field was installed; the generation counter is back at zero.
    Replaced { id: GridId },
    /// A tick published generation `generation` of field `id`.
    Advanced { generation: u64, id: GridId },
    /// The simulation loop stopped because the step engine failed.
    Faulted { message: String },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&LifeEvent) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Observers {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl Observers {
    pub fn subscribe(
        &self,
        listener: impl Fn(&LifeEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Listener = Arc::new(listener);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(other, _)| *other != id);
        listeners.len() != before
    }

    /// Calls every listener in subscription order.
    ///
    /// The list is copied first so listeners may (un)subscribe while being notified.
    pub fn notify(&self, event: &LifeEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_subscribe_notify_unsubscribe() {
        let observers = Observers::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = observers.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let event = LifeEvent::Replaced { id: GridId::new() };

        observers.notify(&event);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(&event);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(observers.len(), 0);
    }

    #[test]
    fn test_listener_may_subscribe_during_notify() {
        let observers = Arc::new(Observers::default());
        let inner = Arc::clone(&observers);
        observers.subscribe(move |_| {
            inner.subscribe(|_| {});
        });
        observers.notify(&LifeEvent::Faulted {
            message: String::new(),
        });
        assert_eq!(observers.len(), 2);
    }
}
