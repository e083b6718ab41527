use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Payload-free "something changed" fan-out.
///
/// Callbacks run synchronously, in registration order, every time
/// [`ChangeBus::notify`] is called. Observers are expected to re-read whatever
/// they display. Clones share the same listener list.
#[derive(Clone, Default)]
pub struct ChangeBus {
    inner: Arc<Mutex<Listeners>>,
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("listeners", &self.len())
            .finish()
    }
}

fn lock(inner: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(callback)));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    pub fn notify(&self) {
        // Snapshot first so a callback may subscribe or unsubscribe without deadlocking.
        let callbacks: Vec<Callback> = lock(&self.inner)
            .entries
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb();
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`ChangeBus::subscribe`].
///
/// Dropping the handle keeps the callback registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Removes the callback. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        let Some(inner) = self.bus.upgrade() else {
            return;
        };
        lock(&inner).entries.retain(|(id, _)| *id != self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Callback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_make = log.clone();
        let make = move |name: &'static str| -> Callback {
            let log = log_for_make.clone();
            Arc::new(move || log.lock().unwrap().push(name))
        };
        (log, make)
    }

    #[test]
    fn notify_runs_callbacks_in_registration_order() {
        let bus = ChangeBus::new();
        let (log, make) = recorder();
        let first = make("first");
        let second = make("second");
        let _a = bus.subscribe(move || first());
        let _b = bus.subscribe(move || second());

        bus.notify();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_is_idempotent_and_leaves_others() {
        let bus = ChangeBus::new();
        let (log, make) = recorder();
        let first = make("first");
        let second = make("second");
        let a = bus.subscribe(move || first());
        let _b = bus.subscribe(move || second());

        a.unsubscribe();
        a.unsubscribe();
        assert_eq!(bus.len(), 1);

        bus.notify();
        assert_eq!(*log.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn dropping_handle_keeps_subscription() {
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = hits.clone();
            let _ = bus.subscribe(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        bus.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let bus = ChangeBus::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let hits = Arc::new(AtomicUsize::new(0));

        let sub = {
            let slot = slot.clone();
            let hits = hits.clone();
            bus.subscribe(move || {
                hits.fetch_add(1, Ordering::SeqCst);
                if let Some(sub) = slot.lock().unwrap().as_ref() {
                    sub.unsubscribe();
                }
            })
        };
        *slot.lock().unwrap() = Some(sub);

        bus.notify();
        bus.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(bus.is_empty());
    }
}
