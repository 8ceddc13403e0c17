use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle returned by [`ListenerRegistry::add_listener`]. Never zero.
pub type ListenerId = u64;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Change-notification callbacks, dispatched in registration order.
///
/// The registration map has its own mutex, released before any callback
/// runs, so a callback may add or remove listeners (or call back into the
/// store) without deadlocking.
#[derive(Default)]
pub struct ListenerRegistry {
    inner: Mutex<Registrations>,
}

#[derive(Default)]
struct Registrations {
    last_id: ListenerId,
    // IDs only grow, so key order is registration order
    callbacks: BTreeMap<ListenerId, Callback>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback and return its handle
    pub fn add_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut reg = self.lock();
        reg.last_id += 1;
        let id = reg.last_id;
        reg.callbacks.insert(id, Arc::new(callback));
        id
    }

    /// Drop a registration. Unknown and zero IDs are ignored.
    pub fn remove_listener(&self, id: ListenerId) {
        if id == 0 {
            return;
        }
        self.lock().callbacks.remove(&id);
    }

    /// Invoke every callback registered at the moment of the call, once each.
    ///
    /// Callbacks added during dispatch wait for the next `notify`; callbacks
    /// removed during dispatch still run this time. A panicking callback is
    /// logged and the remaining callbacks still run.
    pub fn notify(&self) {
        let snapshot: Vec<(ListenerId, Callback)> = self
            .lock()
            .callbacks
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        for (id, callback) in snapshot {
            if panic::catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                tracing::error!(listener = id, "store listener panicked");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Registrations> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn Fn() + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for = Arc::clone(&log);
        let make = move |name: &'static str| -> Box<dyn Fn() + Send + Sync> {
            let log = Arc::clone(&log_for);
            Box::new(move || log.lock().unwrap().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_ids_are_nonzero_and_increasing() {
        let reg = ListenerRegistry::new();
        let a = reg.add_listener(|| {});
        let b = reg.add_listener(|| {});
        reg.remove_listener(a);
        let c = reg.add_listener(|| {});
        assert!(a > 0);
        assert!(b > a);
        assert!(c > b);
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let reg = ListenerRegistry::new();
        let (log, make) = recorder();
        reg.add_listener(make("first"));
        reg.add_listener(make("second"));
        reg.notify();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_removed_listener_stops_running() {
        let reg = ListenerRegistry::new();
        let (log, make) = recorder();
        let id = reg.add_listener(make("gone"));
        reg.add_listener(make("kept"));
        reg.remove_listener(id);
        reg.notify();
        assert_eq!(*log.lock().unwrap(), vec!["kept"]);
    }

    #[test]
    fn test_unknown_and_zero_ids_are_ignored() {
        let reg = ListenerRegistry::new();
        reg.add_listener(|| {});
        reg.remove_listener(0);
        reg.remove_listener(999);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_removal_during_dispatch_takes_effect_next_time() {
        let reg = Arc::new(ListenerRegistry::new());
        let second_runs = Arc::new(AtomicUsize::new(0));
        let second_id = Arc::new(AtomicUsize::new(0));

        let reg_in_cb = Arc::clone(&reg);
        let id_in_cb = Arc::clone(&second_id);
        reg.add_listener(move || {
            reg_in_cb.remove_listener(id_in_cb.load(Ordering::SeqCst) as ListenerId);
        });
        let runs = Arc::clone(&second_runs);
        let id = reg.add_listener(move || {
            runs.fetch_add(1, Ordering::SeqCst);
        });
        second_id.store(id as usize, Ordering::SeqCst);

        reg.notify();
        assert_eq!(second_runs.load(Ordering::SeqCst), 1);
        reg.notify();
        assert_eq!(second_runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_added_during_dispatch_waits_for_next_notify() {
        let reg = Arc::new(ListenerRegistry::new());
        let late_runs = Arc::new(AtomicUsize::new(0));

        let reg_in_cb = Arc::clone(&reg);
        let late = Arc::clone(&late_runs);
        let adder = reg.add_listener(move || {
            let late = Arc::clone(&late);
            reg_in_cb.add_listener(move || {
                late.fetch_add(1, Ordering::SeqCst);
            });
        });

        reg.notify();
        assert_eq!(late_runs.load(Ordering::SeqCst), 0);

        reg.remove_listener(adder);
        reg.notify();
        assert_eq!(late_runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_listener_does_not_stop_dispatch() {
        let reg = ListenerRegistry::new();
        let (log, make) = recorder();
        reg.add_listener(make("before"));
        reg.add_listener(|| panic!("listener failure"));
        reg.add_listener(make("after"));
        reg.notify();
        assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
    }

    #[test]
    fn test_concurrent_registration() {
        let reg = Arc::new(ListenerRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| reg.add_listener(|| {}))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut ids: Vec<ListenerId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400);
        assert_eq!(reg.len(), 400);
    }
}
