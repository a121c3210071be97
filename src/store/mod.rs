//! Stores - Observer-list reactive values with fire-on-subscribe semantics.
//!
//! A [`Store`] keeps a value plus an ordered list of subscribers. Subscribing
//! invokes the handler once with the current value before returning the
//! unsubscribe closure. Every store also mirrors its value into a
//! `spark_signals::Signal`, so `derived`/`effect` computations can depend on it.
//!
//! # Example
//!
//! ```ignore
//! use spark_position::store::{Readable, Store, Writable};
//!
//! let count = Store::new(0);
//! let unsubscribe = count.subscribe(|value| println!("count = {value}"));
//! count.set(1);        // prints "count = 1"
//! count.update(|v| *v += 1);
//! unsubscribe();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use spark_signals::{signal, Signal};

/// Cleanup closure returned by `subscribe`.
pub type Unsubscriber = Box<dyn FnOnce()>;

// =============================================================================
// Store contract
// =============================================================================

/// Readable store contract: current value plus change subscription.
pub trait Readable<T: Clone + 'static> {
    /// Current value.
    fn get(&self) -> T;

    /// Subscribe with a boxed handler. The handler runs once immediately.
    fn subscribe_boxed(&self, handler: Box<dyn Fn(&T)>) -> Unsubscriber;

    /// Subscribe with any closure. The handler runs once immediately.
    fn subscribe(&self, handler: impl Fn(&T) + 'static) -> Unsubscriber
    where
        Self: Sized,
    {
        self.subscribe_boxed(Box::new(handler))
    }
}

/// Writable store contract.
pub trait Writable<T: Clone + 'static>: Readable<T> {
    fn set(&self, value: T);

    /// Read-modify-write.
    fn update(&self, f: impl FnOnce(&mut T))
    where
        Self: Sized,
    {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }
}

// =============================================================================
// Store
// =============================================================================

type Handler<T> = Rc<dyn Fn(&T)>;

struct StoreInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(u64, Handler<T>)>>,
    next_id: Cell<u64>,
    signal: Signal<T>,
}

/// Writable store.
///
/// Cloning a `Store` yields another handle to the same value.
pub struct Store<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for Store<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                signal: signal(value.clone()),
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Signal mirror of this store for spark-signals `derived`/`effect`.
    pub fn signal(&self) -> Signal<T> {
        self.inner.signal.clone()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Read without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Read-only view of this store.
    pub fn readable(&self) -> ReadableStore<T> {
        ReadableStore {
            store: self.clone(),
        }
    }

    /// Set and notify, skipping the notification when the value is unchanged.
    fn set_value(&self, value: T) {
        if *self.inner.value.borrow() == value {
            return;
        }
        *self.inner.value.borrow_mut() = value.clone();
        self.inner.signal.set(value.clone());
        self.notify(&value);
    }

    fn notify(&self, value: &T) {
        // Snapshot so handlers may subscribe/unsubscribe/set re-entrantly.
        let handlers: Vec<Handler<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(value);
        }
    }

    fn add_subscriber(&self, handler: Box<dyn Fn(&T)>) -> Unsubscriber {
        let handler: Handler<T> = Rc::from(handler);
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::clone(&handler)));

        let current = self.inner.value.borrow().clone();
        handler(&current);

        let weak = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .subscribers
                    .borrow_mut()
                    .retain(|(existing, _)| *existing != id);
            }
        })
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Readable<T> for Store<T> {
    fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    fn subscribe_boxed(&self, handler: Box<dyn Fn(&T)>) -> Unsubscriber {
        self.add_subscriber(handler)
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Writable<T> for Store<T> {
    fn set(&self, value: T) {
        self.set_value(value);
    }
}

impl<T: Clone + PartialEq + fmt::Debug + Default + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// =============================================================================
// ReadableStore - read-only view
// =============================================================================

/// Read-only handle to a [`Store`]. Only the owner of the underlying store can
/// publish new values.
pub struct ReadableStore<T> {
    store: Store<T>,
}

impl<T> Clone for ReadableStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadableStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadableStore").field(&self.store).finish()
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> ReadableStore<T> {
    pub fn signal(&self) -> Signal<T> {
        self.store.signal()
    }

    pub fn subscriber_count(&self) -> usize {
        self.store.subscriber_count()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.store.with(f)
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Readable<T> for ReadableStore<T> {
    fn get(&self) -> T {
        self.store.get()
    }

    fn subscribe_boxed(&self, handler: Box<dyn Fn(&T)>) -> Unsubscriber {
        self.store.subscribe_boxed(handler)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::effect;

    #[test]
    fn test_subscribe_fires_immediately() {
        let store = Store::new(5);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _unsub = store.subscribe(move |v| sink.borrow_mut().push(*v));
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_set_notifies_only_on_change() {
        let store = Store::new(1);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let _unsub = store.subscribe(move |_| c.set(c.get() + 1));
        assert_eq!(count.get(), 1);

        store.set(1);
        assert_eq!(count.get(), 1);

        store.set(2);
        assert_eq!(count.get(), 2);
        assert_eq!(store.get(), 2);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = Store::new(0);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let unsub = store.subscribe(move |_| c.set(c.get() + 1));
        assert_eq!(store.subscriber_count(), 1);

        unsub();
        assert_eq!(store.subscriber_count(), 0);
        store.set(9);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_update_merges() {
        let store = Store::new(vec![1, 2]);
        store.update(|v| v.push(3));
        assert_eq!(store.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_reentrant_set_from_handler() {
        let store = Store::new(0);
        let inner = store.clone();
        let _unsub = store.subscribe(move |v| {
            if *v == 1 {
                inner.set(2);
            }
        });
        store.set(1);
        assert_eq!(store.get(), 2);
    }

    #[test]
    fn test_signal_mirror_drives_effects() {
        let store = Store::new(10);
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let sig = store.signal();
        let _stop = effect(move || {
            let _ = sig.get();
            r.set(r.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        store.set(11);
        assert_eq!(runs.get(), 2);
        assert_eq!(store.signal().get(), 11);
    }

    #[test]
    fn test_readable_view_shares_value() {
        let store = Store::new("a".to_string());
        let view = store.readable();
        store.set("b".to_string());
        assert_eq!(view.get(), "b");
    }
}
