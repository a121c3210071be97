//! Resize Observer Manager - One shared observer, many consumers.
//!
//! Hosts have a single native resize observer for the whole process. The
//! manager owns the element -> subscribers table, tells the backend to start
//! watching an element when its first subscriber arrives and to stop when the
//! last one leaves, and fans measurements out to each subscriber's
//! [`ResizeTarget`].
//!
//! The native observer reports content-box sizes. Offset sizes are derived by
//! adding the border + padding cached per subscriber at registration time.
//!
//! # Flow
//!
//! ```text
//! host observer --notify(entries)--> manager --deliver--> ResizeTarget
//!                                       |
//!                 content + cached border/padding = offset
//! ```

mod target;

pub use target::{
    PairCallback, PositionalCallback, ResizeCallback, ResizeCapabilities, ResizeData, ResizeTarget,
};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::element::ElementRef;
use crate::error::{PositionError, Result};

// =============================================================================
// Backend
// =============================================================================

/// The host's native resize observer.
pub trait ObserverBackend {
    fn observe(&self, element: &ElementRef);
    fn unobserve(&self, element: &ElementRef);
}

/// Headless backend: measurements arrive only through [`ResizeObserverManager::notify`].
impl ObserverBackend for () {
    fn observe(&self, _element: &ElementRef) {}
    fn unobserve(&self, _element: &ElementRef) {}
}

/// One measurement pushed by the host.
#[derive(Debug, Clone)]
pub struct ResizeEntry {
    pub element: ElementRef,
    pub content_width: f64,
    pub content_height: f64,
}

// =============================================================================
// Manager
// =============================================================================

struct Subscriber {
    target: ResizeTarget,
    content_width: Option<f64>,
    content_height: Option<f64>,
    additional_width: f64,
    additional_height: f64,
}

impl Subscriber {
    fn data(&self) -> ResizeData {
        ResizeData::from_content(
            self.content_width,
            self.content_height,
            self.additional_width,
            self.additional_height,
        )
    }
}

struct ManagerInner {
    backend: Box<dyn ObserverBackend>,
    subscriptions: RefCell<HashMap<ElementRef, Vec<Subscriber>>>,
}

/// Shared resize observation service.
///
/// Construct one per host and hand clones to every consumer.
#[derive(Clone)]
pub struct ResizeObserverManager {
    inner: Rc<ManagerInner>,
}

impl ResizeObserverManager {
    pub fn new(backend: impl ObserverBackend + 'static) -> Self {
        Self {
            inner: Rc::new(ManagerInner {
                backend: Box::new(backend),
                subscriptions: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Manager with the no-op backend.
    pub fn headless() -> Self {
        Self::new(())
    }

    /// Register `target` for `element`.
    ///
    /// Accepts a [`ResizeTarget`] or anything convertible into one, such as
    /// [`ResizeCapabilities`]. The backend observes the element only for its
    /// first subscriber. A subscriber joining an element that already has
    /// measurements receives them right away.
    pub fn add<T>(&self, element: &ElementRef, target: T) -> Result<()>
    where
        T: TryInto<ResizeTarget>,
        PositionError: From<T::Error>,
    {
        let target = target.try_into()?;
        let (additional_width, additional_height) = element.border_padding();

        let (first, known) = {
            let mut subscriptions = self.inner.subscriptions.borrow_mut();
            let subscribers = subscriptions.entry(element.clone()).or_default();
            let first = subscribers.is_empty();
            let known = subscribers
                .iter()
                .find(|sub| sub.content_width.is_some() || sub.content_height.is_some())
                .map(|sub| (sub.content_width, sub.content_height));
            let (content_width, content_height) = known.unwrap_or((None, None));
            subscribers.push(Subscriber {
                target: target.clone(),
                content_width,
                content_height,
                additional_width,
                additional_height,
            });
            let known = known.map(|(width, height)| {
                ResizeData::from_content(width, height, additional_width, additional_height)
            });
            (first, known)
        };

        debug!(?element, ?target, first, "resize subscriber added");
        if first {
            self.inner.backend.observe(element);
        }
        if let Some(data) = known {
            target.deliver(&data);
        }
        Ok(())
    }

    /// Detach `target` from `element`, or every subscriber when `target` is `None`.
    ///
    /// A specific target receives one final cleared update. Redundant removals
    /// are no-ops.
    pub fn remove(&self, element: &ElementRef, target: Option<&ResizeTarget>) {
        let (removed, now_empty) = {
            let mut subscriptions = self.inner.subscriptions.borrow_mut();
            let Some(subscribers) = subscriptions.get_mut(element) else {
                return;
            };
            let removed = match target {
                Some(target) => match subscribers.iter().position(|sub| sub.target.same(target)) {
                    Some(index) => Some(subscribers.remove(index).target),
                    None => return,
                },
                None => {
                    subscribers.clear();
                    None
                }
            };
            let now_empty = subscribers.is_empty();
            if now_empty {
                subscriptions.remove(element);
            }
            (removed, now_empty)
        };

        if now_empty {
            debug!(?element, "resize observation stopped");
            self.inner.backend.unobserve(element);
        }
        if let Some(target) = removed {
            target.deliver(&ResizeData::cleared());
        }
    }

    /// Re-read border/padding for every subscriber of `element` and republish.
    ///
    /// Call after changing the element's border or padding.
    pub fn update_cache(&self, element: &ElementRef) {
        let (additional_width, additional_height) = element.border_padding();
        let deliveries = {
            let mut subscriptions = self.inner.subscriptions.borrow_mut();
            let Some(subscribers) = subscriptions.get_mut(element) else {
                return;
            };
            subscribers
                .iter_mut()
                .map(|sub| {
                    sub.additional_width = additional_width;
                    sub.additional_height = additional_height;
                    (sub.target.clone(), sub.data())
                })
                .collect::<Vec<_>>()
        };
        for (target, data) in deliveries {
            target.deliver(&data);
        }
    }

    /// Push measurements from the host observer.
    pub fn notify(&self, entries: &[ResizeEntry]) {
        for entry in entries {
            let deliveries = {
                let mut subscriptions = self.inner.subscriptions.borrow_mut();
                let Some(subscribers) = subscriptions.get_mut(&entry.element) else {
                    continue;
                };
                subscribers
                    .iter_mut()
                    .map(|sub| {
                        sub.content_width = Some(entry.content_width);
                        sub.content_height = Some(entry.content_height);
                        (sub.target.clone(), sub.data())
                    })
                    .collect::<Vec<_>>()
            };
            // Targets may add/remove subscriptions, so no borrow is held here.
            for (target, data) in deliveries {
                target.deliver(&data);
            }
        }
    }

    /// Is the element currently observed?
    pub fn is_observed(&self, element: &ElementRef) -> bool {
        self.inner.subscriptions.borrow().contains_key(element)
    }

    /// Number of subscribers registered for `element`.
    pub fn subscriber_count(&self, element: &ElementRef) -> usize {
        self.inner
            .subscriptions
            .borrow()
            .get(element)
            .map_or(0, Vec::len)
    }

    /// Drop every subscription, unobserving all elements.
    pub fn clear(&self) {
        let elements: Vec<ElementRef> = self
            .inner
            .subscriptions
            .borrow_mut()
            .drain()
            .map(|(element, _)| element)
            .collect();
        for element in &elements {
            self.inner.backend.unobserve(element);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, MemoryElement};
    use crate::store::{Readable, Store};
    use std::cell::Cell;

    #[derive(Clone, Default)]
    struct CountingBackend {
        observed: Rc<Cell<usize>>,
        unobserved: Rc<Cell<usize>>,
    }

    impl ObserverBackend for CountingBackend {
        fn observe(&self, _element: &ElementRef) {
            self.observed.set(self.observed.get() + 1);
        }
        fn unobserve(&self, _element: &ElementRef) {
            self.unobserved.set(self.unobserved.get() + 1);
        }
    }

    fn setup() -> (ResizeObserverManager, CountingBackend, ElementRef) {
        let backend = CountingBackend::default();
        let manager = ResizeObserverManager::new(backend.clone());
        let element = MemoryElement::new(0.0, 0.0);
        element.set_computed("padding-left", "5px");
        element.set_computed("padding-right", "5px");
        element.set_computed("border-top-width", "2px");
        (manager, backend, ElementRef::new(element))
    }

    fn entry(element: &ElementRef, width: f64, height: f64) -> ResizeEntry {
        ResizeEntry {
            element: element.clone(),
            content_width: width,
            content_height: height,
        }
    }

    #[test]
    fn test_observe_is_ref_counted() {
        let (manager, backend, el) = setup();
        let a = ResizeTarget::callback(|_| {});
        let b = ResizeTarget::callback(|_| {});

        manager.add(&el, a.clone()).unwrap();
        manager.add(&el, b.clone()).unwrap();
        assert_eq!(backend.observed.get(), 1);
        assert_eq!(manager.subscriber_count(&el), 2);

        manager.remove(&el, Some(&a));
        assert!(manager.is_observed(&el));
        assert_eq!(backend.unobserved.get(), 0);

        manager.remove(&el, Some(&b));
        assert!(!manager.is_observed(&el));
        assert_eq!(backend.unobserved.get(), 1);

        // Redundant remove is a no-op.
        manager.remove(&el, Some(&b));
        assert_eq!(backend.unobserved.get(), 1);
    }

    #[test]
    fn test_offset_adds_border_padding() {
        let (manager, _backend, el) = setup();
        let data = Rc::new(RefCell::new(ResizeData::default()));
        manager.add(&el, data.clone()).unwrap();

        manager.notify(&[entry(&el, 100.0, 40.0)]);
        assert_eq!(
            *data.borrow(),
            ResizeData {
                content_width: Some(100.0),
                content_height: Some(40.0),
                offset_width: Some(110.0),
                offset_height: Some(42.0),
            }
        );
    }

    #[test]
    fn test_shapes_receive_their_dimensions() {
        let (manager, _backend, el) = setup();
        let offset = Rc::new(Cell::new((None, None)));
        let content = Rc::new(Cell::new((None, None)));
        let positional = Rc::new(Cell::new((None, None, None, None)));

        let o = offset.clone();
        manager
            .add(&el, ResizeTarget::dimension(move |w, h| o.set((w, h))))
            .unwrap();
        let c = content.clone();
        manager
            .add(&el, ResizeTarget::content_bounds(move |w, h| c.set((w, h))))
            .unwrap();
        let p = positional.clone();
        manager
            .add(&el, ResizeTarget::function(move |a, b, c, d| p.set((a, b, c, d))))
            .unwrap();

        manager.notify(&[entry(&el, 50.0, 10.0)]);
        assert_eq!(offset.get(), (Some(60.0), Some(12.0)));
        assert_eq!(content.get(), (Some(50.0), Some(10.0)));
        assert_eq!(positional.get(), (Some(60.0), Some(12.0), Some(50.0), Some(10.0)));
    }

    #[test]
    fn test_store_target_and_final_clear() {
        let (manager, _backend, el) = setup();
        let store = Store::new(ResizeData::default());
        let target = ResizeTarget::from(store.clone());
        manager.add(&el, target.clone()).unwrap();

        manager.notify(&[entry(&el, 20.0, 20.0)]);
        assert_eq!(store.get().content_width, Some(20.0));

        manager.remove(&el, Some(&target));
        assert_eq!(store.get(), ResizeData::cleared());
    }

    #[test]
    fn test_capability_precedence() {
        let hits = Rc::new(Cell::new(""));
        let h1 = hits.clone();
        let h2 = hits.clone();
        let caps = ResizeCapabilities {
            set_content_bounds: Some(Rc::new(move |_: Option<f64>, _: Option<f64>| h2.set("content"))),
            resize_observed: Some(Rc::new(move |_: &ResizeData| h1.set("observed"))),
            ..Default::default()
        };
        let (manager, _backend, el) = setup();
        manager.add(&el, caps).unwrap();
        manager.notify(&[entry(&el, 1.0, 1.0)]);
        assert_eq!(hits.get(), "observed");
    }

    #[test]
    fn test_empty_capabilities_rejected() {
        let (manager, backend, el) = setup();
        let result = manager.add(&el, ResizeCapabilities::default());
        assert_eq!(result, Err(PositionError::InvalidTarget));
        assert_eq!(backend.observed.get(), 0);
        assert!(!manager.is_observed(&el));
    }

    #[test]
    fn test_update_cache_republishes() {
        let backend = CountingBackend::default();
        let manager = ResizeObserverManager::new(backend);
        let element = Rc::new(MemoryElement::new(0.0, 0.0));
        let el = ElementRef::from(element.clone());
        let data = Rc::new(RefCell::new(ResizeData::default()));
        manager.add(&el, data.clone()).unwrap();
        manager.notify(&[entry(&el, 10.0, 10.0)]);
        assert_eq!(data.borrow().offset_width, Some(10.0));

        element.set_style_property("border-left-width", Some("3px"));
        manager.update_cache(&el);
        assert_eq!(data.borrow().offset_width, Some(13.0));
    }

    #[test]
    fn test_late_subscriber_gets_known_measurement() {
        let (manager, _backend, el) = setup();
        manager.add(&el, ResizeTarget::callback(|_| {})).unwrap();
        manager.notify(&[entry(&el, 30.0, 30.0)]);

        let data = Rc::new(RefCell::new(ResizeData::default()));
        manager.add(&el, data.clone()).unwrap();
        assert_eq!(data.borrow().content_width, Some(30.0));
    }

    #[test]
    fn test_remove_all_does_not_notify() {
        let (manager, backend, el) = setup();
        let data = Rc::new(RefCell::new(ResizeData::default()));
        manager.add(&el, data.clone()).unwrap();
        manager.notify(&[entry(&el, 30.0, 30.0)]);

        manager.remove(&el, None);
        assert_eq!(data.borrow().content_width, Some(30.0));
        assert_eq!(backend.unobserved.get(), 1);
    }
}
