//! Runtime - Shared per-host services.
//!
//! One [`Runtime`] per host surface. It owns the resize observer manager,
//! the animation manager, the element update queue and the viewport size,
//! and is driven by the host's frame callback through [`Runtime::tick`]:
//!
//! ```text
//! tick(ts) -> animation step (Position::set per tween)
//!          -> element update flush (style writes, store publication)
//! ```

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use crate::animation::{AnimationGroupAPI, AnimationManager};
use crate::position::UpdateElementManager;
use crate::resize::{ObserverBackend, ResizeObserverManager};
use crate::store::{ReadableStore, Store, Writable};

/// Size of the host surface used when a bounds container has no size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

struct RuntimeInner {
    resize: ResizeObserverManager,
    animation: AnimationManager,
    updates: UpdateElementManager,
    viewport: Store<Viewport>,
    now: Cell<f64>,
}

/// Handle to the shared services. Clones share state.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(backend: impl ObserverBackend + 'static) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                resize: ResizeObserverManager::new(backend),
                animation: AnimationManager::new(),
                updates: UpdateElementManager::new(),
                viewport: Store::default(),
                now: Cell::new(0.0),
            }),
        }
    }

    /// Runtime without a platform resize observer. Measurements arrive only
    /// through [`ResizeObserverManager::notify`].
    pub fn headless() -> Self {
        Self::new(())
    }

    pub fn resize(&self) -> &ResizeObserverManager {
        &self.inner.resize
    }

    pub fn animation(&self) -> &AnimationManager {
        &self.inner.animation
    }

    pub fn updates(&self) -> &UpdateElementManager {
        &self.inner.updates
    }

    /// Group animation API over any set of Positions.
    pub fn animate(&self) -> AnimationGroupAPI {
        AnimationGroupAPI::new(self.clone())
    }

    pub fn viewport(&self) -> Viewport {
        self.inner.viewport.with(|viewport| *viewport)
    }

    pub fn viewport_store(&self) -> ReadableStore<Viewport> {
        self.inner.viewport.readable()
    }

    pub fn set_viewport(&self, width: f64, height: f64) {
        self.inner.viewport.set(Viewport::new(width, height));
    }

    /// Timestamp of the current or most recent frame, in milliseconds.
    pub fn now(&self) -> f64 {
        self.inner.now.get()
    }

    /// Advance one frame: step animations, then flush element writes.
    pub fn tick(&self, timestamp: f64) {
        trace!(timestamp, "runtime tick");
        self.inner.now.set(timestamp);
        self.inner.animation.step(timestamp);
        self.inner.updates.flush(timestamp);
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::headless()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("viewport", &self.viewport())
            .field("now", &self.now())
            .field("animations", &self.inner.animation.len())
            .field("pending_updates", &self.inner.updates.pending())
            .finish()
    }
}
