//! Animation handles returned to callers.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, join_all, LocalBoxFuture, Shared};
use futures::FutureExt;

use super::manager::AnimationManager;

/// Lifecycle of one scheduled animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Active,
    Finished,
    Cancelled,
}

/// Settlement channel shared by an entry and its controls.
pub(crate) struct ControlState {
    status: Cell<AnimationStatus>,
    sender: RefCell<Option<oneshot::Sender<AnimationStatus>>>,
    finished: Shared<oneshot::Receiver<AnimationStatus>>,
}

impl ControlState {
    pub(crate) fn new() -> Rc<Self> {
        let (sender, receiver) = oneshot::channel();
        Rc::new(Self {
            status: Cell::new(AnimationStatus::Active),
            sender: RefCell::new(Some(sender)),
            finished: receiver.shared(),
        })
    }

    pub(crate) fn status(&self) -> AnimationStatus {
        self.status.get()
    }

    /// First settlement wins.
    pub(crate) fn settle(&self, status: AnimationStatus) {
        if self.status.get() != AnimationStatus::Active || status == AnimationStatus::Active {
            return;
        }
        self.status.set(status);
        if let Some(sender) = self.sender.borrow_mut().take() {
            let _ = sender.send(status);
        }
    }
}

/// Handle to one scheduled animation.
///
/// Dropping the control does not cancel the animation.
#[derive(Clone)]
pub struct AnimationControl {
    entry: Option<(u64, Rc<ControlState>, AnimationManager)>,
    status: AnimationStatus,
}

impl AnimationControl {
    pub(crate) fn new(id: u64, state: Rc<ControlState>, manager: AnimationManager) -> Self {
        Self {
            entry: Some((id, state, manager)),
            status: AnimationStatus::Active,
        }
    }

    /// Control for an animation that never ran or applied instantly.
    pub fn void() -> Self {
        Self {
            entry: None,
            status: AnimationStatus::Finished,
        }
    }

    pub fn status(&self) -> AnimationStatus {
        match &self.entry {
            Some((_, state, _)) => state.status(),
            None => self.status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == AnimationStatus::Active
    }

    /// True once finished or cancelled.
    pub fn is_finished(&self) -> bool {
        self.status() != AnimationStatus::Active
    }

    pub fn is_cancelled(&self) -> bool {
        self.status() == AnimationStatus::Cancelled
    }

    /// Remove the animation immediately. No further frame touches it.
    pub fn cancel(&self) {
        if let Some((id, _, manager)) = &self.entry {
            manager.cancel_id(*id);
        }
    }

    /// Resolves with the final status.
    pub fn finished(&self) -> AnimationFinished {
        AnimationFinished {
            inner: match &self.entry {
                Some((_, state, _)) => FinishedInner::Pending(state.finished.clone()),
                None => FinishedInner::Ready(self.status),
            },
        }
    }
}

impl std::fmt::Debug for AnimationControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationControl")
            .field("id", &self.entry.as_ref().map(|(id, _, _)| *id))
            .field("status", &self.status())
            .finish()
    }
}

enum FinishedInner {
    Pending(Shared<oneshot::Receiver<AnimationStatus>>),
    Ready(AnimationStatus),
}

/// Future returned by [`AnimationControl::finished`].
pub struct AnimationFinished {
    inner: FinishedInner,
}

impl Future for AnimationFinished {
    type Output = AnimationStatus;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.inner {
            FinishedInner::Ready(status) => Poll::Ready(*status),
            // A dropped sender means the entry vanished without settling.
            FinishedInner::Pending(receiver) => receiver
                .poll_unpin(cx)
                .map(|result| result.unwrap_or(AnimationStatus::Cancelled)),
        }
    }
}

/// Handles to animations started together by the group API.
#[derive(Debug, Clone, Default)]
pub struct AnimationGroupControl {
    controls: Vec<AnimationControl>,
}

impl AnimationGroupControl {
    pub(crate) fn new(controls: Vec<AnimationControl>) -> Self {
        Self { controls }
    }

    pub fn controls(&self) -> &[AnimationControl] {
        &self.controls
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn cancel(&self) {
        for control in &self.controls {
            control.cancel();
        }
    }

    /// True while any member is active.
    pub fn is_active(&self) -> bool {
        self.controls.iter().any(AnimationControl::is_active)
    }

    /// True once every member has settled.
    pub fn is_finished(&self) -> bool {
        self.controls.iter().all(AnimationControl::is_finished)
    }

    /// Resolves when every member has settled.
    pub fn finished(&self) -> LocalBoxFuture<'static, Vec<AnimationStatus>> {
        if self.controls.is_empty() {
            return future::ready(Vec::new()).boxed_local();
        }
        join_all(self.controls.iter().map(AnimationControl::finished)).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_void_control_is_settled() {
        let control = AnimationControl::void();
        assert!(control.is_finished());
        assert!(!control.is_active());
        assert_eq!(block_on(control.finished()), AnimationStatus::Finished);
    }

    #[test]
    fn test_first_settlement_wins() {
        let state = ControlState::new();
        let control = AnimationControl::new(1, state.clone(), AnimationManager::new());
        let finished = control.finished();
        state.settle(AnimationStatus::Cancelled);
        state.settle(AnimationStatus::Finished);
        assert!(control.is_cancelled());
        assert_eq!(block_on(finished), AnimationStatus::Cancelled);
        // Late subscribers see the same result.
        assert_eq!(block_on(control.finished()), AnimationStatus::Cancelled);
    }

    #[test]
    fn test_group_finished_joins_members() {
        let a = ControlState::new();
        let b = ControlState::new();
        let manager = AnimationManager::new();
        let group = AnimationGroupControl::new(vec![
            AnimationControl::new(1, a.clone(), manager.clone()),
            AnimationControl::new(2, b.clone(), manager),
        ]);
        a.settle(AnimationStatus::Finished);
        assert!(group.is_active());
        b.settle(AnimationStatus::Cancelled);
        assert!(group.is_finished());
        assert_eq!(
            block_on(group.finished()),
            vec![AnimationStatus::Finished, AnimationStatus::Cancelled]
        );
    }
}
