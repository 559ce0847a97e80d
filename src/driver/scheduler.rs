//! Frame scheduling.
//!
//! A [`FrameScheduler`] asks the host for one callback on the next display
//! refresh and hands back a [`FrameHandle`] that can cancel it. The browser
//! host maps this onto `requestAnimationFrame`/`cancelAnimationFrame`; tests
//! and headless runs use the in-memory [`QueueScheduler`].

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::LabResult;

/// Identifier of one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub i64);

/// Host facility that delivers frame callbacks.
pub trait FrameScheduler {
    /// Request one callback on the next frame.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Scheduler` if the host refuses the request.
    fn request_frame(&mut self) -> LabResult<FrameHandle>;

    /// Cancel a previously requested callback. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct QueueInner {
    next_id: i64,
    due: VecDeque<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

/// In-memory scheduler: requested frames queue up until popped.
///
/// Clones share one queue, so a test can keep a handle on the scheduler
/// after moving it into a driver.
#[derive(Debug, Clone, Default)]
pub struct QueueScheduler {
    inner: Rc<RefCell<QueueInner>>,
}

impl QueueScheduler {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest outstanding frame, as if the host fired it.
    pub fn pop_due(&self) -> Option<FrameHandle> {
        self.inner.borrow_mut().due.pop_front()
    }

    /// Frames requested and neither fired nor cancelled.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.inner.borrow().due.len()
    }

    /// Total frames ever requested.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.inner.borrow().requested
    }

    /// Total frames cancelled while still outstanding.
    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.inner.borrow().cancelled
    }
}

impl FrameScheduler for QueueScheduler {
    fn request_frame(&mut self) -> LabResult<FrameHandle> {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let handle = FrameHandle(inner.next_id);
        inner.due.push_back(handle);
        inner.requested += 1;
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut inner = self.inner.borrow_mut();
        let before = inner.due.len();
        inner.due.retain(|h| *h != handle);
        if inner.due.len() < before {
            inner.cancelled += 1;
        }
    }
}

/// Shared home of the host's frame callback.
///
/// The callback captures the driver, and the driver's scheduler holds a
/// clone of this slot to re-request frames, so the two keep each other
/// alive until [`release`](Self::release) drops the callback.
pub struct CallbackSlot<T> {
    inner: Rc<RefCell<Option<T>>>,
}

impl<T> CallbackSlot<T> {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(None)),
        }
    }

    /// Store the callback, returning the one it replaces.
    pub fn install(&self, callback: T) -> Option<T> {
        self.inner.borrow_mut().replace(callback)
    }

    /// Take the callback out of the slot.
    pub fn release(&self) -> Option<T> {
        self.inner.borrow_mut().take()
    }

    /// Whether a callback is installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.inner.borrow().is_some()
    }

    /// Run `f` on the installed callback, if any.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.inner.borrow().as_ref().map(f)
    }
}

impl<T> Clone for CallbackSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for CallbackSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for CallbackSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}
