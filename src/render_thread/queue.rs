//! Render-event and snapshot queues.
//!
//! Both queues are insertion-ordered, appendable from any thread, and drained
//! or cleared only by the render thread. An append that completes before a
//! drain begins is always visible to that drain.

use std::sync::Mutex;

/// Opaque unit of work executed on the render thread.
pub type Runnable = Box<dyn FnOnce() + Send>;

/// Snapshot capture task; runs before buffer presentation so pixel data is
/// still defined.
pub type SnapshotTask = Box<dyn FnOnce() + Send>;

/// Who scheduled a render event.
///
/// `Priority` marks engine-internal render requests; only those are discarded
/// when a replacement surface arrives. `Ordinary` caller events survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Ordinary,
    Priority,
}

/// A unit of work handed to the renderer, consumed exactly once.
///
/// Events with `need_render` run as part of the next frame, after the draw
/// call and before presentation. Events without it run out-of-band on the
/// render thread, independent of frame timing.
pub struct RenderEvent {
    pub runnable: Runnable,
    pub need_render: bool,
    pub kind: EventKind,
}

impl RenderEvent {
    pub fn new(kind: EventKind, need_render: bool, runnable: impl FnOnce() + Send + 'static) -> Self {
        Self {
            runnable: Box::new(runnable),
            need_render,
            kind,
        }
    }

    /// Ordinary event executed as part of the next frame.
    pub fn render(runnable: impl FnOnce() + Send + 'static) -> Self {
        Self::new(EventKind::Ordinary, true, runnable)
    }

    /// Ordinary out-of-band task, independent of frame timing.
    pub fn task(runnable: impl FnOnce() + Send + 'static) -> Self {
        Self::new(EventKind::Ordinary, false, runnable)
    }
}

pub(crate) struct EventQueue {
    inner: Mutex<Vec<RenderEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, event: RenderEvent) {
        self.lock().push(event);
    }

    /// Take everything queued so far, in insertion order. Render thread only.
    pub fn drain(&self) -> Vec<RenderEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Drop engine-internal entries, keeping caller-enqueued ordinary events.
    pub fn clear_internal(&self) {
        self.lock().retain(|e| e.kind == EventKind::Ordinary);
    }

    pub fn clear_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RenderEvent>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub(crate) struct SnapshotQueue {
    inner: Mutex<Vec<SnapshotTask>>,
}

impl SnapshotQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, task: SnapshotTask) {
        self.lock().push(task);
    }

    pub fn drain(&self) -> Vec<SnapshotTask> {
        std::mem::take(&mut *self.lock())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SnapshotTask>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
