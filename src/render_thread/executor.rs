//! Serial task queue backing the render thread.
//!
//! Exactly one worker consumes the queue; every lifecycle and scheduler
//! mutation happens inside a task execution. Other threads only enqueue work
//! or block on a [`Completion`] handshake. Supports immediate posts (back or
//! front), delayed posts deduplicated by key so retry storms coalesce, and
//! two clearing modes (engine-internal entries only, or everything during
//! final teardown).

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Origin of a queued task. Internal entries may be discarded when a surface
/// generation ends; external entries survive everything short of full
/// teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskTag {
    External,
    Internal,
}

/// Dedupe key for delayed posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskKey {
    PrepareRetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClearMode {
    InternalOnly,
    All,
}

pub(crate) struct Task<S: 'static> {
    run: Box<dyn FnOnce(&mut S) + Send>,
    tag: TaskTag,
    key: Option<TaskKey>,
}

impl<S> Task<S> {
    pub fn execute(self, state: &mut S) {
        (self.run)(state);
    }
}

struct QueueInner<S: 'static> {
    ready: VecDeque<Task<S>>,
    delayed: Vec<(Instant, Task<S>)>,
    stopped: bool,
}

/// FIFO consumed by exactly one worker thread over state `S`.
pub(crate) struct TaskQueue<S: 'static> {
    inner: Mutex<QueueInner<S>>,
    cond: Condvar,
}

impl<S> TaskQueue<S> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                ready: VecDeque::new(),
                delayed: Vec::new(),
                stopped: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Enqueue at the back. Returns false (dropping `f`) once stopped.
    pub fn post<F>(&self, tag: TaskTag, f: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        let mut q = self.lock();
        if q.stopped {
            return false;
        }
        q.ready.push_back(Task {
            run: Box::new(f),
            tag,
            key: None,
        });
        self.cond.notify_all();
        true
    }

    /// Enqueue at the front, ahead of ordinary work.
    pub fn post_front<F>(&self, tag: TaskTag, f: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        let mut q = self.lock();
        if q.stopped {
            return false;
        }
        q.ready.push_front(Task {
            run: Box::new(f),
            tag,
            key: None,
        });
        self.cond.notify_all();
        true
    }

    /// Enqueue after `delay`, unless a task with the same key is already
    /// pending (duplicate retries coalesce).
    pub fn post_delayed<F>(&self, key: TaskKey, delay: Duration, tag: TaskTag, f: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        let mut q = self.lock();
        if q.stopped {
            return false;
        }
        let duplicate = q.delayed.iter().any(|(_, t)| t.key == Some(key))
            || q.ready.iter().any(|t| t.key == Some(key));
        if duplicate {
            return false;
        }
        q.delayed.push((
            Instant::now() + delay,
            Task {
                run: Box::new(f),
                tag,
                key: Some(key),
            },
        ));
        self.cond.notify_all();
        true
    }

    /// Discard pending tasks. Dropped closures release any completion guards
    /// they carry, so blocked callers are never stranded.
    pub fn clear(&self, mode: ClearMode) {
        let mut q = self.lock();
        match mode {
            ClearMode::All => {
                q.ready.clear();
                q.delayed.clear();
            }
            ClearMode::InternalOnly => {
                q.ready.retain(|t| t.tag == TaskTag::External);
                q.delayed.retain(|(_, t)| t.tag == TaskTag::External);
            }
        }
    }

    /// Refuse all future posts and wake the worker so it can exit.
    pub fn stop(&self) {
        let mut q = self.lock();
        q.stopped = true;
        q.ready.clear();
        q.delayed.clear();
        self.cond.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Worker-side: block until the next task is due, or `None` once stopped.
    pub fn take_next(&self) -> Option<Task<S>> {
        let mut q = self.lock();
        loop {
            let now = Instant::now();
            // Promote due delayed tasks in deadline order.
            let mut i = 0;
            while i < q.delayed.len() {
                if q.delayed[i].0 <= now {
                    let (_, task) = q.delayed.remove(i);
                    q.ready.push_back(task);
                } else {
                    i += 1;
                }
            }

            if let Some(task) = q.ready.pop_front() {
                return Some(task);
            }
            if q.stopped {
                return None;
            }

            let timeout = q
                .delayed
                .iter()
                .map(|(at, _)| at.saturating_duration_since(now))
                .min()
                .unwrap_or(Duration::from_millis(250));
            let (guard, _) = self
                .cond
                .wait_timeout(q, timeout)
                .unwrap_or_else(|e| e.into_inner());
            q = guard;
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner<S>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One-shot wait/signal handshake for blocking lifecycle calls.
pub(crate) struct Completion {
    state: Mutex<bool>,
    cond: Condvar,
}

impl Completion {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(false),
            cond: Condvar::new(),
        })
    }

    fn signal(&self) {
        let mut done = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *done = true;
        self.cond.notify_all();
    }

    pub fn wait(&self) {
        let mut done = self.state.lock().unwrap_or_else(|e| e.into_inner());
        while !*done {
            done = self.cond.wait(done).unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// Signals its [`Completion`] when dropped, whether the carrying task ran or
/// was discarded by a clear.
pub(crate) struct CompletionGuard(Arc<Completion>);

impl CompletionGuard {
    pub fn new(completion: Arc<Completion>) -> Self {
        Self(completion)
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.signal();
    }
}
