//! Serial task queue for asynchronous steps.
//!
//! A [`TaskQueue`] runs its tasks strictly one after another. Each task is
//! handed a [`Done`] continuation and the queue does not start the next task
//! until that continuation is called, so steps that suspend on a platform
//! callback never interleave with later steps queued on the same owner.
//!
//! There is no timeout, cancellation or priority. A task that never calls
//! [`Done::call`] stalls its queue for good; that is a contract violation by
//! the task, not a condition the queue recovers from.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::logging::targets;

/// A unique identifier for a queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

/// A boxed task closure.
type BoxedTask = Box<dyn FnOnce(Done) + Send + 'static>;

/// Internal task data.
struct TaskData {
    id: TaskId,
    task: BoxedTask,
}

/// Queue bookkeeping shared between the queue handle and outstanding continuations.
#[derive(Default)]
struct QueueState {
    /// Tasks waiting for their turn.
    pending: VecDeque<TaskData>,
    /// The task that has started but not yet signalled completion.
    running: Option<TaskId>,
    /// Whether a drain loop is already active further up the stack.
    draining: bool,
}

/// A FIFO of asynchronous steps owned by a single object.
///
/// Cloning a `TaskQueue` yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    inner: Arc<Mutex<QueueState>>,
}

impl TaskQueue {
    /// Create a new, idle task queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task to the queue.
    ///
    /// If the queue is idle the task starts immediately, on the caller's
    /// stack. Otherwise it starts once every earlier task has called its
    /// [`Done`]. Queueing from inside a running task is always safe and never
    /// re-enters that task.
    pub fn run<F>(&self, task: F) -> TaskId
    where
        F: FnOnce(Done) + Send + 'static,
    {
        let id = next_task_id();
        {
            let mut state = self.inner.lock();
            state.pending.push_back(TaskData {
                id,
                task: Box::new(task),
            });
            tracing::trace!(
                target: targets::TASK,
                task = id.as_u64(),
                pending = state.pending.len(),
                "task queued"
            );
        }
        drain(&self.inner);
        id
    }

    /// Whether a task is currently outstanding.
    pub fn is_busy(&self) -> bool {
        self.inner.lock().running.is_some()
    }

    /// The task currently outstanding, if any.
    pub fn running(&self) -> Option<TaskId> {
        self.inner.lock().running
    }

    /// Get the number of tasks waiting behind the running one.
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("TaskQueue")
            .field("running", &state.running)
            .field("pending", &state.pending.len())
            .finish()
    }
}

/// Start queued tasks until one of them suspends.
///
/// Tasks that complete synchronously return here instead of recursing into
/// the next task, so long chains of synchronous steps use constant stack.
fn drain(inner: &Arc<Mutex<QueueState>>) {
    {
        let mut state = inner.lock();
        if state.draining {
            return;
        }
        state.draining = true;
    }

    loop {
        let next = {
            let mut state = inner.lock();
            if state.running.is_some() {
                state.draining = false;
                return;
            }
            match state.pending.pop_front() {
                Some(data) => {
                    state.running = Some(data.id);
                    data
                }
                None => {
                    state.draining = false;
                    return;
                }
            }
        };

        tracing::trace!(target: targets::TASK, task = next.id.as_u64(), "task started");
        (next.task)(Done {
            queue: Arc::clone(inner),
            id: next.id,
            signalled: false,
        });
    }
}

/// Single-use completion continuation handed to every queued task.
///
/// Calling [`Done::call`] consumes the continuation, so a task cannot signal
/// twice. Dropping it without calling leaves the queue stalled.
#[must_use = "the queue stalls until `Done::call` is invoked"]
pub struct Done {
    queue: Arc<Mutex<QueueState>>,
    id: TaskId,
    signalled: bool,
}

impl Done {
    /// The task this continuation belongs to.
    pub fn task_id(&self) -> TaskId {
        self.id
    }

    /// Signal that the task has finished and let the next one start.
    pub fn call(mut self) {
        self.signalled = true;
        {
            let mut state = self.queue.lock();
            if state.running == Some(self.id) {
                state.running = None;
            }
        }
        tracing::trace!(target: targets::TASK, task = self.id.as_u64(), "task completed");
        drain(&self.queue);
    }
}

impl Drop for Done {
    fn drop(&mut self) {
        if !self.signalled {
            tracing::warn!(
                target: targets::TASK,
                task = self.id.as_u64(),
                "task dropped its completion without signalling; queue is stalled"
            );
        }
    }
}

impl std::fmt::Debug for Done {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Done").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synchronous_tasks_run_in_order() {
        let queue = TaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let log = log.clone();
            queue.run(move |done| {
                log.lock().push(i);
                done.call();
            });
        }

        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
        assert!(!queue.is_busy());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_suspended_task_blocks_followers() {
        let queue = TaskQueue::new();
        let parked: Arc<Mutex<Option<Done>>> = Arc::new(Mutex::new(None));
        let log = Arc::new(Mutex::new(Vec::new()));

        {
            let parked = parked.clone();
            let log = log.clone();
            queue.run(move |done| {
                log.lock().push("first:start");
                *parked.lock() = Some(done);
            });
        }
        {
            let log = log.clone();
            queue.run(move |done| {
                log.lock().push("second");
                done.call();
            });
        }

        assert_eq!(*log.lock(), vec!["first:start"]);
        assert!(queue.is_busy());
        assert_eq!(queue.pending_count(), 1);

        let done = parked.lock().take().unwrap();
        log.lock().push("first:end");
        done.call();

        assert_eq!(*log.lock(), vec!["first:start", "first:end", "second"]);
        assert!(!queue.is_busy());
    }

    #[test]
    fn test_queueing_from_running_task_does_not_reenter() {
        let queue = TaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_queue = queue.clone();
        let inner_log = log.clone();
        queue.run(move |done| {
            let nested_log = inner_log.clone();
            inner_queue.run(move |done| {
                nested_log.lock().push("nested");
                done.call();
            });
            // The nested task must not have started yet.
            inner_log.lock().push("outer");
            done.call();
        });

        assert_eq!(*log.lock(), vec!["outer", "nested"]);
    }

    #[test]
    fn test_dropped_done_stalls_queue() {
        let queue = TaskQueue::new();
        let ran = Arc::new(Mutex::new(false));

        queue.run(|done| drop(done));
        let flag = ran.clone();
        queue.run(move |done| {
            *flag.lock() = true;
            done.call();
        });

        assert!(!*ran.lock());
        assert!(queue.is_busy());
        assert_eq!(queue.pending_count(), 1);
    }

    #[test]
    fn test_long_synchronous_chain() {
        let queue = TaskQueue::new();
        let count = Arc::new(Mutex::new(0usize));

        for _ in 0..10_000 {
            let count = count.clone();
            queue.run(move |done| {
                *count.lock() += 1;
                done.call();
            });
        }

        assert_eq!(*count.lock(), 10_000);
    }

    #[test]
    fn test_task_ids_increase() {
        let queue = TaskQueue::new();
        let a = queue.run(|done| done.call());
        let b = queue.run(|done| done.call());
        assert!(b > a);
        assert!(b.as_u64() > a.as_u64());
    }
}
