use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::thread::ThreadId;

use crate::deferred::DeferredRegistration;
use crate::platform::RuntimeScheduler;

/// Identifier of a task queued on the runtime's deferred queue.
pub type DeferredId = u64;

type DeferredTask = Box<dyn FnOnce() + 'static>;

/// Upper bound on turns executed by [`Runtime::run_until_idle`].
///
/// A task that keeps re-queueing itself would otherwise spin forever.
const MAX_IDLE_TURNS: usize = 1024;

struct DeferredEntry {
    id: DeferredId,
    task: DeferredTask,
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_turn: Cell<bool>,
    deferred: RefCell<VecDeque<DeferredEntry>>,
    next_deferred_id: Cell<DeferredId>,
    ui_thread_id: ThreadId,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_turn: Cell::new(false),
            deferred: RefCell::new(VecDeque::new()),
            next_deferred_id: Cell::new(1),
            ui_thread_id: std::thread::current().id(),
        }
    }

    fn schedule(&self) {
        self.needs_turn.set(true);
        self.scheduler.schedule_turn();
    }

    fn enqueue_deferred(&self, task: DeferredTask) -> DeferredId {
        let id = self.next_deferred_id.get();
        self.next_deferred_id.set(id + 1);
        self.deferred
            .borrow_mut()
            .push_back(DeferredEntry { id, task });
        log::trace!("deferred task {id} queued");
        self.schedule();
        id
    }

    fn cancel_deferred(&self, id: DeferredId) {
        let removed = {
            let mut queue = self.deferred.borrow_mut();
            let removed = queue
                .iter()
                .position(|entry| entry.id == id)
                .and_then(|index| queue.remove(index));
            if queue.is_empty() {
                self.needs_turn.set(false);
            }
            removed
        };
        // The task is dropped with the queue released; its captures may
        // hold registrations of their own.
        if removed.is_some() {
            log::trace!("deferred task {id} cancelled");
        }
        drop(removed);
    }

    fn has_pending(&self) -> bool {
        self.deferred
            .try_borrow()
            .map(|queue| !queue.is_empty())
            .unwrap_or(true)
    }

    /// Runs every task that was queued before this turn started.
    ///
    /// Tasks are popped one at a time so that a task cancelling a later one
    /// in the same turn is honoured.
    fn drain_deferred(&self) -> usize {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread_id,
            "deferred queue drained off the runtime thread",
        );
        let boundary = self.next_deferred_id.get();
        let mut executed = 0;
        loop {
            let entry = {
                let mut queue = self.deferred.borrow_mut();
                match queue.front() {
                    Some(entry) if entry.id < boundary => queue.pop_front(),
                    _ => None,
                }
            };

            match entry {
                Some(entry) => {
                    log::trace!("deferred task {} running", entry.id);
                    (entry.task)();
                    executed += 1;
                }
                None => break,
            }
        }
        self.needs_turn.set(self.has_pending());
        executed
    }
}

/// Owner of the cooperative deferred-task queue.
///
/// A runtime is confined to the thread that created it. Hosts call
/// [`Runtime::drain_deferred`] whenever the [`RuntimeScheduler`] asks for a
/// turn; tests usually call it directly after a burst of mutations.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn needs_turn(&self) -> bool {
        self.inner.needs_turn.get()
    }

    pub fn has_pending(&self) -> bool {
        self.inner.has_pending()
    }

    /// Runs one turn of deferred work. Returns the number of tasks executed.
    pub fn drain_deferred(&self) -> usize {
        self.inner.drain_deferred()
    }

    /// Drains turn after turn until the queue stays empty.
    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        for _ in 0..MAX_IDLE_TURNS {
            if !self.inner.has_pending() {
                return executed;
            }
            executed += self.inner.drain_deferred();
        }
        log::warn!(
            "runtime still has deferred work after {MAX_IDLE_TURNS} turns; a task keeps rescheduling itself"
        );
        executed
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_turn(&self) {}
}

/// Weak, cloneable reference to a [`Runtime`].
///
/// Components keep a handle rather than the runtime itself so that dropping
/// the runtime tears the queue down even while handles are still around.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

impl RuntimeHandle {
    /// Queues `task` to run on the next turn.
    ///
    /// The returned registration cancels the task when dropped, so callers
    /// must hold on to it for as long as the task should stay scheduled.
    /// If the runtime is gone the task is dropped without running.
    pub fn defer(&self, task: impl FnOnce() + 'static) -> DeferredRegistration {
        match self.inner.upgrade() {
            Some(inner) => {
                let id = inner.enqueue_deferred(Box::new(task));
                DeferredRegistration::new(self.clone(), id)
            }
            None => {
                log::debug!("runtime dropped; deferred task discarded");
                DeferredRegistration::inactive(self.clone())
            }
        }
    }

    pub fn cancel_deferred(&self, id: DeferredId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_deferred(id);
        }
    }

    pub fn drain_deferred(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| inner.drain_deferred())
            .unwrap_or(0)
    }

    pub fn has_pending(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending())
            .unwrap_or(false)
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
