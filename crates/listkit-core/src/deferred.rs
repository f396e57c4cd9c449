use crate::runtime::{DeferredId, RuntimeHandle};

/// Handle to a task queued with [`RuntimeHandle::defer`].
///
/// Dropping the registration cancels the task if it has not run yet, which
/// makes an `Option<DeferredRegistration>` field a single-slot pending-task
/// holder: assigning a new registration cancels the previous one.
pub struct DeferredRegistration {
    runtime: RuntimeHandle,
    id: Option<DeferredId>,
}

impl DeferredRegistration {
    pub(crate) fn new(runtime: RuntimeHandle, id: DeferredId) -> Self {
        Self {
            runtime,
            id: Some(id),
        }
    }

    pub(crate) fn inactive(runtime: RuntimeHandle) -> Self {
        Self { runtime, id: None }
    }

    /// Identifier of the queued task, `None` when the runtime was already gone.
    pub fn id(&self) -> Option<DeferredId> {
        self.id
    }

    /// Whether this registration refers to a queued (or already fired) task.
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_deferred(id);
        }
    }

    /// Forgets the task without cancelling it.
    ///
    /// Used by a task that is currently running and releases its own slot.
    pub fn release(mut self) {
        self.id = None;
    }
}

impl Drop for DeferredRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_deferred(id);
        }
    }
}

impl std::fmt::Debug for DeferredRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredRegistration")
            .field("id", &self.id)
            .finish()
    }
}
