//! Coalescing of mutation bursts into a single downstream notification.

use std::rc::Rc;

use listkit_core::{DeferredRegistration, RuntimeHandle};

use super::entry::Entry;
use super::positioned_item::PositionedItem;

/// External layout step: turns the raw entries into positioned items.
pub type Updater<T> = Rc<dyn Fn(&[Entry<T>]) -> Vec<PositionedItem<T>>>;

/// Single-slot debouncer for the deferred recompute.
///
/// At most one recompute is queued at a time. Scheduling while the slot is
/// occupied drops the old registration, which cancels its task, so only the
/// most recently scheduled recompute ever runs.
pub(crate) struct ChangeScheduler<T> {
    runtime: RuntimeHandle,
    pending: Option<DeferredRegistration>,
    updater: Option<Updater<T>>,
    /// Last list handed to the change callback.
    last_emitted: Option<Rc<Vec<PositionedItem<T>>>>,
}

impl<T> ChangeScheduler<T> {
    pub(crate) fn new(runtime: RuntimeHandle) -> Self {
        Self {
            runtime,
            pending: None,
            updater: None,
            last_emitted: None,
        }
    }

    pub(crate) fn schedule(&mut self, task: impl FnOnce() + 'static) {
        let registration = self.runtime.defer(task);
        if !registration.is_active() {
            log::trace!("runtime is gone; recompute not scheduled");
        }
        if let Some(previous) = self.pending.replace(registration) {
            log::trace!("replacing pending recompute {:?}", previous.id());
        }
    }

    /// Empties the slot from inside the task that occupied it.
    pub(crate) fn finish_pending(&mut self) {
        if let Some(registration) = self.pending.take() {
            registration.release();
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn set_updater(&mut self, updater: Updater<T>) {
        self.updater = Some(updater);
    }

    pub(crate) fn updater(&self) -> Option<Updater<T>> {
        self.updater.clone()
    }

    /// Cancels pending work and forgets the updater and the snapshot.
    pub(crate) fn shut_down(&mut self) {
        if let Some(registration) = self.pending.take() {
            registration.cancel();
        }
        self.updater = None;
        self.last_emitted = None;
    }
}

impl<T: PartialEq> ChangeScheduler<T> {
    /// Decides whether a freshly computed list must be emitted.
    ///
    /// With `check` set, a list equal to the last emitted one is dropped.
    /// Otherwise the list is always emitted. An emitted list becomes the
    /// new snapshot and is returned for delivery.
    pub(crate) fn accept(
        &mut self,
        fresh: Vec<PositionedItem<T>>,
        check: bool,
    ) -> Option<Rc<Vec<PositionedItem<T>>>> {
        if check
            && self
                .last_emitted
                .as_deref()
                .is_some_and(|last| *last == fresh)
        {
            log::debug!("recompute produced an identical list; not emitting");
            return None;
        }
        let snapshot = Rc::new(fresh);
        self.last_emitted = Some(Rc::clone(&snapshot));
        Some(snapshot)
    }
}
