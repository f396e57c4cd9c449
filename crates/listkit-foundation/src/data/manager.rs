use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use listkit_core::RuntimeHandle;

use super::change_scheduler::{ChangeScheduler, Updater};
use super::entry::{Entry, ListItem, PlaceholderId};
use super::item_count::logical_item_count;
use super::item_size::{ItemSize, SizeResolver, SizeValue};
use super::load_status::LoadStatusToken;
use super::options::{ChangeHandler, ConfigUpdate, ManagerOptions, StickyIndices};
use super::positioned_item::PositionedItem;
use crate::error::Result;

/// Observer fired synchronously with the state as it was before a change.
pub type StateObserver<T> = Rc<dyn Fn(&ManagerState<T>)>;

/// The record owned by a [`VirtualListDataManager`].
///
/// Obtained as a copy through [`VirtualListDataManager::get_state`] or
/// handed to the state observer; editing a copy has no effect on the
/// manager.
pub struct ManagerState<T> {
    pub data: Vec<Entry<T>>,
    pub item_size: ItemSize,
    pub overscan: usize,
    pub column: usize,
    /// Logical row count of `data` under `column`.
    pub item_count: usize,
    pub estimated_size: f32,
    pub sticky_indices: StickyIndices,
    pub on_change: ChangeHandler<T>,
}

impl<T: Clone> Clone for ManagerState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            item_size: self.item_size.clone(),
            overscan: self.overscan,
            column: self.column,
            item_count: self.item_count,
            estimated_size: self.estimated_size,
            sticky_indices: self.sticky_indices.clone(),
            on_change: Rc::clone(&self.on_change),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ManagerState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerState")
            .field("data", &self.data)
            .field("item_size", &self.item_size)
            .field("overscan", &self.overscan)
            .field("column", &self.column)
            .field("item_count", &self.item_count)
            .field("estimated_size", &self.estimated_size)
            .field("sticky_indices", &self.sticky_indices)
            .finish_non_exhaustive()
    }
}

/// [`ConfigUpdate`] with the size specification already resolved.
pub(crate) struct ResolvedUpdate<T> {
    pub(crate) item_size: Option<ItemSize>,
    pub(crate) estimated_size: Option<f32>,
    pub(crate) overscan: Option<usize>,
    pub(crate) column: Option<usize>,
    pub(crate) sticky_indices: Option<StickyIndices>,
    pub(crate) on_change: Option<ChangeHandler<T>>,
}

impl<T> ResolvedUpdate<T> {
    pub(crate) fn item_size(item_size: ItemSize) -> Self {
        Self {
            item_size: Some(item_size),
            estimated_size: None,
            overscan: None,
            column: None,
            sticky_indices: None,
            on_change: None,
        }
    }
}

pub(crate) struct ManagerInner<T> {
    state: ManagerState<T>,
    resolver: SizeResolver,
    scheduler: ChangeScheduler<T>,
    observer: Option<StateObserver<T>>,
    destroyed: bool,
}

pub(crate) type WeakManager<T> = Weak<RefCell<ManagerInner<T>>>;

impl<T: ListItem> ManagerInner<T> {
    fn refresh_item_count(&mut self) {
        self.state.item_count = logical_item_count(&self.state.data, self.state.column);
    }

    /// Copy of the current state, taken only when someone will look at it.
    fn observed_state(&self) -> Option<(StateObserver<T>, ManagerState<T>)> {
        self.observer
            .as_ref()
            .map(|observer| (Rc::clone(observer), self.state.clone()))
    }
}

/// Owner of a virtual list's raw data.
///
/// Every mutation recomputes the logical item count synchronously, reports
/// the previous state to the state observer, and schedules one deferred
/// recompute on the runtime. A burst of mutations issued before the runtime
/// drains collapses into a single call of the updater and at most one call
/// of the change callback.
///
/// The manager is confined to the thread that owns its runtime.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = Runtime::new(Arc::new(DefaultScheduler));
/// let manager = VirtualListDataManager::new(
///     ManagerOptions::new(|items: &[PositionedItem<u32>]| println!("{} rows", items.len())),
///     &runtime.handle(),
/// )?;
/// manager.set_updater(layout_rows);
/// manager.push([1, 2, 3]);
/// manager.push([4]);
/// runtime.drain_deferred(); // one layout pass, one notification
/// ```
pub struct VirtualListDataManager<T> {
    inner: Rc<RefCell<ManagerInner<T>>>,
}

impl<T: ListItem> VirtualListDataManager<T> {
    pub fn new(options: ManagerOptions<T>, runtime: &RuntimeHandle) -> Result<Self> {
        let resolver = SizeResolver::new(options.device_ratio);
        let item_size = resolver.resolve(&options.item_size)?;
        let state = ManagerState {
            data: Vec::new(),
            item_size,
            overscan: options.overscan,
            column: options.column,
            item_count: 0,
            estimated_size: options.estimated_size,
            sticky_indices: options.sticky_indices,
            on_change: options.on_change,
        };
        log::debug!(
            "data manager created (column {}, device ratio {})",
            state.column,
            resolver.ratio().get()
        );
        Ok(Self {
            inner: Rc::new(RefCell::new(ManagerInner {
                state,
                resolver,
                scheduler: ChangeScheduler::new(runtime.clone()),
                observer: None,
                destroyed: false,
            })),
        })
    }

    pub(crate) fn upgrade(weak: &WeakManager<T>) -> Option<Self> {
        weak.upgrade()
            .filter(|inner| !inner.borrow().destroyed)
            .map(|inner| Self { inner })
    }

    /// Applies a partial configuration.
    ///
    /// A malformed size specification is reported before anything changes.
    /// The state observer and a recompute are triggered only when a field
    /// other than `on_change` actually changed.
    pub fn update_config(&self, update: ConfigUpdate<T>) -> Result<()> {
        let item_size = match &update.item_size {
            Some(spec) => Some(self.inner.borrow().resolver.resolve(spec)?),
            None => None,
        };
        self.apply_config(ResolvedUpdate {
            item_size,
            estimated_size: update.estimated_size,
            overscan: update.overscan,
            column: update.column,
            sticky_indices: update.sticky_indices,
            on_change: update.on_change,
        });
        Ok(())
    }

    pub(crate) fn apply_config(&self, update: ResolvedUpdate<T>) {
        let observed = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.observed_state();
            let state = &mut inner.state;
            let mut changed = false;

            if let Some(item_size) = update.item_size {
                changed |= state.item_size != item_size;
                state.item_size = item_size;
            }
            if let Some(estimated_size) = update.estimated_size {
                changed |= state.estimated_size != estimated_size;
                state.estimated_size = estimated_size;
            }
            if let Some(overscan) = update.overscan {
                changed |= state.overscan != overscan;
                state.overscan = overscan;
            }
            if let Some(column) = update.column {
                changed |= state.column != column;
                state.column = column;
            }
            if let Some(sticky_indices) = update.sticky_indices {
                changed |= state.sticky_indices != sticky_indices;
                state.sticky_indices = sticky_indices;
            }
            if let Some(on_change) = update.on_change {
                state.on_change = on_change;
            }
            inner.refresh_item_count();

            if !changed {
                log::trace!("config update left the state unchanged");
                return;
            }
            log::debug!(
                "config updated (column {}, item count {})",
                inner.state.column,
                inner.state.item_count
            );
            before
        };
        self.notify(observed);
        self.schedule_update();
    }

    pub fn get_item_count(&self) -> usize {
        self.inner.borrow().state.item_count
    }

    pub fn clear(&self) {
        self.mutate(|data| data.clear());
    }

    /// Appends `items` and returns the new raw length.
    pub fn push(&self, items: impl IntoIterator<Item = T>) -> usize {
        self.push_entries(items.into_iter().map(Entry::Plain))
    }

    pub(crate) fn push_entries(&self, entries: impl IntoIterator<Item = Entry<T>>) -> usize {
        self.mutate(|data| {
            data.extend(entries);
            data.len()
        })
    }

    /// Replaces the whole sequence.
    pub fn set(&self, items: impl IntoIterator<Item = T>) {
        self.set_entries(items.into_iter().map(Entry::Plain).collect());
    }

    pub(crate) fn set_entries(&self, entries: Vec<Entry<T>>) {
        self.mutate(|data| *data = entries);
    }

    /// Removes `delete_count` entries at `start`, inserts `items` there and
    /// returns the removed entries.
    ///
    /// Out-of-range arguments are clamped to the sequence, so `start` past
    /// the end appends and an oversized `delete_count` removes the tail.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: impl IntoIterator<Item = T>,
    ) -> Vec<Entry<T>> {
        self.mutate(|data| {
            let start = start.min(data.len());
            let end = start.saturating_add(delete_count).min(data.len());
            data.splice(start..end, items.into_iter().map(Entry::Plain))
                .collect::<Vec<_>>()
        })
    }

    /// Copy of the current sequence.
    pub fn get(&self) -> Vec<Entry<T>> {
        self.inner.borrow().state.data.clone()
    }

    /// Removes the last entry.
    ///
    /// The item count is refreshed, but neither the state observer nor a
    /// recompute is triggered.
    pub fn pop(&self) -> Option<Entry<T>> {
        let mut inner = self.inner.borrow_mut();
        let popped = inner.state.data.pop();
        inner.refresh_item_count();
        popped
    }

    /// Runs the updater now and emits its output even if it equals the last
    /// emitted list. A recompute that is already queued stays queued.
    pub fn force_update(&self) {
        self.recompute(false);
    }

    /// Releases the data, the updater and the observer and cancels any
    /// queued recompute. Outstanding load-status tokens report
    /// [`DataManagerError::Destroyed`](crate::error::DataManagerError::Destroyed)
    /// afterwards.
    pub fn destroy(self) {
        let mut inner = self.inner.borrow_mut();
        inner.destroyed = true;
        inner.scheduler.shut_down();
        inner.observer = None;
        inner.state.data = Vec::new();
        inner.state.item_count = 0;
        log::debug!("data manager destroyed");
    }

    /// Appends a placeholder entry carrying `placeholder` and returns the
    /// token that later replaces it with real data.
    ///
    /// With `size_override`, the row the placeholder lands in is sized by
    /// that value until the token is consumed; every other row keeps the
    /// current size.
    pub fn request_load_status(
        &self,
        placeholder: T,
        size_override: Option<SizeValue>,
    ) -> Result<LoadStatusToken<T>> {
        let id = PlaceholderId::next();
        let restore = match size_override {
            Some(value) => {
                let (size, slot, previous) = {
                    let inner = self.inner.borrow();
                    (
                        inner.resolver.resolve_value(&value)?,
                        inner.state.item_count,
                        inner.state.item_size.clone(),
                    )
                };
                let fallback = previous.clone();
                let override_size = ItemSize::func(move |index| {
                    if index == slot {
                        Ok(size)
                    } else {
                        fallback.size_at(index)
                    }
                });
                self.apply_config(ResolvedUpdate::item_size(override_size));
                Some(previous)
            }
            None => None,
        };

        self.push_entries([Entry::Marked(placeholder, id.clone())]);
        log::debug!("load status {id} requested");
        Ok(LoadStatusToken::new(
            id,
            Rc::downgrade(&self.inner),
            restore,
        ))
    }

    /// Removes placeholder entries, keeping the one tagged `except` if given.
    pub fn clear_all_placeholders(&self, except: Option<&PlaceholderId>) {
        let retained = self
            .get()
            .into_iter()
            .filter(|entry| match entry.placeholder_id() {
                Some(id) => Some(id) == except,
                None => true,
            })
            .collect();
        self.set_entries(retained);
    }

    /// Removes only the placeholder tagged `id`.
    pub fn clear_placeholder(&self, id: &PlaceholderId) {
        let retained = self
            .get()
            .into_iter()
            .filter(|entry| entry.placeholder_id() != Some(id))
            .collect();
        self.set_entries(retained);
    }

    pub fn get_state(&self) -> ManagerState<T> {
        self.inner.borrow().state.clone()
    }

    /// Installs the layout step run by every recompute.
    pub fn set_updater(&self, updater: impl Fn(&[Entry<T>]) -> Vec<PositionedItem<T>> + 'static) {
        let updater: Updater<T> = Rc::new(updater);
        self.inner.borrow_mut().scheduler.set_updater(updater);
    }

    pub fn set_on_state_change(&self, observer: impl Fn(&ManagerState<T>) + 'static) {
        self.inner.borrow_mut().observer = Some(Rc::new(observer));
    }

    /// Queues a checked recompute, replacing any recompute already queued.
    pub fn schedule_update(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().scheduler.schedule(move || {
            if let Some(manager) = Self::upgrade(&weak) {
                manager.inner.borrow_mut().scheduler.finish_pending();
                manager.recompute(true);
            }
        });
    }

    fn mutate<R>(&self, edit: impl FnOnce(&mut Vec<Entry<T>>) -> R) -> R {
        let (result, observed) = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.observed_state();
            let result = edit(&mut inner.state.data);
            inner.refresh_item_count();
            (result, before)
        };
        self.notify(observed);
        self.schedule_update();
        result
    }

    fn notify(&self, observed: Option<(StateObserver<T>, ManagerState<T>)>) {
        if let Some((observer, previous)) = observed {
            observer(&previous);
        }
    }

    fn recompute(&self, check: bool) {
        let fresh = {
            let inner = self.inner.borrow();
            if inner.destroyed {
                return;
            }
            let Some(updater) = inner.scheduler.updater() else {
                log::trace!("no updater installed; recompute skipped");
                return;
            };
            let fresh = updater(&inner.state.data);
            fresh
        };

        let emission = {
            let mut inner = self.inner.borrow_mut();
            let accepted = inner.scheduler.accept(fresh, check);
            let emission = accepted.map(|items| (items, Rc::clone(&inner.state.on_change)));
            emission
        };
        if let Some((items, on_change)) = emission {
            log::debug!("emitting {} positioned items", items.len());
            on_change(&items);
        }
    }
}

impl<T> fmt::Debug for VirtualListDataManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("VirtualListDataManager")
                .field("len", &inner.state.data.len())
                .field("item_count", &inner.state.item_count)
                .field("column", &inner.state.column)
                .field("pending_recompute", &inner.scheduler.has_pending())
                .finish(),
            Err(_) => f.write_str("VirtualListDataManager { <borrowed> }"),
        }
    }
}
