//! Single-use handles for placeholder rows.

use std::cell::Cell;
use std::fmt;

use super::entry::{ListItem, PlaceholderId};
use super::item_size::ItemSize;
use super::manager::{ResolvedUpdate, VirtualListDataManager, WeakManager};
use crate::error::{DataManagerError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenState {
    Pending,
    Consumed,
}

/// Handle returned by
/// [`VirtualListDataManager::request_load_status`].
///
/// The token replaces its placeholder with real data exactly once: the
/// first call to [`clear_and_add_data`](Self::clear_and_add_data) or
/// [`clear_and_set_data`](Self::clear_and_set_data) takes effect and
/// returns `Ok(true)`, every later call returns `Ok(false)` and leaves the
/// list alone. The token does not keep its manager alive; once the manager
/// is destroyed both calls fail with [`DataManagerError::Destroyed`].
pub struct LoadStatusToken<T> {
    id: PlaceholderId,
    manager: WeakManager<T>,
    /// Size specification to reinstate, when the request overrode it.
    restore: Option<ItemSize>,
    state: Cell<TokenState>,
}

impl<T: ListItem> LoadStatusToken<T> {
    pub(crate) fn new(id: PlaceholderId, manager: WeakManager<T>, restore: Option<ItemSize>) -> Self {
        Self {
            id,
            manager,
            restore,
            state: Cell::new(TokenState::Pending),
        }
    }

    pub fn id(&self) -> &PlaceholderId {
        &self.id
    }

    pub fn is_consumed(&self) -> bool {
        self.state.get() == TokenState::Consumed
    }

    /// Removes every outstanding placeholder, then appends `values`.
    pub fn clear_and_add_data(&self, values: impl IntoIterator<Item = T>) -> Result<bool> {
        let Some(manager) = self.consume()? else {
            return Ok(false);
        };
        manager.clear_all_placeholders(None);
        manager.push(values);
        Ok(true)
    }

    /// Replaces the whole list with `values`.
    ///
    /// Other placeholders go away with the rest of the old list.
    pub fn clear_and_set_data(&self, values: impl IntoIterator<Item = T>) -> Result<bool> {
        let Some(manager) = self.consume()? else {
            return Ok(false);
        };
        manager.set(values);
        Ok(true)
    }

    /// Moves the token to `Consumed` and reinstates the size specification.
    ///
    /// Yields `None` when the token was already consumed.
    fn consume(&self) -> Result<Option<VirtualListDataManager<T>>> {
        let manager =
            VirtualListDataManager::upgrade(&self.manager).ok_or(DataManagerError::Destroyed)?;
        if self.state.replace(TokenState::Consumed) == TokenState::Consumed {
            log::trace!("load status {} already consumed", self.id);
            return Ok(None);
        }
        if let Some(previous) = &self.restore {
            manager.apply_config(ResolvedUpdate::item_size(previous.clone()));
        }
        log::debug!("load status {} consumed", self.id);
        Ok(Some(manager))
    }
}

impl<T> fmt::Debug for LoadStatusToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadStatusToken")
            .field("id", &self.id)
            .field("state", &self.state.get())
            .field("overrides_size", &self.restore.is_some())
            .finish()
    }
}
