//! Data management for virtualized lists and grids.
//!
//! A [`VirtualListDataManager`] owns the raw entries of a list and turns
//! bursts of edits into single, deduplicated layout notifications. Pixel
//! layout itself stays outside: the caller installs an updater that maps
//! the raw entries to [`PositionedItem`]s.
//!
//! # Architecture
//!
//! - [`SizeResolver`] - unit-aware resolution of item size specifications
//! - [`logical_item_count`] - row count under multi-column grouping
//! - `ChangeScheduler` - single-slot deferred recompute with equality gating
//! - [`LoadStatusToken`] - single-use handle for a placeholder row
//! - [`VirtualListDataManager`] - the orchestrating state store
//!
//! # Example
//!
//! ```rust,ignore
//! use listkit_core::{DefaultScheduler, Runtime};
//! use listkit_foundation::data::{ManagerOptions, SizeSpec, VirtualListDataManager};
//!
//! let runtime = Runtime::new(Arc::new(DefaultScheduler));
//! let manager = VirtualListDataManager::new(
//!     ManagerOptions::new(render_rows).item_size(SizeSpec::fixed("96rpx")).column(2),
//!     &runtime.handle(),
//! )?;
//! manager.set_updater(layout_rows);
//!
//! let loading = manager.request_load_status(Row::spinner(), Some("120rpx".into()))?;
//! // ... later, when the page arrives:
//! loading.clear_and_add_data(page)?;
//! runtime.drain_deferred();
//! ```

mod change_scheduler;
mod entry;
mod item_count;
mod item_size;
mod load_status;
mod manager;
mod options;
mod positioned_item;

pub use change_scheduler::Updater;
pub use entry::*;
pub use item_count::*;
pub use item_size::*;
pub use load_status::*;
pub use manager::{ManagerState, StateObserver, VirtualListDataManager};
pub use options::*;
pub use positioned_item::*;
