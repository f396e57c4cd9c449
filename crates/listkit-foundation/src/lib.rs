//! Data core for virtualized lists and grids: raw item ownership, column
//! grouping, unit-aware item sizes and debounced change notification.

pub mod data;
pub mod error;

pub use data::{
    ConfigUpdate, Entry, ItemSize, ItemStyle, ListItem, LoadStatusToken, ManagerOptions,
    ManagerState, PlaceholderId, PositionedItem, SizeSpec, SizeValue, VirtualListDataManager,
};
pub use error::{DataManagerError, Result, SizeError};

pub mod prelude {
    pub use crate::data::*;
    pub use crate::error::{DataManagerError, SizeError};
}

#[cfg(test)]
#[path = "tests/manager_tests.rs"]
mod manager_tests;

#[cfg(test)]
#[path = "tests/load_status_tests.rs"]
mod load_status_tests;
