//! Manager configuration.

use std::fmt;
use std::rc::Rc;

use listkit_core::DisplayMetrics;
use smallvec::SmallVec;

use super::item_size::{DeviceRatio, SizeSpec, DEFAULT_ITEM_SIZE};
use super::positioned_item::PositionedItem;

pub const DEFAULT_OVERSCAN: usize = 5;
pub const DEFAULT_COLUMN: usize = 1;

/// Indices of rows that stay pinned while scrolling.
///
/// Lists rarely pin more than a handful of headers, so four fit inline.
pub type StickyIndices = SmallVec<[usize; 4]>;

/// Receives the positioned item list after each effective recompute.
pub type ChangeHandler<T> = Rc<dyn Fn(&[PositionedItem<T>])>;

/// Options applied when a manager is created.
///
/// # Example
///
/// ```rust,ignore
/// let options = ManagerOptions::new(|items: &[PositionedItem<Row>]| render(items))
///     .item_size(SizeSpec::fixed("88rpx"))
///     .column(2)
///     .overscan(3);
/// ```
#[derive(Clone)]
pub struct ManagerOptions<T> {
    pub item_size: SizeSpec,
    /// Size hint for items that have not been measured yet.
    pub estimated_size: f32,
    /// Render-ahead margin, forwarded to the layout updater.
    pub overscan: usize,
    /// Number of columns entries are grouped into.
    pub column: usize,
    pub sticky_indices: StickyIndices,
    pub on_change: ChangeHandler<T>,
    /// Scale applied to `rpx` sizes.
    pub device_ratio: DeviceRatio,
}

impl<T> ManagerOptions<T> {
    pub fn new(on_change: impl Fn(&[PositionedItem<T>]) + 'static) -> Self {
        Self {
            item_size: SizeSpec::default(),
            estimated_size: DEFAULT_ITEM_SIZE,
            overscan: DEFAULT_OVERSCAN,
            column: DEFAULT_COLUMN,
            sticky_indices: StickyIndices::new(),
            on_change: Rc::new(on_change),
            device_ratio: DeviceRatio::default(),
        }
    }

    pub fn item_size(mut self, item_size: SizeSpec) -> Self {
        self.item_size = item_size;
        self
    }

    pub fn estimated_size(mut self, estimated_size: f32) -> Self {
        self.estimated_size = estimated_size;
        self
    }

    pub fn overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    pub fn sticky_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.sticky_indices = indices.into_iter().collect();
        self
    }

    pub fn device_ratio(mut self, ratio: DeviceRatio) -> Self {
        self.device_ratio = ratio;
        self
    }

    /// Seeds the device ratio from a platform width query.
    ///
    /// Platforms that cannot report a width leave the ratio untouched.
    pub fn display_metrics(mut self, metrics: &dyn DisplayMetrics) -> Self {
        if let Some(width) = metrics.window_width() {
            self.device_ratio = DeviceRatio::from_width(width);
        }
        self
    }
}

impl<T> fmt::Debug for ManagerOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerOptions")
            .field("item_size", &self.item_size)
            .field("estimated_size", &self.estimated_size)
            .field("overscan", &self.overscan)
            .field("column", &self.column)
            .field("sticky_indices", &self.sticky_indices)
            .field("device_ratio", &self.device_ratio)
            .finish_non_exhaustive()
    }
}

/// Partial configuration change for
/// [`VirtualListDataManager::update_config`](super::VirtualListDataManager::update_config).
///
/// Fields left as `None` keep their current value.
#[derive(Clone)]
pub struct ConfigUpdate<T> {
    pub item_size: Option<SizeSpec>,
    pub estimated_size: Option<f32>,
    pub overscan: Option<usize>,
    pub column: Option<usize>,
    pub sticky_indices: Option<StickyIndices>,
    pub on_change: Option<ChangeHandler<T>>,
}

impl<T> Default for ConfigUpdate<T> {
    fn default() -> Self {
        Self {
            item_size: None,
            estimated_size: None,
            overscan: None,
            column: None,
            sticky_indices: None,
            on_change: None,
        }
    }
}

impl<T> ConfigUpdate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item_size(mut self, item_size: SizeSpec) -> Self {
        self.item_size = Some(item_size);
        self
    }

    pub fn with_estimated_size(mut self, estimated_size: f32) -> Self {
        self.estimated_size = Some(estimated_size);
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = Some(overscan);
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_sticky_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.sticky_indices = Some(indices.into_iter().collect());
        self
    }

    pub fn with_on_change(mut self, on_change: impl Fn(&[PositionedItem<T>]) + 'static) -> Self {
        self.on_change = Some(Rc::new(on_change));
        self
    }
}

impl<T> fmt::Debug for ConfigUpdate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigUpdate")
            .field("item_size", &self.item_size)
            .field("estimated_size", &self.estimated_size)
            .field("overscan", &self.overscan)
            .field("column", &self.column)
            .field("sticky_indices", &self.sticky_indices)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}
