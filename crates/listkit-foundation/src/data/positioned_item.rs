//! Output of the external layout step.

use super::entry::Entry;

/// Placement of one item as computed by the layout updater.
///
/// The data core never reads these fields; it only compares whole
/// descriptor lists to decide whether anything changed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemStyle {
    /// Offset from the start of the list content along the main axis.
    pub offset: f32,
    /// Size along the main axis.
    pub size: f32,
    /// Offset along the cross axis, for multi-column layouts.
    pub cross_offset: f32,
    /// Size along the cross axis.
    pub cross_size: f32,
    pub sticky: bool,
}

/// A raw item together with its placement.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedItem<T> {
    pub index: usize,
    pub style: ItemStyle,
    pub item: Entry<T>,
}

impl<T> PositionedItem<T> {
    pub fn new(index: usize, style: ItemStyle, item: Entry<T>) -> Self {
        Self { index, style, item }
    }
}
