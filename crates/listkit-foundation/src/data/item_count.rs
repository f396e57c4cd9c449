//! Logical item count under column grouping.

use super::entry::{Entry, ListItem};

/// Number of logical rows `entries` occupy when laid out in `column` columns.
///
/// Entries are packed left to right into rows of at most `column` entries.
/// An unmarked record never joins the row in progress: it closes that row
/// and opens the next one. Placeholders and scalar values fill columns
/// freely. A `column` of 0 or 1 means one row per entry.
///
/// Runs in a single pass without allocating.
pub fn logical_item_count<T: ListItem>(entries: &[Entry<T>], column: usize) -> usize {
    let len = entries.len();
    if column <= 1 {
        return len;
    }

    let mut rows = 0;
    let mut start = 0;
    while start < len {
        rows += 1;
        let mut width = 1;
        while width < column && start + width < len && !entries[start + width].breaks_row() {
            width += 1;
        }
        start += width;
    }
    rows
}
