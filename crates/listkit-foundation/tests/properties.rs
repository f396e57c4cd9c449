use std::sync::Arc;

use listkit_core::{DefaultScheduler, Runtime};
use listkit_foundation::data::{logical_item_count, Entry, ListItem, ManagerOptions};
use listkit_foundation::VirtualListDataManager;
use proptest::prelude::*;

#[derive(Clone, Debug, PartialEq)]
enum Cell {
    Value(u8),
    Record(u8),
}

impl ListItem for Cell {
    fn is_record(&self) -> bool {
        matches!(self, Cell::Record(_))
    }
}

fn cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        any::<u8>().prop_map(Cell::Value),
        any::<u8>().prop_map(Cell::Record),
    ]
}

fn entry() -> impl Strategy<Value = Entry<Cell>> {
    (cell(), any::<bool>()).prop_map(|(cell, marked)| {
        if marked {
            // Placeholder ids are only minted by the manager; rebuild the
            // shape through a throwaway one.
            placeholder(cell)
        } else {
            Entry::Plain(cell)
        }
    })
}

fn placeholder(cell: Cell) -> Entry<Cell> {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager: VirtualListDataManager<Cell> =
        VirtualListDataManager::new(ManagerOptions::new(|_| {}), &runtime.handle())
            .expect("valid options");
    let _token = manager
        .request_load_status(cell, None)
        .expect("load status");
    manager.pop().expect("placeholder entry")
}

fn manager() -> (Runtime, VirtualListDataManager<u32>) {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = VirtualListDataManager::new(ManagerOptions::new(|_| {}), &runtime.handle())
        .expect("valid options");
    (runtime, manager)
}

fn items(manager: &VirtualListDataManager<u32>) -> Vec<u32> {
    manager.get().into_iter().map(Entry::into_item).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn scalars_fill_rows_densely(len in 0usize..64, column in 1usize..8) {
        let entries: Vec<Entry<u32>> = (0..len as u32).map(Entry::Plain).collect();
        prop_assert_eq!(logical_item_count(&entries, column), len.div_ceil(column));
    }

    #[test]
    fn plain_records_each_take_a_row(len in 0usize..64, column in 0usize..8) {
        let entries: Vec<Entry<Cell>> = (0..len).map(|i| Entry::Plain(Cell::Record(i as u8))).collect();
        prop_assert_eq!(logical_item_count(&entries, column), len);
    }

    #[test]
    fn grouping_is_bounded(entries in proptest::collection::vec(entry(), 0..48), column in 1usize..6) {
        let count = logical_item_count(&entries, column);
        prop_assert!(count <= entries.len());
        prop_assert!(count >= entries.len().div_ceil(column));
        prop_assert_eq!(logical_item_count(&entries, 1), entries.len());
    }

    #[test]
    fn push_then_get_concatenates(
        first in proptest::collection::vec(any::<u32>(), 0..16),
        second in proptest::collection::vec(any::<u32>(), 0..16),
    ) {
        let (_runtime, manager) = manager();
        prop_assert_eq!(manager.push(first.clone()), first.len());
        prop_assert_eq!(items(&manager), first.clone());

        manager.push(second.clone());
        let mut expected = first;
        expected.extend(second);
        prop_assert_eq!(items(&manager), expected);
    }

    #[test]
    fn splice_matches_vec_splice(
        initial in proptest::collection::vec(any::<u32>(), 0..16),
        start in 0usize..20,
        delete_count in 0usize..20,
        inserted in proptest::collection::vec(any::<u32>(), 0..8),
    ) {
        let (_runtime, manager) = manager();
        manager.set(initial.clone());

        let removed: Vec<u32> = manager
            .splice(start, delete_count, inserted.clone())
            .into_iter()
            .map(Entry::into_item)
            .collect();

        let mut model = initial;
        let start = start.min(model.len());
        let end = (start + delete_count).min(model.len());
        let expected_removed: Vec<u32> = model.splice(start..end, inserted).collect();

        prop_assert_eq!(removed, expected_removed);
        prop_assert_eq!(items(&manager), model.clone());
        prop_assert_eq!(manager.get_item_count(), model.len());
    }
}
