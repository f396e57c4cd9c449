use crate::data::{
    Entry, ItemSize, ListItem, LoadStatusToken, ManagerOptions, PositionedItem, SizeSpec,
    SizeValue, VirtualListDataManager,
};
use crate::error::DataManagerError;
use listkit_core::{DefaultScheduler, Runtime};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
enum Row {
    Num(i32),
    Text(&'static str),
    Null,
    Record(&'static str),
}

impl ListItem for Row {
    fn is_record(&self) -> bool {
        matches!(self, Row::Record(_))
    }
}

fn mixed_list() -> Vec<Row> {
    vec![
        Row::Record("css"),
        Row::Num(1),
        Row::Num(2),
        Row::Null,
        Row::Text(""),
        Row::Null,
        Row::Text("css"),
    ]
}

fn echo(entries: &[Entry<Row>]) -> Vec<PositionedItem<Row>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| PositionedItem::new(index, Default::default(), entry.clone()))
        .collect()
}

fn new_manager(
    runtime: &Runtime,
    configure: impl FnOnce(ManagerOptions<Row>) -> ManagerOptions<Row>,
) -> VirtualListDataManager<Row> {
    VirtualListDataManager::new(configure(ManagerOptions::new(|_| {})), &runtime.handle())
        .expect("valid options")
}

fn placeholders(manager: &VirtualListDataManager<Row>) -> usize {
    manager.get().iter().filter(|entry| entry.is_marked()).count()
}

#[test]
fn placeholder_lands_at_the_tail() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options.column(2));
    manager.push(mixed_list());

    let token = manager
        .request_load_status(Row::Record("loadMore"), None)
        .expect("load status");
    let data = manager.get();
    assert_eq!(data.len(), mixed_list().len() + 1);

    let last = data.last().expect("placeholder");
    assert_eq!(last.item(), &Row::Record("loadMore"));
    assert_eq!(last.placeholder_id(), Some(token.id()));
    assert!(!token.is_consumed());
}

#[test]
fn first_consumption_wins() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options.column(2));
    manager.push(mixed_list());
    let token = manager
        .request_load_status(Row::Record("loadMore"), None)
        .expect("load status");

    assert_eq!(token.clear_and_add_data([Row::Record("java")]), Ok(true));
    let data = manager.get();
    assert_eq!(data.len(), mixed_list().len() + 1);
    assert_eq!(data.last(), Some(&Entry::Plain(Row::Record("java"))));
    assert!(token.is_consumed());

    assert_eq!(token.clear_and_set_data([Row::Record("java")]), Ok(false));
    assert_eq!(token.clear_and_add_data([Row::Num(9)]), Ok(false));
    assert_eq!(manager.get(), data);
}

#[test]
fn clear_and_add_data_purges_every_placeholder() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options);
    manager.push([Row::Num(1)]);
    let first = manager
        .request_load_status(Row::Text("first"), None)
        .expect("first");
    let second = manager
        .request_load_status(Row::Text("second"), None)
        .expect("second");
    assert_eq!(placeholders(&manager), 2);

    first
        .clear_and_add_data([Row::Num(2), Row::Num(3)])
        .expect("consume");
    assert_eq!(placeholders(&manager), 0);
    assert_eq!(
        manager.get(),
        vec![
            Entry::Plain(Row::Num(1)),
            Entry::Plain(Row::Num(2)),
            Entry::Plain(Row::Num(3)),
        ]
    );

    // The second token is still pending even though its row is gone.
    assert_eq!(second.clear_and_set_data([Row::Null]), Ok(true));
    assert_eq!(manager.get(), vec![Entry::Plain(Row::Null)]);
}

#[test]
fn clear_and_set_data_replaces_everything() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options);
    manager.push([Row::Num(1)]);
    let _other = manager
        .request_load_status(Row::Text("other"), None)
        .expect("other");
    let token = manager
        .request_load_status(Row::Text("mine"), None)
        .expect("mine");

    assert_eq!(token.clear_and_set_data([Row::Num(7)]), Ok(true));
    assert_eq!(manager.get(), vec![Entry::Plain(Row::Num(7))]);
}

#[test]
fn selective_placeholder_cleanup() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options);
    let a = manager.request_load_status(Row::Text("a"), None).expect("a");
    manager.push([Row::Num(1)]);
    let b = manager.request_load_status(Row::Text("b"), None).expect("b");
    let c = manager.request_load_status(Row::Text("c"), None).expect("c");

    manager.clear_placeholder(b.id());
    let ids: Vec<_> = manager
        .get()
        .iter()
        .filter_map(|entry| entry.placeholder_id().cloned())
        .collect();
    assert_eq!(ids, vec![a.id().clone(), c.id().clone()]);

    manager.clear_all_placeholders(Some(c.id()));
    assert_eq!(
        manager.get(),
        vec![
            Entry::Plain(Row::Num(1)),
            Entry::Marked(Row::Text("c"), c.id().clone()),
        ]
    );

    manager.clear_all_placeholders(None);
    assert_eq!(manager.get(), vec![Entry::Plain(Row::Num(1))]);
}

#[test]
fn placeholder_shares_a_row_with_records() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options.column(2));
    manager.push([Row::Record("a"), Row::Record("b")]);
    assert_eq!(manager.get_item_count(), 2);

    let _token = manager
        .request_load_status(Row::Record("loading"), None)
        .expect("load status");
    assert_eq!(manager.get_item_count(), 2);
}

#[test]
fn size_override_applies_to_the_placeholder_row_until_consumed() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options.item_size(SizeSpec::fixed(40_u32)));
    manager.push([Row::Num(1), Row::Num(2)]);

    let token = manager
        .request_load_status(Row::Text("loading"), Some("100rpx".into()))
        .expect("load status");
    let size = manager.get_state().item_size;
    assert_eq!(size.size_at(0), Ok(40.0));
    assert_eq!(size.size_at(1), Ok(40.0));
    assert_eq!(size.size_at(2), Ok(50.0));
    assert_eq!(size.size_at(3), Ok(40.0));

    token.clear_and_add_data([Row::Num(3)]).expect("consume");
    assert_eq!(manager.get_state().item_size, ItemSize::Fixed(40.0));
}

#[test]
fn malformed_size_override_leaves_the_list_untouched() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options);
    manager.push([Row::Num(1)]);

    let result = manager.request_load_status(Row::Null, Some(SizeValue::from("tall")));
    assert!(matches!(result, Err(DataManagerError::Size(_))));
    assert_eq!(manager.get(), vec![Entry::Plain(Row::Num(1))]);
    assert_eq!(manager.get_state().item_size, ItemSize::Fixed(60.0));
}

#[test]
fn tokens_outliving_their_manager_report_destruction() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options);
    let token = manager
        .request_load_status(Row::Null, None)
        .expect("load status");

    manager.destroy();
    assert_eq!(
        token.clear_and_add_data([Row::Num(1)]),
        Err(DataManagerError::Destroyed)
    );
    assert_eq!(
        token.clear_and_set_data([Row::Num(1)]),
        Err(DataManagerError::Destroyed)
    );
    assert!(!token.is_consumed());
}

#[test]
fn notification_counts_follow_each_step() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let manager = new_manager(&runtime, |options| options);
    let updater_calls = Rc::new(Cell::new(0));
    let state_changes = Rc::new(Cell::new(0));

    let calls = Rc::clone(&updater_calls);
    manager.set_updater(move |entries| {
        calls.set(calls.get() + 1);
        echo(entries)
    });
    let changes = Rc::clone(&state_changes);
    manager.set_on_state_change(move |_| changes.set(changes.get() + 1));

    manager.push(mixed_list());
    manager
        .update_config(crate::data::ConfigUpdate::new().with_column(2))
        .expect("column update");
    assert_eq!(state_changes.get(), 2);
    assert_eq!(updater_calls.get(), 0);
    runtime.drain_deferred();
    assert_eq!(updater_calls.get(), 1);

    let init = manager
        .request_load_status(Row::Record("init"), None)
        .expect("init");
    assert_eq!(state_changes.get(), 3);
    runtime.drain_deferred();
    assert_eq!(updater_calls.get(), 2);

    init.clear_and_set_data([]).expect("consume");
    runtime.drain_deferred();
    assert_eq!(state_changes.get(), 4);
    assert_eq!(updater_calls.get(), 3);

    init.clear_and_set_data([]).expect("no-op");
    assert_eq!(runtime.drain_deferred(), 0);
    assert_eq!(state_changes.get(), 4);
    assert_eq!(updater_calls.get(), 3);

    // The override goes through the config path, then the push follows.
    let more = manager
        .request_load_status(Row::Record("loadMore"), Some("100rpx".into()))
        .expect("load more");
    assert_eq!(state_changes.get(), 6);
    more.clear_and_add_data([Row::Num(1), Row::Num(2)])
        .expect("consume");
    runtime.drain_deferred();
    assert_eq!(updater_calls.get(), 4);
}

#[test]
fn token_can_be_consumed_from_the_change_callback() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let slot: Rc<RefCell<Option<LoadStatusToken<Row>>>> = Rc::new(RefCell::new(None));
    let lengths = Rc::new(RefCell::new(Vec::new()));

    let pending = Rc::clone(&slot);
    let sink = Rc::clone(&lengths);
    let manager = VirtualListDataManager::new(
        ManagerOptions::new(move |items: &[PositionedItem<Row>]| {
            sink.borrow_mut().push(items.len());
            if let Some(token) = pending.borrow_mut().take() {
                token
                    .clear_and_add_data([Row::Num(1), Row::Num(2), Row::Num(3)])
                    .expect("manager alive");
            }
        }),
        &runtime.handle(),
    )
    .expect("valid options");
    manager.set_updater(echo);

    let token = manager
        .request_load_status(Row::Record("loading"), None)
        .expect("load status");
    *slot.borrow_mut() = Some(token);

    runtime.run_until_idle();
    assert_eq!(*lengths.borrow(), vec![1, 3]);
    assert_eq!(placeholders(&manager), 0);
}
