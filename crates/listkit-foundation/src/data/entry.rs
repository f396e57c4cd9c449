//! Stored list elements.
//!
//! Every element owned by the manager is an [`Entry`]: either a plain data
//! value or a value tagged as a placeholder. Grouping and placeholder
//! cleanup dispatch on the tag instead of inspecting the value.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PLACEHOLDER_ID: AtomicU64 = AtomicU64::new(0);

/// Values that can be stored in a virtual list.
///
/// The only question the data core asks about a value is whether it is a
/// structured record. Records always start a new row when the list is laid
/// out in several columns; scalars pack densely.
pub trait ListItem: Clone + PartialEq + 'static {
    fn is_record(&self) -> bool;
}

macro_rules! scalar_list_items {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ListItem for $ty {
                #[inline]
                fn is_record(&self) -> bool {
                    false
                }
            }
        )*
    };
}

scalar_list_items!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T: ListItem> ListItem for Option<T> {
    fn is_record(&self) -> bool {
        self.as_ref().is_some_and(ListItem::is_record)
    }
}

/// Process-unique identity of a load-status placeholder.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(u64);

impl PlaceholderId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PLACEHOLDER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__{}__placeholder", self.0)
    }
}

/// An element of the managed sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry<T> {
    /// Ordinary caller data.
    Plain(T),
    /// A placeholder row carrying caller-supplied fields.
    Marked(T, PlaceholderId),
}

impl<T> Entry<T> {
    pub fn item(&self) -> &T {
        match self {
            Entry::Plain(item) | Entry::Marked(item, _) => item,
        }
    }

    pub fn into_item(self) -> T {
        match self {
            Entry::Plain(item) | Entry::Marked(item, _) => item,
        }
    }

    pub fn is_marked(&self) -> bool {
        matches!(self, Entry::Marked(..))
    }

    pub fn placeholder_id(&self) -> Option<&PlaceholderId> {
        match self {
            Entry::Plain(_) => None,
            Entry::Marked(_, id) => Some(id),
        }
    }
}

impl<T: ListItem> Entry<T> {
    /// Whether this entry refuses to join the row that precedes it.
    ///
    /// Only unmarked records do; placeholders and scalars fill columns.
    #[inline]
    pub fn breaks_row(&self) -> bool {
        match self {
            Entry::Plain(item) => item.is_record(),
            Entry::Marked(..) => false,
        }
    }
}

impl<T> From<T> for Entry<T> {
    fn from(item: T) -> Self {
        Entry::Plain(item)
    }
}
