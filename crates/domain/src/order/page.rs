//! Cursor-based pagination over the order index.

use serde::{Deserialize, Serialize};

use super::Order;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Opaque position in a scan of the order index.
///
/// A cursor is only meaningful when fed back into the next `find_all` call.
/// It says nothing about order IDs or insertion order. Zero both starts a
/// scan and marks it complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(u64);

impl Cursor {
    /// The cursor that starts a new scan.
    pub const START: Cursor = Cursor(0);

    /// Wraps a raw cursor value returned by the store.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value to hand back to the store.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns true if this cursor marks the end of a scan.
    pub const fn is_end(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request for one page of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindAllPage {
    /// How many index entries to examine. The store treats this as a hint,
    /// so a page may hold fewer or (for small Redis sets) more orders.
    pub size: usize,

    /// Cursor returned by the previous page, or [`Cursor::START`].
    pub cursor: Cursor,
}

impl FindAllPage {
    /// Creates a request for the first page.
    pub fn first(size: usize) -> Self {
        Self {
            size,
            cursor: Cursor::START,
        }
    }

    /// Creates a request that resumes from `cursor`.
    pub fn after(cursor: Cursor, size: usize) -> Self {
        Self { size, cursor }
    }
}

impl Default for FindAllPage {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// One page of orders plus the cursor for the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindResult {
    pub orders: Vec<Order>,
    pub cursor: Cursor,
}

impl FindResult {
    /// Returns true if there are no further pages.
    pub fn is_last_page(&self) -> bool {
        self.cursor.is_end()
    }
}
