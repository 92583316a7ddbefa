//! Pure pagination over an in-memory record list.
//!
//! Overviews load every record once and page through them locally, so turning a page never
//! touches the network.

use std::num::NonZeroUsize;

/// One page of a record list.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    /// Records visible on this page.
    pub items: &'a [T],
    /// Zero-based page index, clamped to the last page.
    pub page_index: usize,
    /// Number of pages; at least one, even for an empty list.
    pub page_count: usize,
    /// Total records across all pages.
    pub total: usize,
}

impl<T> Page<'_, T> {
    /// One-based position of the first visible record, or 0 for an empty list.
    pub fn first_item_number(&self, page_size: NonZeroUsize) -> usize {
        if self.total == 0 {
            0
        } else {
            self.page_index * page_size.get() + 1
        }
    }

    /// One-based position of the last visible record, or 0 for an empty list.
    pub fn last_item_number(&self, page_size: NonZeroUsize) -> usize {
        if self.total == 0 {
            0
        } else {
            self.first_item_number(page_size) + self.items.len() - 1
        }
    }

    /// Range indicator, e.g. `1–5 of 8 items`.
    pub fn summary(&self, page_size: NonZeroUsize) -> String {
        format!(
            "{}–{} of {} items",
            self.first_item_number(page_size),
            self.last_item_number(page_size),
            self.total
        )
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.page_count
    }
}

/// Number of pages needed for `total` records; never zero.
pub fn page_count(total: usize, page_size: NonZeroUsize) -> usize {
    total.div_ceil(page_size.get()).max(1)
}

/// Slice out page `page_index` (zero-based) of `records`.
///
/// An index past the end yields the last page.
pub fn paginate<T>(records: &[T], page_size: NonZeroUsize, page_index: usize) -> Page<'_, T> {
    let total = records.len();
    let page_count = page_count(total, page_size);
    let page_index = page_index.min(page_count - 1);

    let start = (page_index * page_size.get()).min(total);
    let end = (start + page_size.get()).min(total);

    Page {
        items: &records[start..end],
        page_index,
        page_count,
        total,
    }
}
