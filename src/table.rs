//! Sortable, paginated view over an immutable firm-record list.
//!
//! Mirrors the console's results table: sorting never mutates the input
//! order (a sorted index is kept instead), records missing the sort field
//! land last regardless of direction, and the page number is clamped back
//! into range whenever the record count changes.

use crate::export::{flatten_record, FlatValue, FLATTENED_FIELDS};
use crate::models::FirmRecord;
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_SORT_KEY: &str = "firm_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct TableView {
    records: Vec<FirmRecord>,
    flattened: Vec<Vec<FlatValue>>,
    order: Vec<usize>,
    sort_key: String,
    direction: SortDirection,
    page: usize,
    page_size: usize,
}

impl TableView {
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            flattened: Vec::new(),
            order: Vec::new(),
            sort_key: DEFAULT_SORT_KEY.to_string(),
            direction: SortDirection::Ascending,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replaces the underlying records, re-sorts, and clamps the page number
    /// back into the valid range.
    pub fn set_records(&mut self, records: Vec<FirmRecord>) {
        self.flattened = records.iter().map(flatten_record).collect();
        self.records = records;
        self.resort();
        self.page = self.page.min(self.total_pages()).max(1);
    }

    /// Selects a sort field. Selecting the current field toggles the
    /// direction; selecting a new one resets to ascending.
    pub fn toggle_sort(&mut self, key: &str) {
        if key == self.sort_key {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.sort_key = key.to_string();
            self.direction = SortDirection::Ascending;
        }
        self.resort();
    }

    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.records.len().div_ceil(self.page_size).max(1)
    }

    /// Moves to a page, clamped to the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// The records visible on the current page, in sorted order.
    pub fn current_page(&self) -> Vec<&FirmRecord> {
        let start = (self.page - 1) * self.page_size;
        self.order
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&i| &self.records[i])
            .collect()
    }

    /// All records in sorted order.
    pub fn sorted(&self) -> Vec<&FirmRecord> {
        self.order.iter().map(|&i| &self.records[i]).collect()
    }

    fn resort(&mut self) {
        let col = FLATTENED_FIELDS
            .iter()
            .position(|f| *f == self.sort_key);
        self.order = (0..self.records.len()).collect();
        let Some(col) = col else {
            // Unknown sort field: keep input order.
            return;
        };

        let flattened = &self.flattened;
        let direction = self.direction;
        self.order.sort_by(|&a, &b| {
            let av = &flattened[a][col];
            let bv = &flattened[b][col];
            // Missing values sort last regardless of direction.
            match (av, bv) {
                (FlatValue::Empty, FlatValue::Empty) => Ordering::Equal,
                (FlatValue::Empty, _) => Ordering::Greater,
                (_, FlatValue::Empty) => Ordering::Less,
                (FlatValue::Number(x), FlatValue::Number(y)) => apply(x.total_cmp(y), direction),
                _ => apply(av.as_cell().cmp(&bv.as_cell()), direction),
            }
        });
    }
}

impl Default for TableView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

fn apply(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}
