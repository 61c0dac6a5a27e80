//! Sort engine.
//!
//! Sorting produces an index permutation over the loaded rows rather than
//! moving the rows themselves; the host keeps ownership of the row sequence.
//! The permutation is always produced by a stable sort, so rows that compare
//! equal keep their insertion order in both directions.

use std::cmp::Ordering;

use crate::error::TableError;
use crate::models::Photo;
use crate::table::columns::{ColumnKey, ColumnModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// How repeated clicks on a header move through sort directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCycle {
    /// Ascending and descending only; a sorted column never returns to unsorted.
    #[default]
    AscDesc,
    /// unsorted -> ascending -> descending -> unsorted.
    AscDescNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub column: ColumnKey,
    pub direction: SortDirection,
}

/// Active sort of the table. Toggling replaces rather than stacks, so there is
/// at most one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    specs: Vec<SortSpec>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by a single column. The column must be sortable in `columns`.
    pub fn by(
        columns: &ColumnModel,
        column: ColumnKey,
        direction: SortDirection,
    ) -> Result<Self, TableError> {
        columns.sortable(column)?;
        Ok(Self {
            specs: vec![SortSpec { column, direction }],
        })
    }

    pub fn specs(&self) -> &[SortSpec] {
        &self.specs
    }

    pub fn active(&self) -> Option<SortSpec> {
        self.specs.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Direction of `column` if it is the active sort column.
    pub fn direction_of(&self, column: ColumnKey) -> Option<SortDirection> {
        self.specs
            .iter()
            .find(|s| s.column == column)
            .map(|s| s.direction)
    }

    pub fn clear(&mut self) {
        self.specs.clear();
    }

    /// Applies a header click on `column` and returns its new direction.
    pub fn toggle(
        &mut self,
        columns: &ColumnModel,
        column: ColumnKey,
        cycle: SortCycle,
    ) -> Result<Option<SortDirection>, TableError> {
        columns.sortable(column)?;

        let next = match (self.direction_of(column), cycle) {
            (None, _) => Some(SortDirection::Asc),
            (Some(SortDirection::Asc), _) => Some(SortDirection::Desc),
            (Some(SortDirection::Desc), SortCycle::AscDesc) => Some(SortDirection::Asc),
            (Some(SortDirection::Desc), SortCycle::AscDescNone) => None,
        };

        self.specs.clear();
        if let Some(direction) = next {
            self.specs.push(SortSpec { column, direction });
        }
        Ok(next)
    }
}

fn compare_rows(specs: &[SortSpec], a: &Photo, b: &Photo) -> Ordering {
    for spec in specs {
        let ord = match spec.direction {
            SortDirection::Asc => spec.column.compare(a, b),
            SortDirection::Desc => spec.column.compare(b, a),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Computes the display order of `rows` under `sort`.
///
/// Returns indices into `rows`. An empty sort state yields the identity
/// permutation. Runs in O(n log n).
pub fn apply_sort(rows: &[Photo], sort: &SortState) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    if sort.is_empty() {
        return order;
    }
    // `sort_by` is stable; equal rows stay in insertion order.
    order.sort_by(|&a, &b| compare_rows(&sort.specs, &rows[a], &rows[b]));
    order
}
