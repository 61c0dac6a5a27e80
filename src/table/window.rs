//! Windowing engine (row virtualizer).
//!
//! Given the number of rows, an estimated row height, the scroll position and
//! the viewport height, computes the contiguous range of rows that intersect
//! the viewport plus an overscan margin on both sides, and the absolute
//! vertical offset of each of those rows. Rows outside the range only
//! contribute to the total content height, so the amount of materialized rows
//! depends on the viewport, never on the row count.
//!
//! Rows use the estimate until measured. Measured heights are tracked as
//! deltas against the estimate in a Fenwick tree so that offsets stay
//! O(log n) to compute.

use std::ops::Range;

use tracing::trace;

/// Smallest height a row can have; keeps offsets strictly increasing.
pub const MIN_ROW_HEIGHT: f64 = 1.0;

/// Scroll position and height of the visible area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_top: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_top: f64, height: f64) -> Self {
        Self { scroll_top, height }
    }
}

/// A materialized row and where it is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualRow {
    /// Index into the display (sorted) sequence.
    pub index: usize,
    /// Absolute top offset within the content.
    pub start: f64,
    pub size: f64,
}

impl VirtualRow {
    pub fn end(&self) -> f64 {
        self.start + self.size
    }
}

/// Result of a window computation. Derived data, never stored by the table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowState {
    /// Rows intersecting the viewport, inclusive. `None` when nothing is visible.
    pub visible: Option<(usize, usize)>,
    /// Rows to materialize (visible plus overscan), half-open.
    pub rendered: Range<usize>,
    /// One entry per index in `rendered`, in order.
    pub rows: Vec<VirtualRow>,
    pub total_height: f64,
    /// Scroll position after clamping to the content.
    pub scroll_top: f64,
}

impl WindowState {
    pub fn first_visible(&self) -> Option<usize> {
        self.visible.map(|(first, _)| first)
    }

    pub fn last_visible(&self) -> Option<usize> {
        self.visible.map(|(_, last)| last)
    }

    /// Last materialized row; the frontier observed by pagination.
    pub fn last_rendered(&self) -> Option<usize> {
        self.rendered.end.checked_sub(1).filter(|_| !self.rendered.is_empty())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Measured row heights stored as deltas against the estimate.
#[derive(Debug, Clone, Default)]
struct MeasuredHeights {
    sizes: Vec<Option<f64>>,
    /// Fenwick tree over `measured - estimate`, 1-indexed.
    tree: Vec<f64>,
}

impl MeasuredHeights {
    fn len(&self) -> usize {
        self.sizes.len()
    }

    fn get(&self, index: usize) -> Option<f64> {
        self.sizes.get(index).copied().flatten()
    }

    fn is_empty(&self) -> bool {
        self.sizes.iter().all(Option::is_none)
    }

    fn add(&mut self, index: usize, delta: f64) {
        let mut i = index + 1;
        while i < self.tree.len() {
            self.tree[i] += delta;
            i += i & i.wrapping_neg();
        }
    }

    /// Sum of deltas for rows `[0, index)`.
    fn prefix(&self, index: usize) -> f64 {
        let mut i = index.min(self.len());
        let mut sum = 0.0;
        while i > 0 {
            sum += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }

    fn rebuild(&mut self, len: usize, estimate: f64) {
        self.sizes.resize(len, None);
        self.tree = vec![0.0; len + 1];
        for index in 0..len {
            if let Some(size) = self.sizes[index] {
                self.add(index, size - estimate);
            }
        }
    }

    /// Callers guarantee `index < row_count`; storage never grows past it.
    fn set(&mut self, index: usize, size: f64, estimate: f64, row_count: usize) -> bool {
        if index >= self.len() {
            let len = self
                .len()
                .saturating_mul(2)
                .max(index.saturating_add(1))
                .min(row_count);
            self.rebuild(len, estimate);
        }
        let previous = self.sizes[index].unwrap_or(estimate);
        if previous == size && self.sizes[index].is_some() {
            return false;
        }
        self.sizes[index] = Some(size);
        self.add(index, size - previous);
        true
    }
}

/// Row virtualizer.
#[derive(Debug, Clone)]
pub struct Virtualizer {
    estimated_row_height: f64,
    overscan: usize,
    measured: MeasuredHeights,
}

impl Virtualizer {
    pub fn new(estimated_row_height: f64, overscan: usize) -> Self {
        Self {
            estimated_row_height: sanitize_height(estimated_row_height),
            overscan,
            measured: MeasuredHeights::default(),
        }
    }

    /// Records the actual height of a row. Returns true if anything changed.
    ///
    /// Indices outside `0..row_count` are ignored.
    pub fn measure(&mut self, index: usize, height: f64, row_count: usize) -> bool {
        if index >= row_count {
            trace!(index, row_count, "Ignoring measurement outside the rows");
            return false;
        }
        self.measured.set(
            index,
            sanitize_height(height),
            self.estimated_row_height,
            row_count,
        )
    }

    /// Forgets all measurements, e.g. after the row order changed.
    pub fn clear_measurements(&mut self) {
        self.measured = MeasuredHeights::default();
    }

    pub fn has_measurements(&self) -> bool {
        !self.measured.is_empty()
    }

    pub fn row_height(&self, index: usize) -> f64 {
        self.measured
            .get(index)
            .unwrap_or(self.estimated_row_height)
    }

    /// Top offset of row `index` (or the end of the content when `index == row_count`).
    pub fn offset_of(&self, index: usize) -> f64 {
        index as f64 * self.estimated_row_height + self.measured.prefix(index)
    }

    pub fn total_height(&self, row_count: usize) -> f64 {
        self.offset_of(row_count)
    }

    /// Number of rows among the first `row_count` whose top offset satisfies `pred`.
    /// Offsets are strictly increasing, so this is a binary search.
    fn partition(&self, row_count: usize, pred: impl Fn(f64) -> bool) -> usize {
        let mut lo = 0usize;
        let mut hi = row_count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(self.offset_of(mid)) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Index of the row containing content offset `y`, clamped to the rows.
    pub fn index_at(&self, y: f64, row_count: usize) -> Option<usize> {
        if row_count == 0 {
            return None;
        }
        let y = if y.is_nan() { 0.0 } else { y.max(0.0) };
        let count = self.partition(row_count, |start| start <= y);
        Some(count.saturating_sub(1))
    }

    /// Scroll position that puts row `index` at the top of the viewport.
    pub fn scroll_to_index(&self, index: usize, row_count: usize, viewport_height: f64) -> f64 {
        if row_count == 0 {
            return 0.0;
        }
        let index = index.min(row_count - 1);
        let max_scroll = (self.total_height(row_count) - viewport_height.max(0.0)).max(0.0);
        self.offset_of(index).min(max_scroll)
    }

    /// Computes the window for the given row count and viewport.
    ///
    /// Pure: identical inputs always produce an identical window. Negative or
    /// non-finite scroll positions clamp to the content; a viewport without
    /// height yields an empty window.
    pub fn compute(&self, row_count: usize, viewport: Viewport) -> WindowState {
        let total_height = self.total_height(row_count);
        let height = if viewport.height.is_finite() {
            viewport.height.max(0.0)
        } else {
            0.0
        };
        let max_scroll = (total_height - height).max(0.0);
        let scroll_top = if viewport.scroll_top.is_finite() {
            viewport.scroll_top.clamp(0.0, max_scroll)
        } else if viewport.scroll_top == f64::INFINITY {
            max_scroll
        } else {
            0.0
        };

        if row_count == 0 || height <= 0.0 {
            return WindowState {
                visible: None,
                rendered: 0..0,
                rows: Vec::new(),
                total_height,
                scroll_top,
            };
        }

        let bottom = scroll_top + height;
        let first = self.partition(row_count, |start| start <= scroll_top).saturating_sub(1);
        let last = self
            .partition(row_count, |start| start < bottom)
            .saturating_sub(1)
            .max(first);

        let start = first.saturating_sub(self.overscan);
        let end = last.saturating_add(self.overscan).saturating_add(1).min(row_count);

        let mut rows = Vec::with_capacity(end - start);
        let mut offset = self.offset_of(start);
        for index in start..end {
            let row = VirtualRow {
                index,
                start: offset,
                size: self.row_height(index),
            };
            offset = row.end();
            rows.push(row);
        }

        trace!(first, last, start, end, scroll_top, "Window computed");

        WindowState {
            visible: Some((first, last)),
            rendered: start..end,
            rows,
            total_height,
            scroll_top,
        }
    }
}

fn sanitize_height(height: f64) -> f64 {
    if height.is_finite() {
        height.max(MIN_ROW_HEIGHT)
    } else {
        MIN_ROW_HEIGHT
    }
}
