//! The photo table instance.
//!
//! `PhotoTable` ties the engines together. The host owns the rows and passes
//! them into every call; the table owns its column model, sort, sizing and
//! pagination state. After every discrete event (scroll, viewport or container
//! resize, sort toggle, resize drag, rows appended) the host calls
//! [`PhotoTable::render_pass`], which recomputes the display order if needed,
//! the window, the column widths and the pagination trigger.

pub mod columns;
pub mod pagination;
pub mod sizing;
pub mod sort;
pub mod state;
pub mod window;

pub use columns::{ColumnKey, ColumnModel, ColumnSpec};
pub use pagination::{LoadCursor, LoadPhase, LoadProps, LoadTicket, PaginationController};
pub use sizing::{ColumnWidths, LayoutMode, SizingState};
pub use sort::{SortCycle, SortDirection, SortSpec, SortState};
pub use state::TableState;
pub use window::{Viewport, VirtualRow, Virtualizer, WindowState};

use tracing::debug;

use crate::config::TableConfig;
use crate::error::{LoadError, TableError};
use crate::models::Photo;
use crate::render::CellValue;

/// Header of one column as presented for a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub key: ColumnKey,
    pub label: &'static str,
    pub width: f32,
    pub sortable: bool,
    pub resizable: bool,
    pub sort: Option<SortDirection>,
}

/// A materialized row of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    /// Stable row key (the photo id).
    pub key: String,
    /// Position in the sorted sequence.
    pub display_index: usize,
    /// Position in the host's row sequence.
    pub row_index: usize,
    pub start: f64,
    pub height: f64,
    pub cells: Vec<CellValue>,
}

/// Everything a renderer needs to draw the table once.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<FrameRow>,
    pub window: WindowState,
    pub total_width: f32,
    pub loaded_count: usize,
    pub is_loading: bool,
    /// Set when the host must invoke the load-more collaborator now.
    pub load_request: Option<LoadTicket>,
}

pub struct PhotoTable {
    columns: ColumnModel,
    config: TableConfig,
    state: TableState,
    virtualizer: Virtualizer,
    /// Display order: `order[display_index] == row_index`.
    order: Vec<usize>,
    order_stale: bool,
    viewport: Viewport,
    container_width: f32,
}

impl PhotoTable {
    pub fn new(columns: ColumnModel, config: TableConfig, loaded_count: usize, has_more: bool) -> Self {
        let virtualizer = Virtualizer::new(config.estimated_row_height, config.overscan);
        let state = TableState::new(config.prefetch_threshold, loaded_count, has_more);
        Self {
            columns,
            config,
            state,
            virtualizer,
            order: Vec::new(),
            order_stale: true,
            viewport: Viewport::default(),
            container_width: 0.0,
        }
    }

    pub fn columns(&self) -> &ColumnModel {
        &self.columns
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn load_cursor(&self) -> LoadCursor {
        self.state.load.cursor()
    }

    // ---------------------------------------------------------------------
    // Input events
    // ---------------------------------------------------------------------

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn scroll_to(&mut self, scroll_top: f64) {
        self.viewport.scroll_top = scroll_top;
    }

    /// Scrolls so that display row `index` is at the top.
    pub fn scroll_to_index(&mut self, index: usize, row_count: usize) {
        self.viewport.scroll_top =
            self.virtualizer
                .scroll_to_index(index, row_count, self.viewport.height);
    }

    pub fn set_container_width(&mut self, width: f32) {
        self.container_width = width;
    }

    /// Header click on `column`.
    pub fn toggle_sort(&mut self, column: ColumnKey) -> Result<Option<SortDirection>, TableError> {
        let direction = self
            .state
            .sort
            .toggle(&self.columns, column, self.config.sort_cycle)?;
        debug!(column = %column, ?direction, "Sort toggled");
        self.invalidate_order();
        Ok(direction)
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.state.sort = sort;
        self.invalidate_order();
    }

    pub fn begin_resize(&mut self, column: ColumnKey, pointer_x: f32) -> Result<(), TableError> {
        let spec = self.columns.resizable(column)?;
        let current = self.widths().get(&column).copied().unwrap_or(spec.default_width);
        self.state.sizing.begin_resize(spec, current, pointer_x)
    }

    pub fn drag_resize(&mut self, pointer_x: f32) -> Result<f32, TableError> {
        self.state.sizing.drag_to(pointer_x)
    }

    pub fn end_resize(&mut self) -> Result<(ColumnKey, f32), TableError> {
        self.state.sizing.end_resize()
    }

    pub fn cancel_resize(&mut self) -> Result<ColumnKey, TableError> {
        self.state.sizing.cancel_resize()
    }

    /// Records the rendered height of display row `index`. Indices outside
    /// the order computed by the last render pass are ignored.
    pub fn measure_row(&mut self, index: usize, height: f64) -> bool {
        self.virtualizer.measure(index, height, self.order.len())
    }

    // ---------------------------------------------------------------------
    // Load-more protocol
    // ---------------------------------------------------------------------

    pub fn complete_load(&mut self, ticket: LoadTicket, appended: usize, has_more: bool) -> bool {
        self.state.load.complete(ticket, appended, has_more)
    }

    pub fn fail_load(&mut self, ticket: LoadTicket, error: &LoadError) -> bool {
        self.state.load.fail(ticket, error)
    }

    /// Reconciles pagination with host-reported flags.
    pub fn observe(&mut self, props: LoadProps) {
        self.state.load.observe(props);
    }

    // ---------------------------------------------------------------------
    // Derived data
    // ---------------------------------------------------------------------

    fn invalidate_order(&mut self) {
        self.order_stale = true;
        // Measurements are keyed by display index and no longer line up.
        self.virtualizer.clear_measurements();
    }

    /// Re-sorts if the sort changed or rows were appended.
    fn sync_order(&mut self, rows: &[Photo]) {
        if self.order_stale || self.order.len() != rows.len() {
            let order = sort::apply_sort(rows, &self.state.sort);
            // Appended rows sorted in between existing ones move them.
            let moved = self.order.iter().zip(&order).any(|(old, new)| old != new);
            if moved && self.virtualizer.has_measurements() {
                debug!("Display order moved measured rows; measurements cleared");
                self.virtualizer.clear_measurements();
            }
            self.order = order;
            self.order_stale = false;
            debug!(rows = rows.len(), sort = ?self.state.sort.active(), "Display order rebuilt");
        }
    }

    /// Current display order; valid after the last `render_pass`.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Row at display position `display_index`.
    pub fn row_at<'a>(&self, rows: &'a [Photo], display_index: usize) -> Option<&'a Photo> {
        self.order.get(display_index).and_then(|&i| rows.get(i))
    }

    pub fn widths(&self) -> ColumnWidths {
        sizing::compute_widths(
            &self.columns,
            self.container_width,
            &self.state.sizing,
            self.config.layout,
        )
    }

    /// Window for `row_count` rows at the current viewport. Pure.
    pub fn window(&self, row_count: usize) -> WindowState {
        self.virtualizer.compute(row_count, self.viewport)
    }

    pub fn headers(&self, widths: &ColumnWidths) -> Vec<HeaderCell> {
        self.columns
            .iter()
            .map(|c| HeaderCell {
                key: c.key,
                label: c.header,
                width: widths.get(&c.key).copied().unwrap_or(c.default_width),
                sortable: c.sortable,
                resizable: c.resizable,
                sort: self.state.sort.direction_of(c.key),
            })
            .collect()
    }

    /// Recomputes everything for the current inputs and runs the pagination
    /// trigger check. Call after every event.
    pub fn render_pass(&mut self, rows: &[Photo]) -> Frame {
        self.build_frame(rows, true)
    }

    /// Like `render_pass` but never requests a load. Used after a failed load
    /// so that the retry waits for the next user event.
    pub fn redraw(&mut self, rows: &[Photo]) -> Frame {
        self.build_frame(rows, false)
    }

    fn build_frame(&mut self, rows: &[Photo], trigger: bool) -> Frame {
        self.sync_order(rows);

        let window = self.window(rows.len());
        let load_request = if trigger {
            self.state.load.check(window.last_rendered(), rows.len())
        } else {
            None
        };

        let widths = self.widths();
        let headers = self.headers(&widths);

        let frame_rows = window
            .rows
            .iter()
            .filter_map(|v| {
                let row_index = *self.order.get(v.index)?;
                let photo = rows.get(row_index)?;
                Some(FrameRow {
                    key: photo.id.clone(),
                    display_index: v.index,
                    row_index,
                    start: v.start,
                    height: v.size,
                    cells: self.columns.iter().map(|c| c.render(photo)).collect(),
                })
            })
            .collect();

        Frame {
            headers,
            rows: frame_rows,
            total_width: sizing::total_width(&widths),
            loaded_count: rows.len(),
            is_loading: self.state.load.is_loading(),
            load_request,
            window,
        }
    }
}
