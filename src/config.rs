//! Table configuration.

use crate::table::pagination::PREFETCH_THRESHOLD;
use crate::table::sizing::LayoutMode;
use crate::table::sort::SortCycle;

/// Default estimated row height in pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 80.0;

/// Default number of rows rendered beyond each edge of the viewport.
pub const DEFAULT_OVERSCAN: usize = 10;

/// Configuration for a photo table instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    /// Row height used until rows are measured (default: 80)
    pub estimated_row_height: f64,
    /// Extra rows before and after the visible range (default: 10)
    pub overscan: usize,
    /// Distance from the end of loaded rows that triggers a load (default: 10)
    pub prefetch_threshold: usize,
    /// Header click behaviour (default: ascending/descending only)
    pub sort_cycle: SortCycle,
    /// Column layout strategy (default: fixed pixel widths)
    pub layout: LayoutMode,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            estimated_row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            prefetch_threshold: PREFETCH_THRESHOLD,
            sort_cycle: SortCycle::AscDesc,
            layout: LayoutMode::Fixed,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estimated_row_height(mut self, height: f64) -> Self {
        self.estimated_row_height = height;
        self
    }

    pub fn overscan(mut self, rows: usize) -> Self {
        self.overscan = rows;
        self
    }

    pub fn prefetch_threshold(mut self, rows: usize) -> Self {
        self.prefetch_threshold = rows;
        self
    }

    pub fn sort_cycle(mut self, cycle: SortCycle) -> Self {
        self.sort_cycle = cycle;
        self
    }

    pub fn layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gallery() {
        let config = TableConfig::default();
        assert_eq!(config.estimated_row_height, 80.0);
        assert_eq!(config.overscan, 10);
        assert_eq!(config.prefetch_threshold, 10);
        assert_eq!(config.sort_cycle, SortCycle::AscDesc);
        assert_eq!(config.layout, LayoutMode::Fixed);
    }

    #[test]
    fn test_builder_overrides() {
        let config = TableConfig::new()
            .overscan(4)
            .layout(LayoutMode::Flex)
            .sort_cycle(SortCycle::AscDescNone);
        assert_eq!(config.overscan, 4);
        assert_eq!(config.layout, LayoutMode::Flex);
        assert_eq!(config.sort_cycle, SortCycle::AscDescNone);
    }
}
