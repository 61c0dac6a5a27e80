use crate::table::pagination::PaginationController;
use crate::table::sizing::SizingState;
use crate::table::sort::SortState;

/// Mutable state owned by one table instance for its whole lifetime.
///
/// Engines receive the parts they need by reference; nothing here is global.
#[derive(Debug, Clone)]
pub struct TableState {
    pub sort: SortState,
    pub sizing: SizingState,
    pub load: PaginationController,
}

impl TableState {
    pub fn new(prefetch_threshold: usize, loaded_count: usize, has_more: bool) -> Self {
        Self {
            sort: SortState::new(),
            sizing: SizingState::new(),
            load: PaginationController::new(prefetch_threshold, loaded_count, has_more),
        }
    }
}
