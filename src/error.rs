//! Error types for the table core and the load-more boundary.

use thiserror::Error;

use crate::table::columns::ColumnKey;

/// Contract violations raised by the table core.
///
/// Scroll and viewport input never produce these; the windowing engine clamps
/// out-of-range values instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("column {key} has min width {min} greater than max width {max}")]
    InvalidColumnBounds { key: ColumnKey, min: f32, max: f32 },

    #[error("column {key} default width {width} lies outside [{min}, {max}]")]
    InvalidDefaultWidth {
        key: ColumnKey,
        width: f32,
        min: f32,
        max: f32,
    },

    #[error("column {key} has a non-positive flex weight {weight}")]
    InvalidFlexWeight { key: ColumnKey, weight: f32 },

    #[error("column {0} is declared more than once")]
    DuplicateColumn(ColumnKey),

    #[error("column {0} is not part of this table")]
    UnknownColumn(ColumnKey),

    #[error("column {0} is not sortable")]
    NotSortable(ColumnKey),

    #[error("column {0} is not resizable")]
    NotResizable(ColumnKey),

    #[error("a resize of column {0} is already in progress")]
    ResizeInProgress(ColumnKey),

    #[error("no column resize is in progress")]
    NoActiveResize,
}

/// Failures reported by the load-more collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("photo source failed: {0}")]
    Source(String),

    #[error("load task panicked or was aborted")]
    Aborted,

    #[error("load completion channel disconnected")]
    Disconnected,
}
