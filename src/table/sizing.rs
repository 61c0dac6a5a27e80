//! Size engine: per-column pixel widths and the drag-resize gesture.
//!
//! Two layouts are supported. In fixed layout every column has an explicit
//! width (its default until the user resizes it) and the table may be wider
//! than its container. In flex layout fixed columns reserve their width first
//! and flexible columns split the leftover container width by weight.
//!
//! Every resolved width stays within `[min_width, max_width]` of its column.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::TableError;
use crate::table::columns::{ColumnKey, ColumnModel, ColumnSpec};

/// Resolved widths in column order.
pub type ColumnWidths = IndexMap<ColumnKey, f32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Fixed,
    Flex,
}

/// An in-progress drag on a column boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub column: ColumnKey,
    /// Width of the column when the drag started.
    pub anchor_width: f32,
    /// Pointer position when the drag started.
    pub origin_x: f32,
    /// Width currently shown while dragging.
    pub live_width: f32,
    min_width: f32,
    max_width: f32,
}

/// User-driven sizing of the table.
///
/// Holds widths committed by finished drags (absent keys fall back to the
/// computed default) and the drag currently in progress, if any. Nothing is
/// ever reset automatically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizingState {
    overrides: HashMap<ColumnKey, f32>,
    active: Option<ResizeSession>,
}

impl SizingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width committed for `column` by an earlier drag.
    pub fn override_for(&self, column: ColumnKey) -> Option<f32> {
        self.overrides.get(&column).copied()
    }

    pub fn overrides(&self) -> &HashMap<ColumnKey, f32> {
        &self.overrides
    }

    pub fn active(&self) -> Option<&ResizeSession> {
        self.active.as_ref()
    }

    pub fn is_resizing(&self) -> bool {
        self.active.is_some()
    }

    /// User width of a column, preferring the live drag width.
    fn user_width(&self, column: ColumnKey) -> Option<f32> {
        match self.active {
            Some(session) if session.column == column => Some(session.live_width),
            _ => self.override_for(column),
        }
    }

    /// Starts a drag on `column`, anchored at its currently displayed width.
    pub fn begin_resize(
        &mut self,
        column: &ColumnSpec,
        current_width: f32,
        pointer_x: f32,
    ) -> Result<(), TableError> {
        if !column.resizable {
            return Err(TableError::NotResizable(column.key));
        }
        if let Some(session) = &self.active {
            return Err(TableError::ResizeInProgress(session.column));
        }

        let anchor_width = column.clamp(current_width);
        self.active = Some(ResizeSession {
            column: column.key,
            anchor_width,
            origin_x: pointer_x,
            live_width: anchor_width,
            min_width: column.min_width,
            max_width: column.max_width,
        });
        debug!(column = %column.key, anchor_width, "Column resize started");
        Ok(())
    }

    /// Applies a pointer move; returns the new live width of the dragged column.
    pub fn drag_to(&mut self, pointer_x: f32) -> Result<f32, TableError> {
        let session = self.active.as_mut().ok_or(TableError::NoActiveResize)?;
        let delta = pointer_x - session.origin_x;
        let candidate = session.anchor_width + delta;
        session.live_width = if candidate.is_nan() {
            session.anchor_width
        } else {
            candidate.clamp(session.min_width, session.max_width)
        };
        trace!(column = %session.column, width = session.live_width, "Column resize moved");
        Ok(session.live_width)
    }

    /// Ends the drag and commits the live width for the rest of the session.
    pub fn end_resize(&mut self) -> Result<(ColumnKey, f32), TableError> {
        let session = self.active.take().ok_or(TableError::NoActiveResize)?;
        self.overrides.insert(session.column, session.live_width);
        debug!(column = %session.column, width = session.live_width, "Column resize committed");
        Ok((session.column, session.live_width))
    }

    /// Abandons the drag; the column returns to its pre-drag width.
    pub fn cancel_resize(&mut self) -> Result<ColumnKey, TableError> {
        let session = self.active.take().ok_or(TableError::NoActiveResize)?;
        debug!(column = %session.column, "Column resize cancelled");
        Ok(session.column)
    }
}

/// Computes the width of every column.
pub fn compute_widths(
    columns: &ColumnModel,
    container_width: f32,
    sizing: &SizingState,
    mode: LayoutMode,
) -> ColumnWidths {
    match mode {
        LayoutMode::Fixed => fixed_widths(columns, sizing),
        LayoutMode::Flex => flex_widths(columns, container_width, sizing),
    }
}

/// Sum of all column widths.
pub fn total_width(widths: &ColumnWidths) -> f32 {
    widths.values().sum()
}

fn fixed_widths(columns: &ColumnModel, sizing: &SizingState) -> ColumnWidths {
    columns
        .iter()
        .map(|c| {
            let width = sizing.user_width(c.key).unwrap_or(c.default_width);
            (c.key, c.clamp(width))
        })
        .collect()
}

fn flex_widths(columns: &ColumnModel, container_width: f32, sizing: &SizingState) -> ColumnWidths {
    let container_width = if container_width.is_finite() {
        container_width.max(0.0)
    } else {
        0.0
    };

    let mut widths: ColumnWidths = IndexMap::with_capacity(columns.len());
    let mut flexible: Vec<&ColumnSpec> = Vec::new();
    let mut reserved = 0.0f32;

    // A user-resized flex column keeps its width like a fixed one.
    for column in columns.iter() {
        match (column.flex_weight, sizing.user_width(column.key)) {
            (Some(_), None) => {
                widths.insert(column.key, column.default_width);
                flexible.push(column);
            }
            (_, user) => {
                let width = column.clamp(user.unwrap_or(column.default_width));
                reserved += width;
                widths.insert(column.key, width);
            }
        }
    }

    let mut remaining = (container_width - reserved).max(0.0);

    // Distribute by weight; columns that hit a bound are frozen there and the
    // rest is redistributed among the others.
    while !flexible.is_empty() {
        let total_weight: f32 = flexible.iter().filter_map(|c| c.flex_weight).sum();
        let mut frozen = Vec::new();

        for (i, column) in flexible.iter().enumerate() {
            let weight = column.flex_weight.unwrap_or(0.0);
            let share = remaining * weight / total_weight;
            let clamped = column.clamp(share);
            widths.insert(column.key, clamped);
            if clamped != share {
                frozen.push(i);
            }
        }

        if frozen.is_empty() {
            break;
        }

        for &i in frozen.iter().rev() {
            let column = flexible.remove(i);
            remaining = (remaining - widths[&column.key]).max(0.0);
        }
    }

    trace!(container_width, reserved, "Flex widths computed");
    widths
}
