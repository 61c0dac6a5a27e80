//! Row and cell presentation.
//!
//! Cell callbacks map a photo to a `CellValue` without knowing anything about
//! layout. `TextRenderer` turns a computed `Frame` into plain text lines, which
//! the headless driver prints and tests inspect.

use chrono::{DateTime, Utc};

use crate::models::Photo;
use crate::table::{Frame, HeaderCell, SortDirection};

/// Display format of the taken date column.
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Badge styling for list columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Default,
    Secondary,
    Outline,
}

/// Presentational output of a single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Image(String),
    Text(String),
    Date(DateTime<Utc>),
    Badges {
        items: Vec<String>,
        variant: BadgeVariant,
    },
}

impl CellValue {
    /// Flattens the value into a single line of text.
    pub fn display_text(&self) -> String {
        match self {
            Self::Image(reference) => format!("[{}]", reference),
            Self::Text(text) => text.clone(),
            Self::Date(date) => date.format(DATE_FORMAT).to_string(),
            Self::Badges { items, variant } => {
                let (open, close) = match variant {
                    BadgeVariant::Default => ('[', ']'),
                    BadgeVariant::Secondary => ('(', ')'),
                    BadgeVariant::Outline => ('<', '>'),
                };
                items
                    .iter()
                    .map(|item| format!("{open}{item}{close}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }
    }
}

pub fn thumbnail_cell(photo: &Photo) -> CellValue {
    CellValue::Image(photo.thumbnail.clone())
}

pub fn path_cell(photo: &Photo) -> CellValue {
    CellValue::Text(photo.path.clone())
}

pub fn caption_cell(photo: &Photo) -> CellValue {
    CellValue::Text(photo.caption.clone())
}

pub fn taken_date_cell(photo: &Photo) -> CellValue {
    CellValue::Date(photo.taken_date)
}

pub fn tags_cell(photo: &Photo) -> CellValue {
    CellValue::Badges {
        items: photo.tags.clone(),
        variant: BadgeVariant::Default,
    }
}

pub fn peoples_cell(photo: &Photo) -> CellValue {
    CellValue::Badges {
        items: photo.peoples.clone(),
        variant: BadgeVariant::Secondary,
    }
}

pub fn flags_cell(photo: &Photo) -> CellValue {
    CellValue::Badges {
        items: photo.flags.clone(),
        variant: BadgeVariant::Outline,
    }
}

/// Status line shown above the table.
pub fn status_line(loaded: usize, is_loading: bool) -> String {
    if is_loading {
        format!("{loaded} photos loaded \u{2022} Loading...")
    } else {
        format!("{loaded} photos loaded")
    }
}

/// Plain-text renderer for frames.
///
/// Pixel widths are converted to character cells using a fixed glyph width.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    /// Pixels per character cell (default: 8)
    pub glyph_width: f32,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { glyph_width: 8.0 }
    }
}

impl TextRenderer {
    fn chars_for(&self, width_px: f32) -> usize {
        ((width_px / self.glyph_width.max(1.0)).floor() as usize).max(1)
    }

    fn fit(&self, text: &str, width_px: f32) -> String {
        let width = self.chars_for(width_px);
        let count = text.chars().count();
        if count <= width {
            return format!("{text:<width$}");
        }
        if width == 1 {
            return "\u{2026}".to_string();
        }
        let mut out: String = text.chars().take(width - 1).collect();
        out.push('\u{2026}');
        out
    }

    fn header_label(header: &HeaderCell) -> String {
        match header.sort {
            Some(SortDirection::Asc) => format!("{} \u{2191}", header.label),
            Some(SortDirection::Desc) => format!("{} \u{2193}", header.label),
            None if header.sortable => format!("{} \u{21c5}", header.label),
            None => header.label.to_string(),
        }
    }

    /// Renders the header line, one line per materialized row, and the footer.
    pub fn render(&self, frame: &Frame) -> Vec<String> {
        let mut lines = Vec::with_capacity(frame.rows.len() + 3);
        lines.push(status_line(frame.loaded_count, frame.is_loading));

        let header = frame
            .headers
            .iter()
            .map(|h| self.fit(&Self::header_label(h), h.width))
            .collect::<Vec<_>>()
            .join("|");
        lines.push(header);

        for row in &frame.rows {
            let line = row
                .cells
                .iter()
                .zip(frame.headers.iter())
                .map(|(cell, header)| self.fit(&cell.display_text(), header.width))
                .collect::<Vec<_>>()
                .join("|");
            lines.push(line);
        }

        if frame.is_loading {
            lines.push("Loading more photos...".to_string());
        }
        lines
    }
}
