//! Column model: the static schema of the photo table.
//!
//! Each column declares its key, header label, cell presentation, whether it
//! participates in sorting and resizing, and its sizing constraints. The model
//! is fixed at construction and validated once; every engine afterwards relies
//! on `min_width <= default_width <= max_width` holding for every column.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use crate::error::TableError;
use crate::models::Photo;
use crate::render::{self, CellValue};

/// Identifies a column of the photo table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKey {
    Thumbnail,
    Path,
    Caption,
    TakenDate,
    Tags,
    Peoples,
    Flags,
}

impl ColumnKey {
    /// Stable string identifier, matching the photo record field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Path => "path",
            Self::Caption => "caption",
            Self::TakenDate => "takenDate",
            Self::Tags => "tags",
            Self::Peoples => "peoples",
            Self::Flags => "flags",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "thumbnail" => Some(Self::Thumbnail),
            "path" => Some(Self::Path),
            "caption" => Some(Self::Caption),
            "takenDate" => Some(Self::TakenDate),
            "tags" => Some(Self::Tags),
            "peoples" => Some(Self::Peoples),
            "flags" => Some(Self::Flags),
            _ => None,
        }
    }

    /// Compares two photos by this column's comparable projection.
    ///
    /// Text columns compare lexicographically, the date column chronologically,
    /// list columns element-wise.
    pub fn compare(&self, a: &Photo, b: &Photo) -> Ordering {
        match self {
            Self::Thumbnail => a.thumbnail.cmp(&b.thumbnail),
            Self::Path => a.path.cmp(&b.path),
            Self::Caption => a.caption.cmp(&b.caption),
            Self::TakenDate => a.taken_date.cmp(&b.taken_date),
            Self::Tags => a.tags.cmp(&b.tags),
            Self::Peoples => a.peoples.cmp(&b.peoples),
            Self::Flags => a.flags.cmp(&b.flags),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure cell presentation callback.
pub type CellRenderer = fn(&Photo) -> CellValue;

/// Declaration of a single column.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub key: ColumnKey,
    pub header: &'static str,
    pub sortable: bool,
    pub resizable: bool,
    pub min_width: f32,
    pub max_width: f32,
    /// Width used when the user has not resized the column (fixed layout), and
    /// the reserved width of non-flex columns in flex layout.
    pub default_width: f32,
    /// Share of leftover width in flex layout; `None` keeps the column fixed.
    pub flex_weight: Option<f32>,
    pub cell: CellRenderer,
}

impl ColumnSpec {
    /// Creates a sortable, resizable column with the given width bounds.
    pub fn new(
        key: ColumnKey,
        header: &'static str,
        default_width: f32,
        min_width: f32,
        max_width: f32,
        cell: CellRenderer,
    ) -> Self {
        Self {
            key,
            header,
            sortable: true,
            resizable: true,
            min_width,
            max_width,
            default_width,
            flex_weight: None,
            cell,
        }
    }

    /// Creates a column pinned to a single width (min = max = default).
    pub fn fixed(key: ColumnKey, header: &'static str, width: f32, cell: CellRenderer) -> Self {
        Self::new(key, header, width, width, width, cell).resizable(false)
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn flex(mut self, weight: f32) -> Self {
        self.flex_weight = Some(weight);
        self
    }

    /// Clamps a candidate width into this column's bounds.
    pub fn clamp(&self, width: f32) -> f32 {
        if width.is_nan() {
            return self.default_width;
        }
        width.clamp(self.min_width, self.max_width)
    }

    /// Presentation value of this column for a row.
    pub fn render(&self, photo: &Photo) -> CellValue {
        (self.cell)(photo)
    }

    fn validate(&self) -> Result<(), TableError> {
        if !(self.min_width <= self.max_width) {
            return Err(TableError::InvalidColumnBounds {
                key: self.key,
                min: self.min_width,
                max: self.max_width,
            });
        }
        if !(self.min_width..=self.max_width).contains(&self.default_width) {
            return Err(TableError::InvalidDefaultWidth {
                key: self.key,
                width: self.default_width,
                min: self.min_width,
                max: self.max_width,
            });
        }
        if let Some(weight) = self.flex_weight {
            if !(weight > 0.0) {
                return Err(TableError::InvalidFlexWeight {
                    key: self.key,
                    weight,
                });
            }
        }
        Ok(())
    }
}

/// The ordered, validated set of columns of a table.
#[derive(Debug, Clone)]
pub struct ColumnModel {
    columns: Vec<ColumnSpec>,
}

impl ColumnModel {
    /// Validates and freezes a column list.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            column.validate()?;
            if !seen.insert(column.key) {
                return Err(TableError::DuplicateColumn(column.key));
            }
        }
        Ok(Self { columns })
    }

    /// The photo gallery columns with explicit pixel sizes.
    pub fn photo_default() -> Self {
        Self {
            columns: vec![
                ColumnSpec::new(ColumnKey::Thumbnail, "Thumb", 80.0, 60.0, 120.0, render::thumbnail_cell)
                    .sortable(false),
                ColumnSpec::new(ColumnKey::Path, "Path", 250.0, 150.0, 400.0, render::path_cell),
                ColumnSpec::new(ColumnKey::Caption, "Caption", 350.0, 200.0, 500.0, render::caption_cell),
                ColumnSpec::new(ColumnKey::TakenDate, "Taken Date", 150.0, 120.0, 200.0, render::taken_date_cell),
                ColumnSpec::new(ColumnKey::Tags, "Tags", 220.0, 120.0, 300.0, render::tags_cell)
                    .sortable(false),
                ColumnSpec::new(ColumnKey::Peoples, "People", 200.0, 120.0, 280.0, render::peoples_cell)
                    .sortable(false),
                ColumnSpec::new(ColumnKey::Flags, "Flags", 170.0, 100.0, 250.0, render::flags_cell)
                    .sortable(false),
            ],
        }
    }

    /// The photo gallery columns for flex layout: thumbnail and date keep a
    /// fixed allocation, the rest share the leftover width 2:3:1.5:1.5:1.5.
    pub fn photo_flex() -> Self {
        Self {
            columns: vec![
                ColumnSpec::fixed(ColumnKey::Thumbnail, "Thumb", 80.0, render::thumbnail_cell)
                    .sortable(false),
                ColumnSpec::new(ColumnKey::Path, "Path", 250.0, 150.0, 400.0, render::path_cell)
                    .flex(2.0),
                ColumnSpec::new(ColumnKey::Caption, "Caption", 350.0, 200.0, 500.0, render::caption_cell)
                    .flex(3.0),
                ColumnSpec::fixed(ColumnKey::TakenDate, "Taken Date", 150.0, render::taken_date_cell),
                ColumnSpec::new(ColumnKey::Tags, "Tags", 220.0, 120.0, 300.0, render::tags_cell)
                    .sortable(false)
                    .flex(1.5),
                ColumnSpec::new(ColumnKey::Peoples, "People", 200.0, 120.0, 280.0, render::peoples_cell)
                    .sortable(false)
                    .flex(1.5),
                ColumnSpec::new(ColumnKey::Flags, "Flags", 170.0, 100.0, 250.0, render::flags_cell)
                    .sortable(false)
                    .flex(1.5),
            ],
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, key: ColumnKey) -> Result<&ColumnSpec, TableError> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .ok_or(TableError::UnknownColumn(key))
    }

    /// Looks up a column that must be sortable.
    pub fn sortable(&self, key: ColumnKey) -> Result<&ColumnSpec, TableError> {
        let column = self.get(key)?;
        if !column.sortable {
            return Err(TableError::NotSortable(key));
        }
        Ok(column)
    }

    /// Looks up a column that must be resizable.
    pub fn resizable(&self, key: ColumnKey) -> Result<&ColumnSpec, TableError> {
        let column = self.get(key)?;
        if !column.resizable {
            return Err(TableError::NotResizable(key));
        }
        Ok(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogs_are_valid() {
        assert!(ColumnModel::new(ColumnModel::photo_default().columns).is_ok());
        assert!(ColumnModel::new(ColumnModel::photo_flex().columns).is_ok());
        assert_eq!(ColumnModel::photo_default().len(), 7);
    }

    #[test]
    fn test_only_text_and_date_columns_sort() {
        let model = ColumnModel::photo_default();
        let sortable: Vec<ColumnKey> = model.iter().filter(|c| c.sortable).map(|c| c.key).collect();
        assert_eq!(
            sortable,
            vec![ColumnKey::Path, ColumnKey::Caption, ColumnKey::TakenDate]
        );
        assert_eq!(
            model.sortable(ColumnKey::Tags).unwrap_err(),
            TableError::NotSortable(ColumnKey::Tags)
        );
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let column = ColumnSpec::new(ColumnKey::Path, "Path", 150.0, 200.0, 100.0, render::path_cell);
        let err = ColumnModel::new(vec![column]).unwrap_err();
        assert!(matches!(err, TableError::InvalidColumnBounds { .. }));
    }

    #[test]
    fn test_rejects_default_outside_bounds() {
        let column = ColumnSpec::new(ColumnKey::Path, "Path", 500.0, 100.0, 400.0, render::path_cell);
        let err = ColumnModel::new(vec![column]).unwrap_err();
        assert!(matches!(err, TableError::InvalidDefaultWidth { .. }));
    }

    #[test]
    fn test_rejects_duplicates_and_bad_weights() {
        let a = ColumnSpec::new(ColumnKey::Path, "Path", 200.0, 100.0, 400.0, render::path_cell);
        let b = a.clone();
        assert_eq!(
            ColumnModel::new(vec![a.clone(), b]).unwrap_err(),
            TableError::DuplicateColumn(ColumnKey::Path)
        );

        let weightless = a.flex(0.0);
        assert!(matches!(
            ColumnModel::new(vec![weightless]).unwrap_err(),
            TableError::InvalidFlexWeight { .. }
        ));
    }

    #[test]
    fn test_fixed_column_pins_width() {
        let column = ColumnSpec::fixed(ColumnKey::Thumbnail, "Thumb", 80.0, render::thumbnail_cell);
        assert_eq!(column.min_width, 80.0);
        assert_eq!(column.max_width, 80.0);
        assert_eq!(column.clamp(300.0), 80.0);
        assert!(!column.resizable);
    }

    #[test]
    fn test_key_round_trip_names() {
        assert_eq!(ColumnKey::parse("takenDate"), Some(ColumnKey::TakenDate));
        assert_eq!(ColumnKey::TakenDate.to_string(), "takenDate");
        assert_eq!(ColumnKey::parse("unknown"), None);
    }
}
