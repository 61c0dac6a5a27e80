//! Virtualized, sortable, resizable photo table.
//!
//! The table core is headless: it turns rows, a viewport and user input into
//! [`table::Frame`]s and tells the host when to fetch the next page. Drawing
//! is left to whatever renders the frames; [`render::TextRenderer`] is a
//! plain-text one used by the demo binary.

pub mod bench;
pub mod config;
pub mod error;
pub mod gallery;
pub mod models;
pub mod render;
pub mod table;

pub use config::TableConfig;
pub use error::{LoadError, TableError};
pub use gallery::{Gallery, GalleryEvent};
pub use table::{Frame, PhotoTable};
