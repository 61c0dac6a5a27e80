pub mod mock;
pub mod photo;

pub use mock::{MockPhotoSource, MockSourceConfig, PhotoBatch, PhotoLoader};
pub use photo::*;
