pub mod dataset;
pub mod images;

pub use dataset::{load_dataset, save_dataset};
pub use images::{HttpImageDownloader, ImageDownloader};
