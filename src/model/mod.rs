pub mod image_record;
pub mod loader;
pub mod roi;
pub mod series;

pub use image_record::ImageRecord;
pub use roi::{RoiAnnotation, RoiTagFilter};
pub use series::{DicomSeries, SeriesSummary};
