//! Core of the DICOM series viewer: directory ingestion, series indexing, ROI
//! store lookup and R2* fitting.
//!
//! The viewer front end drives everything through [`pipeline::AsyncLoadPipeline`]
//! and the query functions on [`index::SeriesIndex`] and [`roi::RoiResolver`].

pub mod cancellation;
pub mod config;
pub mod error;
pub mod fit;
pub mod index;
pub mod model;
pub mod pipeline;
pub mod pixel_pipeline;
pub mod roi;
pub mod scanner;
pub mod utils;

pub use config::{FitSettings, ScanOptions};
pub use error::{FitError, RecordParseError, RoiError, ScanError, StackError};
pub use index::SeriesIndex;
pub use model::{DicomSeries, ImageRecord, RoiAnnotation, RoiTagFilter, SeriesSummary};
pub use pipeline::{AsyncLoadPipeline, LoadEvent, LoadId, LoadState};
pub use roi::RoiResolver;
