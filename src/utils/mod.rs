pub mod formatting;

pub use formatting::{roi_label, series_title, summary_header, summary_row};
