use std::path::PathBuf;

use thiserror::Error;

/// A single file could not be turned into an [`ImageRecord`](crate::model::ImageRecord).
///
/// Always recoverable: the scanner logs it and moves on to the next file.
#[derive(Debug, Error)]
pub enum RecordParseError {
    #[error("{path}: failed to open DICOM file ({message})")]
    Open { path: PathBuf, message: String },

    #[error("{path}: missing required attribute {attribute}")]
    MissingAttribute {
        path: PathBuf,
        attribute: &'static str,
    },
}

/// Fatal to a whole directory scan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("scan root {0} does not exist")]
    RootMissing(PathBuf),

    #[error("scan root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("scan root {path} is not readable: {message}")]
    RootUnreadable { path: PathBuf, message: String },

    #[error("scan of {0} was cancelled")]
    Cancelled(PathBuf),
}

#[derive(Debug, Error)]
pub enum RoiError {
    #[error("ROI index {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ROI index {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ROI store {store} exists but its index {index} is missing")]
    IndexMissing { store: PathBuf, index: PathBuf },
}

/// Hard failures of a fit call. Per-location problems are reported through
/// [`Rejection`](crate::fit::Rejection) instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FitError {
    #[error("intensity threshold must be finite and positive, got {0}")]
    InvalidThreshold(f64),

    #[error("intensity threshold `{0}` is not a number")]
    UnparsableThreshold(String),

    #[error("{times} echo times supplied for a stack of {echoes} echoes")]
    EchoCountMismatch { times: usize, echoes: usize },

    #[error("echo time #{index} is negative ({value})")]
    NegativeEchoTime { index: usize, value: f64 },

    #[error("echo time #{index} is not finite")]
    NonFiniteEchoTime { index: usize },

    #[error("signal holds {actual} samples but shape {shape:?} needs {expected}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error)]
pub enum StackError {
    #[error("series {0} has images without an echo time")]
    MissingEchoTime(u32),

    #[error("series {series}: expected one image at echo {echo_time} ms, slice {slice}, found {found}")]
    IncompleteGrid {
        series: u32,
        echo_time: f64,
        slice: usize,
        found: usize,
    },

    #[error("{path}: {message}")]
    Pixels { path: PathBuf, message: String },

    #[error("{path}: frame is {found:?}, expected {expected:?} (rows, columns)")]
    FrameSize {
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error(transparent)]
    Fit(#[from] FitError),
}
