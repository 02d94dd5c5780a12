use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One tagged region stored for a series.
///
/// The mask payload lives in the series' binary store at `store_path`; only
/// its tag and slice are known here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiAnnotation {
    pub tag: String,
    pub slice: Option<u32>,
    pub store_path: PathBuf,
}

/// Which ROI the caller wants to open a series with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoiTagFilter {
    #[default]
    None,
    Tag(String),
}

impl RoiTagFilter {
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Tag(tag) => Some(tag),
        }
    }
}

/// On-disk shape of the ROI index that sits beside a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RoiIndexFile {
    pub series_number: u32,
    pub store: String,
    #[serde(default)]
    pub rois: Vec<RoiIndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RoiIndexEntry {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice: Option<u32>,
}
