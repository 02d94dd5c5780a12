//! ROI store lookup for a series.
//!
//! Each series owns at most one binary ROI store at
//! `<image dir>/rois/series_<NN>.h5`. The store format is opaque here; the
//! tags it holds are listed in a JSON index beside it
//! (`series_<NN>.roi.json`), which is what this module reads and writes. A
//! store without its index cannot be read and is reported as an error.

use crate::error::RoiError;
use crate::model::roi::{RoiIndexEntry, RoiIndexFile};
use crate::model::{DicomSeries, RoiAnnotation, RoiTagFilter};
use crate::scanner::ROI_DIR_NAME;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const STORE_EXTENSION: &str = "h5";
const INDEX_EXTENSION: &str = "roi.json";

/// File name of the ROI store for `series_number`, zero padded to two digits.
pub fn store_file_name(series_number: u32) -> String {
    format!("series_{series_number:02}.{STORE_EXTENSION}")
}

/// Path of the ROI index describing the store at `store_path`.
pub fn index_path_for(store_path: &Path) -> PathBuf {
    store_path.with_extension(INDEX_EXTENSION)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoiResolver;

impl RoiResolver {
    pub fn new() -> Self {
        Self
    }

    /// Conventional store location, without touching the filesystem.
    pub fn store_path(&self, series: &DicomSeries) -> PathBuf {
        let image_dir = series
            .first()
            .file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        image_dir
            .join(ROI_DIR_NAME)
            .join(store_file_name(series.series_number()))
    }

    /// Conventional store location, creating the `rois` directory if needed.
    pub fn default_store_path(&self, series: &DicomSeries) -> Result<PathBuf, RoiError> {
        let path = self.store_path(series);
        if let Some(rois_dir) = path.parent() {
            if !rois_dir.exists() {
                log::info!("Creating ROI directory {}", rois_dir.display());
                fs::create_dir_all(rois_dir).map_err(|source| RoiError::Io {
                    path: rois_dir.to_path_buf(),
                    source,
                })?;
            }
        }
        log::info!(
            "rois_dir: {} series: {}",
            path.parent().unwrap_or(Path::new("")).display(),
            store_file_name(series.series_number())
        );
        Ok(path)
    }

    /// Annotations stored for `series`, or `None` when it has no ROI store yet.
    pub fn annotations(&self, series: &DicomSeries) -> Result<Option<Vec<RoiAnnotation>>, RoiError> {
        let store_path = self.store_path(series);
        let index_path = index_path_for(&store_path);
        let raw = match fs::read_to_string(&index_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                if store_path.exists() {
                    log::error!(
                        "ROI store {} has no index at {}",
                        store_path.display(),
                        index_path.display()
                    );
                    return Err(RoiError::IndexMissing {
                        store: store_path,
                        index: index_path,
                    });
                }
                return Ok(None);
            }
            Err(source) => {
                return Err(RoiError::Io {
                    path: index_path,
                    source,
                })
            }
        };
        let index: RoiIndexFile =
            serde_json::from_str(&raw).map_err(|source| RoiError::Malformed {
                path: index_path.clone(),
                source,
            })?;

        let store_dir = index_path.parent().unwrap_or(Path::new(""));
        let resolved_store = store_dir.join(&index.store);
        Ok(Some(
            index
                .rois
                .into_iter()
                .map(|entry| RoiAnnotation {
                    tag: entry.tag,
                    slice: entry.slice,
                    store_path: resolved_store.clone(),
                })
                .collect(),
        ))
    }

    /// Distinct tags stored for `series`, sorted. Empty without a store.
    pub fn tags_for(&self, series: &DicomSeries) -> Result<Vec<String>, RoiError> {
        Ok(self.histogram(series)?.into_keys().collect())
    }

    /// Number of annotations per tag.
    pub fn histogram(&self, series: &DicomSeries) -> Result<BTreeMap<String, usize>, RoiError> {
        let mut histogram = BTreeMap::new();
        for annotation in self.annotations(series)?.unwrap_or_default() {
            *histogram.entry(annotation.tag).or_insert(0) += 1;
        }
        Ok(histogram)
    }

    /// Store holding the first ROI tagged `tag`, if any.
    pub fn locate(&self, series: &DicomSeries, tag: &str) -> Result<Option<PathBuf>, RoiError> {
        Ok(self
            .annotations(series)?
            .unwrap_or_default()
            .into_iter()
            .find(|annotation| annotation.tag == tag)
            .map(|annotation| annotation.store_path))
    }

    /// Store a viewer session should open for `series`: the one holding the
    /// selected tag, otherwise the conventional location.
    pub fn resolve_store(
        &self,
        series: &DicomSeries,
        filter: &RoiTagFilter,
    ) -> Result<PathBuf, RoiError> {
        if let Some(tag) = filter.tag() {
            if let Some(path) = self.locate(series, tag)? {
                return Ok(path);
            }
        }
        self.default_store_path(series)
    }

    /// Tags offered for a selection: only a single series has a tag list.
    pub fn tag_choices(&self, selection: &[&DicomSeries]) -> Result<Vec<String>, RoiError> {
        match selection {
            [series] => self.tags_for(series),
            _ => Ok(Vec::new()),
        }
    }

    /// Rewrites the ROI index of `series` after a viewer session saved
    /// `annotations` into its store. Returns the index path.
    pub fn record(
        &self,
        series: &DicomSeries,
        annotations: &[RoiAnnotation],
    ) -> Result<PathBuf, RoiError> {
        let store_path = self.default_store_path(series)?;
        let index_path = index_path_for(&store_path);
        let index = RoiIndexFile {
            series_number: series.series_number(),
            store: store_file_name(series.series_number()),
            rois: annotations
                .iter()
                .map(|annotation| RoiIndexEntry {
                    tag: annotation.tag.clone(),
                    slice: annotation.slice,
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&index).map_err(|source| RoiError::Malformed {
            path: index_path.clone(),
            source,
        })?;
        fs::write(&index_path, json).map_err(|source| RoiError::Io {
            path: index_path.clone(),
            source,
        })?;

        let tags: BTreeSet<&str> = annotations.iter().map(|a| a.tag.as_str()).collect();
        log::info!(
            "Recorded {} ROIs ({} tags) for series {}",
            annotations.len(),
            tags.len(),
            series.series_number()
        );
        Ok(index_path)
    }
}
