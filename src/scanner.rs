//! Directory walker turning files into [`ImageRecord`]s.

use crate::cancellation::CancellationToken;
use crate::config::ScanOptions;
use crate::error::ScanError;
use crate::model::loader::load_record;
use crate::model::ImageRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// Name of the per-directory folder holding ROI stores.
pub const ROI_DIR_NAME: &str = "rois";

type Walker = FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>;

/// Validates `root` and returns a lazy iterator over the records below it.
///
/// `progress` is called with the cumulative number of files processed after
/// every file, including files that could not be parsed.
pub fn scan<F>(root: &Path, options: ScanOptions, progress: F) -> Result<Scan<F>, ScanError>
where
    F: FnMut(usize),
{
    check_root(root)?;
    log::info!("Scanning {} for DICOM files", root.display());

    let walker = WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_scannable as fn(&DirEntry) -> bool);

    Ok(Scan {
        root: root.to_path_buf(),
        walker,
        progress,
        processed: 0,
        skipped: 0,
        cancellation: options.cancellation,
        cancelled: false,
    })
}

/// Runs a scan to completion, treating cancellation as a failure.
pub fn collect_records<F>(
    root: &Path,
    options: ScanOptions,
    progress: F,
) -> Result<Vec<ImageRecord>, ScanError>
where
    F: FnMut(usize),
{
    let mut scan = scan(root, options, progress)?;
    let records: Vec<ImageRecord> = scan.by_ref().collect();
    if scan.was_cancelled() {
        return Err(ScanError::Cancelled(root.to_path_buf()));
    }
    log::info!(
        "Read {} DICOM files from {} ({} skipped)",
        records.len(),
        root.display(),
        scan.skipped()
    );
    Ok(records)
}

fn check_root(root: &Path) -> Result<(), ScanError> {
    let metadata = fs::metadata(root).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ScanError::RootMissing(root.to_path_buf()),
        _ => ScanError::RootUnreadable {
            path: root.to_path_buf(),
            message: err.to_string(),
        },
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::RootNotDirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|err| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        message: err.to_string(),
    })?;
    Ok(())
}

fn is_scannable(entry: &DirEntry) -> bool {
    !(entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == ROI_DIR_NAME)
}

/// Lazy, finite sequence of records produced by [`scan`].
pub struct Scan<F> {
    root: PathBuf,
    walker: Walker,
    progress: F,
    processed: usize,
    skipped: usize,
    cancellation: CancellationToken,
    cancelled: bool,
}

impl<F> Scan<F> {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files visited so far, parsed or not.
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl<F> Scan<F>
where
    F: FnMut(usize),
{
    fn mark_processed(&mut self) {
        self.processed += 1;
        (self.progress)(self.processed);
    }
}

impl<F> Iterator for Scan<F>
where
    F: FnMut(usize),
{
    type Item = ImageRecord;

    fn next(&mut self) -> Option<ImageRecord> {
        loop {
            if self.cancelled {
                return None;
            }
            if self.cancellation.is_cancelled() {
                log::info!(
                    "Scan of {} cancelled after {} files",
                    self.root.display(),
                    self.processed
                );
                self.cancelled = true;
                return None;
            }

            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    self.skipped += 1;
                    self.mark_processed();
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                if !entry.path_is_symlink() {
                    continue;
                }
                // Unfollowed link: read it if it points at a file.
                if !entry.path().is_file() {
                    log::warn!("Skipping link {}: not a file", entry.path().display());
                    self.skipped += 1;
                    self.mark_processed();
                    continue;
                }
            }

            let result = load_record(entry.path());
            self.mark_processed();
            match result {
                Ok(record) => return Some(record),
                Err(err) => {
                    log::warn!("Skipping file: {err}");
                    self.skipped += 1;
                }
            }
        }
    }
}
