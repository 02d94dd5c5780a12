//! Grouping of scanned images into series.

use crate::error::RoiError;
use crate::model::{DicomSeries, ImageRecord, SeriesSummary};
use crate::roi::RoiResolver;
use std::collections::btree_map::{self, BTreeMap};

/// Series of one directory scan, keyed by series number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesIndex {
    series: BTreeMap<u32, DicomSeries>,
}

impl SeriesIndex {
    /// Groups records by series number. The first record seen for a series
    /// provides its display description.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ImageRecord>,
    {
        let mut groups: BTreeMap<u32, Vec<ImageRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.series_number).or_default().push(record);
        }
        let index = Self {
            series: groups
                .into_iter()
                .filter_map(|(number, group)| Some((number, DicomSeries::from_group(group)?)))
                .collect(),
        };
        log::debug!("Indexed {} series", index.len());
        index
    }

    pub fn insert(&mut self, record: ImageRecord) {
        match self.series.entry(record.series_number) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(DicomSeries::new(record));
            }
            btree_map::Entry::Occupied(mut slot) => {
                // Keys come from the record's own series number.
                let _ = slot.get_mut().insert(record);
            }
        }
    }

    pub fn series_numbers(&self) -> Vec<u32> {
        self.series.keys().copied().collect()
    }

    pub fn get(&self, series_number: u32) -> Option<&DicomSeries> {
        self.series.get(&series_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DicomSeries> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn image_count(&self) -> usize {
        self.series.values().map(DicomSeries::image_count).sum()
    }

    pub fn into_series(self) -> BTreeMap<u32, DicomSeries> {
        self.series
    }

    /// Recomputes the summary of `series` from its records and ROI store.
    pub fn summarize(
        series: &DicomSeries,
        resolver: &RoiResolver,
    ) -> Result<SeriesSummary, RoiError> {
        let slice_count = series.slice_count();
        if slice_count == 0 {
            log::info!(
                "Series {} has images without a slice location; reporting 0 slices",
                series.series_number()
            );
        }
        let roi_histogram = resolver.histogram(series)?;
        let roi_tags = roi_histogram.keys().cloned().collect();

        Ok(SeriesSummary {
            series_number: series.series_number(),
            description: series.description().to_string(),
            image_count: series.image_count(),
            slice_count,
            echo_times: series.echo_times(),
            roi_histogram,
            roi_tags,
        })
    }

    /// Fresh summary for one series, e.g. after its ROI store was saved.
    pub fn update(
        &self,
        series_number: u32,
        resolver: &RoiResolver,
    ) -> Option<Result<SeriesSummary, RoiError>> {
        self.get(series_number)
            .map(|series| Self::summarize(series, resolver))
    }

    /// Summaries of every series in series-number order.
    pub fn summaries(&self, resolver: &RoiResolver) -> Result<Vec<SeriesSummary>, RoiError> {
        self.iter()
            .map(|series| Self::summarize(series, resolver))
            .collect()
    }
}

impl IntoIterator for SeriesIndex {
    type Item = (u32, DicomSeries);
    type IntoIter = btree_map::IntoIter<u32, DicomSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.into_iter()
    }
}
