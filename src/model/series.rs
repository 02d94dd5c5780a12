use super::ImageRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Images sharing one series number, kept in acquisition-independent order.
///
/// Every derived attribute is computed from `records` on request.
#[derive(Debug, Clone, PartialEq)]
pub struct DicomSeries {
    series_number: u32,
    description: String,
    records: Vec<ImageRecord>,
}

impl DicomSeries {
    pub fn new(first: ImageRecord) -> Self {
        Self {
            series_number: first.series_number,
            description: first.series_description.clone(),
            records: vec![first],
        }
    }

    /// Builds a series from records of one series number, given in input
    /// order. The first record provides the description; `None` when empty.
    pub(crate) fn from_group(mut records: Vec<ImageRecord>) -> Option<Self> {
        let first = records.first()?;
        let series_number = first.series_number;
        let description = first.series_description.clone();
        debug_assert!(records.iter().all(|r| r.series_number == series_number));
        records.sort_by(ImageRecord::ordering_key_cmp);
        Some(Self {
            series_number,
            description,
            records,
        })
    }

    /// Adds a record, keeping the series ordering. Records of another series
    /// are handed back untouched.
    pub fn insert(&mut self, record: ImageRecord) -> Result<(), ImageRecord> {
        if record.series_number != self.series_number {
            return Err(record);
        }
        let position = self
            .records
            .partition_point(|existing| existing.ordering_key_cmp(&record).is_le());
        self.records.insert(position, record);
        Ok(())
    }

    pub fn series_number(&self) -> u32 {
        self.series_number
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn first(&self) -> &ImageRecord {
        &self.records[0]
    }

    pub fn image_count(&self) -> usize {
        self.records.len()
    }

    /// Distinct slice locations, or zero when any image lacks one.
    pub fn slice_count(&self) -> usize {
        self.slice_locations().map_or(0, |locations| locations.len())
    }

    /// Sorted distinct slice locations; `None` if any member has no location.
    pub fn slice_locations(&self) -> Option<Vec<f64>> {
        let mut distinct = BTreeSet::new();
        for record in &self.records {
            distinct.insert(OrderedValue::new(record.slice_location?));
        }
        Some(distinct.into_iter().map(OrderedValue::get).collect())
    }

    /// Sorted distinct echo times in milliseconds. Images without an echo
    /// time are ignored.
    pub fn echo_times(&self) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|record| record.echo_time)
            .map(OrderedValue::new)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(OrderedValue::get)
            .collect()
    }
}

/// Read-only projection of a series handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub series_number: u32,
    pub description: String,
    pub image_count: usize,
    pub slice_count: usize,
    pub echo_times: Vec<f64>,
    pub roi_histogram: BTreeMap<String, usize>,
    pub roi_tags: Vec<String>,
}

/// `f64` wrapper with a total order, with `-0.0` folded into `0.0`.
#[derive(Debug, Clone, Copy)]
struct OrderedValue(f64);

impl OrderedValue {
    fn new(value: f64) -> Self {
        Self(if value == 0.0 { 0.0 } else { value })
    }

    fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for OrderedValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for OrderedValue {}

impl PartialOrd for OrderedValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, slice: Option<f64>, echo: f64) -> ImageRecord {
        let mut record = ImageRecord::new(path, 4).with_echo_time(echo);
        record.slice_location = slice;
        record
    }

    #[test]
    fn derived_attributes_follow_membership() {
        let mut series = DicomSeries::new(record("a.dcm", Some(1.0), 10.0));
        series.insert(record("b.dcm", Some(2.0), 10.0)).unwrap();
        series.insert(record("c.dcm", Some(1.0), 20.0)).unwrap();

        assert_eq!(series.image_count(), 3);
        assert_eq!(series.slice_count(), 2);
        assert_eq!(series.echo_times(), vec![10.0, 20.0]);

        series.insert(record("d.dcm", None, 30.0)).unwrap();
        assert_eq!(series.image_count(), 4);
        assert_eq!(series.slice_count(), 0);
        assert_eq!(series.echo_times(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn insert_rejects_foreign_series() {
        let mut series = DicomSeries::new(record("a.dcm", None, 5.0));
        let stranger = ImageRecord::new("z.dcm", 9);
        assert_eq!(series.insert(stranger.clone()), Err(stranger));
        assert_eq!(series.image_count(), 1);
    }

    #[test]
    fn records_are_ordered_by_slice_then_echo() {
        let mut series = DicomSeries::new(record("late.dcm", Some(2.0), 20.0));
        series.insert(record("early.dcm", Some(1.0), 20.0)).unwrap();
        series.insert(record("first.dcm", Some(1.0), 10.0)).unwrap();

        let paths: Vec<_> = series
            .records()
            .iter()
            .map(|record| record.file_path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(paths, vec!["first.dcm", "early.dcm", "late.dcm"]);
    }

    #[test]
    fn grouped_build_matches_incremental_inserts() {
        let records: Vec<ImageRecord> = (0..50)
            .rev()
            .map(|i| {
                record(
                    &format!("{i:02}.dcm"),
                    Some(f64::from(i % 5)),
                    f64::from(i % 3),
                )
                .with_description(format!("first seen {i}"))
            })
            .collect();

        let mut incremental = DicomSeries::new(records[0].clone());
        for record in records[1..].iter().cloned() {
            incremental.insert(record).unwrap();
        }
        let grouped = DicomSeries::from_group(records).unwrap();

        assert_eq!(grouped, incremental);
        assert_eq!(grouped.description(), "first seen 49");
        assert_eq!(DicomSeries::from_group(Vec::new()), None);
    }

    #[test]
    fn negative_zero_slice_counts_once() {
        let mut series = DicomSeries::new(record("a.dcm", Some(0.0), 1.0));
        series.insert(record("b.dcm", Some(-0.0), 2.0)).unwrap();
        assert_eq!(series.slice_count(), 1);
    }
}
