use crate::model::{DicomSeries, SeriesSummary};
use std::collections::BTreeMap;

const MAX_DESCRIPTION_LEN: usize = 40;

/// ROI column text, e.g. `liver: 2 spleen: 1`.
pub fn roi_label(histogram: &BTreeMap<String, usize>) -> String {
    if histogram.is_empty() {
        return " ".to_string();
    }
    histogram
        .iter()
        .map(|(tag, count)| format!("{tag}: {count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Window title for a series viewer.
pub fn series_title(series: &DicomSeries) -> String {
    let first = series.first();
    format!(
        "Patient:{} Series:#{} {:?}",
        first.patient_name,
        series.series_number(),
        series.description()
    )
}

/// One row of the series table: number, description, slices, images, ROIs.
pub fn summary_row(summary: &SeriesSummary) -> String {
    format!(
        "{:>6}  {:<width$}  {:>6}  {:>6}  {}",
        summary.series_number,
        truncate(&summary.description, MAX_DESCRIPTION_LEN),
        summary.slice_count,
        summary.image_count,
        roi_label(&summary.roi_histogram),
        width = MAX_DESCRIPTION_LEN
    )
}

pub fn summary_header() -> String {
    format!(
        "{:>6}  {:<width$}  {:>6}  {:>6}  {}",
        "Series",
        "Description",
        "Slices",
        "Images",
        "ROIs",
        width = MAX_DESCRIPTION_LEN
    )
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        let mut truncated = text.chars().take(max_len - 1).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageRecord;

    #[test]
    fn roi_label_lists_tags_in_order() {
        let mut histogram = BTreeMap::new();
        histogram.insert("spleen".to_string(), 1);
        histogram.insert("liver".to_string(), 2);
        assert_eq!(roi_label(&histogram), "liver: 2 spleen: 1");
        assert_eq!(roi_label(&BTreeMap::new()), " ");
    }

    #[test]
    fn title_names_patient_and_series() {
        let mut record = ImageRecord::new("/data/a.dcm", 7).with_description("BOLD");
        record.patient_name = "DOE^JANE".to_string();
        let series = DicomSeries::new(record);
        assert_eq!(series_title(&series), "Patient:DOE^JANE Series:#7 \"BOLD\"");
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "x".repeat(60);
        let shortened = truncate(&long, MAX_DESCRIPTION_LEN);
        assert_eq!(shortened.chars().count(), MAX_DESCRIPTION_LEN);
        assert!(shortened.ends_with('…'));
        assert_eq!(truncate("short", MAX_DESCRIPTION_LEN), "short");
    }
}
