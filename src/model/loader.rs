use super::ImageRecord;
use crate::error::RecordParseError;
use dicom::dictionary_std::tags;
use dicom::object::{DefaultDicomObject, OpenFileOptions};
use std::path::Path;

/// Parses the header of one file into an [`ImageRecord`].
///
/// Reading stops at Pixel Data, so this stays cheap for large images.
pub fn load_record(path: &Path) -> Result<ImageRecord, RecordParseError> {
    log::debug!("Reading DICOM header: {}", path.display());
    let object = OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .open_file(path)
        .map_err(|err| RecordParseError::Open {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let series_number = attribute_int(&object, "SeriesNumber")
        .and_then(|number| u32::try_from(number).ok())
        .ok_or_else(|| RecordParseError::MissingAttribute {
            path: path.to_path_buf(),
            attribute: "SeriesNumber",
        })?;

    let acquisition_time = match (
        attribute_text(&object, "AcquisitionDate"),
        attribute_text(&object, "AcquisitionTime"),
    ) {
        (Some(date), Some(time)) => Some(format!("{date}{time}")),
        (date, time) => date.or(time),
    };

    Ok(ImageRecord {
        file_path: path.to_path_buf(),
        series_number,
        series_description: attribute_text(&object, "SeriesDescription").unwrap_or_default(),
        slice_location: attribute_float(&object, "SliceLocation"),
        echo_time: attribute_float(&object, "EchoTime"),
        instance_number: attribute_int(&object, "InstanceNumber")
            .and_then(|number| i32::try_from(number).ok()),
        patient_id: attribute_text(&object, "PatientID").unwrap_or_else(|| "Unknown".to_string()),
        patient_name: attribute_text(&object, "PatientName")
            .unwrap_or_else(|| "Unknown".to_string()),
        acquisition_time,
    })
}

fn attribute_text(object: &DefaultDicomObject, name: &str) -> Option<String> {
    object
        .element_by_name(name)
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn attribute_float(object: &DefaultDicomObject, name: &str) -> Option<f64> {
    object
        .element_by_name(name)
        .ok()
        .and_then(|element| element.to_float64().ok())
        .filter(|value| value.is_finite())
}

fn attribute_int(object: &DefaultDicomObject, name: &str) -> Option<i64> {
    object
        .element_by_name(name)
        .ok()
        .and_then(|element| element.to_int::<i64>().ok())
}
