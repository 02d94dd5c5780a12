use std::cmp::Ordering;
use std::path::PathBuf;

/// Header fields of one acquired image, as read by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub file_path: PathBuf,
    pub series_number: u32,
    pub series_description: String,
    pub slice_location: Option<f64>,
    /// Milliseconds, as stored in the header.
    pub echo_time: Option<f64>,
    pub instance_number: Option<i32>,
    pub patient_id: String,
    pub patient_name: String,
    pub acquisition_time: Option<String>,
}

impl ImageRecord {
    pub fn new(file_path: impl Into<PathBuf>, series_number: u32) -> Self {
        Self {
            file_path: file_path.into(),
            series_number,
            series_description: String::new(),
            slice_location: None,
            echo_time: None,
            instance_number: None,
            patient_id: "Unknown".to_string(),
            patient_name: "Unknown".to_string(),
            acquisition_time: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.series_description = description.into();
        self
    }

    pub fn with_slice_location(mut self, location: f64) -> Self {
        self.slice_location = Some(location);
        self
    }

    pub fn with_echo_time(mut self, echo_time_ms: f64) -> Self {
        self.echo_time = Some(echo_time_ms);
        self
    }

    pub fn with_instance_number(mut self, number: i32) -> Self {
        self.instance_number = Some(number);
        self
    }

    /// Total order used to lay records out inside a series.
    pub(crate) fn ordering_key_cmp(&self, other: &Self) -> Ordering {
        cmp_optional_f64(self.slice_location, other.slice_location)
            .then_with(|| cmp_optional_f64(self.echo_time, other.echo_time))
            .then_with(|| self.instance_number.cmp(&other.instance_number))
            .then_with(|| self.file_path.cmp(&other.file_path))
    }
}

fn cmp_optional_f64(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
