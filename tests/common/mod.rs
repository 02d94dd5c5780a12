#![allow(dead_code)]

use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::dictionary_std::{tags, uids};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use std::fs;
use std::path::{Path, PathBuf};

/// Attributes of one synthetic MR image.
#[derive(Debug, Clone)]
pub struct ImageSpec {
    pub series_number: u32,
    pub description: &'static str,
    pub instance_number: i32,
    pub echo_time_ms: Option<f64>,
    pub slice_location: Option<f64>,
    /// Rows, columns and row-major 16-bit samples.
    pub pixels: Option<(u16, u16, Vec<u16>)>,
    /// RescaleSlope and RescaleIntercept.
    pub rescale: Option<(f64, f64)>,
}

impl ImageSpec {
    pub fn new(series_number: u32, instance_number: i32) -> Self {
        Self {
            series_number,
            description: "T2* multi-echo",
            instance_number,
            echo_time_ms: None,
            slice_location: None,
            pixels: None,
            rescale: None,
        }
    }

    pub fn echo(mut self, echo_time_ms: f64) -> Self {
        self.echo_time_ms = Some(echo_time_ms);
        self
    }

    pub fn slice(mut self, location: f64) -> Self {
        self.slice_location = Some(location);
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn pixels(mut self, rows: u16, columns: u16, samples: Vec<u16>) -> Self {
        self.pixels = Some((rows, columns, samples));
        self
    }

    pub fn rescale(mut self, slope: f64, intercept: f64) -> Self {
        self.rescale = Some((slope, intercept));
        self
    }
}

fn text(value: impl Into<String>) -> PrimitiveValue {
    PrimitiveValue::from(value.into())
}

/// Writes `spec` as an Explicit VR Little Endian DICOM file at `path`.
pub fn write_image(path: &Path, spec: &ImageSpec) {
    let sop_instance_uid = format!(
        "2.25.{}{:04}{:04}",
        spec.series_number + 1,
        spec.instance_number,
        path.to_string_lossy().len()
    );

    let mut object = InMemDicomObject::new_empty();
    object.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        text(uids::MR_IMAGE_STORAGE),
    ));
    object.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        text(sop_instance_uid.clone()),
    ));
    object.put(DataElement::new(tags::PATIENT_ID, VR::LO, text("PAT-001")));
    object.put(DataElement::new(tags::PATIENT_NAME, VR::PN, text("DOE^JANE")));
    object.put(DataElement::new(tags::MODALITY, VR::CS, text("MR")));
    object.put(DataElement::new(
        tags::SERIES_NUMBER,
        VR::IS,
        text(spec.series_number.to_string()),
    ));
    object.put(DataElement::new(
        tags::SERIES_DESCRIPTION,
        VR::LO,
        text(spec.description),
    ));
    object.put(DataElement::new(
        tags::INSTANCE_NUMBER,
        VR::IS,
        text(spec.instance_number.to_string()),
    ));
    object.put(DataElement::new(tags::ACQUISITION_DATE, VR::DA, text("20240131")));
    object.put(DataElement::new(tags::ACQUISITION_TIME, VR::TM, text("101500")));
    if let Some(echo) = spec.echo_time_ms {
        object.put(DataElement::new(tags::ECHO_TIME, VR::DS, text(format!("{echo}"))));
    }
    if let Some(location) = spec.slice_location {
        object.put(DataElement::new(
            tags::SLICE_LOCATION,
            VR::DS,
            text(format!("{location}")),
        ));
    }
    if let Some((slope, intercept)) = spec.rescale {
        object.put(DataElement::new(
            tags::RESCALE_SLOPE,
            VR::DS,
            text(format!("{slope}")),
        ));
        object.put(DataElement::new(
            tags::RESCALE_INTERCEPT,
            VR::DS,
            text(format!("{intercept}")),
        ));
    }
    if let Some((rows, columns, samples)) = &spec.pixels {
        object.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(*rows)));
        object.put(DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(*columns)));
        object.put(DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)));
        object.put(DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            text("MONOCHROME2"),
        ));
        object.put(DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)));
        object.put(DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16_u16)));
        object.put(DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)));
        object.put(DataElement::new(
            tags::PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(0_u16),
        ));
        object.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(samples.clone().into()),
        ));
    }

    let file = object
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::MR_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(sop_instance_uid),
        )
        .expect("valid file meta group");
    file.write_to_file(path).expect("fixture should be writable");
}

/// Writes `count` files that are not DICOM at all.
pub fn write_corrupt_files(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("corrupt_{i:03}.dcm"));
            fs::write(&path, format!("not a dicom file #{i}")).expect("writable");
            path
        })
        .collect()
}
