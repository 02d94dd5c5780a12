use crate::error::StackError;
use crate::fit::SignalStack;
use crate::model::{DicomSeries, ImageRecord};
use dicom::object::open_file;
use dicom::pixeldata::{DecodedPixelData, PixelDecoder};
use std::collections::BTreeMap;
use std::path::Path;

/// First frame of one image as rescaled intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub rows: u32,
    pub columns: u32,
    pub samples: Vec<f64>,
}

/// A series arranged for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledStack {
    /// Milliseconds, ascending; one per stack echo.
    pub echo_times_ms: Vec<f64>,
    /// Ascending; empty when the series has no slice locations.
    pub slice_locations: Vec<f64>,
    /// `[echoes, slices, rows, columns]`.
    pub stack: SignalStack,
}

pub struct SignalStackPipeline;

impl SignalStackPipeline {
    /// Decodes the first frame of the image at `path`.
    pub fn read_frame(path: &Path) -> Result<Frame, StackError> {
        let pixel_error = |message: String| StackError::Pixels {
            path: path.to_path_buf(),
            message,
        };
        let object = open_file(path)
            .map_err(|err| pixel_error(format!("failed to open DICOM file ({err})")))?;
        let decoded = object
            .decode_pixel_data()
            .map_err(|err| pixel_error(format!("failed to decode pixel data: {err}")))?;

        if decoded.number_of_frames() == 0 {
            return Err(pixel_error("no frames available".to_string()));
        }
        if !decoded.photometric_interpretation().is_monochrome() {
            return Err(pixel_error(format!(
                "unsupported photometric interpretation `{}`",
                decoded.photometric_interpretation().as_str()
            )));
        }

        let samples = Self::monochrome_samples(&decoded, 0).map_err(pixel_error)?;
        Ok(Frame {
            rows: decoded.rows(),
            columns: decoded.columns(),
            samples,
        })
    }

    /// Samples of one frame with the modality rescale applied.
    fn monochrome_samples(
        decoded: &DecodedPixelData<'_>,
        frame_idx: u32,
    ) -> Result<Vec<f64>, String> {
        decoded
            .to_vec_frame::<f64>(frame_idx)
            .map_err(|err| format!("Failed to materialize frame data: {err}"))
    }

    /// Arranges every image of `series` into an echo-major stack.
    ///
    /// Each (echo time, slice location) pair must be covered by exactly one
    /// image. A series without slice locations is treated as one slice.
    pub fn assemble(series: &DicomSeries) -> Result<AssembledStack, StackError> {
        let number = series.series_number();
        if series.records().iter().any(|r| r.echo_time.is_none()) {
            return Err(StackError::MissingEchoTime(number));
        }
        let echo_times_ms = series.echo_times();
        let slice_locations = series.slice_locations().unwrap_or_default();
        let slots = slice_locations.len().max(1);

        let mut grid: BTreeMap<(usize, usize), Vec<&ImageRecord>> = BTreeMap::new();
        for record in series.records() {
            let echo = position_of(&echo_times_ms, record.echo_time);
            let slice = if slice_locations.is_empty() {
                Some(0)
            } else {
                position_of(&slice_locations, record.slice_location)
            };
            if let (Some(echo), Some(slice)) = (echo, slice) {
                grid.entry((echo, slice)).or_default().push(record);
            }
        }

        let mut shape: Option<(u32, u32)> = None;
        let mut samples = Vec::new();
        for (echo, &echo_time) in echo_times_ms.iter().enumerate() {
            for slice in 0..slots {
                let record = match grid.get(&(echo, slice)).map(Vec::as_slice) {
                    Some([record]) => *record,
                    other => {
                        return Err(StackError::IncompleteGrid {
                            series: number,
                            echo_time,
                            slice,
                            found: other.map_or(0, <[_]>::len),
                        })
                    }
                };

                let frame = Self::read_frame(&record.file_path)?;
                let found = (frame.rows, frame.columns);
                let expected = *shape.get_or_insert(found);
                if found != expected {
                    return Err(StackError::FrameSize {
                        path: record.file_path.clone(),
                        expected,
                        found,
                    });
                }
                samples.extend(frame.samples);
            }
        }

        let (rows, columns) = shape.unwrap_or((0, 0));
        let stack = SignalStack::new(
            echo_times_ms.len(),
            vec![slots, rows as usize, columns as usize],
            samples,
        )?;
        log::debug!(
            "Assembled series {number}: {} echoes x {slots} slices x {rows}x{columns}",
            echo_times_ms.len()
        );
        Ok(AssembledStack {
            echo_times_ms,
            slice_locations,
            stack,
        })
    }
}

fn position_of(values: &[f64], value: Option<f64>) -> Option<usize> {
    let value = value?;
    values.iter().position(|candidate| *candidate == value)
}
