use super::{fit, FitResult};
use crate::config::FitSettings;
use crate::error::StackError;
use crate::model::DicomSeries;
use crate::pixel_pipeline::SignalStackPipeline;

/// R2* map of one multi-echo series.
#[derive(Debug, Clone, PartialEq)]
pub struct R2StarMap {
    pub series_number: u32,
    /// Seconds, ascending.
    pub echo_times: Vec<f64>,
    /// Rates in 1/s over `[slices, rows, columns]`.
    pub result: FitResult,
}

/// Decodes every image of `series` and fits R2* per voxel.
///
/// Header echo times are milliseconds; they are converted to seconds before
/// fitting so the rates come out in 1/s.
pub fn r2star_map(series: &DicomSeries, settings: &FitSettings) -> Result<R2StarMap, StackError> {
    let assembled = SignalStackPipeline::assemble(series)?;
    let echo_times: Vec<f64> = assembled
        .echo_times_ms
        .iter()
        .map(|echo_time| echo_time / 1000.0)
        .collect();
    let result = fit(&echo_times, &assembled.stack, settings)?;
    log::info!(
        "R2* map for series {}: {} of {} voxels fitted",
        series.series_number(),
        result.valid_count(),
        result.len()
    );
    Ok(R2StarMap {
        series_number: series.series_number(),
        echo_times,
        result,
    })
}
