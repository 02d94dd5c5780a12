//! Threshold-gated log-linear R2* fit.
//!
//! For every location independently, echoes whose signal does not exceed the
//! intensity threshold are dropped and the rest are fitted with ordinary least
//! squares:
//!
//! ```text
//! ln S(t) = ln S0 - R2* t
//! ```
//!
//! Echo times are used in whatever unit the caller passes; R2* comes back in
//! the reciprocal unit.

use super::SignalStack;
use crate::config::FitSettings;
use crate::error::FitError;
use rayon::prelude::*;

/// Why a location has no estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Fewer than two echoes exceeded the threshold.
    InsufficientSamples { retained: usize },
    /// The fitted slope was rising, which is not a decay.
    NegativeRate,
    /// Every retained echo shares one echo time.
    Degenerate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationFit {
    Fitted { rate: f64, amplitude: f64 },
    Rejected(Rejection),
}

/// Per-location estimates of one [`fit`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    spatial_shape: Vec<usize>,
    locations: Vec<LocationFit>,
}

impl FitResult {
    pub fn spatial_shape(&self) -> &[usize] {
        &self.spatial_shape
    }

    pub fn locations(&self) -> &[LocationFit] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// False for rejected and out-of-range locations.
    pub fn is_valid(&self, location: usize) -> bool {
        matches!(self.locations.get(location), Some(LocationFit::Fitted { .. }))
    }

    pub fn rate(&self, location: usize) -> Option<f64> {
        match self.locations.get(location)? {
            LocationFit::Fitted { rate, .. } => Some(*rate),
            LocationFit::Rejected(_) => None,
        }
    }

    pub fn amplitude(&self, location: usize) -> Option<f64> {
        match self.locations.get(location)? {
            LocationFit::Fitted { amplitude, .. } => Some(*amplitude),
            LocationFit::Rejected(_) => None,
        }
    }

    pub fn valid_count(&self) -> usize {
        self.locations
            .iter()
            .filter(|fit| matches!(fit, LocationFit::Fitted { .. }))
            .count()
    }

    pub fn valid_mask(&self) -> Vec<bool> {
        (0..self.len()).map(|location| self.is_valid(location)).collect()
    }

    /// Dense rate map with `fill` at rejected locations, for display.
    pub fn rate_map(&self, fill: f64) -> Vec<f64> {
        (0..self.len())
            .map(|location| self.rate(location).unwrap_or(fill))
            .collect()
    }
}

/// Fits R2* at every location of `stack`.
pub fn fit(
    echo_times: &[f64],
    stack: &SignalStack,
    settings: &FitSettings,
) -> Result<FitResult, FitError> {
    if echo_times.len() != stack.echoes() {
        return Err(FitError::EchoCountMismatch {
            times: echo_times.len(),
            echoes: stack.echoes(),
        });
    }
    for (index, &value) in echo_times.iter().enumerate() {
        if !value.is_finite() {
            return Err(FitError::NonFiniteEchoTime { index });
        }
        if value < 0.0 {
            return Err(FitError::NegativeEchoTime { index, value });
        }
    }
    let threshold = settings.threshold();

    let locations: Vec<LocationFit> = (0..stack.locations())
        .into_par_iter()
        .map(|location| {
            let retained: Vec<(f64, f64)> = echo_times
                .iter()
                .enumerate()
                .map(|(echo, &time)| (time, stack.sample(echo, location)))
                .filter(|&(_, signal)| signal.is_finite() && signal > threshold)
                .map(|(time, signal)| (time, signal.ln()))
                .collect();
            fit_location(&retained)
        })
        .collect();

    let rejected = locations.len()
        - locations
            .iter()
            .filter(|fit| matches!(fit, LocationFit::Fitted { .. }))
            .count();
    log::debug!(
        "R2* fit over {} locations, {} rejected (threshold {threshold})",
        locations.len(),
        rejected
    );

    Ok(FitResult {
        spatial_shape: stack.spatial_shape().to_vec(),
        locations,
    })
}

fn fit_location(points: &[(f64, f64)]) -> LocationFit {
    if points.len() < 2 {
        return LocationFit::Rejected(Rejection::InsufficientSamples {
            retained: points.len(),
        });
    }
    let first_time = points[0].0;
    if points.iter().all(|&(time, _)| time == first_time) {
        return LocationFit::Rejected(Rejection::Degenerate);
    }

    let n = points.len() as f64;
    let mean_t = points.iter().map(|&(t, _)| t).sum::<f64>() / n;
    let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for &(t, y) in points {
        let dt = t - mean_t;
        sxx += dt * dt;
        sxy += dt * (y - mean_y);
    }
    if sxx <= 0.0 {
        return LocationFit::Rejected(Rejection::Degenerate);
    }

    let slope = sxy / sxx;
    let rate = -slope;
    let amplitude = (mean_y - slope * mean_t).exp();
    if !rate.is_finite() || !amplitude.is_finite() {
        return LocationFit::Rejected(Rejection::Degenerate);
    }
    if rate < 0.0 {
        return LocationFit::Rejected(Rejection::NegativeRate);
    }

    LocationFit::Fitted {
        // Folds -0.0 from flat signals into 0.0.
        rate: rate + 0.0,
        amplitude,
    }
}
