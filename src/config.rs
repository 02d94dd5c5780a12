use crate::cancellation::CancellationToken;
use crate::error::FitError;

/// Signal intensity below which an echo is treated as noise floor.
pub const DEFAULT_R2STAR_THRESHOLD: f64 = 30.0;

/// Environment variable overriding [`DEFAULT_R2STAR_THRESHOLD`].
pub const THRESHOLD_ENV_VAR: &str = "DCMVIEWER_R2STAR_THRESHOLD";

/// Experiment-level settings for the R2* fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSettings {
    threshold: f64,
}

impl FitSettings {
    pub fn new(threshold: f64) -> Result<Self, FitError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(FitError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    /// Reads the threshold from [`THRESHOLD_ENV_VAR`], falling back to the
    /// default when unset. A set but invalid value is an error.
    pub fn from_env() -> Result<Self, FitError> {
        match std::env::var(THRESHOLD_ENV_VAR) {
            Ok(raw) => match raw.trim().parse::<f64>() {
                Ok(threshold) => Self::new(threshold),
                Err(_) => Err(FitError::UnparsableThreshold(raw)),
            },
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_R2STAR_THRESHOLD,
        }
    }
}

/// Options for one directory scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub follow_links: bool,
    pub cancellation: CancellationToken,
}

impl ScanOptions {
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_thresholds() {
        assert_eq!(FitSettings::new(0.0), Err(FitError::InvalidThreshold(0.0)));
        assert!(FitSettings::new(-1.0).is_err());
        assert!(FitSettings::new(f64::INFINITY).is_err());
        assert!(FitSettings::new(f64::NAN).is_err());
        assert_eq!(FitSettings::new(12.5).unwrap().threshold(), 12.5);
    }

    #[test]
    fn default_uses_experiment_constant() {
        assert_eq!(FitSettings::default().threshold(), DEFAULT_R2STAR_THRESHOLD);
    }

    // The only test touching the variable, so it cannot race another test.
    #[test]
    fn env_override_keeps_the_raw_text_on_error() {
        std::env::set_var(THRESHOLD_ENV_VAR, "forty");
        assert_eq!(
            FitSettings::from_env(),
            Err(FitError::UnparsableThreshold("forty".to_string()))
        );

        std::env::set_var(THRESHOLD_ENV_VAR, " 45.5 ");
        assert_eq!(FitSettings::from_env().unwrap().threshold(), 45.5);

        std::env::set_var(THRESHOLD_ENV_VAR, "-3");
        assert_eq!(FitSettings::from_env(), Err(FitError::InvalidThreshold(-3.0)));

        std::env::remove_var(THRESHOLD_ENV_VAR);
        assert_eq!(FitSettings::from_env(), Ok(FitSettings::default()));
    }
}
