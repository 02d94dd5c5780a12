use crate::error::FitError;

/// Multi-echo samples laid out echo-major: `[echoes, ...spatial]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalStack {
    echoes: usize,
    spatial_shape: Vec<usize>,
    samples: Vec<f64>,
}

impl SignalStack {
    pub fn new(
        echoes: usize,
        spatial_shape: Vec<usize>,
        samples: Vec<f64>,
    ) -> Result<Self, FitError> {
        let locations: usize = spatial_shape.iter().product();
        let expected = echoes * locations;
        if samples.len() != expected {
            let mut shape = vec![echoes];
            shape.extend_from_slice(&spatial_shape);
            return Err(FitError::ShapeMismatch {
                shape,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            echoes,
            spatial_shape,
            samples,
        })
    }

    /// Builds a stack from one flat image per echo.
    pub fn from_echo_images(
        images: Vec<Vec<f64>>,
        spatial_shape: Vec<usize>,
    ) -> Result<Self, FitError> {
        let echoes = images.len();
        let samples = images.into_iter().flatten().collect();
        Self::new(echoes, spatial_shape, samples)
    }

    pub fn echoes(&self) -> usize {
        self.echoes
    }

    pub fn spatial_shape(&self) -> &[usize] {
        &self.spatial_shape
    }

    pub fn locations(&self) -> usize {
        self.spatial_shape.iter().product()
    }

    pub fn sample(&self, echo: usize, location: usize) -> f64 {
        self.samples[echo * self.locations() + location]
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}
