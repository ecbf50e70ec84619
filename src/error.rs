use std::fmt;

/// `name = value` pairs attached to an error so that the offending configuration is visible
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ParameterValues(pub Vec<(String, f64)>);

impl ParameterValues {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value))
                .collect(),
        )
    }
}

impl fmt::Display for ParameterValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

/// Error returned from transit model evaluation
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ModelError {
    #[error("invalid geometry: {reason} ({values})")]
    InvalidGeometry {
        reason: &'static str,
        values: ParameterValues,
    },

    #[error("model {model} requires parameter {name:?}, which is missing")]
    MissingParameter { model: &'static str, name: String },
}

impl ModelError {
    pub(crate) fn geometry<'a>(
        reason: &'static str,
        values: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Self {
        Self::InvalidGeometry {
            reason,
            values: ParameterValues::new(values),
        }
    }
}

/// Error returned from [crate::Parameters] manipulation
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParameterError {
    #[error("invalid bounds [{low}, {high}] for parameter {name:?} with value {value}")]
    InvalidBounds {
        name: String,
        value: f64,
        low: f64,
        high: f64,
    },

    #[error("unknown parameter {name:?}")]
    UnknownParameter { name: String },

    #[error("parameter {name:?} is given more than once")]
    DuplicateParameter { name: String },
}

/// Error returned from [crate::LightCurve] construction and derived operations
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LightCurveError {
    #[error("time, flux and flux_err must have the same length, got {time}, {flux} and {flux_err}")]
    LengthMismatch {
        time: usize,
        flux: usize,
        flux_err: usize,
    },

    #[error("light curve is empty")]
    Empty,

    #[error("flux uncertainty must be non-negative, flux_err[{index}] = {value}")]
    NegativeUncertainty { index: usize, value: f64 },

    #[error("time must be finite and non-decreasing, time[{index}] = {value}")]
    UnsortedTime { index: usize, value: f64 },

    #[error("cannot normalize by median flux {median}")]
    InvalidMedian { median: f64 },

    #[error("fold period must be positive and finite, period = {period}")]
    InvalidPeriod { period: f64 },

    #[error("relative time axis cannot be converted to an absolute epoch system")]
    RelativeTime,
}

/// Error returned from curve fit algorithms
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FitError {
    #[error("{algorithm} found no feasible parameters: {reason} (free parameters: {values})")]
    Infeasible {
        algorithm: &'static str,
        values: ParameterValues,
        reason: String,
    },

    #[error("no free parameters to fit")]
    NoFreeParameters,

    #[error("flux_err[{index}] = 0 at time {time}, standardized residuals are undefined")]
    ZeroUncertainty { index: usize, time: f64 },

    #[error("invalid {algorithm} settings: {reason}")]
    InvalidSettings {
        algorithm: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    LightCurve(#[from] LightCurveError),
}

/// Error returned from aperture photometry and centroiding
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PhotometryError {
    #[error("aperture {name:?} radius must be positive and finite, radius = {radius}")]
    InvalidRadius { name: String, radius: f64 },

    #[error("aperture {name:?} background annulus [{inner}, {outer}] is invalid")]
    InvalidAnnulus {
        name: String,
        inner: f64,
        outer: f64,
    },

    #[error("aperture {name:?} named more than once")]
    DuplicateAperture { name: String },

    #[error("aperture {name:?} doesn't exist")]
    UnknownAperture { name: String },

    #[error("no pixels fall into the region around ({x}, {y})")]
    EmptyRegion { x: f64, y: f64 },
}

/// Error returned from light curve and image simulations
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SimulationError {
    #[error("{name} must be positive and finite, {name} = {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("expected photon count must be positive and finite, got {expected} at time {time}")]
    InvalidExpectation { time: f64, expected: f64 },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    LightCurve(#[from] LightCurveError),
}
