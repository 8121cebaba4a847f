use thiserror::Error;
use vsearch_core::Key;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("aperture radius {radius} must exceed margin {margin} plus line length {length}")]
    ApertureTooSmall { radius: f64, margin: f64, length: f64 },
    #[error("oblique angle {0} must be within [0, 90] degrees")]
    ObliqueAngleOutOfRange(f64),
    #[error("yes and no responses are both mapped to {0}")]
    AmbiguousKeys(Key),
    #[error("{0} is reserved for aborting the run")]
    ReservedKey(Key),
    #[error("design dimension `{0}` has no values")]
    EmptyDimension(&'static str),
    #[error("{total} trials cannot cover all {conditions} conditions once")]
    TooFewTrials { total: usize, conditions: usize },
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of the display/input collaborator.
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("display closed")]
    DisplayClosed,
    #[error("input closed")]
    InputClosed,
}

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Frontend(#[from] FrontendError),
    #[error("results log: {0}")]
    Io(#[from] std::io::Error),
    #[error("summary: {0}")]
    Json(#[from] serde_json::Error),
}
