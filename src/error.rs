use std::fmt::{self, Debug, Display};
use std::io;

/// Errors from the risk models, plus the I/O, JSON and CSV errors of their loaders.
///
/// Every variant is fatal for the calculation that produced it. Recoverable
/// substitutions are reported as [`crate::imputation::Imputation`]s instead.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum RiskError {
    /// The room identifier has no row in the registry.
    RoomNotFound(String),
    /// A registry field could not be parsed.
    DataFormat(String),
    /// An activity label or activity pairing with no table entry.
    UnknownActivity(String),
    /// A non-physical input, e.g. negative exposure time or `n_max <= 1`.
    InvalidParameter(String),
    /// A root search that failed to bracket or converge.
    NumericalError(String),
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
}

impl From<io::Error> for RiskError {
    fn from(error: io::Error) -> Self {
        RiskError::IoError(error)
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(error: serde_json::Error) -> Self {
        RiskError::JsonError(error)
    }
}

impl From<csv::Error> for RiskError {
    fn from(error: csv::Error) -> Self {
        RiskError::CSVError(error)
    }
}

impl std::error::Error for RiskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RiskError::IoError(e) => Some(e),
            RiskError::JsonError(e) => Some(e),
            RiskError::CSVError(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for RiskError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RiskError::RoomNotFound(room) => write!(f, "room not found: {room}"),
            RiskError::DataFormat(msg) => write!(f, "malformed room data: {msg}"),
            RiskError::UnknownActivity(msg) => write!(f, "unknown activity: {msg}"),
            RiskError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            RiskError::NumericalError(msg) => write!(f, "numerical failure: {msg}"),
            RiskError::IoError(e) => write!(f, "I/O error: {e}"),
            RiskError::JsonError(e) => write!(f, "JSON error: {e}"),
            RiskError::CSVError(e) => write!(f, "CSV error: {e}"),
        }
    }
}

/// Returns `Err(InvalidParameter)` unless `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64, RiskError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(RiskError::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}

/// Returns `Err(InvalidParameter)` unless `value` is finite and non-negative.
pub(crate) fn require_non_negative(name: &str, value: f64) -> Result<f64, RiskError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(RiskError::InvalidParameter(format!(
            "{name} must be finite and >= 0, got {value}"
        )))
    }
}
