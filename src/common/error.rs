//! Error types for highway_planner

use thiserror::Error;

/// Main error type for the planning pipeline
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Trajectory horizon was zero or negative
    #[error("Invalid duration: {0} (must be strictly positive)")]
    InvalidDuration(f64),
    /// Not enough (or inconsistent) samples to fit or resample a curve
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
    /// Reference curve could not be built from the given samples
    #[error("Invalid reference curve: {0}")]
    InvalidCurve(String),
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Map table could not be parsed
    #[error("Map parse error: {0}")]
    MapParse(#[from] csv::Error),
    /// Parameter file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    /// Logger was already installed
    #[error("Logger init error: {0}")]
    Logger(#[from] log::SetLoggerError),
    /// Visualization error
    #[error("Visualization error: {0}")]
    Visualization(String),
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::InvalidDuration(-1.0);
        assert_eq!(format!("{}", err), "Invalid duration: -1 (must be strictly positive)");

        let err = PlannerError::DegenerateInput("need at least 2 knots, got 1".to_string());
        assert_eq!(format!("{}", err), "Degenerate input: need at least 2 knots, got 1");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::Io(_)));
    }
}
