//! Error types for depth planning, measurement, and export.

use std::path::PathBuf;

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type for the integration-depth analysis pipeline.
///
/// Planning and ROI errors end the run before any measurement starts. Image,
/// integration and SNR errors are scoped to a single depth job; the sweep
/// records them and moves on. Write errors affect one output format only.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Unknown depth strategy: '{name}' (expected preset_osc, doubling, fibonacci, logarithmic or custom)")]
    DepthStrategy { name: String },

    #[error("Invalid custom depth list '{input}': {reason}")]
    CustomDepth { input: String, reason: String },

    #[error("Regions of interest unavailable: {0}")]
    RoiMissing(String),

    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("SNR undefined for {label}: {reason}")]
    Snr { label: String, reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Integration failed: {0}")]
    Integration(String),
}

impl AnalysisError {
    /// Whether this error terminates the whole run rather than a single job.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::DepthStrategy { .. }
                | AnalysisError::CustomDepth { .. }
                | AnalysisError::RoiMissing(_)
                | AnalysisError::InvalidConfig(_)
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planning_errors_are_fatal() {
        let err = AnalysisError::DepthStrategy {
            name: "quadratic".to_string(),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("quadratic"));

        let err = AnalysisError::CustomDepth {
            input: " ".to_string(),
            reason: "empty list".to_string(),
        };
        assert!(err.is_fatal());
    }

    #[test]
    fn test_job_errors_are_not_fatal() {
        let err = AnalysisError::Snr {
            label: "N24".to_string(),
            reason: "zero foreground noise".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "SNR undefined for N24: zero foreground noise");

        let err = AnalysisError::ImageNotFound(PathBuf::from("/tmp/light_001.tif"));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("light_001.tif"));
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = AnalysisError::io(
            "/out/snr_results.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("snr_results.csv"));
    }
}
