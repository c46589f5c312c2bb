//! Error types for the arrangement layout stage

use thiserror::Error;

use super::solver::SolverError;

/// Errors that reject a whole arrangement request before any oracle call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Source or target frame with a non-positive or non-finite dimension
    #[error("invalid {frame} frame {width}x{height}: dimensions must be positive")]
    InvalidFrame {
        frame: &'static str,
        width: f64,
        height: f64,
    },

    /// Constraint solver error
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),
}

impl LayoutError {
    /// Create an invalid frame error
    pub fn invalid_frame(frame: &'static str, width: f64, height: f64) -> Self {
        Self::InvalidFrame {
            frame,
            width,
            height,
        }
    }
}
