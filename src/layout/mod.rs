//! Geometry side of the arrangement engine
//!
//! Normalizes suggested coordinates, reconciles suggestions with the
//! original elements, and fits each resolved box inside the target frame.

pub mod coords;
pub mod error;
pub mod matcher;
pub mod solver;
pub mod types;

pub use coords::{normalize, CoordinateError, CoordinateShape};
pub use error::LayoutError;
pub use matcher::{match_suggestions, ElementMatch, MatchKind};
pub use solver::{fit_to_frame, pin_to_frame, Correction, FitOutcome, SolverError, EPSILON};
pub use types::*;

/// Reject frames with a non-positive or non-finite dimension
pub fn validate_frame(frame: &CanvasFrame) -> Result<(), LayoutError> {
    check_dimensions("source", frame.source_width, frame.source_height)?;
    check_dimensions("target", frame.target_width, frame.target_height)
}

fn check_dimensions(name: &'static str, width: f64, height: f64) -> Result<(), LayoutError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(LayoutError::invalid_frame(name, width, height))
    }
}
