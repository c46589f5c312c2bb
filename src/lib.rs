//! Canvas Arranger - re-layout of canvas elements for a new canvas size
//!
//! This library asks a layout oracle for a new placement of each design
//! element, extracts the oracle's loosely formatted answer, reconciles it
//! with the original elements, and fits every result inside the target
//! canvas without distorting aspect ratios.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use canvas_arranger::{Arranger, CanvasFrame, Element, StaticOracle};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let oracle = Arc::new(StaticOracle::new(
//!     r#"[{"id": "logo", "new_coords": {"x": 10, "y": 10, "width": 50, "height": 50}}]"#,
//! ));
//! let elements = vec![Element::new("logo", "shape", 0.0, 0.0, 100.0, 100.0)];
//! let frame = CanvasFrame::new(1000.0, 1000.0, 400.0, 300.0);
//!
//! let arrangement = Arranger::new(oracle).arrange(&elements, &frame).await.unwrap();
//! assert_eq!(arrangement.records[0].new_coords.width, 50.0);
//! # }
//! ```

pub mod arranger;
pub mod config;
pub mod error;
pub mod layout;
pub mod oracle;
pub mod prompt;
pub mod response;

pub use arranger::{Arrangement, ArrangementSummary, Arranger};
pub use config::{ArrangerConfig, ConfigError, OracleConfig};
pub use error::ParseError;
pub use layout::{
    ArrangeRequest, ArrangementRecord, BoundingBox, CanvasFrame, Element, LayoutError,
    SuggestionRecord,
};
pub use oracle::{GeminiOracle, LayoutOracle, OracleError, StaticOracle};

use std::sync::Arc;

use thiserror::Error;

/// Errors that abort a whole arrangement request
#[derive(Debug, Error)]
pub enum ArrangeError {
    /// Invalid source or target frame
    #[error("invalid request: {0}")]
    Layout(#[from] LayoutError),

    /// The oracle failed, timed out, or returned nothing
    #[error("layout oracle unavailable: {0}")]
    OracleUnavailable(#[from] OracleError),

    /// The oracle's answer held no usable suggestion array
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// Arrange `elements` with default settings, returning one record per element
pub async fn arrange(
    oracle: Arc<dyn LayoutOracle>,
    elements: &[Element],
    frame: &CanvasFrame,
) -> Result<Vec<ArrangementRecord>, ArrangeError> {
    let arrangement = Arranger::new(oracle).arrange(elements, frame).await?;
    Ok(arrangement.records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> CanvasFrame {
        CanvasFrame::new(1000.0, 1000.0, 800.0, 600.0)
    }

    #[tokio::test]
    async fn test_arrange_simple() {
        let oracle = Arc::new(StaticOracle::new(
            r#"[{"id": "a", "new_coords": {"left": 0, "top": 0, "right": 50, "bottom": 50}}]"#,
        ));
        let elements = vec![Element::new("a", "shape", 10.0, 10.0, 20.0, 20.0)];
        let records = arrange(oracle, &elements, &frame()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].new_coords, BoundingBox::new(0.0, 0.0, 50.0, 50.0));
    }

    #[tokio::test]
    async fn test_arrange_invalid_frame() {
        let oracle = Arc::new(StaticOracle::new("[]"));
        let elements = vec![Element::new("a", "shape", 0.0, 0.0, 1.0, 1.0)];
        let result = arrange(oracle, &elements, &CanvasFrame::new(1.0, 1.0, 0.0, 1.0)).await;
        assert!(matches!(result, Err(ArrangeError::Layout(_))));
    }

    #[tokio::test]
    async fn test_arrange_unparseable() {
        let oracle = Arc::new(StaticOracle::new("Sorry, I cannot do that."));
        let elements = vec![Element::new("a", "shape", 0.0, 0.0, 1.0, 1.0)];
        let result = arrange(oracle, &elements, &frame()).await;
        assert!(matches!(result, Err(ArrangeError::Parse(_))));
    }

    #[test]
    fn test_parse_error_display_carries_excerpt() {
        let err: ArrangeError = ParseError::unparseable("nope", 0..4, "no JSON array found").into();
        assert!(err.to_string().contains("nope"));
    }
}
