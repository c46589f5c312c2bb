//! Arrangement orchestration
//!
//! Build the prompt, ask the oracle, extract its suggestions, reconcile them
//! with the input elements, and fit every resolved box inside the target
//! frame. Each input element yields exactly one record.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::ArrangerConfig;
use crate::layout::{
    fit_to_frame, match_suggestions, normalize, pin_to_frame, validate_frame, ArrangementRecord,
    CanvasFrame, CoordinateError, Element, ElementMatch, LayoutError, MatchKind, EPSILON,
};
use crate::oracle::{LayoutOracle, OracleError};
use crate::prompt::build_prompt;
use crate::response::extract_with_strategy;
use crate::ArrangeError;

/// Counters describing one finished arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrangementSummary {
    pub records: usize,
    pub rescaled: usize,
    pub fuzzy_matches: usize,
    /// Elements placed from their original coordinates
    pub fallbacks: usize,
}

/// The records of one arrangement, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Arrangement {
    pub records: Vec<ArrangementRecord>,
    pub summary: ArrangementSummary,
}

/// Runs arrangement requests against a layout oracle
#[derive(Clone)]
pub struct Arranger {
    oracle: Arc<dyn LayoutOracle>,
    timeout: Duration,
    retries: u32,
}

impl Arranger {
    pub fn new(oracle: Arc<dyn LayoutOracle>) -> Self {
        Self::from_config(oracle, &ArrangerConfig::default())
    }

    pub fn from_config(oracle: Arc<dyn LayoutOracle>, config: &ArrangerConfig) -> Self {
        Self {
            oracle,
            timeout: config.timeout(),
            retries: config.retries,
        }
    }

    /// Set the bound on a single oracle call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many times a failed oracle call is re-issued
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Arrange `elements` for the target frame.
    ///
    /// Fails as a whole on an invalid frame, an unavailable oracle, or an
    /// unparseable answer. Per-element problems become warnings instead.
    pub async fn arrange(
        &self,
        elements: &[Element],
        frame: &CanvasFrame,
    ) -> Result<Arrangement, ArrangeError> {
        validate_frame(frame)?;
        info!(
            "arranging {} elements: {}x{} -> {}x{}",
            elements.len(),
            frame.source_width,
            frame.source_height,
            frame.target_width,
            frame.target_height
        );

        if elements.is_empty() {
            return Ok(Arrangement {
                records: Vec::new(),
                summary: ArrangementSummary::default(),
            });
        }

        let prompt = build_prompt(elements, frame);
        debug!("layout prompt:\n{}", prompt);

        let response = self.ask(&prompt).await?;
        let (_, suggestions) = extract_with_strategy(&response)?;
        info!("oracle proposed {} placements", suggestions.len());

        let matches = match_suggestions(elements, &suggestions);
        let arrangement = assemble(&matches, frame)?;
        log_summary(&arrangement, frame);
        Ok(arrangement)
    }

    /// One oracle call under the timeout, re-issued on failure
    async fn ask(&self, prompt: &str) -> Result<String, OracleError> {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.oracle.suggest(prompt)).await
            {
                Ok(result) => result,
                Err(_) => Err(OracleError::Timeout(self.timeout)),
            };
            match result {
                Ok(text) => {
                    info!("oracle answered ({} bytes)", text.len());
                    debug!(
                        "oracle answer starts with: {:?}",
                        text.chars().take(50).collect::<String>()
                    );
                    return Ok(text);
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "oracle call failed ({}), retrying ({}/{})",
                        e, attempt, self.retries
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Turn matched pairs into records, applying the fallback where needed
pub fn assemble(
    matches: &[ElementMatch<'_>],
    frame: &CanvasFrame,
) -> Result<Arrangement, LayoutError> {
    let mut summary = ArrangementSummary::default();
    let mut records = Vec::with_capacity(matches.len());

    for m in matches {
        let record = resolve(m, frame, &mut summary)?;
        records.push(record);
    }
    summary.records = records.len();

    Ok(Arrangement { records, summary })
}

fn resolve(
    m: &ElementMatch<'_>,
    frame: &CanvasFrame,
    summary: &mut ArrangementSummary,
) -> Result<ArrangementRecord, LayoutError> {
    let element = m.element;
    let mut warnings = Vec::new();

    if let MatchKind::Fuzzy { suggested_id } = &m.kind {
        summary.fuzzy_matches += 1;
        warnings.push(format!(
            "matched oracle suggestion '{}' by partial id",
            suggested_id
        ));
    }

    let suggested = match m.suggestion {
        Some(suggestion) => normalize(suggestion.new_coords()),
        None => Err(CoordinateError::Missing),
    };

    if let Ok(bounds) = &suggested {
        let outcome = fit_to_frame(*bounds, frame.target_width, frame.target_height)?;
        if !outcome.is_degenerate() {
            if outcome.was_rescaled() {
                summary.rescaled += 1;
            }
            warnings.extend(outcome.warnings());
            let suggestion = m.suggestion;
            return Ok(ArrangementRecord {
                id: element.id.clone(),
                kind: element.kind.clone(),
                original_coords: element.bounds(),
                new_coords: outcome.bounds,
                scale_factor: outcome.scale_factor,
                adjustment_reason: suggestion
                    .and_then(|s| s.text("adjustment_reason"))
                    .map(str::to_string),
                quality_check: suggestion
                    .and_then(|s| s.text("quality_check"))
                    .map(str::to_string),
                warnings,
            });
        }
        warnings.extend(outcome.warnings());
    }

    // No usable suggestion: keep the original placement, made to fit.
    summary.fallbacks += 1;
    let reason = match (&m.kind, &suggested) {
        (MatchKind::Unmatched, _) => "no oracle suggestion matched this element".to_string(),
        (_, Err(e)) => format!("suggested coordinates unusable: {}", e),
        (_, Ok(_)) => "suggested size is degenerate".to_string(),
    };
    warn!("element '{}': {}; using original position", element.id, reason);
    warnings.push(format!(
        "{}; kept original position, fitted to the target canvas",
        reason
    ));

    let outcome = fit_to_frame(element.bounds(), frame.target_width, frame.target_height)?;
    if outcome.was_rescaled() {
        summary.rescaled += 1;
    }
    warnings.extend(outcome.warnings());
    let new_coords = if outcome.is_degenerate() {
        pin_to_frame(outcome.bounds, frame.target_width, frame.target_height)
    } else {
        outcome.bounds
    };

    Ok(ArrangementRecord {
        id: element.id.clone(),
        kind: element.kind.clone(),
        original_coords: element.bounds(),
        new_coords,
        scale_factor: outcome.scale_factor,
        adjustment_reason: None,
        quality_check: None,
        warnings,
    })
}

fn log_summary(arrangement: &Arrangement, frame: &CanvasFrame) {
    let summary = &arrangement.summary;
    info!(
        "arranged {} elements ({} rescaled, {} fuzzy matches, {} fallbacks)",
        summary.records, summary.rescaled, summary.fuzzy_matches, summary.fallbacks
    );

    for record in &arrangement.records {
        if record.new_coords.has_area()
            && !record
                .new_coords
                .fits_within(frame.target_width, frame.target_height, EPSILON)
        {
            warn!(
                "element '{}' still exceeds the target canvas: {:?}",
                record.id, record.new_coords
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BoundingBox, SuggestionRecord};
    use serde_json::json;

    fn frame() -> CanvasFrame {
        CanvasFrame::new(1000.0, 1000.0, 800.0, 600.0)
    }

    fn records(elements: &[Element], suggestions: &[SuggestionRecord]) -> Arrangement {
        let matches = match_suggestions(elements, suggestions);
        assemble(&matches, &frame()).unwrap()
    }

    #[test]
    fn test_matched_suggestion_is_used() {
        let elements = vec![Element::new("a", "text", 5.0, 5.0, 10.0, 10.0)];
        let suggestions = vec![SuggestionRecord::from(json!({
            "id": "a",
            "type": "shape",
            "new_coords": {"x": 100, "y": 200, "width": 50, "height": 20},
            "adjustment_reason": "centered"
        }))];
        let arrangement = records(&elements, &suggestions);
        let record = &arrangement.records[0];

        assert_eq!(record.id, "a");
        assert_eq!(record.kind, "text");
        assert_eq!(record.new_coords.x, 100.0);
        assert_eq!(record.scale_factor, 1.0);
        assert_eq!(record.adjustment_reason.as_deref(), Some("centered"));
        assert!(record.warnings.is_empty());
        assert_eq!(arrangement.summary.fallbacks, 0);
    }

    #[test]
    fn test_id_comes_from_element_not_suggestion() {
        let elements = vec![Element::new("layer_42", "shape", 0.0, 0.0, 10.0, 10.0)];
        let suggestions = vec![SuggestionRecord::from(json!({
            "id": "42",
            "new_coords": {"x": 1, "y": 1, "width": 10, "height": 10}
        }))];
        let arrangement = records(&elements, &suggestions);

        assert_eq!(arrangement.records[0].id, "layer_42");
        assert!(arrangement.records[0].warnings[0].contains("'42'"));
        assert_eq!(arrangement.summary.fuzzy_matches, 1);
    }

    #[test]
    fn test_unmatched_element_falls_back() {
        let elements = vec![Element::new("a", "shape", 900.0, -20.0, 100.0, 100.0)];
        let arrangement = records(&elements, &[]);
        let record = &arrangement.records[0];

        assert_eq!(record.new_coords.x, 700.0);
        assert_eq!(record.new_coords.y, 0.0);
        assert!(record.warnings[0].contains("no oracle suggestion matched"));
        assert_eq!(arrangement.summary.fallbacks, 1);
    }

    #[test]
    fn test_unrecognized_shape_falls_back() {
        let elements = vec![Element::new("a", "shape", 10.0, 10.0, 100.0, 100.0)];
        let suggestions = vec![SuggestionRecord::from(json!({
            "id": "a",
            "new_coords": {"cx": 1, "cy": 2}
        }))];
        let arrangement = records(&elements, &suggestions);
        let record = &arrangement.records[0];

        assert_eq!(record.new_coords, elements[0].bounds());
        assert!(record.warnings[0].contains("unrecognized coordinate shape"));
    }

    #[test]
    fn test_degenerate_suggestion_falls_back() {
        let elements = vec![Element::new("a", "shape", 10.0, 10.0, 100.0, 100.0)];
        let suggestions = vec![SuggestionRecord::from(json!({
            "id": "a",
            "new_coords": {"x": -50, "y": 0, "width": 0, "height": 10}
        }))];
        let arrangement = records(&elements, &suggestions);
        let record = &arrangement.records[0];

        assert_eq!(record.new_coords, elements[0].bounds());
        assert_eq!(record.warnings.len(), 2);
        assert!(record.warnings[1].contains("degenerate"));
    }

    #[test]
    fn test_overflowing_suggestion_falls_back() {
        let elements = vec![Element::new("a", "shape", 10.0, 10.0, 100.0, 100.0)];
        let suggestions = vec![SuggestionRecord::from(json!({
            "id": "a",
            "new_coords": {"left": -1e308, "top": 0, "right": 1e308, "bottom": 100}
        }))];
        let arrangement = records(&elements, &suggestions);
        let record = &arrangement.records[0];

        assert_eq!(record.new_coords, elements[0].bounds());
        assert_eq!(record.scale_factor, 1.0);
        assert!(record.warnings[0].contains("'width' is not finite"));
        assert_eq!(arrangement.summary.fallbacks, 1);
    }

    #[test]
    fn test_degenerate_original_is_pinned_inside() {
        let elements = vec![Element::new("rule", "shape", -40.0, 900.0, 0.0, 20.0)];
        let arrangement = records(&elements, &[]);
        let record = &arrangement.records[0];

        assert_eq!(record.new_coords, BoundingBox::new(0.0, 580.0, 0.0, 20.0));
        assert!(record.new_coords.fits_within(800.0, 600.0, EPSILON));
    }

    #[test]
    fn test_oversized_fallback_is_rescaled() {
        let elements = vec![Element::new("bg", "background", 0.0, 0.0, 1000.0, 1000.0)];
        let arrangement = records(&elements, &[]);
        let record = &arrangement.records[0];

        assert_eq!(record.scale_factor, 0.6);
        assert_eq!(record.new_coords.width, 600.0);
        assert_eq!(arrangement.summary.rescaled, 1);
    }
}
