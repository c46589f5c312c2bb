//! Core types for the arrangement engine

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// An axis-aligned box in canonical `{x, y, width, height}` form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Width divided by height, `None` when the box has no height
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height > 0.0 {
            Some(self.width / self.height)
        } else {
            None
        }
    }

    /// Whether the box has a strictly positive, finite width and height
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Check that the box lies inside `[0, width] x [0, height]`, allowing a
    /// relative tolerance of `epsilon` on the far edges
    pub fn fits_within(&self, width: f64, height: f64, epsilon: f64) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= width + epsilon * width.max(1.0)
            && self.bottom() <= height + epsilon * height.max(1.0)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Source and target dimensions of one arrangement request.
///
/// The target dimensions define the only legal output region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasFrame {
    pub source_width: f64,
    pub source_height: f64,
    pub target_width: f64,
    pub target_height: f64,
}

impl CanvasFrame {
    pub fn new(source_width: f64, source_height: f64, target_width: f64, target_height: f64) -> Self {
        Self {
            source_width,
            source_height,
            target_width,
            target_height,
        }
    }
}

/// A design element on the source canvas.
///
/// Deserialization is lenient: ids may be numbers, coordinates may be numeric
/// strings or missing, and sizes are made non-negative. Keys other than the
/// geometric ones are kept verbatim in `attributes`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawElement")]
pub struct Element {
    pub id: String,
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Decorative attributes (`angle`, `fillStyle`, ...) used for prompt context only
    pub attributes: Map<String, Value>,
}

impl Element {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            x: finite_or_zero(x),
            y: finite_or_zero(y),
            width: finite_or_zero(width).abs(),
            height: finite_or_zero(height).abs(),
            attributes: Map::new(),
        }
    }

    /// Attach a decorative attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Deserialize)]
struct RawElement {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    x: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    y: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    width: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    height: f64,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl From<RawElement> for Element {
    fn from(raw: RawElement) -> Self {
        let mut element = Element::new(
            raw.id.unwrap_or_else(|| "unknown".to_string()),
            raw.kind.unwrap_or_else(|| "unknown".to_string()),
            raw.x,
            raw.y,
            raw.width,
            raw.height,
        );
        element.attributes = raw.attributes;
        element
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Render a JSON scalar as an id string (strings verbatim, numbers via Display)
pub(crate) fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a JSON value as a number, accepting numeric strings
pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_id(&value))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).unwrap_or(0.0))
}

/// One raw entry of the oracle's answer.
///
/// Only checked to be a JSON object; every field is untrusted and read
/// through the accessors below.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionRecord(pub Map<String, Value>);

impl SuggestionRecord {
    /// The suggested id, stringified and trimmed
    pub fn id(&self) -> Option<String> {
        self.0
            .get("id")
            .and_then(value_to_id)
            .map(|id| id.trim().to_string())
    }

    /// The echoed element type, if present
    pub fn kind(&self) -> Option<&str> {
        self.text("type")
    }

    /// The raw `new_coords` value, in whichever shape the oracle chose
    pub fn new_coords(&self) -> Option<&Value> {
        self.0.get("new_coords")
    }

    /// A string-valued field
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Value> for SuggestionRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => SuggestionRecord(map),
            _ => SuggestionRecord::default(),
        }
    }
}

/// The resolved placement of one input element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrangementRecord {
    /// Always the matched element's id, never the oracle's spelling
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub original_coords: BoundingBox,
    pub new_coords: BoundingBox,
    pub scale_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_check: Option<String>,
    pub warnings: Vec<String>,
}

/// The front-end's arrangement request document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangeRequest {
    pub selected_elements: Vec<Element>,
    #[serde(deserialize_with = "lenient_number")]
    pub canvas_width: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub canvas_height: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub target_width: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub target_height: f64,
}

impl ArrangeRequest {
    pub fn frame(&self) -> CanvasFrame {
        CanvasFrame::new(
            self.canvas_width,
            self.canvas_height,
            self.target_width,
            self.target_height,
        )
    }
}
