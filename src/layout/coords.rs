//! Normalization of suggested coordinates into canonical form
//!
//! The oracle answers with either a corner pair (`left/top/right/bottom`) or
//! an origin plus size (`x/y/width/height`). Both resolve to a
//! [`CoordinateShape`] and from there to a [`BoundingBox`].

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{value_to_f64, BoundingBox};

/// Why a suggestion's coordinates could not be used
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("suggestion has no new_coords")]
    Missing,

    #[error("new_coords is not an object")]
    NotAnObject,

    #[error("unrecognized coordinate shape (keys: {})", keys.join(", "))]
    UnrecognizedShape { keys: Vec<String> },

    #[error("coordinate '{key}' is not a number: {value}")]
    InvalidValue { key: String, value: String },

    #[error("coordinate '{key}' is not finite")]
    NonFinite { key: String },
}

/// The two coordinate encodings the oracle may emit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateShape {
    Corners {
        left: f64,
        top: f64,
        right: f64,
        bottom: f64,
    },
    OriginSize {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl CoordinateShape {
    /// Classify a raw coordinate value.
    ///
    /// `left` + `top` selects the corner form, otherwise `x` + `y` selects the
    /// origin form. Missing far edges or sizes read as 0.
    pub fn from_value(value: &Value) -> Result<Self, CoordinateError> {
        let map = value.as_object().ok_or(CoordinateError::NotAnObject)?;

        if map.contains_key("left") && map.contains_key("top") {
            Ok(Self::Corners {
                left: read(map, "left")?,
                top: read(map, "top")?,
                right: read(map, "right")?,
                bottom: read(map, "bottom")?,
            })
        } else if map.contains_key("x") && map.contains_key("y") {
            Ok(Self::OriginSize {
                x: read(map, "x")?,
                y: read(map, "y")?,
                width: read(map, "width")?,
                height: read(map, "height")?,
            })
        } else {
            Err(CoordinateError::UnrecognizedShape {
                keys: map.keys().cloned().collect(),
            })
        }
    }

    /// Convert to canonical form; sizes are always non-negative
    pub fn to_bounds(self) -> BoundingBox {
        match self {
            Self::Corners {
                left,
                top,
                right,
                bottom,
            } => BoundingBox::new(left, top, (right - left).abs(), (bottom - top).abs()),
            Self::OriginSize {
                x,
                y,
                width,
                height,
            } => BoundingBox::new(x, y, width.abs(), height.abs()),
        }
    }
}

/// Normalize an optional `new_coords` value straight to a bounding box
pub fn normalize(value: Option<&Value>) -> Result<BoundingBox, CoordinateError> {
    let value = value.ok_or(CoordinateError::Missing)?;
    let bounds = CoordinateShape::from_value(value)?.to_bounds();

    // Finite corners far apart can still overflow when subtracted.
    for (key, size) in [("width", bounds.width), ("height", bounds.height)] {
        if !size.is_finite() {
            return Err(CoordinateError::NonFinite {
                key: key.to_string(),
            });
        }
    }
    Ok(bounds)
}

fn read(map: &Map<String, Value>, key: &str) -> Result<f64, CoordinateError> {
    let number = match map.get(key) {
        None | Some(Value::Null) => 0.0,
        Some(value) => value_to_f64(value).ok_or_else(|| CoordinateError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })?,
    };
    if number.is_finite() {
        Ok(number)
    } else {
        Err(CoordinateError::NonFinite {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_corner_pair() {
        let bounds = normalize(Some(&json!({"left": 0, "top": 0, "right": 50, "bottom": 50}))).unwrap();
        assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn test_inverted_corner_pair_has_positive_size() {
        let bounds =
            normalize(Some(&json!({"left": 100, "top": 80, "right": 40, "bottom": 20}))).unwrap();
        assert_eq!(bounds, BoundingBox::new(100.0, 80.0, 60.0, 60.0));
    }

    #[test]
    fn test_origin_size() {
        let bounds =
            normalize(Some(&json!({"x": 10.5, "y": "20", "width": -30, "height": 40}))).unwrap();
        assert_eq!(bounds, BoundingBox::new(10.5, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_corner_keys_take_precedence() {
        let shape = CoordinateShape::from_value(&json!({
            "left": 1, "top": 2, "right": 3, "bottom": 4, "x": 9, "y": 9
        }))
        .unwrap();
        assert!(matches!(shape, CoordinateShape::Corners { .. }));
    }

    #[test]
    fn test_unrecognized_shape() {
        let err = normalize(Some(&json!({"cx": 1, "cy": 2}))).unwrap_err();
        assert!(matches!(err, CoordinateError::UnrecognizedShape { .. }));
        assert!(err.to_string().contains("cx"));
    }

    #[test]
    fn test_missing_and_non_object() {
        assert_eq!(normalize(None), Err(CoordinateError::Missing));
        assert_eq!(normalize(Some(&json!([1, 2, 3]))), Err(CoordinateError::NotAnObject));
    }

    #[test]
    fn test_overflowing_corner_span_is_rejected() {
        let err = normalize(Some(&json!({
            "left": -1e308, "top": 0, "right": 1e308, "bottom": 100
        })))
        .unwrap_err();
        assert_eq!(
            err,
            CoordinateError::NonFinite {
                key: "width".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_value() {
        let err = normalize(Some(&json!({"x": "left-ish", "y": 0}))).unwrap_err();
        assert!(matches!(err, CoordinateError::InvalidValue { ref key, .. } if key == "x"));
    }
}
