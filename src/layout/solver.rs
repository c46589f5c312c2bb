//! Geometry constraint solving: fit a suggested box inside the target frame
//!
//! The solver only scales uniformly and translates, so the suggested aspect
//! ratio is never distorted. Steps run in a fixed order and each later step
//! re-reads the values produced by the earlier ones:
//!
//! 1. degenerate sizes are flagged and passed through
//! 2. oversized boxes are scaled down (never up)
//! 3. negative origins are clamped to 0
//! 4. far edges past the frame pull the origin back
//! 5. a final re-clamp of size and position absorbs floating-point drift

use std::fmt;

use log::debug;
use thiserror::Error;

use super::types::BoundingBox;

/// Relative tolerance used when checking containment
pub const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("target frame must have positive dimensions, got {width}x{height}")]
    InvalidTargetFrame { width: f64, height: f64 },
}

/// Axis of a positional correction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// One corrective action taken by the solver
#[derive(Debug, Clone, PartialEq)]
pub enum Correction {
    /// Width or height was not positive; the box was left as suggested
    DegenerateSize { width: f64, height: f64 },
    /// The box was uniformly scaled down to fit the frame
    Downscaled {
        from: (f64, f64),
        to: (f64, f64),
        scale: f64,
    },
    /// A negative origin coordinate was moved to 0
    ClampedToOrigin { axis: Axis, from: f64 },
    /// The far edge overflowed the frame, so the origin moved back
    PulledInside { axis: Axis, from: f64, to: f64 },
    /// Size still exceeded the frame after scaling and was truncated
    SizeTruncated { axis: Axis, from: f64, to: f64 },
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::DegenerateSize { width, height } => write!(
                f,
                "invalid size {:.2}x{:.2}; cannot be scaled, left as suggested",
                width, height
            ),
            Correction::Downscaled { from, to, scale } => write!(
                f,
                "size {:.2}x{:.2} exceeds the target canvas; scaled proportionally to {:.2}x{:.2} (factor {:.3})",
                from.0, from.1, to.0, to.1, scale
            ),
            Correction::ClampedToOrigin { axis, from } => {
                write!(f, "{} was negative ({:.2}); moved to 0", axis, from)
            }
            Correction::PulledInside { axis, from, to } => {
                let edge = match axis {
                    Axis::X => "right",
                    Axis::Y => "bottom",
                };
                write!(
                    f,
                    "{} edge overflowed the target canvas; {} moved {:.2} -> {:.2}",
                    edge, axis, from, to
                )
            }
            Correction::SizeTruncated { axis, from, to } => {
                let dimension = match axis {
                    Axis::X => "width",
                    Axis::Y => "height",
                };
                write!(f, "{} still exceeded the target canvas; truncated {:.2} -> {:.2}", dimension, from, to)
            }
        }
    }
}

/// Result of fitting one box
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub bounds: BoundingBox,
    /// 1.0 unless the box was scaled down
    pub scale_factor: f64,
    pub corrections: Vec<Correction>,
}

impl FitOutcome {
    pub fn was_rescaled(&self) -> bool {
        self.corrections
            .iter()
            .any(|c| matches!(c, Correction::Downscaled { .. }))
    }

    pub fn is_degenerate(&self) -> bool {
        self.corrections
            .iter()
            .any(|c| matches!(c, Correction::DegenerateSize { .. }))
    }

    /// Human-readable warnings, in the order the corrections were made
    pub fn warnings(&self) -> Vec<String> {
        self.corrections.iter().map(|c| c.to_string()).collect()
    }
}

/// Fit `suggested` inside `[0, target_width] x [0, target_height]`
pub fn fit_to_frame(
    suggested: BoundingBox,
    target_width: f64,
    target_height: f64,
) -> Result<FitOutcome, SolverError> {
    if !(target_width > 0.0 && target_height > 0.0)
        || !target_width.is_finite()
        || !target_height.is_finite()
    {
        return Err(SolverError::InvalidTargetFrame {
            width: target_width,
            height: target_height,
        });
    }

    let mut corrections = Vec::new();
    let mut b = suggested;

    if !b.has_area() || !b.x.is_finite() || !b.y.is_finite() {
        return Ok(degenerate(suggested));
    }

    let mut scale_factor = 1.0;
    if b.width > target_width || b.height > target_height {
        let scale = (target_width / b.width).min(target_height / b.height);
        let from = (b.width, b.height);
        b.width *= scale;
        b.height *= scale;
        // Extreme aspect ratios can collapse one side to zero.
        if !b.has_area() {
            return Ok(degenerate(suggested));
        }
        scale_factor = scale;
        corrections.push(Correction::Downscaled {
            from,
            to: (b.width, b.height),
            scale,
        });
    }

    clamp_position(&mut b, target_width, target_height, &mut corrections);

    // Safety net against drift from the multiplication above.
    if b.width > target_width {
        corrections.push(Correction::SizeTruncated {
            axis: Axis::X,
            from: b.width,
            to: target_width,
        });
        b.width = target_width;
    }
    if b.height > target_height {
        corrections.push(Correction::SizeTruncated {
            axis: Axis::Y,
            from: b.height,
            to: target_height,
        });
        b.height = target_height;
    }
    clamp_position(&mut b, target_width, target_height, &mut corrections);

    for correction in &corrections {
        debug!("fit correction: {}", correction);
    }

    Ok(FitOutcome {
        bounds: b,
        scale_factor,
        corrections,
    })
}

fn degenerate(suggested: BoundingBox) -> FitOutcome {
    FitOutcome {
        bounds: suggested,
        scale_factor: 1.0,
        corrections: vec![Correction::DegenerateSize {
            width: suggested.width,
            height: suggested.height,
        }],
    }
}

/// Move a box that cannot be scaled into the frame without resizing it.
///
/// Non-finite values become 0 and sizes are capped at the frame, so the
/// result always lies inside `[0, target_width] x [0, target_height]`.
pub fn pin_to_frame(b: BoundingBox, target_width: f64, target_height: f64) -> BoundingBox {
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
    let width = finite(b.width).max(0.0).min(target_width);
    let height = finite(b.height).max(0.0).min(target_height);
    BoundingBox::new(
        finite(b.x).min(target_width - width).max(0.0),
        finite(b.y).min(target_height - height).max(0.0),
        width,
        height,
    )
}

/// Lower bounds first, then upper bounds against the already-clamped origin
fn clamp_position(
    b: &mut BoundingBox,
    target_width: f64,
    target_height: f64,
    corrections: &mut Vec<Correction>,
) {
    if b.x < 0.0 {
        corrections.push(Correction::ClampedToOrigin {
            axis: Axis::X,
            from: b.x,
        });
        b.x = 0.0;
    }
    if b.y < 0.0 {
        corrections.push(Correction::ClampedToOrigin {
            axis: Axis::Y,
            from: b.y,
        });
        b.y = 0.0;
    }

    if b.right() > target_width {
        let to = (target_width - b.width).max(0.0);
        corrections.push(Correction::PulledInside {
            axis: Axis::X,
            from: b.x,
            to,
        });
        b.x = to;
    }
    if b.bottom() > target_height {
        let to = (target_height - b.height).max(0.0);
        corrections.push(Correction::PulledInside {
            axis: Axis::Y,
            from: b.y,
            to,
        });
        b.y = to;
    }
}
