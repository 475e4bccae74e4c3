//! Wrist-relative landmark normalization.
//!
//! Maps a [`LandmarkFrame`] into the translation- and scale-invariant
//! 42-value vector the classifier was trained on:
//!
//! 1. subtract the wrist (landmark 0) from every point,
//! 2. flatten point-major (`x0, y0, x1, y1, ..., x20, y20`),
//! 3. divide by the largest absolute component.
//!
//! When every point coincides with the wrist the largest component is
//! (numerically) zero; the scale then stays at 1.0 and the result is the
//! zero vector.

use crate::constants::{FEATURE_LEN, MIN_SCALE};
use crate::landmarks::LandmarkFrame;

/// Normalized, model-ready feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_LEN]);

impl FeatureVector {
    /// Wraps raw values that are already normalized.
    #[must_use]
    pub const fn from_values(values: [f64; FEATURE_LEN]) -> Self {
        Self(values)
    }

    /// Returns the components in point-major order.
    #[must_use]
    pub fn values(&self) -> &[f64; FEATURE_LEN] {
        &self.0
    }

    /// Returns the components as `f32`, the model's input precision.
    #[must_use]
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&v| v as f32).collect()
    }

    /// Largest absolute component.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        max_abs(&self.0)
    }

    /// True if every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

/// Normalizes a frame of landmarks.
///
/// Offsets are computed on halved coordinates, so any finite frame stays
/// finite. Halving is exact and cancels out in the final division.
#[must_use]
pub fn normalize(frame: &LandmarkFrame) -> FeatureVector {
    let wrist = frame.wrist();
    let half_offset = |v: f64, origin: f64| v * 0.5 - origin * 0.5;

    let mut values = [0.0; FEATURE_LEN];
    for (i, point) in frame.points().iter().enumerate() {
        values[2 * i] = half_offset(point.x, wrist.x);
        values[2 * i + 1] = half_offset(point.y, wrist.y);
    }

    let half_scale = max_abs(&values);
    if half_scale * 2.0 < MIN_SCALE {
        for v in &mut values {
            *v *= 2.0;
        }
    } else {
        for v in &mut values {
            *v /= half_scale;
        }
    }

    FeatureVector(values)
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}
