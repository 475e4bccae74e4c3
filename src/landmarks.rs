//! Landmark input types and boundary validation.
//!
//! A request carries 21 hand landmarks, each either a positional pair
//! (`[x, y]`, extra components such as `z` are ignored) or an object with
//! named `x`/`y` fields. Everything is validated here so the normalizer and
//! classifier only ever see a well-formed [`LandmarkFrame`].

use serde_json::Value;

use crate::constants::LANDMARK_COUNT;
use crate::error::{SignError, SignResult};

/// One tracked 2D point on a hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Landmark {
    /// Creates a landmark from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Exactly 21 landmarks; index 0 is the wrist.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame([Landmark; LANDMARK_COUNT]);

impl LandmarkFrame {
    /// Returns the reference (wrist) landmark.
    #[must_use]
    pub fn wrist(&self) -> Landmark {
        self.0[0]
    }

    /// Returns all landmarks in order.
    #[must_use]
    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.0
    }

    /// Returns a copy with every landmark shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self(self.0.map(|p| Landmark::new(p.x + dx, p.y + dy)))
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkFrame {
    type Error = SignError;

    fn try_from(points: Vec<Landmark>) -> SignResult<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| SignError::invalid(format!("Expected {LANDMARK_COUNT} landmarks")))?;
        Ok(Self(points))
    }
}

/// Parses the `landmarks` field of a request body.
///
/// `None` (field missing) and non-array values are rejected with the same
/// count error as a wrong-length array.
pub fn parse_landmarks(value: Option<&Value>) -> SignResult<LandmarkFrame> {
    let items = match value {
        Some(Value::Array(items)) if items.len() == LANDMARK_COUNT => items,
        _ => {
            return Err(SignError::invalid(format!(
                "Expected {LANDMARK_COUNT} landmarks"
            )))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_point(index, item))
        .collect::<SignResult<Vec<_>>>()?
        .try_into()
}

fn parse_point(index: usize, item: &Value) -> SignResult<Landmark> {
    let (x, y) = match item {
        Value::Array(coords) if coords.len() >= 2 => (&coords[0], &coords[1]),
        Value::Object(fields) => match (fields.get("x"), fields.get("y")) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(SignError::invalid("Invalid landmark format")),
        },
        _ => return Err(SignError::invalid("Invalid landmark format")),
    };

    Ok(Landmark::new(
        parse_coordinate(index, x)?,
        parse_coordinate(index, y)?,
    ))
}

/// Accepts JSON numbers and numeric strings; the result must be finite.
fn parse_coordinate(index: usize, value: &Value) -> SignResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(SignError::invalid(format!(
            "Invalid coordinate at landmark {index}: {value}"
        ))),
    }
}
