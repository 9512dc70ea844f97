//! Result records produced by the measurement pipeline.

use crate::error::Error;
use crate::geometry::{Line, Point};
use core::fmt;
use serde::{Serialize, Serializer};

/// Which side of the droplet a branch or result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// One successfully measured contact angle.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchAngle {
    pub side: Side,
    /// Interior contact angle in degrees, measured through the liquid.
    pub angle_deg: f32,
    /// Branch point closest to the fitted surface line.
    pub contact: Point,
    /// Local tangent fitted at the contact region.
    pub tangent: Line,
}

/// Per-image measurement record.
///
/// Branch-level failures stay inside the record: one side may carry an angle
/// while the other carries the error that prevented its fit. Image-fatal
/// failures (no surface, no contour) never produce a `Measurement` at all.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Identifier of the source image (file name or caller-supplied tag).
    pub image_id: String,
    /// Fitted surface baseline; all angles are relative to it.
    pub surface: Line,
    #[serde(serialize_with = "serialize_side_outcome")]
    pub left: Result<BranchAngle, Error>,
    #[serde(serialize_with = "serialize_side_outcome")]
    pub right: Result<BranchAngle, Error>,
    /// Wall-clock processing time for this image.
    pub latency_ms: f64,
}

impl Measurement {
    /// True when at least one branch produced an angle.
    pub fn any_angle(&self) -> bool {
        self.left.is_ok() || self.right.is_ok()
    }
}

fn serialize_side_outcome<S: Serializer>(
    outcome: &Result<BranchAngle, Error>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    enum Repr<'a> {
        Angle(&'a BranchAngle),
        Failed(String),
    }
    match outcome {
        Ok(angle) => Repr::Angle(angle),
        Err(err) => Repr::Failed(err.to_string()),
    }
    .serialize(serializer)
}
