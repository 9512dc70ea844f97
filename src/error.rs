//! Failure taxonomy for the measurement pipeline.
//!
//! Per-image failures (`InvalidImage`, `SurfaceNotFound`, `ContourNotFound`)
//! abort the measurement of that image only; `TangentNotFound` is scoped to
//! one side of the droplet and leaves the other side usable. A degenerate fit
//! is reported as its own variant and handled like the corresponding
//! not-found case by callers.

use crate::types::Side;
use core::fmt;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Error {
    /// Input could not be read or has zero size.
    InvalidImage(String),
    /// Too few accepted surface candidates to fit a baseline.
    SurfaceNotFound { accepted: usize, required: usize },
    /// No qualifying droplet boundary above the surface line.
    ContourNotFound,
    /// One branch has too few usable points near the contact region.
    TangentNotFound { side: Side },
    /// A line fit collapsed (coincident or missing points).
    DegenerateLine,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImage(reason) => write!(f, "invalid image: {reason}"),
            Self::SurfaceNotFound { accepted, required } => write!(
                f,
                "surface line not found: {accepted} supporting points, {required} required"
            ),
            Self::ContourNotFound => write!(f, "no droplet contour above the surface line"),
            Self::TangentNotFound { side } => {
                write!(f, "no stable tangent on the {side} branch")
            }
            Self::DegenerateLine => write!(f, "degenerate line fit"),
        }
    }
}

impl std::error::Error for Error {}
