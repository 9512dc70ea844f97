#![doc = include_str!("../README.md")]

pub mod angle;
pub mod batch;
pub mod contour;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod image;
pub mod overlay;
pub mod params;
pub mod pipeline;
pub mod preprocess;
pub mod surface;
pub mod tangent;
pub mod types;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::Error;
pub use crate::params::DropParams;
pub use crate::pipeline::DropAnalyzer;
pub use crate::types::{BranchAngle, Measurement, Side};

/// Small prelude for quick experiments.
///
/// ```no_run
/// use drop_angle::prelude::*;
///
/// # fn main() {
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let analyzer = DropAnalyzer::new(DropParams::default());
/// match analyzer.measure(img, "demo") {
///     Ok(m) => println!("left={:?} right={:?}", m.left, m.right),
///     Err(e) => eprintln!("{e}"),
/// }
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageU8;
    pub use crate::{BranchAngle, DropAnalyzer, DropParams, Error, Measurement, Side};
}
