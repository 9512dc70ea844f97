//! End-to-end measurement pipeline.
//!
//! [`DropAnalyzer`] wires the stages together: contrast enhancement, edge
//! extraction, surface-line recovery, contour splitting, per-branch tangent
//! fitting and the angle computation. Each stage fully consumes its
//! predecessor's output; nothing is shared across images and nothing loops
//! back. Per-branch failures stay inside the returned [`Measurement`];
//! image-fatal failures become the `Err` of [`DropAnalyzer::measure`].

use crate::angle::contact_angle;
use crate::contour::{extract_contour, Branch};
use crate::edges::{close3x3, detect_edges};
use crate::error::Error;
use crate::geometry::Line;
use crate::image::io::load_grayscale_image;
use crate::image::ImageU8;
use crate::params::DropParams;
use crate::preprocess::enhance;
use crate::surface::find_surface_line;
use crate::tangent::fit_tangent;
use crate::types::{BranchAngle, Measurement};
use log::{debug, warn};
use std::path::Path;
use std::time::Instant;

/// Contact-angle analyzer configured once and reused across images.
#[derive(Clone, Debug)]
pub struct DropAnalyzer {
    params: DropParams,
}

impl DropAnalyzer {
    pub fn new(params: DropParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DropParams {
        &self.params
    }

    /// Measure one image held in memory.
    ///
    /// `image_id` tags the result record (typically the file name).
    pub fn measure(&self, gray: ImageU8<'_>, image_id: &str) -> Result<Measurement, Error> {
        let start = Instant::now();
        debug!(
            "measure {image_id}: {}x{} input, params {:?}",
            gray.w, gray.h, self.params
        );

        let enhanced = enhance(&gray, self.params.clip_limit)?;
        let edge_map = close3x3(&detect_edges(
            &enhanced,
            self.params.low_threshold,
            self.params.high_threshold,
        ));
        debug!("measure {image_id}: {} edge pixels", edge_map.count());

        let surface = find_surface_line(&edge_map, &self.params)?;
        let (left_branch, right_branch) = extract_contour(&edge_map, &surface)?;

        let left = self.branch_angle(&left_branch, &surface, image_id);
        let right = self.branch_angle(&right_branch, &surface, image_id);

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "measure {image_id}: left={:?} right={:?} latency_ms={latency_ms:.3}",
            left.as_ref().map(|b| b.angle_deg),
            right.as_ref().map(|b| b.angle_deg),
        );
        Ok(Measurement {
            image_id: image_id.to_string(),
            surface,
            left,
            right,
            latency_ms,
        })
    }

    /// Measure an image file from disk.
    pub fn measure_file(&self, path: &Path) -> Result<Measurement, Error> {
        let gray = load_grayscale_image(path).map_err(Error::InvalidImage)?;
        if gray.width() == 0 || gray.height() == 0 {
            return Err(Error::InvalidImage(format!(
                "zero-sized image {}",
                path.display()
            )));
        }
        let image_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.measure(gray.as_view(), &image_id)
    }

    fn branch_angle(
        &self,
        branch: &Branch,
        surface: &Line,
        image_id: &str,
    ) -> Result<BranchAngle, Error> {
        let (contact, tangent) = fit_tangent(branch, surface, &self.params).inspect_err(|e| {
            warn!("measure {image_id}: {} branch failed: {e}", branch.side);
        })?;
        let angle_deg = contact_angle(&tangent, surface, branch.side)?;
        Ok(BranchAngle {
            side: branch.side,
            angle_deg,
            contact,
            tangent,
        })
    }
}
