//! Contact-point search and local tangent fitting.
//!
//! One routine serves both droplet sides: the branch is walked from its
//! surface-adjacent end inward, and points whose clearance above the surface
//! line falls inside the `[height_threshold_finish, height_threshold_start]`
//! window are collected for the tangent fit. The lower bound keeps
//! surface-line pixels out of the fit; the upper bound keeps the window
//! local. The walk shares the continuity rules of the surface locator: a
//! point that jumps horizontally by more than `jump_threshold` from the
//! previously kept one is never admitted, and once enough points are held a
//! jump terminates the walk.

use crate::contour::Branch;
use crate::error::Error;
use crate::geometry::{Line, Point};
use crate::params::DropParams;
use log::debug;

/// Fit the contact point and tangent for one branch.
///
/// Fails with [`Error::TangentNotFound`] when fewer than
/// `min_points_to_find` branch points fall inside the clearance window.
pub fn fit_tangent(
    branch: &Branch,
    surface: &Line,
    params: &DropParams,
) -> Result<(Point, Line), Error> {
    let kept = collect_window(branch, surface, params);
    debug!(
        "tangent {}: {} window points (need {})",
        branch.side,
        kept.len(),
        params.min_points_to_find
    );
    if kept.len() < params.min_points_to_find {
        return Err(Error::TangentNotFound { side: branch.side });
    }
    let tangent = Line::fit(&kept)?;
    let contact = contact_point(branch, surface).ok_or(Error::TangentNotFound {
        side: branch.side,
    })?;
    Ok((contact, tangent))
}

/// Window selection, exposed for the fitter's tests.
pub(crate) fn collect_window(branch: &Branch, surface: &Line, params: &DropParams) -> Vec<Point> {
    let lo = params.height_threshold_finish as f32;
    let hi = params.height_threshold_start as f32;
    let mut kept: Vec<Point> = Vec::new();
    let mut last_x: Option<f32> = None;

    // Surface-adjacent end first.
    for p in branch.points.iter().rev() {
        let clearance = surface.y_at(p.x) - p.y;
        if clearance < lo {
            continue;
        }
        if clearance > hi {
            break;
        }
        if let Some(lx) = last_x {
            if (p.x - lx).abs() > params.jump_threshold as f32 {
                if kept.len() >= params.min_points_to_find {
                    break;
                }
                continue;
            }
        }
        kept.push(*p);
        last_x = Some(p.x);
    }
    kept
}

/// The branch point nearest the surface line.
fn contact_point(branch: &Branch, surface: &Line) -> Option<Point> {
    branch
        .points
        .iter()
        .copied()
        .min_by(|a, b| {
            surface
                .distance_to(*a)
                .total_cmp(&surface.distance_to(*b))
        })
}
