//! Surface baseline recovery from the edge map.
//!
//! Columns are scanned left to right and the lowest edge pixel of each
//! column proposes a surface candidate. The first `points_to_take`
//! candidates are considered; each is accepted only if it stays inside an
//! asymmetric vertical band around the running baseline estimate (the mean
//! height of the points accepted so far) and does not jump horizontally by
//! more than `jump_threshold` from the previously accepted candidate.
//!
//! The band is deliberately lopsided: at most `height_threshold_finish`
//! pixels above the estimate, because edges rising off the baseline are
//! droplet-boundary bleed, but up to `height_threshold_start` pixels below
//! it, where stray background edges live. A rejected candidate never enters
//! the fitted set, however well it satisfies the other filter.
//!
//! Angles downstream are measured against the fitted line, which absorbs
//! any in-plane tilt of the photographed surface.

use crate::edges::EdgeMap;
use crate::error::Error;
use crate::geometry::{Line, Point};
use crate::params::DropParams;
use log::debug;

/// Locate the surface line. Fails with [`Error::SurfaceNotFound`] when fewer
/// than `min_points_to_find` candidates survive the filters.
pub fn find_surface_line(edges: &EdgeMap, params: &DropParams) -> Result<Line, Error> {
    let accepted = collect_surface_points(edges, params);
    debug!(
        "surface: {} accepted candidates (need {})",
        accepted.len(),
        params.min_points_to_find
    );
    if accepted.len() < params.min_points_to_find {
        return Err(Error::SurfaceNotFound {
            accepted: accepted.len(),
            required: params.min_points_to_find,
        });
    }
    Line::fit(&accepted)
}

/// Candidate scan and filtering, exposed for the locator's tests.
pub(crate) fn collect_surface_points(edges: &EdgeMap, params: &DropParams) -> Vec<Point> {
    let mut accepted: Vec<Point> = Vec::new();
    let mut sum_y = 0.0f32;
    let mut last_x: Option<usize> = None;
    let mut seen = 0usize;

    for x in 0..edges.width() {
        let Some(y) = edges.lowest_in_column(x) else {
            continue;
        };
        seen += 1;
        if seen > params.points_to_take {
            break;
        }

        if let Some(lx) = last_x {
            if x - lx > params.jump_threshold as usize {
                continue;
            }
        }
        if !accepted.is_empty() {
            let estimate = sum_y / accepted.len() as f32;
            // Positive delta: candidate below the estimate (deeper in the image).
            let delta = y as f32 - estimate;
            if delta < -(params.height_threshold_finish as f32)
                || delta > params.height_threshold_start as f32
            {
                continue;
            }
        }

        accepted.push(Point::from_pixel(x, y));
        sum_y += y as f32;
        last_x = Some(x);
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_map(columns: &[(usize, usize)], w: usize, h: usize) -> EdgeMap {
        let mut map = EdgeMap::new(w, h);
        for &(x, y) in columns {
            map.set(x, y, true);
        }
        map
    }

    fn params() -> DropParams {
        DropParams::default()
    }

    #[test]
    fn one_candidate_short_is_not_found() {
        let p = params();
        let pts: Vec<(usize, usize)> = (0..p.min_points_to_find - 1).map(|x| (x, 50)).collect();
        let map = flat_map(&pts, 64, 64);
        match find_surface_line(&map, &p) {
            Err(Error::SurfaceNotFound { accepted, required }) => {
                assert_eq!(accepted, p.min_points_to_find - 1);
                assert_eq!(required, p.min_points_to_find);
            }
            other => panic!("expected SurfaceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn minimum_candidates_yield_a_line() {
        let p = params();
        let pts: Vec<(usize, usize)> = (0..p.min_points_to_find).map(|x| (x, 50)).collect();
        let map = flat_map(&pts, 64, 64);
        let line = find_surface_line(&map, &p).unwrap();
        assert!((line.y_at(10.0) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn jumped_candidate_never_enters_the_fit() {
        let p = params();
        // Continuous run, then a gap wider than jump_threshold, then a lone
        // candidate at a conspicuously different height.
        let mut pts: Vec<(usize, usize)> = (0..8).map(|x| (x, 50)).collect();
        pts.push((8 + p.jump_threshold as usize + 1, 60));
        let map = flat_map(&pts, 64, 128);
        let collected = collect_surface_points(&map, &p);
        assert_eq!(collected.len(), 8);
        assert!(collected.iter().all(|pt| pt.y == 50.0));
    }

    #[test]
    fn height_band_excludes_outliers_in_both_directions() {
        let p = params();
        let mut pts: Vec<(usize, usize)> = (0..8).map(|x| (x, 100)).collect();
        // 10 px above the estimate: droplet bleed (finish bound is 5).
        pts.push((8, 90));
        // Back on the baseline, still within jump range of x=7.
        pts.push((9, 100));
        // 50 px below the estimate: background noise (start bound is 40).
        pts.push((10, 150));
        pts.push((11, 100));
        let map = flat_map(&pts, 64, 200);
        let collected = collect_surface_points(&map, &p);
        assert!(collected.iter().all(|pt| pt.y == 100.0));
        assert_eq!(collected.len(), 10);
    }

    #[test]
    fn tilted_surface_is_recovered_with_slope() {
        let p = params();
        // Rise of 1 px every 4 columns, within the band and jump filters.
        let pts: Vec<(usize, usize)> = (0..24).map(|x| (x, 80 + x / 4)).collect();
        let map = flat_map(&pts, 64, 128);
        let line = find_surface_line(&map, &p).unwrap();
        let slope = line.dir.y / line.dir.x;
        assert!((slope - 0.25).abs() < 0.05, "slope={slope}");
    }

    #[test]
    fn scan_caps_at_points_to_take() {
        let mut p = params();
        p.points_to_take = 5;
        let pts: Vec<(usize, usize)> = (0..20).map(|x| (x, 50)).collect();
        let map = flat_map(&pts, 64, 64);
        let collected = collect_surface_points(&map, &p);
        assert_eq!(collected.len(), 5);
    }
}
