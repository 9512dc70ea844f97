//! Planar geometry primitives shared by the pipeline stages.
//!
//! Lines are stored as an anchor point plus a unit direction rather than
//! slope/intercept, so steep tangents (contact angles near 90°) stay
//! numerically well-behaved. Fitting is total least squares: the principal
//! axis of the point scatter, which matches what `cv2.fitLine` with an L2
//! distance produces for clean data.

use crate::error::Error;
use nalgebra::Vector2;
use serde::Serialize;

const EPS: f32 = 1e-6;

/// Sub-pixel image coordinate. `y` grows downward, as in raster order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Convenience constructor from integer pixel coordinates.
    pub fn from_pixel(x: usize, y: usize) -> Self {
        Self {
            x: x as f32,
            y: y as f32,
        }
    }
}

/// A fitted line: anchor point and unit direction.
///
/// A `Line` only exists when a fit succeeded; there is no "empty" or default
/// line value. Stages that cannot produce a supported fit return an error
/// instead.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Line {
    /// A point on the line (the centroid of the fitted set).
    pub anchor: Vector2<f32>,
    /// Unit direction along the line.
    pub dir: Vector2<f32>,
}

impl Line {
    /// Construct from an anchor and a (not necessarily unit) direction.
    pub fn new(anchor: Vector2<f32>, dir: Vector2<f32>) -> Result<Self, Error> {
        let norm = dir.norm();
        if !norm.is_finite() || norm < EPS {
            return Err(Error::DegenerateLine);
        }
        Ok(Self {
            anchor,
            dir: dir / norm,
        })
    }

    /// Total-least-squares fit through `points`.
    ///
    /// Solves for the principal axis of the centered scatter via the closed
    /// form `θ = ½·atan2(2·sxy, sxx − syy)`. Returns [`Error::DegenerateLine`]
    /// when fewer than two points are given or when the scatter collapses to
    /// a single location.
    pub fn fit(points: &[Point]) -> Result<Self, Error> {
        if points.len() < 2 {
            return Err(Error::DegenerateLine);
        }
        let n = points.len() as f32;
        let mut mx = 0.0f32;
        let mut my = 0.0f32;
        for p in points {
            mx += p.x;
            my += p.y;
        }
        mx /= n;
        my /= n;

        let mut sxx = 0.0f32;
        let mut syy = 0.0f32;
        let mut sxy = 0.0f32;
        for p in points {
            let dx = p.x - mx;
            let dy = p.y - my;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }
        if sxx + syy < EPS {
            return Err(Error::DegenerateLine);
        }
        let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
        Ok(Self {
            anchor: Vector2::new(mx, my),
            dir: Vector2::new(theta.cos(), theta.sin()),
        })
    }

    /// Height of the line at abscissa `x`.
    ///
    /// Falls back to the anchor height for near-vertical lines; callers only
    /// evaluate this on near-horizontal surface lines.
    pub fn y_at(&self, x: f32) -> f32 {
        if self.dir.x.abs() < EPS {
            return self.anchor.y;
        }
        self.anchor.y + (x - self.anchor.x) * self.dir.y / self.dir.x
    }

    /// Perpendicular distance from `p` to the line.
    pub fn distance_to(&self, p: Point) -> f32 {
        let d = Vector2::new(p.x - self.anchor.x, p.y - self.anchor.y);
        (d.x * self.dir.y - d.y * self.dir.x).abs()
    }

    /// Two points on the line at ±`half_span` from the anchor, for drawing.
    pub fn span_points(&self, half_span: f32) -> (Point, Point) {
        let a = self.anchor - self.dir * half_span;
        let b = self.anchor + self.dir * half_span;
        (Point::new(a.x, a.y), Point::new(b.x, b.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn fit_recovers_horizontal_line() {
        let pts: Vec<Point> = (0..10).map(|x| Point::from_pixel(x, 42)).collect();
        let line = Line::fit(&pts).unwrap();
        assert!(approx_eq(line.dir.y.abs(), 0.0), "dir={:?}", line.dir);
        assert!(approx_eq(line.y_at(100.0), 42.0));
    }

    #[test]
    fn fit_recovers_vertical_line() {
        let pts: Vec<Point> = (0..10).map(|y| Point::from_pixel(7, y)).collect();
        let line = Line::fit(&pts).unwrap();
        assert!(approx_eq(line.dir.x.abs(), 0.0), "dir={:?}", line.dir);
    }

    #[test]
    fn fit_recovers_diagonal_line() {
        let pts: Vec<Point> = (0..20)
            .map(|i| Point::new(i as f32, 3.0 + 0.5 * i as f32))
            .collect();
        let line = Line::fit(&pts).unwrap();
        let slope = line.dir.y / line.dir.x;
        assert!(approx_eq(slope, 0.5), "slope={}", slope);
        assert!(approx_eq(line.y_at(0.0), 3.0));
    }

    #[test]
    fn fit_rejects_degenerate_input() {
        assert!(matches!(Line::fit(&[]), Err(Error::DegenerateLine)));
        assert!(matches!(
            Line::fit(&[Point::new(1.0, 1.0)]),
            Err(Error::DegenerateLine)
        ));
        let coincident = vec![Point::new(5.0, 5.0); 8];
        assert!(matches!(
            Line::fit(&coincident),
            Err(Error::DegenerateLine)
        ));
    }

    #[test]
    fn distance_is_perpendicular() {
        let pts: Vec<Point> = (0..10).map(|x| Point::from_pixel(x, 10)).collect();
        let line = Line::fit(&pts).unwrap();
        assert!(approx_eq(line.distance_to(Point::new(4.0, 13.0)), 3.0));
        assert!(approx_eq(line.distance_to(Point::new(-20.0, 10.0)), 0.0));
    }
}
