//! Interior contact-angle computation.
//!
//! Convention (fixed for this crate): the reported angle is measured through
//! the liquid, in degrees within `[0, 180)`. A thin flat film reads ≈0°, a
//! hemispherical droplet 90°, and a nearly detached bead approaches 180°.
//!
//! The convention is applied by orienting the two directions before taking
//! their angle: the surface direction points from the contact region toward
//! the droplet interior, and the tangent direction points away from the
//! surface (upward in image coordinates, where `y` grows downward). Both
//! sides use the same routine, so left and right angles are directly
//! comparable.

use crate::error::Error;
use crate::geometry::Line;
use crate::types::Side;
use nalgebra::Vector2;

const EPS: f32 = 1e-6;

/// Angle between the tangent and the surface line, oriented per the crate
/// convention. Fails with [`Error::DegenerateLine`] on zero-length input
/// directions.
pub fn contact_angle(tangent: &Line, surface: &Line, side: Side) -> Result<f32, Error> {
    let toward_droplet = orient_surface(surface.dir, side)?;
    let up_tangent = orient_tangent(tangent.dir, toward_droplet)?;
    let cos = up_tangent.dot(&toward_droplet).clamp(-1.0, 1.0);
    Ok(cos.acos().to_degrees())
}

/// Unit surface direction pointing from the contact point into the droplet.
fn orient_surface(dir: Vector2<f32>, side: Side) -> Result<Vector2<f32>, Error> {
    let dir = normalize(dir)?;
    // The droplet interior lies to the right of the left contact point and
    // to the left of the right contact point.
    let inward = match side {
        Side::Left => dir.x >= 0.0,
        Side::Right => dir.x <= 0.0,
    };
    Ok(if inward { dir } else { -dir })
}

/// Unit tangent direction leaving the surface, with a deterministic
/// tie-break for perfectly flat tangents.
fn orient_tangent(
    dir: Vector2<f32>,
    toward_droplet: Vector2<f32>,
) -> Result<Vector2<f32>, Error> {
    let dir = normalize(dir)?;
    if dir.y.abs() < EPS {
        // Flat tangent: align with the surface so the angle reads 0.
        return Ok(if dir.dot(&toward_droplet) >= 0.0 {
            dir
        } else {
            -dir
        });
    }
    // Image y grows downward; "up" is negative y.
    Ok(if dir.y <= 0.0 { dir } else { -dir })
}

fn normalize(dir: Vector2<f32>) -> Result<Vector2<f32>, Error> {
    let norm = dir.norm();
    if !norm.is_finite() || norm < EPS {
        return Err(Error::DegenerateLine);
    }
    Ok(dir / norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(dx: f32, dy: f32) -> Line {
        Line::new(Vector2::new(0.0, 0.0), Vector2::new(dx, dy)).unwrap()
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn flat_film_reads_zero() {
        let surface = line(1.0, 0.0);
        let tangent = line(1.0, 0.0);
        assert!(approx_eq(
            contact_angle(&tangent, &surface, Side::Left).unwrap(),
            0.0
        ));
        assert!(approx_eq(
            contact_angle(&tangent, &surface, Side::Right).unwrap(),
            0.0
        ));
    }

    #[test]
    fn vertical_tangent_reads_ninety() {
        let surface = line(1.0, 0.0);
        let tangent = line(0.0, 1.0);
        assert!(approx_eq(
            contact_angle(&tangent, &surface, Side::Left).unwrap(),
            90.0
        ));
        assert!(approx_eq(
            contact_angle(&tangent, &surface, Side::Right).unwrap(),
            90.0
        ));
    }

    #[test]
    fn overhanging_bead_reads_obtuse() {
        let surface = line(1.0, 0.0);
        // Left contact of a bead: the boundary leaves the surface up and to
        // the left at 45°, i.e. direction (-1, -1).
        let tangent = line(-1.0, -1.0);
        assert!(approx_eq(
            contact_angle(&tangent, &surface, Side::Left).unwrap(),
            135.0
        ));
        // Mirrored on the right side.
        let tangent = line(1.0, -1.0);
        assert!(approx_eq(
            contact_angle(&tangent, &surface, Side::Right).unwrap(),
            135.0
        ));
    }

    #[test]
    fn wetting_droplet_reads_acute() {
        let surface = line(1.0, 0.0);
        // Left contact rising toward the interior at 30°.
        let dy = -(30.0f32.to_radians().tan());
        let tangent = line(1.0, dy);
        assert!(approx_eq(
            contact_angle(&tangent, &surface, Side::Left).unwrap(),
            30.0
        ));
    }

    #[test]
    fn tilted_surface_is_the_reference() {
        // Surface descending to the right by 10°; the tangent sits 60° above
        // it, i.e. 50° above the image horizontal.
        let phi = 10.0f32.to_radians();
        let surface = line(phi.cos(), phi.sin());
        let theta = 60.0f32.to_radians() - phi;
        let tangent = line(theta.cos(), -theta.sin());
        let got = contact_angle(&tangent, &surface, Side::Left).unwrap();
        assert!((got - 60.0).abs() < 0.2, "got={got}");
    }

    #[test]
    fn degenerate_direction_is_an_error() {
        let surface = line(1.0, 0.0);
        let bad = Line {
            anchor: Vector2::new(0.0, 0.0),
            dir: Vector2::new(0.0, 0.0),
        };
        assert!(matches!(
            contact_angle(&bad, &surface, Side::Left),
            Err(Error::DegenerateLine)
        ));
    }
}
