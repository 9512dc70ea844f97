//! Overlay rendering for operator verification.
//!
//! Draws the fitted surface line, the per-side tangents and the contact
//! points over the source image so the operator can confirm that the
//! geometry was picked up correctly before trusting the numbers.

use crate::image::ImageU8;
use crate::types::Measurement;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

const SURFACE_COLOR: Rgb<u8> = Rgb([66, 135, 245]);
const TANGENT_COLOR: Rgb<u8> = Rgb([235, 64, 52]);
const CONTACT_COLOR: Rgb<u8> = Rgb([255, 200, 0]);

const CONTACT_RADIUS: i32 = 4;
/// Tangents are drawn as short segments so they do not dominate the image.
const TANGENT_HALF_SPAN: f32 = 80.0;

/// Render the measurement over the grayscale source.
pub fn render(gray: &ImageU8<'_>, measurement: &Measurement) -> RgbImage {
    let mut canvas = RgbImage::new(gray.w as u32, gray.h as u32);
    for y in 0..gray.h {
        let row = gray.row(y);
        for (x, &v) in row.iter().enumerate() {
            canvas.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
        }
    }

    // Surface line across the full width.
    let span = gray.w as f32 + gray.h as f32;
    let (s0, s1) = measurement.surface.span_points(span);
    draw_line_segment_mut(&mut canvas, (s0.x, s0.y), (s1.x, s1.y), SURFACE_COLOR);

    for outcome in [&measurement.left, &measurement.right] {
        let Ok(branch) = outcome else { continue };
        let (t0, t1) = branch.tangent.span_points(TANGENT_HALF_SPAN);
        draw_line_segment_mut(&mut canvas, (t0.x, t0.y), (t1.x, t1.y), TANGENT_COLOR);
        draw_filled_circle_mut(
            &mut canvas,
            (branch.contact.x as i32, branch.contact.y as i32),
            CONTACT_RADIUS,
            CONTACT_COLOR,
        );
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geometry::{Line, Point};
    use crate::types::Side;

    #[test]
    fn render_marks_surface_and_contacts() {
        let data = vec![128u8; 100 * 80];
        let gray = ImageU8 {
            w: 100,
            h: 80,
            stride: 100,
            data: &data,
        };
        let surface = Line::fit(&[Point::new(0.0, 60.0), Point::new(99.0, 60.0)]).unwrap();
        let tangent = Line::fit(&[Point::new(30.0, 60.0), Point::new(30.0, 20.0)]).unwrap();
        let measurement = Measurement {
            image_id: "t".into(),
            surface,
            left: Ok(crate::types::BranchAngle {
                side: Side::Left,
                angle_deg: 90.0,
                contact: Point::new(30.0, 60.0),
                tangent,
            }),
            right: Err(Error::TangentNotFound { side: Side::Right }),
            latency_ms: 0.0,
        };
        let canvas = render(&gray, &measurement);
        assert_eq!(canvas.get_pixel(50, 60), &SURFACE_COLOR);
        assert_eq!(canvas.get_pixel(30, 58), &CONTACT_COLOR);
        // Untouched background stays grayscale.
        assert_eq!(canvas.get_pixel(80, 10), &Rgb([128, 128, 128]));
    }
}
