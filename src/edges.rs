//! Gradient-based edge extraction with double-threshold hysteresis.
//!
//! Three building blocks:
//! - Sobel gradients over the enhanced image (border samples clamp).
//! - Non-maximum suppression along the quantized gradient direction, keeping
//!   only local ridge maxima.
//! - Hysteresis: magnitudes at or above the high threshold seed edges, and
//!   pixels between the thresholds survive only when 8-connected to a seed.
//!
//! An all-false [`EdgeMap`] is a valid result; downstream stages surface it
//! as an insufficient-points failure. [`close3x3`] bridges one-pixel gaps in
//! the map before contour extraction.

use crate::image::ImageF32;

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Binary edge mask with the dimensions of the source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeMap {
    w: usize,
    h: usize,
    data: Vec<bool>,
}

impl EdgeMap {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![false; w * h],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: bool) {
        self.data[y * self.w + x] = v;
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// The lowest (largest `y`) edge pixel in column `x`, if any.
    pub fn lowest_in_column(&self, x: usize) -> Option<usize> {
        (0..self.h).rev().find(|&y| self.get(x, y))
    }
}

/// Per-pixel Sobel gradients.
#[derive(Clone, Debug)]
pub struct Grad {
    pub gx: ImageF32,
    pub gy: ImageF32,
    pub mag: ImageF32,
}

pub fn sobel_gradients(l: &ImageF32) -> Grad {
    let (w, h) = (l.w, l.h);
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);
    let mut mag = ImageF32::new(w, h);
    if w == 0 || h == 0 {
        return Grad { gx, gy, mag };
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, &yy) in y_idx.iter().enumerate() {
                let row = l.row(yy);
                let kernel_row_x = &SOBEL_KERNEL_X[ky];
                let kernel_row_y = &SOBEL_KERNEL_Y[ky];
                for (kx, &xx) in x_idx.iter().enumerate() {
                    let sample = row[xx];
                    sum_x += sample * kernel_row_x[kx];
                    sum_y += sample * kernel_row_y[kx];
                }
            }
            gx.set(x, y, sum_x);
            gy.set(x, y, sum_y);
            mag.set(x, y, (sum_x * sum_x + sum_y * sum_y).sqrt());
        }
    }
    Grad { gx, gy, mag }
}

/// Double-threshold hysteresis edge detector.
///
/// `low` controls edge continuity, `high` suppresses texture noise. The two
/// are swapped if given in the wrong order.
pub fn detect_edges(l: &ImageF32, low: f32, high: f32) -> EdgeMap {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    let grad = sobel_gradients(l);
    let (w, h) = (l.w, l.h);
    let mut map = EdgeMap::new(w, h);
    if w < 3 || h < 3 {
        return map;
    }

    // 0 = suppressed, 1 = weak candidate, 2 = strong seed.
    let mut class = vec![0u8; w * h];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mag = grad.mag.get(x, y);
            if mag < low {
                continue;
            }
            if !is_ridge_maximum(&grad, x, y, mag) {
                continue;
            }
            let idx = y * w + x;
            if mag >= high {
                class[idx] = 2;
                stack.push((x, y));
            } else {
                class[idx] = 1;
            }
        }
    }

    // Grow seeds through weak candidates (8-neighborhood).
    while let Some((x, y)) = stack.pop() {
        map.set(x, y, true);
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                let idx = ny * w + nx;
                if class[idx] == 1 {
                    class[idx] = 2;
                    stack.push((nx, ny));
                }
            }
        }
    }
    map
}

/// True when `mag` is a local maximum along the gradient direction.
fn is_ridge_maximum(grad: &Grad, x: usize, y: usize, mag: f32) -> bool {
    let gx = grad.gx.get(x, y);
    let gy = grad.gy.get(x, y);
    let mut angle_deg = gy.atan2(gx).to_degrees();
    if angle_deg < 0.0 {
        angle_deg += 180.0;
    }
    let (n1x, n1y, n2x, n2y) = if !(22.5..157.5).contains(&angle_deg) {
        (x - 1, y, x + 1, y)
    } else if angle_deg < 67.5 {
        (x + 1, y - 1, x - 1, y + 1)
    } else if angle_deg < 112.5 {
        (x, y - 1, x, y + 1)
    } else {
        (x - 1, y - 1, x + 1, y + 1)
    };
    mag >= grad.mag.get(n1x, n1y) && mag >= grad.mag.get(n2x, n2y)
}

/// One pass of 3×3 binary closing (dilate, then erode).
///
/// Interior-only treatment: the one-pixel border is left untouched by the
/// erosion bound check, which is fine for edge maps whose content sits away
/// from the frame.
pub fn close3x3(src: &EdgeMap) -> EdgeMap {
    let (w, h) = (src.width(), src.height());
    if w < 3 || h < 3 {
        return src.clone();
    }

    let mut dilated = EdgeMap::new(w, h);
    for y in 0..h {
        for x in 0..w {
            if src.get(x, y) {
                for dy in -1isize..=1 {
                    for dx in -1isize..=1 {
                        let nx = x as isize + dx;
                        let ny = y as isize + dy;
                        if nx >= 0 && ny >= 0 && nx < w as isize && ny < h as isize {
                            dilated.set(nx as usize, ny as usize, true);
                        }
                    }
                }
            }
        }
    }

    let mut out = EdgeMap::new(w, h);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut all_set = true;
            'probe: for dy in -1isize..=1 {
                for dx in -1isize..=1 {
                    if !dilated.get((x as isize + dx) as usize, (y as isize + dy) as usize) {
                        all_set = false;
                        break 'probe;
                    }
                }
            }
            out.set(x, y, all_set);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Vertical step edge: dark left half, bright right half.
    fn step_image(w: usize, h: usize) -> ImageF32 {
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, if x < w / 2 { 40.0 } else { 200.0 });
            }
        }
        img
    }

    #[test]
    fn step_edge_yields_one_column_of_edges() {
        let img = step_image(32, 16);
        let map = detect_edges(&img, 50.0, 150.0);
        assert!(map.count() > 0);
        for y in 2..14 {
            let edges_in_row: Vec<usize> = (0..32).filter(|&x| map.get(x, y)).collect();
            assert!(
                !edges_in_row.is_empty(),
                "row {y} lost the step edge entirely"
            );
            for &x in &edges_in_row {
                assert!(
                    (14..=17).contains(&x),
                    "edge at x={x} far from the step at 15/16"
                );
            }
        }
    }

    #[test]
    fn below_low_threshold_yields_empty_map() {
        let mut img = ImageF32::new(24, 24);
        for y in 0..24 {
            for x in 0..24 {
                // Gentle ramp, Sobel magnitude 8 everywhere.
                img.set(x, y, x as f32);
            }
        }
        let map = detect_edges(&img, 50.0, 150.0);
        assert_eq!(map.count(), 0);
    }

    #[test]
    fn weak_edge_needs_a_strong_neighbor() {
        // A step whose top half is strong and bottom half weak: hysteresis
        // keeps the weak part because it touches the strong part.
        let w = 24;
        let h = 24;
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            let contrast = if y < h / 2 { 200.0 } else { 70.0 };
            for x in 0..w {
                img.set(x, y, if x < w / 2 { 0.0 } else { contrast });
            }
        }
        let connected = detect_edges(&img, 50.0, 500.0);
        let weak_rows: usize = (h / 2 + 2..h - 1)
            .filter(|&y| (0..w).any(|x| connected.get(x, y)))
            .count();
        assert!(weak_rows > 0, "weak section should survive via hysteresis");

        // The same weak contrast alone (no strong seed anywhere) is dropped.
        let mut weak_only = ImageF32::new(w, h);
        for y in 0..h {
            for x in 0..w {
                weak_only.set(x, y, if x < w / 2 { 0.0 } else { 70.0 });
            }
        }
        let isolated = detect_edges(&weak_only, 50.0, 500.0);
        assert_eq!(isolated.count(), 0);
    }

    #[test]
    fn closing_bridges_single_pixel_gap() {
        let mut map = EdgeMap::new(16, 16);
        for x in 2..7 {
            map.set(x, 8, true);
        }
        // gap at x=7
        for x in 8..13 {
            map.set(x, 8, true);
        }
        let closed = close3x3(&map);
        assert!(closed.get(7, 8), "gap should be bridged by closing");
    }

    #[test]
    fn lowest_in_column_picks_largest_y() {
        let mut map = EdgeMap::new(4, 10);
        map.set(2, 3, true);
        map.set(2, 7, true);
        assert_eq!(map.lowest_in_column(2), Some(7));
        assert_eq!(map.lowest_in_column(0), None);
    }
}
