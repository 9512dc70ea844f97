//! Contrast-limited adaptive histogram equalization and denoising blur.
//!
//! The enhancement operates on an 8×8 grid of tiles: each tile gets its own
//! clipped histogram and remapping curve, and every pixel blends the curves
//! of the four nearest tile centres bilinearly. Clipping caps each histogram
//! bin at `clip_limit` times the uniform bin height and redistributes the
//! excess evenly, which bounds how much a flat region can be amplified.
//!
//! The result is blurred with a separable 5-tap Gaussian `[1,4,6,4,1]/16`
//! before edge detection. Output intensities stay in the 0–255 range.

use crate::error::Error;
use crate::image::{ImageF32, ImageU8};

/// Tile grid dimension for the adaptive equalization.
const TILE_GRID: usize = 8;

const GAUSSIAN_5TAP: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// Enhance local contrast, then blur. Pure function of the inputs.
pub fn enhance(gray: &ImageU8<'_>, clip_limit: f32) -> Result<ImageF32, Error> {
    if gray.w == 0 || gray.h == 0 {
        return Err(Error::InvalidImage(format!(
            "zero-sized input ({}x{})",
            gray.w, gray.h
        )));
    }
    let equalized = clahe(gray, clip_limit.max(1.0));
    Ok(blur_5tap(&equalized))
}

struct TileGrid {
    tiles_x: usize,
    tiles_y: usize,
    tile_w: usize,
    tile_h: usize,
    /// One 256-entry remapping curve per tile, row-major.
    luts: Vec<[f32; 256]>,
}

fn clahe(gray: &ImageU8<'_>, clip_limit: f32) -> ImageF32 {
    let grid = build_tile_grid(gray, clip_limit);
    let mut out = ImageF32::new(gray.w, gray.h);

    let tw = grid.tile_w as f32;
    let th = grid.tile_h as f32;
    for y in 0..gray.h {
        // Position relative to tile centres along y.
        let fy = (y as f32 + 0.5) / th - 0.5;
        let ty0 = fy.floor().max(0.0) as usize;
        let ty0 = ty0.min(grid.tiles_y - 1);
        let ty1 = (ty0 + 1).min(grid.tiles_y - 1);
        let wy = (fy - fy.floor()).clamp(0.0, 1.0);
        let wy = if ty1 == ty0 { 0.0 } else { wy };

        let row = gray.row(y);
        for (x, &v) in row.iter().enumerate() {
            let fx = (x as f32 + 0.5) / tw - 0.5;
            let tx0 = fx.floor().max(0.0) as usize;
            let tx0 = tx0.min(grid.tiles_x - 1);
            let tx1 = (tx0 + 1).min(grid.tiles_x - 1);
            let wx = (fx - fx.floor()).clamp(0.0, 1.0);
            let wx = if tx1 == tx0 { 0.0 } else { wx };

            let v = v as usize;
            let top = lerp(
                grid.luts[ty0 * grid.tiles_x + tx0][v],
                grid.luts[ty0 * grid.tiles_x + tx1][v],
                wx,
            );
            let bottom = lerp(
                grid.luts[ty1 * grid.tiles_x + tx0][v],
                grid.luts[ty1 * grid.tiles_x + tx1][v],
                wx,
            );
            out.set(x, y, lerp(top, bottom, wy));
        }
    }
    out
}

fn build_tile_grid(gray: &ImageU8<'_>, clip_limit: f32) -> TileGrid {
    let tiles_x = TILE_GRID.min(gray.w.max(1));
    let tiles_y = TILE_GRID.min(gray.h.max(1));
    let tile_w = gray.w.div_ceil(tiles_x);
    let tile_h = gray.h.div_ceil(tiles_y);

    let mut luts = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        let y0 = ty * tile_h;
        let y1 = (y0 + tile_h).min(gray.h);
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let x1 = (x0 + tile_w).min(gray.w);
            luts.push(tile_lut(gray, x0, x1, y0, y1, clip_limit));
        }
    }
    TileGrid {
        tiles_x,
        tiles_y,
        tile_w,
        tile_h,
        luts,
    }
}

fn tile_lut(
    gray: &ImageU8<'_>,
    x0: usize,
    x1: usize,
    y0: usize,
    y1: usize,
    clip_limit: f32,
) -> [f32; 256] {
    let mut hist = [0.0f32; 256];
    for y in y0..y1 {
        for &v in &gray.row(y)[x0..x1] {
            hist[v as usize] += 1.0;
        }
    }
    let area = ((x1 - x0) * (y1 - y0)) as f32;
    if area <= 0.0 {
        // Degenerate tile: identity curve.
        let mut lut = [0.0f32; 256];
        for (v, slot) in lut.iter_mut().enumerate() {
            *slot = v as f32;
        }
        return lut;
    }

    // Clip each bin and spread the excess uniformly.
    let ceiling = (clip_limit * area / 256.0).max(1.0);
    let mut excess = 0.0f32;
    for bin in hist.iter_mut() {
        if *bin > ceiling {
            excess += *bin - ceiling;
            *bin = ceiling;
        }
    }
    let bonus = excess / 256.0;
    for bin in hist.iter_mut() {
        *bin += bonus;
    }

    let mut lut = [0.0f32; 256];
    let mut cdf = 0.0f32;
    for (v, &count) in hist.iter().enumerate() {
        cdf += count;
        lut[v] = (cdf / area * 255.0).clamp(0.0, 255.0);
    }
    lut
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Separable 5-tap Gaussian blur with clamped borders.
fn blur_5tap(src: &ImageF32) -> ImageF32 {
    let (w, h) = (src.w, src.h);
    let mut tmp = ImageF32::new(w, h);
    let mut out = ImageF32::new(w, h);

    for y in 0..h {
        let row = src.row(y);
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &tap) in GAUSSIAN_5TAP.iter().enumerate() {
                let xi = (x as isize + k as isize - 2).clamp(0, w as isize - 1) as usize;
                acc += row[xi] * tap;
            }
            tmp.set(x, y, acc);
        }
    }
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &tap) in GAUSSIAN_5TAP.iter().enumerate() {
                let yi = (y as isize + k as isize - 2).clamp(0, h as isize - 1) as usize;
                acc += tmp.get(x, yi) * tap;
            }
            out.set(x, y, acc);
        }
    }
    out
}
