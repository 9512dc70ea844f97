//! Image and JSON file I/O.
//!
//! Loading converts any supported format (PNG/JPEG/…) to 8-bit grayscale.
//! Errors are reported as strings with the offending path, and mapped into
//! the pipeline error taxonomy at the call site.

use super::{ImageF32, ImageU8};
use image::{GrayImage, Luma, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned 8-bit grayscale buffer with a borrowed-view accessor.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrow as a read-only [`ImageU8`] view.
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8, String> {
    let img = image::open(path)
        .map_err(|e| format!("failed to open {}: {e}", path.display()))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(GrayImageU8::new(width, height, img.into_raw()))
}

/// Save a float image as a grayscale PNG, clamping to [0, 255].
pub fn save_grayscale_f32(img: &ImageF32, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(img.w as u32, img.h as u32);
    for y in 0..img.h {
        for (x, &px) in img.row(y).iter().enumerate() {
            out.put_pixel(x as u32, y as u32, Luma([px.clamp(0.0, 255.0) as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("failed to save {}: {e}", path.display()))
}

/// Save an RGB overlay image as PNG.
pub fn save_rgb(img: &RgbImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    img.save(path)
        .map_err(|e| format!("failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("failed to write {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
