//! Synthetic droplet scenes with analytically known contact angles.

const BACKGROUND: u8 = 210;
const FOREGROUND: u8 = 45;

/// Scene description for [`droplet_scene`].
#[derive(Clone, Copy, Debug)]
pub struct Scene {
    pub width: usize,
    pub height: usize,
    /// Droplet centre abscissa.
    pub cx: f32,
    /// Surface height at x = 0.
    pub base_y: f32,
    /// Surface slope (dy per dx); 0 for a level surface.
    pub tilt: f32,
    /// Droplet radius in pixels.
    pub radius: f32,
    /// Target contact angle in degrees.
    pub theta_deg: f32,
}

/// Renders a dark droplet-on-dark-surface scene against a light background.
///
/// The droplet is the part of a disk lying above the surface line; the disk
/// centre is placed so that the disk intersects the line at the requested
/// angle (`d = r·cos θ` below the line, measured along the surface normal
/// for level surfaces — the sub-0.1° error from applying it vertically to a
/// slightly tilted surface is far below the test tolerances).
pub fn droplet_scene(scene: &Scene) -> Vec<u8> {
    let r = scene.radius;
    let cy = surface_y(scene, scene.cx) + r * scene.theta_deg.to_radians().cos();

    let mut img = vec![BACKGROUND; scene.width * scene.height];
    for y in 0..scene.height {
        for x in 0..scene.width {
            let fx = x as f32;
            let fy = y as f32;
            let below_surface = fy > surface_y(scene, fx);
            let dx = fx - scene.cx;
            let dy = fy - cy;
            let in_disk = dx * dx + dy * dy <= r * r;
            if below_surface || in_disk {
                img[y * scene.width + x] = FOREGROUND;
            }
        }
    }
    img
}

/// Surface height at abscissa `x`.
pub fn surface_y(scene: &Scene, x: f32) -> f32 {
    scene.base_y + scene.tilt * x
}

/// A scene with the surface only — no droplet anywhere.
pub fn surface_only_scene(width: usize, height: usize, base_y: f32) -> Vec<u8> {
    let mut img = vec![BACKGROUND; width * height];
    for y in 0..height {
        if y as f32 > base_y {
            for x in 0..width {
                img[y * width + x] = FOREGROUND;
            }
        }
    }
    img
}
