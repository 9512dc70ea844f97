//! Droplet boundary extraction and branch splitting.
//!
//! Edge pixels with vertical clearance above the fitted surface line are
//! grouped into 8-connected components. The largest component with enough
//! extent is taken as the droplet boundary; everything else is background
//! noise or residue of the surface line itself. The component splits at its
//! topmost point into a left and a right branch, each represented by the
//! outermost boundary pixel per row and ordered apex → surface.

use crate::edges::EdgeMap;
use crate::error::Error;
use crate::geometry::{Line, Point};
use crate::types::Side;
use log::debug;

/// Vertical clearance (pixels) below which an edge pixel is considered part
/// of the surface line rather than the droplet.
const SURFACE_CLEARANCE: f32 = 1.0;
/// Minimum pixel count for a component to qualify as the droplet boundary.
const MIN_COMPONENT_PIXELS: usize = 80;
/// Minimum bounding-box height in pixels.
const MIN_COMPONENT_HEIGHT: usize = 10;

/// One side of the droplet boundary, ordered from apex to surface.
#[derive(Clone, Debug)]
pub struct Branch {
    pub side: Side,
    pub points: Vec<Point>,
}

/// Extract the droplet boundary and split it into branches.
pub fn extract_contour(edges: &EdgeMap, surface: &Line) -> Result<(Branch, Branch), Error> {
    let component = largest_component_above(edges, surface).ok_or(Error::ContourNotFound)?;
    debug!("contour: droplet component has {} pixels", component.len());
    Ok(split_branches(&component))
}

/// Largest qualifying 8-connected component strictly above the surface line.
fn largest_component_above(edges: &EdgeMap, surface: &Line) -> Option<Vec<(usize, usize)>> {
    let (w, h) = (edges.width(), edges.height());
    let mut above = vec![false; w * h];
    for y in 0..h {
        for x in 0..w {
            if edges.get(x, y) && surface.y_at(x as f32) - y as f32 > SURFACE_CLEARANCE {
                above[y * w + x] = true;
            }
        }
    }

    let mut visited = vec![false; w * h];
    let mut best: Option<Vec<(usize, usize)>> = None;
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if !above[idx] || visited[idx] {
                continue;
            }
            visited[idx] = true;
            stack.push((x, y));
            let mut component = Vec::new();
            while let Some((cx, cy)) = stack.pop() {
                component.push((cx, cy));
                for dy in -1isize..=1 {
                    for dx in -1isize..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = cx as isize + dx;
                        let ny = cy as isize + dy;
                        if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                            continue;
                        }
                        let nidx = ny as usize * w + nx as usize;
                        if above[nidx] && !visited[nidx] {
                            visited[nidx] = true;
                            stack.push((nx as usize, ny as usize));
                        }
                    }
                }
            }

            if !component_qualifies(&component) {
                continue;
            }
            match &best {
                Some(b) if b.len() >= component.len() => {}
                _ => best = Some(component),
            }
        }
    }
    best
}

fn component_qualifies(component: &[(usize, usize)]) -> bool {
    if component.len() < MIN_COMPONENT_PIXELS {
        return false;
    }
    let min_y = component.iter().map(|&(_, y)| y).min().unwrap_or(0);
    let max_y = component.iter().map(|&(_, y)| y).max().unwrap_or(0);
    max_y - min_y >= MIN_COMPONENT_HEIGHT
}

/// Split a component at its topmost point into per-row outer extremes.
fn split_branches(component: &[(usize, usize)]) -> (Branch, Branch) {
    let apex_y = component.iter().map(|&(_, y)| y).min().unwrap_or(0);
    let max_y = component.iter().map(|&(_, y)| y).max().unwrap_or(0);

    // Split abscissa: mean x over the apex row.
    let apex_row: Vec<usize> = component
        .iter()
        .filter(|&&(_, y)| y == apex_y)
        .map(|&(x, _)| x)
        .collect();
    let split_x = apex_row.iter().sum::<usize>() as f32 / apex_row.len().max(1) as f32;

    let mut left = Vec::new();
    let mut right = Vec::new();
    for y in apex_y..=max_y {
        let row_xs = component
            .iter()
            .filter(|&&(_, py)| py == y)
            .map(|&(x, _)| x);
        let mut min_left: Option<usize> = None;
        let mut max_right: Option<usize> = None;
        for x in row_xs {
            if x as f32 <= split_x {
                min_left = Some(min_left.map_or(x, |m: usize| m.min(x)));
            }
            if x as f32 >= split_x {
                max_right = Some(max_right.map_or(x, |m: usize| m.max(x)));
            }
        }
        if let Some(x) = min_left {
            left.push(Point::from_pixel(x, y));
        }
        if let Some(x) = max_right {
            right.push(Point::from_pixel(x, y));
        }
    }

    (
        Branch {
            side: Side::Left,
            points: left,
        },
        Branch {
            side: Side::Right,
            points: right,
        },
    )
}
