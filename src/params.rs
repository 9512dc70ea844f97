//! Measurement parameters and the plain-text parameters file.
//!
//! All knobs are gathered in [`DropParams`] and passed by value into every
//! stage; nothing reads ambient global state. The struct deserializes from
//! JSON with per-field defaults, and [`DropParams::from_file`] additionally
//! understands the historical `KEY = value` text format:
//!
//! ```text
//! CLIP_LIMIT = 3.0        # CLAHE clip limit
//! THRESHOLD1 = 50         # hysteresis low threshold
//! THRESHOLD2 = 150        # hysteresis high threshold
//! POINTS_TO_TAKE = 30
//! HEIGHT_THRESHOLD_START = 40
//! HEIGHT_THRESHOLD_FINISH = 5
//! JUMP_THRESHOLD = 2
//! MIN_POINTS_TO_FIND = 4
//! ```
//!
//! A missing file yields the defaults; a malformed line leaves only that key
//! at its default and the rest of the file is still honored.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Pipeline parameters, loaded once per run and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropParams {
    /// CLAHE contrast clip limit (relative to a uniform tile histogram).
    pub clip_limit: f32,
    /// Hysteresis low threshold on gradient magnitude; controls edge continuity.
    pub low_threshold: f32,
    /// Hysteresis high threshold; seeds edges and suppresses texture noise.
    pub high_threshold: f32,
    /// Number of surface candidates considered in scan order.
    pub points_to_take: usize,
    /// Background-noise bound of the surface band, and the upper clearance of
    /// the tangent window (pixels).
    pub height_threshold_start: u32,
    /// Droplet-bleed bound of the surface band, and the lower clearance of
    /// the tangent window (pixels).
    pub height_threshold_finish: u32,
    /// Maximum horizontal discontinuity between accepted points (pixels).
    pub jump_threshold: u32,
    /// Minimum accepted points for any line fit to be attempted.
    pub min_points_to_find: usize,
}

impl Default for DropParams {
    fn default() -> Self {
        Self {
            clip_limit: 3.0,
            low_threshold: 50.0,
            high_threshold: 150.0,
            points_to_take: 30,
            height_threshold_start: 40,
            height_threshold_finish: 5,
            jump_threshold: 2,
            min_points_to_find: 4,
        }
    }
}

impl DropParams {
    /// Load parameters from a `KEY = value` text file.
    ///
    /// A missing file is not an error: the defaults apply. Malformed lines
    /// keep their key at its default value; the rest of the file is parsed.
    pub fn from_file(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(_) => {
                warn!(
                    "parameters file {} not readable, using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Parse the `KEY = value` format. See the module docs for the keys.
    pub fn parse(text: &str) -> Self {
        let mut params = Self::default();
        for raw in text.lines() {
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("skipping parameters line without '=': {raw:?}");
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "CLIP_LIMIT" => assign(&mut params.clip_limit, key, value),
                "THRESHOLD1" => assign(&mut params.low_threshold, key, value),
                "THRESHOLD2" => assign(&mut params.high_threshold, key, value),
                "POINTS_TO_TAKE" => assign(&mut params.points_to_take, key, value),
                "HEIGHT_THRESHOLD_START" => {
                    assign(&mut params.height_threshold_start, key, value)
                }
                "HEIGHT_THRESHOLD_FINISH" => {
                    assign(&mut params.height_threshold_finish, key, value)
                }
                "JUMP_THRESHOLD" => assign(&mut params.jump_threshold, key, value),
                "MIN_POINTS_TO_FIND" => assign(&mut params.min_points_to_find, key, value),
                _ => {}
            }
        }
        params
    }
}

fn assign<T: std::str::FromStr>(slot: &mut T, key: &str, value: &str) {
    match value.parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!("malformed value for {key}: {value:?}, keeping default"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let p = DropParams::default();
        assert_eq!(p.clip_limit, 3.0);
        assert_eq!(p.low_threshold, 50.0);
        assert_eq!(p.high_threshold, 150.0);
        assert_eq!(p.points_to_take, 30);
        assert_eq!(p.height_threshold_start, 40);
        assert_eq!(p.height_threshold_finish, 5);
        assert_eq!(p.jump_threshold, 2);
        assert_eq!(p.min_points_to_find, 4);
    }

    #[test]
    fn parses_full_file_with_comments() {
        let text = "\
CLIP_LIMIT = 2.5 # contrast
THRESHOLD1 = 40
THRESHOLD2 = 120

POINTS_TO_TAKE = 25
HEIGHT_THRESHOLD_START = 35
HEIGHT_THRESHOLD_FINISH = 4
JUMP_THRESHOLD = 3
MIN_POINTS_TO_FIND = 6
";
        let p = DropParams::parse(text);
        assert_eq!(p.clip_limit, 2.5);
        assert_eq!(p.low_threshold, 40.0);
        assert_eq!(p.high_threshold, 120.0);
        assert_eq!(p.points_to_take, 25);
        assert_eq!(p.height_threshold_start, 35);
        assert_eq!(p.height_threshold_finish, 4);
        assert_eq!(p.jump_threshold, 3);
        assert_eq!(p.min_points_to_find, 6);
    }

    #[test]
    fn malformed_line_only_affects_its_key() {
        let text = "CLIP_LIMIT = not-a-number\nTHRESHOLD1 = 60\n";
        let p = DropParams::parse(text);
        assert_eq!(p.clip_limit, 3.0);
        assert_eq!(p.low_threshold, 60.0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let p = DropParams::parse("SOMETHING_ELSE = 9\nJUMP_THRESHOLD = 5\n");
        assert_eq!(p.jump_threshold, 5);
        assert_eq!(p.points_to_take, 30);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let p = DropParams::from_file(Path::new("/nonexistent/parameters.txt"));
        assert_eq!(p, DropParams::default());
    }
}
