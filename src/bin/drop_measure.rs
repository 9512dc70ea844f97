//! Measure the contact angle of a single image.
//!
//! Usage: `drop_measure <image> [--params parameters.txt] [--overlay out.png]
//! [--enhanced out.png] [--json report.json]`
//!
//! `--overlay` saves the verification overlay and pauses for an Enter
//! keystroke, `--enhanced` saves the contrast-enhanced intermediate (useful
//! when tuning the edge thresholds), `--json` dumps the full measurement
//! record.

use drop_angle::batch::{OperatorGate, StdinGate};
use drop_angle::image::io::{
    load_grayscale_image, save_grayscale_f32, save_rgb, write_json_file,
};
use drop_angle::overlay;
use drop_angle::params::DropParams;
use drop_angle::pipeline::DropAnalyzer;
use drop_angle::preprocess;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1);
    let mut image_path: Option<PathBuf> = None;
    let mut params_path: Option<PathBuf> = None;
    let mut overlay_path: Option<PathBuf> = None;
    let mut enhanced_path: Option<PathBuf> = None;
    let mut json_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--params" => params_path = Some(next_value(&mut args, "--params")?),
            "--overlay" => overlay_path = Some(next_value(&mut args, "--overlay")?),
            "--enhanced" => enhanced_path = Some(next_value(&mut args, "--enhanced")?),
            "--json" => json_path = Some(next_value(&mut args, "--json")?),
            _ if image_path.is_none() => image_path = Some(PathBuf::from(arg)),
            _ => return Err(usage()),
        }
    }
    let image_path = image_path.ok_or_else(usage)?;

    let params = match params_path {
        Some(path) => DropParams::from_file(&path),
        None => DropParams::default(),
    };
    let analyzer = DropAnalyzer::new(params);

    let measurement = analyzer
        .measure_file(&image_path)
        .map_err(|e| e.to_string())?;

    println!("File: {}", measurement.image_id);
    for outcome in [&measurement.left, &measurement.right] {
        match outcome {
            Ok(branch) => println!("  {} angle: {:.2} deg", branch.side, branch.angle_deg),
            Err(err) => println!("  {err}"),
        }
    }
    println!("  latency: {:.2} ms", measurement.latency_ms);

    if let Some(path) = enhanced_path {
        let gray = load_grayscale_image(&image_path)?;
        let enhanced = preprocess::enhance(&gray.as_view(), analyzer.params().clip_limit)
            .map_err(|e| e.to_string())?;
        save_grayscale_f32(&enhanced, &path)?;
        println!("Saved enhanced image to {}", path.display());
    }
    if let Some(path) = overlay_path {
        let gray = load_grayscale_image(&image_path)?;
        let canvas = overlay::render(&gray.as_view(), &measurement);
        save_rgb(&canvas, &path)?;
        println!("Saved overlay to {}", path.display());
        StdinGate.await_ack().map_err(|e| e.to_string())?;
    }
    if let Some(path) = json_path {
        write_json_file(&path, &measurement)?;
        println!("Saved report to {}", path.display());
    }
    Ok(())
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<PathBuf, String> {
    args.next()
        .map(PathBuf::from)
        .ok_or_else(|| format!("{flag} expects a path\n{}", usage()))
}

fn usage() -> String {
    "Usage: drop_measure <image> [--params parameters.txt] [--overlay out.png] \
     [--enhanced out.png] [--json report.json]"
        .to_string()
}
