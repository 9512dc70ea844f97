//! Sequential folder processing with a plain-text result log.
//!
//! Images are processed strictly one after another in sorted directory
//! order. Every image gets exactly one log line; failures are recorded with
//! an explicit marker and never abort the batch. Between images the runner
//! blocks on the [`OperatorGate`] so an operator can inspect the overlay
//! before the next image loads.

use crate::error::Error;
use crate::image::io::{load_grayscale_image, save_rgb};
use crate::overlay;
use crate::pipeline::DropAnalyzer;
use crate::types::{BranchAngle, Measurement};
use log::{debug, warn};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Host-provided suspension point between images.
///
/// The geometric pipeline never polls for input itself; the interactive
/// checkpoint is a collaborator the runner calls once per image.
pub trait OperatorGate {
    fn await_ack(&mut self) -> io::Result<()>;
}

/// Gate that never blocks, for non-interactive runs and tests.
pub struct NoWaitGate;

impl OperatorGate for NoWaitGate {
    fn await_ack(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Gate that blocks until a line arrives on stdin.
pub struct StdinGate;

impl OperatorGate for StdinGate {
    fn await_ack(&mut self) -> io::Result<()> {
        eprintln!("press Enter to continue to the next image...");
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(())
    }
}

/// Counters describing one batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    /// Images with at least one measured angle.
    pub measured: usize,
    /// Images that failed before any angle could be produced.
    pub failed: usize,
}

/// Process every accepted image in `folder`.
///
/// One log line per image goes to `sink`. When `overlay_dir` is given, an
/// overlay PNG is written per image and the gate is consulted before moving
/// on.
pub fn run_batch(
    folder: &Path,
    analyzer: &DropAnalyzer,
    sink: &mut dyn Write,
    gate: &mut dyn OperatorGate,
    overlay_dir: Option<&Path>,
) -> Result<BatchSummary, String> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(folder)
        .map_err(|e| format!("failed to read {}: {e}", folder.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_accepted_image(path))
        .collect();
    entries.sort();
    debug!("batch: {} candidate images in {}", entries.len(), folder.display());

    let mut summary = BatchSummary::default();
    for path in &entries {
        summary.processed += 1;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match process_one(path, &name, analyzer, overlay_dir) {
            Ok(measurement) => {
                if measurement.any_angle() {
                    summary.measured += 1;
                } else {
                    summary.failed += 1;
                }
                write_log_line(sink, &name, &measurement)
                    .map_err(|e| format!("failed to write log: {e}"))?;
            }
            Err(err) => {
                summary.failed += 1;
                warn!("batch: {name}: {err}");
                writeln!(sink, "File: {name}, FAILED({err})")
                    .map_err(|e| format!("failed to write log: {e}"))?;
            }
        }

        if overlay_dir.is_some() {
            gate.await_ack()
                .map_err(|e| format!("operator gate failed: {e}"))?;
        }
        // Image, edge map and contour buffers are scoped to process_one and
        // are gone before the next file loads.
    }
    Ok(summary)
}

fn process_one(
    path: &Path,
    name: &str,
    analyzer: &DropAnalyzer,
    overlay_dir: Option<&Path>,
) -> Result<Measurement, Error> {
    let gray = load_grayscale_image(path).map_err(Error::InvalidImage)?;
    let measurement = analyzer.measure(gray.as_view(), name)?;
    if let Some(dir) = overlay_dir {
        let canvas = overlay::render(&gray.as_view(), &measurement);
        let out = dir.join(format!("{name}.overlay.png"));
        if let Err(e) = save_rgb(&canvas, &out) {
            warn!("batch: {name}: {e}");
        }
    }
    Ok(measurement)
}

fn is_accepted_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ACCEPTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn write_log_line(
    sink: &mut dyn Write,
    name: &str,
    measurement: &Measurement,
) -> io::Result<()> {
    writeln!(
        sink,
        "File: {name}, left: {}, right: {}",
        format_side(&measurement.left),
        format_side(&measurement.right),
    )
}

fn format_side(outcome: &Result<BranchAngle, Error>) -> String {
    match outcome {
        Ok(branch) => format!("{:.2} deg", branch.angle_deg),
        Err(err) => format!("FAILED({err})"),
    }
}
