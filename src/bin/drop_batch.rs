//! Measure every image in a folder and append the results to a log file.
//!
//! Usage: `drop_batch <folder> [--params parameters.txt] [--log results.log]
//! [--append] [--overlay-dir dir] [--no-wait]`
//!
//! One line is written per image; failures are logged with a marker and the
//! batch continues. With `--overlay-dir` an overlay PNG is saved per image
//! and the run pauses for an Enter keystroke between images (unless
//! `--no-wait` is given).

use drop_angle::batch::{run_batch, NoWaitGate, OperatorGate, StdinGate};
use drop_angle::params::DropParams;
use drop_angle::pipeline::DropAnalyzer;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1);
    let mut folder: Option<PathBuf> = None;
    let mut params_path: Option<PathBuf> = None;
    let mut log_path = PathBuf::from("results.log");
    let mut append = false;
    let mut overlay_dir: Option<PathBuf> = None;
    let mut no_wait = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--params" => params_path = Some(next_value(&mut args, "--params")?),
            "--log" => log_path = next_value(&mut args, "--log")?,
            "--append" => append = true,
            "--overlay-dir" => overlay_dir = Some(next_value(&mut args, "--overlay-dir")?),
            "--no-wait" => no_wait = true,
            _ if folder.is_none() => folder = Some(PathBuf::from(arg)),
            _ => return Err(usage()),
        }
    }
    let folder = folder.ok_or_else(usage)?;

    let params = match params_path {
        Some(path) => DropParams::from_file(&path),
        None => DropParams::default(),
    };
    let analyzer = DropAnalyzer::new(params);

    let mut sink = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(&log_path)
        .map_err(|e| format!("failed to open log {}: {e}", log_path.display()))?;

    let mut stdin_gate = StdinGate;
    let mut no_wait_gate = NoWaitGate;
    let gate: &mut dyn OperatorGate = if no_wait || overlay_dir.is_none() {
        &mut no_wait_gate
    } else {
        &mut stdin_gate
    };

    let summary = run_batch(
        &folder,
        &analyzer,
        &mut sink,
        gate,
        overlay_dir.as_deref(),
    )?;
    println!(
        "Processed {} images: {} measured, {} failed. Log: {}",
        summary.processed,
        summary.measured,
        summary.failed,
        log_path.display()
    );
    Ok(())
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<PathBuf, String> {
    args.next()
        .map(PathBuf::from)
        .ok_or_else(|| format!("{flag} expects a value\n{}", usage()))
}

fn usage() -> String {
    "Usage: drop_batch <folder> [--params parameters.txt] [--log results.log] [--append] \
     [--overlay-dir dir] [--no-wait]"
        .to_string()
}
