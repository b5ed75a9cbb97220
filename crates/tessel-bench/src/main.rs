//! tessel-bench: CLI tool for SLIC parameter experimentation and diagnostics.
//!
//! Segments a given image file with configurable parameters, printing
//! the run's diagnostics report. Useful for:
//!
//! - Tuning superpixel size and color weight for a kind of image
//! - Checking how many iterations a parameter set needs to converge
//! - Rendering contour overlays and mean-color mosaics for inspection
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin tessel-bench -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG=debug` to see per-iteration progress.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use image::Rgb;
use tessel_slic::{RgbImage, Segmentation, SlicConfig};

/// SLIC parameter experimentation and diagnostics for tessel.
///
/// Segments an image into superpixels and prints the seed layout,
/// per-iteration churn, and outcome of the run.
#[derive(Parser)]
#[command(name = "tessel-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Superpixel side length in pixels (seed grid spacing).
    #[arg(long, default_value_t = SlicConfig::DEFAULT_SUPERPIXEL_SIZE)]
    superpixel_size: u32,

    /// Maximum number of assign + update iterations.
    #[arg(long, default_value_t = SlicConfig::DEFAULT_MAX_ITERATIONS)]
    iterations: u32,

    /// Color weight: larger values favor compact, grid-like superpixels.
    #[arg(long, default_value_t = SlicConfig::DEFAULT_COLOR_WEIGHT)]
    color_weight: f32,

    /// Full SLIC config as a JSON string.
    ///
    /// When provided, the individual parameter flags are ignored.
    /// The JSON must be a valid `SlicConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write a contour overlay PNG to this path.
    #[arg(long)]
    contours: Option<PathBuf>,

    /// Write a mean-color mosaic PNG to this path.
    #[arg(long)]
    mean: Option<PathBuf>,

    /// Write the label grid as JSON to this path.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,
}

/// Build a [`SlicConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<SlicConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(SlicConfig {
        superpixel_size: cli.superpixel_size,
        max_iterations: cli.iterations,
        color_weight: cli.color_weight,
    })
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c.sanitized(),
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let rgb = match tessel_slic::color::decode(&image_bytes) {
        Ok(rgb) => rgb,
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes, {}x{})",
        cli.image_path.display(),
        image_bytes.len(),
        rgb.width(),
        rgb.height(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut durations = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let start = Instant::now();
        let segmentation = match tessel_slic::segment_rgb(&rgb, &config) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Segmentation error: {e}");
                return ExitCode::FAILURE;
            }
        };
        let elapsed = start.elapsed();
        durations.push(elapsed);

        if cli.json {
            match serde_json::to_string_pretty(&segmentation.diagnostics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", segmentation.diagnostics.report());
            println!("Duration: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
        }

        // Write outputs on the first run only.
        if run == 0 && !write_outputs(&cli, &rgb, &segmentation) {
            return ExitCode::FAILURE;
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&durations);
    }

    ExitCode::SUCCESS
}

/// Write every requested output file. Returns `false` if any failed.
fn write_outputs(cli: &Cli, rgb: &RgbImage, segmentation: &Segmentation) -> bool {
    let mut ok = true;

    if let Some(ref path) = cli.contours {
        match tessel_export::overlay_contours(rgb, &segmentation.labels, Rgb([255, 255, 255])) {
            Ok(overlay) => ok &= save_png(&overlay, path, "Contour overlay"),
            Err(e) => {
                eprintln!("Error rendering contours: {e}");
                ok = false;
            }
        }
    }

    if let Some(ref path) = cli.mean {
        match tessel_export::mean_color_image(rgb, &segmentation.labels) {
            Ok(mosaic) => ok &= save_png(&mosaic, path, "Mean-color mosaic"),
            Err(e) => {
                eprintln!("Error rendering mean colors: {e}");
                ok = false;
            }
        }
    }

    if let Some(ref path) = cli.labels {
        let written = tessel_export::labels_to_json(&segmentation.labels)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                std::fs::write(path, &json)
                    .map(|()| json.len())
                    .map_err(|e| e.to_string())
            });
        match written {
            Ok(len) => eprintln!("Labels written to {} ({len} bytes)", path.display()),
            Err(e) => {
                eprintln!("Error writing labels to {}: {e}", path.display());
                ok = false;
            }
        }
    }

    ok
}

fn save_png(image: &RgbImage, path: &Path, what: &str) -> bool {
    match image.save_with_format(path, image::ImageFormat::Png) {
        Ok(()) => {
            eprintln!("{what} written to {}", path.display());
            true
        }
        Err(e) => {
            eprintln!("Error writing {} to {}: {e}", what.to_lowercase(), path.display());
            false
        }
    }
}

/// Print aggregated timing across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(durations: &[Duration]) {
    println!();
    println!("Summary ({} runs)\n{}", durations.len(), "=".repeat(60));

    let millis: Vec<f64> = durations
        .iter()
        .map(|d| d.as_secs_f64() * 1000.0)
        .collect();

    let min = millis.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = millis.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = millis.iter().sum::<f64>() / millis.len().max(1) as f64;

    println!("Duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");
}
