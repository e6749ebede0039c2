// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: detect and classify tennis court lines in a camera frame
//!
//! Usage:
//!   courtline <image_path> [options]

use anyhow::{bail, Context, Result};
use courtline_vision::image_ops::{active_fraction, DEFAULT_RAW_HEIGHT, DEFAULT_RAW_WIDTH};
use courtline_vision::{
    apply_binarization, detect_court_lines, load_image, load_raw, save_csv, save_json,
    save_overlay, Binarization, DetectionConfig, OverlayOptions, SampleGrid,
};
use std::env;

struct Options {
    image_path: String,
    raw_size: Option<(u32, u32)>,
    config_path: Option<String>,
    binarization: Option<Binarization>,
    hough_threshold: Option<u32>,
    csv_path: Option<String>,
    json_path: Option<String>,
    overlay_path: Option<String>,
    markers: bool,
    debug: bool,
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return Ok(());
    }

    let options = parse_args(&args)?;

    let default_filter = if options.debug { "info,courtline_vision=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    run(&options)
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        image_path: args[1].clone(),
        raw_size: None,
        config_path: None,
        binarization: None,
        hough_threshold: None,
        csv_path: None,
        json_path: None,
        overlay_path: None,
        markers: false,
        debug: false,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--raw" => {
                i += 1;
                options.raw_size = Some(parse_raw_size(value(args, i, "--raw")?)?);
            }
            "--config" => {
                i += 1;
                options.config_path = Some(value(args, i, "--config")?.to_string());
            }
            "--binarize" => {
                i += 1;
                options.binarization = Some(parse_binarization(value(args, i, "--binarize")?)?);
            }
            "--hough-threshold" => {
                i += 1;
                let raw = value(args, i, "--hough-threshold")?;
                options.hough_threshold = Some(
                    raw.parse()
                        .with_context(|| format!("invalid hough threshold '{}'", raw))?,
                );
            }
            "--csv" => {
                i += 1;
                options.csv_path = Some(value(args, i, "--csv")?.to_string());
            }
            "--json" => {
                i += 1;
                options.json_path = Some(value(args, i, "--json")?.to_string());
            }
            "--overlay" => {
                i += 1;
                options.overlay_path = Some(value(args, i, "--overlay")?.to_string());
            }
            "--markers" => {
                options.markers = true;
            }
            "--debug" => {
                options.debug = true;
            }
            other => {
                print_usage();
                bail!("unknown option: {}", other);
            }
        }
        i += 1;
    }

    Ok(options)
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    match args.get(i) {
        Some(v) => Ok(v.as_str()),
        None => bail!("{} expects a value", flag),
    }
}

fn parse_raw_size(size: &str) -> Result<(u32, u32)> {
    if size == "default" {
        return Ok((DEFAULT_RAW_WIDTH, DEFAULT_RAW_HEIGHT));
    }
    let (w, h) = size
        .split_once(['x', 'X'])
        .with_context(|| format!("raw size '{}' is not WIDTHxHEIGHT", size))?;
    let width = w.parse().with_context(|| format!("invalid raw width '{}'", w))?;
    let height = h.parse().with_context(|| format!("invalid raw height '{}'", h))?;
    Ok((width, height))
}

fn parse_binarization(mode: &str) -> Result<Binarization> {
    Ok(match mode {
        "none" => Binarization::None,
        "otsu" => Binarization::Otsu,
        level => Binarization::Fixed(
            level
                .parse()
                .with_context(|| format!("invalid binarization level '{}'", level))?,
        ),
    })
}

fn run(options: &Options) -> Result<()> {
    let mut config = match &options.config_path {
        Some(path) => DetectionConfig::from_json_file(path)
            .with_context(|| format!("cannot load config '{}'", path))?,
        None => DetectionConfig::default(),
    };
    if let Some(binarization) = options.binarization {
        config.binarization = binarization;
    }
    if let Some(threshold) = options.hough_threshold {
        config.hough_threshold = threshold;
    }

    println!("=== Court Line Detection ===");
    println!();

    // Step 1: Load image
    println!("[1/4] Loading image: {}", options.image_path);
    let frame = match options.raw_size {
        Some((width, height)) => load_raw(&options.image_path, width, height),
        None => load_image(&options.image_path),
    }
    .with_context(|| format!("cannot load image '{}'", options.image_path))?;
    println!("  Image size: {}x{} pixels", frame.width(), frame.height());

    // Step 2: Binarize
    println!("[2/4] Binarizing ({:?})...", config.binarization);
    let binary = apply_binarization(&frame, config.binarization);
    let grid = SampleGrid::from_gray_image(&binary);
    println!("  {:.2}% of pixels active", active_fraction(&binary) * 100.0);

    // Step 3: Detect
    println!("[3/4] Detecting lines (threshold {})...", config.hough_threshold);
    let detection = detect_court_lines(&grid, &config);
    let stats = &detection.stats;
    println!(
        "  {} active samples, {} raw lines, {} after merging ({} horizontal, {} vertical)",
        stats.active_samples,
        stats.raw_lines,
        stats.pruned_lines,
        stats.horizontal_lines,
        stats.vertical_lines
    );
    println!(
        "  {} false intersections removed",
        stats.false_intersections_removed
    );

    if options.debug {
        for (i, line) in detection.lines.iter().enumerate() {
            println!(
                "  line {:>2}: d={:.1} angle={:.1} {:?}",
                i,
                line.distance,
                line.angle,
                line.orientation()
            );
        }
        for entry in &detection.intersections.horizontal {
            println!("  horizontal {:>2}: {:?}", entry.line.0, entry.points);
        }
    }

    // Step 4: Report and export
    let segments = detection.final_segments();
    println!("[4/4] {} court lines:", segments.len());
    for segment in &segments {
        println!(
            "  {:<20} ({}, {}) -> ({}, {})",
            segment.class.as_str(),
            segment.origin.x,
            segment.origin.y,
            segment.destination.x,
            segment.destination.y
        );
    }

    if let Some(path) = &options.csv_path {
        save_csv(path, &segments).with_context(|| format!("cannot write '{}'", path))?;
        println!("  Wrote {}", path);
    }
    if let Some(path) = &options.json_path {
        save_json(path, &detection).with_context(|| format!("cannot write '{}'", path))?;
        println!("  Wrote {}", path);
    }
    if let Some(path) = &options.overlay_path {
        let overlay_options = OverlayOptions {
            markers: options.markers,
            raw_lines: options.debug,
            internal_segments: options.debug,
        };
        save_overlay(path, &binary, &detection, overlay_options)
            .with_context(|| format!("cannot write '{}'", path))?;
        println!("  Wrote {}", path);
    }

    Ok(())
}

fn print_usage() {
    println!("Usage: courtline <image_path> [options]");
    println!();
    println!("Options:");
    println!("  --raw WxH|default      Read a headerless 8-bit frame (default 1392x550)");
    println!("  --config <file.json>   Load detection settings");
    println!("  --binarize N|otsu|none Binarization level (default 150)");
    println!("  --hough-threshold N    Minimum accumulator votes (default 200)");
    println!("  --csv <path>           Write final segments as CSV");
    println!("  --json <path>          Write the full detection as JSON");
    println!("  --overlay <path>       Write a PNG overlay of the detected lines");
    println!("  --markers              Mark intersections on the overlay");
    println!("  --debug                Verbose logging and line listing");
}
