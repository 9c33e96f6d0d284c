use clap::{arg, Command};
use log::warn;
use std::path::Path;

use srfview::lib::srf::FrameSet;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let matches = Command::new("srf_info")
        .version("1.0")
        .about("Display information about .srf surface sequence files")
        .arg(arg!(<FILE> "Surface file to analyze"))
        .get_matches();

    let file_path = matches.get_one::<String>("FILE").unwrap();
    let path = Path::new(file_path);
    if !path.exists() {
        eprintln!("Error: File '{}' does not exist", file_path);
        std::process::exit(1);
    }

    let frames = FrameSet::parse(path)?;

    let times: Vec<f64> = frames.frames().iter().map(|f| f.time).collect();
    if times.windows(2).any(|pair| pair[1] <= pair[0]) {
        warn!("timestamps are not strictly increasing");
    }

    println!("Surface File Information:");
    println!("=========================");
    println!("File: {}", path.display());
    println!("Number of surfaces: {}", frames.frame_count());
    if let (Some(first), Some(last)) = (times.first(), times.last()) {
        println!("Time range: {:.6} s .. {:.6} s", first, last);
    }

    let point_counts: Vec<usize> = frames.frames().iter().map(|f| f.points.len()).collect();
    if let (Some(min), Some(max)) = (point_counts.iter().min(), point_counts.iter().max()) {
        println!("Points per surface: {} .. {}", min, max);
    }

    let x_bounds = fold_ranges(frames.frames().iter().filter_map(|f| f.x_bounds()));
    let y_bounds = fold_ranges(frames.frames().iter().filter_map(|f| f.y_bounds()));
    if let (Some((x_min, x_max)), Some((y_min, y_max))) = (x_bounds, y_bounds) {
        println!("\nBounding Box (nm):");
        println!("  x: [{:.6}, {:.6}]", x_min, x_max);
        println!("  y: [{:.6}, {:.6}]", y_min, y_max);
    }

    Ok(())
}

fn fold_ranges(ranges: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    ranges.fold(None, |acc, (lo, hi)| match acc {
        None => Some((lo, hi)),
        Some((a, b)) => Some((a.min(lo), b.max(hi))),
    })
}
