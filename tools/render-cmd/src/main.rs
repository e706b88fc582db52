//! Command-line polygon renderer.
//!
//! Usage:
//!   render-cmd --width=W --height=H --output=file.bmp [options] X Y X Y [...]
//!
//! The coordinate list is one polygon; the driver closes it back to the
//! first vertex. Output is a 32-bit top-down BMP of the composited raster,
//! or an 8-bit grayscale coverage BMP with `--gray`.

use std::env;
use std::path::Path;
use std::process;

use refras::argb_image::Argb32Buffer;
use refras::basics::{FillRule, PointD};
use refras::rasterizer::{CellRaster, RasterMethod, Rasterizer};
use render_cmd::{arg_value, encode_bmp_argb32, encode_bmp_gray8, has_arg, parse_color, write_file};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    process::exit(run(&args));
}

fn usage() {
    eprintln!(
        "Usage: render-cmd --width=W --height=H --output=file.bmp [options] X Y X Y [...]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --even-odd         even-odd fill rule (default: non-zero)");
    eprintln!("  --method=NAME      dense | row-bounds | bitmap-4 | bitmap-8 |");
    eprintln!("                     bitmap-16 | bitmap-32 (default: dense)");
    eprintln!("  --simd             wide composite kernel");
    eprintln!("  --color=AARRGGBB   straight ARGB source color (default: FFFFFFFF)");
    eprintln!("  --gray             write the 8-bit coverage mask instead");
}

fn parse_method(name: &str) -> Option<RasterMethod> {
    match name {
        "dense" => Some(RasterMethod::Dense),
        "row-bounds" => Some(RasterMethod::RowBounds),
        "bitmap-4" => Some(RasterMethod::Bitmap4),
        "bitmap-8" => Some(RasterMethod::Bitmap8),
        "bitmap-16" => Some(RasterMethod::Bitmap16),
        "bitmap-32" => Some(RasterMethod::Bitmap32),
        _ => None,
    }
}

fn run(args: &[String]) -> i32 {
    if args.is_empty() || has_arg(args, "--help") {
        usage();
        return 1;
    }

    let (width, height) = match (
        arg_value(args, "--width").and_then(|v| v.parse::<i32>().ok()),
        arg_value(args, "--height").and_then(|v| v.parse::<i32>().ok()),
    ) {
        (Some(w), Some(h)) if w >= 0 && h >= 0 => (w, h),
        _ => {
            usage();
            return 1;
        }
    };

    let output = match arg_value(args, "--output") {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => {
            usage();
            return 1;
        }
    };

    let rule = if has_arg(args, "--even-odd") {
        FillRule::EvenOdd
    } else {
        FillRule::NonZero
    };

    let method = match arg_value(args, "--method") {
        None => RasterMethod::Dense,
        Some(name) => match parse_method(name) {
            Some(method) => method,
            None => {
                eprintln!("Unknown method '{}'", name);
                return 1;
            }
        },
    };

    let color = match arg_value(args, "--color") {
        None => 0xFFFFFFFF,
        Some(text) => match parse_color(text) {
            Some(color) => color,
            None => {
                eprintln!("Invalid color '{}' (expected 8 hex digits AARRGGBB)", text);
                return 1;
            }
        },
    };

    // Positional arguments are the coordinate list.
    let mut coords = Vec::new();
    for arg in args {
        if arg.starts_with("--") {
            continue;
        }
        match arg.parse::<f64>() {
            Ok(v) => coords.push(v),
            Err(_) => {
                eprintln!("Invalid coordinate '{}'", arg);
                return 1;
            }
        }
    }
    if coords.len() % 2 != 0 || coords.len() < 4 {
        eprintln!("Expected at least two X Y coordinate pairs");
        return 1;
    }

    let mut poly: Vec<PointD> = coords
        .chunks_exact(2)
        .map(|xy| PointD::new(xy[0], xy[1]))
        .collect();
    for p in &poly {
        if p.x < 0.0 || p.y < 0.0 || p.x > width as f64 || p.y > height as f64 {
            eprintln!("Coordinate ({}, {}) out of range", p.x, p.y);
            return 1;
        }
    }
    // Close the polygon.
    poly.push(poly[0]);

    let mut ras = Rasterizer::new(method);
    if !ras.init(width, height) {
        eprintln!("Failed to allocate a {}x{} raster", width, height);
        return 1;
    }
    ras.set_fill_rule(rule);
    ras.set_simd(has_arg(args, "--simd"));
    ras.add_poly(&poly);

    let bytes = if has_arg(args, "--gray") {
        let mut coverage = vec![0u8; width as usize * height as usize];
        for y in 0..height {
            let row = &mut coverage[(y * width) as usize..((y + 1) * width) as usize];
            ras.sweep_coverage(y, row);
        }
        encode_bmp_gray8(&coverage, width, height)
    } else {
        let mut image = Argb32Buffer::new(width, height);
        ras.render(&mut image.view(), color);
        encode_bmp_argb32(&image)
    };

    if let Err(err) = write_file(Path::new(&output), &bytes) {
        eprintln!("Cannot write '{}': {}", output, err);
        return 1;
    }
    0
}
