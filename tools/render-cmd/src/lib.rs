//! Support library for the `render-cmd` driver: `--key=value` argument
//! lookup and the two BMP encoders (32-bit top-down ARGB and 8-bit
//! grayscale-paletted coverage).

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use refras::argb_image::Argb32Buffer;

// ============================================================================
// Argument lookup
// ============================================================================

/// Value of `--key=value` in `args`, or `Some("")` for a bare `--key`.
pub fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    for arg in args {
        if let Some(rest) = arg.strip_prefix(key) {
            if rest.is_empty() {
                return Some("");
            }
            if let Some(value) = rest.strip_prefix('=') {
                return Some(value);
            }
        }
    }
    None
}

/// `true` when `--key` (with or without a value) is present.
pub fn has_arg(args: &[String], key: &str) -> bool {
    arg_value(args, key).is_some()
}

/// Parse a straight ARGB32 color given as 8 hex digits (`AARRGGBB`).
pub fn parse_color(text: &str) -> Option<u32> {
    if text.len() != 8 {
        return None;
    }
    u32::from_str_radix(text, 16).ok()
}

// ============================================================================
// BMP encoding
// ============================================================================

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_headers(out: &mut Vec<u8>, pixel_offset: u32, file_size: u32, w: i32, h: i32, bpp: u16, palette_entries: u32) {
    // File header (14 bytes).
    out.extend_from_slice(b"BM");
    push_u32(out, file_size);
    push_u32(out, 0); // reserved
    push_u32(out, pixel_offset);

    // BITMAPINFOHEADER (40 bytes).
    push_u32(out, 40);
    push_i32(out, w);
    push_i32(out, h);
    push_u16(out, 1); // planes
    push_u16(out, bpp);
    push_u32(out, 0); // BI_RGB
    push_u32(out, 0); // image size (0 is valid for BI_RGB)
    push_u32(out, 0); // x pixels per meter
    push_u32(out, 0); // y pixels per meter
    push_u32(out, palette_entries);
    push_u32(out, palette_entries);
}

/// Encode a 32-bit top-down BMP (height stored negative). ARGB words in
/// little-endian order are exactly the BGRA byte layout BMP wants.
pub fn encode_bmp_argb32(image: &Argb32Buffer) -> Vec<u8> {
    let w = image.width();
    let h = image.height();
    let image_size = (w as u32) * (h as u32) * 4;
    let pixel_offset = 14 + 40;
    let mut out = Vec::with_capacity(pixel_offset as usize + image_size as usize);

    push_headers(&mut out, pixel_offset, pixel_offset + image_size, w, -h, 32, 0);
    for &px in image.data() {
        push_u32(&mut out, px);
    }
    out
}

/// Encode an 8-bit paletted BMP with a 256-entry grayscale palette from a
/// row-major coverage buffer. Rows are stored bottom-up and padded to four
/// bytes.
pub fn encode_bmp_gray8(coverage: &[u8], w: i32, h: i32) -> Vec<u8> {
    assert_eq!(coverage.len(), w as usize * h as usize);
    let stride = (w as usize + 3) & !3;
    let image_size = (stride * h as usize) as u32;
    let pixel_offset = 14 + 40 + 4 * 256;
    let mut out = Vec::with_capacity(pixel_offset as usize + image_size as usize);

    push_headers(&mut out, pixel_offset, pixel_offset + image_size, w, h, 8, 256);
    for i in 0..=255u8 {
        out.extend_from_slice(&[i, i, i, 0]);
    }

    let padding = stride - w as usize;
    for y in (0..h as usize).rev() {
        out.extend_from_slice(&coverage[y * w as usize..(y + 1) * w as usize]);
        out.extend_from_slice(&[0u8; 3][..padding]);
    }
    out
}

/// Write encoded BMP bytes to `path`.
pub fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    File::create(path)?.write_all(bytes)
}

// ============================================================================
// Tests
// ============================================================================
