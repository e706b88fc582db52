//! # refras
//!
//! Analytic 2D polygon rasterizer: converts fixed-point polygonal paths
//! (with quadratic and cubic Bézier segments reduced to line segments) into
//! 8-bit coverage masks and composites them, under a non-zero or even-odd
//! fill rule, onto a 32-bit pre-multiplied ARGB raster.
//!
//! The pipeline has two halves:
//!
//! 1. **Edge analysis and cell accumulation** — every line segment is walked
//!    with an exact integer DDA that deposits signed `(cover, area)` values
//!    into the pixel cells it crosses ([`edge_cells`], [`cell_grid`]).
//! 2. **Scanline sweep and compositing** — per row, covers are integrated
//!    into winding numbers, mapped through the fill rule to an alpha mask,
//!    and composited source-over ([`compositor`]).
//!
//! Three sweep organizations are available behind one façade
//! ([`rasterizer`]): a dense full-grid sweep, a per-row column-bounds sweep,
//! and a per-row dirty-bitmap sweep. All three produce byte-identical
//! output; they differ in how sweep cost scales with covered area.

// Foundation
pub mod argb_image;
pub mod basics;
pub mod bit_vector;
pub mod cell_grid;

// Edge analysis
pub mod curve_subdiv;
pub mod edge_cells;

// Sweep and compositing
pub mod compositor;
pub mod rasterizer_bitmap;
pub mod rasterizer_bounds;
pub mod rasterizer_dense;

// Façade
pub mod rasterizer;
