//! Rasterizer façade — variant selection and the common lifecycle API.
//!
//! The three sweep organizations live behind one interface: [`CellRaster`]
//! is the lifecycle trait (`init` / `add_*` / `render` / `clear` / `reset`),
//! and [`Rasterizer`] is a tagged variant chosen at construction with a
//! [`RasterMethod`]. All variants produce byte-identical pixel output for
//! identical input; they differ only in how sweep cost scales with covered
//! area versus raster area.
//!
//! Lifecycle: all `add_*` calls for a frame complete before `render`;
//! `render` consumes the frame (cells and trackers are empty afterwards), so
//! rendering again without new edges produces nothing. A rasterizer instance
//! is single-threaded; distinct instances are fully independent.

use crate::argb_image::Argb32View;
use crate::basics::{to_fixed, FillRule, PointD};
use crate::curve_subdiv::{flatten_cubic, flatten_quad};
use crate::edge_cells::render_poly;
use crate::rasterizer_bitmap::RasterizerBitmap;
use crate::rasterizer_bounds::RasterizerBounds;
use crate::rasterizer_dense::RasterizerDense;

// ============================================================================
// RasterMethod
// ============================================================================

/// Sweep organization selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterMethod {
    /// Sweep every column of every row.
    Dense,
    /// Sweep per-row `[start, end]` column bounds.
    RowBounds,
    /// Sweep per-row dirty bits, 4 columns per bit.
    Bitmap4,
    /// Sweep per-row dirty bits, 8 columns per bit.
    Bitmap8,
    /// Sweep per-row dirty bits, 16 columns per bit.
    Bitmap16,
    /// Sweep per-row dirty bits, 32 columns per bit.
    Bitmap32,
}

impl RasterMethod {
    /// All selectable methods, in declaration order.
    pub const ALL: [RasterMethod; 6] = [
        RasterMethod::Dense,
        RasterMethod::RowBounds,
        RasterMethod::Bitmap4,
        RasterMethod::Bitmap8,
        RasterMethod::Bitmap16,
        RasterMethod::Bitmap32,
    ];
}

// ============================================================================
// CellRaster
// ============================================================================

/// Common lifecycle interface of the rasterizer variants.
pub trait CellRaster {
    /// Identifies the sweep organization.
    fn name(&self) -> &'static str;

    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn is_initialized(&self) -> bool;

    /// Allocate for a raster size; `false` on allocation failure (the
    /// rasterizer is then uninitialized with size zero). Negative sizes are
    /// treated as zero; a zero-size rasterizer accepts every operation and
    /// renders nothing.
    fn init(&mut self, width: i32, height: i32) -> bool;

    /// Release all storage, returning to the uninitialized state.
    fn reset(&mut self);

    /// Zero the accumulated frame (tracker-guided where a tracker exists).
    fn clear(&mut self);

    fn set_fill_rule(&mut self, rule: FillRule);
    fn fill_rule(&self) -> FillRule;

    /// Select the wide (multi-pixel-per-iteration) composite kernel. Output
    /// is byte-identical either way.
    fn set_simd(&mut self, enabled: bool);

    /// Accumulate a closed polyline. The closing vertex is the caller's
    /// responsibility; zero-length segments and degenerate inputs are
    /// skipped silently.
    fn add_poly(&mut self, poly: &[PointD]) -> bool;

    /// Accumulate a quadratic Bézier segment, flattened to line segments.
    fn add_quad(&mut self, p0: PointD, p1: PointD, p2: PointD) -> bool;

    /// Accumulate a cubic Bézier segment, flattened to line segments.
    fn add_cubic(&mut self, p0: PointD, p1: PointD, p2: PointD, p3: PointD) -> bool;

    /// Composite the accumulated frame over `dst` with a straight ARGB32
    /// color. Destructive: afterwards all cells are zero and the trackers
    /// are empty. `false` only when `init` never succeeded.
    fn render(&mut self, dst: &mut Argb32View<'_>, argb32: u32) -> bool;

    /// Write row `y`'s 8-bit coverage mask into `out` without compositing
    /// and without consuming the frame.
    fn sweep_coverage(&self, y: i32, out: &mut [u8]);
}

macro_rules! impl_cell_raster {
    ($variant:ty) => {
        impl CellRaster for $variant {
            fn name(&self) -> &'static str {
                <$variant>::name(self)
            }
            fn width(&self) -> i32 {
                <$variant>::width(self)
            }
            fn height(&self) -> i32 {
                <$variant>::height(self)
            }
            fn is_initialized(&self) -> bool {
                <$variant>::is_initialized(self)
            }
            fn init(&mut self, width: i32, height: i32) -> bool {
                <$variant>::init(self, width, height)
            }
            fn reset(&mut self) {
                <$variant>::reset(self)
            }
            fn clear(&mut self) {
                <$variant>::clear(self)
            }
            fn set_fill_rule(&mut self, rule: FillRule) {
                <$variant>::set_fill_rule(self, rule)
            }
            fn fill_rule(&self) -> FillRule {
                <$variant>::fill_rule(self)
            }
            fn set_simd(&mut self, enabled: bool) {
                <$variant>::set_simd(self, enabled)
            }
            fn add_poly(&mut self, poly: &[PointD]) -> bool {
                if !self.is_initialized() {
                    return false;
                }
                if self.width() == 0 || self.height() == 0 {
                    return true;
                }
                render_poly(self, poly);
                true
            }
            fn add_quad(&mut self, p0: PointD, p1: PointD, p2: PointD) -> bool {
                if !self.is_initialized() {
                    return false;
                }
                if self.width() == 0 || self.height() == 0 {
                    return true;
                }
                flatten_quad(
                    self,
                    to_fixed(p0.x),
                    to_fixed(p0.y),
                    to_fixed(p1.x),
                    to_fixed(p1.y),
                    to_fixed(p2.x),
                    to_fixed(p2.y),
                );
                true
            }
            fn add_cubic(&mut self, p0: PointD, p1: PointD, p2: PointD, p3: PointD) -> bool {
                if !self.is_initialized() {
                    return false;
                }
                if self.width() == 0 || self.height() == 0 {
                    return true;
                }
                flatten_cubic(
                    self,
                    to_fixed(p0.x),
                    to_fixed(p0.y),
                    to_fixed(p1.x),
                    to_fixed(p1.y),
                    to_fixed(p2.x),
                    to_fixed(p2.y),
                    to_fixed(p3.x),
                    to_fixed(p3.y),
                );
                true
            }
            fn render(&mut self, dst: &mut Argb32View<'_>, argb32: u32) -> bool {
                <$variant>::render(self, dst, argb32)
            }
            fn sweep_coverage(&self, y: i32, out: &mut [u8]) {
                <$variant>::sweep_coverage(self, y, out)
            }
        }
    };
}

impl_cell_raster!(RasterizerDense);
impl_cell_raster!(RasterizerBounds);
impl_cell_raster!(RasterizerBitmap);

// ============================================================================
// Rasterizer
// ============================================================================

/// A rasterizer with the sweep organization chosen at construction.
pub enum Rasterizer {
    Dense(RasterizerDense),
    RowBounds(RasterizerBounds),
    Bitmap(RasterizerBitmap),
}

macro_rules! for_each_variant {
    ($self:expr, $r:ident => $e:expr) => {
        match $self {
            Rasterizer::Dense($r) => $e,
            Rasterizer::RowBounds($r) => $e,
            Rasterizer::Bitmap($r) => $e,
        }
    };
}

impl Rasterizer {
    pub fn new(method: RasterMethod) -> Self {
        match method {
            RasterMethod::Dense => Rasterizer::Dense(RasterizerDense::new()),
            RasterMethod::RowBounds => Rasterizer::RowBounds(RasterizerBounds::new()),
            RasterMethod::Bitmap4 => Rasterizer::Bitmap(RasterizerBitmap::new(4)),
            RasterMethod::Bitmap8 => Rasterizer::Bitmap(RasterizerBitmap::new(8)),
            RasterMethod::Bitmap16 => Rasterizer::Bitmap(RasterizerBitmap::new(16)),
            RasterMethod::Bitmap32 => Rasterizer::Bitmap(RasterizerBitmap::new(32)),
        }
    }

    #[cfg(test)]
    pub(crate) fn cells_clean(&self) -> bool {
        for_each_variant!(self, r => r.cells_clean())
    }

    #[cfg(test)]
    pub(crate) fn trackers_empty(&self) -> bool {
        for_each_variant!(self, r => r.trackers_empty())
    }
}

impl CellRaster for Rasterizer {
    fn name(&self) -> &'static str {
        for_each_variant!(self, r => r.name())
    }
    fn width(&self) -> i32 {
        for_each_variant!(self, r => r.width())
    }
    fn height(&self) -> i32 {
        for_each_variant!(self, r => r.height())
    }
    fn is_initialized(&self) -> bool {
        for_each_variant!(self, r => r.is_initialized())
    }
    fn init(&mut self, width: i32, height: i32) -> bool {
        for_each_variant!(self, r => r.init(width, height))
    }
    fn reset(&mut self) {
        for_each_variant!(self, r => r.reset())
    }
    fn clear(&mut self) {
        for_each_variant!(self, r => r.clear())
    }
    fn set_fill_rule(&mut self, rule: FillRule) {
        for_each_variant!(self, r => r.set_fill_rule(rule))
    }
    fn fill_rule(&self) -> FillRule {
        for_each_variant!(self, r => r.fill_rule())
    }
    fn set_simd(&mut self, enabled: bool) {
        for_each_variant!(self, r => r.set_simd(enabled))
    }
    fn add_poly(&mut self, poly: &[PointD]) -> bool {
        for_each_variant!(self, r => CellRaster::add_poly(r, poly))
    }
    fn add_quad(&mut self, p0: PointD, p1: PointD, p2: PointD) -> bool {
        for_each_variant!(self, r => CellRaster::add_quad(r, p0, p1, p2))
    }
    fn add_cubic(&mut self, p0: PointD, p1: PointD, p2: PointD, p3: PointD) -> bool {
        for_each_variant!(self, r => CellRaster::add_cubic(r, p0, p1, p2, p3))
    }
    fn render(&mut self, dst: &mut Argb32View<'_>, argb32: u32) -> bool {
        for_each_variant!(self, r => r.render(dst, argb32))
    }
    fn sweep_coverage(&self, y: i32, out: &mut [u8]) {
        for_each_variant!(self, r => r.sweep_coverage(y, out))
    }
}

// ============================================================================
// Tests
// ============================================================================
