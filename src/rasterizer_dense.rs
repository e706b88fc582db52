//! Dense sweep rasterizer — no dirty tracking.
//!
//! The simplest organization: deposits go straight into the cell grid, and
//! `render` sweeps every column of every row. Sweep cost is proportional to
//! the raster area regardless of how much of it the polygons cover, but
//! there is no per-deposit bookkeeping at all.

use crate::argb_image::Argb32View;
use crate::basics::FillRule;
use crate::cell_grid::{Cell, CellGrid};
use crate::compositor::{coverage_row, SpanCompositor};
use crate::edge_cells::CellSink;

/// Rasterizer variant sweeping the full grid each render.
#[derive(Default)]
pub struct RasterizerDense {
    grid: CellGrid,
    fill_rule: FillRule,
    simd: bool,
    initialized: bool,
}

impl RasterizerDense {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &'static str {
        "dense"
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = rule;
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn set_simd(&mut self, enabled: bool) {
        self.simd = enabled;
    }

    /// Allocate for a `width × height` raster. Keeping the same size only
    /// clears the accumulated frame. On allocation failure the rasterizer
    /// drops back to the zero-size, uninitialized state and returns `false`.
    pub fn init(&mut self, width: i32, height: i32) -> bool {
        let w = width.max(0);
        let h = height.max(0);
        if self.initialized && self.grid.width() == w && self.grid.height() == h {
            self.clear();
            return true;
        }
        self.initialized = self.grid.init(w, h);
        self.initialized
    }

    /// Release the cell storage.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.initialized = false;
    }

    /// Zero every cell.
    pub fn clear(&mut self) {
        self.grid.clear_all();
    }

    /// Composite the accumulated frame over `dst` with the straight ARGB32
    /// source color. Consumes the frame: on return every cell is zero.
    pub fn render(&mut self, dst: &mut Argb32View<'_>, argb32: u32) -> bool {
        if !self.initialized {
            return false;
        }
        let w = self.grid.width();
        let h = self.grid.height();
        if w == 0 || h == 0 {
            return true;
        }
        debug_assert!(dst.width() >= w && dst.height() >= h);

        let comp = SpanCompositor::new(argb32, self.fill_rule, self.simd);
        for y in 0..h {
            let row = dst.row_mut(y);
            let cells = self.grid.row_mut(y);
            let mut cover = 0;
            comp.vmask(row, 0, w as usize, cells, &mut cover);
            cells[w as usize] = Cell::ZERO;
        }
        true
    }

    /// Write the 8-bit coverage mask of row `y` into `out` without
    /// compositing or consuming the accumulated cells.
    pub fn sweep_coverage(&self, y: i32, out: &mut [u8]) {
        coverage_row(self.grid.row(y), self.fill_rule, out);
    }

    #[cfg(test)]
    pub(crate) fn cells_clean(&self) -> bool {
        self.grid.is_clean()
    }

    #[cfg(test)]
    pub(crate) fn trackers_empty(&self) -> bool {
        true
    }
}

impl CellSink for RasterizerDense {
    #[inline]
    fn cell(&mut self, x: i32, y: i32, cover: i32, area: i32) {
        self.grid.merge(x, y, cover, area);
    }
}

// ============================================================================
// Tests
// ============================================================================
