//! Row-bounds sweep rasterizer.
//!
//! Every deposit publishes its column into a per-row `[start, end]` interval
//! and its row into a global y interval. `render` and `clear` then visit
//! only the columns actually written, which makes their cost proportional to
//! the covered area instead of the raster area.

use crate::argb_image::Argb32View;
use crate::basics::{try_zeroed_vec, FillRule};
use crate::cell_grid::{Bounds, Cell, CellGrid};
use crate::compositor::{coverage_row, SpanCompositor};
use crate::edge_cells::CellSink;

/// Rasterizer variant sweeping per-row column bounds.
#[derive(Default)]
pub struct RasterizerBounds {
    grid: CellGrid,
    x_bounds: Vec<Bounds>,
    y_bounds: Bounds,
    fill_rule: FillRule,
    simd: bool,
    initialized: bool,
}

impl RasterizerBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &'static str {
        "row-bounds"
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

    /// Allocate for a `width × height` raster. Keeping the same size runs
    /// the cheap tracker-guided clear instead of reallocating.
    pub fn init(&mut self, width: i32, height: i32) -> bool {
        let w = width.max(0);
        let h = height.max(0);
        if self.initialized && self.grid.width() == w && self.grid.height() == h {
            self.clear();
            return true;
        }

        self.initialized = false;
        self.x_bounds = Vec::new();
        self.y_bounds = Bounds::EMPTY;
        if !self.grid.init(w, h) {
            return false;
        }
        if !self.grid.is_empty() {
            match try_zeroed_vec(h as usize) {
                Some(bounds) => self.x_bounds = bounds,
                None => {
                    self.grid.reset();
                    return false;
                }
            }
        }
        self.initialized = true;
        true
    }

    /// Release all storage.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.x_bounds = Vec::new();
        self.y_bounds = Bounds::EMPTY;
        self.initialized = false;
    }

    /// Zero only the cells the trackers say were written.
    pub fn clear(&mut self) {
        if self.y_bounds.is_empty() {
            return;
        }
        for y in self.y_bounds.start..=self.y_bounds.end {
            let xb = self.x_bounds[y as usize];
            if !xb.is_empty() {
                let cells = self.grid.row_mut(y);
                for cell in &mut cells[xb.start as usize..=xb.end as usize] {
                    *cell = Cell::ZERO;
                }
                self.x_bounds[y as usize] = Bounds::EMPTY;
            }
        }
        self.y_bounds = Bounds::EMPTY;
    }

    /// Composite the accumulated frame over `dst`. Visits only rows inside
    /// the y bounds and columns inside each row's x bounds; on return every
    /// touched cell is zero and both trackers are empty.
    pub fn render(&mut self, dst: &mut Argb32View<'_>, argb32: u32) -> bool {
        if !self.initialized {
            return false;
        }
        let w = self.grid.width();
        if w == 0 || self.grid.height() == 0 {
            return true;
        }
        debug_assert!(dst.width() >= w && dst.height() >= self.grid.height());

        if self.y_bounds.is_empty() {
            return true;
        }

        let comp = SpanCompositor::new(argb32, self.fill_rule, self.simd);
        for y in self.y_bounds.start..=self.y_bounds.end {
            let xb = self.x_bounds[y as usize];
            if xb.is_empty() {
                continue;
            }
            self.x_bounds[y as usize] = Bounds::EMPTY;

            let row = dst.row_mut(y);
            let cells = self.grid.row_mut(y);

            let x0 = xb.start as usize;
            let x_comp = (xb.end + 1).min(w) as usize;
            let mut cover = 0;
            if x0 < x_comp {
                comp.vmask(row, x0, x_comp, cells, &mut cover);
            }
            // Whatever the composite did not visit is at most the sentinel.
            let zero_from = x_comp.max(x0);
            if zero_from <= xb.end as usize {
                for cell in &mut cells[zero_from..=xb.end as usize] {
                    *cell = Cell::ZERO;
                }
            }
        }
        self.y_bounds = Bounds::EMPTY;
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
        self.y_bounds.is_empty() && self.x_bounds.iter().all(Bounds::is_empty)
    }
}

impl CellSink for RasterizerBounds {
    #[inline]
    fn cell(&mut self, x: i32, y: i32, cover: i32, area: i32) {
        self.y_bounds.include(y);
        self.x_bounds[y as usize].include(x);
        self.grid.merge(x, y, cover, area);
    }
}

// ============================================================================
// Tests
// ============================================================================
