//! Bitmap sweep rasterizer.
//!
//! Every deposit sets one bit per touched cell group (a run of `N`
//! consecutive columns, `N ∈ {4, 8, 16, 32}`) in a per-row bit vector, plus
//! a global y interval. `render` walks each dirty row as alternating gap and
//! covered spans read off the bit vector: gaps composite a constant mask
//! from the running winding, covered spans run the variable-mask sweep. The
//! group size trades bitmap footprint against span quantization.

use crate::argb_image::Argb32View;
use crate::basics::{try_zeroed_vec, FillRule};
use crate::bit_vector::{set_bit, word_count, BitRuns, BitWord};
use crate::cell_grid::{Bounds, Cell, CellGrid};
use crate::compositor::{coverage_row, SpanCompositor};
use crate::edge_cells::CellSink;

/// Rasterizer variant sweeping per-row dirty-group bit vectors.
pub struct RasterizerBitmap {
    grid: CellGrid,
    bits: Vec<BitWord>,
    bit_stride: usize,
    groups: usize,
    group_shift: u32,
    y_bounds: Bounds,
    fill_rule: FillRule,
    simd: bool,
    initialized: bool,
}

impl RasterizerBitmap {
    /// `group_size` is the number of columns per tracked group and must be
    /// 4, 8, 16, or 32.
    pub fn new(group_size: u32) -> Self {
        assert!(
            matches!(group_size, 4 | 8 | 16 | 32),
            "unsupported group size {}",
            group_size
        );
        Self {
            grid: CellGrid::new(),
            bits: Vec::new(),
            bit_stride: 0,
            groups: 0,
            group_shift: group_size.trailing_zeros(),
            y_bounds: Bounds::EMPTY,
            fill_rule: FillRule::NonZero,
            simd: false,
            initialized: false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.group_shift {
            2 => "bitmap-4",
            3 => "bitmap-8",
            4 => "bitmap-16",
            _ => "bitmap-32",
        }
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
        self.bits = Vec::new();
        self.bit_stride = 0;
        self.groups = 0;
        self.y_bounds = Bounds::EMPTY;
        if !self.grid.init(w, h) {
            return false;
        }
        if !self.grid.is_empty() {
            // Groups cover the sentinel column as well.
            let group = 1usize << self.group_shift;
            self.groups = (w as usize + 1 + group - 1) >> self.group_shift;
            self.bit_stride = word_count(self.groups);
            match try_zeroed_vec(self.bit_stride * h as usize) {
                Some(bits) => self.bits = bits,
                None => {
                    self.grid.reset();
                    self.bit_stride = 0;
                    self.groups = 0;
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
        self.bits = Vec::new();
        self.bit_stride = 0;
        self.groups = 0;
        self.y_bounds = Bounds::EMPTY;
        self.initialized = false;
    }

    /// Zero only the cell groups the bit vectors say were written.
    pub fn clear(&mut self) {
        if self.y_bounds.is_empty() {
            return;
        }
        let w = self.grid.width() as usize;
        for y in self.y_bounds.start..=self.y_bounds.end {
            let cells = self.grid.row_mut(y);
            let bits_row = &mut self.bits[y as usize * self.bit_stride..][..self.bit_stride];
            for (g0, g1) in BitRuns::new(bits_row, self.groups) {
                let x0 = g0 << self.group_shift;
                let x1 = (g1 << self.group_shift).min(w + 1);
                for cell in &mut cells[x0..x1] {
                    *cell = Cell::ZERO;
                }
            }
            bits_row.fill(0);
        }
        self.y_bounds = Bounds::EMPTY;
    }

    /// Composite the accumulated frame over `dst`, walking each dirty row
    /// span by span; on return every touched cell is zero, every bit vector
    /// is clear, and the y bounds are empty.
    pub fn render(&mut self, dst: &mut Argb32View<'_>, argb32: u32) -> bool {
        if !self.initialized {
            return false;
        }
        let w = self.grid.width() as usize;
        if w == 0 || self.grid.height() == 0 {
            return true;
        }
        debug_assert!(
            dst.width() >= self.grid.width() && dst.height() >= self.grid.height()
        );

        if self.y_bounds.is_empty() {
            return true;
        }

        let comp = SpanCompositor::new(argb32, self.fill_rule, self.simd);
        for y in self.y_bounds.start..=self.y_bounds.end {
            let row = dst.row_mut(y);
            let cells = self.grid.row_mut(y);
            let bits_row = &mut self.bits[y as usize * self.bit_stride..][..self.bit_stride];

            let mut cover = 0i32;
            let mut x = 0usize;
            for (g0, g1) in BitRuns::new(bits_row, self.groups) {
                let x0 = g0 << self.group_shift;
                let x1 = (g1 << self.group_shift).min(w + 1);

                if x < x0 {
                    // Untouched gap: the winding is constant across it.
                    comp.cmask(row, x, x0.min(w), comp.rule().mask(cover));
                }

                let x_comp = x1.min(w);
                if x0 < x_comp {
                    comp.vmask(row, x0, x_comp, cells, &mut cover);
                }
                let zero_from = x_comp.max(x0);
                for cell in &mut cells[zero_from..x1] {
                    *cell = Cell::ZERO;
                }
                x = x1;
            }
            if x < w {
                comp.cmask(row, x, w, comp.rule().mask(cover));
            }
            bits_row.fill(0);
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
        self.y_bounds.is_empty() && self.bits.iter().all(|&word| word == 0)
    }
}

impl CellSink for RasterizerBitmap {
    #[inline]
    fn cell(&mut self, x: i32, y: i32, cover: i32, area: i32) {
        self.y_bounds.include(y);
        let bits_row = &mut self.bits[y as usize * self.bit_stride..][..self.bit_stride];
        set_bit(bits_row, (x as u32 >> self.group_shift) as usize);
        self.grid.merge(x, y, cover, area);
    }
}

// ============================================================================
// Tests
// ============================================================================
