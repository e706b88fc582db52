//! Edge-to-cell conversion — the core of the rasterizer.
//!
//! [`render_line`] walks one directed line segment in 24.8 fixed point and
//! deposits signed `(cover, area)` updates into a [`CellSink`], one deposit
//! per pixel cell the segment crosses. All arithmetic is integer: two
//! coupled Bresenham-style DDAs (one for x per scanline, one for y per cell
//! column) carry the division remainders so truncation error never
//! accumulates past one subpixel unit.
//!
//! Every segment is first normalized to a top-to-bottom, left-to-right walk:
//! right-to-left edges swap endpoints, bottom-to-top edges reflect the
//! fractional y parts inside their pixel; both flips negate `cover_sign`,
//! and `y_inc` restores the original row order. The walk then has three
//! shapes: a strictly vertical edge (one cell per row), a vertical-major
//! edge (`dy >= dx`, one or two cells per row), and a horizontal-major edge
//! (`dx > dy`, two or more cells per row). The horizontal-major scanline
//! loop is driven by an explicit row-entry state: the first and last
//! scanlines share the full-row body but enter it at different points with
//! their true fractional extents.

use crate::basics::{to_fixed, PointD, A8_MASK, A8_SCALE, A8_SHIFT};

// ============================================================================
// CellSink
// ============================================================================

/// Receiver for the cell deposits of [`render_line`].
///
/// Implementations add `(cover, area)` to their cell at `(x, y)` and record
/// whatever dirty tracking they maintain for that cell.
pub trait CellSink {
    fn cell(&mut self, x: i32, y: i32, cover: i32, area: i32);
}

// ============================================================================
// render_line
// ============================================================================

/// Row-entry states of the horizontal-major scanline loop.
///
/// `Step` runs the x-DDA and renormalizes the running cover before the
/// multi-cell body; `Skip` renormalizes only (the advance is preloaded);
/// `Inside` goes straight to the multi-cell body; `Single` handles a row
/// whose whole advance fits in one cell; `After` reloads the iteration
/// counters between the first, interior, and last scanline groups.
#[derive(Clone, Copy, PartialEq, Eq)]
enum RowEntry {
    Step,
    Skip,
    Inside,
    Single,
    After,
}

/// Rasterize one line segment, depositing per-cell `(cover, area)` deltas.
///
/// Coordinates are 24.8 fixed point. Horizontal segments (`dy == 0`)
/// contribute no signed coverage and are skipped. The caller is responsible
/// for keeping endpoints inside the sink's grid; out-of-grid deposits are a
/// programmer error surfaced by the sink's debug assertions.
pub fn render_line<S: CellSink>(sink: &mut S, x0: i64, y0: i64, x1: i64, y1: i64) {
    let (mut x0, mut y0, mut x1, mut y1) = (x0, y0, x1, y1);

    let mut dx = x1 - x0;
    let mut dy = y1 - y0;

    if dy == 0 {
        return;
    }

    // Signed cover for the single-cell fast path; after normalization the
    // sign lives in `cover_sign` instead.
    let mut cover = dy as i32;

    dx = dx.abs();
    dy = dy.abs();

    let mut y_inc = 1i32;
    let mut cover_sign = 1i32;

    // Right-to-left: swap endpoints, invert the cover sign.
    if x0 > x1 {
        core::mem::swap(&mut x0, &mut x1);
        core::mem::swap(&mut y0, &mut y1);
        cover_sign = -cover_sign;
    }

    // Bottom-to-top: reflect the fractional y parts inside their pixel,
    // walk the rows upward, invert the cover sign again.
    if y0 > y1 {
        y0 ^= A8_MASK as i64;
        y0 += if y0 & A8_MASK as i64 == A8_MASK as i64 {
            1 - 2 * A8_SCALE as i64
        } else {
            1
        };
        y1 = y0 + dy;

        y_inc = -1;
        cover_sign = -cover_sign;
    }

    let mut ex0 = (x0 >> A8_SHIFT) as i32;
    let mut fx0 = (x0 & A8_MASK as i64) as i32;
    let mut ey0 = (y0 >> A8_SHIFT) as i32;
    let mut fy0 = (y0 & A8_MASK as i64) as i32;
    let ex1 = (x1 >> A8_SHIFT) as i32;
    let mut fy1 = (y1 & A8_MASK as i64) as i32;

    // `i` scanlines are processed now, `j` remain after them; the first and
    // last scanlines run the same loop bodies with their true fractional
    // extents.
    let mut i = 1i32;
    let mut j = (y1 >> A8_SHIFT) as i32 - ey0;

    // Single cell.
    if j == 0 && fx0 as i64 + dx <= A8_SCALE as i64 {
        sink.cell(ex0, ey0, cover, (2 * fx0 + dx as i32) * cover);
        return;
    }

    // First row index past the last one this segment touches.
    let ey_stop = ey0 + (j + (fy1 != 0) as i32) * y_inc;

    // Strictly vertical: one cell per scanline.
    if dx == 0 {
        if j > 0 {
            cover = (A8_SCALE - fy0) * cover_sign;
        }

        // Reuse fy0/fy1 as the interior-row and last-row covers.
        fy0 = cover_sign << A8_SHIFT;
        fy1 *= cover_sign;
        fx0 *= 2;

        loop {
            let area = fx0 * cover;
            loop {
                sink.cell(ex0, ey0, cover, area);
                ey0 += y_inc;
                i -= 1;
                if i == 0 {
                    break;
                }
            }
            if ey0 == ey_stop {
                return;
            }

            cover = fy1;
            i = j;
            j = 1;
            if i > 1 {
                cover = fy0;
                i -= 1;
            }
        }
    }

    // x advance per full scanline and y advance per full cell column, with
    // the division remainders carried in the error terms. The error terms
    // are mutated only at full-scanline (or full-column) advances.
    let mut x_err = -dy / 2;
    let mut y_err = -dx / 2;

    let x_base = dx * A8_SCALE as i64;
    let x_lift = x_base / dy;
    let x_rem = x_base % dy;

    let y_base = dy * A8_SCALE as i64;
    let y_lift = y_base / dx;
    let y_rem = y_base % dx;

    let mut x_dlt = dx;
    let mut y_dlt = dy;

    if j != 0 {
        // Partial first scanline: advance only to its bottom boundary.
        let p = (A8_SCALE - fy0) as i64 * dx;
        x_dlt = p / dy;
        x_err += p % dy;
        fy1 = A8_SCALE;
    }
    if ex0 != ex1 {
        // Partial first cell column: y advance to its right boundary.
        let p = (A8_SCALE - fx0) as i64 * dy;
        y_dlt = p / dx;
        y_err += p % dx;
    }

    if dy >= dx {
        // Vertical-major: one or two cells per scanline.
        let mut y_acc = y0 + y_dlt;
        let mut advance = false; // the first row's x advance is preloaded

        loop {
            loop {
                if advance {
                    x_dlt = x_lift;
                    x_err += x_rem;
                    if x_err >= 0 {
                        x_err -= dy;
                        x_dlt += 1;
                    }
                }
                advance = true;

                let fx_in = fx0;
                fx0 += x_dlt as i32;

                if fx0 <= A8_SCALE {
                    // The advance stays inside the current cell.
                    let c = (fy1 - fy0) * cover_sign;
                    sink.cell(ex0, ey0, c, (fx_in + fx0) * c);

                    if fx0 == A8_SCALE {
                        ex0 += 1;
                        fx0 = 0;
                        y_acc += y_lift;
                        y_err += y_rem;
                        if y_err >= 0 {
                            y_err -= dx;
                            y_acc += 1;
                        }
                    }
                } else {
                    // The advance crosses into the next cell; split at the
                    // y value where the edge crosses the column boundary.
                    y_acc &= A8_MASK as i64;
                    fx0 &= A8_MASK;
                    let y_cross = y_acc as i32;

                    let c0 = (y_cross - fy0) * cover_sign;
                    sink.cell(ex0, ey0, c0, (fx_in + A8_SCALE) * c0);
                    ex0 += 1;

                    let c1 = (fy1 - y_cross) * cover_sign;
                    sink.cell(ex0, ey0, c1, fx0 * c1);

                    y_acc += y_lift;
                    y_err += y_rem;
                    if y_err >= 0 {
                        y_err -= dx;
                        y_acc += 1;
                    }
                }

                ey0 += y_inc;
                i -= 1;
                if i == 0 {
                    break;
                }
            }

            if ey0 == ey_stop {
                return;
            }

            i = j;
            j = 1;
            if i > 1 {
                fy0 = 0;
                fy1 = A8_SCALE;
                i -= 1;
            } else {
                // Last partial scanline: exact remaining x advance.
                fy0 = 0;
                fy1 = (y1 & A8_MASK as i64) as i32;
                x_dlt = x1 - ((ex0 as i64) << A8_SHIFT) - fx0 as i64;
                advance = false;
            }
        }
    }

    // Horizontal-major: two or more cells per scanline. `cover_acc` tracks
    // the edge's absolute y offset at the current cell crossing; each row
    // renormalizes it by one scanline.
    let mut cover_acc = fy0 + y_dlt as i32;
    let mut cover;
    let mut area;

    if j != 0 {
        fy1 = A8_SCALE;
    }

    let mut entry = if fx0 as i64 + x_dlt <= A8_SCALE as i64 {
        cover = (fy1 - fy0) * cover_sign;
        area = (2 * fx0 + x_dlt as i32) * cover;
        x0 += x_dlt;
        RowEntry::Single
    } else {
        cover = y_dlt as i32;
        area = 0;
        RowEntry::Inside
    };

    loop {
        match entry {
            RowEntry::Step => {
                x_dlt = x_lift;
                x_err += x_rem;
                if x_err >= 0 {
                    x_err -= dy;
                    x_dlt += 1;
                }
                ex0 = (x0 >> A8_SHIFT) as i32;
                fx0 = (x0 & A8_MASK as i64) as i32;
                entry = RowEntry::Skip;
            }

            RowEntry::Skip => {
                cover_acc -= A8_SCALE;
                cover = cover_acc;
                debug_assert!(
                    (0..=A8_SCALE).contains(&cover),
                    "running cover {} out of range",
                    cover
                );
                entry = RowEntry::Inside;
            }

            RowEntry::Inside => {
                x0 += x_dlt;

                let mut ex_end = (x0 >> A8_SHIFT) as i32;
                let mut fx1 = (x0 & A8_MASK as i64) as i32;
                debug_assert!(ex0 != ex_end);

                if fx1 == 0 {
                    fx1 = A8_SCALE;
                } else {
                    ex_end += 1;
                }

                area = (fx0 + A8_SCALE) * cover;
                while ex0 != ex_end - 1 {
                    sink.cell(ex0, ey0, cover * cover_sign, area * cover_sign);

                    cover = y_lift as i32;
                    y_err += y_rem;
                    if y_err >= 0 {
                        y_err -= dx;
                        cover += 1;
                    }

                    cover_acc += cover;
                    area = A8_SCALE * cover;
                    ex0 += 1;
                }

                cover += fy1 - cover_acc;
                area = fx1 * cover;
                sink.cell(ex0, ey0, cover * cover_sign, area * cover_sign);

                if fx1 == A8_SCALE {
                    cover_acc += y_lift as i32;
                    y_err += y_rem;
                    if y_err >= 0 {
                        y_err -= dx;
                        cover_acc += 1;
                    }
                }

                ey0 += y_inc;
                i -= 1;
                if i != 0 {
                    entry = RowEntry::Step;
                } else if ey0 == ey_stop {
                    return;
                } else {
                    entry = RowEntry::After;
                }
            }

            RowEntry::Single => {
                sink.cell(ex0, ey0, cover, area);

                ey0 += y_inc;
                if ey0 == ey_stop {
                    return;
                }

                // Row ended exactly on a column boundary: that crossing is
                // already consumed, step the y-DDA past it.
                if fx0 as i64 + x_dlt == A8_SCALE as i64 {
                    cover_acc += y_lift as i32;
                    y_err += y_rem;
                    if y_err >= 0 {
                        y_err -= dx;
                        cover_acc += 1;
                    }
                }

                i -= 1;
                entry = if i == 0 { RowEntry::After } else { RowEntry::Step };
            }

            RowEntry::After => {
                i = j;
                j = 1;

                if i > 1 {
                    fy1 = A8_SCALE;
                    i -= 1;
                    entry = RowEntry::Step;
                } else {
                    // Last partial scanline with the true fy1.
                    fy1 = (y1 & A8_MASK as i64) as i32;
                    x_dlt = x1 - x0;
                    ex0 = (x0 >> A8_SHIFT) as i32;
                    fx0 = (x0 & A8_MASK as i64) as i32;

                    if fx0 as i64 + x_dlt <= A8_SCALE as i64 {
                        cover = fy1 * cover_sign;
                        area = (2 * fx0 + x_dlt as i32) * cover;
                        entry = RowEntry::Single;
                    } else {
                        entry = RowEntry::Skip;
                    }
                }
            }
        }
    }
}

// ============================================================================
// render_poly
// ============================================================================

/// Rasterize a closed polyline given in floating-point pixel coordinates.
///
/// The caller supplies the closing vertex explicitly; nothing is auto-closed
/// here. Zero-length segments are skipped, and fewer than two points is a
/// no-op.
pub fn render_poly<S: CellSink>(sink: &mut S, poly: &[PointD]) {
    if poly.len() < 2 {
        return;
    }

    let mut x0 = to_fixed(poly[0].x);
    let mut y0 = to_fixed(poly[0].y);

    for p in &poly[1..] {
        let x1 = to_fixed(p.x);
        let y1 = to_fixed(p.y);
        if x0 != x1 || y0 != y1 {
            render_line(sink, x0, y0, x1, y1);
        }
        x0 = x1;
        y0 = y1;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::to_fixed;

    /// Dense collecting sink over a small grid, sentinel column included.
    struct TestGrid {
        width: i32,
        height: i32,
        cells: Vec<(i32, i32)>,
    }

    impl TestGrid {
        fn new(width: i32, height: i32) -> Self {
            Self {
                width,
                height,
                cells: vec![(0, 0); ((width + 1) * height) as usize],
            }
        }

        fn at(&self, x: i32, y: i32) -> (i32, i32) {
            self.cells[(y * (self.width + 1) + x) as usize]
        }

        fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
            render_line(
                self,
                to_fixed(x0),
                to_fixed(y0),
                to_fixed(x1),
                to_fixed(y1),
            );
        }

        fn poly(&mut self, pts: &[(f64, f64)]) {
            for pair in pts.windows(2) {
                self.line(pair[0].0, pair[0].1, pair[1].0, pair[1].1);
            }
        }

        fn row_cover_sum(&self, y: i32) -> i32 {
            (0..=self.width).map(|x| self.at(x, y).0).sum()
        }

        fn total_cover(&self) -> i32 {
            self.cells.iter().map(|c| c.0).sum()
        }

        fn nonzero_cells(&self) -> usize {
            self.cells.iter().filter(|c| **c != (0, 0)).count()
        }
    }

    impl CellSink for TestGrid {
        fn cell(&mut self, x: i32, y: i32, cover: i32, area: i32) {
            assert!(x >= 0 && x <= self.width, "x {} out of grid", x);
            assert!(y >= 0 && y < self.height, "y {} out of grid", y);
            let cell = &mut self.cells[(y * (self.width + 1) + x) as usize];
            cell.0 += cover;
            cell.1 += area;
        }
    }

    // ------------------------------------------------------------------
    // Degenerate and single-cell edges
    // ------------------------------------------------------------------

    #[test]
    fn test_horizontal_edge_deposits_nothing() {
        let mut g = TestGrid::new(8, 8);
        g.line(0.25, 3.0, 7.75, 3.0);
        assert_eq!(g.nonzero_cells(), 0);
    }

    #[test]
    fn test_zero_length_edge_deposits_nothing() {
        let mut g = TestGrid::new(4, 4);
        g.line(1.5, 1.5, 1.5, 1.5);
        assert_eq!(g.nonzero_cells(), 0);
    }

    #[test]
    fn test_single_cell_edge() {
        // (0.25, 0.25) -> (0.5, 0.75): fits one cell.
        let mut g = TestGrid::new(4, 4);
        g.line(0.25, 0.25, 0.5, 0.75);
        assert_eq!(g.nonzero_cells(), 1);
        // cover = dy = 128; area = (2*fx0 + dx) * cover = (128 + 64) * 128.
        assert_eq!(g.at(0, 0), (128, 192 * 128));
    }

    #[test]
    fn test_single_cell_edge_upward_is_negated() {
        let mut g = TestGrid::new(4, 4);
        g.line(0.5, 0.75, 0.25, 0.25);
        assert_eq!(g.at(0, 0), (-128, -192 * 128));
    }

    // ------------------------------------------------------------------
    // Vertical edges
    // ------------------------------------------------------------------

    #[test]
    fn test_vertical_edge_full_rows() {
        let mut g = TestGrid::new(4, 8);
        g.line(1.5, 2.0, 1.5, 5.0);
        for y in 2..5 {
            // One cell per row, cover 256, area = 2*fx * cover.
            assert_eq!(g.at(1, y), (256, 2 * 128 * 256));
        }
        assert_eq!(g.total_cover(), 3 * 256);
    }

    #[test]
    fn test_vertical_edge_fractional_rows() {
        let mut g = TestGrid::new(4, 8);
        g.line(2.0, 1.5, 2.0, 3.25);
        assert_eq!(g.at(2, 1).0, 128); // bottom half of row 1
        assert_eq!(g.at(2, 2).0, 256); // full row 2
        assert_eq!(g.at(2, 3).0, 64); // top quarter of row 3
        assert_eq!(g.total_cover(), 448);
    }

    #[test]
    fn test_vertical_edge_upward_negates() {
        let mut down = TestGrid::new(4, 8);
        let mut up = TestGrid::new(4, 8);
        down.line(2.25, 1.5, 2.25, 6.75);
        up.line(2.25, 6.75, 2.25, 1.5);
        for (a, b) in down.cells.iter().zip(up.cells.iter()) {
            assert_eq!(a.0, -b.0);
            assert_eq!(a.1, -b.1);
        }
    }

    // ------------------------------------------------------------------
    // Vertical-major edges
    // ------------------------------------------------------------------

    #[test]
    fn test_diagonal_unit_slope() {
        let mut g = TestGrid::new(4, 4);
        g.line(0.0, 0.0, 2.0, 2.0);
        // 45° through two pixels: each cell half covered.
        assert_eq!(g.at(0, 0), (256, 65536));
        assert_eq!(g.at(1, 1), (256, 65536));
        assert_eq!(g.nonzero_cells(), 2);
    }

    #[test]
    fn test_diagonal_total_cover_is_dy() {
        let mut g = TestGrid::new(8, 8);
        g.line(0.3, 0.7, 5.1, 6.9);
        assert_eq!(g.total_cover(), to_fixed(6.9) as i32 - to_fixed(0.7) as i32);
    }

    #[test]
    fn test_steep_edge_row_covers() {
        let mut g = TestGrid::new(8, 8);
        g.line(1.25, 0.0, 2.75, 6.0);
        // Every full row contributes exactly 256 of cover.
        for y in 0..6 {
            assert_eq!(g.row_cover_sum(y), 256, "row {}", y);
        }
        assert_eq!(g.total_cover(), 6 * 256);
    }

    // ------------------------------------------------------------------
    // Horizontal-major edges
    // ------------------------------------------------------------------

    #[test]
    fn test_shallow_edge_single_row() {
        let mut g = TestGrid::new(8, 4);
        g.line(0.0, 0.0, 4.0, 1.0);
        // Slope 1/4: each of the four cells advances y by 64.
        for x in 0..4 {
            assert_eq!(g.at(x, 0), (64, (0 + 256) * 64), "cell {}", x);
        }
        assert_eq!(g.total_cover(), 256);
    }

    #[test]
    fn test_shallow_edge_multi_row_cover_sums() {
        let mut g = TestGrid::new(16, 4);
        g.line(0.1, 0.2, 14.9, 3.8);
        for y in 1..3 {
            assert_eq!(g.row_cover_sum(y), 256, "row {}", y);
        }
        assert_eq!(
            g.total_cover(),
            to_fixed(3.8) as i32 - to_fixed(0.2) as i32
        );
    }

    #[test]
    fn test_shallow_edge_right_to_left_negates() {
        let mut ltr = TestGrid::new(16, 4);
        let mut rtl = TestGrid::new(16, 4);
        ltr.line(0.1, 0.2, 14.9, 3.8);
        rtl.line(14.9, 3.8, 0.1, 0.2);
        for (a, b) in ltr.cells.iter().zip(rtl.cells.iter()) {
            assert_eq!(a.0, -b.0);
            assert_eq!(a.1, -b.1);
        }
    }

    // ------------------------------------------------------------------
    // Closed polygons
    // ------------------------------------------------------------------

    #[test]
    fn test_closed_square_row_cover_sums_zero() {
        let mut g = TestGrid::new(4, 4);
        g.poly(&[
            (0.5, 0.5),
            (2.5, 0.5),
            (2.5, 2.5),
            (0.5, 2.5),
            (0.5, 0.5),
        ]);
        for y in 0..4 {
            assert_eq!(g.row_cover_sum(y), 0, "row {}", y);
        }
    }

    #[test]
    fn test_closed_triangle_row_cover_sums_zero() {
        let mut g = TestGrid::new(8, 8);
        g.poly(&[(0.3, 0.4), (7.6, 2.2), (3.1, 7.8), (0.3, 0.4)]);
        for y in 0..8 {
            assert_eq!(g.row_cover_sum(y), 0, "row {}", y);
        }
    }

    #[test]
    fn test_closed_polygon_with_boundary_coords() {
        // Touches x = w: the rightmost deposits land in the sentinel column.
        let mut g = TestGrid::new(4, 4);
        g.poly(&[(1.0, 1.0), (4.0, 1.0), (4.0, 3.0), (1.0, 3.0), (1.0, 1.0)]);
        for y in 0..4 {
            assert_eq!(g.row_cover_sum(y), 0, "row {}", y);
        }
        assert_eq!(g.at(4, 1).0, 256);
        assert_eq!(g.at(4, 2).0, 256);
    }

    #[test]
    fn test_single_pixel_triangle_one_cell() {
        let mut g = TestGrid::new(4, 4);
        g.poly(&[(0.25, 0.25), (0.75, 0.25), (0.5, 0.75), (0.25, 0.25)]);
        assert_eq!(g.nonzero_cells(), 1);
        let (cover, area) = g.at(0, 0);
        assert_eq!(cover, 0);
        assert_ne!(area, 0);
    }

    #[test]
    fn test_degenerate_polygon_on_vertical_line_cancels() {
        let mut g = TestGrid::new(4, 4);
        g.poly(&[(1.0, 1.0), (1.0, 3.0), (1.0, 1.0)]);
        assert_eq!(g.nonzero_cells(), 0);
    }
}
