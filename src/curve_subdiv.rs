//! Bézier flattening — reduces curve segments to line segments.
//!
//! Both flatteners work directly on 24.8 fixed-point control points with an
//! explicit subdivision stack and feed the resulting chords straight into
//! [`render_line`]. Quadratics pick their recursion depth up front from the
//! second differences; cubics test flatness per level with Hain's
//! chord-distance criterion in pure integer arithmetic.

use crate::basics::A8_SCALE;
use crate::edge_cells::{render_line, CellSink};

/// Flatness threshold in subpixel units (one sixth of a pixel).
const FLATNESS: i64 = (A8_SCALE / 6) as i64;

/// Maximum subdivision depth of either flattener.
const MAX_LEVELS: usize = 32;

type Pt = (i64, i64);

#[inline]
fn mid(a: Pt, b: Pt) -> Pt {
    ((a.0 + b.0) / 2, (a.1 + b.1) / 2)
}

// ============================================================================
// Quadratic
// ============================================================================

/// Flatten a quadratic Bézier `(x0,y0) (x1,y1) (x2,y2)` into line segments.
///
/// The recursion depth is fixed up front: the second-difference magnitude
/// halves twice per subdivision level, so the depth is the number of times
/// it must be shifted down by 2 to drop below the flatness threshold.
#[allow(clippy::too_many_arguments)]
pub fn flatten_quad<S: CellSink>(
    sink: &mut S,
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
) {
    let mut pts = [(0i64, 0i64); 2 * MAX_LEVELS + 3];
    pts[0] = (x2, y2);
    pts[1] = (x1, y1);
    pts[2] = (x0, y0);

    let mut levels = [0i32; MAX_LEVELS];
    let mut d = (x0 + x2 - 2 * x1).abs().max((y0 + y2 - 2 * y1).abs());
    let mut level = 0i32;
    while d > FLATNESS {
        d >>= 2;
        level += 1;
    }
    levels[0] = level;

    let mut top = 0usize;
    let mut base = 0usize;
    let (mut px, mut py) = (x0, y0);

    loop {
        if levels[top] > 1 {
            // Midpoint split in place; the tail sub-curve shifts up by two.
            let p0 = pts[base];
            let p1 = pts[base + 1];
            let p2 = pts[base + 2];

            pts[base + 4] = p2;
            let a = mid(p2, p1);
            pts[base + 3] = a;
            let b = mid(p0, p1);
            pts[base + 1] = b;
            pts[base + 2] = mid(a, b);

            base += 2;
            top += 1;
            levels[top] = levels[top - 1] - 1;
            levels[top - 1] = levels[top];
            continue;
        }

        let (nx, ny) = pts[base];
        render_line(sink, px, py, nx, ny);
        px = nx;
        py = ny;

        if top == 0 {
            break;
        }
        top -= 1;
        base -= 2;
    }
}

// ============================================================================
// Cubic
// ============================================================================

/// Flatten a cubic Bézier `(x0,y0) … (x3,y3)` into line segments.
///
/// Hain's rapid-termination test: estimate the chord length `L` as
/// `(236·max + 97·min) / 256` of the absolute chord components (within 8.4%
/// over, 8.1% under), then split while either control point is farther than
/// the flatness threshold from the chord (distances compared scaled by `L`)
/// or lies outside the chord in parameter space. Splits unconditionally
/// when `L` would overflow the scaled comparison.
#[allow(clippy::too_many_arguments)]
pub fn flatten_cubic<S: CellSink>(
    sink: &mut S,
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
    x3: i64,
    y3: i64,
) {
    let mut pts = [(0i64, 0i64); 3 * MAX_LEVELS + 1];
    pts[0] = (x3, y3);
    pts[1] = (x2, y2);
    pts[2] = (x1, y1);
    pts[3] = (x0, y0);

    let base_end = 3 * (MAX_LEVELS - 1);
    let mut base = 0usize;
    let (mut px, mut py) = (x0, y0);

    loop {
        let mut split = false;

        if base != base_end {
            let p_end = pts[base];
            let c1 = pts[base + 1];
            let c2 = pts[base + 2];
            let p_start = pts[base + 3];

            let dx = p_start.0 - p_end.0;
            let dy = p_start.1 - p_end.1;
            let dxa = dx.abs();
            let dya = dy.abs();

            let l = if dxa > dya {
                (236 * dxa + 97 * dya) >> 8
            } else {
                (97 * dxa + 236 * dya) >> 8
            };

            if l > 32767 {
                split = true;
            } else {
                let limit = l * FLATNESS;
                let dx1 = c1.0 - p_end.0;
                let dy1 = c1.1 - p_end.1;
                let dx2 = c2.0 - p_end.0;
                let dy2 = c2.1 - p_end.1;

                // Perpendicular distance of each control point, times L.
                if (dy * dx1 - dx * dy1).abs() > limit
                    || (dy * dx2 - dx * dy2).abs() > limit
                {
                    split = true;
                } else if dy * dy1 + dx * dx1 < 0
                    || dy * dy2 + dx * dx2 < 0
                    || dy * (p_start.1 - c1.1) + dx * (p_start.0 - c1.0) < 0
                    || dy * (p_start.1 - c2.1) + dx * (p_start.0 - c2.0) < 0
                {
                    // A control point projects outside the chord.
                    split = true;
                }
            }
        }

        if !split {
            let (nx, ny) = pts[base];
            render_line(sink, px, py, nx, ny);
            px = nx;
            py = ny;

            if base == 0 {
                break;
            }
            base -= 3;
            continue;
        }

        // de Casteljau midpoint split in place.
        let p0 = pts[base];
        let c1 = pts[base + 1];
        let c2 = pts[base + 2];
        let p3 = pts[base + 3];

        pts[base + 6] = p3;
        let a = mid(p0, c1);
        pts[base + 1] = a;
        let b = mid(p3, c2);
        pts[base + 5] = b;
        let m = mid(c1, c2);
        let a2 = mid(a, m);
        pts[base + 2] = a2;
        let b2 = mid(b, m);
        pts[base + 4] = b2;
        pts[base + 3] = mid(a2, b2);

        base += 3;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::to_fixed;

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

        fn row_cover_sum(&self, y: i32) -> i32 {
            let stride = (self.width + 1) as usize;
            self.cells[y as usize * stride..(y + 1) as usize * stride]
                .iter()
                .map(|c| c.0)
                .sum()
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

    #[test]
    fn test_collinear_quad_matches_line() {
        let mut quad = TestGrid::new(4, 4);
        let mut line = TestGrid::new(4, 4);
        flatten_quad(
            &mut quad,
            to_fixed(0.25),
            to_fixed(0.25),
            to_fixed(1.25),
            to_fixed(1.25),
            to_fixed(2.25),
            to_fixed(2.25),
        );
        render_line(
            &mut line,
            to_fixed(0.25),
            to_fixed(0.25),
            to_fixed(2.25),
            to_fixed(2.25),
        );
        assert_eq!(quad.cells, line.cells);
    }

    #[test]
    fn test_collinear_cubic_matches_line() {
        let mut cubic = TestGrid::new(4, 4);
        let mut line = TestGrid::new(4, 4);
        flatten_cubic(
            &mut cubic,
            to_fixed(0.5),
            to_fixed(0.5),
            to_fixed(1.0),
            to_fixed(1.0),
            to_fixed(2.0),
            to_fixed(2.0),
            to_fixed(3.0),
            to_fixed(3.0),
        );
        render_line(
            &mut line,
            to_fixed(0.5),
            to_fixed(0.5),
            to_fixed(3.0),
            to_fixed(3.0),
        );
        assert_eq!(cubic.cells, line.cells);
    }

    #[test]
    fn test_quad_total_cover_telescopes_to_dy() {
        // Whatever the subdivision, the emitted chords join end to end, so
        // the cover total is exactly the curve's y extent.
        let mut g = TestGrid::new(8, 8);
        flatten_quad(
            &mut g,
            to_fixed(0.5),
            to_fixed(0.5),
            to_fixed(7.5),
            to_fixed(0.5),
            to_fixed(7.5),
            to_fixed(7.5),
        );
        assert_eq!(
            g.total_cover(),
            (to_fixed(7.5) - to_fixed(0.5)) as i32
        );
    }

    #[test]
    fn test_cubic_total_cover_telescopes_to_dy() {
        let mut g = TestGrid::new(8, 8);
        flatten_cubic(
            &mut g,
            to_fixed(0.5),
            to_fixed(1.0),
            to_fixed(3.0),
            to_fixed(7.5),
            to_fixed(5.0),
            to_fixed(0.25),
            to_fixed(7.5),
            to_fixed(6.5),
        );
        assert_eq!(
            g.total_cover(),
            (to_fixed(6.5) - to_fixed(1.0)) as i32
        );
    }

    #[test]
    fn test_curved_quad_spans_multiple_cells() {
        let mut g = TestGrid::new(8, 8);
        flatten_quad(
            &mut g,
            to_fixed(0.5),
            to_fixed(4.0),
            to_fixed(4.0),
            to_fixed(0.5),
            to_fixed(7.5),
            to_fixed(4.0),
        );
        // A real arc cannot collapse to one chord's worth of cells.
        assert!(g.nonzero_cells() > 4);
    }

    #[test]
    fn test_closed_path_with_quad_edge_cover_sums_zero() {
        let mut g = TestGrid::new(8, 8);
        // Straight bottom and sides, curved top.
        render_line(&mut g, to_fixed(1.0), to_fixed(2.0), to_fixed(1.0), to_fixed(6.0));
        render_line(&mut g, to_fixed(1.0), to_fixed(6.0), to_fixed(7.0), to_fixed(6.0));
        render_line(&mut g, to_fixed(7.0), to_fixed(6.0), to_fixed(7.0), to_fixed(2.0));
        flatten_quad(
            &mut g,
            to_fixed(7.0),
            to_fixed(2.0),
            to_fixed(4.0),
            to_fixed(0.5),
            to_fixed(1.0),
            to_fixed(2.0),
        );
        for y in 0..8 {
            assert_eq!(g.row_cover_sum(y), 0, "row {}", y);
        }
    }

    #[test]
    fn test_closed_path_with_cubic_edge_cover_sums_zero() {
        let mut g = TestGrid::new(8, 8);
        render_line(&mut g, to_fixed(1.0), to_fixed(2.0), to_fixed(1.0), to_fixed(6.0));
        render_line(&mut g, to_fixed(1.0), to_fixed(6.0), to_fixed(7.0), to_fixed(6.0));
        render_line(&mut g, to_fixed(7.0), to_fixed(6.0), to_fixed(7.0), to_fixed(2.0));
        flatten_cubic(
            &mut g,
            to_fixed(7.0),
            to_fixed(2.0),
            to_fixed(5.5),
            to_fixed(0.5),
            to_fixed(2.5),
            to_fixed(0.5),
            to_fixed(1.0),
            to_fixed(2.0),
        );
        for y in 0..8 {
            assert_eq!(g.row_cover_sum(y), 0, "row {}", y);
        }
    }
}
