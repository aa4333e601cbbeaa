// License: MIT
//
// Grid rasterization of line segments.
//
// Enumerates, in travel order, every integer cell a segment passes through
// together with the horizontal (bottom) and vertical (left) cell boundaries
// it crosses. Cells are identified by the integer coordinates of their
// lower-left corner; a "bottom edge" (x, y) is the boundary below cell
// (x, y) and a "left edge" (x, y) is the boundary to its left.

use crate::geom::{floor_to_i32, Real};
use crate::mesh::GridMesh;

/// Output buffers for one rasterized segment, reused across edges.
#[derive(Debug, Default, Clone)]
pub struct RasterHits {
    /// Cells the segment passes through, in travel order.
    pub cells: Vec<(i32, i32)>,
    /// Bottom cell boundaries crossed, in travel order.
    pub bottom_edges: Vec<(i32, i32)>,
    /// Left cell boundaries crossed, in travel order.
    pub left_edges: Vec<(i32, i32)>,
}

impl RasterHits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.bottom_edges.clear();
        self.left_edges.clear();
    }
}

/// Rasterize the segment (x0, y0)-(x1, y1), given in grid space (one cell
/// per unit square), appending results to `hits` in travel order.
pub fn integer_cell_line_intersections(
    mut x0: Real,
    mut y0: Real,
    mut x1: Real,
    mut y1: Real,
    hits: &mut RasterHits,
) {
    let mut cx0 = floor_to_i32(x0);
    let mut cy0 = floor_to_i32(y0);
    let mut cx1 = floor_to_i32(x1);
    let mut cy1 = floor_to_i32(y1);
    // Segments shorter than a cell's minimum dimension always hit these
    // trivial cases.
    if cy0 == cy1 {
        // Horizontal or single-cell
        if cx0 < cx1 {
            for i in cx0..=cx1 {
                hits.cells.push((i, cy0));
            }
            for i in (cx0 + 1)..=cx1 {
                hits.left_edges.push((i, cy0));
            }
        } else {
            for i in (cx1..=cx0).rev() {
                hits.cells.push((i, cy0));
            }
            for i in ((cx1 + 1)..=cx0).rev() {
                hits.left_edges.push((i, cy0));
            }
        }
        return;
    }
    if cx0 == cx1 {
        // Vertical
        if cy0 < cy1 {
            for i in cy0..=cy1 {
                hits.cells.push((cx0, i));
            }
            for i in (cy0 + 1)..=cy1 {
                hits.bottom_edges.push((cx0, i));
            }
        } else {
            for i in (cy1..=cy0).rev() {
                hits.cells.push((cx0, i));
            }
            for i in ((cy1 + 1)..=cy0).rev() {
                hits.bottom_edges.push((cx0, i));
            }
        }
        return;
    }
    // General case. Normalize to left-to-right travel, remembering to
    // reverse the outputs if we flipped.
    let mark_cells = hits.cells.len();
    let mark_bottom = hits.bottom_edges.len();
    let mark_left = hits.left_edges.len();
    let flipped = x0 > x1;
    if flipped {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
        std::mem::swap(&mut cx0, &mut cx1);
        std::mem::swap(&mut cy0, &mut cy1);
    }
    let m = (y1 - y0) / (x1 - x0);
    let residue_x = Real::from(cx0 + 1) - x0;
    let mut rhy = y0 + residue_x * m; // y coord at the right edge of the cell
    let mut j = cy0;
    let mut jf = Real::from(cy0);
    if cy1 > cy0 {
        // Upwards and to the right
        for i in cx0..=cx1 {
            if i == cx1 {
                rhy = y1;
            }
            hits.cells.push((i, j));
            while jf + 1.0 < rhy {
                j += 1;
                jf += 1.0;
                hits.cells.push((i, j));
                hits.bottom_edges.push((i, j));
            }
            if i != cx1 {
                hits.left_edges.push((i + 1, j));
            }
            rhy += m;
        }
    } else {
        // Downwards and to the right
        for i in cx0..=cx1 {
            if i == cx1 {
                rhy = y1;
            }
            hits.cells.push((i, j));
            while jf > rhy {
                hits.bottom_edges.push((i, j));
                j -= 1;
                jf -= 1.0;
                hits.cells.push((i, j));
            }
            if i != cx1 {
                hits.left_edges.push((i + 1, j));
            }
            rhy += m;
        }
    }
    if flipped {
        hits.cells[mark_cells..].reverse();
        hits.bottom_edges[mark_bottom..].reverse();
        hits.left_edges[mark_left..].reverse();
    }
}

impl GridMesh {
    /// Rasterize a world-space segment against this grid.
    pub fn find_cell_line_intersections(
        &self,
        x0: Real,
        y0: Real,
        x1: Real,
        y1: Real,
        hits: &mut RasterHits,
    ) {
        integer_cell_line_intersections(
            (x0 - self.llx) * self.inv_dx,
            (y0 - self.lly) * self.inv_dy,
            (x1 - self.llx) * self.inv_dx,
            (y1 - self.lly) * self.inv_dy,
            hits,
        );
    }
}
