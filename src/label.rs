// License: MIT
//
// Interior/exterior labeling.
//
// After intersection vertices have been inserted, every vertex of every
// cell polygon is labeled interior or exterior to the clipping polygon, and
// every intersection vertex learns whether it is an entry point. Most cells
// are labeled by propagating corner classifications from the previous cell
// in a row-major sweep; an exact point-in-polygon test is the fallback.

use std::collections::HashSet;

use tracing::trace;

use crate::geom::{quadrant, Real, QUADRANT_COINCIDENT};
use crate::mesh::{GridMesh, VertIdx, NIL};

/// Per-cell corner classification bitfield. Two bits per corner: the low
/// bit of each pair marks the corner as known, the high bit marks it as
/// exterior. Bit pairs are laid out so that a cell's right (upper) corners
/// shift onto its right (upper) neighbor's left (lower) corners:
///
/// ```text
///   UL UR      bit pairs: LL=0..1, UL=2..3, LR=4..5, UR=6..7
///   LL LR
/// ```
pub type KnownCorners = u8;

pub const KC_LL: KnownCorners = 1 << 0;
pub const KC_LL_EXTERIOR: KnownCorners = 1 << 1;
pub const KC_UL: KnownCorners = 1 << 2;
pub const KC_UL_EXTERIOR: KnownCorners = 1 << 3;
pub const KC_LR: KnownCorners = 1 << 4;
pub const KC_LR_EXTERIOR: KnownCorners = 1 << 5;
pub const KC_UR: KnownCorners = 1 << 6;
pub const KC_UR_EXTERIOR: KnownCorners = 1 << 7;
pub const KC_ALL: KnownCorners = KC_LL | KC_UL | KC_LR | KC_UR;

/// Known bit for a vertex corner code (CORNER_LL..CORNER_UR).
#[inline]
pub fn known_bit(corner: u8) -> KnownCorners {
    1 << ((corner - 1) * 2)
}

/// Exterior bit for a vertex corner code.
#[inline]
pub fn exterior_bit(corner: u8) -> KnownCorners {
    1 << ((corner - 1) * 2 + 1)
}

/// Corner knowledge carried from a cell to the cell on its right:
/// LR becomes LL, UR becomes UL.
#[inline]
pub fn kc_next_x(kc: KnownCorners) -> KnownCorners {
    kc >> 4
}

/// Corner knowledge carried from a cell to the cell above:
/// UL becomes LL, UR becomes LR.
#[inline]
pub fn kc_next_y(kc: KnownCorners) -> KnownCorners {
    (kc >> 2) & 0x33
}

impl GridMesh {
    /// Winding-number point-in-polygon test counting quarter turns around
    /// the query point. Points on the polygon boundary count as inside.
    ///
    /// Self-intersecting rings are classified by nonzero winding; regions
    /// the ring encloses twice still count as inside.
    pub fn point_in_polygon(&self, x: Real, y: Real, poly: VertIdx) -> bool {
        let contains_boundary = true;
        let (mut last_x, mut last_y) = self.vert_get_coord(poly);
        let mut last_quadrant = quadrant(last_x, last_y, x, y);
        if last_quadrant == QUADRANT_COINCIDENT {
            return contains_boundary;
        }
        let mut ccw = 0i32; // Number of counter-clockwise quarter turns around the point
        let mut vert = self.v[poly as usize].next;
        while vert != NIL {
            let (next_x, next_y) = self.vert_get_coord(vert);
            let next_quadrant = quadrant(next_x, next_y, x, y);
            if next_quadrant == QUADRANT_COINCIDENT {
                return contains_boundary;
            }
            let delta = next_quadrant - last_quadrant;
            if delta == 1 || delta == -3 {
                ccw += 1;
            } else if delta == -1 || delta == 3 {
                ccw -= 1;
            } else if delta == 2 || delta == -2 {
                // Antipodal step: the edge passes the point on one side or
                // the other, or straight through it.
                let det = (last_x - x) * (next_y - y) - (next_x - x) * (last_y - y);
                if det.abs() < self.config.boundary_det_tol {
                    return contains_boundary;
                }
                ccw += if det > 0.0 { 2 } else { -2 };
            }
            last_quadrant = next_quadrant;
            last_x = next_x;
            last_y = next_y;
            if vert == poly {
                break;
            }
            vert = self.v[vert as usize].next;
        }
        ccw != 0
    }

    /// Label every cell strictly outside `poly`'s grid bounding box.
    pub fn label_exterior_cells(&mut self, poly: VertIdx, interior_lbl: bool, bb: Option<[i32; 4]>) {
        let [minx, maxx, miny, maxy] = bb.unwrap_or_else(|| self.poly_grid_bb(poly));
        for y in 0..self.ny {
            // Left of poly
            for x in 0..self.nx.min(minx) {
                self.poly_set_interior(self.poly_for_cell(x, y), interior_lbl);
            }
            // Right of poly
            for x in (maxx + 1)..self.nx {
                self.poly_set_interior(self.poly_for_cell(x, y), interior_lbl);
            }
        }
        for y in 0..miny {
            // Below poly
            for x in minx..=maxx {
                self.poly_set_interior(self.poly_for_cell(x, y), interior_lbl);
            }
        }
        for y in (maxy + 1)..self.ny {
            // Above poly
            for x in minx..=maxx {
                self.poly_set_interior(self.poly_for_cell(x, y), interior_lbl);
            }
        }
    }

    /// Label the interior of the AND (or, inverted, the SUB) of the grid
    /// contents against `poly2` over the given grid bounding box.
    pub fn label_interior_and(&mut self, poly2: VertIdx, invert_poly2: bool, bb: Option<[i32; 4]>) {
        let bb = bb.unwrap_or_else(|| self.poly_grid_bb(poly2));
        let [minx, maxx, miny, maxy] = bb;
        // Cells fully outside poly2's bounding box are exterior to an AND.
        if !invert_poly2 {
            self.label_exterior_cells(poly2, false, Some(bb));
        }
        // Anchor the sweep: resolve the grid's lower-left corner exactly
        // unless the raster parity cache already ruled it exterior.
        let ll_gridpt = self.gridpt_for_cell(0, 0) as usize;
        if self.ie_grid[ll_gridpt] {
            let (cx, cy) = self.cell_ll_corner(0, 0);
            self.ie_grid[ll_gridpt] = self.point_in_polygon(cx, cy, poly2) ^ invert_poly2;
        }
        // Row-major sweep propagating corner knowledge up and to the right.
        let mut kc_x0: KnownCorners = 0;
        for y in miny..=maxy {
            kc_x0 = kc_next_y(kc_x0);
            kc_x0 = self.label_interior_cell(self.poly_for_cell(minx, y), poly2, invert_poly2, kc_x0);
            let mut kc_sweep = kc_x0;
            for x in (minx + 1)..=maxx {
                kc_sweep = kc_next_x(kc_sweep);
                kc_sweep =
                    self.label_interior_cell(self.poly_for_cell(x, y), poly2, invert_poly2, kc_sweep);
            }
        }
    }

    pub fn label_interior_sub(&mut self, poly2: VertIdx, bb: Option<[i32; 4]>) {
        self.label_interior_and(poly2, true, bb);
    }

    /// Label one cell's polygon chain against `poly2`, consuming corner
    /// knowledge `kin` from the neighboring cell and returning this cell's
    /// corner knowledge for the next.
    ///
    /// The cell's `next_poly` chain is walked; `poly2`'s own chain is
    /// ignored.
    pub fn label_interior_cell(
        &mut self,
        cell: VertIdx,
        poly2: VertIdx,
        sub: bool,
        kin: KnownCorners,
    ) -> KnownCorners {
        trace!(cell, kin, "label interior of cell");
        let mut ret: KnownCorners = 0;
        let mut poly = cell;
        while poly != NIL {
            let next_p = self.v[poly as usize].next_poly;
            if self.v[poly as usize].next == NIL {
                // Skip degenerate polys
                poly = next_p;
                continue;
            }
            // First, try to classify via a corner the sweep already knows.
            let mut interior = false;
            let mut found_known_corner = false;
            let mut kc_vert = poly;
            if kin != 0 {
                loop {
                    let k = self.v[kc_vert as usize].corner;
                    if k != 0 && kin & known_bit(k) != 0 {
                        found_known_corner = true;
                        interior = kin & exterior_bit(k) == 0;
                        trace!(poly, kc_vert, interior, "corner propagation");
                        break;
                    }
                    kc_vert = self.v[kc_vert as usize].next;
                    if kc_vert == NIL || kc_vert == poly {
                        break;
                    }
                }
                if kc_vert == NIL {
                    kc_vert = poly;
                }
            }
            // Fall back to the exact test at the polygon's first vertex.
            if !found_known_corner {
                let (px, py) = self.vert_get_coord(poly);
                interior = self.point_in_polygon(px, py, poly2);
                if sub {
                    interior = !interior;
                }
                trace!(poly, interior, "point-in-polygon fallback");
            }
            // Walk the ring from the classified vertex, flipping parity at
            // each intersection.
            let mut vert = kc_vert;
            loop {
                if self.v[vert as usize].is_intersection {
                    self.v[vert as usize].is_interior = true;
                    interior = !interior;
                    // If we were already interior, this is an exit, not an entry.
                    self.v[vert as usize].is_entry = interior;
                } else {
                    self.v[vert as usize].is_interior = interior;
                    let k = self.v[vert as usize].corner;
                    if k != 0 {
                        ret |= known_bit(k);
                        if !interior {
                            ret |= exterior_bit(k);
                        }
                    }
                }
                vert = self.v[vert as usize].next;
                if vert == NIL || vert == kc_vert {
                    break;
                }
            }
            poly = next_p;
        }
        ret
    }

    /// Assign entry/exit labels along a free polygon (one not stored in any
    /// cell) by tracking which cell polygons its ring is currently inside.
    pub fn label_interior_freepoly(&mut self, poly: VertIdx) {
        let (x, y) = self.vert_get_coord(poly);
        let over_poly = self.poly_for_point(x, y);
        // The set of polygons the walk is currently inside.
        let mut inside: HashSet<VertIdx> = HashSet::new();
        let mut p = over_poly;
        while p != NIL {
            if self.point_in_polygon(x, y, p) {
                if !inside.remove(&p) {
                    inside.insert(p);
                }
            }
            p = self.v[p as usize].next_poly;
        }
        let mut vert = poly;
        while vert != NIL {
            if self.v[vert as usize].is_intersection {
                let neighbor = self.v[vert as usize].neighbor;
                let neighbor_poly = self.v[neighbor as usize].first;
                if inside.remove(&neighbor_poly) {
                    self.v[vert as usize].is_entry = false;
                } else {
                    self.v[vert as usize].is_entry = true;
                    inside.insert(neighbor_poly);
                }
            }
            if self.v[vert as usize].next == poly {
                break;
            }
            vert = self.v[vert as usize].next;
        }
    }
}
