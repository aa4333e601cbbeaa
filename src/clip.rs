// License: MIT
//
// Intersection insertion and the boolean operation drivers.
//
// A clip proceeds in three passes: insert intersection vertices everywhere
// the clipping polygon's edges cross edges stored in the grid (this file),
// label every vertex interior/exterior and every intersection entry/exit
// (label.rs), then walk and stitch the surviving regions (trim.rs).

use std::cmp::Ordering;

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::error::GeometryWarning;
use crate::geom::{line_line_intersection, Real};
use crate::mesh::{GridMesh, VertIdx, NIL};
use crate::raster::RasterHits;

/// One crossing between a probe edge and an edge of a stored polygon.
#[derive(Debug, Clone, Copy)]
pub struct IntersectingEdge {
    pub x: Real,
    pub y: Real,
    /// Interpolation parameter along the probe edge.
    pub alpha1: Real,
    /// The crossed edge runs from `e2` to its ring successor.
    pub e2: VertIdx,
    /// Position of the crossing's cell along the probe edge's raster walk.
    pub cellidx: i32,
}

/// Counts from the intersection-insertion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub verts_added: usize,
    pub edges_intersected: usize,
}

/// Outcome of a boolean operation.
#[derive(Debug, Default)]
pub struct BoolOpReport {
    pub verts_added: usize,
    pub edges_intersected: usize,
    pub warnings: Vec<GeometryWarning>,
}

/// Sort crossings along the probe edge; parameter ties within `tie_tol`
/// between different cells fall back to raster order, so that coincident
/// edges leave one polygon before entering the next.
fn intersection_edge_order(e1: &IntersectingEdge, e2: &IntersectingEdge, tie_tol: Real) -> Ordering {
    let diff = e1.alpha1 - e2.alpha1;
    if diff.abs() < tie_tol && e1.cellidx != e2.cellidx {
        return e1.cellidx.cmp(&e2.cellidx);
    }
    if diff < 0.0 {
        Ordering::Less
    } else if diff > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

impl GridMesh {
    /// All crossings of the edge `e1` -> `e1.next` against every edge of
    /// the ring containing `p`.
    pub fn edge_poly_intersections(&self, e1: VertIdx, p: VertIdx) -> SmallVec<[IntersectingEdge; 4]> {
        let (ax, ay) = self.vert_get_coord(e1);
        let (bx, by) = self.vert_get_coord(self.v[e1 as usize].next);
        self.edge_poly_intersections_seg(ax, ay, bx, by, p)
    }

    /// All crossings of the free segment A-B against every edge of the ring
    /// containing `p`.
    pub fn edge_poly_intersections_seg(
        &self,
        ax: Real,
        ay: Real,
        bx: Real,
        by: Real,
        p: VertIdx,
    ) -> SmallVec<[IntersectingEdge; 4]> {
        let mut ret = SmallVec::new();
        let mut e2 = p;
        let mut first_iter = true;
        while e2 != p || first_iter {
            let e2n = self.v[e2 as usize].next;
            let (cx, cy) = self.vert_get_coord(e2);
            let (dx, dy) = self.vert_get_coord(e2n);
            if let Some(i) = line_line_intersection(ax, ay, bx, by, cx, cy, dx, dy, &self.config) {
                ret.push(IntersectingEdge {
                    x: i.x,
                    y: i.y,
                    alpha1: i.alpha1,
                    e2,
                    cellidx: 0,
                });
            }
            first_iter = false;
            e2 = e2n;
        }
        ret
    }

    /// Insert a pair of stacked intersection vertices at (x, y): one
    /// between `poly1_left` and `poly1_right`, one between `poly2_left`
    /// and `poly2_right`, joined as neighbors. Returns the vertex on
    /// polygon 1.
    pub fn insert_vert(
        &mut self,
        poly1_left: VertIdx,
        poly1_right: VertIdx,
        poly2_left: VertIdx,
        poly2_right: VertIdx,
        x: Real,
        y: Real,
    ) -> VertIdx {
        let newv1 = self.vert_new_between(poly1_left, poly1_right);
        self.vert_set_coord(newv1, x, y);
        self.v[newv1 as usize].is_intersection = true;

        let newv2 = self.vert_new_between(poly2_left, poly2_right);
        self.vert_set_coord(newv2, x, y);
        self.v[newv2 as usize].is_intersection = true;

        self.vert_add_neighbor(newv1, newv2);
        newv1
    }

    /// Walk every edge of `mpoly`, rasterize it against the grid, and
    /// insert intersection vertices into both `mpoly` and the stored cell
    /// polygons it crosses. Also populates the grid-point crossing-parity
    /// caches and clears `is_pristine` on every cell touched.
    pub fn insert_vert_poly_gridmesh(&mut self, mpoly: VertIdx) -> InsertReport {
        let mut hits = RasterHits::new();
        let mpoly = self.poly_first_vert(mpoly);
        let mut v1 = mpoly;
        let (mut v1x, mut v1y) = self.vert_get_coord(v1);
        let mut verts_added = 0;
        let mut edges_intersected = 0;
        while self.v[v1 as usize].next != NIL {
            let v2 = self.v[v1 as usize].next;
            let (v2x, v2y) = self.vert_get_coord(v2);
            hits.clear();
            self.find_cell_line_intersections(v1x, v1y, v2x, v2y, &mut hits);
            // Flip the odd/even crossing indicators on the crossed edges.
            // Out-of-grid crossings land on the sentinel slot.
            for &(x, y) in &hits.bottom_edges {
                let idx = self.gridpt_for_cell(x, y) as usize;
                self.ie_isect_right[idx] = !self.ie_isect_right[idx];
            }
            for &(x, y) in &hits.left_edges {
                let idx = self.gridpt_for_cell(x, y) as usize;
                self.ie_isect_up[idx] = !self.ie_isect_up[idx];
            }
            edges_intersected += hits.bottom_edges.len() + hits.left_edges.len();
            // Turn "passed through cell" raster events into intersections
            // against every edge stored in the cell, sorted so that even
            // in the case of coincident edges we leave one polygon before
            // entering the other.
            let mut isect: Vec<IntersectingEdge> = Vec::new();
            for (i, &(x, y)) in hits.cells.iter().enumerate() {
                let cell_polys = self.poly_for_cell(x, y);
                if cell_polys == NIL {
                    continue;
                }
                self.v[cell_polys as usize].is_pristine = false;
                let mut cell_poly = cell_polys;
                while cell_poly != NIL {
                    if self.v[cell_poly as usize].next != NIL {
                        let mut found = self.edge_poly_intersections(v1, cell_poly);
                        for e in found.iter_mut() {
                            e.cellidx = i as i32;
                        }
                        isect.extend(found);
                    }
                    cell_poly = self.v[cell_poly as usize].next_poly;
                }
            }
            let tie_tol = self.config.alpha_tie_tol;
            isect.sort_by(|a, b| intersection_edge_order(a, b, tie_tol));
            for ie in &isect {
                v1 = self.insert_vert(v1, v2, ie.e2, self.v[ie.e2 as usize].next, ie.x, ie.y);
            }
            verts_added += isect.len();
            v1 = v2;
            v1x = v2x;
            v1y = v2y;
            if v1 == mpoly {
                break;
            }
        }
        InsertReport {
            verts_added,
            edges_intersected,
        }
    }

    /// Splice `hole` into `exterior` via a zero-area bridge, producing one
    /// ring whose interior is the exterior minus the hole.
    ///
    /// Both rings must be intersection-free and `hole` entirely inside
    /// `exterior`. The bridge endpoints start at the rings' first vertices
    /// and are advanced until the bridge segment crosses neither ring.
    pub fn punch_hole(&mut self, exterior: VertIdx, hole: VertIdx) {
        let a_ext = self.poly_signed_area(exterior);
        let a_hole = self.poly_signed_area(hole);
        if (a_ext > 0.0 && a_hole > 0.0) || (a_ext < 0.0 && a_hole < 0.0) {
            self.poly_flip_winding_direction(hole);
        }
        let tol = self.config.tolerance;
        let mut v1 = exterior;
        let mut v2 = hole;
        // Walking to a crossed edge's start vertex strictly shortens the
        // bridge, so this settles; the cap guards degenerate input.
        const PROBE_CAP: u32 = 1024;
        let mut probes = 0u32;
        loop {
            let (v1x, v1y) = self.vert_get_coord(v1);
            let (v2x, v2y) = self.vert_get_coord(v2);
            let mut moved = false;
            for ie in self.edge_poly_intersections_seg(v1x, v1y, v2x, v2y, exterior) {
                if ie.alpha1 > tol && ie.alpha1 < 1.0 - tol {
                    v1 = ie.e2;
                    moved = true;
                    break;
                }
            }
            if !moved {
                for ie in self.edge_poly_intersections_seg(v1x, v1y, v2x, v2y, hole) {
                    if ie.alpha1 > tol && ie.alpha1 < 1.0 - tol {
                        v2 = ie.e2;
                        moved = true;
                        break;
                    }
                }
            }
            if !moved {
                break;
            }
            probes += 1;
            if probes >= PROBE_CAP {
                warn!(exterior, hole, probes, "bridge search did not settle");
                self.warnings.push(GeometryWarning::BridgeSearchCapped {
                    exterior,
                    hole,
                    probes,
                });
                break;
            }
        }
        // Bridge via duplicated endpoints:
        //   ... int_c  -> ext_cc -> ext_r ...
        //   ... ext_c  -> int_cc -> int_r ...
        let int_c = v2;
        let int_r = self.v[v2 as usize].next;
        let ext_c = v1;
        let ext_r = self.v[v1 as usize].next;
        let int_cc = self.vert_dup(int_c);
        let ext_cc = self.vert_dup(ext_c);
        self.v[int_c as usize].next = ext_cc;
        self.v[ext_cc as usize].prev = int_c;
        self.v[ext_cc as usize].next = ext_r;
        self.v[ext_r as usize].prev = ext_cc;
        self.v[ext_c as usize].next = int_cc;
        self.v[int_cc as usize].prev = ext_c;
        self.v[int_cc as usize].next = int_r;
        self.v[int_r as usize].prev = int_cc;
        // The merged ring keeps the exterior's canonical first vertex.
        let first = self.v[ext_c as usize].first;
        let mut vert = ext_c;
        loop {
            self.v[vert as usize].first = first;
            vert = self.v[vert as usize].next;
            if vert == ext_c {
                break;
            }
        }
    }

    /// Clip the grid contents to their intersection with `poly2`.
    pub fn bool_and(&mut self, poly2: VertIdx) -> BoolOpReport {
        let bb = self.poly_grid_bb(poly2);
        let inserted = self.insert_vert_poly_gridmesh(poly2);
        debug!(
            verts_added = inserted.verts_added,
            edges_intersected = inserted.edges_intersected,
            "bool AND insertion pass"
        );
        let (p2x, p2y) = self.vert_get_coord(poly2);
        // No crossings at all: poly2 either misses the grid contents
        // entirely or sits inside one polygon, in which case it *is* the
        // intersection and replaces the cell's contents afterward.
        let mut add_poly_after_end = false;
        if inserted == InsertReport::default() {
            let p = self.poly_for_point(p2x, p2y);
            let mut subpoly = p;
            while subpoly != NIL {
                if self.point_in_polygon(p2x, p2y, subpoly) {
                    add_poly_after_end = true;
                    break;
                }
                subpoly = self.v[subpoly as usize].next_poly;
            }
        }
        // With crossings found, the entry/exit walk suffices.
        self.label_interior_freepoly(poly2);
        self.label_interior_and(poly2, false, Some(bb));
        self.trim_to_odd(None);
        if add_poly_after_end {
            let p = self.poly_for_point(p2x, p2y);
            self.v[p as usize].next_poly = poly2;
        }
        BoolOpReport {
            verts_added: inserted.verts_added,
            edges_intersected: inserted.edges_intersected,
            warnings: self.take_warnings(),
        }
    }

    /// Clip the grid contents to their intersection with the complement of
    /// `poly2`.
    pub fn bool_sub(&mut self, poly2: VertIdx) -> BoolOpReport {
        let bb = self.poly_grid_bb(poly2);
        let inserted = self.insert_vert_poly_gridmesh(poly2);
        debug!(
            verts_added = inserted.verts_added,
            edges_intersected = inserted.edges_intersected,
            "bool SUB insertion pass"
        );
        if inserted == InsertReport::default() {
            // No crossings: if poly2 sits inside a stored polygon, the
            // subtraction is a hole.
            let (p2x, p2y) = self.vert_get_coord(poly2);
            let mut containing = self.poly_for_point(p2x, p2y);
            while containing != NIL {
                if self.point_in_polygon(p2x, p2y, containing) {
                    // We were in a polygon after all.
                    self.punch_hole(containing, poly2);
                    break;
                }
                containing = self.v[containing as usize].next_poly;
            }
        } else {
            self.label_interior_freepoly(poly2);
            self.label_interior_and(poly2, true, Some(bb));
            self.trim_to_odd(Some(bb));
        }
        BoolOpReport {
            verts_added: inserted.verts_added,
            edges_intersected: inserted.edges_intersected,
            warnings: self.take_warnings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid(nx: usize, ny: usize) -> GridMesh {
        GridMesh::new((0.0, 0.0), (nx as Real, ny as Real), nx, ny).unwrap()
    }

    #[test]
    fn edge_crossing_cell_boundary_inserts_paired_verts() {
        let mut gm = unit_grid(2, 1);
        // Triangle crossing from cell (0,0) into cell (1,0).
        let p = gm
            .poly_new(&[(0.5, 0.25), (1.5, 0.25), (1.5, 0.75)])
            .unwrap();
        let report = gm.insert_vert_poly_gridmesh(p);
        assert!(report.verts_added > 0);
        assert!(report.edges_intersected > 0);
        // Every intersection vertex must have a neighbor at the same spot.
        let mut vert = p;
        let mut n_isect = 0;
        loop {
            if gm.v[vert as usize].is_intersection {
                n_isect += 1;
                let nb = gm.v[vert as usize].neighbor;
                assert_ne!(nb, NIL);
                assert_eq!(gm.vert_get_coord(vert), gm.vert_get_coord(nb));
            }
            vert = gm.v[vert as usize].next;
            if vert == p {
                break;
            }
        }
        assert_eq!(n_isect, report.verts_added);
        // Both touched cells lose their pristine flag.
        assert!(!gm.v[gm.poly_for_cell(0, 0) as usize].is_pristine);
        assert!(!gm.v[gm.poly_for_cell(1, 0) as usize].is_pristine);
    }

    #[test]
    fn contained_edge_adds_nothing() {
        let mut gm = unit_grid(2, 2);
        let p = gm
            .poly_new(&[(0.25, 0.25), (0.75, 0.25), (0.5, 0.75)])
            .unwrap();
        let report = gm.insert_vert_poly_gridmesh(p);
        assert_eq!(report, InsertReport::default());
        assert!(!gm.v[gm.poly_for_cell(0, 0) as usize].is_pristine);
        assert!(gm.v[gm.poly_for_cell(1, 1) as usize].is_pristine);
    }

    #[test]
    fn tie_break_prefers_raster_order() {
        let a = IntersectingEdge {
            x: 0.0,
            y: 0.0,
            alpha1: 0.5000001,
            e2: 1,
            cellidx: 2,
        };
        let b = IntersectingEdge {
            x: 0.0,
            y: 0.0,
            alpha1: 0.5,
            e2: 2,
            cellidx: 1,
        };
        assert_eq!(intersection_edge_order(&a, &b, 1e-5), Ordering::Greater);
        // Far apart, alpha wins regardless of cell order.
        let c = IntersectingEdge {
            x: 0.0,
            y: 0.0,
            alpha1: 0.9,
            e2: 3,
            cellidx: 0,
        };
        assert_eq!(intersection_edge_order(&a, &c, 1e-5), Ordering::Less);
    }

    #[test]
    fn punch_hole_merges_rings_with_bridge() {
        let mut gm = unit_grid(1, 1);
        let outer = gm
            .poly_new(&[(0.1, 0.1), (0.9, 0.1), (0.9, 0.9), (0.1, 0.9)])
            .unwrap();
        let hole = gm
            .poly_new(&[(0.4, 0.4), (0.6, 0.4), (0.6, 0.6), (0.4, 0.6)])
            .unwrap();
        let outer_area = gm.poly_signed_area(outer);
        gm.punch_hole(outer, hole);
        assert!(gm.warnings.is_empty());
        // One merged ring: 4 + 4 original + 2 duplicated bridge verts.
        let mut n = 0;
        let mut vert = outer;
        loop {
            assert_eq!(gm.v[vert as usize].first, gm.v[outer as usize].first);
            vert = gm.v[vert as usize].next;
            n += 1;
            assert!(n <= 10, "merged ring longer than expected");
            if vert == outer {
                break;
            }
        }
        assert_eq!(n, 10);
        // The bridge is zero-area: total signed area is outer minus hole.
        let merged_area = gm.poly_signed_area(outer);
        assert!((merged_area - (outer_area - 0.04)).abs() < 1e-9);
    }
}
