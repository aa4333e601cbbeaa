// License: MIT
// Shared test utilities for gridmesh tests.

#![allow(dead_code)]

use gridmesh::{GridMesh, VertIdx, NIL};

/// Grid over `[0, nx] x [0, ny]` with unit cells.
pub fn unit_grid(nx: usize, ny: usize) -> GridMesh {
    GridMesh::new((0.0, 0.0), (nx as f64, ny as f64), nx, ny).expect("valid grid")
}

/// First vertices of all live result polygons.
pub fn live_polys(gm: &GridMesh) -> Vec<VertIdx> {
    gm.polys().collect()
}

/// Coordinates of a polygon ring, in ring order starting at `poly`.
pub fn ring_coords(gm: &GridMesh, poly: VertIdx) -> Vec<(f64, f64)> {
    let mut ret = Vec::new();
    let mut vert = poly;
    loop {
        ret.push(gm.vert_get_coord(vert));
        vert = gm.v[vert as usize].next;
        if vert == NIL || vert == poly {
            break;
        }
    }
    ret
}

/// Sum of signed areas over every live polygon in the grid.
pub fn total_signed_area(gm: &GridMesh) -> f64 {
    gm.polys().map(|p| gm.poly_signed_area(p)).sum()
}

/// Shoelace signed area of a coordinate list.
pub fn polygon_signed_area(pts: &[(f64, f64)]) -> f64 {
    let n = pts.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += pts[i].0 * pts[j].1 - pts[j].0 * pts[i].1;
    }
    area * 0.5
}

/// Regular octagon with circumradius `r`, CCW, starting at angle 0.
pub fn regular_octagon(cx: f64, cy: f64, r: f64) -> Vec<(f64, f64)> {
    (0..8)
        .map(|i| {
            let theta = std::f64::consts::FRAC_PI_4 * i as f64;
            (cx + r * theta.cos(), cy + r * theta.sin())
        })
        .collect()
}

/// Assert that `actual` equals `expected` up to cyclic rotation of the
/// ring, comparing coordinates within `tol`.
pub fn assert_ring_matches_cyclic(actual: &[(f64, f64)], expected: &[(f64, f64)], tol: f64) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "ring length mismatch: {:?} vs {:?}",
        actual,
        expected
    );
    let n = expected.len();
    'rot: for offset in 0..n {
        for i in 0..n {
            let (ax, ay) = actual[(i + offset) % n];
            let (ex, ey) = expected[i];
            if (ax - ex).abs() > tol || (ay - ey).abs() > tol {
                continue 'rot;
            }
        }
        return;
    }
    panic!("no cyclic rotation matches: {:?} vs {:?}", actual, expected);
}
