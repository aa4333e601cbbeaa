// License: MIT
// End-to-end boolean operation tests: AND/SUB against grids of cells,
// verified by area accounting and ring extraction.

mod helpers;

use approx::assert_relative_eq;
use gridmesh::GridMesh;

#[test]
fn and_with_full_grid_rectangle_is_identity() {
    let mut gm = helpers::unit_grid(3, 3);
    let rect = gm
        .poly_new(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)])
        .unwrap();
    let report = gm.bool_and(rect);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    let polys = helpers::live_polys(&gm);
    assert_eq!(polys.len(), 9);
    assert_relative_eq!(helpers::total_signed_area(&gm), 9.0, epsilon = 1e-9);
}

#[test]
fn lattice_aligned_rectangle_keeps_whole_quads() {
    // Rectangle spanning the 2x2 cell grid exactly, corners on lattice
    // points: no intersection vertices are inserted and every cell keeps
    // its quad.
    let mut gm = helpers::unit_grid(2, 2);
    let rect = gm
        .poly_new(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)])
        .unwrap();
    let report = gm.bool_and(rect);
    assert_eq!(report.verts_added, 0);
    assert!(report.warnings.is_empty());
    let polys = helpers::live_polys(&gm);
    assert_eq!(polys.len(), 4);
    for p in polys {
        let ring = helpers::ring_coords(&gm, p);
        assert_eq!(ring.len(), 4, "cell result should stay a quad");
        assert_relative_eq!(gm.poly_signed_area(p), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn octagon_within_one_cell_takes_fast_path() {
    // Grid [0,10]^2 with 11x11 cells; the octagon sits strictly inside
    // cell (5,5), so insertion finds nothing and the AND result is the
    // octagon itself.
    let mut gm = GridMesh::new((0.0, 0.0), (10.0, 10.0), 11, 11).unwrap();
    let pts = helpers::regular_octagon(5.0, 5.0, 0.3);
    let oct = gm.poly_new(&pts).unwrap();
    let report = gm.bool_and(oct);
    assert_eq!(report.verts_added, 0);
    assert_eq!(report.edges_intersected, 0);
    assert!(report.warnings.is_empty());
    let polys = helpers::live_polys(&gm);
    assert_eq!(polys.len(), 1, "exactly one output polygon");
    let ring = helpers::ring_coords(&gm, polys[0]);
    helpers::assert_ring_matches_cyclic(&ring, &pts, 1e-12);
}

#[test]
fn and_conserves_area_of_contained_polygon() {
    let mut gm = helpers::unit_grid(4, 4);
    let pts = helpers::regular_octagon(2.5, 1.5, 0.4);
    let expected_area = helpers::polygon_signed_area(&pts);
    let oct = gm.poly_new(&pts).unwrap();
    gm.bool_and(oct);
    assert_relative_eq!(
        helpers::total_signed_area(&gm),
        expected_area,
        epsilon = 1e-9
    );
}

#[test]
fn and_with_oversized_polygon_keeps_whole_grid() {
    let mut gm = helpers::unit_grid(2, 2);
    let big = gm
        .poly_new(&[(-1.0, -1.0), (3.0, -1.0), (3.0, 3.0), (-1.0, 3.0)])
        .unwrap();
    gm.bool_and(big);
    let polys = helpers::live_polys(&gm);
    assert_eq!(polys.len(), 4);
    assert_relative_eq!(helpers::total_signed_area(&gm), 4.0, epsilon = 1e-9);
}

#[test]
fn and_with_disjoint_polygon_empties_the_grid() {
    let mut gm = helpers::unit_grid(2, 2);
    let far = gm
        .poly_new(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 6.0)])
        .unwrap();
    gm.bool_and(far);
    assert!(helpers::live_polys(&gm).is_empty());
    assert_relative_eq!(helpers::total_signed_area(&gm), 0.0, epsilon = 1e-12);
}

#[test]
fn and_clips_diamond_spanning_cells() {
    let mut gm = helpers::unit_grid(4, 4);
    // Rotated square with diagonal 2.8, area 3.92, crossing cell interiors
    // transversally (no vertex or crossing on a lattice line).
    let diamond = [(2.1, 0.7), (3.5, 2.1), (2.1, 3.5), (0.7, 2.1)];
    let p = gm.poly_new(&diamond).unwrap();
    let report = gm.bool_and(p);
    assert!(report.verts_added > 0);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_relative_eq!(
        helpers::total_signed_area(&gm),
        helpers::polygon_signed_area(&diamond),
        epsilon = 1e-6
    );
}

#[test]
fn and_and_sub_areas_are_complementary() {
    let diamond = [(2.1, 0.7), (3.5, 2.1), (2.1, 3.5), (0.7, 2.1)];

    let mut gm_and = helpers::unit_grid(4, 4);
    let p = gm_and.poly_new(&diamond).unwrap();
    gm_and.bool_and(p);
    let area_and = helpers::total_signed_area(&gm_and);

    let mut gm_sub = helpers::unit_grid(4, 4);
    let p = gm_sub.poly_new(&diamond).unwrap();
    let report = gm_sub.bool_sub(p);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    let area_sub = helpers::total_signed_area(&gm_sub);

    assert_relative_eq!(area_and + area_sub, 16.0, epsilon = 1e-6);
}

#[test]
fn sub_of_contained_polygon_punches_a_hole() {
    let mut gm = helpers::unit_grid(1, 1);
    let hole = gm
        .poly_new(&[(0.4, 0.4), (0.6, 0.4), (0.6, 0.6), (0.4, 0.6)])
        .unwrap();
    let report = gm.bool_sub(hole);
    assert_eq!(report.verts_added, 0);
    assert!(report.warnings.is_empty());
    let polys = helpers::live_polys(&gm);
    assert_eq!(polys.len(), 1, "hole is bridged into the cell quad");
    assert_relative_eq!(gm.poly_signed_area(polys[0]), 0.96, epsilon = 1e-9);
}

#[test]
fn sub_of_disjoint_polygon_changes_nothing() {
    let mut gm = helpers::unit_grid(2, 2);
    let far = gm
        .poly_new(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 6.0)])
        .unwrap();
    gm.bool_sub(far);
    assert_eq!(helpers::live_polys(&gm).len(), 4);
    assert_relative_eq!(helpers::total_signed_area(&gm), 4.0, epsilon = 1e-9);
}

#[test]
fn sub_then_remainder_area_matches() {
    let mut gm = helpers::unit_grid(4, 4);
    let diamond = [(2.1, 0.7), (3.5, 2.1), (2.1, 3.5), (0.7, 2.1)];
    let p = gm.poly_new(&diamond).unwrap();
    gm.bool_sub(p);
    assert_relative_eq!(
        helpers::total_signed_area(&gm),
        16.0 - helpers::polygon_signed_area(&diamond),
        epsilon = 1e-6
    );
}

#[test]
fn labeling_twice_is_idempotent() {
    let mut gm = helpers::unit_grid(4, 4);
    let diamond = gm
        .poly_new(&[(2.1, 0.7), (3.5, 2.1), (2.1, 3.5), (0.7, 2.1)])
        .unwrap();
    gm.insert_vert_poly_gridmesh(diamond);
    gm.label_interior_and(diamond, false, None);
    let flags_once: Vec<bool> = gm.v.iter().map(|vert| vert.is_interior).collect();
    gm.label_interior_and(diamond, false, None);
    let flags_twice: Vec<bool> = gm.v.iter().map(|vert| vert.is_interior).collect();
    assert_eq!(flags_once, flags_twice);
}

#[test]
fn clockwise_subject_clips_the_same_region() {
    // Containment is orientation-independent, so a clockwise diamond
    // selects the same area.
    let mut gm = helpers::unit_grid(4, 4);
    let diamond_cw = [(2.1, 0.7), (0.7, 2.1), (2.1, 3.5), (3.5, 2.1)];
    let p = gm.poly_new(&diamond_cw).unwrap();
    gm.bool_and(p);
    assert_relative_eq!(
        helpers::total_signed_area(&gm).abs(),
        3.92,
        epsilon = 1e-6
    );
}
