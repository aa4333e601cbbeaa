// License: MIT
//
// The vertex arena and polygon topology.
//
// All links between vertices are u32 indices into the `v` arena; index 0 is
// reserved as the invalid sentinel, so any link can be tested for validity
// with `!= NIL`. Coordinates live in a parallel `coords` arena, also with
// slot 0 reserved (it holds a telltale location). Grid cells own fixed
// blocks of both arenas:
//   - cell (x, y) owns vertex slots 1 + 4*(y*nx + x) .. +4, pre-built as a
//     cyclic quad LL -> LR -> UR -> UL whose `first` is the LL slot;
//   - grid point (x, y) owns coord slot 1 + y*(nx+1) + x.
// Pristine cell corners share the grid-point coords; vertices created later
// own freshly appended coord slots.

use crate::config::TrimConfig;
use crate::error::{GeometryWarning, GridError, GridResult};
use crate::geom::{floor_to_i32, Real};

/// Invalid index sentinel for both arenas.
pub const NIL: u32 = 0;

/// Index into `GridMesh::v`.
pub type VertIdx = u32;
/// Index into `GridMesh::coords`.
pub type CoordIdx = u32;

/// Corner codes stored in `GridMeshVert::corner`.
/// 0 = not a cell corner.
pub const CORNER_LL: u8 = 1;
pub const CORNER_UL: u8 = 2;
pub const CORNER_LR: u8 = 3;
pub const CORNER_UR: u8 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coord {
    pub x: Real,
    pub y: Real,
}

/// One vertex record. Plain data; all polygon structure is in the links.
#[derive(Debug, Clone)]
pub struct GridMeshVert {
    /// Next vertex in the same polygon ring (NIL past the end of an open
    /// chain).
    pub next: VertIdx,
    /// Previous vertex in the same polygon ring.
    pub prev: VertIdx,
    /// First vertex of the next polygon stored in the same cell.
    pub next_poly: VertIdx,
    /// Cycle of vertices at the same location in other polygons.
    pub neighbor: VertIdx,
    /// Canonical first vertex of this vertex's polygon.
    pub first: VertIdx,
    pub coord_idx: CoordIdx,
    /// Cell corner code (CORNER_*), 0 if none.
    pub corner: u8,
    /// True if this vertex was added at an intersection.
    pub is_intersection: bool,
    pub is_interior: bool,
    /// For intersection vertices: does the subject polygon enter the
    /// clipping region here?
    pub is_entry: bool,
    /// Trace bookkeeping during trimming.
    pub is_used: bool,
    /// True while the cell quad is untouched by any clip.
    pub is_pristine: bool,
    /// True if this vertex owns its coord slot (vs. sharing a grid point).
    pub owns_coords: bool,
}

impl Default for GridMeshVert {
    fn default() -> Self {
        Self {
            next: NIL,
            prev: NIL,
            next_poly: NIL,
            neighbor: NIL,
            first: NIL,
            coord_idx: NIL,
            corner: 0,
            is_intersection: false,
            is_interior: true,
            is_entry: false,
            is_used: false,
            is_pristine: false,
            owns_coords: false,
        }
    }
}

/// A uniform grid of cell quads supporting polygon boolean trimming.
pub struct GridMesh {
    /// Coordinate arena. Slot 0 is invalid.
    pub coords: Vec<Coord>,
    /// Vertex arena. Slot 0 is invalid.
    pub v: Vec<GridMeshVert>,
    // Interior/exterior state is cheap to answer at grid points thanks to
    // crossing parity gathered during rasterization. Indexed by
    // gridpt_for_cell; slot 0 absorbs out-of-range flips.
    pub(crate) ie_grid: Vec<bool>,
    pub(crate) ie_isect_right: Vec<bool>,
    pub(crate) ie_isect_up: Vec<bool>,
    /// Warnings accumulated by the current boolean operation.
    pub(crate) warnings: Vec<GeometryWarning>,
    pub llx: Real,
    pub lly: Real,
    pub urx: Real,
    pub ury: Real,
    /// Cell dimensions and their reciprocals.
    pub dx: Real,
    pub dy: Real,
    pub inv_dx: Real,
    pub inv_dy: Real,
    /// Cell counts per axis.
    pub nx: i32,
    pub ny: i32,
    pub config: TrimConfig,
}

impl GridMesh {
    /// Build a grid covering `ll..ur` with `nx` by `ny` cells.
    pub fn new(ll: (Real, Real), ur: (Real, Real), nx: usize, ny: usize) -> GridResult<Self> {
        Self::new_with_config(ll, ur, nx, ny, TrimConfig::default())
    }

    pub fn new_with_config(
        ll: (Real, Real),
        ur: (Real, Real),
        nx: usize,
        ny: usize,
        config: TrimConfig,
    ) -> GridResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(GridError::EmptyGrid { nx, ny });
        }
        let (llx, lly) = ll;
        let (urx, ury) = ur;
        if !(llx < urx && lly < ury) || !(llx.is_finite() && lly.is_finite() && urx.is_finite() && ury.is_finite()) {
            return Err(GridError::DegenerateBounds { llx, lly, urx, ury });
        }
        let nx = nx as i32;
        let ny = ny as i32;
        let dx = (urx - llx) / Real::from(nx);
        let dy = (ury - lly) / Real::from(ny);
        let mut gm = GridMesh {
            coords: Vec::new(),
            v: Vec::new(),
            ie_grid: Vec::new(),
            ie_isect_right: Vec::new(),
            ie_isect_up: Vec::new(),
            warnings: Vec::new(),
            llx,
            lly,
            urx,
            ury,
            dx,
            dy,
            inv_dx: 1.0 / dx,
            inv_dy: 1.0 / dy,
            nx,
            ny,
            config,
        };
        gm.init_grid();
        Ok(gm)
    }

    fn init_grid(&mut self) {
        let nx = self.nx;
        let ny = self.ny;
        let num_gridpts = ((nx + 1) * (ny + 1)) as usize;
        self.coords = vec![Coord::default(); num_gridpts + 1];
        // Telltale location in the invalid slot.
        self.coords[0] = Coord { x: -1234.0, y: -1234.0 };
        for j in 0..=ny {
            for i in 0..=nx {
                let c = self.gridpt_for_cell(i, j) as usize;
                self.coords[c] = Coord {
                    x: self.llx + Real::from(i) * self.dx,
                    y: self.lly + Real::from(j) * self.dy,
                };
            }
        }
        self.v = vec![GridMeshVert::default(); (nx * ny * 4 * 2) as usize];
        self.ie_grid = vec![true; num_gridpts + 1];
        self.ie_isect_right = vec![false; num_gridpts + 1];
        self.ie_isect_up = vec![false; num_gridpts + 1];
        for j in 0..ny {
            for i in 0..nx {
                let iv1 = self.poly_for_cell(i, j);
                let iv1c = self.gridpt_for_cell(i, j);
                let (iv2, iv2c) = (iv1 + 1, iv1c + 1);
                let (iv3, iv3c) = (iv1 + 2, iv1c + nx as u32 + 2);
                let (iv4, iv4c) = (iv1 + 3, iv1c + nx as u32 + 1);
                // LL -> LR -> UR -> UL, cyclic.
                let (i1, i2, i3, i4) = (iv1 as usize, iv2 as usize, iv3 as usize, iv4 as usize);
                self.v[i1].coord_idx = iv1c;
                self.v[i2].coord_idx = iv2c;
                self.v[i3].coord_idx = iv3c;
                self.v[i4].coord_idx = iv4c;
                self.v[i1].next = iv2;
                self.v[i2].prev = iv1;
                self.v[i1].first = iv1;
                self.v[i1].corner = CORNER_LL;
                self.v[i2].next = iv3;
                self.v[i3].prev = iv2;
                self.v[i2].first = iv1;
                self.v[i2].corner = CORNER_LR;
                self.v[i3].next = iv4;
                self.v[i4].prev = iv3;
                self.v[i3].first = iv1;
                self.v[i3].corner = CORNER_UR;
                self.v[i4].next = iv1;
                self.v[i1].prev = iv4;
                self.v[i4].first = iv1;
                self.v[i4].corner = CORNER_UL;
                self.v[i1].is_pristine = true;
            }
        }
    }

    // ──────────────────────────── Coordinate utilities ────────────────────────

    /// Coord slot of grid point (x, y), or NIL out of range.
    #[inline]
    pub fn gridpt_for_cell(&self, x: i32, y: i32) -> CoordIdx {
        if 0 <= x && x <= self.nx && 0 <= y && y <= self.ny {
            (1 + y * (self.nx + 1) + x) as u32
        } else {
            NIL
        }
    }

    /// First vertex slot of cell (x, y), or NIL out of range.
    #[inline]
    pub fn poly_for_cell(&self, x: i32, y: i32) -> VertIdx {
        if 0 <= x && x < self.nx && 0 <= y && y < self.ny {
            (1 + 4 * (y * self.nx + x)) as u32
        } else {
            NIL
        }
    }

    /// First vertex slot of the cell containing the world-space point, or
    /// NIL if the point lies outside the grid.
    pub fn poly_for_point(&self, fx: Real, fy: Real) -> VertIdx {
        let x = floor_to_i32((fx - self.llx) * self.inv_dx);
        if x < 0 || x >= self.nx {
            return NIL;
        }
        let y = floor_to_i32((fy - self.lly) * self.inv_dy);
        if y < 0 || y >= self.ny {
            return NIL;
        }
        (1 + 4 * (y * self.nx + x)) as u32
    }

    /// Cell coordinates owning a pre-allocated cell vertex slot.
    pub fn cell_for_vert(&self, vert: VertIdx) -> (i32, i32) {
        // vert = 1 + 4*(y*nx + x)
        let ynx_plus_x = (vert as i32 - 1) / 4;
        (ynx_plus_x % self.nx, ynx_plus_x / self.nx)
    }

    /// World-space lower-left corner of cell (x, y).
    pub fn cell_ll_corner(&self, x: i32, y: i32) -> (Real, Real) {
        (
            self.llx + Real::from(x) * self.dx,
            self.lly + Real::from(y) * self.dy,
        )
    }

    // ──────────────────────────── Vertex manipulation ──────────────────────────

    pub fn vert_new(&mut self) -> VertIdx {
        self.v.push(GridMeshVert::default());
        (self.v.len() - 1) as u32
    }

    /// New vertex spliced between `prev` and `next` (either may be NIL).
    /// Inherits `first` from whichever side is given.
    pub fn vert_new_between(&mut self, prev: VertIdx, next: VertIdx) -> VertIdx {
        let ret = self.vert_new();
        if prev != NIL {
            self.v[ret as usize].first = self.v[prev as usize].first;
            self.v[ret as usize].prev = prev;
            self.v[prev as usize].next = ret;
        }
        if next != NIL {
            self.v[ret as usize].first = self.v[next as usize].first;
            self.v[ret as usize].next = next;
            self.v[next as usize].prev = ret;
        }
        ret
    }

    /// New vertex that is a field-for-field copy of `vert`.
    pub fn vert_dup(&mut self, vert: VertIdx) -> VertIdx {
        let copy = self.v[vert as usize].clone();
        self.v.push(copy);
        (self.v.len() - 1) as u32
    }

    /// Move `vert` to (x, y), appending a fresh coord slot unless the
    /// vertex already owns one.
    pub fn vert_set_coord(&mut self, vert: VertIdx, x: Real, y: Real) {
        if self.v[vert as usize].owns_coords {
            let idx = self.v[vert as usize].coord_idx as usize;
            self.coords[idx] = Coord { x, y };
            return;
        }
        let idx = self.coords.len() as u32;
        self.coords.push(Coord { x, y });
        self.v[vert as usize].coord_idx = idx;
        self.v[vert as usize].owns_coords = true;
    }

    #[inline]
    pub fn vert_get_coord(&self, vert: VertIdx) -> (Real, Real) {
        let c = self.coords[self.v[vert as usize].coord_idx as usize];
        (c.x, c.y)
    }

    /// Walk `vert`'s neighbor cycle looking for a vertex belonging to
    /// `poly`. Returns NIL if none.
    pub fn vert_neighbor_on_poly(&self, vert: VertIdx, poly: VertIdx) -> VertIdx {
        let mut cur = vert;
        while cur != NIL {
            if self.v[cur as usize].first == poly {
                return cur;
            }
            cur = self.v[cur as usize].neighbor;
            if cur == vert {
                break;
            }
        }
        NIL
    }

    /// Merge the neighbor cycles of `v1` and `v2` (vertices stacked at the
    /// same location in different polygons).
    pub fn vert_add_neighbor(&mut self, mut v1: VertIdx, mut v2: VertIdx) {
        if self.v[v1 as usize].neighbor == NIL && self.v[v2 as usize].neighbor == NIL {
            self.v[v1 as usize].neighbor = v2;
            self.v[v2 as usize].neighbor = v1;
            return;
        }
        if self.v[v1 as usize].neighbor == NIL && self.v[v2 as usize].neighbor != NIL {
            std::mem::swap(&mut v1, &mut v2);
        }
        // v1 has a cycle, v2 may or may not
        let mut v1_last = v1;
        while v1_last != NIL && self.v[v1_last as usize].neighbor != v1 {
            v1_last = self.v[v1_last as usize].neighbor;
        }
        if self.v[v1 as usize].neighbor != NIL && self.v[v2 as usize].neighbor != NIL {
            let mut v2_last = v2;
            while v2_last != NIL && self.v[v2_last as usize].neighbor != v2 {
                v2_last = self.v[v2_last as usize].neighbor;
            }
            self.v[v1_last as usize].neighbor = v2;
            self.v[v2_last as usize].neighbor = v1;
        } else {
            // v1 has a cycle, v2 does not
            self.v[v1_last as usize].neighbor = v2;
            self.v[v2 as usize].neighbor = v1;
        }
    }

    // ──────────────────────────── Polygon manipulation ─────────────────────────

    /// Build a free-standing cyclic polygon from world-space vertices.
    /// Returns the first vertex of the new ring.
    pub fn poly_new(&mut self, pts: &[(Real, Real)]) -> GridResult<VertIdx> {
        if pts.len() < 3 {
            return Err(GridError::TooFewVertices { got: pts.len() });
        }
        for &(x, y) in pts {
            if !(x.is_finite() && y.is_finite()) {
                return Err(GridError::NonFiniteCoord { x, y });
            }
        }
        let mut last = NIL;
        let mut first = NIL;
        for &(x, y) in pts {
            let vert = self.vert_new_between(last, NIL);
            if first == NIL {
                first = vert;
            }
            self.v[vert as usize].first = first;
            self.vert_set_coord(vert, x, y);
            last = vert;
        }
        self.v[first as usize].prev = last;
        self.v[last as usize].next = first;
        Ok(first)
    }

    /// Canonical first vertex of the polygon containing `vert`.
    pub fn poly_first_vert(&self, vert: VertIdx) -> VertIdx {
        let mut v2 = vert;
        while self.v[v2 as usize].prev != NIL {
            if self.v[v2 as usize].first == v2 {
                return v2;
            }
            v2 = self.v[v2 as usize].prev;
        }
        v2
    }

    /// Last vertex of the polygon containing `vert` (the one linking back
    /// to `first`, or the chain tail if the polygon is open).
    pub fn poly_last_vert(&self, vert: VertIdx) -> VertIdx {
        let mut v2 = vert;
        while self.v[v2 as usize].next != NIL && self.v[v2 as usize].next != self.v[v2 as usize].first
        {
            v2 = self.v[v2 as usize].next;
        }
        v2
    }

    /// Next polygon in the same cell's chain.
    pub fn poly_next(&self, anyvert: VertIdx) -> VertIdx {
        self.v[self.poly_first_vert(anyvert) as usize].next_poly
    }

    /// Tail of a cell's polygon chain.
    pub fn poly_last(&self, mut poly: VertIdx) -> VertIdx {
        while self.v[poly as usize].next_poly != NIL {
            poly = self.v[poly as usize].next_poly;
        }
        poly
    }

    pub fn poly_is_cyclic(&self, poly: VertIdx) -> bool {
        if self.v[poly as usize].next == NIL {
            return false;
        }
        self.v[self.poly_first_vert(poly) as usize].prev != NIL
    }

    pub fn poly_set_cyclic(&mut self, poly: VertIdx, cyclic: bool) {
        if cyclic == self.poly_is_cyclic(poly) {
            return;
        }
        let first = self.poly_first_vert(poly);
        let last = self.poly_last_vert(poly);
        if cyclic {
            self.v[first as usize].prev = last;
            self.v[last as usize].next = first;
        } else {
            self.v[first as usize].prev = NIL;
            self.v[last as usize].next = NIL;
        }
    }

    pub fn poly_num_edges(&self, poly: VertIdx) -> usize {
        let mut poly = self.poly_first_vert(poly);
        let mut ret = 0;
        while self.v[poly as usize].next != NIL {
            ret += 1;
            let next = self.v[poly as usize].next;
            if self.v[next as usize].first == next {
                break;
            }
            poly = next;
        }
        ret
    }

    /// Vertex of `anyvert`'s polygon within `tolerance` of (x, y), or NIL.
    pub fn poly_vert_at(&self, anyvert: VertIdx, x: Real, y: Real) -> VertIdx {
        let mut first_iter = true;
        let mut vert = self.poly_first_vert(anyvert);
        while vert != NIL {
            let (vx, vy) = self.vert_get_coord(vert);
            if (x - vx).abs() + (y - vy).abs() < self.config.tolerance {
                return vert;
            }
            if first_iter {
                first_iter = false;
            } else if self.v[vert as usize].first == vert {
                break;
            }
            vert = self.v[vert as usize].next;
        }
        NIL
    }

    /// Set `is_interior` on every vertex of `poly` and of every polygon
    /// chained after it.
    pub fn poly_set_interior(&mut self, poly: VertIdx, interior: bool) {
        let mut poly = self.poly_first_vert(poly);
        while poly != NIL {
            let first = self.poly_first_vert(poly);
            let mut vert = first;
            loop {
                self.v[vert as usize].is_interior = interior;
                vert = self.v[vert as usize].next;
                if vert == NIL || vert == first {
                    break;
                }
            }
            poly = self.v[poly as usize].next_poly;
        }
    }

    /// Integer grid-space bounding box of a polygon: [minx, maxx, miny, maxy].
    pub fn poly_grid_bb(&self, poly: VertIdx) -> [i32; 4] {
        let first = self.poly_first_vert(poly);
        let mut vert = first;
        let mut minx = Real::MAX;
        let mut maxx = Real::MIN;
        let mut miny = Real::MAX;
        let mut maxy = Real::MIN;
        loop {
            let (x, y) = self.vert_get_coord(vert);
            minx = minx.min(x);
            maxx = maxx.max(x);
            miny = miny.min(y);
            maxy = maxy.max(y);
            vert = self.v[vert as usize].next;
            if vert == NIL || vert == first {
                break;
            }
        }
        [
            floor_to_i32((minx - self.llx) * self.inv_dx),
            floor_to_i32((maxx - self.llx) * self.inv_dx),
            floor_to_i32((miny - self.lly) * self.inv_dy),
            floor_to_i32((maxy - self.lly) * self.inv_dy),
        ]
    }

    pub fn poly_translate(&mut self, poly: VertIdx, x: Real, y: Real) {
        let mut vert = poly;
        loop {
            let (vx, vy) = self.vert_get_coord(vert);
            self.vert_set_coord(vert, vx + x, vy + y);
            vert = self.v[vert as usize].next;
            if vert == poly {
                break;
            }
        }
    }

    /// Signed area via a triangle fan from the first vertex. CCW positive.
    pub fn poly_signed_area(&self, poly: VertIdx) -> Real {
        let (v0x, v0y) = self.vert_get_coord(poly);
        let v1 = self.v[poly as usize].next;
        let (mut v1x, mut v1y) = self.vert_get_coord(v1);
        let mut v2 = self.v[v1 as usize].next;
        let mut a = 0.0;
        while v2 != NIL && v2 != poly {
            let (v2x, v2y) = self.vert_get_coord(v2);
            a += (v1x - v0x) * (v2y - v0y) - (v2x - v0x) * (v1y - v0y);
            v1x = v2x;
            v1y = v2y;
            v2 = self.v[v2 as usize].next;
        }
        a * 0.5
    }

    pub fn poly_flip_winding_direction(&mut self, poly: VertIdx) {
        let mut vert = poly;
        loop {
            let old_prev = self.v[vert as usize].prev;
            let old_next = self.v[vert as usize].next;
            self.v[vert as usize].prev = old_next;
            self.v[vert as usize].next = old_prev;
            vert = old_next;
            if vert == poly {
                break;
            }
        }
    }

    /// Drain the warnings accumulated since the last drain.
    pub fn take_warnings(&mut self) -> Vec<GeometryWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Iterate over every live result polygon in the grid, cell by cell.
    pub fn polys(&self) -> PolyIter<'_> {
        PolyIter::new(self)
    }
}

/// Iterator over the first vertices of all live polygons, walking each
/// cell's `next_poly` chain and skipping degenerate (linkless) slots.
pub struct PolyIter<'a> {
    gm: &'a GridMesh,
    cell: VertIdx,
    poly: VertIdx,
    last_cell: VertIdx,
}

impl<'a> PolyIter<'a> {
    fn new(gm: &'a GridMesh) -> Self {
        PolyIter {
            gm,
            cell: 1,
            poly: 1,
            last_cell: gm.poly_for_cell(gm.nx - 1, gm.ny - 1),
        }
    }

    /// Move the cursor to the next chained slot, or NIL past the last cell.
    fn advance(&mut self) {
        let next_poly = self.gm.v[self.poly as usize].next_poly;
        if next_poly != NIL {
            self.poly = next_poly;
            return;
        }
        self.cell += 4;
        self.poly = if self.cell > self.last_cell {
            NIL
        } else {
            self.cell
        };
    }
}

impl<'a> Iterator for PolyIter<'a> {
    type Item = VertIdx;

    fn next(&mut self) -> Option<VertIdx> {
        while self.poly != NIL {
            let cur = self.poly;
            let live = self.gm.v[cur as usize].next != NIL;
            self.advance();
            if live {
                return Some(cur);
            }
        }
        None
    }
}
