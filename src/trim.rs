// License: MIT
//
// The trim walk: after labeling, carve each cell's polygons down to the
// regions with odd winding against the clip, stitching entry/exit
// intersection pairs into new rings.
//
// Each cell is processed independently. Starting from every stored polygon
// a trace follows interior edges, switching rings at intersection vertices
// via their neighbor links, and records the vertices of one output polygon.
// Vertices consumed while looking for a valid start have their links
// severed so nothing is emitted in the excluded region. Finished traces are
// threaded onto the cell's `next_poly` backbone, and a final pass resets
// the per-operation flags on everything that survived.

use tracing::{trace, warn};

use crate::error::GeometryWarning;
use crate::mesh::{GridMesh, VertIdx, NIL};

impl GridMesh {
    /// Trim every cell in `bb` (default: the whole grid) to the regions
    /// labeled with odd winding.
    pub fn trim_to_odd(&mut self, bb: Option<[i32; 4]>) {
        let [minx, maxx, miny, maxy] = bb.unwrap_or([0, self.nx - 1, 0, self.ny - 1]);
        for j in miny..=maxy {
            for i in minx..=maxx {
                let cell = self.poly_for_cell(i, j);
                if cell != NIL {
                    trace!(x = i, y = j, "trim cell");
                    self.trim_cell_to_odd(cell);
                }
            }
        }
    }

    /// Trim one cell's polygon chain, leaving the surviving regions linked
    /// through `next_poly` off the cell's head slot `poly0`.
    pub fn trim_cell_to_odd(&mut self, poly0: VertIdx) {
        let mut previous_trace_poly = NIL;
        let mut trace_origins: Vec<VertIdx> = Vec::new();
        let mut trace: Vec<VertIdx> = Vec::with_capacity(256);
        let mut poly = poly0;
        while poly != NIL {
            // The backbone threading below rewrites next_poly links, so
            // remember where the old chain continues.
            let chain_next = self.v[poly as usize].next_poly;
            if self.v[poly as usize].next == NIL {
                poly = chain_next;
                continue;
            }
            trace_origins.push(poly);
            while let Some(origin) = trace_origins.pop() {
                trace.clear();
                let mut vert = origin;
                // Move until vert is a valid starting vertex, severing the
                // links of everything consumed on the way: no polygons may
                // be generated in the excluded region.
                let mut bail = false;
                loop {
                    let vv = &self.v[vert as usize];
                    if vv.is_intersection || vv.is_interior {
                        break;
                    }
                    if vv.is_used {
                        bail = true;
                        break;
                    }
                    self.v[vert as usize].is_used = true;
                    let next = self.v[vert as usize].next;
                    self.v[vert as usize].next = NIL;
                    self.v[vert as usize].prev = NIL;
                    vert = next;
                }
                if bail {
                    // No valid starting vertex on this origin.
                    continue;
                }

                // Follow the boundary from the starting vertex, recording
                // vertices into the trace and side branches into
                // trace_origins. At an entry intersection the walk jumps
                // onto the cutting ring, following it forward or backward
                // depending on the entry direction.
                let mut traverse_foreward = true;
                let mut can_next_step_branch = false;
                let this_trace_poly = vert;
                while vert != NIL && !self.v[vert as usize].is_used {
                    trace.push(vert);
                    let neighbor = self.v[vert as usize].neighbor;
                    let next;
                    if self.v[vert as usize].first == poly {
                        // Tracing an edge of the parent poly
                        if neighbor != NIL && can_next_step_branch {
                            trace_origins.push(self.v[vert as usize].next);
                            next = neighbor;
                            traverse_foreward = self.v[neighbor as usize].is_entry;
                            can_next_step_branch = false;
                        } else {
                            next = self.v[vert as usize].next;
                            can_next_step_branch = true;
                        }
                    } else {
                        // Tracing an edge of a cutting poly
                        if neighbor != NIL
                            && self.v[neighbor as usize].first == poly
                            && can_next_step_branch
                        {
                            next = neighbor;
                            traverse_foreward = true;
                            can_next_step_branch = false;
                        } else {
                            next = if traverse_foreward {
                                self.v[vert as usize].next
                            } else {
                                self.v[vert as usize].prev
                            };
                            can_next_step_branch = true;
                        }
                    }
                    self.v[vert as usize].is_used = true;
                    vert = next;
                }

                if trace.is_empty() {
                    continue;
                }
                trace!(poly, this_trace_poly, len = trace.len(), "trace complete");
                // Link the trace into a ring. A vertex followed directly by
                // its own neighbor is a doubled point where the walk
                // switched rings; keep only one of the pair.
                let first = trace[0];
                let l = trace.len();
                let mut i = 1;
                while i < l {
                    let left = trace[i - 1];
                    let mut right = trace[i];
                    if self.v[left as usize].neighbor == right {
                        if i == l - 1 {
                            trace.pop();
                        } else {
                            i += 1;
                            right = trace[i];
                        }
                    }
                    self.v[left as usize].next = right;
                    self.v[right as usize].prev = left;
                    i += 1;
                }
                let mut last = trace[trace.len() - 1];
                if self.v[last as usize].neighbor == first {
                    last = self.v[last as usize].prev;
                }
                self.v[last as usize].next = first;
                self.v[first as usize].prev = last;

                // Hook up the backbone
                if previous_trace_poly == NIL {
                    self.v[poly0 as usize].next_poly = this_trace_poly;
                } else {
                    if previous_trace_poly == this_trace_poly {
                        warn!(poly = this_trace_poly, "output polygon chain assembly failed");
                        self.warnings.push(GeometryWarning::PolyChainAssembly {
                            poly: this_trace_poly,
                        });
                    }
                    self.v[previous_trace_poly as usize].next_poly = this_trace_poly;
                }
                self.v[this_trace_poly as usize].next_poly = NIL;
                previous_trace_poly = this_trace_poly;
            }
            poly = chain_next;
        }
        // Reset the per-operation flags on every surviving polygon and
        // re-canonicalize first pointers.
        let mut poly = poly0;
        while poly != NIL {
            let mut vert = poly;
            loop {
                self.v[vert as usize].first = poly;
                self.v[vert as usize].is_intersection = false;
                self.v[vert as usize].is_interior = true;
                self.v[vert as usize].is_used = false;
                self.v[vert as usize].neighbor = NIL;
                vert = self.v[vert as usize].next;
                if vert == NIL || vert == poly {
                    break;
                }
            }
            poly = self.v[poly as usize].next_poly;
        }
    }
}
