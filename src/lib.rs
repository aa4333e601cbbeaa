// gridmesh: grid-accelerated 2D polygon boolean trimming
// License: MIT
//
// A uniform grid of cell quads is clipped against arbitrary polygons with
// AND (keep the intersection) and SUB (punch the polygon out) operations.
// The grid accelerates everything: intersections are only computed in the
// cells an edge actually crosses, and interior labeling propagates across
// cell corners instead of re-running point-in-polygon tests.

pub mod clip;
pub mod config;
pub mod error;
pub mod geom;
pub mod label;
pub mod mesh;
pub mod raster;
pub mod trim;

pub use clip::{BoolOpReport, InsertReport, IntersectingEdge};
pub use config::TrimConfig;
pub use error::{GeometryWarning, GridError, GridResult};
pub use mesh::{Coord, GridMesh, GridMeshVert, PolyIter, VertIdx, NIL};
