// License: MIT
//
// Error and warning taxonomy.
//
// `GridError` covers construction and input failures that abort an API call.
// `GeometryWarning` covers in-pipeline degradations the boolean operations
// recover from; they are collected into the `BoolOpReport` of the operation
// that produced them and logged, never raised as `Err`.

use thiserror::Error;

use crate::mesh::VertIdx;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid must have at least one cell per axis, got {nx}x{ny}")]
    EmptyGrid { nx: usize, ny: usize },

    #[error("degenerate grid bounds: lower-left ({llx}, {lly}) must be strictly below upper-right ({urx}, {ury})")]
    DegenerateBounds {
        llx: f64,
        lly: f64,
        urx: f64,
        ury: f64,
    },

    #[error("polygon needs at least 3 vertices, got {got}")]
    TooFewVertices { got: usize },

    #[error("coordinate is not finite: ({x}, {y})")]
    NonFiniteCoord { x: f64, y: f64 },
}

pub type GridResult<T> = Result<T, GridError>;

/// A recoverable anomaly detected during a boolean operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryWarning {
    /// The bridge probe in hole punching did not settle on an
    /// intersection-free bridge within the probe cap.
    #[error("bridge search capped after {probes} probes (exterior {exterior}, hole {hole})")]
    BridgeSearchCapped {
        exterior: VertIdx,
        hole: VertIdx,
        probes: u32,
    },

    /// The trim walk produced a trace that closed back onto itself when
    /// threading output polygons into the cell chain.
    #[error("output polygon chain assembly failed at vertex {poly}")]
    PolyChainAssembly { poly: VertIdx },
}
