// License: MIT
//
// Tolerance configuration for the trimming pipeline.

/// Tolerances used by intersection, labeling, and stitching.
///
/// The defaults are appropriate for geometry whose coordinates are within a
/// few orders of magnitude of the cell size. All fields are absolute unless
/// noted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimConfig {
    /// Distance under which two points are treated as coincident.
    pub tolerance: f64,
    /// Squared-sine-of-angle gate: segment pairs crossing more shallowly
    /// than this are treated as parallel and produce no intersection.
    pub shallow_angle_tol: f64,
    /// Intersections with interpolation parameter within this fraction of
    /// either segment endpoint are discarded (the endpoint itself is taken
    /// to be the meeting point).
    pub endpoint_frac_tol: f64,
    /// Intersections whose parameters along the subject edge differ by less
    /// than this are ordered by cell-crossing index instead.
    pub alpha_tie_tol: f64,
    /// Determinant threshold under which a query point is considered to lie
    /// on a polygon edge in point-in-polygon tests.
    pub boundary_det_tol: f64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            shallow_angle_tol: 1e-6,
            endpoint_frac_tol: 1e-6,
            alpha_tie_tol: 1e-5,
            boundary_det_tol: 1e-5,
        }
    }
}

impl TrimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_shallow_angle_tol(mut self, tol: f64) -> Self {
        self.shallow_angle_tol = tol;
        self
    }

    pub fn with_endpoint_frac_tol(mut self, tol: f64) -> Self {
        self.endpoint_frac_tol = tol;
        self
    }

    pub fn with_alpha_tie_tol(mut self, tol: f64) -> Self {
        self.alpha_tie_tol = tol;
        self
    }

    pub fn with_boundary_det_tol(mut self, tol: f64) -> Self {
        self.boundary_det_tol = tol;
        self
    }
}
