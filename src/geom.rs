// License: MIT
//
// Pure geometric functions on 2D coordinates.
//
// Everything here is a free function on plain floats so that the predicates
// can be tested in isolation from the mesh arenas.

use crate::config::TrimConfig;

pub type Real = f64;

/// Returns true if (p1, p2, p3) are in counter-clockwise order,
/// i.e. ((p2-p1) x (p3-p2)).z > 0.
#[inline]
pub fn points_ccw(x1: Real, y1: Real, x2: Real, y2: Real, x3: Real, y3: Real) -> bool {
    let z = x1 * (y2 - y3) + x2 * (y3 - y1) + x3 * (y1 - y2);
    z > 0.0
}

/// Round toward negative infinity, as an i32.
#[inline]
pub fn floor_to_i32(val: Real) -> i32 {
    val.floor() as i32
}

/// An interior crossing of two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub x: Real,
    pub y: Real,
    /// Interpolation parameter along the first segment A-B.
    pub alpha1: Real,
}

/// Compute the crossing of segments A-B and C-D, if any.
///
/// Returns `None` when the segments do not straddle each other, cross at a
/// shallower angle than `shallow_angle_tol` permits, or meet within
/// `endpoint_frac_tol` of an endpoint of either segment. The returned point
/// is the affine interpolation along A-B at `alpha1`.
pub fn line_line_intersection(
    ax: Real,
    ay: Real,
    bx: Real,
    by: Real,
    cx: Real,
    cy: Real,
    dx: Real,
    dy: Real,
    config: &TrimConfig,
) -> Option<Intersection> {
    let ccw_acd = points_ccw(ax, ay, cx, cy, dx, dy);
    let ccw_bcd = points_ccw(bx, by, cx, cy, dx, dy);
    if ccw_acd == ccw_bcd {
        return None;
    }
    let ccw_abc = points_ccw(ax, ay, bx, by, cx, cy);
    let ccw_abd = points_ccw(ax, ay, bx, by, dx, dy);
    if ccw_abc == ccw_abd {
        return None;
    }
    let a11 = bx - ax;
    let a12 = cx - dx;
    let a21 = by - ay;
    let a22 = cy - dy;
    let ab_sq = a11 * a11 + a21 * a21;
    let cd_sq = a12 * a12 + a22 * a22;
    let det = a11 * a22 - a12 * a21; // ~0 iff collinear
    if (det * det).abs() < config.shallow_angle_tol * ab_sq * cd_sq {
        return None; // Almost parallel means no intersection for our purposes
    }
    let idet = 1.0 / det;
    let b1 = cx - ax;
    let b2 = cy - ay;
    let alpha1 = (b1 * a22 - b2 * a12) * idet;
    let alpha2 = (-b1 * a21 + b2 * a11) * idet;
    let tol = config.endpoint_frac_tol;
    if alpha1 < tol || alpha1 > (1.0 - tol) || alpha2 < tol || alpha2 > (1.0 - tol) {
        return None;
    }
    let ix = (1.0 - alpha1) * ax + alpha1 * bx;
    let iy = (1.0 - alpha1) * ay + alpha1 * by;
    #[cfg(debug_assertions)]
    {
        // The same point computed along C-D must agree.
        let ix2 = (1.0 - alpha2) * cx + alpha2 * dx;
        let iy2 = (1.0 - alpha2) * cy + alpha2 * dy;
        if (ix - ix2).abs() > 0.001 || (iy - iy2).abs() > 0.001 {
            tracing::warn!(
                dx = ix - ix2,
                dy = iy - iy2,
                "intersection cross-check mismatch"
            );
        }
    }
    Some(Intersection { x: ix, y: iy, alpha1 })
}

/// Sentinel returned by `quadrant` when the vertex coincides with the
/// query point.
pub const QUADRANT_COINCIDENT: i32 = 99;

/// Quadrant of (x, y) relative to the query point (vx, vy):
///
/// ```text
///  pi/2<=theta<pi     1   0   0<=theta<pi/2
///                       v
///  pi<=theta<3pi/2    2   3   3pi/2<=theta<2pi
/// ```
#[inline]
pub fn quadrant(x: Real, y: Real, vx: Real, vy: Real) -> i32 {
    if y > vy {
        // Upper half-plane is easy
        if x <= vx {
            1
        } else {
            0
        }
    } else if y < vy {
        // So is the lower half-plane
        2 + i32::from(x >= vx)
    } else {
        // y == vy
        if x > vx {
            0
        } else if x < vx {
            2
        } else {
            QUADRANT_COINCIDENT
        }
    }
}
