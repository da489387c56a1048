//! Convex polygon query: pixels inside a spherical polygon.

use super::{check_pixel, DescentBases};
use crate::{
    bits, coord::Pointing, error::PolygonError, Grid, RangeSet, Vec3d,
    HALF_PI,
};
use std::f64::consts::PI;

/// Collects the pixels of the NEST grid inside the convex polygon spanned
/// by `vertices`.
///
/// Each edge contributes a great-circle half-space constraint (the normal
/// oriented so that the interior is the positive side); in inclusive mode
/// the smallest enclosing cap of the vertices is added as one more
/// constraint so that the safety margins stay bounded.
pub(crate) fn polygon(
    grid: &Grid,
    vertices: &[Pointing],
    fact: i64,
) -> Result<RangeSet, PolygonError> {
    let inclusive = fact != 0;
    let nv = vertices.len();
    if nv < 3 {
        return Err(PolygonError::new("not enough vertices in polygon"));
    }

    let vv: Vec<Vec3d> = vertices.iter().map(|&v| Vec3d::from(v)).collect();
    let mut normals = Vec::with_capacity(nv + 1);
    let mut flipped = false;
    for i in 0..nv {
        let normal = vv[i].cross(&vv[(i + 1) % nv]).normalized();
        let hnd = normal.dot(&vv[(i + 2) % nv]);
        // A zero cross product yields a NaN normal, caught here as well.
        if hnd.is_nan() || hnd.abs() <= 1e-10 {
            return Err(PolygonError::new("degenerate corner"));
        }
        if i == 0 {
            flipped = hnd < 0.;
        } else if (hnd < 0.) != flipped {
            return Err(PolygonError::new("polygon is not convex"));
        }
        normals.push(if flipped { -normal } else { normal });
    }

    let mut rad = vec![HALF_PI; nv];
    if inclusive {
        let (center, cosrad) = find_enclosing_circle(&vv);
        normals.push(center);
        rad.push(cosrad.acos());
    }

    Ok(multi_halfspace(grid, &normals, &rad, fact))
}

/// Descent over the intersection of half-spaces `dot(p, normal) >= cos(rad)`.
fn multi_halfspace(
    grid: &Grid,
    normals: &[Vec3d],
    rad: &[f64],
    fact: i64,
) -> RangeSet {
    debug_assert_eq!(normals.len(), rad.len());
    let mut pixset = RangeSet::new();
    let inclusive = fact != 0;

    let oplus = if inclusive { bits::ilog2(fact) } else { 0 };
    let bases = DescentBases::new(grid, oplus);
    let omax = bases.omax();

    // crlimit[o][i] = cos(rad ± safety margin) at order o for constraint i,
    // ordered from loosest to tightest.
    let crlimit: Vec<Vec<[f64; 3]>> = bases
        .pixrads()
        .iter()
        .map(|&dr| {
            rad.iter()
                .map(|&r| {
                    [
                        if r + dr > PI { -1. } else { (r + dr).cos() },
                        r.cos(),
                        if r - dr < 0. { 1. } else { (r - dr).cos() },
                    ]
                })
                .collect()
        })
        .collect();

    let mut stk = bases.seed_stack();
    let mut stacktop = 0_usize;

    while let Some((pix, o)) = stk.pop() {
        let pv = bases.grid(o).pix2vec(pix);

        // The node zone is the tightest classification over all constraints.
        let mut zone = 3_usize;
        for (normal, limits) in normals.iter().zip(&crlimit[o as usize]) {
            let crad = pv.dot(normal);
            for (iz, &limit) in limits.iter().enumerate().take(zone) {
                if crad < limit {
                    zone = iz;
                    break;
                }
            }
            if zone == 0 {
                break;
            }
        }

        check_pixel(
            o,
            grid.order(),
            omax,
            zone,
            &mut pixset,
            pix,
            &mut stk,
            inclusive,
            &mut stacktop,
        );
    }

    pixset
}

// -----------------------------------------------------------------------------
// Smallest enclosing cap, built incrementally.

/// Returns the center and `cos(radius)` of the smallest cap containing all
/// points.
pub(crate) fn find_enclosing_circle(points: &[Vec3d]) -> (Vec3d, f64) {
    debug_assert!(points.len() >= 2);
    let mut center = (points[0] + points[1]).normalized();
    let mut cosrad = points[0].dot(&center);

    for i in 2..points.len() {
        if points[i].dot(&center) < cosrad {
            // Point outside the current cap.
            let (c, r) = circle_through(points, i);
            center = c;
            cosrad = r;
        }
    }
    (center, cosrad)
}

/// Smallest cap through `points[q]` containing `points[..q]`.
fn circle_through(points: &[Vec3d], q: usize) -> (Vec3d, f64) {
    let mut center = (points[0] + points[q]).normalized();
    let mut cosrad = points[0].dot(&center);

    for i in 1..q {
        if points[i].dot(&center) < cosrad {
            let (c, r) = circle_through_pair(points, i, q);
            center = c;
            cosrad = r;
        }
    }
    (center, cosrad)
}

/// Smallest cap through `points[q1]` and `points[q2]` containing
/// `points[..q1]`.
fn circle_through_pair(
    points: &[Vec3d],
    q1: usize,
    q2: usize,
) -> (Vec3d, f64) {
    let mut center = (points[q1] + points[q2]).normalized();
    let mut cosrad = points[q1].dot(&center);

    for i in 0..q1 {
        if points[i].dot(&center) < cosrad {
            // The cap boundary must pass through all three points.
            center = (points[q1] - points[i])
                .cross(&(points[q2] - points[i]))
                .normalized();
            cosrad = points[i].dot(&center);
            if cosrad < 0. {
                center = -center;
                cosrad = -cosrad;
            }
        }
    }
    (center, cosrad)
}
