//! Ellipse query: pixels inside a spherical ellipse.
//!
//! The ellipse is the locus where the geodesic distances to two foci sum
//! to `2 * semi_major`. The foci sit on the major axis, tilted `alpha`
//! radians east of north, at distance `acos(cos a / cos b)` from the
//! center.

use super::{check_pixel, DescentBases};
use crate::{bits, coord::Pointing, Grid, RangeSet, Vec3d, HALF_PI, TWO_PI};
use std::f64::consts::PI;

/// Collects the pixels of the NEST grid inside the ellipse. Arguments are
/// assumed validated (`0 < semi_minor <= semi_major < π/2`).
pub(crate) fn ellipse(
    grid: &Grid,
    center: Pointing,
    semi_major: f64,
    semi_minor: f64,
    alpha: f64,
    fact: i64,
) -> RangeSet {
    let mut pixset = RangeSet::new();
    let inclusive = fact != 0;

    // Focus distance from the center along the major axis.
    let focus_dist = (semi_major.cos() / semi_minor.cos()).acos();
    let focus1 = Vec3d::from(offset_point(center, alpha, focus_dist));
    let focus2 = Vec3d::from(offset_point(center, alpha + PI, focus_dist));
    let sum_limit = 2. * semi_major;

    let oplus = if inclusive { bits::ilog2(fact) } else { 0 };
    let bases = DescentBases::new(grid, oplus);
    let omax = bases.omax();
    let pixrads = bases.pixrads();

    let mut stk = bases.seed_stack();
    let mut stacktop = 0_usize;

    while let Some((pix, o)) = stk.pop() {
        let pv = bases.grid(o).pix2vec(pix);
        // Moving a point by at most one pixel radius changes the distance
        // sum by at most twice that.
        let margin = 2. * pixrads[o as usize];
        let dist_sum = pv.angle(&focus1) + pv.angle(&focus2);

        let zone = if dist_sum - margin > sum_limit {
            0
        } else if dist_sum > sum_limit {
            1
        } else if dist_sum + margin > sum_limit {
            2
        } else {
            3
        };

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

/// Point at the given azimuth (east of north) and geodesic distance from
/// `origin` (the direct geodesic problem on the unit sphere).
fn offset_point(origin: Pointing, azimuth: f64, distance: f64) -> Pointing {
    let lat = HALF_PI - origin.theta;
    let sin_lat = lat.sin().mul_add(
        distance.cos(),
        lat.cos() * distance.sin() * azimuth.cos(),
    );
    let lat2 = sin_lat.clamp(-1., 1.).asin();

    let y = azimuth.sin() * distance.sin() * lat.cos();
    let x = distance.cos() - lat.sin() * lat2.sin();
    let dlon = y.atan2(x);

    Pointing::new(
        HALF_PI - lat2,
        crate::coord::fmodulo(origin.phi + dlon, TWO_PI),
    )
}
