//! Box query: pixels inside an axis-aligned longitude/latitude box.
//!
//! The box is bounded by two co-latitude small circles and two meridians;
//! the azimuth interval wraps when `phi0 > phi1`, and `full_longitude`
//! selects the whole-sphere azimuth range (so that a polar bound becomes
//! an arc around the pole rather than a point).

use super::{check_pixel, DescentBases};
use crate::{bits, coord::fmodulo, Grid, RangeSet, TWO_PI};
use std::f64::consts::PI;

/// Collects the pixels of the NEST grid inside the box. Bounds are assumed
/// validated (`theta0 <= theta1`, azimuths reduced into `[0, 2π)`).
#[allow(clippy::too_many_arguments)] // the box has four independent bounds
pub(crate) fn bbox(
    grid: &Grid,
    theta0: f64,
    theta1: f64,
    phi0: f64,
    phi1: f64,
    full_longitude: bool,
    fact: i64,
) -> RangeSet {
    let mut pixset = RangeSet::new();
    let inclusive = fact != 0;

    // Width of the (wrapping) azimuth interval.
    let phi_width = if full_longitude {
        TWO_PI
    } else {
        fmodulo(phi1 - phi0, TWO_PI)
    };

    let oplus = if inclusive { bits::ilog2(fact) } else { 0 };
    let bases = DescentBases::new(grid, oplus);
    let omax = bases.omax();
    let pixrads = bases.pixrads();

    let mut stk = bases.seed_stack();
    let mut stacktop = 0_usize;

    while let Some((pix, o)) = stk.pop() {
        let ptg = bases.grid(o).pix2ang(pix);
        let zone = box_zone(
            ptg.theta,
            ptg.phi,
            pixrads[o as usize],
            theta0,
            theta1,
            phi0,
            phi_width,
        );

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

/// Classifies a pixel cap (center + radius) against the box: 0 outside,
/// 1 straddling, 2 center inside, 3 fully inside.
fn box_zone(
    theta: f64,
    phi: f64,
    dr: f64,
    theta0: f64,
    theta1: f64,
    phi0: f64,
    phi_width: f64,
) -> usize {
    // Co-latitude classification is exact: any point of the cap is within
    // dr of the center in θ.
    if theta - dr > theta1 || theta + dr < theta0 {
        return 0;
    }
    let center_in_theta = (theta0..=theta1).contains(&theta);
    let fully_in_theta = theta - dr >= theta0 && theta + dr <= theta1;

    if phi_width >= TWO_PI {
        return if fully_in_theta {
            3
        } else if center_in_theta {
            2
        } else {
            1
        };
    }

    // Upper bound on the azimuthal half-width of the cap: asin(sin dr /
    // sin θ), or the whole circle when the cap reaches a pole.
    let pole_dist = theta.min(PI - theta);
    let dphi = if dr >= pole_dist {
        PI
    } else {
        let ratio = dr.sin() / theta.sin();
        if ratio >= 1. {
            PI
        } else {
            ratio.asin()
        }
    };

    // Wrap-aware interval relations between the cap arc (start φ − dφ,
    // width 2dφ) and the box arc (start φ0, width phi_width).
    let cap_start = fmodulo(phi - dphi - phi0, TWO_PI);
    let overlaps = cap_start <= phi_width
        || fmodulo(phi0 - (phi - dphi), TWO_PI) <= 2. * dphi;
    if !overlaps {
        return 0;
    }
    let center_in_phi = fmodulo(phi - phi0, TWO_PI) <= phi_width;
    let fully_in_phi =
        2. * dphi < TWO_PI && cap_start + 2. * dphi <= phi_width;

    if fully_in_theta && fully_in_phi {
        3
    } else if center_in_theta && center_in_phi {
        2
    } else {
        1
    }
}
