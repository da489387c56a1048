//! Region query engines.
//!
//! Each engine maps a region of the sphere to a [`RangeSet`] of pixel
//! identifiers. With `fact == 0` the result is exact (pixel centers inside
//! the region); with `fact > 0` the containment test runs at resolution
//! `nside * fact` and the result covers every overlapping pixel, possibly
//! with a few false positives.
//!
//! The disc engine walks iso-latitude rings natively in RING ordering. The
//! other engines (and the NEST disc) descend the NEST subdivision tree with
//! an explicit work-stack of `(pixel, order)` pairs, classifying each node
//! against the region and pruning, emitting or refining accordingly.

mod bbox;
mod disc;
mod ellipse;
mod polygon;

pub(crate) use bbox::bbox;
pub(crate) use disc::disc;
pub(crate) use ellipse::ellipse;
pub(crate) use polygon::polygon;

use crate::{
    error::{InvalidRadius, InvalidSemiAxes},
    Grid, RangeSet, Scheme,
};
use std::f64::consts::PI;

/// Validates a query radius: 0 < r ≤ π.
pub(crate) fn check_radius(radius: f64) -> Result<(), InvalidRadius> {
    if radius <= 0. {
        return Err(InvalidRadius::new(radius, "radius must be positive"));
    }
    if radius > PI {
        return Err(InvalidRadius::new(
            radius,
            "radius must not be greater than pi",
        ));
    }
    Ok(())
}

/// Validates ellipse semi-axes: 0 < semi_minor ≤ semi_major < π/2.
pub(crate) fn check_semi(
    semi_major: f64,
    semi_minor: f64,
) -> Result<(), InvalidSemiAxes> {
    if semi_minor <= 0. {
        return Err(InvalidSemiAxes::new(
            semi_minor,
            "semi-minor axis must be positive",
        ));
    }
    if semi_major < semi_minor {
        return Err(InvalidSemiAxes::new(
            semi_major,
            "semi-major axis must not be smaller than semi-minor axis",
        ));
    }
    if semi_major >= crate::HALF_PI {
        return Err(InvalidSemiAxes::new(
            semi_major,
            "semi-major axis must be smaller than pi/2",
        ));
    }
    Ok(())
}

/// Cosine of the angular distance between two (z, φ) positions.
pub(crate) fn cosdist_zphi(z1: f64, phi1: f64, z2: f64, phi2: f64) -> f64 {
    (phi1 - phi2).cos().mul_add(
        ((1. - z1 * z1) * (1. - z2 * z2)).sqrt(),
        z1 * z2,
    )
}

// -----------------------------------------------------------------------------
// Tree descent.

/// Per-order state of a NEST descent: the grid at each order from 0 up to
/// the deepest tested resolution.
pub(crate) struct DescentBases {
    bases: Vec<Grid>,
}

impl DescentBases {
    /// Builds the ladder of grids for a descent on `grid`, testing `oplus`
    /// orders deeper than the output resolution.
    pub(crate) fn new(grid: &Grid, oplus: i32) -> Self {
        debug_assert!(grid.scheme() == Scheme::Nest && grid.order() >= 0);
        let omax = grid.order() + oplus;

        Self {
            bases: (0..=omax)
                .map(|o| Grid::at_order(o, Scheme::Nest))
                .collect(),
        }
    }

    pub(crate) fn omax(&self) -> i32 {
        self.bases.len() as i32 - 1
    }

    pub(crate) fn grid(&self, order: i32) -> &Grid {
        &self.bases[order as usize]
    }

    /// Safety radius (max pixel radius) at each order.
    pub(crate) fn pixrads(&self) -> Vec<f64> {
        self.bases.iter().map(Grid::max_pixrad).collect()
    }

    /// The work-stack seeded with the 12 base pixels, lowest on top.
    pub(crate) fn seed_stack(&self) -> Vec<(i64, i32)> {
        let mut stk = Vec::with_capacity(12 + 3 * self.omax() as usize);
        stk.extend((0..12).rev().map(|pix| (pix, 0)));
        stk
    }
}

/// Handles one classified node of a NEST descent.
///
/// `zone` encodes the node/region relation: 0 fully outside, 1 within the
/// safety margin, 2 center inside, 3 fully inside. Fully-inside nodes emit
/// their whole pixel range at the output order; straddling nodes refine
/// down to `omax`; nodes below the output order that reach zone ≥ 2 emit
/// their parent and unwind the sibling sub-pixels from the stack.
#[allow(clippy::too_many_arguments)] // mirrors the traversal state 1:1
pub(crate) fn check_pixel(
    o: i32,
    order: i32,
    omax: i32,
    zone: usize,
    pixset: &mut RangeSet,
    pix: i64,
    stk: &mut Vec<(i64, i32)>,
    inclusive: bool,
    stacktop: &mut usize,
) {
    if zone == 0 {
        return;
    }

    if o < order {
        if zone >= 3 {
            let sdist = 2 * (order - o); // bit-shift distance between orders
            pixset.push(pix << sdist, (pix + 1) << sdist);
        } else {
            // (1 <= zone <= 2): add children.
            for i in 0..4 {
                stk.push((4 * pix + 3 - i, o + 1));
            }
        }
    } else if o > order {
        // This pixel is deeper than the output order.
        if zone >= 2 {
            // Pixel center is in the region: output the parent pixel at the
            // target order and unwind the stack.
            pixset.push_single(pix >> (2 * (o - order)));
            stk.truncate(*stacktop);
        } else if o < omax {
            // Zone 1: check sublevels.
            for i in 0..4 {
                stk.push((4 * pix + 3 - i, o + 1));
            }
        } else {
            // At the resolution limit: output the parent pixel.
            pixset.push_single(pix >> (2 * (o - order)));
            stk.truncate(*stacktop);
        }
    } else {
        // o == order.
        if zone >= 2 {
            pixset.push_single(pix);
        } else if inclusive {
            if order < omax {
                // Remember the stack position to unwind to.
                *stacktop = stk.len();
                for i in 0..4 {
                    stk.push((4 * pix + 3 - i, o + 1));
                }
            } else {
                pixset.push_single(pix);
            }
        }
    }
}

#[cfg(test)]
#[path = "./query_tests.rs"]
mod tests;
