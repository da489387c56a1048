//! Disc query: pixels within an angular radius of a direction.

use super::{check_pixel, cosdist_zphi, DescentBases};
use crate::{bits, coord::Pointing, Grid, RangeSet, Scheme, TWO_PI};
use std::f64::consts::PI;

/// Collects the pixels of `grid` within `radius` of `center`.
///
/// RING grids are walked ring by ring with a closed-form φ-arc per ring;
/// NEST grids descend the subdivision tree. Arguments are assumed
/// validated.
pub(crate) fn disc(
    grid: &Grid,
    center: Pointing,
    radius: f64,
    fact: i64,
) -> RangeSet {
    match grid.scheme() {
        Scheme::Ring => disc_ring(grid, center, radius, fact),
        Scheme::Nest => disc_nest(grid, center, radius, fact),
    }
}

fn disc_ring(
    grid: &Grid,
    center: Pointing,
    radius: f64,
    fact: i64,
) -> RangeSet {
    let mut pixset = RangeSet::new();
    let inclusive = fact != 0;
    let fct = if inclusive { fact } else { 1 };

    // Higher-resolution grid used to weed out edge pixels in inclusive mode.
    let fine = (fct > 1)
        .then(|| Grid::new_unchecked(fct * grid.nside(), Scheme::Ring));

    let (rsmall, rbig) = match fine.as_ref() {
        Some(fine) => {
            (radius + fine.max_pixrad(), radius + grid.max_pixrad())
        }
        None if inclusive => {
            let r = radius + grid.max_pixrad();
            (r, r)
        }
        None => (radius, radius),
    };

    if rsmall >= PI {
        pixset.push(0, grid.npix());
        return pixset;
    }
    let rbig = rbig.min(PI);

    let cosrsmall = rsmall.cos();
    let cosrbig = rbig.cos();

    let z0 = center.theta.cos();
    let xa = 1. / ((1. - z0) * (1. + z0)).sqrt();

    let cpix = grid.zphi2pix(z0, center.phi);

    let rlat1 = center.theta - rsmall;
    let zmax = rlat1.cos();
    let mut irmin = grid.ring_above(zmax) + 1;

    if rlat1 <= 0. && irmin > 1 {
        // North pole in the disc: whole rings above irmin.
        let (sp, rp, _) = grid.ring_info_small(irmin - 1);
        pixset.push(0, sp + rp);
    }
    if fct > 1 && rlat1 > 0. {
        irmin = (irmin - 1).max(1);
    }

    let rlat2 = center.theta + rsmall;
    let zmin = rlat2.cos();
    let mut irmax = grid.ring_above(zmin);
    if fct > 1 && rlat2 < PI {
        irmax = (irmax + 1).min(4 * grid.nside() - 1);
    }

    for iz in irmin..=irmax {
        let z = grid.ring2z(iz);

        // φ half-width of the disc on this ring, from the spherical law of
        // cosines.
        let x = (cosrbig - z * z0) * xa;
        let ysq = 1. - z * z - x * x;
        let dphi = if ysq <= 0. {
            // No intersection: ring fully inside or outside the disc.
            if fct == 1 {
                0.
            } else {
                PI - 1e-15
            }
        } else {
            ysq.sqrt().atan2(x)
        };

        if dphi > 0. {
            let (ipix1, nr, shifted) = grid.ring_info_small(iz);
            let shift = if shifted { 0.5 } else { 0. };
            let ipix2 = ipix1 + nr - 1; // highest pixel number in the ring

            let nrf = nr as f64;
            let mut ip_lo =
                ((nrf / TWO_PI * (center.phi - dphi)) - shift).floor() as i64
                    + 1;
            let mut ip_hi =
                ((nrf / TWO_PI * (center.phi + dphi)) - shift).floor() as i64;

            if let Some(fine) = fine.as_ref() {
                // Shave off edge pixels that do not actually overlap.
                while ip_lo <= ip_hi
                    && discard_pixel_ring(
                        grid, fine, ip_lo, nr, ipix1, fct, z0, center.phi,
                        cosrsmall, cpix,
                    )
                {
                    ip_lo += 1;
                }
                while ip_hi > ip_lo
                    && discard_pixel_ring(
                        grid, fine, ip_hi, nr, ipix1, fct, z0, center.phi,
                        cosrsmall, cpix,
                    )
                {
                    ip_hi -= 1;
                }
            }

            if ip_lo <= ip_hi {
                if ip_hi >= nr {
                    ip_lo -= nr;
                    ip_hi -= nr;
                }
                if ip_lo < 0 {
                    // The arc wraps past φ = 0: two stretches on this ring.
                    pixset.push(ipix1, ipix1 + ip_hi + 1);
                    pixset.push(ipix1 + ip_lo + nr, ipix2 + 1);
                } else {
                    pixset.push(ipix1 + ip_lo, ipix1 + ip_hi + 1);
                }
            }
        }
    }

    if rlat2 >= PI && irmax + 1 < 4 * grid.nside() {
        // South pole in the disc: whole rings below irmax.
        let (sp, _, _) = grid.ring_info_small(irmax + 1);
        pixset.push(sp, grid.npix());
    }

    pixset
}

/// Returns true when the candidate ring pixel provably does not overlap the
/// disc, probing its boundary on the finer grid.
#[allow(clippy::too_many_arguments)] // mirrors the ring-walk state 1:1
fn discard_pixel_ring(
    coarse: &Grid,
    fine: &Grid,
    pix: i64,
    nr: i64,
    ipix1: i64,
    fct: i64,
    cz: f64,
    cphi: f64,
    cosrp2: f64,
    cpix: i64,
) -> bool {
    let mut pix = pix;
    if pix >= nr {
        pix -= nr;
    }
    if pix < 0 {
        pix += nr;
    }
    pix += ipix1;

    if pix == cpix {
        return false; // disc center in pixel => overlap
    }

    let (px, py, pf) = coarse.ring2xyf(pix);
    let (ox, oy) = (fct * px, fct * py);
    for i in 0..fct - 1 {
        // Walk the 4 edges of the pixel on the finer grid.
        for (x, y) in [
            (ox + i, oy),
            (ox + fct - 1, oy + i),
            (ox + fct - 1 - i, oy + fct - 1),
            (ox, oy + fct - 1 - i),
        ] {
            let loc = fine.pix2loc(fine.xyf2ring(x, y, pf));
            if cosdist_zphi(loc.z, loc.phi, cz, cphi) > cosrp2 {
                return false; // overlap
            }
        }
    }
    true
}

fn disc_nest(
    grid: &Grid,
    center: Pointing,
    radius: f64,
    fact: i64,
) -> RangeSet {
    let mut pixset = RangeSet::new();
    let inclusive = fact != 0;

    if radius >= PI {
        // Disc covers the whole sphere.
        pixset.push(0, grid.npix());
        return pixset;
    }

    let oplus = if inclusive { bits::ilog2(fact) } else { 0 };
    let bases = DescentBases::new(grid, oplus);
    let omax = bases.omax();

    let z0 = center.theta.cos();
    let cosrad = radius.cos();
    // Zone limits per order: cos(radius ± safety margin).
    let (crpdr, crmdr): (Vec<f64>, Vec<f64>) = bases
        .pixrads()
        .iter()
        .map(|&dr| {
            (
                if radius + dr > PI { -1. } else { (radius + dr).cos() },
                if radius - dr < 0. { 1. } else { (radius - dr).cos() },
            )
        })
        .unzip();

    let mut stk = bases.seed_stack();
    let mut stacktop = 0_usize;

    while let Some((pix, o)) = stk.pop() {
        let loc = bases.grid(o).pix2loc(pix);
        // Cosine of the distance between pixel center and disc center.
        let cangdist = cosdist_zphi(z0, center.phi, loc.z, loc.phi);

        if cangdist > crpdr[o as usize] {
            let zone = if cangdist < cosrad {
                1
            } else if cangdist <= crmdr[o as usize] {
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
    }

    pixset
}
