//! HEALPix grid metadata and pixel arithmetic.

use crate::{
    bits,
    coord::{Pointing, Vec3d},
    error::{Error, InvalidFact, InvalidNside, InvalidPixel},
    face::{JPLL, JRLL, NB_FACEARRAY, NB_SWAPARRAY, NB_XOFFSET, NB_YOFFSET},
    query, RangeSet, Scheme, HALF_PI, INV_HALF_PI, MAX_NSIDE, MAX_ORDER,
    TWO_PI, TWO_THIRD,
};
use std::f64::consts::PI;

/// Position on the sphere as `z = cos θ` and azimuth, with an optional
/// high-precision `sin θ` carried through near the poles (where `z` alone
/// loses accuracy).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Loc {
    pub z: f64,
    pub phi: f64,
    pub sth: f64,
    pub have_sth: bool,
}

impl Loc {
    pub(crate) fn to_pointing(self) -> Pointing {
        let theta = if self.have_sth {
            self.sth.atan2(self.z)
        } else {
            self.z.acos()
        };

        Pointing::new(theta, self.phi)
    }

    pub(crate) fn to_vec3d(self) -> Vec3d {
        if self.have_sth {
            Vec3d::new(
                self.sth * self.phi.cos(),
                self.sth * self.phi.sin(),
                self.z,
            )
        } else {
            Vec3d::from_z_phi(self.z, self.phi)
        }
    }
}

// -----------------------------------------------------------------------------

/// A HEALPix pixelization of the sphere at a fixed resolution.
///
/// The grid is defined by its `nside` (the number of pixel steps along a
/// base-face edge, giving `12 * nside^2` pixels in total) and its ordering
/// [`Scheme`]. A `Grid` is immutable once built and cheap to copy; all the
/// pixel arithmetic and the region queries are methods on it.
///
/// # Example
///
/// ```
/// use hpgeo::{Grid, Pointing, Scheme};
///
/// let grid = Grid::new(16, Scheme::Nest)?;
/// let pix = grid.ang2pix(Pointing::new(0.5, 1.25));
///
/// assert!(pix >= 0 && pix < grid.npix());
/// # Ok::<(), hpgeo::error::InvalidNside>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    /// Resolution parameter.
    nside: i64,
    /// `log2(nside)`, or −1 when nside is not a power of two.
    order: i32,
    /// Pixels per base face (`nside^2`).
    npface: i64,
    /// Pixels in the north polar cap under RING (`2 * nside * (nside-1)`).
    ncap: i64,
    /// Pixels on the whole sphere (`12 * nside^2`).
    npix: i64,
    /// `4 / npix`, cached for the z ↔ ring conversions.
    fact1: f64,
    /// `2 * nside / π`, cached for the φ ↔ column conversions.
    fact2: f64,
    /// Pixel ordering.
    scheme: Scheme,
}

impl Grid {
    /// Initializes a new grid for the given resolution and ordering.
    ///
    /// # Errors
    ///
    /// [`InvalidNside`] when nside is not positive, exceeds 2^29, or is not
    /// a power of two under [`Scheme::Nest`].
    ///
    /// # Example
    ///
    /// ```
    /// use hpgeo::{Grid, Scheme};
    ///
    /// assert!(Grid::new(12, Scheme::Ring).is_ok());
    /// assert!(Grid::new(12, Scheme::Nest).is_err());
    /// ```
    pub fn new(nside: i64, scheme: Scheme) -> Result<Self, InvalidNside> {
        if nside <= 0 {
            return Err(InvalidNside::new(nside, "nside must be positive"));
        }
        if nside > MAX_NSIDE {
            return Err(InvalidNside::new(
                nside,
                "nside must not be greater than 2^29",
            ));
        }
        if scheme.is_nest() && !bits::is_pow2(nside) {
            return Err(InvalidNside::new(
                nside,
                "nside must be a power of 2 for nest ordering",
            ));
        }

        Ok(Self::new_unchecked(nside, scheme))
    }

    /// Initializes a grid for `nside = 2^order`, skipping validation.
    pub(crate) fn at_order(order: i32, scheme: Scheme) -> Self {
        debug_assert!((0..=MAX_ORDER).contains(&order));

        Self::new_unchecked(1 << order, scheme)
    }

    pub(crate) fn new_unchecked(nside: i64, scheme: Scheme) -> Self {
        let npface = nside * nside;
        let npix = 12 * npface;

        Self {
            nside,
            order: if bits::is_pow2(nside) {
                bits::ilog2(nside)
            } else {
                -1
            },
            npface,
            ncap: 2 * nside * (nside - 1),
            npix,
            fact1: 4. / npix as f64,
            fact2: INV_HALF_PI * nside as f64,
            scheme,
        }
    }

    /// Resolution parameter of the grid.
    #[must_use]
    pub const fn nside(&self) -> i64 {
        self.nside
    }

    /// `log2(nside)`, or −1 when nside is not a power of two.
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Number of pixels on the whole sphere.
    #[must_use]
    pub const fn npix(&self) -> i64 {
        self.npix
    }

    /// Number of pixels in the north polar cap under RING ordering.
    #[must_use]
    pub const fn ncap(&self) -> i64 {
        self.ncap
    }

    /// Number of pixels per base face.
    #[must_use]
    pub const fn npface(&self) -> i64 {
        self.npface
    }

    /// Pixel ordering of the grid.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Validates a pixel identifier against this grid.
    ///
    /// # Errors
    ///
    /// [`InvalidPixel`] when `pix` is outside `[0, npix)`.
    pub fn check_pixel(&self, pix: i64) -> Result<(), InvalidPixel> {
        if pix < 0 || pix >= self.npix {
            return Err(InvalidPixel::new(
                pix,
                "pixel identifier out of range for this nside",
            ));
        }
        Ok(())
    }

    /// Validates an inclusive-mode refinement factor against this grid.
    ///
    /// Under RING any positive factor is allowed; under NEST the factor
    /// must be a power of two with `nside * fact` no larger than 2^29.
    ///
    /// # Errors
    ///
    /// [`InvalidFact`] otherwise.
    pub fn check_fact(&self, fact: i64) -> Result<(), InvalidFact> {
        if fact <= 0 {
            return Err(InvalidFact::new(fact, "fact must be positive"));
        }
        if self.scheme.is_nest() {
            if !bits::is_pow2(fact) {
                return Err(InvalidFact::new(
                    fact,
                    "fact must be a power of 2 for nest ordering",
                ));
            }
            if self.nside > MAX_NSIDE / fact {
                return Err(InvalidFact::new(
                    fact,
                    "nside*fact must not be greater than 2^29",
                ));
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Pixel arithmetic.

    /// Maps a direction to the identifier of the pixel containing it.
    ///
    /// The co-latitude must be within `[0, π]`; the azimuth is reduced into
    /// `[0, 2π)`.
    ///
    /// # Example
    ///
    /// ```
    /// use hpgeo::{Grid, Pointing, Scheme};
    ///
    /// let grid = Grid::new(1, Scheme::Ring)?;
    /// // Every direction lands in one of the 12 base pixels.
    /// assert!(grid.ang2pix(Pointing::new(1.234, 5.678)) < 12);
    /// # Ok::<(), hpgeo::error::InvalidNside>(())
    /// ```
    #[must_use]
    pub fn ang2pix(&self, ptg: Pointing) -> i64 {
        debug_assert!((0.0..=PI).contains(&ptg.theta));

        if ptg.theta < 0.01 || ptg.theta > PI - 0.01 {
            self.loc2pix(Loc {
                z: ptg.theta.cos(),
                phi: ptg.phi,
                sth: ptg.theta.sin(),
                have_sth: true,
            })
        } else {
            self.loc2pix(Loc {
                z: ptg.theta.cos(),
                phi: ptg.phi,
                sth: 0.,
                have_sth: false,
            })
        }
    }

    /// Returns the direction of the pixel center, with θ ∈ [0, π] and
    /// φ ∈ [0, 2π).
    #[must_use]
    pub fn pix2ang(&self, pix: i64) -> Pointing {
        self.pix2loc(pix).to_pointing()
    }

    /// Maps a Cartesian direction (not necessarily normalized) to the
    /// identifier of the pixel containing it.
    #[must_use]
    pub fn vec2pix(&self, v: Vec3d) -> i64 {
        let xl = 1. / v.length();
        let phi = v.y.atan2(v.x);
        let nz = v.z * xl;

        if nz.abs() > 0.99 {
            self.loc2pix(Loc {
                z: nz,
                phi,
                sth: v.x.hypot(v.y) * xl,
                have_sth: true,
            })
        } else {
            self.loc2pix(Loc {
                z: nz,
                phi,
                sth: 0.,
                have_sth: false,
            })
        }
    }

    /// Returns the unit vector of the pixel center.
    #[must_use]
    pub fn pix2vec(&self, pix: i64) -> Vec3d {
        self.pix2loc(pix).to_vec3d()
    }

    /// Converts a RING identifier to the NEST identifier of the same pixel.
    ///
    /// The grid must have a power-of-two nside (`order() >= 0`).
    #[must_use]
    pub fn ring2nest(&self, pix: i64) -> i64 {
        debug_assert!(self.order >= 0);
        let (ix, iy, face) = self.ring2xyf(pix);

        self.xyf2nest(ix, iy, face)
    }

    /// Converts a NEST identifier to the RING identifier of the same pixel.
    ///
    /// The grid must have a power-of-two nside (`order() >= 0`).
    #[must_use]
    pub fn nest2ring(&self, pix: i64) -> i64 {
        debug_assert!(self.order >= 0);
        let (ix, iy, face) = self.nest2xyf(pix);

        self.xyf2ring(ix, iy, face)
    }

    /// Returns the identifiers of the 8 neighboring pixels, in SW, W, NW,
    /// N, NE, E, SE, S order.
    ///
    /// Over the corners of the polar base faces the diagonal neighbor (one
    /// of W, N, E or S) does not exist; the corresponding slot is −1.
    ///
    /// # Example
    ///
    /// ```
    /// use hpgeo::{Grid, Scheme};
    ///
    /// let grid = Grid::new(1, Scheme::Nest)?;
    /// let neighbors = grid.neighbors(0);
    ///
    /// // At nside 1 each base pixel touches every corner of its face, so
    /// // exactly two diagonal neighbors are missing.
    /// assert_eq!(neighbors.iter().filter(|&&pix| pix == -1).count(), 2);
    /// # Ok::<(), hpgeo::error::InvalidNside>(())
    /// ```
    #[must_use]
    pub fn neighbors(&self, pix: i64) -> [i64; 8] {
        let (ix, iy, face) = self.pix2xyf(pix);
        let mut result = [-1_i64; 8];

        let nsm1 = self.nside - 1;
        if ix > 0 && ix < nsm1 && iy > 0 && iy < nsm1 {
            for (slot, (dx, dy)) in result
                .iter_mut()
                .zip(NB_XOFFSET.iter().zip(NB_YOFFSET.iter()))
            {
                *slot = self.xyf2pix(ix + dx, iy + dy, face);
            }
        } else {
            for (slot, (dx, dy)) in result
                .iter_mut()
                .zip(NB_XOFFSET.iter().zip(NB_YOFFSET.iter()))
            {
                let mut x = ix + dx;
                let mut y = iy + dy;
                let mut nbnum = 4_i64;
                if x < 0 {
                    x += self.nside;
                    nbnum -= 1;
                } else if x >= self.nside {
                    x -= self.nside;
                    nbnum += 1;
                }
                if y < 0 {
                    y += self.nside;
                    nbnum -= 3;
                } else if y >= self.nside {
                    y -= self.nside;
                    nbnum += 3;
                }

                let f = NB_FACEARRAY[nbnum as usize][face as usize];
                if f >= 0 {
                    let swap =
                        NB_SWAPARRAY[nbnum as usize][(face >> 2) as usize];
                    if swap & 1 != 0 {
                        x = self.nside - x - 1;
                    }
                    if swap & 2 != 0 {
                        y = self.nside - y - 1;
                    }
                    if swap & 4 != 0 {
                        std::mem::swap(&mut x, &mut y);
                    }
                    *slot = self.xyf2pix(x, y, i64::from(f));
                }
            }
        }
        result
    }

    /// Samples the pixel boundary, starting at the southernmost corner and
    /// proceeding clockwise over the four sides.
    ///
    /// Each side gets `step` samples, including the corner opening the side
    /// and excluding the one closing it, for `4 * step` points in total;
    /// `step = 1` yields the four corners (S, W, N, E).
    #[must_use]
    pub fn boundaries(&self, pix: i64, step: usize) -> Vec<Pointing> {
        let (ix, iy, face) = self.pix2xyf(pix);
        let nside = self.nside as f64;
        let dc = 0.5 / nside;
        let xc = (ix as f64 + 0.5) / nside;
        let yc = (iy as f64 + 0.5) / nside;
        let d = 1. / (step as f64 * nside);

        let mut out = vec![Pointing::default(); 4 * step];
        for i in 0..step {
            let t = i as f64 * d;
            out[i] = xyf2loc(xc - dc, yc - dc + t, face).to_pointing();
            out[i + step] = xyf2loc(xc - dc + t, yc + dc, face).to_pointing();
            out[i + 2 * step] =
                xyf2loc(xc + dc, yc + dc - t, face).to_pointing();
            out[i + 3 * step] =
                xyf2loc(xc + dc - t, yc - dc, face).to_pointing();
        }
        out
    }

    /// Returns the four pixels bracketing the direction and the bilinear
    /// interpolation weights to apply to them.
    ///
    /// The weights are non-negative and sum to 1.
    #[must_use]
    pub fn get_interpol(&self, ptg: Pointing) -> ([i64; 4], [f64; 4]) {
        debug_assert!((0.0..=PI).contains(&ptg.theta));
        let phi = crate::coord::fmodulo(ptg.phi, TWO_PI);

        let mut pix = [0_i64; 4];
        let mut wgt = [0_f64; 4];

        let z = ptg.theta.cos();
        let ir1 = self.ring_above(z);
        let ir2 = ir1 + 1;
        let mut theta1 = 0.;
        let mut theta2 = 0.;

        if ir1 > 0 {
            let (sp, nr, theta, shifted) = self.ring_info2(ir1);
            theta1 = theta;
            let (i1, i2, w1) = column_weights(phi, nr, shifted);
            pix[0] = sp + i1;
            pix[1] = sp + i2;
            wgt[0] = 1. - w1;
            wgt[1] = w1;
        }
        if ir2 < 4 * self.nside {
            let (sp, nr, theta, shifted) = self.ring_info2(ir2);
            theta2 = theta;
            let (i1, i2, w1) = column_weights(phi, nr, shifted);
            pix[2] = sp + i1;
            pix[3] = sp + i2;
            wgt[2] = 1. - w1;
            wgt[3] = w1;
        }

        if ir1 == 0 {
            // North pole: replace the upper pair by opposite pixels of the
            // first ring and spread their weight evenly.
            let wtheta = ptg.theta / theta2;
            wgt[2] *= wtheta;
            wgt[3] *= wtheta;
            let fac = (1. - wtheta) * 0.25;
            wgt[0] = fac;
            wgt[1] = fac;
            wgt[2] += fac;
            wgt[3] += fac;
            pix[0] = (pix[2] + 2) & 3;
            pix[1] = (pix[3] + 2) & 3;
        } else if ir2 == 4 * self.nside {
            // South pole, symmetric.
            let wtheta = (ptg.theta - theta1) / (PI - theta1);
            wgt[0] *= 1. - wtheta;
            wgt[1] *= 1. - wtheta;
            let fac = wtheta * 0.25;
            wgt[0] += fac;
            wgt[1] += fac;
            wgt[2] = fac;
            wgt[3] = fac;
            pix[2] = ((pix[0] + 2) & 3) + self.npix - 4;
            pix[3] = ((pix[1] + 2) & 3) + self.npix - 4;
        } else {
            let wtheta = (ptg.theta - theta1) / (theta2 - theta1);
            wgt[0] *= 1. - wtheta;
            wgt[1] *= 1. - wtheta;
            wgt[2] *= wtheta;
            wgt[3] *= wtheta;
        }

        if self.scheme.is_nest() {
            for p in &mut pix {
                *p = self.ring2nest(*p);
            }
        }
        (pix, wgt)
    }

    /// Maximum angular distance between a pixel center and any of its
    /// corners at this nside, in radians.
    #[must_use]
    pub fn max_pixrad(&self) -> f64 {
        let nside = self.nside as f64;
        let va = Vec3d::from_z_phi(TWO_THIRD, PI / (4. * nside));
        let t1 = (1. - 1. / nside) * (1. - 1. / nside);
        let vb = Vec3d::from_z_phi(1. - t1 / 3., 0.);

        va.angle(&vb)
    }

    // -------------------------------------------------------------------------
    // Region queries.

    /// Returns the pixels within angular distance `radius` of `center`.
    ///
    /// With `fact == 0` the result is exact: the pixels whose centers lie in
    /// the disc. With `fact > 0` the containment test runs at resolution
    /// `nside * fact` and the result is a superset of every pixel
    /// overlapping the disc, with false positives thinning out as `fact`
    /// grows.
    ///
    /// # Errors
    ///
    /// [`Error::Angle`], [`Error::Radius`] or [`Error::Fact`] on invalid
    /// arguments.
    pub fn query_disc(
        &self,
        center: Pointing,
        radius: f64,
        fact: i64,
    ) -> Result<RangeSet, Error> {
        crate::coord::check_theta_phi(center.theta, center.phi)?;
        query::check_radius(radius)?;
        if fact != 0 {
            self.check_fact(fact)?;
        }
        let center = Pointing::new(
            center.theta,
            crate::coord::fmodulo(center.phi, TWO_PI),
        );

        Ok(query::disc(self, center, radius, fact))
    }

    /// Returns the pixels inside the convex spherical polygon spanned by
    /// `vertices`, under the same exclusive/inclusive contract as
    /// [`Self::query_disc`].
    ///
    /// The query runs natively in NEST ordering; on a RING grid the result
    /// is converted back and re-sorted.
    ///
    /// # Errors
    ///
    /// [`Error::Polygon`] when the polygon has fewer than 3 vertices, a
    /// degenerate corner, or is not convex; [`Error::Nside`],
    /// [`Error::Angle`] or [`Error::Fact`] on invalid arguments.
    pub fn query_polygon(
        &self,
        vertices: &[Pointing],
        fact: i64,
    ) -> Result<RangeSet, Error> {
        for v in vertices {
            crate::coord::check_theta_phi(v.theta, v.phi)?;
        }
        let nest = self.nest_alias()?;
        if fact != 0 {
            nest.check_fact(fact)?;
        }

        let ranges = query::polygon(&nest, vertices, fact)?;
        Ok(self.from_nest_result(ranges))
    }

    /// Returns the pixels inside the spherical ellipse centered on
    /// `center`, under the same exclusive/inclusive contract as
    /// [`Self::query_disc`].
    ///
    /// The ellipse is the locus where the geodesic distances to the two
    /// foci sum to `2 * semi_major`; the major axis is tilted by `alpha`
    /// radians east of north. The query runs natively in NEST ordering; on
    /// a RING grid a resource warning is logged and the result is converted
    /// back and re-sorted.
    ///
    /// # Errors
    ///
    /// [`Error::SemiAxes`] when the axes are not ordered or out of range;
    /// [`Error::Nside`], [`Error::Angle`] or [`Error::Fact`] on invalid
    /// arguments.
    pub fn query_ellipse(
        &self,
        center: Pointing,
        semi_major: f64,
        semi_minor: f64,
        alpha: f64,
        fact: i64,
    ) -> Result<RangeSet, Error> {
        crate::coord::check_theta_phi(center.theta, center.phi)?;
        query::check_semi(semi_major, semi_minor)?;
        if !self.scheme.is_nest() {
            log::warn!(
                "query_ellipse natively supports nest ordering.  Result will \
                 be converted from nest->ring and sorted"
            );
        }
        let nest = self.nest_alias()?;
        if fact != 0 {
            nest.check_fact(fact)?;
        }

        let ranges =
            query::ellipse(&nest, center, semi_major, semi_minor, alpha, fact);
        Ok(self.from_nest_result(ranges))
    }

    /// Returns the pixels inside the box `θ ∈ [theta0, theta1]`,
    /// `φ ∈ [phi0, phi1]`, under the same exclusive/inclusive contract as
    /// [`Self::query_disc`].
    ///
    /// The longitude interval wraps: with `phi0 > phi1` the box spans
    /// `[phi0, 2π) ∪ [0, phi1]`. `full_longitude` selects the special case
    /// of all azimuths, where a polar bound turns into an arc around the
    /// pole rather than a point. The query runs natively in NEST ordering;
    /// on a RING grid a resource warning is logged and the result is
    /// converted back and re-sorted.
    ///
    /// # Errors
    ///
    /// [`Error::Angle`] when the bounds are out of range or reversed;
    /// [`Error::Nside`] or [`Error::Fact`] on invalid arguments.
    pub fn query_box(
        &self,
        theta0: f64,
        theta1: f64,
        phi0: f64,
        phi1: f64,
        full_longitude: bool,
        fact: i64,
    ) -> Result<RangeSet, Error> {
        crate::coord::check_theta_phi(theta0, phi0)?;
        crate::coord::check_theta_phi(theta1, phi1)?;
        if theta0 > theta1 {
            return Err(crate::error::InvalidAngle::new(
                theta0,
                "colatitude bounds must satisfy theta0 <= theta1",
            )
            .into());
        }
        if !self.scheme.is_nest() {
            log::warn!(
                "query_box natively supports nest ordering.  Result will be \
                 converted from nest->ring and sorted"
            );
        }
        let nest = self.nest_alias()?;
        if fact != 0 {
            nest.check_fact(fact)?;
        }

        let ranges = query::bbox(
            &nest,
            theta0,
            theta1,
            crate::coord::fmodulo(phi0, TWO_PI),
            crate::coord::fmodulo(phi1, TWO_PI),
            full_longitude,
            fact,
        );
        Ok(self.from_nest_result(ranges))
    }

    /// NEST-ordered view of this grid for the tree-descent engines.
    fn nest_alias(&self) -> Result<Self, InvalidNside> {
        if self.order < 0 {
            return Err(InvalidNside::new(
                self.nside,
                "nside must be a power of 2 for this query",
            ));
        }
        Ok(Self {
            scheme: Scheme::Nest,
            ..*self
        })
    }

    /// Maps a NEST query result back to this grid's ordering.
    fn from_nest_result(&self, ranges: RangeSet) -> RangeSet {
        if self.scheme.is_nest() {
            return ranges;
        }
        let mut pixels = ranges.to_vec();
        for pix in &mut pixels {
            *pix = self.nest2ring(*pix);
        }
        pixels.sort_unstable();

        let mut out = RangeSet::with_capacity(pixels.len());
        for pix in pixels {
            out.push_single(pix);
        }
        out
    }

    // -------------------------------------------------------------------------
    // Face/xy decomposition.

    pub(crate) fn xyf2nest(&self, ix: i64, iy: i64, face: i64) -> i64 {
        (face << (2 * self.order)) + bits::interleave(ix, iy)
    }

    pub(crate) fn nest2xyf(&self, pix: i64) -> (i64, i64, i64) {
        let p = pix & (self.npface - 1);

        (bits::squash(p), bits::squash(p >> 1), pix >> (2 * self.order))
    }

    pub(crate) fn xyf2ring(&self, ix: i64, iy: i64, face: i64) -> i64 {
        let nl4 = 4 * self.nside;
        let jr = JRLL[face as usize] * self.nside - ix - iy - 1;

        let (n_before, ringpix, shifted) = self.ring_info_small(jr);
        let nr = ringpix >> 2;
        let kshift = 1 - i64::from(shifted);

        let mut jp = (JPLL[face as usize] * nr + ix - iy + 1 + kshift) / 2;
        debug_assert!(jp <= 4 * nr);
        if jp < 1 {
            // This can only happen on an equatorial ring, where 4*nr == nl4.
            jp += nl4;
        }

        n_before + jp - 1
    }

    pub(crate) fn ring2xyf(&self, pix: i64) -> (i64, i64, i64) {
        let nl2 = 2 * self.nside;

        let (iring, iphi, kshift, nr, face) = if pix < self.ncap {
            // North polar cap.
            let iring = (1 + bits::isqrt(1 + 2 * pix)) >> 1;
            let iphi = (pix + 1) - 2 * iring * (iring - 1);
            (iring, iphi, 0, iring, (iphi - 1) / iring)
        } else if pix < self.npix - self.ncap {
            // Equatorial belt.
            let ip = pix - self.ncap;
            let tmp = if self.order >= 0 {
                ip >> (self.order + 2)
            } else {
                ip / (4 * self.nside)
            };
            let iring = tmp + self.nside;
            let iphi = ip - tmp * 4 * self.nside + 1;
            let kshift = (iring + self.nside) & 1;

            let ire = iring - self.nside + 1;
            let irm = nl2 + 2 - ire;
            let mut ifm = iphi - ire / 2 + self.nside - 1;
            let mut ifp = iphi - irm / 2 + self.nside - 1;
            if self.order >= 0 {
                ifm >>= self.order;
                ifp >>= self.order;
            } else {
                ifm /= self.nside;
                ifp /= self.nside;
            }
            let face = if ifp == ifm {
                ifp | 4
            } else if ifp < ifm {
                ifp
            } else {
                ifm + 8
            };
            (iring, iphi, kshift, self.nside, face)
        } else {
            // South polar cap; nr counts from the south pole.
            let ip = self.npix - pix;
            let nr = (1 + bits::isqrt(2 * ip - 1)) >> 1;
            let iphi = 4 * nr + 1 - (ip - 2 * nr * (nr - 1));
            (2 * nl2 - nr, iphi, 0, nr, 8 + (iphi - 1) / nr)
        };

        let irt = iring - JRLL[face as usize] * self.nside + 1;
        let mut ipt = 2 * iphi - JPLL[face as usize] * nr - kshift - 1;
        if ipt >= nl2 {
            ipt -= 8 * self.nside;
        }

        ((ipt - irt) >> 1, (-ipt - irt) >> 1, face)
    }

    pub(crate) fn pix2xyf(&self, pix: i64) -> (i64, i64, i64) {
        match self.scheme {
            Scheme::Ring => self.ring2xyf(pix),
            Scheme::Nest => self.nest2xyf(pix),
        }
    }

    pub(crate) fn xyf2pix(&self, ix: i64, iy: i64, face: i64) -> i64 {
        match self.scheme {
            Scheme::Ring => self.xyf2ring(ix, iy, face),
            Scheme::Nest => self.xyf2nest(ix, iy, face),
        }
    }

    // -------------------------------------------------------------------------
    // Ring bookkeeping.

    /// Index of the ring straight above `z = cos θ` (0 when `z` is above
    /// the first ring).
    pub(crate) fn ring_above(&self, z: f64) -> i64 {
        let az = z.abs();
        if az <= TWO_THIRD {
            return (self.nside as f64 * (2. - 1.5 * z)) as i64;
        }
        let iring = (self.nside as f64 * (3. * (1. - az)).sqrt()) as i64;

        if z > 0. {
            iring
        } else {
            4 * self.nside - iring - 1
        }
    }

    /// Start pixel, pixel count and shift flag of the given ring
    /// (RING ordering, ring indices 1 ..= 4*nside-1).
    pub(crate) fn ring_info_small(&self, ring: i64) -> (i64, i64, bool) {
        if ring < self.nside {
            (2 * ring * (ring - 1), 4 * ring, true)
        } else if ring < 3 * self.nside {
            (
                self.ncap + (ring - self.nside) * 4 * self.nside,
                4 * self.nside,
                (ring - self.nside) & 1 == 0,
            )
        } else {
            let nr = 4 * self.nside - ring;
            (self.npix - 2 * nr * (nr + 1), 4 * nr, true)
        }
    }

    /// Like [`Self::ring_info_small`], also returning the co-latitude of
    /// the ring.
    pub(crate) fn ring_info2(&self, ring: i64) -> (i64, i64, f64, bool) {
        let northring = if ring > 2 * self.nside {
            4 * self.nside - ring
        } else {
            ring
        };

        let (mut startpix, ringpix, mut theta, shifted) =
            if northring < self.nside {
                let tmp = (northring * northring) as f64 * self.fact1;
                let costheta = 1. - tmp;
                let sintheta = (tmp * (2. - tmp)).sqrt();
                (
                    2 * northring * (northring - 1),
                    4 * northring,
                    sintheta.atan2(costheta),
                    true,
                )
            } else {
                (
                    self.ncap + (northring - self.nside) * 4 * self.nside,
                    4 * self.nside,
                    ((2 * self.nside - northring) as f64 * 2.
                        / (3. * self.nside as f64))
                        .acos(),
                    (northring - self.nside) & 1 == 0,
                )
            };

        if northring != ring {
            // Southern hemisphere.
            theta = PI - theta;
            startpix = self.npix - startpix - ringpix;
        }
        (startpix, ringpix, theta, shifted)
    }

    /// `cos θ` of the given ring.
    pub(crate) fn ring2z(&self, ring: i64) -> f64 {
        if ring < self.nside {
            return 1. - (ring * ring) as f64 * self.fact1;
        }
        if ring <= 3 * self.nside {
            return (2 * self.nside - ring) as f64 * 2.
                / (3. * self.nside as f64);
        }
        let ring = 4 * self.nside - ring;

        (ring * ring) as f64 * self.fact1 - 1.
    }

    // -------------------------------------------------------------------------
    // z/φ level conversions.

    pub(crate) fn zphi2pix(&self, z: f64, phi: f64) -> i64 {
        self.loc2pix(Loc {
            z,
            phi,
            sth: 0.,
            have_sth: false,
        })
    }

    pub(crate) fn loc2pix(&self, loc: Loc) -> i64 {
        let Loc {
            z,
            phi,
            sth,
            have_sth,
        } = loc;
        let za = z.abs();
        let phi = crate::coord::fmodulo(phi, TWO_PI);
        let tt = phi * INV_HALF_PI; // in [0, 4)

        match self.scheme {
            Scheme::Ring => {
                if za <= TWO_THIRD {
                    // Equatorial belt.
                    let nl4 = 4 * self.nside;
                    let temp1 = 0.5 * self.nside as f64 + phi * self.fact2;
                    let temp2 = self.nside as f64 * z * 0.75;
                    let jp = (temp1 - temp2) as i64; // ascending edge line
                    let jm = (temp1 + temp2) as i64; // descending edge line

                    // Ring number counted from z = 2/3, in {1, 2*nside+1}.
                    let ir = self.nside + 1 + jp - jm;
                    let kshift = 1 - (ir & 1);

                    let t1 = jp + jm - self.nside + kshift + 1 + nl4 + nl4;
                    let ip = if self.order > 0 {
                        (t1 >> 1) & (nl4 - 1)
                    } else {
                        (t1 >> 1) % nl4
                    };

                    self.ncap + (ir - 1) * nl4 + ip
                } else {
                    // Polar caps.
                    let tp = tt - (tt as i64) as f64;
                    let tmp = if za < 0.99 || !have_sth {
                        self.nside as f64 * (3. * (1. - za)).sqrt()
                    } else {
                        self.nside as f64 * sth / ((1. + za) / 3.).sqrt()
                    };

                    let jp = (tp * tmp) as i64;
                    let jm = ((1. - tp) * tmp) as i64;

                    // Ring number counted from the closest pole.
                    let ir = jp + jm + 1;
                    let ip = (tt * ir as f64) as i64;
                    debug_assert!((0..4 * ir).contains(&ip));

                    if z > 0. {
                        2 * ir * (ir - 1) + ip
                    } else {
                        self.npix - 2 * ir * (ir + 1) + ip
                    }
                }
            }
            Scheme::Nest => {
                if za <= TWO_THIRD {
                    let temp1 = 0.5 * self.nside as f64 + phi * self.fact2;
                    let temp2 = self.nside as f64 * z * 0.75;
                    let jp = (temp1 - temp2) as i64;
                    let jm = (temp1 + temp2) as i64;
                    let ifp = jp >> self.order; // in {0, 4}
                    let ifm = jm >> self.order;
                    let face = if ifp == ifm {
                        ifp | 4
                    } else if ifp < ifm {
                        ifp
                    } else {
                        ifm + 8
                    };

                    let ix = jm & (self.nside - 1);
                    let iy = self.nside - (jp & (self.nside - 1)) - 1;
                    self.xyf2nest(ix, iy, face)
                } else {
                    let ntt = (tt as i64).min(3);
                    let tp = tt - ntt as f64;
                    let tmp = if za < 0.99 || !have_sth {
                        self.nside as f64 * (3. * (1. - za)).sqrt()
                    } else {
                        self.nside as f64 * sth / ((1. + za) / 3.).sqrt()
                    };

                    // Clamp points that fall on the face boundary.
                    let jp = ((tp * tmp) as i64).min(self.nside - 1);
                    let jm = (((1. - tp) * tmp) as i64).min(self.nside - 1);

                    if z >= 0. {
                        self.xyf2nest(
                            self.nside - jm - 1,
                            self.nside - jp - 1,
                            ntt,
                        )
                    } else {
                        self.xyf2nest(jp, jm, ntt + 8)
                    }
                }
            }
        }
    }

    pub(crate) fn pix2loc(&self, pix: i64) -> Loc {
        let mut loc = Loc {
            z: 0.,
            phi: 0.,
            sth: 0.,
            have_sth: false,
        };

        match self.scheme {
            Scheme::Ring => {
                if pix < self.ncap {
                    // North polar cap.
                    let iring = (1 + bits::isqrt(1 + 2 * pix)) >> 1;
                    let iphi = (pix + 1) - 2 * iring * (iring - 1);

                    let tmp = (iring * iring) as f64 * self.fact1;
                    loc.z = 1. - tmp;
                    if loc.z > 0.99 {
                        loc.sth = (tmp * (2. - tmp)).sqrt();
                        loc.have_sth = true;
                    }
                    loc.phi = (iphi as f64 - 0.5) * HALF_PI / iring as f64;
                } else if pix < self.npix - self.ncap {
                    // Equatorial belt.
                    let nl4 = 4 * self.nside;
                    let ip = pix - self.ncap;
                    let tmp = if self.order >= 0 {
                        ip >> (self.order + 2)
                    } else {
                        ip / nl4
                    };
                    let iring = tmp + self.nside;
                    let iphi = ip - nl4 * tmp + 1;
                    // 1 if iring+nside is odd, 1/2 otherwise.
                    let fodd = if (iring + self.nside) & 1 == 1 {
                        1.
                    } else {
                        0.5
                    };

                    loc.z = (2 * self.nside - iring) as f64 * 2.
                        / (3. * self.nside as f64);
                    loc.phi =
                        (iphi as f64 - fodd) * HALF_PI / self.nside as f64;
                } else {
                    // South polar cap.
                    let ip = self.npix - pix;
                    let iring = (1 + bits::isqrt(2 * ip - 1)) >> 1;
                    let iphi = 4 * iring + 1 - (ip - 2 * iring * (iring - 1));

                    let tmp = (iring * iring) as f64 * self.fact1;
                    loc.z = tmp - 1.;
                    if loc.z < -0.99 {
                        loc.sth = (tmp * (2. - tmp)).sqrt();
                        loc.have_sth = true;
                    }
                    loc.phi = (iphi as f64 - 0.5) * HALF_PI / iring as f64;
                }
            }
            Scheme::Nest => {
                let (ix, iy, face) = self.nest2xyf(pix);
                let jr = JRLL[face as usize] * self.nside - ix - iy - 1;

                let nr = if jr < self.nside {
                    let nr = jr;
                    let tmp = (nr * nr) as f64 * self.fact1;
                    loc.z = 1. - tmp;
                    if loc.z > 0.99 {
                        loc.sth = (tmp * (2. - tmp)).sqrt();
                        loc.have_sth = true;
                    }
                    nr
                } else if jr > 3 * self.nside {
                    let nr = 4 * self.nside - jr;
                    let tmp = (nr * nr) as f64 * self.fact1;
                    loc.z = tmp - 1.;
                    if loc.z < -0.99 {
                        loc.sth = (tmp * (2. - tmp)).sqrt();
                        loc.have_sth = true;
                    }
                    nr
                } else {
                    loc.z = (2 * self.nside - jr) as f64 * 2.
                        / (3. * self.nside as f64);
                    self.nside
                };

                let mut tmp = JPLL[face as usize] * nr + ix - iy;
                debug_assert!(tmp < 8 * nr);
                if tmp < 0 {
                    tmp += 8 * nr;
                }
                loc.phi = 0.5 * HALF_PI * tmp as f64 / nr as f64;
            }
        }
        loc
    }
}

// -----------------------------------------------------------------------------

/// Direction of a point in continuous in-face coordinates (x, y ∈ [0, 1]).
pub(crate) fn xyf2loc(x: f64, y: f64, face: i64) -> Loc {
    let mut loc = Loc {
        z: 0.,
        phi: 0.,
        sth: 0.,
        have_sth: false,
    };

    let jr = JRLL[face as usize] as f64 - x - y;
    let nr = if jr < 1. {
        let nr = jr;
        let tmp = nr * nr / 3.;
        loc.z = 1. - tmp;
        if loc.z > 0.99 {
            loc.sth = (tmp * (2. - tmp)).sqrt();
            loc.have_sth = true;
        }
        nr
    } else if jr > 3. {
        let nr = 4. - jr;
        let tmp = nr * nr / 3.;
        loc.z = tmp - 1.;
        if loc.z < -0.99 {
            loc.sth = (tmp * (2. - tmp)).sqrt();
            loc.have_sth = true;
        }
        nr
    } else {
        loc.z = (2. - jr) * 2. / 3.;
        1.
    };

    let mut tmp = JPLL[face as usize] as f64 * nr + x - y;
    if tmp < 0. {
        tmp += 8.;
    }
    if tmp >= 8. {
        tmp -= 8.;
    }
    loc.phi = if nr < 1e-15 {
        0.
    } else {
        (0.5 * HALF_PI * tmp) / nr
    };
    loc
}

/// Bracketing columns and azimuthal weight of `phi` on a ring of `nr`
/// pixels, the first one centered at `dphi/2` when `shifted`.
fn column_weights(phi: f64, nr: i64, shifted: bool) -> (i64, i64, f64) {
    let dphi = TWO_PI / nr as f64;
    let shift = if shifted { 0.5 } else { 0. };

    let tmp = phi / dphi - shift;
    let mut i1 = if tmp < 0. { tmp as i64 - 1 } else { tmp as i64 };
    let w1 = (phi - (i1 as f64 + shift) * dphi) / dphi;
    let mut i2 = i1 + 1;
    if i1 < 0 {
        i1 += nr;
    }
    if i2 >= nr {
        i2 -= nr;
    }

    (i1, i2, w1)
}

#[cfg(test)]
#[path = "./grid_tests.rs"]
mod tests;
