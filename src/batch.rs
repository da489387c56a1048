//! Batched array drivers.
//!
//! Every driver broadcasts its scalar-or-array arguments elementwise (each
//! argument must hold either one value or the common length), validates per
//! element, and invokes the per-pixel core. A [`Grid`] is derived only when
//! the nside changes from one element to the next, which makes the uniform
//! nside case cheap.
//!
//! Angle arguments follow the conventions of the `a, b` pair: with
//! [`AngleFormat::lonlat`] they are longitude/latitude (degrees when
//! [`AngleFormat::degrees`]), otherwise co-latitude/azimuth in radians.

use crate::{
    coord::{
        check_theta_phi, fmodulo, lonlat_to_thetaphi, thetaphi_to_lonlat,
        Pointing,
    },
    error::{Error, InvalidAngle, InvalidStep, ShapeMismatch},
    Grid, Scheme, Vec3d, TWO_PI,
};
use either::Either;

// -----------------------------------------------------------------------------
// Argument plumbing.

/// Angle conventions of the `a, b` argument pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AngleFormat {
    /// Interpret `a, b` as longitude/latitude instead of θ/φ.
    pub lonlat: bool,
    /// With `lonlat`, use degrees instead of radians.
    pub degrees: bool,
}

impl AngleFormat {
    /// Longitude/latitude in degrees (the default).
    pub const LONLAT_DEG: Self = Self {
        lonlat: true,
        degrees: true,
    };

    /// Longitude/latitude in radians.
    pub const LONLAT_RAD: Self = Self {
        lonlat: true,
        degrees: false,
    };

    /// Co-latitude/azimuth in radians.
    pub const THETA_PHI: Self = Self {
        lonlat: false,
        degrees: false,
    };
}

impl Default for AngleFormat {
    fn default() -> Self {
        Self::LONLAT_DEG
    }
}

/// A scalar-or-array argument to a batched driver.
#[derive(Clone, Copy, Debug)]
pub enum ArrayArg<'a, T: Copy> {
    /// A single value, broadcast against the other arguments.
    Scalar(T),
    /// One value per element (or a single one, also broadcast).
    Slice(&'a [T]),
}

impl<T: Copy> From<T> for ArrayArg<'_, T> {
    fn from(value: T) -> Self {
        Self::Scalar(value)
    }
}

impl<'a, T: Copy> From<&'a [T]> for ArrayArg<'a, T> {
    fn from(value: &'a [T]) -> Self {
        Self::Slice(value)
    }
}

impl<'a, T: Copy> From<&'a Vec<T>> for ArrayArg<'a, T> {
    fn from(value: &'a Vec<T>) -> Self {
        Self::Slice(value)
    }
}

impl<'a, T: Copy, const N: usize> From<&'a [T; N]> for ArrayArg<'a, T> {
    fn from(value: &'a [T; N]) -> Self {
        Self::Slice(value)
    }
}

impl<T: Copy> ArrayArg<'_, T> {
    pub(crate) fn len(&self) -> usize {
        match *self {
            Self::Scalar(_) => 1,
            Self::Slice(s) => s.len(),
        }
    }

    /// Iterates the broadcast values over `n` elements.
    pub(crate) fn values(&self, n: usize) -> impl Iterator<Item = T> + '_ {
        match *self {
            Self::Scalar(v) => Either::Left(std::iter::repeat(v).take(n)),
            Self::Slice(s) if s.len() == 1 => {
                Either::Left(std::iter::repeat(s[0]).take(n))
            }
            Self::Slice(s) => Either::Right(s.iter().copied()),
        }
    }
}

/// Common broadcast length of the argument lengths: every argument must
/// hold one value or exactly the common count.
pub(crate) fn broadcast_len(lens: &[usize]) -> Result<usize, ShapeMismatch> {
    let n = lens.iter().copied().max().unwrap_or(1);
    for &len in lens {
        if len != n && len != 1 {
            return Err(ShapeMismatch::new(n, len));
        }
    }
    Ok(n)
}

/// Grid rebuilt only when the element nside changes.
struct GridCache {
    scheme: Scheme,
    last: Option<Grid>,
}

impl GridCache {
    const fn new(scheme: Scheme) -> Self {
        Self { scheme, last: None }
    }

    fn get(&mut self, nside: i64) -> Result<Grid, Error> {
        let grid = match self.last {
            Some(grid) if grid.nside() == nside => grid,
            _ => {
                let grid = Grid::new(nside, self.scheme)?;
                self.last = Some(grid);
                grid
            }
        };
        Ok(grid)
    }
}

fn to_pointing(a: f64, b: f64, fmt: AngleFormat) -> Result<Pointing, Error> {
    if fmt.lonlat {
        let (theta, phi) = lonlat_to_thetaphi(a, b, fmt.degrees)?;
        Ok(Pointing::new(theta, phi))
    } else {
        check_theta_phi(a, b)?;
        Ok(Pointing::new(a, b))
    }
}

/// Inverse of [`to_pointing`] for known-good angles (no validation).
fn from_pointing(ptg: Pointing, fmt: AngleFormat) -> (f64, f64) {
    if fmt.lonlat {
        // Infallible without the check.
        thetaphi_to_lonlat(ptg.theta, ptg.phi, fmt.degrees, false)
            .unwrap_or((0., 0.))
    } else {
        (ptg.theta, ptg.phi)
    }
}

// -----------------------------------------------------------------------------
// Pixel arithmetic drivers.

/// Converts angles to pixel identifiers.
///
/// # Errors
///
/// [`Error::Shape`], [`Error::Nside`] or [`Error::Angle`] on invalid
/// arguments.
///
/// # Example
///
/// ```
/// use hpgeo::{batch, AngleFormat, Scheme};
///
/// let pixels = batch::angle_to_pixel(
///     2048,
///     &[45.0, 60.0],
///     &[0.0, 30.0],
///     Scheme::Nest,
///     AngleFormat::default(),
/// )?;
/// assert_eq!(pixels.len(), 2);
/// # Ok::<(), hpgeo::error::Error>(())
/// ```
pub fn angle_to_pixel<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    a: impl Into<ArrayArg<'a, f64>>,
    b: impl Into<ArrayArg<'a, f64>>,
    scheme: Scheme,
    fmt: AngleFormat,
) -> Result<Vec<i64>, Error> {
    let (nside, a, b) = (nside.into(), a.into(), b.into());
    let n = broadcast_len(&[nside.len(), a.len(), b.len()])?;

    let mut cache = GridCache::new(scheme);
    let mut out = Vec::with_capacity(n);
    for ((nside, a), b) in nside.values(n).zip(a.values(n)).zip(b.values(n)) {
        let grid = cache.get(nside)?;
        out.push(grid.ang2pix(to_pointing(a, b, fmt)?));
    }
    Ok(out)
}

/// Converts pixel identifiers to the angles of the pixel centers.
///
/// # Errors
///
/// [`Error::Shape`], [`Error::Nside`] or [`Error::Pixel`] on invalid
/// arguments.
pub fn pixel_to_angle<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    pix: impl Into<ArrayArg<'a, i64>>,
    scheme: Scheme,
    fmt: AngleFormat,
) -> Result<(Vec<f64>, Vec<f64>), Error> {
    let (nside, pix) = (nside.into(), pix.into());
    let n = broadcast_len(&[nside.len(), pix.len()])?;

    let mut cache = GridCache::new(scheme);
    let mut out_a = Vec::with_capacity(n);
    let mut out_b = Vec::with_capacity(n);
    for (nside, pix) in nside.values(n).zip(pix.values(n)) {
        let grid = cache.get(nside)?;
        grid.check_pixel(pix)?;
        let (a, b) = from_pointing(grid.pix2ang(pix), fmt);
        out_a.push(a);
        out_b.push(b);
    }
    Ok((out_a, out_b))
}

/// Converts Cartesian directions to pixel identifiers.
///
/// # Errors
///
/// [`Error::Shape`] or [`Error::Nside`] on invalid arguments.
pub fn vector_to_pixel<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    x: impl Into<ArrayArg<'a, f64>>,
    y: impl Into<ArrayArg<'a, f64>>,
    z: impl Into<ArrayArg<'a, f64>>,
    scheme: Scheme,
) -> Result<Vec<i64>, Error> {
    let (nside, x, y, z) = (nside.into(), x.into(), y.into(), z.into());
    let n = broadcast_len(&[nside.len(), x.len(), y.len(), z.len()])?;

    let mut cache = GridCache::new(scheme);
    let mut out = Vec::with_capacity(n);
    for (((nside, x), y), z) in
        nside.values(n).zip(x.values(n)).zip(y.values(n)).zip(z.values(n))
    {
        let grid = cache.get(nside)?;
        out.push(grid.vec2pix(Vec3d::new(x, y, z)));
    }
    Ok(out)
}

/// Converts pixel identifiers to the unit vectors of the pixel centers.
///
/// # Errors
///
/// [`Error::Shape`], [`Error::Nside`] or [`Error::Pixel`] on invalid
/// arguments.
#[allow(clippy::type_complexity)] // one coordinate array per component
pub fn pixel_to_vector<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    pix: impl Into<ArrayArg<'a, i64>>,
    scheme: Scheme,
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), Error> {
    let (nside, pix) = (nside.into(), pix.into());
    let n = broadcast_len(&[nside.len(), pix.len()])?;

    let mut cache = GridCache::new(scheme);
    let (mut out_x, mut out_y, mut out_z) =
        (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
    for (nside, pix) in nside.values(n).zip(pix.values(n)) {
        let grid = cache.get(nside)?;
        grid.check_pixel(pix)?;
        let v = grid.pix2vec(pix);
        out_x.push(v.x);
        out_y.push(v.y);
        out_z.push(v.z);
    }
    Ok((out_x, out_y, out_z))
}

/// Converts pixel identifiers from NEST to RING ordering.
///
/// # Errors
///
/// [`Error::Shape`], [`Error::Nside`] or [`Error::Pixel`] on invalid
/// arguments.
pub fn nest_to_ring<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    pix: impl Into<ArrayArg<'a, i64>>,
) -> Result<Vec<i64>, Error> {
    let (nside, pix) = (nside.into(), pix.into());
    let n = broadcast_len(&[nside.len(), pix.len()])?;

    let mut cache = GridCache::new(Scheme::Nest);
    let mut out = Vec::with_capacity(n);
    for (nside, pix) in nside.values(n).zip(pix.values(n)) {
        let grid = cache.get(nside)?;
        grid.check_pixel(pix)?;
        out.push(grid.nest2ring(pix));
    }
    Ok(out)
}

/// Converts pixel identifiers from RING to NEST ordering.
///
/// # Errors
///
/// [`Error::Shape`], [`Error::Nside`] or [`Error::Pixel`] on invalid
/// arguments.
pub fn ring_to_nest<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    pix: impl Into<ArrayArg<'a, i64>>,
) -> Result<Vec<i64>, Error> {
    let (nside, pix) = (nside.into(), pix.into());
    let n = broadcast_len(&[nside.len(), pix.len()])?;

    let mut cache = GridCache::new(Scheme::Nest);
    let mut out = Vec::with_capacity(n);
    for (nside, pix) in nside.values(n).zip(pix.values(n)) {
        let grid = cache.get(nside)?;
        grid.check_pixel(pix)?;
        out.push(grid.ring2nest(pix));
    }
    Ok(out)
}

/// Returns the 8 neighbors of each pixel (SW, W, NW, N, NE, E, SE, S;
/// −1 for a missing diagonal neighbor).
///
/// # Errors
///
/// [`Error::Shape`], [`Error::Nside`] or [`Error::Pixel`] on invalid
/// arguments.
pub fn neighbors<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    pix: impl Into<ArrayArg<'a, i64>>,
    scheme: Scheme,
) -> Result<Vec<[i64; 8]>, Error> {
    let (nside, pix) = (nside.into(), pix.into());
    let n = broadcast_len(&[nside.len(), pix.len()])?;

    let mut cache = GridCache::new(scheme);
    let mut out = Vec::with_capacity(n);
    for (nside, pix) in nside.values(n).zip(pix.values(n)) {
        let grid = cache.get(nside)?;
        grid.check_pixel(pix)?;
        out.push(grid.neighbors(pix));
    }
    Ok(out)
}

/// Samples the boundary of each pixel (`4 * step` points per pixel,
/// concatenated), returning the `a, b` angle pair per point.
///
/// # Errors
///
/// [`Error::Step`] for a non-positive step, plus [`Error::Shape`],
/// [`Error::Nside`] or [`Error::Pixel`] on invalid arguments.
pub fn boundaries<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    pix: impl Into<ArrayArg<'a, i64>>,
    step: i64,
    scheme: Scheme,
    fmt: AngleFormat,
) -> Result<(Vec<f64>, Vec<f64>), Error> {
    if step < 1 {
        return Err(InvalidStep::new(step, "step must be positive").into());
    }
    let (nside, pix) = (nside.into(), pix.into());
    let n = broadcast_len(&[nside.len(), pix.len()])?;

    let mut cache = GridCache::new(scheme);
    let step = step as usize;
    let mut out_a = Vec::with_capacity(n * 4 * step);
    let mut out_b = Vec::with_capacity(n * 4 * step);
    for (nside, pix) in nside.values(n).zip(pix.values(n)) {
        let grid = cache.get(nside)?;
        grid.check_pixel(pix)?;
        for ptg in grid.boundaries(pix, step) {
            let (a, b) = from_pointing(ptg, fmt);
            out_a.push(a);
            out_b.push(b);
        }
    }
    Ok((out_a, out_b))
}

/// Returns the 4 bracketing pixels and bilinear weights per position.
///
/// # Errors
///
/// [`Error::Shape`], [`Error::Nside`] or [`Error::Angle`] on invalid
/// arguments.
#[allow(clippy::type_complexity)] // pixels and weights come in pairs
pub fn get_interpolation_weights<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    a: impl Into<ArrayArg<'a, f64>>,
    b: impl Into<ArrayArg<'a, f64>>,
    scheme: Scheme,
    fmt: AngleFormat,
) -> Result<(Vec<[i64; 4]>, Vec<[f64; 4]>), Error> {
    let (nside, a, b) = (nside.into(), a.into(), b.into());
    let n = broadcast_len(&[nside.len(), a.len(), b.len()])?;

    let mut cache = GridCache::new(scheme);
    let mut out_pix = Vec::with_capacity(n);
    let mut out_wgt = Vec::with_capacity(n);
    for ((nside, a), b) in nside.values(n).zip(a.values(n)).zip(b.values(n)) {
        let grid = cache.get(nside)?;
        let (pix, wgt) = grid.get_interpol(to_pointing(a, b, fmt)?);
        out_pix.push(pix);
        out_wgt.push(wgt);
    }
    Ok((out_pix, out_wgt))
}

/// Maximum center-to-corner distance of any pixel, per nside, in degrees
/// (or radians with `degrees = false`).
///
/// # Errors
///
/// [`Error::Nside`] on an invalid nside.
pub fn max_pixel_radius<'a>(
    nside: impl Into<ArrayArg<'a, i64>>,
    degrees: bool,
) -> Result<Vec<f64>, Error> {
    let nside = nside.into();
    let n = nside.len();

    let mut cache = GridCache::new(Scheme::Ring);
    let mut out = Vec::with_capacity(n);
    for nside in nside.values(n) {
        let radius = cache.get(nside)?.max_pixrad();
        out.push(if degrees { radius.to_degrees() } else { radius });
    }
    Ok(out)
}

// -----------------------------------------------------------------------------
// Query drivers.

/// Returns the sorted pixels covered by a disc (see
/// [`Grid::query_disc`]).
///
/// The radius follows the angle units of `fmt`.
///
/// # Errors
///
/// [`Error::Nside`], [`Error::Angle`], [`Error::Radius`] or
/// [`Error::Fact`] on invalid arguments.
pub fn query_circle(
    nside: i64,
    a: f64,
    b: f64,
    radius: f64,
    fact: i64,
    scheme: Scheme,
    fmt: AngleFormat,
) -> Result<Vec<i64>, Error> {
    let center = to_pointing(a, b, fmt)?;
    let radius = if fmt.lonlat && fmt.degrees {
        radius.to_radians()
    } else {
        radius
    };
    let grid = Grid::new(nside, scheme)?;

    Ok(grid.query_disc(center, radius, fact)?.to_vec())
}

/// Returns the sorted pixels covered by a convex polygon (see
/// [`Grid::query_polygon`]).
///
/// `a` and `b` hold the vertex angles and must be equally long.
///
/// # Errors
///
/// [`Error::Polygon`] for a bad polygon, plus [`Error::Shape`],
/// [`Error::Nside`], [`Error::Angle`] or [`Error::Fact`] on invalid
/// arguments.
pub fn query_polygon(
    nside: i64,
    a: &[f64],
    b: &[f64],
    fact: i64,
    scheme: Scheme,
    fmt: AngleFormat,
) -> Result<Vec<i64>, Error> {
    if a.len() != b.len() {
        return Err(ShapeMismatch::new(a.len(), b.len()).into());
    }
    let vertices = a
        .iter()
        .zip(b.iter())
        .map(|(&a, &b)| to_pointing(a, b, fmt))
        .collect::<Result<Vec<_>, _>>()?;
    let grid = Grid::new(nside, scheme)?;

    Ok(grid.query_polygon(&vertices, fact)?.to_vec())
}

/// Returns the sorted pixels covered by a spherical ellipse (see
/// [`Grid::query_ellipse`]).
///
/// The semi-axes and tilt follow the angle units of `fmt`.
///
/// # Errors
///
/// [`Error::Nside`], [`Error::Angle`], [`Error::SemiAxes`] or
/// [`Error::Fact`] on invalid arguments.
#[allow(clippy::too_many_arguments)] // mirrors the ellipse definition 1:1
pub fn query_ellipse(
    nside: i64,
    a: f64,
    b: f64,
    semi_major: f64,
    semi_minor: f64,
    alpha: f64,
    fact: i64,
    scheme: Scheme,
    fmt: AngleFormat,
) -> Result<Vec<i64>, Error> {
    let center = to_pointing(a, b, fmt)?;
    let (semi_major, semi_minor, alpha) = if fmt.lonlat && fmt.degrees {
        (
            semi_major.to_radians(),
            semi_minor.to_radians(),
            alpha.to_radians(),
        )
    } else {
        (semi_major, semi_minor, alpha)
    };
    let grid = Grid::new(nside, scheme)?;

    Ok(grid
        .query_ellipse(center, semi_major, semi_minor, alpha, fact)?
        .to_vec())
}

/// Returns the sorted pixels covered by a longitude/latitude box (see
/// [`Grid::query_box`]).
///
/// In lon/lat mode the box spans `[a0, a1]` in longitude (wrapping when
/// `a0 > a1`) and `[b0, b1]` in latitude; `a0 == 0` with `a1 == 360`
/// selects all longitudes. In θ/φ mode `[a0, a1]` is the co-latitude
/// interval and `[b0, b1]` the azimuth interval, with `b0 == 0` and
/// `b1 == 2π` selecting all azimuths.
///
/// # Errors
///
/// [`Error::Nside`], [`Error::Angle`] or [`Error::Fact`] on invalid
/// arguments.
#[allow(clippy::too_many_arguments)] // mirrors the box definition 1:1
pub fn query_box(
    nside: i64,
    a0: f64,
    a1: f64,
    b0: f64,
    b1: f64,
    fact: i64,
    scheme: Scheme,
    fmt: AngleFormat,
) -> Result<Vec<i64>, Error> {
    let (theta0, theta1, phi0, phi1, full_longitude) = if fmt.lonlat {
        let full_circle = if fmt.degrees { 360. } else { TWO_PI };
        if b0 > b1 {
            return Err(InvalidAngle::new(
                b0,
                "latitude bounds must satisfy b0 <= b1",
            )
            .into());
        }
        // Latitude bounds swap into co-latitude bounds.
        let (t1, p0) = lonlat_to_thetaphi(a0, b0, fmt.degrees)?;
        let (t0, p1) = lonlat_to_thetaphi(a1, b1, fmt.degrees)?;
        (t0, t1, p0, p1, a0 == 0. && a1 == full_circle)
    } else {
        if a0 > a1 {
            return Err(InvalidAngle::new(
                a0,
                "colatitude bounds must satisfy a0 <= a1",
            )
            .into());
        }
        check_theta_phi(a0, b0)?;
        check_theta_phi(a1, b1)?;
        (
            a0,
            a1,
            fmodulo(b0, TWO_PI),
            fmodulo(b1, TWO_PI),
            b0 == 0. && b1 == TWO_PI,
        )
    };
    let grid = Grid::new(nside, scheme)?;

    Ok(grid
        .query_box(theta0, theta1, phi0, phi1, full_longitude, fact)?
        .to_vec())
}

#[cfg(test)]
#[path = "./batch_tests.rs"]
mod tests;
