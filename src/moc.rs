//! Multi-Order Coverage maps.

use crate::{
    batch::{broadcast_len, AngleFormat, ArrayArg},
    bits,
    coord::{lonlat_to_thetaphi, Pointing},
    error::{Error, InvalidPixel},
    Grid, RangeSet, Scheme,
};
use std::fmt;

/// A Multi-Order Coverage map: an arbitrary region of the sky stored as a
/// set of pixel ranges at a fixed maximum NEST resolution.
///
/// The map answers point-in-region queries in `O(log n)` by locating the
/// NEST pixel of the position at `nside_max` inside the range set.
///
/// # Example
///
/// ```
/// use hpgeo::Moc;
///
/// let moc = Moc::from_ranges(1024, &[(0, 4)])?;
///
/// assert!(moc.contains(2));
/// assert!(!moc.contains(4));
/// # Ok::<(), hpgeo::error::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Moc {
    /// NEST grid at the map's maximum resolution.
    grid: Grid,
    /// Pixel ranges at `nside_max`, sorted and disjoint.
    ranges: RangeSet,
}

impl Moc {
    /// Builds a map from half-open `[lo, hi)` pixel ranges at `nside_max`,
    /// given in ascending order.
    ///
    /// # Errors
    ///
    /// [`Error::Nside`] for an invalid `nside_max`, [`Error::Pixel`] for a
    /// range outside the pixel domain, [`Error::Range`] for empty or
    /// out-of-order ranges.
    pub fn from_ranges(
        nside_max: i64,
        ranges: &[(i64, i64)],
    ) -> Result<Self, Error> {
        let grid = Grid::new(nside_max, Scheme::Nest)?;
        let mut set = RangeSet::with_capacity(ranges.len());
        for &(lo, hi) in ranges {
            check_domain(&grid, lo, hi)?;
            set.append(lo, hi)?;
        }

        Ok(Self { grid, ranges: set })
    }

    /// Builds a map from NUNIQ identifiers (`4 * 4^order + ipix`), in any
    /// order.
    ///
    /// Each identifier expands to the corresponding pixel range at
    /// `nside_max`.
    ///
    /// # Errors
    ///
    /// [`Error::Nside`] for an invalid `nside_max`, [`Error::Pixel`] for an
    /// identifier below 4 or finer than `nside_max`.
    pub fn from_nuniq(nside_max: i64, nuniq: &[i64]) -> Result<Self, Error> {
        let grid = Grid::new(nside_max, Scheme::Nest)?;
        let mut set = RangeSet::new();
        for &uniq in nuniq {
            if uniq < 4 {
                return Err(InvalidPixel::new(
                    uniq,
                    "NUNIQ identifier must be at least 4",
                )
                .into());
            }
            let order = (bits::ilog2(uniq) >> 1) - 1;
            if order > grid.order() {
                return Err(InvalidPixel::new(
                    uniq,
                    "NUNIQ order is finer than the map's maximum order",
                )
                .into());
            }
            let ipix = uniq - (1_i64 << (2 * order + 2));
            let shift = 2 * (grid.order() - order);
            set.add(ipix << shift, (ipix + 1) << shift)?;
        }

        Ok(Self { grid, ranges: set })
    }

    /// NEST resolution of the stored ranges.
    #[must_use]
    pub const fn nside(&self) -> i64 {
        self.grid.nside()
    }

    /// Number of disjoint ranges in the map.
    #[must_use]
    pub fn num_ranges(&self) -> usize {
        self.ranges.num_ranges()
    }

    /// Number of covered pixels at `nside_max`.
    #[must_use]
    pub fn npix(&self) -> i64 {
        self.ranges.npix()
    }

    /// Returns true when the map covers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The underlying range set.
    #[must_use]
    pub const fn ranges(&self) -> &RangeSet {
        &self.ranges
    }

    /// Inserts one more `[lo, hi)` pixel range, merging as needed.
    ///
    /// # Errors
    ///
    /// [`Error::Pixel`] for a range outside the pixel domain,
    /// [`Error::Range`] for an empty range.
    pub fn insert(&mut self, lo: i64, hi: i64) -> Result<(), Error> {
        check_domain(&self.grid, lo, hi)?;
        self.ranges.add(lo, hi)?;

        Ok(())
    }

    /// Returns true when the map covers the NEST pixel `pix` at
    /// `nside_max`.
    #[must_use]
    pub fn contains(&self, pix: i64) -> bool {
        self.ranges.contains(pix)
    }

    /// Returns true when the map covers the given direction.
    #[must_use]
    pub fn contains_point(&self, ptg: Pointing) -> bool {
        self.contains(self.grid.ang2pix(ptg))
    }

    /// Returns, per broadcast position, whether the map covers it.
    ///
    /// `a`/`b` follow the same angle conventions as the batched drivers.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`] when the inputs cannot be broadcast together,
    /// [`Error::Angle`] for positions out of range.
    pub fn contains_pos<'a>(
        &self,
        a: impl Into<ArrayArg<'a, f64>>,
        b: impl Into<ArrayArg<'a, f64>>,
        fmt: AngleFormat,
    ) -> Result<Vec<bool>, Error> {
        let (a, b) = (a.into(), b.into());
        let n = broadcast_len(&[a.len(), b.len()])?;

        let mut out = Vec::with_capacity(n);
        for (a, b) in a.values(n).zip(b.values(n)) {
            let ptg = if fmt.lonlat {
                let (theta, phi) = lonlat_to_thetaphi(a, b, fmt.degrees)?;
                Pointing::new(theta, phi)
            } else {
                crate::coord::check_theta_phi(a, b)?;
                Pointing::new(a, b)
            };
            out.push(self.contains_point(ptg));
        }
        Ok(out)
    }
}

fn check_domain(grid: &Grid, lo: i64, hi: i64) -> Result<(), InvalidPixel> {
    if lo < 0 {
        return Err(InvalidPixel::new(lo, "range start must be non-negative"));
    }
    if hi > grid.npix() {
        return Err(InvalidPixel::new(
            hi,
            "range end exceeds the pixel count at nside_max",
        ));
    }
    Ok(())
}

impl fmt::Display for Moc {
    /// Bounded summary: every range when there are fewer than 20, the
    /// first and last ten otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Moc(nside={},", self.nside())?;
        writeln!(f, "[")?;
        let nrange = self.num_ranges();
        if nrange < 20 {
            for (lo, hi) in self.ranges.ranges() {
                writeln!(f, "[{lo}, {hi})")?;
            }
        } else {
            for (lo, hi) in self.ranges.ranges().take(10) {
                writeln!(f, "[{lo}, {hi})")?;
            }
            writeln!(f, "...")?;
            for (lo, hi) in self.ranges.ranges().skip(nrange - 10) {
                writeln!(f, "[{lo}, {hi})")?;
            }
        }
        write!(f, "])")
    }
}

#[cfg(test)]
#[path = "./moc_tests.rs"]
mod tests;
