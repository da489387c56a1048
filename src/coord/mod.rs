//! Angular and Cartesian coordinates on the unit sphere.
//!
//! The native angular representation is the co-latitude θ ∈ [0, π]
//! (measured from the north pole) and the azimuth φ ∈ [0, 2π), both in
//! radians. Longitude/latitude is accepted as an alternative input/output
//! convention, in degrees or radians.

mod pointing;
mod vec3d;

pub use pointing::Pointing;
pub use vec3d::Vec3d;

use crate::{error::InvalidAngle, HALF_PI, TWO_PI};
use std::f64::consts::PI;

// -----------------------------------------------------------------------------

/// Normalizes radians to a value between 0 and 2π.
pub(crate) fn to_positive_angle(mut angle: f64) -> f64 {
    if angle < 0. {
        angle += TWO_PI;
    } else if angle >= TWO_PI {
        angle -= TWO_PI;
    }
    debug_assert!((0.0..=TWO_PI).contains(&angle), "{angle}");

    angle
}

/// Reduces `v` into `[0, n)`, also for negative `v`.
pub(crate) fn fmodulo(v: f64, n: f64) -> f64 {
    if v >= 0. {
        return if v < n { v } else { v % n };
    }
    let tmp = v % n + n;
    if tmp == n {
        0.
    } else {
        tmp
    }
}

// -----------------------------------------------------------------------------

/// Validates a (θ, φ) pair: θ ∈ [0, π] and φ ∈ [−2π, 2π].
pub(crate) fn check_theta_phi(
    theta: f64,
    phi: f64,
) -> Result<(), InvalidAngle> {
    if !(0.0..=PI).contains(&theta) {
        return Err(InvalidAngle::new(
            theta,
            "colatitude (theta) must be within [0, pi]",
        ));
    }
    if !(-TWO_PI..=TWO_PI).contains(&phi) {
        return Err(InvalidAngle::new(
            phi,
            "longitude (phi) must be within [-2*pi, 2*pi]",
        ));
    }
    Ok(())
}

/// Converts a longitude/latitude pair to (θ, φ) radians.
///
/// The longitude is reduced into its principal interval; a latitude outside
/// [−90, 90] degrees (or [−π/2, π/2] radians) is rejected.
pub(crate) fn lonlat_to_thetaphi(
    lon: f64,
    lat: f64,
    degrees: bool,
) -> Result<(f64, f64), InvalidAngle> {
    let (lon, lat) = if degrees {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidAngle::new(
                lat,
                "latitude must be within [-90, 90] degrees",
            ));
        }
        (fmodulo(lon, 360.).to_radians(), lat.to_radians())
    } else {
        if !(-HALF_PI..=HALF_PI).contains(&lat) {
            return Err(InvalidAngle::new(
                lat,
                "latitude must be within [-pi/2, pi/2]",
            ));
        }
        (fmodulo(lon, TWO_PI), lat)
    };

    Ok((HALF_PI - lat, lon))
}

/// Converts a (θ, φ) pair back to longitude/latitude.
///
/// With `check` the angles are validated first; callers may skip the check
/// for known-good values (e.g. outputs of `pix2ang`).
pub(crate) fn thetaphi_to_lonlat(
    theta: f64,
    phi: f64,
    degrees: bool,
    check: bool,
) -> Result<(f64, f64), InvalidAngle> {
    if check {
        check_theta_phi(theta, phi)?;
    }
    let lon = fmodulo(phi, TWO_PI);
    let lat = HALF_PI - theta;

    Ok(if degrees {
        (lon.to_degrees(), lat.to_degrees())
    } else {
        (lon, lat)
    })
}

#[cfg(test)]
#[path = "./coord_tests.rs"]
mod tests;
