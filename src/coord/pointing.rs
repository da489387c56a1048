use super::Vec3d;
use float_eq::float_eq;
use std::fmt;

/// Comparison epsilon, far below any pixel size in the supported range.
const EPSILON: f64 = 1e-13;

/// Direction on the unit sphere: co-latitude θ and azimuth φ, in radians.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pointing {
    /// Co-latitude, in radians (0 at the north pole).
    pub theta: f64,
    /// Azimuth, in radians (eastward).
    pub phi: f64,
}

impl Pointing {
    /// Initializes a new pointing from co-latitude and azimuth in radians.
    ///
    /// # Example
    ///
    /// ```
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// let equator = hpgeo::Pointing::new(FRAC_PI_2, 0.);
    /// ```
    #[must_use]
    pub const fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }
}

impl PartialEq for Pointing {
    fn eq(&self, other: &Self) -> bool {
        float_eq!(self.theta, other.theta, abs <= EPSILON)
            && float_eq!(self.phi, other.phi, abs <= EPSILON)
    }
}

impl Eq for Pointing {}

impl From<Vec3d> for Pointing {
    /// Computes the direction of a (not necessarily normalized) vector.
    fn from(value: Vec3d) -> Self {
        Self {
            theta: (value.x.hypot(value.y)).atan2(value.z),
            phi: super::to_positive_angle(value.y.atan2(value.x)),
        }
    }
}

impl From<Pointing> for Vec3d {
    /// Computes the unit vector of the direction.
    fn from(value: Pointing) -> Self {
        let sth = value.theta.sin();

        Self::new(
            sth * value.phi.cos(),
            sth * value.phi.sin(),
            value.theta.cos(),
        )
    }
}

impl fmt::Display for Pointing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.10}, {:.10})", self.theta, self.phi)
    }
}
