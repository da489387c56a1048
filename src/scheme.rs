use std::{fmt, str::FromStr};

/// HEALPix pixel ordering schemes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scheme {
    /// Pixels sorted by decreasing co-latitude along iso-latitude rings.
    ///
    /// Any positive nside is valid in this scheme.
    Ring = 0,
    /// Pixels laid out by recursive quadrilateral subdivision of the twelve
    /// base faces.
    ///
    /// Requires nside to be a power of two.
    Nest = 1,
}

impl Scheme {
    /// Returns true for the NEST ordering.
    ///
    /// # Example
    ///
    /// ```
    /// use hpgeo::Scheme;
    ///
    /// assert!(Scheme::Nest.is_nest());
    /// assert!(!Scheme::Ring.is_nest());
    /// ```
    #[must_use]
    pub const fn is_nest(self) -> bool {
        matches!(self, Self::Nest)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                Self::Ring => "ring",
                Self::Nest => "nest",
            }
        )
    }
}

impl FromStr for Scheme {
    type Err = crate::error::InvalidScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ring" | "RING" => Ok(Self::Ring),
            "nest" | "NEST" | "nested" => Ok(Self::Nest),
            _ => Err(Self::Err::new(s.into(), "expected ring or nest")),
        }
    }
}
