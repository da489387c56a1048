use std::{error::Error, fmt};

// Macro to declare type-specific InvalidValue error type.
macro_rules! invalid_value_error {
    ($name:literal, $error:ident, $value_type:ty) => {
        #[doc = concat!("Invalid ", $name, ".")]
        #[derive(Clone, Copy, Debug, PartialEq)]
        // Value type may not be `Eq` (e.g. f64).
        #[allow(clippy::derive_partial_eq_without_eq)]
        pub struct $error {
            /// The invalid value.
            pub value: $value_type,
            /// The reason why it's invalid.
            pub reason: &'static str,
        }

        impl $error {
            pub(crate) const fn new(
                value: $value_type,
                reason: &'static str,
            ) -> Self {
                Self { value, reason }
            }
        }

        impl fmt::Display for $error {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "invalid {} (got {:?}): {}",
                    $name, self.value, self.reason
                )
            }
        }

        impl Error for $error {
            fn source(&self) -> Option<&(dyn Error + 'static)> {
                None
            }
        }
    };
}

invalid_value_error!("nside", InvalidNside, i64);
invalid_value_error!("pixel identifier", InvalidPixel, i64);
invalid_value_error!("angle", InvalidAngle, f64);
invalid_value_error!("radius", InvalidRadius, f64);
invalid_value_error!("refinement factor", InvalidFact, i64);
invalid_value_error!("semi-axis", InvalidSemiAxes, f64);
invalid_value_error!("sampling step", InvalidStep, i64);
invalid_value_error!("range", InvalidRange, i64);
