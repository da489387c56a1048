//! The `hpgeo` library implements the HEALPix spherical indexing scheme.
//!
//! HEALPix (Hierarchical Equal Area isoLatitude Pixelization) discretizes
//! the unit sphere into `12 * nside * nside` equal-area pixels, identified
//! either by iso-latitude rings (RING ordering) or by a recursive quad-tree
//! over twelve base faces (NEST ordering). On top of the pixel arithmetic,
//! the crate answers region queries (disc, convex polygon, ellipse,
//! longitude/latitude box) as compact sets of pixel ranges, and provides a
//! multi-order coverage map for fast point-in-region tests.

// Lints {{{

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rust_2021_compatibility,
    future_incompatible,
    rustdoc::broken_intra_doc_links,
    missing_docs,
    unsafe_code,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications
)]
#![warn(
    clippy::all,
    clippy::dbg_macro,
    clippy::exit,
    clippy::lossy_float_literal,
    clippy::mem_forget,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::str_to_string,
    clippy::string_add,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::use_debug
)]
#![allow(
    // "It requires the user to type the module name twice."
    // => not true here since internal modules are hidden from the users.
    clippy::module_name_repetitions,
    // Usually yes, but not really applicable for most literals in this crate.
    clippy::unreadable_literal
)]

// }}}

pub mod batch;
mod bits;
mod coord;
pub mod error;
mod face;
mod grid;
mod moc;
mod query;
mod rangeset;
mod scheme;

pub use batch::{AngleFormat, ArrayArg};
pub use coord::{Pointing, Vec3d};
pub use grid::Grid;
pub use moc::Moc;
pub use rangeset::RangeSet;
pub use scheme::Scheme;

// -----------------------------------------------------------------------------

/// Maximum supported NEST order (`nside = 2^order`).
pub const MAX_ORDER: i32 = 29;

/// Maximum supported nside (`2^29`).
pub const MAX_NSIDE: i64 = 1 << MAX_ORDER;

// 2π
const TWO_PI: f64 = 2. * std::f64::consts::PI;

// π/2
const HALF_PI: f64 = std::f64::consts::FRAC_PI_2;

// 2/π
const INV_HALF_PI: f64 = std::f64::consts::FRAC_2_PI;

// The |cos θ| boundary between the equatorial belt and the polar caps.
const TWO_THIRD: f64 = 2. / 3.;

// -----------------------------------------------------------------------------

/// Number of pixels on the whole sphere at the given nside.
///
/// # Example
///
/// ```
/// let count = hpgeo::pixel_count(128);
/// ```
#[must_use]
pub const fn pixel_count(nside: i64) -> i64 {
    12 * nside * nside
}
