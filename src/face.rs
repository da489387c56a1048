//! Precomputed data about the twelve HEALPix base faces.
//!
//! Faces 0-3 surround the north pole, 4-7 straddle the equator and 8-11
//! surround the south pole. In-face coordinates (x, y) grow towards the
//! north-east and north-west respectively, so x + y points north.

/// Ring index of the face center, in units of nside.
pub const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];

/// Azimuth of the face center, in units of π/4.
pub const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

/// In-face x offset of the 8 neighbor directions (SW, W, NW, N, NE, E, SE, S).
pub const NB_XOFFSET: [i64; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];

/// In-face y offset of the 8 neighbor directions (SW, W, NW, N, NE, E, SE, S).
pub const NB_YOFFSET: [i64; 8] = [0, 1, 1, 1, 0, -1, -1, -1];

/// Face reached when stepping over a face edge or corner.
///
/// The first index encodes which boundary was crossed: 4 + dx + 3*dy with
/// dx, dy in {-1, 0, +1} telling whether x/y under- or overflowed the face.
/// -1 marks a non-existent neighbor (diagonal steps over the corners of the
/// polar faces).
#[rustfmt::skip]
pub const NB_FACEARRAY: [[i8; 12]; 9] = [
    [  8,  9, 10, 11, -1, -1, -1, -1, 10, 11,  8,  9 ], // S
    [  5,  6,  7,  4,  8,  9, 10, 11,  9, 10, 11,  8 ], // SE
    [ -1, -1, -1, -1,  5,  6,  7,  4, -1, -1, -1, -1 ], // E
    [  4,  5,  6,  7, 11,  8,  9, 10, 11,  8,  9, 10 ], // SW
    [  0,  1,  2,  3,  4,  5,  6,  7,  8,  9, 10, 11 ], // center
    [  1,  2,  3,  0,  0,  1,  2,  3,  5,  6,  7,  4 ], // NE
    [ -1, -1, -1, -1,  7,  4,  5,  6, -1, -1, -1, -1 ], // W
    [  3,  0,  1,  2,  3,  0,  1,  2,  4,  5,  6,  7 ], // NW
    [  2,  3,  0,  1, -1, -1, -1, -1,  0,  1,  2,  3 ], // N
];

/// Coordinate transform applied when stepping onto the neighbor face.
///
/// Indexed by crossed boundary (as in [`NB_FACEARRAY`]) and face group
/// (face / 4). Bit 0 flips x, bit 1 flips y, bit 2 swaps x and y.
#[rustfmt::skip]
pub const NB_SWAPARRAY: [[u8; 3]; 9] = [
    [ 0, 0, 3 ], // S
    [ 0, 0, 6 ], // SE
    [ 0, 0, 0 ], // E
    [ 0, 0, 5 ], // SW
    [ 0, 0, 0 ], // center
    [ 5, 0, 0 ], // NE
    [ 0, 0, 0 ], // W
    [ 6, 0, 0 ], // NW
    [ 3, 0, 0 ], // N
];
