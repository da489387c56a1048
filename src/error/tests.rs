use super::*;

#[test]
fn display_invalid_value() {
    assert_eq!(
        InvalidNside::new(0, "nside must be positive").to_string(),
        "invalid nside (got 0): nside must be positive"
    );
    assert_eq!(
        InvalidAngle::new(4.2, "colatitude out of range").to_string(),
        "invalid angle (got 4.2): colatitude out of range"
    );
}

#[test]
fn display_polygon() {
    assert_eq!(
        PolygonError::new("degenerate corner").to_string(),
        "invalid polygon: degenerate corner"
    );
}

#[test]
fn display_shape_mismatch() {
    assert_eq!(
        ShapeMismatch::new(4, 3).to_string(),
        "arrays could not be broadcast together (length 4 vs 3)"
    );
}

#[test]
fn umbrella_wraps_source() {
    use std::error::Error as _;

    let inner = InvalidPixel::new(-1, "pixel must be non-negative");
    let err = Error::from(inner);
    assert_eq!(err.to_string(), inner.to_string());
    assert!(err.source().is_some());
}
