use super::*;

#[test]
fn from_ranges_basic() {
    let moc = Moc::from_ranges(1024, &[(0, 4), (100, 200)]).expect("moc");
    assert_eq!(moc.nside(), 1024);
    assert_eq!(moc.num_ranges(), 2);
    assert_eq!(moc.npix(), 104);

    assert!(moc.contains(0));
    assert!(moc.contains(3));
    assert!(!moc.contains(4));
    assert!(moc.contains(150));
    assert!(!moc.contains(200));
}

#[test]
fn from_ranges_validation() {
    assert!(Moc::from_ranges(1000, &[(0, 4)]).is_err()); // not a power of 2
    assert!(Moc::from_ranges(16, &[(4, 4)]).is_err()); // empty range
    assert!(Moc::from_ranges(16, &[(8, 4)]).is_err()); // reversed
    assert!(Moc::from_ranges(16, &[(8, 12), (0, 4)]).is_err()); // unordered
    assert!(Moc::from_ranges(16, &[(-2, 4)]).is_err()); // negative
    assert!(Moc::from_ranges(16, &[(0, 12 * 16 * 16 + 1)]).is_err());
}

#[test]
fn from_nuniq_expands_orders() {
    // Order 0 pixel 1 (nuniq 5) covers pixels [4^5, 2*4^5) at order 5.
    let moc = Moc::from_nuniq(32, &[5]).expect("moc");
    assert_eq!(moc.npix(), 1024);
    assert!(!moc.contains(1023));
    assert!(moc.contains(1024));
    assert!(moc.contains(2047));
    assert!(!moc.contains(2048));

    // Identifiers at the maximum order map to single pixels.
    let max_order = Moc::from_nuniq(32, &[4 * 4_i64.pow(5) + 7]).expect("moc");
    assert_eq!(max_order.npix(), 1);
    assert!(max_order.contains(7));
}

#[test]
fn from_nuniq_merges_unordered_input() {
    // Two coarse cells given out of order plus one fine duplicate inside.
    let uniq0 = 4 + 1; // order 0, pixel 1
    let uniq1 = 16 + 4; // order 1, pixel 4 (inside order-0 pixel 1)
    let moc = Moc::from_nuniq(2, &[uniq1, uniq0]).expect("moc");

    assert_eq!(moc.num_ranges(), 1);
    assert_eq!(moc.npix(), 4);
}

#[test]
fn from_nuniq_validation() {
    assert!(Moc::from_nuniq(16, &[3]).is_err());
    assert!(Moc::from_nuniq(16, &[0]).is_err());
    // Order 5 identifier on an order-4 map.
    assert!(Moc::from_nuniq(16, &[4 * 4_i64.pow(5)]).is_err());
}

#[test]
fn insert_merges() {
    let mut moc = Moc::from_ranges(16, &[(10, 20)]).expect("moc");
    moc.insert(15, 30).expect("insert");
    moc.insert(0, 5).expect("insert");

    assert_eq!(moc.num_ranges(), 2);
    assert_eq!(moc.npix(), 25);
    assert!(moc.insert(5, 5).is_err());
    assert!(moc.insert(-1, 5).is_err());
}

#[test]
fn contains_pos_matches_pixels() {
    let grid = Grid::new(1024, Scheme::Nest).expect("grid");
    let moc = Moc::from_ranges(1024, &[(0, 4)]).expect("moc");

    // Directions of a covered and an uncovered pixel center.
    let inside = grid.pix2ang(2);
    let outside = grid.pix2ang(4);

    let result = moc
        .contains_pos(
            &[inside.theta, outside.theta],
            &[inside.phi, outside.phi],
            AngleFormat::THETA_PHI,
        )
        .expect("contains_pos");
    assert_eq!(result, [true, false]);
}

#[test]
fn contains_pos_broadcasts() {
    let moc = Moc::from_ranges(16, &[(0, 100)]).expect("moc");

    let result = moc
        .contains_pos(45., &[30., -30.], AngleFormat::LONLAT_DEG)
        .expect("contains_pos");
    assert_eq!(result.len(), 2);

    assert!(moc
        .contains_pos(&[1., 2., 3.], &[1., 2.], AngleFormat::LONLAT_DEG)
        .is_err());
    assert!(moc
        .contains_pos(0., 91., AngleFormat::LONLAT_DEG)
        .is_err());
}

#[test]
fn display_is_bounded() {
    let moc = Moc::from_ranges(16, &[(0, 4), (8, 12)]).expect("moc");
    let text = moc.to_string();
    assert!(text.starts_with("Moc(nside=16,"));
    assert!(text.contains("[0, 4)"));
    assert!(text.contains("[8, 12)"));

    // A map with many ranges prints only the first and last ten.
    let ranges: Vec<(i64, i64)> =
        (0..50).map(|i| (4 * i, 4 * i + 2)).collect();
    let big = Moc::from_ranges(64, &ranges).expect("moc");
    let text = big.to_string();
    assert!(text.contains("..."));
    assert!(text.contains("[0, 2)"));
    assert!(text.contains("[196, 198)"));
    assert!(!text.contains("[100, 102)"));
    assert_eq!(text.matches('[').count(), 21); // 20 ranges + the opening [
}
