use super::*;

fn set(ranges: &[(i64, i64)]) -> RangeSet {
    ranges.iter().copied().collect()
}

#[test]
fn append_grows_and_coalesces() {
    let mut s = RangeSet::new();
    s.append(2, 5).expect("append");
    s.append(5, 8).expect("adjacent append");
    s.append(10, 11).expect("gap append");

    assert_eq!(s, set(&[(2, 8), (10, 11)]));
    assert_eq!(s.npix(), 7);
    assert_eq!(s.num_ranges(), 2);
}

#[test]
fn append_rejects_bad_ranges() {
    let mut s = RangeSet::new();
    s.append(2, 5).expect("append");

    assert!(s.append(5, 5).is_err());
    assert!(s.append(6, 5).is_err());
    assert!(s.append(4, 8).is_err());
    // The failed appends must leave the set untouched.
    assert_eq!(s, set(&[(2, 5)]));
}

#[test]
fn append_single() {
    let mut s = RangeSet::new();
    s.append_single(3).expect("append");
    s.append_single(4).expect("append");
    s.append_single(9).expect("append");

    assert_eq!(s, set(&[(3, 5), (9, 10)]));
}

#[test]
fn add_merges_overlaps() {
    let mut s = set(&[(10, 20), (40, 50)]);

    s.add(15, 45).expect("add");
    assert_eq!(s, set(&[(10, 50)]));

    let mut s = set(&[(10, 20), (40, 50)]);
    s.add(0, 5).expect("add");
    s.add(20, 25).expect("add");
    s.add(60, 61).expect("add");
    assert_eq!(s, set(&[(0, 5), (10, 25), (40, 50), (60, 61)]));

    assert!(s.add(7, 7).is_err());
}

#[test]
fn add_is_order_independent() {
    let mut forward = RangeSet::new();
    let mut backward = RangeSet::new();
    let ranges = [(0, 4), (16, 20), (4, 8), (30, 34), (7, 17)];

    for &(lo, hi) in &ranges {
        forward.add(lo, hi).expect("add");
    }
    for &(lo, hi) in ranges.iter().rev() {
        backward.add(lo, hi).expect("add");
    }

    assert_eq!(forward, backward);
    assert_eq!(forward, set(&[(0, 20), (30, 34)]));
}

#[test]
fn iiv_and_contains() {
    let s = set(&[(2, 5), (8, 10)]);

    assert_eq!(s.iiv(1), -1);
    assert_eq!(s.iiv(2), 0);
    assert_eq!(s.iiv(4), 0);
    assert_eq!(s.iiv(5), 1);
    assert_eq!(s.iiv(7), 1);
    assert_eq!(s.iiv(8), 2);
    assert_eq!(s.iiv(100), 3);

    for v in [2, 3, 4, 8, 9] {
        assert!(s.contains(v), "{v} in set");
    }
    for v in [-1, 0, 1, 5, 6, 7, 10, 11] {
        assert!(!s.contains(v), "{v} not in set");
    }
}

#[test]
fn set_operations() {
    let a = set(&[(0, 10), (20, 30)]);
    let b = set(&[(5, 25), (40, 50)]);

    assert_eq!(a.union(&b), set(&[(0, 30), (40, 50)]));
    assert_eq!(a.intersection(&b), set(&[(5, 10), (20, 25)]));
    assert_eq!(a.difference(&b), set(&[(0, 5), (25, 30)]));
    assert_eq!(b.difference(&a), set(&[(10, 20), (40, 50)]));

    // |A ∪ B| + |A ∩ B| == |A| + |B|
    assert_eq!(
        a.union(&b).npix() + a.intersection(&b).npix(),
        a.npix() + b.npix()
    );
}

#[test]
fn set_operations_with_empty() {
    let a = set(&[(0, 10)]);
    let empty = RangeSet::new();

    assert_eq!(a.union(&empty), a);
    assert_eq!(a.intersection(&empty), empty);
    assert_eq!(a.difference(&empty), a);
    assert_eq!(empty.difference(&a), empty);
}

#[test]
fn union_merges_adjacent() {
    let a = set(&[(0, 4)]);
    let b = set(&[(4, 8)]);

    assert_eq!(a.union(&b), set(&[(0, 8)]));
}

#[test]
fn fill_buffer_lists_members() {
    let s = set(&[(2, 5), (8, 10)]);
    let mut buf = vec![0; s.npix() as usize];

    s.fill_buffer(&mut buf);
    assert_eq!(buf, [2, 3, 4, 8, 9]);
    assert_eq!(s.to_vec(), buf);
}

#[test]
fn display_is_compact() {
    let s = set(&[(2, 5), (8, 10)]);
    assert_eq!(s.to_string(), "[[2, 5), [8, 10)]");
    assert_eq!(RangeSet::new().to_string(), "[]");
}
