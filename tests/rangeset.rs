//! Randomized range-set checks against a naive membership model.

use hpgeo::RangeSet;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeSet;

const DOMAIN: i64 = 400;

fn model_of(set: &RangeSet) -> BTreeSet<i64> {
    let mut buf = vec![0; set.npix() as usize];
    set.fill_buffer(&mut buf);
    buf.into_iter().collect()
}

fn random_set(rng: &mut StdRng, inserts: usize) -> (RangeSet, BTreeSet<i64>) {
    let mut set = RangeSet::new();
    let mut model = BTreeSet::new();
    for _ in 0..inserts {
        let lo = rng.random_range(0..DOMAIN);
        let hi = lo + rng.random_range(1..40);
        set.add(lo, hi).expect("add");
        model.extend(lo..hi);
    }
    (set, model)
}

#[test]
fn add_agrees_with_model() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..50 {
        let (set, model) = random_set(&mut rng, 30);

        assert_eq!(set.npix(), model.len() as i64);
        assert_eq!(model_of(&set), model);
        for v in -1..=DOMAIN + 40 {
            assert_eq!(set.contains(v), model.contains(&v), "value {v}");
        }
    }
}

#[test]
fn set_algebra_agrees_with_model() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..50 {
        let (a, ma) = random_set(&mut rng, 20);
        let (b, mb) = random_set(&mut rng, 20);

        assert_eq!(
            model_of(&a.union(&b)),
            ma.union(&mb).copied().collect()
        );
        assert_eq!(
            model_of(&a.intersection(&b)),
            ma.intersection(&mb).copied().collect()
        );
        assert_eq!(
            model_of(&a.difference(&b)),
            ma.difference(&mb).copied().collect()
        );

        // Cardinality identity.
        assert_eq!(
            a.union(&b).npix() + a.intersection(&b).npix(),
            a.npix() + b.npix()
        );
    }
}

#[test]
fn iiv_membership_parity() {
    let mut rng = StdRng::seed_from_u64(3);
    let (set, model) = random_set(&mut rng, 25);
    let size = 2 * set.num_ranges() as i64;

    for v in -1..=DOMAIN + 40 {
        let index = set.iiv(v);
        let member =
            index >= 0 && index <= size - 2 && index % 2 == 0;
        assert_eq!(member, model.contains(&v));
    }
}

#[test]
fn append_equals_add_for_sorted_input() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut ranges: Vec<(i64, i64)> = (0..20)
        .map(|_| {
            let lo = rng.random_range(0..DOMAIN);
            (lo, lo + rng.random_range(1..10))
        })
        .collect();
    ranges.sort_unstable();

    let mut appended = RangeSet::new();
    let mut added = RangeSet::new();
    let mut tail = 0;
    for &(lo, hi) in &ranges {
        added.add(lo, hi).expect("add");
        // Clip to keep the strict append precondition.
        let lo = lo.max(tail);
        if lo < hi {
            appended.append(lo, hi).expect("append");
            tail = hi;
        }
    }
    assert_eq!(model_of(&appended), model_of(&added));
}
