//! Ordered set of disjoint half-open integer intervals.

use crate::error::InvalidRange;
use std::fmt;

/// A sorted set of disjoint half-open intervals of pixel identifiers.
///
/// The set is stored as a single contiguous buffer of interval endpoints
/// `e0 < e1 < ... < e(2k-1)` representing `[e0, e1) ∪ [e2, e3) ∪ ...`,
/// which keeps lookups cache-friendly and binary-searchable.
///
/// # Example
///
/// ```
/// use hpgeo::RangeSet;
///
/// let mut set = RangeSet::new();
/// set.append(0, 4)?;
/// set.append(4, 6)?; // coalesces with [0, 4)
/// set.append(10, 12)?;
///
/// assert_eq!(set.npix(), 8);
/// assert_eq!(set.num_ranges(), 2);
/// assert!(set.contains(5));
/// assert!(!set.contains(7));
/// # Ok::<(), hpgeo::error::InvalidRange>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeSet {
    /// Interval endpoints; always even in count and strictly increasing.
    endpoints: Vec<i64>,
}

impl RangeSet {
    /// Initializes a new empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            endpoints: Vec::new(),
        }
    }

    /// Initializes a new empty set with room for `n` intervals.
    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self {
            endpoints: Vec::with_capacity(2 * n),
        }
    }

    /// Returns true when the set holds no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Number of disjoint intervals in the set.
    #[must_use]
    pub fn num_ranges(&self) -> usize {
        self.endpoints.len() / 2
    }

    /// Number of values in the set (sum of the interval widths).
    #[must_use]
    pub fn npix(&self) -> i64 {
        self.endpoints
            .chunks_exact(2)
            .map(|range| range[1] - range[0])
            .sum()
    }

    /// Removes every value from the set, keeping the allocation.
    pub fn clear(&mut self) {
        self.endpoints.clear();
    }

    /// Appends the interval `[start, end)` at the tail of the set.
    ///
    /// The interval must not be empty and must start at or after the
    /// current last endpoint; an interval starting exactly there is
    /// coalesced with the last one.
    ///
    /// # Errors
    ///
    /// [`InvalidRange`] when `start >= end` or the interval overlaps the
    /// existing tail.
    pub fn append(&mut self, start: i64, end: i64) -> Result<(), InvalidRange> {
        if start >= end {
            return Err(InvalidRange::new(start, "range start must be < end"));
        }
        if let Some(&last) = self.endpoints.last() {
            if start < last {
                return Err(InvalidRange::new(
                    start,
                    "range must start at or after the current last endpoint",
                ));
            }
        }
        self.push(start, end);

        Ok(())
    }

    /// Appends the single value `v` at the tail of the set.
    ///
    /// # Errors
    ///
    /// [`InvalidRange`] when `v` is below the current last endpoint.
    pub fn append_single(&mut self, v: i64) -> Result<(), InvalidRange> {
        self.append(v, v + 1)
    }

    /// Infallible append for internal callers that produce ordered output.
    pub(crate) fn push(&mut self, start: i64, end: i64) {
        debug_assert!(start < end);
        debug_assert!(self.endpoints.last().is_none_or(|&last| start >= last));

        if self.endpoints.last() == Some(&start) {
            // Coalesce with the previous interval.
            self.endpoints.pop();
            self.endpoints.push(end);
        } else {
            self.endpoints.push(start);
            self.endpoints.push(end);
        }
    }

    /// Infallible single-value append for internal callers.
    pub(crate) fn push_single(&mut self, v: i64) {
        self.push(v, v + 1);
    }

    /// Inserts the interval `[start, end)` anywhere in the set, merging
    /// overlapping and adjacent intervals.
    ///
    /// Runs a binary-search locate followed by a linear splice of the
    /// covered endpoints.
    ///
    /// # Errors
    ///
    /// [`InvalidRange`] when `start >= end`.
    pub fn add(&mut self, start: i64, end: i64) -> Result<(), InvalidRange> {
        if start >= end {
            return Err(InvalidRange::new(start, "range start must be < end"));
        }
        // Fast path: strictly growing inserts degrade to appends.
        if self.endpoints.last().is_none_or(|&last| start >= last) {
            self.push(start, end);
            return Ok(());
        }

        let i = self.endpoints.partition_point(|&e| e < start);
        let j = self.endpoints.partition_point(|&e| e <= end);

        // Odd positions mean the bound falls inside an existing interval:
        // extend to that interval's own endpoint.
        let lo = if i % 2 == 1 { self.endpoints[i - 1] } else { start };
        let hi = if j % 2 == 1 { self.endpoints[j] } else { end };

        self.endpoints
            .splice((i - i % 2)..(j + j % 2), [lo, hi])
            .for_each(drop);
        self.check_invariants();

        Ok(())
    }

    /// Index of the greatest endpoint ≤ `v`, or −1 when all endpoints
    /// exceed `v`.
    ///
    /// A value is a member of the set iff the returned index is
    /// non-negative, at most `2 * num_ranges() − 2`, and even.
    #[must_use]
    pub fn iiv(&self, v: i64) -> i64 {
        self.endpoints.partition_point(|&e| e <= v) as i64 - 1
    }

    /// Returns true when `v` is a member of the set.
    #[must_use]
    pub fn contains(&self, v: i64) -> bool {
        let index = self.iiv(v);

        index >= 0
            && index <= self.endpoints.len() as i64 - 2
            && index % 2 == 0
    }

    /// Iterates over the disjoint intervals as `(start, end)` pairs.
    pub fn ranges(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.endpoints
            .chunks_exact(2)
            .map(|range| (range[0], range[1]))
    }

    /// Writes every value of the set into `dst` in ascending order.
    ///
    /// The caller sizes `dst` to [`Self::npix`]; extra capacity is left
    /// untouched and a too-small buffer is filled up to its length.
    pub fn fill_buffer(&self, dst: &mut [i64]) {
        let mut out = dst.iter_mut();
        'ranges: for (start, end) in self.ranges() {
            for v in start..end {
                match out.next() {
                    Some(slot) => *slot = v,
                    None => break 'ranges,
                }
            }
        }
    }

    /// Collects every value of the set into a new vector, ascending.
    #[must_use]
    pub fn to_vec(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(usize::try_from(self.npix()).unwrap_or(0));
        for (start, end) in self.ranges() {
            out.extend(start..end);
        }
        out
    }

    /// Computes the union of two sets.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.merge(other, |a, b| a || b)
    }

    /// Computes the intersection of two sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.merge(other, |a, b| a && b)
    }

    /// Computes the difference `self − other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.merge(other, |a, b| a && !b)
    }

    /// Merge-walk over the sorted endpoints of both sets, keeping the
    /// stretches where `op(in_self, in_other)` holds.
    fn merge(&self, other: &Self, op: impl Fn(bool, bool) -> bool) -> Self {
        let a = &self.endpoints;
        let b = &other.endpoints;
        let mut out = Self::new();
        let (mut ia, mut ib) = (0, 0);
        let (mut in_a, mut in_b) = (false, false);
        let mut state = false;

        while ia < a.len() || ib < b.len() {
            let va = a.get(ia).copied().unwrap_or(i64::MAX);
            let vb = b.get(ib).copied().unwrap_or(i64::MAX);
            let v = va.min(vb);
            // Endpoints shared by both sets must toggle together before
            // the predicate is evaluated.
            if va == v {
                in_a = !in_a;
                ia += 1;
            }
            if vb == v {
                in_b = !in_b;
                ib += 1;
            }
            let next = op(in_a, in_b);
            if next != state {
                out.endpoints.push(v);
                state = next;
            }
        }
        out.check_invariants();

        out
    }

    fn check_invariants(&self) {
        debug_assert!(self.endpoints.len() % 2 == 0);
        debug_assert!(self.endpoints.windows(2).all(|w| w[0] < w[1]));
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (start, end)) in self.ranges().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{start}, {end})")?;
        }
        write!(f, "]")
    }
}

impl FromIterator<(i64, i64)> for RangeSet {
    /// Builds a set from arbitrary intervals, merging as needed.
    ///
    /// Empty intervals are skipped.
    fn from_iter<T: IntoIterator<Item = (i64, i64)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (start, end) in iter {
            if start < end {
                // Infallible: emptiness is the only failure left.
                let _ = set.add(start, end);
            }
        }
        set
    }
}

#[cfg(test)]
#[path = "./rangeset_tests.rs"]
mod tests;
