//! Coordinate handling for the triplicated reference representation
//!
//! Each circular reference is represented upstream as its sequence concatenated three times, so
//! an alignment wrapping the origin is still reported as a single contiguous block. All
//! coordinates from the aligner are in this tripled space and are folded back to the canonical
//! reference here.
//!

use std::collections::BTreeSet;

use crate::int_range::IntRange;

/// Fold a coordinate on the triplicated reference back to the true reference length
///
/// Segment boundaries are inclusive at the top, so `ref_len` and `2 * ref_len` both map to
/// `ref_len` rather than 0.
///
pub fn adjust_reference_coord(coord: i64, ref_len: i64) -> i64 {
    if coord <= ref_len {
        coord
    } else if coord <= 2 * ref_len {
        coord - ref_len
    } else {
        coord - 2 * ref_len
    }
}

/// Fold a triplicated reference range into canonical coordinates
///
/// Start and end are adjusted independently, so a range wrapping the origin can produce an end
/// below its start.
///
pub fn adjust_reference_range(range: &IntRange, ref_len: i64) -> IntRange {
    IntRange::from_pair(
        adjust_reference_coord(range.start, ref_len),
        adjust_reference_coord(range.end, ref_len),
    )
}

/// Fold the position of a single base on the triplicated reference into canonical coordinates
///
/// The fold of the base at `ref_len` is the same circular position as 0, so this always returns a
/// value in [0, ref_len).
///
pub fn get_canonical_base_pos(pos: i64, ref_len: i64) -> i64 {
    let x = adjust_reference_coord(pos, ref_len);
    if x == ref_len { 0 } else { x }
}

/// The set of canonical reference positions covered by at least one alignment block
///
/// Every base of every block is individually projected into canonical space, which handles all
/// wrap-around cases exactly at a cost proportional to the total aligned span.
///
#[derive(Default)]
pub struct CoveredBases {
    ref_len: i64,
    bases: BTreeSet<i64>,
}

impl CoveredBases {
    pub fn new(ref_len: i64) -> Self {
        Self {
            ref_len,
            bases: BTreeSet::new(),
        }
    }

    /// Build the covered base set from alignment blocks given in triplicated coordinates
    pub fn from_ranges<'a>(ref_len: i64, ranges: impl IntoIterator<Item = &'a IntRange>) -> Self {
        let mut x = Self::new(ref_len);
        for range in ranges {
            x.add_range(range);
        }
        x
    }

    /// Add all bases of a block given in triplicated reference coordinates
    ///
    pub fn add_range(&mut self, range: &IntRange) {
        if self.ref_len <= 0 {
            return;
        }
        for base in range.start..range.end {
            self.bases.insert(get_canonical_base_pos(base, self.ref_len));
        }
    }

    pub fn ref_len(&self) -> i64 {
        self.ref_len
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Iterate through covered positions in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.bases.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_reference_coord_boundaries() {
        let ref_len = 100;
        assert_eq!(adjust_reference_coord(0, ref_len), 0);
        assert_eq!(adjust_reference_coord(99, ref_len), 99);
        assert_eq!(adjust_reference_coord(100, ref_len), 100);
        assert_eq!(adjust_reference_coord(101, ref_len), 1);
        assert_eq!(adjust_reference_coord(199, ref_len), 99);
        assert_eq!(adjust_reference_coord(200, ref_len), 100);
        assert_eq!(adjust_reference_coord(201, ref_len), 1);
        assert_eq!(adjust_reference_coord(299, ref_len), 99);
    }

    #[test]
    fn test_adjust_reference_coord_canonical_idempotent() {
        let ref_len = 37;
        for c in 0..ref_len {
            assert_eq!(adjust_reference_coord(c, ref_len), c);
            let once = adjust_reference_coord(c, ref_len);
            assert_eq!(adjust_reference_coord(once, ref_len), once);
        }
    }

    #[test]
    fn test_adjust_reference_coord_range() {
        let ref_len = 37;
        for c in 0..(3 * ref_len) {
            let x = adjust_reference_coord(c, ref_len);
            assert!((0..=ref_len).contains(&x), "coord {c} adjusted to {x}");
            if c % ref_len != 0 {
                assert!(x < ref_len);
            }
        }
    }

    #[test]
    fn test_get_canonical_base_pos() {
        let ref_len = 100;
        assert_eq!(get_canonical_base_pos(0, ref_len), 0);
        assert_eq!(get_canonical_base_pos(100, ref_len), 0);
        assert_eq!(get_canonical_base_pos(200, ref_len), 0);
        assert_eq!(get_canonical_base_pos(250, ref_len), 50);
        for c in 0..(3 * ref_len) {
            assert!((0..ref_len).contains(&get_canonical_base_pos(c, ref_len)));
        }
    }

    #[test]
    fn test_adjust_reference_range_wrap() {
        let range = IntRange::from_pair(90, 120);
        assert_eq!(
            adjust_reference_range(&range, 100),
            IntRange::from_pair(90, 20)
        );
    }

    #[test]
    fn test_covered_bases_wrap() {
        // Block wraps the origin of a 100bp reference in tripled space
        let ranges = [IntRange::from_pair(95, 105)];
        let covered = CoveredBases::from_ranges(100, &ranges);
        let bases = covered.iter().copied().collect::<Vec<_>>();
        assert_eq!(bases, vec![0, 1, 2, 3, 4, 95, 96, 97, 98, 99]);
    }

    #[test]
    fn test_covered_bases_never_exceed_ref_len() {
        let ranges = [IntRange::from_pair(0, 300)];
        let covered = CoveredBases::from_ranges(100, &ranges);
        assert_eq!(covered.len(), 100);
    }

    #[test]
    fn test_covered_bases_repeat_copies_merge() {
        // The same canonical interval seen on the first and second copies
        let ranges = [IntRange::from_pair(10, 20), IntRange::from_pair(110, 120)];
        let covered = CoveredBases::from_ranges(100, &ranges);
        assert_eq!(covered.len(), 10);
    }
}
