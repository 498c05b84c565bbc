use std::fmt;

/// A simple type for integer ranges
///
/// All ranges follow the bed file range convention: 0-indexed, half-closed, [start,end)
///
/// This struct is used instead of the native rust Range type just to focus on the specific goals of
/// alignment block intervals, in either contig or reference coordinates.
///
#[derive(Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct IntRange {
    pub start: i64,
    pub end: i64,
}

impl IntRange {
    pub fn from_pair(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn size(&self) -> i64 {
        self.end - self.start
    }

    /// Return true if the ranges intersect (adjacency does not count)
    ///
    pub fn intersect_range(&self, other: &IntRange) -> bool {
        other.end > self.start && other.start < self.end
    }
}

impl fmt::Debug for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}-{})", self.start, self.end)
    }
}

/// Get the signed gap from range `ir1` to the following range `ir2`
///
/// The gap is positive when `ir2` starts after `ir1` ends, zero if the ranges are adjacent, and
/// negative when the ranges overlap.
///
///    [---------)            [-----------)
///        R1    -------------     R2
///                  gap
///
pub fn get_int_range_gap(ir1: &IntRange, ir2: &IntRange) -> i64 {
    ir2.start - ir1.end
}

/// Get the number of positions shared by two ranges
///
/// Returns zero if the ranges do not intersect
///
pub fn get_overlap_size(r1: &IntRange, r2: &IntRange) -> i64 {
    if !r1.intersect_range(r2) {
        return 0;
    }
    std::cmp::min(r1.end, r2.end) - std::cmp::max(r1.start, r2.start)
}

/// Total overlap between consecutive ranges after sorting on start position
///
/// Each range is only compared to its successor in start order, so for three or more mutually
/// overlapping ranges the overlap of the first and third range is not counted a second time.
///
pub fn get_consecutive_overlap_total(ranges: &[IntRange]) -> i64 {
    let mut sorted_ranges = ranges.to_vec();
    sorted_ranges.sort_by_key(|x| x.start);
    sorted_ranges
        .windows(2)
        .map(|w| get_overlap_size(&w[0], &w[1]))
        .sum()
}
