/*!
Symbolic sets of code points.

A [`CharSet`] never enumerates its members. It is a sorted list of disjoint,
non-adjacent inclusive ranges, so `[^a]` over the whole of Unicode costs two
ranges instead of a million code points.
*/

use core::fmt;

/// The largest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

const SURROGATES: CodeRange = CodeRange { start: 0xD800, end: 0xDFFF };

/// An inclusive range of code points.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CodeRange {
    pub start: u32,
    pub end: u32,
}

impl CodeRange {
    pub fn new(start: u32, end: u32) -> CodeRange {
        CodeRange { start, end }
    }

    pub fn contains(&self, cp: u32) -> bool {
        self.start <= cp && cp <= self.end
    }
}

impl fmt::Debug for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{:X}", self.start)
        } else {
            write!(f, "{:X}-{:X}", self.start, self.end)
        }
    }
}

/// An immutable set of code points.
///
/// A set may be *unknown*: the result of a construct whose membership
/// cannot be determined symbolically. Every operation involving an unknown
/// set yields an unknown set, and an unknown set contains nothing, so the
/// condition always surfaces to whoever consumes the result.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct CharSet {
    ranges: Vec<CodeRange>,
    unknown: bool,
}

impl CharSet {
    /// The empty set.
    pub fn empty() -> CharSet {
        CharSet { ranges: vec![], unknown: false }
    }

    /// A set whose membership cannot be modeled.
    pub fn unknown() -> CharSet {
        CharSet { ranges: vec![], unknown: true }
    }

    pub fn single(cp: u32) -> CharSet {
        CharSet::range(cp, cp)
    }

    /// The set `start..=end`, empty when `start > end`.
    pub fn range(start: u32, end: u32) -> CharSet {
        if start > end {
            return CharSet::empty();
        }
        CharSet { ranges: vec![CodeRange::new(start, end)], unknown: false }
    }

    /// Build a set from arbitrary, possibly overlapping, ranges. Ranges with
    /// `start > end` are ignored.
    pub fn from_ranges<I>(ranges: I) -> CharSet
    where
        I: IntoIterator<Item = CodeRange>,
    {
        let mut ranges: Vec<CodeRange> =
            ranges.into_iter().filter(|r| r.start <= r.end).collect();
        ranges.sort();
        let mut merged: Vec<CodeRange> = Vec::with_capacity(ranges.len());
        for r in ranges {
            match merged.last_mut() {
                Some(last) if r.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(r.end);
                }
                _ => merged.push(r),
            }
        }
        CharSet { ranges: merged, unknown: false }
    }

    pub fn is_empty(&self) -> bool {
        !self.unknown && self.ranges.is_empty()
    }

    pub fn is_unknown(&self) -> bool {
        self.unknown
    }

    /// The sorted, disjoint, non-adjacent ranges of this set.
    pub fn ranges(&self) -> &[CodeRange] {
        &self.ranges
    }

    pub fn contains(&self, cp: u32) -> bool {
        self.ranges
            .binary_search_by(|r| {
                if r.end < cp {
                    core::cmp::Ordering::Less
                } else if r.start > cp {
                    core::cmp::Ordering::Greater
                } else {
                    core::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn union(&self, other: &CharSet) -> CharSet {
        if self.unknown || other.unknown {
            return CharSet::unknown();
        }
        CharSet::from_ranges(
            self.ranges.iter().chain(other.ranges.iter()).copied(),
        )
    }

    pub fn intersect(&self, other: &CharSet) -> CharSet {
        if self.unknown || other.unknown {
            return CharSet::unknown();
        }
        let (mut i, mut j) = (0, 0);
        let mut ranges = vec![];
        while i < self.ranges.len() && j < other.ranges.len() {
            let (a, b) = (self.ranges[i], other.ranges[j]);
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start <= end {
                ranges.push(CodeRange::new(start, end));
            }
            if a.end < b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        CharSet { ranges, unknown: false }
    }

    pub fn subtract(&self, other: &CharSet) -> CharSet {
        if self.unknown || other.unknown {
            return CharSet::unknown();
        }
        let mut ranges = vec![];
        let mut j = 0;
        for &a in self.ranges.iter() {
            let mut start = a.start;
            let mut exhausted = false;
            while j < other.ranges.len() && other.ranges[j].end < start {
                j += 1;
            }
            let mut k = j;
            while k < other.ranges.len() && other.ranges[k].start <= a.end {
                let b = other.ranges[k];
                if b.start > start {
                    ranges.push(CodeRange::new(start, b.start - 1));
                }
                match b.end.checked_add(1) {
                    Some(next) if next <= a.end => start = next,
                    _ => {
                        exhausted = true;
                        break;
                    }
                }
                k += 1;
            }
            if !exhausted {
                ranges.push(CodeRange::new(start, a.end));
            }
        }
        CharSet { ranges, unknown: false }
    }

    /// The complement of this set relative to `min..=max`.
    pub fn complement(&self, min: u32, max: u32) -> CharSet {
        CharSet::range(min, max).subtract(self)
    }

    /// Returns a representative member of this set.
    ///
    /// Printable ASCII is preferred, then the smallest Unicode scalar
    /// value, so that witnesses built from samples read naturally.
    pub fn sample(&self) -> Option<u32> {
        let printable = self.intersect(&CharSet::range(0x21, 0x7E));
        if let Some(r) = printable.ranges.first() {
            return Some(r.start);
        }
        if self.contains(0x20) {
            return Some(0x20);
        }
        for r in self.ranges.iter() {
            if !SURROGATES.contains(r.start) {
                return Some(r.start);
            }
            if r.end > SURROGATES.end {
                return Some(SURROGATES.end + 1);
            }
        }
        self.ranges.first().map(|r| r.start)
    }

    /// Add the other case of every ASCII letter in this set.
    pub fn case_fold_ascii(&self) -> CharSet {
        if self.unknown {
            return CharSet::unknown();
        }
        let upper = self.intersect(&CharSet::range(b'A' as u32, b'Z' as u32));
        let lower = self.intersect(&CharSet::range(b'a' as u32, b'z' as u32));
        let shifted = upper
            .ranges
            .iter()
            .map(|r| CodeRange::new(r.start + 32, r.end + 32))
            .chain(
                lower.ranges.iter().map(|r| CodeRange::new(r.start - 32, r.end - 32)),
            );
        CharSet::from_ranges(self.ranges.iter().copied().chain(shifted))
    }
}

impl fmt::Debug for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unknown {
            return write!(f, "CharSet(unknown)");
        }
        f.debug_set().entries(self.ranges.iter()).finish()
    }
}

/// Split the union of the given sets into the fewest disjoint ranges such
/// that every input set is a union of some of the output ranges.
///
/// Code points covered by none of the inputs are left out. Unknown sets
/// contribute nothing.
pub fn partition<'a, I>(sets: I) -> Vec<CodeRange>
where
    I: IntoIterator<Item = &'a CharSet>,
{
    partition_ranges(
        sets.into_iter()
            .filter(|set| !set.unknown)
            .flat_map(|set| set.ranges.iter().copied()),
    )
}

/// Like [`partition`], over loose ranges that may overlap.
pub fn partition_ranges<I>(ranges: I) -> Vec<CodeRange>
where
    I: IntoIterator<Item = CodeRange>,
{
    let ranges: Vec<CodeRange> = ranges.into_iter().collect();
    let mut bounds: Vec<u64> = Vec::with_capacity(ranges.len() * 2);
    for r in ranges.iter() {
        bounds.push(u64::from(r.start));
        bounds.push(u64::from(r.end) + 1);
    }
    let covered = CharSet::from_ranges(ranges);
    bounds.sort_unstable();
    bounds.dedup();
    let mut out = vec![];
    for w in bounds.windows(2) {
        // Every bound is at most u32::MAX + 1, so `w[1] - 1` fits.
        let (start, end) = (w[0] as u32, (w[1] - 1) as u32);
        if covered.contains(start) {
            out.push(CodeRange::new(start, end));
        }
    }
    out
}

/// Shorthand character types, ASCII semantics.
pub(crate) fn char_type(code: char, min: u32, max: u32) -> Option<CharSet> {
    let digit = || CharSet::range(b'0' as u32, b'9' as u32);
    let word = || {
        CharSet::from_ranges([
            CodeRange::new(b'0' as u32, b'9' as u32),
            CodeRange::new(b'A' as u32, b'Z' as u32),
            CodeRange::new(b'_' as u32, b'_' as u32),
            CodeRange::new(b'a' as u32, b'z' as u32),
        ])
    };
    let space = || {
        CharSet::from_ranges([
            CodeRange::new(0x09, 0x0D),
            CodeRange::new(0x20, 0x20),
        ])
    };
    let set = match code {
        'd' => digit(),
        'D' => digit().complement(min, max),
        'w' => word(),
        'W' => word().complement(min, max),
        's' => space(),
        'S' => space().complement(min, max),
        _ => return None,
    };
    Some(set.intersect(&CharSet::range(min, max)))
}
