//! Strand-aware interval sets with provenance tags.
//!
//! A `Location` is an ordered list of half-open parts `[start, end)`.  Its length is the sum
//! of its part lengths, never the distance between the outermost boundaries.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

mod error;
pub mod sweep;
pub mod tags;

pub use error::Error;
pub use sweep::{intersection, merge, symmetric_difference, union, union_labeled};
pub use tags::{TagValue, Tags};

/// Orientation of a genomic interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    /// `+1`
    Forward,
    /// `-1`
    Reverse,
}

impl Strand {
    pub fn as_i8(self) -> i8 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }
}

impl TryFrom<i8> for Strand {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Strand::Forward),
            -1 => Ok(Strand::Reverse),
            _ => Err(Error::InvalidStrand(value)),
        }
    }
}

/// Helper for error messages.
pub(crate) fn strand_code(strand: Option<Strand>) -> Option<i8> {
    strand.map(Strand::as_i8)
}

/// Whether parts of a location with this strand are walked back to front.
pub(crate) fn is_reverse(strand: Option<Strand>) -> bool {
    strand == Some(Strand::Reverse)
}

/// A single half-open interval `[start, end)` with optional strand and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationPart {
    pub start: i64,
    pub end: i64,
    pub strand: Option<Strand>,
    pub tags: Tags,
}

impl LocationPart {
    pub fn new(start: i64, end: i64, strand: Option<Strand>) -> Self {
        Self {
            start,
            end,
            strand,
            tags: Tags::new(),
        }
    }

    /// Builder-style tag insertion.
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TagValue>,
    {
        self.tags.insert(key, value);
        self
    }

    pub fn length(&self) -> i64 {
        self.end - self.start
    }

    /// Whether both boundaries of `inner` lie within `[self.start, self.end]`.
    ///
    /// NB: the upper bound is inclusive, unlike the half-open semantics everywhere else.  A
    /// zero-length part sitting on `self.end` is considered contained.
    pub fn contains(&self, inner: &LocationPart) -> bool {
        self.start <= inner.start
            && inner.start <= self.end
            && self.start <= inner.end
            && inner.end <= self.end
    }

    /// Total order by `(start, end)`.
    pub fn cmp_position(&self, other: &LocationPart) -> Ordering {
        (self.start, self.end).cmp(&(other.start, other.end))
    }

    /// Compare coordinates, strand and tags.
    pub fn eq_with_tags(&self, other: &LocationPart) -> bool {
        self == other && self.tags == other.tags
    }
}

/// Coordinates and strand only; tags are compared by `eq_with_tags()`.
impl PartialEq for LocationPart {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end && self.strand == other.strand
    }
}

impl Eq for LocationPart {}

/// Ordered sequence of location parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub parts: Vec<LocationPart>,
}

impl Location {
    pub fn new(parts: Vec<LocationPart>) -> Self {
        Self { parts }
    }

    /// Build an untagged location from `(start, end)` pairs.
    pub fn from_ranges(ranges: &[(i64, i64)], strand: Option<Strand>) -> Self {
        ranges
            .iter()
            .map(|&(start, end)| LocationPart::new(start, end, strand))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn length(&self) -> i64 {
        self.parts.iter().map(LocationPart::length).sum()
    }

    /// Stable sort by `(start, end)`.
    pub fn sort(&mut self) {
        self.parts.sort_by(LocationPart::cmp_position);
    }

    /// Whether every part of `other` is contained in some part of `self`.
    ///
    /// Parts of `self` are not merged first, so a part of `other` spanning two touching parts
    /// of `self` is not contained.
    pub fn contains(&self, other: &Location) -> bool {
        other
            .parts
            .iter()
            .all(|inner| self.parts.iter().any(|outer| outer.contains(inner)))
    }

    /// Strand shared by all parts, `None` for empty or unstranded locations.
    pub fn strand(&self) -> Result<Option<Strand>, Error> {
        let Some(first) = self.parts.first() else {
            return Ok(None);
        };
        let strand = first.strand;
        if let Some((idx, part)) = self
            .parts
            .iter()
            .enumerate()
            .find(|(_, part)| part.strand != strand)
        {
            return Err(Error::MixedStrand(
                idx,
                strand_code(part.strand),
                strand_code(strand),
            ));
        }
        Ok(strand)
    }

    /// Iterate parts in transcription order, i.e., back to front on the reverse strand.
    pub(crate) fn indices_in_strand_order(&self, strand: Option<Strand>) -> Vec<usize> {
        if is_reverse(strand) {
            (0..self.parts.len()).rev().collect()
        } else {
            (0..self.parts.len()).collect()
        }
    }

    /// Compare coordinates, strand and tags of all parts.
    pub fn eq_with_tags(&self, other: &Location) -> bool {
        self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(other.parts.iter())
                .all(|(lhs, rhs)| lhs.eq_with_tags(rhs))
    }
}

impl FromIterator<LocationPart> for Location {
    fn from_iter<I: IntoIterator<Item = LocationPart>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let strand = match part.strand {
                Some(Strand::Forward) => "+",
                Some(Strand::Reverse) => "-",
                None => ".",
            };
            write!(f, "{}..{}({})", part.start, part.end, strand)?;
        }
        write!(f, "]")
    }
}

/// Single part spanning all boundaries of `parts`, with the strand of the first part.
pub fn bounding_box(parts: &[LocationPart]) -> Location {
    let Some(first) = parts.first() else {
        return Location::default();
    };
    let (min_pos, max_pos) = parts.iter().fold((first.start, first.start), |(lo, hi), p| {
        (lo.min(p.start).min(p.end), hi.max(p.start).max(p.end))
    });
    Location::new(vec![LocationPart::new(min_pos, max_pos, first.strand)])
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{bounding_box, Error, Location, LocationPart, Strand};

    #[test]
    fn length_sums_parts() {
        let loc = Location::from_ranges(&[(0, 3), (10, 12), (1, 2)], None);
        assert_eq!(loc.length(), 6);
        assert_eq!(Location::default().length(), 0);
    }

    #[test]
    fn contains_is_inclusive() {
        let outer = LocationPart::new(5, 10, None);
        assert!(outer.contains(&LocationPart::new(5, 10, None)));
        assert!(outer.contains(&LocationPart::new(10, 10, None)));
        assert!(outer.contains(&LocationPart::new(5, 5, None)));
        assert!(!outer.contains(&LocationPart::new(4, 6, None)));
        assert!(!outer.contains(&LocationPart::new(9, 11, None)));
    }

    #[test]
    fn location_contains_is_per_part() {
        let outer = Location::from_ranges(&[(0, 5), (5, 10)], None);
        assert!(outer.contains(&Location::from_ranges(&[(1, 2), (6, 9)], None)));
        // Spans the touching parts, which are not merged.
        assert!(!outer.contains(&Location::from_ranges(&[(3, 7)], None)));
        assert!(outer.contains(&Location::default()));
    }

    #[test]
    fn sort_is_idempotent() {
        let mut loc = Location::from_ranges(&[(5, 6), (0, 3), (0, 2), (4, 9)], None);
        loc.sort();
        let once = loc.clone();
        loc.sort();

        assert_eq!(loc, once);
        assert_eq!(
            loc,
            Location::from_ranges(&[(0, 2), (0, 3), (4, 9), (5, 6)], None)
        );
    }

    #[test]
    fn equality_ignores_tags_unless_requested() {
        let lhs = Location::new(vec![LocationPart::new(0, 1, None).with_tag("a_id", 0i64)]);
        let rhs = Location::new(vec![LocationPart::new(0, 1, None).with_tag("a_id", 1i64)]);

        assert_eq!(lhs, rhs);
        assert!(!lhs.eq_with_tags(&rhs));
        assert!(lhs.eq_with_tags(&lhs.clone()));
        assert_ne!(
            lhs,
            Location::new(vec![LocationPart::new(0, 1, Some(Strand::Forward))])
        );
    }

    #[test]
    fn strand_consistency() {
        assert_eq!(Location::default().strand(), Ok(None));
        assert_eq!(
            Location::from_ranges(&[(0, 1), (2, 3)], Some(Strand::Reverse)).strand(),
            Ok(Some(Strand::Reverse))
        );

        let mixed = Location::new(vec![
            LocationPart::new(0, 1, Some(Strand::Forward)),
            LocationPart::new(2, 3, Some(Strand::Reverse)),
        ]);
        assert_eq!(mixed.strand(), Err(Error::MixedStrand(1, Some(-1), Some(1))));
    }

    #[test]
    fn strand_from_i8() {
        assert_eq!(Strand::try_from(1i8), Ok(Strand::Forward));
        assert_eq!(Strand::try_from(-1i8), Ok(Strand::Reverse));
        assert!(Strand::try_from(0i8).is_err());
    }

    #[test]
    fn bounding_box_spans_all() {
        let parts = Location::from_ranges(&[(5, 8), (1, 2), (12, 20)], Some(Strand::Reverse)).parts;
        assert_eq!(
            bounding_box(&parts),
            Location::from_ranges(&[(1, 20)], Some(Strand::Reverse))
        );
        assert_eq!(bounding_box(&[]), Location::default());
    }

    #[test]
    fn display() {
        let loc = Location::from_ranges(&[(0, 3), (5, 6)], Some(Strand::Forward));
        assert_eq!(format!("{}", loc), "[0..3(+), 5..6(+)]");
    }
}
