//! Piecewise-linear coordinate maps.

use serde::{Deserialize, Serialize};

use super::Error;
use crate::location::Location;

/// Maps source positions `[src_start, src_end)` linearly onto `dst_start + (pos - src_start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConvertSegment {
    pub src_start: i64,
    pub src_end: i64,
    pub dst_start: i64,
}

impl ConvertSegment {
    pub fn new(src_start: i64, src_end: i64, dst_start: i64) -> Self {
        Self {
            src_start,
            src_end,
            dst_start,
        }
    }

    pub fn length(&self) -> i64 {
        self.src_end - self.src_start
    }
}

/// Segments mapping genomic positions covered by `loc` onto the concatenation of its parts.
///
/// Parts are laid out in transcription order, so on the reverse strand the part with the
/// highest coordinates starts at local position 0.  The parts of `loc` itself are not
/// reordered.
pub fn get_convert_to_local_segments(loc: &Location) -> Result<Vec<ConvertSegment>, Error> {
    let strand = loc.strand()?;
    let mut sorted = loc.clone();
    sorted.sort();

    let mut current_len = 0;
    let mut result = Vec::with_capacity(sorted.parts.len());
    for idx in sorted.indices_in_strand_order(strand) {
        let part = &sorted.parts[idx];
        result.push(ConvertSegment::new(part.start, part.end, current_len));
        current_len += part.length();
    }
    Ok(result)
}

/// Segments mapping query positions onto columns of an aligned query string.
///
/// `aligned` is the query row of an alignment starting at query position `src_from`, with `-`
/// marking gaps.  A leading segment maps `[0, src_from)` in front of the alignment.  Each
/// maximal gap-free run gets its own segment; the last one extends to `src_len` so that query
/// positions beyond the aligned region still project past the alignment end.
pub fn get_alignment_segments(aligned: &str, src_from: i64, src_len: i64) -> Vec<ConvertSegment> {
    let mut segments = vec![ConvertSegment::new(0, src_from, -src_from)];

    let mut src_pos = src_from;
    let mut dst_pos = 0;
    let mut src_start = src_pos;
    let mut dst_start = dst_pos;
    let mut in_gap = true;
    for c in aligned.chars() {
        if c != '-' {
            if in_gap {
                src_start = src_pos;
                dst_start = dst_pos;
            }
            src_pos += 1;
        } else if !in_gap {
            segments.push(ConvertSegment::new(src_start, src_pos, dst_start));
            src_start = src_pos;
            dst_start = dst_pos;
        }
        dst_pos += 1;
        in_gap = c == '-';
    }
    if in_gap {
        dst_start = dst_pos;
    }
    segments.push(ConvertSegment::new(src_start, src_len, dst_start));

    log::trace!(
        "{} alignment segments for {} columns",
        segments.len(),
        dst_pos
    );
    segments
}

/// Check that segments have non-negative length and ascending, non-overlapping source ranges.
pub fn check_segments(segments: &[ConvertSegment]) -> Result<(), Error> {
    let mut prev_end: Option<i64> = None;
    for (idx, segment) in segments.iter().enumerate() {
        if segment.length() < 0 {
            return Err(Error::NegativeSegmentLength(
                idx,
                segment.src_start,
                segment.src_end,
            ));
        }
        if let Some(prev_end) = prev_end {
            if segment.src_start < prev_end {
                return Err(Error::UnsortedSegments(idx, segment.src_start, prev_end));
            }
        }
        prev_end = Some(segment.src_end);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use anyhow::Error;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{
        check_segments, get_alignment_segments, get_convert_to_local_segments, ConvertSegment,
    };
    use crate::location::{Location, Strand};
    use crate::mapper::Error as MapperError;

    fn segs(raw: &[(i64, i64, i64)]) -> Vec<ConvertSegment> {
        raw.iter()
            .map(|&(s, e, d)| ConvertSegment::new(s, e, d))
            .collect()
    }

    #[rstest]
    #[case("SD", 1, 4, &[(0, 1, -1), (1, 4, 0)])]
    #[case("SD-", 1, 5, &[(0, 1, -1), (1, 3, 0), (3, 5, 3)])]
    #[case(
        "S-SD---KSD-",
        3,
        30,
        &[(0, 3, -3), (3, 4, 0), (4, 6, 2), (6, 9, 7), (9, 30, 11)]
    )]
    #[case("--SD", 0, 2, &[(0, 0, 0), (0, 2, 2)])]
    fn alignment_segments(
        #[case] aligned: &str,
        #[case] src_from: i64,
        #[case] src_len: i64,
        #[case] expected: &[(i64, i64, i64)],
    ) {
        assert_eq!(
            get_alignment_segments(aligned, src_from, src_len),
            segs(expected)
        );
    }

    #[test]
    fn local_segments_forward() -> Result<(), Error> {
        let loc = Location::from_ranges(&[(20, 25), (0, 10)], Some(Strand::Forward));
        assert_eq!(
            get_convert_to_local_segments(&loc)?,
            segs(&[(0, 10, 0), (20, 25, 10)])
        );
        // Input order is untouched.
        assert_eq!(loc.parts[0].start, 20);

        Ok(())
    }

    #[test]
    fn local_segments_reverse() -> Result<(), Error> {
        let loc = Location::from_ranges(&[(0, 10), (20, 25)], Some(Strand::Reverse));
        assert_eq!(
            get_convert_to_local_segments(&loc)?,
            segs(&[(20, 25, 0), (0, 10, 5)])
        );

        Ok(())
    }

    #[test]
    fn local_segments_empty() -> Result<(), Error> {
        assert!(get_convert_to_local_segments(&Location::default())?.is_empty());

        Ok(())
    }

    #[test]
    fn segment_checks() {
        assert_eq!(check_segments(&segs(&[(0, 3, -3), (3, 4, 0)])), Ok(()));
        assert_eq!(
            check_segments(&segs(&[(0, 3, 0), (5, 4, 3)])),
            Err(MapperError::NegativeSegmentLength(1, 5, 4))
        );
        assert_eq!(
            check_segments(&segs(&[(0, 3, 0), (2, 4, 3)])),
            Err(MapperError::UnsortedSegments(1, 2, 3))
        );
    }
}

// <LICENSE>
// Copyright 2024 spliceloc Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
// </LICENSE>
