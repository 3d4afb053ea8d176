//! Projection of locations through coordinate maps.

use indexmap::IndexSet;

use super::segments::{get_alignment_segments, get_convert_to_local_segments, ConvertSegment};
use super::Error;
use crate::location::{self, is_reverse, Location, LocationPart, Tags};

/// At equal positions closing boundaries sort before opening ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Boundary {
    End,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    /// Segment carrying the destination position of its opening boundary.
    Segment { anchor: Option<i64> },
    /// Index of a part of the converted location.
    Data(usize),
}

#[derive(Debug, Clone, Copy)]
struct ConvertEvent {
    /// Signed source position, negated on the reverse strand.
    pos: i64,
    boundary: Boundary,
    subject: Subject,
}

impl ConvertEvent {
    fn sort_key(&self) -> (i64, Boundary, bool) {
        let is_anchor = matches!(self.subject, Subject::Segment { anchor: Some(_) });
        (self.pos, self.boundary, !is_anchor)
    }
}

/// Current linear map `dst = anchor_dst + (pos - anchor_src)`.
#[derive(Debug, Clone, Copy, Default)]
struct Anchor {
    src: i64,
    dst: i64,
}

impl Anchor {
    fn project(&self, pos: i64) -> i64 {
        self.dst + (pos - self.src)
    }
}

/// Build the boundary events of `loc` and `segments` in signed coordinates.
fn build_events(
    loc: &Location,
    segments: &[ConvertSegment],
    reverse: bool,
) -> Result<Vec<ConvertEvent>, location::Error> {
    let mut events = Vec::with_capacity(2 * (loc.parts.len() + segments.len()));
    // On the reverse strand the boundary at `end` is the opening one.
    let oriented = |start: i64, end: i64| {
        if reverse {
            (-end, -start)
        } else {
            (start, end)
        }
    };

    for (idx, part) in loc.parts.iter().enumerate() {
        if part.start > part.end {
            return Err(location::Error::NegativeLength(part.start, part.end));
        }
        if part.start == part.end {
            continue;
        }
        let (open, close) = oriented(part.start, part.end);
        events.push(ConvertEvent {
            pos: open,
            boundary: Boundary::Start,
            subject: Subject::Data(idx),
        });
        events.push(ConvertEvent {
            pos: close,
            boundary: Boundary::End,
            subject: Subject::Data(idx),
        });
    }

    for segment in segments.iter().filter(|s| s.length() > 0) {
        let (open, close) = oriented(segment.src_start, segment.src_end);
        events.push(ConvertEvent {
            pos: open,
            boundary: Boundary::Start,
            subject: Subject::Segment {
                anchor: Some(segment.dst_start),
            },
        });
        events.push(ConvertEvent {
            pos: close,
            boundary: Boundary::End,
            subject: Subject::Segment { anchor: None },
        });
    }

    events.sort_by_key(ConvertEvent::sort_key);
    Ok(events)
}

/// Project `loc` through `segments`.
///
/// A part of `loc` is projected where it lies within a segment; positions outside all
/// segments are dropped.  Output is split at every boundary inside a projected region, in
/// particular at every segment boundary.  Output parts carry no strand and the merged tags of
/// the parts they were projected from.  On the reverse strand, positions are mirrored so that
/// a segment's `dst_start` corresponds to its `src_end`.  Output follows the strand's direction
/// in the source; it is ascending in the destination only if the segments are laid out in that
/// direction, as `get_convert_to_local_segments()` does.
///
/// Segments of zero or negative length are ignored; use `check_segments()` to reject them.
pub fn convert_location(loc: &Location, segments: &[ConvertSegment]) -> Result<Location, Error> {
    if loc.is_empty() {
        return Ok(Location::default());
    }
    let reverse = is_reverse(loc.strand()?);
    let events = build_events(loc, segments, reverse)?;

    let mut anchor = Anchor::default();
    let mut segment_depth = 0usize;
    let mut active: IndexSet<usize> = IndexSet::new();
    // Source and destination position where the current output part opened.
    let mut open: Option<(i64, i64)> = None;
    let mut result = Location::default();

    for event in &events {
        if let Some((open_src, open_dst)) = open.take() {
            if event.pos > open_src {
                let mut tags = Tags::new();
                for idx in &active {
                    tags.merge_from(&loc.parts[*idx].tags);
                }
                result.parts.push(LocationPart {
                    start: open_dst,
                    end: anchor.project(event.pos),
                    strand: None,
                    tags,
                });
            }
        }

        match (event.boundary, event.subject) {
            (Boundary::Start, Subject::Segment { anchor: dst }) => {
                if let Some(dst) = dst {
                    anchor = Anchor {
                        src: event.pos,
                        dst,
                    };
                }
                segment_depth += 1;
            }
            (Boundary::End, Subject::Segment { .. }) => {
                segment_depth = segment_depth.saturating_sub(1);
            }
            (Boundary::Start, Subject::Data(idx)) => {
                active.insert(idx);
            }
            (Boundary::End, Subject::Data(idx)) => {
                active.shift_remove(&idx);
            }
        }

        if segment_depth > 0 && !active.is_empty() {
            open = Some((event.pos, anchor.project(event.pos)));
        }
    }

    log::trace!(
        "converted {} parts through {} segments into {} parts",
        loc.parts.len(),
        segments.len(),
        result.parts.len()
    );
    Ok(result)
}

/// Express `loc` in the local coordinates of `other`, i.e., positions within the
/// concatenation of `other`'s parts in transcription order.
pub fn relative_to_location(loc: &Location, other: &Location) -> Result<Location, Error> {
    let segments = get_convert_to_local_segments(other)?;
    convert_location(loc, &segments)
}

/// Express `loc`, given in query coordinates, in columns of the aligned query string.
pub fn relative_to_alignment(
    loc: &Location,
    aligned: &str,
    query_from: i64,
    query_len: i64,
) -> Result<Location, Error> {
    let segments = get_alignment_segments(aligned, query_from, query_len);
    convert_location(loc, &segments)
}

/// Integer `ceil(pos / 3)`, exact for negative positions.
fn codon_ceil(pos: i64) -> i64 {
    -((-pos).div_euclid(3))
}

/// Convert nucleotide coordinates to amino acid coordinates.
///
/// Both boundaries round up, so a part covers the codons it fully or partially ends in.  Parts
/// that become empty are dropped.
pub fn nucleotide_to_amino(loc: &Location) -> Location {
    loc.parts
        .iter()
        .filter_map(|part| {
            let start = codon_ceil(part.start);
            let end = codon_ceil(part.end);
            (start < end).then(|| LocationPart {
                start,
                end,
                strand: part.strand,
                tags: part.tags.clone(),
            })
        })
        .collect()
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
