//! Derivation of splicing regions and event identifiers from a pair of isoforms.

use crate::location::tags::{EVENT_ID, EVENT_ID_BACKWARD, EVENT_ID_FORWARD, IS_SPLICING, SOURCE};
use crate::location::{merge, union, Location};
use crate::mapper::{nucleotide_to_amino, relative_to_location};

use super::Error;

/// Reading frame offset between the two isoforms of a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// Both isoforms have consumed the same number of nucleotides modulo 3.
    #[default]
    InSync,
    /// Isoform `a` is ahead of `b` by the given offset modulo 3, either 1 or 2.
    Shifted(u8),
}

impl FrameState {
    /// Advance isoform `a` by `len` nucleotides relative to `b`; negative values advance `b`.
    pub fn advance(self, len: i64) -> Self {
        let current = match self {
            FrameState::InSync => 0,
            FrameState::Shifted(offset) => i64::from(offset),
        };
        match (current + len).rem_euclid(3) {
            0 => FrameState::InSync,
            1 => FrameState::Shifted(1),
            _ => FrameState::Shifted(2),
        }
    }

    pub fn is_shifted(self) -> bool {
        self != FrameState::InSync
    }
}

/// Mark the parts of a union of isoforms `a` and `b` that belong to splicing events.
///
/// Parts covered by a single isoform are splicing; they shift the reading frame.  Parts
/// covered by both are splicing as long as the frame is shifted.  Parts are walked in
/// transcription order.  Sets `is_splicing` on every part.
pub fn extend_splicing(loc: &mut Location) -> Result<(), Error> {
    let strand = loc.strand()?;
    let mut frame = FrameState::default();
    for idx in loc.indices_in_strand_order(strand) {
        let part = &mut loc.parts[idx];
        let (single, from_a) = {
            let source = part.tags.get_set(SOURCE)?;
            (source.len() == 1, source.contains("a"))
        };
        let is_splicing = if single {
            let len = part.length();
            frame = frame.advance(if from_a { len } else { -len });
            true
        } else {
            frame.is_shifted()
        };
        part.tags.insert(IS_SPLICING, is_splicing);
    }
    Ok(())
}

/// Number runs of splicing parts visiting `order`, storing the counter under `key`.
fn assign_directed<I>(loc: &mut Location, order: I, key: &str) -> Result<(), Error>
where
    I: IntoIterator<Item = usize>,
{
    let mut event_id = 0i64;
    let mut prev_splicing = true;
    for idx in order {
        let part = &mut loc.parts[idx];
        let is_splicing = part.tags.get_bool(IS_SPLICING)?;
        if is_splicing {
            if !prev_splicing {
                event_id += 1;
            }
            part.tags.insert(key, event_id);
        }
        prev_splicing = is_splicing;
    }
    Ok(())
}

/// Assign event identifiers to the splicing parts of `loc`.
///
/// A new event starts whenever a splicing part follows a constant one.  Events are numbered
/// once in transcription order and once against it; `event_id` combines both as
/// `forward + 100 * backward`.  Unstranded locations count as forward.
pub fn assign_event_ids(loc: &mut Location) -> Result<(), Error> {
    let order = loc.indices_in_strand_order(loc.strand()?);
    assign_directed(loc, order.iter().copied(), EVENT_ID_FORWARD)?;
    assign_directed(loc, order.iter().rev().copied(), EVENT_ID_BACKWARD)?;

    for part in loc.parts.iter_mut() {
        if part.tags.get_bool(IS_SPLICING)? {
            let forward = part.tags.get_int(EVENT_ID_FORWARD)?;
            let backward = part.tags.get_int(EVENT_ID_BACKWARD)?;
            part.tags.insert(EVENT_ID, forward + 100 * backward);
        }
    }
    Ok(())
}

/// Splicing parts of an annotated union covered by isoform `a` and by isoform `b`.
pub fn split_splicing(loc: &Location) -> Result<(Location, Location), Error> {
    let mut a = Location::default();
    let mut b = Location::default();
    for part in &loc.parts {
        if !part.tags.get_bool(IS_SPLICING)? {
            continue;
        }
        let source = part.tags.get_set(SOURCE)?;
        if source.contains("a") {
            a.parts.push(part.clone());
        }
        if source.contains("b") {
            b.parts.push(part.clone());
        }
    }
    Ok((a, b))
}

/// Genomic splicing regions of isoforms `a` and `b`, tagged with their event identifiers.
pub fn splicing_regions(a: &Location, b: &Location) -> Result<(Location, Location), Error> {
    let mut loc = union(a, b)?;
    extend_splicing(&mut loc)?;
    assign_event_ids(&mut loc)?;
    log::trace!("annotated union of isoform pair: {}", loc);
    split_splicing(&loc)
}

/// Project genomic splicing regions onto the protein encoded by `isoform`.
pub fn convert_splicing(splicing: &Location, isoform: &Location) -> Result<Location, Error> {
    let converted = relative_to_location(splicing, isoform)?;
    let converted = nucleotide_to_amino(&converted);
    Ok(merge(&converted)?)
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
