//! Sweep-line set operations on locations.
//!
//! Every operation turns its inputs into start/end events, sorts them and scans them left to
//! right while tracking the set of open parts.  Between two consecutive event positions the
//! operation decides from the open set whether output is produced and which tags it carries.
//! Output parts therefore split at every input boundary inside a produced region.

use std::collections::BTreeSet;

use indexmap::IndexSet;

use super::tags::{self, Tags};
use super::{strand_code, Error, Location, LocationPart, Strand};

/// Kind of a boundary event.  At equal positions starts sort before ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Start,
    End,
}

#[derive(Debug, Clone, Copy)]
struct Event {
    pos: i64,
    kind: EventKind,
    /// Index into `Sweep::entries`.
    id: usize,
}

/// An input part registered with a sweep.
#[derive(Debug)]
struct Entry<'a> {
    /// Index of the input location.
    source: usize,
    /// Index of the part within its input location.
    index: usize,
    part: &'a LocationPart,
}

/// Parts open at the current sweep position.
#[derive(Debug)]
struct ActiveSet {
    /// Entry ids in activation order.
    ids: IndexSet<usize>,
    per_source: Vec<usize>,
}

impl ActiveSet {
    fn new(num_sources: usize) -> Self {
        Self {
            ids: IndexSet::new(),
            per_source: vec![0; num_sources],
        }
    }

    fn open(&mut self, id: usize, source: usize) {
        self.ids.insert(id);
        self.per_source[source] += 1;
    }

    fn close(&mut self, id: usize, source: usize) {
        if self.ids.shift_remove(&id) {
            self.per_source[source] -= 1;
        }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn all_sources_open(&self) -> bool {
        self.per_source.iter().all(|count| *count > 0)
    }
}

/// Event sweep over one or more input locations.
struct Sweep<'a> {
    entries: Vec<Entry<'a>>,
    num_sources: usize,
}

impl<'a> Sweep<'a> {
    /// Register all parts of `inputs`, assigning ids in input order.
    ///
    /// Zero-length parts cannot contribute output and are skipped.
    fn new(inputs: &[&'a Location]) -> Result<Self, Error> {
        let mut entries = Vec::new();
        for (source, loc) in inputs.iter().enumerate() {
            for (index, part) in loc.parts.iter().enumerate() {
                if part.start > part.end {
                    return Err(Error::NegativeLength(part.start, part.end));
                }
                if part.start < part.end {
                    entries.push(Entry {
                        source,
                        index,
                        part,
                    });
                }
            }
        }
        Ok(Self {
            entries,
            num_sources: inputs.len(),
        })
    }

    fn run<P, T>(&self, strand: Option<Strand>, producing: P, build_tags: T) -> Location
    where
        P: Fn(&ActiveSet) -> bool,
        T: Fn(&ActiveSet, &[Entry<'a>]) -> Tags,
    {
        let mut events = Vec::with_capacity(2 * self.entries.len());
        for (id, entry) in self.entries.iter().enumerate() {
            events.push(Event {
                pos: entry.part.start,
                kind: EventKind::Start,
                id,
            });
            events.push(Event {
                pos: entry.part.end,
                kind: EventKind::End,
                id,
            });
        }
        events.sort_by_key(|e| (e.pos, e.kind));

        let mut active = ActiveSet::new(self.num_sources);
        let mut cursor: Option<i64> = None;
        let mut result = Location::default();
        for event in &events {
            if let Some(from) = cursor {
                if event.pos > from && producing(&active) {
                    result.parts.push(LocationPart {
                        start: from,
                        end: event.pos,
                        strand,
                        tags: build_tags(&active, &self.entries),
                    });
                }
            }
            cursor = Some(event.pos);

            let source = self.entries[event.id].source;
            match event.kind {
                EventKind::Start => active.open(event.id, source),
                EventKind::End => active.close(event.id, source),
            }
        }

        log::trace!(
            "sweep over {} events produced {} parts",
            events.len(),
            result.parts.len()
        );
        result
    }
}

/// Merge the raw tags of all open parts, later activations overriding earlier ones.
fn merged_tags(active: &ActiveSet, entries: &[Entry]) -> Tags {
    let mut result = Tags::new();
    for id in &active.ids {
        result.merge_from(&entries[*id].part.tags);
    }
    result
}

/// Strand shared by two non-empty operands.
fn common_strand(a: &Location, b: &Location) -> Result<Option<Strand>, Error> {
    let strand_a = a.strand()?;
    let strand_b = b.strand()?;
    if strand_a != strand_b {
        return Err(Error::StrandMismatch(
            strand_code(strand_a),
            strand_code(strand_b),
        ));
    }
    Ok(strand_a)
}

/// Union of labeled locations.
///
/// Every output part carries a `source` tag with the set of labels covering it and a
/// `source_part` tag with the set of `{label}_{index}` identifiers of the covering input
/// parts.  These identifiers are only meaningful relative to the inputs of this call; reusing
/// labels across calls does not make identifiers comparable.
///
/// The strand is taken from the first non-empty input.  Input tags are not propagated.
pub fn union_labeled(inputs: &[(&str, &Location)]) -> Result<Location, Error> {
    let mut strand = None;
    let mut found = false;
    for (_, loc) in inputs {
        let loc_strand = loc.strand()?;
        if !found && !loc.is_empty() {
            strand = loc_strand;
            found = true;
        }
    }
    if !found {
        return Ok(Location::default());
    }

    let locations = inputs.iter().map(|(_, loc)| *loc).collect::<Vec<_>>();
    let sweep = Sweep::new(&locations)?;
    Ok(sweep.run(
        strand,
        |active| !active.ids.is_empty(),
        |active, entries| {
            let mut source = BTreeSet::new();
            let mut source_part = BTreeSet::new();
            for id in &active.ids {
                let entry = &entries[*id];
                let label = inputs[entry.source].0;
                source.insert(label.to_string());
                source_part.insert(format!("{}_{}", label, entry.index));
            }
            let mut result = Tags::new();
            result.insert(tags::SOURCE, source);
            result.insert(tags::SOURCE_PART, source_part);
            result
        },
    ))
}

/// Union of two locations labeled `a` and `b`, see `union_labeled()`.
pub fn union(a: &Location, b: &Location) -> Result<Location, Error> {
    union_labeled(&[("a", a), ("b", b)])
}

/// Regions covered by both `a` and `b`, carrying the merged raw tags of the covering parts.
pub fn intersection(a: &Location, b: &Location) -> Result<Location, Error> {
    if a.is_empty() || b.is_empty() {
        return Ok(Location::default());
    }
    let strand = common_strand(a, b)?;
    let sweep = Sweep::new(&[a, b])?;
    Ok(sweep.run(strand, ActiveSet::all_sources_open, merged_tags))
}

/// Regions covered by exactly one part of `a` or `b`, carrying that part's raw tags.
///
/// Open parts are tracked by identity, so two parts of the same input overlapping each other
/// do not count as a single covering part.  If one side is empty the other is returned as is.
pub fn symmetric_difference(a: &Location, b: &Location) -> Result<Location, Error> {
    if b.is_empty() {
        return Ok(a.clone());
    }
    if a.is_empty() {
        return Ok(b.clone());
    }
    let strand = common_strand(a, b)?;
    let sweep = Sweep::new(&[a, b])?;
    Ok(sweep.run(strand, |active| active.len() == 1, merged_tags))
}

/// Coalesce consecutive parts that touch or overlap.
///
/// Parts must be in ascending order.  The merged part keeps the strand and tags of its first
/// constituent.  Reverse strand locations are stored back to front and are rejected.
pub fn merge(loc: &Location) -> Result<Location, Error> {
    if loc.strand()? == Some(Strand::Reverse) {
        return Err(Error::ReverseStrandMerge);
    }

    let mut result: Vec<LocationPart> = Vec::with_capacity(loc.parts.len());
    for part in &loc.parts {
        match result.last_mut() {
            Some(last) if part.start <= last.end && part.start >= last.start => {
                last.end = last.end.max(part.end);
            }
            _ => result.push(part.clone()),
        }
    }
    Ok(Location::new(result))
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
