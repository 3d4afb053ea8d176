//! Difference and similarity scores between projected splicing regions.
//!
//! All locations handled here are expected in alignment column coordinates, i.e., the output
//! of `convert_location()` with segments of the same alignment for query and hit.

use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::Error;
use crate::location::tags::EVENT_ID;
use crate::location::{intersection, symmetric_difference, Location};

/// Per-character score of a BLAST midline.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchTable {
    scores: AHashMap<char, f64>,
}

impl Default for MatchTable {
    /// Identities (the residue letter) and positives (`+`) score 1.
    fn default() -> Self {
        Self::new(('A'..='Z').chain(std::iter::once('+')).map(|c| (c, 1.0)))
    }
}

impl MatchTable {
    pub fn new<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = (char, f64)>,
    {
        Self {
            scores: scores.into_iter().collect(),
        }
    }

    /// Score of a midline character, 0 for characters not in the table.
    pub fn score(&self, c: char) -> f64 {
        self.scores.get(&c).copied().unwrap_or(0.0)
    }
}

/// Length dependent weight that ramps between two thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthRamp {
    pub min_length: i64,
    pub max_length: i64,
    pub min_weight: f64,
    pub max_weight: f64,
}

impl LengthRamp {
    /// Weight at `length`, interpolating with `x` or `x^2` between the thresholds.
    fn weight(&self, length: i64, quadratic: bool) -> f64 {
        if length < self.min_length {
            return self.min_weight;
        }
        if length > self.max_length {
            return self.max_weight;
        }
        let x = (length - self.min_length) as f64 / (self.max_length - self.min_length) as f64;
        let x = if quadratic { x * x } else { x };
        x * (self.max_weight - self.min_weight) + self.min_weight
    }
}

/// Affine gap penalties, added to the substitution score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GapPenalties {
    pub open: f64,
    pub extend: f64,
    /// Whether opening a gap also counts as its first extension.
    pub penalize_extend_when_opening: bool,
}

/// Configuration for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Discount of long splicing intersections in the similarity score.
    pub intersection_weight: LengthRamp,
    /// Length normalization of the dissimilarity score.
    pub length_normalization: LengthRamp,
    /// Gap penalties of `evaluate_score()`.
    pub gaps: GapPenalties,
    pub match_table: MatchTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            intersection_weight: LengthRamp {
                min_length: 20,
                max_length: 100,
                min_weight: 1.0,
                max_weight: 0.3,
            },
            length_normalization: LengthRamp {
                min_length: 10,
                max_length: 100,
                min_weight: 1.0,
                max_weight: 0.3,
            },
            gaps: GapPenalties::default(),
            match_table: MatchTable::default(),
        }
    }
}

impl Config {
    /// Weight applied to the total intersection length, easing quadratically.
    pub fn intersection_length_weight(&self, length: i64) -> f64 {
        self.intersection_weight.weight(length, true)
    }

    /// `length` scaled up by the inverse of a linearly interpolated weight.
    pub fn normalize_length(&self, length: i64) -> f64 {
        length as f64 / self.length_normalization.weight(length, false)
    }
}

/// Sum of midline scores over the columns covered by `loc`.
///
/// Columns outside the midline are skipped.
pub fn count_matches(loc: &Location, midline: &str, table: &MatchTable) -> f64 {
    let midline = midline.as_bytes();
    let len = midline.len() as i64;
    loc.parts
        .iter()
        .flat_map(|part| part.start.max(0)..part.end.min(len))
        .map(|i| table.score(char::from(midline[i as usize])))
        .sum()
}

/// Sum of midline scores over the whole midline.
pub fn count_all_matches(midline: &str, table: &MatchTable) -> f64 {
    midline.chars().map(|c| table.score(c)).sum()
}

/// BLOSUM62 score of two residues clamped at 0, and 0 for non-residue characters.
fn substitution_score(a: u8, b: u8) -> f64 {
    let a = a.to_ascii_uppercase();
    let b = b.to_ascii_uppercase();
    let is_residue = |c: u8| c.is_ascii_uppercase() || c == b'*';
    if !is_residue(a) || !is_residue(b) {
        return 0.0;
    }
    f64::from(bio::scores::blosum62(a, b).max(0))
}

/// Alignment score of the columns covered by `loc`.
///
/// Substitutions score by BLOSUM62 with negative entries clamped to 0, gaps by the affine
/// penalties in `config.gaps`.  Columns outside the shorter of the two rows are skipped.
pub fn evaluate_score(loc: &Location, seq_a: &str, seq_b: &str, config: &Config) -> f64 {
    let gaps = &config.gaps;
    let seq_a = seq_a.as_bytes();
    let seq_b = seq_b.as_bytes();
    let len = seq_a.len().min(seq_b.len()) as i64;
    let open_gap = if gaps.penalize_extend_when_opening {
        gaps.open + gaps.extend
    } else {
        gaps.open
    };

    let mut open_a = false;
    let mut open_b = false;
    let mut score = 0.0;
    for part in &loc.parts {
        for i in part.start.max(0)..part.end.min(len) {
            let char_a = seq_a[i as usize];
            let char_b = seq_b[i as usize];
            if char_a != b'-' && char_b != b'-' {
                open_a = false;
                open_b = false;
                score += substitution_score(char_a, char_b);
            } else if char_a == b'-' {
                if open_a {
                    score += gaps.extend;
                } else {
                    score += open_gap;
                    open_a = true;
                    open_b = false;
                }
            } else if open_b {
                score += gaps.extend;
            } else {
                score += open_gap;
                open_b = true;
                open_a = false;
            }
        }
    }
    score
}

/// Split `loc` into one location per `event_id`.
fn group_by_event(loc: &Location) -> Result<AHashMap<i64, Location>, Error> {
    let mut result: AHashMap<i64, Location> = AHashMap::new();
    for part in &loc.parts {
        let event_id = part.tags.get_int(EVENT_ID)?;
        result.entry(event_id).or_default().parts.push(part.clone());
    }
    Ok(result)
}

/// Fraction of the larger of `query` and `hit` not shared with the other, 0 if both are empty.
fn side_difference(query: &Location, hit: &Location) -> Result<f64, Error> {
    let denominator = query.length().max(hit.length());
    if denominator == 0 {
        return Ok(0.0);
    }
    let difference = symmetric_difference(query, hit)?.length();
    Ok(difference as f64 / denominator as f64)
}

/// Worst per-event difference between the query and the hit splicing regions.
///
/// Parts are grouped by their `event_id` tag.  For every event the a and b sides contribute
/// the length of the symmetric difference of query and hit relative to the longer of the two.
/// The result is the maximum over all events, or 1 if no side has any event.
pub fn difference_score(
    query_a: &Location,
    query_b: &Location,
    hit_a: &Location,
    hit_b: &Location,
) -> Result<f64, Error> {
    let query_a = group_by_event(query_a)?;
    let query_b = group_by_event(query_b)?;
    let hit_a = group_by_event(hit_a)?;
    let hit_b = group_by_event(hit_b)?;

    let events = query_a
        .keys()
        .chain(query_b.keys())
        .chain(hit_a.keys())
        .chain(hit_b.keys())
        .copied()
        .collect::<BTreeSet<_>>();
    if events.is_empty() {
        return Ok(1.0);
    }

    let empty = Location::default();
    let mut result = 0.0f64;
    for event_id in events {
        let side = |query: &AHashMap<i64, Location>, hit: &AHashMap<i64, Location>| {
            side_difference(
                query.get(&event_id).unwrap_or(&empty),
                hit.get(&event_id).unwrap_or(&empty),
            )
        };
        let difference_a = side(&query_a, &hit_a)?;
        let difference_b = side(&query_b, &hit_b)?;
        log::debug!(
            "event {}: difference a = {}, b = {}",
            event_id,
            difference_a,
            difference_b
        );
        result = result.max(difference_a + difference_b);
    }
    Ok(result)
}

/// Similarity and dissimilarity of query and hit splicing regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub similarity: f64,
    pub dissimilarity: f64,
}

/// Compare query and hit splicing regions by the alignment midlines of both sides.
///
/// Matches are counted within the intersection of query and hit regions.  The similarity
/// relates the matches to the length weighted intersection, the dissimilarity sums the
/// unmatched share of the longer region per side relative to the normalized overall maximum
/// length.  Degenerate denominators yield 0.
pub fn similarity_score(
    query_a: &Location,
    query_b: &Location,
    hit_a: &Location,
    hit_b: &Location,
    midline_a: &str,
    midline_b: &str,
    config: &Config,
) -> Result<Similarity, Error> {
    let intersection_a = intersection(query_a, hit_a)?;
    let intersection_b = intersection(query_b, hit_b)?;

    let max_length_a = query_a.length().max(hit_a.length());
    let max_length_b = query_b.length().max(hit_b.length());
    let normalized_max_length = config.normalize_length(max_length_a.max(max_length_b));

    let score_a = count_matches(&intersection_a, midline_a, &config.match_table);
    let score_b = count_matches(&intersection_b, midline_b, &config.match_table);

    let dissimilarity = if normalized_max_length != 0.0 {
        (max_length_a as f64 - score_a) / normalized_max_length
            + (max_length_b as f64 - score_b) / normalized_max_length
    } else {
        0.0
    };

    let intersection_length = intersection_a.length() + intersection_b.length();
    let normalized_length =
        config.intersection_length_weight(intersection_length) * intersection_length as f64;
    let similarity = if normalized_length != 0.0 {
        (score_a + score_b) / normalized_length
    } else {
        0.0
    };

    log::debug!(
        "scores a = {}, b = {}, intersection length = {}, max lengths = {}/{}",
        score_a,
        score_b,
        intersection_length,
        max_length_a,
        max_length_b
    );
    Ok(Similarity {
        similarity,
        dissimilarity,
    })
}

#[cfg(test)]
mod test {
    use anyhow::Error;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{
        count_all_matches, count_matches, difference_score, evaluate_score, similarity_score,
        Config, GapPenalties, MatchTable,
    };
    use crate::location::tags::EVENT_ID;
    use crate::location::{Location, LocationPart};

    fn events(raw: &[(i64, i64, i64)]) -> Location {
        raw.iter()
            .map(|&(start, end, event_id)| {
                LocationPart::new(start, end, None).with_tag(EVENT_ID, event_id)
            })
            .collect()
    }

    fn approx_eq(lhs: f64, rhs: f64) -> bool {
        (lhs - rhs).abs() < 1e-9
    }

    #[rstest]
    #[case(0, 1.0)]
    #[case(19, 1.0)]
    #[case(20, 1.0)]
    #[case(60, 0.825)]
    #[case(100, 0.3)]
    #[case(101, 0.3)]
    fn intersection_weight(#[case] length: i64, #[case] expected: f64) {
        let config = Config::default();
        assert!(approx_eq(config.intersection_length_weight(length), expected));
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(9, 9.0)]
    #[case(10, 10.0)]
    #[case(55, 55.0 / 0.65)]
    #[case(100, 100.0 / 0.3)]
    #[case(200, 200.0 / 0.3)]
    fn length_normalization(#[case] length: i64, #[case] expected: f64) {
        let config = Config::default();
        assert!(approx_eq(config.normalize_length(length), expected));
    }

    #[test]
    fn match_counting() {
        let table = MatchTable::default();
        let midline = "AB + C";
        let loc = Location::from_ranges(&[(-2, 2), (3, 4), (5, 10)], None);

        assert_eq!(count_matches(&loc, midline, &table), 4.0);
        assert_eq!(count_all_matches(midline, &table), 4.0);
        assert_eq!(count_all_matches("ab|", &table), 0.0);
    }

    #[test]
    fn alignment_score() {
        let loc = Location::from_ranges(&[(0, 6)], None);
        let mut config = Config::default();
        // W/W = 11, A/A = 4, A/W = -3 -> 0
        assert_eq!(evaluate_score(&loc, "WAA", "WAW", &config), 15.0);

        config.gaps = GapPenalties {
            open: -5.0,
            extend: -1.0,
            penalize_extend_when_opening: false,
        };
        assert_eq!(
            evaluate_score(&loc, "W--AA", "WAAA-", &config),
            11.0 - 5.0 - 1.0 + 4.0 - 5.0
        );

        config.gaps.penalize_extend_when_opening = true;
        assert_eq!(evaluate_score(&loc, "W-A", "WAA", &config), 11.0 - 6.0 + 4.0);
    }

    #[test]
    fn alignment_score_default_gaps_are_free() {
        let loc = Location::from_ranges(&[(0, 4)], None);
        assert_eq!(
            evaluate_score(&loc, "W--W", "WAAW", &Config::default()),
            22.0
        );
    }

    #[test]
    fn difference_without_events() -> Result<(), Error> {
        let empty = Location::default();
        assert_eq!(difference_score(&empty, &empty, &empty, &empty)?, 1.0);

        Ok(())
    }

    #[test]
    fn difference_identical() -> Result<(), Error> {
        let a = events(&[(0, 10, 1), (20, 25, 2)]);
        let b = events(&[(0, 4, 1)]);
        assert_eq!(difference_score(&a, &b, &a, &b)?, 0.0);

        Ok(())
    }

    #[test]
    fn difference_takes_worst_event() -> Result<(), Error> {
        let query_a = events(&[(0, 10, 1), (20, 30, 2)]);
        let hit_a = events(&[(5, 10, 1), (20, 30, 2)]);
        let query_b = events(&[(40, 44, 2)]);
        let hit_b = events(&[(40, 42, 2)]);

        // Event 1: a-side 5 / 10; event 2: a-side 0, b-side 2 / 4.
        let result = difference_score(&query_a, &query_b, &hit_a, &hit_b)?;
        assert_eq!(result, 0.5);

        // Event only present in the hit.
        let hit_b = events(&[(40, 44, 2), (50, 60, 3)]);
        let result = difference_score(&query_a, &query_b, &hit_a, &hit_b)?;
        assert_eq!(result, 1.0);

        Ok(())
    }

    #[test]
    fn difference_requires_event_ids() {
        let untagged = Location::from_ranges(&[(0, 1)], None);
        let empty = Location::default();
        assert!(difference_score(&untagged, &empty, &empty, &empty).is_err());
    }

    #[test_log::test]
    fn similarity() -> Result<(), Error> {
        let config = Config::default();
        let query_a = Location::from_ranges(&[(0, 10)], None);
        let hit_a = Location::from_ranges(&[(2, 10)], None);
        let query_b = Location::from_ranges(&[(0, 4)], None);
        let hit_b = Location::from_ranges(&[(0, 4)], None);
        let midline_a = "AAAAA     ";
        let midline_b = "A+ A";

        let result = similarity_score(
            &query_a, &query_b, &hit_a, &hit_b, midline_a, midline_b, &config,
        )?;

        // Intersections: a = (2,10) with 3 matches, b = (0,4) with 3 matches.
        assert!(approx_eq(result.similarity, 6.0 / 12.0));
        // Max lengths 10 and 4, both normalized by 10.
        assert!(approx_eq(result.dissimilarity, (10.0 - 3.0) / 10.0 + (4.0 - 3.0) / 10.0));

        Ok(())
    }

    #[test]
    fn similarity_of_empty_regions() -> Result<(), Error> {
        let empty = Location::default();
        let result = similarity_score(&empty, &empty, &empty, &empty, "", "", &Config::default())?;

        assert_eq!(result.similarity, 0.0);
        assert_eq!(result.dissimilarity, 0.0);

        Ok(())
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
