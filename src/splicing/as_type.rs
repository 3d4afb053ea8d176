//! Classification of alternative splicing types between two transcripts.

use serde::{Deserialize, Serialize};

use super::Error;
use crate::location::tags::{SOURCE, SOURCE_PART};
use crate::location::{bounding_box, intersection, union, Location, LocationPart};

/// Alternative splicing type of a region covered by one transcript only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsType {
    /// Touches the shared regions on both sides.
    #[serde(rename = "IR")]
    IntronRetention,
    /// Touches the upstream shared region only.
    #[serde(rename = "AltD")]
    AlternativeDonor,
    /// Touches the downstream shared region only.
    #[serde(rename = "AltA")]
    AlternativeAcceptor,
    /// Touches no shared region.
    #[serde(rename = "ExS")]
    ExonSkipping,
    /// No downstream region.
    #[serde(rename = "AltF")]
    AlternativeLast,
    /// No upstream region.
    #[serde(rename = "AltS")]
    AlternativeFirst,
    Undefined,
}

impl AsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AsType::IntronRetention => "IR",
            AsType::AlternativeDonor => "AltD",
            AsType::AlternativeAcceptor => "AltA",
            AsType::ExonSkipping => "ExS",
            AsType::AlternativeLast => "AltF",
            AsType::AlternativeFirst => "AltS",
            AsType::Undefined => "Undefined",
        }
    }
}

impl std::fmt::Display for AsType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classified region together with the identifier of the input part it stems from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsEvent {
    pub as_type: AsType,
    /// `{label}_{index}` of the covering part, see `union_labeled()`.
    pub source_part: String,
}

/// Gap between two parts, 0 if they touch.
fn distance(a: &LocationPart, b: &LocationPart) -> i64 {
    (a.start - b.end).abs().min((a.end - b.start).abs())
}

/// Classify the regions covered by only one of the transcripts `a` and `b`.
///
/// Regions are walked in transcription order.  Runs of at least two single-transcript
/// regions at either end are trimmed to their innermost region.  Consecutive
/// single-transcript regions form one group; each region is classified by whether it touches
/// its neighbours.
pub fn get_as_types(a: &Location, b: &Location) -> Result<Vec<Vec<AsEvent>>, Error> {
    let loc = union(a, b)?;
    let parts = loc
        .indices_in_strand_order(loc.strand()?)
        .into_iter()
        .map(|idx| &loc.parts[idx])
        .collect::<Vec<_>>();
    let single = parts
        .iter()
        .map(|part| -> Result<bool, Error> { Ok(part.tags.get_set(SOURCE)?.len() == 1) })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut begin = 0;
    while begin + 1 < parts.len() && single[begin] && single[begin + 1] {
        begin += 1;
    }
    let mut end = parts.len();
    while end >= 2 && single[end - 1] && single[end - 2] {
        end -= 1;
    }

    let mut result: Vec<Vec<AsEvent>> = Vec::new();
    let mut in_group = false;
    for i in begin..end {
        if !single[i] {
            in_group = false;
            continue;
        }
        if !in_group {
            result.push(Vec::new());
            in_group = true;
        }

        let part = parts[i];
        let prev_part = (i > begin).then(|| parts[i - 1]);
        let next_part = (i + 1 < end).then(|| parts[i + 1]);
        let as_type = match (prev_part, next_part) {
            (Some(prev), Some(next)) => {
                match (distance(part, prev) == 0, distance(part, next) == 0) {
                    (true, true) => AsType::IntronRetention,
                    (true, false) => AsType::AlternativeDonor,
                    (false, true) => AsType::AlternativeAcceptor,
                    (false, false) => AsType::ExonSkipping,
                }
            }
            (Some(_), None) => AsType::AlternativeLast,
            (None, Some(_)) => AsType::AlternativeFirst,
            (None, None) => AsType::Undefined,
        };
        let source_part = part
            .tags
            .get_set(SOURCE_PART)?
            .iter()
            .next()
            .cloned()
            .unwrap_or_default();

        if let Some(group) = result.last_mut() {
            group.push(AsEvent {
                as_type,
                source_part,
            });
        }
    }

    log::trace!("{} alternative splicing groups in {}", result.len(), loc);
    Ok(result)
}

/// Transcripts clipped to the coding region of their isoforms and their splicing types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoformAsTypes {
    pub rna_a: Location,
    pub rna_b: Location,
    pub as_types: Vec<Vec<AsEvent>>,
}

/// Classify the splicing types of two transcripts within the span of their coding isoforms.
///
/// Both transcripts are intersected with the bounding box of all isoform parts first, so
/// untranslated exons do not show up as alternative first or last exons.
pub fn isoform_as_types(
    iso_a: &Location,
    rna_a: &Location,
    iso_b: &Location,
    rna_b: &Location,
) -> Result<IsoformAsTypes, Error> {
    let all_parts = iso_a
        .parts
        .iter()
        .chain(iso_b.parts.iter())
        .cloned()
        .collect::<Vec<_>>();
    let span = bounding_box(&all_parts);
    let rna_a = intersection(rna_a, &span)?;
    let rna_b = intersection(rna_b, &span)?;
    let as_types = get_as_types(&rna_a, &rna_b)?;
    Ok(IsoformAsTypes {
        rna_a,
        rna_b,
        as_types,
    })
}
