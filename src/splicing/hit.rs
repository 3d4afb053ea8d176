//! Comparison of a query isoform pair with a pair of aligned hit isoforms.

use serde::{Deserialize, Serialize};

use super::events::{convert_splicing, splicing_regions};
use super::score::{count_all_matches, difference_score, similarity_score, Config, MatchTable};
use super::Error;
use crate::location::Location;
use crate::mapper::{convert_location, get_alignment_segments, ConvertSegment};

/// Protein alignment of a query isoform against a hit isoform.
///
/// Offsets are 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedHit {
    /// Aligned query row, `-` marking gaps.
    pub qseq: String,
    /// Aligned hit row, `-` marking gaps.
    pub hseq: String,
    pub midline: String,
    /// Query position of the first alignment column.
    pub query_from: i64,
    /// Hit position of the first alignment column.
    pub hit_from: i64,
    /// Length of the query protein.
    pub query_len: i64,
    /// Length of the hit protein.
    pub iso_len: i64,
    /// Genomic exon structure of the hit isoform.
    pub iso_location: Location,
}

impl AlignedHit {
    /// Segments projecting query protein positions onto alignment columns.
    pub fn query_segments(&self) -> Vec<ConvertSegment> {
        get_alignment_segments(&self.qseq, self.query_from, self.query_len)
    }

    /// Segments projecting hit protein positions onto alignment columns.
    pub fn hit_segments(&self) -> Vec<ConvertSegment> {
        get_alignment_segments(&self.hseq, self.hit_from, self.iso_len)
    }
}

/// Splicing regions of a query isoform pair in protein coordinates of each isoform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySplicing {
    pub splicing_a: Location,
    pub splicing_b: Location,
}

impl QuerySplicing {
    /// Derive the splicing regions of isoforms `a` and `b` from their genomic exons.
    pub fn new(a: &Location, b: &Location) -> Result<Self, Error> {
        let (global_a, global_b) = splicing_regions(a, b)?;
        let splicing_a = convert_splicing(&global_a, a)?;
        let splicing_b = convert_splicing(&global_b, b)?;
        log::debug!("query splicing a = {}, b = {}", splicing_a, splicing_b);
        Ok(Self {
            splicing_a,
            splicing_b,
        })
    }
}

/// Scalar features of a query pair compared with a hit pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplicingFeatures {
    pub isoform_blast_score: f64,
    pub splicing_difference: f64,
    pub splicing_similarity: f64,
    pub splicing_dissimilarity: f64,
}

/// Midline matches of both alignments relative to the total length of all four proteins.
pub fn isoform_blast_score(
    hit_a: &AlignedHit,
    hit_b: &AlignedHit,
    table: &MatchTable,
) -> Result<f64, Error> {
    let total_len = hit_a.query_len + hit_b.query_len + hit_a.iso_len + hit_b.iso_len;
    if total_len == 0 {
        return Err(Error::ZeroLengthHit);
    }
    let matches =
        count_all_matches(&hit_a.midline, table) + count_all_matches(&hit_b.midline, table);
    Ok(matches / total_len as f64)
}

/// Compare the splicing of a query pair with the splicing of the hit pair aligned to it.
///
/// `hit_a` is the alignment of query isoform `a`, `hit_b` the one of query isoform `b`.  The
/// splicing regions of both pairs are projected into the columns of the respective alignment
/// before scoring.
pub fn compare(
    query: &QuerySplicing,
    hit_a: &AlignedHit,
    hit_b: &AlignedHit,
    config: &Config,
) -> Result<SplicingFeatures, Error> {
    let hit_splicing = QuerySplicing::new(&hit_a.iso_location, &hit_b.iso_location)?;

    let aligned_query_a = convert_location(&query.splicing_a, &hit_a.query_segments())?;
    let aligned_hit_a = convert_location(&hit_splicing.splicing_a, &hit_a.hit_segments())?;
    let aligned_query_b = convert_location(&query.splicing_b, &hit_b.query_segments())?;
    let aligned_hit_b = convert_location(&hit_splicing.splicing_b, &hit_b.hit_segments())?;
    log::debug!(
        "aligned splicing: query a = {}, hit a = {}, query b = {}, hit b = {}",
        aligned_query_a,
        aligned_hit_a,
        aligned_query_b,
        aligned_hit_b
    );

    let splicing_difference =
        difference_score(&aligned_query_a, &aligned_query_b, &aligned_hit_a, &aligned_hit_b)?;
    let similarity = similarity_score(
        &aligned_query_a,
        &aligned_query_b,
        &aligned_hit_a,
        &aligned_hit_b,
        &hit_a.midline,
        &hit_b.midline,
        config,
    )?;

    Ok(SplicingFeatures {
        isoform_blast_score: isoform_blast_score(hit_a, hit_b, &config.match_table)?,
        splicing_difference,
        splicing_similarity: similarity.similarity,
        splicing_dissimilarity: similarity.dissimilarity,
    })
}

#[cfg(test)]
mod test {
    use anyhow::Error;
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::{compare, isoform_blast_score, AlignedHit, QuerySplicing, SplicingFeatures};
    use crate::location::{Location, Strand};
    use crate::splicing::score::{Config, MatchTable};
    use crate::splicing::Error as SplicingError;

    /// Isoform `a` includes a 9 nt cassette exon (3 residues) that `b` skips.
    fn isoforms(offset: i64) -> (Location, Location) {
        let a = Location::from_ranges(
            &[(offset, offset + 30), (offset + 50, offset + 59), (offset + 80, offset + 110)],
            Some(Strand::Forward),
        );
        let b = Location::from_ranges(
            &[(offset, offset + 30), (offset + 80, offset + 110)],
            Some(Strand::Forward),
        );
        (a, b)
    }

    fn identity_hit(len: usize, iso_location: Location) -> AlignedHit {
        let seq = "M".repeat(len);
        AlignedHit {
            qseq: seq.clone(),
            hseq: seq.clone(),
            midline: seq,
            query_from: 0,
            hit_from: 0,
            query_len: len as i64,
            iso_len: len as i64,
            iso_location,
        }
    }

    #[test]
    fn query_splicing() -> Result<(), Error> {
        let (a, b) = isoforms(0);
        let query = QuerySplicing::new(&a, &b)?;

        assert_eq!(query.splicing_a, Location::from_ranges(&[(10, 13)], None));
        assert!(query.splicing_b.is_empty());

        Ok(())
    }

    #[test]
    fn orthologous_pair_matches() -> Result<(), Error> {
        let (a, b) = isoforms(0);
        let query = QuerySplicing::new(&a, &b)?;
        let (hit_iso_a, hit_iso_b) = isoforms(1000);
        let hit_a = identity_hit(23, hit_iso_a);
        let hit_b = identity_hit(20, hit_iso_b);

        let features = compare(&query, &hit_a, &hit_b, &Config::default())?;

        assert_eq!(
            features,
            SplicingFeatures {
                isoform_blast_score: 43.0 / 86.0,
                splicing_difference: 0.0,
                splicing_similarity: 1.0,
                splicing_dissimilarity: 0.0,
            }
        );

        Ok(())
    }

    #[test]
    fn shifted_hit_differs() -> Result<(), Error> {
        let (a, b) = isoforms(0);
        let query = QuerySplicing::new(&a, &b)?;
        let (hit_iso_a, hit_iso_b) = isoforms(1000);
        // Hit alignment of `a` starts one residue into the hit protein.
        let mut hit_a = identity_hit(23, hit_iso_a);
        hit_a.hit_from = 1;
        let hit_b = identity_hit(20, hit_iso_b);

        let features = compare(&query, &hit_a, &hit_b, &Config::default())?;

        // Query region at columns 10..13, hit region at columns 9..12.
        assert_eq!(features.splicing_difference, 2.0 / 3.0);
        assert_eq!(features.splicing_similarity, 1.0);
        assert!((features.splicing_dissimilarity - 1.0 / 3.0).abs() < 1e-9);

        Ok(())
    }

    #[test]
    fn zero_length_hit() {
        let empty = identity_hit(0, Location::default());
        assert_eq!(
            isoform_blast_score(&empty, &empty, &MatchTable::default()),
            Err(SplicingError::ZeroLengthHit)
        );
    }

    #[test]
    fn features_serialize_by_name() -> Result<(), Error> {
        let features = SplicingFeatures {
            isoform_blast_score: 0.5,
            splicing_difference: 1.0,
            splicing_similarity: 0.0,
            splicing_dissimilarity: 0.25,
        };
        let value = serde_json::to_value(features)?;

        assert_eq!(value["isoform_blast_score"], 0.5);
        assert_eq!(value["splicing_dissimilarity"], 0.25);
        assert_eq!(serde_json::from_value::<SplicingFeatures>(value)?, features);

        Ok(())
    }
}
