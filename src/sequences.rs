//! Utility code for working with sequences.

use crate::location::{is_reverse, Location, LocationPart};

/// Reverse complementing shortcut.
pub fn revcomp(seq: &str) -> String {
    String::from_utf8_lossy(&bio::alphabets::dna::revcomp(seq.as_bytes())).into_owned()
}

/// Subsequence of `seq` covered by `part`, reverse complemented on the reverse strand.
///
/// The part is clamped to the sequence, so parts out of range yield a truncated or empty
/// result.
pub fn extract_part(part: &LocationPart, seq: &str) -> String {
    let len = seq.len() as i64;
    let start = part.start.clamp(0, len);
    let end = part.end.clamp(start, len);
    let slice = seq.get(start as usize..end as usize).unwrap_or_default();
    if is_reverse(part.strand) {
        revcomp(slice)
    } else {
        slice.to_string()
    }
}

/// Concatenation of the subsequences of all parts of `loc` in stored order.
pub fn extract(loc: &Location, seq: &str) -> String {
    loc.parts
        .iter()
        .map(|part| extract_part(part, seq))
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
