// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Utilities of the manipulators for each candidate.

use super::Ballot;
use crate::error::InputError;

/// Table of utilities, mapping each candidate to the utility that each
/// manipulator derives from this candidate being elected.
///
/// Every candidate has exactly one entry per manipulator, manipulators being
/// numbered `0..num_manipulators`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utilities {
    /// Number of manipulators.
    num_manipulators: usize,
    /// Utility of each candidate (outer index) for each manipulator (inner
    /// index).
    values: Vec<Box<[u64]>>,
}

impl Utilities {
    /// Constructs a utility table from one row per candidate. Each row must
    /// contain one value per manipulator.
    pub fn new(
        num_manipulators: usize,
        rows: impl IntoIterator<Item = impl Into<Vec<u64>>>,
    ) -> Result<Self, InputError> {
        let values = rows
            .into_iter()
            .enumerate()
            .map(|(candidate, row)| {
                let row: Vec<u64> = row.into();
                if row.len() == num_manipulators {
                    Ok(row.into_boxed_slice())
                } else {
                    Err(InputError::InconsistentUtilities {
                        candidate,
                        expected: num_manipulators,
                        actual: row.len(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            num_manipulators,
            values,
        })
    }

    /// Derives utilities from the manipulators' own ballots with a Borda-like
    /// rule: a candidate ranked at position `rank` is worth `max_rank - rank +
    /// 1`, and unranked candidates are worth nothing.
    ///
    /// Each ballot contributes as many manipulators as its count. If `levels`
    /// is set, candidates ranked at `levels` or below are worth nothing, so
    /// that at most `levels` distinct values (including 0) appear.
    pub fn borda(
        manipulators: &[Ballot],
        num_candidates: usize,
        max_rank: usize,
        levels: Option<usize>,
    ) -> Self {
        let num_manipulators = manipulators.iter().map(|b| b.count()).sum();
        let mut values = vec![vec![0; num_manipulators]; num_candidates];

        let voters = manipulators
            .iter()
            .flat_map(|ballot| std::iter::repeat(ballot).take(ballot.count()));
        for (manipulator, ballot) in voters.enumerate() {
            for (i, &candidate) in ballot.order().iter().enumerate() {
                let rank = i + 1;
                let utility = match levels {
                    Some(levels) if rank >= levels => 0,
                    _ => (max_rank + 1).saturating_sub(rank) as u64,
                };
                values[candidate][manipulator] = utility;
            }
        }

        Self {
            num_manipulators,
            values: values.into_iter().map(Vec::into_boxed_slice).collect(),
        }
    }

    /// Returns the number of manipulators.
    #[inline(always)]
    pub fn num_manipulators(&self) -> usize {
        self.num_manipulators
    }

    /// Returns the number of candidates covered by this table.
    #[inline(always)]
    pub fn num_candidates(&self) -> usize {
        self.values.len()
    }

    /// Returns the utilities of a candidate across all manipulators, i.e.
    /// the candidate's type vector.
    #[inline(always)]
    pub fn of(&self, candidate: usize) -> &[u64] {
        &self.values[candidate]
    }
}
