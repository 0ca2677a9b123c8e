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

//! Types to represent ballots in an election.

use crate::error::InputError;

/// Ballot cast in the election, as a strict ranking of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    /// Number of electors that have cast this ballot.
    count: usize,
    /// Candidates from most preferred to least preferred. The candidate at
    /// index `i` has rank `i + 1`.
    order: Box<[usize]>,
}

impl Ballot {
    /// Constructs a new ballot from an order of candidates, most preferred
    /// first.
    pub fn new(count: usize, order: impl IntoIterator<Item = usize>) -> Self {
        Self {
            count,
            order: order.into_iter().collect(),
        }
    }

    /// Constructs a new ballot from a mapping of candidates to ranks. The
    /// ranks must be exactly `1..=n` for a ballot ranking `n` candidates.
    pub fn from_ranks(
        count: usize,
        ranks: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, InputError> {
        let mut ranks: Vec<(usize, usize)> = ranks.into_iter().collect();
        ranks.sort_unstable_by_key(|&(_, rank)| rank);
        for (i, &(candidate, rank)) in ranks.iter().enumerate() {
            if rank != i + 1 {
                return Err(InputError::InvalidRanks(format!(
                    "candidate {candidate} has rank {rank}, expected {}",
                    i + 1
                )));
            }
        }

        let ballot = Self::new(count, ranks.into_iter().map(|(candidate, _)| candidate));
        ballot.validate()?;
        Ok(ballot)
    }

    /// Returns the number of times this ballot was cast.
    #[inline(always)]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the candidates in this ballot, from most preferred to least
    /// preferred.
    #[inline(always)]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Returns the candidates that this ballot supports under the l-Bloc
    /// rule, i.e. the candidates ranked within the top `l`.
    #[inline(always)]
    pub fn top(&self, l: usize) -> &[usize] {
        &self.order[..l.min(self.order.len())]
    }

    /// Returns the rank of the given candidate (1 = most preferred), if the
    /// candidate is ranked in this ballot.
    pub fn rank_of(&self, candidate: usize) -> Option<usize> {
        self.order
            .iter()
            .position(|&c| c == candidate)
            .map(|i| i + 1)
    }

    /// Returns whether this ballot ranks no candidate.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns a copy of this ballot cast by the given number of electors.
    pub(crate) fn with_count(&self, count: usize) -> Self {
        Self {
            count,
            order: self.order.clone(),
        }
    }

    /// Checks that a ballot is valid, i.e. that no candidate appears twice in
    /// the ballot.
    pub fn validate(&self) -> Result<(), InputError> {
        let mut all: Vec<usize> = self.order.to_vec();
        all.sort_unstable();
        match all.windows(2).find(|pair| pair[0] == pair[1]) {
            Some(pair) => Err(InputError::RepeatedCandidate { candidate: pair[0] }),
            None => Ok(()),
        }
    }
}
