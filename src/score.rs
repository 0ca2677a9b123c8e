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

//! Scoring of candidates under the l-Bloc rule, and the strength order that
//! derives from the scores.

use crate::types::Ballot;
use log::Level::Trace;
use log::{log_enabled, trace};
use std::cmp::Reverse;

/// Scores of the candidates, indexed by candidate.
///
/// Only candidates that appear in at least one ballot are scored. A score map
/// is never mutated once computed: hypotheses that add votes work on a
/// [`ScoreMap::boosted()`] copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreMap {
    /// Score of each candidate, or [`None`] if the candidate doesn't appear in
    /// any ballot.
    scores: Vec<Option<usize>>,
}

impl ScoreMap {
    /// Constructs a score map from explicit scores.
    pub fn from_scores(scores: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            scores: scores.into_iter().collect(),
        }
    }

    /// Returns the score of the given candidate, if it is scored.
    #[inline(always)]
    pub fn get(&self, candidate: usize) -> Option<usize> {
        self.scores.get(candidate).copied().flatten()
    }

    /// Returns the score of the given candidate, counting unscored candidates
    /// as zero.
    #[inline(always)]
    pub fn score(&self, candidate: usize) -> usize {
        self.get(candidate).unwrap_or(0)
    }

    /// Returns whether the given candidate appears in at least one ballot.
    #[inline(always)]
    pub fn is_scored(&self, candidate: usize) -> bool {
        self.get(candidate).is_some()
    }

    /// Returns the scored candidates and their scores, by increasing candidate
    /// index.
    pub fn candidates(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.scores
            .iter()
            .enumerate()
            .filter_map(|(candidate, score)| score.map(|score| (candidate, score)))
    }

    /// Returns the number of scored candidates.
    pub fn num_scored(&self) -> usize {
        self.scores.iter().filter(|score| score.is_some()).count()
    }

    /// Returns the number of candidate slots, i.e. one more than the largest
    /// candidate index seen.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns whether no candidate slot exists.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Returns a copy of this score map, where each of the given candidates
    /// receives the given number of additional votes.
    pub fn boosted(&self, support: &[usize], votes: usize) -> Self {
        let mut scores = self.scores.clone();
        for &candidate in support {
            if candidate >= scores.len() {
                scores.resize(candidate + 1, None);
            }
            let score = &mut scores[candidate];
            *score = Some(score.unwrap_or(0) + votes);
        }
        Self { scores }
    }
}

/// Computes the l-Bloc score of each candidate: the number of electors that
/// rank the candidate within their top `l`.
///
/// Every candidate appearing in a ballot is scored, even if it never makes it
/// to the top `l`.
pub fn score_map(l: usize, profile: &[Ballot]) -> ScoreMap {
    debug_assert!(l >= 1);

    let num_slots = profile
        .iter()
        .flat_map(|b| b.order().iter())
        .max()
        .map_or(0, |&c| c + 1);
    let mut scores = vec![None; num_slots];
    for ballot in profile {
        for &candidate in ballot.order() {
            scores[candidate].get_or_insert(0);
        }
        for &candidate in ballot.top(l) {
            if let Some(score) = scores[candidate].as_mut() {
                *score += ballot.count();
            }
        }
    }

    let score_map = ScoreMap { scores };
    if log_enabled!(Trace) {
        trace!("Scores ({l}-Bloc):");
        for (candidate, score) in score_map.candidates() {
            trace!("  Score[{candidate}] = {score}");
        }
    }
    score_map
}

/// Orders the scored candidates from strongest to weakest: by decreasing
/// score, and by increasing candidate index among candidates with the same
/// score (lexicographic tie-break).
pub fn strength_order(scores: &ScoreMap) -> Vec<usize> {
    let mut order: Vec<(usize, usize)> = scores.candidates().collect();
    order.sort_unstable_by_key(|&(candidate, score)| (Reverse(score), candidate));
    order.into_iter().map(|(candidate, _)| candidate).collect()
}

/// Counts the members of the committee that are not among the first `k`
/// candidates of the truthful strength order.
pub fn seats_changed(k: usize, committee: &[usize], truthful_order: &[usize]) -> usize {
    let truthful = &truthful_order[..k.min(truthful_order.len())];
    committee
        .iter()
        .filter(|candidate| !truthful.contains(candidate))
        .count()
}
