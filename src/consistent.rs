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

//! Consistent manipulation, where all the manipulators cast the same ballot
//! supporting the same `l` candidates.
//!
//! The search iterates over the number `t` of truthful committee members that
//! keep their seat. The candidate at position `t` in the strength order is
//! then the strongest candidate pushed out of the committee, and the freed
//! seats must be filled with candidates that can overtake it.

use crate::error::InputError;
use crate::manipulation::{Context, Manipulation, Outcome, Parallel};
use crate::score::{strength_order, ScoreMap};
use crate::types::{Ballot, Utilities};
use crate::welfare::Welfare;
use log::{debug, info, trace};

/// Finds the best manipulation where all manipulators support the same `l`
/// candidates.
///
/// If no manipulation improves the welfare of the manipulators, the truthful
/// committee is returned with no seat changed.
pub fn consistent_manipulation(
    l: usize,
    k: usize,
    profile: &[Ballot],
    utilities: &Utilities,
    welfare: Welfare,
    parallel: Parallel,
) -> Result<Manipulation, InputError> {
    let context = Context::new(l, k, profile, utilities, welfare)?;
    info!(
        "Consistent manipulation with {} manipulators, l = {l}, k = {k}, {welfare} welfare",
        context.r
    );

    let first = k.saturating_sub(l);
    let last = k.min(context.order.len() - 1);
    let kept: Vec<usize> = (first..=last).collect();

    let best = context.best_outcome(&kept, parallel, |&t| keep_seats(&context, t));
    Ok(context.finish(best))
}

/// Evaluates the hypothesis where the `t` strongest candidates keep their
/// seat.
fn keep_seats(context: &Context, t: usize) -> Option<Outcome> {
    let (l, k, r) = (context.l, context.k, context.r);
    let order = &context.order;

    let dropped = order[t];
    let distinguished = distinguished_candidates(dropped, r, &context.scores, order);
    if distinguished.len() < k - t {
        debug!(
            "[t = {t}] Skipping: only {} distinguished candidates to beat candidate {dropped}",
            distinguished.len()
        );
        return None;
    }

    let support = optimal_support(k, l, t, &distinguished, order, &context.values);
    let committee = manipulated_committee(r, k, &support, &context.scores);
    let evaluation = context.evaluate(&committee);
    debug!(
        "[t = {t}] Dropped candidate {dropped}, support {support:?} => committee {committee:?}, evaluation {evaluation}"
    );

    Some(Outcome {
        support,
        evaluation,
        committee,
    })
}

/// Returns the candidates that can end up stronger than the dropped candidate
/// by receiving `r` additional votes, in strength order.
///
/// Such a candidate either has the same score and loses the tie-break against
/// the dropped candidate, or has a lower score but overtakes it with `r`
/// votes, or catches up exactly and wins the tie-break.
fn distinguished_candidates(
    dropped: usize,
    r: usize,
    scores: &ScoreMap,
    order: &[usize],
) -> Vec<usize> {
    let target = scores.score(dropped);
    order
        .iter()
        .copied()
        .filter(|&c| {
            let score = scores.score(c);
            (score == target && c > dropped)
                || (score < target && score + r > target)
                || (score + r == target && c < dropped)
        })
        .collect()
}

/// Returns up to `n` of the given candidates with the largest values. Ties are
/// broken in favor of candidates appearing first.
fn most_valuable(n: usize, candidates: &[usize], values: &[u64]) -> Vec<usize> {
    let mut sorted = candidates.to_vec();
    // Stable sort, to keep the input order among equal values.
    sorted.sort_by(|&a, &b| values[b].cmp(&values[a]));
    sorted.truncate(n);
    sorted
}

/// Returns the `n` weakest candidates that aren't in the given set.
fn weakest_outside(n: usize, set: &[usize], order: &[usize]) -> Vec<usize> {
    let outside: Vec<usize> = order.iter().copied().filter(|c| !set.contains(c)).collect();
    outside[outside.len().saturating_sub(n)..].to_vec()
}

/// Counts how many of the `missing` weakest candidates outside the support
/// would take one of the `k` seats if they were supported together with the
/// current support.
fn displaced_count(k: usize, missing: usize, support: &[usize], order: &[usize]) -> usize {
    let weakest = weakest_outside(missing, support, order);
    order
        .iter()
        .filter(|c| support.contains(c) || weakest.contains(c))
        .take(k)
        .filter(|c| !support.contains(c))
        .count()
}

/// Builds the set of `l` candidates that the manipulators support, assuming
/// that the `t` strongest candidates keep their seat.
fn optimal_support(
    k: usize,
    l: usize,
    t: usize,
    distinguished: &[usize],
    order: &[usize],
    values: &[u64],
) -> Vec<usize> {
    // Most valuable candidates to fill the freed seats.
    let mut support = most_valuable(k - t, distinguished, values);

    // Strongest candidates, that keep their seat anyway.
    let strong = t.min(l - support.len());
    support.extend_from_slice(&order[..strong]);

    let missing = l - support.len();
    if missing != 0 {
        let displaced = displaced_count(k, missing, &support, order);
        let remaining: Vec<usize> = distinguished
            .iter()
            .copied()
            .filter(|c| !support.contains(c))
            .collect();
        support.extend(most_valuable(displaced, &remaining, values));

        let missing = l - support.len();
        if missing != 0 {
            let weakest = weakest_outside(missing, &support, order);
            support.extend(weakest);
        }
    }

    trace!("Support for t = {t}: {support:?}");
    support
}

/// Returns the winning committee when the manipulators cast `r` ballots
/// supporting the given candidates.
fn manipulated_committee(r: usize, k: usize, support: &[usize], scores: &ScoreMap) -> Vec<usize> {
    let mut order = strength_order(&scores.boosted(support, r));
    order.truncate(k);
    order
}
