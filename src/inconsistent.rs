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

//! Inconsistent manipulation, where each manipulator approves its own set of
//! `l` candidates, for a total of `r * l` approvals.
//!
//! The search fixes the weakest member `c` of the manipulated committee and
//! its final score `z`. The remaining seats are then filled by solving an
//! exact k-item knapsack, where the weight of a candidate is the number of
//! approvals it needs to overtake `c`.

use crate::error::InputError;
use crate::knapsack::{exact_knapsack, Item};
use crate::manipulation::{Context, Manipulation, Outcome, Parallel};
use crate::score::ScoreMap;
use crate::types::{Ballot, Utilities};
use crate::welfare::Welfare;
use log::{debug, info, trace};

/// Finds the best manipulation where each manipulator approves `l`
/// candidates of its choice.
///
/// The support of the result contains the candidates that the manipulators
/// reinforce to join the committee. If no manipulation improves the welfare
/// of the manipulators, the truthful committee is returned with no seat
/// changed.
pub fn inconsistent_manipulation(
    l: usize,
    k: usize,
    profile: &[Ballot],
    utilities: &Utilities,
    welfare: Welfare,
    parallel: Parallel,
) -> Result<Manipulation, InputError> {
    let context = Context::new(l, k, profile, utilities, welfare)?;
    let r = context.r;
    info!(
        "Inconsistent manipulation with {r} manipulators, l = {l}, k = {k}, {welfare} welfare"
    );

    let window = candidate_window(k, r, l).min(context.order.len());
    let hypotheses: Vec<(usize, usize)> = context.order[..window]
        .iter()
        .flat_map(|&c| {
            let score = context.scores.score(c);
            (score..score + r).map(move |z| (c, z))
        })
        .collect();
    debug!(
        "Considering {} hypotheses over the {window} strongest candidates",
        hypotheses.len()
    );

    let best = context.best_outcome(&hypotheses, parallel, |&(c, z)| {
        weakest_member(&context, c, z)
    });
    Ok(context.finish(best))
}

/// Number of strongest candidates that are considered as the weakest member
/// of the manipulated committee.
fn candidate_window(k: usize, r: usize, l: usize) -> usize {
    k + r * l
}

/// Parameters of the knapsack associated to a weakest member `c` with final
/// score `z`.
#[derive(Debug, PartialEq, Eq)]
struct KnapsackParameters {
    /// Candidates that stay above `c` regardless of the manipulation.
    above: Vec<usize>,
    /// Number of seats left to fill, besides `above` and `c`.
    remaining_seats: usize,
    /// Number of approvals left after raising `c` to `z`.
    budget: usize,
    /// Candidates that can overtake `c` with at most `r` approvals.
    eligible: Vec<usize>,
}

/// Returns whether candidate `a` wins a tie against candidate `b`.
#[inline(always)]
fn beats_tie(a: usize, b: usize) -> bool {
    a < b
}

/// Computes the knapsack parameters, or returns [`None`] if `c` can't be the
/// weakest committee member with score `z`.
fn knapsack_parameters(
    k: usize,
    r: usize,
    l: usize,
    c: usize,
    z: usize,
    scores: &ScoreMap,
    order: &[usize],
) -> Option<KnapsackParameters> {
    let above: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&x| {
            let score = scores.score(x);
            score > z || (score == z && beats_tie(x, c))
        })
        .collect();
    if above.len() >= k {
        trace!("[c = {c}, z = {z}] Infeasible: {} candidates above", above.len());
        return None;
    }

    let remaining_seats = k - above.len() - 1;
    let budget = r * l - (z - scores.score(c));

    let eligible: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&x| x != c && !above.contains(&x))
        .filter(|&x| {
            let score = scores.score(x);
            score + r > z || (score + r == z && beats_tie(x, c))
        })
        .collect();
    if eligible.len() < remaining_seats {
        trace!(
            "[c = {c}, z = {z}] Infeasible: {} eligible candidates for {remaining_seats} seats",
            eligible.len()
        );
        return None;
    }

    Some(KnapsackParameters {
        above,
        remaining_seats,
        budget,
        eligible,
    })
}

/// Number of approvals that each candidate needs to end up above `c` with
/// score `z`.
fn weights(c: usize, z: usize, scores: &ScoreMap, candidates: &[usize]) -> Vec<usize> {
    candidates
        .iter()
        .map(|&x| {
            let needed = z - scores.score(x);
            if beats_tie(x, c) {
                needed
            } else {
                needed + 1
            }
        })
        .collect()
}

/// Counts the approvals that can't be spent without changing the committee.
/// The hypothesis is valid only if the result isn't positive.
///
/// Approvals are absorbed by the chosen candidates (up to `r` each), by
/// candidates that can't reach `c` (up to `r` each), by `c` itself (up to the
/// `r` approvals it hasn't received yet), and by the eligible candidates that
/// aren't chosen (one fewer than their weight).
#[allow(clippy::too_many_arguments)]
fn leftover_approvals(
    r: usize,
    c: usize,
    z: usize,
    scores: &ScoreMap,
    order: &[usize],
    parameters: &KnapsackParameters,
    weights: &[usize],
    chosen: &[usize],
) -> i64 {
    let mut leftover = parameters.budget as i64 - (r * parameters.remaining_seats) as i64;

    let unaffected = order
        .iter()
        .filter(|&&x| x != c && !parameters.eligible.contains(&x))
        .count();
    leftover -= (r * unaffected) as i64;

    leftover -= (r - (z - scores.score(c))) as i64;

    let unchosen: usize = weights
        .iter()
        .enumerate()
        .filter(|(i, _)| !chosen.contains(i))
        .map(|(_, &w)| w - 1)
        .sum();
    leftover -= unchosen as i64;

    leftover
}

/// Evaluates the hypothesis where `c` is the weakest committee member, with a
/// final score of `z`.
fn weakest_member(context: &Context, c: usize, z: usize) -> Option<Outcome> {
    let (l, k, r) = (context.l, context.k, context.r);
    let scores = &context.scores;
    let order = &context.order;

    let parameters = knapsack_parameters(k, r, l, c, z, scores, order)?;

    if parameters.remaining_seats == 0 {
        // The strongest candidates already fill the committee.
        trace!("[c = {c}, z = {z}] No seat to fill");
        return Some(context.truthful_outcome());
    }

    let weights = weights(c, z, scores, &parameters.eligible);
    let items: Vec<Item> = parameters
        .eligible
        .iter()
        .zip(&weights)
        .map(|(&x, &weight)| Item {
            weight,
            value: context.values[x],
        })
        .collect();

    let Some(solution) = exact_knapsack(&items, parameters.remaining_seats, parameters.budget)
    else {
        trace!("[c = {c}, z = {z}] Infeasible knapsack");
        return None;
    };

    let leftover = leftover_approvals(
        r,
        c,
        z,
        scores,
        order,
        &parameters,
        &weights,
        &solution.items,
    );
    if leftover > 0 {
        debug!("[c = {c}, z = {z}] Rejected: {leftover} approvals can't be distributed");
        return None;
    }

    let support: Vec<usize> = solution
        .items
        .iter()
        .map(|&i| parameters.eligible[i])
        .collect();
    let committee: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&x| x == c || parameters.above.contains(&x) || support.contains(&x))
        .collect();
    let evaluation = context.evaluate(&committee);
    debug!(
        "[c = {c}, z = {z}] Support {support:?} => committee {committee:?}, evaluation {evaluation}"
    );

    Some(Outcome {
        support,
        evaluation,
        committee,
    })
}
