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

//! Common machinery of the manipulation searches: input validation, search
//! context and selection of the best outcome.

use crate::consistent::consistent_manipulation;
use crate::error::InputError;
use crate::inconsistent::inconsistent_manipulation;
use crate::score::{score_map, seats_changed, strength_order, ScoreMap};
use crate::types::{Ballot, Utilities};
use crate::welfare::Welfare;
use log::Level::Trace;
use log::{debug, info, log_enabled, trace};
use rayon::prelude::*;
use std::fmt::{self, Display};

/// Model of the coalition of manipulators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// All manipulators cast the same ballot, see
    /// [`consistent_manipulation()`].
    Consistent,
    /// Each manipulator casts its own ballot, see
    /// [`inconsistent_manipulation()`].
    Inconsistent,
}

impl Algorithm {
    /// Runs the manipulation search of this model.
    pub fn search(
        &self,
        l: usize,
        k: usize,
        profile: &[Ballot],
        utilities: &Utilities,
        welfare: Welfare,
        parallel: Parallel,
    ) -> Result<Manipulation, InputError> {
        match self {
            Algorithm::Consistent => {
                consistent_manipulation(l, k, profile, utilities, welfare, parallel)
            }
            Algorithm::Inconsistent => {
                inconsistent_manipulation(l, k, profile, utilities, welfare, parallel)
            }
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Algorithm::Consistent => f.write_str("consistent"),
            Algorithm::Inconsistent => f.write_str("inconsistent"),
        }
    }
}

/// Strategy to evaluate the independent hypotheses of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallel {
    /// Evaluate hypotheses serially.
    No,
    /// Evaluate hypotheses in parallel with the rayon crate.
    Rayon,
}

/// Result of a manipulation search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manipulation {
    /// Candidates that the manipulators support.
    pub support: Vec<usize>,
    /// Welfare of the winning committee.
    pub evaluation: u64,
    /// Winning committee after manipulation.
    pub committee: Vec<usize>,
    /// Number of committee members that wouldn't win without manipulation.
    pub seats_changed: usize,
}

impl Manipulation {
    /// Returns whether no improving manipulation was found, in which case the
    /// committee is the truthful one.
    pub fn is_truthful(&self) -> bool {
        self.seats_changed == 0
    }
}

/// Outcome of one hypothesis of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) support: Vec<usize>,
    pub(crate) evaluation: u64,
    pub(crate) committee: Vec<usize>,
}

/// Read-only state shared by all the hypotheses of a search.
pub(crate) struct Context<'a> {
    /// Number of candidates that each ballot supports.
    pub(crate) l: usize,
    /// Committee size.
    pub(crate) k: usize,
    /// Number of manipulators.
    pub(crate) r: usize,
    utilities: &'a Utilities,
    welfare: Welfare,
    /// Truthful scores.
    pub(crate) scores: ScoreMap,
    /// Truthful strength order.
    pub(crate) order: Vec<usize>,
    /// Welfare of each candidate on its own.
    pub(crate) values: Vec<u64>,
}

impl<'a> Context<'a> {
    /// Validates the input and computes the truthful scores.
    pub(crate) fn new(
        l: usize,
        k: usize,
        profile: &[Ballot],
        utilities: &'a Utilities,
        welfare: Welfare,
    ) -> Result<Self, InputError> {
        if l < 1 {
            return Err(InputError::InvalidBlocSize);
        }
        if profile.is_empty() {
            return Err(InputError::EmptyProfile);
        }
        for (i, ballot) in profile.iter().enumerate() {
            if ballot.count() == 0 {
                return Err(InputError::EmptyBallotCount { ballot: i });
            }
            ballot.validate()?;
        }

        let scores = score_map(l, profile);
        let num_scored = scores.num_scored();
        if k < 1 || k > num_scored {
            return Err(InputError::InvalidCommitteeSize {
                committee_size: k,
                num_scored,
            });
        }
        if let Some((candidate, _)) = scores
            .candidates()
            .find(|&(candidate, _)| candidate >= utilities.num_candidates())
        {
            return Err(InputError::MissingUtilities { candidate });
        }

        let order = strength_order(&scores);
        let values = (0..scores.len())
            .map(|c| {
                if scores.is_scored(c) {
                    welfare.evaluate(utilities, &[c])
                } else {
                    0
                }
            })
            .collect();

        if log_enabled!(Trace) {
            trace!("Strength order:");
            for (i, &c) in order.iter().enumerate() {
                trace!("    [{i}] candidate {c} = {}", scores.score(c));
            }
        }

        Ok(Self {
            l,
            k,
            r: utilities.num_manipulators(),
            utilities,
            welfare,
            scores,
            order,
            values,
        })
    }

    /// Evaluates a set of candidates with the welfare function of this search.
    pub(crate) fn evaluate(&self, candidates: &[usize]) -> u64 {
        self.welfare.evaluate(self.utilities, candidates)
    }

    /// Returns the truthful committee.
    pub(crate) fn truthful_committee(&self) -> &[usize] {
        &self.order[..self.k]
    }

    /// Returns the outcome where the manipulators support the strongest
    /// candidates, which leaves the truthful committee unchanged.
    pub(crate) fn truthful_outcome(&self) -> Outcome {
        let committee = self.truthful_committee().to_vec();
        Outcome {
            support: self.order[..self.l.min(self.order.len())].to_vec(),
            evaluation: self.evaluate(&committee),
            committee,
        }
    }

    /// Evaluates all the hypotheses and returns the best outcome, starting
    /// from the truthful outcome. An outcome replaces the current best only if
    /// its evaluation is strictly larger, so that earlier hypotheses win ties
    /// regardless of the parallelism strategy.
    pub(crate) fn best_outcome<H, F>(&self, hypotheses: &[H], parallel: Parallel, f: F) -> Outcome
    where
        H: Sync,
        F: Fn(&H) -> Option<Outcome> + Sync + Send,
    {
        let outcomes: Vec<Option<Outcome>> = match parallel {
            Parallel::No => hypotheses.iter().map(&f).collect(),
            Parallel::Rayon => hypotheses.par_iter().map(&f).collect(),
        };
        debug!(
            "Evaluated {} hypotheses, {} feasible",
            hypotheses.len(),
            outcomes.iter().filter(|o| o.is_some()).count()
        );

        outcomes
            .into_iter()
            .flatten()
            .fold(self.truthful_outcome(), |best, outcome| {
                if outcome.evaluation > best.evaluation {
                    outcome
                } else {
                    best
                }
            })
    }

    /// Converts the best outcome into the result of the search.
    pub(crate) fn finish(&self, best: Outcome) -> Manipulation {
        let manipulation = Manipulation {
            seats_changed: seats_changed(self.k, &best.committee, &self.order),
            support: best.support,
            evaluation: best.evaluation,
            committee: best.committee,
        };
        info!(
            "Best manipulation: support {:?}, committee {:?}, evaluation {}, {} seat(s) changed",
            manipulation.support,
            manipulation.committee,
            manipulation.evaluation,
            manipulation.seats_changed
        );
        manipulation
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_profile() -> Vec<Ballot> {
        vec![
            Ballot::new(1, [0, 1, 2]),
            Ballot::new(2, [2, 0]),
            Ballot::new(1, [1, 2]),
        ]
    }

    fn make_utilities() -> Utilities {
        Utilities::new(2, [vec![1, 0], vec![2, 2], vec![0, 5]]).unwrap()
    }

    #[test]
    fn test_context() {
        let profile = make_profile();
        let utilities = make_utilities();
        let context = Context::new(1, 2, &profile, &utilities, Welfare::Utilitarian).unwrap();
        assert_eq!(context.r, 2);
        assert_eq!(context.order, vec![2, 0, 1]);
        assert_eq!(context.values, vec![1, 4, 5]);
        assert_eq!(context.truthful_committee(), &[2, 0]);
        assert_eq!(
            context.truthful_outcome(),
            Outcome {
                support: vec![2],
                evaluation: 6,
                committee: vec![2, 0],
            }
        );
    }

    #[test]
    fn test_context_invalid_bloc_size() {
        let profile = make_profile();
        let utilities = make_utilities();
        assert_eq!(
            Context::new(0, 2, &profile, &utilities, Welfare::Utilitarian).err(),
            Some(InputError::InvalidBlocSize)
        );
    }

    #[test]
    fn test_context_invalid_committee_size() {
        let profile = make_profile();
        let utilities = make_utilities();
        assert_eq!(
            Context::new(1, 4, &profile, &utilities, Welfare::Utilitarian).err(),
            Some(InputError::InvalidCommitteeSize {
                committee_size: 4,
                num_scored: 3
            })
        );
        assert_eq!(
            Context::new(1, 0, &profile, &utilities, Welfare::Utilitarian).err(),
            Some(InputError::InvalidCommitteeSize {
                committee_size: 0,
                num_scored: 3
            })
        );
    }

    #[test]
    fn test_context_empty_profile() {
        let utilities = make_utilities();
        assert_eq!(
            Context::new(1, 1, &[], &utilities, Welfare::Utilitarian).err(),
            Some(InputError::EmptyProfile)
        );
    }

    #[test]
    fn test_context_invalid_ballots() {
        let utilities = make_utilities();
        assert_eq!(
            Context::new(1, 1, &[Ballot::new(0, [0])], &utilities, Welfare::Utilitarian).err(),
            Some(InputError::EmptyBallotCount { ballot: 0 })
        );
        assert_eq!(
            Context::new(
                1,
                1,
                &[Ballot::new(1, [0]), Ballot::new(1, [1, 1])],
                &utilities,
                Welfare::Utilitarian
            )
            .err(),
            Some(InputError::RepeatedCandidate { candidate: 1 })
        );
    }

    #[test]
    fn test_context_missing_utilities() {
        let profile = vec![Ballot::new(1, [0, 3])];
        let utilities = make_utilities();
        assert_eq!(
            Context::new(1, 1, &profile, &utilities, Welfare::Utilitarian).err(),
            Some(InputError::MissingUtilities { candidate: 3 })
        );
    }

    #[test]
    fn test_best_outcome_first_wins() {
        let profile = make_profile();
        let utilities = make_utilities();
        let context = Context::new(1, 2, &profile, &utilities, Welfare::Utilitarian).unwrap();

        let hypotheses = [(0, 3), (1, 9), (2, 9), (3, 7)];
        for parallel in [Parallel::No, Parallel::Rayon] {
            let best = context.best_outcome(&hypotheses, parallel, |&(id, evaluation)| {
                Some(Outcome {
                    support: vec![id],
                    evaluation,
                    committee: vec![],
                })
            });
            assert_eq!(best.evaluation, 9);
            assert_eq!(best.support, vec![1]);
        }
    }

    #[test]
    fn test_algorithm_search() {
        let profile = make_profile();
        let utilities = make_utilities();
        assert_eq!(
            Algorithm::Consistent.search(1, 2, &profile, &utilities, Welfare::Egalitarian, Parallel::No),
            consistent_manipulation(1, 2, &profile, &utilities, Welfare::Egalitarian, Parallel::No)
        );
        assert_eq!(
            Algorithm::Inconsistent.search(1, 2, &profile, &utilities, Welfare::Egalitarian, Parallel::No),
            inconsistent_manipulation(1, 2, &profile, &utilities, Welfare::Egalitarian, Parallel::No)
        );
        assert_eq!(Algorithm::Consistent.to_string(), "consistent");
        assert_eq!(Algorithm::Inconsistent.to_string(), "inconsistent");
    }

    #[test]
    fn test_best_outcome_keeps_truthful() {
        let profile = make_profile();
        let utilities = make_utilities();
        let context = Context::new(1, 2, &profile, &utilities, Welfare::Utilitarian).unwrap();

        let best = context.best_outcome(&[1u64, 6], Parallel::No, |&evaluation| {
            Some(Outcome {
                support: vec![],
                evaluation,
                committee: vec![],
            })
        });
        assert_eq!(best, context.truthful_outcome());
        assert!(context.finish(best).is_truthful());
    }
}
