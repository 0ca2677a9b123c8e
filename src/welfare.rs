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

//! Welfare functions, evaluating a set of candidates from the point of view
//! of the manipulators.

use crate::types::Utilities;
use std::fmt::{self, Display};

/// Welfare function used to compare outcomes of a manipulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Welfare {
    /// Sum over all candidates of the sum of the manipulators' utilities.
    Utilitarian,
    /// Minimum utility over all candidates and manipulators.
    Egalitarian,
    /// Sum over all candidates of the minimum utility of any manipulator for
    /// that candidate.
    CandidateEgalitarian,
}

impl Welfare {
    /// Evaluates the given set of candidates.
    ///
    /// Empty minimums (no candidate, or no manipulator) count as zero.
    pub fn evaluate(&self, utilities: &Utilities, candidates: &[usize]) -> u64 {
        match self {
            Welfare::Utilitarian => candidates
                .iter()
                .map(|&c| utilities.of(c).iter().sum::<u64>())
                .sum(),
            Welfare::Egalitarian => candidates
                .iter()
                .flat_map(|&c| utilities.of(c).iter().copied())
                .min()
                .unwrap_or(0),
            Welfare::CandidateEgalitarian => candidates
                .iter()
                .map(|&c| utilities.of(c).iter().copied().min().unwrap_or(0))
                .sum(),
        }
    }
}

impl Display for Welfare {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Welfare::Utilitarian => f.write_str("utilitarian"),
            Welfare::Egalitarian => f.write_str("egalitarian"),
            Welfare::CandidateEgalitarian => f.write_str("candidate-wise egalitarian"),
        }
    }
}
