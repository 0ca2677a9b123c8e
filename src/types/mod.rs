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

//! Types to represent an election.

mod ballot;
mod utilities;

pub use ballot::Ballot;
use log::debug;
pub use utilities::Utilities;

/// Election input, representing a parsed ballot file.
#[derive(Debug, PartialEq, Eq)]
pub struct Election {
    /// Name of the election.
    pub title: String,
    /// Number of candidates.
    pub num_candidates: usize,
    /// Number of elected seats.
    pub num_seats: usize,
    /// Number of ballots that were cast in the election.
    pub num_ballots: usize,
    /// Candidates in this election.
    pub candidates: Vec<Candidate>,
    /// Ballots that were cast in this election.
    pub ballots: Vec<Ballot>,
}

impl Election {
    /// Returns a new builder.
    pub fn builder() -> ElectionBuilder {
        ElectionBuilder::default()
    }

    /// Returns the lowest rank (i.e. the longest ballot length) present in
    /// any ballot.
    pub fn max_rank(&self) -> usize {
        self.ballots
            .iter()
            .map(|b| b.order().len())
            .max()
            .unwrap_or(0)
    }

    /// Splits the electorate into manipulators and non-manipulative voters.
    ///
    /// Ballots are expanded into individual voters following their order in
    /// the election, and the first `num_manipulators` voters are the
    /// manipulators. Returns the manipulators' ballots and the remaining
    /// profile, both with counts merged per input ballot.
    pub fn split_manipulators(&self, num_manipulators: usize) -> (Vec<Ballot>, Vec<Ballot>) {
        let mut manipulators = Vec::new();
        let mut profile = Vec::new();
        let mut remaining = num_manipulators;
        for ballot in &self.ballots {
            let taken = remaining.min(ballot.count());
            remaining -= taken;
            if taken != 0 {
                manipulators.push(ballot.with_count(taken));
            }
            if taken != ballot.count() {
                profile.push(ballot.with_count(ballot.count() - taken));
            }
        }
        debug!(
            "Split {} manipulators ({} ballots) from {} non-manipulative ballots",
            num_manipulators - remaining,
            manipulators.len(),
            profile.len()
        );
        (manipulators, profile)
    }
}

/// Builder for the [`Election`] type.
#[derive(Default)]
pub struct ElectionBuilder {
    title: Option<String>,
    num_seats: Option<usize>,
    num_ballots: Option<usize>,
    candidates: Vec<Candidate>,
    ballots: Vec<Ballot>,
}

impl ElectionBuilder {
    /// Build the [`Election`] object.
    pub fn build(self) -> Election {
        let num_ballots = self
            .num_ballots
            .unwrap_or_else(|| self.ballots.iter().map(|b| b.count()).sum());
        Election {
            title: self.title.unwrap_or_default(),
            num_candidates: self.candidates.len(),
            num_seats: self.num_seats.unwrap_or(1),
            num_ballots,
            candidates: self.candidates,
            ballots: self.ballots,
        }
    }

    /// Sets the name of the election.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_owned());
        self
    }

    /// Sets the number of elected seats.
    pub fn num_seats(mut self, num_seats: usize) -> Self {
        self.num_seats = Some(num_seats);
        self
    }

    /// Checks that the given number of ballots is consistent with the actual
    /// number of ballots previously set with [`Self::ballots()`].
    pub fn check_num_ballots(mut self, num_ballots: usize) -> Self {
        assert_eq!(num_ballots, self.ballots.iter().map(|b| b.count()).sum());
        self.num_ballots = Some(num_ballots);
        self
    }

    /// Sets the list of candidates in the election.
    pub fn candidates(mut self, candidates: impl Into<Vec<Candidate>>) -> Self {
        self.candidates = candidates.into();
        self
    }

    /// Sets the list of ballots in the election.
    pub fn ballots(mut self, ballots: impl Into<Vec<Ballot>>) -> Self {
        self.ballots = ballots.into();
        self
    }
}

/// Candidate in an election.
#[derive(Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Nickname, used for parsing ballots.
    pub nickname: String,
    /// Full name, used to output results.
    pub name: String,
}

impl Candidate {
    /// Constructs a new [`Candidate`], whose name is the nickname with an
    /// uppercase first letter.
    pub fn new(nickname: impl Into<String>) -> Self {
        let nickname = nickname.into();
        let mut chars = nickname.chars();
        let name = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Candidate { nickname, name }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_election() -> Election {
        Election::builder()
            .title("Vegetable contest")
            .num_seats(2)
            .candidates([
                Candidate::new("apple"),
                Candidate::new("banana"),
                Candidate::new("cherry"),
            ])
            .ballots([
                Ballot::new(2, [0, 1]),
                Ballot::new(3, [2, 1, 0]),
                Ballot::new(1, [1]),
            ])
            .build()
    }

    #[test]
    fn test_candidate_new() {
        assert_eq!(
            Candidate::new("apple"),
            Candidate {
                nickname: "apple".to_owned(),
                name: "Apple".to_owned(),
            }
        );
        assert_eq!(Candidate::new("").name, "");
    }

    #[test]
    fn test_build() {
        let election = make_election();
        assert_eq!(election.num_candidates, 3);
        assert_eq!(election.num_ballots, 6);
        assert_eq!(election.max_rank(), 3);
    }

    #[test]
    fn test_split_manipulators() {
        let election = make_election();
        let (manipulators, profile) = election.split_manipulators(3);
        assert_eq!(
            manipulators,
            vec![Ballot::new(2, [0, 1]), Ballot::new(1, [2, 1, 0])]
        );
        assert_eq!(
            profile,
            vec![Ballot::new(2, [2, 1, 0]), Ballot::new(1, [1])]
        );
    }

    #[test]
    fn test_split_no_manipulators() {
        let election = make_election();
        let (manipulators, profile) = election.split_manipulators(0);
        assert!(manipulators.is_empty());
        assert_eq!(profile, election.ballots);
    }

    #[test]
    fn test_split_all_manipulators() {
        let election = make_election();
        let (manipulators, profile) = election.split_manipulators(10);
        assert_eq!(manipulators, election.ballots);
        assert!(profile.is_empty());
    }
}
