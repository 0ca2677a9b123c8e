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

//! Error types.

use thiserror::Error;

/// Input that violates the preconditions of a manipulation search.
///
/// Infeasible hypotheses encountered during a search are not errors, and
/// neither is the absence of an improving manipulation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// The number of candidates supported by each ballot must be positive.
    #[error("Invalid bloc size: l must be at least 1")]
    InvalidBlocSize,

    /// The committee size must be between 1 and the number of scored
    /// candidates.
    #[error("Invalid committee size {committee_size}: there are {num_scored} scored candidates")]
    InvalidCommitteeSize {
        /// Requested committee size.
        committee_size: usize,
        /// Number of candidates appearing in at least one ballot.
        num_scored: usize,
    },

    /// The non-manipulative profile contains no ballot.
    #[error("Empty profile: at least one non-manipulative ballot is required")]
    EmptyProfile,

    /// A ballot has a zero count.
    #[error("Ballot #{ballot} has a zero count")]
    EmptyBallotCount {
        /// Index of the ballot in the profile.
        ballot: usize,
    },

    /// A candidate appears in the profile but has no utility row.
    #[error("Missing utilities for candidate {candidate}")]
    MissingUtilities {
        /// Candidate without utilities.
        candidate: usize,
    },

    /// A utility row doesn't have one entry per manipulator.
    #[error("Utilities of candidate {candidate} have {actual} entries, expected {expected}")]
    InconsistentUtilities {
        /// Candidate whose row is malformed.
        candidate: usize,
        /// Number of manipulators.
        expected: usize,
        /// Number of entries in the row.
        actual: usize,
    },

    /// A ballot doesn't rank its candidates as `1..=n`.
    #[error("Invalid ranks in ballot: {0}")]
    InvalidRanks(String),

    /// A candidate appears twice in a ballot.
    #[error("Candidate {candidate} is ranked twice in a ballot")]
    RepeatedCandidate {
        /// Repeated candidate.
        candidate: usize,
    },
}

/// Error while parsing a ballot file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input ended before the election was complete.
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(&'static str),

    /// The header line is malformed.
    #[error("Invalid header: {0:?}")]
    InvalidHeader(String),

    /// The `[nick ...]` option is missing.
    #[error("Missing nicknames option")]
    MissingNicknames,

    /// The number of nicknames doesn't match the number of candidates.
    #[error("Expected {expected} nicknames, found {actual}")]
    NicknameCount {
        /// Number of candidates announced in the header.
        expected: usize,
        /// Number of nicknames.
        actual: usize,
    },

    /// A ballot mentions a nickname that isn't declared.
    #[error("Unknown candidate nickname: {0}")]
    UnknownCandidate(String),

    /// A ballot ranks candidates equally, which the l-Bloc rule doesn't
    /// support.
    #[error("Ballot ranks candidates equally: {0:?}")]
    TiedRanking(String),

    /// A string was expected to be enclosed in double quotes.
    #[error("Expected a quoted string, found {0:?}")]
    UnquotedString(String),

    /// A ballot is invalid.
    #[error(transparent)]
    InvalidBallot(#[from] InputError),
}
