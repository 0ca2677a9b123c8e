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

//! Human-readable report of a manipulation search.

use crate::manipulation::{Algorithm, Manipulation};
use crate::score::{score_map, strength_order};
use crate::types::{Ballot, Election, Utilities};
use crate::welfare::Welfare;
use log::info;
use std::io;

/// Parameters of a manipulation search, as shown in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    /// Manipulation model.
    pub algorithm: Algorithm,
    /// Welfare function of the manipulators.
    pub welfare: Welfare,
    /// Number of candidates that each ballot supports.
    pub bloc_size: usize,
    /// Committee size.
    pub committee_size: usize,
}

/// Writes the outcome of a manipulation search, comparing the truthful
/// committee of the non-manipulative `profile` with the manipulated one.
pub fn write_report(
    stdout: &mut impl io::Write,
    election: &Election,
    package_name: &str,
    parameters: &Parameters,
    profile: &[Ballot],
    utilities: &Utilities,
    manipulation: &Manipulation,
) -> io::Result<()> {
    let Parameters {
        algorithm,
        welfare,
        bloc_size,
        committee_size,
    } = *parameters;
    let name = |c: usize| election.candidates[c].name.as_str();

    writeln!(
        stdout,
        r"
Election: {}

	{package_name}
	Rule: {bloc_size}-Bloc
	Manipulation: {algorithm}
	Welfare: {welfare}
	Seats: {committee_size}
	Ballots: {}
	Manipulators: {}
",
        election.title,
        election.num_ballots,
        utilities.num_manipulators(),
    )?;

    let scores = score_map(bloc_size, profile);
    let truthful: Vec<usize> = strength_order(&scores)
        .into_iter()
        .take(committee_size)
        .collect();
    writeln!(
        stdout,
        "Truthful committee (welfare {}):",
        welfare.evaluate(utilities, &truthful)
    )?;
    for &c in &truthful {
        writeln!(stdout, "\tElected:  {} ({})", name(c), scores.score(c))?;
    }

    if manipulation.is_truthful() {
        info!("No improving manipulation");
        writeln!(stdout, "No improving manipulation found.")?;
        return Ok(());
    }

    let support: Vec<&str> = manipulation.support.iter().map(|&c| name(c)).collect();
    writeln!(stdout, "Manipulators support: {}", support.join(", "))?;
    writeln!(
        stdout,
        "Manipulated committee (welfare {}):",
        manipulation.evaluation
    )?;
    for &c in &manipulation.committee {
        if truthful.contains(&c) {
            writeln!(stdout, "\tElected:  {}", name(c))?;
        } else {
            writeln!(stdout, "\tElected:  {} (new)", name(c))?;
        }
    }
    writeln!(stdout, "Seats changed: {}", manipulation.seats_changed)?;

    Ok(())
}
