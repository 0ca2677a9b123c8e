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

//! Command-line program for l-Bloc manipulation.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

use bloc_manip::{
    manipulation::{self, Parallel},
    parse::parse_election,
    report::{write_report, Parameters},
    types::{Election, Utilities},
    welfare,
};
use clap::Parser;
use log::warn;
use std::error::Error;
use std::io;
use std::process::ExitCode;

/// Search for manipulations of multiwinner elections under the l-Bloc rule.
///
/// The election is read from the standard input in BLT format. The first
/// voters of the election are the manipulators, whose utilities derive from
/// their own ballots.
#[derive(Parser, Debug, PartialEq, Eq)]
struct Cli {
    /// Package name to show in the election report.
    #[arg(long, default_value = "Implementation: bloc-manip")]
    package_name: String,

    /// Manipulation model.
    #[arg(long, value_enum)]
    algorithm: Algorithm,

    /// Welfare function of the manipulators.
    #[arg(long, value_enum, default_value = "utilitarian")]
    welfare: Welfare,

    /// Number of candidates that each ballot supports. Defaults to the number
    /// of seats of the election.
    #[arg(long)]
    bloc_size: Option<usize>,

    /// Committee size. Defaults to the number of seats of the election.
    #[arg(long)]
    seats: Option<usize>,

    /// Number of manipulators, taken from the first voters of the election.
    #[arg(long)]
    manipulators: usize,

    /// If set, only candidates ranked strictly before this rank are worth
    /// something to the manipulators.
    #[arg(long)]
    utility_levels: Option<usize>,

    /// Enable parallel search based on the rayon crate.
    #[arg(long, action = clap::ArgAction::Set, default_value = "true")]
    parallel: bool,
}

/// Manipulation model.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Algorithm {
    /// All manipulators cast the same ballot.
    Consistent,
    /// Each manipulator casts its own ballot.
    Inconsistent,
}

/// Welfare function.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Welfare {
    /// Sum of all utilities.
    Utilitarian,
    /// Minimum of all utilities.
    Egalitarian,
    /// Sum over the committee of the minimum utility of each member.
    CandidateEgalitarian,
}

impl From<Algorithm> for manipulation::Algorithm {
    fn from(value: Algorithm) -> Self {
        match value {
            Algorithm::Consistent => Self::Consistent,
            Algorithm::Inconsistent => Self::Inconsistent,
        }
    }
}

impl From<Welfare> for welfare::Welfare {
    fn from(value: Welfare) -> Self {
        match value {
            Welfare::Utilitarian => Self::Utilitarian,
            Welfare::Egalitarian => Self::Egalitarian,
            Welfare::CandidateEgalitarian => Self::CandidateEgalitarian,
        }
    }
}

impl Cli {
    /// Run the manipulation search on the given election based on the
    /// command-line parameters.
    fn run(self, stdout: &mut impl io::Write, election: &Election) -> Result<(), Box<dyn Error>> {
        let parameters = Parameters {
            algorithm: self.algorithm.into(),
            welfare: self.welfare.into(),
            bloc_size: self.bloc_size.unwrap_or(election.num_seats),
            committee_size: self.seats.unwrap_or(election.num_seats),
        };

        let (manipulators, profile) = election.split_manipulators(self.manipulators);
        let utilities = Utilities::borda(
            &manipulators,
            election.num_candidates,
            election.max_rank(),
            self.utility_levels,
        );
        if utilities.num_manipulators() < self.manipulators {
            warn!(
                "Only {} voters in the election, all of them are manipulators",
                utilities.num_manipulators()
            );
        }

        let parallel = if self.parallel {
            Parallel::Rayon
        } else {
            Parallel::No
        };
        let manipulation = parameters.algorithm.search(
            parameters.bloc_size,
            parameters.committee_size,
            &profile,
            &utilities,
            parameters.welfare,
            parallel,
        )?;

        write_report(
            stdout,
            election,
            &self.package_name,
            &parameters,
            &profile,
            &utilities,
            &manipulation,
        )?;
        Ok(())
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let result = parse_election(io::stdin().lock())
        .map_err(Box::<dyn Error>::from)
        .and_then(|election| cli.run(&mut io::stdout().lock(), &election));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bloc_manip::error::InputError;
    use clap::error::ErrorKind;
    use std::io::Cursor;

    #[test]
    fn test_parse_incomplete() {
        let error = Cli::try_parse_from(["bloc-manip"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);

        let error = Cli::try_parse_from(["bloc-manip", "--algorithm=consistent"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_help() {
        let error = Cli::try_parse_from(["bloc-manip", "--help"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_parse_minimal() {
        let cli =
            Cli::try_parse_from(["bloc-manip", "--algorithm=consistent", "--manipulators=2"])
                .unwrap();
        assert_eq!(
            cli,
            Cli {
                package_name: "Implementation: bloc-manip".to_owned(),
                algorithm: Algorithm::Consistent,
                welfare: Welfare::Utilitarian,
                bloc_size: None,
                seats: None,
                manipulators: 2,
                utility_levels: None,
                parallel: true,
            }
        );
    }

    #[test]
    fn test_parse_typo() {
        let error = Cli::try_parse_from([
            "bloc-manip",
            "--algorithm=Consistent",
            "--manipulators=2",
        ])
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_parse_full() {
        let cli = Cli::try_parse_from([
            "bloc-manip",
            "--algorithm=inconsistent",
            "--welfare=candidate-egalitarian",
            "--bloc-size=3",
            "--seats=4",
            "--manipulators=5",
            "--utility-levels=2",
            "--package-name=foo bar",
            "--parallel=false",
        ])
        .unwrap();
        assert_eq!(
            cli,
            Cli {
                package_name: "foo bar".to_owned(),
                algorithm: Algorithm::Inconsistent,
                welfare: Welfare::CandidateEgalitarian,
                bloc_size: Some(3),
                seats: Some(4),
                manipulators: 5,
                utility_levels: Some(2),
                parallel: false,
            }
        );
    }

    #[test]
    fn test_parse_full_spaces() {
        #[rustfmt::skip]
        let cli = Cli::try_parse_from([
            "bloc-manip",
            "--algorithm", "inconsistent",
            "--welfare", "egalitarian",
            "--bloc-size", "3",
            "--seats", "4",
            "--manipulators", "5",
            "--package-name", "foo bar",
            "--parallel", "false",
        ])
        .unwrap();
        assert_eq!(
            cli,
            Cli {
                package_name: "foo bar".to_owned(),
                algorithm: Algorithm::Inconsistent,
                welfare: Welfare::Egalitarian,
                bloc_size: Some(3),
                seats: Some(4),
                manipulators: 5,
                utility_levels: None,
                parallel: false,
            }
        );
    }

    const ELECTION: &str = r#"4 2
[nick apple banana cherry date]
2 date apple banana cherry 0
1 apple banana cherry date 0
1 apple banana date cherry 0
1 banana cherry apple date 0
1 apple date banana cherry 0
1 cherry date banana apple 0
0
"Apple"
"Banana"
"Cherry"
"Date"
"Vegetable contest"
"#;

    #[test]
    fn test_run() {
        let election = parse_election(Cursor::new(ELECTION)).unwrap();
        let cli = Cli::try_parse_from([
            "bloc-manip",
            "--algorithm=consistent",
            "--manipulators=2",
            "--utility-levels=2",
            "--package-name=package name",
        ])
        .unwrap();

        let mut buf = Vec::new();
        cli.run(&mut buf, &election).unwrap();
        assert_eq!(
            std::str::from_utf8(&buf).unwrap(),
            r"
Election: Vegetable contest

	package name
	Rule: 2-Bloc
	Manipulation: consistent
	Welfare: utilitarian
	Seats: 2
	Ballots: 7
	Manipulators: 2

Truthful committee (welfare 0):
	Elected:  Apple (3)
	Elected:  Banana (3)
Manipulators support: Date, Banana
Manipulated committee (welfare 8):
	Elected:  Banana
	Elected:  Date (new)
Seats changed: 1
"
        );
    }

    #[test]
    fn test_run_invalid_seats() {
        let election = parse_election(Cursor::new(ELECTION)).unwrap();
        let cli = Cli::try_parse_from([
            "bloc-manip",
            "--algorithm=inconsistent",
            "--manipulators=2",
            "--seats=5",
        ])
        .unwrap();

        let mut buf = Vec::new();
        let error = cli.run(&mut buf, &election).unwrap_err();
        assert_eq!(
            error.downcast_ref::<InputError>(),
            Some(&InputError::InvalidCommitteeSize {
                committee_size: 5,
                num_scored: 4
            })
        );
        assert!(buf.is_empty());
    }
}
