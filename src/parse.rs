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

//! Module to parse ballot files in the BLT format.
//!
//! Ballots must be strict rankings: equal preferences (`a=b`) are rejected,
//! as the l-Bloc rule needs to know which candidates are in the top `l`.

use crate::error::ParseError;
use crate::types::{Ballot, Candidate, Election};
use log::{info, warn};
use regex::Regex;
use std::collections::HashMap;
use std::io::BufRead;

/// Parses a ballot file into an election input.
pub fn parse_election(input: impl BufRead) -> Result<Election, ParseError> {
    let re_count = Regex::new(r"^([0-9]+) ([0-9]+)$").unwrap();
    let re_option = Regex::new(r"^\[[a-z]+(?: [a-z][a-z0-9]*)+\]$").unwrap();
    let re_ballot = Regex::new(r"^([0-9]+)((?: [a-z0-9=]*)*) 0$").unwrap();

    let mut lines = input.lines().peekable();

    let header = next_line(&mut lines, "header")?;
    let (num_candidates, num_seats) = match re_count.captures(&header) {
        Some(cap_count) => (
            parse_number(&cap_count[1], &header)?,
            parse_number(&cap_count[2], &header)?,
        ),
        None => return Err(ParseError::InvalidHeader(header)),
    };

    info!("{num_seats} seats / {num_candidates} candidates");

    // Parse the options
    let mut nicknames = None;
    while let Some(Ok(line)) = lines.peek() {
        if !re_option.is_match(line) {
            break;
        }

        let mut items = line[1..line.len() - 1].split(' ');
        // The regex guarantees at least one item.
        let title = items.next().unwrap_or_default();

        match title {
            "nick" => {
                let values = items.map(|x| x.to_owned()).collect::<Vec<String>>();
                info!("Nicknames: {values:?}");
                nicknames = Some(values);
            }
            _ => warn!("Unknown option: {title}"),
        }

        lines.next();
    }

    let nicknames: Vec<String> = nicknames.ok_or(ParseError::MissingNicknames)?;
    info!("Candidates (by nickname): {nicknames:?}");
    if nicknames.len() != num_candidates {
        return Err(ParseError::NicknameCount {
            expected: num_candidates,
            actual: nicknames.len(),
        });
    }

    let hash_nicknames: HashMap<&str, usize> = nicknames
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut ballots = Vec::new();
    loop {
        let line = next_line(&mut lines, "end of ballots")?;
        if line == "0" {
            break;
        }
        match re_ballot.captures(&line) {
            Some(cap_ballots) => {
                let count = parse_number(&cap_ballots[1], &line)?;
                let order = cap_ballots[2]
                    .split(' ')
                    .filter(|level| !level.is_empty())
                    .map(|level| {
                        if level.contains('=') {
                            return Err(ParseError::TiedRanking(line.clone()));
                        }
                        hash_nicknames
                            .get(level)
                            .copied()
                            .ok_or_else(|| ParseError::UnknownCandidate(level.to_owned()))
                    })
                    .collect::<Result<Vec<usize>, ParseError>>()?;

                let ballot = Ballot::new(count, order);
                ballot.validate()?;
                if ballot.is_empty() {
                    warn!("Empty ballot: {line}");
                }
                ballots.push(ballot);
            }
            None => {
                warn!("Ignored line: {line:?}");
            }
        }
    }

    let num_ballots = ballots.iter().map(|b| b.count()).sum::<usize>();
    info!("Number of ballots: {num_ballots}");

    let candidates = nicknames
        .into_iter()
        .map(|nickname| {
            let name = remove_quotes(&next_line(&mut lines, "candidate name")?)?.to_owned();
            Ok(Candidate { nickname, name })
        })
        .collect::<Result<Vec<Candidate>, ParseError>>()?;

    let title = remove_quotes(&next_line(&mut lines, "election title")?)?.to_owned();
    info!("Election title: {title}");

    Ok(Election {
        title,
        num_candidates,
        num_seats,
        num_ballots,
        candidates,
        ballots,
    })
}

/// Returns the next line of input, or an error mentioning what was expected.
fn next_line(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    expected: &'static str,
) -> Result<String, ParseError> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(ParseError::UnexpectedEof(expected)),
    }
}

/// Parses a number matched by a regex, which can still overflow.
fn parse_number(digits: &str, line: &str) -> Result<usize, ParseError> {
    digits
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidHeader(line.to_owned()))
}

/// Removes the leading and trailing quotes. The input string must start with a
/// double-quote character and end with a double-quote character -- only these
/// two characters are removed.
fn remove_quotes(x: &str) -> Result<&str, ParseError> {
    if x.len() >= 2 && x.starts_with('"') && x.ends_with('"') {
        Ok(&x[1..x.len() - 1])
    } else {
        Err(ParseError::UnquotedString(x.to_owned()))
    }
}
