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

//! Strategic manipulation of multiwinner elections decided by the l-Bloc
//! rule.
//!
//! Given the non-manipulative ballots, a coalition of manipulators with known
//! utilities, the number of candidates `l` that each ballot supports and the
//! committee size `k`, this crate searches for manipulative ballots that
//! maximize the coalition's welfare. Two models are supported:
//! - [`consistent::consistent_manipulation()`], where all manipulators cast
//!   the same ballot,
//! - [`inconsistent::inconsistent_manipulation()`], where manipulators may
//!   split their approvals.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod consistent;
pub mod error;
pub mod inconsistent;
pub mod knapsack;
pub mod manipulation;
pub mod parse;
pub mod report;
pub mod score;
pub mod types;
mod util;
pub mod welfare;
