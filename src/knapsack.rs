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

//! Exact k-item knapsack solver, based on dynamic programming over the total
//! value and the number of chosen items.

use log::{debug, trace};

/// Item that can be put in the knapsack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    /// Weight of the item, counted against the capacity.
    pub weight: usize,
    /// Value of the item.
    pub value: u64,
}

/// Optimal choice of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Indices of the chosen items, in increasing order.
    pub items: Vec<usize>,
    /// Total value of the chosen items.
    pub value: u64,
    /// Total weight of the chosen items.
    pub weight: usize,
}

impl Solution {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            value: 0,
            weight: 0,
        }
    }
}

/// Node in the arena of partial solutions. Each node records the last item
/// added and the node of the partial solution it extends.
struct Node {
    item: usize,
    prev: Option<usize>,
}

/// Dynamic programming table indexed by `(value, cardinality)`, storing the
/// minimal weight achieving exactly this value with exactly this number of
/// items.
struct Table {
    width: usize,
    /// Minimal weights. Any value above the capacity means unreachable.
    weights: Vec<usize>,
    /// Arena node describing how each reachable cell was obtained.
    nodes: Vec<Option<usize>>,
}

impl Table {
    fn new(max_value: usize, cardinality: usize, unreachable: usize) -> Self {
        let width = cardinality + 1;
        let len = (max_value + 1) * width;
        let mut weights = vec![unreachable; len];
        weights[0] = 0;
        Self {
            width,
            weights,
            nodes: vec![None; len],
        }
    }

    #[inline(always)]
    fn index(&self, value: usize, count: usize) -> usize {
        value * self.width + count
    }
}

/// Returns an upper bound on the value of any solution with the given number
/// of items: the sum of the largest item values, regardless of weights.
pub fn value_bound(items: &[Item], cardinality: usize) -> u64 {
    let mut values: Vec<u64> = items.iter().map(|item| item.value).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values.iter().take(cardinality).sum()
}

/// Chooses exactly `cardinality` items with a total weight of at most
/// `capacity`, maximizing the total value.
///
/// Returns [`None`] if no such choice exists. Among several optimal choices,
/// the first one discovered in item order is returned.
///
/// The running time and memory are `O(n * U * k)`, where `U` is
/// [`value_bound()`].
pub fn exact_knapsack(items: &[Item], cardinality: usize, capacity: usize) -> Option<Solution> {
    if cardinality == 0 {
        return Some(Solution::empty());
    }
    if cardinality > items.len() {
        return None;
    }

    let max_value = value_bound(items, cardinality) as usize;
    let unreachable = capacity.saturating_add(1);
    debug!(
        "Knapsack with {} items, cardinality {cardinality}, capacity {capacity}, value bound {max_value}",
        items.len()
    );

    let mut table = Table::new(max_value, cardinality, unreachable);
    let mut arena: Vec<Node> = Vec::new();

    for (j, item) in items.iter().enumerate() {
        if item.weight > capacity {
            trace!("Skipping item {j} of weight {} above capacity", item.weight);
            continue;
        }
        let value = item.value as usize;
        // Decreasing counts, so that each cell is extended from the table as
        // it was before this item.
        for count in (1..=cardinality).rev() {
            for q in value..=max_value {
                let from = table.index(q - value, count - 1);
                let previous = table.weights[from];
                if previous > capacity {
                    continue;
                }
                let weight = previous + item.weight;
                let to = table.index(q, count);
                if weight < table.weights[to] {
                    table.weights[to] = weight;
                    arena.push(Node {
                        item: j,
                        prev: table.nodes[from],
                    });
                    table.nodes[to] = Some(arena.len() - 1);
                }
            }
        }
    }

    for q in (0..=max_value).rev() {
        let cell = table.index(q, cardinality);
        let weight = table.weights[cell];
        if weight > capacity {
            continue;
        }

        let mut chosen = Vec::with_capacity(cardinality);
        let mut node = table.nodes[cell];
        while let Some(i) = node {
            chosen.push(arena[i].item);
            node = arena[i].prev;
        }
        chosen.sort_unstable();
        debug!("Knapsack solution: items {chosen:?}, value {q}, weight {weight}");

        return Some(Solution {
            items: chosen,
            value: q as u64,
            weight,
        });
    }

    debug!("Knapsack is infeasible");
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn items(weights_values: &[(usize, u64)]) -> Vec<Item> {
        weights_values
            .iter()
            .map(|&(weight, value)| Item { weight, value })
            .collect()
    }

    /// Enumerates all subsets of the given cardinality, returning the best
    /// value within capacity.
    fn brute_force(items: &[Item], cardinality: usize, capacity: usize) -> Option<u64> {
        let n = items.len();
        (0u32..1 << n)
            .filter(|mask| mask.count_ones() as usize == cardinality)
            .filter_map(|mask| {
                let chosen = (0..n).filter(|i| mask & (1 << i) != 0);
                let weight: usize = chosen.clone().map(|i| items[i].weight).sum();
                let value: u64 = chosen.map(|i| items[i].value).sum();
                (weight <= capacity).then_some(value)
            })
            .max()
    }

    fn check_solution(items: &[Item], cardinality: usize, capacity: usize, solution: &Solution) {
        assert_eq!(solution.items.len(), cardinality);
        let mut dedup = solution.items.clone();
        dedup.dedup();
        assert_eq!(dedup, solution.items, "Items must be distinct and sorted");
        let weight: usize = solution.items.iter().map(|&i| items[i].weight).sum();
        let value: u64 = solution.items.iter().map(|&i| items[i].value).sum();
        assert_eq!(weight, solution.weight);
        assert_eq!(value, solution.value);
        assert!(weight <= capacity);
    }

    #[test]
    fn test_value_bound() {
        let items = items(&[(1, 4), (1, 7), (1, 2), (1, 7)]);
        assert_eq!(value_bound(&items, 0), 0);
        assert_eq!(value_bound(&items, 2), 14);
        assert_eq!(value_bound(&items, 3), 18);
        assert_eq!(value_bound(&items, 10), 20);
    }

    #[test]
    fn test_empty_cardinality() {
        let items = items(&[(5, 4), (3, 7)]);
        assert_eq!(exact_knapsack(&items, 0, 0), Some(Solution::empty()));
        assert_eq!(exact_knapsack(&[], 0, 10), Some(Solution::empty()));
    }

    #[test]
    fn test_too_few_items() {
        let items = items(&[(1, 4), (1, 7)]);
        assert_eq!(exact_knapsack(&items, 3, 100), None);
    }

    #[test]
    fn test_simple() {
        let items = items(&[(3, 5), (2, 4), (2, 3), (1, 1)]);
        assert_eq!(
            exact_knapsack(&items, 2, 4),
            Some(Solution {
                items: vec![1, 2],
                value: 7,
                weight: 4,
            })
        );
        assert_eq!(
            exact_knapsack(&items, 2, 5),
            Some(Solution {
                items: vec![0, 1],
                value: 9,
                weight: 5,
            })
        );
        assert_eq!(exact_knapsack(&items, 3, 4), None);
        assert_eq!(
            exact_knapsack(&items, 3, 5),
            Some(Solution {
                items: vec![1, 2, 3],
                value: 8,
                weight: 5,
            })
        );
    }

    #[test]
    fn test_exact_cardinality_beats_greedy() {
        // A single heavy item is worth more, but exactly two items must be
        // chosen.
        let items = items(&[(4, 10), (2, 3), (2, 3)]);
        assert_eq!(
            exact_knapsack(&items, 2, 4),
            Some(Solution {
                items: vec![1, 2],
                value: 6,
                weight: 4,
            })
        );
    }

    #[test]
    fn test_infeasible_capacity() {
        let items = items(&[(3, 5), (4, 4), (5, 3)]);
        assert_eq!(exact_knapsack(&items, 2, 6), None);
        assert_eq!(
            exact_knapsack(&items, 2, 7),
            Some(Solution {
                items: vec![0, 1],
                value: 9,
                weight: 7,
            })
        );
    }

    #[test]
    fn test_zero_values() {
        let items = items(&[(2, 0), (1, 0), (3, 0)]);
        let solution = exact_knapsack(&items, 2, 3).unwrap();
        check_solution(&items, 2, 3, &solution);
        assert_eq!(solution.value, 0);
        assert_eq!(exact_knapsack(&items, 3, 5), None);
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..500 {
            let n = rng.gen_range(0..=8);
            let items: Vec<Item> = (0..n)
                .map(|_| Item {
                    weight: rng.gen_range(1..=6),
                    value: rng.gen_range(0..=10),
                })
                .collect();
            let cardinality = rng.gen_range(0..=n);
            let capacity = rng.gen_range(0..=20);

            let expected = brute_force(&items, cardinality, capacity);
            let solution = exact_knapsack(&items, cardinality, capacity);
            assert_eq!(
                solution.as_ref().map(|s| s.value),
                expected,
                "items = {items:?}, cardinality = {cardinality}, capacity = {capacity}"
            );
            if let Some(solution) = solution {
                check_solution(&items, cardinality, capacity, &solution);
            }
        }
    }
}
