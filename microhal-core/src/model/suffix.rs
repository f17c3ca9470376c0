use std::collections::HashMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Weighted multiset of the characters observed after one prefix.
///
/// Conceptually, this is the set of outgoing edges of a Markov chain node,
/// each edge weighted by its number of observations.
///
/// ## Responsibilities:
/// - Accumulate occurrences during learning
/// - Draw the next character using weighted random sampling
/// - Merge with another distribution (parallel learning support)
///
/// ## Invariants
/// - `total` equals the sum of all values in `counts`
/// - Counts only ever increase, the model never forgets
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Suffix {
	/// Total number of observations.
	total: usize,
	/// Observation count per next character.
	/// Example: { 'e' => 42, 'a' => 3 }
	counts: HashMap<char, usize>,
}

impl Suffix {
	/// Creates an empty distribution.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `c`.
	pub fn add(&mut self, c: char) {
		*self.counts.entry(c).or_insert(0) += 1;
		self.total += 1;
	}

	/// Draws a character with probability proportional to its count.
	///
	/// Draws uniformly in `[0, total)` and walks the counts until the
	/// cumulative weight covers the draw. The iteration order of the counts
	/// is unspecified, only the interval coverage matters.
	///
	/// # Errors
	/// Returns [`Error::EmptyDistribution`] if nothing was ever added.
	pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<char> {
		if self.total == 0 {
			return Err(Error::EmptyDistribution);
		}

		let mut r = rng.random_range(0..self.total);
		for (c, count) in &self.counts {
			if r < *count {
				return Ok(*c);
			}
			r -= count;
		}

		// Only reachable if `total` disagrees with `counts`
		Err(Error::EmptyDistribution)
	}

	/// Sums the counts of `other` into this distribution.
	pub fn merge(&mut self, other: &Self) {
		for (c, count) in &other.counts {
			*self.counts.entry(*c).or_insert(0) += *count;
		}
		self.total += other.total;
	}

	/// Total number of observations, the sum of all counts.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of times `c` was observed.
	pub fn count(&self, c: char) -> usize {
		self.counts.get(&c).copied().unwrap_or(0)
	}
}
