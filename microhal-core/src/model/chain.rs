use super::suffix::Suffix;
use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One direction of the Markov model.
///
/// The `Chain` maps a prefix key to the distribution of characters observed
/// next to it. Which side "next" means is decided by the caller: the model
/// trains one chain on the text and one on the reversed text.
///
/// # Responsibilities
/// - Record observations `(prefix, next_char)`
/// - Draw the next character for a known prefix
/// - Merge with another chain
///
/// # Invariants
/// - The chain only grows, entries are never removed
/// - Every stored distribution has at least one observation
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Chain {
	/// Mapping from a prefix key to its suffix distribution
	suffixes: HashMap<String, Suffix>,
}

impl Chain {
	/// Creates an empty chain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records that `next_char` was observed after `prefix`.
	///
	/// Creates the distribution on first sight of the prefix.
	pub fn add(&mut self, prefix: &str, next_char: char) {
		match self.suffixes.get_mut(prefix) {
			Some(suffix) => suffix.add(next_char),
			None => {
				let mut suffix = Suffix::new();
				suffix.add(next_char);
				self.suffixes.insert(prefix.to_owned(), suffix);
			}
		}
	}

	/// Draws the next character for `prefix`.
	///
	/// # Errors
	/// - [`Error::UnknownPrefix`] if the prefix was never observed.
	/// - [`Error::EmptyDistribution`] if its distribution is empty.
	pub fn generate<R: Rng + ?Sized>(&self, prefix: &str, rng: &mut R) -> Result<char> {
		match self.suffixes.get(prefix) {
			Some(suffix) => suffix.generate(rng),
			None => Err(Error::UnknownPrefix(prefix.to_owned())),
		}
	}

	/// Returns `true` if `prefix` was observed at least once.
	pub fn contains(&self, prefix: &str) -> bool {
		self.suffixes.contains_key(prefix)
	}

	/// Returns the distribution observed after `prefix`, if any.
	pub fn get(&self, prefix: &str) -> Option<&Suffix> {
		self.suffixes.get(prefix)
	}

	/// Number of distinct prefixes.
	pub fn len(&self) -> usize {
		self.suffixes.len()
	}

	/// Returns `true` if nothing was learned yet.
	pub fn is_empty(&self) -> bool {
		self.suffixes.is_empty()
	}

	/// Merges another chain into this one.
	///
	/// Counts of matching prefixes are summed, new prefixes are cloned.
	pub fn merge(&mut self, other: &Self) {
		for (key, suffix) in &other.suffixes {
			if let Some(existing) = self.suffixes.get_mut(key) {
				existing.merge(suffix);
			} else {
				self.suffixes.insert(key.clone(), suffix.clone());
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn add_creates_then_increments() {
		let mut chain = Chain::new();
		chain.add("ab", 'c');
		chain.add("ab", 'c');
		chain.add("ab", 'd');

		assert_eq!(chain.len(), 1);
		let suffix = chain.get("ab").unwrap();
		assert_eq!(suffix.count('c'), 2);
		assert_eq!(suffix.count('d'), 1);
		assert_eq!(suffix.total(), 3);
	}

	#[test]
	fn unknown_prefix_is_reported() {
		let mut rng = StdRng::seed_from_u64(1);
		let chain = Chain::new();
		match chain.generate("zz", &mut rng) {
			Err(Error::UnknownPrefix(key)) => assert_eq!(key, "zz"),
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn generate_uses_known_prefix() {
		let mut rng = StdRng::seed_from_u64(1);
		let mut chain = Chain::new();
		chain.add("ab", 'c');
		assert_eq!(chain.generate("ab", &mut rng).unwrap(), 'c');
	}

	#[test]
	fn merge_combines_chains() {
		let mut left = Chain::new();
		left.add("ab", 'c');
		let mut right = Chain::new();
		right.add("ab", 'c');
		right.add("bc", 'a');

		left.merge(&right);
		assert_eq!(left.len(), 2);
		assert_eq!(left.get("ab").unwrap().count('c'), 2);
		assert_eq!(left.get("bc").unwrap().count('a'), 1);
	}
}
