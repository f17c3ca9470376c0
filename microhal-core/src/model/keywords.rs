use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Usage table of generation seed candidates.
///
/// Every time a candidate is presented as a ranked keyword its count grows,
/// whether or not it ends up seeding the reply.
///
/// # Invariants
/// - Counts are strictly positive and only increase
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Keywords {
	usage: HashMap<String, usize>,
}

impl Keywords {
	/// Creates an empty usage table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Increments the usage count of every candidate.
	pub fn add<S: AsRef<str>>(&mut self, candidates: &[S]) {
		for candidate in candidates {
			*self.usage.entry(candidate.as_ref().to_owned()).or_insert(0) += 1;
		}
	}

	/// Orders candidates by ascending usage.
	///
	/// Candidates never seen before rank as if they had the maximum count, so
	/// they come after every known candidate. Ties keep their input order.
	pub fn sort<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
		let mut ranked: Vec<(&str, usize)> = candidates
			.iter()
			.map(|candidate| {
				let candidate = candidate.as_ref();
				(candidate, self.usage.get(candidate).copied().unwrap_or(usize::MAX))
			})
			.collect();

		// Stable
		ranked.sort_by_key(|(_, usage)| *usage);

		ranked.into_iter().map(|(candidate, _)| candidate.to_owned()).collect()
	}

	/// Number of times `candidate` was ranked, `0` if never.
	pub fn usage(&self, candidate: &str) -> usize {
		self.usage.get(candidate).copied().unwrap_or(0)
	}

	/// Number of distinct candidates ever ranked.
	pub fn len(&self) -> usize {
		self.usage.len()
	}

	/// Returns `true` if no candidate was ever ranked.
	pub fn is_empty(&self) -> bool {
		self.usage.is_empty()
	}
}
