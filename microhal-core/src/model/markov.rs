use std::sync::mpsc;
use std::thread;

use rand::Rng;

use serde::{Deserialize, Serialize};

use super::chain::Chain;
use super::prefix::Prefix;
use crate::error::{Error, Result};

/// Characters that end a sentence in either direction.
pub const STOP_CHARS: [char; 3] = ['!', '?', '.'];

/// Returns `true` if `c` ends a sentence.
pub fn is_stop_char(c: char) -> bool {
	STOP_CHARS.contains(&c)
}

/// Bidirectional character-level Markov model.
///
/// This struct manages:
/// - `right_chain`: maps the `order` characters preceding a position to the
///   character at that position (forward reading).
/// - `left_chain`: maps the `order` characters following a position, read in
///   reverse, to the character at that position (backward reading).
///
/// Generation starts from a keyword and grows a reply outward in both
/// directions, so a single seed expands into a whole sentence without a
/// separate sentence-start model.
///
/// # Invariants
/// - `order >= 1`
/// - Every key of both chains is exactly `order` characters long
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Markov {
	order: usize,
	left_chain: Chain,
	right_chain: Chain,
}

impl Markov {
	/// Creates an empty model whose keys are `order` characters wide.
	///
	/// # Errors
	/// Returns [`Error::InvalidOrder`] if `order == 0`.
	pub fn new(order: usize) -> Result<Self> {
		if order == 0 {
			return Err(Error::InvalidOrder(order));
		}
		Ok(Self { order, left_chain: Chain::new(), right_chain: Chain::new() })
	}

	/// Width of the chain keys.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Forward chain (predicts the following character).
	pub fn right_chain(&self) -> &Chain {
		&self.right_chain
	}

	/// Backward chain (predicts the preceding character).
	pub fn left_chain(&self) -> &Chain {
		&self.left_chain
	}

	/// Returns every `order`-wide window of `text`, in text order.
	///
	/// A text of `L` characters yields `L - order + 1` candidates, duplicates
	/// included. Texts shorter than `order` yield nothing.
	pub fn keywords(&self, text: &str) -> Vec<String> {
		let mut prefix = Prefix::new(self.order);
		let mut keywords = Vec::new();
		for (i, c) in text.chars().enumerate() {
			prefix.shift(c);
			if i + 1 >= self.order {
				keywords.push(prefix.as_key());
			}
		}
		keywords
	}

	/// Trains both chains on `text`.
	///
	/// The forward pass reads the text left-to-right into `right_chain`, the
	/// backward pass reads it right-to-left into `left_chain`.
	pub fn add_string(&mut self, text: &str) {
		train_chain(&mut self.right_chain, self.order, text.chars());
		train_chain(&mut self.left_chain, self.order, text.chars().rev());
	}

	/// Trains the model on many lines using worker threads.
	///
	/// # Behavior
	/// - Splits the lines into chunks (based on CPU cores * factor).
	/// - Spawns threads to build partial models for each chunk.
	/// - Merges all partial models into `self`.
	///
	/// # Notes
	/// - Counts are additive, so the result equals calling `add_string` on
	///   every line in any order.
	pub fn train_corpus(&mut self, lines: &[String]) {
		if lines.is_empty() {
			return;
		}
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = lines.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		for chunk in lines.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();
			let order = self.order;

			thread::spawn(move || {
				let mut partial = Markov { order, left_chain: Chain::new(), right_chain: Chain::new() };
				for line in &chunk {
					partial.add_string(line);
				}
				// The receiver outlives every sender
				let _ = tx.send(partial);
			});
		}
		drop(tx);

		for partial in rx.iter() {
			self.right_chain.merge(&partial.right_chain);
			self.left_chain.merge(&partial.left_chain);
		}
	}

	/// Grows a reply around `keyword`.
	///
	/// # Parameters
	/// - `keyword`: seed string, normally one of [`Markov::keywords`].
	/// - `max_length`: maximum number of characters grown on each side.
	///
	/// # Behavior
	/// - Forward growth appends characters drawn from `right_chain` until the
	///   prefix is unknown, `max_length` is reached, or a stop character is
	///   drawn. The stop character is kept.
	/// - Backward growth prepends characters drawn from `left_chain` under the
	///   same limits, but a stop character is dropped.
	///
	/// # Errors
	/// - [`Error::UnknownPrefix`] if `keyword` was never seen by `right_chain`.
	///   Nothing is generated in that case.
	/// - [`Error::EmptyDistribution`] on an internal inconsistency.
	pub fn get_string<R: Rng + ?Sized>(&self, keyword: &str, max_length: usize, rng: &mut R) -> Result<String> {
		if !self.right_chain.contains(keyword) {
			return Err(Error::UnknownPrefix(keyword.to_owned()));
		}

		let mut right_prefix = Prefix::new(self.order);
		let mut left_prefix = Prefix::new(self.order);
		for c in keyword.chars() {
			right_prefix.shift(c);
		}
		for c in keyword.chars().rev() {
			left_prefix.shift(c);
		}

		let mut right: Vec<char> = Vec::with_capacity(max_length);
		while right.len() < max_length {
			let c = match self.right_chain.generate(&right_prefix.as_key(), rng) {
				Ok(c) => c,
				Err(Error::UnknownPrefix(_)) => break,
				Err(e) => return Err(e),
			};
			right.push(c);
			if is_stop_char(c) {
				break;
			}
			right_prefix.shift(c);
		}

		// Filled back to front
		let mut left: Vec<char> = Vec::with_capacity(max_length);
		while left.len() < max_length {
			let c = match self.left_chain.generate(&left_prefix.as_key(), rng) {
				Ok(c) => c,
				Err(Error::UnknownPrefix(_)) => break,
				Err(e) => return Err(e),
			};
			if is_stop_char(c) {
				break;
			}
			left.push(c);
			left_prefix.shift(c);
		}

		let mut reply: String = left.iter().rev().collect();
		reply.push_str(keyword);
		reply.extend(right);
		Ok(reply)
	}
}

/// Walks `chars` with a sliding window and records every full-window
/// observation into `chain`.
fn train_chain(chain: &mut Chain, order: usize, chars: impl Iterator<Item = char>) {
	let mut prefix = Prefix::new(order);
	for (i, c) in chars.enumerate() {
		if i >= order {
			chain.add(&prefix.as_key(), c);
		}
		prefix.shift(c);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn trained(order: usize, texts: &[&str]) -> Markov {
		let mut markov = Markov::new(order).unwrap();
		for text in texts {
			markov.add_string(text);
		}
		markov
	}

	#[test]
	fn zero_order_is_rejected() {
		assert!(matches!(Markov::new(0), Err(Error::InvalidOrder(0))));
	}

	#[test]
	fn keywords_are_every_window() {
		let markov = Markov::new(2).unwrap();
		assert_eq!(markov.keywords("abcab"), vec!["ab", "bc", "ca", "ab"]);
	}

	#[test]
	fn keywords_of_short_text_are_empty() {
		let markov = Markov::new(3).unwrap();
		assert!(markov.keywords("ab").is_empty());
		assert!(markov.keywords("").is_empty());
		assert_eq!(markov.keywords("abc"), vec!["abc"]);
	}

	#[test]
	fn every_window_is_a_right_key() {
		let text = "the quick brown fox jumps.";
		let markov = trained(3, &[text]);
		let chars: Vec<char> = text.chars().collect();
		for window in chars.windows(4) {
			let key: String = window[..3].iter().collect();
			let suffix = markov.right_chain().get(&key).expect("missing window");
			assert!(suffix.count(window[3]) >= 1, "{key:?} -> {:?} not counted", window[3]);
		}
	}

	#[test]
	fn left_chain_reads_reversed_text() {
		let markov = trained(2, &["abcd"]);
		// "dcba": "dc" -> 'b', "cb" -> 'a'
		assert_eq!(markov.left_chain().get("dc").unwrap().count('b'), 1);
		assert_eq!(markov.left_chain().get("cb").unwrap().count('a'), 1);
		assert_eq!(markov.left_chain().len(), 2);
		assert_eq!(markov.right_chain().get("ab").unwrap().count('c'), 1);
		assert_eq!(markov.right_chain().get("bc").unwrap().count('d'), 1);
	}

	#[test]
	fn no_padded_keys_are_stored() {
		let markov = trained(3, &["hello world"]);
		let mut rng = StdRng::seed_from_u64(0);
		assert!(matches!(
			markov.right_chain().generate("\0\0h", &mut rng),
			Err(Error::UnknownPrefix(_))
		));
	}

	#[test]
	fn text_shorter_than_order_adds_nothing() {
		let markov = trained(4, &["abc", "abcd"]);
		assert!(markov.right_chain().is_empty());
		assert!(markov.left_chain().is_empty());
	}

	#[test]
	fn abcabc_scenario() {
		let markov = trained(2, &["abcabc."]);
		assert!(markov.right_chain().get("ab").unwrap().count('c') >= 1);

		let mut rng = StdRng::seed_from_u64(3);
		for _ in 0..50 {
			let reply = markov.get_string("ab", 4, &mut rng).unwrap();
			assert!(reply.contains("ab"), "{reply:?}");
			if let Some(stop) = reply.find('.') {
				assert_eq!(stop, reply.len() - 1, "{reply:?} continues past the stop");
			}
		}
	}

	#[test]
	fn forward_stop_is_kept() {
		let markov = trained(2, &["abc.d"]);
		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(markov.get_string("ab", 10, &mut rng).unwrap(), "abc.");
	}

	#[test]
	fn backward_stop_is_dropped() {
		let markov = trained(2, &["hi. abc"]);
		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(markov.get_string("ab", 10, &mut rng).unwrap(), " abc");
	}

	#[test]
	fn unknown_keyword_is_rejected() {
		let markov = trained(2, &["abc"]);
		let mut rng = StdRng::seed_from_u64(0);
		assert!(matches!(
			markov.get_string("zz", 10, &mut rng),
			Err(Error::UnknownPrefix(_))
		));
	}

	#[test]
	fn growth_is_bounded_on_each_side() {
		let markov = trained(2, &["abababababababababababab"]);
		let mut rng = StdRng::seed_from_u64(9);
		for max_length in [2, 5, 8] {
			// Cycle "abab.." keeps both sides growing until the cap
			let reply: Vec<char> = markov.get_string("ab", max_length, &mut rng).unwrap().chars().collect();
			assert_eq!(reply.len(), 2 + 2 * max_length);
			assert_eq!(reply[max_length..max_length + 2], ['a', 'b']);
		}
	}

	#[test]
	fn reply_always_contains_keyword() {
		let markov = trained(3, &[
			"the cat sat on the mat.",
			"a cat is not a hat!",
			"where is the cat?",
		]);
		let mut rng = StdRng::seed_from_u64(11);
		for keyword in markov.keywords("the cat") {
			let reply = markov.get_string(&keyword, 20, &mut rng).unwrap();
			assert!(reply.contains(&keyword), "{keyword:?} missing from {reply:?}");
		}
	}

	#[test]
	fn parallel_training_matches_sequential() {
		let lines: Vec<String> = (0..200)
			.map(|i| format!("line number {i} says hello{}", if i % 2 == 0 { "." } else { "!" }))
			.collect();

		let mut sequential = Markov::new(3).unwrap();
		for line in &lines {
			sequential.add_string(line);
		}
		let mut parallel = Markov::new(3).unwrap();
		parallel.train_corpus(&lines);

		assert_eq!(sequential, parallel);
	}
}
