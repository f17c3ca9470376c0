use std::path::{Path, PathBuf};

use log::{debug, info};
use rand::Rng;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::io::{read_file, snapshot_path, write_atomic};
use crate::model::keywords::Keywords;
use crate::model::markov::Markov;

/// Sentence every fresh instance is trained on, so it can answer something
/// from the very first input.
pub const BOOTSTRAP_SENTENCE: &str = "I have nothing to say to you...";

/// A named, self-learning chatbot instance.
///
/// Owns the bidirectional [`Markov`] model and the [`Keywords`] usage table.
/// Both are persisted together as one snapshot named after the instance.
///
/// # Responsibilities
/// - Produce a reply for each input, then learn from that input
/// - Rotate generation seeds through the keyword usage table
/// - Save and load the whole state
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Microhal {
	name: String,
	markov: Markov,
	keywords: Keywords,
}

impl Microhal {
	/// Creates an empty instance.
	///
	/// # Errors
	/// Returns [`Error::InvalidOrder`] if `order == 0`.
	pub fn new(name: &str, order: usize) -> Result<Self> {
		Ok(Self {
			name: name.to_owned(),
			markov: Markov::new(order)?,
			keywords: Keywords::new(),
		})
	}

	/// Creates a bootstrapped instance and saves it in `folder`.
	///
	/// The instance answers [`BOOTSTRAP_SENTENCE`] once, which trains the
	/// model and records usage of its keywords like any other input.
	/// Any previous snapshot with the same name is overwritten.
	pub fn create<P: AsRef<Path>>(folder: P, name: &str, order: usize) -> Result<Self> {
		let mut microhal = Self::new(name, order)?;
		microhal.process_input(BOOTSTRAP_SENTENCE, order + 1, &mut rand::rng())?;
		microhal.save(&folder)?;
		info!(target: "microhal", "{}: created with order {}", name, order);
		Ok(microhal)
	}

	/// Loads the instance `name` from `folder`.
	///
	/// # Errors
	/// - I/O or decoding errors if the snapshot is missing or corrupt.
	/// - [`Error::NameMismatch`] if the snapshot belongs to another instance.
	pub fn load<P: AsRef<Path>>(folder: P, name: &str) -> Result<Self> {
		let path = snapshot_path(&folder, name)?;
		let bytes = std::fs::read(&path)?;
		let microhal: Microhal = postcard::from_bytes(&bytes)?;
		if microhal.name != name {
			return Err(Error::NameMismatch {
				path,
				expected: name.to_owned(),
				found: microhal.name,
			});
		}
		info!(target: "microhal", "{}: loaded from {}", name, path.display());
		Ok(microhal)
	}

	/// Loads `name` if a snapshot exists, otherwise creates it.
	///
	/// # Notes
	/// - `order` is only used on creation; a loaded instance keeps its own.
	pub fn load_or_create<P: AsRef<Path>>(folder: P, name: &str, order: usize) -> Result<Self> {
		if snapshot_path(&folder, name)?.exists() {
			Self::load(folder, name)
		} else {
			Self::create(folder, name, order)
		}
	}

	/// Writes the snapshot to `<folder>/<name>.bin`.
	pub fn save<P: AsRef<Path>>(&self, folder: P) -> Result<PathBuf> {
		let path = snapshot_path(folder, &self.name)?;
		let bytes = postcard::to_stdvec(self)?;
		write_atomic(&path, &bytes)?;
		debug!(target: "microhal", "{}: saved {} bytes to {}", self.name, bytes.len(), path.display());
		Ok(path)
	}

	/// Trains the model on a text file, one sentence per line.
	///
	/// Returns the number of lines learned.
	pub fn train_from_file<P: AsRef<Path>>(&mut self, filepath: P) -> Result<usize> {
		let lines = read_file(&filepath)?;
		self.markov.train_corpus(&lines);
		info!(
			target: "microhal",
			"{}: trained on {} lines from {}",
			self.name,
			lines.len(),
			filepath.as_ref().display()
		);
		Ok(lines.len())
	}

	/// Produces a reply to `input`, then learns from it.
	///
	/// # Behavior
	/// - Ranks the keywords of `input` by prior usage and records that usage
	///   for all of them.
	/// - Tries each ranked keyword as a seed; the first one the model knows
	///   produces the reply.
	/// - Trains the model on `input` afterwards, so an input never seeds its
	///   own reply.
	/// - Returns an empty string when no keyword is known.
	///
	/// # Errors
	/// - [`Error::MaxLengthTooShort`] if `max_length < order`. Nothing is
	///   learned in that case.
	/// - [`Error::EmptyDistribution`] on an internal inconsistency.
	pub fn process_input<R: Rng + ?Sized>(&mut self, input: &str, max_length: usize, rng: &mut R) -> Result<String> {
		Config::check_max_length(max_length, self.markov.order())?;

		let candidates = self.markov.keywords(input);
		let ranked = self.keywords.sort(&candidates);
		self.keywords.add(&candidates);

		let mut reply = Ok(String::new());
		for keyword in &ranked {
			match self.markov.get_string(keyword, max_length, rng) {
				Err(Error::UnknownPrefix(_)) => continue,
				result => {
					debug!(target: "microhal", "{}: seeded with {:?}", self.name, keyword);
					reply = result;
					break;
				}
			}
		}

		self.markov.add_string(input);
		reply
	}

	/// Instance name, also the snapshot file name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Width of the chain keys.
	pub fn order(&self) -> usize {
		self.markov.order()
	}

	/// Read-only view of the model.
	pub fn markov(&self) -> &Markov {
		&self.markov
	}

	/// Read-only view of the keyword usage table.
	pub fn keywords(&self) -> &Keywords {
		&self.keywords
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn max_length_below_order_is_a_config_fault() {
		let mut rng = StdRng::seed_from_u64(0);
		let mut microhal = Microhal::new("test", 2).unwrap();
		let err = microhal.process_input("hello.", 1, &mut rng).unwrap_err();
		assert!(err.is_config_fault());
		assert!(microhal.markov().right_chain().is_empty());
		assert!(microhal.keywords().is_empty());
	}

	#[test]
	fn max_length_equal_to_order_is_accepted() {
		let mut rng = StdRng::seed_from_u64(0);
		let mut microhal = Microhal::new("test", 2).unwrap();
		assert!(microhal.process_input("hello.", 2, &mut rng).is_ok());
	}

	#[test]
	fn first_input_gets_empty_reply_and_is_learned() {
		let mut rng = StdRng::seed_from_u64(0);
		let mut microhal = Microhal::new("test", 2).unwrap();
		let reply = microhal.process_input("hello.", 10, &mut rng).unwrap();
		assert_eq!(reply, "");
		assert!(microhal.markov().right_chain().contains("he"));
	}

	#[test]
	fn usage_is_recorded_for_every_candidate() {
		let mut rng = StdRng::seed_from_u64(0);
		let mut microhal = Microhal::new("test", 2).unwrap();
		microhal.process_input("abcab", 10, &mut rng).unwrap();
		assert_eq!(microhal.keywords().usage("ab"), 2);
		assert_eq!(microhal.keywords().usage("bc"), 1);
		assert_eq!(microhal.keywords().usage("ca"), 1);
	}

	#[test]
	fn reply_is_seeded_from_known_keyword() {
		let mut rng = StdRng::seed_from_u64(5);
		let mut microhal = Microhal::new("test", 3).unwrap();
		microhal.process_input("the cat sat on the mat.", 30, &mut rng).unwrap();
		let reply = microhal.process_input("a cat!", 30, &mut rng).unwrap();
		assert!(reply.contains("cat"), "{reply:?}");
	}

	#[test]
	fn repeated_input_changes_ranking() {
		let mut rng = StdRng::seed_from_u64(0);
		let mut microhal = Microhal::new("test", 2).unwrap();
		microhal.keywords.add(&["zz"]);
		let input = "hi zz";

		let candidates = microhal.markov().keywords(input);
		let first = microhal.keywords().sort(&candidates);
		microhal.process_input(input, 10, &mut rng).unwrap();
		let second = microhal.keywords().sort(&candidates);

		assert_eq!(first, vec!["zz", "hi", "i ", " z"]);
		assert_eq!(second, vec!["hi", "i ", " z", "zz"]);
		assert_ne!(first, second);
	}
}
