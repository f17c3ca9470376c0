use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Construction parameters of a running instance.
///
/// # Invariants (checked by [`Config::validate`])
/// - `order >= 1`
/// - `max_length >= order`
/// - `save_interval` is not zero
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
	/// Instance name, also the snapshot file name.
	pub name: String,

	/// Width of the chain keys. Only used when a new instance is created.
	pub order: usize,

	/// Maximum number of characters grown on each side of a keyword.
	pub max_length: usize,

	/// Delay between two snapshots.
	pub save_interval: Duration,

	/// Folder holding the snapshot.
	pub data_dir: PathBuf,

	/// Optional seed of the reply generator, for reproducible sessions.
	pub seed: Option<u64>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			name: "microhal".to_owned(),
			order: 4,
			max_length: 80,
			save_interval: Duration::from_secs(60),
			data_dir: PathBuf::from("."),
			seed: None,
		}
	}
}

impl Config {
	/// Checks that the parameters can produce meaningful replies.
	///
	/// # Errors
	/// Returns a configuration fault (see [`Error::is_config_fault`]).
	pub fn validate(&self) -> Result<()> {
		if self.order == 0 {
			return Err(Error::InvalidOrder(self.order));
		}
		Self::check_max_length(self.max_length, self.order)?;
		if self.save_interval.is_zero() {
			return Err(Error::InvalidSaveInterval);
		}
		Ok(())
	}

	/// `max_length` must leave room for at least one full window.
	pub fn check_max_length(max_length: usize, order: usize) -> Result<()> {
		if max_length < order {
			return Err(Error::MaxLengthTooShort { max_length, order });
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_is_valid() {
		assert!(Config::default().validate().is_ok());
	}

	#[test]
	fn max_length_below_order_is_refused() {
		let config = Config { order: 2, max_length: 1, ..Config::default() };
		assert!(matches!(
			config.validate(),
			Err(Error::MaxLengthTooShort { max_length: 1, order: 2 })
		));
	}

	#[test]
	fn zero_order_is_refused() {
		let config = Config { order: 0, ..Config::default() };
		assert!(matches!(config.validate(), Err(Error::InvalidOrder(0))));
	}

	#[test]
	fn zero_save_interval_is_refused() {
		let config = Config { save_interval: Duration::ZERO, ..Config::default() };
		let err = config.validate().unwrap_err();
		assert!(err.is_config_fault());
	}
}
