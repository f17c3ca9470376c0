use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the chatbot core.
///
/// `UnknownPrefix` is part of normal operation: it is how a chain reports
/// that it never saw a key, and it drives the keyword retry loop. The
/// configuration variants are faults the caller must refuse to run with.
#[derive(Debug, Error)]
pub enum Error {
	#[error("no such prefix: {0:?}")]
	UnknownPrefix(String),

	#[error("suffix distribution has no observations")]
	EmptyDistribution,

	#[error("order must be >= 1, got {0}")]
	InvalidOrder(usize),

	#[error("max length must be at least the chain order (got {max_length}, expected at least {order})")]
	MaxLengthTooShort { max_length: usize, order: usize },

	#[error("save interval must not be zero")]
	InvalidSaveInterval,

	#[error("snapshot {} belongs to {found:?}, expected {expected:?}", .path.display())]
	NameMismatch {
		path: PathBuf,
		expected: String,
		found: String,
	},

	#[error("shared state lock was poisoned")]
	LockPoisoned,

	#[error("reply worker stopped")]
	WorkerStopped,

	#[error("{0} thread panicked")]
	ThreadPanicked(&'static str),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("snapshot encoding error: {0}")]
	Snapshot(#[from] postcard::Error),
}

impl Error {
	/// Returns `true` for errors that mean the instance is misconfigured.
	///
	/// These are never recoverable by retrying; the outermost layer should
	/// refuse to run.
	pub fn is_config_fault(&self) -> bool {
		matches!(self, Error::InvalidOrder(_) | Error::MaxLengthTooShort { .. } | Error::InvalidSaveInterval)
	}
}

pub type Result<T> = std::result::Result<T, Error>;
