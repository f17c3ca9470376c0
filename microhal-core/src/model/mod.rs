//! Character-level bidirectional Markov model.
//!
//! Leaves first:
//! - Sliding key window (`Prefix`)
//! - Weighted next-character distribution (`Suffix`)
//! - One-direction transition table (`Chain`)
//! - Forward + backward model with keyword extraction and generation (`Markov`)
//! - Seed usage table (`Keywords`)

/// Fixed-width sliding window used as a chain key.
pub mod prefix;

/// Weighted multiset of next characters for one prefix.
///
/// Supports incremental counting and weighted random sampling.
pub mod suffix;

/// Prefix to suffix distribution table, one reading direction.
pub mod chain;

/// Bidirectional model: training, keyword extraction and reply growth.
pub mod markov;

/// Usage counts of generation seeds and least-used-first ranking.
pub mod keywords;
