//! Self-learning character-level Markov chatbot.
//!
//! This crate provides:
//! - A bidirectional character-level Markov model (forward and backward chains)
//! - Keyword ranking by prior usage to rotate generation seeds
//! - A reply orchestrator that answers then learns from every input
//! - Snapshot persistence and a threaded processing service
//!
//! # Quick Start
//!
//! ```
//! use microhal_core::Microhal;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut hal = Microhal::new("doc", 3).unwrap();
//! hal.process_input("The cat sat on the mat.", 40, &mut rng).unwrap();
//! let reply = hal.process_input("Tell me about the cat.", 40, &mut rng).unwrap();
//! println!("{reply}");
//! ```

/// Markov model building blocks.
pub mod model;

/// Reply orchestrator and snapshot persistence.
pub mod microhal;

/// Threaded inbound/outbound processing with periodic saving.
pub mod service;

/// Construction parameters and their validation.
pub mod config;

/// Error taxonomy shared by every module.
pub mod error;

/// I/O utilities (snapshot paths, atomic writes, corpus loading).
///
/// Not exposed
pub(crate) mod io;

pub use config::Config;
pub use error::{Error, Result};
pub use microhal::Microhal;
pub use service::Service;
