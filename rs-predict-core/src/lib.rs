//! Next-word prediction library.
//!
//! This crate provides a small word-level n-gram predictor:
//! - Tokenization of free text
//! - Chain construction from training text
//! - Longest-context-first prediction with backoff
//! - Frequency ranking of suggestions
//!
//! The model performs no I/O and no internal locking. Corpus loading
//! helpers live in `io`.

/// N-gram model, tokenizer and ranking.
pub mod model;

/// Corpus file helpers.
pub mod io;

pub use model::error::ModelError;
pub use model::markov_model::{MarkovModel, ModelStatus, DEFAULT_MAX_RESULTS, DEFAULT_ORDER};
