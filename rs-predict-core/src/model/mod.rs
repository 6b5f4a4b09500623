//! Word-level n-gram prediction.
//!
//! This module provides:
//! - Text tokenization (`tokenizer`)
//! - Per-context occurrence storage (`Chain`)
//! - Frequency ranking with deterministic ties (`ranking`)
//! - The predictor itself (`MarkovModel`)

/// Word-level Markov model: training, backoff prediction and state management.
pub mod markov_model;

/// Storage of the words observed after one context.
pub mod chain;

/// Lowercasing, punctuation stripping and whitespace splitting.
pub mod tokenizer;

/// Frequency ranking of candidate words.
pub mod ranking;

/// Errors raised by invalid model settings.
pub mod error;
