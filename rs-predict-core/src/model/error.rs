use thiserror::Error;

/// Errors returned when configuring a `MarkovModel`.
///
/// Training and prediction never fail; only invalid settings are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
	/// The n-gram order must leave at least one word of context.
	#[error("n must be >= 2, got {0}")]
	InvalidOrder(usize),

	/// A per-context occurrence cap of zero would store nothing.
	#[error("max occurrences per context must be >= 1")]
	InvalidCapacity,
}
