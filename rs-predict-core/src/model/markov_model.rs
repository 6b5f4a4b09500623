use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chain::Chain;
use super::error::ModelError;
use super::tokenizer::{join_key, tokenize};

/// Order used when nothing else is configured (bigram).
pub const DEFAULT_ORDER: usize = 2;

/// Number of suggestions returned when the caller does not ask for more.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Read-only snapshot of a model, as reported by `MarkovModel::status`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelStatus {
	/// Current n-gram order.
	pub order: usize,
	/// Number of distinct context keys.
	pub pattern_count: usize,
	/// Number of distinct words ever seen as a next word.
	pub vocabulary_size: usize,
}

/// Word-level Markov chain used for next-word prediction.
///
/// The model maps a context (the last `n-1` words) to every word observed
/// right after it, and ranks those words by frequency on prediction.
///
/// # Responsibilities
/// - Build chains from free text (`train`)
/// - Predict the most likely next words with backoff (`predict`)
/// - Expose simple state management (`clear`, `set_order`, `status`)
///
/// # Invariants
/// - `order` is always >= 2
/// - Every word stored in a chain is in `vocabulary`
/// - Changing `order` never rewrites existing chains: keys built under an
///   older order keep their length until `clear`
///
/// The model is not synchronized; callers sharing it must wrap it
/// (the server keeps it behind a `Mutex`).
#[derive(Clone, Debug)]
pub struct MarkovModel {
	/// The order of the model (context length is `order - 1`)
	order: usize,

	/// Mapping from a context key to its chain
	chains: HashMap<String, Chain>,

	/// Every word ever appended to a chain
	vocabulary: HashSet<String>,

	/// Optional cap on the occurrences stored per context
	max_occurrences: Option<usize>,
}

impl Default for MarkovModel {
	fn default() -> Self {
		Self {
			order: DEFAULT_ORDER,
			chains: HashMap::new(),
			vocabulary: HashSet::new(),
			max_occurrences: None,
		}
	}
}

impl MarkovModel {
	/// Creates an empty model of order `n`.
	///
	/// # Errors
	/// Returns `ModelError::InvalidOrder` if `n < 2`.
	pub fn new(n: usize) -> Result<Self, ModelError> {
		Self::check_order(n)?;
		Ok(Self { order: n, ..Self::default() })
	}

	/// Caps the number of occurrences stored per context.
	///
	/// Once a context holds `cap` occurrences, recording a new one drops the
	/// oldest. Must be called before training: chains created earlier keep
	/// their previous cap.
	///
	/// # Errors
	/// Returns `ModelError::InvalidCapacity` if `cap == 0`.
	pub fn with_max_occurrences(mut self, cap: usize) -> Result<Self, ModelError> {
		if cap == 0 {
			return Err(ModelError::InvalidCapacity);
		}
		self.max_occurrences = Some(cap);
		Ok(self)
	}

	fn check_order(n: usize) -> Result<(), ModelError> {
		if n < 2 {
			return Err(ModelError::InvalidOrder(n));
		}
		Ok(())
	}

	/// Current n-gram order.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Per-context occurrence cap, if any.
	pub fn max_occurrences(&self) -> Option<usize> {
		self.max_occurrences
	}

	/// Returns the chain stored for a context key, if any.
	pub fn chain(&self, key: &str) -> Option<&Chain> {
		self.chains.get(key)
	}

	/// Iterates over the vocabulary (no particular order).
	pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
		self.vocabulary.iter().map(String::as_str)
	}

	/// Learns every n-gram of `text` under the current order.
	///
	/// Returns the number of n-grams added. Texts with fewer words than the
	/// order are ignored. Training the same text twice doubles its weight.
	pub fn train(&mut self, text: &str) -> usize {
		let words = tokenize(text);
		if words.len() < self.order {
			trace!("Skipping training text of {} words (order {})", words.len(), self.order);
			return 0;
		}

		let context_len = self.order - 1;
		let mut added = 0;
		for window in words.windows(self.order) {
			let key = join_key(&window[..context_len]);
			let next_word = &window[context_len];

			let capacity = self.max_occurrences;
			self.chains
				.entry(key)
				.or_insert_with(|| Chain::new(capacity))
				.push(next_word);
			self.vocabulary.insert(next_word.clone());
			added += 1;
		}

		debug!("Trained {} n-grams (order {})", added, self.order);
		added
	}

	/// Trains each line separately, so no n-gram spans two lines.
	///
	/// Returns the total number of n-grams added.
	pub fn train_lines<I, S>(&mut self, lines: I) -> usize
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		lines.into_iter().map(|line| self.train(line.as_ref())).sum()
	}

	/// Finds the chain for the longest known context at the end of `words`.
	///
	/// Tries `order - 1` words of context first, then one less, down to a
	/// single word. An empty context is never looked up.
	fn find_chain(&self, words: &[String]) -> Option<&Chain> {
		for n in (2..=self.order).rev() {
			let context_len = n - 1;
			if words.len() < context_len {
				continue;
			}

			let key = join_key(&words[words.len() - context_len..]);
			if let Some(chain) = self.chains.get(&key) {
				trace!("Context '{}' matched at order {}", key, n);
				return Some(chain);
			}
		}
		None
	}

	/// Predicts up to `max_results` next words for `text`, most likely first.
	///
	/// Returns an empty list when the text has no words or no known context.
	pub fn predict(&self, text: &str, max_results: usize) -> Vec<String> {
		let words = tokenize(text);
		if words.is_empty() {
			return Vec::new();
		}

		match self.find_chain(&words) {
			Some(chain) => chain.rank(max_results),
			None => {
				debug!("No known context for {} input words", words.len());
				Vec::new()
			}
		}
	}

	/// Draws one next word for `text`, weighted by observed frequency.
	///
	/// Uses the same backoff as `predict`. Returns `None` when no context
	/// matches.
	pub fn sample<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Option<String> {
		let words = tokenize(text);
		if words.is_empty() {
			return None;
		}
		self.find_chain(&words)?.sample(rng).map(str::to_owned)
	}

	/// Forgets every chain and the vocabulary. The order is kept.
	pub fn clear(&mut self) {
		self.chains.clear();
		self.vocabulary.clear();
		debug!("Model cleared");
	}

	/// Changes the n-gram order.
	///
	/// Existing chains are left as they are; only future training and the
	/// starting point of the backoff use the new order.
	///
	/// # Errors
	/// Returns `ModelError::InvalidOrder` if `n < 2`, the model is unchanged.
	pub fn set_order(&mut self, n: usize) -> Result<(), ModelError> {
		Self::check_order(n)?;
		debug!("Order changed from {} to {}", self.order, n);
		self.order = n;
		Ok(())
	}

	/// Returns the current order, number of contexts and vocabulary size.
	pub fn status(&self) -> ModelStatus {
		ModelStatus {
			order: self.order,
			pattern_count: self.chains.len(),
			vocabulary_size: self.vocabulary.len(),
		}
	}
}
