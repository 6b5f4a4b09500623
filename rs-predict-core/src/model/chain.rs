use std::collections::VecDeque;

use rand::Rng;

use super::ranking;

/// Represents one context of the Markov chain.
///
/// A `Chain` is stored under a context key (the `n-1` previous words joined
/// by a space) and holds every word observed right after that context. The
/// key itself lives only in the owning map.
///
/// Occurrences are kept as a list, not as counters: a word seen 3 times is
/// stored 3 times. Frequencies are derived when ranking.
///
/// ## Invariants
/// - Occurrences are stored in insertion order (oldest first)
/// - When a capacity is set, `len() <= capacity`
#[derive(Clone, Debug)]
pub struct Chain {
	/// Observed next words, oldest first.
	occurrences: VecDeque<String>,
	/// Maximum number of occurrences kept, `None` means unbounded.
	capacity: Option<usize>,
}

impl Chain {
	/// Creates a new empty chain, optionally capped to `capacity` occurrences.
	pub fn new(capacity: Option<usize>) -> Self {
		Self {
			occurrences: VecDeque::new(),
			capacity,
		}
	}

	/// Records one occurrence of `next_word` after this context.
	///
	/// If the chain is full, the oldest occurrence is dropped first.
	pub fn push(&mut self, next_word: &str) {
		if let Some(capacity) = self.capacity {
			while self.occurrences.len() >= capacity {
				self.occurrences.pop_front();
			}
		}
		self.occurrences.push_back(next_word.to_owned());
	}

	/// Number of stored occurrences (duplicates included).
	pub fn len(&self) -> usize {
		self.occurrences.len()
	}

	/// Returns `true` if nothing was recorded yet.
	pub fn is_empty(&self) -> bool {
		self.occurrences.is_empty()
	}

	/// Iterates over the stored occurrences, oldest first.
	pub fn occurrences(&self) -> impl Iterator<Item = &str> {
		self.occurrences.iter().map(String::as_str)
	}

	/// Number of times `word` was observed after this context.
	pub fn count(&self, word: &str) -> usize {
		self.occurrences.iter().filter(|w| *w == word).count()
	}

	/// Returns up to `limit` distinct next words, most frequent first.
	pub fn rank(&self, limit: usize) -> Vec<String> {
		ranking::rank(&self.occurrences, limit)
	}

	/// Picks a next word with a probability proportional to its frequency.
	///
	/// Every occurrence has the same chance to be drawn, so a word stored
	/// twice is twice as likely. Returns `None` for an empty chain.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		if self.occurrences.is_empty() {
			return None;
		}
		let index = rng.random_range(0..self.occurrences.len());
		self.occurrences.get(index).map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn keeps_duplicates() {
		let mut chain = Chain::new(None);
		chain.push("you");
		chain.push("we");
		chain.push("you");

		assert_eq!(chain.len(), 3);
		assert_eq!(chain.count("you"), 2);
		assert_eq!(chain.count("they"), 0);
		assert_eq!(chain.rank(5), vec!["you", "we"]);
	}

	#[test]
	fn capacity_drops_oldest() {
		let mut chain = Chain::new(Some(2));
		chain.push("x");
		chain.push("y");
		chain.push("z");

		assert_eq!(chain.occurrences().collect::<Vec<_>>(), vec!["y", "z"]);
	}

	#[test]
	fn sample_only_returns_stored_words() {
		let mut rng = StdRng::seed_from_u64(7);
		let empty = Chain::new(None);
		assert_eq!(empty.sample(&mut rng), None);

		let mut chain = Chain::new(None);
		chain.push("cat");
		chain.push("dog");
		for _ in 0..50 {
			let word = chain.sample(&mut rng).unwrap();
			assert!(word == "cat" || word == "dog");
		}
	}
}
