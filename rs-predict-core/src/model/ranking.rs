use std::collections::HashMap;

/// Ranks tokens by frequency and returns them with their counts.
///
/// - Most frequent first
/// - Ties keep the order in which tokens first appear in `possibilities`
/// - At most `limit` entries are returned
pub fn rank_counts<I, S>(possibilities: I, limit: usize) -> Vec<(String, usize)>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	// Index into `counted` by token, `counted` itself keeps first-seen order
	let mut index: HashMap<String, usize> = HashMap::new();
	let mut counted: Vec<(String, usize)> = Vec::new();

	for token in possibilities {
		let token = token.as_ref();
		match index.get(token) {
			Some(&i) => counted[i].1 += 1,
			None => {
				index.insert(token.to_owned(), counted.len());
				counted.push((token.to_owned(), 1));
			}
		}
	}

	// Stable sort, so equal counts stay in first-seen order
	counted.sort_by(|a, b| b.1.cmp(&a.1));
	counted.truncate(limit);
	counted
}

/// Ranks tokens by frequency, most frequent first, keeping at most `limit`.
///
/// See [`rank_counts`] for the ordering rules.
pub fn rank<I, S>(possibilities: I, limit: usize) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	rank_counts(possibilities, limit)
		.into_iter()
		.map(|(token, _)| token)
		.collect()
}
