/// Separator used to join context tokens into a chain key.
pub const KEY_SEPARATOR: &str = " ";

/// Splits a text into lowercase word tokens.
///
/// - Lowercases the whole input (Unicode aware)
/// - Drops every character that is neither a word character
///   (alphanumeric or `_`) nor whitespace: `"don't"` becomes `"dont"`
/// - Splits on whitespace runs, empty segments are discarded
pub fn tokenize(text: &str) -> Vec<String> {
	let cleaned: String = text
		.to_lowercase()
		.chars()
		.filter(|c| is_word_char(*c) || c.is_whitespace())
		.collect();

	cleaned.split_whitespace().map(str::to_owned).collect()
}

/// Joins context tokens into the canonical chain key.
pub fn join_key<S: AsRef<str>>(tokens: &[S]) -> String {
	tokens
		.iter()
		.map(AsRef::as_ref)
		.collect::<Vec<&str>>()
		.join(KEY_SEPARATOR)
}

fn is_word_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}
