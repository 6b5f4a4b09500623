use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads a corpus file and returns its non-blank lines.
///
/// - Splits on `\n` / `\r\n`
/// - Trims each line, blank lines are dropped
/// - Each returned line is meant to be trained separately
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let reader = BufReader::new(File::open(filename)?);
	let mut lines = Vec::new();
	for line in reader.lines() {
		let line = line?;
		let line = line.trim();
		if !line.is_empty() {
			lines.push(line.to_owned());
		}
	}
	Ok(lines)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn read_corpus_skips_blank_lines() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "hello how are you\r\n\n   \n  have a great day  \n").unwrap();

		let lines = read_corpus(file.path()).unwrap();
		assert_eq!(lines, vec!["hello how are you", "have a great day"]);
	}

	#[test]
	fn read_corpus_missing_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = read_corpus(dir.path().join("missing.txt")).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::NotFound);
	}
}
