use regex::{Regex, RegexBuilder};

/// Pre-filter for disallowed user input.
///
/// Inputs that match none of the configured patterns pass.
#[derive(Clone, Debug)]
pub struct InputGuard {
	patterns: Vec<Regex>,
}
impl InputGuard {
	pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let patterns = patterns
			.into_iter()
			.map(|pattern| RegexBuilder::new(pattern.as_ref()).case_insensitive(true).build())
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self { patterns })
	}

	pub fn from_config(cfg: &librarian_config::Guard) -> Result<Self, regex::Error> {
		Self::new(&cfg.patterns)
	}

	/// Returns `true` when the text must be rejected.
	pub fn check(&self, text: &str) -> bool {
		self.patterns.iter().any(|pattern| pattern.is_match(text))
	}

	pub fn pattern_count(&self) -> usize {
		self.patterns.len()
	}
}
