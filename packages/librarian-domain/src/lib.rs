pub mod catalog;
pub mod guard;

/// Key used for every case-insensitive title comparison.
pub fn normalize_title(title: &str) -> String {
	title.trim().to_lowercase()
}

/// Lowercase ASCII slug. Runs of anything outside `[a-z0-9]` collapse to a single `-`.
pub fn slugify(text: &str) -> String {
	let mut slug = String::with_capacity(text.len());
	let mut pending_dash = false;

	for ch in text.to_lowercase().chars() {
		if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
			if pending_dash && !slug.is_empty() {
				slug.push('-');
			}

			pending_dash = false;

			slug.push(ch);
		} else {
			pending_dash = true;
		}
	}

	slug
}
