use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GramError;

/// Line breaks of any platform.
pub const LINE_BREAKS: &str = r"\r?\n";

/// Anything outside letters, digits, spaces and basic sentence punctuation.
pub const DISALLOWED_CHARACTERS: &str = r"[^a-zA-Z0-9\-\.,!\?' ]+";

/// A text rewrite: every match of `pattern` is replaced by `replacement`.
///
/// `replacement` may refer to capture groups (`$1`, `$name`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NormalizationRule {
	pub pattern: String,
	pub replacement: String,
}

impl NormalizationRule {
	pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
		Self {
			pattern: pattern.into(),
			replacement: replacement.into(),
		}
	}

	/// Rules used when punctuation stripping is enabled:
	/// line breaks become spaces, then disallowed characters are dropped.
	pub fn defaults() -> Vec<Self> {
		vec![
			Self::new(LINE_BREAKS, " "),
			Self::new(DISALLOWED_CHARACTERS, ""),
		]
	}
}

/// Compiled, ordered list of [`NormalizationRule`]s.
///
/// Rules are applied in sequence; each one sees the output of the
/// previous one.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
	rules: Vec<(Regex, String)>,
}

impl Normalizer {
	/// Compiles `rules`.
	///
	/// # Errors
	/// `NormalizationFailure` naming the first pattern that does not compile.
	pub fn new(rules: &[NormalizationRule]) -> Result<Self, GramError> {
		let rules = rules
			.iter()
			.map(|rule| {
				Regex::new(&rule.pattern)
					.map(|regex| (regex, rule.replacement.clone()))
					.map_err(|err| GramError::NormalizationFailure {
						pattern: rule.pattern.clone(),
						message: err.to_string(),
					})
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { rules })
	}

	/// A normalizer that leaves text untouched.
	pub fn identity() -> Self {
		Self::default()
	}

	pub fn is_identity(&self) -> bool {
		self.rules.is_empty()
	}

	/// Applies every rule, in order, to `text`.
	pub fn normalize(&self, text: &str) -> String {
		let mut text = text.to_owned();
		for (regex, replacement) in &self.rules {
			text = regex.replace_all(&text, replacement.as_str()).into_owned();
		}
		text
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn strip(text: &str, rules: &[NormalizationRule]) -> String {
		Normalizer::new(rules).expect("rules compile").normalize(text)
	}

	#[test]
	fn no_rules_keep_text() {
		assert_eq!(strip("A B", &[]), "A B");
		assert!(Normalizer::identity().is_identity());
	}

	#[test]
	fn disallowed_characters_are_dropped() {
		let rules = [NormalizationRule::new(DISALLOWED_CHARACTERS, "")];
		assert_eq!(strip("A,B", &rules), "A,B");
		assert_eq!(strip("A@B", &rules), "AB");
		assert_eq!(strip("A!B", &rules), "A!B");
		assert_eq!(strip("Hey how are you?", &rules), "Hey how are you?");
		assert_eq!(strip("me@gmail.com", &rules), "megmail.com");
	}

	#[test]
	fn line_breaks_become_spaces() {
		let rules = [NormalizationRule::new(LINE_BREAKS, " ")];
		assert_eq!(strip("This is\na test", &rules), "This is a test");
		assert_eq!(strip("Someone\r\ncall\n999!", &rules), "Someone call 999!");
	}

	#[test]
	fn rules_apply_in_order() {
		let defaults = NormalizationRule::defaults();
		assert_eq!(strip("Let's eat,\nGrandma.", &defaults), "Let's eat, Grandma.");
		assert_eq!(strip("tab\there", &defaults), "tabhere");

		// Reversed, the line break is dropped before it can become a space.
		let reversed: Vec<_> = defaults.into_iter().rev().collect();
		assert_eq!(strip("Let's eat,\nGrandma.", &reversed), "Let's eat,Grandma.");
	}

	#[test]
	fn malformed_rule_is_reported() {
		let err = Normalizer::new(&[NormalizationRule::new("[.-()]", "")]).expect_err("reversed range");
		assert!(matches!(err, GramError::NormalizationFailure { ref pattern, .. } if pattern == "[.-()]"));
	}
}
