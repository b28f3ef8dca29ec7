use std::fmt;

use serde::{Deserialize, Serialize};

/// A fixed-length, ordered tuple of tokens: the unit of the learned model.
///
/// Two grams are the same gram when their tokens are equal position by
/// position. The gram size is not stored; it is a property of the
/// configuration that produced the gram.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Gram {
	tokens: Vec<String>,
}

impl Gram {
	/// Creates a gram from owned tokens.
	pub fn new(tokens: Vec<String>) -> Self {
		Self { tokens }
	}

	/// Returns the tokens in order.
	pub fn tokens(&self) -> &[String] {
		&self.tokens
	}

	/// Number of tokens in the gram.
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Returns the last token, the one a continuation adds to the text.
	pub fn last(&self) -> Option<&str> {
		self.tokens.last().map(String::as_str)
	}

	/// Consumes the gram and returns its tokens.
	pub fn into_tokens(self) -> Vec<String> {
		self.tokens
	}

	/// Checks whether `self` can follow `previous` in a chain of
	/// `gram_size`-grams.
	///
	/// The first `gram_size - 1` tokens of `self` must equal the last
	/// `gram_size - 1` tokens of `previous`. Grams too short to hold the
	/// overlap never continue anything.
	pub fn continues(&self, previous: &Gram, gram_size: usize) -> bool {
		let overlap = gram_size.saturating_sub(1);
		if previous.len() < overlap || self.len() < overlap {
			return false;
		}
		let suffix = &previous.tokens[previous.len() - overlap..];
		let prefix = &self.tokens[..overlap];
		prefix == suffix
	}
}

impl fmt::Display for Gram {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.tokens.join(" "))
	}
}

impl From<Vec<String>> for Gram {
	fn from(tokens: Vec<String>) -> Self {
		Self::new(tokens)
	}
}

impl From<&[&str]> for Gram {
	fn from(tokens: &[&str]) -> Self {
		Self::new(tokens.iter().map(|t| (*t).to_owned()).collect())
	}
}

impl<const N: usize> From<[&str; N]> for Gram {
	fn from(tokens: [&str; N]) -> Self {
		Self::from(&tokens[..])
	}
}
