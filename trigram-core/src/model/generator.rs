use log::warn;

use super::store::GramStore;
use crate::error::GramError;

/// Random text generator walking a [`GramStore`].
///
/// # Responsibilities
/// - Pick a frequency-weighted start gram
/// - Extend the text one token at a time with weighted continuations
/// - Stop at `max_words` tokens, or when the chain runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator {
	/// Maximum number of words to emit; `0` means unbounded.
	pub max_words: usize,
	/// Size of the grams stored in the walked store.
	pub gram_size: usize,
}

impl Generator {
	pub fn new(max_words: usize, gram_size: usize) -> Self {
		Self { max_words, gram_size }
	}

	/// Generates one random text from `store`.
	///
	/// # Returns
	/// - `Ok(String)`: tokens joined by single spaces
	/// - `Err(GramError)`: if no start gram can be drawn
	///
	/// # Behavior
	/// - The start gram's tokens seed the output. A store holding a single
	///   gram yields exactly that gram.
	/// - Each continuation only contributes its last token; the others
	///   overlap the text already emitted.
	/// - The word limit is checked after each continuation, so the start
	///   gram is always emitted whole.
	/// - A missing continuation ends the text normally.
	pub fn generate(&self, store: &GramStore) -> Result<String, GramError> {
		let (start, population) = store.draw()?;
		if population == 1 {
			return Ok(start.to_string());
		}

		let mut words: Vec<String> = start.tokens().to_vec();
		let mut current = start;
		loop {
			let next = match store.next(&current, self.gram_size) {
				Ok(gram) => gram,
				Err(GramError::NoContinuation) => break,
				Err(err) => {
					warn!("Stopping generation after {} words: {err}", words.len());
					break;
				}
			};

			if let Some(word) = next.last() {
				words.push(word.to_owned());
			}

			if self.max_words > 0 && words.len() >= self.max_words {
				break;
			}
			current = next;
		}

		Ok(words.join(" "))
	}
}

impl GramStore {
	/// Builds a random text of at most `max_words` words (`0` = unbounded)
	/// from grams of size `gram_size`.
	///
	/// Shorthand for [`Generator::generate`].
	pub fn build_random_text(&self, max_words: usize, gram_size: usize) -> Result<String, GramError> {
		Generator::new(max_words, gram_size).generate(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::gram::Gram;

	fn store_of(grams: &[&[&str]], seed: u64) -> GramStore {
		let store = GramStore::with_seed(seed);
		for gram in grams {
			store.add_gram(Gram::from(*gram));
		}
		store
	}

	#[test]
	fn output_is_a_piece_of_the_only_chain() {
		let chain = "this is a sample text blob";
		for seed in 0..50 {
			let store = store_of(
				&[&["this", "is", "a"], &["is", "a", "sample"], &["a", "sample", "text"], &["sample", "text", "blob"]],
				seed,
			);
			let text = store.build_random_text(100, 3).expect("store is not empty");
			assert!(chain.contains(&text), "{text:?} is not part of {chain:?}");
			assert!(chain.ends_with(&text), "the walk always reaches the end of the chain");
		}
	}

	#[test]
	fn first_gram_starts_a_full_chain() {
		// Only the first gram has no predecessor; when it is drawn, the
		// whole chain comes out.
		let seen_full = (0..200).any(|seed| {
			let store = store_of(
				&[&["this", "is", "a"], &["is", "a", "sample"], &["a", "sample", "text"], &["sample", "text", "blob"]],
				seed,
			);
			store.build_random_text(0, 3).as_deref() == Ok("this is a sample text blob")
		});
		assert!(seen_full);
	}

	#[test]
	fn empty_store_generates_nothing() {
		let store = GramStore::with_seed(1);
		assert_eq!(store.build_random_text(100, 3), Err(GramError::EmptyStore));
	}

	#[test]
	fn single_gram_is_returned_verbatim() {
		let store = store_of(&[&["this", "is", "cool"]], 1);
		assert_eq!(store.build_random_text(100, 3).as_deref(), Ok("this is cool"));
	}

	#[test]
	fn single_self_continuing_gram_does_not_loop() {
		let store = store_of(&[&["a", "a", "a"]], 1);
		assert_eq!(store.build_random_text(0, 3).as_deref(), Ok("a a a"));
	}

	#[test]
	fn cycles_stop_at_max_words() {
		let store = store_of(&[&["this", "that", "those"], &["that", "those", "this"], &["those", "this", "that"]], 4);
		let text = store.build_random_text(7, 3).expect("store is not empty");
		assert_eq!(text.split(' ').count(), 7);
		assert!("this that those this that those this that those".contains(&text));
	}

	#[test]
	fn max_words_below_gram_size_still_adds_one_continuation() {
		let store = store_of(&[&["this", "that", "those"], &["that", "those", "this"], &["those", "this", "that"]], 4);
		let text = store.build_random_text(1, 3).expect("store is not empty");
		assert_eq!(text.split(' ').count(), 4);
	}

	#[test]
	fn branching_chain_stays_within_learned_paths() {
		let store = store_of(&[&["this", "is", "a"], &["is", "a", "sample"], &["is", "this", "is"]], 8);
		for _ in 0..50 {
			let text = store.build_random_text(100, 3).expect("store is not empty");
			assert!("is this is this is a sample".contains(&text) || "is this is a sample".contains(&text), "{text:?}");
		}
	}

	#[test]
	fn generator_matches_store_shorthand() {
		let generator = Generator::new(100, 3);
		let store = store_of(&[&["only", "one", "gram"]], 1);
		assert_eq!(generator.generate(&store), store.build_random_text(100, 3));
	}
}
