//! Streaming tokenizer: byte stream → normalized text → fixed-size grams.
//!
//! Text arrives in bounded chunks. Tokens cut by a chunk boundary are
//! stitched back together through a carried-over remainder, so chunked and
//! single-shot delivery of the same bytes produce the same grams.

use std::io::Read;
use std::mem;

use crate::error::GramError;
use crate::io::TextChunks;
use crate::model::Gram;

/// Ordered text rewrite rules applied before splitting.
pub mod normalizer;

pub use normalizer::{NormalizationRule, Normalizer};

/// Cuts whitespace-separated text into overlapping grams.
///
/// Consecutive grams overlap by `gram_size - 1` tokens. Tokens that cannot
/// complete a gram yet are kept as a remainder and prefixed to the next
/// chunk.
#[derive(Debug, Clone)]
pub struct GramSplitter {
	gram_size: usize,
	remainder: String,
}

impl GramSplitter {
	/// Creates a splitter for grams of `gram_size` tokens (at least one).
	pub fn new(gram_size: usize) -> Self {
		Self {
			gram_size: gram_size.max(1),
			remainder: String::new(),
		}
	}

	pub fn gram_size(&self) -> usize {
		self.gram_size
	}

	/// Text carried over to the next chunk.
	pub fn remainder(&self) -> &str {
		&self.remainder
	}

	/// Feeds one chunk of text, handing each completed gram to `emit`.
	///
	/// A gram is cut only while more than `gram_size` tokens are available,
	/// so the last token seen may still grow with the next chunk. After a
	/// cut, the remainder is the overlap plus the leftover tokens joined by
	/// single spaces, followed by one space if the text ended with
	/// whitespace. Without a cut, the text is kept as is.
	///
	/// Returns the number of grams emitted.
	pub fn feed(&mut self, chunk: &str, mut emit: impl FnMut(Gram)) -> usize {
		if chunk.is_empty() {
			return 0;
		}

		let text = mem::take(&mut self.remainder) + chunk;
		let tokens: Vec<&str> = text.split_whitespace().collect();

		let mut start = 0;
		while tokens.len() - start > self.gram_size {
			let window = &tokens[start..start + self.gram_size];
			emit(Gram::new(window.iter().map(|token| (*token).to_owned()).collect()));
			start += 1;
		}

		let cut = (start > 0).then(|| {
			let mut rest = tokens[start..].join(" ");
			if text.ends_with(char::is_whitespace) {
				rest.push(' ');
			}
			rest
		});
		self.remainder = cut.unwrap_or(text);
		start
	}

	/// Ends the stream.
	///
	/// The remainder becomes a last gram only if it holds exactly
	/// `gram_size` tokens; anything shorter is dropped.
	pub fn finish(self) -> Option<Gram> {
		let tokens: Vec<String> = self.remainder.split_whitespace().map(str::to_owned).collect();
		(tokens.len() == self.gram_size).then(|| Gram::new(tokens))
	}
}

/// Tokenizes a whole stream into grams of `gram_size` tokens.
///
/// # Parameters
/// - `reader`: the byte stream, read [`READ_SIZE`](crate::io::READ_SIZE)
///   bytes at a time
/// - `gram_size`: tokens per gram
/// - `normalizer`: rewrite rules applied to every decoded chunk
/// - `sink`: receives each gram as soon as it is complete
///
/// # Errors
/// `StreamRead` if the stream fails. Grams already handed to `sink` stay
/// delivered and the pending remainder is discarded.
pub fn tokenize<R: Read>(
	reader: R,
	gram_size: usize,
	normalizer: &Normalizer,
	sink: impl FnMut(Gram),
) -> Result<(), GramError> {
	tokenize_chunks(TextChunks::new(reader), gram_size, normalizer, sink)
}

pub(crate) fn tokenize_chunks<R: Read>(
	mut chunks: TextChunks<R>,
	gram_size: usize,
	normalizer: &Normalizer,
	mut sink: impl FnMut(Gram),
) -> Result<(), GramError> {
	let mut splitter = GramSplitter::new(gram_size);

	while let Some(chunk) = chunks.next_chunk().map_err(|err| GramError::StreamRead(err.to_string()))? {
		let text = normalizer.normalize(&chunk);
		splitter.feed(&text, &mut sink);
	}

	if let Some(last) = splitter.finish() {
		sink(last);
	}
	Ok(())
}
