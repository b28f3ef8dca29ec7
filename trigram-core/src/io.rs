use std::io::{self, ErrorKind, Read};

/// Number of bytes requested from a learn stream per read.
pub const READ_SIZE: usize = 64;

/// Reads a byte stream in bounded reads and decodes it to text chunks.
///
/// - Never holds more than one read (plus an incomplete character) in memory
/// - A multi-byte character split across two reads is carried over and
///   decoded with the next read
/// - Invalid UTF-8 sequences decode to `U+FFFD`
/// - `Interrupted` reads are retried
#[derive(Debug)]
pub struct TextChunks<R> {
	reader: R,
	buffer: Vec<u8>,
	pending: Vec<u8>,
	finished: bool,
}

impl<R: Read> TextChunks<R> {
	/// Wraps `reader`, reading [`READ_SIZE`] bytes at a time.
	pub fn new(reader: R) -> Self {
		Self::with_read_size(reader, READ_SIZE)
	}

	/// Wraps `reader`, reading at most `read_size` bytes at a time
	/// (at least one).
	pub fn with_read_size(reader: R, read_size: usize) -> Self {
		Self {
			reader,
			buffer: vec![0; read_size.max(1)],
			pending: Vec::new(),
			finished: false,
		}
	}

	/// Returns the next decoded chunk, or `Ok(None)` once the stream ended.
	///
	/// # Errors
	/// Any read error other than `Interrupted`.
	pub fn next_chunk(&mut self) -> io::Result<Option<String>> {
		while !self.finished {
			let read = match self.reader.read(&mut self.buffer) {
				Ok(read) => read,
				Err(err) if err.kind() == ErrorKind::Interrupted => continue,
				Err(err) => return Err(err),
			};

			if read == 0 {
				self.finished = true;
				if self.pending.is_empty() {
					break;
				}
				let tail = String::from_utf8_lossy(&self.pending).into_owned();
				self.pending.clear();
				return Ok(Some(tail));
			}

			self.pending.extend_from_slice(&self.buffer[..read]);
			let text = decode_complete(&mut self.pending);
			if !text.is_empty() {
				return Ok(Some(text));
			}
			// Only part of a character so far.
		}
		Ok(None)
	}

	/// Gives back the wrapped reader.
	pub fn into_inner(self) -> R {
		self.reader
	}
}

/// Decodes every complete character at the front of `pending` and removes
/// the consumed bytes. An incomplete trailing sequence stays in `pending`.
fn decode_complete(pending: &mut Vec<u8>) -> String {
	let mut text = String::with_capacity(pending.len());
	let mut consumed = 0;

	while consumed < pending.len() {
		let rest = &pending[consumed..];
		match std::str::from_utf8(rest) {
			Ok(valid) => {
				text.push_str(valid);
				consumed = pending.len();
			}
			Err(err) => {
				let valid_up_to = err.valid_up_to();
				text.push_str(&String::from_utf8_lossy(&rest[..valid_up_to]));
				match err.error_len() {
					Some(invalid) => {
						text.push(char::REPLACEMENT_CHARACTER);
						consumed += valid_up_to + invalid;
					}
					None => {
						consumed += valid_up_to;
						break;
					}
				}
			}
		}
	}

	pending.drain(..consumed);
	text
}
