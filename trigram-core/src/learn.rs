//! The learn workload: text streams in, grams into the shared store.

use std::io::Read;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, error, warn};

use crate::error::GramError;
use crate::model::GramStore;
use crate::pool::Workload;
use crate::tokenizer::{self, NormalizationRule, Normalizer};

/// A request to learn one text stream.
///
/// Completion is signaled exactly once with the number of grams committed
/// to the store, after the stream was closed, whether learning succeeded
/// or not.
pub struct LearnTask {
	body: Box<dyn Read + Send>,
	store: Arc<GramStore>,
	done: Sender<usize>,
}

impl LearnTask {
	/// Creates a task learning `body` into `store`, and the receiver of its
	/// completion signal.
	pub fn new(body: impl Read + Send + 'static, store: Arc<GramStore>) -> (Self, Receiver<usize>) {
		let (done, completion) = mpsc::channel();
		let task = Self {
			body: Box::new(body),
			store,
			done,
		};
		(task, completion)
	}

	/// Tokenizes the stream into the store, then signals completion.
	///
	/// # Errors
	/// - The normalizer's own error if the rules did not compile; the
	///   stream is not read.
	/// - `StreamRead` if the stream fails. Grams committed before the
	///   failure stay in the store.
	pub fn run(self, gram_size: usize, normalizer: Result<&Normalizer, &GramError>) -> Result<usize, GramError> {
		let Self { body, store, done } = self;
		let mut added = 0;

		let result = match normalizer {
			Ok(normalizer) => tokenizer::tokenize(body, gram_size, normalizer, |gram| {
				store.add_gram(gram);
				added += 1;
			}),
			Err(err) => {
				drop(body);
				Err(err.clone())
			}
		};

		// The receiver may have given up waiting.
		let _ = done.send(added);
		result.map(|()| added)
	}
}

/// Learn workload parameters, fixed when the pool starts.
#[derive(Debug)]
pub struct LearnWorkload {
	gram_size: usize,
	normalizer: Result<Normalizer, GramError>,
}

impl LearnWorkload {
	/// Creates the workload.
	///
	/// `rules` only apply when `strip_punctuation` is set. Rules that fail
	/// to compile make every learn task fail with `NormalizationFailure`.
	pub fn new(gram_size: usize, strip_punctuation: bool, rules: &[NormalizationRule]) -> Self {
		let normalizer = if strip_punctuation {
			Normalizer::new(rules)
		} else {
			Ok(Normalizer::identity())
		};
		if let Err(err) = &normalizer {
			warn!("Learn tasks will be rejected: {err}");
		}
		Self { gram_size, normalizer }
	}

	pub fn gram_size(&self) -> usize {
		self.gram_size
	}
}

impl Workload for LearnWorkload {
	type Task = LearnTask;
	const NAME: &'static str = "learn";

	fn process(&self, task: LearnTask) {
		match task.run(self.gram_size, self.normalizer.as_ref()) {
			Ok(added) => debug!("Learned {added} grams"),
			Err(err) => error!("Error processing learn task: {err}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::Gram;
	use std::io::{self, Cursor};

	fn learn(text: &str, workload: &LearnWorkload, store: &Arc<GramStore>) -> Receiver<usize> {
		let (task, completion) = LearnTask::new(Cursor::new(text.as_bytes().to_vec()), Arc::clone(store));
		workload.process(task);
		completion
	}

	#[test]
	fn learns_overlapping_grams() {
		let store = Arc::new(GramStore::with_seed(1));
		let workload = LearnWorkload::new(3, false, &[]);
		let completion = learn("A test input string", &workload, &store);

		assert_eq!(completion.try_recv(), Ok(2));
		assert_eq!(
			store.snapshot(),
			vec![
				(Gram::from(["A", "test", "input"]), 1),
				(Gram::from(["test", "input", "string"]), 1),
			]
		);
	}

	#[test]
	fn repeated_text_raises_frequencies() {
		let store = Arc::new(GramStore::with_seed(1));
		let workload = LearnWorkload::new(2, false, &[]);
		learn("a b a b", &workload, &store);

		assert_eq!(store.frequency(&Gram::from(["a", "b"])), Some(2));
		assert_eq!(store.frequency(&Gram::from(["b", "a"])), Some(1));
		assert_eq!(store.total_frequency(), 3);
	}

	#[test]
	fn strip_punctuation_applies_rules() {
		let store = Arc::new(GramStore::with_seed(1));
		let workload = LearnWorkload::new(2, true, &NormalizationRule::defaults());
		learn("Hello,\nworld!! #yes", &workload, &store);

		assert_eq!(
			store.snapshot(),
			vec![(Gram::from(["Hello,", "world!!"]), 1), (Gram::from(["world!!", "yes"]), 1)]
		);
	}

	#[test]
	fn rules_are_ignored_without_stripping() {
		let workload = LearnWorkload::new(2, false, &[NormalizationRule::new("[.-()]", "")]);
		let store = Arc::new(GramStore::with_seed(1));
		assert_eq!(learn("x@ y@", &workload, &store).try_recv(), Ok(1));
		assert_eq!(store.frequency(&Gram::from(["x@", "y@"])), Some(1));
	}

	#[test]
	fn malformed_rule_aborts_but_completes() {
		let store = Arc::new(GramStore::with_seed(1));
		let workload = LearnWorkload::new(2, true, &[NormalizationRule::new("[.-()]", "")]);

		let (task, completion) = LearnTask::new(Cursor::new(b"a b c".to_vec()), Arc::clone(&store));
		let result = task.run(workload.gram_size(), workload.normalizer.as_ref());

		assert!(matches!(result, Err(GramError::NormalizationFailure { .. })));
		assert_eq!(completion.try_recv(), Ok(0));
		assert!(store.is_empty());
	}

	struct Broken;

	impl Read for Broken {
		fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
			Err(io::Error::other("Error reading data"))
		}
	}

	#[test]
	fn broken_stream_still_signals_completion() {
		let store = Arc::new(GramStore::with_seed(1));
		let workload = LearnWorkload::new(2, false, &[]);
		let (task, completion) = LearnTask::new(Broken, Arc::clone(&store));

		let result = task.run(2, workload.normalizer.as_ref());
		assert!(matches!(result, Err(GramError::StreamRead(_))));
		assert_eq!(completion.try_recv(), Ok(0));
	}

	#[test]
	fn stream_is_closed_before_completion() {
		struct Tracked(Cursor<Vec<u8>>, Arc<std::sync::atomic::AtomicBool>);
		impl Read for Tracked {
			fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
				self.0.read(buf)
			}
		}
		impl Drop for Tracked {
			fn drop(&mut self) {
				self.1.store(true, std::sync::atomic::Ordering::SeqCst);
			}
		}

		let closed = Arc::new(std::sync::atomic::AtomicBool::new(false));
		let store = Arc::new(GramStore::with_seed(1));
		let body = Tracked(Cursor::new(b"a b c".to_vec()), Arc::clone(&closed));
		let (task, completion) = LearnTask::new(body, store);

		let handle = std::thread::spawn(move || LearnWorkload::new(2, false, &[]).process(task));
		assert_eq!(completion.recv(), Ok(2));
		assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
		handle.join().expect("learn thread panicked");
	}
}
