//! The generate workload: random text out of the shared store.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, error};

use crate::error::GramError;
use crate::model::{Generator, GramStore};
use crate::pool::Workload;

/// A request for one generated text.
///
/// The text is delivered exactly once on the task's output channel. A
/// failed generation delivers an empty string.
pub struct GenerateTask {
	store: Arc<GramStore>,
	output: Sender<String>,
}

impl GenerateTask {
	/// Creates a task sampling `store`, and the receiver of its text.
	pub fn new(store: Arc<GramStore>) -> (Self, Receiver<String>) {
		let (output, text) = mpsc::channel();
		(Self { store, output }, text)
	}

	/// Generates the text, delivers it, and returns it.
	///
	/// # Errors
	/// `EmptyStore` or `SamplingExhausted` if no start gram can be drawn;
	/// the empty string is delivered in that case.
	pub fn run(self, generator: &Generator) -> Result<String, GramError> {
		let result = generator.generate(&self.store);
		let text = result.as_deref().unwrap_or_default().to_owned();
		// The receiver may have given up waiting.
		let _ = self.output.send(text);
		result
	}
}

/// Generate workload parameters, fixed when the pool starts.
#[derive(Debug, Clone, Copy)]
pub struct GenerateWorkload {
	generator: Generator,
}

impl GenerateWorkload {
	pub fn new(max_words: usize, gram_size: usize) -> Self {
		Self {
			generator: Generator::new(max_words, gram_size),
		}
	}

	pub fn generator(&self) -> &Generator {
		&self.generator
	}
}

impl Workload for GenerateWorkload {
	type Task = GenerateTask;
	const NAME: &'static str = "generate";

	fn process(&self, task: GenerateTask) {
		match task.run(&self.generator) {
			Ok(text) => debug!("Generated {} words", text.split_whitespace().count()),
			Err(err) => error!("Error generating text: {err}"),
		}
	}
}
