use std::error::Error;
use std::io::Read;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, SyncSender};

use log::info;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::generate::{GenerateTask, GenerateWorkload};
use crate::learn::{LearnTask, LearnWorkload};
use crate::model::GramStore;
use crate::pool::{Dispatcher, Workload};

/// One shared store with its learn and generate pools.
///
/// # Responsibilities
/// - Own the shared [`GramStore`]
/// - Own one bounded task queue and one dispatcher per workload
/// - Turn calls into tasks and wait for their completion signal
///
/// # Notes
/// - Submitting blocks once a queue is full and every worker is busy.
/// - Dropping the engine closes both queues and stops every worker.
pub struct Engine {
	store: Arc<GramStore>,
	config: EngineConfig,
	learn_queue: SyncSender<LearnTask>,
	generate_queue: SyncSender<GenerateTask>,
	learn: Dispatcher<LearnWorkload>,
	generate: Dispatcher<GenerateWorkload>,
}

impl Engine {
	/// Starts both pools over a new, empty store.
	///
	/// # Errors
	/// A `ConfigError` for invalid parameters, or an I/O error if a thread
	/// cannot be spawned.
	pub fn start(config: &EngineConfig) -> Result<Self, Box<dyn Error>> {
		Self::with_store(config, Arc::new(GramStore::new()))
	}

	/// Starts both pools over `store`.
	///
	/// # Errors
	/// Same as [`start`](Self::start).
	pub fn with_store(config: &EngineConfig, store: Arc<GramStore>) -> Result<Self, Box<dyn Error>> {
		config.validate()?;

		let mut learn = Dispatcher::new(
			LearnWorkload::new(config.gram_size, config.strip_punctuation, &config.normalization_rules),
			config.learn_workers,
		);
		let (learn_queue, learn_tasks) = mpsc::sync_channel(config.queue_size);
		learn.run(learn_tasks)?;

		let mut generate = Dispatcher::new(
			GenerateWorkload::new(config.max_words, config.gram_size),
			config.generate_workers,
		);
		let (generate_queue, generate_tasks) = mpsc::sync_channel(config.queue_size);
		generate.run(generate_tasks)?;

		info!(
			"Engine started: gram size {}, max words {}, strip punctuation {}",
			config.gram_size, config.max_words, config.strip_punctuation
		);

		Ok(Self {
			store,
			config: config.clone(),
			learn_queue,
			generate_queue,
			learn,
			generate,
		})
	}

	pub fn store(&self) -> &Arc<GramStore> {
		&self.store
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Queues `body` for learning.
	///
	/// # Returns
	/// The receiver of the task's completion signal (grams committed).
	///
	/// # Errors
	/// `QueueClosed` if the learn dispatcher is gone.
	pub fn submit_learn(&self, body: impl Read + Send + 'static) -> Result<Receiver<usize>, EngineError> {
		let (task, completion) = LearnTask::new(body, Arc::clone(&self.store));
		self.learn_queue
			.send(task)
			.map_err(|_| EngineError::QueueClosed(LearnWorkload::NAME))?;
		Ok(completion)
	}

	/// Learns `body` and waits until the task completed.
	///
	/// Failures inside the task (bad rules, broken stream) are logged by
	/// the worker and do not surface here.
	pub fn learn(&self, body: impl Read + Send + 'static) -> Result<usize, EngineError> {
		self.submit_learn(body)?
			.recv()
			.map_err(|_| EngineError::TaskDropped(LearnWorkload::NAME))
	}

	/// Queues a generation request.
	///
	/// # Errors
	/// `QueueClosed` if the generate dispatcher is gone.
	pub fn submit_generate(&self) -> Result<Receiver<String>, EngineError> {
		let (task, text) = GenerateTask::new(Arc::clone(&self.store));
		self.generate_queue
			.send(task)
			.map_err(|_| EngineError::QueueClosed(GenerateWorkload::NAME))?;
		Ok(text)
	}

	/// Generates one text and waits for it. The text is empty when nothing
	/// could be sampled.
	pub fn generate(&self) -> Result<String, EngineError> {
		self.submit_generate()?
			.recv()
			.map_err(|_| EngineError::TaskDropped(GenerateWorkload::NAME))
	}

	/// Asks every worker of both pools to stop. Does not wait.
	pub fn stop(&self) {
		info!("Stopping engine");
		self.learn.stop();
		self.generate.stop();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::ConfigError;
	use crate::model::Gram;
	use std::io::Cursor;
	use std::thread;

	const SENTENCE: &str = "the quick brown fox jumps over the lazy dog";

	fn engine(config: EngineConfig) -> Engine {
		Engine::with_store(&config, Arc::new(GramStore::with_seed(7))).expect("engine starts")
	}

	fn text(value: &str) -> Cursor<Vec<u8>> {
		Cursor::new(value.as_bytes().to_vec())
	}

	#[test]
	fn invalid_config_is_rejected() {
		let config = EngineConfig { queue_size: 0, ..Default::default() };
		let err = Engine::start(&config).err().expect("invalid config");
		assert!(err.downcast_ref::<ConfigError>().is_some());
	}

	#[test]
	fn learn_then_generate() {
		let engine = engine(EngineConfig::default());
		assert_eq!(engine.learn(text(SENTENCE)), Ok(7));

		for _ in 0..10 {
			let generated = engine.generate().expect("engine running");
			assert!(SENTENCE.contains(&generated), "{generated:?}");
			assert!(generated.ends_with("lazy dog"), "{generated:?}");
			assert!(generated.split(' ').count() >= 3);
		}
	}

	#[test]
	fn generate_on_empty_store_is_empty() {
		let engine = engine(EngineConfig::default());
		assert_eq!(engine.generate(), Ok(String::new()));
	}

	#[test]
	fn max_words_caps_output() {
		let engine = engine(EngineConfig { max_words: 4, ..Default::default() });
		engine.learn(text("a b a b a b a b")).expect("engine running");
		for _ in 0..10 {
			let generated = engine.generate().expect("engine running");
			assert_eq!(generated.split(' ').count(), 4, "{generated:?}");
		}
	}

	#[test]
	fn concurrent_learners_share_the_store() {
		let engine = Arc::new(engine(EngineConfig { queue_size: 1, ..Default::default() }));
		let handles: Vec<_> = (0..10)
			.map(|_| {
				let engine = Arc::clone(&engine);
				thread::spawn(move || engine.learn(text("a b c")))
			})
			.collect();
		for handle in handles {
			assert_eq!(handle.join().expect("learner panicked"), Ok(1));
		}
		assert_eq!(engine.store().frequency(&Gram::from(["a", "b", "c"])), Some(10));
		assert_eq!(engine.store().stats().grams, 1);
	}

	#[test]
	fn bad_rules_fail_learning_but_not_the_engine() {
		let engine = engine(EngineConfig {
			strip_punctuation: true,
			normalization_rules: vec![crate::tokenizer::NormalizationRule::new("[.-()]", "")],
			..Default::default()
		});
		assert_eq!(engine.learn(text(SENTENCE)), Ok(0));
		assert!(engine.store().is_empty());
		assert_eq!(engine.generate(), Ok(String::new()));
	}

	#[test]
	fn stopped_engine_refuses_work() {
		let engine = engine(EngineConfig { learn_workers: 1, generate_workers: 1, ..Default::default() });
		engine.stop();
		assert!(engine.learn(text(SENTENCE)).is_err());
		assert!(engine.generate().is_err());
	}
}
