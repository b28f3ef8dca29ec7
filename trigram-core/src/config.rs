use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Generator;
use crate::tokenizer::NormalizationRule;

pub const DEFAULT_GRAM_SIZE: usize = 3;
pub const DEFAULT_MAX_WORDS: usize = 100;
pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_QUEUE_SIZE: usize = 5;

/// Engine parameters, fixed for the life of the pools.
///
/// # Fields
/// - `gram_size`: tokens per gram
/// - `max_words`: generated text length cap, `0` for unbounded
/// - `strip_punctuation`: whether `normalization_rules` apply to learned text
/// - `normalization_rules`: ordered regex rewrites
/// - `learn_workers` / `generate_workers`: pool sizes
/// - `queue_size`: capacity of each task queue
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
	pub gram_size: usize,
	pub max_words: usize,
	pub strip_punctuation: bool,
	pub normalization_rules: Vec<NormalizationRule>,
	pub learn_workers: usize,
	pub generate_workers: usize,
	pub queue_size: usize,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			gram_size: DEFAULT_GRAM_SIZE,
			max_words: DEFAULT_MAX_WORDS,
			strip_punctuation: false,
			normalization_rules: NormalizationRule::defaults(),
			learn_workers: DEFAULT_WORKERS,
			generate_workers: DEFAULT_WORKERS,
			queue_size: DEFAULT_QUEUE_SIZE,
		}
	}
}

impl EngineConfig {
	/// Checks the parameters before any pool starts.
	///
	/// # Errors
	/// `ConfigError::Invalid` naming the first offending parameter.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.gram_size == 0 {
			return Err(ConfigError::Invalid("gram size must be at least 1".into()));
		}
		if self.max_words != 0 && self.max_words < self.gram_size {
			return Err(ConfigError::Invalid(format!(
				"max words ({}) must be 0 or at least the gram size ({})",
				self.max_words, self.gram_size
			)));
		}
		// Every unigram continues every other one.
		if self.gram_size == 1 && self.max_words == 0 {
			return Err(ConfigError::Invalid("unbounded generation needs a gram size above 1".into()));
		}
		if self.learn_workers == 0 || self.generate_workers == 0 {
			return Err(ConfigError::Invalid("worker counts must be at least 1".into()));
		}
		if self.queue_size == 0 {
			return Err(ConfigError::Invalid("queue size must be at least 1".into()));
		}
		Ok(())
	}

	pub fn generator(&self) -> Generator {
		Generator::new(self.max_words, self.gram_size)
	}
}

/// Rejected engine parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
	Invalid(String),
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Invalid(reason) => write!(f, "invalid configuration: {reason}"),
		}
	}
}

impl Error for ConfigError {}
