use std::fmt;

/// Errors produced by the gram store, the tokenizer and text generation.
///
/// # Variants
/// - `EmptyStore`: no gram exists to sample from.
/// - `SamplingExhausted`: the weighted walk ended without selecting a gram.
///   Only reachable when the stored frequencies disagree with the total.
/// - `NoContinuation`: no gram continues the current one. Generation treats
///   it as the normal end of a chain.
/// - `NormalizationFailure`: a normalization rule does not compile. Aborts
///   the learn task that hit it.
/// - `StreamRead`: the learn stream failed mid-read. Aborts the learn task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GramError {
	EmptyStore,
	SamplingExhausted,
	NoContinuation,
	NormalizationFailure {
		pattern: String,
		message: String,
	},
	StreamRead(String),
}

impl fmt::Display for GramError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GramError::EmptyStore => write!(f, "no grams to fetch randomly"),
			GramError::SamplingExhausted => write!(f, "unable to fetch a random gram"),
			GramError::NoContinuation => write!(f, "no gram continues the current one"),
			GramError::NormalizationFailure { pattern, message } => {
				write!(f, "invalid normalization rule {pattern:?}: {message}")
			}
			GramError::StreamRead(message) => write!(f, "failed to read learn stream: {message}"),
		}
	}
}

impl std::error::Error for GramError {}

/// Errors returned by the [`Engine`](crate::engine::Engine) facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
	/// The task queue has no dispatcher behind it anymore.
	QueueClosed(&'static str),
	/// The task was discarded before it could signal completion
	/// (its worker was stopped while the task was in flight).
	TaskDropped(&'static str),
}

impl fmt::Display for EngineError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EngineError::QueueClosed(workload) => write!(f, "{workload} queue is closed"),
			EngineError::TaskDropped(workload) => {
				write!(f, "{workload} task was dropped before completion")
			}
		}
	}
}

impl std::error::Error for EngineError {}
