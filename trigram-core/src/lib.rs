//! Word n-gram learning and random text generation.
//!
//! This crate provides a concurrent learn/generate engine including:
//! - A shared gram store with frequency-weighted sampling
//! - Chain continuation to walk the store into new text
//! - A streaming tokenizer that cuts any byte stream into grams
//! - A worker pool running the learn and generate workloads
//!
//! Most callers only need [`Engine`] and [`EngineConfig`]. The store,
//! tokenizer and pool are public for callers that wire their own.

/// Error types shared by the whole crate.
pub mod error;

/// Engine parameters and their validation.
pub mod config;

/// Facade owning the store and both pools.
pub mod engine;

/// Grams, the shared store and text generation.
pub mod model;

/// Stream to gram splitting and text normalization.
pub mod tokenizer;

/// Generic dispatcher/worker pool.
pub mod pool;

/// The learn workload.
pub mod learn;

/// The generate workload.
pub mod generate;

/// Chunked UTF-8 reading.
pub mod io;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::{EngineError, GramError};
pub use model::{Generator, Gram, GramStore, StoreStats};
pub use tokenizer::{NormalizationRule, Normalizer};
