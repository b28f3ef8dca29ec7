//! The learned word model.
//!
//! - Fixed-size word tuples (`Gram`)
//! - The shared, frequency-weighted store (`GramStore`)
//! - Random text generation by walking the store (`Generator`)

/// Fixed-size token tuple, the unit of the model.
pub mod gram;

/// Thread-safe gram store with weighted sampling and chain continuation.
///
/// Supports concurrent learning and generation on a single instance.
pub mod store;

/// Random text generation over a `GramStore`.
pub mod generator;

pub use gram::Gram;
pub use generator::Generator;
pub use store::{GramStore, StoreStats};
