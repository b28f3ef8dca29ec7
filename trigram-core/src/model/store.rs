use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::gram::Gram;
use crate::error::GramError;

/// Unguarded contents of a [`GramStore`].
///
/// ## Invariants
/// - `grams`, `frequencies` and `order` always have the same length
/// - `order` is a permutation of `0..grams.len()`
/// - `total_frequency` is the sum of `frequencies`
#[derive(Debug, Default)]
struct Grams {
	/// Distinct grams, in insertion order.
	grams: Vec<Gram>,
	/// Occurrence count of `grams[i]`, starting at 1.
	frequencies: Vec<u64>,
	/// Traversal order used by the weighted walk.
	order: Vec<usize>,
	total_frequency: u64,
}

impl Grams {
	/// Linear search for an exact token-wise match.
	fn index_of(&self, gram: &Gram) -> Option<usize> {
		self.grams.iter().position(|known| known == gram)
	}

	fn add_new(&mut self, gram: Gram) {
		self.push_with_frequency(gram, 1);
	}

	fn update_frequency(&mut self, index: usize) {
		self.frequencies[index] += 1;
		self.total_frequency += 1;
	}

	fn push_with_frequency(&mut self, gram: Gram, frequency: u64) {
		self.grams.push(gram);
		self.frequencies.push(frequency);
		self.order.push(self.order.len());
		self.total_frequency += frequency;
	}

	/// Weighted random selection.
	///
	/// Shuffles `order`, draws `r` in `[0, total_frequency]` and walks the
	/// shuffled order subtracting each frequency from `r` until it drops to
	/// zero or below. A single gram is returned without touching `rng`.
	fn weighted_pick(&mut self, rng: &mut StdRng) -> Result<&Gram, GramError> {
		match self.grams.len() {
			0 => Err(GramError::EmptyStore),
			1 => Ok(&self.grams[0]),
			_ => {
				self.order.shuffle(rng);
				let mut remaining = rng.random_range(0..=self.total_frequency);
				for &index in &self.order {
					let frequency = self.frequencies[index];
					if remaining <= frequency {
						return Ok(&self.grams[index]);
					}
					remaining -= frequency;
				}
				Err(GramError::SamplingExhausted)
			}
		}
	}
}

/// Read-only summary of a store, as reported to clients.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
	/// Number of distinct grams.
	pub grams: usize,
	/// Sum of every gram frequency.
	pub total_frequency: u64,
}

/// The shared, thread-safe gram model.
///
/// A `GramStore` holds every gram learned so far together with its
/// frequency. It is created empty, grows monotonically through
/// [`add_gram`](Self::add_gram) and is sampled by the generation path.
///
/// # Responsibilities
/// - Record gram occurrences (append-only, no eviction)
/// - Draw a gram with probability proportional to its frequency
/// - Draw a valid Markov continuation of a given gram
///
/// # Concurrency
/// All gram data sits behind one `RwLock`. Mutation and weighted sampling
/// take it exclusively (sampling reshuffles the traversal order); building
/// the continuation subset only needs shared access. The random source has
/// its own mutex and is always locked after the data lock.
#[derive(Debug)]
pub struct GramStore {
	grams: RwLock<Grams>,
	rng: Mutex<StdRng>,
}

impl GramStore {
	/// Creates an empty store seeded from OS entropy.
	pub fn new() -> Self {
		Self::with_rng(StdRng::from_os_rng())
	}

	/// Creates an empty store with a deterministic random source.
	pub fn with_seed(seed: u64) -> Self {
		Self::with_rng(StdRng::seed_from_u64(seed))
	}

	/// Creates an empty store drawing from `rng`.
	pub fn with_rng(rng: StdRng) -> Self {
		Self::from_grams(Grams::default(), rng)
	}

	fn from_grams(grams: Grams, rng: StdRng) -> Self {
		Self {
			grams: RwLock::new(grams),
			rng: Mutex::new(rng),
		}
	}

	// Every mutation leaves `Grams` consistent, so a poisoned lock still
	// guards valid data.
	fn read(&self) -> RwLockReadGuard<'_, Grams> {
		self.grams.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn write(&self) -> RwLockWriteGuard<'_, Grams> {
		self.grams.write().unwrap_or_else(PoisonError::into_inner)
	}

	fn rng(&self) -> MutexGuard<'_, StdRng> {
		self.rng.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Records one occurrence of `gram`.
	///
	/// - If the gram is already known, its frequency is increased by one.
	/// - Otherwise it is appended with a frequency of 1.
	///
	/// Either way the total frequency grows by one.
	pub fn add_gram(&self, gram: Gram) {
		let mut grams = self.write();
		match grams.index_of(&gram) {
			Some(index) => grams.update_frequency(index),
			None => grams.add_new(gram),
		}
	}

	/// Returns a gram picked at random, weighted by frequency.
	///
	/// # Errors
	/// - `EmptyStore` if nothing was learned yet.
	/// - `SamplingExhausted` if the weighted walk fails to resolve.
	pub fn weighted_random_gram(&self) -> Result<Gram, GramError> {
		self.draw().map(|(gram, _)| gram)
	}

	/// Weighted draw that also reports how many grams the store held at
	/// the time of the draw.
	pub(crate) fn draw(&self) -> Result<(Gram, usize), GramError> {
		let mut grams = self.write();
		let population = grams.grams.len();
		let mut rng = self.rng();
		let gram = grams.weighted_pick(&mut rng)?.clone();
		Ok((gram, population))
	}

	/// Picks a gram that can follow `current` in a chain of
	/// `gram_size`-grams.
	///
	/// Candidates are the grams whose first `gram_size - 1` tokens equal
	/// the last `gram_size - 1` tokens of `current`. They are copied with
	/// their frequencies into a transient store, which is then sampled.
	/// The source store is only read-locked while the candidates are
	/// collected. Cost is linear in the size of the store.
	///
	/// # Errors
	/// - `NoContinuation` if no gram matches.
	/// - `SamplingExhausted` if the weighted walk over the candidates fails.
	pub fn next(&self, current: &Gram, gram_size: usize) -> Result<Gram, GramError> {
		let continuations = {
			let grams = self.read();
			let mut candidates = Grams::default();
			for &index in &grams.order {
				let gram = &grams.grams[index];
				if gram.continues(current, gram_size) {
					candidates.push_with_frequency(gram.clone(), grams.frequencies[index]);
				}
			}
			let rng = StdRng::from_rng(&mut *self.rng());
			GramStore::from_grams(candidates, rng)
		};

		continuations.weighted_random_gram().map_err(|err| match err {
			GramError::EmptyStore => GramError::NoContinuation,
			other => other,
		})
	}

	/// Number of distinct grams.
	pub fn len(&self) -> usize {
		self.read().grams.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn total_frequency(&self) -> u64 {
		self.read().total_frequency
	}

	/// Returns the frequency of `gram`, or `None` if it was never learned.
	pub fn frequency(&self, gram: &Gram) -> Option<u64> {
		let grams = self.read();
		grams.index_of(gram).map(|index| grams.frequencies[index])
	}

	/// Copies every gram with its frequency, in insertion order.
	pub fn snapshot(&self) -> Vec<(Gram, u64)> {
		let grams = self.read();
		grams
			.grams
			.iter()
			.cloned()
			.zip(grams.frequencies.iter().copied())
			.collect()
	}

	pub fn stats(&self) -> StoreStats {
		let grams = self.read();
		StoreStats {
			grams: grams.grams.len(),
			total_frequency: grams.total_frequency,
		}
	}

	/// Builds a store from raw parts, bypassing `add_gram`.
	///
	/// `total_frequency` is taken as given so tests can build inconsistent
	/// stores.
	#[cfg(test)]
	pub(crate) fn from_parts(grams: Vec<Gram>, frequencies: Vec<u64>, total_frequency: u64, seed: u64) -> Self {
		let order = (0..grams.len()).collect();
		Self::from_grams(
			Grams { grams, frequencies, order, total_frequency },
			StdRng::seed_from_u64(seed),
		)
	}
}

impl Default for GramStore {
	fn default() -> Self {
		Self::new()
	}
}
