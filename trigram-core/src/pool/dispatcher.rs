use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, SendError};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use super::worker::Worker;
use super::{Inbox, Message, Workload};

/// Routes tasks from a queue to idle workers.
///
/// # Responsibilities
/// - Start `max_workers` workers sharing one workload
/// - Hand each queued task to a worker that announced itself idle
/// - Skip inboxes of workers that stopped in the meantime
///
/// # Notes
/// - Forwarding never waits on processing: inboxes are unbounded and a
///   worker only announces itself when it is free.
/// - The dispatch loop ends when every queue sender is dropped, or when no
///   worker is left.
/// - Dropping the dispatcher stops its workers.
pub struct Dispatcher<W: Workload> {
	workload: Arc<W>,
	max_workers: usize,
	workers: Vec<Worker<W>>,
	handle: Option<JoinHandle<()>>,
}

impl<W: Workload> Dispatcher<W> {
	/// Creates a dispatcher for `max_workers` workers (at least one).
	/// Nothing runs until [`run`](Self::run).
	pub fn new(workload: W, max_workers: usize) -> Self {
		Self {
			workload: Arc::new(workload),
			max_workers: max_workers.max(1),
			workers: Vec::new(),
			handle: None,
		}
	}

	pub fn max_workers(&self) -> usize {
		self.max_workers
	}

	pub fn workload(&self) -> &W {
		&self.workload
	}

	pub fn workers(&self) -> &[Worker<W>] {
		&self.workers
	}

	/// Starts the workers and the dispatch loop over `queue`.
	///
	/// # Errors
	/// - `AlreadyExists` if the dispatcher is already running.
	/// - Any error from spawning a thread.
	pub fn run(&mut self, queue: Receiver<W::Task>) -> io::Result<()> {
		if self.handle.is_some() {
			return Err(io::Error::new(
				io::ErrorKind::AlreadyExists,
				format!("{} dispatcher is already running", W::NAME),
			));
		}

		let (pool, idle) = mpsc::sync_channel(self.max_workers);
		for id in 0..self.max_workers {
			self.workers.push(Worker::start(id, Arc::clone(&self.workload), pool.clone())?);
		}
		// Only workers may keep the pool open.
		drop(pool);

		let handle = thread::Builder::new()
			.name(format!("{}-dispatcher", W::NAME))
			.spawn(move || dispatch::<W>(&queue, &idle))?;
		self.handle = Some(handle);

		info!("{} dispatcher running with {} workers", W::NAME, self.max_workers);
		Ok(())
	}

	/// Whether the dispatch loop is still accepting tasks.
	pub fn is_running(&self) -> bool {
		self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
	}

	/// Asks every worker to stop. Does not wait.
	pub fn stop(&self) {
		for worker in &self.workers {
			worker.stop();
		}
	}
}

impl<W: Workload> Drop for Dispatcher<W> {
	fn drop(&mut self) {
		self.stop();
	}
}

fn dispatch<W: Workload>(queue: &Receiver<W::Task>, idle: &Receiver<Inbox<W::Task>>) {
	for task in queue.iter() {
		let mut message = Message::Run(task);
		loop {
			let Ok(inbox) = idle.recv() else {
				warn!("{} dispatcher: no worker left, dropping task", W::NAME);
				return;
			};
			match inbox.send(message) {
				Ok(()) => break,
				Err(SendError(returned)) => {
					debug!("{} dispatcher: skipping stopped worker", W::NAME);
					message = returned;
				}
			}
		}
	}
	debug!("{} queue closed, dispatcher exiting", W::NAME);
}
