use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use log::{debug, trace};

use super::{Inbox, Message, Workload};

/// One execution unit of a pool, running on its own named thread.
///
/// ## State machine
/// `Idle` (inbox published in the pool) → `Busy` (processing one task) →
/// `Idle`, until a stop message moves it to `Stopped`.
pub struct Worker<W: Workload> {
	id: usize,
	inbox: Inbox<W::Task>,
	handle: JoinHandle<()>,
}

impl<W: Workload> Worker<W> {
	/// Spawns the worker thread. The worker immediately publishes its
	/// inbox into `pool`.
	///
	/// # Errors
	/// Returns an error if the thread cannot be spawned.
	pub(crate) fn start(id: usize, workload: Arc<W>, pool: SyncSender<Inbox<W::Task>>) -> io::Result<Self> {
		let (inbox, messages) = mpsc::channel();
		let published = inbox.clone();
		let handle = thread::Builder::new()
			.name(format!("{}-worker-{id}", W::NAME))
			.spawn(move || run(id, &*workload, &pool, &published, &messages))?;
		Ok(Self { id, inbox, handle })
	}

	pub fn id(&self) -> usize {
		self.id
	}

	/// Asks the worker to exit once it is idle again.
	///
	/// Does not wait for the worker. A task already routed to this worker
	/// before the stop message is dropped without completion.
	pub fn stop(&self) {
		// A send error means the worker already exited.
		let _ = self.inbox.send(Message::Stop);
	}

	/// Whether the worker thread has exited.
	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}
}

fn run<W: Workload>(
	id: usize,
	workload: &W,
	pool: &SyncSender<Inbox<W::Task>>,
	inbox: &Inbox<W::Task>,
	messages: &Receiver<Message<W::Task>>,
) {
	loop {
		// The pool holds one slot per worker, so this never blocks.
		if pool.send(inbox.clone()).is_err() {
			debug!("{} worker {id}: dispatcher is gone, exiting", W::NAME);
			return;
		}

		match messages.recv() {
			Ok(Message::Run(task)) => {
				trace!("{} worker {id}: processing task", W::NAME);
				workload.process(task);
			}
			Ok(Message::Stop) | Err(_) => {
				debug!("{} worker {id}: stopped", W::NAME);
				return;
			}
		}
	}
}
