//! Worker pool shared by the learn and generate workloads.
//!
//! A [`Dispatcher`] pulls tasks from a bounded queue and hands each one to
//! whichever [`Worker`] last announced itself idle. Workers announce
//! themselves by pushing their private inbox into the dispatcher's pool,
//! then wait for a task or a stop message.

use std::sync::mpsc::Sender;

/// Single-task worker threads.
pub mod worker;

/// Task routing from a queue to idle workers.
pub mod dispatcher;

pub use dispatcher::Dispatcher;
pub use worker::Worker;

/// A kind of work a pool executes.
///
/// The workload holds the parameters fixed at pool start; each task
/// carries its own input and completion channel. `process` must signal the
/// task's completion itself, whatever the outcome, and must not panic on
/// bad input: failures are logged and the worker keeps serving.
pub trait Workload: Send + Sync + 'static {
	type Task: Send + 'static;

	/// Short name used for thread names and logs.
	const NAME: &'static str;

	fn process(&self, task: Self::Task);
}

/// What a worker inbox carries.
#[derive(Debug)]
pub(crate) enum Message<T> {
	Run(T),
	Stop,
}

/// The sending half of a worker inbox, as published in the idle pool.
pub(crate) type Inbox<T> = Sender<Message<T>>;
