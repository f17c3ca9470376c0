use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::microhal::Microhal;

/// How often an idle worker checks whether shutdown was requested.
const WORKER_POLL: Duration = Duration::from_millis(50);

/// Running instance: one reply worker and one periodic saver.
///
/// Both threads share the [`Microhal`] behind a single mutex, so processing
/// one input and writing a snapshot never overlap.
///
/// # Behavior
/// - Every string sent on [`Service::input`] produces exactly one string on
///   [`Service::output`], in the same order.
/// - The output queue has no buffer: the worker does not take the next input
///   until the previous reply has been received.
/// - The saver writes a snapshot every `save_interval`. A failed save is
///   logged and retried on the next cycle.
/// - [`Service::shutdown`] drains pending inputs, stops both threads and
///   writes a final snapshot.
pub struct Service {
	input: Sender<String>,
	output: Receiver<String>,
	stop: Sender<()>,
	stopping: Arc<AtomicBool>,
	worker: JoinHandle<()>,
	saver: JoinHandle<()>,
	shared: Arc<Mutex<Microhal>>,
	data_dir: PathBuf,
}

impl Service {
	/// Starts the worker and saver threads around `microhal`.
	///
	/// # Errors
	/// Returns a configuration fault if `config` is invalid or if
	/// `config.max_length` is below the order of `microhal`. No thread is
	/// started in that case.
	pub fn start(microhal: Microhal, config: &Config) -> Result<Self> {
		config.validate()?;
		Config::check_max_length(config.max_length, microhal.order())?;

		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};

		let name = microhal.name().to_owned();
		let shared = Arc::new(Mutex::new(microhal));
		let (input, inbound) = mpsc::channel::<String>();
		let (outbound, output) = mpsc::sync_channel::<String>(0);
		let (stop, stopped) = mpsc::channel::<()>();
		let stopping = Arc::new(AtomicBool::new(false));

		let worker = {
			let shared = Arc::clone(&shared);
			let stopping = Arc::clone(&stopping);
			let name = name.clone();
			let max_length = config.max_length;
			thread::spawn(move || run_worker(&name, shared, inbound, outbound, &stopping, max_length, rng))
		};

		let saver = {
			let shared = Arc::clone(&shared);
			let data_dir = config.data_dir.clone();
			let name = name.clone();
			let interval = config.save_interval;
			thread::spawn(move || run_saver(&name, shared, stopped, &data_dir, interval))
		};

		info!(target: "microhal", "{}: service started", name);
		Ok(Self {
			input,
			output,
			stop,
			stopping,
			worker,
			saver,
			shared,
			data_dir: config.data_dir.clone(),
		})
	}

	/// Inbound queue. Clones may be handed to other threads; they do not keep
	/// the worker alive past [`Service::shutdown`].
	pub fn input(&self) -> &Sender<String> {
		&self.input
	}

	/// Outbound queue, one reply per input.
	pub fn output(&self) -> &Receiver<String> {
		&self.output
	}

	/// Sends `text` and waits for its reply.
	///
	/// # Errors
	/// Returns [`Error::WorkerStopped`] if the worker is no longer running.
	///
	/// # Notes
	/// - Only correct when no other thread feeds the input queue, otherwise
	///   the reply received may belong to another input.
	pub fn ask(&self, text: &str) -> Result<String> {
		self.input
			.send(text.to_owned())
			.map_err(|_| Error::WorkerStopped)?;
		self.output.recv().map_err(|_| Error::WorkerStopped)
	}

	/// Returns a copy of the current state.
	pub fn snapshot(&self) -> Result<Microhal> {
		let microhal = self.shared.lock().map_err(|_| Error::LockPoisoned)?;
		Ok(microhal.clone())
	}

	/// Stops both threads and writes a final snapshot.
	///
	/// Inputs already queued are still learned; their replies are dropped
	/// with the output queue. Returns the snapshot path.
	pub fn shutdown(self) -> Result<PathBuf> {
		let Service { input, output, stop, stopping, worker, saver, shared, data_dir } = self;

		stopping.store(true, Ordering::Release);
		drop(input);
		drop(output);
		worker.join().map_err(|_| Error::ThreadPanicked("worker"))?;

		drop(stop);
		saver.join().map_err(|_| Error::ThreadPanicked("saver"))?;

		let microhal = shared.lock().map_err(|_| Error::LockPoisoned)?;
		let path = microhal.save(&data_dir)?;
		info!(target: "microhal", "{}: service stopped", microhal.name());
		Ok(path)
	}
}

fn run_worker(
	name: &str,
	shared: Arc<Mutex<Microhal>>,
	inbound: Receiver<String>,
	outbound: SyncSender<String>,
	stopping: &AtomicBool,
	max_length: usize,
	mut rng: StdRng,
) {
	loop {
		let input = match inbound.recv_timeout(WORKER_POLL) {
			Ok(input) => input,
			Err(RecvTimeoutError::Timeout) if stopping.load(Ordering::Acquire) => return,
			Err(RecvTimeoutError::Timeout) => continue,
			Err(RecvTimeoutError::Disconnected) => return,
		};

		let reply = {
			let Ok(mut microhal) = shared.lock() else {
				error!(target: "microhal", "{}: shared state poisoned, worker stopping", name);
				return;
			};
			info!(target: "microhal", "{}: received {:?}", microhal.name(), input);
			let reply = match microhal.process_input(&input, max_length, &mut rng) {
				Ok(reply) => reply,
				Err(e) => {
					error!(target: "microhal", "{}: failed to answer {:?}: {}", microhal.name(), input, e);
					String::new()
				}
			};
			info!(target: "microhal", "{}: responded {:?}", microhal.name(), reply);
			reply
		};

		// Blocks until the reply is received; a dropped output still lets
		// queued inputs be learned
		let _ = outbound.send(reply);
	}
}

fn run_saver(name: &str, shared: Arc<Mutex<Microhal>>, stopped: Receiver<()>, data_dir: &Path, interval: Duration) {
	loop {
		match stopped.recv_timeout(interval) {
			Err(RecvTimeoutError::Timeout) => {
				let Ok(microhal) = shared.lock() else {
					error!(target: "microhal", "{}: shared state poisoned, saver stopping", name);
					return;
				};
				info!(target: "microhal", "{}: saving", microhal.name());
				if let Err(e) = microhal.save(data_dir) {
					error!(target: "microhal", "{}: save failed, retrying next cycle: {}", microhal.name(), e);
				}
			}
			Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
		}
	}
}
