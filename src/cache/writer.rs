//! Snapshot Writer Module
//!
//! Runs snapshot encoding and storage I/O on a dedicated thread so that cache
//! calls never wait on the backend. Each command replaces the whole stored
//! state, so a queued backlog collapses to its newest command.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::cache::persistence::{PersistedSnapshot, SnapshotAdapter};

enum Command<V> {
    Save(PersistedSnapshot<V>),
    Clear,
}

/// Count of commands sent but not yet applied to storage.
#[derive(Debug, Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn finish(&self, handled: usize) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(handled);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

// == Snapshot Writer ==
/// Handle to the background writer. Dropping it applies whatever is still
/// queued and joins the thread.
pub struct SnapshotWriter<V> {
    sender: Option<UnboundedSender<Command<V>>>,
    pending: Arc<Pending>,
    handle: Option<JoinHandle<()>>,
}

impl<V: Serialize + Send + 'static> SnapshotWriter<V> {
    /// Starts the writer thread on top of `adapter`.
    pub fn spawn(adapter: SnapshotAdapter) -> io::Result<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(Pending::default());

        let worker_pending = Arc::clone(&pending);
        let handle = thread::Builder::new()
            .name("asset-cache-snapshot".into())
            .spawn(move || run(&adapter, receiver, &worker_pending))?;

        Ok(Self {
            sender: Some(sender),
            pending,
            handle: Some(handle),
        })
    }

    /// Queues `snapshot` to replace the stored one. Returns immediately.
    pub fn save(&self, snapshot: PersistedSnapshot<V>) {
        self.send(Command::Save(snapshot));
    }

    /// Queues removal of the stored snapshot. Returns immediately.
    pub fn clear(&self) {
        self.send(Command::Clear);
    }

    fn send(&self, command: Command<V>) {
        let Some(sender) = &self.sender else {
            return;
        };
        *self.pending.count.lock() += 1;
        if sender.send(command).is_err() {
            warn!("Snapshot writer has stopped, dropping snapshot");
            self.pending.finish(1);
        }
    }
}

impl<V> SnapshotWriter<V> {
    /// Blocks until every queued command has reached storage.
    pub fn flush(&self) {
        let mut count = self.pending.count.lock();
        while *count > 0 {
            self.pending.idle.wait(&mut count);
        }
    }
}

fn run<V: Serialize>(
    adapter: &SnapshotAdapter,
    mut receiver: UnboundedReceiver<Command<V>>,
    pending: &Pending,
) {
    while let Some(mut command) = receiver.blocking_recv() {
        let mut handled = 1;
        while let Ok(next) = receiver.try_recv() {
            command = next;
            handled += 1;
        }
        if handled > 1 {
            debug!(superseded = handled - 1, "Skipped superseded snapshots");
        }

        match command {
            Command::Save(snapshot) => adapter.save(&snapshot),
            Command::Clear => adapter.clear(),
        }
        pending.finish(handled);
    }
    debug!("Snapshot writer stopped");
}

impl<V> Drop for SnapshotWriter<V> {
    fn drop(&mut self) {
        // Closing the channel lets the thread drain the queue and exit
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Snapshot writer thread panicked");
            }
        }
    }
}

impl<V> fmt::Debug for SnapshotWriter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotWriter")
            .field("pending", &*self.pending.count.lock())
            .finish_non_exhaustive()
    }
}
