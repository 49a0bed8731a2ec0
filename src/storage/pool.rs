//! # Store Thread Pool
//!
//! Runs [`FormStore`] calls on dedicated OS threads so that a slow or
//! unreachable database never occupies a `may` worker.
//!
//! A connection coroutine queues a job on a shared `mpmc` channel and parks
//! on a one-shot `mpsc` reply channel. Parking a coroutine frees its worker
//! thread, so `/health` and every other request keep being served while
//! store threads sit inside driver timeouts.
//!
//! When all store threads are busy, further jobs queue until one frees up.

use may::sync::{mpmc, mpsc};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, error, info};

use super::{Form, FormPayload, FormStore, StoreError};

/// Default number of store threads.
pub const DEFAULT_STORE_THREADS: usize = 16;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A [`FormStore`] that forwards every call to a pool of store threads.
///
/// Dropping it closes the job queue; idle threads then exit.
pub struct PooledStore {
    inner: Arc<dyn FormStore>,
    // may channel senders are `Send` but not `Sync`.
    jobs: Mutex<mpmc::Sender<Job>>,
    threads: usize,
}

impl PooledStore {
    /// Spawn `threads` store threads (at least one) in front of `inner`.
    ///
    /// # Errors
    ///
    /// Fails when the OS refuses to spawn a thread.
    pub fn new(inner: Arc<dyn FormStore>, threads: usize) -> std::io::Result<Self> {
        let threads = threads.max(1);
        let (tx, rx) = mpmc::channel::<Job>();
        for n in 0..threads {
            let rx = rx.clone();
            thread::Builder::new()
                .name(format!("form-store-{n}"))
                .spawn(move || {
                    for job in rx.iter() {
                        // A panicking job drops its reply sender, which the
                        // caller sees as a closed channel.
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            error!(thread = n, "Store call panicked");
                        }
                    }
                    debug!(thread = n, "Store thread exiting");
                })?;
        }
        info!(threads, "Store thread pool started");
        Ok(Self {
            inner,
            jobs: Mutex::new(tx),
            threads,
        })
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn FormStore) -> Result<T, StoreError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let job: Job = Box::new(move || {
            let _ = reply_tx.send(op(inner.as_ref()));
        });

        {
            let jobs = self
                .jobs
                .lock()
                .map_err(|_| StoreError::Unavailable("store thread pool is poisoned".into()))?;
            jobs.send(job)
                .map_err(|_| StoreError::Unavailable("store thread pool is shut down".into()))?;
        }

        reply_rx
            .recv()
            .map_err(|_| StoreError::Driver("store call panicked".into()))?
    }
}

impl FormStore for PooledStore {
    fn create(&self, payload: FormPayload) -> Result<Form, StoreError> {
        self.run(move |store| store.create(payload))
    }

    fn list_all(&self) -> Result<Vec<Form>, StoreError> {
        self.run(|store| store.list_all())
    }

    fn replace(&self, id: &str, payload: FormPayload) -> Result<Option<Form>, StoreError> {
        let id = id.to_owned();
        self.run(move |store| store.replace(&id, payload))
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_owned();
        self.run(move |store| store.delete(&id))
    }
}
