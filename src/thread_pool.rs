use core_affinity::{get_core_ids, set_for_current, CoreId};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, warn};
use std::cell;
use std::thread;
use crate::error::Error;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    handle: Option<thread::JoinHandle<()>>,
    sender: Option<Sender<Job>>,
}

/// A minimal thread pool with core affinity. No effort is made to schedule
/// jobs intelligently, it just goes round-robin. Jobs must be `'static`, so
/// data is moved into them and handed back over channels.
///
pub struct ThreadPool {
    workers: Vec<Worker>,
    current_worker_id: cell::Cell<usize>,
}

impl ThreadPool {
    /// Create a new thread pool with the given number of threads. Each
    /// thread is pinned to its own physical core while cores last; if the
    /// system reports fewer cores than threads, the remaining threads run
    /// unpinned.
    ///
    pub fn new(num_threads: usize) -> Result<Self, Error> {
        if num_threads == 0 {
            return Err(Error::NoWorkers);
        }
        let core_ids = get_core_ids().unwrap_or_default();

        if core_ids.len() < num_threads {
            warn!("{} worker threads requested but only {} cores can be pinned", num_threads, core_ids.len());
        }

        let workers = (0..num_threads)
            .map(|n| spawn_worker(n, core_ids.get(n).cloned()))
            .collect::<Result<_, _>>()?;

        Ok(ThreadPool {
            workers,
            current_worker_id: cell::Cell::new(0),
        })
    }

    /// Return the number of worker threads in the pool.
    ///
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Spawn a new job into the pool. Job submissions go cyclically to the
    /// workers: if worker `n` gets this job, then worker `(n + 1) %
    /// num_workers` gets the next one.
    ///
    pub fn spawn<F>(&self, job: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn_on(None, job)
    }

    /// Spawn a job onto the worker thread with the given index, if it is
    /// `Some`. The current worker index is not incremented. If the worker
    /// index is `None`, then the job is run on the current worker index,
    /// which is then incremented. Fails if the worker has exited.
    ///
    pub fn spawn_on<F>(&self, worker_id: Option<usize>, job: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static,
    {
        let worker_id = if let Some(worker_id) = worker_id {
            worker_id
        } else {
            let worker_id = self.current_worker_id.get();
            self.current_worker_id
                .set((worker_id + 1) % self.num_threads());
            worker_id
        };
        self.workers[worker_id]
            .sender
            .as_ref()
            .ok_or(Error::WorkerLost)?
            .send(Box::new(job))
            .map_err(|_| Error::WorkerLost)
    }
}

fn spawn_worker(n: usize, core_id: Option<CoreId>) -> Result<Worker, Error> {
    let (sender, receiver): (Sender<Job>, Receiver<Job>) = unbounded();
    let handle = thread::Builder::new()
        .name(format!("central2d-pinned-{}", n))
        .spawn(move || {
            if let Some(core_id) = core_id {
                set_for_current(core_id);
            }
            for job in receiver {
                job()
            }
        })
        .map_err(|e| Error::ThreadPool(e.to_string()))?;

    Ok(Worker {
        handle: Some(handle),
        sender: Some(sender),
    })
}

impl Drop for Worker {
    fn drop(&mut self) {
        drop(self.sender.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("a pinned worker thread panicked");
            }
        }
    }
}
