//! Parallel evaluation of independent tasks.

use std::sync::Mutex;
use std::thread;

use crossbeam_channel::Receiver;

use crate::errors::{HocrfError, Result};

/// A job split into independent tasks, each processed by one worker.
///
/// Every worker keeps its own partial result and merges it once into the job, so merging must
/// be commutative.
pub trait Schedulable: Sync {
    /// Result accumulated by a single worker.
    type Partial: Send;

    /// Returns the number of tasks.
    fn task_count(&self) -> usize;

    /// Takes the next unprocessed task.
    ///
    /// Each ID is returned to exactly one caller, even when called from several threads.
    /// Returns `None` once all tasks are taken.
    fn next_task_id(&self) -> Option<usize>;

    /// Creates an empty partial result.
    fn new_partial(&self) -> Self::Partial;

    /// Processes a task and accumulates its result.
    ///
    /// # Errors
    ///
    /// An error aborts the whole job.
    fn run_task(&self, task_id: usize, partial: &mut Self::Partial) -> Result<()>;

    /// Merges a partial result into the job.
    ///
    /// # Errors
    ///
    /// An error aborts the whole job.
    fn merge_result(&self, partial: Self::Partial) -> Result<()>;
}

/// Queue handing out task IDs on a first-come basis.
pub struct TaskQueue {
    receiver: Receiver<usize>,
}

impl TaskQueue {
    /// Creates a queue holding the IDs `0..task_count`.
    ///
    /// # Errors
    ///
    /// [`HocrfError::Scheduler`] is returned if the queue cannot be filled.
    pub fn new(task_count: usize) -> Result<Self> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        for task_id in 0..task_count {
            sender
                .send(task_id)
                .map_err(|_| HocrfError::scheduler("task queue is closed"))?;
        }
        Ok(Self { receiver })
    }

    /// Takes the next ID, or returns `None` if the queue is drained.
    #[inline(always)]
    pub fn next(&self) -> Option<usize> {
        self.receiver.try_recv().ok()
    }
}

/// Runs all tasks of a job on `n_threads` workers and waits for them.
///
/// # Errors
///
/// The first error returned by a task or a merge is returned. A panicking worker is reported as
/// [`HocrfError::Scheduler`].
pub fn run<S>(job: &S, n_threads: usize) -> Result<()>
where
    S: Schedulable,
{
    if n_threads == 0 {
        return Err(HocrfError::invalid_argument("n_threads", "must not be 0"));
    }
    let n_threads = n_threads.min(job.task_count()).max(1);
    let first_error = Mutex::new(None);
    let panicked = thread::scope(|scope| {
        let mut workers = vec![];
        for _ in 0..n_threads {
            let first_error = &first_error;
            workers.push(scope.spawn(move || {
                if let Err(e) = run_worker(job, first_error) {
                    if let Ok(mut slot) = first_error.lock() {
                        slot.get_or_insert(e);
                    }
                }
            }));
        }
        let mut panicked = false;
        for worker in workers {
            panicked |= worker.join().is_err();
        }
        panicked
    });
    if panicked {
        return Err(HocrfError::scheduler("worker panicked"));
    }

    match first_error.into_inner() {
        Ok(None) => Ok(()),
        Ok(Some(e)) => Err(e),
        Err(_) => Err(HocrfError::scheduler("error slot is poisoned")),
    }
}

fn run_worker<S>(job: &S, first_error: &Mutex<Option<HocrfError>>) -> Result<()>
where
    S: Schedulable,
{
    let mut partial = job.new_partial();
    while let Some(task_id) = job.next_task_id() {
        // another worker failed
        if first_error.lock().map_or(true, |slot| slot.is_some()) {
            return Ok(());
        }
        job.run_task(task_id, &mut partial)?;
    }
    job.merge_result(partial)
}
