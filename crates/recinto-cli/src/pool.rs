//! Fixed-size worker pool with a per-job timeout.
//!
//! Jobs are handed out over a shared channel. A job that runs past the
//! timeout is reported as [`JobOutcome::TimedOut`]; its worker is abandoned
//! (it may still finish later, its result is discarded) and a replacement
//! worker is spawned so the rest of the batch keeps its parallelism.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result slot of one job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome<T> {
    /// The job returned a value.
    Done(T),
    /// The job did not finish (or never started) within the timeout.
    TimedOut,
}

enum Event<T> {
    Started(usize, Instant),
    Finished(usize, T),
}

/// Pool configuration.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
    timeout: Duration,
}

impl WorkerPool {
    /// Pool of `workers` threads (at least one) with the given per-job timeout.
    pub fn new(workers: usize, timeout: Duration) -> Self {
        Self {
            workers: workers.max(1),
            timeout,
        }
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` over every job and return the outcomes in job order.
    ///
    /// `on_settled` is called once per job as soon as its outcome is known.
    pub fn run<J, T, F>(
        &self,
        jobs: Vec<J>,
        task: F,
        mut on_settled: impl FnMut(&JobOutcome<T>),
    ) -> std::io::Result<Vec<JobOutcome<T>>>
    where
        J: Send + 'static,
        T: Send + 'static,
        F: Fn(J) -> T + Send + Sync + 'static,
    {
        let total = jobs.len();
        let mut outcomes: Vec<Option<JobOutcome<T>>> = (0..total).map(|_| None).collect();
        if total == 0 {
            return Ok(Vec::new());
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded();
        for job in jobs.into_iter().enumerate() {
            // The receiver is alive in this scope
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let task = Arc::new(task);
        let mut spawned = 0;
        for _ in 0..self.workers.min(total) {
            spawn_worker(spawned, job_rx.clone(), event_tx.clone(), Arc::clone(&task))?;
            spawned += 1;
        }

        let mut running: HashMap<usize, Instant> = HashMap::new();
        let mut remaining = total;

        while remaining > 0 {
            let wait = running
                .values()
                .min()
                .map_or(self.timeout, |started| {
                    (*started + self.timeout).saturating_duration_since(Instant::now())
                });

            match event_rx.recv_timeout(wait) {
                Ok(Event::Started(index, at)) => {
                    running.insert(index, at);
                }
                Ok(Event::Finished(index, value)) => {
                    running.remove(&index);
                    if outcomes[index].is_none() {
                        let outcome = JobOutcome::Done(value);
                        on_settled(&outcome);
                        outcomes[index] = Some(outcome);
                        remaining -= 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if running.is_empty() {
                        // Nothing started within a full timeout: no live workers are left
                        tracing::error!(remaining, "worker pool stalled");
                        break;
                    }
                    let now = Instant::now();
                    let expired: Vec<usize> = running
                        .iter()
                        .filter(|(_, started)| now.duration_since(**started) >= self.timeout)
                        .map(|(index, _)| *index)
                        .collect();
                    for index in expired {
                        running.remove(&index);
                        tracing::warn!(job = index, timeout = ?self.timeout, "job timed out");
                        let outcome = JobOutcome::TimedOut;
                        on_settled(&outcome);
                        outcomes[index] = Some(outcome);
                        remaining -= 1;
                        if !job_rx.is_empty() {
                            spawn_worker(spawned, job_rx.clone(), event_tx.clone(), Arc::clone(&task))?;
                            spawned += 1;
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        Ok(outcomes
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    let outcome = JobOutcome::TimedOut;
                    on_settled(&outcome);
                    outcome
                })
            })
            .collect())
    }
}

fn spawn_worker<J, T, F>(
    id: usize,
    jobs: Receiver<(usize, J)>,
    events: Sender<Event<T>>,
    task: Arc<F>,
) -> std::io::Result<()>
where
    J: Send + 'static,
    T: Send + 'static,
    F: Fn(J) -> T + Send + Sync + 'static,
{
    std::thread::Builder::new()
        .name(format!("recinto-worker-{id}"))
        .spawn(move || {
            for (index, job) in jobs.iter() {
                if events.send(Event::Started(index, Instant::now())).is_err() {
                    break;
                }
                let value = task(job);
                if events.send(Event::Finished(index, value)).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}
