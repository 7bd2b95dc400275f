//! Background worker and the non-blocking loop that consumes its events.
//!
//! The engine runs on a tokio blocking thread and reports through a bounded
//! channel. The consumer side never waits on the worker directly: it wakes on a
//! fixed interval, drains whatever is queued, and goes back to sleep.

use crate::engine::{EventSink, SplitEngine};
use crate::error::SplitError;
use crate::model::{ProgressUpdate, SplitEvent, SplitParams, SplitResult};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub struct SplitJob;

impl SplitJob {
    /// Starts a split on a blocking thread. Must be called inside a tokio runtime.
    pub fn spawn(params: SplitParams, event_capacity: usize) -> SplitHandle {
        let engine = SplitEngine::new(params);
        Self::spawn_with(event_capacity, move |sink, cancel| engine.run(sink, cancel))
    }

    /// Runs an arbitrary job body with the same channel and cancellation wiring.
    pub fn spawn_with<F>(event_capacity: usize, job: F) -> SplitHandle
    where
        F: FnOnce(&dyn EventSink, &CancellationToken) -> SplitResult + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(event_capacity.max(1));
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let worker = tokio::task::spawn_blocking(move || {
            let result = job(&tx, &worker_cancel);
            tracing::debug!(status = %result.status, "worker finished");
        });

        SplitHandle {
            events: rx,
            cancel,
            worker,
        }
    }
}

pub struct SplitHandle {
    events: mpsc::Receiver<SplitEvent>,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
}

impl SplitHandle {
    /// Requests cancellation at the next chunk boundary. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Polls the event channel every `poll_interval` until the terminal event.
    ///
    /// Progress events are handed to `on_progress` in order. If the worker goes
    /// away without reporting a result, an error result is synthesized.
    pub async fn drive<F>(mut self, poll_interval: Duration, mut on_progress: F) -> SplitResult
    where
        F: FnMut(&ProgressUpdate),
    {
        let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            loop {
                match self.events.try_recv() {
                    Ok(SplitEvent::Progress(update)) => on_progress(&update),
                    Ok(SplitEvent::Finished(result)) => {
                        self.reap().await;
                        return result;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.reap().await;
                        let error = SplitError::WorkerTerminated;
                        tracing::error!(
                            error_code = %error.code(),
                            category = error.code().category(),
                            "{}",
                            error
                        );
                        return SplitResult::error(error.to_string(), Vec::new());
                    }
                }
            }
        }
    }

    async fn reap(self) {
        if let Err(join_error) = self.worker.await {
            tracing::error!(error = %join_error, "split worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SplitStatus;

    #[tokio::test]
    async fn drains_progress_then_returns_terminal_result() {
        let handle = SplitJob::spawn_with(2, |sink, _cancel| {
            for step in 1..=5 {
                sink.emit(SplitEvent::Progress(ProgressUpdate {
                    step,
                    total: 5,
                    status: format!("step {step}"),
                }));
            }
            let result = SplitResult::success("done", Vec::new());
            sink.emit(SplitEvent::Finished(result.clone()));
            result
        });

        let mut seen = Vec::new();
        let result = handle
            .drive(Duration::from_millis(5), |update| seen.push(update.step))
            .await;

        assert_eq!(result.status, SplitStatus::Success);
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn missing_terminal_event_is_reported_as_error() {
        let handle = SplitJob::spawn_with(4, |sink, _cancel| {
            sink.emit(SplitEvent::Progress(ProgressUpdate {
                step: 1,
                total: 2,
                status: "chunk 1".into(),
            }));
            SplitResult::success("never emitted", Vec::new())
        });

        let result = handle.drive(Duration::from_millis(5), |_| {}).await;
        assert_eq!(result.status, SplitStatus::Error);
        assert_eq!(result.message, SplitError::WorkerTerminated.to_string());
        assert_eq!(result.files_created, 0);
    }

    #[tokio::test]
    async fn panicking_worker_is_reported_as_error() {
        let handle = SplitJob::spawn_with(4, |_sink, _cancel| panic!("boom"));
        let result = handle.drive(Duration::from_millis(5), |_| {}).await;
        assert_eq!(result.status, SplitStatus::Error);
    }

    #[tokio::test]
    async fn cancel_is_visible_to_the_job() {
        let (started_tx, started_rx) = std::sync::mpsc::channel::<()>();
        let handle = SplitJob::spawn_with(4, move |sink, cancel| {
            let _ = started_rx.recv();
            let result = if cancel.is_cancelled() {
                SplitResult::cancelled("Operation cancelled.", Vec::new())
            } else {
                SplitResult::success("finished", Vec::new())
            };
            sink.emit(SplitEvent::Finished(result.clone()));
            result
        });

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        started_tx.send(()).unwrap();

        let result = handle.drive(Duration::from_millis(5), |_| {}).await;
        assert_eq!(result.status, SplitStatus::Cancelled);
    }
}
