//! Bounded waiting for asynchronous assistant runs.
//!
//! Runs are polled at a fixed interval until they reach a terminal state,
//! the timeout elapses, or the caller cancels through a `CancellationToken`.

use super::{AssistantService, Run, RunStatus};
use crate::errors::{AIError, AppResult};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub use tokio_util::sync::CancellationToken;

/// Polls a run until it completes, fails, times out or is cancelled.
#[derive(Debug, Clone)]
pub struct RunPoller {
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
}

impl RunPoller {
    /// Creates a poller with its own cancellation token.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token with a shared one.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token observed by this poller.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Blocks until `run` reaches `completed`.
    ///
    /// # Errors
    ///
    /// - `AIError::RunFailed` if the run ends in any other terminal status
    /// - `AIError::RunTimeout` if the timeout elapses first
    /// - `AIError::Cancelled` if the token is cancelled while waiting
    /// - any error from `retrieve_run`, unchanged
    pub fn wait_for_completion<S: AssistantService + ?Sized>(
        &self,
        service: &S,
        thread_id: &str,
        run: Run,
    ) -> AppResult<Run> {
        let started = Instant::now();
        let mut current = run;
        let mut polls: u32 = 0;

        loop {
            if current.status == RunStatus::Completed {
                debug!("Run {} completed after {} polls", current.id, polls);
                return Ok(current);
            }

            if current.status.is_terminal() {
                warn!(
                    "Run {} ended with status {}",
                    current.id,
                    current.status.as_str()
                );
                return Err(AIError::RunFailed {
                    run_id: current.id,
                    status: current.status.as_str().to_string(),
                }
                .into());
            }

            if self.cancel.is_cancelled() {
                return Err(AIError::Cancelled(current.id).into());
            }

            if started.elapsed() >= self.timeout {
                return Err(AIError::RunTimeout {
                    run_id: current.id,
                    waited_secs: self.timeout.as_secs(),
                }
                .into());
            }

            thread::sleep(self.interval);
            polls += 1;
            current = service.retrieve_run(thread_id, &current.id)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedAssistant;
    use crate::errors::AppError;

    fn run(id: &str, status: RunStatus) -> Run {
        Run {
            id: id.to_string(),
            status,
        }
    }

    fn fast_poller() -> RunPoller {
        RunPoller::new(Duration::from_millis(1), Duration::from_secs(5))
    }

    #[test]
    fn test_already_completed_run_returns_immediately() {
        let service = ScriptedAssistant::new();
        let result = fast_poller()
            .wait_for_completion(&service, "thread_1", run("run_1", RunStatus::Completed))
            .unwrap();
        assert_eq!(result.id, "run_1");
        assert_eq!(service.retrieve_count(), 0);
    }

    #[test]
    fn test_polls_until_completed() {
        let service = ScriptedAssistant::new().with_run_progression(vec![
            RunStatus::InProgress,
            RunStatus::InProgress,
            RunStatus::Completed,
        ]);
        let result = fast_poller()
            .wait_for_completion(&service, "thread_1", run("run_1", RunStatus::Queued))
            .unwrap();
        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(service.retrieve_count(), 3);
    }

    #[test]
    fn test_failed_run_is_an_error() {
        let service = ScriptedAssistant::new().with_run_progression(vec![RunStatus::Failed]);
        let result =
            fast_poller().wait_for_completion(&service, "thread_1", run("run_1", RunStatus::Queued));
        match result {
            Err(AppError::AI(AIError::RunFailed { run_id, status })) => {
                assert_eq!(run_id, "run_1");
                assert_eq!(status, "failed");
            }
            other => panic!("Expected RunFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_times_out_on_stuck_run() {
        let service = ScriptedAssistant::new().with_run_progression(vec![RunStatus::InProgress]);
        let poller = RunPoller::new(Duration::from_millis(5), Duration::from_millis(30));
        let result =
            poller.wait_for_completion(&service, "thread_1", run("run_1", RunStatus::Queued));
        assert!(matches!(
            result,
            Err(AppError::AI(AIError::RunTimeout { .. }))
        ));
    }

    #[test]
    fn test_cancellation_stops_waiting() {
        let service = ScriptedAssistant::new().with_run_progression(vec![RunStatus::InProgress]);
        let token = CancellationToken::new();
        let poller = fast_poller().with_cancellation(token.clone());
        token.cancel();

        let result =
            poller.wait_for_completion(&service, "thread_1", run("run_1", RunStatus::Queued));
        assert!(matches!(result, Err(AppError::AI(AIError::Cancelled(_)))));
        assert!(poller.cancellation_token().is_cancelled());
    }

    #[test]
    fn test_cancel_from_another_thread_during_run() {
        let service = ScriptedAssistant::new().with_run_progression(vec![RunStatus::InProgress]);
        let poller = RunPoller::new(Duration::from_millis(2), Duration::from_secs(30));
        let token = poller.cancellation_token().clone();

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(40));
            token.cancel();
        });
        let started = Instant::now();
        let result =
            poller.wait_for_completion(&service, "thread_1", run("run_1", RunStatus::Queued));
        canceller.join().unwrap();

        match result {
            Err(AppError::AI(AIError::Cancelled(run_id))) => assert_eq!(run_id, "run_1"),
            other => panic!("Expected Cancelled, got {:?}", other),
        }
        assert!(service.retrieve_count() > 0);
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
