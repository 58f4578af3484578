//! Handle to an extraction running in the background

use crate::error::ExtractorError;
use crate::types::ExtractionOutcome;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

/// Result delivered by a finished run
pub type ExtractionResult = Result<ExtractionOutcome, ExtractorError>;

/// State of a background run after a wait
#[derive(Debug)]
pub enum WaitOutcome {
    /// The run finished
    Completed(ExtractionResult),
    /// The run is still going; the handle is given back
    StillRunning(ExtractionTask),
}

impl WaitOutcome {
    /// Whether the run finished
    pub fn is_completed(&self) -> bool {
        matches!(self, WaitOutcome::Completed(_))
    }
}

/// Handle to one background extraction run
///
/// Waiting never cancels the run. Dropping the handle detaches it.
#[derive(Debug)]
pub struct ExtractionTask {
    run_id: Uuid,
    source_id: String,
    receiver: oneshot::Receiver<ExtractionResult>,
    handle: JoinHandle<()>,
}

impl ExtractionTask {
    pub(crate) fn new(
        run_id: Uuid,
        source_id: String,
        receiver: oneshot::Receiver<ExtractionResult>,
        handle: JoinHandle<()>,
    ) -> Self {
        Self {
            run_id,
            source_id,
            receiver,
            handle,
        }
    }

    /// Identifier of the run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Source being extracted
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Whether the run has stopped
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Check for a result without waiting
    pub async fn poll(mut self) -> WaitOutcome {
        match self.receiver.try_recv() {
            Ok(result) => WaitOutcome::Completed(result),
            Err(TryRecvError::Empty) => WaitOutcome::StillRunning(self),
            Err(TryRecvError::Closed) => WaitOutcome::Completed(Err(self.join_error().await)),
        }
    }

    /// Wait up to `limit` for the run to finish
    pub async fn wait_timeout(mut self, limit: Duration) -> WaitOutcome {
        match timeout(limit, &mut self.receiver).await {
            Ok(Ok(result)) => WaitOutcome::Completed(result),
            Ok(Err(_)) => WaitOutcome::Completed(Err(self.join_error().await)),
            Err(_) => WaitOutcome::StillRunning(self),
        }
    }

    /// Wait `first`, then once more for `grace` if the run is not done
    pub async fn wait_with_grace(self, first: Duration, grace: Duration) -> WaitOutcome {
        match self.wait_timeout(first).await {
            WaitOutcome::StillRunning(task) => {
                warn!(
                    "Run {} still going after {:?}, waiting {:?} more",
                    task.run_id, first, grace
                );
                let outcome = task.wait_timeout(grace).await;
                if !outcome.is_completed() {
                    info!("Giving up waiting; the run continues in the background");
                }
                outcome
            }
            completed => completed,
        }
    }

    /// Wait for the run to finish, however long it takes
    pub async fn join(mut self) -> ExtractionResult {
        match (&mut self.receiver).await {
            Ok(result) => result,
            Err(_) => Err(self.join_error().await),
        }
    }

    /// Error for a run that dropped its sender, i.e. panicked
    async fn join_error(self) -> ExtractorError {
        match self.handle.await {
            Err(e) => ExtractorError::TaskJoin(e.to_string()),
            Ok(()) => ExtractorError::TaskJoin("run ended without a result".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_failing_after(delay: Duration) -> ExtractionTask {
        let (sender, receiver) = oneshot::channel();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(Err(ExtractorError::RetrievalUnavailable));
        });
        ExtractionTask::new(Uuid::now_v7(), "a.pdf".to_string(), receiver, handle)
    }

    #[tokio::test]
    async fn test_wait_timeout_completes() {
        let task = spawn_failing_after(Duration::from_millis(5));
        match task.wait_timeout(Duration::from_secs(5)).await {
            WaitOutcome::Completed(Err(ExtractorError::RetrievalUnavailable)) => {}
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wait_timeout_returns_handle() {
        let task = spawn_failing_after(Duration::from_secs(30));
        let run_id = task.run_id();

        match task.wait_timeout(Duration::from_millis(10)).await {
            WaitOutcome::StillRunning(task) => {
                assert_eq!(task.run_id(), run_id);
                assert_eq!(task.source_id(), "a.pdf");
                assert!(!task.is_finished());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_grace_period_catches_slow_run() {
        let task = spawn_failing_after(Duration::from_millis(50));
        let outcome = task
            .wait_with_grace(Duration::from_millis(1), Duration::from_secs(5))
            .await;
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn test_poll_then_join() {
        let task = spawn_failing_after(Duration::from_millis(20));
        let task = match task.poll().await {
            WaitOutcome::StillRunning(task) => task,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert!(matches!(task.join().await, Err(ExtractorError::RetrievalUnavailable)));
    }

    #[tokio::test]
    async fn test_panicking_run_is_join_error() {
        let (sender, receiver) = oneshot::channel::<ExtractionResult>();
        let handle = tokio::spawn(async move {
            let _held = sender;
            panic!("boom");
        });
        let task = ExtractionTask::new(Uuid::now_v7(), "a.pdf".to_string(), receiver, handle);

        assert!(matches!(task.join().await, Err(ExtractorError::TaskJoin(_))));
    }
}
