//! Bounded polling of an asynchronous detection run

use async_trait::async_trait;
use scrub_config::PollConfig;
use scrub_core::{Error, Result, RunResponse, RunStatus};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// What to do after observing a status on a given attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    Continue,
    Succeeded,
    Failed,
    TimedOut,
}

/// Transition function of the poll loop.
///
/// `attempt` is 1-based. FAILED is checked first, then SUCCESS, then the
/// attempt budget, so a SUCCESS on the last allowed attempt still counts.
pub fn next_step(status: &RunStatus, attempt: u32, max_attempts: u32) -> PollDecision {
    match status {
        RunStatus::Failed => PollDecision::Failed,
        RunStatus::Success => PollDecision::Succeeded,
        RunStatus::Pending if attempt >= max_attempts => PollDecision::TimedOut,
        RunStatus::Pending => PollDecision::Continue,
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct RunPoller {
    delay: Duration,
    max_attempts: u32,
    sleeper: Arc<dyn Sleeper>,
}

impl RunPoller {
    pub fn new(delay: Duration, max_attempts: u32, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            delay,
            max_attempts,
            sleeper,
        }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(config.delay(), config.max_attempts, Arc::new(TokioSleeper))
    }

    /// Wait, then check, until the run reaches a terminal state or the
    /// attempt budget runs out. Errors from `check` abort the loop.
    pub async fn poll<F, Fut>(&self, mut check: F) -> Result<RunResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RunResponse>>,
    {
        let mut attempt = 0;
        loop {
            self.sleeper.sleep(self.delay).await;
            attempt += 1;

            let response = check().await?;
            debug!(attempt, status = ?response.status, "Checked run status");

            match next_step(&response.status, attempt, self.max_attempts) {
                PollDecision::Continue => continue,
                PollDecision::Succeeded => return Ok(response),
                PollDecision::Failed => return Err(Error::RunFailed(response.error_detail())),
                PollDecision::TimedOut => return Err(Error::PollTimeout),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct RecordingSleeper {
        naps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.naps.lock().unwrap().push(duration);
        }
    }

    fn response(status: &str) -> RunResponse {
        serde_json::from_value(serde_json::json!({"status": status})).unwrap()
    }

    fn poller(max_attempts: u32) -> (RunPoller, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        let poller = RunPoller::new(Duration::from_millis(1000), max_attempts, sleeper.clone());
        (poller, sleeper)
    }

    #[test]
    fn test_transitions() {
        assert_eq!(next_step(&RunStatus::Pending, 1, 300), PollDecision::Continue);
        assert_eq!(next_step(&RunStatus::Pending, 300, 300), PollDecision::TimedOut);
        assert_eq!(next_step(&RunStatus::Success, 300, 300), PollDecision::Succeeded);
        assert_eq!(next_step(&RunStatus::Failed, 1, 300), PollDecision::Failed);
        assert_eq!(next_step(&RunStatus::Failed, 300, 300), PollDecision::Failed);
    }

    #[tokio::test]
    async fn test_success_on_nth_check() {
        let (poller, sleeper) = poller(300);
        let mut script: VecDeque<RunResponse> =
            ["PENDING", "RUNNING", "PENDING", "SUCCESS"].iter().map(|s| response(s)).collect();
        let calls = AtomicU32::new(0);

        let result = poller
            .poll(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                let next = script.pop_front().unwrap();
                async move { Ok(next) }
            })
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let naps = sleeper.naps.lock().unwrap();
        assert_eq!(naps.len(), 4);
        assert!(naps.iter().all(|d| *d == Duration::from_millis(1000)));
    }

    #[tokio::test]
    async fn test_success_on_last_attempt() {
        let (poller, _) = poller(300);
        let calls = AtomicU32::new(0);

        let result = poller
            .poll(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                let status = if n == 300 { "SUCCESS" } else { "PENDING" };
                let next = response(status);
                async move { Ok(next) }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 300);
    }

    #[tokio::test]
    async fn test_times_out_after_budget() {
        let (poller, sleeper) = poller(300);
        let calls = AtomicU32::new(0);

        let err = poller
            .poll(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(response("PENDING")) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PollTimeout));
        assert_eq!(calls.load(Ordering::SeqCst), 300);
        assert_eq!(sleeper.naps.lock().unwrap().len(), 300);
    }

    #[tokio::test]
    async fn test_failed_stops_immediately() {
        let (poller, _) = poller(300);
        let calls = AtomicU32::new(0);

        let err = poller
            .poll(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                let next: RunResponse = if n == 3 {
                    serde_json::from_value(serde_json::json!({
                        "status": "FAILED",
                        "error": {"reason": "unsupported"}
                    }))
                    .unwrap()
                } else {
                    response("PENDING")
                };
                async move { Ok(next) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.to_string(), r#"Run failed: {"reason":"unsupported"}"#);
    }

    #[tokio::test]
    async fn test_check_error_aborts() {
        let (poller, _) = poller(300);
        let calls = AtomicU32::new(0);

        let err = poller
            .poll(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::detect("status", "HTTP 502: bad gateway")) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.to_string().contains("502"));
    }
}
