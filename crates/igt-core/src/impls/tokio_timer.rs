//! Deadline timer backed by tokio tasks.
//!
//! Each `arm` spawns a task that sleeps and then reports the trial id on a
//! channel. The returned guard aborts that task on drop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::TrialId;
use crate::ports::DeadlineTimer;

/// Aborts the spawned deadline task when dropped.
#[derive(Debug)]
pub struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Debug, Clone)]
pub struct TokioDeadlineTimer {
    fired_tx: mpsc::UnboundedSender<TrialId>,
}

impl TokioDeadlineTimer {
    /// Timer plus the receiver on which elapsed deadlines arrive.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TrialId>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        (Self { fired_tx }, fired_rx)
    }
}

impl DeadlineTimer for TokioDeadlineTimer {
    type Guard = AbortOnDrop;

    /// Must be called from within a tokio runtime.
    fn arm(&mut self, trial: TrialId, after: Duration) -> AbortOnDrop {
        let tx = self.fired_tx.clone();
        AbortOnDrop(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // receiver gone means the session is torn down
            let _ = tx.send(trial);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[tokio::test(start_paused = true)]
    async fn fires_after_duration() {
        let (mut timer, mut rx) = TokioDeadlineTimer::channel();
        let trial = TrialId::from_ulid(Ulid::new());
        let _guard = timer.arm(trial, Duration::from_secs(4));

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some(trial));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_guard_cancels() {
        let (mut timer, mut rx) = TokioDeadlineTimer::channel();
        let guard = timer.arm(TrialId::from_ulid(Ulid::new()), Duration::from_secs(4));
        drop(guard);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }
}
